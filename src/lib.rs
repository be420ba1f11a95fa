//! Service hub: CRM, contact-request triage, ticketing, landing pages,
//! legal pages and an automation hub in front of an external workflow engine.

#[cfg(feature = "server")]
mod app;
#[cfg(feature = "server")]
pub mod auth;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod envelope;
pub mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod workflow;

#[cfg(feature = "server")]
pub use app::run;
