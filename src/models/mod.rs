//! Database models mirroring `crate::schema` and their domain conversions.

pub mod contact_request;
pub mod customer;
pub mod landing_page;
pub mod legal_document;
pub mod task;
pub mod user_profile;
pub mod workflow_execution;

#[cfg(feature = "server")]
pub mod config;
