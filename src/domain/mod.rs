//! Domain aggregates exposed by the service layer.

pub mod auth;
pub mod contact_request;
pub mod customer;
pub mod landing_page;
pub mod legal_document;
pub mod task;
pub mod types;
pub mod user_profile;
pub mod workflow;
