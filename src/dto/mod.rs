//! DTO modules that bridge services with templates and APIs.

use serde::Serialize;

pub mod automation;
pub mod contact_requests;
pub mod customers;
pub mod dashboard;
pub mod landing_pages;
pub mod legal;
pub mod tasks;

/// Number of rows in one status bucket.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

impl StatusCount {
    /// Expands sparse counts to one entry per status in `all`, in that order.
    pub fn complete<S>(all: &[S], counts: &[(S, usize)]) -> Vec<Self>
    where
        S: Copy + PartialEq + std::fmt::Display,
    {
        all.iter()
            .map(|status| StatusCount {
                status: status.to_string(),
                count: counts
                    .iter()
                    .find(|(s, _)| s == status)
                    .map_or(0, |(_, count)| *count),
            })
            .collect()
    }
}

/// Paging parameters shared by list endpoints.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}
