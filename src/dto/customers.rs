use serde::{Deserialize, Serialize};

use crate::domain::customer::Customer;
use crate::domain::user_profile::UserProfile;
use crate::pagination::Paginated;

/// Query string of the customer list and export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerIndexQuery {
    #[serde(alias = "q")]
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CustomersPageData {
    pub customers: Paginated<Customer>,
    pub search: Option<String>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct CustomerPageData {
    pub customer: Customer,
    pub assignees: Vec<UserProfile>,
    /// Staff available for assignment; empty unless the viewer is an admin.
    pub staff: Vec<UserProfile>,
}
