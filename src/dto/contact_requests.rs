use serde::{Deserialize, Serialize};

use crate::domain::contact_request::ContactRequest;
use crate::domain::customer::Customer;
use crate::domain::user_profile::UserProfile;
use crate::dto::StatusCount;
use crate::pagination::Paginated;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestIndexQuery {
    pub status: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RequestsPageData {
    pub requests: Paginated<ContactRequest>,
    pub counts: Vec<StatusCount>,
    pub status: Option<String>,
    pub staff: Vec<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct RequestPageData {
    pub request: ContactRequest,
    pub staff: Vec<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct ConvertedRequest {
    pub request: ContactRequest,
    pub customer: Customer,
}
