//! Identity asserted by the hosted auth provider.

use serde::{Deserialize, Serialize};

/// Claims carried by the session token issued by the auth service.
///
/// The token only proves who the caller is. What the caller may do is decided
/// by the role on the matching [`crate::domain::user_profile::UserProfile`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Stable subject identifier assigned by the auth provider.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Expiry as a unix timestamp.
    pub exp: usize,
}
