use serde::Deserialize;

use crate::domain::types::Role;
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

impl RoleForm {
    pub fn role(&self) -> Result<Role, FormError> {
        self.role.parse().map_err(|_| FormError::InvalidRole)
    }
}
