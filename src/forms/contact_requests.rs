use serde::Deserialize;
use validator::Validate;

use crate::domain::contact_request::NewContactRequest;
use crate::domain::types::{ContactRequestStatus, ProfileId};
use crate::forms::{FormError, non_blank, parse_optional_id};

/// Source tag for requests submitted through the JSON API.
pub const API_SOURCE: &str = "api";

#[derive(Debug, Deserialize, Validate)]
/// Public contact form, shared by the JSON API and landing pages.
pub struct ContactRequestForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub subject: String,
    #[validate(length(min = 1, max = 10000))]
    pub message: String,
}

impl ContactRequestForm {
    pub fn into_new_request(self, source: &str) -> Result<NewContactRequest, FormError> {
        self.validate()?;
        Ok(NewContactRequest::try_new(
            self.name,
            self.email,
            non_blank(self.phone),
            self.company,
            self.subject,
            self.message,
            source,
        )?)
    }
}

#[derive(Debug, Deserialize)]
pub struct RequestStatusForm {
    pub status: String,
}

impl RequestStatusForm {
    pub fn status(&self) -> Result<ContactRequestStatus, FormError> {
        self.status.parse().map_err(|_| FormError::InvalidStatus)
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRequestForm {
    #[serde(default)]
    pub assignee_id: Option<String>,
}

impl AssignRequestForm {
    pub fn assignee(&self) -> Result<Option<ProfileId>, FormError> {
        parse_optional_id(self.assignee_id.as_deref())?
            .map(ProfileId::new)
            .transpose()
            .map_err(FormError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str) -> ContactRequestForm {
        ContactRequestForm {
            name: "Jane Roe".into(),
            email: email.into(),
            phone: Some("".into()),
            company: None,
            subject: "Quote".into(),
            message: "<b>Hi</b><script>x</script>".into(),
        }
    }

    #[test]
    fn valid_form_becomes_request() {
        let request = form("jane@example.com").into_new_request("landing:acme").unwrap();
        assert_eq!(request.source, "landing:acme");
        assert_eq!(request.phone, None);
        assert_eq!(request.message.as_str(), "<b>Hi</b>");
    }

    #[test]
    fn malformed_email_is_a_validation_error() {
        let err = form("jane").into_new_request(API_SOURCE).unwrap_err();
        assert!(matches!(err, FormError::Validation(_)));
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn blank_assignee_unassigns() {
        let form = AssignRequestForm {
            assignee_id: Some(String::new()),
        };
        assert_eq!(form.assignee().unwrap(), None);
    }
}
