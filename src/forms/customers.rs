//! Forms for the CRM customer pages.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::domain::types::ProfileId;
use crate::forms::FormError;

/// Header row expected in uploaded customer files.
pub const CSV_HEADER: [&str; 5] = ["name", "email", "phone", "company", "notes"];

#[derive(Debug, Deserialize, Validate)]
/// Create/update form for a customer record.
pub struct CustomerForm {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

impl TryFrom<CustomerForm> for NewCustomer {
    type Error = FormError;

    fn try_from(form: CustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(NewCustomer::try_new(
            form.name,
            form.email,
            form.phone,
            form.company,
            form.notes,
        )?)
    }
}

impl TryFrom<CustomerForm> for UpdateCustomer {
    type Error = FormError;

    fn try_from(form: CustomerForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(UpdateCustomer::try_new(
            form.name,
            form.email,
            form.phone,
            form.company,
            form.notes,
        )?)
    }
}

#[derive(MultipartForm)]
pub struct UploadCustomersForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
struct CustomerCsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

impl UploadCustomersForm {
    /// Parses the uploaded file into customers, rejecting the whole file on
    /// the first invalid row.
    pub fn parse(&mut self) -> Result<Vec<NewCustomer>, FormError> {
        let mut raw = String::new();
        self.csv
            .file
            .read_to_string(&mut raw)
            .map_err(|e| FormError::Csv(e.to_string()))?;
        parse_customers_csv(&raw)
    }
}

/// Parses customer rows with the `name,email,phone,company,notes` header.
pub fn parse_customers_csv(raw: &str) -> Result<Vec<NewCustomer>, FormError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FormError::Csv(e.to_string()))?
        .iter()
        .map(str::to_lowercase)
        .collect::<Vec<_>>();
    if headers != CSV_HEADER {
        return Err(FormError::Csv(format!(
            "expected header {}",
            CSV_HEADER.join(",")
        )));
    }

    reader
        .deserialize::<CustomerCsvRow>()
        .enumerate()
        .map(|(index, row)| {
            // Header is line 1.
            let line = index + 2;
            let row = row.map_err(|e| FormError::Csv(format!("line {line}: {e}")))?;
            NewCustomer::try_new(row.name, row.email, row.phone, row.company, row.notes)
                .map_err(|e| FormError::Csv(format!("line {line}: {e}")))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
/// Multi-select of staff profiles assigned to a customer.
pub struct AssignCustomerForm {
    #[serde(default)]
    pub profile_ids: Vec<i32>,
}

impl AssignCustomerForm {
    /// Decodes a urlencoded body where `profile_ids` may repeat.
    pub fn from_bytes(body: &[u8]) -> Result<Self, FormError> {
        serde_html_form::from_bytes(body).map_err(|e| FormError::InvalidPayload(e.to_string()))
    }

    pub fn profile_ids(&self) -> Result<Vec<ProfileId>, FormError> {
        self.profile_ids
            .iter()
            .map(|id| ProfileId::new(*id).map_err(|_| FormError::InvalidId))
            .collect()
    }
}
