use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};
use crate::domain::types::{
    ContactRequestId, CustomerId, CustomerName, EmailAddress, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
/// Diesel model for [`crate::domain::customer::Customer`].
pub struct Customer {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub source_request_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
/// Insertable form of [`Customer`].
pub struct NewCustomer<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub source_request_id: Option<i32>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Customer`] record.
pub struct UpdateCustomer<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::customer_assignments)]
/// Association table linking customers to the staff profiles working them.
pub struct CustomerAssignment {
    pub customer_id: i32,
    pub profile_id: i32,
}

impl TryFrom<Customer> for DomainCustomer {
    type Error = TypeConstraintError;

    fn try_from(customer: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::new(customer.id)?,
            name: CustomerName::new(customer.name)?,
            email: customer.email.map(EmailAddress::new).transpose()?,
            phone: customer.phone.map(PhoneNumber::new).transpose()?,
            company: customer.company,
            notes: customer.notes,
            source_request_id: customer
                .source_request_id
                .map(ContactRequestId::new)
                .transpose()?,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(customer: &'a DomainNewCustomer) -> Self {
        Self {
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(EmailAddress::as_str),
            phone: customer.phone.as_ref().map(PhoneNumber::as_str),
            company: customer.company.as_deref(),
            notes: customer.notes.as_deref(),
            source_request_id: customer.source_request_id.map(ContactRequestId::get),
        }
    }
}

impl<'a> UpdateCustomer<'a> {
    pub fn from_domain(customer: &'a DomainUpdateCustomer, updated_at: NaiveDateTime) -> Self {
        Self {
            name: customer.name.as_str(),
            email: customer.email.as_ref().map(EmailAddress::as_str),
            phone: customer.phone.as_ref().map(PhoneNumber::as_str),
            company: customer.company.as_deref(),
            notes: customer.notes.as_deref(),
            updated_at,
        }
    }
}
