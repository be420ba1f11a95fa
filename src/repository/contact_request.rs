use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::contact_request::{ContactRequest, NewContactRequest};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::types::{ContactRequestId, ContactRequestStatus, ProfileId};
use crate::models::contact_request::{
    ContactRequest as DbContactRequest, NewContactRequest as DbNewContactRequest,
};
use crate::models::customer::{Customer as DbCustomer, NewCustomer as DbNewCustomer};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ContactRequestListQuery, ContactRequestReader, ContactRequestWriter, DieselRepository,
    into_domain, status_counts,
};

impl ContactRequestReader for DieselRepository {
    fn get_contact_request_by_id(
        &self,
        id: ContactRequestId,
    ) -> RepositoryResult<Option<ContactRequest>> {
        use crate::schema::contact_requests;

        let mut conn = self.conn()?;

        let request = contact_requests::table
            .find(id.get())
            .first::<DbContactRequest>(&mut conn)
            .optional()?;

        request
            .map(ContactRequest::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_contact_requests(
        &self,
        query: ContactRequestListQuery,
    ) -> RepositoryResult<(usize, Vec<ContactRequest>)> {
        use crate::schema::contact_requests;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = contact_requests::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(status) = query.status {
                items = items.filter(contact_requests::status.eq(status.as_str()));
            }
            if let Some(assignee) = query.assignee {
                items = items.filter(contact_requests::assignee_id.eq(assignee.get()));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let db_requests = items
            .order(contact_requests::created_at.desc())
            .then_order_by(contact_requests::id.desc())
            .load::<DbContactRequest>(&mut conn)?;

        Ok((total, into_domain(db_requests)?))
    }

    fn count_contact_requests_by_status(
        &self,
        assignee: Option<ProfileId>,
    ) -> RepositoryResult<Vec<(ContactRequestStatus, usize)>> {
        use crate::schema::contact_requests;
        use diesel::dsl::count_star;

        let mut conn = self.conn()?;

        let rows = match assignee {
            Some(assignee) => contact_requests::table
                .filter(contact_requests::assignee_id.eq(assignee.get()))
                .group_by(contact_requests::status)
                .select((contact_requests::status, count_star()))
                .load::<(String, i64)>(&mut conn)?,
            None => contact_requests::table
                .group_by(contact_requests::status)
                .select((contact_requests::status, count_star()))
                .load::<(String, i64)>(&mut conn)?,
        };

        Ok(status_counts(rows))
    }
}

impl ContactRequestWriter for DieselRepository {
    fn create_contact_request(
        &self,
        new_request: &NewContactRequest,
    ) -> RepositoryResult<ContactRequest> {
        use crate::schema::contact_requests;

        let mut conn = self.conn()?;

        let db_new_request: DbNewContactRequest = new_request.into();

        let db_request = diesel::insert_into(contact_requests::table)
            .values(&db_new_request)
            .get_result::<DbContactRequest>(&mut conn)?;

        ContactRequest::try_from(db_request).map_err(RepositoryError::from)
    }

    fn update_contact_request_status(
        &self,
        id: ContactRequestId,
        status: ContactRequestStatus,
        responded_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<ContactRequest> {
        use crate::schema::contact_requests;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let target = contact_requests::table.find(id.get());

        let db_request = match responded_at {
            Some(responded_at) => diesel::update(target)
                .set((
                    contact_requests::status.eq(status.as_str()),
                    contact_requests::responded_at.eq(responded_at),
                    contact_requests::updated_at.eq(now),
                ))
                .get_result::<DbContactRequest>(&mut conn)?,
            None => diesel::update(target)
                .set((
                    contact_requests::status.eq(status.as_str()),
                    contact_requests::updated_at.eq(now),
                ))
                .get_result::<DbContactRequest>(&mut conn)?,
        };

        ContactRequest::try_from(db_request).map_err(RepositoryError::from)
    }

    fn assign_contact_request(
        &self,
        id: ContactRequestId,
        assignee: Option<ProfileId>,
    ) -> RepositoryResult<ContactRequest> {
        use crate::schema::contact_requests;

        let mut conn = self.conn()?;

        let db_request = diesel::update(contact_requests::table.find(id.get()))
            .set((
                contact_requests::assignee_id.eq(assignee.map(ProfileId::get)),
                contact_requests::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbContactRequest>(&mut conn)?;

        ContactRequest::try_from(db_request).map_err(RepositoryError::from)
    }

    fn convert_contact_request(
        &self,
        id: ContactRequestId,
        new_customer: &NewCustomer,
    ) -> RepositoryResult<(ContactRequest, Customer)> {
        use crate::schema::{contact_requests, customers};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let (db_request, db_customer) = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let existing = match new_customer.email.as_ref() {
                Some(email) => customers::table
                    .filter(customers::email.eq(email.as_str()))
                    .order(customers::id.asc())
                    .first::<DbCustomer>(conn)
                    .optional()?,
                None => None,
            };

            let db_customer = match existing {
                Some(customer) => customer,
                None => {
                    let insertable: DbNewCustomer = new_customer.into();
                    diesel::insert_into(customers::table)
                        .values(&insertable)
                        .get_result::<DbCustomer>(conn)?
                }
            };

            let db_request = diesel::update(contact_requests::table.find(id.get()))
                .set((
                    contact_requests::status.eq(ContactRequestStatus::Converted.as_str()),
                    contact_requests::customer_id.eq(Some(db_customer.id)),
                    contact_requests::updated_at.eq(now),
                ))
                .get_result::<DbContactRequest>(conn)?;

            Ok((db_request, db_customer))
        })?;

        let request = ContactRequest::try_from(db_request).map_err(RepositoryError::from)?;
        let customer = Customer::try_from(db_customer).map_err(RepositoryError::from)?;

        Ok((request, customer))
    }
}
