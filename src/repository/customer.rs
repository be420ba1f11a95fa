use std::collections::BTreeSet;

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerId, EmailAddress, ProfileId};
use crate::domain::user_profile::UserProfile;
use crate::models::customer::{
    Customer as DbCustomer, CustomerAssignment as DbCustomerAssignment,
    NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
};
use crate::models::user_profile::UserProfile as DbUserProfile;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CustomerListQuery, CustomerReader, CustomerWriter, DieselRepository, into_domain,
};

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(&self, id: CustomerId) -> RepositoryResult<Option<Customer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let customer = customers::table
            .find(id.get())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_customer_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<Customer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let customer = customers::table
            .filter(customers::email.eq(email.as_str()))
            .order(customers::id.asc())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        customer
            .map(Customer::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)> {
        use crate::schema::{customer_assignments, customers};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = customers::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(profile_id) = query.assigned_to {
                let assigned = customer_assignments::table
                    .filter(customer_assignments::profile_id.eq(profile_id.get()))
                    .select(customer_assignments::customer_id);
                items = items.filter(customers::id.eq_any(assigned));
            }

            if let Some(term) = &query.search {
                let pattern = format!("%{term}%");
                items = items.filter(
                    customers::name
                        .like(pattern.clone())
                        .or(customers::email.like(pattern.clone()))
                        .or(customers::phone.like(pattern.clone()))
                        .or(customers::company.like(pattern)),
                );
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

        let db_customers = items
            .order(customers::name.asc())
            .then_order_by(customers::id.asc())
            .load::<DbCustomer>(&mut conn)?;

        Ok((total, into_domain(db_customers)?))
    }

    fn list_customer_assignees(&self, id: CustomerId) -> RepositoryResult<Vec<UserProfile>> {
        use crate::schema::{customer_assignments, user_profiles};

        let mut conn = self.conn()?;

        let profiles = user_profiles::table
            .inner_join(customer_assignments::table)
            .filter(customer_assignments::customer_id.eq(id.get()))
            .select(DbUserProfile::as_select())
            .order(user_profiles::name.asc())
            .load::<DbUserProfile>(&mut conn)?;

        into_domain(profiles)
    }

    fn is_customer_assigned(
        &self,
        customer_id: CustomerId,
        profile_id: ProfileId,
    ) -> RepositoryResult<bool> {
        use crate::schema::customer_assignments;

        let mut conn = self.conn()?;

        let count = customer_assignments::table
            .filter(customer_assignments::customer_id.eq(customer_id.get()))
            .filter(customer_assignments::profile_id.eq(profile_id.get()))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count > 0)
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let db_new_customer: DbNewCustomer = new_customer.into();

        let db_customer = diesel::insert_into(customers::table)
            .values(&db_new_customer)
            .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(db_customer).map_err(RepositoryError::from)
    }

    fn create_customers(&self, new_customers: &[NewCustomer]) -> RepositoryResult<usize> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        if new_customers.is_empty() {
            return Ok(0);
        }

        let insertables: Vec<DbNewCustomer> = new_customers.iter().map(Into::into).collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(customers::table)
                .values(&insertables)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }

    fn update_customer(
        &self,
        id: CustomerId,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let db_updates = DbUpdateCustomer::from_domain(updates, Utc::now().naive_utc());

        let db_customer = diesel::update(customers::table.find(id.get()))
            .set(&db_updates)
            .get_result::<DbCustomer>(&mut conn)?;

        Customer::try_from(db_customer).map_err(RepositoryError::from)
    }

    fn delete_customer(&self, id: CustomerId) -> RepositoryResult<()> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let deleted = diesel::delete(customers::table.find(id.get())).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn set_customer_assignees(
        &self,
        id: CustomerId,
        profile_ids: &[ProfileId],
    ) -> RepositoryResult<usize> {
        use crate::schema::customer_assignments;

        let mut conn = self.conn()?;

        let unique: BTreeSet<ProfileId> = profile_ids.iter().copied().collect();
        let assignments: Vec<DbCustomerAssignment> = unique
            .into_iter()
            .map(|profile_id| DbCustomerAssignment {
                customer_id: id.get(),
                profile_id: profile_id.get(),
            })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(
                customer_assignments::table.filter(customer_assignments::customer_id.eq(id.get())),
            )
            .execute(conn)?;

            if assignments.is_empty() {
                return Ok(0);
            }
            diesel::insert_into(customer_assignments::table)
                .values(&assignments)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }
}
