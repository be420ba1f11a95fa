//! CRM customer workflows.

use crate::domain::customer::{Customer, NewCustomer, UpdateCustomer};
use crate::domain::types::{CustomerId, Role};
use crate::domain::user_profile::UserProfile;
use crate::dto::customers::{CustomerIndexQuery, CustomerPageData, CustomersPageData};
use crate::forms::customers::{AssignCustomerForm, CSV_HEADER, CustomerForm, UploadCustomersForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{CustomerListQuery, CustomerReader, CustomerWriter, UserProfileReader};
use crate::services::access::{ensure_admin, ensure_staff};
use crate::services::{ServiceError, ServiceResult, log_failure};

fn visible_query(actor: &UserProfile, search: Option<String>) -> CustomerListQuery {
    let mut query = CustomerListQuery::default();
    if actor.role == Role::Employee {
        query = query.assigned_to(actor.id);
    }
    if let Some(term) = search {
        query = query.search(term);
    }
    query
}

fn normalized_search(search: Option<String>) -> Option<String> {
    search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Loads a customer the actor may see. Employees only see assigned customers.
fn load_visible<R>(repo: &R, actor: &UserProfile, customer_id: i32) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    ensure_staff(actor)?;

    let customer_id = CustomerId::new(customer_id)?;

    let customer = repo
        .get_customer_by_id(customer_id)
        .map_err(log_failure("Failed to load customer"))?
        .ok_or(ServiceError::NotFound)?;

    if actor.role == Role::Employee && !repo.is_customer_assigned(customer_id, actor.id)? {
        return Err(ServiceError::Unauthorized);
    }

    Ok(customer)
}

/// Lists customers visible to the actor with optional search.
pub fn list_customers<R>(
    repo: &R,
    actor: &UserProfile,
    query: CustomerIndexQuery,
) -> ServiceResult<CustomersPageData>
where
    R: CustomerReader + ?Sized,
{
    ensure_staff(actor)?;

    let page = query.page.unwrap_or(1).max(1);
    let search = normalized_search(query.search);

    let (total, customers) = repo
        .list_customers(
            visible_query(actor, search.clone()).paginate(page, DEFAULT_ITEMS_PER_PAGE),
        )
        .map_err(log_failure("Failed to list customers"))?;

    Ok(CustomersPageData {
        customers: Paginated::from_total(customers, page, total, DEFAULT_ITEMS_PER_PAGE),
        search,
        total,
    })
}

pub fn show_customer<R>(
    repo: &R,
    actor: &UserProfile,
    customer_id: i32,
) -> ServiceResult<CustomerPageData>
where
    R: CustomerReader + UserProfileReader + ?Sized,
{
    let customer = load_visible(repo, actor, customer_id)?;

    let assignees = repo
        .list_customer_assignees(customer.id)
        .map_err(log_failure("Failed to load customer assignees"))?;

    let staff = if actor.is_admin() {
        repo.list_staff().map_err(log_failure("Failed to load staff"))?
    } else {
        Vec::new()
    };

    Ok(CustomerPageData {
        customer,
        assignees,
        staff,
    })
}

/// Creates a customer. Employees are assigned to the customers they create.
pub fn create_customer<R>(
    repo: &R,
    actor: &UserProfile,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + ?Sized,
{
    ensure_staff(actor)?;

    let new_customer = NewCustomer::try_from(form)?;

    let customer = repo
        .create_customer(&new_customer)
        .map_err(log_failure("Failed to create customer"))?;

    if actor.role == Role::Employee {
        repo.set_customer_assignees(customer.id, &[actor.id])
            .map_err(log_failure("Failed to assign customer"))?;
    }

    Ok(customer)
}

pub fn update_customer<R>(
    repo: &R,
    actor: &UserProfile,
    customer_id: i32,
    form: CustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    let customer = load_visible(repo, actor, customer_id)?;

    let updates = UpdateCustomer::try_from(form)?;

    repo.update_customer(customer.id, &updates)
        .map_err(log_failure("Failed to update customer"))
        .map_err(ServiceError::from)
}

pub fn delete_customer<R>(repo: &R, actor: &UserProfile, customer_id: i32) -> ServiceResult<()>
where
    R: CustomerWriter + ?Sized,
{
    ensure_admin(actor)?;

    repo.delete_customer(CustomerId::new(customer_id)?)
        .map_err(log_failure("Failed to delete customer"))?;

    Ok(())
}

/// Bulk-creates customers from an uploaded CSV file.
pub fn import_customers<R>(
    repo: &R,
    actor: &UserProfile,
    form: &mut UploadCustomersForm,
) -> ServiceResult<usize>
where
    R: CustomerWriter + ?Sized,
{
    ensure_admin(actor)?;

    let customers = form.parse().map_err(|err| {
        log::error!("Failed to parse customers: {err}");
        ServiceError::from(err)
    })?;

    let created = repo
        .create_customers(&customers)
        .map_err(log_failure("Failed to import customers"))?;

    log::info!("{} imported {created} customers", actor.email);

    Ok(created)
}

/// Renders the actor's visible customers as CSV using the import header.
pub fn export_customers_csv<R>(
    repo: &R,
    actor: &UserProfile,
    search: Option<String>,
) -> ServiceResult<String>
where
    R: CustomerReader + ?Sized,
{
    ensure_staff(actor)?;

    let (_, customers) = repo
        .list_customers(visible_query(actor, normalized_search(search)))
        .map_err(log_failure("Failed to list customers"))?;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let write_err = |e: csv::Error| ServiceError::Internal(format!("CSV export failed: {e}"));

    writer.write_record(CSV_HEADER).map_err(write_err)?;
    for customer in &customers {
        writer
            .write_record([
                customer.name.as_str(),
                customer.email.as_ref().map_or("", |e| e.as_str()),
                customer.phone.as_ref().map_or("", |p| p.as_str()),
                customer.company.as_deref().unwrap_or_default(),
                customer.notes.as_deref().unwrap_or_default(),
            ])
            .map_err(write_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Internal(format!("CSV export failed: {e}")))?;

    String::from_utf8(bytes).map_err(|e| ServiceError::Internal(e.to_string()))
}

/// Replaces the staff assigned to a customer.
pub fn assign_customer<R>(
    repo: &R,
    actor: &UserProfile,
    customer_id: i32,
    form: AssignCustomerForm,
) -> ServiceResult<usize>
where
    R: CustomerReader + CustomerWriter + UserProfileReader + ?Sized,
{
    ensure_admin(actor)?;

    let customer_id = CustomerId::new(customer_id)?;
    let profile_ids = form.profile_ids()?;

    if repo.get_customer_by_id(customer_id)?.is_none() {
        return Err(ServiceError::NotFound);
    }

    let staff = repo.list_staff().map_err(log_failure("Failed to load staff"))?;
    if !profile_ids
        .iter()
        .all(|id| staff.iter().any(|profile| profile.id == *id))
    {
        return Err(ServiceError::Form(
            "Customers can only be assigned to staff".to_string(),
        ));
    }

    repo.set_customer_assignees(customer_id, &profile_ids)
        .map_err(log_failure("Failed to assign customer"))
        .map_err(ServiceError::from)
}
