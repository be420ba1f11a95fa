//! CRM customer pages.

use actix_multipart::form::MultipartForm;
use actix_web::http::header;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::CurrentUser;
use crate::dto::customers::CustomerIndexQuery;
use crate::forms::customers::{AssignCustomerForm, CustomerForm, UploadCustomersForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, flash_error_redirect, redirect, render_template};
use crate::services::{ServiceError, customers as customers_service};

#[get("/customers")]
pub async fn list_customers(
    current: CurrentUser,
    params: web::Query<CustomerIndexQuery>,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match customers_service::list_customers(repo.get_ref(), user, params.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "customers",
                &server_config.auth_service_url,
            );
            context.insert("customers", &data.customers);
            context.insert("search_query", &data.search);
            context.insert("total", &data.total);
            render_template(&tera, "customers/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Insufficient permissions.").send();
            redirect("/na")
        }
        Err(err) => {
            log::error!("Failed to list customers: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/customers/export.csv")]
pub async fn export_customers(
    current: CurrentUser,
    params: web::Query<CustomerIndexQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers_service::export_customers_csv(
        repo.get_ref(),
        current.profile(),
        params.into_inner().search,
    ) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"customers.csv\"",
            ))
            .body(csv),
        Err(err) => flash_error_redirect(err, "/customers", "Failed to export customers"),
    }
}

#[post("/customers/upload")]
pub async fn upload_customers(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadCustomersForm>,
) -> impl Responder {
    match customers_service::import_customers(repo.get_ref(), current.profile(), &mut form) {
        Ok(created) => {
            FlashMessage::success(format!("Imported {created} customers.")).send();
            redirect("/customers")
        }
        Err(err) => flash_error_redirect(err, "/customers", "Failed to import customers"),
    }
}

#[post("/customers/add")]
pub async fn add_customer(
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CustomerForm>,
) -> impl Responder {
    match customers_service::create_customer(repo.get_ref(), current.profile(), form) {
        Ok(customer) => {
            FlashMessage::success("Customer added.").send();
            redirect(&format!("/customers/{}", customer.id))
        }
        Err(err) => flash_error_redirect(err, "/customers", "Failed to add customer"),
    }
}

#[get("/customers/{customer_id}")]
pub async fn show_customer(
    customer_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let user = current.profile();

    match customers_service::show_customer(repo.get_ref(), user, customer_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                Some(user),
                "customers",
                &server_config.auth_service_url,
            );
            context.insert("customer", &data.customer);
            context.insert("assignees", &data.assignees);
            context.insert("staff", &data.staff);
            render_template(&tera, "customers/show.html", &context)
        }
        Err(err) => flash_error_redirect(err, "/customers", "Failed to load customer"),
    }
}

#[post("/customers/{customer_id}/save")]
pub async fn save_customer(
    customer_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<CustomerForm>,
) -> impl Responder {
    let customer_id = customer_id.into_inner();
    let back = format!("/customers/{customer_id}");

    match customers_service::update_customer(repo.get_ref(), current.profile(), customer_id, form)
    {
        Ok(_) => {
            FlashMessage::success("Customer updated.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to update customer"),
    }
}

#[post("/customers/{customer_id}/delete")]
pub async fn delete_customer(
    customer_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers_service::delete_customer(repo.get_ref(), current.profile(), *customer_id) {
        Ok(()) => {
            FlashMessage::success("Customer deleted.").send();
            redirect("/customers")
        }
        Err(err) => flash_error_redirect(err, "/customers", "Failed to delete customer"),
    }
}

#[post("/customers/{customer_id}/assign")]
pub async fn assign_customer(
    customer_id: web::Path<i32>,
    current: CurrentUser,
    repo: web::Data<DieselRepository>,
    body: web::Bytes,
) -> impl Responder {
    let customer_id = customer_id.into_inner();
    let back = format!("/customers/{customer_id}");

    let form = match AssignCustomerForm::from_bytes(&body) {
        Ok(form) => form,
        Err(err) => {
            FlashMessage::error(err.to_string()).send();
            return redirect(&back);
        }
    };

    match customers_service::assign_customer(repo.get_ref(), current.profile(), customer_id, form)
    {
        Ok(_) => {
            FlashMessage::success("Assignees updated.").send();
            redirect(&back)
        }
        Err(err) => flash_error_redirect(err, &back, "Failed to assign customer"),
    }
}
