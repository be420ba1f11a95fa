//! HTTP server wiring.

use actix_cors::Cors;
use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use tera::Tera;

use crate::db::establish_connection_pool;
use crate::middleware::RedirectUnauthorized;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::api::api_scope;
use crate::routes::auth::{callback, logout, not_assigned, not_found, signin};
use crate::routes::automation::{
    show_automation, show_execution, show_history, stop_execution, trigger_workflow,
};
use crate::routes::contact_requests::{
    assign_request, change_request_status, convert_request, export_requests, list_requests,
    show_request,
};
use crate::routes::customers::{
    add_customer, assign_customer, delete_customer, export_customers, list_customers,
    save_customer, show_customer, upload_customers,
};
use crate::routes::landing_pages::{
    delete_landing_page, generate_landing_page, list_landing_pages, publish_landing_page,
    show_public_page, submit_public_contact, unpublish_landing_page,
};
use crate::routes::legal::{
    edit_legal_document, legal_index, save_legal_document, show_legal_document,
};
use crate::routes::main::show_index;
use crate::routes::tasks::{
    add_task, assign_task, change_task_status, comment_task, list_tasks, show_task, take_task,
};
use crate::routes::users::{change_role, list_users};
use crate::workflow::HttpWorkflowEngine;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    let engine = HttpWorkflowEngine::new(&server_config.workflow).map_err(|e| {
        std::io::Error::other(format!("Failed to build workflow engine client: {e}"))
    })?;
    let engine = web::Data::new(engine);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes()).map_err(|e| {
        std::io::Error::other(format!("Secret must be at least 64 bytes long: {e}"))
    })?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting server on {}:{} (workflow engine at {})",
        bind_address.0,
        bind_address.1,
        server_config.workflow.base_url
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(signin)
            .service(callback)
            .service(not_assigned)
            .service(show_public_page)
            .service(submit_public_contact)
            .service(show_legal_document)
            .service(api_scope())
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(list_customers)
                    .service(export_customers)
                    .service(upload_customers)
                    .service(add_customer)
                    .service(show_customer)
                    .service(save_customer)
                    .service(delete_customer)
                    .service(assign_customer)
                    .service(list_requests)
                    .service(export_requests)
                    .service(show_request)
                    .service(change_request_status)
                    .service(assign_request)
                    .service(convert_request)
                    .service(list_tasks)
                    .service(add_task)
                    .service(show_task)
                    .service(change_task_status)
                    .service(assign_task)
                    .service(take_task)
                    .service(comment_task)
                    .service(list_landing_pages)
                    .service(generate_landing_page)
                    .service(publish_landing_page)
                    .service(unpublish_landing_page)
                    .service(delete_landing_page)
                    .service(legal_index)
                    .service(edit_legal_document)
                    .service(save_legal_document)
                    .service(list_users)
                    .service(change_role)
                    .service(show_automation)
                    .service(trigger_workflow)
                    .service(show_history)
                    .service(show_execution)
                    .service(stop_execution)
                    .service(logout),
            )
            .default_service(web::to(not_found))
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(engine.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
