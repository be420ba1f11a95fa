use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::Utc;
use serde_json::{Value, json};

use servicehub::auth::encode_token;
use servicehub::domain::auth::AuthenticatedUser;
use servicehub::models::config::{ServerConfig, WorkflowConfig};
use servicehub::repository::DieselRepository;
use servicehub::routes::api::api_scope;
use servicehub::workflow::HttpWorkflowEngine;

mod common;

const SECRET: &str = "integration-test-secret";

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 8080,
        database_url: String::new(),
        templates_dir: "templates/**/*".into(),
        secret: SECRET.into(),
        auth_service_url: "http://auth.local/signin".into(),
        admin_emails: vec!["boss@example.com".into()],
        workflow: WorkflowConfig {
            base_url: "http://engine.local".into(),
            api_key: String::new(),
            timeout_secs: 1,
            poll_interval_secs: 5,
        },
    }
}

fn bearer(sub: &str, email: &str) -> (header::HeaderName, String) {
    let claims = AuthenticatedUser {
        sub: sub.into(),
        email: email.into(),
        name: "Test User".into(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode_token(&claims, SECRET).unwrap();
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

macro_rules! api_app {
    ($test_db:expr) => {
        test::init_service(
            App::new()
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(
                        CookieSessionStore::default(),
                        Key::from(&[7u8; 64][..]),
                    )
                    .cookie_secure(false)
                    .build(),
                )
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .app_data(web::Data::new(server_config()))
                .app_data(web::Data::new(
                    HttpWorkflowEngine::new(&server_config().workflow).unwrap(),
                ))
                .service(api_scope()),
        )
        .await
    };
}

#[actix_web::test]
async fn unauthenticated_requests_get_error_envelope() {
    let test_db = common::TestDb::new("api_unauthenticated.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/stats")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("UNAUTHORIZED"));
}

#[actix_web::test]
async fn invalid_token_is_rejected() {
    let test_db = common::TestDb::new("api_invalid_token.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/tasks")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn public_contact_request_intake() {
    let test_db = common::TestDb::new("api_contact_intake.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::post()
        .uri("/api/v1/contact-requests")
        .set_json(json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "subject": "Quote",
            "message": "Please send a quote."
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["status"], json!("new"));
    assert_eq!(body["data"]["email"], json!("jane@example.com"));

    let req = test::TestRequest::post()
        .uri("/api/v1/contact-requests")
        .set_json(json!({
            "name": "Jane Doe",
            "email": "not-an-email",
            "subject": "Quote",
            "message": "Hi"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], json!("VALIDATION_ERROR"));
}

#[actix_web::test]
async fn customers_cannot_read_crm_data() {
    let test_db = common::TestDb::new("api_customer_forbidden.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/customers")
        .insert_header(bearer("auth|customer", "client@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], json!("FORBIDDEN"));
}

#[actix_web::test]
async fn dashboard_stats_follow_the_role() {
    let test_db = common::TestDb::new("api_dashboard.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/stats")
        .insert_header(bearer("auth|boss", "boss@example.com"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["role"], json!("admin"));
    assert_eq!(body["data"]["customers"], json!(0));

    let req = test::TestRequest::get()
        .uri("/api/v1/dashboard/stats")
        .insert_header(bearer("auth|client", "client@example.com"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["role"], json!("customer"));
    assert_eq!(body["data"]["open_tickets"], json!(0));
}

#[actix_web::test]
async fn oversized_page_numbers_return_an_empty_page() {
    let test_db = common::TestDb::new("api_oversized_page.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/customers?page={}", usize::MAX))
        .insert_header(bearer("auth|boss", "boss@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
}

#[actix_web::test]
async fn malformed_path_ids_get_error_envelope() {
    let test_db = common::TestDb::new("api_malformed_path.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/automation/executions/abc")
        .insert_header(bearer("auth|boss", "boss@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}

#[actix_web::test]
async fn unknown_api_paths_get_error_envelope() {
    let test_db = common::TestDb::new("api_unknown_path.db");
    let app = api_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/api/v1/nothing-here")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("NOT_FOUND"));
}
