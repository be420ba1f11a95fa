use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use chrono::Utc;
use tera::Tera;

use servicehub::auth::encode_token;
use servicehub::domain::auth::AuthenticatedUser;
use servicehub::middleware::RedirectUnauthorized;
use servicehub::models::config::{ServerConfig, WorkflowConfig};
use servicehub::repository::DieselRepository;
use servicehub::routes::auth::{callback, not_assigned, signin};
use servicehub::routes::customers::list_customers;

mod common;

const SECRET: &str = "auth-flow-test-secret";

fn server_config() -> ServerConfig {
    ServerConfig {
        domain: "hub.local".into(),
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

fn token(sub: &str, email: &str) -> String {
    let claims = AuthenticatedUser {
        sub: sub.into(),
        email: email.into(),
        name: "Test User".into(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode_token(&claims, SECRET).unwrap()
}

fn cookies_of<B>(resp: &ServiceResponse<B>) -> Vec<Cookie<'static>> {
    // Like a browser, drop cookies the response asks to delete (`Max-Age=0`).
    resp.response()
        .cookies()
        .filter(|c| c.max_age() != Some(actix_web::cookie::time::Duration::ZERO))
        .map(|c| c.into_owned())
        .collect()
}

fn location_of<B>(resp: &ServiceResponse<B>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn get_with_cookies(uri: &str, cookies: &[Cookie<'static>]) -> test::TestRequest {
    cookies
        .iter()
        .cloned()
        .fold(test::TestRequest::get().uri(uri), |req, cookie| req.cookie(cookie))
}

/// Identity, session and flash middleware wired as in the server.
macro_rules! hub_app {
    ($test_db:expr) => {{
        let key = Key::from(&[7u8; 64][..]);
        let message_store = CookieMessageStore::builder(key.clone()).build();
        test::init_service(
            App::new()
                .wrap(FlashMessagesFramework::builder(message_store).build())
                .wrap(IdentityMiddleware::default())
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new(Tera::new("templates/**/*").unwrap()))
                .app_data(web::Data::new(DieselRepository::new($test_db.pool())))
                .app_data(web::Data::new(server_config()))
                .service(signin)
                .service(callback)
                .service(not_assigned)
                .service(
                    web::scope("")
                        .wrap(RedirectUnauthorized)
                        .service(list_customers),
                ),
        )
        .await
    }};
}

#[actix_web::test]
async fn signin_sends_the_callback_with_port_to_the_provider() {
    let test_db = common::TestDb::new("flow_signin.db");
    let app = hub_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/auth/signin")
        .insert_header((header::HOST, "hub.local:8080"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location_of(&resp),
        "http://auth.local/signin?next=http%3A%2F%2Fhub.local%3A8080%2Fauth%2Fcallback"
    );
}

#[actix_web::test]
async fn valid_callback_signs_in_and_opens_staff_pages() {
    let test_db = common::TestDb::new("flow_valid_callback.db");
    let app = hub_app!(test_db);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/auth/callback?token={}",
            token("auth|boss", "boss@example.com")
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&resp), "/");
    let cookies = cookies_of(&resp);
    assert!(!cookies.is_empty());

    let resp = test::call_service(&app, get_with_cookies("/customers", &cookies).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn rejected_callback_flashes_and_lands_on_not_assigned() {
    let test_db = common::TestDb::new("flow_bad_callback.db");
    let app = hub_app!(test_db);

    let req = test::TestRequest::get()
        .uri("/auth/callback?token=forged.token.value")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&resp), "/na");
    let cookies = cookies_of(&resp);

    let resp = test::call_service(&app, get_with_cookies("/na", &cookies).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("Sign-in failed."));
    assert!(body.contains("alert-danger"));
}

#[actix_web::test]
async fn anonymous_visitors_are_sent_to_signin() {
    let test_db = common::TestDb::new("flow_anonymous.db");
    let app = hub_app!(test_db);

    let req = test::TestRequest::get().uri("/customers").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&resp), "/auth/signin");
}

#[actix_web::test]
async fn customers_are_turned_away_from_staff_pages() {
    let test_db = common::TestDb::new("flow_customer_role.db");
    let app = hub_app!(test_db);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/auth/callback?token={}",
            token("auth|client", "client@example.com")
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let cookies = cookies_of(&resp);

    let resp = test::call_service(&app, get_with_cookies("/customers", &cookies).to_request()).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_of(&resp), "/na");
}
