use std::sync::{Arc, Mutex};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::{Value, json};

use servicehub::models::config::WorkflowConfig;
use servicehub::workflow::{HttpWorkflowEngine, WorkflowEngine};

#[derive(Clone, Debug)]
struct Received {
    method: String,
    path: String,
    query: Option<String>,
    api_key: Option<String>,
}

type Inbox = Arc<Mutex<Vec<Received>>>;

async fn record(req: HttpRequest, inbox: web::Data<Inbox>) -> HttpResponse {
    let path = req.uri().path().to_string();
    inbox.lock().unwrap().push(Received {
        method: req.method().to_string(),
        path: path.clone(),
        query: req.uri().query().map(str::to_string),
        api_key: req
            .headers()
            .get("x-n8n-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    let body: Value = if path.ends_with("/chat") {
        json!({ "output": "Hello!" })
    } else if path.ends_with("/run") {
        json!({ "executionId": 42 })
    } else if path.ends_with("/workflows") {
        json!({ "data": [] })
    } else {
        json!({})
    };
    HttpResponse::Ok().json(body)
}

/// Starts a local engine stand-in and returns its base url.
async fn start_engine() -> (String, Inbox) {
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    let data = web::Data::new(inbox.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .default_service(web::to(record))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{addr}"), inbox)
}

fn engine(base_url: &str) -> HttpWorkflowEngine {
    HttpWorkflowEngine::new(&WorkflowConfig {
        base_url: base_url.to_string(),
        api_key: "SECRET-KEY".into(),
        timeout_secs: 5,
        poll_interval_secs: 10,
    })
    .unwrap()
}

fn last(inbox: &Inbox) -> Received {
    inbox.lock().unwrap().last().cloned().unwrap()
}

#[actix_web::test]
async fn chat_ids_stay_inside_the_webhook_path() {
    let (base_url, inbox) = start_engine().await;
    let engine = engine(&base_url);

    engine
        .chat("../api/v1/executions/5/stop?x=", "s-1", "hi")
        .await
        .unwrap();

    let received = last(&inbox);
    assert_eq!(received.method, "POST");
    assert!(received.path.starts_with("/webhook/"));
    assert!(received.path.ends_with("/chat"));
    assert_eq!(received.path.matches('/').count(), 3);
    assert_eq!(received.query, None);
}

#[actix_web::test]
async fn webhook_calls_do_not_carry_the_api_key() {
    let (base_url, inbox) = start_engine().await;
    let engine = engine(&base_url);

    let reply = engine.chat("agent", "s-1", "hi").await.unwrap();

    let received = last(&inbox);
    assert_eq!(reply, "Hello!");
    assert_eq!(received.path, "/webhook/agent/chat");
    assert_eq!(received.api_key, None);
}

#[actix_web::test]
async fn api_calls_are_authorized() {
    let (base_url, inbox) = start_engine().await;
    let engine = engine(&base_url);

    let execution_id = engine.run_workflow("wf-1", &json!({})).await.unwrap();
    let received = last(&inbox);
    assert_eq!(execution_id, "42");
    assert_eq!(received.path, "/api/v1/workflows/wf-1/run");
    assert_eq!(received.api_key.as_deref(), Some("SECRET-KEY"));

    engine.stop_execution("5").await.unwrap();
    let received = last(&inbox);
    assert_eq!(received.path, "/api/v1/executions/5/stop");
    assert_eq!(received.api_key.as_deref(), Some("SECRET-KEY"));
}

#[actix_web::test]
async fn base_url_path_prefix_is_kept() {
    let (base_url, inbox) = start_engine().await;
    let engine = engine(&format!("{base_url}/n8n/"));

    engine.list_workflows().await.unwrap();

    assert_eq!(last(&inbox).path, "/n8n/api/v1/workflows");
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = HttpWorkflowEngine::new(&WorkflowConfig {
        base_url: "not a url".into(),
        api_key: String::new(),
        timeout_secs: 5,
        poll_interval_secs: 10,
    });

    assert!(result.is_err());
}
