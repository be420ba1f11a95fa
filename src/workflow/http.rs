use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::models::config::WorkflowConfig;
use crate::workflow::{
    EngineExecution, EngineWorkflow, WorkflowEngine, WorkflowError, WorkflowResult,
};

const API_KEY_HEADER: &str = "X-N8N-API-KEY";

#[derive(Deserialize)]
struct WorkflowList {
    data: Vec<EngineWorkflow>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunResponse {
    execution_id: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    output: Value,
}

/// [`WorkflowEngine`] speaking the engine's public REST API.
///
/// The API key is only sent to `/api/v1` endpoints. Webhook calls go out
/// without it.
#[derive(Clone)]
pub struct HttpWorkflowEngine {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl HttpWorkflowEngine {
    pub fn new(config: &WorkflowConfig) -> WorkflowResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| WorkflowError::InvalidUrl(format!("{}: {err}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(WorkflowError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    /// Appends `segments` to the base url. Each segment is percent-encoded,
    /// so ids can never add path levels or a query.
    fn url(&self, segments: &[&str]) -> WorkflowResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| WorkflowError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn api(&self, request: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.header(API_KEY_HEADER, &self.api_key)
        }
    }

    async fn send(&self, request: RequestBuilder) -> WorkflowResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        log::warn!("Workflow engine responded with {status}: {body}");
        Err(WorkflowError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl WorkflowEngine for HttpWorkflowEngine {
    async fn list_workflows(&self) -> WorkflowResult<Vec<EngineWorkflow>> {
        let url = self.url(&["api", "v1", "workflows"])?;
        let response = self.send(self.api(self.client.get(url))).await?;
        let list = response.json::<WorkflowList>().await?;
        Ok(list.data)
    }

    async fn run_workflow(&self, workflow_id: &str, payload: &Value) -> WorkflowResult<String> {
        let url = self.url(&["api", "v1", "workflows", workflow_id, "run"])?;
        let request = self
            .api(self.client.post(url))
            .json(&json!({ "payload": payload }));

        let run = self.send(request).await?.json::<RunResponse>().await?;

        match run.execution_id {
            Value::String(id) => Ok(id),
            Value::Number(id) => Ok(id.to_string()),
            other => Err(WorkflowError::InvalidResponse(format!(
                "execution id missing: {other}"
            ))),
        }
    }

    async fn get_execution(&self, execution_id: &str) -> WorkflowResult<EngineExecution> {
        let url = self.url(&["api", "v1", "executions", execution_id])?;
        let request = self
            .api(self.client.get(url))
            .query(&[("includeData", "true")]);

        Ok(self.send(request).await?.json::<EngineExecution>().await?)
    }

    async fn stop_execution(&self, execution_id: &str) -> WorkflowResult<()> {
        let url = self.url(&["api", "v1", "executions", execution_id, "stop"])?;
        self.send(self.api(self.client.post(url))).await?;
        Ok(())
    }

    async fn chat(
        &self,
        workflow_id: &str,
        session_id: &str,
        message: &str,
    ) -> WorkflowResult<String> {
        let url = self.url(&["webhook", workflow_id, "chat"])?;
        let request = self
            .client
            .post(url)
            .json(&json!({ "sessionId": session_id, "chatInput": message }));

        let reply = self.send(request).await?.json::<ChatResponse>().await?;

        match reply.output {
            Value::String(text) => Ok(text),
            Value::Null => Err(WorkflowError::InvalidResponse(
                "agent reply has no output".to_string(),
            )),
            other => Ok(other.to_string()),
        }
    }
}
