use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
pub struct TriggerWorkflowForm {
    #[validate(length(min = 1))]
    pub workflow_id: String,
    /// JSON object passed to the workflow; blank means `{}`.
    #[serde(default)]
    pub payload: Option<String>,
}

impl TriggerWorkflowForm {
    pub fn payload(&self) -> Result<Value, FormError> {
        match self.payload.as_deref().map(str::trim) {
            None | Some("") => Ok(Value::Object(Default::default())),
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(value @ Value::Object(_)) => Ok(value),
                Ok(_) => Err(FormError::InvalidPayload(
                    "payload must be a JSON object".to_string(),
                )),
                Err(e) => Err(FormError::InvalidPayload(e.to_string())),
            },
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AgentChatForm {
    #[validate(length(min = 1))]
    pub workflow_id: String,
    #[validate(length(min = 1, max = 100))]
    pub session_id: String,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}
