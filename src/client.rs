use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    RequestFailed(StatusCode),
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    MalformedResponse(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct AskRequest {
    prompt: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiStatus {
    pub provider: String,
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    base_url: String,
}

impl AgentClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, prompt: &str) -> Result<String, ClientError> {
        let url = format!("{}/api/agent", self.base_url);

        let request = AskRequest {
            prompt: prompt.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(response.status()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(render_answer(&value))
    }

    pub async fn status(&self) -> Result<ApiStatus, ClientError> {
        let url = format!("{}/api/status", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::RequestFailed(response.status()));
        }

        let status: ApiStatus = response.json().await?;
        Ok(status)
    }
}

/// Prefer the `answer` field; anything else is shown as indented JSON.
fn render_answer(value: &Value) -> String {
    match value.get("answer").and_then(Value::as_str) {
        Some(answer) if !answer.is_empty() => answer.to_string(),
        _ => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}
