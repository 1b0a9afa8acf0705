use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::generator::{GenerationBackend, GenerationError};

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Sampling temperature sent with every request. Not user configurable.
pub const TEMPERATURE: f32 = 1.0;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message<'a>>,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

pub fn build_request<'a>(model: &'a str, instructions: &'a str, payload: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            Message {
                role: "system",
                content: instructions,
            },
            Message {
                role: "user",
                content: payload,
            },
        ],
        temperature: TEMPERATURE,
    }
}

/// Interpret a chat-completions response body. An `error` object wins over
/// any choices; otherwise the first choice must carry non-empty content.
pub fn parse_response(body: &str) -> Result<String, GenerationError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse {
            detail: e.to_string(),
            body: body.to_string(),
        })?;

    if let Some(err) = response.error {
        let code = match err.code {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        return Err(GenerationError::Api {
            message: err.message,
            kind: err.kind.unwrap_or_default(),
            code,
        });
    }

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(GenerationError::EmptyResponse)
}

/// Blocking chat-completions client. Runs on a command worker thread.
pub struct ChatClient {
    endpoint: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            timeout,
        }
    }
}

impl GenerationBackend for ChatClient {
    fn generate(
        &self,
        credential: &str,
        model: &str,
        instructions: &str,
        payload: &str,
    ) -> Result<String, GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        debug!(model, endpoint = %self.endpoint, "sending chat completion request");
        let response = client
            .post(&self.endpoint)
            .bearer_auth(credential)
            .json(&build_request(model, instructions, payload))
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.classify(e))?;
        if !status.is_success() {
            warn!(%status, "backend returned non-success status");
        }

        interpret_response(status, &body)
    }
}

/// Combine the HTTP status with the parsed body. A structured API error is
/// reported as-is; any other failure on a non-success status names the
/// status.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<String, GenerationError> {
    if status.is_success() {
        return parse_response(body);
    }
    match parse_response(body) {
        Ok(_) => Err(GenerationError::Api {
            message: status.to_string(),
            kind: "http_status".to_string(),
            code: Some(status.as_u16().to_string()),
        }),
        Err(GenerationError::InvalidResponse { detail, body }) => {
            Err(GenerationError::InvalidResponse {
                detail: format!("HTTP {status}: {detail}"),
                body,
            })
        }
        Err(GenerationError::EmptyResponse) => Err(GenerationError::InvalidResponse {
            detail: format!("HTTP {status} with no content"),
            body: body.to_string(),
        }),
        Err(other) => Err(other),
    }
}

impl ChatClient {
    fn classify(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout.as_secs())
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}
