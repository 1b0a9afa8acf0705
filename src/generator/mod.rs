pub mod models;
pub mod openai;

use thiserror::Error;

/// Every way a single generation call can fail. Each variant carries enough
/// detail to be shown to the user verbatim.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("OpenAI API key is not configured. Check api.json")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("API error: {message} ({kind})")]
    Api {
        message: String,
        kind: String,
        code: Option<String>,
    },
    #[error("invalid response: {detail}. Body: {body}")]
    InvalidResponse { detail: String, body: String },
    #[error("API returned an empty response")]
    EmptyResponse,
}

/// Text-generation backend: one call, one answer, no retries.
pub trait GenerationBackend: Send + Sync {
    fn generate(
        &self,
        credential: &str,
        model: &str,
        instructions: &str,
        payload: &str,
    ) -> Result<String, GenerationError>;
}
