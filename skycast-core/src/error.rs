pub use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a single lookup against the upstream provider.
///
/// The underlying failure is carried as-is: transport errors keep the
/// original `reqwest::Error`, upstream rejections keep the status and the
/// body exactly as the provider sent it.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Network unreachable, DNS failure, transport timeout or a broken body stream.
    #[error("transport error")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-2xx status.
    #[error("upstream returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    /// Provider answered 2xx but the body is not JSON.
    #[error("upstream body is not valid JSON")]
    Decode(#[from] serde_json::Error),
}

impl RequestError {
    /// HTTP status of an upstream rejection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Upstream { status, .. } => Some(*status),
            RequestError::Transport(err) => err.status(),
            RequestError::Decode(_) => None,
        }
    }

    /// Upstream body parsed as JSON, if it is JSON at all.
    pub fn body_json(&self) -> Option<Value> {
        match self {
            RequestError::Upstream { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    /// The provider's own `message` field, e.g. "city not found".
    pub fn upstream_message(&self) -> Option<String> {
        self.body_json()?
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }
}
