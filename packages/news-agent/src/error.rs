//! Typed errors for the agent core.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Most failure modes inside a
//! run are normal outcomes and are modeled as result variants on the
//! components themselves; only the errors here cross the `Agent::run`
//! boundary.

use thiserror::Error;

/// Errors that escape a run.
///
/// Everything else (fetch exhaustion, validator rejections, malformed model
/// JSON) is recovered locally and surfaced through events and the summary.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Empty prompt, no seed links, or unparseable seed URLs
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The language model could not be reached for intent extraction,
    /// before any navigation was possible
    #[error("language model unavailable: {0}")]
    LlmUnavailable(#[source] ModelError),

    /// The run was cancelled between suspension points
    #[error("run cancelled")]
    Cancelled,
}

/// Errors from a single fetch operation.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, mid-body disconnect)
    #[error("network error fetching {url}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Non-success HTTP status from the unlocking proxy
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// 2xx response with an empty body
    #[error("empty body from {url}")]
    EmptyBody { url: String },

    /// Per-attempt timeout elapsed
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// All retry attempts were consumed
    #[error("fetch failed for {url} after {attempts} attempts")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether the retry layer should try again.
    ///
    /// Retryable: network errors, timeouts, empty bodies, 5xx and 429.
    /// Permanent: every other status (401, 403, 404, ...) and bad URLs.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network { .. } | FetchError::Timeout { .. } | FetchError::EmptyBody { .. } => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::InvalidUrl { .. } | FetchError::Exhausted { .. } => false,
        }
    }

    /// URL the failure refers to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Network { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::EmptyBody { url }
            | FetchError::Timeout { url }
            | FetchError::InvalidUrl { url }
            | FetchError::Exhausted { url, .. } => url,
        }
    }
}

/// Errors from a language-model call.
#[derive(Debug, Error)]
pub enum ModelError {
    /// HTTP or provider failure
    #[error("model request failed: {0}")]
    Request(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered but with no content
    #[error("model returned an empty response")]
    EmptyResponse,

    /// Response survived no parse attempt, including the repair pass
    #[error("model response not parseable: {reason}")]
    Unparseable { reason: String },

    /// Per-call timeout elapsed
    #[error("model call timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Result alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result alias for model operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
