//! Typed errors for the Twitter client and the session establisher.

use thiserror::Error;

/// Errors raised while talking to the Twitter REST API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request did not produce an HTTP response, or the body could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success response carried a body we could not decode.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OAuth signature generation failed.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// 401 or 403: the credential set was rejected.
    #[error("Twitter rejected the credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// 429 from the API. `reset` is the Unix timestamp from `x-rate-limit-reset`.
    #[error("Rate limited by Twitter (reset at {reset:?})")]
    RateLimited { reset: Option<u64> },

    /// Any other non-success status.
    #[error("Twitter API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<i32>,
    },
}

/// Why a credential set could not be turned into a verified session.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("could not reach Twitter: {0}")]
    Network(#[source] reqwest::Error),

    #[error("invalid credentials (HTTP {status}): {message}")]
    InvalidCredentials { status: u16, message: String },

    #[error("Twitter refused the verification request (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("verification response was malformed: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("could not sign the verification request: {0}")]
    Signing(String),
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => match e.status() {
                Some(status) => AuthError::Service {
                    status: status.as_u16(),
                    message: e.to_string(),
                },
                None => AuthError::Network(e),
            },
            ApiError::Json(e) => AuthError::MalformedResponse(e),
            ApiError::OAuth(msg) => AuthError::Signing(msg),
            ApiError::Unauthorized { status, message } => {
                AuthError::InvalidCredentials { status, message }
            }
            ApiError::RateLimited { reset } => AuthError::Service {
                status: 429,
                message: match reset {
                    Some(ts) => format!("rate limited until {ts}"),
                    None => "rate limited".to_string(),
                },
            },
            ApiError::Api {
                status, message, ..
            } => AuthError::Service { status, message },
        }
    }
}
