use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The attempt exceeded its deadline. Never retried by the client;
    /// callers decide whether to reissue.
    #[error("request timeout: {endpoint}")]
    Timeout { endpoint: String },

    /// Non-2xx response outside the refresh protocol: the HTTP status, a
    /// display message, and the server's parsed error body (or a generic
    /// fallback when the body is not JSON).
    #[error("{message}")]
    UnexpectedStatus {
        status: StatusCode,
        message: String,
        data: Value,
    },

    /// The refresh cycle failed; the same reason is broadcast to the
    /// initiating request and every waiter.
    #[error("token refresh failed: {0}")]
    Refresh(RefreshFailedReason),

    #[error("invalid header value for {name}")]
    InvalidHeader { name: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status attached to the error, when one exists.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Refresh(RefreshFailedReason::Rejected { status }) => {
                StatusCode::from_u16(*status).ok()
            }
            Error::Http(err) => err.status(),
            _ => None,
        }
    }

    /// Parsed server error body, when the error carries one.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Error::UnexpectedStatus { data, .. } => Some(data),
            _ => None,
        }
    }

    pub(crate) fn unexpected_status(status: StatusCode, data: Value) -> Self {
        let message = data
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Error::UnexpectedStatus {
            status,
            message,
            data,
        }
    }
}

/// Why a refresh cycle failed. Cloneable so one outcome can be fanned out to
/// every waiter of the cycle.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RefreshFailedReason {
    /// The refresh endpoint answered non-2xx; a 401 here means the refresh
    /// credential itself is invalid or expired.
    #[error("refresh endpoint rejected the session (status {status})")]
    Rejected { status: u16 },

    #[error("refresh response carried no access token")]
    MissingAccessToken,

    #[error("refresh request timed out")]
    Timeout,

    #[error("refresh transport failure: {message}")]
    Transport { message: String },
}
