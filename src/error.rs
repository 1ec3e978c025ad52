//! Error taxonomy shared by the session, the server client and MT providers

use thiserror::Error;

pub type EditorResult<T> = std::result::Result<T, EditorError>;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The server could not be reached at all
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },

    #[error("failed to decode server response: {0}")]
    Decode(String),

    /// A query matched nothing; the filter has already been rolled back
    #[error("no results")]
    NoResults,

    /// Beginning or end of the unit list, or the last unit was submitted
    #[error("{0}")]
    Terminal(String),

    #[error("no active unit")]
    NoActiveUnit,

    #[error("unit {0} is not cached")]
    UnknownUnit(u64),

    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("invalid fragment parameter {key}={value}")]
    InvalidParam { key: String, value: String },
}

impl EditorError {
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error happened at the transport level as opposed to the application level
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Connect(_) | Self::Timeout | Self::Server { .. } | Self::Decode(_)
        )
    }

    /// Text of the transient banner shown to the translator
    pub fn banner(&self) -> String {
        match self {
            Self::Connect(_) => "Error while connecting to the server.".to_string(),
            Self::Server { status: 500, .. } => "Server error.".to_string(),
            Self::Timeout => "Server seems down, try again later.".to_string(),
            Self::Server {
                message: Some(msg), ..
            } => msg.clone(),
            Self::Server { .. } | Self::Decode(_) => "Unknown error.".to_string(),
            Self::NoResults => "No results.".to_string(),
            Self::Terminal(msg) => msg.clone(),
            Self::NoActiveUnit => "No unit is being edited.".to_string(),
            Self::UnknownUnit(uid) => format!("Unit {} is not loaded.", uid),
            Self::Provider { provider, message } => format!("{} Error: {}", provider, message),
            Self::InvalidParam { key, value } => format!("Invalid {}: {}", key, value),
        }
    }
}

impl From<reqwest::Error> for EditorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Server {
                status: status.as_u16(),
                message: None,
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_messages() {
        assert_eq!(
            EditorError::Connect("refused".into()).banner(),
            "Error while connecting to the server."
        );
        assert_eq!(
            EditorError::Server {
                status: 500,
                message: Some("boom".into())
            }
            .banner(),
            "Server error."
        );
        assert_eq!(
            EditorError::Server {
                status: 403,
                message: Some("Forbidden".into())
            }
            .banner(),
            "Forbidden"
        );
        assert_eq!(EditorError::Timeout.banner(), "Server seems down, try again later.");
        assert_eq!(EditorError::NoResults.banner(), "No results.");
    }

    #[test]
    fn test_transport_classification() {
        assert!(EditorError::Timeout.is_transport());
        assert!(!EditorError::NoResults.is_transport());
        assert!(!EditorError::provider("Apertium", "bad pair").is_transport());
    }
}
