use thiserror::Error;

#[derive(Debug, Error)]
pub enum DodError {
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("invalid ticket key '{0}': expected PROJECT-123 or a bare number with a configured project key")]
    InvalidTicketKey(String),

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("ticket tracker error: {0}")]
    Tracker(String),

    #[error("formatting backend unavailable: {0}")]
    FormattingBackendUnavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DodError {
    /// True for failures that abort a single ticket's analysis.
    pub fn is_retrieval_failure(&self) -> bool {
        matches!(
            self,
            DodError::TicketNotFound(_) | DodError::AuthenticationFailure(_) | DodError::Tracker(_)
        )
    }
}

impl From<reqwest::Error> for DodError {
    fn from(err: reqwest::Error) -> Self {
        DodError::Tracker(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DodError>;
