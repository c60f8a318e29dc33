use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProseAgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("no response within {0}s")]
    Timeout(u64),

    #[error("backend returned no text")]
    EmptyResponse,

    #[error("Failed to parse chat completion: {source}\n  body: {body}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },
}
