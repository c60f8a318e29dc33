//! `prose-agent`: async client for OpenAI-compatible chat-completion backends.
//!
//! Used by `dod` to turn a structured compliance report into a short prose
//! analysis. The caller owns the prompt; this crate only moves text to and
//! from the backend and reports failures precisely enough to fall back.
//!
//! # Architecture
//!
//! ```text
//! RunConfig { system_prompt, prompt, opts: ChatOptions }
//!     │
//!     ▼
//! run()          ← builds the ChatRequest, applies the timeout
//!     │
//!     ▼
//! ChatClient     ← POST {base_url}/chat/completions, bearer auth
//!     │
//!     ▼
//! RunResult      ← first choice text + token usage
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use prose_agent::{run, ChatOptions, RunConfig};
//!
//! let result = run(RunConfig {
//!     system_prompt: None,
//!     prompt: "Summarize: ...".into(),
//!     opts: ChatOptions { api_key: std::env::var("OPENAI_API_KEY")?, ..Default::default() },
//! })
//! .await?;
//! println!("{}", result.text);
//! ```

pub mod client;
pub mod error;
pub mod runner;
pub mod types;


pub use client::ChatClient;
pub use error::ProseAgentError;
pub use runner::{run, ChatOptions, RunConfig, RunResult};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Choice, Role, Usage};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ProseAgentError>;
