use std::time::Duration;

use crate::client::ChatClient;
use crate::types::{ChatMessage, ChatRequest};
use crate::{ProseAgentError, Result};

// ─── ChatOptions ──────────────────────────────────────────────────────────

/// Backend selection and sampling settings for a run.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Upper bound on the whole request, connection included.
    pub timeout: Duration,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: String::new(),
            model: "gpt-4".into(),
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(60),
        }
    }
}

// ─── RunConfig ────────────────────────────────────────────────────────────

/// One prompt to complete. Pass to [`run`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub opts: ChatOptions,
}

// ─── RunResult ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RunResult {
    /// Trimmed text of the first choice. Never empty.
    pub text: String,
    /// Model reported by the backend, or the requested one.
    pub model: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Complete a single prompt.
///
/// Fails with [`ProseAgentError::Timeout`] when the backend does not answer
/// within `opts.timeout`, and with [`ProseAgentError::EmptyResponse`] when it
/// answers without text.
///
/// ```rust,ignore
/// use prose_agent::{run, ChatOptions, RunConfig};
///
/// let result = run(RunConfig {
///     system_prompt: Some("You are terse.".into()),
///     prompt: "say hello".into(),
///     opts: ChatOptions { api_key: key, ..Default::default() },
/// }).await?;
/// println!("{}", result.text);
/// ```
pub async fn run(config: RunConfig) -> Result<RunResult> {
    let opts = config.opts;
    let client = ChatClient::new(&opts.base_url, &opts.api_key)?;

    let mut messages = Vec::with_capacity(2);
    if let Some(sp) = config.system_prompt {
        messages.push(ChatMessage::system(sp));
    }
    messages.push(ChatMessage::user(config.prompt));

    let request = ChatRequest {
        model: opts.model.clone(),
        messages,
        temperature: opts.temperature,
        max_tokens: opts.max_tokens,
    };

    let response = tokio::time::timeout(opts.timeout, client.complete(&request))
        .await
        .map_err(|_| ProseAgentError::Timeout(opts.timeout.as_secs()))??;

    let text = response
        .first_text()
        .ok_or(ProseAgentError::EmptyResponse)?
        .to_string();
    let usage = response.usage.unwrap_or_default();
    tracing::debug!(
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        "chat completion done"
    );

    Ok(RunResult {
        text,
        model: response.model.unwrap_or(opts.model),
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(server: &mockito::ServerGuard, timeout: Duration) -> RunConfig {
        RunConfig {
            system_prompt: Some("You review tickets.".into()),
            prompt: "{\"ticket\":\"ES-1\"}".into(),
            opts: ChatOptions {
                base_url: server.url(),
                api_key: "sk-test".into(),
                timeout,
                ..Default::default()
            },
        }
    }

    const OK_BODY: &str = r#"{
        "id": "chatcmpl-1",
        "model": "gpt-4-0613",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "  Looks complete.  "},
                     "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 120, "completion_tokens": 8, "total_tokens": 128}
    }"#;

    #[tokio::test]
    async fn run_returns_first_choice_text() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "You review tickets."},
                    {"role": "user", "content": "{\"ticket\":\"ES-1\"}"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(OK_BODY)
            .create_async()
            .await;

        let result = run(config(&server, Duration::from_secs(5))).await.unwrap();
        m.assert_async().await;
        assert_eq!(result.text, "Looks complete.");
        assert_eq!(result.model, "gpt-4-0613");
        assert_eq!(result.prompt_tokens, 120);
        assert_eq!(result.completion_tokens, 8);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = run(config(&server, Duration::from_secs(5))).await.unwrap_err();
        match err {
            ProseAgentError::Status { code, body } => {
                assert_eq!(code, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn blank_choice_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#)
            .create_async()
            .await;

        let err = run(config(&server, Duration::from_secs(5))).await.unwrap_err();
        assert!(matches!(err, ProseAgentError::EmptyResponse));
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("<html>proxy error</html>")
            .create_async()
            .await;

        let err = run(config(&server, Duration::from_secs(5))).await.unwrap_err();
        let ProseAgentError::Parse { body, .. } = err else {
            panic!("expected Parse")
        };
        assert!(body.contains("proxy error"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_http_error() {
        let opts = ChatOptions {
            // port 9 (discard) is never served in test environments
            base_url: "http://127.0.0.1:9".into(),
            api_key: "k".into(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let err = run(RunConfig {
            system_prompt: None,
            prompt: "x".into(),
            opts,
        })
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            ProseAgentError::Http(_) | ProseAgentError::Timeout(_)
        ));
    }
}
