use dod_core::config::ProseConfig;
use dod_core::context::ProjectContext;
use dod_core::render::Narrator;
use dod_core::report::AnalysisResult;
use dod_core::{DodError, Result};
use prose_agent::{ChatOptions, RunConfig, RunResult};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};

/// [`Narrator`] backed by a chat-completion model.
pub struct ProseNarrator {
    opts: ChatOptions,
    context: Option<String>,
}

impl ProseNarrator {
    /// `None` when no API key is configured.
    pub fn from_config(cfg: &ProseConfig, context: &ProjectContext) -> Option<Self> {
        let api_key = cfg.api_key.clone()?;
        Some(Self {
            opts: ChatOptions {
                base_url: cfg.base_url.clone(),
                api_key,
                model: cfg.model.clone(),
                temperature: 0.0,
                max_tokens: None,
                timeout: Duration::from_secs(cfg.timeout_seconds),
            },
            context: context.render(),
        })
    }
}

fn build_system_prompt() -> String {
    "You are a product owner reviewing a work ticket against its team's Definition of Done. \
     You receive a JSON compliance report: the ticket category, one verdict per checklist \
     item (satisfied, unsatisfied or indeterminate) with the evidence found, and the list \
     of missing information. Project background may precede the report; use it to make \
     the analysis specific to the product and targets involved.\n\
     Write the 'DoD Analysis' section of the review: a few short paragraphs or bullets in \
     plain text. State which checklist items are met and on what evidence, which are not, \
     and what the assignee should add. Do not change any verdict, do not invent evidence, \
     and do not repeat the acceptance criteria or section headings."
        .to_string()
}

fn build_prompt(result: &AnalysisResult, context: Option<&str>) -> Result<String> {
    let report = serde_json::to_string_pretty(result)?;
    let mut prompt = String::new();
    if let Some(ctx) = context {
        prompt.push_str("Project context:\n");
        prompt.push_str(ctx);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!("Compliance report for ticket {}", result.ticket));
    if let Some(parent) = &result.parent {
        prompt.push_str(&format!(" (parent epic: {parent})"));
    }
    prompt.push_str(&format!(":\n\n{report}"));
    Ok(prompt)
}

fn backend_error(e: impl std::fmt::Display) -> DodError {
    DodError::FormattingBackendUnavailable(e.to_string())
}

fn run_on_own_runtime(cfg: RunConfig) -> Result<RunResult> {
    let rt = tokio::runtime::Runtime::new().map_err(backend_error)?;
    rt.block_on(prose_agent::run(cfg)).map_err(backend_error)
}

impl Narrator for ProseNarrator {
    fn narrate(&self, result: &AnalysisResult) -> Result<String> {
        let run_cfg = RunConfig {
            system_prompt: Some(build_system_prompt()),
            prompt: build_prompt(result, self.context.as_deref())?,
            opts: self.opts.clone(),
        };

        tracing::debug!(ticket = %result.ticket, model = %self.opts.model, "requesting prose analysis");
        let outcome = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(prose_agent::run(run_cfg)))
                    .map_err(backend_error)
            }
            // A current-thread runtime cannot block in place.
            Ok(_) => std::thread::spawn(move || run_on_own_runtime(run_cfg))
                .join()
                .map_err(|_| backend_error("prose worker thread panicked"))?,
            Err(_) => run_on_own_runtime(run_cfg),
        };

        outcome.map(|r| r.text)
    }
}
