use crate::narrator::ProseNarrator;
use crate::output::print_json;
use crate::root;
use anyhow::Context;
use dod_core::analysis::analyze_ticket;
use dod_core::config::{user_config_path, Config, WarnLevel};
use dod_core::context::ProjectContext;
use dod_core::jira::JiraClient;
use dod_core::key::TicketKey;
use dod_core::render::{compose, Narrator};
use dod_core::source::TicketSource;
use std::path::PathBuf;

pub struct AnalyzeArgs {
    pub ticket: String,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub no_prose: bool,
    pub comment: bool,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let path = root::resolve_config_path(explicit.as_deref(), &cwd, user_config_path());
    let config = match &path {
        Some(p) => Config::resolve(Some(p))
            .with_context(|| format!("failed to load config from {}", p.display()))?,
        None => Config::resolve(None).context("failed to load config")?,
    };

    let warnings = config.validate();
    for w in &warnings {
        match w.level {
            WarnLevel::Warning => tracing::warn!("config: {}", w.message),
            WarnLevel::Error => tracing::error!("config: {}", w.message),
        }
    }
    if let Some(w) = warnings.iter().find(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("invalid configuration: {}", w.message);
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = load_config(args.config)?;
    let creds = config.tracker_credentials()?;
    let key = TicketKey::parse(&args.ticket, config.tracker.project_key.as_deref())?;

    let use_prose = !args.no_prose && config.prose.enabled();
    let context = if use_prose {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        ProjectContext::load(&config.prose.context_files, &cwd)
    } else {
        ProjectContext::default()
    };

    let client = JiraClient::new(&creds).context("failed to create tracker client")?;
    let result =
        analyze_ticket(&client, &key).with_context(|| format!("failed to analyze {key}"))?;
    tracing::info!(
        ticket = %key,
        category = %result.category(),
        rule = %result.classification.rule,
        "analysis complete"
    );

    // Prose is only worth a round-trip when text is shown or posted.
    let needs_text = !args.json || args.comment;
    let rendered = needs_text.then(|| {
        let narrator = if use_prose {
            ProseNarrator::from_config(&config.prose, &context)
        } else {
            None
        };
        compose(&result, narrator.as_ref().map(|n| n as &dyn Narrator))
    });

    if args.json {
        print_json(&result)?;
    } else if let Some(r) = &rendered {
        print!("{}", r.text);
    }

    if args.comment {
        if let Some(r) = &rendered {
            client
                .add_comment(&key, &r.text)
                .with_context(|| format!("failed to post analysis to {key}"))?;
            eprintln!("Posted analysis to {key}");
        }
    }

    Ok(())
}
