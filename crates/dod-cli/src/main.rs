mod cmd;
mod narrator;
mod output;
mod root;

use clap::Parser;
use cmd::analyze::AnalyzeArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dod",
    about = "Classify a tracker ticket and check it against its Definition of Done",
    version
)]
struct Cli {
    /// Ticket key (ES-1281) or bare number, prefixed with tracker.project_key
    ticket: String,

    /// Config file (default: .dod/config.yaml upward from cwd, then ~/.config/dod/config.yaml)
    #[arg(long, env = "DOD_CONFIG")]
    config: Option<PathBuf>,

    /// Output the analysis as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Skip prose polishing even when a text-generation key is configured
    #[arg(long)]
    no_prose: bool,

    /// Post the rendered report back to the ticket as a comment
    #[arg(long)]
    comment: bool,

    /// Log rule firing and signal probes
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = cmd::analyze::run(AnalyzeArgs {
        ticket: cli.ticket,
        config: cli.config,
        json: cli.json,
        no_prose: cli.no_prose,
        comment: cli.comment,
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
