use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use triage_core::KeywordFilter;
use triage_ml::{MlBackend, MlConfig, MlStack};
use triage_observability::{init_tracing, AppMetrics};
use triage_pipeline::TriageAgent;

#[derive(Debug, Parser)]
#[command(name = "triage")]
#[command(about = "Inbox triage CLI")]
struct Cli {
    /// Overrides TRIAGE_ML_BACKEND.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Hosted,
    Rules,
}

impl From<BackendArg> for MlBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Hosted => MlBackend::Hosted,
            BackendArg::Rules => MlBackend::Rules,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify one message and print the full outcome as JSON.
    Classify {
        text: Option<String>,
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("triage_cli");
    let cli = Cli::parse();

    let agent = build_agent(cli.backend)?;

    match cli.command {
        Command::Classify { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("failed reading message from {}", path.display()))?,
                (None, None) => bail!("pass the message text or --file <path>"),
            };

            let outcome = agent.handle_email(&text).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Interactive => run_interactive(agent).await?,
    }

    Ok(())
}

async fn run_interactive(agent: TriageAgent) -> Result<()> {
    println!("Inbox triage interactive mode. one message per line, type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        match agent.handle_email(message).await {
            Ok(outcome) => {
                println!("\n[{}] {}\n", outcome.category.as_label(), outcome.reply);
            }
            Err(error) => eprintln!("error: {error}"),
        }
    }

    Ok(())
}

fn build_agent(backend: Option<BackendArg>) -> Result<TriageAgent> {
    let mut config = MlConfig::from_env();
    if let Some(backend) = backend {
        config.backend = backend.into();
    }

    let ml_stack = MlStack::new(config).context("failed to initialize model stack")?;

    Ok(TriageAgent::new(
        Arc::new(ml_stack),
        KeywordFilter::default(),
        AppMetrics::shared(),
    ))
}
