use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::info;

use roamsix::app::applications::Pathway;
use roamsix::app::codes;
use roamsix::app::interests::INTEREST_OPTIONS;
use roamsix::client::HttpApplicationApi;
use roamsix::config::Config;
use roamsix::infra::AirtableClient;
use roamsix::state::AppState;
use roamsix::wizard::{pathway_info, required_fields, Step, Wizard, WizardError, PATHWAYS};
use roamsix::{logging, metrics, server};

#[derive(Parser)]
#[command(name = "roamsix")]
#[command(about = "Invitation-gated application service backed by Airtable")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (API + static front-end)
    Serve {
        /// Port to listen on (overrides PORT / config)
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding index.html and assets
        #[arg(long)]
        static_dir: Option<String>,
    },
    /// Walk through the application flow in the terminal against a running server
    Apply {
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        url: String,
    },
    /// Check an invitation code directly against Airtable
    ValidateCode { code: String },
    /// Report which Airtable settings are missing
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    if matches!(cli.command, Commands::Apply { .. }) {
        logging::init_file_logging(&config.server.log_dir);
    } else {
        logging::init_logging(&config.server.log_dir);
    }

    match cli.command {
        Commands::Serve { port, static_dir } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = static_dir {
                config.server.static_dir = dir;
            }
            metrics::init_metrics();
            config.airtable.warn_if_incomplete();

            let store = Arc::new(AirtableClient::new(config.airtable));
            let state = AppState::new(store);
            server::start_server(state, &config.server.static_dir, config.server.port).await?;
        }
        Commands::Apply { url } => {
            run_wizard(Wizard::new(HttpApplicationApi::new(url))).await?;
        }
        Commands::ValidateCode { code } => {
            let client = AirtableClient::new(config.airtable);
            match codes::validate_code(&client, &code).await? {
                codes::CodeCheck::Valid { pathway, record_id } => {
                    println!("valid: record {record_id}, pathway {}", pathway.unwrap_or_else(|| "-".into()));
                }
                codes::CodeCheck::Invalid => println!("invalid"),
            }
        }
        Commands::CheckConfig => {
            let mut complete = true;
            for (key, missing) in config.airtable.missing_report() {
                println!("{:<30} {}", key, if missing { "MISSING" } else { "ok" });
                complete &= !missing;
            }
            if !complete {
                bail!("Airtable configuration incomplete");
            }
        }
    }
    Ok(())
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(format!("{label}: ").as_bytes()).await?;
    stdout.flush().await?;
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => bail!("input closed"),
    }
}

async fn run_wizard(mut wizard: Wizard<HttpApplicationApi>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while wizard.step() != Step::Confirmation {
        let result = match wizard.step() {
            Step::CodeEntry => {
                let code = prompt(&mut lines, "Invitation code").await?;
                wizard.submit_code(&code).await
            }
            Step::EmailCapture => {
                let email = prompt(&mut lines, "Email").await?;
                wizard.submit_email(&email).await
            }
            Step::PathwaySelection => {
                for (i, info) in PATHWAYS.iter().enumerate() {
                    println!("  {}. {}: {}", i + 1, info.title, info.description);
                }
                let choice = prompt(&mut lines, "Pathway (number or name)").await?;
                let pathway = choice
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| Pathway::ALL.get(n.wrapping_sub(1)).copied())
                    .or_else(|| choice.parse().ok());
                match pathway {
                    Some(p) => wizard.choose_pathway(p),
                    None => {
                        println!("Unknown pathway '{choice}'");
                        continue;
                    }
                }
            }
            Step::Application => {
                let Some(pathway) = wizard.pathway() else {
                    bail!("no pathway selected");
                };
                println!("{} application", pathway_info(pathway).title);
                for key in wizard.missing_fields() {
                    let value = prompt(&mut lines, key).await?;
                    wizard.set_field(key, &value);
                }
                if !required_fields(pathway).contains(&"website") {
                    let website = prompt(&mut lines, "website (optional)").await?;
                    wizard.set_field("website", &website);
                }
                for key in ["phone", "address"] {
                    let value = prompt(&mut lines, &format!("{key} (optional)")).await?;
                    wizard.set_field(key, &value);
                }
                wizard.submit_application().await
            }
            Step::Confirmation => unreachable!(),
        };

        if let Err(e) = result {
            println!("{e}");
        }
    }

    println!("Application received. We review all applications within 72 hours.");
    for (i, option) in INTEREST_OPTIONS.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, option.label, option.description);
    }
    let picks = prompt(&mut lines, "Other interests (comma-separated numbers, blank to skip)").await?;
    for n in picks.split(',').filter_map(|p| p.trim().parse::<usize>().ok()) {
        if let Some(option) = INTEREST_OPTIONS.get(n.wrapping_sub(1)) {
            wizard.toggle_interest(option.id);
        }
    }
    if !wizard.interests().is_empty() {
        match wizard.submit_interests().await {
            Ok(()) => println!("We'll be in touch at {}.", wizard.email()),
            Err(WizardError::InterestsFailed) => println!("Could not save your interests."),
            Err(e) => println!("{e}"),
        }
    }
    info!("Wizard finished");
    Ok(())
}
