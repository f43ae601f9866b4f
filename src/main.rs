use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;
mod error;
mod event_bus;
mod logger;
mod response;
mod submitter;
mod terminal;
mod transport;
mod view;

use config::{Config, OutputFormat, Overrides};
use event_bus::EventBus;
use submitter::{FormSubmitter, SubmitState};
use terminal::TerminalView;
use transport::{GameTransport, HttpTransport};

#[derive(Parser)]
#[command(name = "game_creator", about = "Describe a game and let the AI Game Creator build it")]
struct Args {
    /// Server base URL (overrides config and GAME_CREATOR_SERVER_URL)
    #[arg(long)]
    server: Option<String>,
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    /// How panels are printed
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
    /// No colors, no spinner
    #[arg(long)]
    headless: bool,
    /// Verbose logging (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Write the effective configuration to this path and exit
    #[arg(long)]
    write_config: Option<String>,
    /// Game description; omit to start an interactive session
    description: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logger::init(args.verbose);
    if dotenv::dotenv().is_err() {
        info!("No .env file loaded");
    }

    let mut config = Config::load(&args.config)?;
    config.merge_with_args(&Overrides {
        server_url: args.server.clone(),
        timeout_secs: args.timeout,
        format: args.format,
        headless: args.headless,
    });

    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!("Wrote configuration to {}", path);
        return Ok(ExitCode::SUCCESS);
    }

    if !config.ui.colorful {
        colored::control::set_override(false);
    }

    let transport = HttpTransport::new(
        &config.server.base_url,
        &config.server.endpoint,
        config.server.timeout(),
    )?;
    info!("Posting descriptions to {} over {}", transport.url(), transport.name());

    let bus = Arc::new(EventBus::new(64));
    let _event_logger = event_bus::spawn_event_logger(&bus);
    let view = TerminalView::new(&config.ui);
    let mut form = FormSubmitter::new(transport, view).with_event_bus(bus.clone());

    if !args.description.is_empty() {
        let description = args.description.join(" ");
        let _ = form.submit(&description).await;
        return Ok(match form.state() {
            SubmitState::Settled { created: true } => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        });
    }

    form.view_mut().print_banner();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        form.view_mut().print_prompt();
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }
        // The error panel already shows what went wrong.
        let _ = form.submit(&line).await;
    }

    let metrics = bus.get_metrics().await;
    form.view_mut().print_summary(&metrics);
    Ok(ExitCode::SUCCESS)
}
