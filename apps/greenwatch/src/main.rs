mod config;
mod display;

use std::{process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    AnalysisApi, AppShell, LiveInterceptionController, RegulatorPoller, SubmissionController,
    TransportClient,
};
use config::{load_settings, Settings};
use shared::domain::{Category, ProductSubmission};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Slack on top of debounce and request timeout when waiting for the last
/// pending check after stdin closes.
const LIVE_DRAIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "greenwatch", about = "Greenwashing review client")]
struct Cli {
    /// Base URL of the analysis service.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one listing for full analysis and print the report.
    Analyze {
        #[arg(long, default_value = "")]
        company: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value_t = Category::Timber)]
        category: Category,
        #[arg(long = "cert")]
        certifications: Vec<String>,
        /// Print the projected report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Read description drafts from stdin, one per line, and print claim warnings.
    Live {
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Poll the regulator dashboard and print it whenever it changes.
    Regulator {
        /// Exit after this many dashboard updates.
        #[arg(long)]
        ticks: Option<usize>,
    },
    /// Print the cumulative profile of one seller.
    Seller { company: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = api_url;
    }
    info!(api = %settings.api_base_url, "greenwatch starting");

    let api: Arc<dyn AnalysisApi> = Arc::new(
        TransportClient::new(settings.transport_config())
            .context("invalid analysis service URL")?,
    );

    match cli.command {
        Command::Analyze {
            company,
            title,
            description,
            category,
            certifications,
            json,
        } => {
            let form = ProductSubmission {
                company_name: company,
                product_title: title,
                product_description: description,
                product_category: category,
                claimed_certifications: certifications,
            };
            run_analyze(api, form, json).await
        }
        Command::Live { title } => run_live(api, &settings, &title).await,
        Command::Regulator { ticks } => run_regulator(api, &settings, ticks).await,
        Command::Seller { company } => {
            let profile = api
                .seller_profile(&company)
                .await
                .with_context(|| format!("seller lookup for {company} failed"))?;
            println!("{}", display::render_seller(&profile));
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_analyze(
    api: Arc<dyn AnalysisApi>,
    form: ProductSubmission,
    json: bool,
) -> Result<ExitCode> {
    let controller = SubmissionController::new(api);
    let mut shell = AppShell::new();

    if let Err(err) = shell.submit(&controller, &form).await {
        eprintln!("{}", err.user_message());
        return Ok(ExitCode::FAILURE);
    }

    if let Some(model) = shell.render_model() {
        if json {
            println!("{}", serde_json::to_string_pretty(&model)?);
        } else {
            println!("{}", display::render_report(&model));
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_live(api: Arc<dyn AnalysisApi>, settings: &Settings, title: &str) -> Result<ExitCode> {
    let live_settings = settings.live_settings();
    let live = LiveInterceptionController::new(api, live_settings);
    let mut updates = live.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line.context("reading stdin")? {
                Some(description) => live.on_input(&description, title),
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let warnings = updates.borrow_and_update().clone();
                println!("{}", display::render_warnings(&warnings));
            }
        }
    }

    if live.is_pending() {
        let drain =
            live_settings.debounce + settings.transport_config().timeout + LIVE_DRAIN_GRACE;
        if tokio::time::timeout(drain, live.settled()).await.is_err() {
            debug!("last live check did not settle before exit");
        }
    }
    if updates.has_changed().unwrap_or(false) {
        let warnings = updates.borrow_and_update().clone();
        println!("{}", display::render_warnings(&warnings));
    }
    live.shutdown();
    Ok(ExitCode::SUCCESS)
}

async fn run_regulator(
    api: Arc<dyn AnalysisApi>,
    settings: &Settings,
    ticks: Option<usize>,
) -> Result<ExitCode> {
    let poller = RegulatorPoller::new(api, settings.poll_settings());
    let mut updates = poller.subscribe();
    poller.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut committed = 0usize;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted, stopping regulator poller");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let dashboard = updates.borrow_and_update().clone();
                println!("{}\n", display::render_dashboard(&dashboard));
                committed += 1;
                if ticks.is_some_and(|limit| committed >= limit) {
                    break;
                }
            }
        }
    }

    poller.stop();
    Ok(ExitCode::SUCCESS)
}
