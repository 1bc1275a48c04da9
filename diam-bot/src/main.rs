use anyhow::{Context, Result};
use campaign_core::{run_campaign, setup_logger, Signer, Submitter};
use clap::Parser;
use diam_bot::report::{self, LogSink};
use diam_bot::{menu, ApiSubmitter, BotConfig, Ed25519Signer, Mode, WalletSubmitter};
use dotenv::dotenv;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the campaign configuration
    #[arg(short, long, default_value = "campaign.toml")]
    config: String,

    /// Transfer mode: api or wallet (overrides the config)
    #[arg(short, long)]
    mode: Option<String>,

    /// Extra recipients file, one address per line
    #[arg(long)]
    recipients_file: Option<String>,

    /// Run this many rounds with pauses in between
    #[arg(long)]
    rounds: Option<u64>,

    /// Write the JSON summary here after the run
    #[arg(long)]
    export_stats: Option<String>,

    /// Skip the launch confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Errors only; no banner, no per-send lines
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Guard flushes the rolling file log when main returns
    let _log_guard = if args.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::ERROR)
            .init();
        None
    } else {
        setup_logger()
    };

    dotenv().ok();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    if !args.quiet {
        println!(
            r#"
        ╔════════════════════════════════════════════════════════════╗
        ║                DIAM CAMPAIGN BOT - TESTNET                 ║
        ╚════════════════════════════════════════════════════════════╝
        "#
        );
    }

    let mut config = BotConfig::load(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config))?;

    if let Some(path) = args.recipients_file {
        config.recipients_file = Some(path);
    }
    if let Some(rounds) = args.rounds {
        config.continuous = true;
        config.max_rounds = Some(rounds);
    }

    let mode = match args.mode.as_deref() {
        Some("api") => Mode::Api,
        Some("wallet") => Mode::Wallet,
        Some(other) => anyhow::bail!("Unknown mode {:?}; use api or wallet", other),
        None => match config.mode {
            Some(mode) => mode,
            None => menu::choose_mode()?,
        },
    };

    let campaign = config.resolve(mode)?;
    // Surface config problems before touching credentials
    campaign.validate()?;

    info!(target: "send_result", "Mode: {}", mode);
    info!(target: "send_result", "Backend: {}", config.api_url);
    info!(
        target: "send_result",
        "Recipients: {} | {} sends each | {} transfers per round",
        campaign.recipients.len(),
        campaign.sends_per_wallet,
        campaign.tasks_per_round()
    );

    let submitter: Arc<dyn Submitter> = match mode {
        Mode::Api => {
            let token = menu::credential("DIAM_SESSION_TOKEN", "Enter session token")?;
            Arc::new(ApiSubmitter::new(
                &config.api_url,
                token,
                config.request_timeout(),
            )?)
        }
        Mode::Wallet => {
            let secret = menu::credential("DIAM_SECRET_KEY", "Enter wallet secret key (hex)")?;
            let signer = Ed25519Signer::from_hex(&secret)?;
            info!(target: "send_result", "Sending from {}", signer.address());
            Arc::new(WalletSubmitter::new(
                &config.api_url,
                Arc::new(signer),
                config.request_timeout(),
            )?)
        }
    };

    if !args.yes && !menu::confirm_launch(mode, &campaign)? {
        info!(target: "send_result", "Aborted before dispatch");
        return Ok(ExitCode::SUCCESS);
    }

    let token = CancellationToken::new();
    let watcher_token = token.clone();

    // Listen for Ctrl+C; the dispatcher stops at the next task boundary
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!(target: "send_result", "Interrupt received; finishing current transfer");
                watcher_token.cancel();
            }
            Err(err) => {
                error!("Unable to listen for shutdown signal: {}", err);
            }
        }
    });

    let report = run_campaign(
        submitter,
        &campaign,
        config.retry_policy(),
        Arc::new(LogSink),
        token,
    )
    .await?;

    report::print_summary(&report);

    if let Some(ref path) = args.export_stats {
        match report::export_summary(&report, path).await {
            Ok(()) => info!(target: "send_result", "Summary exported to {}", path),
            Err(e) => error!("Failed to export summary to {}: {}", path, e),
        }
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}
