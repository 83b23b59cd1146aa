//! Pulsefit CLI - cart engine tools.
//!
//! # Usage
//!
//! ```bash
//! # Run a scripted shopping session through the cart engine
//! pf-cli simulate
//!
//! # Simulate with an unreliable store (fails the first N remote calls)
//! pf-cli simulate --fail-first 2
//!
//! # Check platform API reachability (needs PULSEFIT_API_URL / PULSEFIT_API_KEY)
//! pf-cli probe
//! ```
//!
//! # Commands
//!
//! - `simulate` - Drive the synchronizer through a scripted session
//! - `probe` - Ping the hosted platform API

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "Pulsefit CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted shopping session against an in-memory store
    Simulate {
        /// Fail the first N remote calls to exercise retry behavior
        #[arg(long, default_value_t = 0)]
        fail_first: u32,
    },
    /// Check reachability of the hosted platform API
    Probe,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let _sentry_guard = init_sentry();

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pulsefit_cli=info,pulsefit_cart=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Simulate { fail_first } => commands::simulate::run(fail_first).await?,
        Commands::Probe => commands::probe::run().await?,
    }
    Ok(())
}
