//! Rocket Shoes CLI - Command-line cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 1
//! rs-cart add 1
//!
//! # Set product 1 to 3 units
//! rs-cart update 1 3
//!
//! # Remove product 1
//! rs-cart remove 1
//! ```
//!
//! The cart lives in the local storage file named by `ROCKETSHOES_STORAGE_PATH`
//! and every change is checked against the stock API at `ROCKETSHOES_API_URL`.
//! See `rocketshoes_cart::config` for the full list of variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_cart::{
    CartConfig, CartStorage, CartStore, CatalogApi, FileStorage, HttpCatalogClient, RestoreStatus,
};
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::OperationFailed;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "Rocket Shoes cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New amount (values below 1 are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rocketshoes_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Return instead of exiting so the Sentry guard is dropped and flushed
    let result = run(cli, &config).await;
    ExitCode::from(finish(result, &mut std::io::stderr()))
}

/// Exit status for a successful command.
const EXIT_SUCCESS: u8 = 0;

/// Exit status for any failure.
const EXIT_FAILURE: u8 = 1;

/// Errors that end the process with a non-zero status.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Catalog client error: {0}")]
    Client(#[from] rocketshoes_cart::ApiError),

    #[error("Could not open cart storage: {0}")]
    Storage(#[from] rocketshoes_cart::StorageError),

    #[error(transparent)]
    Operation(#[from] OperationFailed),

    #[error("Could not write output: {0}")]
    Output(#[from] std::io::Error),
}

async fn run(cli: Cli, config: &CartConfig) -> Result<(), CliError> {
    let catalog = HttpCatalogClient::new(&config.api)?;
    let storage = FileStorage::from_config(&config.storage);
    let mut store = open_store(catalog, storage).await?;
    execute(cli.command, &mut store, &mut std::io::stdout()).await
}

/// Open the cart store, warning if the stored cart had to be reset.
async fn open_store<C: CatalogApi, S: CartStorage>(
    catalog: C,
    storage: S,
) -> Result<CartStore<C, S>, CliError> {
    let store = CartStore::open(catalog, storage).await?;

    if let RestoreStatus::Reset { reason } = store.restore_status() {
        tracing::warn!(%reason, "Stored cart was unreadable and has been reset");
    }
    Ok(store)
}

/// Run one command against an open store.
async fn execute<C: CatalogApi, S: CartStorage>(
    command: Commands,
    store: &mut CartStore<C, S>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Show => commands::cart::show(store.cart(), out)?,
        Commands::Add { product_id } => commands::cart::add(store, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(store, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(store, product_id, amount).await?;
        }
    }
    Ok(())
}

/// Report the outcome of a command and return the exit status.
fn finish(result: Result<(), CliError>, stderr: &mut impl Write) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            report(&e, stderr);
            EXIT_FAILURE
        }
    }
}

/// Tell the user what went wrong; send unexpected failures to Sentry.
fn report(error: &CliError, stderr: &mut impl Write) {
    match error {
        CliError::Operation(failed) => {
            if failed.is_unexpected() {
                let event_id = sentry::capture_error(&failed.source);
                tracing::error!(
                    error = %failed.source,
                    sentry_event_id = %event_id,
                    "Cart operation failed"
                );
            } else {
                tracing::debug!(error = %failed.source, "Cart operation rejected");
            }
            if let Err(e) = writeln!(stderr, "{}", failed.notice) {
                tracing::error!(error = %e, notice = %failed.notice, "Could not print notice");
            }
        }
        other => tracing::error!("Command failed: {other}"),
    }
}
