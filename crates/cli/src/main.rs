//! Bazaar CLI - browse the catalog, manage the cart and check out from a
//! terminal.
//!
//! # Usage
//!
//! ```bash
//! # List or search products
//! bazaar products
//! bazaar products --search phone
//!
//! # Cart
//! bazaar cart show
//! bazaar cart add 64f1c0ffee
//! bazaar cart remove 64f1c0ffee
//!
//! # UPI checkout (shows the QR code URL, then asks Done / Cancel)
//! bazaar checkout --address "12 MG Road, Bengaluru" --billing-address "12 MG Road, Bengaluru"
//!
//! # Session token
//! bazaar token set eyJhbGciOi...
//! bazaar token clear
//! ```
//!
//! # Environment Variables
//!
//! See `bazaar_storefront::config` (`BAZAAR_API_URL` is required).

#![cfg_attr(not(test), forbid(unsafe_code))]
// Terminal output is this binary's interface
#![allow(clippy::print_stdout, clippy::print_stderr)]

use bazaar_storefront::config::StorefrontConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod navigator;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered by a search query
    Products {
        /// Search query (matched by the backend)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart with a UPI payment
    Checkout {
        /// Shipment address
        #[arg(short, long)]
        address: String,

        /// Billing address
        #[arg(short, long)]
        billing_address: String,
    },
    /// Manage the stored session token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and the total
    Show,
    /// Add one of a product
    Add {
        /// Product ID
        product_id: String,
    },
    /// Remove one of a product
    Remove {
        /// Product ID
        product_id: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Store a bearer token
    Set {
        /// The token (JWT)
        token: String,
    },
    /// Remove the stored token
    Clear,
}

/// Initialize Sentry error tracking.
///
/// Returns a guard that must be kept alive for the duration of the program.
/// If `SENTRY_DSN` is not set, returns `None` and Sentry is disabled.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
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
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_storefront=info,bazaar_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Products { search } => {
            let mut page = commands::open_page(config)?;
            commands::catalog::list(&mut page, search.as_deref()).await?;
        }
        Commands::Cart { action } => {
            let mut page = commands::open_page(config)?;
            match action {
                CartAction::Show => commands::cart::show(&mut page).await?,
                CartAction::Add { product_id } => {
                    commands::cart::change(&mut page, &product_id, false).await?;
                }
                CartAction::Remove { product_id } => {
                    commands::cart::change(&mut page, &product_id, true).await?;
                }
            }
        }
        Commands::Checkout {
            address,
            billing_address,
        } => {
            let mut page = commands::open_page(config)?;
            commands::checkout::run(&mut page, &address, &billing_address).await?;
        }
        Commands::Token { action } => match action {
            TokenAction::Set { token } => commands::token::set(config, token)?,
            TokenAction::Clear => commands::token::clear(config)?,
        },
    }
    Ok(())
}
