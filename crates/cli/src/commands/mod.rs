//! Subcommand implementations.
//!
//! Every command drives the same [`ProductsPage`] a graphical front-end
//! would, then prints what the page shows.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod token;

use std::sync::Arc;

use bazaar_storefront::api::ApiClient;
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::error::AppError;
use bazaar_storefront::notification::{Severity, Snackbar};
use bazaar_storefront::page::ProductsPage;
use bazaar_storefront::session::{FileTokenStore, SessionGuard};
use thiserror::Error;

use crate::navigator::TerminalNavigator;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront action failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// Reading the shopper's answer failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Checkout was requested but cannot start.
    #[error("Cannot check out: {0}")]
    CheckoutUnavailable(&'static str),
}

/// The page controller used by the terminal front-end.
pub type Page = ProductsPage<ApiClient>;

/// Wire the page to the configured backend and token storage.
pub fn open_page(config: &StorefrontConfig) -> Result<Page, CliError> {
    let store = Arc::new(FileTokenStore::new(&config.storage_path));
    let session = SessionGuard::new(store, Arc::new(TerminalNavigator), &config.login_path);
    let client = ApiClient::new(config, session).map_err(AppError::from)?;
    Ok(ProductsPage::new(client, Snackbar::new()))
}

/// Print and dismiss whatever the banner is showing.
pub fn flush_notification(page: &Page) {
    if let Some(notification) = page.dismiss_notification() {
        match notification.severity {
            Severity::Error | Severity::Warning => {
                eprintln!("{}: {}", notification.severity, notification.message);
            }
            Severity::Success | Severity::Info => println!("{}", notification.message),
        }
    }
}
