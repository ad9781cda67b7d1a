//! `bazaar token set|clear`
//!
//! Signing in happens elsewhere; this stores the token it produced.

use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::error::AppError;
use bazaar_storefront::session::{FileTokenStore, TokenState, TokenStore, token};
use secrecy::SecretString;

use super::CliError;

/// Store `raw` as the session token.
pub fn set(config: &StorefrontConfig, raw: String) -> Result<(), CliError> {
    match token::inspect(&raw) {
        TokenState::Valid => {}
        TokenState::Expired => eprintln!("warning: token is already expired"),
        TokenState::Malformed => eprintln!("warning: token could not be decoded"),
    }

    let store = FileTokenStore::new(&config.storage_path);
    store
        .save(&SecretString::from(raw))
        .map_err(AppError::from)?;
    tracing::info!(path = %store.path().display(), "Token stored");
    println!("Token saved to {}", store.path().display());
    Ok(())
}

/// Remove the stored token.
pub fn clear(config: &StorefrontConfig) -> Result<(), CliError> {
    let store = FileTokenStore::new(&config.storage_path);
    store.clear().map_err(AppError::from)?;
    println!("Token cleared");
    Ok(())
}
