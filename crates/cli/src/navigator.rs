//! Forced-logout handling for the terminal.

use bazaar_storefront::session::{LogoutReason, Navigator};

/// Tells the user to sign in again; there is no page to navigate to.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, path: &str, reason: LogoutReason) {
        tracing::warn!(path = %path, reason = %reason, "Session ended");
        eprintln!("Your session has ended ({reason}). Sign in again and run `bazaar token set <TOKEN>`.");
    }
}
