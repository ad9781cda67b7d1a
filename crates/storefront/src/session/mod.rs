//! Client session: the stored bearer token and the forced-logout redirect.
//!
//! # Architecture
//!
//! - [`TokenStore`] persists the token under the `"token"` key
//! - [`token::inspect`] decodes it locally (no signature check) to spot
//!   expired or garbled tokens before they are sent
//! - [`Navigator`] performs the redirect to the login path when the session
//!   is over
//!
//! [`SessionGuard`] ties these together and is consulted by the API client
//! before every request and after every 401.

pub mod store;
pub mod token;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

pub use store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore};
pub use token::TokenState;

/// Errors from the client-side session storage.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the storage file failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The storage file is not a JSON object of strings.
    #[error("Storage format error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a session was ended client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The stored token's `exp` is in the past.
    TokenExpired,
    /// The stored token could not be decoded.
    TokenMalformed,
    /// The backend answered 401.
    Unauthorized,
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired => write!(f, "token expired"),
            Self::TokenMalformed => write!(f, "token malformed"),
            Self::Unauthorized => write!(f, "unauthorized"),
        }
    }
}

/// Performs the navigation that follows a forced logout.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`.
    fn redirect(&self, path: &str, reason: LogoutReason);
}

/// Navigator that only logs, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, path: &str, reason: LogoutReason) {
        tracing::warn!(path = %path, reason = %reason, "Session ended, redirecting");
    }
}

/// Decides whether a request carries the bearer token.
#[derive(Clone)]
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl SessionGuard {
    /// Create a guard over a token store and navigator.
    #[must_use]
    pub fn new(
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            login_path: login_path.into(),
        }
    }

    /// Token to attach to the next request.
    ///
    /// Returns `None` when no token is stored. An expired or undecodable token
    /// forces a logout and also yields `None`, so the request goes out
    /// anonymously.
    #[must_use]
    pub fn authorize(&self) -> Option<SecretString> {
        let token = self.store.load()?;

        let reason = match token::inspect(token.expose_secret()) {
            TokenState::Valid => return Some(token),
            TokenState::Expired => LogoutReason::TokenExpired,
            TokenState::Malformed => LogoutReason::TokenMalformed,
        };

        self.force_logout(reason);
        None
    }

    /// Clear the stored token and redirect to the login path.
    pub fn force_logout(&self, reason: LogoutReason) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored token");
        }
        self.navigator.redirect(&self.login_path, reason);
    }

    /// The token store behind this guard.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::token::tests::make_token;
    use super::*;

    #[derive(Default)]
    struct RecordingNavigator {
        redirects: Mutex<Vec<(String, LogoutReason)>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, path: &str, reason: LogoutReason) {
            self.redirects
                .lock()
                .unwrap()
                .push((path.to_string(), reason));
        }
    }

    fn guard_with(
        token: Option<String>,
    ) -> (SessionGuard, Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
        let store = Arc::new(
            token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token),
        );
        let navigator = Arc::new(RecordingNavigator::default());
        let guard = SessionGuard::new(store.clone(), navigator.clone(), "/");
        (guard, store, navigator)
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn test_no_token_is_anonymous_without_redirect() {
        let (guard, _, navigator) = guard_with(None);
        assert!(guard.authorize().is_none());
        assert!(navigator.redirects.lock().unwrap().is_empty());
    }

    #[test]
    fn test_valid_token_is_attached() {
        let token = make_token(&serde_json::json!({"exp": future_exp()}));
        let (guard, store, navigator) = guard_with(Some(token.clone()));

        let attached = guard.authorize().unwrap();
        assert_eq!(attached.expose_secret(), token);
        assert!(store.load().is_some());
        assert!(navigator.redirects.lock().unwrap().is_empty());
    }

    #[test]
    fn test_expired_token_is_cleared_and_redirects() {
        let token = make_token(&serde_json::json!({"exp": 1_000}));
        let (guard, store, navigator) = guard_with(Some(token));

        assert!(guard.authorize().is_none());
        assert!(store.load().is_none());
        assert_eq!(
            *navigator.redirects.lock().unwrap(),
            vec![("/".to_string(), LogoutReason::TokenExpired)]
        );
    }

    #[test]
    fn test_malformed_token_is_cleared_and_redirects() {
        let (guard, store, navigator) = guard_with(Some("garbage".to_string()));

        assert!(guard.authorize().is_none());
        assert!(store.load().is_none());
        assert_eq!(
            *navigator.redirects.lock().unwrap(),
            vec![("/".to_string(), LogoutReason::TokenMalformed)]
        );
    }

    #[test]
    fn test_force_logout_on_unauthorized() {
        let token = make_token(&serde_json::json!({"exp": future_exp()}));
        let (guard, store, navigator) = guard_with(Some(token));

        guard.force_logout(LogoutReason::Unauthorized);
        assert!(store.load().is_none());
        assert_eq!(navigator.redirects.lock().unwrap().len(), 1);
    }
}
