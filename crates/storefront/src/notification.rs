//! Transient notification banner with a 4 second auto-dismiss.
//!
//! The dismiss timer only runs while the page is visible. Hiding the page
//! clears it; showing the page again while a notification is open starts a
//! fresh full wait.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// How long a notification stays open without interaction.
pub const AUTO_HIDE: Duration = Duration::from_millis(4000);

/// Notification severity, mirrored by the banner colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Success,
    Error,
    #[default]
    Info,
    Warning,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }
}

/// Whether the page hosting the banner is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Called when an open notification closes, manually or by timeout.
pub type OnClose = Arc<dyn Fn(&Notification) + Send + Sync>;

/// The notification banner.
///
/// Clones share the same banner. Auto-dismiss needs a Tokio runtime; without
/// one the notification stays open until [`Snackbar::close`].
#[derive(Clone)]
pub struct Snackbar {
    state: Arc<Mutex<SnackbarState>>,
    on_close: Option<OnClose>,
}

#[derive(Default)]
struct SnackbarState {
    current: Option<Notification>,
    visibility: Visibility,
    /// Bumped whenever the timer is re-armed or cleared; a firing timer whose
    /// generation is stale does nothing.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl SnackbarState {
    fn disarm(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Snackbar {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            on_close: None,
        }
    }

    /// Banner that invokes `on_close` whenever a notification closes.
    #[must_use]
    pub fn with_on_close(on_close: impl Fn(&Notification) + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::default(),
            on_close: Some(Arc::new(on_close)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SnackbarState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show `notification`, replacing any open one, and start the wait.
    pub fn open(&self, notification: Notification) {
        tracing::debug!(severity = %notification.severity, message = %notification.message, "Notification opened");
        let mut state = self.lock();
        state.disarm();
        state.current = Some(notification);
        if state.visibility == Visibility::Visible {
            self.arm(&mut state);
        }
    }

    /// Dismiss the open notification.
    ///
    /// Returns the dismissed notification, or `None` if nothing was open.
    pub fn close(&self) -> Option<Notification> {
        let closed = {
            let mut state = self.lock();
            state.disarm();
            state.current.take()
        };
        if let Some(notification) = &closed {
            self.notify_closed(notification);
        }
        closed
    }

    /// Record that the page was hidden or shown.
    pub fn set_visibility(&self, visibility: Visibility) {
        let mut state = self.lock();
        if state.visibility == visibility {
            return;
        }
        state.visibility = visibility;
        match visibility {
            Visibility::Hidden => state.disarm(),
            Visibility::Visible if state.current.is_some() => {
                state.disarm();
                self.arm(&mut state);
            }
            Visibility::Visible => {}
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().current.is_some()
    }

    /// The open notification, if any.
    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.lock().current.clone()
    }

    fn arm(&self, state: &mut SnackbarState) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No async runtime, notification will not auto-dismiss");
            return;
        };

        let generation = state.generation;
        let banner = self.clone();
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(AUTO_HIDE).await;
            banner.expire(generation);
        }));
    }

    fn expire(&self, generation: u64) {
        let closed = {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            state.timer = None;
            state.current.take()
        };
        if let Some(notification) = &closed {
            self.notify_closed(notification);
        }
    }

    fn notify_closed(&self, notification: &Notification) {
        if let Some(on_close) = &self.on_close {
            on_close(notification);
        }
    }
}

impl Default for Snackbar {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Snackbar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snackbar")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
