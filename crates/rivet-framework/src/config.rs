//! Client configuration.

use std::time::Duration;

/// Default grace period before an unanswered interaction is deferred.
pub const DEFAULT_AUTODEFER_GRACE: Duration = Duration::from_secs(2);
/// Default inactivity timeout for views.
pub const DEFAULT_VIEW_TIMEOUT: Duration = Duration::from_secs(120);
/// Default inactivity timeout for modals.
pub const DEFAULT_MODAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings shared by every session started on a [`Client`](crate::Client).
///
/// Sessions that set their own timeout ignore the defaults here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// How long to wait for a callback to respond before deferring.
    pub autodefer_grace: Duration,
    /// Timeout for views that did not choose one.
    pub view_timeout: Option<Duration>,
    /// Timeout for modals that did not choose one.
    pub modal_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            autodefer_grace: DEFAULT_AUTODEFER_GRACE,
            view_timeout: Some(DEFAULT_VIEW_TIMEOUT),
            modal_timeout: Some(DEFAULT_MODAL_TIMEOUT),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn autodefer_grace(mut self, grace: Duration) -> Self {
        self.autodefer_grace = grace;
        self
    }

    pub fn view_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.view_timeout = timeout;
        self
    }

    pub fn modal_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.modal_timeout = timeout;
        self
    }
}
