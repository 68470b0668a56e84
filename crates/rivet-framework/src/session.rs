//! Session lifecycle shared by views and modals.
//!
//! ```text
//!            start()                 stop() / shutdown
//! Created ───────────▶ Active ─────────────────────────────▶ Stopped
//!    │                   │                                     ▲
//!    │ stop()            │ timeout fires                       │
//!    │                   ▼                                     │
//!    │               Expiring ── on_timeout() finished ────────┘
//!    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `Expiring` is internal: it reads as [`SessionState::Stopped`] from the
//! outside, but [`SessionCore::wait`] only returns once `on_timeout` has run.

use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use rivet_core::Snowflake;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::registry::RegistryInner;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a view or modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Built but not started; interactions cannot reach it.
    Created,
    /// Registered and routable.
    Active,
    /// Terminal.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Active,
    Expiring,
    Stopped,
}

/// Timeout chosen when the session was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeoutSetting {
    /// Use the client's default when started.
    Default,
    Explicit(Option<Duration>),
}

/// State every session carries regardless of kind.
pub(crate) struct SessionCore {
    id: SessionId,
    timeout: Mutex<TimeoutSetting>,
    phase: watch::Sender<Phase>,
    last_activity: Mutex<Instant>,
    message_id: Mutex<Option<Snowflake>>,
    registry: Mutex<Weak<RegistryInner>>,
    timer: CancellationToken,
}

impl SessionCore {
    pub(crate) fn new(timeout: TimeoutSetting) -> Self {
        let (phase, _) = watch::channel(Phase::Created);
        Self {
            id: SessionId::next(),
            timeout: Mutex::new(timeout),
            phase,
            last_activity: Mutex::new(Instant::now()),
            message_id: Mutex::new(None),
            registry: Mutex::new(Weak::new()),
            timer: CancellationToken::new(),
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn state(&self) -> SessionState {
        match *self.phase.borrow() {
            Phase::Created => SessionState::Created,
            Phase::Active => SessionState::Active,
            Phase::Expiring | Phase::Stopped => SessionState::Stopped,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        *self.phase.borrow() == Phase::Active
    }

    // ─── timeout ───

    pub(crate) fn timeout_setting(&self) -> TimeoutSetting {
        *self.timeout.lock()
    }

    /// The effective timeout, or `fallback` if the session uses the default.
    pub(crate) fn timeout_or(&self, fallback: Option<Duration>) -> Option<Duration> {
        match *self.timeout.lock() {
            TimeoutSetting::Default => fallback,
            TimeoutSetting::Explicit(timeout) => timeout,
        }
    }

    /// Replaces a pending default with the client's value.
    pub(crate) fn resolve_timeout(&self, default: Option<Duration>) {
        let mut timeout = self.timeout.lock();
        if *timeout == TimeoutSetting::Default {
            *timeout = TimeoutSetting::Explicit(default);
        }
    }

    /// `last_activity + timeout`, if the session expires at all.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        let timeout = self.timeout_or(None)?;
        Some(*self.last_activity.lock() + timeout)
    }

    pub(crate) fn timer_token(&self) -> CancellationToken {
        self.timer.clone()
    }

    /// Records activity, pushing the deadline back. No-op unless active.
    pub(crate) fn touch(&self) {
        if self.is_active() {
            *self.last_activity.lock() = Instant::now();
        }
    }

    // ─── binding ───

    pub(crate) fn message_id(&self) -> Option<Snowflake> {
        *self.message_id.lock()
    }

    pub(crate) fn set_message_id(&self, message_id: Option<Snowflake>) {
        *self.message_id.lock() = message_id;
    }

    /// Points the session at `registry`, returning the previous pointer.
    pub(crate) fn attach(&self, registry: Weak<RegistryInner>) -> Weak<RegistryInner> {
        std::mem::replace(&mut *self.registry.lock(), registry)
    }

    pub(crate) fn registry(&self) -> Option<std::sync::Arc<RegistryInner>> {
        self.registry.lock().upgrade()
    }

    // ─── transitions ───

    /// `Created -> Active`. Resets the activity clock.
    pub(crate) fn activate(&self) -> RegistryResult<()> {
        let mut result = Ok(());
        self.phase.send_if_modified(|phase| match *phase {
            Phase::Created => {
                *phase = Phase::Active;
                true
            }
            Phase::Active => {
                result = Err(RegistryError::AlreadyRunning(self.id));
                false
            }
            Phase::Expiring | Phase::Stopped => {
                result = Err(RegistryError::AlreadyStopped(self.id));
                false
            }
        });
        if result.is_ok() {
            *self.last_activity.lock() = Instant::now();
        }
        result
    }

    /// Stops the session without firing `on_timeout`.
    ///
    /// Returns `true` if the session was active, in which case it has been
    /// removed from its registry and its timer cancelled.
    pub(crate) fn stop(&self) -> bool {
        let mut was_active = false;
        self.phase.send_if_modified(|phase| match *phase {
            Phase::Created => {
                *phase = Phase::Stopped;
                true
            }
            Phase::Active => {
                *phase = Phase::Stopped;
                was_active = true;
                true
            }
            Phase::Expiring | Phase::Stopped => false,
        });

        if was_active {
            self.timer.cancel();
            if let Some(registry) = self.registry() {
                registry.remove(self.id);
            }
            debug!(session = %self.id, "Session stopped");
        }
        was_active
    }

    /// `Active -> Expiring`. Only one caller can win this.
    pub(crate) fn begin_expiry(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Active {
                *phase = Phase::Expiring;
                true
            } else {
                false
            }
        })
    }

    /// `Expiring -> Stopped`, waking every waiter.
    pub(crate) fn finish_expiry(&self) {
        self.phase.send_if_modified(|phase| {
            if *phase == Phase::Expiring {
                *phase = Phase::Stopped;
                true
            } else {
                false
            }
        });
    }

    /// Suspends until the session is fully stopped.
    pub(crate) async fn wait(&self) {
        let mut rx = self.phase.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|phase| *phase == Phase::Stopped).await;
    }
}

impl fmt::Debug for SessionCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCore")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("timeout", &self.timeout_setting())
            .field("message_id", &self.message_id())
            .finish_non_exhaustive()
    }
}
