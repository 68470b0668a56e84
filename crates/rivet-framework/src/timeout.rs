//! Per-session inactivity timers.
//!
//! Each active session with a timeout gets one task that sleeps until
//! `last_activity + timeout`. Activity only moves the timestamp; the task
//! notices on wake-up and sleeps again. Stopping the session cancels the
//! task through the session's [`CancellationToken`](tokio_util::sync::CancellationToken).

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error};

use crate::registry::SessionHandle;

/// Spawns the timer task for a freshly registered session.
pub(crate) fn schedule(handle: SessionHandle) {
    if handle.core().deadline().is_none() {
        return;
    }
    let token = handle.core().timer_token();

    tokio::spawn(async move {
        loop {
            let Some(deadline) = handle.core().deadline() else {
                return;
            };
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = sleep_until(deadline) => {}
            }
            match handle.core().deadline() {
                Some(deadline) if Instant::now() >= deadline => break,
                Some(_) => continue,
                None => return,
            }
        }
        expire(handle).await;
    });
}

/// Unregisters a timed-out session and runs its `on_timeout` hook.
async fn expire(handle: SessionHandle) {
    let core = handle.core();
    if !core.begin_expiry() {
        return;
    }
    if let Some(registry) = core.registry() {
        registry.remove(core.id());
    }
    debug!(session = %core.id(), "Session timed out");

    match AssertUnwindSafe(handle.on_timeout()).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(session = %core.id(), error = %format!("{e:#}"), "on_timeout hook failed");
        }
        Err(_) => {
            error!(session = %core.id(), "on_timeout hook panicked");
        }
    }

    core.finish_expiry();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use rivet_core::{Button, InteractionData, Item, Snowflake};

    use crate::hooks::ViewHooks;
    use crate::registry::{Binding, Registry};
    use crate::session::SessionState;
    use crate::view::View;

    use super::*;

    #[derive(Default)]
    struct CountTimeouts(AtomicUsize);

    #[async_trait]
    impl ViewHooks for Arc<CountTimeouts> {
        async fn on_timeout(&self, view: &View) -> anyhow::Result<()> {
            // Already unrouted by the time the hook runs.
            assert_eq!(view.state(), SessionState::Stopped);
            self.0.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("hook errors are only logged")
        }
    }

    fn timed_view(hooks: Arc<CountTimeouts>, secs: u64) -> View {
        View::builder()
            .hooks(hooks)
            .timeout(Some(Duration::from_secs(secs)))
            .item(Item::from(Button::primary()).custom_id("tick"), |_, _| async { Ok(()) })
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_fires_once() {
        let registry = Registry::default();
        let hooks = Arc::new(CountTimeouts::default());
        let view = timed_view(hooks.clone(), 5);
        registry
            .register(SessionHandle::View(view.clone()), Snowflake(1).into())
            .unwrap();

        let start = Instant::now();
        view.wait().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
        assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
        assert!(!registry.contains(view.id()));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_wait_leaves_view_running() {
        let registry = Registry::default();
        let hooks = Arc::new(CountTimeouts::default());
        let view = timed_view(hooks.clone(), 5);
        registry
            .register(SessionHandle::View(view.clone()), Snowflake(4).into())
            .unwrap();

        assert!(tokio::time::timeout(Duration::from_secs(2), view.wait()).await.is_err());
        assert_eq!(view.state(), SessionState::Active);
        assert!(
            registry
                .resolve(&InteractionData::component(1u64, "tick").message(4u64))
                .is_some()
        );
        assert_eq!(hooks.0.load(Ordering::SeqCst), 0);

        view.wait().await;
        assert_eq!(view.state(), SessionState::Stopped);
        assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
        assert!(!registry.contains(view.id()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_suppresses_timeout() {
        let registry = Registry::default();
        let hooks = Arc::new(CountTimeouts::default());
        let view = timed_view(hooks.clone(), 5);
        registry
            .register(SessionHandle::View(view.clone()), Binding::Unbound)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(view.stop());
        assert!(registry.resolve(&InteractionData::component(1u64, "tick")).is_none());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(hooks.0.load(Ordering::SeqCst), 0);
        view.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sustained_activity_postpones_expiry() {
        let registry = Registry::default();
        let hooks = Arc::new(CountTimeouts::default());
        let view = timed_view(hooks.clone(), 5);
        registry
            .register(SessionHandle::View(view.clone()), Snowflake(2).into())
            .unwrap();

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_secs(4)).await;
            view.core().touch();
        }
        assert_eq!(view.state(), SessionState::Active);
        assert_eq!(hooks.0.load(Ordering::SeqCst), 0);

        view.wait().await;
        assert_eq!(hooks.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_never_expires() {
        let registry = Registry::default();
        let view = View::builder()
            .timeout(None)
            .item(Item::from(Button::primary()).custom_id("keep"), |_, _| async { Ok(()) })
            .build()
            .unwrap();
        registry
            .register(SessionHandle::View(view.clone()), Binding::Unbound)
            .unwrap();

        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
        assert_eq!(view.state(), SessionState::Active);
    }
}
