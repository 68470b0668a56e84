//! Serve loop that feeds inbound interactions to a [`Client`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rivet_runtime::RivetRuntime;
//!
//! // Loads rivet.toml from the current directory, if present.
//! let runtime = RivetRuntime::new();
//! runtime.client().start_view(&view, message_id)?;
//!
//! // Runs until the stream ends or Ctrl+C / SIGTERM.
//! let stats = runtime.serve(gateway_interactions).await?;
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{Stream, StreamExt};
use rivet_core::BoxedInteraction;
use rivet_framework::{Client, DispatchOutcome, DispatchResult};
use tokio::signal;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::{ConfigLoader, RivetConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Counters for one `serve` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Interactions pulled from the stream.
    pub received: u64,
    pub handled: u64,
    pub unhandled: u64,
    pub check_failed: u64,
    pub ignored: u64,
    /// Dispatches that hit an internal defect or whose task panicked.
    pub failed: u64,
    /// Sessions stopped by the final client shutdown.
    pub sessions_stopped: usize,
}

impl RuntimeStats {
    fn record(&mut self, joined: Result<DispatchResult<DispatchOutcome>, JoinError>) {
        match joined {
            Ok(Ok(DispatchOutcome::Handled)) => self.handled += 1,
            Ok(Ok(DispatchOutcome::Unhandled)) => self.unhandled += 1,
            Ok(Ok(DispatchOutcome::CheckFailed)) => self.check_failed += 1,
            Ok(Ok(DispatchOutcome::Ignored)) => self.ignored += 1,
            Ok(Err(e)) => {
                error!(error = %e, "Dispatch failed");
                self.failed += 1;
            }
            Err(e) => {
                error!(error = %e, "Dispatch task did not complete");
                self.failed += 1;
            }
        }
    }
}

/// Owns a configured [`Client`] and drives it from an interaction stream.
pub struct RivetRuntime {
    config: RivetConfig,
    client: Client,
    serving: AtomicBool,
}

impl RivetRuntime {
    /// Loads configuration from the current directory and the environment,
    /// falling back to defaults when loading fails.
    pub fn new() -> Self {
        let config = ConfigLoader::new()
            .with_current_dir()
            .load()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to load config ({e}), using defaults");
                RivetConfig::default()
            });
        Self::from_config(&config)
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Initializes logging and builds the client from `config`.
    pub fn from_config(config: &RivetConfig) -> Self {
        logging::init_from_config(&config.logging);

        let client = Client::new(config.client.to_client_config());
        info!(
            log_level = %config.logging.level,
            autodefer_grace_ms = config.client.autodefer_grace_ms,
            view_timeout_secs = config.client.view_timeout_secs,
            modal_timeout_secs = config.client.modal_timeout_secs,
            "Runtime initialized from configuration"
        );

        Self {
            config: config.clone(),
            client,
            serving: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RivetConfig {
        &self.config
    }

    /// The client sessions are started on.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_serving(&self) -> bool {
        self.serving.load(Ordering::SeqCst)
    }

    /// Serves until the stream ends or Ctrl+C / SIGTERM arrives.
    pub async fn serve<S>(&self, interactions: S) -> RuntimeResult<RuntimeStats>
    where
        S: Stream<Item = BoxedInteraction>,
    {
        info!("Rivet runtime is serving. Press Ctrl+C to stop.");
        self.serve_until(interactions, shutdown_signal()).await
    }

    /// Serves until the stream ends or `shutdown` completes.
    ///
    /// Each interaction is dispatched in its own task. When the stream ends,
    /// in-flight dispatches finish before the client shuts down. When
    /// `shutdown` fires, the client shuts down first so no new callbacks
    /// start, then in-flight dispatches are drained.
    pub async fn serve_until<S, F>(&self, interactions: S, shutdown: F) -> RuntimeResult<RuntimeStats>
    where
        S: Stream<Item = BoxedInteraction>,
        F: Future<Output = ()>,
    {
        if self.client.is_shut_down() {
            return Err(RuntimeError::ShutDown);
        }
        if self.serving.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyServing);
        }
        let _serving = ServingGuard(&self.serving);

        let mut stats = RuntimeStats::default();
        let mut tasks = JoinSet::new();
        tokio::pin!(interactions);
        tokio::pin!(shutdown);

        let signalled = loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break true,
                next = interactions.next() => match next {
                    Some(interaction) => {
                        stats.received += 1;
                        let client = self.client.clone();
                        tasks.spawn(async move { client.handle_interaction(interaction).await });
                    }
                    None => {
                        debug!("Interaction stream ended");
                        break false;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => stats.record(joined),
            }
        };

        if signalled {
            stats.sessions_stopped = self.client.shutdown();
        }
        if !tasks.is_empty() {
            debug!(in_flight = tasks.len(), "Waiting for in-flight dispatches");
        }
        while let Some(joined) = tasks.join_next().await {
            stats.record(joined);
        }
        if !signalled {
            stats.sessions_stopped = self.client.shutdown();
        }

        info!(
            received = stats.received,
            handled = stats.handled,
            unhandled = stats.unhandled,
            failed = stats.failed,
            sessions_stopped = stats.sessions_stopped,
            "Runtime stopped"
        );
        Ok(stats)
    }
}

impl Default for RivetRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RivetRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RivetRuntime")
            .field("config", &self.config)
            .field("client", &self.client)
            .field("serving", &self.is_serving())
            .finish()
    }
}

struct ServingGuard<'a>(&'a AtomicBool);

impl Drop for ServingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Completes on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use signal::unix::{SignalKind, signal as unix_signal};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c() => {}
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler, listening for Ctrl+C only");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`RivetRuntime`] with explicit configuration sources.
///
/// ```rust,ignore
/// let runtime = RivetRuntime::builder()
///     .config_file("deploy/rivet.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Layers `config` under files and the environment.
    pub fn merge(mut self, config: RivetConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<RivetRuntime> {
        let config = self.config_loader.load()?;
        Ok(RivetRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use futures::stream;
    use rivet_core::{
        ApiResult, Button, Interaction, InteractionData, InteractionResponse, Item,
        MessagePayload, Snowflake, async_trait,
    };
    use rivet_framework::View;

    use super::*;

    #[derive(Debug)]
    struct CountingInteraction {
        data: InteractionData,
        responses: AtomicUsize,
    }

    impl CountingInteraction {
        fn boxed(data: InteractionData) -> BoxedInteraction {
            Arc::new(Self {
                data,
                responses: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Interaction for CountingInteraction {
        fn data(&self) -> &InteractionData {
            &self.data
        }

        async fn create_response(&self, _response: InteractionResponse) -> ApiResult<()> {
            self.responses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn create_followup(&self, _message: MessagePayload) -> ApiResult<()> {
            Ok(())
        }

        async fn edit_original(&self, _message: MessagePayload) -> ApiResult<()> {
            Ok(())
        }
    }

    fn runtime() -> RivetRuntime {
        RivetRuntime::builder()
            .search_path(tempfile::tempdir().unwrap().path())
            .without_env()
            .build()
            .unwrap()
    }

    fn confirm_view(presses: Arc<AtomicUsize>) -> View {
        View::builder()
            .timeout(None)
            .item(Item::from(Button::success()).custom_id("confirm"), move |ctx, _| {
                let presses = presses.clone();
                async move {
                    presses.fetch_add(1, Ordering::SeqCst);
                    ctx.respond(MessagePayload::text("confirmed")).await?;
                    Ok(())
                }
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_serve_counts_outcomes() {
        let runtime = runtime();
        let presses = Arc::new(AtomicUsize::new(0));
        let view = confirm_view(presses.clone());
        runtime.client().start_view(&view, Snowflake(10)).unwrap();

        let unhandled = Arc::new(AtomicUsize::new(0));
        runtime.client().on_unhandled_component({
            let unhandled = unhandled.clone();
            move |_| {
                unhandled.fetch_add(1, Ordering::SeqCst);
                async {}
            }
        });

        let interactions = stream::iter(vec![
            CountingInteraction::boxed(InteractionData::component(1u64, "confirm").message(10u64)),
            CountingInteraction::boxed(InteractionData::component(2u64, "stale").message(99u64)),
            CountingInteraction::boxed(InteractionData::other(3u64)),
        ]);
        let stats = runtime
            .serve_until(interactions, std::future::pending())
            .await
            .unwrap();

        assert_eq!(stats.received, 3);
        assert_eq!(stats.handled, 1);
        assert_eq!(stats.unhandled, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.sessions_stopped, 1);
        assert_eq!(presses.load(Ordering::SeqCst), 1);
        assert_eq!(unhandled.load(Ordering::SeqCst), 1);
        assert!(!view.is_active());
        assert!(!runtime.is_serving());
    }

    #[tokio::test]
    async fn test_shutdown_signal_stops_sessions() {
        let runtime = runtime();
        let view = confirm_view(Arc::new(AtomicUsize::new(0)));
        runtime.client().start_view(&view, Snowflake(10)).unwrap();

        let stats = runtime
            .serve_until(stream::pending::<BoxedInteraction>(), async {})
            .await
            .unwrap();
        assert_eq!(stats.received, 0);
        assert_eq!(stats.sessions_stopped, 1);
        assert!(runtime.client().is_shut_down());
    }

    #[tokio::test]
    async fn test_serve_after_shutdown_is_rejected() {
        let runtime = runtime();
        tokio_test::assert_ok!(
            runtime
                .serve_until(stream::empty::<BoxedInteraction>(), std::future::pending())
                .await
        );

        let err = runtime
            .serve_until(stream::empty::<BoxedInteraction>(), std::future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ShutDown));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_builder_reads_client_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("rivet.toml"),
            "[client]\nview_timeout_secs = 30\nmodal_timeout_secs = 0\n",
        )
        .unwrap();

        let runtime = RivetRuntime::builder()
            .search_path(dir.path())
            .without_env()
            .build()
            .unwrap();
        let config = runtime.client().config();
        assert_eq!(config.view_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.modal_timeout, None);
    }
}
