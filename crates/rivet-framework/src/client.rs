//! The explicitly constructed entry point applications hold on to.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use rivet_core::{BoxedInteraction, InteractionKind, Snowflake};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::context::Context;
use crate::dispatcher::{self, DispatchOutcome};
use crate::error::{DispatchResult, RegistryError, RegistryResult};
use crate::modal::Modal;
use crate::registry::{Binding, Registry, RegistryStats, SessionHandle};
use crate::view::View;

/// Hook run for interactions no running session owns.
pub type UnhandledHook = Arc<dyn Fn(Context) -> BoxFuture<'static, ()> + Send + Sync>;

struct ClientInner {
    config: ClientConfig,
    registry: Registry,
    unhandled_component: RwLock<Option<UnhandledHook>>,
    unhandled_modal: RwLock<Option<UnhandledHook>>,
    shut_down: AtomicBool,
}

/// Owns the session registry and dispatches interactions to it.
///
/// Create one per process at startup and pass it around; clones share the
/// same registry.
///
/// ```rust,ignore
/// let client = Client::new(ClientConfig::default());
/// client.on_unhandled_component(|ctx| async move {
///     let _ = ctx.respond(MessagePayload::text("This menu has expired.").ephemeral(true)).await;
/// });
///
/// client.start_view(&view, message_id)?;
/// while let Some(interaction) = events.next().await {
///     let client = client.clone();
///     tokio::spawn(async move { client.handle_interaction(interaction).await });
/// }
/// client.shutdown();
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        let registry = Registry::new(config.view_timeout, config.modal_timeout);
        Self {
            inner: Arc::new(ClientInner {
                config,
                registry,
                unhandled_component: RwLock::new(None),
                unhandled_modal: RwLock::new(None),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    // ─── sessions ───

    /// Starts routing interactions to `view`.
    ///
    /// Pass a message id to bind the view to that message, or
    /// [`Binding::Unbound`] to route by custom_id.
    pub fn start_view(&self, view: &View, binding: impl Into<Binding>) -> RegistryResult<()> {
        self.ensure_open()?;
        self.inner
            .registry
            .register(SessionHandle::View(view.clone()), binding.into())
    }

    /// Starts routing submissions to `modal`.
    ///
    /// [`Context::respond_with_modal`] calls this for you.
    pub fn start_modal(&self, modal: &Modal) -> RegistryResult<()> {
        self.ensure_open()?;
        self.inner
            .registry
            .register(SessionHandle::Modal(modal.clone()), Binding::Unbound)
    }

    /// The running view bound to `message_id`.
    pub fn get_view(&self, message_id: Snowflake) -> Option<View> {
        self.inner.registry.get_view(message_id)
    }

    /// The running modal with `custom_id`.
    pub fn get_modal(&self, custom_id: &str) -> Option<Modal> {
        self.inner.registry.get_modal(custom_id)
    }

    pub fn stats(&self) -> RegistryStats {
        self.inner.registry.stats()
    }

    fn ensure_open(&self) -> RegistryResult<()> {
        if self.is_shut_down() {
            return Err(RegistryError::Closed);
        }
        Ok(())
    }

    // ─── dispatch ───

    /// Dispatches one interaction.
    ///
    /// Returns once the callback (if any) and its autodefer have finished.
    /// Callback failures go to the session's `on_error` hook and never
    /// surface here; an `Err` means the registry and a session disagree.
    pub async fn handle_interaction(
        &self,
        interaction: BoxedInteraction,
    ) -> DispatchResult<DispatchOutcome> {
        if self.is_shut_down() {
            debug!(interaction = %interaction.data().id, "Client is shut down, ignoring interaction");
            return Ok(DispatchOutcome::Ignored);
        }
        dispatcher::dispatch(self, interaction).await
    }

    /// Sets the hook for component interactions no running view owns.
    pub fn on_unhandled_component<F, Fut>(&self, hook: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        *self.inner.unhandled_component.write() = Some(Arc::new(move |ctx| hook(ctx).boxed()));
    }

    /// Sets the hook for modal submissions no running modal owns.
    pub fn on_unhandled_modal<F, Fut>(&self, hook: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        *self.inner.unhandled_modal.write() = Some(Arc::new(move |ctx| hook(ctx).boxed()));
    }

    pub(crate) fn unhandled_hook(&self, kind: InteractionKind) -> Option<UnhandledHook> {
        match kind {
            InteractionKind::Component => self.inner.unhandled_component.read().clone(),
            InteractionKind::ModalSubmit => self.inner.unhandled_modal.read().clone(),
            InteractionKind::Other => None,
        }
    }

    // ─── teardown ───

    /// Stops every running session without firing `on_timeout` and refuses
    /// new ones. Returns how many sessions were stopped.
    pub fn shutdown(&self) -> usize {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return 0;
        }
        let stopped = self.inner.registry.close();
        info!(stopped, "Client shut down");
        stopped
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}
