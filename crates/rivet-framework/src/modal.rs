//! Modals: single-use forms made of text inputs.
//!
//! A modal is opened with [`Context::respond_with_modal`](crate::Context::respond_with_modal),
//! which also starts it on the client. The first submission that passes
//! `check` consumes it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use parking_lot::RwLock;
use rivet_core::item::{CUSTOM_ID_MAX, random_custom_id, build_rows};
use rivet_core::{
    AutodeferOptions, ComponentError, ComponentResult, DeferKind, Item, ItemKind, ModalPayload,
    RowLayout, TextInput,
};

use crate::config::DEFAULT_MODAL_TIMEOUT;
use crate::context::ModalContext;
use crate::hooks::{DefaultHooks, ModalHooks};
use crate::session::{SessionCore, SessionId, SessionState, TimeoutSetting};
use crate::view::CallbackFuture;

/// Maximum length of a modal title.
pub const TITLE_MAX: usize = 100;

/// Callback run when a modal is submitted.
pub type ModalCallback = Arc<dyn Fn(ModalContext) -> CallbackFuture + Send + Sync>;

#[derive(Default)]
struct Inputs {
    items: Vec<Item>,
    layout: RowLayout,
}

struct ModalInner {
    core: SessionCore,
    hooks: Arc<dyn ModalHooks>,
    title: String,
    custom_id: String,
    explicit_custom_id: bool,
    callback: Option<ModalCallback>,
    autodefer: AutodeferOptions,
    inputs: RwLock<Inputs>,
}

/// A form shown in response to an interaction.
///
/// `Modal` is a cheap handle; clones refer to the same modal.
#[derive(Clone)]
pub struct Modal {
    inner: Arc<ModalInner>,
}

impl Modal {
    pub fn builder(title: impl Into<String>) -> ModalBuilder {
        ModalBuilder::new(title)
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Identifier submissions are routed by.
    pub fn custom_id(&self) -> &str {
        &self.inner.custom_id
    }

    // ─── inputs ───

    /// Adds a text input. At most five fit in a modal.
    pub fn add_item(&self, item: impl Into<Item>) -> ComponentResult<()> {
        let mut item = item.into();
        if !matches!(item.kind(), ItemKind::TextInput(_)) {
            return Err(ComponentError::NotAllowed {
                kind: item.kind().name(),
                container: "modal",
            });
        }
        item.validate()?;

        let mut inputs = self.inner.inputs.write();
        if let Some(custom_id) = item.get_custom_id()
            && inputs
                .items
                .iter()
                .any(|input| input.get_custom_id() == Some(custom_id))
        {
            return Err(ComponentError::ItemAlreadyAttached(custom_id.to_string()));
        }
        inputs.layout.place(&mut item)?;
        inputs.items.push(item);
        Ok(())
    }

    pub fn remove_item(&self, custom_id: &str) -> Option<Item> {
        let mut inputs = self.inner.inputs.write();
        let index = inputs
            .items
            .iter()
            .position(|item| item.get_custom_id() == Some(custom_id))?;
        let Inputs { items, layout } = &mut *inputs;
        let mut item = items.remove(index);
        layout.release(&mut item);
        Some(item)
    }

    /// Snapshot of the inputs in insertion order.
    pub fn items(&self) -> Vec<Item> {
        self.inner.inputs.read().items.clone()
    }

    /// Custom ids of the text inputs.
    pub(crate) fn input_ids(&self) -> Vec<String> {
        self.inner
            .inputs
            .read()
            .items
            .iter()
            .filter_map(|item| item.get_custom_id().map(str::to_string))
            .collect()
    }

    /// Renders the modal response payload.
    pub fn build(&self) -> ModalPayload {
        let inputs = self.inner.inputs.read();
        ModalPayload {
            custom_id: self.inner.custom_id.clone(),
            title: self.inner.title.clone(),
            components: build_rows(&inputs.items),
        }
    }

    // ─── session ───

    pub fn id(&self) -> SessionId {
        self.inner.core.id()
    }

    pub fn state(&self) -> SessionState {
        self.inner.core.state()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.core.timeout_or(Some(DEFAULT_MODAL_TIMEOUT))
    }

    /// Whether the modal can be submitted after a restart.
    pub fn is_persistent(&self) -> bool {
        self.inner.explicit_custom_id
            && self.inner.core.timeout_setting() == TimeoutSetting::Explicit(None)
    }

    pub fn autodefer(&self) -> AutodeferOptions {
        self.inner.autodefer
    }

    pub fn hooks(&self) -> &Arc<dyn ModalHooks> {
        &self.inner.hooks
    }

    pub(crate) fn callback(&self) -> Option<&ModalCallback> {
        self.inner.callback.as_ref()
    }

    /// Stops the modal without firing `on_timeout`. Returns whether it was
    /// running.
    pub fn stop(&self) -> bool {
        self.inner.core.stop()
    }

    /// Waits until the modal is submitted, stopped or timed out.
    pub async fn wait(&self) {
        self.inner.core.wait().await;
    }

    pub(crate) fn core(&self) -> &SessionCore {
        &self.inner.core
    }
}

impl fmt::Debug for Modal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modal")
            .field("id", &self.id())
            .field("custom_id", &self.custom_id())
            .field("title", &self.title())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ModalBuilder
// =============================================================================

/// Builder for [`Modal`].
///
/// ```rust,ignore
/// let modal = Modal::builder("Feedback")
///     .input(Item::from(TextInput::new("Comment").paragraph()).custom_id("comment"))
///     .on_submit(|ctx| async move {
///         let comment = ctx.value("comment").unwrap_or_default().to_string();
///         ctx.respond(MessagePayload::text(format!("Thanks: {comment}"))).await?;
///         Ok(())
///     })
///     .build()?;
/// ```
pub struct ModalBuilder {
    title: String,
    custom_id: Option<String>,
    timeout: TimeoutSetting,
    autodefer: AutodeferOptions,
    hooks: Arc<dyn ModalHooks>,
    inputs: Vec<Item>,
    callback: Option<ModalCallback>,
}

impl ModalBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            custom_id: None,
            timeout: TimeoutSetting::Default,
            autodefer: AutodeferOptions::default().defer_kind(DeferKind::MessageCreate),
            hooks: Arc::new(DefaultHooks),
            inputs: Vec::new(),
            callback: None,
        }
    }

    /// Sets the routing identifier; random if not set.
    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    /// Sets the timeout; `None` never expires.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = TimeoutSetting::Explicit(timeout);
        self
    }

    pub fn autodefer(mut self, options: impl Into<AutodeferOptions>) -> Self {
        self.autodefer = options.into();
        self
    }

    pub fn hooks(mut self, hooks: impl ModalHooks) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn hooks_arc(mut self, hooks: Arc<dyn ModalHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Adds a text input item.
    pub fn input(mut self, item: impl Into<Item>) -> Self {
        self.inputs.push(item.into());
        self
    }

    /// Adds a text input with a custom_id.
    pub fn text_input(self, custom_id: impl Into<String>, input: TextInput) -> Self {
        self.input(Item::from(input).custom_id(custom_id))
    }

    pub fn on_submit<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(ModalContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.callback = Some(Arc::new(move |ctx| callback(ctx).boxed()));
        self
    }

    pub fn build(self) -> ComponentResult<Modal> {
        let title_len = self.title.chars().count();
        if title_len > TITLE_MAX {
            return Err(ComponentError::too_long("title", TITLE_MAX, title_len));
        }
        if self.title.is_empty() {
            return Err(ComponentError::InvalidComponent(
                "modal title must not be empty".to_string(),
            ));
        }

        let explicit_custom_id = self.custom_id.is_some();
        let custom_id = self.custom_id.unwrap_or_else(random_custom_id);
        let id_len = custom_id.chars().count();
        if id_len > CUSTOM_ID_MAX {
            return Err(ComponentError::too_long("custom_id", CUSTOM_ID_MAX, id_len));
        }

        let modal = Modal {
            inner: Arc::new(ModalInner {
                core: SessionCore::new(self.timeout),
                hooks: self.hooks,
                title: self.title,
                custom_id,
                explicit_custom_id,
                callback: self.callback,
                autodefer: self.autodefer,
                inputs: RwLock::new(Inputs::default()),
            }),
        };
        for input in self.inputs {
            modal.add_item(input)?;
        }
        Ok(modal)
    }
}
