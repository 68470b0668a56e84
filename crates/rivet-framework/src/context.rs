//! Interaction contexts.
//!
//! A [`Context`] wraps one inbound interaction and owns its response latch.
//! Every path that may send the initial response (explicit responses from
//! callbacks, and the autodefer timer) takes the latch first and checks
//! whether a response was already issued, so the host sees at most one
//! initial response per interaction.
//!
//! [`ViewContext`] and [`ModalContext`] add the session that received the
//! interaction and dereference to [`Context`].

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rivet_core::{
    AutodeferOptions, BoxedInteraction, DeferKind, InteractionData, InteractionKind,
    InteractionResponse, Item, MessagePayload, ResponseType, Snowflake,
};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::client::Client;
use crate::error::{ResponseError, ResponseResult};
use crate::modal::Modal;
use crate::view::View;

/// How long an interaction accepts an initial response.
pub const INITIAL_RESPONSE_WINDOW: Duration = Duration::from_secs(3);
/// How long followups are accepted after the initial response.
pub const FOLLOWUP_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Default)]
struct ResponseLog {
    first_at: Option<Instant>,
    kinds: Vec<ResponseType>,
}

struct ContextInner {
    interaction: BoxedInteraction,
    client: Client,
    created_at: Instant,
    issued: AtomicBool,
    latch: Mutex<ResponseLog>,
}

/// Response handle for one interaction.
///
/// Cheap to clone; clones share the same latch.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

impl Context {
    pub(crate) fn new(interaction: BoxedInteraction, client: Client) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                interaction,
                client,
                created_at: Instant::now(),
                issued: AtomicBool::new(false),
                latch: Mutex::new(ResponseLog::default()),
            }),
        }
    }

    // ─── accessors ───

    pub fn interaction(&self) -> &BoxedInteraction {
        &self.inner.interaction
    }

    pub fn data(&self) -> &InteractionData {
        self.inner.interaction.data()
    }

    pub fn client(&self) -> &Client {
        &self.inner.client
    }

    pub fn custom_id(&self) -> &str {
        &self.data().custom_id
    }

    pub fn user_id(&self) -> Snowflake {
        self.data().user_id
    }

    pub fn message_id(&self) -> Option<Snowflake> {
        self.data().message_id
    }

    pub fn channel_id(&self) -> Option<Snowflake> {
        self.data().channel_id
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.data().guild_id
    }

    /// Whether an initial response has been sent.
    pub fn issued_response(&self) -> bool {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Types of every response sent through this context, in order.
    /// Followups are recorded as [`ResponseType::ChannelMessage`].
    pub async fn responses(&self) -> Vec<ResponseType> {
        self.inner.latch.lock().await.kinds.clone()
    }

    /// Whether the interaction can still be answered.
    ///
    /// Before any response this is the 3 second initial window; afterwards
    /// the 15 minute followup window.
    pub async fn is_valid(&self) -> bool {
        let log = self.inner.latch.lock().await;
        match log.first_at {
            Some(first) => first.elapsed() < FOLLOWUP_WINDOW,
            None => self.inner.created_at.elapsed() < INITIAL_RESPONSE_WINDOW,
        }
    }

    // ─── responses ───

    /// Sends a message: the initial response if none was issued yet,
    /// otherwise a followup.
    pub async fn respond(&self, message: MessagePayload) -> ResponseResult<()> {
        let mut log = self.inner.latch.lock().await;
        if self.issued_response() {
            self.inner.interaction.create_followup(message).await?;
            log.kinds.push(ResponseType::ChannelMessage);
            return Ok(());
        }
        self.send_initial(&mut log, InteractionResponse::message(message))
            .await
    }

    /// Edits the message the component is attached to.
    ///
    /// Sent as the initial response if none was issued yet, otherwise as an
    /// edit of the original response.
    pub async fn edit_response(&self, message: MessagePayload) -> ResponseResult<()> {
        let mut log = self.inner.latch.lock().await;
        if self.issued_response() {
            self.inner.interaction.edit_original(message).await?;
            return Ok(());
        }
        self.send_initial(&mut log, InteractionResponse::update(message))
            .await
    }

    /// Acknowledges the interaction without content.
    pub async fn defer(&self, kind: DeferKind, ephemeral: bool) -> ResponseResult<()> {
        let mut log = self.inner.latch.lock().await;
        if self.issued_response() {
            return Err(ResponseError::AlreadyResponded);
        }
        self.send_initial(&mut log, InteractionResponse::deferred(kind, ephemeral))
            .await
    }

    /// Starts `modal` on the client and opens it for the user.
    ///
    /// If the host rejects the response the modal is stopped again.
    pub async fn respond_with_modal(&self, modal: &Modal) -> ResponseResult<()> {
        if self.data().kind == InteractionKind::ModalSubmit {
            return Err(ResponseError::ModalFromModal);
        }
        let mut log = self.inner.latch.lock().await;
        if self.issued_response() {
            return Err(ResponseError::AlreadyResponded);
        }

        self.inner.client.start_modal(modal)?;
        let result = self
            .send_initial(&mut log, InteractionResponse::modal(modal.build()))
            .await;
        if result.is_err() {
            modal.stop();
        }
        result
    }

    /// Issues the autodefer acknowledgement unless something already
    /// responded. Returns whether a deferral was sent.
    pub(crate) async fn autodefer(&self, options: AutodeferOptions) -> ResponseResult<bool> {
        let mut log = self.inner.latch.lock().await;
        if self.issued_response() {
            trace!("Response already issued, skipping autodefer");
            return Ok(false);
        }
        let response = InteractionResponse::deferred(options.defer_kind, options.is_ephemeral());
        self.send_initial(&mut log, response).await?;
        debug!(custom_id = %self.custom_id(), "Interaction deferred automatically");
        Ok(true)
    }

    /// Sends the initial response. Caller must hold the latch.
    async fn send_initial(
        &self,
        log: &mut ResponseLog,
        response: InteractionResponse,
    ) -> ResponseResult<()> {
        let kind = response.kind;
        self.inner.interaction.create_response(response).await?;
        self.inner.issued.store(true, Ordering::SeqCst);
        log.first_at = Some(Instant::now());
        log.kinds.push(kind);
        Ok(())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("interaction", &self.data().id)
            .field("custom_id", &self.custom_id())
            .field("issued_response", &self.issued_response())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ViewContext
// =============================================================================

/// Context passed to view item callbacks and view hooks.
#[derive(Clone, Debug)]
pub struct ViewContext {
    base: Context,
    view: View,
    item: Item,
}

impl ViewContext {
    pub(crate) fn new(base: Context, view: View, item: Item) -> Self {
        Self { base, view, item }
    }

    /// The view that received the interaction.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Snapshot of the item that was interacted with.
    pub fn item(&self) -> &Item {
        &self.item
    }

    /// Selected values, for select menus.
    pub fn values(&self) -> &[String] {
        &self.data().values
    }

    pub fn base(&self) -> &Context {
        &self.base
    }
}

impl Deref for ViewContext {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

// =============================================================================
// ModalContext
// =============================================================================

/// Context passed to modal callbacks and modal hooks.
#[derive(Clone, Debug)]
pub struct ModalContext {
    base: Context,
    modal: Modal,
    values: HashMap<String, String>,
}

impl ModalContext {
    pub(crate) fn new(base: Context, modal: Modal, values: HashMap<String, String>) -> Self {
        Self {
            base,
            modal,
            values,
        }
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    /// Submitted value of the text input with `custom_id`.
    pub fn value(&self, custom_id: &str) -> Option<&str> {
        self.values.get(custom_id).map(String::as_str)
    }

    /// Every submitted value keyed by text input custom_id.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    pub fn base(&self) -> &Context {
        &self.base
    }
}

impl Deref for ModalContext {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}
