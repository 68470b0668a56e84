//! Turns one inbound interaction into at most one callback invocation.
//!
//! ```text
//! interaction ─▶ resolve ─┬─ none ──▶ unhandled hook
//!                         ├─ view ──▶ item ─▶ check ─▶ callback ∥ autodefer timer ─▶ touch
//!                         └─ modal ─▶ values ─▶ check ─▶ consume ─▶ callback ∥ autodefer timer
//! ```
//!
//! Callbacks run in their own task so a panic is contained and reported to
//! `on_error` like any other failure. A panicking `check` is reported the
//! same way and counts as a rejection; a panicking `on_error` is logged. Interactions for the same session are
//! not serialized: two concurrent clicks run two callbacks concurrently.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use rivet_core::{AutodeferOptions, BoxedInteraction, InteractionKind, Item};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span, trace, warn};

use crate::client::Client;
use crate::context::{Context, ModalContext, ViewContext};
use crate::error::{CallbackError, DispatchError, DispatchResult};
use crate::modal::Modal;
use crate::registry::SessionHandle;
use crate::view::{CallbackFuture, View};

/// What happened to a dispatched interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// A session callback ran, successfully or not.
    Handled,
    /// No running session owns the interaction; the unhandled hook ran.
    Unhandled,
    /// The session's `check` hook rejected the interaction.
    CheckFailed,
    /// Dropped without running anything: not a component or modal
    /// interaction, a submission with no matching inputs, or a session that
    /// stopped while the interaction was in flight.
    Ignored,
}

pub(crate) async fn dispatch(
    client: &Client,
    interaction: BoxedInteraction,
) -> DispatchResult<DispatchOutcome> {
    let data = interaction.data();
    let span = info_span!(
        "dispatch",
        interaction = %data.id,
        kind = ?data.kind,
        custom_id = %data.custom_id,
    );
    dispatch_inner(client, interaction).instrument(span)
        .await
}

async fn dispatch_inner(
    client: &Client,
    interaction: BoxedInteraction,
) -> DispatchResult<DispatchOutcome> {
    let data = interaction.data();
    if data.kind == InteractionKind::Other {
        trace!("Not a component interaction");
        return Ok(DispatchOutcome::Ignored);
    }

    match client.registry().resolve(data) {
        Some(SessionHandle::View(view)) => dispatch_view(client, interaction, view).await,
        Some(SessionHandle::Modal(modal)) => Ok(dispatch_modal(client, interaction, modal).await),
        None => {
            unhandled(client, interaction).await;
            Ok(DispatchOutcome::Unhandled)
        }
    }
}

async fn unhandled(client: &Client, interaction: BoxedInteraction) {
    let kind = interaction.data().kind;
    match client.unhandled_hook(kind) {
        Some(hook) => {
            debug!("No running session owns this interaction, calling unhandled hook");
            hook(Context::new(interaction, client.clone())).await;
        }
        None => debug!("No running session owns this interaction"),
    }
}

// =============================================================================
// Views
// =============================================================================

async fn dispatch_view(
    client: &Client,
    interaction: BoxedInteraction,
    view: View,
) -> DispatchResult<DispatchOutcome> {
    let data = interaction.data();
    let Some((item, callback)) = view.find_routable(&data.custom_id) else {
        error!(
            session = %view.id(),
            custom_id = %data.custom_id,
            "Resolved view has no item with this custom_id"
        );
        return Err(DispatchError::ItemMissing {
            session: view.id(),
            custom_id: data.custom_id.clone(),
        });
    };

    if let Some(message_id) = data.message_id {
        client.registry().bind_on_first_use(view.id(), message_id);
    }

    let ctx = ViewContext::new(
        Context::new(interaction.clone(), client.clone()),
        view.clone(),
        item.clone(),
    );
    match contain(view.hooks().check(&ctx)).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(session = %view.id(), "View check rejected interaction");
            return Ok(DispatchOutcome::CheckFailed);
        }
        Err(message) => {
            error!(session = %view.id(), panic = %message, "View check panicked");
            view_error(&view, &CallbackError::Panicked(message), &item, &ctx).await;
            return Ok(DispatchOutcome::CheckFailed);
        }
    }
    if !view.is_active() {
        debug!(session = %view.id(), "View stopped before callback could run");
        return Ok(DispatchOutcome::Ignored);
    }

    let future = match &callback {
        Some(callback) => callback(ctx.clone(), item.clone()),
        None => async { Ok(()) }.boxed(),
    };
    let options = item.get_autodefer().unwrap_or_else(|| view.autodefer());
    let result = run_callback(
        ctx.base().clone(),
        options,
        client.config().autodefer_grace,
        future,
    )
    .await;

    if let Err(error) = result {
        view_error(&view, &error, &item, &ctx).await;
    }
    view.core().touch();
    Ok(DispatchOutcome::Handled)
}

// =============================================================================
// Modals
// =============================================================================

async fn dispatch_modal(
    client: &Client,
    interaction: BoxedInteraction,
    modal: Modal,
) -> DispatchOutcome {
    let inputs = modal.input_ids();
    let values: HashMap<String, String> = interaction
        .data()
        .fields
        .iter()
        .filter(|field| inputs.contains(&field.custom_id))
        .map(|field| (field.custom_id.clone(), field.value.clone()))
        .collect();
    if values.is_empty() {
        debug!(modal = %modal.custom_id(), "Submission has no values for this modal's inputs");
        return DispatchOutcome::Ignored;
    }

    let ctx = ModalContext::new(
        Context::new(interaction.clone(), client.clone()),
        modal.clone(),
        values,
    );
    match contain(modal.hooks().check(&ctx)).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(modal = %modal.custom_id(), "Modal check rejected submission");
            return DispatchOutcome::CheckFailed;
        }
        Err(message) => {
            error!(modal = %modal.custom_id(), panic = %message, "Modal check panicked");
            modal_error(&modal, &CallbackError::Panicked(message), &ctx).await;
            return DispatchOutcome::CheckFailed;
        }
    }
    if !modal.stop() {
        debug!(modal = %modal.custom_id(), "Modal was already consumed");
        return DispatchOutcome::Ignored;
    }

    let future = match modal.callback() {
        Some(callback) => callback(ctx.clone()),
        None => async { Ok(()) }.boxed(),
    };
    let result = run_callback(
        ctx.base().clone(),
        modal.autodefer(),
        client.config().autodefer_grace,
        future,
    )
    .await;

    if let Err(error) = result {
        modal_error(&modal, &error, &ctx).await;
    }
    DispatchOutcome::Handled
}

// =============================================================================
// Hooks
// =============================================================================

/// Awaits a hook, turning a panic into its message.
async fn contain<T>(hook: impl Future<Output = T>) -> Result<T, String> {
    AssertUnwindSafe(hook).catch_unwind().await.map_err(panic_message)
}

async fn view_error(view: &View, error: &CallbackError, item: &Item, ctx: &ViewContext) {
    if let Err(message) = contain(view.hooks().on_error(error, Some(item), Some(ctx))).await {
        error!(session = %view.id(), panic = %message, "on_error hook panicked");
    }
}

async fn modal_error(modal: &Modal, error: &CallbackError, ctx: &ModalContext) {
    if let Err(message) = contain(modal.hooks().on_error(error, Some(ctx))).await {
        error!(modal = %modal.custom_id(), panic = %message, "on_error hook panicked");
    }
}

// =============================================================================
// Callback execution
// =============================================================================

/// Runs `future` in its own task, racing it against the autodefer timer.
///
/// Both sides go through the context's response latch, so at most one
/// initial response is sent. If the callback succeeds without responding,
/// the deferral is sent right away instead of waiting out the grace period.
async fn run_callback(
    ctx: Context,
    options: AutodeferOptions,
    grace: Duration,
    future: CallbackFuture,
) -> Result<(), CallbackError> {
    let task = tokio::spawn(future.in_current_span());
    if !options.is_enabled() {
        return join_callback(task.await);
    }

    let cancel = CancellationToken::new();
    let timer = tokio::spawn({
        let ctx = ctx.clone();
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(grace) => {
                    if let Err(e) = ctx.autodefer(options).await {
                        warn!(error = %e, "Autodefer failed");
                    }
                }
            }
        }
        .in_current_span()
    });

    let result = join_callback(task.await);
    cancel.cancel();

    if result.is_ok()
        && !ctx.issued_response()
        && let Err(e) = ctx.autodefer(options).await
    {
        warn!(error = %e, "Autodefer failed");
    }
    if let Err(e) = timer.await {
        warn!(error = %e, "Autodefer timer task failed");
    }
    result
}

fn join_callback(joined: Result<anyhow::Result<()>, JoinError>) -> Result<(), CallbackError> {
    match joined {
        Ok(result) => result.map_err(CallbackError::Failed),
        Err(e) if e.is_panic() => Err(CallbackError::Panicked(panic_message(e.into_panic()))),
        Err(_) => Err(CallbackError::Cancelled),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rivet_core::{
        Button, DeferKind, InteractionData, Item, MessagePayload, ResponseType, Snowflake,
        SubmittedField, TextInput,
    };

    use super::*;
    use crate::config::ClientConfig;
    use crate::hooks::{ModalHooks, ViewHooks};
    use crate::registry::Binding;
    use crate::session::SessionState;
    use crate::testing::MockInteraction;

    fn client() -> Client {
        Client::new(ClientConfig::default())
    }

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[derive(Default)]
    struct Recorder {
        timeouts: AtomicUsize,
        errors: parking_lot::Mutex<Vec<(String, Option<String>)>>,
        allow: Option<u64>,
    }

    #[async_trait]
    impl ViewHooks for Arc<Recorder> {
        async fn check(&self, ctx: &ViewContext) -> bool {
            self.allow.is_none_or(|user| ctx.user_id().0 == user)
        }

        async fn on_timeout(&self, _view: &View) -> anyhow::Result<()> {
            self.timeouts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_error(
            &self,
            error: &CallbackError,
            item: Option<&Item>,
            _ctx: Option<&ViewContext>,
        ) {
            self.errors.lock().push((
                error.to_string(),
                item.and_then(Item::get_custom_id).map(str::to_string),
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_yes_no_scenario() {
        let client = client();
        let recorder = Arc::new(Recorder::default());
        let (yes, no) = (counter(), counter());

        let view = View::builder()
            .hooks(recorder.clone())
            .timeout(Some(Duration::from_secs(5)))
            .item(Item::from(Button::success()).custom_id("yes"), {
                let yes = yes.clone();
                move |ctx, _| {
                    let yes = yes.clone();
                    async move {
                        yes.fetch_add(1, Ordering::SeqCst);
                        ctx.respond(MessagePayload::text("yes")).await?;
                        Ok(())
                    }
                }
            })
            .item(Item::from(Button::danger()).custom_id("no"), {
                let no = no.clone();
                move |_, _| {
                    let no = no.clone();
                    async move {
                        no.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(10)).unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        let mock = MockInteraction::new(InteractionData::component(1u64, "yes").message(10u64));
        let outcome = client.handle_interaction(mock.clone()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(yes.load(Ordering::SeqCst), 1);
        assert_eq!(no.load(Ordering::SeqCst), 0);
        assert_eq!(view.state(), SessionState::Active);
        assert_eq!(mock.response_kinds(), vec![ResponseType::ChannelMessage]);

        // Activity at t=3 pushes the deadline to t=8.
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(view.state(), SessionState::Active);

        view.wait().await;
        assert_eq!(view.state(), SessionState::Stopped);
        assert_eq!(recorder.timeouts.load(Ordering::SeqCst), 1);

        for custom_id in ["yes", "no"] {
            let data = InteractionData::component(2u64, custom_id).message(10u64);
            assert!(client.registry().resolve(&data).is_none());
        }
        let late = MockInteraction::new(InteractionData::component(3u64, "yes").message(10u64));
        assert_eq!(
            client.handle_interaction(late).await.unwrap(),
            DispatchOutcome::Unhandled
        );
        assert_eq!(yes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_routes_to_matching_item() {
        let client = client();
        let hits = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let record = |hits: Arc<parking_lot::Mutex<Vec<String>>>| {
            move |_: ViewContext, item: Item| {
                let hits = hits.clone();
                async move {
                    hits.lock()
                        .push(item.get_custom_id().unwrap_or_default().to_string());
                    Ok(())
                }
            }
        };
        let view = View::builder()
            .timeout(None)
            .item(Item::from(Button::primary()).custom_id("x"), record(hits.clone()))
            .item(Item::from(Button::primary()).custom_id("y"), record(hits.clone()))
            .build()
            .unwrap();
        client.start_view(&view, Binding::Unbound).unwrap();

        let mock = MockInteraction::new(InteractionData::component(1u64, "y").message(55u64));
        client.handle_interaction(mock).await.unwrap();
        assert_eq!(*hits.lock(), vec!["y".to_string()]);
        // Persistent views stay routable by custom_id.
        assert!(client.get_view(Snowflake(55)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_view_binds_on_first_use() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("go"), |_, _| async { Ok(()) })
            .build()
            .unwrap();
        client.start_view(&view, Binding::Unbound).unwrap();
        assert_eq!(client.stats().unbound_views, 1);

        let mock = MockInteraction::new(InteractionData::component(1u64, "go").message(77u64));
        client.handle_interaction(mock).await.unwrap();

        assert_eq!(view.message_id(), Some(Snowflake(77)));
        assert_eq!(client.stats().bound_views, 1);
        assert!(client.get_view(Snowflake(77)).is_some());

        // Same custom_id on another message no longer reaches the view.
        let other = MockInteraction::new(InteractionData::component(2u64, "go").message(78u64));
        assert_eq!(
            client.handle_interaction(other).await.unwrap(),
            DispatchOutcome::Unhandled
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_failure_is_isolated() {
        let client = client();
        let recorder = Arc::new(Recorder::default());
        let ok = counter();
        let view = View::builder()
            .hooks(recorder.clone())
            .item(Item::from(Button::danger()).custom_id("boom"), |_, _| async {
                anyhow::bail!("exploded")
            })
            .item(Item::from(Button::primary()).custom_id("panic"), |_, _| async {
                panic!("callback panicked on purpose")
            })
            .item(Item::from(Button::success()).custom_id("fine"), {
                let ok = ok.clone();
                move |_, _| {
                    let ok = ok.clone();
                    async move {
                        ok.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(1)).unwrap();

        for (id, custom_id) in [(1u64, "boom"), (2, "panic"), (3, "fine")] {
            let mock = MockInteraction::new(InteractionData::component(id, custom_id).message(1u64));
            assert_eq!(
                client.handle_interaction(mock).await.unwrap(),
                DispatchOutcome::Handled
            );
        }

        let errors = recorder.errors.lock().clone();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].0, "callback failed: exploded");
        assert_eq!(errors[0].1.as_deref(), Some("boom"));
        assert_eq!(
            errors[1].0,
            "callback panicked: callback panicked on purpose"
        );
        assert_eq!(ok.load(Ordering::SeqCst), 1);
        assert!(view.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_rejects_silently() {
        let client = client();
        let ran = counter();
        let view = View::builder()
            .hooks(Arc::new(Recorder {
                allow: Some(42),
                ..Default::default()
            }))
            .item(Item::from(Button::primary()).custom_id("owner"), {
                let ran = ran.clone();
                move |_, _| {
                    let ran = ran.clone();
                    async move {
                        ran.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                }
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(5)).unwrap();

        let stranger = MockInteraction::new(
            InteractionData::component(1u64, "owner").message(5u64).user(7u64),
        );
        assert_eq!(
            client.handle_interaction(stranger.clone()).await.unwrap(),
            DispatchOutcome::CheckFailed
        );
        assert!(stranger.response_kinds().is_empty());

        let owner = MockInteraction::new(
            InteractionData::component(2u64, "owner").message(5u64).user(42u64),
        );
        assert_eq!(
            client.handle_interaction(owner).await.unwrap(),
            DispatchOutcome::Handled
        );
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_response_suppresses_autodefer() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("quick"), |ctx, _| async move {
                ctx.respond(MessagePayload::text("done")).await?;
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(9)).unwrap();

        let mock = MockInteraction::new(InteractionData::component(1u64, "quick").message(9u64));
        client.handle_interaction(mock.clone()).await.unwrap();
        assert_eq!(mock.response_kinds(), vec![ResponseType::ChannelMessage]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_elapsed_defers_once() {
        let client = client();
        let late_result = Arc::new(parking_lot::Mutex::new(None));
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("slow"), {
                let late_result = late_result.clone();
                move |ctx, _| {
                    let late_result = late_result.clone();
                    async move {
                        tokio::time::sleep(Duration::from_secs(3)).await;
                        let deferred = ctx.defer(DeferKind::MessageUpdate, false).await;
                        *late_result.lock() = Some(deferred.is_err());
                        ctx.respond(MessagePayload::text("finally")).await?;
                        Ok(())
                    }
                }
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(9)).unwrap();

        let mock = MockInteraction::new(InteractionData::component(1u64, "slow").message(9u64));
        client.handle_interaction(mock.clone()).await.unwrap();

        assert_eq!(mock.response_kinds(), vec![ResponseType::DeferredMessageUpdate]);
        assert_eq!(*late_result.lock(), Some(true));
        assert_eq!(mock.followups().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_callback_is_deferred_on_completion() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("noop"), |_, _| async { Ok(()) })
            .plain_item(Item::from(Button::secondary()).custom_id("bare"))
            .item(
                Item::from(Button::secondary())
                    .custom_id("manual")
                    .autodefer(false),
                |_, _| async { Ok(()) },
            )
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(3)).unwrap();

        let start = tokio::time::Instant::now();
        let noop = MockInteraction::new(InteractionData::component(1u64, "noop").message(3u64));
        client.handle_interaction(noop.clone()).await.unwrap();
        assert_eq!(noop.response_kinds(), vec![ResponseType::DeferredMessageUpdate]);
        assert!(start.elapsed() < Duration::from_secs(1));

        let bare = MockInteraction::new(InteractionData::component(2u64, "bare").message(3u64));
        client.handle_interaction(bare.clone()).await.unwrap();
        assert_eq!(bare.response_kinds(), vec![ResponseType::DeferredMessageUpdate]);

        let manual = MockInteraction::new(InteractionData::component(3u64, "manual").message(3u64));
        client.handle_interaction(manual.clone()).await.unwrap();
        assert!(manual.response_kinds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_callback_is_not_deferred_afterwards() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("fail"), |_, _| async {
                anyhow::bail!("nope")
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(4)).unwrap();

        let mock = MockInteraction::new(InteractionData::component(1u64, "fail").message(4u64));
        client.handle_interaction(mock.clone()).await.unwrap();
        assert!(mock.response_kinds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_inside_callback_is_not_revived() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::danger()).custom_id("close"), |ctx, _| async move {
                ctx.view().stop();
                Ok(())
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(6)).unwrap();

        let mock = MockInteraction::new(InteractionData::component(1u64, "close").message(6u64));
        client.handle_interaction(mock).await.unwrap();
        assert_eq!(view.state(), SessionState::Stopped);
        assert!(client.get_view(Snowflake(6)).is_none());
    }

    // ─── modals ───

    #[derive(Default)]
    struct ModalRecorder {
        errors: AtomicUsize,
        reject: bool,
    }

    #[async_trait]
    impl ModalHooks for Arc<ModalRecorder> {
        async fn check(&self, _ctx: &ModalContext) -> bool {
            !self.reject
        }

        async fn on_error(&self, _error: &CallbackError, _ctx: Option<&ModalContext>) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn feedback_modal(hooks: Arc<ModalRecorder>, submitted: Arc<parking_lot::Mutex<Vec<String>>>) -> Modal {
        Modal::builder("Feedback")
            .custom_id("feedback")
            .hooks(hooks)
            .text_input("comment", TextInput::new("Comment"))
            .on_submit(move |ctx| {
                let submitted = submitted.clone();
                async move {
                    submitted
                        .lock()
                        .push(ctx.value("comment").unwrap_or_default().to_string());
                    ctx.respond(MessagePayload::text("thanks")).await?;
                    Ok(())
                }
            })
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_is_single_use() {
        let client = client();
        let submitted = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let modal = feedback_modal(Arc::default(), submitted.clone());
        client.start_modal(&modal).unwrap();

        let ignored = MockInteraction::new(InteractionData::modal_submit(
            1u64,
            "feedback",
            [SubmittedField::new("unrelated", "x")],
        ));
        assert_eq!(
            client.handle_interaction(ignored).await.unwrap(),
            DispatchOutcome::Ignored
        );
        assert_eq!(modal.state(), SessionState::Active);

        let submit = MockInteraction::new(InteractionData::modal_submit(
            2u64,
            "feedback",
            [SubmittedField::new("comment", "great")],
        ));
        assert_eq!(
            client.handle_interaction(submit.clone()).await.unwrap(),
            DispatchOutcome::Handled
        );
        assert_eq!(*submitted.lock(), vec!["great".to_string()]);
        assert_eq!(submit.response_kinds(), vec![ResponseType::ChannelMessage]);
        assert_eq!(modal.state(), SessionState::Stopped);

        let again = MockInteraction::new(InteractionData::modal_submit(
            3u64,
            "feedback",
            [SubmittedField::new("comment", "twice")],
        ));
        assert_eq!(
            client.handle_interaction(again).await.unwrap(),
            DispatchOutcome::Unhandled
        );
        assert_eq!(submitted.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_modal_stays_open() {
        let client = client();
        let submitted = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let hooks = Arc::new(ModalRecorder {
            reject: true,
            ..Default::default()
        });
        let modal = feedback_modal(hooks, submitted.clone());
        client.start_modal(&modal).unwrap();

        let submit = MockInteraction::new(InteractionData::modal_submit(
            1u64,
            "feedback",
            [SubmittedField::new("comment", "hi")],
        ));
        assert_eq!(
            client.handle_interaction(submit).await.unwrap(),
            DispatchOutcome::CheckFailed
        );
        assert!(submitted.lock().is_empty());
        assert_eq!(modal.state(), SessionState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_modal_error_reaches_hook() {
        let client = client();
        let hooks = Arc::new(ModalRecorder::default());
        let modal = Modal::builder("Broken")
            .hooks(hooks.clone())
            .text_input("field", TextInput::new("Field"))
            .on_submit(|_| async { anyhow::bail!("storage unavailable") })
            .build()
            .unwrap();
        client.start_modal(&modal).unwrap();

        let submit = MockInteraction::new(InteractionData::modal_submit(
            1u64,
            modal.custom_id(),
            [SubmittedField::new("field", "value")],
        ));
        client.handle_interaction(submit.clone()).await.unwrap();
        assert_eq!(hooks.errors.load(Ordering::SeqCst), 1);
        assert!(submit.response_kinds().is_empty());
        assert_eq!(modal.state(), SessionState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolved_view_without_item_is_a_defect() {
        let client = client();
        let view = View::builder()
            .item(Item::from(Button::primary()).custom_id("x"), |_, _| async { Ok(()) })
            .item(Item::from(Button::primary()).custom_id("y"), |_, _| async { Ok(()) })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(8)).unwrap();
        view.remove_item("x");

        let mock = MockInteraction::new(InteractionData::component(1u64, "x").message(8u64));
        assert_eq!(
            client.handle_interaction(mock.clone()).await,
            Err(DispatchError::ItemMissing {
                session: view.id(),
                custom_id: "x".to_string(),
            })
        );
        assert!(mock.response_kinds().is_empty());
        assert!(view.is_active());
    }

    struct PanickingHooks {
        errors: AtomicUsize,
    }

    #[async_trait]
    impl ViewHooks for Arc<PanickingHooks> {
        async fn check(&self, ctx: &ViewContext) -> bool {
            if ctx.user_id().0 == 13 {
                panic!("check blew up");
            }
            true
        }

        async fn on_error(
            &self,
            _error: &CallbackError,
            _item: Option<&Item>,
            _ctx: Option<&ViewContext>,
        ) {
            self.errors.fetch_add(1, Ordering::SeqCst);
            panic!("on_error blew up");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_hooks_are_contained() {
        let client = client();
        let hooks = Arc::new(PanickingHooks {
            errors: AtomicUsize::new(0),
        });
        let ran = counter();
        let view = View::builder()
            .hooks(hooks.clone())
            .item(Item::from(Button::primary()).custom_id("go"), {
                let ran = ran.clone();
                move |_, _| {
                    let ran = ran.clone();
                    async move {
                        ran.fetch_add(1, Ordering::SeqCst);
                        anyhow::bail!("callback failed")
                    }
                }
            })
            .build()
            .unwrap();
        client.start_view(&view, Snowflake(3)).unwrap();

        let unlucky = MockInteraction::new(
            InteractionData::component(1u64, "go").message(3u64).user(13u64),
        );
        assert_eq!(
            client.handle_interaction(unlucky).await.unwrap(),
            DispatchOutcome::CheckFailed
        );
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(hooks.errors.load(Ordering::SeqCst), 1);

        let normal = MockInteraction::new(
            InteractionData::component(2u64, "go").message(3u64).user(7u64),
        );
        assert_eq!(
            client.handle_interaction(normal).await.unwrap(),
            DispatchOutcome::Handled
        );
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        assert_eq!(hooks.errors.load(Ordering::SeqCst), 2);
        assert!(view.is_active());
    }

    #[derive(Default)]
    struct PanickingModalCheck;

    #[async_trait]
    impl ModalHooks for PanickingModalCheck {
        async fn check(&self, _ctx: &ModalContext) -> bool {
            panic!("modal check blew up")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_modal_check_keeps_modal_open() {
        let client = client();
        let modal = Modal::builder("Form")
            .hooks(PanickingModalCheck)
            .text_input("field", TextInput::new("Field"))
            .build()
            .unwrap();
        client.start_modal(&modal).unwrap();

        let submit = MockInteraction::new(InteractionData::modal_submit(
            1u64,
            modal.custom_id(),
            [SubmittedField::new("field", "value")],
        ));
        assert_eq!(
            client.handle_interaction(submit).await.unwrap(),
            DispatchOutcome::CheckFailed
        );
        assert_eq!(modal.state(), SessionState::Active);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new(String::from("owned"))), "owned");
        assert_eq!(panic_message(Box::new(5u8)), "unknown panic payload");
    }
}
