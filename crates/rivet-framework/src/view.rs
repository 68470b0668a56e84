//! Views: message-attached sessions with per-item callbacks.
//!
//! # Building a view
//!
//! Either chain items onto a [`ViewBuilder`]:
//!
//! ```rust,ignore
//! let view = View::builder()
//!     .timeout(Some(Duration::from_secs(60)))
//!     .item(Item::from(Button::success().label("Yes")).custom_id("yes"), |ctx, _item| async move {
//!         ctx.respond(MessagePayload::text("Confirmed")).await?;
//!         ctx.view().stop();
//!         Ok(())
//!     })
//!     .build()?;
//! client.start_view(&view, message_id)?;
//! ```
//!
//! or declare the items once on a type implementing [`DeclarativeView`] and
//! build with [`ViewBuilder::declared`]. Each declaration pairs an item with
//! a plain function pointer, so the table is fixed at compile time.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::RwLock;
use rivet_core::item::{MAX_ITEMS, build_rows};
use rivet_core::{
    ActionRow, AutodeferOptions, ComponentError, ComponentFetcher, ComponentResult, Item,
    ItemKind, RowLayout, Snowflake,
};
use tracing::{trace, warn};

use crate::config::DEFAULT_VIEW_TIMEOUT;
use crate::context::ViewContext;
use crate::error::ReconstructError;
use crate::hooks::{DefaultHooks, ViewHooks};
use crate::session::{SessionCore, SessionId, SessionState, TimeoutSetting};

/// Future returned by callbacks.
pub type CallbackFuture = BoxFuture<'static, anyhow::Result<()>>;

/// Callback bound to a view item. Receives the context and a snapshot of
/// the triggering item.
pub type ItemCallback = Arc<dyn Fn(ViewContext, Item) -> CallbackFuture + Send + Sync>;

fn boxed_callback<F, Fut>(callback: F) -> ItemCallback
where
    F: Fn(ViewContext, Item) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |ctx, item| callback(ctx, item).boxed())
}

// =============================================================================
// View
// =============================================================================

struct Slot {
    item: Item,
    callback: Option<ItemCallback>,
}

#[derive(Default)]
struct Items {
    slots: Vec<Slot>,
    layout: RowLayout,
}

struct ViewInner {
    core: SessionCore,
    hooks: Arc<dyn ViewHooks>,
    autodefer: AutodeferOptions,
    items: RwLock<Items>,
}

/// A set of items attached to a message.
///
/// `View` is a cheap handle; clones refer to the same view.
#[derive(Clone)]
pub struct View {
    inner: Arc<ViewInner>,
}

impl View {
    /// Starts building a view.
    pub fn builder() -> ViewBuilder {
        ViewBuilder::new()
    }

    // ─── items ───

    /// Adds an item without a callback.
    pub fn add_item(&self, item: impl Into<Item>) -> ComponentResult<()> {
        self.insert(item.into(), None)
    }

    /// Adds an item with a callback.
    pub fn add_item_with<F, Fut>(&self, item: impl Into<Item>, callback: F) -> ComponentResult<()>
    where
        F: Fn(ViewContext, Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.insert(item.into(), Some(boxed_callback(callback)))
    }

    fn insert(&self, mut item: Item, callback: Option<ItemCallback>) -> ComponentResult<()> {
        if let ItemKind::TextInput(_) = item.kind() {
            return Err(ComponentError::NotAllowed {
                kind: item.kind().name(),
                container: "view",
            });
        }
        item.validate()?;

        {
            let mut items = self.inner.items.write();
            if items.slots.len() >= MAX_ITEMS {
                return Err(ComponentError::HandlerFull {
                    width: item.width(),
                });
            }
            if let Some(custom_id) = item.get_custom_id()
                && items
                    .slots
                    .iter()
                    .any(|slot| slot.item.get_custom_id() == Some(custom_id))
            {
                return Err(ComponentError::ItemAlreadyAttached(custom_id.to_string()));
            }
            items.layout.place(&mut item)?;
            items.slots.push(Slot { item, callback });
        }

        self.reindex();
        Ok(())
    }

    /// Removes the item with `custom_id` and returns it.
    pub fn remove_item(&self, custom_id: &str) -> Option<Item> {
        let removed = {
            let mut items = self.inner.items.write();
            let index = items
                .slots
                .iter()
                .position(|slot| slot.item.get_custom_id() == Some(custom_id))?;
            let Items { slots, layout } = &mut *items;
            let mut slot = slots.remove(index);
            layout.release(&mut slot.item);
            slot.item
        };

        self.reindex();
        Some(removed)
    }

    /// Removes every item.
    pub fn clear_items(&self) {
        {
            let mut items = self.inner.items.write();
            items.slots.clear();
            items.layout.clear();
        }
        self.reindex();
    }

    /// Snapshot of the items in insertion order.
    pub fn items(&self) -> Vec<Item> {
        self.inner
            .items
            .read()
            .slots
            .iter()
            .map(|slot| slot.item.clone())
            .collect()
    }

    pub fn get_item(&self, custom_id: &str) -> Option<Item> {
        self.inner
            .items
            .read()
            .slots
            .iter()
            .find(|slot| slot.item.get_custom_id() == Some(custom_id))
            .map(|slot| slot.item.clone())
    }

    /// Mutates the item with `custom_id` in place. Returns whether the
    /// update was applied.
    ///
    /// Identity, row and width cannot be changed this way; an update that
    /// touches them is rolled back. Remove and re-add the item instead.
    pub fn update_item(&self, custom_id: &str, update: impl FnOnce(&mut Item)) -> bool {
        let mut items = self.inner.items.write();
        let Some(slot) = items
            .slots
            .iter_mut()
            .find(|slot| slot.item.get_custom_id() == Some(custom_id))
        else {
            return false;
        };

        let original = slot.item.clone();
        update(&mut slot.item);
        let placed = slot.item.get_custom_id() == original.get_custom_id()
            && slot.item.get_row() == original.get_row()
            && slot.item.rendered_row() == original.rendered_row()
            && slot.item.width() == original.width();
        if !placed {
            warn!(session = %self.id(), custom_id, "Rejected item update that changes its placement");
            slot.item = original;
        }
        placed
    }

    /// Disables every item, including link buttons.
    pub fn disable_all(&self) {
        for slot in &mut self.inner.items.write().slots {
            slot.item.set_disabled(true);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.items.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the items into action rows.
    pub fn build(&self) -> Vec<ActionRow> {
        let items = self.inner.items.read();
        build_rows(items.slots.iter().map(|slot| &slot.item))
    }

    pub(crate) fn find_routable(&self, custom_id: &str) -> Option<(Item, Option<ItemCallback>)> {
        self.inner
            .items
            .read()
            .slots
            .iter()
            .find(|slot| slot.item.is_routable() && slot.item.get_custom_id() == Some(custom_id))
            .map(|slot| (slot.item.clone(), slot.callback.clone()))
    }

    pub(crate) fn routing_ids(&self) -> Vec<String> {
        self.inner
            .items
            .read()
            .slots
            .iter()
            .filter(|slot| slot.item.is_routable())
            .filter_map(|slot| slot.item.get_custom_id().map(str::to_string))
            .collect()
    }

    fn reindex(&self) {
        if self.inner.core.is_active()
            && let Some(registry) = self.inner.core.registry()
        {
            registry.reindex(self.id());
        }
    }

    // ─── session ───

    pub fn id(&self) -> SessionId {
        self.inner.core.id()
    }

    pub fn state(&self) -> SessionState {
        self.inner.core.state()
    }

    pub fn is_active(&self) -> bool {
        self.inner.core.is_active()
    }

    /// Inactivity timeout. Before the view is started this reports the
    /// built-in default if none was chosen.
    pub fn timeout(&self) -> Option<Duration> {
        self.inner.core.timeout_or(Some(DEFAULT_VIEW_TIMEOUT))
    }

    /// Whether the view survives restarts: no timeout and every routable
    /// item has an explicit custom_id.
    pub fn is_persistent(&self) -> bool {
        self.inner.core.timeout_setting() == TimeoutSetting::Explicit(None)
            && self
                .inner
                .items
                .read()
                .slots
                .iter()
                .filter(|slot| slot.item.is_routable())
                .all(|slot| slot.item.has_explicit_custom_id())
    }

    /// Message the view is bound to, if any.
    pub fn message_id(&self) -> Option<Snowflake> {
        self.inner.core.message_id()
    }

    pub fn autodefer(&self) -> AutodeferOptions {
        self.inner.autodefer
    }

    pub fn hooks(&self) -> &Arc<dyn ViewHooks> {
        &self.inner.hooks
    }

    /// Stops the view. It is unrouted immediately and `on_timeout` does not
    /// fire. Returns whether the view was running.
    pub fn stop(&self) -> bool {
        self.inner.core.stop()
    }

    /// Waits until the view has stopped. Dropping the future has no effect
    /// on the view.
    pub async fn wait(&self) {
        self.inner.core.wait().await;
    }

    pub(crate) fn core(&self) -> &SessionCore {
        &self.inner.core
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.id())
            .field("state", &self.state())
            .field("message_id", &self.message_id())
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Declarative views
// =============================================================================

/// Function-pointer callback used in declarations.
pub type DeclaredCallback<T> = fn(Arc<T>, ViewContext, Item) -> CallbackFuture;

/// One row of a view's static registration table.
pub struct ItemDecl<T> {
    item: Item,
    callback: Option<DeclaredCallback<T>>,
}

impl<T> ItemDecl<T> {
    /// An item bound to `callback`.
    pub fn new(item: impl Into<Item>, callback: DeclaredCallback<T>) -> Self {
        Self {
            item: item.into(),
            callback: Some(callback),
        }
    }

    /// An item without a callback, such as a link button.
    pub fn plain(item: impl Into<Item>) -> Self {
        Self {
            item: item.into(),
            callback: None,
        }
    }
}

/// A view type whose items are declared once.
///
/// ```rust,ignore
/// struct Confirm { answered: AtomicBool }
///
/// impl ViewHooks for Confirm {}
///
/// impl DeclarativeView for Confirm {
///     fn items() -> Vec<ItemDecl<Self>> {
///         vec![
///             ItemDecl::new(Item::from(Button::success().label("Yes")).custom_id("yes"),
///                 |this, ctx, _| Box::pin(async move { this.answer(&ctx, true).await })),
///             ItemDecl::new(Item::from(Button::danger().label("No")).custom_id("no"),
///                 |this, ctx, _| Box::pin(async move { this.answer(&ctx, false).await })),
///         ]
///     }
/// }
///
/// let view = ViewBuilder::declared(Confirm::default()).build()?;
/// ```
pub trait DeclarativeView: ViewHooks + Sized {
    fn items() -> Vec<ItemDecl<Self>>;
}

// =============================================================================
// ViewBuilder
// =============================================================================

/// Builder for [`View`].
pub struct ViewBuilder {
    hooks: Arc<dyn ViewHooks>,
    timeout: TimeoutSetting,
    autodefer: AutodeferOptions,
    items: Vec<(Item, Option<ItemCallback>)>,
    bindings: Vec<(String, ItemCallback)>,
}

impl Default for ViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBuilder {
    pub fn new() -> Self {
        Self {
            hooks: Arc::new(DefaultHooks),
            timeout: TimeoutSetting::Default,
            autodefer: AutodeferOptions::default(),
            items: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Builds the items declared by `T` and binds them to `state`.
    pub fn declared<T: DeclarativeView>(state: T) -> Self {
        let state = Arc::new(state);
        let mut builder = Self::new().hooks_arc(state.clone());

        for decl in T::items() {
            let callback = decl.callback.map(|callback| {
                let state = Arc::clone(&state);
                Arc::new(move |ctx: ViewContext, item: Item| callback(Arc::clone(&state), ctx, item))
                    as ItemCallback
            });
            builder.items.push((decl.item, callback));
        }
        builder
    }

    /// Starts from the raw component rows of a sent message.
    ///
    /// Items keep their custom_ids and rows but have no callbacks; attach
    /// them with [`bind`](Self::bind).
    pub fn from_components(rows: &[ActionRow]) -> ComponentResult<Self> {
        let mut builder = Self::new();
        for (row, action_row) in rows.iter().enumerate() {
            for component in &action_row.components {
                let item = Item::from_component(component, Some(row as u8))?;
                builder.items.push((item, None));
            }
        }
        Ok(builder)
    }

    /// Fetches a sent message's components and starts from them.
    pub async fn from_message(
        fetcher: &dyn ComponentFetcher,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<Self, ReconstructError> {
        let rows = fetcher.fetch_components(channel_id, message_id).await?;
        trace!(message_id = %message_id, rows = rows.len(), "Fetched message components");
        Ok(Self::from_components(&rows)?)
    }

    /// Sets the session hooks.
    pub fn hooks(self, hooks: impl ViewHooks) -> Self {
        self.hooks_arc(Arc::new(hooks))
    }

    pub fn hooks_arc(mut self, hooks: Arc<dyn ViewHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sets the inactivity timeout; `None` never expires.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = TimeoutSetting::Explicit(timeout);
        self
    }

    pub fn autodefer(mut self, options: impl Into<AutodeferOptions>) -> Self {
        self.autodefer = options.into();
        self
    }

    /// Adds an item with a callback.
    pub fn item<F, Fut>(mut self, item: impl Into<Item>, callback: F) -> Self
    where
        F: Fn(ViewContext, Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.items.push((item.into(), Some(boxed_callback(callback))));
        self
    }

    /// Adds an item without a callback.
    pub fn plain_item(mut self, item: impl Into<Item>) -> Self {
        self.items.push((item.into(), None));
        self
    }

    /// Attaches a callback to an already added item by custom_id.
    pub fn bind<F, Fut>(mut self, custom_id: impl Into<String>, callback: F) -> Self
    where
        F: Fn(ViewContext, Item) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.bindings
            .push((custom_id.into(), boxed_callback(callback)));
        self
    }

    /// Validates and lays out every item.
    pub fn build(mut self) -> ComponentResult<View> {
        for (custom_id, callback) in self.bindings.drain(..) {
            let slot = self
                .items
                .iter_mut()
                .find(|(item, _)| item.get_custom_id() == Some(custom_id.as_str()))
                .ok_or_else(|| {
                    ComponentError::InvalidComponent(format!(
                        "no item with custom_id '{custom_id}' to bind"
                    ))
                })?;
            slot.1 = Some(callback);
        }

        let view = View {
            inner: Arc::new(ViewInner {
                core: SessionCore::new(self.timeout),
                hooks: self.hooks,
                autodefer: self.autodefer,
                items: RwLock::new(Items::default()),
            }),
        };
        for (item, callback) in self.items {
            view.insert(item, callback)?;
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivet_core::{Button, LinkButton, SelectMenu, SelectOption, TextInput};

    fn noop(_: ViewContext, _: Item) -> CallbackFuture {
        Box::pin(async { Ok(()) })
    }

    #[test]
    fn test_builder_layout_and_render() {
        let view = View::builder()
            .item(Item::from(Button::success().label("Yes")).custom_id("yes"), noop)
            .item(Item::from(Button::danger().label("No")).custom_id("no"), noop)
            .item(
                Item::from(SelectMenu::text([SelectOption::new("A", "a")])).custom_id("pick"),
                noop,
            )
            .plain_item(LinkButton::new("https://example.com").label("Docs"))
            .build()
            .unwrap();

        assert_eq!(view.len(), 4);
        assert_eq!(view.state(), SessionState::Created);
        let rows = view.build();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].components.len(), 3);
        assert_eq!(rows[1].components[0].custom_id.as_deref(), Some("pick"));
        assert_eq!(view.routing_ids(), vec!["yes", "no", "pick"]);
    }

    #[test]
    fn test_duplicate_and_disallowed_items() {
        let view = View::builder().build().unwrap();
        view.add_item(Item::from(Button::primary()).custom_id("a"))
            .unwrap();
        assert_eq!(
            view.add_item(Item::from(Button::primary()).custom_id("a")),
            Err(ComponentError::ItemAlreadyAttached("a".to_string()))
        );
        assert!(matches!(
            view.add_item(TextInput::new("Name")),
            Err(ComponentError::NotAllowed { container: "view", .. })
        ));
    }

    #[test]
    fn test_item_limit() {
        let view = View::builder().build().unwrap();
        for _ in 0..MAX_ITEMS {
            view.add_item(Button::secondary()).unwrap();
        }
        assert!(matches!(
            view.add_item(Button::secondary()),
            Err(ComponentError::HandlerFull { .. })
        ));

        let first = view.items()[0].get_custom_id().unwrap().to_string();
        assert!(view.remove_item(&first).is_some());
        assert!(view.add_item(Button::secondary()).is_ok());
    }

    #[test]
    fn test_persistence() {
        let persistent = View::builder()
            .timeout(None)
            .item(Item::from(Button::primary()).custom_id("keep"), noop)
            .plain_item(LinkButton::new("https://example.com"))
            .build()
            .unwrap();
        assert!(persistent.is_persistent());

        let generated = View::builder()
            .timeout(None)
            .item(Button::primary(), noop)
            .build()
            .unwrap();
        assert!(!generated.is_persistent());

        let expiring = View::builder()
            .item(Item::from(Button::primary()).custom_id("keep"), noop)
            .build()
            .unwrap();
        assert!(!expiring.is_persistent());
        assert_eq!(expiring.timeout(), Some(DEFAULT_VIEW_TIMEOUT));
    }

    #[test]
    fn test_update_and_disable() {
        let view = View::builder()
            .item(Item::from(Button::primary().label("Count: 0")).custom_id("count"), noop)
            .build()
            .unwrap();

        assert!(view.update_item("count", |item| {
            if let ItemKind::Button(button) = item.kind_mut() {
                button.label = Some("Count: 1".to_string());
            }
        }));
        assert!(!view.update_item("missing", |_| {}));

        assert!(!view.update_item("count", |item| {
            *item.kind_mut() = ItemKind::Select(SelectMenu::text([SelectOption::new("a", "a")]));
        }));
        assert!(!view.update_item("count", |item| *item = item.clone().custom_id("renamed")));
        assert!(!view.update_item("count", |item| *item = item.clone().row(3)));
        assert_eq!(view.get_item("count").map(|item| item.width()), Some(1));

        view.disable_all();
        let rows = view.build();
        assert_eq!(rows[0].components[0].label.as_deref(), Some("Count: 1"));
        assert!(rows[0].components[0].disabled);
    }

    #[test]
    fn test_from_components_and_bind() {
        let source = View::builder()
            .item(Item::from(Button::primary()).custom_id("a"), noop)
            .item(Item::from(SelectMenu::role()).custom_id("b"), noop)
            .build()
            .unwrap();

        let rebuilt = ViewBuilder::from_components(&source.build())
            .unwrap()
            .bind("a", noop)
            .timeout(None)
            .build()
            .unwrap();
        assert_eq!(rebuilt.build(), source.build());
        assert!(rebuilt.is_persistent());
        assert!(rebuilt.find_routable("a").unwrap().1.is_some());
        assert!(rebuilt.find_routable("b").unwrap().1.is_none());

        let err = ViewBuilder::from_components(&source.build())
            .unwrap()
            .bind("missing", noop)
            .build()
            .unwrap_err();
        assert!(matches!(err, ComponentError::InvalidComponent(_)));
    }

    struct Counter;

    impl ViewHooks for Counter {}

    impl DeclarativeView for Counter {
        fn items() -> Vec<ItemDecl<Self>> {
            vec![
                ItemDecl::new(Item::from(Button::primary()).custom_id("inc"), |_, _, _| {
                    Box::pin(async { Ok(()) })
                }),
                ItemDecl::plain(LinkButton::new("https://example.com")),
            ]
        }
    }

    #[test]
    fn test_declared_view() {
        let view = ViewBuilder::declared(Counter).build().unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.find_routable("inc").unwrap().1.is_some());
        assert_eq!(view.routing_ids(), vec!["inc"]);
    }
}
