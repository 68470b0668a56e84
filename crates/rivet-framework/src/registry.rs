//! Session registry.
//!
//! Maps binding keys to running sessions:
//!
//! - **Bound views** are keyed by the message they are attached to.
//! - **Unbound views** are keyed by the custom_ids of their routable items;
//!   any interaction carrying one of them reaches the view, whatever message
//!   it came from.
//! - **Modals** are keyed by the modal's own custom_id.
//!
//! Component interactions try the message first and fall back to custom_id.
//! Two unbound views sharing a custom_id route ambiguously; whichever was
//! indexed last wins, and nothing guards against it.
//!
//! The tables sit behind one [`parking_lot::RwLock`] that is never held
//! across an await point.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use rivet_core::{InteractionData, InteractionKind, Snowflake};
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::modal::Modal;
use crate::session::{SessionCore, SessionId};
use crate::timeout;
use crate::view::View;

// =============================================================================
// Binding and Handles
// =============================================================================

/// How a view is bound when started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Binding {
    /// Route by custom_id, from any message.
    #[default]
    Unbound,
    /// Route only interactions from this message.
    Message(Snowflake),
}

impl From<Snowflake> for Binding {
    fn from(message_id: Snowflake) -> Self {
        Self::Message(message_id)
    }
}

impl From<Option<Snowflake>> for Binding {
    fn from(message_id: Option<Snowflake>) -> Self {
        message_id.map_or(Self::Unbound, Self::Message)
    }
}

/// A registered session of either kind.
#[derive(Debug, Clone)]
pub enum SessionHandle {
    View(View),
    Modal(Modal),
}

impl SessionHandle {
    pub(crate) fn core(&self) -> &SessionCore {
        match self {
            Self::View(view) => view.core(),
            Self::Modal(modal) => modal.core(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.core().id()
    }

    /// Keys under which the session is indexed when unbound.
    fn routing_ids(&self) -> Vec<String> {
        match self {
            Self::View(view) => view.routing_ids(),
            Self::Modal(modal) => vec![modal.custom_id().to_string()],
        }
    }

    /// Runs the session's timeout hook.
    pub(crate) async fn on_timeout(&self) -> anyhow::Result<()> {
        match self {
            Self::View(view) => view.hooks().on_timeout(view).await,
            Self::Modal(modal) => modal.hooks().on_timeout(modal).await,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::View(_) => "view",
            Self::Modal(_) => "modal",
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Counts of running sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Views bound to a message.
    pub bound_views: usize,
    /// Views routed by custom_id.
    pub unbound_views: usize,
    pub modals: usize,
}

impl RegistryStats {
    pub fn total(&self) -> usize {
        self.bound_views + self.unbound_views + self.modals
    }
}

struct Entry {
    handle: SessionHandle,
    message_id: Option<Snowflake>,
    custom_ids: Vec<String>,
    /// Unbound view waiting for its first interaction to learn its message.
    bind_on_first_use: bool,
}

#[derive(Default)]
struct Tables {
    sessions: HashMap<SessionId, Entry>,
    by_message: HashMap<Snowflake, SessionId>,
    by_custom_id: HashMap<String, SessionId>,
    modals: HashMap<String, SessionId>,
    /// Set by [`Registry::close`]; refuses further registrations.
    closed: bool,
}

impl Tables {
    fn index_ids(&mut self, id: SessionId, modal: bool, custom_ids: &[String]) {
        let map = if modal {
            &mut self.modals
        } else {
            &mut self.by_custom_id
        };
        for custom_id in custom_ids {
            if let Some(previous) = map.insert(custom_id.clone(), id)
                && previous != id
            {
                warn!(
                    custom_id = %custom_id,
                    previous = %previous,
                    session = %id,
                    "custom_id is claimed by more than one running session"
                );
            }
        }
    }

    fn unindex_ids(&mut self, id: SessionId, modal: bool, custom_ids: &[String]) {
        let map = if modal {
            &mut self.modals
        } else {
            &mut self.by_custom_id
        };
        for custom_id in custom_ids {
            if map.get(custom_id) == Some(&id) {
                map.remove(custom_id);
            }
        }
    }

    fn handle(&self, id: Option<&SessionId>) -> Option<SessionHandle> {
        id.and_then(|id| self.sessions.get(id))
            .map(|entry| entry.handle.clone())
    }
}

pub(crate) struct RegistryInner {
    tables: RwLock<Tables>,
    view_timeout: Option<Duration>,
    modal_timeout: Option<Duration>,
}

impl RegistryInner {
    /// Drops a session from every table. Returns whether it was present.
    pub(crate) fn remove(&self, id: SessionId) -> bool {
        let mut tables = self.tables.write();
        let Some(entry) = tables.sessions.remove(&id) else {
            return false;
        };

        if let Some(message_id) = entry.message_id
            && tables.by_message.get(&message_id) == Some(&id)
        {
            tables.by_message.remove(&message_id);
        }
        let modal = matches!(entry.handle, SessionHandle::Modal(_));
        tables.unindex_ids(id, modal, &entry.custom_ids);

        debug!(session = %id, kind = entry.handle.kind_name(), "Session unregistered");
        true
    }

    /// Re-reads the routable custom_ids of an unbound view.
    pub(crate) fn reindex(&self, id: SessionId) {
        let mut tables = self.tables.write();
        let Some(entry) = tables.sessions.get(&id) else {
            return;
        };
        if entry.message_id.is_some() {
            return;
        }
        let old = entry.custom_ids.clone();
        let new = entry.handle.routing_ids();
        let modal = matches!(entry.handle, SessionHandle::Modal(_));

        tables.unindex_ids(id, modal, &old);
        tables.index_ids(id, modal, &new);
        if let Some(entry) = tables.sessions.get_mut(&id) {
            entry.custom_ids = new;
        }
    }
}

/// Concurrent table of running sessions.
///
/// Cloning is cheap and yields a handle to the same table.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// `view_timeout` and `modal_timeout` are applied to sessions that were
    /// built without choosing a timeout.
    pub fn new(
        view_timeout: Option<Duration>,
        modal_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                tables: RwLock::new(Tables::default()),
                view_timeout,
                modal_timeout,
            }),
        }
    }

    /// Registers a session and starts its timeout clock.
    ///
    /// Modals ignore `binding`. Fails without touching the registry if the
    /// bound message is already claimed or the session is not fresh.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn register(&self, handle: SessionHandle, binding: Binding) -> RegistryResult<()> {
        let id = handle.id();
        let core = handle.core();
        let is_modal = matches!(handle, SessionHandle::Modal(_));
        let message_id = match binding {
            Binding::Message(message_id) if !is_modal => Some(message_id),
            _ => None,
        };

        {
            let mut tables = self.inner.tables.write();
            if tables.closed {
                return Err(RegistryError::Closed);
            }
            if let Some(message_id) = message_id
                && tables.by_message.contains_key(&message_id)
            {
                return Err(RegistryError::Conflict { message_id });
            }

            // Attached before activation: a concurrent stop() then blocks on
            // the table lock and removes the entry once it is inserted.
            let previous = core.attach(Arc::downgrade(&self.inner));
            if let Err(e) = core.activate() {
                core.attach(previous);
                return Err(e);
            }
            core.resolve_timeout(if is_modal {
                self.inner.modal_timeout
            } else {
                self.inner.view_timeout
            });
            core.set_message_id(message_id);

            let bind_on_first_use = match &handle {
                SessionHandle::View(view) => message_id.is_none() && !view.is_persistent(),
                SessionHandle::Modal(_) => false,
            };
            let custom_ids = if message_id.is_some() {
                Vec::new()
            } else {
                handle.routing_ids()
            };

            if let Some(message_id) = message_id {
                tables.by_message.insert(message_id, id);
            }
            tables.index_ids(id, is_modal, &custom_ids);
            tables.sessions.insert(
                id,
                Entry {
                    handle: handle.clone(),
                    message_id,
                    custom_ids,
                    bind_on_first_use,
                },
            );
        }

        info!(
            session = %id,
            kind = handle.kind_name(),
            message_id = ?message_id,
            "Session registered"
        );
        timeout::schedule(handle);
        Ok(())
    }

    /// Stops and removes a session. Idempotent; never fires `on_timeout`.
    pub fn unregister(&self, handle: &SessionHandle) {
        if !handle.core().stop() {
            self.inner.remove(handle.id());
        }
    }

    /// Finds the session an interaction belongs to.
    ///
    /// `None` is the normal answer for interactions this process does not
    /// own, such as components left over from a previous run.
    pub fn resolve(&self, data: &InteractionData) -> Option<SessionHandle> {
        let tables = self.inner.tables.read();
        match data.kind {
            InteractionKind::Component => {
                if let Some(message_id) = data.message_id
                    && let Some(handle) = tables.handle(tables.by_message.get(&message_id))
                {
                    return Some(handle);
                }
                tables.handle(tables.by_custom_id.get(&data.custom_id))
            }
            InteractionKind::ModalSubmit => tables.handle(tables.modals.get(&data.custom_id)),
            InteractionKind::Other => None,
        }
    }

    /// Moves a bind-on-first-use view to the bound table for `message_id`.
    ///
    /// Returns `true` if the view is now bound to that message.
    pub(crate) fn bind_on_first_use(&self, id: SessionId, message_id: Snowflake) -> bool {
        let mut tables = self.inner.tables.write();
        let Tables {
            sessions,
            by_message,
            by_custom_id,
            ..
        } = &mut *tables;

        let Some(entry) = sessions.get_mut(&id) else {
            return false;
        };
        if !entry.bind_on_first_use {
            return false;
        }
        entry.bind_on_first_use = false;

        if let Some(owner) = by_message.get(&message_id) {
            warn!(
                session = %id,
                owner = %owner,
                message_id = %message_id,
                "Message is already bound to another view, keeping session unbound"
            );
            return false;
        }

        for custom_id in entry.custom_ids.drain(..) {
            if by_custom_id.get(&custom_id) == Some(&id) {
                by_custom_id.remove(&custom_id);
            }
        }
        entry.message_id = Some(message_id);
        entry.handle.core().set_message_id(Some(message_id));
        by_message.insert(message_id, id);

        debug!(session = %id, message_id = %message_id, "View bound to message");
        true
    }

    /// The view bound to `message_id`, if any.
    pub fn get_view(&self, message_id: Snowflake) -> Option<View> {
        let tables = self.inner.tables.read();
        match tables.handle(tables.by_message.get(&message_id)) {
            Some(SessionHandle::View(view)) => Some(view),
            _ => None,
        }
    }

    /// The running modal with `custom_id`, if any.
    pub fn get_modal(&self, custom_id: &str) -> Option<Modal> {
        let tables = self.inner.tables.read();
        match tables.handle(tables.modals.get(custom_id)) {
            Some(SessionHandle::Modal(modal)) => Some(modal),
            _ => None,
        }
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.inner.tables.read().sessions.contains_key(&id)
    }

    pub fn stats(&self) -> RegistryStats {
        let tables = self.inner.tables.read();
        let mut stats = RegistryStats::default();
        for entry in tables.sessions.values() {
            match (&entry.handle, entry.message_id) {
                (SessionHandle::Modal(_), _) => stats.modals += 1,
                (SessionHandle::View(_), Some(_)) => stats.bound_views += 1,
                (SessionHandle::View(_), None) => stats.unbound_views += 1,
            }
        }
        stats
    }

    /// Refuses further registrations, then stops every running session.
    /// Returns how many were stopped.
    pub fn close(&self) -> usize {
        self.inner.tables.write().closed = true;
        self.clear()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.tables.read().closed
    }

    /// Stops every session without firing `on_timeout`. Returns how many
    /// were stopped.
    pub fn clear(&self) -> usize {
        let handles: Vec<SessionHandle> = self
            .inner
            .tables
            .read()
            .sessions
            .values()
            .map(|entry| entry.handle.clone())
            .collect();

        let count = handles.len();
        for handle in &handles {
            self.unregister(handle);
        }
        if count > 0 {
            info!(count, "Cleared running sessions");
        }
        count
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("stats", &self.stats())
            .finish()
    }
}
