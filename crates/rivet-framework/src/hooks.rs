//! Session-level hooks.
//!
//! Every method has a default, so `impl ViewHooks for MyView {}` is a valid
//! implementation. Override only what the session needs:
//!
//! ```rust,ignore
//! struct AdminPanel { owner: Snowflake }
//!
//! #[async_trait]
//! impl ViewHooks for AdminPanel {
//!     async fn check(&self, ctx: &ViewContext) -> bool {
//!         ctx.user_id() == self.owner
//!     }
//!
//!     async fn on_timeout(&self, view: &View) -> anyhow::Result<()> {
//!         view.disable_all();
//!         Ok(())
//!     }
//! }
//! ```

use async_trait::async_trait;
use rivet_core::Item;
use tracing::error;

use crate::context::{ModalContext, ViewContext};
use crate::error::CallbackError;
use crate::modal::Modal;
use crate::view::View;

/// Hooks of a [`View`].
#[async_trait]
pub trait ViewHooks: Send + Sync + 'static {
    /// Decides whether an interaction may run its item callback.
    ///
    /// Returning `false` drops the interaction silently. Respond from here
    /// if the user should see why.
    async fn check(&self, _ctx: &ViewContext) -> bool {
        true
    }

    /// Runs once after the view expired through inactivity.
    ///
    /// Errors are logged. Never called after an explicit stop.
    async fn on_timeout(&self, _view: &View) -> anyhow::Result<()> {
        Ok(())
    }

    /// Receives every error raised by an item callback of this view.
    async fn on_error(
        &self,
        error: &CallbackError,
        item: Option<&Item>,
        ctx: Option<&ViewContext>,
    ) {
        error!(
            session = ?ctx.map(|ctx| ctx.view().id()),
            custom_id = item.and_then(Item::get_custom_id).unwrap_or("<none>"),
            error = %error,
            "Ignoring error in view callback"
        );
    }
}

/// Hooks of a [`Modal`].
#[async_trait]
pub trait ModalHooks: Send + Sync + 'static {
    /// Decides whether a submission may run the modal callback.
    ///
    /// A rejected submission does not consume the modal.
    async fn check(&self, _ctx: &ModalContext) -> bool {
        true
    }

    /// Runs once after the modal expired without being submitted.
    async fn on_timeout(&self, _modal: &Modal) -> anyhow::Result<()> {
        Ok(())
    }

    /// Receives the error raised by the modal callback.
    async fn on_error(&self, error: &CallbackError, ctx: Option<&ModalContext>) {
        error!(
            modal = ctx.map_or("<none>", |ctx| ctx.modal().custom_id()),
            error = %error,
            "Ignoring error in modal callback"
        );
    }
}

/// Hooks that keep every default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl ViewHooks for DefaultHooks {}

impl ModalHooks for DefaultHooks {}
