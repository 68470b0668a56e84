//! # Rivet Framework
//!
//! Sessions, routing and timeouts for component interactions.
//!
//! This layer provides:
//! - [`View`] and [`Modal`] sessions built with [`ViewBuilder`] / [`ModalBuilder`]
//! - The [`Registry`] that maps messages and custom_ids to running sessions
//! - Per-session inactivity timers with `on_timeout` hooks
//! - The dispatcher behind [`Client::handle_interaction`], including autodefer
//!
//! ```text
//! Client::handle_interaction
//!        │
//!        ▼
//!    Registry::resolve ──▶ View / Modal ──▶ check ──▶ callback ∥ autodefer
//!        │                     ▲
//!        └── none ──▶ unhandled hook      └── timer: on_timeout, unregister
//! ```
//!
//! Wire types and the host collaborator traits live in [`rivet_core`].

pub mod client;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod hooks;
pub mod modal;
pub mod registry;
pub mod session;
pub mod view;

mod timeout;

#[cfg(test)]
mod testing;

pub use client::{Client, UnhandledHook};
pub use config::{
    ClientConfig, DEFAULT_AUTODEFER_GRACE, DEFAULT_MODAL_TIMEOUT, DEFAULT_VIEW_TIMEOUT,
};
pub use context::{Context, FOLLOWUP_WINDOW, INITIAL_RESPONSE_WINDOW, ModalContext, ViewContext};
pub use dispatcher::DispatchOutcome;
pub use error::{
    CallbackError, DispatchError, DispatchResult, ReconstructError, RegistryError,
    RegistryResult, ResponseError, ResponseResult,
};
pub use hooks::{DefaultHooks, ModalHooks, ViewHooks};
pub use modal::{Modal, ModalBuilder, ModalCallback};
pub use registry::{Binding, Registry, RegistryStats, SessionHandle};
pub use session::{SessionId, SessionState};
pub use view::{
    CallbackFuture, DeclarativeView, DeclaredCallback, ItemCallback, ItemDecl, View, ViewBuilder,
};

pub use rivet_core;
