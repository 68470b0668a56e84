//! # Rivet
//!
//! Stateful handling of Discord message components and modals.
//!
//! ## Overview
//!
//! A *view* is a set of buttons and select menus attached to a message; a
//! *modal* is a pop-up form of text inputs. Both are sessions: they are
//! started on a [`Client`](framework::Client), receive the interactions
//! their components produce, and stop when told to or when their timeout
//! elapses.
//!
//! ```text
//! ┌─────────────┐     ┌────────┐     ┌──────────┐     ┌──────────────────────────┐
//! │ RivetRuntime│────▶│ Client │────▶│ Registry │────▶│ View / Modal callback    │──▶ respond
//! │  (stream)   │     │        │     │          │     │ (own task, autodefer)    │
//! └─────────────┘     └────────┘     └──────────┘     └──────────────────────────┘
//! ```
//!
//! - **Core**: wire types, items, row layout and the host collaborator traits
//! - **Framework**: sessions, routing, timeouts and dispatch
//! - **Runtime**: configuration, logging and the serve loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rivet::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = RivetRuntime::new();
//!
//!     let view = View::builder()
//!         .item(Button::success().label("Confirm"), |ctx, _| async move {
//!             ctx.respond(MessagePayload::text("Confirmed")).await?;
//!             ctx.view().stop();
//!             Ok(())
//!         })
//!         .build()?;
//!     runtime.client().start_view(&view, sent_message_id)?;
//!
//!     runtime.serve(gateway_interactions).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use rivet_core as core;
pub use rivet_framework as framework;
pub use rivet_runtime as runtime;

/// Commonly used types for building interactive messages.
///
/// ```rust,ignore
/// use rivet::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use rivet_runtime::{RivetRuntime, RuntimeStats};

    // Sessions and dispatch
    pub use rivet_framework::{
        Binding, Client, ClientConfig, DeclarativeView, DispatchOutcome, ItemDecl, Modal,
        ModalBuilder, ModalContext, ModalHooks, View, ViewBuilder, ViewContext, ViewHooks,
    };

    // Items and payloads
    pub use rivet_core::{
        ActionRow, AutodeferMode, AutodeferOptions, Button, ButtonStyle, DeferKind, Item,
        LinkButton, MessagePayload, SelectMenu, SelectOption, Snowflake, TextInput,
        TextInputStyle,
    };

    // Host collaborator traits
    pub use rivet_core::{BoxedInteraction, ComponentFetcher, Interaction, InteractionData};

    pub use rivet_core::async_trait;
}
