//! # Rivet Core
//!
//! Leaf types of the Rivet component-interaction handler.
//!
//! ## Contents
//!
//! - **Component tree**: serde models of the wire JSON ([`ActionRow`], [`Component`])
//! - **Items**: the closed set of interactive elements and their row layout ([`Item`], [`ItemKind`])
//! - **Interactions**: the host collaborator traits ([`Interaction`], [`ComponentFetcher`])
//! - **Responses**: initial response payloads and autodefer policy ([`InteractionResponse`], [`AutodeferOptions`])
//!
//! Sessions, routing and timeouts are built on top of these in `rivet-framework`.
//!
//! ```text
//! host event ──▶ Interaction ──▶ (rivet-framework) ──▶ InteractionResponse ──▶ host
//!                                        │
//!                                     Item / ActionRow
//! ```

pub mod component;
pub mod error;
pub mod id;
pub mod interaction;
pub mod item;
pub mod response;

pub use component::{ActionRow, Component, ComponentType, PartialEmoji, SelectOption};
pub use error::{ApiError, ApiResult, ComponentError, ComponentResult};
pub use id::Snowflake;
pub use interaction::{
    BoxedInteraction, ComponentFetcher, Interaction, InteractionData, InteractionKind,
    SubmittedField,
};
pub use item::{
    Button, ButtonStyle, Item, ItemKind, LinkButton, RowLayout, SelectKind, SelectMenu, TextInput,
    TextInputStyle,
};
pub use response::{
    AutodeferMode, AutodeferOptions, DeferKind, InteractionResponse, MessagePayload, ModalPayload,
    ResponseData, ResponseType,
};

// Re-export async_trait so collaborator impls don't need a direct dependency.
pub use async_trait::async_trait;
