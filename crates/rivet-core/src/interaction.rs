//! Interaction events and the host collaborator traits.
//!
//! The host framework deserializes gateway events and hands them over as
//! [`Interaction`] trait objects. Everything this crate needs to route an
//! interaction is in [`InteractionData`]; everything it needs to answer one
//! goes through the trait's async methods.

use std::sync::Arc;

use async_trait::async_trait;

use crate::component::{ActionRow, ComponentType};
use crate::error::ApiResult;
use crate::id::Snowflake;
use crate::response::{InteractionResponse, MessagePayload};

/// What kind of interaction arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// A button click or select menu choice.
    Component,
    /// A modal form submission.
    ModalSubmit,
    /// Anything else (commands, autocomplete, ...). Never routed.
    Other,
}

/// One submitted text input of a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedField {
    pub custom_id: String,
    pub value: String,
}

impl SubmittedField {
    pub fn new(custom_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            custom_id: custom_id.into(),
            value: value.into(),
        }
    }
}

/// Routing-relevant data of an inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionData {
    /// Interaction id.
    pub id: Snowflake,
    pub kind: InteractionKind,
    /// custom_id of the component or modal.
    pub custom_id: String,
    /// Type of the component that was used, for component interactions.
    pub component_type: Option<ComponentType>,
    /// Message the component is attached to.
    pub message_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    /// Selected values of a select menu.
    pub values: Vec<String>,
    /// Submitted text inputs of a modal.
    pub fields: Vec<SubmittedField>,
}

impl InteractionData {
    fn with_kind(id: impl Into<Snowflake>, kind: InteractionKind, custom_id: String) -> Self {
        Self {
            id: id.into(),
            kind,
            custom_id,
            component_type: None,
            message_id: None,
            channel_id: None,
            guild_id: None,
            user_id: Snowflake(0),
            values: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// A component interaction for `custom_id`.
    pub fn component(id: impl Into<Snowflake>, custom_id: impl Into<String>) -> Self {
        let mut data = Self::with_kind(id, InteractionKind::Component, custom_id.into());
        data.component_type = Some(ComponentType::Button);
        data
    }

    /// A modal submission for the modal `custom_id`.
    pub fn modal_submit(
        id: impl Into<Snowflake>,
        custom_id: impl Into<String>,
        fields: impl IntoIterator<Item = SubmittedField>,
    ) -> Self {
        let mut data = Self::with_kind(id, InteractionKind::ModalSubmit, custom_id.into());
        data.fields = fields.into_iter().collect();
        data
    }

    /// An interaction that is never routed.
    pub fn other(id: impl Into<Snowflake>) -> Self {
        Self::with_kind(id, InteractionKind::Other, String::new())
    }

    pub fn message(mut self, message_id: impl Into<Snowflake>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    pub fn channel(mut self, channel_id: impl Into<Snowflake>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    pub fn guild(mut self, guild_id: impl Into<Snowflake>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn user(mut self, user_id: impl Into<Snowflake>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn component_type(mut self, kind: ComponentType) -> Self {
        self.component_type = Some(kind);
        self
    }

    /// Sets selected values; also marks the interaction as a text select.
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        if self.component_type == Some(ComponentType::Button) {
            self.component_type = Some(ComponentType::TextSelect);
        }
        self
    }
}

/// An inbound interaction as delivered by the host.
///
/// # Example
///
/// ```rust,ignore
/// struct GatewayInteraction { data: InteractionData, http: HttpClient, token: String }
///
/// #[async_trait]
/// impl Interaction for GatewayInteraction {
///     fn data(&self) -> &InteractionData { &self.data }
///
///     async fn create_response(&self, response: InteractionResponse) -> ApiResult<()> {
///         self.http.post_callback(self.data.id, &self.token, &response).await
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait Interaction: Send + Sync + 'static {
    fn data(&self) -> &InteractionData;

    /// Sends the initial response. The host accepts exactly one.
    async fn create_response(&self, response: InteractionResponse) -> ApiResult<()>;

    /// Sends a followup message after the initial response.
    async fn create_followup(&self, message: MessagePayload) -> ApiResult<()>;

    /// Edits the message produced by the initial response.
    async fn edit_original(&self, message: MessagePayload) -> ApiResult<()>;
}

/// Shared handle to an interaction.
pub type BoxedInteraction = Arc<dyn Interaction>;

/// Fetches the raw component rows of a message that was sent earlier.
#[async_trait]
pub trait ComponentFetcher: Send + Sync {
    async fn fetch_components(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> ApiResult<Vec<ActionRow>>;
}
