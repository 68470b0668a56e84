//! Interaction response payloads and autodefer policy.

use serde::{Deserialize, Serialize};

use crate::component::ActionRow;

/// Message flag that hides a response from everyone but the invoking user.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

// =============================================================================
// Response Type
// =============================================================================

/// Numeric interaction callback type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResponseType {
    /// Respond with a new message.
    ChannelMessage = 4,
    /// Acknowledge now, send a message later.
    DeferredChannelMessage = 5,
    /// Acknowledge now, edit the component's message later.
    DeferredMessageUpdate = 6,
    /// Edit the component's message.
    MessageUpdate = 7,
    /// Open a modal.
    Modal = 9,
}

impl ResponseType {
    /// Whether this response only acknowledges the interaction.
    pub fn is_deferred(self) -> bool {
        matches!(
            self,
            Self::DeferredChannelMessage | Self::DeferredMessageUpdate
        )
    }
}

impl From<ResponseType> for u8 {
    fn from(value: ResponseType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            4 => Self::ChannelMessage,
            5 => Self::DeferredChannelMessage,
            6 => Self::DeferredMessageUpdate,
            7 => Self::MessageUpdate,
            9 => Self::Modal,
            other => return Err(format!("unsupported response type {other}")),
        })
    }
}

/// Which deferred acknowledgement to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeferKind {
    /// The followup will be a new message.
    MessageCreate,
    /// The followup will edit the component's message.
    #[default]
    MessageUpdate,
}

impl From<DeferKind> for ResponseType {
    fn from(kind: DeferKind) -> Self {
        match kind {
            DeferKind::MessageCreate => Self::DeferredChannelMessage,
            DeferKind::MessageUpdate => Self::DeferredMessageUpdate,
        }
    }
}

// =============================================================================
// Autodefer
// =============================================================================

/// Whether and how a session acknowledges interactions on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutodeferMode {
    Off,
    #[default]
    On,
    /// Defer with the ephemeral flag set.
    Ephemeral,
}

/// Autodefer policy for a session or a single item.
///
/// ```rust,ignore
/// let quiet = AutodeferOptions::from(AutodeferMode::Ephemeral)
///     .defer_kind(DeferKind::MessageCreate);
/// let off = AutodeferOptions::from(false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AutodeferOptions {
    pub mode: AutodeferMode,
    pub defer_kind: DeferKind,
}

impl AutodeferOptions {
    pub fn new(mode: AutodeferMode, defer_kind: DeferKind) -> Self {
        Self { mode, defer_kind }
    }

    /// Autodefer disabled.
    pub fn off() -> Self {
        Self::new(AutodeferMode::Off, DeferKind::default())
    }

    pub fn defer_kind(mut self, kind: DeferKind) -> Self {
        self.defer_kind = kind;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != AutodeferMode::Off
    }

    pub fn is_ephemeral(&self) -> bool {
        self.mode == AutodeferMode::Ephemeral
    }
}

impl From<bool> for AutodeferOptions {
    fn from(enabled: bool) -> Self {
        if enabled { Self::default() } else { Self::off() }
    }
}

impl From<AutodeferMode> for AutodeferOptions {
    fn from(mode: AutodeferMode) -> Self {
        Self::new(mode, DeferKind::default())
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// Message content for a response, followup or edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// `None` leaves existing components untouched on edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flags: u64,
}

impl MessagePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// A payload with only text content.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new().content(content)
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Replaces the message components.
    pub fn components(mut self, components: Vec<ActionRow>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        if ephemeral {
            self.flags |= EPHEMERAL_FLAG;
        } else {
            self.flags &= !EPHEMERAL_FLAG;
        }
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags & EPHEMERAL_FLAG != 0
    }
}

/// A rendered modal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalPayload {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

/// Data attached to an initial response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Modal(ModalPayload),
    Message(MessagePayload),
}

/// An initial interaction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// Responds with a new message.
    pub fn message(payload: MessagePayload) -> Self {
        Self {
            kind: ResponseType::ChannelMessage,
            data: Some(ResponseData::Message(payload)),
        }
    }

    /// Edits the message the component is attached to.
    pub fn update(payload: MessagePayload) -> Self {
        Self {
            kind: ResponseType::MessageUpdate,
            data: Some(ResponseData::Message(payload)),
        }
    }

    /// Acknowledges without content.
    pub fn deferred(kind: DeferKind, ephemeral: bool) -> Self {
        let data = ephemeral.then(|| ResponseData::Message(MessagePayload::new().ephemeral(true)));
        Self {
            kind: kind.into(),
            data,
        }
    }

    /// Opens a modal.
    pub fn modal(payload: ModalPayload) -> Self {
        Self {
            kind: ResponseType::Modal,
            data: Some(ResponseData::Modal(payload)),
        }
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}
