//! Wire-level component tree.
//!
//! These types mirror the JSON the host expects when a message or modal
//! carries interactive components:
//!
//! ```text
//! [ActionRow { type: 1, components: [Component, ...] }, ...]
//! ```
//!
//! [`Component`] is deliberately flat: every kind shares one struct and the
//! numeric `type` decides which optional fields are meaningful. Typed item
//! models live in [`crate::item`] and convert to and from this form.

use serde::{Deserialize, Serialize};

use crate::id::Snowflake;

// =============================================================================
// Component Type
// =============================================================================

/// Numeric component type as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ComponentType {
    /// Container for up to five components.
    ActionRow = 1,
    /// Clickable button.
    Button = 2,
    /// Select menu with application-defined options.
    TextSelect = 3,
    /// Text input inside a modal.
    TextInput = 4,
    /// Select menu for users.
    UserSelect = 5,
    /// Select menu for roles.
    RoleSelect = 6,
    /// Select menu for users and roles.
    MentionableSelect = 7,
    /// Select menu for channels.
    ChannelSelect = 8,
}

impl From<ComponentType> for u8 {
    fn from(value: ComponentType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for ComponentType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            1 => Self::ActionRow,
            2 => Self::Button,
            3 => Self::TextSelect,
            4 => Self::TextInput,
            5 => Self::UserSelect,
            6 => Self::RoleSelect,
            7 => Self::MentionableSelect,
            8 => Self::ChannelSelect,
            other => return Err(format!("unknown component type {other}")),
        })
    }
}

// =============================================================================
// Emoji and Select Options
// =============================================================================

/// A partial emoji attached to a button or select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialEmoji {
    /// Custom emoji id, absent for unicode emoji.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Snowflake>,
    /// Emoji name, or the unicode character itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether a custom emoji is animated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl PartialEmoji {
    /// A unicode emoji.
    pub fn unicode(emoji: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(emoji.into()),
            animated: false,
        }
    }

    /// A custom guild emoji.
    pub fn custom(id: impl Into<Snowflake>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            animated: false,
        }
    }
}

/// One option of a text select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// User-facing label.
    pub label: String,
    /// Value sent back when the option is picked.
    pub value: String,
    /// Additional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Emoji shown next to the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    /// Whether the option is selected by default.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

impl SelectOption {
    /// Creates an option with the given label and value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            description: None,
            emoji: None,
            default: false,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the emoji.
    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }

    /// Marks the option as selected by default.
    pub fn default_selected(mut self, default: bool) -> Self {
        self.default = default;
        self
    }
}

// =============================================================================
// Component and ActionRow
// =============================================================================

/// A single interactive component inside an action row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component type.
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Button style (1-5) or text input style (1-2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<PartialEmoji>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Component {
    /// Creates an empty component of the given type.
    pub fn new(kind: ComponentType) -> Self {
        Self {
            kind,
            custom_id: None,
            style: None,
            label: None,
            emoji: None,
            url: None,
            disabled: false,
            options: Vec::new(),
            channel_types: Vec::new(),
            placeholder: None,
            min_values: None,
            max_values: None,
            min_length: None,
            max_length: None,
            required: None,
            value: None,
        }
    }
}

/// A row of components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRow {
    /// Always [`ComponentType::ActionRow`].
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Components in this row, left to right.
    pub components: Vec<Component>,
}

impl ActionRow {
    /// Creates an action row from its components.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            kind: ComponentType::ActionRow,
            components,
        }
    }
}
