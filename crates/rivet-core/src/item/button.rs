//! Buttons.

use crate::component::PartialEmoji;

/// Visual style of an interactive button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonStyle {
    /// Blurple.
    #[default]
    Primary = 1,
    /// Grey.
    Secondary = 2,
    /// Green.
    Success = 3,
    /// Red.
    Danger = 4,
}

impl ButtonStyle {
    /// Parses a wire style value. Style 5 (link) is handled by [`LinkButton`].
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Primary),
            2 => Some(Self::Secondary),
            3 => Some(Self::Success),
            4 => Some(Self::Danger),
            _ => None,
        }
    }
}

/// Wire style value for link buttons.
pub const LINK_STYLE: u8 = 5;

/// A button that routes its clicks back to a callback.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Button {
    pub style: ButtonStyle,
    pub label: Option<String>,
    pub emoji: Option<PartialEmoji>,
}

impl Button {
    /// Creates a button with the given style.
    pub fn new(style: ButtonStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn primary() -> Self {
        Self::new(ButtonStyle::Primary)
    }

    pub fn secondary() -> Self {
        Self::new(ButtonStyle::Secondary)
    }

    pub fn success() -> Self {
        Self::new(ButtonStyle::Success)
    }

    pub fn danger() -> Self {
        Self::new(ButtonStyle::Danger)
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the emoji.
    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }
}

/// A button that opens a URL. It has no custom_id and never routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkButton {
    pub url: String,
    pub label: Option<String>,
    pub emoji: Option<PartialEmoji>,
}

impl LinkButton {
    /// Creates a link button pointing at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: None,
            emoji: None,
        }
    }

    /// Sets the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the emoji.
    pub fn emoji(mut self, emoji: PartialEmoji) -> Self {
        self.emoji = Some(emoji);
        self
    }
}
