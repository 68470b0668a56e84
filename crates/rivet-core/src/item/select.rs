//! Select menus.

use crate::component::SelectOption;

/// Which entities a select menu offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectKind {
    /// Application-defined options.
    Text(Vec<SelectOption>),
    User,
    Role,
    /// Users and roles.
    Mentionable,
    /// Channels, optionally restricted to the listed channel types.
    Channel(Vec<u8>),
}

impl SelectKind {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text select",
            Self::User => "user select",
            Self::Role => "role select",
            Self::Mentionable => "mentionable select",
            Self::Channel(_) => "channel select",
        }
    }
}

/// A select menu occupying a full row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenu {
    pub kind: SelectKind,
    pub placeholder: Option<String>,
    pub min_values: u8,
    pub max_values: u8,
}

impl SelectMenu {
    fn with_kind(kind: SelectKind) -> Self {
        Self {
            kind,
            placeholder: None,
            min_values: 1,
            max_values: 1,
        }
    }

    /// A select menu with application-defined options.
    pub fn text(options: impl IntoIterator<Item = SelectOption>) -> Self {
        Self::with_kind(SelectKind::Text(options.into_iter().collect()))
    }

    pub fn user() -> Self {
        Self::with_kind(SelectKind::User)
    }

    pub fn role() -> Self {
        Self::with_kind(SelectKind::Role)
    }

    pub fn mentionable() -> Self {
        Self::with_kind(SelectKind::Mentionable)
    }

    /// A channel select restricted to `channel_types` (empty means any).
    pub fn channel(channel_types: impl IntoIterator<Item = u8>) -> Self {
        Self::with_kind(SelectKind::Channel(channel_types.into_iter().collect()))
    }

    /// Sets the placeholder shown when nothing is selected.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the minimum number of values that must be chosen.
    pub fn min_values(mut self, min: u8) -> Self {
        self.min_values = min;
        self
    }

    /// Sets the maximum number of values that may be chosen.
    pub fn max_values(mut self, max: u8) -> Self {
        self.max_values = max;
        self
    }

    /// The options of a text select, empty for other kinds.
    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            SelectKind::Text(options) => options,
            _ => &[],
        }
    }
}
