//! Item model.
//!
//! An [`Item`] is one interactive element owned by a session. Its kind is a
//! closed set ([`ItemKind`]) so that layout, rendering and routing can match
//! on it directly:
//!
//! | Kind | Width | Routes | Allowed in |
//! |---|---|---|---|
//! | [`Button`] | 1 | yes | view |
//! | [`LinkButton`] | 1 | no | view |
//! | [`SelectMenu`] | 5 | yes | view |
//! | [`TextInput`] | 5 | yes | modal |
//!
//! Items are plain data. Callbacks are attached by the session that owns
//! the item, not by the item itself.
//!
//! # Example
//!
//! ```rust,ignore
//! use rivet_core::item::{Button, Item};
//!
//! let yes = Item::from(Button::success().label("Yes")).custom_id("yes").row(0);
//! ```

mod button;
mod layout;
mod select;
mod text_input;

pub use button::{Button, ButtonStyle, LINK_STYLE, LinkButton};
pub use layout::{MAX_ITEMS, MAX_ROWS, ROW_WIDTH, RowLayout, build_rows};
pub use select::{SelectKind, SelectMenu};
pub use text_input::{TextInput, TextInputStyle};

use crate::component::{Component, ComponentType};
use crate::error::{ComponentError, ComponentResult};
use crate::response::AutodeferOptions;

/// Maximum length of a custom_id.
pub const CUSTOM_ID_MAX: usize = 100;
/// Maximum length of a button or text input label.
pub const LABEL_MAX: usize = 80;
/// Maximum length of a placeholder.
pub const PLACEHOLDER_MAX: usize = 150;
/// Maximum number of options in a text select.
pub const OPTIONS_MAX: usize = 25;
/// Maximum length of a select option label, value or description.
pub const OPTION_TEXT_MAX: usize = 100;
/// Maximum length of a text input value.
pub const TEXT_INPUT_MAX: u16 = 4000;

/// Generates a random custom_id (32 lowercase hex characters).
pub fn random_custom_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// The kind-specific part of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Button(Button),
    LinkButton(LinkButton),
    Select(SelectMenu),
    TextInput(TextInput),
}

impl ItemKind {
    /// Number of width units the item occupies in its row.
    pub fn width(&self) -> u8 {
        match self {
            Self::Button(_) | Self::LinkButton(_) => 1,
            Self::Select(_) | Self::TextInput(_) => ROW_WIDTH,
        }
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Button(_) => "button",
            Self::LinkButton(_) => "link button",
            Self::Select(select) => select.kind.name(),
            Self::TextInput(_) => "text input",
        }
    }
}

/// One interactive element with identity, placement and display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    kind: ItemKind,
    custom_id: Option<String>,
    explicit_custom_id: bool,
    row: Option<u8>,
    rendered_row: Option<u8>,
    disabled: bool,
    autodefer: Option<AutodeferOptions>,
}

impl Item {
    /// Wraps an item kind, generating a random custom_id for routable kinds.
    pub fn new(kind: ItemKind) -> Self {
        let custom_id = match kind {
            ItemKind::LinkButton(_) => None,
            _ => Some(random_custom_id()),
        };
        Self {
            kind,
            custom_id,
            explicit_custom_id: false,
            row: None,
            rendered_row: None,
            disabled: false,
            autodefer: None,
        }
    }

    // ─── builder ───

    /// Sets an explicit custom_id. Ignored for link buttons.
    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        if self.is_routable() {
            self.custom_id = Some(custom_id.into());
            self.explicit_custom_id = true;
        }
        self
    }

    /// Pins the item to a row (0-4).
    pub fn row(mut self, row: u8) -> Self {
        self.row = Some(row);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Overrides the session's autodefer policy for this item.
    pub fn autodefer(mut self, options: impl Into<AutodeferOptions>) -> Self {
        self.autodefer = Some(options.into());
        self
    }

    // ─── accessors ───

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ItemKind {
        &mut self.kind
    }

    /// The routing identifier, `None` only for link buttons.
    pub fn get_custom_id(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    /// Whether the custom_id was supplied rather than generated.
    pub fn has_explicit_custom_id(&self) -> bool {
        self.explicit_custom_id
    }

    /// The row requested by the caller.
    pub fn get_row(&self) -> Option<u8> {
        self.row
    }

    /// The row assigned by layout, once attached to a session.
    pub fn rendered_row(&self) -> Option<u8> {
        self.rendered_row
    }

    pub(crate) fn set_rendered_row(&mut self, row: Option<u8>) {
        self.rendered_row = row;
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn get_autodefer(&self) -> Option<AutodeferOptions> {
        self.autodefer
    }

    pub fn width(&self) -> u8 {
        self.kind.width()
    }

    /// Whether interactions can target this item.
    pub fn is_routable(&self) -> bool {
        !matches!(self.kind, ItemKind::LinkButton(_))
    }

    // ─── validation ───

    /// Checks every length and range constraint for this item.
    pub fn validate(&self) -> ComponentResult<()> {
        if let Some(row) = self.row
            && row >= MAX_ROWS
        {
            return Err(ComponentError::InvalidRow(row));
        }
        if let Some(id) = &self.custom_id {
            check_len("custom_id", id, CUSTOM_ID_MAX)?;
        }

        match &self.kind {
            ItemKind::Button(button) => {
                if let Some(label) = &button.label {
                    check_len("label", label, LABEL_MAX)?;
                }
            }
            ItemKind::LinkButton(link) => {
                if let Some(label) = &link.label {
                    check_len("label", label, LABEL_MAX)?;
                }
                if link.url.is_empty() {
                    return Err(ComponentError::InvalidComponent(
                        "link button requires a url".to_string(),
                    ));
                }
            }
            ItemKind::Select(select) => validate_select(select)?,
            ItemKind::TextInput(input) => validate_text_input(input)?,
        }
        Ok(())
    }

    // ─── wire conversion ───

    /// Renders the item into its wire component.
    pub fn to_component(&self) -> Component {
        let mut component = match &self.kind {
            ItemKind::Button(button) => {
                let mut c = Component::new(ComponentType::Button);
                c.style = Some(button.style as u8);
                c.label.clone_from(&button.label);
                c.emoji.clone_from(&button.emoji);
                c
            }
            ItemKind::LinkButton(link) => {
                let mut c = Component::new(ComponentType::Button);
                c.style = Some(LINK_STYLE);
                c.url = Some(link.url.clone());
                c.label.clone_from(&link.label);
                c.emoji.clone_from(&link.emoji);
                c
            }
            ItemKind::Select(select) => {
                let kind = match &select.kind {
                    SelectKind::Text(_) => ComponentType::TextSelect,
                    SelectKind::User => ComponentType::UserSelect,
                    SelectKind::Role => ComponentType::RoleSelect,
                    SelectKind::Mentionable => ComponentType::MentionableSelect,
                    SelectKind::Channel(_) => ComponentType::ChannelSelect,
                };
                let mut c = Component::new(kind);
                match &select.kind {
                    SelectKind::Text(options) => c.options.clone_from(options),
                    SelectKind::Channel(types) => c.channel_types.clone_from(types),
                    _ => {}
                }
                c.placeholder.clone_from(&select.placeholder);
                c.min_values = Some(select.min_values);
                c.max_values = Some(select.max_values);
                c
            }
            ItemKind::TextInput(input) => {
                let mut c = Component::new(ComponentType::TextInput);
                c.style = Some(input.style as u8);
                c.label = Some(input.label.clone());
                c.placeholder.clone_from(&input.placeholder);
                c.value.clone_from(&input.value);
                c.required = Some(input.required);
                c.min_length = input.min_length;
                c.max_length = input.max_length;
                c
            }
        };
        component.custom_id.clone_from(&self.custom_id);
        component.disabled = self.disabled;
        component
    }

    /// Reconstructs an item from raw component state.
    ///
    /// The custom_id found on the wire is kept as-is and counts as explicit,
    /// so rebuilt sessions keep routing the same interactions.
    pub fn from_component(component: &Component, row: Option<u8>) -> ComponentResult<Self> {
        let kind = match component.kind {
            ComponentType::ActionRow => {
                return Err(ComponentError::InvalidComponent(
                    "action rows cannot be items".to_string(),
                ));
            }
            ComponentType::Button => {
                let style = component.style.unwrap_or(ButtonStyle::Primary as u8);
                if style == LINK_STYLE {
                    let url = component.url.clone().ok_or_else(|| {
                        ComponentError::InvalidComponent("link button without url".to_string())
                    })?;
                    ItemKind::LinkButton(LinkButton {
                        url,
                        label: component.label.clone(),
                        emoji: component.emoji.clone(),
                    })
                } else {
                    let style = ButtonStyle::from_wire(style).ok_or_else(|| {
                        ComponentError::InvalidComponent(format!("unknown button style {style}"))
                    })?;
                    ItemKind::Button(Button {
                        style,
                        label: component.label.clone(),
                        emoji: component.emoji.clone(),
                    })
                }
            }
            ComponentType::TextInput => {
                let style = component.style.unwrap_or(TextInputStyle::Short as u8);
                ItemKind::TextInput(TextInput {
                    label: component.label.clone().unwrap_or_default(),
                    style: TextInputStyle::from_wire(style).ok_or_else(|| {
                        ComponentError::InvalidComponent(format!(
                            "unknown text input style {style}"
                        ))
                    })?,
                    placeholder: component.placeholder.clone(),
                    value: component.value.clone(),
                    required: component.required.unwrap_or(true),
                    min_length: component.min_length,
                    max_length: component.max_length,
                })
            }
            select_type => {
                let kind = match select_type {
                    ComponentType::TextSelect => SelectKind::Text(component.options.clone()),
                    ComponentType::UserSelect => SelectKind::User,
                    ComponentType::RoleSelect => SelectKind::Role,
                    ComponentType::MentionableSelect => SelectKind::Mentionable,
                    _ => SelectKind::Channel(component.channel_types.clone()),
                };
                ItemKind::Select(SelectMenu {
                    kind,
                    placeholder: component.placeholder.clone(),
                    min_values: component.min_values.unwrap_or(1),
                    max_values: component.max_values.unwrap_or(1),
                })
            }
        };

        let mut item = Self::new(kind).disabled(component.disabled);
        if let Some(id) = &component.custom_id {
            item = item.custom_id(id.clone());
        }
        if let Some(row) = row {
            item = item.row(row);
        }
        Ok(item)
    }
}

impl From<ItemKind> for Item {
    fn from(kind: ItemKind) -> Self {
        Self::new(kind)
    }
}

impl From<Button> for Item {
    fn from(button: Button) -> Self {
        Self::new(ItemKind::Button(button))
    }
}

impl From<LinkButton> for Item {
    fn from(link: LinkButton) -> Self {
        Self::new(ItemKind::LinkButton(link))
    }
}

impl From<SelectMenu> for Item {
    fn from(select: SelectMenu) -> Self {
        Self::new(ItemKind::Select(select))
    }
}

impl From<TextInput> for Item {
    fn from(input: TextInput) -> Self {
        Self::new(ItemKind::TextInput(input))
    }
}

fn check_len(field: &'static str, value: &str, max: usize) -> ComponentResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(ComponentError::too_long(field, max, len));
    }
    Ok(())
}

fn validate_select(select: &SelectMenu) -> ComponentResult<()> {
    if let Some(placeholder) = &select.placeholder {
        check_len("placeholder", placeholder, PLACEHOLDER_MAX)?;
    }
    if select.min_values > select.max_values {
        return Err(ComponentError::invalid_range(
            "min_values",
            format!(
                "min_values ({}) exceeds max_values ({})",
                select.min_values, select.max_values
            ),
        ));
    }
    if select.max_values as usize > OPTIONS_MAX {
        return Err(ComponentError::invalid_range(
            "max_values",
            format!("at most {OPTIONS_MAX} values can be selected"),
        ));
    }
    if let SelectKind::Text(options) = &select.kind {
        if options.is_empty() || options.len() > OPTIONS_MAX {
            return Err(ComponentError::invalid_range(
                "options",
                format!("expected 1..={OPTIONS_MAX} options, got {}", options.len()),
            ));
        }
        if select.max_values as usize > options.len() {
            return Err(ComponentError::invalid_range(
                "max_values",
                "cannot exceed the number of options",
            ));
        }
        for option in options {
            check_len("option label", &option.label, OPTION_TEXT_MAX)?;
            check_len("option value", &option.value, OPTION_TEXT_MAX)?;
            if let Some(description) = &option.description {
                check_len("option description", description, OPTION_TEXT_MAX)?;
            }
        }
    }
    Ok(())
}

fn validate_text_input(input: &TextInput) -> ComponentResult<()> {
    check_len("label", &input.label, LABEL_MAX)?;
    if let Some(placeholder) = &input.placeholder {
        check_len("placeholder", placeholder, PLACEHOLDER_MAX)?;
    }
    let min = input.min_length.unwrap_or(0);
    let max = input.max_length.unwrap_or(TEXT_INPUT_MAX);
    if min > max || max > TEXT_INPUT_MAX {
        return Err(ComponentError::invalid_range(
            "length",
            format!("expected min_length <= max_length <= {TEXT_INPUT_MAX}"),
        ));
    }
    if let Some(value) = &input.value {
        check_len("value", value, max as usize)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::SelectOption;

    #[test]
    fn test_random_custom_id() {
        let item = Item::from(Button::primary());
        let id = item.get_custom_id().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!item.has_explicit_custom_id());

        let other = Item::from(Button::primary());
        assert_ne!(other.get_custom_id(), item.get_custom_id());
    }

    #[test]
    fn test_link_button_has_no_custom_id() {
        let link = Item::from(LinkButton::new("https://example.com")).custom_id("ignored");
        assert_eq!(link.get_custom_id(), None);
        assert!(!link.is_routable());
        assert!(!link.has_explicit_custom_id());
    }

    #[test]
    fn test_validate_limits() {
        let long_id = "x".repeat(CUSTOM_ID_MAX + 1);
        let err = Item::from(Button::primary())
            .custom_id(long_id)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ComponentError::TooLong { field: "custom_id", .. }));

        let err = Item::from(Button::primary()).row(5).validate().unwrap_err();
        assert_eq!(err, ComponentError::InvalidRow(5));

        let select = SelectMenu::text([SelectOption::new("A", "a")]).max_values(2);
        assert!(Item::from(select).validate().is_err());

        let select = SelectMenu::text(Vec::new());
        assert!(Item::from(select).validate().is_err());

        let input = TextInput::new("Name").min_length(10).max_length(5);
        assert!(Item::from(input).validate().is_err());

        let select = SelectMenu::user().placeholder("p".repeat(PLACEHOLDER_MAX));
        assert!(Item::from(select).validate().is_ok());
    }

    #[test]
    fn test_component_roundtrip_keeps_identity() {
        let original = Item::from(Button::danger().label("Delete"))
            .custom_id("delete")
            .disabled(true);
        let component = original.to_component();
        assert_eq!(component.style, Some(4));

        let rebuilt = Item::from_component(&component, Some(1)).unwrap();
        assert_eq!(rebuilt.get_custom_id(), Some("delete"));
        assert!(rebuilt.has_explicit_custom_id());
        assert!(rebuilt.is_disabled());
        assert_eq!(rebuilt.get_row(), Some(1));
        assert_eq!(rebuilt.kind(), original.kind());
    }

    #[test]
    fn test_from_component_link_and_select() {
        let mut link = Component::new(ComponentType::Button);
        link.style = Some(LINK_STYLE);
        link.url = Some("https://example.com".to_string());
        let item = Item::from_component(&link, None).unwrap();
        assert!(matches!(item.kind(), ItemKind::LinkButton(l) if l.url == "https://example.com"));

        let mut channel = Component::new(ComponentType::ChannelSelect);
        channel.custom_id = Some("where".to_string());
        channel.channel_types = vec![0, 5];
        let item = Item::from_component(&channel, None).unwrap();
        assert!(
            matches!(item.kind(), ItemKind::Select(s) if s.kind == SelectKind::Channel(vec![0, 5]))
        );

        let mut broken = Component::new(ComponentType::Button);
        broken.style = Some(LINK_STYLE);
        assert!(Item::from_component(&broken, None).is_err());
    }
}
