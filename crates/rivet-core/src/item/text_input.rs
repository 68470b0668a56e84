//! Modal text inputs.

/// Single-line or multi-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextInputStyle {
    #[default]
    Short = 1,
    Paragraph = 2,
}

impl TextInputStyle {
    /// Parses a wire style value.
    pub fn from_wire(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Short),
            2 => Some(Self::Paragraph),
            _ => None,
        }
    }
}

/// A text field that can only live inside a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub label: String,
    pub style: TextInputStyle,
    pub placeholder: Option<String>,
    /// Pre-filled value.
    pub value: Option<String>,
    pub required: bool,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
}

impl TextInput {
    /// Creates a required short input with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: TextInputStyle::Short,
            placeholder: None,
            value: None,
            required: true,
            min_length: None,
            max_length: None,
        }
    }

    pub fn style(mut self, style: TextInputStyle) -> Self {
        self.style = style;
        self
    }

    /// Switches to a multi-line input.
    pub fn paragraph(self) -> Self {
        self.style(TextInputStyle::Paragraph)
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Pre-fills the input.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, min: u16) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }
}
