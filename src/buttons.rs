use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback payload of the exit button every prompt may carry.
pub const EXIT_DATA: &str = "pawprint:exit";

/// A single inline button: label plus the callback payload it sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: data.into(),
        }
    }

    pub fn exit(text: impl Into<String>) -> Self {
        Self::new(text, EXIT_DATA)
    }
}

/// Navigation controls shown under a prompt, laid out in rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonSet {
    rows: Vec<Vec<Button>>,
}

impl ButtonSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn rows(&self) -> &[Vec<Button>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a callback payload belongs to one of these buttons.
    pub fn contains(&self, data: &str) -> bool {
        self.rows.iter().flatten().any(|b| b.data == data)
    }

    /// Copy of this set with an exit button on its own last row.
    pub fn with_exit(&self, label: &str) -> Self {
        self.clone().row(vec![Button::exit(label)])
    }

    pub fn to_inline_keyboard(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(self.rows.iter().map(|row| {
            row.iter()
                .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.data.clone()))
                .collect::<Vec<_>>()
        }))
    }
}
