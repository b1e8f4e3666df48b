//! Transport-agnostic keyboard descriptions attached to outgoing messages.

/// One inline button; pressing it produces a callback query carrying `callback_data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Inline keyboard shown under a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Lays out `buttons` left to right, `columns` per row (last row may be shorter).
    pub fn from_buttons(buttons: Vec<InlineButton>, columns: usize) -> Self {
        let columns = columns.max(1);
        let mut rows = Vec::new();
        let mut row = Vec::with_capacity(columns);
        for button in buttons {
            row.push(button);
            if row.len() == columns {
                rows.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        Self { rows }
    }

    /// All buttons in display order.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Persistent reply keyboard replacing the user's text keyboard; each label is sent back as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Inline(InlineKeyboard),
    Reply(ReplyKeyboard),
}
