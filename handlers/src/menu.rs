//! Main menu and paginated model keyboard.

use gptbot_core::{catalog, InlineButton, InlineKeyboard, ReplyKeyboard};

pub const CHOOSE_MODEL_LABEL: &str = "Choose model 🤖";
pub const ABOUT_LABEL: &str = "About bot ℹ️";

pub const PAGE_PREFIX: &str = "page_";
pub const MODEL_PREFIX: &str = "model_";

/// Page with the text models.
pub const TEXT_PAGE: u8 = 1;
/// Page with the image models.
pub const IMAGE_PAGE: u8 = 2;

pub fn main_menu() -> ReplyKeyboard {
    ReplyKeyboard {
        rows: vec![
            vec![CHOOSE_MODEL_LABEL.to_string()],
            vec![ABOUT_LABEL.to_string()],
        ],
        resize: true,
    }
}

/// First letter upper case, the rest lower case: `GPT-4o` → `Gpt-4o`.
pub fn button_label(model: &str) -> String {
    let mut chars = model.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Two-column keyboard for `page`: the page's models followed by the button switching pages.
/// Any page other than [`IMAGE_PAGE`] shows the text models.
pub fn model_keyboard(page: u8) -> InlineKeyboard {
    let (models, switch) = if page == IMAGE_PAGE {
        (
            catalog::IMAGE_MODELS,
            InlineButton::new("⬅️ Text models", format!("{}{}", PAGE_PREFIX, TEXT_PAGE)),
        )
    } else {
        (
            catalog::TEXT_MODELS,
            InlineButton::new("➡️ Image models", format!("{}{}", PAGE_PREFIX, IMAGE_PAGE)),
        )
    };
    let mut buttons: Vec<InlineButton> = models
        .iter()
        .map(|m| InlineButton::new(button_label(m), format!("{}{}", MODEL_PREFIX, m)))
        .collect();
    buttons.push(switch);
    InlineKeyboard::from_buttons(buttons, 2)
}

/// Heading shown above the model keyboard for `page`.
pub fn page_title(page: u8) -> &'static str {
    if page == IMAGE_PAGE {
        "Choose an image model:"
    } else {
        "Choose a text model:"
    }
}
