//! Models offered in the selection keyboard.

pub const TEXT_MODELS: &[&str] = &[
    "llama-3.3-70b",
    "deepseek-v3",
    "deepseek-r1",
    "GPT-4o",
    "gpt-4o-mini",
];

pub const IMAGE_MODELS: &[&str] = &[
    "flux",
    "flux-pro",
    "flux-dev",
    "flux-schnell",
    "midjourney",
    "kandinsky",
];

/// True when `model` is one of the keyboard entries, compared exactly.
pub fn is_offered(model: &str) -> bool {
    TEXT_MODELS.contains(&model) || IMAGE_MODELS.contains(&model)
}

/// True when `model` routes to image generation instead of chat completion.
pub fn is_image_model(model: &str) -> bool {
    let lower = model.to_lowercase();
    lower.starts_with("flux") || IMAGE_MODELS.iter().any(|m| m.eq_ignore_ascii_case(model))
}
