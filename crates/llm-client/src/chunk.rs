//! Closed set of chunk shapes a provider stream may produce.

/// One item of an upstream stream before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawChunk {
    /// Already plain text.
    Text(String),
    /// Structured chunk exposing a content field (may be empty, e.g. role-only or finish chunks).
    Structured { content: String },
    /// Shape we do not understand; carries a description for logging.
    Unrecognized(String),
}

impl RawChunk {
    /// Resolves the chunk into a text delta. Empty content and unrecognized shapes yield `None`.
    pub fn into_delta(self) -> Option<String> {
        match self {
            RawChunk::Text(text) | RawChunk::Structured { content: text } if !text.is_empty() => {
                Some(text)
            }
            _ => None,
        }
    }
}
