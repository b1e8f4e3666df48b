//! Rate-limit sentinel: a fixed substring some upstreams return as "content" instead of an error.

/// Text an upstream sends in place of an answer when its hourly quota is used up.
pub const DEFAULT_RATE_LIMIT_SENTINEL: &str = "You have reached your request limit for the hour.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitSentinel {
    patterns: Vec<String>,
}

impl Default for RateLimitSentinel {
    fn default() -> Self {
        Self::new([DEFAULT_RATE_LIMIT_SENTINEL])
    }
}

impl RateLimitSentinel {
    /// Empty patterns are dropped; they would match everything.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.is_empty())
                .collect(),
        }
    }

    /// True when `text` contains any sentinel pattern.
    pub fn is_hit(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| text.contains(p.as_str()))
    }
}
