use std::fmt;

/// Google API keys issued for the Generative Language API start with this prefix.
pub const KEY_PREFIX: &str = "AIza";

/// The Generative Language API key. `Debug` and `Display` never print it in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Normalizes a raw value from the environment: trims whitespace and any
    /// wrapping quotes left over from `.env` files. Blank values are rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw
            .trim()
            .trim_matches('"')
            .trim_matches('\'')
            .trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(Self(cleaned.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn has_expected_format(&self) -> bool {
        self.0.starts_with(KEY_PREFIX)
    }

    /// First and last four characters, or `***` for short keys.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() > 8 {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{head}...{tail}")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}
