use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Tone of the generated roasts: plain English sarcasm, or Hinglish desi slang
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StyleVariant {
    #[default]
    Global,
    #[serde(alias = "indian")]
    Regional,
}

impl StyleVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            StyleVariant::Global => "global",
            StyleVariant::Regional => "regional",
        }
    }

    /// Shown while the roast is still being generated
    pub fn placeholder(self) -> &'static str {
        match self {
            StyleVariant::Global => "Hold your horses...",
            StyleVariant::Regional => "Ruk jaa, bata raha hu yaar...",
        }
    }

    /// Shown next to a failed weather fetch
    pub fn fetch_failed_notice(self) -> &'static str {
        match self {
            StyleVariant::Global => "Weather API is having a moment. Typical.",
            StyleVariant::Regional => "API ki halat kharab hai yaar. Kya karein ab?",
        }
    }
}

impl fmt::Display for StyleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown style '{0}', expected 'global' or 'regional'")]
pub struct UnknownStyle(pub String);

impl FromStr for StyleVariant {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(StyleVariant::Global),
            "regional" | "indian" => Ok(StyleVariant::Regional),
            other => Err(UnknownStyle(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_style() {
        assert_eq!("global".parse::<StyleVariant>().unwrap(), StyleVariant::Global);
        assert_eq!(" Regional ".parse::<StyleVariant>().unwrap(), StyleVariant::Regional);
        assert_eq!("INDIAN".parse::<StyleVariant>().unwrap(), StyleVariant::Regional);
        assert!("pirate".parse::<StyleVariant>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&StyleVariant::Regional).unwrap(), "\"regional\"");
        let style: StyleVariant = serde_json::from_str("\"indian\"").unwrap();
        assert_eq!(style, StyleVariant::Regional);
    }

    #[test]
    fn test_placeholders_differ_per_style() {
        assert_ne!(
            StyleVariant::Global.placeholder(),
            StyleVariant::Regional.placeholder()
        );
        assert!(!StyleVariant::Regional.fetch_failed_notice().is_empty());
    }
}
