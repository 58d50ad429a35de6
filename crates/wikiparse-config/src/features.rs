//! Feature toggles.
//!
//! This module contains the `FeaturesConfig` struct, the file form of the
//! three switches the scanner reads during a parse call.

use serde::{Deserialize, Serialize};
use wikiparse_core::ParserConfig;

/// Feature toggles configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeaturesConfig {
    /// Enable the markup additions: definition lists and the code, keyboard,
    /// sample, variable, underline, superscript, and subscript spans.
    /// Default: false
    #[serde(default)]
    pub additions: bool,

    /// Report single line breaks inside paragraphs as line break tokens.
    /// Default: false
    #[serde(default)]
    pub blog_style: bool,

    /// Mark inline nowiki spans as monospaced.
    /// Default: false
    #[serde(default)]
    pub monospace: bool,
}

impl FeaturesConfig {
    /// Merge another FeaturesConfig into this one.
    ///
    /// Every field is copied from `other`; a partial override file is parsed
    /// with defaults for the keys it leaves out.
    pub fn merge(&mut self, other: &FeaturesConfig) {
        self.additions = other.additions;
        self.blog_style = other.blog_style;
        self.monospace = other.monospace;
    }

    /// Every toggle switched on.
    pub fn all_enabled() -> Self {
        Self {
            additions: true,
            blog_style: true,
            monospace: true,
        }
    }

    /// The scanner's view of these toggles.
    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig::new(self.additions, self.blog_style, self.monospace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let features = FeaturesConfig::default();
        assert!(!features.additions);
        assert!(!features.blog_style);
        assert!(!features.monospace);
    }

    #[test]
    fn test_serde_pascal_case() {
        let toml_str = r#"
            Additions = true
            BlogStyle = true
        "#;

        let features: FeaturesConfig = toml::from_str(toml_str).unwrap();
        assert!(features.additions);
        assert!(features.blog_style);
        assert!(!features.monospace);
    }

    #[test]
    fn test_parser_config() {
        let config = FeaturesConfig::all_enabled().parser_config();
        assert_eq!(config, ParserConfig::new(true, true, true));
    }
}
