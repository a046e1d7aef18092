//! Configuration for HTML output

/// Configuration options for the generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlConfig {
    /// `lang` of the document when `<mjml lang>` is not set
    pub language: String,

    /// `dir` of the document when `<mjml dir>` is not set
    pub direction: String,

    /// Collapse whitespace in inline styles and the head stylesheet
    pub css_minify: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            language: "und".to_string(),
            direction: "ltr".to_string(),
            css_minify: false,
        }
    }
}

impl HtmlConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the text direction (`ltr` or `rtl`)
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = direction.into();
        self
    }

    /// Set whether CSS is minified
    pub fn with_css_minify(mut self, minify: bool) -> Self {
        self.css_minify = minify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HtmlConfig::default();
        assert_eq!(config.language, "und");
        assert_eq!(config.direction, "ltr");
        assert!(!config.css_minify);
    }

    #[test]
    fn test_builder_pattern() {
        let config = HtmlConfig::new()
            .with_language("de")
            .with_direction("rtl")
            .with_css_minify(true);

        assert_eq!(config.language, "de");
        assert_eq!(config.direction, "rtl");
        assert!(config.css_minify);
    }
}
