//! Download URL templates

use llvmpkg_config::{SourceConfig, TemplateKind};
use llvmpkg_errors::{ConfigError, Error};

const COMPONENT: &str = "{component}";
const VERSION: &str = "{version}";

/// URL pattern with `{component}` and `{version}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    pattern: String,
}

impl UrlTemplate {
    /// Zip archives on a flat mirror
    #[must_use]
    pub fn mirror(base: &str) -> Self {
        Self {
            pattern: format!("{}/{COMPONENT}-{VERSION}.src.zip", base.trim_end_matches('/')),
        }
    }

    /// xz tarballs laid out per release, as on the upstream release server
    #[must_use]
    pub fn upstream(base: &str) -> Self {
        Self {
            pattern: format!(
                "{}/{VERSION}/{COMPONENT}-{VERSION}.src.tar.xz",
                base.trim_end_matches('/')
            ),
        }
    }

    /// Arbitrary pattern
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` unless both placeholders are present.
    pub fn custom(pattern: impl Into<String>) -> Result<Self, Error> {
        let pattern = pattern.into();
        if !pattern.contains(COMPONENT) || !pattern.contains(VERSION) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "URL template `{pattern}` must contain {COMPONENT} and {VERSION}"
                ),
            }
            .into());
        }
        Ok(Self { pattern })
    }

    /// Template selected by the `[source]` configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a custom template that is missing or
    /// lacks placeholders.
    pub fn from_config(source: &SourceConfig) -> Result<Self, Error> {
        match source.template {
            TemplateKind::Custom => {
                let pattern = source.custom_template.clone().ok_or_else(|| ConfigError::Invalid {
                    message: "source.custom_template is required for the custom template"
                        .to_string(),
                })?;
                Self::custom(pattern)
            }
            kind => {
                let base = source
                    .base_url
                    .as_deref()
                    .or_else(|| kind.default_base())
                    .unwrap_or_default();
                Ok(if kind == TemplateKind::Upstream {
                    Self::upstream(base)
                } else {
                    Self::mirror(base)
                })
            }
        }
    }

    /// Substitute both placeholders
    #[must_use]
    pub fn render(&self, component: &str, version: &str) -> String {
        self.pattern
            .replace(COMPONENT, component)
            .replace(VERSION, version)
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}
