use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MagpieError;

/// Top-level configuration loaded from `.magpie.toml` or the environment.
///
/// Every consumer receives a plain struct; nothing in the operation paths
/// reads the environment on its own.
///
/// # Examples
///
/// ```
/// use magpie_core::MagpieConfig;
///
/// let config = MagpieConfig::default();
/// assert_eq!(config.llm.model, "gpt-3.5-turbo");
/// assert!(config.review.supported_extensions.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagpieConfig {
    /// Gitea instance settings.
    #[serde(default)]
    pub gitea: GiteaConfig,
    /// LLM provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Review behavior settings.
    #[serde(default)]
    pub review: ReviewConfig,
}

impl MagpieConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Io`] if the file cannot be read, or
    /// [`MagpieError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use magpie_core::MagpieConfig;
    /// use std::path::Path;
    ///
    /// let config = MagpieConfig::from_file(Path::new(".magpie.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, MagpieError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`MagpieError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use magpie_core::MagpieConfig;
    ///
    /// let toml = r#"
    /// [gitea]
    /// url = "https://git.example.com"
    /// "#;
    /// let config = MagpieConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.gitea.url, "https://git.example.com");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, MagpieError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Build configuration entirely from the process environment.
    ///
    /// Reads the environment once and captures the values; see the
    /// section types for the variables each consults.
    pub fn from_env() -> Self {
        Self {
            gitea: GiteaConfig::from_env(),
            llm: LlmConfig::from_env(),
            review: ReviewConfig::from_env(),
        }
    }
}

/// Gitea instance configuration.
///
/// # Examples
///
/// ```
/// use magpie_core::GiteaConfig;
///
/// let config = GiteaConfig {
///     url: "https://git.example.com".into(),
///     token: "t0ken".into(),
/// };
/// assert!(!config.token.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GiteaConfig {
    /// Base URL of the Gitea instance.
    #[serde(default)]
    pub url: String,
    /// API access token.
    #[serde(default)]
    pub token: String,
}

impl GiteaConfig {
    /// Read `GITEA_URL` and `GITEA_TOKEN` from the environment.
    ///
    /// Unset variables become empty strings.
    pub fn from_env() -> Self {
        Self {
            url: env_var("GITEA_URL").unwrap_or_default(),
            token: env_var("GITEA_TOKEN").unwrap_or_default(),
        }
    }
}

/// LLM provider configuration for OpenAI-compatible endpoints.
///
/// # Examples
///
/// ```
/// use magpie_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-3.5-turbo");
/// assert!(config.api_key.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API.
    pub base_url: Option<String>,
    /// Default model identifier.
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
        }
    }
}

impl LlmConfig {
    /// Read `CUSTOM_API_KEY`, `CUSTOM_API_BASE_URL`, and
    /// `CUSTOM_API_MODEL` from the environment.
    ///
    /// An unset or empty model variable falls back to `gpt-3.5-turbo`.
    pub fn from_env() -> Self {
        Self {
            api_key: env_var("CUSTOM_API_KEY"),
            base_url: env_var("CUSTOM_API_BASE_URL"),
            model: env_var("CUSTOM_API_MODEL").unwrap_or_else(default_model),
        }
    }
}

/// Review behavior configuration.
///
/// # Examples
///
/// ```
/// use magpie_core::ReviewConfig;
///
/// let config = ReviewConfig {
///     supported_extensions: vec![".rs".into(), ".py".into()],
/// };
/// assert_eq!(config.supported_extensions.len(), 2);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// File suffixes eligible for review. Empty means no filtering.
    #[serde(default)]
    pub supported_extensions: Vec<String>,
}

impl ReviewConfig {
    /// Read `SUPPORTED_EXTENSIONS` (comma-separated suffix list) from the
    /// environment. Empty entries are dropped, so an unset or empty
    /// variable yields an empty list.
    pub fn from_env() -> Self {
        Self {
            supported_extensions: env_var("SUPPORTED_EXTENSIONS")
                .map(|raw| split_extensions(&raw))
                .unwrap_or_default(),
        }
    }
}

/// Split a comma-separated suffix list, dropping empty entries.
fn split_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// An environment variable, treating empty values as unset.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = MagpieConfig::default();
        assert!(config.gitea.url.is_empty());
        assert!(config.gitea.token.is_empty());
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.base_url.is_none());
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!(config.review.supported_extensions.is_empty());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[gitea]
url = "https://git.example.com"
token = "abc123"
"#;
        let config = MagpieConfig::from_toml(toml).unwrap();
        assert_eq!(config.gitea.url, "https://git.example.com");
        assert_eq!(config.gitea.token, "abc123");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[gitea]
url = "https://git.example.com"
token = "abc123"

[llm]
api_key = "sk-test"
base_url = "https://llm.example.com/v1"
model = "qwen2.5-coder"

[review]
supported_extensions = [".rs", ".py"]
"#;
        let config = MagpieConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.llm.base_url.as_deref(),
            Some("https://llm.example.com/v1")
        );
        assert_eq!(config.llm.model, "qwen2.5-coder");
        assert_eq!(config.review.supported_extensions, vec![".rs", ".py"]);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = MagpieConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert!(config.review.supported_extensions.is_empty());
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = MagpieConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }

    #[test]
    fn from_file_reads_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".magpie.toml");
        std::fs::write(&path, "[llm]\nmodel = \"deepseek-chat\"\n").unwrap();

        let config = MagpieConfig::from_file(&path).unwrap();
        assert_eq!(config.llm.model, "deepseek-chat");
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let result = MagpieConfig::from_file(Path::new("/nonexistent/.magpie.toml"));
        assert!(matches!(result, Err(MagpieError::Io(_))));
    }

    #[test]
    fn extensions_split_on_commas_dropping_empties() {
        assert_eq!(split_extensions(".rs,.py,"), vec![".rs", ".py"]);
        assert_eq!(split_extensions(".go"), vec![".go"]);
    }

    #[test]
    fn empty_extension_list_stays_empty() {
        assert!(split_extensions("").is_empty());
        assert!(split_extensions(",,").is_empty());
    }

    #[test]
    fn empty_env_value_is_treated_as_unset() {
        std::env::set_var("MAGPIE_EMPTY_PROBE", "");
        assert_eq!(env_var("MAGPIE_EMPTY_PROBE"), None);
        std::env::remove_var("MAGPIE_EMPTY_PROBE");
    }
}
