/// Errors that can occur across the magpie crates.
///
/// Each variant wraps a specific failure domain. The webhook handlers
/// catch these at their fail-soft boundary; the LLM client returns them
/// to the caller.
///
/// # Examples
///
/// ```
/// use magpie_core::MagpieError;
///
/// let err = MagpieError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MagpieError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required field was absent from a webhook payload.
    #[error("missing webhook field: {0}")]
    MissingField(&'static str),

    /// The outbound request could not be sent or its body read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The Gitea API answered with a non-success status.
    #[error("Gitea API error {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, if it could be read.
        body: String,
    },

    /// LLM provider or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
