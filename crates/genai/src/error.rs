/// Errors from the generation API layer.
///
/// Every variant is terminal for the individual call; the orchestrator
/// never retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// No API key configured.
    #[error("No generation API key configured. Set GEMINI_API_KEY")]
    MissingApiKey,

    /// The API refused the request on policy grounds.
    #[error(
        "Generation blocked: {reason}{detail}",
        detail = .message.as_deref().map(|m| format!(". {m}")).unwrap_or_default()
    )]
    Blocked {
        reason: String,
        message: Option<String>,
    },

    /// The API reported success but returned no image.
    #[error("The model did not return an image")]
    NoImage,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Generation API error ({status}): {body}")]
    Api { status: u16, body: String },
}
