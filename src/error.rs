#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Network, timeout or body decoding failure. Never retried.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The access token was rejected and could not be refreshed.
    ///
    /// By the time this is returned the session has been cleared and the
    /// navigator has been sent to the sign-in destination.
    #[error("Authentication expired")]
    AuthExpired,

    #[error("{operation} failed ({status}): {detail}")]
    Api {
        operation: &'static str,
        status: u16,
        detail: String,
    },

    /// Caller input rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Token store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Message suitable for showing to the user.
    ///
    /// For API errors this is the server-provided detail; for everything
    /// else it is the error's display text.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Api { detail, .. } => detail.clone(),
            Self::Validation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of an API error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
