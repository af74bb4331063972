//! Error types shared by the decoder, renderer and re-authentication flow.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Fatal errors. Non-fatal render issues are reported as
/// [`crate::render::Degradation`] values instead.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// A secure random source or the SHA-256 primitive failed. Never retried
    /// with a weaker source.
    #[error("crypto unavailable: {0}")]
    CryptoUnavailable(String),

    /// `loginUrl` or `clientId` is missing; the caller should send the user to
    /// the configuration step.
    #[error("authentication not configured: missing {0}")]
    AuthNotConfigured(&'static str),

    #[error("invalid login url '{url}': {reason}")]
    InvalidLoginUrl { url: String, reason: String },

    #[error("invalid code verifier: {0}")]
    InvalidVerifier(String),

    /// The authorization server redirected back with an `error` parameter.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("invalid callback: {0}")]
    Callback(String),

    #[error("no pending code verifier in session storage")]
    MissingVerifier,

    #[error("session storage error: {0}")]
    Store(String),

    /// The auth-info provider could not be reached or returned garbage.
    #[error("auth info unavailable: {0}")]
    AuthInfo(String),

    #[error("document is not a JSON object")]
    NotAnObject,

    #[error("document nesting exceeds depth limit of {0}")]
    DepthExceeded(usize),
}

impl ViewerError {
    /// True when the caller should redirect to configuration instead of
    /// reporting a failure.
    pub fn needs_configuration(&self) -> bool {
        matches!(
            self,
            ViewerError::AuthNotConfigured(_) | ViewerError::InvalidLoginUrl { .. }
        )
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(e: reqwest::Error) -> Self {
        ViewerError::AuthInfo(e.to_string())
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(e: std::io::Error) -> Self {
        ViewerError::Store(e.to_string())
    }
}
