use thiserror::Error;

/// Error returned by user-supplied hooks (recycle, dispose, refresh, constructors).
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result of a user-supplied hook.
pub type HookResult = Result<(), HookError>;

#[derive(Debug, Error)]
pub enum KeeperError {
    #[error("Instantiation failed for {class}: {reason}")]
    Instantiation { class: String, reason: String },

    #[error("Recycling failed for {class}: {reason}")]
    Recycle { class: String, reason: String },

    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("Cache entry expired: {0}")]
    Expired(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl KeeperError {
    pub(crate) fn instantiation(class: &str, reason: impl ToString) -> Self {
        Self::Instantiation { class: class.to_string(), reason: reason.to_string() }
    }

    pub(crate) fn recycle(class: &str, reason: impl ToString) -> Self {
        Self::Recycle { class: class.to_string(), reason: reason.to_string() }
    }

    /// True for the two cache-miss variants, which callers usually treat alike.
    #[must_use]
    pub const fn is_cache_miss(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Expired(_))
    }
}

impl From<std::io::Error> for KeeperError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
