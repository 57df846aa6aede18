use thiserror::Error;

/// Failures surfaced to the view as a single human-readable `error` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("invalid filters: {0}")]
    Validation(String),
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
