//! Errors surfaced by registry operations.

/// Failure of a register or query request.
///
/// `InvalidArgument` is always detected before any table mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("caller address unavailable: {0}")]
    AddressResolution(String),
}

impl RegistryError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
