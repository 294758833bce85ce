use crate::session::Session;
use thiserror::Error;

/// Failure of a single identity assignment. The message is kept verbatim for
/// the results table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        RemoteError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Attaches an identity (such as a card number) to the account behind `email`.
#[cfg_attr(test, mockall::automock)]
pub trait IdentityAssigner {
    fn assign_identity(
        &self,
        session: &Session,
        email: &str,
        identity_type: &str,
        identity_value: &str,
    ) -> Result<(), RemoteError>;
}
