//! Named action-level errors surfaced to the DEX orchestrator.
//!
//! Raw transport errors never escape the action surface: every failure is
//! wrapped into an [`InvalidActionError`] carrying a machine-readable
//! kind plus the causal error.

use thiserror::Error;

use liskdex_core::TransportError;

/// Machine-readable failure kinds for module actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionErrorKind {
    MultisigAccountDidNotExist,
    AccountDidNotExist,
    AccountWasNotMultisig,
    BlockDidNotExist,
    TransactionDidNotExist,
    TransactionBroadcastFailed,
}

impl ActionErrorKind {
    /// Stable name carried on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MultisigAccountDidNotExist => "MultisigAccountDidNotExistError",
            Self::AccountDidNotExist => "AccountDidNotExistError",
            Self::AccountWasNotMultisig => "AccountWasNotMultisigError",
            Self::BlockDidNotExist => "BlockDidNotExistError",
            Self::TransactionDidNotExist => "TransactionDidNotExistError",
            Self::TransactionBroadcastFailed => "TransactionBroadcastError",
        }
    }
}

impl std::fmt::Display for ActionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error envelope returned by every module action.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct InvalidActionError {
    pub kind: ActionErrorKind,
    pub message: String,
    #[source]
    pub source: Option<TransportError>,
}

impl InvalidActionError {
    pub fn new(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ActionErrorKind,
        message: impl Into<String>,
        source: TransportError,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_stable() {
        assert_eq!(
            ActionErrorKind::MultisigAccountDidNotExist.name(),
            "MultisigAccountDidNotExistError"
        );
        assert_eq!(
            ActionErrorKind::TransactionBroadcastFailed.name(),
            "TransactionBroadcastError"
        );
    }

    #[test]
    fn display_carries_kind_and_message() {
        let err = InvalidActionError::new(
            ActionErrorKind::BlockDidNotExist,
            "Error getting block at height 7",
        );
        assert_eq!(
            err.to_string(),
            "BlockDidNotExistError: Error getting block at height 7"
        );
    }

    #[test]
    fn causal_error_is_preserved() {
        let err = InvalidActionError::with_source(
            ActionErrorKind::AccountDidNotExist,
            "Error getting outbound transactions",
            TransportError::Status { code: 503, body: String::new() },
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
