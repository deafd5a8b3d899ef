//! Error types for the SharePool ledger.
//!
//! All errors use the `SP_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Pool precondition errors
//! - 2xx: Arithmetic errors
//! - 3xx: Collaborator (custody / conservation) errors
//! - 4xx: Service errors
//! - 9xx: General / internal errors
//!
//! Every 1xx and 2xx error is raised before any state is touched: the
//! ledger is left exactly as it was.

use thiserror::Error;

use crate::{AccountId, Value};

/// Central error enum for all SharePool operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SharePoolError {
    // =================================================================
    // Pool Precondition Errors (1xx)
    // =================================================================
    /// A deposit or reward amount was not strictly positive.
    #[error("SP_ERR_100: Amount must be greater than 0")]
    InvalidAmount,

    /// Withdrawal attempted by an identity holding zero shares.
    #[error("SP_ERR_101: No balance to withdraw for {0}")]
    NoBalance(AccountId),

    /// Reward injection attempted while no participant holds shares.
    #[error("SP_ERR_102: Pool is empty")]
    EmptyPool,

    /// Reward injection attempted by an identity that is not the operator.
    #[error("SP_ERR_103: Unauthorized: {0} is not the pool operator")]
    Unauthorized(AccountId),

    /// The deposit would mint zero shares at the current exchange rate.
    #[error("SP_ERR_104: Deposit of {amount} is too small to mint a share")]
    DepositTooSmall { amount: Value },

    // =================================================================
    // Arithmetic Errors (2xx)
    // =================================================================
    /// A counter or conversion would not fit in 128 bits.
    #[error("SP_ERR_200: Arithmetic overflow in {operation}")]
    ArithmeticOverflow { operation: &'static str },

    // =================================================================
    // Collaborator Errors (3xx)
    // =================================================================
    /// The withdrawal was committed but custody could not deliver the payout.
    /// The amount is kept as a pending payout for the account.
    #[error("SP_ERR_300: Custody transfer of {amount} to {account} failed: {reason}")]
    CustodyTransferFailed {
        account: AccountId,
        amount: Value,
        reason: String,
    },

    /// No pending payout exists for this account.
    #[error("SP_ERR_301: No pending payout for {0}")]
    NoPendingPayout(AccountId),

    /// Value conservation check failed. Critical safety alert.
    #[error("SP_ERR_302: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    /// Custody refused to take receipt of incoming value.
    #[error("SP_ERR_303: Custody rejected receipt: {reason}")]
    CustodyRejected { reason: String },

    // =================================================================
    // Service Errors (4xx)
    // =================================================================
    /// The pool service actor has stopped and no longer accepts calls.
    #[error("SP_ERR_400: Pool service unavailable")]
    ServiceUnavailable,

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SP_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SP_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (disk, network).
    #[error("SP_ERR_903: I/O error: {0}")]
    Io(String),
}

impl SharePoolError {
    /// Whether this is a 1xx or 2xx error: a ledger operation rejected
    /// before any mutation.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidAmount
                | Self::NoBalance(_)
                | Self::EmptyPool
                | Self::Unauthorized(_)
                | Self::DepositTooSmall { .. }
                | Self::ArithmeticOverflow { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SharePoolError>;

impl From<std::io::Error> for SharePoolError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let msg = format!("{}", SharePoolError::InvalidAmount);
        assert!(msg.starts_with("SP_ERR_100"), "Got: {msg}");
    }

    #[test]
    fn unauthorized_display_names_account() {
        let who = AccountId::from_bytes([0xAB; 20]);
        let msg = format!("{}", SharePoolError::Unauthorized(who));
        assert!(msg.contains("SP_ERR_103"));
        assert!(msg.contains("0xabab"));
    }

    #[test]
    fn custody_failure_display() {
        let err = SharePoolError::CustodyTransferFailed {
            account: AccountId::from_bytes([1; 20]),
            amount: 42,
            reason: "offline".into(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("SP_ERR_300"));
        assert!(msg.contains("42"));
        assert!(msg.contains("offline"));
        assert!(!err.is_precondition());
    }

    #[test]
    fn all_errors_have_sp_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(SharePoolError::EmptyPool),
            Box::new(SharePoolError::NoBalance(AccountId::ZERO)),
            Box::new(SharePoolError::DepositTooSmall { amount: 1 }),
            Box::new(SharePoolError::ArithmeticOverflow { operation: "deposit" }),
            Box::new(SharePoolError::ServiceUnavailable),
            Box::new(SharePoolError::Internal("test".into())),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("SP_ERR_"),
                "Error missing SP_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn only_pool_and_arithmetic_errors_are_preconditions() {
        assert!(SharePoolError::InvalidAmount.is_precondition());
        assert!(SharePoolError::Unauthorized(AccountId::ZERO).is_precondition());
        assert!(SharePoolError::ArithmeticOverflow { operation: "deposit" }.is_precondition());

        let not_preconditions = [
            SharePoolError::NoPendingPayout(AccountId::ZERO),
            SharePoolError::CustodyRejected { reason: "full".into() },
            SharePoolError::ConservationViolation { reason: "drift".into() },
            SharePoolError::ServiceUnavailable,
            SharePoolError::Internal("x".into()),
            SharePoolError::Configuration("x".into()),
            SharePoolError::Io("x".into()),
        ];
        for err in not_preconditions {
            assert!(!err.is_precondition(), "{err}");
        }
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "pool.toml");
        let err: SharePoolError = io.into();
        assert!(matches!(err, SharePoolError::Io(ref m) if m.contains("pool.toml")));
    }
}
