use crate::domain::wallet::WalletId;
use thiserror::Error;

/// Failures surfaced by the ledger engine.
///
/// The set is closed: callers match on the variant, never on the message.
/// Version conflicts are deliberately absent because the engine absorbs them
/// in its retry loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },
    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),
    #[error("Concurrent update retries exhausted after {attempts} attempts")]
    ConcurrentUpdateExhausted { attempts: u32 },
    #[error("Outcome of {0} is unknown")]
    AmbiguousOutcome(&'static str),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LedgerError {
    /// Message that is safe to hand back to a caller.
    ///
    /// Store failures are redacted so that no storage detail leaks out.
    pub fn client_message(&self) -> String {
        match self {
            LedgerError::StoreUnavailable(_) => "internal server error".to_string(),
            LedgerError::WalletNotFound(_) => "wallet not found".to_string(),
            LedgerError::AmbiguousOutcome(_) => {
                "the request outcome is unknown, check the wallet before retrying".to_string()
            }
            LedgerError::ConcurrentUpdateExhausted { .. } => {
                "the wallet is busy, retry later".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Failures reported by a `WalletStore` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("wallet not found")]
    NotFound,
    #[error("version conflict")]
    VersionConflict,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for StoreError {
    fn from(err: rocksdb::Error) -> Self {
        StoreError::Unavailable(format!("RocksDB error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
