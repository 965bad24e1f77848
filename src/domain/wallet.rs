use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Store-assigned wallet identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletId(pub u64);

impl fmt::Display for WalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised when an identifier is not a plain run of decimal digits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid wallet id: {0:?}")]
pub struct InvalidWalletId(pub String);

impl FromStr for WalletId {
    type Err = InvalidWalletId;

    /// Accepts decimal digits only; signs such as `+5` are rejected.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidWalletId(s.to_string()));
        }
        digits
            .parse::<u64>()
            .map(WalletId)
            .map_err(|_| InvalidWalletId(s.to_string()))
    }
}

/// Optimistic-concurrency token.
///
/// A plain counter, never derived from wall-clock time. Every successful
/// update moves it forward by exactly one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    pub const INITIAL: Self = Self(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A strictly positive adjustment amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Direction of a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaMode {
    Credit,
    Debit,
}

impl fmt::Display for DeltaMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeltaMode::Credit => write!(f, "credit"),
            DeltaMode::Debit => write!(f, "debit"),
        }
    }
}

/// The balance record for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: WalletId,
    pub player_id: String,
    /// Never negative.
    pub balance: i64,
    pub version: Version,
}

impl Wallet {
    pub fn new(id: WalletId, player_id: impl Into<String>, balance: i64) -> Self {
        Self {
            id,
            player_id: player_id.into(),
            balance,
            version: Version::INITIAL,
        }
    }

    /// Computes the balance that applying `amount` in `mode` would produce.
    ///
    /// Pure: the wallet itself is left untouched, the caller decides whether
    /// to persist the result.
    pub fn balance_after(&self, mode: DeltaMode, amount: Amount) -> Result<i64> {
        match mode {
            DeltaMode::Credit => self.balance.checked_add(amount.value()).ok_or_else(|| {
                LedgerError::InvalidAmount(format!(
                    "crediting {} would overflow the balance",
                    amount.value()
                ))
            }),
            DeltaMode::Debit => match self.balance.checked_sub(amount.value()) {
                Some(next) if next >= 0 => Ok(next),
                _ => Err(LedgerError::InsufficientFunds {
                    balance: self.balance,
                    requested: amount.value(),
                }),
            },
        }
    }
}
