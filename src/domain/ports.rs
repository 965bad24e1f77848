use super::wallet::{Version, Wallet, WalletId};
use crate::error::StoreResult;
use async_trait::async_trait;

/// Durable keyed storage for wallet records.
///
/// `compare_and_update` must be a single atomic operation in every
/// implementation; the engine's retry loop is only correct because of it.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Inserts a new wallet and assigns its id. Rejects a negative balance
    /// with `StoreError::ValidationFailed`.
    async fn create(&self, player_id: &str, initial_balance: i64) -> StoreResult<Wallet>;

    async fn read(&self, id: WalletId) -> StoreResult<Wallet>;

    /// Writes `new_balance` and advances the version, but only if the stored
    /// version still equals `expected`. Otherwise fails with
    /// `StoreError::VersionConflict` and leaves the record untouched.
    async fn compare_and_update(
        &self,
        id: WalletId,
        expected: Version,
        new_balance: i64,
    ) -> StoreResult<Wallet>;
}

pub type WalletStoreBox = Box<dyn WalletStore>;
