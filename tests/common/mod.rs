#![allow(dead_code)]

use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use wallet_ledger::application::engine::LedgerEngine;
use wallet_ledger::domain::ports::WalletStore;
use wallet_ledger::domain::wallet::{Version, Wallet, WalletId};
use wallet_ledger::error::{StoreError, StoreResult};
use wallet_ledger::infrastructure::in_memory::InMemoryWalletStore;

pub const COMMAND_HEADER: &str = "action, wallet, player, amount";

pub fn in_memory_engine() -> Arc<LedgerEngine> {
    Arc::new(LedgerEngine::new(Box::new(InMemoryWalletStore::new())))
}

/// Writes a command CSV (header included) to a temporary file.
pub fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", COMMAND_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}

/// A store whose backend is down.
pub struct UnavailableStore;

#[async_trait]
impl WalletStore for UnavailableStore {
    async fn create(&self, _player_id: &str, _initial_balance: i64) -> StoreResult<Wallet> {
        Err(StoreError::Unavailable(
            "connection refused: postgres://ledger@10.0.0.3".to_string(),
        ))
    }

    async fn read(&self, _id: WalletId) -> StoreResult<Wallet> {
        Err(StoreError::Unavailable(
            "connection refused: postgres://ledger@10.0.0.3".to_string(),
        ))
    }

    async fn compare_and_update(
        &self,
        _id: WalletId,
        _expected: Version,
        _new_balance: i64,
    ) -> StoreResult<Wallet> {
        Err(StoreError::Unavailable(
            "connection refused: postgres://ledger@10.0.0.3".to_string(),
        ))
    }
}

/// Simulates a wallet that some other writer updates between every read and
/// write: all conditional updates conflict.
pub struct ContendedStore {
    pub inner: InMemoryWalletStore,
}

#[async_trait]
impl WalletStore for ContendedStore {
    async fn create(&self, player_id: &str, initial_balance: i64) -> StoreResult<Wallet> {
        self.inner.create(player_id, initial_balance).await
    }

    async fn read(&self, id: WalletId) -> StoreResult<Wallet> {
        self.inner.read(id).await
    }

    async fn compare_and_update(
        &self,
        _id: WalletId,
        _expected: Version,
        _new_balance: i64,
    ) -> StoreResult<Wallet> {
        Err(StoreError::VersionConflict)
    }
}
