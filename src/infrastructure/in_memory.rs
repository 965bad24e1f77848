use crate::domain::ports::WalletStore;
use crate::domain::wallet::{Version, Wallet, WalletId};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for wallets.
///
/// Uses `Arc<RwLock<HashMap<WalletId, Wallet>>>` so clones share the same
/// records. The version check and the write of `compare_and_update` happen
/// under one write guard, which is what makes the operation atomic.
#[derive(Default, Clone)]
pub struct InMemoryWalletStore {
    wallets: Arc<RwLock<HashMap<WalletId, Wallet>>>,
    last_id: Arc<AtomicU64>,
}

impl InMemoryWalletStore {
    /// Creates a new, empty in-memory wallet store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of wallets currently held.
    pub async fn len(&self) -> usize {
        self.wallets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.wallets.read().await.is_empty()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn create(&self, player_id: &str, initial_balance: i64) -> StoreResult<Wallet> {
        if initial_balance < 0 {
            return Err(StoreError::ValidationFailed(
                "initial balance must not be negative".to_string(),
            ));
        }

        let mut wallets = self.wallets.write().await;
        let id = WalletId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let wallet = Wallet::new(id, player_id, initial_balance);
        wallets.insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn read(&self, id: WalletId) -> StoreResult<Wallet> {
        let wallets = self.wallets.read().await;
        wallets.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn compare_and_update(
        &self,
        id: WalletId,
        expected: Version,
        new_balance: i64,
    ) -> StoreResult<Wallet> {
        if new_balance < 0 {
            return Err(StoreError::ValidationFailed(
                "balance must not be negative".to_string(),
            ));
        }

        let mut wallets = self.wallets.write().await;
        let wallet = wallets.get_mut(&id).ok_or(StoreError::NotFound)?;
        if wallet.version != expected {
            return Err(StoreError::VersionConflict);
        }

        wallet.balance = new_balance;
        wallet.version = wallet.version.next();
        Ok(wallet.clone())
    }
}
