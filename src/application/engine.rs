use crate::config::LedgerConfig;
use crate::domain::ports::WalletStoreBox;
use crate::domain::wallet::{Amount, DeltaMode, Wallet, WalletId};
use crate::error::{LedgerError, Result, StoreError, StoreResult};
use std::future::Future;
use tracing::{debug, info, warn};

/// The balance-mutation engine.
///
/// `LedgerEngine` holds no wallet state of its own. Every mutation is a
/// read → compute → `compare_and_update` cycle against the store, retried
/// from a fresh read whenever another writer got there first. It takes no
/// locks, so any number of tasks (or processes sharing one store) can drive
/// it concurrently; share it as `Arc<LedgerEngine>`.
pub struct LedgerEngine {
    store: WalletStoreBox,
    config: LedgerConfig,
}

impl LedgerEngine {
    /// Creates an engine with the default retry budget and store timeout.
    pub fn new(store: WalletStoreBox) -> Self {
        Self::with_config(store, LedgerConfig::default())
    }

    pub fn with_config(store: WalletStoreBox, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Creates a wallet for `player_id` holding `initial_balance`.
    pub async fn create_wallet(&self, player_id: &str, initial_balance: i64) -> Result<Wallet> {
        if initial_balance < 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "initial balance must not be negative, got {initial_balance}"
            )));
        }

        let wallet = match self
            .bounded(self.store.create(player_id, initial_balance))
            .await
        {
            // The insert may have landed before the deadline hit.
            None => {
                warn!(player_id, "wallet creation timed out");
                return Err(LedgerError::AmbiguousOutcome("create"));
            }
            Some(result) => result.map_err(|e| store_failure(e, None))?,
        };

        info!(wallet_id = %wallet.id, player_id, balance = wallet.balance, "wallet created");
        Ok(wallet)
    }

    /// Reads the current state of a wallet.
    pub async fn get_balance(&self, id: WalletId) -> Result<Wallet> {
        match self.bounded(self.store.read(id)).await {
            None => Err(LedgerError::StoreUnavailable(format!(
                "read of wallet {id} timed out"
            ))),
            Some(result) => result.map_err(|e| store_failure(e, Some(id))),
        }
    }

    /// Applies a positive `amount` to the wallet in the given direction.
    ///
    /// Exactly one conditional update succeeds per successful call. Repeating
    /// a call repeats the mutation; there is no deduplication here.
    pub async fn apply_delta(&self, id: WalletId, amount: i64, mode: DeltaMode) -> Result<Wallet> {
        let amount = Amount::new(amount)?;
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let current = self.get_balance(id).await?;
            let new_balance = current.balance_after(mode, amount)?;

            let outcome = self
                .bounded(
                    self.store
                        .compare_and_update(id, current.version, new_balance),
                )
                .await;

            match outcome {
                None => {
                    warn!(wallet_id = %id, %mode, attempt, "conditional update timed out");
                    return Err(LedgerError::AmbiguousOutcome("compare_and_update"));
                }
                Some(Ok(updated)) => {
                    debug!(
                        wallet_id = %id,
                        %mode,
                        amount = amount.value(),
                        balance = updated.balance,
                        version = %updated.version,
                        attempt,
                        "delta applied"
                    );
                    return Ok(updated);
                }
                Some(Err(StoreError::VersionConflict)) => {
                    debug!(wallet_id = %id, seen = %current.version, attempt, "version conflict, retrying");
                    tokio::task::yield_now().await;
                }
                Some(Err(e)) => return Err(store_failure(e, Some(id))),
            }
        }

        warn!(wallet_id = %id, %mode, max_attempts, "retry budget exhausted");
        Err(LedgerError::ConcurrentUpdateExhausted {
            attempts: max_attempts,
        })
    }

    pub async fn credit(&self, id: WalletId, amount: i64) -> Result<Wallet> {
        self.apply_delta(id, amount, DeltaMode::Credit).await
    }

    pub async fn debit(&self, id: WalletId, amount: i64) -> Result<Wallet> {
        self.apply_delta(id, amount, DeltaMode::Debit).await
    }

    /// Awaits a store call under the configured timeout; `None` means it elapsed.
    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> Option<StoreResult<T>> {
        match self.config.store_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.ok(),
            None => Some(call.await),
        }
    }
}

/// Maps a definite store failure onto the ledger taxonomy.
fn store_failure(err: StoreError, id: Option<WalletId>) -> LedgerError {
    match (err, id) {
        (StoreError::NotFound, Some(id)) => LedgerError::WalletNotFound(id),
        (StoreError::ValidationFailed(reason), _) => LedgerError::InvalidAmount(reason),
        (StoreError::Unavailable(reason), _) => LedgerError::StoreUnavailable(reason),
        (other, _) => LedgerError::StoreUnavailable(format!("unexpected store response: {other}")),
    }
}
