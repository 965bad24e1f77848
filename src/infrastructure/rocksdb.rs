use crate::domain::ports::WalletStore;
use crate::domain::wallet::{Version, Wallet, WalletId};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, ErrorKind, OptimisticTransactionDB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing wallet records.
pub const CF_WALLETS: &str = "wallets";
/// Column Family for bookkeeping such as the id sequence.
pub const CF_META: &str = "meta";

const LAST_ID_KEY: &[u8] = b"last_wallet_id";

/// Commit attempts `create` makes when racing other creators for the id sequence.
const CREATE_COMMIT_ATTEMPTS: usize = 16;

/// A persistent wallet store backed by RocksDB.
///
/// Every write runs inside an optimistic transaction. `compare_and_update`
/// reads the row with `get_for_update`, checks the version and commits; a
/// commit rejected because another writer touched the row is reported as a
/// version conflict.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDBWalletStore {
    db: Arc<OptimisticTransactionDB>,
}

fn is_write_conflict(err: &rocksdb::Error) -> bool {
    matches!(err.kind(), ErrorKind::Busy | ErrorKind::TryAgain)
}

fn encode(wallet: &Wallet) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(wallet)
        .map_err(|e| StoreError::Unavailable(format!("Serialization error: {}", e)))
}

fn decode(bytes: &[u8]) -> StoreResult<Wallet> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Unavailable(format!("Deserialization error: {}", e)))
}

/// Runs a RocksDB call on the blocking pool.
///
/// The returned future yields while the call is in flight, so a caller's
/// timeout can elapse; the call itself still runs to completion.
async fn run_blocking<T, F>(call: F) -> StoreResult<T>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| StoreError::Unavailable(format!("storage task failed: {}", e)))?
}

impl RocksDBWalletStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("wallets" and "meta") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_wallets = ColumnFamilyDescriptor::new(CF_WALLETS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db: OptimisticTransactionDB =
            OptimisticTransactionDB::open_cf_descriptors(&opts, path, vec![cf_wallets, cf_meta])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> StoreResult<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Unavailable(format!("{} column family not found", name)))
    }

    fn create_blocking(&self, player_id: &str, initial_balance: i64) -> StoreResult<Wallet> {
        let wallets = self.cf(CF_WALLETS)?;
        let meta = self.cf(CF_META)?;

        for _ in 0..CREATE_COMMIT_ATTEMPTS {
            let txn = self.db.transaction();
            let last_id = match txn.get_for_update_cf(meta, LAST_ID_KEY, true)? {
                Some(bytes) => {
                    let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                        StoreError::Unavailable("corrupt wallet id sequence".to_string())
                    })?;
                    u64::from_be_bytes(raw)
                }
                None => 0,
            };

            let id = WalletId(last_id + 1);
            let wallet = Wallet::new(id, player_id, initial_balance);
            txn.put_cf(meta, LAST_ID_KEY, id.0.to_be_bytes())?;
            txn.put_cf(wallets, id.0.to_be_bytes(), encode(&wallet)?)?;

            match txn.commit() {
                Ok(()) => return Ok(wallet),
                Err(e) if is_write_conflict(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::Unavailable(
            "could not allocate a wallet id under contention".to_string(),
        ))
    }

    fn read_blocking(&self, id: WalletId) -> StoreResult<Wallet> {
        let wallets = self.cf(CF_WALLETS)?;
        match self.db.get_cf(wallets, id.0.to_be_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Err(StoreError::NotFound),
        }
    }

    fn compare_and_update_blocking(
        &self,
        id: WalletId,
        expected: Version,
        new_balance: i64,
    ) -> StoreResult<Wallet> {
        let wallets = self.cf(CF_WALLETS)?;
        let key = id.0.to_be_bytes();

        let txn = self.db.transaction();
        let mut wallet = match txn.get_for_update_cf(wallets, key, true)? {
            Some(bytes) => decode(&bytes)?,
            None => return Err(StoreError::NotFound),
        };
        if wallet.version != expected {
            return Err(StoreError::VersionConflict);
        }

        wallet.balance = new_balance;
        wallet.version = wallet.version.next();
        txn.put_cf(wallets, key, encode(&wallet)?)?;

        match txn.commit() {
            Ok(()) => Ok(wallet),
            Err(e) if is_write_conflict(&e) => Err(StoreError::VersionConflict),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl WalletStore for RocksDBWalletStore {
    async fn create(&self, player_id: &str, initial_balance: i64) -> StoreResult<Wallet> {
        if initial_balance < 0 {
            return Err(StoreError::ValidationFailed(
                "initial balance must not be negative".to_string(),
            ));
        }
        let store = self.clone();
        let player_id = player_id.to_string();
        run_blocking(move || store.create_blocking(&player_id, initial_balance)).await
    }

    async fn read(&self, id: WalletId) -> StoreResult<Wallet> {
        let store = self.clone();
        run_blocking(move || store.read_blocking(id)).await
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
        let store = self.clone();
        run_blocking(move || store.compare_and_update_blocking(id, expected, new_balance)).await
    }
}
