use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use inspr_core_types::TransactionId;
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::brokers::{BrokerRegistry, StaticBrokers};
use crate::config::InsprConfig;
use crate::diff::{self, Changelog};
use crate::errors::{InsprError, Result};
use crate::model::App;
use crate::{log_op_end, log_op_error, log_op_start};

use super::alias_ops::AliasManager;
use super::app_ops::{stamp_contents, AppManager};
use super::channel_ops::ChannelManager;
use super::getters::TreeReader;
use super::reindex::reindex;
use super::type_ops::TypeManager;

/// Default deadline for acquiring the writer lock
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Owner of the committed dApp tree
///
/// Readers take cheap snapshots with [`TreeStore::perm`] at any time.
/// Writers open a [`Transaction`]; only one may be open at once, and
/// opening waits at most for the configured deadline.
pub struct TreeStore {
    committed: RwLock<Arc<App>>,
    writer: Mutex<()>,
    brokers: Arc<dyn BrokerRegistry>,
    timeout: Duration,
    next_tx: AtomicU64,
}

impl std::fmt::Debug for TreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeStore")
            .field("timeout", &self.timeout)
            .field("brokers", &self.brokers.available())
            .finish_non_exhaustive()
    }
}

impl TreeStore {
    /// Empty tree: a nameless root with no content
    pub fn new(brokers: Arc<dyn BrokerRegistry>) -> Self {
        Self::with_root(App::default(), brokers)
    }

    /// Store seeded with an existing tree
    ///
    /// Scopes are stamped onto every entity and reverse indices rebuilt, so
    /// hand-built fixtures behave like trees produced by the managers.
    pub fn with_root(mut root: App, brokers: Arc<dyn BrokerRegistry>) -> Self {
        stamp_contents(&mut root, "");
        reindex(&mut root);
        Self {
            committed: RwLock::new(Arc::new(root)),
            writer: Mutex::new(()),
            brokers,
            timeout: DEFAULT_TRANSACTION_TIMEOUT,
            next_tx: AtomicU64::new(1),
        }
    }

    /// Store using the brokers and transaction deadline of `config`
    pub fn from_config(config: &InsprConfig) -> Self {
        Self::new(Arc::new(config.broker_registry())).with_timeout(config.transaction_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn brokers(&self) -> &dyn BrokerRegistry {
        self.brokers.as_ref()
    }

    /// Snapshot of the committed tree, unaffected by open transactions
    pub fn perm(&self) -> PermTree {
        PermTree {
            root: Arc::clone(&self.committed.read()),
        }
    }

    /// Open a transaction, waiting at most the configured deadline
    ///
    /// # Errors
    ///
    /// `TransactionTimeout` if another transaction stays open past the
    /// deadline.
    pub fn init_transaction(&self) -> Result<Transaction<'_>> {
        self.try_init_transaction(self.timeout)
    }

    /// Open a transaction, waiting at most `timeout`
    ///
    /// # Errors
    ///
    /// `TransactionTimeout` if another transaction stays open past
    /// `timeout`.
    pub fn try_init_transaction(&self, timeout: Duration) -> Result<Transaction<'_>> {
        log_op_start!("tx_init");
        let start = Instant::now();

        let Some(guard) = self.writer.try_lock_for(timeout) else {
            let err = InsprError::TransactionTimeout {
                waited_ms: timeout.as_millis() as u64,
            };
            log_op_error!(
                "tx_init",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        };

        let base = Arc::clone(&self.committed.read());
        let shadow = (*base).clone();
        let id = TransactionId::new(self.next_tx.fetch_add(1, Ordering::Relaxed));

        log_op_end!(
            "tx_init",
            duration_ms = start.elapsed().as_millis() as u64,
            transaction_id = %id
        );

        Ok(Transaction {
            store: self,
            _guard: guard,
            base,
            shadow,
            id,
            opened: Instant::now(),
            finished: false,
        })
    }
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new(Arc::new(StaticBrokers::default()))
    }
}

/// Read-only view of a committed tree
#[derive(Debug, Clone)]
pub struct PermTree {
    root: Arc<App>,
}

impl PermTree {
    pub fn root(&self) -> &App {
        &self.root
    }
}

impl TreeReader for PermTree {
    fn tree(&self) -> &App {
        &self.root
    }
}

/// The single open write transaction of a [`TreeStore`]
///
/// Managers mutate a private shadow copy. [`Transaction::commit`] publishes
/// it; [`Transaction::cancel`] or dropping the handle discards it. Either
/// way the writer lock is released exactly once.
pub struct Transaction<'s> {
    store: &'s TreeStore,
    _guard: MutexGuard<'s, ()>,
    base: Arc<App>,
    shadow: App,
    id: TransactionId,
    opened: Instant,
    finished: bool,
}

impl<'s> Transaction<'s> {
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// The shadow tree as mutated so far
    pub fn root(&self) -> &App {
        &self.shadow
    }

    /// The committed tree this transaction started from
    pub fn perm(&self) -> PermTree {
        PermTree {
            root: Arc::clone(&self.base),
        }
    }

    pub fn apps(&mut self) -> AppManager<'_> {
        AppManager::new(&mut self.shadow, self.store.brokers.as_ref())
    }

    pub fn channels(&mut self) -> ChannelManager<'_> {
        ChannelManager::new(&mut self.shadow, self.store.brokers.as_ref())
    }

    pub fn types(&mut self) -> TypeManager<'_> {
        TypeManager::new(&mut self.shadow)
    }

    pub fn aliases(&mut self) -> AliasManager<'_> {
        AliasManager::new(&mut self.shadow)
    }

    /// Net effect of the transaction so far: committed tree to shadow
    ///
    /// # Errors
    ///
    /// `DiffMisaligned` if the root itself was renamed.
    pub fn changes(&self) -> Result<Changelog> {
        diff::diff(&self.base, &self.shadow)
    }

    /// Publish the shadow tree as the new committed tree
    ///
    /// No validation happens here; every manager call already validated
    /// its own change.
    pub fn commit(mut self) {
        log_op_start!("tx_commit", transaction_id = %self.id);
        let start = Instant::now();
        let shadow = std::mem::take(&mut self.shadow);
        *self.store.committed.write() = Arc::new(shadow);
        self.finished = true;
        log_op_end!(
            "tx_commit",
            duration_ms = start.elapsed().as_millis() as u64,
            transaction_id = %self.id,
            open_ms = self.opened.elapsed().as_millis() as u64
        );
    }

    /// Discard the shadow tree
    pub fn cancel(mut self) {
        log_op_start!("tx_cancel", transaction_id = %self.id);
        let start = Instant::now();
        self.finished = true;
        log_op_end!(
            "tx_cancel",
            duration_ms = start.elapsed().as_millis() as u64,
            transaction_id = %self.id,
            open_ms = self.opened.elapsed().as_millis() as u64
        );
    }
}

impl TreeReader for Transaction<'_> {
    fn tree(&self) -> &App {
        &self.shadow
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                component = module_path!(),
                op = "tx_cancel",
                transaction_id = %self.id,
                "transaction dropped without commit or cancel, discarding changes"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Channel, ChannelType};
    use crate::ops::getters::{AppGetter, ChannelGetter};

    fn store() -> TreeStore {
        TreeStore::new(Arc::new(StaticBrokers::with_brokers(["kafka"])))
    }

    #[test]
    fn test_commit_publishes_shadow() {
        let store = store();
        let mut tx = store.init_transaction().unwrap();
        tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();

        assert!(store.perm().root().spec.types.is_empty());
        tx.commit();
        assert!(store.perm().root().spec.types.contains_key("t1"));
    }

    #[test]
    fn test_cancel_discards_shadow() {
        let store = store();
        let mut tx = store.init_transaction().unwrap();
        tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();
        tx.cancel();

        assert!(store.perm().root().spec.types.is_empty());
        assert!(store.init_transaction().is_ok());
    }

    #[test]
    fn test_drop_releases_lock_and_discards() {
        let store = store();
        {
            let mut tx = store.init_transaction().unwrap();
            tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();
        }
        assert!(store.perm().root().spec.types.is_empty());
        assert!(store
            .try_init_transaction(Duration::from_millis(10))
            .is_ok());
    }

    #[test]
    fn test_second_transaction_times_out() {
        let store = store();
        let _open = store.init_transaction().unwrap();

        let err = store
            .try_init_transaction(Duration::from_millis(20))
            .err()
            .unwrap();
        assert_eq!(err, InsprError::TransactionTimeout { waited_ms: 20 });
    }

    #[test]
    fn test_perm_is_stable_during_transaction() {
        let store = store();
        let mut tx = store.init_transaction().unwrap();
        tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();
        tx.channels().create("", &Channel::new("ch1", "t1")).unwrap();

        assert!(store.perm().get_channel("", "ch1").is_err());
        assert!(tx.get_channel("", "ch1").is_ok());
        assert!(tx.perm().get_app("").unwrap().spec.channels.is_empty());
    }

    #[test]
    fn test_changes_preview_before_commit() {
        let store = store();
        let mut tx = store.init_transaction().unwrap();
        assert!(tx.changes().unwrap().is_empty());

        tx.types().create("", &ChannelType::new("t1", "{}")).unwrap();
        let changes = tx.changes().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes.0[0].diff[0].field, "Spec.Types[t1]");
    }

    #[test]
    fn test_transaction_ids_increase() {
        let store = store();
        let first = store.init_transaction().unwrap();
        let a = first.id();
        first.cancel();
        let second = store.init_transaction().unwrap();
        assert!(second.id() > a);
    }

    #[test]
    fn test_store_from_config() {
        let config = InsprConfig::from_toml(
            "[brokers]\navailable = [\"kafka\"]\n[transaction]\ntimeout_ms = 50\n",
        )
        .unwrap();
        let store = TreeStore::from_config(&config);
        assert_eq!(store.timeout(), Duration::from_millis(50));
        assert_eq!(store.brokers().available(), vec!["kafka"]);
    }
}
