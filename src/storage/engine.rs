//! Transactional Storage Engine
//!
//! This module implements the core of nestkv: a key-value map with a reverse
//! value index and a stack of nested, savepoint-style transactions.
//!
//! ## Design Decisions
//!
//! 1. **Staged Writes**: While a transaction is open, `set`/`unset` only touch
//!    the innermost frame. The committed map and the reverse index change
//!    only when the outermost frame commits, or when no transaction is open.
//! 2. **Savepoint Commit**: `commit` folds the innermost frame into its parent.
//!    Draining the whole stack takes one `commit` per open frame.
//! 3. **Overlay Aggregates**: `count_by_value`/`find_keys_by_value` flatten the
//!    open frames into one overlay and correct the committed answer with it,
//!    so they always agree with what `get` returns for each key.
//!
//! ## Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                        Store                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────┐  │
//! │  │ committed    │  │ ReverseIndex │  │ Transaction│  │
//! │  │ key -> value │  │ value -> n   │  │ Stack      │  │
//! │  └──────────────┘  └──────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::storage::audit::{AuditExt, AuditLog, TracingAudit};
use crate::storage::error::{NoActiveTransaction, StoreError, StoreResult, TokenKind};
use crate::storage::index::ReverseIndex;
use crate::storage::transaction::{CommitOutcome, Frame, Staged, TransactionStack};
use crate::storage::validate::is_valid_token;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Default maximum number of nested transactions.
pub const DEFAULT_MAX_TRANSACTION_DEPTH: usize = 100;

/// Default maximum number of committed keys.
pub const DEFAULT_MAX_DB_SIZE: usize = 100_000;

/// Resource limits for a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of simultaneously open transactions
    pub max_transaction_depth: usize,
    /// Maximum number of keys in the committed store
    pub max_db_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_transaction_depth: DEFAULT_MAX_TRANSACTION_DEPTH,
            max_db_size: DEFAULT_MAX_DB_SIZE,
        }
    }
}

/// Result of a read that never fails hard.
///
/// Invalid input is reported in-band so the caller can render it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The read produced a result
    Found(T),
    /// Nothing matched
    Missing,
    /// The key or value argument failed validation
    Invalid(TokenKind),
}

impl<T> Lookup<T> {
    /// Returns the found result, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if the argument failed validation.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Lookup::Invalid(_))
    }

    /// Returns the message describing an invalid argument.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Lookup::Invalid(TokenKind::Key) => Some("Invalid key format"),
            Lookup::Invalid(TokenKind::Value) => Some("Invalid value format"),
            _ => None,
        }
    }
}

/// The transactional key-value engine.
///
/// Single-threaded by construction: every operation takes `&self` or
/// `&mut self` and runs to completion.
///
/// # Example
///
/// ```
/// use nestkv::storage::{Lookup, Store};
///
/// let mut store = Store::default();
/// store.set("a", "1").unwrap();
///
/// store.begin().unwrap();
/// store.set("a", "2").unwrap();
/// assert_eq!(store.get("a"), Lookup::Found("2"));
///
/// store.rollback().unwrap();
/// assert_eq!(store.get("a"), Lookup::Found("1"));
/// ```
pub struct Store {
    /// Committed key -> value map
    data: HashMap<String, String>,

    /// Committed value -> key count
    index: ReverseIndex,

    /// Open transactions, innermost last
    transactions: TransactionStack,

    /// Resource limits
    config: StoreConfig,

    /// Audit event sink
    audit: Arc<dyn AuditLog>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.data.len())
            .field("distinct_values", &self.index.distinct_values())
            .field("transaction_depth", &self.transactions.depth())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default(), Arc::new(TracingAudit))
    }
}

impl Store {
    /// Creates an empty store with the given limits and audit sink.
    pub fn new(config: StoreConfig, audit: Arc<dyn AuditLog>) -> Self {
        Self {
            data: HashMap::new(),
            index: ReverseIndex::new(),
            transactions: TransactionStack::new(config.max_transaction_depth),
            config,
            audit,
        }
    }

    /// Number of keys in the committed store.
    #[inline]
    pub fn db_size(&self) -> usize {
        self.data.len()
    }

    /// Number of open transactions.
    #[inline]
    pub fn transaction_depth(&self) -> usize {
        self.transactions.depth()
    }

    /// Returns `true` if at least one transaction is open.
    #[inline]
    pub fn in_transaction(&self) -> bool {
        !self.transactions.is_empty()
    }

    /// Returns the limits this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns the audit sink shared with this store.
    pub fn audit(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }

    // ========================================================================
    // Reads and writes
    // ========================================================================

    /// Sets `key` to `value`.
    ///
    /// Inside a transaction the write is staged in the innermost frame;
    /// otherwise it is applied to the committed store immediately.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidFormat`] if the key or value is not alphanumeric
    /// - [`StoreError::CapacityExceeded`] if the committed store is full,
    ///   whether or not a transaction is open
    pub fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        if !is_valid_token(key) {
            return Err(StoreError::InvalidFormat(TokenKind::Key));
        }
        if !is_valid_token(value) {
            return Err(StoreError::InvalidFormat(TokenKind::Value));
        }
        if self.data.len() >= self.config.max_db_size {
            self.audit.error("Database is full".to_string());
            return Err(StoreError::CapacityExceeded {
                limit: self.config.max_db_size,
            });
        }

        if self.transactions.is_empty() {
            self.apply_set(key.to_string(), value.to_string());
            self.audit.info(format!("SET: {} = {}", key, value));
        } else if let Some(frame) = self.transactions.innermost_mut() {
            let before = self.data.get(key).map(String::as_str);
            frame.stage(key, Staged::Value(value.to_string()), before);
            self.audit
                .info(format!("SET in transaction: {} = {}", key, value));
        }
        Ok(())
    }

    /// Returns the effective value of `key`.
    ///
    /// The innermost open frame that mentions the key decides; a tombstone
    /// reads as [`Lookup::Missing`]. Keys no frame mentions come from the
    /// committed store.
    pub fn get(&self, key: &str) -> Lookup<&str> {
        if !is_valid_token(key) {
            self.audit.error(format!("Invalid key. key = {}", key));
            return Lookup::Invalid(TokenKind::Key);
        }

        let value = match self.transactions.lookup(key) {
            Some(staged) => staged.as_value(),
            None => self.data.get(key).map(String::as_str),
        };

        match value {
            Some(v) => {
                self.audit
                    .info(format!("Successfully retrieved value by key: {}", key));
                Lookup::Found(v)
            }
            None => Lookup::Missing,
        }
    }

    /// Deletes `key`.
    ///
    /// Inside a transaction the key is tombstoned in the innermost frame.
    /// Outside one, deleting a missing key is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidFormat`] if the key is not alphanumeric.
    pub fn unset(&mut self, key: &str) -> StoreResult<()> {
        if !is_valid_token(key) {
            return Err(StoreError::InvalidFormat(TokenKind::Key));
        }

        if self.transactions.is_empty() {
            if self.apply_delete(key) {
                self.audit.info(format!("UNSET: {}", key));
            }
        } else if let Some(frame) = self.transactions.innermost_mut() {
            let before = self.data.get(key).map(String::as_str);
            frame.stage(key, Staged::Tombstone, before);
            self.audit.info(format!("UNSET in transaction: {}", key));
        }
        Ok(())
    }

    /// Counts the keys whose effective value equals `value`.
    pub fn count_by_value(&self, value: &str) -> Lookup<usize> {
        if !is_valid_token(value) {
            return Lookup::Invalid(TokenKind::Value);
        }

        let overlay = self.transactions.overlay();
        let mut shadowed = 0;
        let mut staged = 0;
        for (key, write) in &overlay {
            if self.data.get(*key).map(String::as_str) == Some(value) {
                shadowed += 1;
            }
            if write.as_value() == Some(value) {
                staged += 1;
            }
        }

        Lookup::Found(self.index.count(value) - shadowed + staged)
    }

    /// Returns the sorted keys whose effective value equals `value`.
    ///
    /// An empty result is reported as [`Lookup::Missing`].
    pub fn find_keys_by_value(&self, value: &str) -> Lookup<Vec<String>> {
        if !is_valid_token(value) {
            return Lookup::Invalid(TokenKind::Value);
        }

        let overlay = self.transactions.overlay();
        let committed = self
            .data
            .iter()
            .filter(|(k, v)| v.as_str() == value && !overlay.contains_key(k.as_str()))
            .map(|(k, _)| k.clone());
        let staged = overlay
            .iter()
            .filter(|(_, write)| write.as_value() == Some(value))
            .map(|(k, _)| k.to_string());

        let mut keys: Vec<String> = committed.chain(staged).collect();
        if keys.is_empty() {
            return Lookup::Missing;
        }
        keys.sort_unstable();
        Lookup::Found(keys)
    }

    // ========================================================================
    // Transaction lifecycle
    // ========================================================================

    /// Opens a new innermost transaction.
    ///
    /// # Errors
    ///
    /// [`StoreError::TransactionDepthExceeded`] if the stack is already full.
    pub fn begin(&mut self) -> StoreResult<()> {
        if let Err(e) = self.transactions.push() {
            self.audit.error("Transaction depth reached".to_string());
            return Err(e);
        }
        self.audit.info("BEGIN TRANSACTION".to_string());
        Ok(())
    }

    /// Discards the innermost transaction and everything staged in it.
    pub fn rollback(&mut self) -> Result<(), NoActiveTransaction> {
        if self.transactions.rollback().is_none() {
            self.audit
                .warning("ROLLBACK attempted with no active transactions".to_string());
            return Err(NoActiveTransaction);
        }
        self.audit.info("ROLLBACK TRANSACTION".to_string());
        Ok(())
    }

    /// Commits the innermost transaction.
    ///
    /// With an enclosing transaction the writes fold into it; otherwise they
    /// are applied to the committed store and the reverse index.
    pub fn commit(&mut self) -> Result<(), NoActiveTransaction> {
        match self.transactions.commit() {
            None => {
                self.audit
                    .warning("COMMIT attempted with no active transactions".to_string());
                return Err(NoActiveTransaction);
            }
            Some(CommitOutcome::Merged) => {}
            Some(CommitOutcome::Detached(frame)) => self.apply_frame(frame),
        }
        self.audit.info("COMMIT TRANSACTION".to_string());
        Ok(())
    }

    // ========================================================================
    // Committed store mutation
    // ========================================================================

    fn apply_frame(&mut self, frame: Frame) {
        for (key, write, before) in frame.into_writes() {
            // The committed store never changes while a transaction is open.
            debug_assert_eq!(before.as_deref(), self.data.get(&key).map(String::as_str));
            match write {
                Staged::Value(value) => self.apply_set(key, value),
                Staged::Tombstone => {
                    self.apply_delete(&key);
                }
            }
        }
    }

    fn apply_set(&mut self, key: String, value: String) {
        let previous = self.data.insert(key, value.clone());
        self.index
            .record_insert_or_update(previous.as_deref(), &value);
    }

    fn apply_delete(&mut self, key: &str) -> bool {
        match self.data.remove(key) {
            Some(old) => {
                self.index.record_deletion(&old);
                true
            }
            None => false,
        }
    }
}
