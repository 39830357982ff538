//! Command Handler Module
//!
//! This module executes parsed commands against the [`Store`] and turns the
//! results into [`Reply`] values.
//!
//! ## Error Rendering
//!
//! - `SET`, `UNSET`, `BEGIN` failures become `ERROR: <message>` and are
//!   logged with the failure kind.
//! - `GET`, `COUNTS`, `FIND` report bad input in-band as
//!   `ERROR: Invalid key format` / `ERROR: Invalid value format`.
//! - `ROLLBACK`/`COMMIT` with nothing open print `NO TRANSACTION`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandHandler                          │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │  Command    │───>│  dispatch   │───>│  cmd_*()    │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                             Store           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::protocol::{Command, Reply};
use crate::storage::audit::AuditExt;
use crate::storage::{Lookup, Store, StoreError};

/// Executes commands against a single store.
#[derive(Debug)]
pub struct CommandHandler {
    /// The storage engine
    store: Store,
}

impl CommandHandler {
    /// Creates a new command handler that owns `store`.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Executes a command and returns the reply.
    pub fn execute(&mut self, command: Command) -> Reply {
        match command {
            Command::Set { key, value } => self.cmd_set(&key, &value),
            Command::Get { key } => self.cmd_get(&key),
            Command::Unset { key } => self.cmd_unset(&key),
            Command::Counts { value } => self.cmd_counts(&value),
            Command::Find { value } => self.cmd_find(&value),
            Command::Begin => self.cmd_begin(),
            Command::Rollback => self.cmd_rollback(),
            Command::Commit => self.cmd_commit(),
            Command::End => self.cmd_end(),
        }
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    /// Logs a hard failure and turns it into an error reply.
    fn failure(&self, err: StoreError) -> Reply {
        let context = match err {
            StoreError::InvalidFormat(_) => "Input error",
            StoreError::CapacityExceeded { .. } => "Error with memory",
            StoreError::TransactionDepthExceeded { .. } => "Error with transaction",
        };
        self.store.audit().error(format!("{}: {}", context, err));
        Reply::error(err.to_string())
    }

    /// Renders a soft-failing lookup.
    fn lookup<T>(lookup: Lookup<T>, found: impl FnOnce(T) -> Reply) -> Reply {
        if let Some(message) = lookup.error_message() {
            return Reply::error(message);
        }
        match lookup {
            Lookup::Found(v) => found(v),
            _ => Reply::Null,
        }
    }

    // ========================================================================
    // Data commands
    // ========================================================================

    fn cmd_set(&mut self, key: &str, value: &str) -> Reply {
        match self.store.set(key, value) {
            Ok(()) => Reply::Silent,
            Err(e) => self.failure(e),
        }
    }

    fn cmd_get(&self, key: &str) -> Reply {
        Self::lookup(self.store.get(key), |v| Reply::Value(v.to_string()))
    }

    fn cmd_unset(&mut self, key: &str) -> Reply {
        match self.store.unset(key) {
            Ok(()) => Reply::Silent,
            Err(e) => self.failure(e),
        }
    }

    fn cmd_counts(&self, value: &str) -> Reply {
        Self::lookup(self.store.count_by_value(value), Reply::Integer)
    }

    fn cmd_find(&self, value: &str) -> Reply {
        Self::lookup(self.store.find_keys_by_value(value), Reply::Keys)
    }

    // ========================================================================
    // Transaction commands
    // ========================================================================

    fn cmd_begin(&mut self) -> Reply {
        match self.store.begin() {
            Ok(()) => Reply::Silent,
            Err(e) => self.failure(e),
        }
    }

    fn cmd_rollback(&mut self) -> Reply {
        match self.store.rollback() {
            Ok(()) => Reply::Silent,
            Err(_) => Reply::NoTransaction,
        }
    }

    fn cmd_commit(&mut self) -> Reply {
        match self.store.commit() {
            Ok(()) => Reply::Silent,
            Err(_) => Reply::NoTransaction,
        }
    }

    // ========================================================================
    // Session commands
    // ========================================================================

    fn cmd_end(&self) -> Reply {
        self.store.audit().info("SESSION ENDED".to_string());
        Reply::End
    }
}
