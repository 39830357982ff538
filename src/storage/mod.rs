//! Storage Engine Module
//!
//! This module provides the transactional core of nestkv: the committed
//! key-value map, its reverse value index, and the stack of open
//! transactions layered on top.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │                                                             │
//! │   get / count / find  ──>  overlay of open frames           │
//! │                              │                              │
//! │                              ▼                              │
//! │   ┌───────────┐   ┌───────────┐   ┌───────────┐             │
//! │   │ Frame 0   │<──│ Frame 1   │<──│ Frame N   │ <── set     │
//! │   │ (outer)   │   │           │   │ (inner)   │     unset   │
//! │   └─────┬─────┘   └───────────┘   └───────────┘             │
//! │         │ commit (outermost only)                           │
//! │         ▼                                                   │
//! │   committed map  +  ReverseIndex                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use nestkv::storage::{Lookup, NullAudit, Store, StoreConfig};
//! use std::sync::Arc;
//!
//! let mut store = Store::new(StoreConfig::default(), Arc::new(NullAudit));
//!
//! store.set("a", "1").unwrap();
//! store.set("b", "1").unwrap();
//! assert_eq!(store.count_by_value("1"), Lookup::Found(2));
//!
//! store.begin().unwrap();
//! store.unset("a").unwrap();
//! assert_eq!(store.find_keys_by_value("1"), Lookup::Found(vec!["b".to_string()]));
//! store.rollback().unwrap();
//! ```

pub mod audit;
pub mod engine;
pub mod error;
pub mod index;
pub mod transaction;
pub mod validate;

// Re-export commonly used types
pub use audit::{AuditEvent, AuditLevel, AuditLog, NullAudit, RecordingAudit, TracingAudit};
pub use engine::{
    Lookup, Store, StoreConfig, DEFAULT_MAX_DB_SIZE, DEFAULT_MAX_TRANSACTION_DEPTH,
};
pub use error::{NoActiveTransaction, StoreError, StoreResult, TokenKind};
pub use validate::is_valid_token;
