//! # nestkv - An In-Memory Key-Value Store with Nested Transactions
//!
//! nestkv is a single-process, in-memory key-value store. Writes can be
//! grouped into nested transactions that behave like savepoints, and the
//! store answers reverse lookups (how many keys hold a value, and which ones)
//! that always reflect the transactions currently open.
//!
//! ## Features
//!
//! - **Nested Transactions**: `BEGIN` / `ROLLBACK` / `COMMIT` at any depth
//! - **Savepoint Commit**: committing folds a transaction into its parent
//! - **Reverse Lookups**: `COUNTS` and `FIND` see uncommitted writes
//! - **Bounded**: configurable limits on store size and transaction depth
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              nestkv                                     │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐                  │
//! │  │ stdin/stdout│───>│  Session    │───>│  Command    │                  │
//! │  │             │    │  (lines)    │    │  Handler    │                  │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘                  │
//! │                                               │                         │
//! │                                               ▼                         │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────────┐   │
//! │  │   Line      │    │                   Store                      │   │
//! │  │   Parser    │    │  ┌──────────┐ ┌────────────┐ ┌────────────┐  │   │
//! │  │             │    │  │committed │ │ reverse    │ │transaction │  │   │
//! │  └─────────────┘    │  │map       │ │ index      │ │stack       │  │   │
//! │                     │  └──────────┘ └────────────┘ └────────────┘  │   │
//! │                     └──────────────────────────────────────────────┘   │
//! │                                               │                         │
//! │                                               ▼                         │
//! │                     ┌─────────────────────────────────────────────────┐ │
//! │                     │           AuditLog (tracing)                    │ │
//! │                     └─────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use nestkv::commands::CommandHandler;
//! use nestkv::session::Session;
//! use nestkv::storage::Store;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = CommandHandler::new(Store::default());
//!     let mut session = Session::new(tokio::io::stdin(), tokio::io::stdout(), handler);
//!     session.run().await.unwrap();
//! }
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value` / `GET key` / `UNSET key`
//! - `COUNTS value` - number of keys holding `value`
//! - `FIND value` - sorted keys holding `value`
//! - `BEGIN` / `ROLLBACK` / `COMMIT`
//! - `END`
//!
//! ## Module Overview
//!
//! - [`storage`]: The transactional engine
//! - [`protocol`]: Line parser, commands and replies
//! - [`commands`]: Command dispatch against the engine
//! - [`session`]: The read-execute-reply loop
//! - [`config`]: Config file and command-line settings

pub mod commands;
pub mod config;
pub mod protocol;
pub mod session;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use config::{CliAction, CliArgs, Config, ConfigError};
pub use protocol::{parse_command, Command, ParseError, Reply};
pub use session::{Session, SessionEnd, SessionError};
pub use storage::{Lookup, Store, StoreConfig, StoreError};

/// Version of nestkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
