//! Command Handler Module
//!
//! This module implements the command processing layer for nestkv.
//! It receives parsed commands, executes them against the store,
//! and returns the replies to print.
//!
//! ## Architecture
//!
//! ```text
//! Input line
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Execute      │
//! │  - Render       │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Store           │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! ### Data Commands
//! - `SET key value`, `GET key`, `UNSET key`
//! - `COUNTS value`, `FIND value`
//!
//! ### Transaction Commands
//! - `BEGIN`, `ROLLBACK`, `COMMIT`
//!
//! ### Session Commands
//! - `END`

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
