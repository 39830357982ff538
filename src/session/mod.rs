//! Session Module
//!
//! This module runs a line-oriented session against one store. The binary
//! wires it to stdin/stdout; tests wire it to in-memory buffers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Session                               │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐     │
//! │  │ Read bytes  │───>│ Parse line  │───>│ Execute cmd │     │
//! │  └─────────────┘    └─────────────┘    └─────────────┘     │
//! │                                               │             │
//! │                                               ▼             │
//! │                                      ┌─────────────┐        │
//! │                                      │ Write reply │        │
//! │                                      └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use nestkv::commands::CommandHandler;
//! use nestkv::session::Session;
//! use nestkv::storage::Store;
//!
//! let handler = CommandHandler::new(Store::default());
//! let mut session = Session::new(&b"SET a 1\nGET a\nEND\n"[..], Vec::new(), handler)
//!     .interactive(false);
//!
//! tokio_test::block_on(session.run()).unwrap();
//! let (_, output) = session.into_inner();
//! assert_eq!(output, b"1\n");
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{Session, SessionEnd, SessionError, SessionStats, PROMPT};
