//! Line Protocol Implementation
//!
//! This module provides the text protocol spoken by a nestkv session.
//!
//! ## Overview
//!
//! Each line holds one command: a case-insensitive name followed by
//! whitespace-separated arguments. Each command produces at most one line
//! of output.
//!
//! ## Modules
//!
//! - `types`: Defines the `Command` and `Reply` enums and reply rendering
//! - `parser`: Incremental line splitter and command parser
//!
//! ## Example
//!
//! ```
//! use nestkv::protocol::{parse_command, Command, Reply};
//!
//! let command = parse_command("set a 1").unwrap().unwrap();
//! assert_eq!(command, Command::Set { key: "a".into(), value: "1".into() });
//!
//! let reply = Reply::Keys(vec!["a".into(), "b".into()]);
//! assert_eq!(reply.serialize(), b"a b\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{parse_command, parse_line, LineParser, ParseError, ParseResult, MAX_LINE_LENGTH};
pub use types::{Command, Reply, COMMAND_NAMES};
