//! Command and Reply Types
//!
//! The session speaks a plain line protocol: one command per line in, zero
//! or one line of text out.
//!
//! ## Examples
//!
//! ```text
//! > SET a 1
//! > GET a
//! 1
//! > FIND 1
//! a
//! > GET nothing
//! NULL
//! > ROLLBACK
//! NO TRANSACTION
//! ```

use std::fmt;

/// The newline terminator written after every reply
pub const LF: &[u8] = b"\n";

/// A parsed command.
///
/// The set of commands is closed; every variant has exactly one handler in
/// [`CommandHandler`](crate::commands::CommandHandler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SET key value`
    Set { key: String, value: String },
    /// `GET key`
    Get { key: String },
    /// `UNSET key`
    Unset { key: String },
    /// `COUNTS value`
    Counts { value: String },
    /// `FIND value`
    Find { value: String },
    /// `BEGIN`
    Begin,
    /// `ROLLBACK`
    Rollback,
    /// `COMMIT`
    Commit,
    /// `END`
    End,
}

impl Command {
    /// Returns the upper-case command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Set { .. } => "SET",
            Command::Get { .. } => "GET",
            Command::Unset { .. } => "UNSET",
            Command::Counts { .. } => "COUNTS",
            Command::Find { .. } => "FIND",
            Command::Begin => "BEGIN",
            Command::Rollback => "ROLLBACK",
            Command::Commit => "COMMIT",
            Command::End => "END",
        }
    }
}

/// Every command name, in the order they are advertised to users.
pub const COMMAND_NAMES: [&str; 9] = [
    "SET", "GET", "UNSET", "COUNTS", "FIND", "BEGIN", "ROLLBACK", "COMMIT", "END",
];

/// The outcome of one command, ready to be written back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The command succeeded and prints nothing
    Silent,
    /// A single value (`GET`)
    Value(String),
    /// Nothing matched (`GET`, `FIND`)
    Null,
    /// A count (`COUNTS`)
    Integer(usize),
    /// Matching keys, already sorted (`FIND`)
    Keys(Vec<String>),
    /// A failure, printed as `ERROR: <message>`
    Error(String),
    /// `ROLLBACK`/`COMMIT` with no open transaction
    NoTransaction,
    /// Unrecognized command or wrong number of arguments
    UnknownCommand,
    /// The session should terminate
    End,
}

impl Reply {
    /// Creates an error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Reply::Error(msg.into())
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }

    /// Returns true if this reply ends the session.
    pub fn is_end(&self) -> bool {
        matches!(self, Reply::End)
    }

    /// Serializes the reply into the bytes written back to the user.
    ///
    /// Silent replies and `End` produce no output.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        if matches!(self, Reply::Silent | Reply::End) {
            return;
        }
        buf.extend_from_slice(self.to_string().as_bytes());
        buf.extend_from_slice(LF);
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Silent | Reply::End => Ok(()),
            Reply::Value(v) => f.write_str(v),
            Reply::Null => f.write_str("NULL"),
            Reply::Integer(n) => write!(f, "{}", n),
            Reply::Keys(keys) => f.write_str(&keys.join(" ")),
            Reply::Error(msg) => write!(f, "ERROR: {}", msg),
            Reply::NoTransaction => f.write_str("NO TRANSACTION"),
            Reply::UnknownCommand => f.write_str("UNKNOWN COMMAND"),
        }
    }
}
