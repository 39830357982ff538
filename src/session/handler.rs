//! Session Handler Module
//!
//! This module drives one interactive session: it reads command lines from
//! any async reader, executes them, and writes replies to any async writer.
//!
//! ## Session Lifecycle
//!
//! ```text
//! 1. Banner written
//!        │
//!        ▼
//! 2. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  write prompt  "> "          │
//!    │        │                     │
//!    │        ▼                     │
//!    │  read bytes into buffer      │
//!    │        │                     │
//!    │        ▼                     │
//!    │  split line, parse command   │
//!    │        │                     │
//!    │        ▼                     │
//!    │  execute, write reply        │
//!    │        │                     │
//!    │        ▼                     │
//!    │   [Loop back]                │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 3. END command or end of input
//! ```
//!
//! ## Buffer Management
//!
//! Input is accumulated in a `BytesMut` buffer. A single read can carry a
//! partial line or several lines at once, so lines are split off the buffer
//! only once their newline has arrived. A final line without a newline is
//! still executed when the input ends.

use crate::commands::CommandHandler;
use crate::protocol::{parse_line, LineParser, ParseError, Reply, COMMAND_NAMES};
use crate::storage::audit::AuditExt;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info, trace};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Prompt written before each command line
pub const PROMPT: &str = "> ";

/// Counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Lines executed, including blank and unknown ones
    pub commands_processed: u64,
    /// Total bytes read
    pub bytes_read: u64,
    /// Total bytes written
    pub bytes_written: u64,
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user issued `END`
    EndCommand,
    /// The input reached end-of-file
    EndOfInput,
}

/// Drives the read-execute-reply loop for one session.
pub struct Session<R, W> {
    /// Where command lines come from
    reader: R,

    /// Where replies go
    writer: BufWriter<W>,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Line splitter
    parser: LineParser,

    /// The command handler
    command_handler: CommandHandler,

    /// Whether to print the banner and prompts
    interactive: bool,

    /// Session counters
    stats: SessionStats,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new interactive session.
    pub fn new(reader: R, writer: W, command_handler: CommandHandler) -> Self {
        Self {
            reader,
            writer: BufWriter::new(writer),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            parser: LineParser::new(),
            command_handler,
            interactive: true,
            stats: SessionStats::default(),
        }
    }

    /// Enables or disables the banner and prompts.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Returns the counters collected so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Returns the command handler driving this session.
    pub fn command_handler(&self) -> &CommandHandler {
        &self.command_handler
    }

    /// Consumes the session, returning the command handler and the writer.
    pub fn into_inner(self) -> (CommandHandler, W) {
        (self.command_handler, self.writer.into_inner())
    }

    /// Runs the session until `END`, end of input, or an error.
    pub async fn run(&mut self) -> Result<SessionEnd, SessionError> {
        let result = self.main_loop().await;

        match &result {
            Ok(end) => info!(
                reason = ?end,
                commands = self.stats.commands_processed,
                "Session finished"
            ),
            Err(e) => {
                self.command_handler
                    .store()
                    .audit()
                    .critical(format!("Unspecified error: {}", e));
            }
        }

        result
    }

    /// The main read-execute-reply loop.
    async fn main_loop(&mut self) -> Result<SessionEnd, SessionError> {
        if self.interactive {
            let banner = format!(
                "InMemory DataBase start working\nAvailable commands: {}\n",
                COMMAND_NAMES.join(", ")
            );
            self.write_out(banner.as_bytes()).await?;
        }
        self.write_prompt().await?;

        loop {
            while let Some(line) = self.try_split_line()? {
                if !self.process_line(&line).await? {
                    return Ok(SessionEnd::EndCommand);
                }
                self.write_prompt().await?;
            }

            if !self.read_more_data().await? {
                return self.finish_input().await;
            }
        }
    }

    /// Splits one complete line off the front of the buffer.
    fn try_split_line(&mut self) -> Result<Option<Bytes>, SessionError> {
        match self.parser.parse(&self.buffer)? {
            Some((line, consumed)) => {
                let len = line.len();
                let chunk = self.buffer.split_to(consumed).freeze();
                trace!(
                    consumed = consumed,
                    remaining = self.buffer.len(),
                    "Split line"
                );
                Ok(Some(chunk.slice(..len)))
            }
            None => Ok(None),
        }
    }

    /// Executes one line. Returns `false` once the session should stop.
    async fn process_line(&mut self, line: &[u8]) -> Result<bool, SessionError> {
        let reply = match parse_line(line) {
            Ok(Some(command)) => {
                debug!(command = command.name(), "Executing command");
                self.command_handler.execute(command)
            }
            Ok(None) => Reply::Silent,
            Err(e) => {
                debug!(error = %e, "Rejected line");
                Reply::UnknownCommand
            }
        };
        self.stats.commands_processed += 1;

        if reply.is_end() {
            self.writer.flush().await?;
            return Ok(false);
        }

        self.send_reply(&reply).await?;
        Ok(true)
    }

    /// Handles end of input: runs any unterminated final line, then says goodbye.
    async fn finish_input(&mut self) -> Result<SessionEnd, SessionError> {
        if !self.buffer.is_empty() {
            let line = self.buffer.split().freeze();
            let line = line.strip_suffix(b"\r").unwrap_or(&line[..]).to_vec();
            if !self.process_line(&line).await? {
                return Ok(SessionEnd::EndCommand);
            }
        }

        self.command_handler
            .store()
            .audit()
            .info("Session terminated by EOF".to_string());
        self.write_out(b"\nSESSION ENDED\n").await?;
        Ok(SessionEnd::EndOfInput)
    }

    /// Reads more data into the buffer. Returns `false` at end of input.
    async fn read_more_data(&mut self) -> Result<bool, SessionError> {
        // Ensure we have some capacity
        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let n = self.reader.read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Ok(false);
        }

        self.stats.bytes_read += n as u64;
        trace!(bytes = n, "Read data");
        Ok(true)
    }

    async fn write_prompt(&mut self) -> Result<(), SessionError> {
        if self.interactive {
            self.write_out(PROMPT.as_bytes()).await?;
        }
        Ok(())
    }

    /// Sends a reply; silent replies write nothing.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), SessionError> {
        let bytes = reply.serialize();
        if !bytes.is_empty() {
            self.write_out(&bytes).await?;
        }
        Ok(())
    }

    async fn write_out(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        self.stats.bytes_written += bytes.len() as u64;
        trace!(bytes = bytes.len(), "Sent output");
        Ok(())
    }
}

/// Errors that end a session abnormally.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// I/O error on the input or output stream
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The input could not be split into lines
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
}
