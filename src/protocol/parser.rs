//! Line Protocol Parser
//!
//! Turns raw input bytes into [`Command`]s.
//!
//! ## How the Parser Works
//!
//! [`LineParser::parse`] looks at the front of a buffer and returns either:
//! - `Ok(Some((line, consumed)))` - a complete line, `consumed` bytes were used
//! - `Ok(None)` - no newline yet, the line is incomplete
//! - `Err(ParseError)` - the line is too long
//!
//! Each complete line then goes through [`parse_command`]. Lines end with
//! `\n`; a trailing `\r` is stripped so CRLF input works too.

use crate::protocol::types::Command;
use thiserror::Error;

/// Errors that can occur while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The line is not valid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// The command name is not recognized
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// The command got the wrong number of arguments
    #[error("wrong number of arguments for '{command}': expected {expected}, got {got}")]
    WrongArity {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// The line exceeds the maximum allowed size
    #[error("line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Maximum size of a single command line (64 KB)
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// An incremental line splitter.
#[derive(Debug, Default)]
pub struct LineParser {
    /// Bytes already searched for a newline (avoids rescanning partial lines)
    scanned: usize,
}

impl LineParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self { scanned: 0 }
    }

    /// Attempts to split one line off the front of `buf`.
    ///
    /// The returned line excludes the terminator; `consumed` includes it.
    pub fn parse<'a>(&mut self, buf: &'a [u8]) -> ParseResult<Option<(&'a [u8], usize)>> {
        let start = self.scanned.min(buf.len());
        match buf[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let end = start + offset;
                self.scanned = 0;
                if end > MAX_LINE_LENGTH {
                    return Err(ParseError::LineTooLong {
                        size: end,
                        max: MAX_LINE_LENGTH,
                    });
                }
                Ok(Some((strip_cr(&buf[..end]), end + 1)))
            }
            None => {
                if buf.len() > MAX_LINE_LENGTH {
                    return Err(ParseError::LineTooLong {
                        size: buf.len(),
                        max: MAX_LINE_LENGTH,
                    });
                }
                self.scanned = buf.len();
                Ok(None)
            }
        }
    }
}

#[inline]
fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Parses one line of raw bytes into a command.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &[u8]) -> ParseResult<Option<Command>> {
    let text = std::str::from_utf8(line).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;
    parse_command(text)
}

/// Parses one line of text into a command.
///
/// The command name is case-insensitive; arguments are separated by
/// whitespace and kept verbatim. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> ParseResult<Option<Command>> {
    let mut parts = line.split_whitespace();
    let name = match parts.next() {
        Some(name) => name.to_uppercase(),
        None => return Ok(None),
    };
    let args: Vec<&str> = parts.collect();

    let command = match name.as_str() {
        "SET" => {
            let [key, value] = expect_args::<2>("SET", &args)?;
            Command::Set { key, value }
        }
        "GET" => {
            let [key] = expect_args::<1>("GET", &args)?;
            Command::Get { key }
        }
        "UNSET" => {
            let [key] = expect_args::<1>("UNSET", &args)?;
            Command::Unset { key }
        }
        "COUNTS" => {
            let [value] = expect_args::<1>("COUNTS", &args)?;
            Command::Counts { value }
        }
        "FIND" => {
            let [value] = expect_args::<1>("FIND", &args)?;
            Command::Find { value }
        }
        "BEGIN" => {
            expect_args::<0>("BEGIN", &args)?;
            Command::Begin
        }
        "ROLLBACK" => {
            expect_args::<0>("ROLLBACK", &args)?;
            Command::Rollback
        }
        "COMMIT" => {
            expect_args::<0>("COMMIT", &args)?;
            Command::Commit
        }
        "END" => {
            expect_args::<0>("END", &args)?;
            Command::End
        }
        _ => return Err(ParseError::UnknownCommand(name)),
    };

    Ok(Some(command))
}

fn expect_args<const N: usize>(command: &'static str, args: &[&str]) -> ParseResult<[String; N]> {
    if args.len() != N {
        return Err(ParseError::WrongArity {
            command,
            expected: N,
            got: args.len(),
        });
    }
    Ok(std::array::from_fn(|i| args[i].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set() {
        let command = parse_command("SET a 1").unwrap().unwrap();
        assert_eq!(
            command,
            Command::Set {
                key: "a".to_string(),
                value: "1".to_string()
            }
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            parse_command("get Key").unwrap(),
            Some(Command::Get {
                key: "Key".to_string()
            })
        );
        assert_eq!(parse_command("Begin").unwrap(), Some(Command::Begin));
    }

    #[test]
    fn test_parse_all_commands() {
        assert!(matches!(
            parse_command("UNSET a"),
            Ok(Some(Command::Unset { .. }))
        ));
        assert!(matches!(
            parse_command("COUNTS 1"),
            Ok(Some(Command::Counts { .. }))
        ));
        assert!(matches!(
            parse_command("FIND 1"),
            Ok(Some(Command::Find { .. }))
        ));
        assert_eq!(parse_command("ROLLBACK"), Ok(Some(Command::Rollback)));
        assert_eq!(parse_command("COMMIT"), Ok(Some(Command::Commit)));
        assert_eq!(parse_command("END"), Ok(Some(Command::End)));
    }

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   \t "), Ok(None));
    }

    #[test]
    fn test_parse_extra_whitespace() {
        assert_eq!(
            parse_command("  SET   a\t1  ").unwrap(),
            Some(Command::Set {
                key: "a".to_string(),
                value: "1".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_command("PING"),
            Err(ParseError::UnknownCommand("PING".to_string()))
        );
    }

    #[test]
    fn test_parse_wrong_arity() {
        assert_eq!(
            parse_command("SET a"),
            Err(ParseError::WrongArity {
                command: "SET",
                expected: 2,
                got: 1
            })
        );
        assert!(parse_command("GET").is_err());
        assert!(parse_command("GET a b").is_err());
        assert!(parse_command("BEGIN now").is_err());
    }

    #[test]
    fn test_arguments_are_not_validated_here() {
        // Token validation belongs to the store.
        assert_eq!(
            parse_command("GET a-b").unwrap(),
            Some(Command::Get {
                key: "a-b".to_string()
            })
        );
    }

    #[test]
    fn test_parse_line_invalid_utf8() {
        assert!(matches!(
            parse_line(&[b'G', b'E', b'T', b' ', 0xff]),
            Err(ParseError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_line_parser_complete() {
        let mut parser = LineParser::new();
        let (line, consumed) = parser.parse(b"GET a\nSET").unwrap().unwrap();
        assert_eq!(line, b"GET a");
        assert_eq!(consumed, 6);
    }

    #[test]
    fn test_line_parser_strips_cr() {
        let mut parser = LineParser::new();
        let (line, consumed) = parser.parse(b"BEGIN\r\n").unwrap().unwrap();
        assert_eq!(line, b"BEGIN");
        assert_eq!(consumed, 7);
    }

    #[test]
    fn test_line_parser_incomplete() {
        let mut parser = LineParser::new();
        assert!(parser.parse(b"SET a").unwrap().is_none());
        let (line, consumed) = parser.parse(b"SET a 1\n").unwrap().unwrap();
        assert_eq!(line, b"SET a 1");
        assert_eq!(consumed, 8);
    }

    #[test]
    fn test_line_parser_too_long() {
        let mut parser = LineParser::new();
        let buf = vec![b'a'; MAX_LINE_LENGTH + 1];
        assert!(matches!(
            parser.parse(&buf),
            Err(ParseError::LineTooLong { .. })
        ));
    }
}
