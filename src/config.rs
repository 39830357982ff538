//! Runtime Configuration
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. a TOML config file (`config.toml` if present, or `--config PATH`)
//! 3. command-line flags
//!
//! ## Config File
//!
//! ```toml
//! max_transaction_depth = 100
//! max_db_size = 100000
//! log_file = "db_logs"
//! ```
//!
//! Every key is optional.

use crate::storage::StoreConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file read when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Default log file path
pub const DEFAULT_LOG_FILE: &str = "db_logs";

/// Errors raised while assembling the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has wrongly typed keys
    #[error("failed to parse config file '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A flag that takes a value was given none
    #[error("{0} requires a value")]
    MissingValue(String),

    /// A numeric flag got something that is not a number
    #[error("invalid value for {flag}: '{value}'")]
    InvalidNumber { flag: String, value: String },

    /// The flag is not recognized
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Settings as they appear in the config file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub max_transaction_depth: Option<usize>,
    pub max_db_size: Option<usize>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    /// Parses config file contents.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }
}

/// Flags given on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub max_transaction_depth: Option<usize>,
    pub max_db_size: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub no_prompt: bool,
}

/// What the command line asks the binary to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(CliArgs),
    Help,
    Version,
}

impl CliArgs {
    /// Parses command-line arguments (without the program name).
    pub fn parse<I>(args: I) -> Result<CliAction, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = CliArgs::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => cli.config = Some(PathBuf::from(value_for(&arg, &mut args)?)),
                "--max-depth" => {
                    cli.max_transaction_depth = Some(number_for(&arg, &mut args)?);
                }
                "--max-size" => cli.max_db_size = Some(number_for(&arg, &mut args)?),
                "--log-file" => cli.log_file = Some(PathBuf::from(value_for(&arg, &mut args)?)),
                "--no-prompt" => cli.no_prompt = true,
                "--help" | "-h" => return Ok(CliAction::Help),
                "--version" | "-v" => return Ok(CliAction::Version),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(CliAction::Run(cli))
    }
}

fn value_for(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn number_for(flag: &str, args: &mut impl Iterator<Item = String>) -> Result<usize, ConfigError> {
    let value = value_for(flag, args)?;
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        flag: flag.to_string(),
        value,
    })
}

/// Fully resolved configuration for the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Limits handed to the store
    pub store: StoreConfig,
    /// Where audit logs are written
    pub log_file: PathBuf,
    /// Whether to print the banner and prompts
    pub interactive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            interactive: true,
        }
    }
}

impl Config {
    /// Builds the configuration from parsed flags.
    ///
    /// An explicit `--config` file must exist. Without one, `config.toml` in
    /// the working directory is used when present and silently skipped
    /// otherwise.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => FileConfig::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    FileConfig::from_file(path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let mut config = Config::default();
        config.apply_file(file);
        config.apply_cli(cli);
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(depth) = file.max_transaction_depth {
            self.store.max_transaction_depth = depth;
        }
        if let Some(size) = file.max_db_size {
            self.store.max_db_size = size;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file;
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        if let Some(depth) = cli.max_transaction_depth {
            self.store.max_transaction_depth = depth;
        }
        if let Some(size) = cli.max_db_size {
            self.store.max_db_size = size;
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = log_file.clone();
        }
        if cli.no_prompt {
            self.interactive = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn run_args(list: &[&str]) -> CliArgs {
        match CliArgs::parse(args(list)).unwrap() {
            CliAction::Run(cli) => cli,
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.max_transaction_depth, 100);
        assert_eq!(config.store.max_db_size, 100_000);
        assert_eq!(config.log_file, PathBuf::from("db_logs"));
        assert!(config.interactive);
    }

    #[test]
    fn test_parse_flags() {
        let cli = run_args(&[
            "--max-depth",
            "5",
            "--max-size",
            "10",
            "--log-file",
            "audit.log",
            "--no-prompt",
        ]);
        assert_eq!(cli.max_transaction_depth, Some(5));
        assert_eq!(cli.max_db_size, Some(10));
        assert_eq!(cli.log_file, Some(PathBuf::from("audit.log")));
        assert!(cli.no_prompt);
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(CliArgs::parse(args(&["--help"])).unwrap(), CliAction::Help);
        assert_eq!(CliArgs::parse(args(&["-v"])).unwrap(), CliAction::Version);
    }

    #[test]
    fn test_bad_flags() {
        assert!(matches!(
            CliArgs::parse(args(&["--max-depth"])),
            Err(ConfigError::MissingValue(_))
        ));
        assert!(matches!(
            CliArgs::parse(args(&["--max-size", "lots"])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            CliArgs::parse(args(&["--port", "1"])),
            Err(ConfigError::UnknownArgument(_))
        ));
    }

    #[test]
    fn test_parse_partial_file() {
        let file = FileConfig::parse("max_db_size = 42", Path::new("x.toml")).unwrap();
        assert_eq!(file.max_db_size, Some(42));
        assert_eq!(file.max_transaction_depth, None);
        assert_eq!(file.log_file, None);
    }

    #[test]
    fn test_parse_invalid_file() {
        let result = FileConfig::parse("max_db_size = \"big\"", Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_file_then_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nestkv.toml");
        std::fs::write(
            &path,
            "max_transaction_depth = 3\nmax_db_size = 7\nlog_file = \"from_file.log\"\n",
        )
        .unwrap();

        let mut cli = run_args(&["--max-size", "9"]);
        cli.config = Some(path);
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.store.max_transaction_depth, 3);
        assert_eq!(config.store.max_db_size, 9);
        assert_eq!(config.log_file, PathBuf::from("from_file.log"));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = TempDir::new().unwrap();
        let cli = CliArgs {
            config: Some(dir.path().join("missing.toml")),
            ..CliArgs::default()
        };
        assert!(matches!(Config::load(&cli), Err(ConfigError::Read { .. })));
    }
}
