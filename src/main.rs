//! nestkv - An In-Memory Key-Value Store with Nested Transactions
//!
//! This is the main entry point for the nestkv shell.
//! It loads the configuration, wires audit logging to the log file, and runs
//! a session over stdin/stdout.

use anyhow::Context;
use nestkv::commands::CommandHandler;
use nestkv::config::{CliAction, CliArgs, Config};
use nestkv::session::Session;
use nestkv::storage::{AuditEvent, AuditLevel, AuditLog, Store, TracingAudit};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_help() {
    println!(
        r#"
nestkv - An In-Memory Key-Value Store with Nested Transactions

USAGE:
    nestkv [OPTIONS]

OPTIONS:
    -c, --config <PATH>      Config file (default: ./config.toml if present)
        --max-depth <N>      Maximum transaction depth (default: 100)
        --max-size <N>       Maximum number of keys (default: 100000)
        --log-file <PATH>    Audit log file (default: db_logs)
        --no-prompt          Do not print the banner and prompts
    -v, --version            Print version information
    -h, --help               Print this help message

COMMANDS:
    SET key value     GET key          UNSET key
    COUNTS value      FIND value
    BEGIN             ROLLBACK         COMMIT
    END

EXAMPLE:
    > SET a 1
    > BEGIN
    > SET a 2
    > GET a
    2
    > ROLLBACK
    > GET a
    1
"#
    );
}

/// Installs a plain-text subscriber writing to the configured log file.
fn init_logging(config: &Config) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("failed to open log file '{}'", config.log_file.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = match CliArgs::parse(std::env::args().skip(1))? {
        CliAction::Run(cli) => cli,
        CliAction::Help => {
            print_help();
            return Ok(());
        }
        CliAction::Version => {
            println!("nestkv version {}", nestkv::VERSION);
            return Ok(());
        }
    };
    let config = Config::load(&cli)?;

    // Set up logging
    init_logging(&config)?;
    info!(
        max_transaction_depth = config.store.max_transaction_depth,
        max_db_size = config.store.max_db_size,
        "Starting nestkv"
    );

    let audit: Arc<dyn AuditLog> = Arc::new(TracingAudit);
    let store = Store::new(config.store, Arc::clone(&audit));
    let mut session = Session::new(
        tokio::io::stdin(),
        tokio::io::stdout(),
        CommandHandler::new(store),
    )
    .interactive(config.interactive);

    let code = tokio::select! {
        result = session.run() => match result {
            Ok(end) => {
                info!(reason = ?end, stats = ?session.stats(), "Shutting down");
                0
            }
            Err(e) => {
                eprintln!("CRITICAL ERROR: {}", e);
                1
            }
        },
        _ = signal::ctrl_c() => {
            println!("\nSESSION INTERRUPTED");
            audit.record(AuditEvent::new(AuditLevel::Info, "Session terminated by user"));
            0
        }
    };

    // A pending blocking read on stdin would otherwise keep the runtime alive.
    std::process::exit(code)
}
