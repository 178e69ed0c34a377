//! Developer CLI for storekit.
//!
//! ```bash
//! # Create a database and a table
//! storekit --db notes.sqlite3 --create exec "CREATE TABLE notes (title TEXT)"
//!
//! # Insert with typed parameters
//! storekit --db notes.sqlite3 exec "INSERT INTO notes (title) VALUES (?)" -p t:hello
//!
//! # Query, one JSON object per row
//! storekit --db notes.sqlite3 query "SELECT rowid, title FROM notes"
//!
//! # Run a newline-separated script atomically
//! storekit --db notes.sqlite3 script migrate.sql --atomic
//! ```

mod output;
mod params;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use eyre::WrapErr;
use storekit_core::{RelationalStoreProvider, RowMap, SqliteStore, StoreConfig, StoreProvider};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// storekit command-line interface
#[derive(Parser, Debug)]
#[command(name = "storekit", version, about = "Run SQL against a storekit SQLite store")]
struct Cli {
    /// Database path, `:memory:` or a `file:` URI
    #[arg(long, env = "STOREKIT_DB")]
    db: String,

    /// Create the database file if it does not exist
    #[arg(long)]
    create: bool,

    /// JSON store configuration file
    #[arg(long, value_name = "FILE", env = "STOREKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a query and print every row as a JSON object
    Query {
        /// SQL text
        sql: String,
        /// Positional parameter: null, i:<int>, r:<real>, t:<text>, x:<hex>
        #[arg(short = 'p', long = "param", value_name = "LITERAL")]
        params: Vec<String>,
    },
    /// Run a statement that produces no rows
    Exec {
        /// SQL text
        sql: String,
        /// Positional parameter: null, i:<int>, r:<real>, t:<text>, x:<hex>
        #[arg(short = 'p', long = "param", value_name = "LITERAL")]
        params: Vec<String>,
    },
    /// Run a newline-separated script, printing rows of SELECT lines
    Script {
        /// Script file, one statement per line
        file: PathBuf,
        /// Wrap the script in BEGIN/COMMIT so a failure rolls back every line
        #[arg(long)]
        atomic: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> eyre::Result<StoreConfig> {
    let Some(path) = path else {
        return Ok(StoreConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    Ok(StoreConfig::from_json(&json)?)
}

fn run_query(store: &mut SqliteStore, sql: &str, literals: &[String]) -> eyre::Result<()> {
    let params = params::parse_params(literals)?;
    store.execute_query(sql, &params)?;
    let columns = store.column_names();
    while let Some(row) = store.next_row() {
        println!("{}", output::row_to_json(&columns, &row));
    }
    if let Some(err) = store.last_error() {
        return Err(err.clone()).wrap_err("row retrieval failed");
    }
    Ok(())
}

fn run_exec(store: &mut SqliteStore, sql: &str, literals: &[String]) -> eyre::Result<()> {
    let params = params::parse_params(literals)?;
    store.execute_update(sql, &params)?;
    println!(
        "{}",
        serde_json::json!({
            "changes": store.changes(),
            "last_insert_row_id": store.last_insert_row_id(),
        })
    );
    Ok(())
}

fn run_script(store: &mut SqliteStore, file: &Path, atomic: bool) -> eyre::Result<()> {
    let script = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("failed to read script {}", file.display()))?;
    if atomic {
        store.execute_update("BEGIN", &[])?;
    }
    let mut print_row = |line: usize, row: RowMap| {
        println!("{}", output::script_row_to_json(line, &row));
    };
    store
        .execute_transaction(&script, None, Some(&mut print_row))
        .wrap_err_with(|| format!("script {} aborted", file.display()))?;
    if atomic {
        store.execute_update("COMMIT", &[])?;
    }
    Ok(())
}

fn run(cli: &Cli) -> eyre::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "store configuration");

    let mut store = SqliteStore::with_config(config);
    store
        .open(&cli.db, cli.create)
        .wrap_err_with(|| format!("failed to open {}", cli.db))?;
    info!(db = %cli.db, "store opened");

    let outcome = match &cli.command {
        Command::Query { sql, params } => run_query(&mut store, sql, params),
        Command::Exec { sql, params } => run_exec(&mut store, sql, params),
        Command::Script { file, atomic } => run_script(&mut store, file, *atomic),
    };
    store.close()?;
    outcome
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}
