//! domainql CLI - Inspect a database as domains and compile queries to SQL
//!
//! Usage:
//!   domainql describe [--database <file.sqlite>]
//!   domainql compile <query.json> [--database <file.sqlite>]
//!
//! The database defaults to `[database] path` from the settings file.
//! Set `RUST_LOG=debug` to see join and alias decisions.

use clap::{Parser, Subcommand};
use domainql::config::Settings;
use domainql::metadata;
use domainql::model::DomainRegistry;
use domainql::parser::QueryParser;
use domainql::sql::generate_sql;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "domainql")]
#[command(about = "domainql - Query a database through its domain model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the domain model ingested from a database as JSON
    Describe {
        /// Path to the SQLite database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },

    /// Compile a JSON query descriptor to SQL
    Compile {
        /// Path to the query descriptor
        file: PathBuf,

        /// Path to the SQLite database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Describe { database } => cmd_describe(database),
        Commands::Compile { file, database } => cmd_compile(file, database),
    }
}

fn cmd_describe(database: Option<PathBuf>) -> ExitCode {
    let registry = match load_registry(database) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    match serde_json::to_string_pretty(&registry.to_json()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing domain model: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_compile(file: PathBuf, database: Option<PathBuf>) -> ExitCode {
    let source = match fs::read_to_string(&file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let registry = match load_registry(database) {
        Ok(registry) => registry,
        Err(code) => return code,
    };

    let query = match QueryParser::new(&registry).parse_query(&source) {
        Ok(query) => query,
        Err(e) => {
            eprintln!("Error in '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match generate_sql(&query) {
        Ok(sql) => {
            println!("{}", sql);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error generating SQL: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Introspect the database given on the command line, or the configured one.
fn load_registry(database: Option<PathBuf>) -> Result<DomainRegistry, ExitCode> {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let path = match database {
        Some(path) => path,
        None => match settings.database.resolved_path() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Error: {} (pass --database or set [database] path)", e);
                return Err(ExitCode::FAILURE);
            }
        },
    };

    metadata::load_sqlite(&path, &settings.ingest_options()).map_err(|e| {
        eprintln!("Error reading database '{}': {}", path.display(), e);
        ExitCode::FAILURE
    })
}
