//! Interactive shell for a minisql database file.
//!
//! ```bash
//! # start the shell on the default file
//! minisql
//!
//! # run one statement against another file and exit
//! minisql --db users.db -c "SELECT * FROM users"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use minisql::{Database, Outcome, table::render};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

const HELP: &str = "
Available commands:
  CREATE TABLE table_name (column1 TYPE [PRIMARY KEY] [NOT NULL], ...);
  INSERT INTO table_name [(column, ...)] VALUES (value1, value2, ...);
  SELECT * | column, ... FROM table_name [WHERE column = value];
  UPDATE table_name SET column = value WHERE column = value;
  DELETE FROM table_name WHERE column = value;

Supported data types: INTEGER (INT), TEXT (VARCHAR), REAL (FLOAT, DOUBLE)
Meta commands: .help  .tables  .quit  .exit

Example:
  CREATE TABLE users (id INTEGER, name TEXT, age INTEGER);
  INSERT INTO users VALUES (1, 'Alice', 25);
  SELECT * FROM users WHERE id = 1;
";

/// Single-file SQL-like record store
#[derive(Parser, Debug)]
#[command(name = "minisql", version)]
struct Args {
    /// Database file, created on exit if it does not exist
    #[arg(long, value_name = "FILE", default_value = "mini_sqlite.db", env = "MINISQL_DB")]
    db: PathBuf,

    /// Execute a single statement and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut db = Database::open(&args.db)?;

    let result = match &args.command {
        Some(sql) => {
            execute_statement(&mut db, sql);
            Ok(())
        }
        None => repl(&mut db),
    };

    db.close()?;
    result
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn repl(db: &mut Database) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("=================================");
    println!("  minisql");
    println!("=================================");
    println!("Type SQL commands or '.help' for help");
    println!("Type '.quit' to exit\n");

    loop {
        let line = match editor.readline("sqlite> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line);

        match line {
            ".quit" | ".exit" => break,
            ".help" => println!("{HELP}"),
            ".tables" => {
                for name in db.list_tables() {
                    println!("{name}");
                }
            }
            _ => {
                execute_statement(db, line);
                println!();
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn execute_statement(db: &mut Database, line: &str) {
    let mut sql = line.trim().to_string();
    if !sql.ends_with(';') {
        sql.push(';');
    }

    match db.execute(&sql) {
        Ok(Outcome::Created(name)) => println!("Table '{name}' created successfully"),
        Ok(Outcome::Inserted) => println!("Row inserted successfully"),
        Ok(Outcome::Rows(result)) if result.rows.is_empty() => println!("No rows found"),
        Ok(Outcome::Rows(result)) => print!("{}", render(&result.columns, &result.rows)),
        Ok(Outcome::Updated(count)) => println!("Updated {count} rows"),
        Ok(Outcome::Deleted(count)) => println!("Deleted {count} rows"),
        Err(e) => println!("Error: {e}"),
    }
}
