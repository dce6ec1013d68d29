use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::{
    ColumnDef, Value,
    ast::{CommandKind, ParsedCommand},
    error::{Error, Result},
    parser::parse,
    persist,
    table::{Row, Schema, Table},
};

/// Mapping from table name to table.
pub type Catalog = HashMap<String, Table>;

/// The storage engine. It owns a catalog of tables and, when opened on a
/// file, loads it once at start and writes it back once at [Database::close].
///
/// If a file-backed database is dropped without being closed, the catalog is
/// saved on drop and a failure is only logged.
#[derive(Default)]
pub struct Database {
    /// A map of table names to their respective [Table] structures.
    tables: Catalog,
    /// Backing file, `None` for an in-memory database.
    path: Option<PathBuf>,
    closed: bool,
}

/// Represents the result of a successful `SELECT` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The names of the columns included in the result set.
    pub columns: Vec<String>,
    /// The matching rows, in insertion order.
    pub rows: Vec<Row>,
}

/// What a successfully executed statement did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(String),
    Inserted,
    Rows(QueryResult),
    Updated(usize),
    Deleted(usize),
}

impl Database {
    /// Creates a new, empty in-memory database. Nothing is ever written to disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the database stored in `path`.
    ///
    /// A missing or empty file gives an empty catalog; the file is created on
    /// the first save.
    ///
    /// # Errors
    /// Returns [Error::Io] if the file cannot be read and [Error::Decode] if its
    /// content is not a valid database. Nothing is loaded in that case.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let tables = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => Catalog::new(),
            Ok(bytes) => persist::decode(&bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no database file yet");
                Catalog::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), tables = tables.len(), "database opened");
        Ok(Self {
            tables,
            path: Some(path),
            closed: false,
        })
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the whole catalog to the backing file.
    ///
    /// The bytes go to a sibling temporary file which is flushed to disk and
    /// then renamed over the database file, so a failed save leaves the
    /// previous file intact.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = persist::encode(&self.tables);
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, path)?;

        // make the rename itself durable
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Ok(dir) = File::open(dir) {
            let _ = dir.sync_all();
        }

        info!(
            path = %path.display(),
            tables = self.tables.len(),
            bytes = bytes.len(),
            "database saved"
        );
        Ok(())
    }

    /// Saves the catalog and releases the database.
    pub fn close(mut self) -> Result<()> {
        let result = self.save();
        self.closed = true;
        result
    }

    /// Creates a new empty table in the database.
    ///
    /// # Errors
    /// Returns [Error::TableExists] if a table with the same name already exists,
    /// [Error::NoColumns] for an empty column list and [Error::DuplicateColumn]
    /// when two columns share a name.
    pub fn create_table(&mut self, name: String, columns: Vec<ColumnDef>) -> Result<()> {
        if self.tables.contains_key(&name) {
            return Err(Error::TableExists { table: name });
        }
        if columns.is_empty() {
            return Err(Error::NoColumns { table: name });
        }
        for (idx, column) in columns.iter().enumerate() {
            if columns[..idx].iter().any(|c| c.name == column.name) {
                return Err(Error::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        debug!(table = %name, columns = columns.len(), "create table");
        let table = Table::new(name.clone(), Schema { columns });
        self.tables.insert(name, table);
        Ok(())
    }

    /// Appends a row to `table`. Values are matched to columns by position.
    ///
    /// # Errors
    /// [Error::TableNotFound], [Error::ArityMismatch] when the row does not have
    /// one value per column, [Error::TypeMismatch] when a value does not have
    /// its column's type. The table is unchanged on error.
    pub fn insert_row(&mut self, table: &str, row: Row) -> Result<()> {
        self.table_mut(table)?.insert(row)
    }

    /// Every row of `table`, in insertion order.
    ///
    /// An empty table gives `Ok(vec![])`, a missing one [Error::TableNotFound].
    pub fn select_all(&self, table: &str) -> Result<Vec<Row>> {
        Ok(self.table(table)?.rows())
    }

    /// Rows of `table` whose `column` value is structurally equal to `value`.
    pub fn select_where(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
        self.table(table)?.select_where(column, value)
    }

    /// Sets `set_column` to `set_value` in every row where `where_column`
    /// equals `where_value` and returns how many rows were modified.
    ///
    /// No match is not an error, it returns `Ok(0)`.
    pub fn update_rows(
        &mut self,
        table: &str,
        set_column: &str,
        set_value: &Value,
        where_column: &str,
        where_value: &Value,
    ) -> Result<usize> {
        self.table_mut(table)?
            .update(set_column, set_value, where_column, where_value)
    }

    /// Removes every row where `where_column` equals `where_value` and returns
    /// how many were removed.
    pub fn delete_rows(&mut self, table: &str, where_column: &str, where_value: &Value) -> Result<usize> {
        self.table_mut(table)?.delete(where_column, where_value)
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns the names of all tables, sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Bytes allocated on the heap by the catalog.
    pub fn memory_usage(&self) -> usize {
        allocative::size_of_unique_allocated_data(&self.tables)
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::table_not_found(name))
    }

    /// Parses a statement and runs it against the catalog.
    ///
    /// # Errors
    /// Returns [Error::Parse] for an unknown or malformed statement, and the
    /// storage errors of the operation otherwise.
    ///
    /// # Example
    /// ```
    /// use minisql::{Database, Outcome, Value};
    ///
    /// let mut db = Database::new();
    /// db.execute("CREATE TABLE users (id INTEGER, name TEXT)").unwrap();
    /// db.execute("INSERT INTO users VALUES (1, 'Alice')").unwrap();
    ///
    /// let Outcome::Rows(result) = db.execute("SELECT * FROM users WHERE id = 1").unwrap() else {
    ///     panic!("expected rows");
    /// };
    /// assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::Text("Alice".into())]]);
    /// ```
    pub fn execute(&mut self, sql: &str) -> Result<Outcome> {
        let command = parse(sql);
        debug!(kind = ?command.kind, table = %command.table, "execute");

        if command.kind == CommandKind::Invalid {
            return Err(Error::Parse("unrecognized statement".into()));
        }
        if !command.valid {
            return Err(Error::Parse(format!(
                "malformed {} statement",
                kind_keyword(command.kind)
            )));
        }

        match command.kind {
            CommandKind::CreateTable => {
                self.create_table(command.table.clone(), command.column_defs)?;
                Ok(Outcome::Created(command.table))
            }
            CommandKind::Insert => {
                self.insert_row(&command.table, command.values)?;
                Ok(Outcome::Inserted)
            }
            CommandKind::Select => self.select(command).map(Outcome::Rows),
            CommandKind::Update => {
                let (Some(set_column), Some(set_value), Some(predicate)) = (
                    command.columns.first(),
                    command.values.first(),
                    &command.predicate,
                ) else {
                    return Err(Error::Parse("UPDATE needs SET and WHERE".into()));
                };
                let updated = self.update_rows(
                    &command.table,
                    set_column,
                    set_value,
                    &predicate.column,
                    &predicate.value,
                )?;
                Ok(Outcome::Updated(updated))
            }
            CommandKind::Delete => {
                let Some(predicate) = &command.predicate else {
                    return Err(Error::Parse("DELETE without WHERE clause is not supported".into()));
                };
                let deleted = self.delete_rows(&command.table, &predicate.column, &predicate.value)?;
                Ok(Outcome::Deleted(deleted))
            }
            CommandKind::Invalid => Err(Error::Parse("unrecognized statement".into())),
        }
    }

    /// Runs a `SELECT`: filter with the predicate if any, then keep the
    /// requested columns (all of them for `*`).
    fn select(&self, command: ParsedCommand) -> Result<QueryResult> {
        let table = self.table(&command.table)?;

        let rows = match &command.predicate {
            Some(predicate) => table.select_where(&predicate.column, &predicate.value)?,
            None => table.rows(),
        };

        if command.columns.is_empty() {
            return Ok(QueryResult {
                columns: table.column_names(),
                rows,
            });
        }

        let indexes = command
            .columns
            .iter()
            .map(|name| table.column_index(name))
            .collect::<Result<Vec<usize>>>()?;

        let rows = rows
            .into_iter()
            .map(|row| indexes.iter().map(|idx| row[*idx].clone()).collect())
            .collect();

        Ok(QueryResult {
            columns: command.columns,
            rows,
        })
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.closed || self.path.is_none() {
            return;
        }
        if let Err(e) = self.save() {
            error!(error = %e, "failed to save database on drop");
        }
    }
}

fn kind_keyword(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::CreateTable => "CREATE TABLE",
        CommandKind::Insert => "INSERT",
        CommandKind::Select => "SELECT",
        CommandKind::Update => "UPDATE",
        CommandKind::Delete => "DELETE",
        CommandKind::Invalid => "unknown",
    }
}
