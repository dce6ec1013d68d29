use crate::{ColumnDef, Value};

/// Kind of statement, decided by its leading keyword(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    CreateTable,
    Insert,
    Select,
    Update,
    Delete,
    /// The leading keyword is not one of the supported statements.
    Invalid,
}

/// A single `column = literal` equality test.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub value: Value,
}

/// A statement turned into data, ready to be dispatched to the storage engine.
///
/// Which fields are filled depends on `kind`:
/// - `CreateTable`: `table`, `column_defs`
/// - `Insert`: `table`, `values`, and `columns` when a column list was given
/// - `Select`: `table`, `columns` (empty for `*`), `predicate` if there is a WHERE
/// - `Update`: `table`, `columns[0]` = `values[0]` (the SET), `predicate`
/// - `Delete`: `table`, `predicate`
///
/// A recognized statement with a malformed body keeps its `kind`, has every
/// other field empty and `valid == false`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub kind: CommandKind,
    pub table: String,
    pub columns: Vec<String>,
    pub column_defs: Vec<ColumnDef>,
    pub values: Vec<Value>,
    pub predicate: Option<Predicate>,
    pub valid: bool,
}

impl ParsedCommand {
    /// A command of `kind` with every field empty.
    pub fn empty(kind: CommandKind) -> Self {
        Self {
            kind,
            table: String::new(),
            columns: vec![],
            column_defs: vec![],
            values: vec![],
            predicate: None,
            valid: false,
        }
    }

    pub fn invalid() -> Self {
        Self::empty(CommandKind::Invalid)
    }
}
