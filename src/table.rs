use std::fmt::Write;

use allocative::Allocative;
use bitvec::prelude::*;

use crate::column::Column;
use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Width of every field in the tabular dump.
const FIELD_WIDTH: usize = 15;

/// A row is one value per column, in schema order.
pub type Row = Vec<Value>;

/// Column definition in the schema.
///
/// `primary_key` and `not_null` are kept as metadata and persisted, but no
/// operation enforces them.
#[derive(Debug, Clone, PartialEq, Allocative)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnDef {
    /// A column definition without modifiers.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary_key: false,
            not_null: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Allocative)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, Allocative)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    pub columns: Vec<Column>,
    pub row_count: usize,
}

impl Table {
    pub fn new(name: String, schema: Schema) -> Self {
        let columns = schema
            .columns
            .iter()
            .map(|column| Column::new(column.name.clone(), column.data_type))
            .collect();
        Self {
            name,
            schema,
            columns,
            row_count: 0,
        }
    }

    /// Appends a row. Values are matched to columns by position.
    ///
    /// The whole row is validated before any column is touched, so a rejected
    /// row leaves the table unchanged.
    pub fn insert(&mut self, values: Row) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::ArityMismatch {
                table: self.name.clone(),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&values) {
            column.check(value)?;
        }
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value)?;
        }
        self.row_count += 1;
        Ok(())
    }

    pub fn get_row(&self, row_idx: usize) -> Option<Row> {
        if self.row_count <= row_idx {
            return None;
        }
        self.columns
            .iter()
            .map(|col| col.get(row_idx)) // -> Option<Value>
            .collect()
    }

    /// Every row, in insertion order.
    pub fn rows(&self) -> Vec<Row> {
        (0..self.row_count)
            .filter_map(|idx| self.get_row(idx))
            .collect()
    }

    pub fn get_col(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Resolves a column name to its position in the schema.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.schema
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::column_not_found(&self.name, name))
    }

    /// Marks the rows whose `column` value is structurally equal to `value`.
    pub fn matching(&self, column: &str, value: &Value) -> Result<BitVec> {
        let idx = self.column_index(column)?;
        Ok(self.columns[idx].matches(value))
    }

    /// Rows matching `column = value`, in insertion order.
    pub fn select_where(&self, column: &str, value: &Value) -> Result<Vec<Row>> {
        let marked = self.matching(column, value)?;
        Ok(marked
            .iter_ones()
            .filter_map(|idx| self.get_row(idx))
            .collect())
    }

    /// Overwrites `set_column` in every row matching `where_column = where_value`.
    /// Returns the number of rows modified. The set value is only type-checked
    /// when at least one row matches.
    pub fn update(
        &mut self,
        set_column: &str,
        set_value: &Value,
        where_column: &str,
        where_value: &Value,
    ) -> Result<usize> {
        let set_idx = self.column_index(set_column)?;
        let marked = self.matching(where_column, where_value)?;
        if marked.not_any() {
            return Ok(0);
        }
        self.columns[set_idx].set_marked(&marked, set_value)
    }

    /// Removes every row matching `where_column = where_value`.
    /// Survivors keep their relative order. Returns the number of rows removed.
    pub fn delete(&mut self, where_column: &str, where_value: &Value) -> Result<usize> {
        let marked = self.matching(where_column, where_value)?;
        let removed = marked.count_ones();
        if removed > 0 {
            for column in &mut self.columns {
                column.remove_marked(&marked);
            }
            self.row_count -= removed;
        }
        Ok(removed)
    }

    /// Names of the columns, in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Fixed-width dump of every row currently in the table.
    pub fn render(&self) -> String {
        render(&self.column_names(), &self.rows())
    }
}

/// Renders rows as a fixed-width text table: a header line, a dashed
/// separator and one line per row. Every field is right-aligned.
///
/// # Example
/// ```
/// # use minisql::{table::render, Value};
/// let out = render(&["id".to_string()], &[vec![Value::Integer(7)]]);
/// assert_eq!(out.lines().nth(2), Some("              7"));
/// ```
pub fn render(columns: &[String], rows: &[Row]) -> String {
    let mut out = String::new();

    for name in columns {
        let _ = write!(out, "{name:>FIELD_WIDTH$}");
    }
    out.push('\n');

    for _ in columns {
        let _ = write!(out, "{:>FIELD_WIDTH$}", "-".repeat(10));
    }
    out.push('\n');

    for row in rows {
        for value in row {
            let _ = write!(out, "{value:>FIELD_WIDTH$}");
        }
        out.push('\n');
    }
    out
}
