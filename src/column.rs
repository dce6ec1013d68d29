use std::sync::Arc;

use allocative::Allocative;
use bitvec::prelude::*;

use crate::data_type::DataType;
use crate::error::{Error, Result};
use crate::value::Value;

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone, Allocative)]
pub enum ColumnData {
    /// Vector of 64-bit integers.
    Integer(Vec<i64>),
    /// Vector of reference-counted strings.
    Text(Vec<Arc<str>>),
    /// Vector of 64-bit floats.
    Real(Vec<f64>),
}

/// Represents a column within a table: its name, its declared type and the
/// values of every row at this position of the schema.
#[derive(Debug, Clone, Allocative)]
pub struct Column {
    /// The name of the column.
    pub name: String,
    /// The declared data type of the column.
    pub data_type: DataType,
    /// The actual values stored in the column.
    pub data: ColumnData,
}

impl Column {
    /// Creates a new, empty column with the specified name and data type.
    /// The underlying data storage is initialized according to the data type.
    pub fn new(name: String, data_type: DataType) -> Self {
        let data = match data_type {
            DataType::Integer => ColumnData::Integer(vec![]),
            DataType::Text => ColumnData::Text(vec![]),
            DataType::Real => ColumnData::Real(vec![]),
        };
        Self {
            name,
            data_type,
            data,
        }
    }

    /// Checks that `value` can be stored in this column. An integer is
    /// accepted by a REAL column and stored widened.
    ///
    /// # Errors
    /// Returns [Error::TypeMismatch] if the value's type is not the column's type.
    pub fn check(&self, value: &Value) -> Result<()> {
        let widened = self.data_type == DataType::Real && value.data_type() == DataType::Integer;
        if value.data_type() != self.data_type && !widened {
            return Err(Error::TypeMismatch {
                column: self.name.clone(),
                expected: self.data_type,
                actual: value.data_type(),
            });
        }
        Ok(())
    }

    /// Appends a new value to the end of the column.
    ///
    /// # Errors
    /// Returns an error if the value's type does not match the column's data type.
    ///
    /// # Example
    /// ```
    /// # use minisql::column::Column;
    /// # use minisql::{DataType, Value};
    /// let mut col = Column::new("age".into(), DataType::Integer);
    /// col.push(Value::Integer(30)).unwrap();
    /// assert!(col.push(Value::Text("thirty".into())).is_err());
    ///
    /// assert_eq!(col.len(), 1);
    /// assert_eq!(col.get(0), Some(Value::Integer(30)));
    /// ```
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.check(&value)?;

        match (&mut self.data, value) {
            (ColumnData::Integer(col), Value::Integer(v)) => col.push(v),
            (ColumnData::Text(col), Value::Text(v)) => col.push(v),
            (ColumnData::Real(col), Value::Real(v)) => col.push(v),
            (ColumnData::Real(col), Value::Integer(v)) => col.push(v as f64),
            (_, value) => {
                return Err(Error::TypeMismatch {
                    column: self.name.clone(),
                    expected: self.data_type,
                    actual: value.data_type(),
                });
            }
        }
        Ok(())
    }

    /// Returns the number of rows currently stored in the column.
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Integer(col) => col.len(),
            ColumnData::Text(col) => col.len(),
            ColumnData::Real(col) => col.len(),
        }
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieves the value at the specified row index.
    ///
    /// Returns `None` if the index is out of bounds.
    pub fn get(&self, row_idx: usize) -> Option<Value> {
        match &self.data {
            ColumnData::Integer(col) => col.get(row_idx).map(|v| Value::Integer(*v)),
            ColumnData::Text(col) => col.get(row_idx).map(|v| Value::Text(Arc::clone(v))),
            ColumnData::Real(col) => col.get(row_idx).map(|v| Value::Real(*v)),
        }
    }

    /// Scans the column and marks every row whose value is structurally
    /// equal to `value`. A value of another type never matches.
    pub fn matches(&self, value: &Value) -> BitVec {
        match (&self.data, value) {
            (ColumnData::Integer(col), Value::Integer(v)) => col.iter().map(|x| x == v).collect(),
            (ColumnData::Text(col), Value::Text(v)) => col.iter().map(|x| x == v).collect(),
            (ColumnData::Real(col), Value::Real(v)) => col.iter().map(|x| x == v).collect(),
            _ => bitvec![0; self.len()],
        }
    }

    /// Overwrites every marked row with `value` and returns how many were written.
    ///
    /// # Errors
    /// Returns an error if the value's type does not match the column's data type.
    /// Nothing is written in that case.
    pub fn set_marked(&mut self, marked: &BitSlice, value: &Value) -> Result<usize> {
        self.check(value)?;

        let mut written = 0;
        for idx in marked.iter_ones() {
            match (&mut self.data, value) {
                (ColumnData::Integer(col), Value::Integer(v)) => col[idx] = *v,
                (ColumnData::Text(col), Value::Text(v)) => col[idx] = Arc::clone(v),
                (ColumnData::Real(col), Value::Real(v)) => col[idx] = *v,
                (ColumnData::Real(col), Value::Integer(v)) => col[idx] = *v as f64,
                _ => unreachable!("value type checked above"),
            }
            written += 1;
        }
        Ok(written)
    }

    /// Removes every marked row, keeping the survivors in their relative order.
    pub fn remove_marked(&mut self, marked: &BitSlice) {
        fn retain_unmarked<T>(col: &mut Vec<T>, marked: &BitSlice) {
            let mut idx = 0;
            col.retain(|_| {
                let keep = !marked[idx];
                idx += 1;
                keep
            });
        }

        match &mut self.data {
            ColumnData::Integer(col) => retain_unmarked(col, marked),
            ColumnData::Text(col) => retain_unmarked(col, marked),
            ColumnData::Real(col) => retain_unmarked(col, marked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_column(values: &[i64]) -> Column {
        let mut col = Column::new("n".into(), DataType::Integer);
        for v in values {
            col.push(Value::Integer(*v)).unwrap();
        }
        col
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Creation
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_column_new() {
        let col = Column::new("age".into(), DataType::Integer);

        assert_eq!(col.name, "age");
        assert_eq!(col.data_type, DataType::Integer);
        assert!(col.is_empty());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : Push & Get
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_push_and_get() {
        let mut col = Column::new("name".into(), DataType::Text);

        col.push(Value::Text("Alice".into())).unwrap();
        col.push(Value::Text("Bob".into())).unwrap();

        assert_eq!(col.len(), 2);
        assert_eq!(col.get(0), Some(Value::Text("Alice".into())));
        assert_eq!(col.get(1), Some(Value::Text("Bob".into())));
        assert_eq!(col.get(2), None);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : Type mismatch
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_type_mismatch() {
        let mut col = Column::new("age".into(), DataType::Integer);

        let result = col.push(Value::Real(3.5));

        assert!(matches!(
            result,
            Err(Error::TypeMismatch {
                expected: DataType::Integer,
                actual: DataType::Real,
                ..
            })
        ));
        assert!(col.push(Value::Text("3".into())).is_err());
        assert_eq!(col.len(), 0);
    }

    #[test]
    fn test_integer_widens_into_real_column() {
        let mut col = Column::new("price".into(), DataType::Real);

        col.push(Value::Integer(3)).unwrap();
        assert_eq!(col.get(0), Some(Value::Real(3.0)));

        col.set_marked(bits![1], &Value::Integer(-2)).unwrap();
        assert_eq!(col.get(0), Some(Value::Real(-2.0)));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : Matching
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_matches() {
        let col = int_column(&[1, 2, 1, 3]);

        let marked = col.matches(&Value::Integer(1));
        assert_eq!(marked, bitvec![1, 0, 1, 0]);

        // other variants never match, even with the same numeric payload
        let marked = col.matches(&Value::Real(1.0));
        assert_eq!(marked.count_ones(), 0);
        assert_eq!(marked.len(), 4);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : Set marked rows
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_set_marked() {
        let mut col = int_column(&[10, 20, 30]);

        let written = col.set_marked(bits![0, 1, 1], &Value::Integer(0)).unwrap();

        assert_eq!(written, 2);
        assert_eq!(col.get(0), Some(Value::Integer(10)));
        assert_eq!(col.get(1), Some(Value::Integer(0)));
        assert_eq!(col.get(2), Some(Value::Integer(0)));

        assert!(col.set_marked(bits![1, 0, 0], &Value::Text("x".into())).is_err());
        assert_eq!(col.get(0), Some(Value::Integer(10)));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : Remove marked rows
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_remove_marked_keeps_order() {
        let mut col = int_column(&[1, 2, 3, 4, 5]);

        col.remove_marked(bits![1, 0, 1, 0, 0]);

        assert_eq!(col.len(), 3);
        assert_eq!(col.get(0), Some(Value::Integer(2)));
        assert_eq!(col.get(1), Some(Value::Integer(4)));
        assert_eq!(col.get(2), Some(Value::Integer(5)));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 7 : Large Column
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_large_column() {
        let mut col = Column::new("big".into(), DataType::Integer);

        for i in 0..10_000 {
            col.push(Value::Integer(i % 10)).unwrap();
        }

        assert_eq!(col.len(), 10_000);
        assert_eq!(col.matches(&Value::Integer(7)).count_ones(), 1_000);
    }
}
