//! Binary encoding of the whole catalog.
//!
//! Layout written by [encode]:
//!
//! ```text
//! magic "MSQL" | version u8 | table count u64
//! per table:  name | column count u64
//!             per column: name | type tag u8 | flags u8
//!             row count u64
//!             per row, per column: i64 | text | f64
//! ```
//!
//! Integers and floats are little-endian, names and texts are a `u64` length
//! followed by UTF-8 bytes. Flags: bit 0 primary key, bit 1 not null.
//!
//! Files without the magic are read with the legacy layout: no header,
//! native-endian `usize` lengths and counts, a 4-byte native type tag per
//! column and no flags. Every read is bounds-checked in both layouts.

use std::mem::size_of;

use tracing::warn;

use crate::column::Column;
use crate::data_type::DataType;
use crate::database::Catalog;
use crate::error::{Error, Result};
use crate::table::{ColumnDef, Row, Schema, Table};
use crate::value::Value;

const MAGIC: &[u8; 4] = b"MSQL";
const VERSION: u8 = 1;

const FLAG_PRIMARY_KEY: u8 = 0b01;
const FLAG_NOT_NULL: u8 = 0b10;

/// Serializes every table, ordered by name so the output is deterministic.
pub fn encode(catalog: &Catalog) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);

    let mut tables: Vec<&Table> = catalog.values().collect();
    tables.sort_unstable_by(|a, b| a.name.cmp(&b.name));

    put_len(&mut out, tables.len());
    for table in tables {
        put_str(&mut out, &table.name);

        put_len(&mut out, table.schema.columns.len());
        for column in &table.schema.columns {
            put_str(&mut out, &column.name);
            out.push(column.data_type.tag());
            let mut flags = 0;
            if column.primary_key {
                flags |= FLAG_PRIMARY_KEY;
            }
            if column.not_null {
                flags |= FLAG_NOT_NULL;
            }
            out.push(flags);
        }

        put_len(&mut out, table.row_count);
        for row_idx in 0..table.row_count {
            for column in &table.columns {
                put_value(&mut out, column, row_idx);
            }
        }
    }
    out
}

/// Rebuilds a catalog from bytes produced by [encode] or by the legacy writer.
///
/// # Errors
/// Returns [Error::Decode] on truncated input, unknown version or type tag,
/// invalid UTF-8, duplicate table names or trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<Catalog> {
    let mut reader = if bytes.starts_with(MAGIC) {
        let mut reader = Reader::new(bytes, Layout::Versioned);
        reader.offset = MAGIC.len();
        let version = reader.read_u8()?;
        if version != VERSION {
            return Err(reader.error(format!("unsupported format version {version}")));
        }
        reader
    } else {
        warn!("database file has no format header, reading legacy layout");
        Reader::new(bytes, Layout::Legacy)
    };

    let table_count = reader.read_len()?;
    let mut catalog = Catalog::new();
    for _ in 0..table_count {
        let table = reader.read_table()?;
        if catalog.contains_key(&table.name) {
            return Err(reader.error(format!("duplicate table '{}'", table.name)));
        }
        catalog.insert(table.name.clone(), table);
    }

    if reader.remaining() > 0 {
        return Err(reader.error(format!("{} trailing bytes", reader.remaining())));
    }
    Ok(catalog)
}

fn put_len(out: &mut Vec<u8>, len: usize) {
    out.extend_from_slice(&(len as u64).to_le_bytes());
}

fn put_str(out: &mut Vec<u8>, s: &str) {
    put_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn put_value(out: &mut Vec<u8>, column: &Column, row_idx: usize) {
    match column.get(row_idx) {
        Some(Value::Integer(i)) => out.extend_from_slice(&i.to_le_bytes()),
        Some(Value::Text(s)) => put_str(out, &s),
        Some(Value::Real(f)) => out.extend_from_slice(&f.to_le_bytes()),
        None => unreachable!("row {row_idx} is within every column"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Versioned,
    Legacy,
}

impl Layout {
    /// Width of length and count fields.
    fn len_width(self) -> usize {
        match self {
            Layout::Versioned => size_of::<u64>(),
            Layout::Legacy => size_of::<usize>(),
        }
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
    layout: Layout,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8], layout: Layout) -> Self {
        Self {
            bytes,
            offset: 0,
            layout,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::Decode {
            offset: self.offset,
            reason: reason.into(),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(format!(
                "need {len} bytes, only {} left",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    fn read_len(&mut self) -> Result<usize> {
        match self.layout {
            Layout::Versioned => {
                let len = u64::from_le_bytes(self.take_array()?);
                usize::try_from(len).map_err(|_| self.error(format!("length {len} overflows")))
            }
            Layout::Legacy => Ok(usize::from_ne_bytes(self.take_array()?)),
        }
    }

    fn read_i64(&mut self) -> Result<i64> {
        let bytes = self.take_array()?;
        Ok(match self.layout {
            Layout::Versioned => i64::from_le_bytes(bytes),
            Layout::Legacy => i64::from_ne_bytes(bytes),
        })
    }

    fn read_f64(&mut self) -> Result<f64> {
        let bytes = self.take_array()?;
        Ok(match self.layout {
            Layout::Versioned => f64::from_le_bytes(bytes),
            Layout::Legacy => f64::from_ne_bytes(bytes),
        })
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_len()?;
        let start = self.offset;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::Decode {
            offset: start,
            reason: format!("invalid UTF-8: {e}"),
        })
    }

    fn read_data_type(&mut self) -> Result<DataType> {
        let tag = match self.layout {
            Layout::Versioned => self.read_u8()?,
            Layout::Legacy => {
                let wide = u32::from_ne_bytes(self.take_array()?);
                u8::try_from(wide).map_err(|_| self.error(format!("unknown type tag {wide}")))?
            }
        };
        DataType::from_tag(tag).ok_or_else(|| self.error(format!("unknown type tag {tag}")))
    }

    fn read_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.read_string()?;
        let mut column = ColumnDef::new(name, self.read_data_type()?);
        if self.layout == Layout::Versioned {
            let flags = self.read_u8()?;
            if flags & !(FLAG_PRIMARY_KEY | FLAG_NOT_NULL) != 0 {
                return Err(self.error(format!("unknown column flags {flags:#04b}")));
            }
            column.primary_key = flags & FLAG_PRIMARY_KEY != 0;
            column.not_null = flags & FLAG_NOT_NULL != 0;
        }
        Ok(column)
    }

    fn read_value(&mut self, data_type: DataType) -> Result<Value> {
        Ok(match data_type {
            DataType::Integer => Value::Integer(self.read_i64()?),
            DataType::Text => Value::Text(self.read_string()?.into()),
            DataType::Real => Value::Real(self.read_f64()?),
        })
    }

    fn read_table(&mut self) -> Result<Table> {
        let name = self.read_string()?;

        let column_count = self.read_len()?;
        if column_count == 0 {
            return Err(self.error(format!("table {name:?} has no columns")));
        }
        let mut columns: Vec<ColumnDef> = Vec::new();
        for _ in 0..column_count {
            let column = self.read_column_def()?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(self.error(format!("duplicate column {:?}", column.name)));
            }
            columns.push(column);
        }
        let types: Vec<DataType> = columns.iter().map(|c| c.data_type).collect();
        let mut table = Table::new(name, Schema { columns });

        let row_count = self.read_len()?;

        // every field takes at least 8 bytes (or a length field), fail before looping
        let min_row_width = types.len() * size_of::<i64>().min(self.layout.len_width());
        if row_count > self.remaining() / min_row_width {
            return Err(self.error(format!(
                "{row_count} rows cannot fit in {} bytes",
                self.remaining()
            )));
        }

        for _ in 0..row_count {
            let row = types
                .iter()
                .map(|data_type| self.read_value(*data_type))
                .collect::<Result<Row>>()?;
            table.insert(row)?;
        }
        Ok(table)
    }
}
