pub mod ast;
pub mod column;
pub mod data_type;
pub mod database;
pub mod error;
pub mod parser;
pub mod persist;
pub mod table;
pub mod tokenizer;
pub mod value;

pub use ast::{CommandKind, ParsedCommand, Predicate};
pub use column::Column;
pub use data_type::DataType;
pub use database::{Catalog, Database, Outcome, QueryResult};
pub use error::{Error, Result};
pub use parser::parse;
pub use table::{ColumnDef, Row, Schema, Table};
pub use value::Value;
