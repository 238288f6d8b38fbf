//! Doris type conversions for captured MySQL schema changes.
//!
//! This crate maps the column types that Debezium records in MySQL schema
//! history entries onto Doris column types, and renders the single-column
//! `ALTER TABLE` statements that are sent to a Doris frontend.
//!
//! # Structure
//!
//! - `schema`: MySQL column type (+ length/scale) → `DorisType`
//! - `ddl`: `SchemaChangeIntent` and `ALTER TABLE ... ADD|DROP COLUMN` rendering
//!
//! # Example
//!
//! ```rust
//! use doris_types::{mysql_to_doris_type, DorisDdl, DorisType, SchemaChangeIntent};
//!
//! let ty = mysql_to_doris_type("INT", 0, 0).unwrap();
//! assert_eq!(ty, DorisType::Int);
//!
//! let intent = SchemaChangeIntent::add("age", ty);
//! let stmt = DorisDdl::alter_column("db.tbl", &intent).unwrap();
//! assert_eq!(stmt, "ALTER TABLE db.tbl ADD COLUMN age INT");
//! ```

pub mod ddl;
pub mod error;
pub mod schema;

pub use ddl::{quote_default_value, ColumnOperation, DorisDdl, SchemaChangeIntent};
pub use error::{Result, TypeMappingError};
pub use schema::{mysql_to_doris_type, DorisType};
