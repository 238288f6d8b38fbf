//! MySQL schema column type conversion.
//!
//! Debezium's MySQL schema history describes each column with a `typeName`
//! (e.g. "INT UNSIGNED", "VARCHAR", "DECIMAL"), a `length` and a `scale`.
//! This module maps those onto the Doris type system.

use std::fmt;

use crate::error::{Result, TypeMappingError};

/// Largest precision a Doris DECIMALV3 column supports.
const MAX_DECIMAL_PRECISION: u32 = 38;

/// Largest fractional-second precision of DATETIMEV2.
const MAX_DATETIME_PRECISION: u32 = 6;

/// Largest length of a Doris CHAR column.
const MAX_CHAR_LENGTH: u32 = 255;

/// Largest length of a Doris VARCHAR column.
const MAX_VARCHAR_LENGTH: u32 = 65533;

/// A Doris column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DorisType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    LargeInt,
    Float,
    Double,
    DecimalV3 { precision: u32, scale: u32 },
    DateV2,
    DateTimeV2 { precision: u32 },
    Char { length: u32 },
    VarChar { length: u32 },
    String,
    Jsonb,
}

impl fmt::Display for DorisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DorisType::Boolean => write!(f, "BOOLEAN"),
            DorisType::TinyInt => write!(f, "TINYINT"),
            DorisType::SmallInt => write!(f, "SMALLINT"),
            DorisType::Int => write!(f, "INT"),
            DorisType::BigInt => write!(f, "BIGINT"),
            DorisType::LargeInt => write!(f, "LARGEINT"),
            DorisType::Float => write!(f, "FLOAT"),
            DorisType::Double => write!(f, "DOUBLE"),
            DorisType::DecimalV3 { precision, scale } => {
                write!(f, "DECIMALV3({precision},{scale})")
            }
            DorisType::DateV2 => write!(f, "DATEV2"),
            DorisType::DateTimeV2 { precision } => write!(f, "DATETIMEV2({precision})"),
            DorisType::Char { length } => write!(f, "CHAR({length})"),
            DorisType::VarChar { length } => write!(f, "VARCHAR({length})"),
            DorisType::String => write!(f, "STRING"),
            DorisType::Jsonb => write!(f, "JSONB"),
        }
    }
}

/// Convert a MySQL column type, as recorded in Debezium schema history, to a Doris type.
///
/// # Arguments
///
/// * `type_name` - The MySQL type name, optionally followed by `UNSIGNED`/`ZEROFILL`
/// * `length` - Declared length or precision (0 when absent)
/// * `scale` - Declared scale (0 when absent)
///
/// Character lengths are multiplied by 3 because MySQL counts characters while
/// Doris counts UTF-8 bytes.
///
/// # Example
///
/// ```
/// use doris_types::{mysql_to_doris_type, DorisType};
///
/// assert_eq!(mysql_to_doris_type("BIGINT UNSIGNED", 0, 0).unwrap(), DorisType::LargeInt);
/// assert_eq!(
///     mysql_to_doris_type("varchar", 20, 0).unwrap(),
///     DorisType::VarChar { length: 60 }
/// );
/// ```
pub fn mysql_to_doris_type(type_name: &str, length: u32, scale: u32) -> Result<DorisType> {
    let upper = type_name.trim().to_uppercase();
    let mut tokens = upper.split_whitespace();
    let base = tokens
        .next()
        .ok_or_else(|| TypeMappingError::UnsupportedType(type_name.to_string()))?;
    // ZEROFILL implies UNSIGNED in MySQL
    let unsigned = tokens.any(|t| t == "UNSIGNED" || t == "ZEROFILL");

    let doris_type = match base {
        "BIT" | "BOOLEAN" | "BOOL" => DorisType::Boolean,

        "TINYINT" if unsigned => DorisType::SmallInt,
        "TINYINT" => DorisType::TinyInt,
        "SMALLINT" if unsigned => DorisType::Int,
        "SMALLINT" => DorisType::SmallInt,
        "MEDIUMINT" => DorisType::Int,
        "INT" | "INTEGER" if unsigned => DorisType::BigInt,
        "INT" | "INTEGER" => DorisType::Int,
        "BIGINT" if unsigned => DorisType::LargeInt,
        "BIGINT" => DorisType::BigInt,
        "YEAR" => DorisType::Int,

        "FLOAT" => DorisType::Float,
        "DOUBLE" | "REAL" => DorisType::Double,
        "DECIMAL" | "NUMERIC" => {
            if length > 0 && length <= MAX_DECIMAL_PRECISION {
                DorisType::DecimalV3 {
                    precision: length,
                    scale: scale.min(length),
                }
            } else {
                DorisType::String
            }
        }

        "DATE" => DorisType::DateV2,
        "DATETIME" | "TIMESTAMP" => DorisType::DateTimeV2 {
            precision: datetime_precision(length),
        },

        "CHAR" => match length.checked_mul(3) {
            Some(0) | None => DorisType::String,
            Some(len) if len <= MAX_CHAR_LENGTH => DorisType::Char { length: len },
            Some(len) if len <= MAX_VARCHAR_LENGTH => DorisType::VarChar { length: len },
            Some(_) => DorisType::String,
        },
        "VARCHAR" => match length.checked_mul(3) {
            Some(len) if len > 0 && len <= MAX_VARCHAR_LENGTH => DorisType::VarChar { length: len },
            _ => DorisType::String,
        },

        "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" | "TIME" | "TINYBLOB"
        | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => DorisType::String,

        "JSON" => DorisType::Jsonb,

        _ => return Err(TypeMappingError::UnsupportedType(type_name.to_string())),
    };

    Ok(doris_type)
}

/// Fractional-second precision for DATETIME/TIMESTAMP.
///
/// Schema history reports the fsp directly (0-6), while JDBC metadata reports
/// the display width (19, or 20 + fsp).
fn datetime_precision(length: u32) -> u32 {
    let fsp = if length <= MAX_DATETIME_PRECISION {
        length
    } else if length > 19 {
        length - 20
    } else {
        0
    };
    fsp.min(MAX_DATETIME_PRECISION)
}
