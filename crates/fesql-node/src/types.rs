//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

//! Column types and the catalog-ready table definition produced by DDL planning.

use std::fmt;
use std::str::FromStr;

/// Semantic column / value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    Varchar,
    Date,
    Timestamp,
    /// `list<T>`, only meaningful for UDF parameters.
    List(Box<DataType>),
}

impl DataType {
    /// Types usable as the time (second) key of an index.
    pub fn is_ts_key(&self) -> bool {
        matches!(self, DataType::Timestamp | DataType::Int64)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => f.write_str("bool"),
            DataType::Int16 => f.write_str("i16"),
            DataType::Int32 => f.write_str("i32"),
            DataType::Int64 => f.write_str("i64"),
            DataType::Float => f.write_str("float"),
            DataType::Double => f.write_str("double"),
            DataType::Varchar => f.write_str("string"),
            DataType::Date => f.write_str("date"),
            DataType::Timestamp => f.write_str("timestamp"),
            DataType::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

/// Error returned when a type name cannot be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl fmt::Display for UnknownType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown type '{}'", self.0)
    }
}

impl std::error::Error for UnknownType {}

impl FromStr for DataType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Some(inner) = lower
            .strip_prefix("list<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let inner: DataType = inner.parse().map_err(|_| UnknownType(s.to_string()))?;
            return Ok(DataType::List(Box::new(inner)));
        }
        match lower.as_str() {
            "bool" | "boolean" => Ok(DataType::Bool),
            "i16" | "int16" | "smallint" => Ok(DataType::Int16),
            "i32" | "int32" | "int" | "integer" => Ok(DataType::Int32),
            "i64" | "int64" | "bigint" => Ok(DataType::Int64),
            "float" | "f32" | "real" => Ok(DataType::Float),
            "double" | "f64" => Ok(DataType::Double),
            "string" | "varchar" | "text" => Ok(DataType::Varchar),
            "date" => Ok(DataType::Date),
            "timestamp" => Ok(DataType::Timestamp),
            _ => Err(UnknownType(s.to_string())),
        }
    }
}

/// How an index expires rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TtlType {
    /// Rows older than `ttl[0]` milliseconds expire. `0` keeps rows forever.
    #[default]
    Absolute,
    /// Only the latest `ttl[0]` rows per key are kept.
    Latest,
    /// Expire when either the absolute or the latest bound is exceeded.
    AbsOrLat,
    /// Expire only when both bounds are exceeded.
    AbsAndLat,
}

impl TtlType {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "absolute" => Some(TtlType::Absolute),
            "latest" => Some(TtlType::Latest),
            "absorlat" => Some(TtlType::AbsOrLat),
            "absandlat" => Some(TtlType::AbsAndLat),
            _ => None,
        }
    }

    /// Number of TTL values this type takes.
    pub fn arity(self) -> usize {
        match self {
            TtlType::Absolute | TtlType::Latest => 1,
            TtlType::AbsOrLat | TtlType::AbsAndLat => 2,
        }
    }
}

impl fmt::Display for TtlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TtlType::Absolute => "absolute",
            TtlType::Latest => "latest",
            TtlType::AbsOrLat => "absorlat",
            TtlType::AbsAndLat => "absandlat",
        };
        f.write_str(s)
    }
}

/// A column of a [`TableDef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
}

/// Versioning column of an index: keep `count` versions per key, ordered by `column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexVersion {
    pub column: String,
    pub count: u32,
}

/// A (composite key, time key) index of a [`TableDef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub first_keys: Vec<String>,
    pub second_key: Option<String>,
    pub ttl_type: TtlType,
    /// Absolute bounds in milliseconds, latest bounds as row counts; ordered
    /// (absolute, latest) for the two-valued TTL types.
    pub ttl: Vec<u64>,
    pub version: Option<IndexVersion>,
}

/// Catalog-ready definition of a table, built from a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_type_names() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Int32);
        assert_eq!("BIGINT".parse::<DataType>().unwrap(), DataType::Int64);
        assert_eq!("string".parse::<DataType>().unwrap(), DataType::Varchar);
        assert_eq!(
            "list<float>".parse::<DataType>().unwrap(),
            DataType::List(Box::new(DataType::Float))
        );
        assert!("decimal".parse::<DataType>().is_err());
    }

    #[test]
    fn list_type_display() {
        let t = DataType::List(Box::new(DataType::Int32));
        assert_eq!(t.to_string(), "list<i32>");
    }
}
