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

// DDL transform: CREATE TABLE / CREATE INDEX descriptions to catalog-ready definitions.

use std::collections::HashSet;

use fesql_node::{
    ColumnDef, ColumnDesc, Const, IndexDef, IndexDesc, IndexOption, IndexVersion, TableDef,
    TableElement, TtlType,
};
use tracing::debug;

use crate::{Result, SqlError};

/// Upper bound on a latest-N ttl, in rows.
pub const MAX_LATEST_TTL: u64 = 1000;

/// Build a [`TableDef`] from the column and index elements of a CREATE TABLE.
///
/// Pure: performs no catalog access. Indexes without a name are called
/// `INDEX_<n>` by their position among the table's indexes.
pub fn transform_table_def(table_name: &str, elements: &[TableElement]) -> Result<TableDef> {
    if table_name.is_empty() {
        return Err(SqlError::Plan("CREATE TABLE requires a table name".into()));
    }

    let mut columns: Vec<ColumnDef> = Vec::new();
    let mut seen = HashSet::new();
    for desc in elements.iter().filter_map(|e| match e {
        TableElement::Column(c) => Some(c),
        TableElement::Index(_) => None,
    }) {
        if !seen.insert(desc.name.as_str()) {
            return Err(SqlError::Plan(format!(
                "table '{table_name}': duplicate column '{}'",
                desc.name
            )));
        }
        columns.push(column_def(desc));
    }
    if columns.is_empty() {
        return Err(SqlError::Plan(format!(
            "table '{table_name}' has no columns"
        )));
    }

    let mut indexes: Vec<IndexDef> = Vec::new();
    for desc in elements.iter().filter_map(|e| match e {
        TableElement::Index(i) => Some(i),
        TableElement::Column(_) => None,
    }) {
        let default_name = format!("INDEX_{}", indexes.len());
        let index = transform_index_def(desc, &default_name, Some(columns.as_slice()))?;
        if indexes.iter().any(|i| i.name == index.name) {
            return Err(SqlError::Plan(format!(
                "table '{table_name}': duplicate index '{}'",
                index.name
            )));
        }
        indexes.push(index);
    }

    debug!(
        table = table_name,
        columns = columns.len(),
        indexes = indexes.len(),
        "transformed table def"
    );
    Ok(TableDef {
        name: table_name.to_string(),
        columns,
        indexes,
    })
}

fn column_def(desc: &ColumnDesc) -> ColumnDef {
    ColumnDef {
        name: desc.name.clone(),
        data_type: desc.data_type.clone(),
        not_null: desc.not_null,
    }
}

/// Validate one `index(...)` description against the table's columns.
///
/// With `columns == None` (table schema unknown) column references are not checked.
pub fn transform_index_def(
    desc: &IndexDesc,
    default_name: &str,
    columns: Option<&[ColumnDef]>,
) -> Result<IndexDef> {
    let name = desc
        .name
        .clone()
        .unwrap_or_else(|| default_name.to_string());

    let mut first_keys: Option<Vec<String>> = None;
    let mut second_key: Option<String> = None;
    let mut ttl_values: Option<&[Const]> = None;
    let mut ttl_type: Option<TtlType> = None;
    let mut version: Option<IndexVersion> = None;

    let mut seen = HashSet::new();
    for opt in &desc.options {
        if !seen.insert(std::mem::discriminant(opt)) {
            return Err(SqlError::Plan(format!(
                "index '{name}': duplicate option '{}'",
                option_name(opt)
            )));
        }
        match opt {
            IndexOption::Key(keys) => {
                if keys.is_empty() {
                    return Err(SqlError::Plan(format!("index '{name}': empty key")));
                }
                for k in keys {
                    find_column(columns, &name, k)?;
                }
                first_keys = Some(keys.clone());
            }
            IndexOption::Ts(ts) => {
                if let Some(col) = find_column(columns, &name, ts)? {
                    if !col.data_type.is_ts_key() {
                        return Err(SqlError::Plan(format!(
                            "index '{name}': ts column '{ts}' must be timestamp or bigint, got {}",
                            col.data_type
                        )));
                    }
                }
                second_key = Some(ts.clone());
            }
            IndexOption::Ttl(values) => ttl_values = Some(values.as_slice()),
            IndexOption::TtlType(t) => {
                ttl_type = Some(TtlType::parse(t).ok_or_else(|| {
                    SqlError::Plan(format!("index '{name}': unknown ttl_type '{t}'"))
                })?);
            }
            IndexOption::Version(col, count) => {
                find_column(columns, &name, col)?;
                let count = match count {
                    None => 1,
                    Some(n) => u32::try_from(*n).map_err(|_| {
                        SqlError::Plan(format!("index '{name}': invalid version count {n}"))
                    })?,
                };
                version = Some(IndexVersion {
                    column: col.clone(),
                    count,
                });
            }
        }
    }

    let first_keys =
        first_keys.ok_or_else(|| SqlError::Plan(format!("index '{name}': missing key")))?;
    let (ttl_type, ttl) = resolve_ttl(&name, ttl_type, ttl_values.unwrap_or(&[]))?;

    Ok(IndexDef {
        name,
        first_keys,
        second_key,
        ttl_type,
        ttl,
        version,
    })
}

fn option_name(opt: &IndexOption) -> &'static str {
    match opt {
        IndexOption::Key(_) => "key",
        IndexOption::Ts(_) => "ts",
        IndexOption::Ttl(_) => "ttl",
        IndexOption::TtlType(_) => "ttl_type",
        IndexOption::Version(..) => "version",
    }
}

fn find_column<'a>(
    columns: Option<&'a [ColumnDef]>,
    index: &str,
    col: &str,
) -> Result<Option<&'a ColumnDef>> {
    let Some(columns) = columns else {
        return Ok(None);
    };
    columns
        .iter()
        .find(|c| c.name == col)
        .map(Some)
        .ok_or_else(|| SqlError::Plan(format!("index '{index}': unknown column '{col}'")))
}

/// Without an explicit `ttl_type` the kind follows the literal: a duration is
/// absolute, an integer keeps the latest N rows. No TTL at all means keep forever.
fn resolve_ttl(index: &str, ttl_type: Option<TtlType>, values: &[Const]) -> Result<(TtlType, Vec<u64>)> {
    let ttl_type = match (ttl_type, values) {
        (Some(t), _) => t,
        (None, []) => return Ok((TtlType::Absolute, vec![0])),
        (None, [Const::Int(_)]) => TtlType::Latest,
        (None, [_]) => TtlType::Absolute,
        (None, _) => {
            return Err(SqlError::Plan(format!(
                "index '{index}': multiple ttl values require ttl_type"
            )))
        }
    };

    if values.is_empty() {
        return Ok((ttl_type, vec![0; ttl_type.arity()]));
    }
    if values.len() != ttl_type.arity() {
        return Err(SqlError::Plan(format!(
            "index '{index}': ttl_type {ttl_type} takes {} ttl value(s), got {}",
            ttl_type.arity(),
            values.len()
        )));
    }

    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let absolute = match ttl_type {
            TtlType::Absolute => true,
            TtlType::Latest => false,
            TtlType::AbsOrLat | TtlType::AbsAndLat => i == 0,
        };
        out.push(ttl_value(index, v, absolute)?);
    }
    Ok((ttl_type, out))
}

fn ttl_value(index: &str, lit: &Const, absolute: bool) -> Result<u64> {
    let raw = match (lit, absolute) {
        (Const::Duration { value, unit }, true) => value.checked_mul(unit.millis()),
        (Const::Int(n), _) => Some(*n),
        (Const::Duration { .. }, false) => {
            return Err(SqlError::Plan(format!(
                "index '{index}': latest ttl must be a row count, got {lit}"
            )))
        }
        (other, _) => {
            return Err(SqlError::Plan(format!(
                "index '{index}': invalid ttl value {other}"
            )))
        }
    };
    let raw = raw.ok_or_else(|| SqlError::Plan(format!("index '{index}': ttl {lit} overflows")))?;
    let ttl = u64::try_from(raw)
        .map_err(|_| SqlError::Plan(format!("index '{index}': ttl must not be negative")))?;
    if !absolute && ttl > MAX_LATEST_TTL {
        return Err(SqlError::Plan(format!(
            "index '{index}': latest ttl {ttl} exceeds {MAX_LATEST_TTL} rows"
        )));
    }
    Ok(ttl)
}
