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

// Window & frame resolution: WINDOW clause / OVER (...) definitions to WindowSpec.

use std::collections::{HashMap, HashSet};

use fesql_node::{
    BoundDef, Const, Expr, FrameBound, FrameDef, FrameType, FrameUnit, UnaryOp, WindowDef,
    WindowRef, WindowSpec,
};
use tracing::debug;

use crate::{Result, SqlError};

/// Resolve one window definition. `primary_table` is the FROM table the
/// window runs over, if it is a plain table.
pub fn resolve_window_def(def: &WindowDef, primary_table: Option<&str>) -> Result<WindowSpec> {
    let label = if def.name.is_empty() {
        "inline window".to_string()
    } else {
        format!("window '{}'", def.name)
    };

    let (frame_type, start, end) = match &def.frame {
        Some(frame) => resolve_frame(frame, &label)?,
        None => (
            FrameType::Range,
            FrameBound::UnboundedPreceding,
            FrameBound::CurrentRow,
        ),
    };

    let time_based =
        start.unit() == Some(FrameUnit::Time) || end.unit() == Some(FrameUnit::Time);
    if time_based && def.order_by.is_empty() {
        return Err(SqlError::Plan(format!(
            "{label}: a time-based frame requires ORDER BY"
        )));
    }

    let mut seen = HashSet::new();
    for table in &def.union_tables {
        if table.is_empty() {
            return Err(SqlError::Plan(format!("{label}: empty UNION table name")));
        }
        if Some(table.as_str()) == primary_table {
            return Err(SqlError::Plan(format!(
                "{label}: UNION table '{table}' repeats the primary table"
            )));
        }
        if !seen.insert(table.as_str()) {
            return Err(SqlError::Plan(format!(
                "{label}: UNION table '{table}' listed twice"
            )));
        }
    }
    if !def.union_tables.is_empty() && def.partition_by.is_empty() {
        return Err(SqlError::Plan(format!(
            "{label}: a UNION window requires PARTITION BY"
        )));
    }

    Ok(WindowSpec {
        partition_keys: def.partition_by.clone(),
        order_keys: def.order_by.clone(),
        frame_type,
        start,
        end,
        instance_not_in_window: def.instance_not_in_window,
        union_tables: def.union_tables.clone(),
    })
}

fn resolve_frame(frame: &FrameDef, label: &str) -> Result<(FrameType, FrameBound, FrameBound)> {
    let start = resolve_bound(&frame.start, frame.frame_type, label)?;
    let end = match &frame.end {
        Some(b) => resolve_bound(b, frame.frame_type, label)?,
        None => FrameBound::CurrentRow,
    };

    if start == FrameBound::UnboundedFollowing {
        return Err(SqlError::Plan(format!(
            "{label}: frame cannot start at UNBOUNDED FOLLOWING"
        )));
    }
    if end == FrameBound::UnboundedPreceding {
        return Err(SqlError::Plan(format!(
            "{label}: frame cannot end at UNBOUNDED PRECEDING"
        )));
    }

    let comparable = match (start.unit(), end.unit()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    if comparable && start.offset() > end.offset() {
        return Err(SqlError::Plan(format!(
            "{label}: frame start ({start}) is after frame end ({end})"
        )));
    }
    Ok((frame.frame_type, start, end))
}

fn resolve_bound(bound: &BoundDef, frame_type: FrameType, label: &str) -> Result<FrameBound> {
    let (expr, sign) = match bound {
        BoundDef::UnboundedPreceding => return Ok(FrameBound::UnboundedPreceding),
        BoundDef::UnboundedFollowing => return Ok(FrameBound::UnboundedFollowing),
        BoundDef::CurrentRow => return Ok(FrameBound::CurrentRow),
        BoundDef::Preceding(e) => (e, -1),
        BoundDef::Following(e) => (e, 1),
    };

    let (magnitude, unit) = bound_magnitude(expr, label)?;
    if unit == FrameUnit::Time && frame_type == FrameType::Rows {
        return Err(SqlError::Plan(format!(
            "{label}: ROWS frame bound must be a row count, got {expr}"
        )));
    }
    if magnitude == 0 {
        return Ok(FrameBound::CurrentRow);
    }
    Ok(FrameBound::Offset {
        offset: sign * magnitude,
        unit,
    })
}

/// Non-negative magnitude of a bound: integers are row counts, durations are
/// converted to milliseconds.
fn bound_magnitude(expr: &Expr, label: &str) -> Result<(i64, FrameUnit)> {
    let (value, unit) = match expr {
        Expr::Const(Const::Int(n)) => (*n, FrameUnit::Rows),
        Expr::Const(Const::Duration { value, unit }) => {
            let ms = value.checked_mul(unit.millis()).ok_or_else(|| {
                SqlError::Plan(format!("{label}: frame bound {expr} overflows"))
            })?;
            (ms, FrameUnit::Time)
        }
        Expr::Unary {
            op: UnaryOp::Neg, ..
        } => {
            return Err(SqlError::Plan(format!(
                "{label}: frame bound {expr} must not be negative"
            )))
        }
        other => {
            return Err(SqlError::Plan(format!(
                "{label}: unsupported frame bound {other}"
            )))
        }
    };
    if value < 0 {
        return Err(SqlError::Plan(format!(
            "{label}: frame bound {expr} must not be negative"
        )));
    }
    Ok((value, unit))
}

/// Named windows of one SELECT, consulted when an OVER clause names a window.
#[derive(Debug, Default)]
pub struct WindowTable {
    windows: HashMap<String, WindowSpec>,
    primary_table: Option<String>,
}

impl WindowTable {
    pub fn from_defs(defs: &[WindowDef], primary_table: Option<&str>) -> Result<Self> {
        let mut windows = HashMap::with_capacity(defs.len());
        for def in defs {
            if def.name.is_empty() {
                return Err(SqlError::Plan("WINDOW clause entry without a name".into()));
            }
            if windows.contains_key(&def.name) {
                return Err(SqlError::Plan(format!(
                    "window '{}' is defined more than once",
                    def.name
                )));
            }
            let spec = resolve_window_def(def, primary_table)?;
            debug!(window = %def.name, spec = %spec, "registered window");
            windows.insert(def.name.clone(), spec);
        }
        Ok(WindowTable {
            windows,
            primary_table: primary_table.map(str::to_string),
        })
    }

    pub fn get(&self, name: &str) -> Option<&WindowSpec> {
        self.windows.get(name)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Resolve the window an OVER clause points at.
    pub fn resolve(&self, window: &WindowRef) -> Result<WindowSpec> {
        match window {
            WindowRef::Named(name) => self
                .get(name)
                .cloned()
                .ok_or_else(|| SqlError::Plan(format!("window '{name}' is not defined"))),
            WindowRef::Inline(def) => resolve_window_def(def, self.primary_table.as_deref()),
        }
    }
}
