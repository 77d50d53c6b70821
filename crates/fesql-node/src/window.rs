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

//! Canonical window specification produced by the window resolver.

use crate::expr::{exprs_string, order_string, Expr, OrderExpr};
use crate::sql::FrameType;

/// Unit of a resolved frame offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameUnit {
    /// Row count.
    Rows,
    /// Milliseconds.
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameBound {
    UnboundedPreceding,
    /// Signed offset from the current row: negative precedes, positive follows.
    Offset { offset: i64, unit: FrameUnit },
    CurrentRow,
    UnboundedFollowing,
}

impl FrameBound {
    pub fn offset(&self) -> i64 {
        match self {
            FrameBound::UnboundedPreceding => i64::MIN,
            FrameBound::Offset { offset, .. } => *offset,
            FrameBound::CurrentRow => 0,
            FrameBound::UnboundedFollowing => i64::MAX,
        }
    }

    /// `None` for bounds that are valid in any unit.
    pub fn unit(&self) -> Option<FrameUnit> {
        match self {
            FrameBound::Offset { unit, .. } => Some(*unit),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameBound::UnboundedPreceding => f.write_str("UNBOUNDED PRECEDING"),
            FrameBound::UnboundedFollowing => f.write_str("UNBOUNDED FOLLOWING"),
            FrameBound::CurrentRow => f.write_str("CURRENT ROW"),
            FrameBound::Offset { offset, unit } => {
                let dir = if *offset < 0 { "PRECEDING" } else { "FOLLOWING" };
                let suffix = match unit {
                    FrameUnit::Rows => "",
                    FrameUnit::Time => "ms",
                };
                write!(f, "{}{suffix} {dir}", offset.unsigned_abs())
            }
        }
    }
}

/// A resolved window. Two windows are the same execution context iff their
/// specs compare equal; the name a query used is not part of the spec.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub partition_keys: Vec<Expr>,
    pub order_keys: Vec<OrderExpr>,
    pub frame_type: FrameType,
    pub start: FrameBound,
    pub end: FrameBound,
    pub instance_not_in_window: bool,
    /// Additional source tables; the primary table is implicit.
    pub union_tables: Vec<String>,
}

impl WindowSpec {
    pub fn start_offset(&self) -> i64 {
        self.start.offset()
    }

    pub fn end_offset(&self) -> i64 {
        self.end.offset()
    }

    /// `(COL2)`
    pub fn keys_string(&self) -> String {
        exprs_string(&self.partition_keys)
    }

    pub fn orders_string(&self) -> String {
        order_string(&self.order_keys)
    }
}

impl std::fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = match self.frame_type {
            FrameType::Rows => "ROWS",
            FrameType::Range => "RANGE",
            FrameType::RowsRange => "ROWS_RANGE",
        };
        write!(
            f,
            "partition_keys={}, orders={}, frame={frame}({}, {})",
            self.keys_string(),
            self.orders_string(),
            self.start,
            self.end
        )?;
        if !self.union_tables.is_empty() {
            write!(f, ", union=({})", self.union_tables.join(", "))?;
        }
        if self.instance_not_in_window {
            f.write_str(", instance_not_in_window")?;
        }
        Ok(())
    }
}
