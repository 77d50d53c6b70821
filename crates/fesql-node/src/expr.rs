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

//! Expression nodes shared by the SQL AST, the UDF AST and the plan tree.

use std::fmt;

use crate::sql::WindowDef;
use crate::types::DataType;

/// Unit of a duration literal such as `30d` or `1s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    pub fn millis(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Day => 86_400_000,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Millisecond => "ms",
            TimeUnit::Second => "s",
            TimeUnit::Minute => "m",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
        }
    }

    /// Accepts both literal suffixes (`d`, `ms`) and spelled-out names (`day`, `seconds`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "ms" | "millisecond" | "milliseconds" => Some(TimeUnit::Millisecond),
            "s" | "second" | "seconds" => Some(TimeUnit::Second),
            "m" | "minute" | "minutes" => Some(TimeUnit::Minute),
            "h" | "hour" | "hours" => Some(TimeUnit::Hour),
            "d" | "day" | "days" => Some(TimeUnit::Day),
            _ => None,
        }
    }

    /// Parse `"3d"`, `"1 s"` or `"2 days"` into `(value, unit)`.
    pub fn parse_duration(text: &str) -> Option<(i64, TimeUnit)> {
        let text = text.trim();
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let value = digits.parse::<i64>().ok()?;
        let unit = TimeUnit::from_name(unit)?;
        Some((value, unit))
    }
}

/// Literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Duration { value: i64, unit: TimeUnit },
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Null => f.write_str("null"),
            Const::Bool(b) => write!(f, "{b}"),
            Const::Int(i) => write!(f, "{i}"),
            Const::Float(v) => write!(f, "{v}"),
            Const::String(s) => write!(f, "{s}"),
            Const::Duration { value, unit } => write!(f, "{value}{}", unit.suffix()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Like,
}

impl BinaryOp {
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::Like => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 5,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Like => "LIKE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderExpr {
    pub expr: Expr,
    pub asc: bool,
}

impl OrderExpr {
    pub fn asc(expr: Expr) -> Self {
        OrderExpr { expr, asc: true }
    }
}

/// What an OVER clause points at.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowRef {
    /// `OVER w1`, resolved against the WINDOW clause.
    Named(String),
    /// `OVER (PARTITION BY ...)`.
    Inline(Box<WindowDef>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column {
        relation: Option<String>,
        name: String,
    },
    /// `*` or `t.*`
    All {
        relation: Option<String>,
    },
    Const(Const),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
        negated: bool,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
    Cast {
        expr: Box<Expr>,
        data_type: DataType,
    },
    Case {
        operand: Option<Box<Expr>>,
        branches: Vec<(Expr, Expr)>,
        else_result: Option<Box<Expr>>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
        over: Option<WindowRef>,
    },
    /// `col[pos]`
    Index {
        expr: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Expr {
    pub fn column(name: &str) -> Self {
        Expr::Column {
            relation: None,
            name: name.to_string(),
        }
    }

    pub fn qualified(relation: &str, name: &str) -> Self {
        Expr::Column {
            relation: Some(relation.to_string()),
            name: name.to_string(),
        }
    }

    pub fn int(v: i64) -> Self {
        Expr::Const(Const::Int(v))
    }

    pub fn duration(value: i64, unit: TimeUnit) -> Self {
        Expr::Const(Const::Duration { value, unit })
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.to_string(),
            args,
            over: None,
        }
    }

    /// `name(args) OVER window`
    pub fn call_over(name: &str, args: Vec<Expr>, window: &str) -> Self {
        Expr::Call {
            name: name.to_string(),
            args,
            over: Some(WindowRef::Named(window.to_string())),
        }
    }

    /// Direct sub-expressions, in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Column { .. } | Expr::All { .. } | Expr::Const(_) => Vec::new(),
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Unary { expr, .. } | Expr::IsNull { expr, .. } | Expr::Cast { expr, .. } => {
                vec![expr.as_ref()]
            }
            Expr::Between {
                expr, low, high, ..
            } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            Expr::InList { expr, list, .. } => {
                let mut out: Vec<&Expr> = vec![expr.as_ref()];
                out.extend(list.iter());
                out
            }
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                let mut out = Vec::new();
                if let Some(op) = operand {
                    out.push(op.as_ref());
                }
                for (when, then) in branches {
                    out.push(when);
                    out.push(then);
                }
                if let Some(e) = else_result {
                    out.push(e.as_ref());
                }
                out
            }
            Expr::Call { args, .. } => args.iter().collect(),
            Expr::Index { expr, index } => vec![expr.as_ref(), index.as_ref()],
        }
    }

    /// Pre-order walk over this expression and all sub-expressions.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Output column name used when a SELECT item carries no alias.
    pub fn default_name(&self) -> String {
        match self {
            Expr::Column { name, .. } => name.clone(),
            Expr::All { .. } => "*".to_string(),
            other => other.to_string(),
        }
    }

    /// Operators are printed left-associative, so a right operand of equal
    /// precedence needs parentheses to keep its grouping.
    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: BinaryOp, right: bool) -> fmt::Result {
        match self {
            Expr::Binary { op, .. }
                if op.precedence() < parent.precedence()
                    || (right && op.precedence() == parent.precedence()) =>
            {
                write!(f, "({self})")
            }
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column { relation, name } => match relation {
                Some(rel) => write!(f, "{rel}.{name}"),
                None => f.write_str(name),
            },
            Expr::All { relation } => match relation {
                Some(rel) => write!(f, "{rel}.*"),
                None => f.write_str("*"),
            },
            Expr::Const(c) => write!(f, "{c}"),
            Expr::Binary { op, left, right } => {
                left.fmt_operand(f, *op, false)?;
                write!(f, " {op} ")?;
                right.fmt_operand(f, *op, true)
            }
            Expr::Unary { op, expr } => match op {
                UnaryOp::Not => write!(f, "NOT {expr}"),
                UnaryOp::Neg => write!(f, "-{expr}"),
            },
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                let not = if *negated { "not " } else { "" };
                write!(f, "{expr} {not}between {low} and {high}")
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                let not = if *negated { "NOT " } else { "" };
                write!(f, "{expr} {not}IN {}", exprs_string(list))
            }
            Expr::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{expr} IS NOT NULL")
                } else {
                    write!(f, "{expr} IS NULL")
                }
            }
            Expr::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
            Expr::Case {
                operand,
                branches,
                else_result,
            } => {
                f.write_str("CASE")?;
                if let Some(op) = operand {
                    write!(f, " {op}")?;
                }
                for (when, then) in branches {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(e) = else_result {
                    write!(f, " ELSE {e}")?;
                }
                f.write_str(" END")
            }
            Expr::Call { name, args, over } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", args.join(", "))?;
                match over {
                    Some(WindowRef::Named(w)) => write!(f, " OVER {w}"),
                    Some(WindowRef::Inline(_)) => f.write_str(" OVER (...)"),
                    None => Ok(()),
                }
            }
            Expr::Index { expr, index } => write!(f, "{expr}[{index}]"),
        }
    }
}

/// `(a, b, c)`
pub fn exprs_string(exprs: &[Expr]) -> String {
    let parts: Vec<String> = exprs.iter().map(|e| e.to_string()).collect();
    format!("({})", parts.join(", "))
}

/// `(a, b) ASC` when all keys share a direction, `(a ASC, b DESC)` otherwise.
pub fn order_string(orders: &[OrderExpr]) -> String {
    let dir = |asc: bool| if asc { "ASC" } else { "DESC" };
    match orders.first() {
        None => "()".to_string(),
        Some(first) if orders.iter().all(|o| o.asc == first.asc) => {
            let keys: Vec<Expr> = orders.iter().map(|o| o.expr.clone()).collect();
            format!("{} {}", exprs_string(&keys), dir(first.asc))
        }
        Some(_) => {
            let parts: Vec<String> = orders
                .iter()
                .map(|o| format!("{} {}", o.expr, dir(o.asc)))
                .collect();
            format!("({})", parts.join(", "))
        }
    }
}
