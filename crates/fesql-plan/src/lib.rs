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

// fesql-plan: logical planner for fesql SQL scripts.
//
// Turns parsed statements (fesql-node AST) into logical plan trees:
// window resolution, projection merging, join/union/DDL translation,
// UDF block flattening and request-mode validation.

pub mod catalog;
pub mod ddl;
pub mod frontend;
pub mod mode;
pub mod planner;
pub mod project;
pub mod udf;
pub mod window;

use std::fmt;

use fesql_node::{PlanNode, Statement};
use thiserror::Error;

pub use catalog::{Catalog, MemoryCatalog};
pub use ddl::{transform_index_def, transform_table_def};
pub use planner::Planner;

/// Errors produced by the SQL layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SqlError {
    /// SQL syntax error from the front end.
    #[error("SQL parse error: {0}")]
    Parse(String),
    /// Planning error (bad window bounds, missing LAST JOIN order, invalid DDL, ...).
    #[error("SQL planning error: {0}")]
    Plan(String),
    /// Unreachable planner state; a bug, not bad input.
    #[error("internal planner error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SqlError>;

/// Numeric status codes of the status-style boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    ParseError = 1,
    PlanError = 2,
    InternalError = 3,
}

/// Code plus message, as returned by [`create_plan_tree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: StatusCode,
    pub msg: String,
}

impl Status {
    pub fn ok() -> Self {
        Status {
            code: StatusCode::Ok,
            msg: "ok".to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok
    }
}

impl From<&SqlError> for Status {
    fn from(err: &SqlError) -> Self {
        let (code, msg) = match err {
            SqlError::Parse(m) => (StatusCode::ParseError, m),
            SqlError::Plan(m) => (StatusCode::PlanError, m),
            SqlError::Internal(m) => (StatusCode::InternalError, m),
        };
        Status {
            code,
            msg: msg.clone(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code as i32, self.msg)
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Batch mode allows UNION and sub-query join sources; request
    /// (single-row serving) mode rejects them.
    pub is_batch_mode: bool,
    /// Database assigned to unqualified table references.
    pub default_db: String,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        PlannerOptions {
            is_batch_mode: true,
            default_db: String::new(),
        }
    }
}

impl PlannerOptions {
    pub fn request_mode() -> Self {
        PlannerOptions {
            is_batch_mode: false,
            ..Default::default()
        }
    }
}

/// Plan a batch of statements, reporting failure through a [`Status`].
///
/// On failure the returned tree list is empty.
pub fn create_plan_tree(statements: &[Statement], is_batch_mode: bool) -> (Vec<PlanNode>, Status) {
    let options = PlannerOptions {
        is_batch_mode,
        ..Default::default()
    };
    match Planner::new(options).create_plan_tree(statements) {
        Ok(trees) => (trees, Status::ok()),
        Err(err) => (Vec::new(), Status::from(&err)),
    }
}
