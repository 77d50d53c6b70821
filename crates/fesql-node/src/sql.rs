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

//! Parsed statement AST: the input boundary of the planner.
//!
//! Values of these types are produced by a parser (see `fesql_plan::frontend`)
//! or built directly by callers for dialect extensions such as `LAST JOIN`.

use crate::expr::{Const, Expr, OrderExpr};
use crate::fn_def::FnDef;
use crate::types::DataType;

/// One top-level statement of a SQL script.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Query(QueryNode),
    CreateTable(CreateTableStmt),
    CreateIndex(CreateIndexStmt),
    Insert(InsertStmt),
    Cmd(CmdStmt),
    /// `%%fun` block.
    FnDef(FnDef),
}

impl Statement {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Query(_) => "query",
            Statement::CreateTable(_) => "create table",
            Statement::CreateIndex(_) => "create index",
            Statement::Insert(_) => "insert",
            Statement::Cmd(_) => "cmd",
            Statement::FnDef(_) => "fundef",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    Select(Box<SelectQuery>),
    Union(Box<UnionQuery>),
}

/// `left UNION [ALL] right [ORDER BY ...] [LIMIT n]`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionQuery {
    pub left: QueryNode,
    pub right: QueryNode,
    pub is_all: bool,
    pub order_by: Vec<OrderExpr>,
    pub limit: Option<i64>,
}

/// A SELECT list item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResTarget {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl ResTarget {
    pub fn new(expr: Expr) -> Self {
        ResTarget { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: &str) -> Self {
        ResTarget {
            expr,
            alias: Some(alias.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectQuery {
    pub distinct: bool,
    pub select_list: Vec<ResTarget>,
    /// More than one entry is the comma-join form, which the planner rejects.
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    /// Named `WINDOW` definitions, in declaration order.
    pub windows: Vec<WindowDef>,
    pub order_by: Vec<OrderExpr>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    /// One most-recent right row per left row, ordered by the join's ORDER BY.
    Last,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JoinKind::Inner => "InnerJoin",
            JoinKind::Left => "LeftJoin",
            JoinKind::Right => "RightJoin",
            JoinKind::Full => "FullJoin",
            JoinKind::Last => "LastJoin",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinRef {
    pub left: TableRef,
    pub right: TableRef,
    pub kind: JoinKind,
    pub condition: Option<Expr>,
    pub order_by: Vec<OrderExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableRef {
    Table {
        db: Option<String>,
        name: String,
        alias: Option<String>,
    },
    Join(Box<JoinRef>),
    SubQuery {
        query: Box<QueryNode>,
        alias: Option<String>,
    },
}

impl TableRef {
    pub fn table(name: &str) -> Self {
        TableRef::Table {
            db: None,
            name: name.to_string(),
            alias: None,
        }
    }

    pub fn aliased(name: &str, alias: &str) -> Self {
        TableRef::Table {
            db: None,
            name: name.to_string(),
            alias: Some(alias.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Rows,
    Range,
    RowsRange,
}

/// A frame bound as written, before unit resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundDef {
    UnboundedPreceding,
    Preceding(Expr),
    CurrentRow,
    Following(Expr),
    UnboundedFollowing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameDef {
    pub frame_type: FrameType,
    pub start: BoundDef,
    /// `None` for the single-bound form `ROWS 3 PRECEDING`, which ends at the current row.
    pub end: Option<BoundDef>,
}

/// A window as written in a `WINDOW` clause or an inline `OVER (...)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDef {
    /// Empty for inline windows.
    pub name: String,
    pub union_tables: Vec<String>,
    pub partition_by: Vec<Expr>,
    pub order_by: Vec<OrderExpr>,
    pub frame: Option<FrameDef>,
    pub instance_not_in_window: bool,
}

/// `CREATE TABLE [IF NOT EXISTS] name (elements...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub name: String,
    pub if_not_exists: bool,
    pub elements: Vec<TableElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableElement {
    Column(ColumnDesc),
    Index(IndexDesc),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
}

impl ColumnDesc {
    pub fn new(name: &str, data_type: DataType) -> Self {
        ColumnDesc {
            name: name.to_string(),
            data_type,
            not_null: false,
        }
    }
}

/// `index([name,] key=..., ts=..., ttl=..., ...)`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexDesc {
    pub name: Option<String>,
    pub options: Vec<IndexOption>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexOption {
    Key(Vec<String>),
    Ts(String),
    Ttl(Vec<Const>),
    TtlType(String),
    /// `version=col` or `version=(col, n)`
    Version(String, Option<i64>),
}

/// `CREATE INDEX name ON table (options...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub index_name: String,
    pub table_name: String,
    pub index: IndexDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub db: Option<String>,
    pub table: String,
    /// Empty means all columns in table order.
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmdType {
    CreateDatabase,
    UseDatabase,
    ShowDatabases,
    ShowTables,
    DescTable,
    DropTable,
    DropIndex,
    DropDatabase,
}

impl CmdType {
    /// Number of string arguments the command expects.
    pub fn arity(self) -> usize {
        match self {
            CmdType::ShowDatabases | CmdType::ShowTables => 0,
            CmdType::CreateDatabase
            | CmdType::UseDatabase
            | CmdType::DescTable
            | CmdType::DropTable
            | CmdType::DropDatabase => 1,
            CmdType::DropIndex => 2,
        }
    }
}

impl std::fmt::Display for CmdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmdType::CreateDatabase => "create database",
            CmdType::UseDatabase => "use database",
            CmdType::ShowDatabases => "show databases",
            CmdType::ShowTables => "show tables",
            CmdType::DescTable => "desc table",
            CmdType::DropTable => "drop table",
            CmdType::DropIndex => "drop index",
            CmdType::DropDatabase => "drop database",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmdStmt {
    pub cmd: CmdType,
    pub args: Vec<String>,
}
