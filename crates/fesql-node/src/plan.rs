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

//! Logical plan tree.
//!
//! `PlanNode` is a closed tagged union; every node owns its children
//! exclusively, so a tree can only be observed once fully built.

use std::fmt;

use crate::expr::{exprs_string, order_string, Expr, OrderExpr};
use crate::fn_def::{FnBlock, FnBlockStmt, FnHeader};
use crate::sql::{CmdType, ColumnDesc, JoinKind};
use crate::types::{IndexDef, TableDef};
use crate::window::WindowSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanType {
    Query,
    TableScan,
    Filter,
    Group,
    Project,
    Limit,
    Join,
    Union,
    Distinct,
    Sort,
    Create,
    CreateIndex,
    Insert,
    Cmd,
    FuncDef,
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanType::Query => "kQuery",
            PlanType::TableScan => "kTableScan",
            PlanType::Filter => "kFilter",
            PlanType::Group => "kGroup",
            PlanType::Project => "kProject",
            PlanType::Limit => "kLimit",
            PlanType::Join => "kJoin",
            PlanType::Union => "kUnion",
            PlanType::Distinct => "kDistinct",
            PlanType::Sort => "kSort",
            PlanType::Create => "kCreate",
            PlanType::CreateIndex => "kCreateIndex",
            PlanType::Insert => "kInsert",
            PlanType::Cmd => "kCmd",
            PlanType::FuncDef => "kFuncDef",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    Query(QueryPlan),
    TableScan(TableScanPlan),
    Filter(FilterPlan),
    Group(GroupPlan),
    Project(ProjectPlan),
    Limit(LimitPlan),
    Join(JoinPlan),
    Union(UnionPlan),
    Distinct(DistinctPlan),
    Sort(SortPlan),
    Create(CreatePlan),
    CreateIndex(CreateIndexPlan),
    Insert(InsertPlan),
    Cmd(CmdPlan),
    FuncDef(FuncDefPlan),
}

/// Top of every query tree, and the wrapper that turns a sub-query into a
/// table source (then carrying the sub-query alias).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub alias: Option<String>,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableScanPlan {
    pub db: String,
    pub table: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterPlan {
    pub condition: Expr,
    /// HAVING filter above a group.
    pub having: bool,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupPlan {
    pub keys: Vec<Expr>,
    pub input: Box<PlanNode>,
}

/// One SELECT item placed into a project list.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectItem {
    /// Index into the original SELECT list.
    pub pos: usize,
    pub name: String,
    pub expr: Expr,
}

/// Items evaluated in one context: the current row, or one window.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectList {
    pub window: Option<WindowSpec>,
    pub projects: Vec<ProjectItem>,
}

impl ProjectList {
    pub fn is_window_agg(&self) -> bool {
        self.window.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPlan {
    /// Primary source table, empty when the source is not a plain table.
    pub table: String,
    pub project_lists: Vec<ProjectList>,
    /// `pos_mapping[i] = (list, item)` locates SELECT position `i`.
    pub pos_mapping: Vec<(usize, usize)>,
    pub input: Box<PlanNode>,
}

impl ProjectPlan {
    /// The item holding original SELECT position `pos`.
    pub fn item_at(&self, pos: usize) -> Option<&ProjectItem> {
        let (list, item) = *self.pos_mapping.get(pos)?;
        self.project_lists.get(list)?.projects.get(item)
    }

    /// Output column names in SELECT order.
    pub fn output_names(&self) -> Vec<&str> {
        (0..self.pos_mapping.len())
            .filter_map(|pos| self.item_at(pos).map(|item| item.name.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitPlan {
    pub limit: u64,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub kind: JoinKind,
    pub condition: Expr,
    /// Always set for [`JoinKind::Last`].
    pub orders: Option<Vec<OrderExpr>>,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionPlan {
    pub is_all: bool,
    pub left: Box<PlanNode>,
    pub right: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistinctPlan {
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortPlan {
    pub orders: Vec<OrderExpr>,
    pub input: Box<PlanNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePlan {
    pub table_def: TableDef,
    pub if_not_exists: bool,
    pub column_descs: Vec<ColumnDesc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexPlan {
    pub table_name: String,
    pub index: IndexDef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertPlan {
    pub db: String,
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CmdPlan {
    pub cmd: CmdType,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDefPlan {
    pub header: FnHeader,
    pub block: FnBlock,
}

impl PlanNode {
    pub fn plan_type(&self) -> PlanType {
        match self {
            PlanNode::Query(_) => PlanType::Query,
            PlanNode::TableScan(_) => PlanType::TableScan,
            PlanNode::Filter(_) => PlanType::Filter,
            PlanNode::Group(_) => PlanType::Group,
            PlanNode::Project(_) => PlanType::Project,
            PlanNode::Limit(_) => PlanType::Limit,
            PlanNode::Join(_) => PlanType::Join,
            PlanNode::Union(_) => PlanType::Union,
            PlanNode::Distinct(_) => PlanType::Distinct,
            PlanNode::Sort(_) => PlanType::Sort,
            PlanNode::Create(_) => PlanType::Create,
            PlanNode::CreateIndex(_) => PlanType::CreateIndex,
            PlanNode::Insert(_) => PlanType::Insert,
            PlanNode::Cmd(_) => PlanType::Cmd,
            PlanNode::FuncDef(_) => PlanType::FuncDef,
        }
    }

    /// Child plans in left-to-right order.
    pub fn children(&self) -> Vec<&PlanNode> {
        match self {
            PlanNode::Query(p) => vec![p.input.as_ref()],
            PlanNode::Filter(p) => vec![p.input.as_ref()],
            PlanNode::Group(p) => vec![p.input.as_ref()],
            PlanNode::Project(p) => vec![p.input.as_ref()],
            PlanNode::Limit(p) => vec![p.input.as_ref()],
            PlanNode::Distinct(p) => vec![p.input.as_ref()],
            PlanNode::Sort(p) => vec![p.input.as_ref()],
            PlanNode::Join(p) => vec![p.left.as_ref(), p.right.as_ref()],
            PlanNode::Union(p) => vec![p.left.as_ref(), p.right.as_ref()],
            PlanNode::TableScan(_)
            | PlanNode::Create(_)
            | PlanNode::CreateIndex(_)
            | PlanNode::Insert(_)
            | PlanNode::Cmd(_)
            | PlanNode::FuncDef(_) => Vec::new(),
        }
    }

    /// Pre-order search for the first node satisfying `pred`.
    pub fn find(&self, pred: &impl Fn(&PlanNode) -> bool) -> Option<&PlanNode> {
        if pred(self) {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find(pred))
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        write!(f, "{indent}+-[{}]", self.plan_type())?;
        match self {
            PlanNode::Query(p) => {
                if let Some(alias) = &p.alias {
                    write!(f, " alias={alias}")?;
                }
                writeln!(f)?;
            }
            PlanNode::TableScan(p) => {
                write!(f, " table={}", p.table)?;
                if !p.db.is_empty() {
                    write!(f, ", db={}", p.db)?;
                }
                if let Some(alias) = &p.alias {
                    write!(f, ", alias={alias}")?;
                }
                writeln!(f)?;
            }
            PlanNode::Filter(p) => {
                let tag = if p.having { "having" } else { "condition" };
                writeln!(f, " {tag}={}", p.condition)?;
            }
            PlanNode::Group(p) => writeln!(f, " keys={}", exprs_string(&p.keys))?,
            PlanNode::Project(p) => {
                writeln!(f, " table={}, lists={}", p.table, p.project_lists.len())?;
                for (i, list) in p.project_lists.iter().enumerate() {
                    match &list.window {
                        Some(w) => writeln!(f, "{indent}  list[{i}] window: {w}")?,
                        None => writeln!(f, "{indent}  list[{i}] row")?,
                    }
                    for item in &list.projects {
                        writeln!(f, "{indent}    #{} {} := {}", item.pos, item.name, item.expr)?;
                    }
                }
            }
            PlanNode::Limit(p) => writeln!(f, " limit={}", p.limit)?,
            PlanNode::Join(p) => {
                write!(f, " type={}, condition={}", p.kind, p.condition)?;
                if let Some(orders) = &p.orders {
                    write!(f, ", orders={}", order_string(orders))?;
                }
                writeln!(f)?;
            }
            PlanNode::Union(p) => writeln!(f, " all={}", p.is_all)?,
            PlanNode::Distinct(_) => writeln!(f)?,
            PlanNode::Sort(p) => writeln!(f, " orders={}", order_string(&p.orders))?,
            PlanNode::Create(p) => {
                writeln!(f, " table={}", p.table_def.name)?;
                for col in &p.table_def.columns {
                    let nn = if col.not_null { " NOT NULL" } else { "" };
                    writeln!(f, "{indent}  {} {}{nn}", col.name, col.data_type)?;
                }
                for idx in &p.table_def.indexes {
                    writeln!(
                        f,
                        "{indent}  index {} key=({}) ts={} ttl_type={} ttl={:?}",
                        idx.name,
                        idx.first_keys.join(", "),
                        idx.second_key.as_deref().unwrap_or("-"),
                        idx.ttl_type,
                        idx.ttl
                    )?;
                }
            }
            PlanNode::CreateIndex(p) => writeln!(
                f,
                " table={}, index={}, key=({})",
                p.table_name,
                p.index.name,
                p.index.first_keys.join(", ")
            )?,
            PlanNode::Insert(p) => writeln!(f, " table={}, rows={}", p.table, p.values.len())?,
            PlanNode::Cmd(p) => writeln!(f, " cmd={}, args=[{}]", p.cmd, p.args.join(", "))?,
            PlanNode::FuncDef(p) => {
                writeln!(f, " name={}", p.header.name)?;
                fmt_block(f, &p.block, depth + 1)?;
            }
        }
        for child in self.children() {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

fn fmt_block(f: &mut fmt::Formatter<'_>, block: &FnBlock, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    for stmt in &block.stmts {
        match stmt {
            FnBlockStmt::Assign(a) => {
                let ssa = if a.is_single_assignment { "" } else { " (reassign)" };
                writeln!(f, "{indent}{} = {}{ssa}", a.name, a.expr)?;
            }
            FnBlockStmt::IfElse(b) => {
                writeln!(f, "{indent}if {}:", b.if_block.cond)?;
                fmt_block(f, &b.if_block.block, depth + 1)?;
                for elif in &b.elif_blocks {
                    writeln!(f, "{indent}elif {}:", elif.cond)?;
                    fmt_block(f, &elif.block, depth + 1)?;
                }
                if let Some(els) = &b.else_block {
                    writeln!(f, "{indent}else:")?;
                    fmt_block(f, els, depth + 1)?;
                }
            }
            FnBlockStmt::ForIn(b) => {
                writeln!(f, "{indent}for {} in {}:", b.var, b.iter)?;
                fmt_block(f, &b.block, depth + 1)?;
            }
            FnBlockStmt::Return(r) => writeln!(f, "{indent}return {}", r.expr)?,
        }
    }
    Ok(())
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
