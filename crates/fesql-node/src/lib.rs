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

// fesql-node: node model shared by the fesql planner.
//
// Holds the parsed statement AST the planner consumes, the expression
// nodes, the UDF body AST and its flattened IR, and the logical plan tree
// the planner produces. No planning logic lives here.

pub mod expr;
pub mod fn_def;
pub mod plan;
pub mod sql;
pub mod types;
pub mod window;

pub use expr::{BinaryOp, Const, Expr, OrderExpr, TimeUnit, UnaryOp, WindowRef};
pub use fn_def::{
    AssignStmt, CondBlock, FnBlock, FnBlockStmt, FnDef, FnHeader, FnParam, FnStmt, ForInBlock,
    IfElseBlock, ReturnStmt,
};
pub use plan::{PlanNode, PlanType, ProjectItem, ProjectList, ProjectPlan};
pub use sql::{
    BoundDef, CmdStmt, CmdType, ColumnDesc, CreateIndexStmt, CreateTableStmt, FrameDef, FrameType,
    IndexDesc, IndexOption, InsertStmt, JoinKind, JoinRef, QueryNode, ResTarget, SelectQuery,
    Statement, TableElement, TableRef, UnionQuery, WindowDef,
};
pub use types::{ColumnDef, DataType, IndexDef, IndexVersion, TableDef, TtlType};
pub use window::{FrameBound, FrameUnit, WindowSpec};
