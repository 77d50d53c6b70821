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

//! User-defined function (`%%fun`) AST and the block-structured IR it is flattened into.

use crate::expr::{BinaryOp, Expr};
use crate::types::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct FnParam {
    pub name: String,
    pub data_type: DataType,
}

impl FnParam {
    pub fn new(name: &str, data_type: DataType) -> Self {
        FnParam {
            name: name.to_string(),
            data_type,
        }
    }
}

/// `def name(params):ret_type`
#[derive(Debug, Clone, PartialEq)]
pub struct FnHeader {
    pub name: String,
    pub params: Vec<FnParam>,
    pub ret_type: DataType,
}

/// One statement of a function body as parsed.
///
/// `elif` and `else` arms arrive as siblings following their `if`; the
/// flattener folds them into one [`IfElseBlock`].
#[derive(Debug, Clone, PartialEq)]
pub enum FnStmt {
    /// `name = expr`, or `name op= expr` when `op` is set.
    Assign {
        name: String,
        op: Option<BinaryOp>,
        expr: Expr,
    },
    If {
        cond: Expr,
        body: Vec<FnStmt>,
    },
    Elif {
        cond: Expr,
        body: Vec<FnStmt>,
    },
    Else {
        body: Vec<FnStmt>,
    },
    ForIn {
        var: String,
        iter: Expr,
        body: Vec<FnStmt>,
    },
    Return(Expr),
}

impl FnStmt {
    pub fn assign(name: &str, expr: Expr) -> Self {
        FnStmt::Assign {
            name: name.to_string(),
            op: None,
            expr,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub header: FnHeader,
    pub body: Vec<FnStmt>,
}

/// A flattened statement sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FnBlock {
    pub stmts: Vec<FnBlockStmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FnBlockStmt {
    Assign(AssignStmt),
    IfElse(IfElseBlock),
    ForIn(ForInBlock),
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub name: String,
    pub expr: Expr,
    /// First binding of `name` in the function scope.
    pub is_single_assignment: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondBlock {
    pub cond: Expr,
    pub block: FnBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfElseBlock {
    pub if_block: CondBlock,
    pub elif_blocks: Vec<CondBlock>,
    pub else_block: Option<FnBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInBlock {
    pub var: String,
    pub iter: Expr,
    pub block: FnBlock,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub expr: Expr,
}
