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

// UDF block flattening: `%%fun` bodies to the nested block IR.
//
// if/elif/else siblings fold into one IfElseBlock; for-in and conditional
// bodies recurse. Assignments are tagged single-assignment on the first
// binding of a name anywhere in the function.

use std::collections::HashSet;

use fesql_node::plan::FuncDefPlan;
use fesql_node::{
    AssignStmt, CondBlock, Expr, FnBlock, FnBlockStmt, FnDef, FnStmt, ForInBlock, IfElseBlock,
    ReturnStmt,
};
use tracing::debug;

use crate::{Result, SqlError};

pub fn build_fn_def_plan(def: &FnDef) -> Result<FuncDefPlan> {
    let header = &def.header;
    if header.name.is_empty() {
        return Err(SqlError::Plan("function definition without a name".into()));
    }

    let mut flattener = Flattener {
        fn_name: &header.name,
        assigned: HashSet::new(),
    };
    for param in &header.params {
        if !flattener.assigned.insert(param.name.clone()) {
            return Err(SqlError::Plan(format!(
                "function '{}': duplicate parameter '{}'",
                header.name, param.name
            )));
        }
    }

    let block = flattener.flatten(&def.body)?;
    debug!(function = %header.name, stmts = block.stmts.len(), "flattened function body");
    Ok(FuncDefPlan {
        header: header.clone(),
        block,
    })
}

struct Flattener<'a> {
    fn_name: &'a str,
    /// Names bound so far in this function: parameters, loop variables, assignments.
    assigned: HashSet<String>,
}

impl Flattener<'_> {
    fn error(&self, msg: &str) -> SqlError {
        SqlError::Plan(format!("function '{}': {msg}", self.fn_name))
    }

    fn flatten(&mut self, stmts: &[FnStmt]) -> Result<FnBlock> {
        if stmts.is_empty() {
            return Err(self.error("empty block"));
        }

        let mut out: Vec<FnBlockStmt> = Vec::with_capacity(stmts.len());
        let mut chain: Option<IfElseBlock> = None;
        let mut returned = false;

        for stmt in stmts {
            if returned {
                return Err(self.error("statement after return"));
            }
            match stmt {
                FnStmt::Elif { cond, body } => {
                    match &chain {
                        None => return Err(self.error("elif without a preceding if")),
                        Some(c) if c.else_block.is_some() => {
                            return Err(self.error("elif after else"))
                        }
                        Some(_) => {}
                    }
                    let block = self.flatten(body)?;
                    if let Some(c) = chain.as_mut() {
                        c.elif_blocks.push(CondBlock {
                            cond: cond.clone(),
                            block,
                        });
                    }
                    continue;
                }
                FnStmt::Else { body } => {
                    match &chain {
                        None => return Err(self.error("else without a preceding if")),
                        Some(c) if c.else_block.is_some() => {
                            return Err(self.error("duplicate else"))
                        }
                        Some(_) => {}
                    }
                    let block = self.flatten(body)?;
                    if let Some(c) = chain.as_mut() {
                        c.else_block = Some(block);
                    }
                    continue;
                }
                _ => {}
            }

            if let Some(c) = chain.take() {
                out.push(FnBlockStmt::IfElse(c));
            }

            match stmt {
                FnStmt::If { cond, body } => {
                    chain = Some(IfElseBlock {
                        if_block: CondBlock {
                            cond: cond.clone(),
                            block: self.flatten(body)?,
                        },
                        elif_blocks: Vec::new(),
                        else_block: None,
                    });
                }
                FnStmt::Assign { name, op, expr } => {
                    let expr = match op {
                        None => expr.clone(),
                        Some(op) => {
                            if !self.assigned.contains(name) {
                                return Err(
                                    self.error(&format!("'{name}' is used before assignment"))
                                );
                            }
                            Expr::binary(*op, Expr::column(name), expr.clone())
                        }
                    };
                    let is_single_assignment = self.assigned.insert(name.clone());
                    out.push(FnBlockStmt::Assign(AssignStmt {
                        name: name.clone(),
                        expr,
                        is_single_assignment,
                    }));
                }
                FnStmt::ForIn { var, iter, body } => {
                    self.assigned.insert(var.clone());
                    out.push(FnBlockStmt::ForIn(ForInBlock {
                        var: var.clone(),
                        iter: iter.clone(),
                        block: self.flatten(body)?,
                    }));
                }
                FnStmt::Return(expr) => {
                    out.push(FnBlockStmt::Return(ReturnStmt { expr: expr.clone() }));
                    returned = true;
                }
                FnStmt::Elif { .. } | FnStmt::Else { .. } => {
                    return Err(SqlError::Internal("unfolded elif/else arm".into()))
                }
            }
        }

        if let Some(c) = chain.take() {
            out.push(FnBlockStmt::IfElse(c));
        }
        Ok(FnBlock { stmts: out })
    }
}
