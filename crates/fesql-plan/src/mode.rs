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

// Request-mode validation: plan shapes a single-row serving path cannot run.

use fesql_node::PlanNode;
use tracing::debug;

use crate::{Result, SqlError};

/// Reject UNION anywhere in the tree, and joins whose right side is more
/// than a bare table scan. Batch mode accepts every shape.
pub fn validate_plan_mode(plan: &PlanNode, is_batch_mode: bool) -> Result<()> {
    if is_batch_mode {
        return Ok(());
    }
    check_request(plan)
}

fn check_request(plan: &PlanNode) -> Result<()> {
    match plan {
        PlanNode::Union(_) => {
            debug!("request mode rejected union");
            return Err(SqlError::Plan(
                "UNION is not supported in request mode".into(),
            ));
        }
        PlanNode::Join(join) if !is_bare_source(&join.right) => {
            debug!(kind = %join.kind, "request mode rejected join");
            return Err(SqlError::Plan(format!(
                "{} with a sub-query on the right side is not supported in request mode",
                join.kind
            )));
        }
        _ => {}
    }
    plan.children().into_iter().try_for_each(check_request)
}

fn is_bare_source(plan: &PlanNode) -> bool {
    match plan {
        PlanNode::TableScan(_) => true,
        PlanNode::Query(q) => matches!(q.input.as_ref(), PlanNode::TableScan(_)),
        _ => false,
    }
}
