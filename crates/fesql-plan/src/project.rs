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

// Projection merging: split one SELECT list into per-window project lists and
// record where every original column ended up.

use fesql_node::{Expr, ProjectItem, ProjectList, ResTarget, WindowSpec};
use tracing::debug;

use crate::window::WindowTable;
use crate::{Result, SqlError};

/// Project lists plus `pos_mapping[i] = (list, item)` for every SELECT position.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedProjection {
    pub lists: Vec<ProjectList>,
    pub pos_mapping: Vec<(usize, usize)>,
}

/// Group the SELECT list by window.
///
/// Windows get one list each, in order of first reference; two references
/// resolving to the same spec share a list. Row-wise items form their own
/// list when the SELECT has no window at all; otherwise they are evaluated
/// alongside the first window's list, interleaved by SELECT position.
pub fn merge_projections(select_list: &[ResTarget], windows: &WindowTable) -> Result<MergedProjection> {
    let mut row_items: Vec<ProjectItem> = Vec::new();
    let mut window_lists: Vec<ProjectList> = Vec::new();

    for (pos, target) in select_list.iter().enumerate() {
        let item = ProjectItem {
            pos,
            name: target
                .alias
                .clone()
                .unwrap_or_else(|| target.expr.default_name()),
            expr: target.expr.clone(),
        };
        match window_of(&target.expr, windows)? {
            None => row_items.push(item),
            Some(spec) => {
                match window_lists
                    .iter_mut()
                    .find(|l| l.window.as_ref() == Some(&spec))
                {
                    Some(list) => list.projects.push(item),
                    None => window_lists.push(ProjectList {
                        window: Some(spec),
                        projects: vec![item],
                    }),
                }
            }
        }
    }

    let lists = match window_lists.first_mut() {
        None => vec![ProjectList {
            window: None,
            projects: row_items,
        }],
        Some(first) => {
            if !row_items.is_empty() {
                let windowed = std::mem::take(&mut first.projects);
                first.projects = merge_by_pos(windowed, row_items);
            }
            window_lists
        }
    };

    let pos_mapping = position_mapping(&lists, select_list.len())?;
    debug!(
        lists = lists.len(),
        columns = pos_mapping.len(),
        "merged projection lists"
    );
    Ok(MergedProjection { lists, pos_mapping })
}

/// The single window an expression aggregates over, if any.
fn window_of(expr: &Expr, windows: &WindowTable) -> Result<Option<WindowSpec>> {
    let mut refs = Vec::new();
    expr.walk(&mut |e| {
        if let Expr::Call { over: Some(w), .. } = e {
            refs.push(w);
        }
    });

    let mut found: Option<WindowSpec> = None;
    for w in refs {
        let spec = windows.resolve(w)?;
        match &found {
            Some(prev) if *prev != spec => {
                return Err(SqlError::Plan(format!(
                    "expression {expr} aggregates over more than one window"
                )))
            }
            Some(_) => {}
            None => found = Some(spec),
        }
    }
    Ok(found)
}

fn merge_by_pos(a: Vec<ProjectItem>, b: Vec<ProjectItem>) -> Vec<ProjectItem> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    loop {
        let take_a = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.pos < y.pos,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_a { a.next() } else { b.next() };
        out.extend(next);
    }
    out
}

fn position_mapping(lists: &[ProjectList], n: usize) -> Result<Vec<(usize, usize)>> {
    let mut mapping: Vec<Option<(usize, usize)>> = vec![None; n];
    for (li, list) in lists.iter().enumerate() {
        for (ii, item) in list.projects.iter().enumerate() {
            let slot = mapping.get_mut(item.pos).ok_or_else(|| {
                SqlError::Internal(format!("project position {} out of range", item.pos))
            })?;
            if slot.is_some() {
                return Err(SqlError::Internal(format!(
                    "project position {} assigned twice",
                    item.pos
                )));
            }
            *slot = Some((li, ii));
        }
    }
    mapping
        .into_iter()
        .enumerate()
        .map(|(pos, m)| {
            m.ok_or_else(|| SqlError::Internal(format!("project position {pos} is unassigned")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fesql_node::{BoundDef, FrameDef, FrameType, OrderExpr, WindowDef, WindowRef};

    fn window(name: &str, preceding: i64) -> WindowDef {
        WindowDef {
            name: name.into(),
            partition_by: vec![Expr::column("COL2")],
            order_by: vec![OrderExpr::asc(Expr::column("COL5"))],
            frame: Some(FrameDef {
                frame_type: FrameType::Rows,
                start: BoundDef::Preceding(Expr::int(preceding)),
                end: Some(BoundDef::CurrentRow),
            }),
            ..Default::default()
        }
    }

    fn sum_over(col: &str, w: &str) -> ResTarget {
        ResTarget::new(Expr::call_over("sum", vec![Expr::column(col)], w))
    }

    #[test]
    fn row_only_select_is_one_list() {
        let table = WindowTable::default();
        let select = vec![
            ResTarget::aliased(Expr::qualified("t1", "COL1"), "c1"),
            ResTarget::aliased(Expr::call("trim", vec![Expr::column("COL3")]), "trimCol3"),
            ResTarget::new(Expr::column("COL2")),
        ];
        let merged = merge_projections(&select, &table).unwrap();
        assert_eq!(merged.lists.len(), 1);
        assert!(!merged.lists[0].is_window_agg());
        let names: Vec<&str> = merged.lists[0]
            .projects
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["c1", "trimCol3", "COL2"]);
        assert_eq!(merged.pos_mapping, vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn interleaved_windows_keep_first_occurrence_order() {
        let table = WindowTable::from_defs(&[window("w1", 3), window("w2", 5)], None).unwrap();
        let select = vec![
            ResTarget::new(Expr::column("COL1")),
            sum_over("a", "w2"),
            sum_over("b", "w1"),
            ResTarget::new(Expr::column("COL2")),
            sum_over("c", "w2"),
        ];
        let merged = merge_projections(&select, &table).unwrap();
        assert_eq!(merged.lists.len(), 2);
        assert_eq!(merged.lists[0].window.as_ref().unwrap().start_offset(), -5);
        assert_eq!(merged.lists[1].window.as_ref().unwrap().start_offset(), -3);
        let pos0: Vec<usize> = merged.lists[0].projects.iter().map(|p| p.pos).collect();
        assert_eq!(pos0, vec![0, 1, 3, 4]);
        assert_eq!(
            merged.pos_mapping,
            vec![(0, 0), (0, 1), (1, 0), (0, 2), (0, 3)]
        );
    }

    #[test]
    fn equal_specs_share_a_list() {
        let table = WindowTable::from_defs(&[window("w1", 3), window("w2", 3)], None).unwrap();
        let select = vec![sum_over("a", "w1"), sum_over("b", "w2")];
        let merged = merge_projections(&select, &table).unwrap();
        assert_eq!(merged.lists.len(), 1);
        assert_eq!(merged.pos_mapping, vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn two_windows_in_one_expression_is_an_error() {
        let table = WindowTable::from_defs(&[window("w1", 3), window("w2", 5)], None).unwrap();
        let expr = Expr::binary(
            fesql_node::BinaryOp::Add,
            Expr::call_over("sum", vec![Expr::column("a")], "w1"),
            Expr::call_over("sum", vec![Expr::column("a")], "w2"),
        );
        let err = merge_projections(&[ResTarget::new(expr)], &table).unwrap_err();
        assert!(matches!(err, SqlError::Plan(_)));
    }

    #[test]
    fn inline_window_resolves() {
        let table = WindowTable::default();
        let expr = Expr::Call {
            name: "count".into(),
            args: vec![Expr::column("a")],
            over: Some(WindowRef::Inline(Box::new(window("", 2)))),
        };
        let merged = merge_projections(&[ResTarget::new(expr)], &table).unwrap();
        assert!(merged.lists[0].is_window_agg());
        assert_eq!(merged.lists[0].projects[0].name, "count(a) OVER (...)");
    }

    #[test]
    fn undefined_window_is_an_error() {
        let table = WindowTable::default();
        let err = merge_projections(&[sum_over("a", "nope")], &table).unwrap_err();
        assert_eq!(err, SqlError::Plan("window 'nope' is not defined".into()));
    }
}
