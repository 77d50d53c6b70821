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

//! Planner integration tests over hand-built statement ASTs.
//!
//! Covers the dialect extensions the SQL front end cannot parse: LAST JOIN,
//! window UNION tables, index options and `%%fun` bodies.

use fesql_node::plan::{JoinPlan, LimitPlan, ProjectPlan, TableScanPlan};
use fesql_node::{
    BinaryOp, BoundDef, CmdStmt, CmdType, ColumnDesc, Const, CreateTableStmt, DataType, Expr,
    FnBlockStmt, FnDef, FnHeader, FnParam, FnStmt, FrameDef, FrameType, IndexDesc, IndexOption,
    JoinKind, JoinRef, OrderExpr, PlanNode, PlanType, QueryNode, ResTarget, SelectQuery,
    Statement, TableElement, TableRef, TimeUnit, UnionQuery, WindowDef,
};
use fesql_plan::{
    create_plan_tree, Catalog, MemoryCatalog, Planner, PlannerOptions, SqlError, StatusCode,
};

// ---------------------------------------------------------------------------
// AST helpers
// ---------------------------------------------------------------------------

fn col(name: &str) -> Expr {
    Expr::column(name)
}

fn qcol(rel: &str, name: &str) -> Expr {
    Expr::qualified(rel, name)
}

fn days(n: i64) -> Expr {
    Expr::duration(n, TimeUnit::Day)
}

fn secs(n: i64) -> Expr {
    Expr::duration(n, TimeUnit::Second)
}

fn query(select: SelectQuery) -> Statement {
    Statement::Query(QueryNode::Select(Box::new(select)))
}

fn select_from(table: &str, items: Vec<ResTarget>) -> SelectQuery {
    SelectQuery {
        select_list: items,
        from: vec![TableRef::table(table)],
        ..Default::default()
    }
}

fn window(name: &str, key: &str, start: Expr, end: BoundDef) -> WindowDef {
    WindowDef {
        name: name.into(),
        partition_by: vec![col(key)],
        order_by: vec![OrderExpr::asc(col("TS"))],
        frame: Some(FrameDef {
            frame_type: FrameType::Range,
            start: BoundDef::Preceding(start),
            end: Some(end),
        }),
        ..Default::default()
    }
}

fn over(func: &str, arg: &str, w: &str, alias: &str) -> ResTarget {
    ResTarget::aliased(Expr::call_over(func, vec![col(arg)], w), alias)
}

fn plan_one(stmt: Statement) -> PlanNode {
    let mut trees = Planner::new(PlannerOptions::default())
        .create_plan_tree(&[stmt])
        .unwrap();
    assert_eq!(trees.len(), 1);
    trees.remove(0)
}

/// Query -> Limit -> Project, returning the limit and project nodes.
fn limit_project(plan: &PlanNode) -> (&LimitPlan, &ProjectPlan) {
    let PlanNode::Query(q) = plan else {
        panic!("expected query root, got\n{plan}");
    };
    let PlanNode::Limit(limit) = q.input.as_ref() else {
        panic!("expected limit under query, got\n{plan}");
    };
    let PlanNode::Project(project) = limit.input.as_ref() else {
        panic!("expected project under limit, got\n{plan}");
    };
    (limit, project)
}

fn scan_of(node: &PlanNode) -> &TableScanPlan {
    match node {
        PlanNode::TableScan(t) => t,
        other => panic!("expected table scan, got\n{other}"),
    }
}

fn positions(project: &ProjectPlan, list: usize) -> Vec<usize> {
    project.project_lists[list]
        .projects
        .iter()
        .map(|p| p.pos)
        .collect()
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

#[test]
fn simple_select_with_limit() {
    let mut select = select_from(
        "t1",
        vec![
            ResTarget::aliased(qcol("t1", "COL1"), "c1"),
            ResTarget::aliased(Expr::call("trim", vec![col("COL3")]), "trimCol3"),
            ResTarget::new(col("COL2")),
        ],
    );
    select.limit = Some(10);
    let plan = plan_one(query(select));

    let (limit, project) = limit_project(&plan);
    assert_eq!(limit.limit, 10);
    assert_eq!(project.project_lists.len(), 1);
    assert!(project.project_lists[0].window.is_none());
    assert_eq!(positions(project, 0), vec![0, 1, 2]);
    assert_eq!(project.output_names(), vec!["c1", "trimCol3", "COL2"]);
    assert_eq!(scan_of(&project.input).table, "t1");
}

#[test]
fn window_project_with_row_bounds() {
    let mut select = select_from(
        "t",
        vec![ResTarget::new(col("COL1")), over("SUM", "AMT", "w1", "w_amt_sum")],
    );
    select.windows = vec![window(
        "w1",
        "COL2",
        Expr::int(3),
        BoundDef::Following(Expr::int(3)),
    )];
    select.limit = Some(10);
    let plan = plan_one(query(select));

    let (_, project) = limit_project(&plan);
    assert_eq!(project.project_lists.len(), 1);
    let list = &project.project_lists[0];
    assert_eq!(list.projects.len(), 2);
    assert!(list.is_window_agg());
    let w = list.window.as_ref().unwrap();
    assert_eq!(w.start_offset(), -3);
    assert_eq!(w.end_offset(), 3);
    assert_eq!(w.keys_string(), "(COL2)");
    assert_eq!(scan_of(&project.input).table, "t");
}

#[test]
fn two_windows_in_first_occurrence_order() {
    let mut select = select_from(
        "t1",
        vec![
            over("sum", "col1", "w1", "w1_col1_sum"),
            over("sum", "col1", "w2", "w2_col1_sum"),
        ],
    );
    select.windows = vec![
        window("w1", "col2", days(1), BoundDef::Preceding(secs(1))),
        window("w2", "col3", days(2), BoundDef::Preceding(secs(1))),
    ];
    select.limit = Some(10);
    let plan = plan_one(query(select));

    let (_, project) = limit_project(&plan);
    assert_eq!(project.project_lists.len(), 2);
    let w1 = project.project_lists[0].window.as_ref().unwrap();
    assert_eq!(w1.start_offset(), -86_400_000);
    assert_eq!(w1.end_offset(), -1000);
    assert_eq!(w1.keys_string(), "(col2)");
    assert!(!w1.instance_not_in_window);
    let w2 = project.project_lists[1].window.as_ref().unwrap();
    assert_eq!(w2.start_offset(), -172_800_000);
    assert_eq!(w2.end_offset(), -1000);
    assert_eq!(w2.keys_string(), "(col3)");
}

#[test]
fn window_with_union_tables() {
    let mut w = window("w1", "col1", Expr::int(3), BoundDef::CurrentRow);
    w.order_by = vec![OrderExpr::asc(col("col5"))];
    w.union_tables = vec!["t2".into(), "t3".into()];
    w.instance_not_in_window = true;

    let mut select = select_from(
        "t1",
        vec![
            ResTarget::new(col("col1")),
            ResTarget::new(col("col5")),
            over("sum", "col2", "w1", "w1_col2_sum"),
        ],
    );
    select.windows = vec![w];
    select.limit = Some(10);
    let plan = plan_one(query(select));

    let (_, project) = limit_project(&plan);
    assert_eq!(project.project_lists.len(), 1);
    let list = &project.project_lists[0];
    assert_eq!(list.projects.len(), 3);
    let spec = list.window.as_ref().unwrap();
    assert_eq!(spec.start_offset(), -3);
    assert_eq!(spec.end_offset(), 0);
    assert_eq!(spec.keys_string(), "(col1)");
    assert!(spec.instance_not_in_window);
    assert_eq!(spec.union_tables.len(), 2);
}

#[test]
fn interleaved_windows_position_mapping() {
    let udf = FnDef {
        header: FnHeader {
            name: "test_col_at".into(),
            params: vec![
                FnParam::new("col", DataType::List(Box::new(DataType::Float))),
                FnParam::new("pos", DataType::Int32),
            ],
            ret_type: DataType::Float,
        },
        body: vec![FnStmt::Return(Expr::Index {
            expr: Box::new(col("col")),
            index: Box::new(col("pos")),
        })],
    };
    let at = |i: i64, alias: &str| {
        ResTarget::aliased(
            Expr::call_over("test_col_at", vec![col("col1"), Expr::int(i)], "w2"),
            alias,
        )
    };
    let mut select = select_from(
        "t1",
        vec![
            over("sum", "col1", "w1", "w1_col1_sum"),
            over("sum", "col3", "w2", "w2_col3_sum"),
            over("sum", "col4", "w2", "w2_col4_sum"),
            ResTarget::new(col("col1")),
            over("sum", "col3", "w1", "w1_col3_sum"),
            ResTarget::new(col("col2")),
            over("sum", "col1", "w2", "w2_col1_sum"),
            at(0, "w2_col1_at_0"),
            at(1, "w2_col1_at_1"),
        ],
    );
    select.windows = vec![
        window("w1", "col2", days(1), BoundDef::Preceding(secs(1))),
        window("w2", "col3", days(2), BoundDef::Preceding(secs(1))),
    ];
    select.limit = Some(10);

    let trees = Planner::new(PlannerOptions::default())
        .create_plan_tree(&[Statement::FnDef(udf), query(select)])
        .unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].plan_type(), PlanType::FuncDef);

    let (_, project) = limit_project(&trees[1]);
    assert_eq!(project.project_lists.len(), 2);
    assert_eq!(
        project.pos_mapping,
        vec![
            (0, 0),
            (1, 0),
            (1, 1),
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 2),
            (1, 3),
            (1, 4)
        ]
    );
    assert_eq!(positions(project, 0), vec![0, 3, 4, 5]);
    assert_eq!(positions(project, 1), vec![1, 2, 6, 7, 8]);
    assert_eq!(
        project.project_lists[0].window.as_ref().unwrap().start_offset(),
        -86_400_000
    );
    assert_eq!(
        project.project_lists[1].window.as_ref().unwrap().start_offset(),
        -2 * 86_400_000
    );

    // every mapping entry points back at its own position
    for (pos, (list, item)) in project.pos_mapping.iter().enumerate() {
        assert_eq!(project.project_lists[*list].projects[*item].pos, pos);
    }
}

#[test]
fn planning_twice_is_identical() {
    let build = || {
        let mut select = select_from(
            "t1",
            vec![
                ResTarget::new(col("col1")),
                over("sum", "col2", "w2", "a"),
                over("sum", "col2", "w1", "b"),
            ],
        );
        select.windows = vec![
            window("w1", "col2", days(1), BoundDef::CurrentRow),
            window("w2", "col3", Expr::int(10), BoundDef::CurrentRow),
        ];
        query(select)
    };
    let first = plan_one(build());
    let second = plan_one(build());
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

// ---------------------------------------------------------------------------
// JOIN
// ---------------------------------------------------------------------------

fn last_join_select(order_by: Vec<OrderExpr>) -> Statement {
    let condition = Expr::binary(
        BinaryOp::And,
        Expr::binary(BinaryOp::Eq, qcol("t1", "col1"), qcol("t2", "col1")),
        Expr::Between {
            expr: Box::new(qcol("t2", "col5")),
            low: Box::new(Expr::binary(BinaryOp::Sub, qcol("t1", "col5"), days(30))),
            high: Box::new(Expr::binary(BinaryOp::Sub, qcol("t1", "col5"), days(1))),
            negated: false,
        },
    );
    let select = SelectQuery {
        select_list: vec![
            ResTarget::aliased(qcol("t1", "col1"), "t1_col1"),
            ResTarget::aliased(qcol("t2", "col1"), "t2_col2"),
        ],
        from: vec![TableRef::Join(Box::new(JoinRef {
            left: TableRef::table("t1"),
            right: TableRef::table("t2"),
            kind: JoinKind::Last,
            condition: Some(condition),
            order_by,
        }))],
        limit: Some(10),
        ..Default::default()
    };
    query(select)
}

#[test]
fn last_join_plan() {
    let plan = plan_one(last_join_select(vec![OrderExpr::asc(qcol("t2", "col5"))]));
    let (limit, project) = limit_project(&plan);
    assert_eq!(limit.limit, 10);
    assert_eq!(project.pos_mapping, vec![(0, 0), (0, 1)]);
    assert!(project.project_lists[0].window.is_none());

    let PlanNode::Join(JoinPlan {
        kind,
        condition,
        orders,
        left,
        right,
    }) = project.input.as_ref()
    else {
        panic!("expected join under project, got\n{plan}");
    };
    assert_eq!(*kind, JoinKind::Last);
    assert_eq!(
        condition.to_string(),
        "t1.col1 = t2.col1 AND t2.col5 between t1.col5 - 30d and t1.col5 - 1d"
    );
    let orders = orders.as_ref().unwrap();
    assert_eq!(fesql_node::expr::order_string(orders), "(t2.col5) ASC");
    assert_eq!(scan_of(left).table, "t1");
    assert_eq!(scan_of(right).table, "t2");
}

#[test]
fn last_join_without_order_fails() {
    let err = Planner::new(PlannerOptions::default())
        .plan_statement(&last_join_select(Vec::new()))
        .unwrap_err();
    assert_eq!(err, SqlError::Plan("LAST JOIN requires ORDER BY".into()));
}

// ---------------------------------------------------------------------------
// DDL / commands
// ---------------------------------------------------------------------------

fn create_test_table() -> Statement {
    let column = |name: &str, t: DataType| {
        TableElement::Column(ColumnDesc {
            name: name.into(),
            data_type: t,
            not_null: true,
        })
    };
    Statement::CreateTable(CreateTableStmt {
        name: "test".into(),
        if_not_exists: true,
        elements: vec![
            column("column1", DataType::Int32),
            column("column2", DataType::Timestamp),
            column("column3", DataType::Int32),
            column("column4", DataType::Varchar),
            column("column5", DataType::Int32),
            TableElement::Index(IndexDesc {
                name: None,
                options: vec![
                    IndexOption::Key(vec!["column4".into(), "column3".into()]),
                    IndexOption::Ts("column2".into()),
                    IndexOption::Ttl(vec![Const::Duration {
                        value: 60,
                        unit: TimeUnit::Day,
                    }]),
                ],
            }),
        ],
    })
}

#[test]
fn create_table_plan() {
    let PlanNode::Create(create) = plan_one(create_test_table()) else {
        panic!("expected create plan");
    };
    assert!(create.if_not_exists);
    let table = &create.table_def;
    assert_eq!(table.name, "test");
    assert_eq!(table.columns.len(), 5);
    assert_eq!(table.columns[0].data_type, DataType::Int32);
    assert_eq!(table.columns[1].data_type, DataType::Timestamp);
    assert_eq!(table.columns[3].data_type, DataType::Varchar);
    assert_eq!(table.indexes.len(), 1);
    assert_eq!(table.indexes[0].ttl, vec![60 * 86_400_000]);
    assert_eq!(table.indexes[0].first_keys, vec!["column4", "column3"]);
    assert_eq!(table.indexes[0].second_key.as_deref(), Some("column2"));
    assert_eq!(create.column_descs.len(), 5);
}

#[test]
fn cmd_plan() {
    let plan = plan_one(Statement::Cmd(CmdStmt {
        cmd: CmdType::ShowDatabases,
        args: Vec::new(),
    }));
    match plan {
        PlanNode::Cmd(cmd) => assert_eq!(cmd.cmd, CmdType::ShowDatabases),
        other => panic!("expected cmd plan, got\n{other}"),
    }
}

// ---------------------------------------------------------------------------
// %%fun
// ---------------------------------------------------------------------------

fn bin(op: BinaryOp, a: Expr, b: Expr) -> Expr {
    Expr::binary(op, a, b)
}

fn fn_header(params: &[(&str, DataType)]) -> FnHeader {
    FnHeader {
        name: "test".into(),
        params: params
            .iter()
            .map(|(n, t)| FnParam::new(n, t.clone()))
            .collect(),
        ret_type: DataType::Int32,
    }
}

fn select_with_udf() -> Statement {
    let mut select = select_from(
        "t1",
        vec![
            ResTarget::new(col("col1")),
            ResTarget::new(Expr::call("test", vec![col("col1"), col("col2")])),
        ],
    );
    select.limit = Some(1);
    query(select)
}

#[test]
fn fundef_if_else_complex() {
    let x = || col("x");
    let y = || col("y");
    let body = vec![
        FnStmt::If {
            cond: bin(BinaryOp::Gt, x(), Expr::int(1)),
            body: vec![FnStmt::assign("c", bin(BinaryOp::Add, x(), y()))],
        },
        FnStmt::Elif {
            cond: bin(BinaryOp::Gt, y(), Expr::int(1)),
            body: vec![
                FnStmt::If {
                    cond: bin(BinaryOp::Gt, bin(BinaryOp::Sub, x(), y()), Expr::int(0)),
                    body: vec![
                        FnStmt::assign("d", bin(BinaryOp::Sub, x(), y())),
                        FnStmt::assign("c", bin(BinaryOp::Add, col("d"), Expr::int(1))),
                    ],
                },
                FnStmt::Elif {
                    cond: bin(BinaryOp::Lt, bin(BinaryOp::Sub, x(), y()), Expr::int(0)),
                    body: vec![FnStmt::assign("c", bin(BinaryOp::Sub, y(), x()))],
                },
                FnStmt::Else {
                    body: vec![FnStmt::assign("c", Expr::int(9999))],
                },
            ],
        },
        FnStmt::Else {
            body: vec![
                FnStmt::If {
                    cond: bin(BinaryOp::Lt, x(), Expr::int(-100)),
                    body: vec![FnStmt::assign("c", bin(BinaryOp::Add, x(), Expr::int(100)))],
                },
                FnStmt::Elif {
                    cond: bin(BinaryOp::Lt, y(), Expr::int(-100)),
                    body: vec![FnStmt::assign("c", bin(BinaryOp::Add, y(), Expr::int(100)))],
                },
                FnStmt::Else {
                    body: vec![FnStmt::assign("c", bin(BinaryOp::Mul, x(), y()))],
                },
            ],
        },
        FnStmt::Return(col("c")),
    ];
    let def = FnDef {
        header: fn_header(&[("x", DataType::Int32), ("y", DataType::Int32)]),
        body,
    };

    let trees = Planner::new(PlannerOptions::default())
        .create_plan_tree(&[Statement::FnDef(def), select_with_udf()])
        .unwrap();
    assert_eq!(trees.len(), 2);

    let PlanNode::FuncDef(fun) = &trees[0] else {
        panic!("expected fundef plan");
    };
    let stmts = &fun.block.stmts;
    assert_eq!(stmts.len(), 2);
    assert!(matches!(stmts[1], FnBlockStmt::Return(_)));
    let FnBlockStmt::IfElse(outer) = &stmts[0] else {
        panic!("expected if/else block");
    };
    assert!(matches!(outer.if_block.cond, Expr::Binary { .. }));
    assert_eq!(outer.if_block.block.stmts.len(), 1);
    assert_eq!(outer.elif_blocks.len(), 1);

    let elif = &outer.elif_blocks[0];
    assert_eq!(elif.block.stmts.len(), 1);
    let FnBlockStmt::IfElse(inner) = &elif.block.stmts[0] else {
        panic!("expected nested if/else in elif");
    };
    let inner_if = &inner.if_block.block.stmts;
    assert_eq!(inner_if.len(), 2);
    match (&inner_if[0], &inner_if[1]) {
        (FnBlockStmt::Assign(d), FnBlockStmt::Assign(c)) => {
            assert_eq!(d.name, "d");
            assert!(d.is_single_assignment);
            assert_eq!(c.name, "c");
            assert!(!c.is_single_assignment);
        }
        other => panic!("expected two assignments, got {other:?}"),
    }
    assert_eq!(inner.elif_blocks.len(), 1);
    assert_eq!(inner.elif_blocks[0].block.stmts.len(), 1);
    assert_eq!(inner.else_block.as_ref().unwrap().stmts.len(), 1);

    let outer_else = outer.else_block.as_ref().unwrap();
    assert_eq!(outer_else.stmts.len(), 1);
    assert!(matches!(outer_else.stmts[0], FnBlockStmt::IfElse(_)));

    let (limit, _) = limit_project(&trees[1]);
    assert_eq!(limit.limit, 1);
}

#[test]
fn fundef_for_in() {
    let def = FnDef {
        header: fn_header(&[
            ("l", DataType::List(Box::new(DataType::Int32))),
            ("a", DataType::Int32),
        ]),
        body: vec![
            FnStmt::assign("sum", Expr::int(0)),
            FnStmt::ForIn {
                var: "x".into(),
                iter: col("l"),
                body: vec![FnStmt::If {
                    cond: bin(BinaryOp::Gt, col("x"), col("a")),
                    body: vec![FnStmt::assign(
                        "sum",
                        bin(BinaryOp::Add, col("sum"), col("x")),
                    )],
                }],
            },
            FnStmt::Return(col("sum")),
        ],
    };
    let trees = Planner::new(PlannerOptions::default())
        .create_plan_tree(&[Statement::FnDef(def), select_with_udf()])
        .unwrap();
    let PlanNode::FuncDef(fun) = &trees[0] else {
        panic!("expected fundef plan");
    };
    let stmts = &fun.block.stmts;
    assert_eq!(stmts.len(), 3);
    assert!(matches!(stmts[0], FnBlockStmt::Assign(_)));
    let FnBlockStmt::ForIn(for_in) = &stmts[1] else {
        panic!("expected for-in block");
    };
    assert_eq!(for_in.block.stmts.len(), 1);
    let FnBlockStmt::IfElse(cond) = &for_in.block.stmts[0] else {
        panic!("expected if block in loop");
    };
    match &cond.if_block.block.stmts[0] {
        FnBlockStmt::Assign(a) => assert!(!a.is_single_assignment),
        other => panic!("expected assignment, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Request mode
// ---------------------------------------------------------------------------

fn union_stmt() -> Statement {
    let side = |t: &str| {
        QueryNode::Select(Box::new(select_from(
            t,
            vec![ResTarget::new(col("col1")), ResTarget::new(col("col2"))],
        )))
    };
    Statement::Query(QueryNode::Union(Box::new(UnionQuery {
        left: side("t1"),
        right: side("t2"),
        is_all: false,
        order_by: Vec::new(),
        limit: None,
    })))
}

fn subquery_join_stmt() -> Statement {
    let sub = select_from(
        "tt",
        vec![ResTarget::new(col("col1")), ResTarget::new(col("col2"))],
    );
    query(SelectQuery {
        select_list: vec![ResTarget::new(col("col1")), ResTarget::new(col("col2"))],
        from: vec![TableRef::Join(Box::new(JoinRef {
            left: TableRef::table("t1"),
            right: TableRef::SubQuery {
                query: Box::new(QueryNode::Select(Box::new(sub))),
                alias: Some("t2".into()),
            },
            kind: JoinKind::Left,
            condition: Some(bin(BinaryOp::Eq, qcol("t1", "col1"), qcol("t2", "col1"))),
            order_by: Vec::new(),
        }))],
        ..Default::default()
    })
}

#[test]
fn request_mode_rejects_union_and_subquery_join() {
    for stmt in [union_stmt(), subquery_join_stmt()] {
        let (trees, status) = create_plan_tree(std::slice::from_ref(&stmt), false);
        assert_eq!(status.code, StatusCode::PlanError, "{}", status.msg);
        assert!(trees.is_empty());

        let (trees, status) = create_plan_tree(&[stmt], true);
        assert!(status.is_ok(), "{status}");
        assert_eq!(trees.len(), 1);
    }
}

#[test]
fn union_plan_shape() {
    let plan = plan_one(union_stmt());
    let PlanNode::Query(q) = &plan else {
        panic!("expected query root");
    };
    assert_eq!(q.input.plan_type(), PlanType::Union);
    let kids: Vec<PlanType> = q.input.children().iter().map(|c| c.plan_type()).collect();
    assert_eq!(kids, vec![PlanType::Project, PlanType::Project]);
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[test]
fn catalog_validates_tables() {
    let catalog = MemoryCatalog::new();
    let PlanNode::Create(create) = plan_one(create_test_table()) else {
        panic!("expected create plan");
    };
    catalog.add_table("", create.table_def);
    assert!(catalog.has_table("", "test"));

    let planner = Planner::new(PlannerOptions::default()).with_catalog(&catalog);
    let ok = query(select_from("test", vec![ResTarget::new(col("column1"))]));
    assert!(planner.plan_statement(&ok).is_ok());

    let missing = query(select_from("nope", vec![ResTarget::new(col("a"))]));
    let err = planner.plan_statement(&missing).unwrap_err();
    assert_eq!(err, SqlError::Plan("table 'nope' not found".into()));

    let mut union_window = window("w1", "column1", Expr::int(3), BoundDef::CurrentRow);
    union_window.union_tables = vec!["ghost".into()];
    let mut select = select_from("test", vec![over("sum", "column3", "w1", "s")]);
    select.windows = vec![union_window];
    assert!(planner.plan_statement(&query(select)).is_err());
}

#[test]
fn union_tables_resolve_in_from_database() {
    let table = |name: &str| fesql_node::TableDef {
        name: name.into(),
        columns: vec![
            fesql_node::ColumnDef {
                name: "a".into(),
                data_type: DataType::Int32,
                not_null: false,
            },
            fesql_node::ColumnDef {
                name: "ts".into(),
                data_type: DataType::Timestamp,
                not_null: false,
            },
        ],
        indexes: Vec::new(),
    };
    let catalog = MemoryCatalog::new();
    catalog.add_table("db1", table("t1"));
    catalog.add_table("db1", table("t2"));

    let mut w = window("w", "a", Expr::int(3), BoundDef::CurrentRow);
    w.order_by = vec![OrderExpr::asc(col("ts"))];
    w.union_tables = vec!["t2".into()];
    let select = SelectQuery {
        select_list: vec![over("sum", "a", "w", "s")],
        from: vec![TableRef::Table {
            db: Some("db1".into()),
            name: "t1".into(),
            alias: None,
        }],
        windows: vec![w],
        ..Default::default()
    };

    let planner = Planner::new(PlannerOptions::default()).with_catalog(&catalog);
    assert!(planner.plan_statement(&query(select.clone())).is_ok());

    // unqualified FROM falls back to the default database, where t2 is absent
    let mut unqualified = select;
    unqualified.from = vec![TableRef::table("t1")];
    let options = PlannerOptions {
        default_db: "db1".into(),
        ..Default::default()
    };
    assert!(Planner::new(options)
        .with_catalog(&catalog)
        .plan_statement(&query(unqualified.clone()))
        .is_ok());
    let err = planner.plan_statement(&query(unqualified)).unwrap_err();
    assert_eq!(err, SqlError::Plan("table 't1' not found".into()));
}

#[test]
fn batch_stops_at_first_failure() {
    let (trees, status) = create_plan_tree(
        &[
            create_test_table(),
            last_join_select(Vec::new()),
            select_with_udf(),
        ],
        true,
    );
    assert!(trees.is_empty());
    assert_eq!(status.code, StatusCode::PlanError);
    assert_eq!(status.msg, "LAST JOIN requires ORDER BY");
}
