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

// Plan-tree builder: statements to logical plan trees.

use fesql_node::plan::{
    CmdPlan, CreateIndexPlan, CreatePlan, DistinctPlan, FilterPlan, GroupPlan, InsertPlan,
    JoinPlan, LimitPlan, ProjectPlan, QueryPlan, SortPlan, TableScanPlan, UnionPlan,
};
use fesql_node::{
    CmdStmt, CreateIndexStmt, CreateTableStmt, Expr, InsertStmt, JoinKind, JoinRef, OrderExpr,
    PlanNode, QueryNode, SelectQuery, Statement, TableElement, TableRef, UnionQuery,
};
use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::ddl::{transform_index_def, transform_table_def};
use crate::mode::validate_plan_mode;
use crate::project::merge_projections;
use crate::udf::build_fn_def_plan;
use crate::window::WindowTable;
use crate::{PlannerOptions, Result, SqlError};

/// Stateless planner. Each call builds fresh trees; nothing is retained
/// between calls, so one planner may be shared across threads.
pub struct Planner<'a> {
    options: PlannerOptions,
    catalog: Option<&'a dyn Catalog>,
}

impl<'a> Planner<'a> {
    pub fn new(options: PlannerOptions) -> Self {
        Planner {
            options,
            catalog: None,
        }
    }

    /// Validate table references against `catalog`.
    pub fn with_catalog(mut self, catalog: &'a dyn Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }

    /// Plan every statement in order. The first failure aborts the batch.
    pub fn create_plan_tree(&self, statements: &[Statement]) -> Result<Vec<PlanNode>> {
        statements.iter().map(|s| self.plan_statement(s)).collect()
    }

    /// Plan one statement: either a complete tree or an error.
    pub fn plan_statement(&self, stmt: &Statement) -> Result<PlanNode> {
        debug!(
            kind = stmt.kind_name(),
            batch = self.options.is_batch_mode,
            "planning statement"
        );
        let plan = match stmt {
            Statement::Query(query) => self.build_query(query, None)?,
            Statement::CreateTable(create) => self.build_create(create)?,
            Statement::CreateIndex(create) => self.build_create_index(create)?,
            Statement::Insert(insert) => self.build_insert(insert)?,
            Statement::Cmd(cmd) => build_cmd(cmd)?,
            Statement::FnDef(def) => PlanNode::FuncDef(build_fn_def_plan(def)?),
        };
        validate_plan_mode(&plan, self.options.is_batch_mode)?;
        Ok(plan)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn build_query(&self, query: &QueryNode, alias: Option<&str>) -> Result<PlanNode> {
        let body = self.build_query_body(query)?;
        Ok(PlanNode::Query(QueryPlan {
            alias: alias.map(str::to_string),
            input: Box::new(body),
        }))
    }

    fn build_query_body(&self, query: &QueryNode) -> Result<PlanNode> {
        match query {
            QueryNode::Select(select) => self.build_select(select),
            QueryNode::Union(union) => self.build_union(union),
        }
    }

    fn build_union(&self, union: &UnionQuery) -> Result<PlanNode> {
        let left = self.build_query_body(&union.left)?;
        let right = self.build_query_body(&union.right)?;
        let mut node = PlanNode::Union(UnionPlan {
            is_all: union.is_all,
            left: Box::new(left),
            right: Box::new(right),
        });
        if !union.order_by.is_empty() {
            node = sort(node, &union.order_by);
        }
        if let Some(limit) = union.limit {
            node = limit_node(node, limit)?;
        }
        Ok(node)
    }

    /// FROM -> WHERE -> GROUP BY -> HAVING -> ORDER BY -> SELECT -> DISTINCT -> LIMIT
    fn build_select(&self, select: &SelectQuery) -> Result<PlanNode> {
        let from = match select.from.as_slice() {
            [] => return Err(SqlError::Plan("SELECT without FROM is not supported".into())),
            [single] => single,
            _ => {
                return Err(SqlError::Plan(
                    "comma-separated FROM tables are not supported; use JOIN".into(),
                ))
            }
        };
        if select.select_list.is_empty() {
            return Err(SqlError::Plan("empty SELECT list".into()));
        }

        let primary = primary_table(from);
        let mut node = self.build_table_ref(from)?;

        if let Some(cond) = &select.where_clause {
            node = filter(node, cond, false);
        }
        if !select.group_by.is_empty() {
            node = PlanNode::Group(GroupPlan {
                keys: select.group_by.clone(),
                input: Box::new(node),
            });
        }
        if let Some(cond) = &select.having {
            node = filter(node, cond, true);
        }
        if !select.order_by.is_empty() {
            node = sort(node, &select.order_by);
        }

        let windows = WindowTable::from_defs(&select.windows, primary)?;
        let merged = merge_projections(&select.select_list, &windows)?;
        let union_db = primary_db(from).unwrap_or(self.options.default_db.as_str());
        for spec in merged.lists.iter().filter_map(|l| l.window.as_ref()) {
            for table in &spec.union_tables {
                self.check_table(union_db, table)?;
            }
        }
        trace!(
            windows = windows.len(),
            lists = merged.lists.len(),
            "built select projection"
        );
        node = PlanNode::Project(ProjectPlan {
            table: primary.unwrap_or_default().to_string(),
            project_lists: merged.lists,
            pos_mapping: merged.pos_mapping,
            input: Box::new(node),
        });

        if select.distinct {
            node = PlanNode::Distinct(DistinctPlan {
                input: Box::new(node),
            });
        }
        if let Some(limit) = select.limit {
            node = limit_node(node, limit)?;
        }
        Ok(node)
    }

    fn build_table_ref(&self, table_ref: &TableRef) -> Result<PlanNode> {
        match table_ref {
            TableRef::Table { db, name, alias } => {
                let db = db.clone().unwrap_or_else(|| self.options.default_db.clone());
                self.check_table(&db, name)?;
                Ok(PlanNode::TableScan(TableScanPlan {
                    db,
                    table: name.clone(),
                    alias: alias.clone(),
                }))
            }
            TableRef::SubQuery { query, alias } => self.build_query(query, alias.as_deref()),
            TableRef::Join(join) => self.build_join(join),
        }
    }

    fn build_join(&self, join: &JoinRef) -> Result<PlanNode> {
        let condition = join
            .condition
            .clone()
            .ok_or_else(|| SqlError::Plan(format!("{} requires an ON condition", join.kind)))?;
        let orders = join_orders(join.kind, &join.order_by)?;
        let left = self.build_table_ref(&join.left)?;
        let right = self.build_table_ref(&join.right)?;
        debug!(kind = %join.kind, condition = %condition, "built join");
        Ok(PlanNode::Join(JoinPlan {
            kind: join.kind,
            condition,
            orders,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn check_table(&self, db: &str, table: &str) -> Result<()> {
        match self.catalog {
            Some(catalog) if !catalog.has_table(db, table) => {
                Err(SqlError::Plan(format!("table '{table}' not found")))
            }
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // DDL / DML / commands
    // -----------------------------------------------------------------------

    fn build_create(&self, create: &CreateTableStmt) -> Result<PlanNode> {
        let table_def = transform_table_def(&create.name, &create.elements)?;
        let column_descs = create
            .elements
            .iter()
            .filter_map(|e| match e {
                TableElement::Column(c) => Some(c.clone()),
                TableElement::Index(_) => None,
            })
            .collect();
        Ok(PlanNode::Create(CreatePlan {
            table_def,
            if_not_exists: create.if_not_exists,
            column_descs,
        }))
    }

    fn build_create_index(&self, create: &CreateIndexStmt) -> Result<PlanNode> {
        let schema = match self.catalog {
            Some(catalog) => Some(
                catalog
                    .table_schema(&self.options.default_db, &create.table_name)
                    .ok_or_else(|| {
                        SqlError::Plan(format!("table '{}' not found", create.table_name))
                    })?,
            ),
            None => None,
        };
        let mut desc = create.index.clone();
        desc.name = Some(create.index_name.clone());
        let index = transform_index_def(&desc, &create.index_name, schema.as_deref())?;
        Ok(PlanNode::CreateIndex(CreateIndexPlan {
            table_name: create.table_name.clone(),
            index,
        }))
    }

    fn build_insert(&self, insert: &InsertStmt) -> Result<PlanNode> {
        let db = insert
            .db
            .clone()
            .unwrap_or_else(|| self.options.default_db.clone());
        self.check_table(&db, &insert.table)?;
        if insert.values.is_empty() {
            return Err(SqlError::Plan(format!(
                "INSERT into '{}' has no values",
                insert.table
            )));
        }
        if !insert.columns.is_empty() {
            if let Some(row) = insert
                .values
                .iter()
                .find(|row| row.len() != insert.columns.len())
            {
                return Err(SqlError::Plan(format!(
                    "INSERT into '{}': {} columns but {} values",
                    insert.table,
                    insert.columns.len(),
                    row.len()
                )));
            }
        }
        Ok(PlanNode::Insert(InsertPlan {
            db,
            table: insert.table.clone(),
            columns: insert.columns.clone(),
            values: insert.values.clone(),
        }))
    }
}

fn build_cmd(cmd: &CmdStmt) -> Result<PlanNode> {
    let expected = cmd.cmd.arity();
    if cmd.args.len() != expected {
        return Err(SqlError::Plan(format!(
            "{} expects {expected} argument(s), got {}",
            cmd.cmd,
            cmd.args.len()
        )));
    }
    Ok(PlanNode::Cmd(CmdPlan {
        cmd: cmd.cmd,
        args: cmd.args.clone(),
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The table a window runs over: the FROM table, or the left-most table of a join.
fn primary_table(table_ref: &TableRef) -> Option<&str> {
    match table_ref {
        TableRef::Table { name, .. } => Some(name.as_str()),
        TableRef::Join(join) => primary_table(&join.left),
        TableRef::SubQuery { .. } => None,
    }
}

/// Database of the primary table when it is qualified. Window UNION tables
/// live next to it.
fn primary_db(table_ref: &TableRef) -> Option<&str> {
    match table_ref {
        TableRef::Table { db, .. } => db.as_deref(),
        TableRef::Join(join) => primary_db(&join.left),
        TableRef::SubQuery { .. } => None,
    }
}

fn join_orders(kind: JoinKind, order_by: &[OrderExpr]) -> Result<Option<Vec<OrderExpr>>> {
    match kind {
        JoinKind::Last if order_by.is_empty() => {
            Err(SqlError::Plan("LAST JOIN requires ORDER BY".into()))
        }
        JoinKind::Last => Ok(Some(order_by.to_vec())),
        _ if !order_by.is_empty() => Err(SqlError::Plan(format!(
            "ORDER BY is only allowed on LAST JOIN, not {kind}"
        ))),
        _ => Ok(None),
    }
}

fn filter(input: PlanNode, cond: &Expr, having: bool) -> PlanNode {
    PlanNode::Filter(FilterPlan {
        condition: cond.clone(),
        having,
        input: Box::new(input),
    })
}

fn sort(input: PlanNode, orders: &[OrderExpr]) -> PlanNode {
    PlanNode::Sort(SortPlan {
        orders: orders.to_vec(),
        input: Box::new(input),
    })
}

fn limit_node(input: PlanNode, limit: i64) -> Result<PlanNode> {
    let limit = u64::try_from(limit)
        .map_err(|_| SqlError::Plan(format!("LIMIT must not be negative, got {limit}")))?;
    Ok(PlanNode::Limit(LimitPlan {
        limit,
        input: Box::new(input),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fesql_node::{BinaryOp, ResTarget};

    fn select(from: TableRef) -> SelectQuery {
        SelectQuery {
            select_list: vec![ResTarget::new(Expr::column("col1"))],
            from: vec![from],
            ..Default::default()
        }
    }

    fn plan(select: SelectQuery) -> Result<PlanNode> {
        Planner::new(PlannerOptions::default())
            .plan_statement(&Statement::Query(QueryNode::Select(Box::new(select))))
    }

    #[test]
    fn clause_order() {
        let mut s = select(TableRef::table("t1"));
        s.where_clause = Some(Expr::binary(BinaryOp::Gt, Expr::column("col1"), Expr::int(0)));
        s.group_by = vec![Expr::column("col1")];
        s.having = Some(Expr::binary(
            BinaryOp::Gt,
            Expr::call("count", vec![Expr::column("col1")]),
            Expr::int(1),
        ));
        s.order_by = vec![OrderExpr::asc(Expr::column("col1"))];
        s.distinct = true;
        s.limit = Some(5);

        let mut kinds = Vec::new();
        let mut node = &plan(s).unwrap();
        loop {
            kinds.push(node.plan_type().to_string());
            match node.children().first() {
                Some(child) => node = *child,
                None => break,
            }
        }
        assert_eq!(
            kinds,
            vec![
                "kQuery",
                "kLimit",
                "kDistinct",
                "kProject",
                "kSort",
                "kFilter",
                "kGroup",
                "kFilter",
                "kTableScan"
            ]
        );
    }

    #[test]
    fn from_clause_errors() {
        let mut none = select(TableRef::table("t1"));
        none.from.clear();
        assert!(plan(none).is_err());

        let mut comma = select(TableRef::table("t1"));
        comma.from.push(TableRef::table("t2"));
        assert!(plan(comma).is_err());

        let mut neg = select(TableRef::table("t1"));
        neg.limit = Some(-1);
        assert!(plan(neg).is_err());
    }

    #[test]
    fn join_order_rules() {
        assert!(join_orders(JoinKind::Last, &[]).is_err());
        assert!(join_orders(JoinKind::Inner, &[]).unwrap().is_none());
        let ord = [OrderExpr::asc(Expr::column("ts"))];
        assert_eq!(join_orders(JoinKind::Last, &ord).unwrap().unwrap().len(), 1);
        assert!(join_orders(JoinKind::Left, &ord).is_err());
    }

    #[test]
    fn cmd_arity() {
        let ok = CmdStmt {
            cmd: fesql_node::CmdType::ShowDatabases,
            args: vec![],
        };
        assert!(build_cmd(&ok).is_ok());
        let bad = CmdStmt {
            cmd: fesql_node::CmdType::UseDatabase,
            args: vec![],
        };
        assert!(build_cmd(&bad).is_err());
    }
}
