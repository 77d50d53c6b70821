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

// SQL front end: parse SQL text with sqlparser and lower it into the fesql AST.
//
// Covers the standard-SQL subset of the dialect. Extensions the generic
// grammar has no syntax for (LAST JOIN, window UNION tables, index options,
// %%fun blocks) are built directly as fesql-node values by callers.

use fesql_node::{
    BinaryOp, BoundDef, CmdStmt, CmdType, ColumnDesc, Const, CreateTableStmt, DataType, Expr,
    FrameDef, FrameType, InsertStmt, JoinKind, JoinRef, OrderExpr, QueryNode, ResTarget,
    SelectQuery, Statement, TableElement, TableRef, TimeUnit, UnaryOp, UnionQuery, WindowDef,
    WindowRef,
};
use sqlparser::ast;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::{Result, SqlError};

/// Parse a SQL script into planner statements, in textual order.
pub fn parse_sql(sql: &str) -> Result<Vec<Statement>> {
    let dialect = GenericDialect {};
    let statements =
        Parser::parse_sql(&dialect, sql).map_err(|e| SqlError::Parse(e.to_string()))?;
    debug!(count = statements.len(), "parsed sql");
    statements.iter().map(lower_statement).collect()
}

fn unsupported(what: impl std::fmt::Display) -> SqlError {
    SqlError::Plan(format!("unsupported: {what}"))
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

fn lower_statement(stmt: &ast::Statement) -> Result<Statement> {
    match stmt {
        ast::Statement::Query(q) => Ok(Statement::Query(lower_query(q)?)),

        ast::Statement::CreateTable(create) => {
            if create.query.is_some() {
                return Err(unsupported("CREATE TABLE ... AS SELECT"));
            }
            let (_, name) = split_object_name(&create.name)?;
            let elements = create
                .columns
                .iter()
                .map(|col| {
                    Ok(TableElement::Column(ColumnDesc {
                        name: col.name.value.clone(),
                        data_type: lower_type(&col.data_type)?,
                        not_null: col
                            .options
                            .iter()
                            .any(|o| matches!(o.option, ast::ColumnOption::NotNull)),
                    }))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Statement::CreateTable(CreateTableStmt {
                name,
                if_not_exists: create.if_not_exists,
                elements,
            }))
        }

        ast::Statement::Insert(insert) => {
            let (db, table) = split_object_name(&insert.table_name)?;
            let source = insert
                .source
                .as_ref()
                .ok_or_else(|| SqlError::Plan("INSERT INTO requires VALUES".into()))?;
            let values = match source.body.as_ref() {
                ast::SetExpr::Values(values) => values
                    .rows
                    .iter()
                    .map(|row| row.iter().map(lower_expr).collect::<Result<Vec<_>>>())
                    .collect::<Result<Vec<_>>>()?,
                _ => return Err(unsupported("INSERT ... SELECT")),
            };
            Ok(Statement::Insert(InsertStmt {
                db,
                table,
                columns: insert.columns.iter().map(|c| c.value.clone()).collect(),
                values,
            }))
        }

        ast::Statement::ShowDatabases { .. } => Ok(cmd(CmdType::ShowDatabases, Vec::new())),
        ast::Statement::ShowTables { .. } => Ok(cmd(CmdType::ShowTables, Vec::new())),
        ast::Statement::CreateDatabase { db_name, .. } => {
            let (_, name) = split_object_name(db_name)?;
            Ok(cmd(CmdType::CreateDatabase, vec![name]))
        }
        ast::Statement::Drop {
            object_type: ast::ObjectType::Table,
            names,
            ..
        } => match names.as_slice() {
            [name] => {
                let (_, table) = split_object_name(name)?;
                Ok(cmd(CmdType::DropTable, vec![table]))
            }
            _ => Err(unsupported("DROP TABLE with more than one table")),
        },
        ast::Statement::Drop {
            object_type: ast::ObjectType::Database,
            names,
            ..
        } => match names.as_slice() {
            [name] => Ok(cmd(CmdType::DropDatabase, vec![name.to_string()])),
            _ => Err(unsupported("DROP DATABASE with more than one database")),
        },
        ast::Statement::Use(ast::Use::Object(name) | ast::Use::Database(name)) => {
            Ok(cmd(CmdType::UseDatabase, vec![name.to_string()]))
        }
        ast::Statement::ExplainTable { table_name, .. } => {
            let (_, table) = split_object_name(table_name)?;
            Ok(cmd(CmdType::DescTable, vec![table]))
        }

        other => Err(unsupported(format!("statement '{other}'"))),
    }
}

fn cmd(cmd: CmdType, args: Vec<String>) -> Statement {
    Statement::Cmd(CmdStmt { cmd, args })
}

/// `db.table` or `table`.
fn split_object_name(name: &ast::ObjectName) -> Result<(Option<String>, String)> {
    match name.0.as_slice() {
        [table] => Ok((None, table.value.clone())),
        [db, table] => Ok((Some(db.value.clone()), table.value.clone())),
        _ => Err(SqlError::Plan(format!("invalid object name '{name}'"))),
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn lower_query(query: &ast::Query) -> Result<QueryNode> {
    if query.with.is_some() {
        return Err(unsupported("WITH (CTEs)"));
    }
    if query.offset.is_some() {
        return Err(unsupported("OFFSET"));
    }
    if query.fetch.is_some() {
        return Err(unsupported("FETCH"));
    }

    let mut node = lower_set_expr(&query.body)?;
    let order_by = match &query.order_by {
        Some(order) => lower_orders(&order.exprs)?,
        None => Vec::new(),
    };
    let limit = query.limit.as_ref().map(lower_limit).transpose()?;

    match &mut node {
        QueryNode::Select(select) => {
            if !order_by.is_empty() {
                select.order_by = order_by;
            }
            if limit.is_some() {
                select.limit = limit;
            }
        }
        QueryNode::Union(union) => {
            if !order_by.is_empty() {
                union.order_by = order_by;
            }
            if limit.is_some() {
                union.limit = limit;
            }
        }
    }
    Ok(node)
}

fn lower_set_expr(body: &ast::SetExpr) -> Result<QueryNode> {
    match body {
        ast::SetExpr::Select(select) => Ok(QueryNode::Select(Box::new(lower_select(select)?))),
        ast::SetExpr::Query(query) => lower_query(query),
        ast::SetExpr::SetOperation {
            op: ast::SetOperator::Union,
            set_quantifier,
            left,
            right,
        } => Ok(QueryNode::Union(Box::new(UnionQuery {
            left: lower_set_expr(left)?,
            right: lower_set_expr(right)?,
            is_all: matches!(set_quantifier, ast::SetQuantifier::All),
            order_by: Vec::new(),
            limit: None,
        }))),
        other => Err(unsupported(format!("query body '{other}'"))),
    }
}

fn lower_limit(expr: &ast::Expr) -> Result<i64> {
    match lower_expr(expr)? {
        Expr::Const(Const::Int(n)) => Ok(n),
        other => Err(SqlError::Plan(format!(
            "LIMIT must be an integer literal, got {other}"
        ))),
    }
}

fn lower_select(select: &ast::Select) -> Result<SelectQuery> {
    let distinct = match &select.distinct {
        None => false,
        Some(ast::Distinct::Distinct) => true,
        Some(ast::Distinct::On(_)) => return Err(unsupported("DISTINCT ON")),
    };

    let select_list = select
        .projection
        .iter()
        .map(lower_select_item)
        .collect::<Result<Vec<_>>>()?;
    let from = select
        .from
        .iter()
        .map(lower_table_with_joins)
        .collect::<Result<Vec<_>>>()?;
    let where_clause = select.selection.as_ref().map(lower_expr).transpose()?;
    let group_by = match &select.group_by {
        ast::GroupByExpr::Expressions(exprs, _) => {
            exprs.iter().map(lower_expr).collect::<Result<Vec<_>>>()?
        }
        ast::GroupByExpr::All(_) => return Err(unsupported("GROUP BY ALL")),
    };
    let having = select.having.as_ref().map(lower_expr).transpose()?;

    let mut windows = Vec::with_capacity(select.named_window.len());
    for ast::NamedWindowDefinition(name, def) in &select.named_window {
        match def {
            ast::NamedWindowExpr::WindowSpec(spec) => {
                windows.push(lower_window_spec(spec, &name.value)?)
            }
            ast::NamedWindowExpr::NamedWindow(other) => {
                return Err(unsupported(format!(
                    "window '{}' defined as alias of '{}'",
                    name.value, other.value
                )))
            }
        }
    }

    Ok(SelectQuery {
        distinct,
        select_list,
        from,
        where_clause,
        group_by,
        having,
        windows,
        order_by: Vec::new(),
        limit: None,
    })
}

fn lower_select_item(item: &ast::SelectItem) -> Result<ResTarget> {
    match item {
        ast::SelectItem::UnnamedExpr(e) => Ok(ResTarget::new(lower_expr(e)?)),
        ast::SelectItem::ExprWithAlias { expr, alias } => Ok(ResTarget {
            expr: lower_expr(expr)?,
            alias: Some(alias.value.clone()),
        }),
        ast::SelectItem::Wildcard(_) => Ok(ResTarget::new(Expr::All { relation: None })),
        ast::SelectItem::QualifiedWildcard(name, _) => Ok(ResTarget::new(Expr::All {
            relation: Some(name.to_string()),
        })),
    }
}

fn lower_table_with_joins(twj: &ast::TableWithJoins) -> Result<TableRef> {
    let mut left = lower_table_factor(&twj.relation)?;
    for join in &twj.joins {
        let right = lower_table_factor(&join.relation)?;
        let (kind, constraint) = match &join.join_operator {
            ast::JoinOperator::Inner(c) => (JoinKind::Inner, c),
            ast::JoinOperator::LeftOuter(c) => (JoinKind::Left, c),
            ast::JoinOperator::RightOuter(c) => (JoinKind::Right, c),
            ast::JoinOperator::FullOuter(c) => (JoinKind::Full, c),
            other => return Err(unsupported(format!("join operator {other:?}"))),
        };
        let condition = match constraint {
            ast::JoinConstraint::On(e) => Some(lower_expr(e)?),
            ast::JoinConstraint::None => None,
            _ => return Err(unsupported("USING / NATURAL join")),
        };
        left = TableRef::Join(Box::new(JoinRef {
            left,
            right,
            kind,
            condition,
            order_by: Vec::new(),
        }));
    }
    Ok(left)
}

fn lower_table_factor(factor: &ast::TableFactor) -> Result<TableRef> {
    match factor {
        ast::TableFactor::Table { name, alias, .. } => {
            let (db, name) = split_object_name(name)?;
            Ok(TableRef::Table {
                db,
                name,
                alias: alias.as_ref().map(|a| a.name.value.clone()),
            })
        }
        ast::TableFactor::Derived {
            subquery, alias, ..
        } => Ok(TableRef::SubQuery {
            query: Box::new(lower_query(subquery)?),
            alias: alias.as_ref().map(|a| a.name.value.clone()),
        }),
        other => Err(unsupported(format!("table source '{other}'"))),
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

fn lower_window_spec(spec: &ast::WindowSpec, name: &str) -> Result<WindowDef> {
    if let Some(base) = &spec.window_name {
        return Err(unsupported(format!("window inheriting from '{}'", base.value)));
    }
    Ok(WindowDef {
        name: name.to_string(),
        union_tables: Vec::new(),
        partition_by: spec
            .partition_by
            .iter()
            .map(lower_expr)
            .collect::<Result<Vec<_>>>()?,
        order_by: lower_orders(&spec.order_by)?,
        frame: spec.window_frame.as_ref().map(lower_frame).transpose()?,
        instance_not_in_window: false,
    })
}

fn lower_frame(frame: &ast::WindowFrame) -> Result<FrameDef> {
    let frame_type = match frame.units {
        ast::WindowFrameUnits::Rows => FrameType::Rows,
        ast::WindowFrameUnits::Range => FrameType::Range,
        ast::WindowFrameUnits::Groups => return Err(unsupported("GROUPS frame")),
    };
    Ok(FrameDef {
        frame_type,
        start: lower_bound(&frame.start_bound)?,
        end: frame.end_bound.as_ref().map(lower_bound).transpose()?,
    })
}

fn lower_bound(bound: &ast::WindowFrameBound) -> Result<BoundDef> {
    Ok(match bound {
        ast::WindowFrameBound::CurrentRow => BoundDef::CurrentRow,
        ast::WindowFrameBound::Preceding(None) => BoundDef::UnboundedPreceding,
        ast::WindowFrameBound::Following(None) => BoundDef::UnboundedFollowing,
        ast::WindowFrameBound::Preceding(Some(e)) => BoundDef::Preceding(lower_expr(e)?),
        ast::WindowFrameBound::Following(Some(e)) => BoundDef::Following(lower_expr(e)?),
    })
}

fn lower_orders(orders: &[ast::OrderByExpr]) -> Result<Vec<OrderExpr>> {
    orders
        .iter()
        .map(|o| {
            Ok(OrderExpr {
                expr: lower_expr(&o.expr)?,
                asc: o.asc.unwrap_or(true),
            })
        })
        .collect()
}

/// `INTERVAL '3' DAY`, `INTERVAL 3 DAY` or `INTERVAL '3d'` as a duration literal.
fn lower_interval(interval: &ast::Interval) -> Result<Expr> {
    let text = match interval.value.as_ref() {
        ast::Expr::Value(ast::Value::SingleQuotedString(s)) => s.clone(),
        ast::Expr::Value(ast::Value::Number(n, _)) => n.clone(),
        other => return Err(unsupported(format!("interval value {other}"))),
    };
    let (value, unit) = match &interval.leading_field {
        Some(field) => {
            let value = text
                .trim()
                .parse::<i64>()
                .map_err(|_| SqlError::Plan(format!("invalid interval value '{text}'")))?;
            let unit = TimeUnit::from_name(&field.to_string())
                .ok_or_else(|| unsupported(format!("interval unit {field}")))?;
            (value, unit)
        }
        None => TimeUnit::parse_duration(&text)
            .ok_or_else(|| SqlError::Plan(format!("invalid interval '{text}'")))?,
    };
    Ok(Expr::duration(value, unit))
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

fn lower_expr(expr: &ast::Expr) -> Result<Expr> {
    match expr {
        ast::Expr::Identifier(ident) => Ok(Expr::column(&ident.value)),
        ast::Expr::CompoundIdentifier(parts) => match parts.as_slice() {
            [rel, col] => Ok(Expr::qualified(&rel.value, &col.value)),
            _ => Err(unsupported(format!("identifier {expr}"))),
        },
        ast::Expr::Value(value) => Ok(Expr::Const(lower_value(value)?)),
        ast::Expr::Interval(interval) => lower_interval(interval),
        ast::Expr::Nested(inner) => lower_expr(inner),

        ast::Expr::BinaryOp { left, op, right } => {
            let op = lower_binary_op(op)?;
            Ok(Expr::binary(op, lower_expr(left)?, lower_expr(right)?))
        }
        ast::Expr::UnaryOp { op, expr: inner } => {
            let inner = lower_expr(inner)?;
            match op {
                ast::UnaryOperator::Plus => Ok(inner),
                ast::UnaryOperator::Minus => Ok(match inner {
                    Expr::Const(Const::Int(n)) => Expr::Const(Const::Int(-n)),
                    Expr::Const(Const::Float(v)) => Expr::Const(Const::Float(-v)),
                    other => Expr::Unary {
                        op: UnaryOp::Neg,
                        expr: Box::new(other),
                    },
                }),
                ast::UnaryOperator::Not => Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(inner),
                }),
                other => Err(unsupported(format!("unary operator {other}"))),
            }
        }

        ast::Expr::IsNull(inner) => Ok(Expr::IsNull {
            expr: Box::new(lower_expr(inner)?),
            negated: false,
        }),
        ast::Expr::IsNotNull(inner) => Ok(Expr::IsNull {
            expr: Box::new(lower_expr(inner)?),
            negated: true,
        }),
        ast::Expr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => Ok(Expr::Between {
            expr: Box::new(lower_expr(inner)?),
            low: Box::new(lower_expr(low)?),
            high: Box::new(lower_expr(high)?),
            negated: *negated,
        }),
        ast::Expr::InList {
            expr: inner,
            list,
            negated,
        } => Ok(Expr::InList {
            expr: Box::new(lower_expr(inner)?),
            list: list.iter().map(lower_expr).collect::<Result<Vec<_>>>()?,
            negated: *negated,
        }),
        ast::Expr::Like {
            negated,
            expr: inner,
            pattern,
            ..
        } => {
            let like = Expr::binary(BinaryOp::Like, lower_expr(inner)?, lower_expr(pattern)?);
            if *negated {
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(like),
                })
            } else {
                Ok(like)
            }
        }
        ast::Expr::Cast {
            expr: inner,
            data_type,
            ..
        } => Ok(Expr::Cast {
            expr: Box::new(lower_expr(inner)?),
            data_type: lower_type(data_type)?,
        }),
        ast::Expr::Case {
            operand,
            conditions,
            results,
            else_result,
        } => {
            let branches = conditions
                .iter()
                .zip(results.iter())
                .map(|(w, t)| Ok((lower_expr(w)?, lower_expr(t)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Case {
                operand: operand
                    .as_ref()
                    .map(|o| lower_expr(o).map(Box::new))
                    .transpose()?,
                branches,
                else_result: else_result
                    .as_ref()
                    .map(|e| lower_expr(e).map(Box::new))
                    .transpose()?,
            })
        }
        ast::Expr::Function(func) => lower_function(func),

        other => Err(unsupported(format!("expression {other}"))),
    }
}

fn lower_value(value: &ast::Value) -> Result<Const> {
    match value {
        ast::Value::Number(n, _) => match n.parse::<i64>() {
            Ok(i) => Ok(Const::Int(i)),
            Err(_) => n
                .parse::<f64>()
                .map(Const::Float)
                .map_err(|_| SqlError::Plan(format!("invalid number literal: {n}"))),
        },
        ast::Value::SingleQuotedString(s) | ast::Value::DoubleQuotedString(s) => {
            Ok(Const::String(s.clone()))
        }
        ast::Value::Boolean(b) => Ok(Const::Bool(*b)),
        ast::Value::Null => Ok(Const::Null),
        other => Err(unsupported(format!("literal {other}"))),
    }
}

fn lower_binary_op(op: &ast::BinaryOperator) -> Result<BinaryOp> {
    Ok(match op {
        ast::BinaryOperator::Plus => BinaryOp::Add,
        ast::BinaryOperator::Minus => BinaryOp::Sub,
        ast::BinaryOperator::Multiply => BinaryOp::Mul,
        ast::BinaryOperator::Divide => BinaryOp::Div,
        ast::BinaryOperator::Modulo => BinaryOp::Mod,
        ast::BinaryOperator::Eq => BinaryOp::Eq,
        ast::BinaryOperator::NotEq => BinaryOp::NotEq,
        ast::BinaryOperator::Lt => BinaryOp::Lt,
        ast::BinaryOperator::LtEq => BinaryOp::LtEq,
        ast::BinaryOperator::Gt => BinaryOp::Gt,
        ast::BinaryOperator::GtEq => BinaryOp::GtEq,
        ast::BinaryOperator::And => BinaryOp::And,
        ast::BinaryOperator::Or => BinaryOp::Or,
        other => return Err(unsupported(format!("operator {other}"))),
    })
}

fn lower_function(func: &ast::Function) -> Result<Expr> {
    let name = func.name.to_string();
    if func.filter.is_some() {
        return Err(unsupported(format!("FILTER clause on {name}(...)")));
    }
    if func.null_treatment.is_some() {
        return Err(unsupported(format!("IGNORE / RESPECT NULLS on {name}(...)")));
    }
    if !func.within_group.is_empty() {
        return Err(unsupported(format!("WITHIN GROUP on {name}(...)")));
    }
    let args = match &func.args {
        ast::FunctionArguments::None => Vec::new(),
        ast::FunctionArguments::List(list) => {
            if list.duplicate_treatment.is_some() {
                return Err(unsupported(format!("DISTINCT / ALL in {name}(...)")));
            }
            list.args
                .iter()
                .map(|arg| match arg {
                    ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Expr(e)) => lower_expr(e),
                    ast::FunctionArg::Unnamed(ast::FunctionArgExpr::Wildcard) => {
                        Ok(Expr::All { relation: None })
                    }
                    other => Err(unsupported(format!("function argument {other}"))),
                })
                .collect::<Result<Vec<_>>>()?
        }
        ast::FunctionArguments::Subquery(_) => {
            return Err(unsupported(format!("sub-query argument to {name}")))
        }
    };
    let over = match &func.over {
        None => None,
        Some(ast::WindowType::NamedWindow(ident)) => Some(WindowRef::Named(ident.value.clone())),
        Some(ast::WindowType::WindowSpec(spec)) => {
            Some(WindowRef::Inline(Box::new(lower_window_spec(spec, "")?)))
        }
    };
    Ok(Expr::Call { name, args, over })
}

/// Map a SQL type through its rendered name, ignoring length/precision.
fn lower_type(data_type: &ast::DataType) -> Result<DataType> {
    let rendered = data_type.to_string();
    let base = match rendered.find('(') {
        Some(i) => &rendered[..i],
        None => rendered.as_str(),
    };
    let base = match base.trim().to_lowercase().as_str() {
        "double precision" => "double".to_string(),
        other => other.to_string(),
    };
    base.parse::<DataType>()
        .map_err(|_| unsupported(format!("column type {rendered}")))
}
