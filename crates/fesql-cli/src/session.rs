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

// Planning session: carries the options and the catalog across statements so
// CREATE TABLE / DROP TABLE / USE feed later queries.

use fesql_node::{CmdType, PlanNode};
use fesql_plan::frontend::parse_sql;
use fesql_plan::{MemoryCatalog, Planner, PlannerOptions, SqlError};
use tracing::{debug, info};

pub struct Session {
    options: PlannerOptions,
    catalog: MemoryCatalog,
}

impl Session {
    pub fn new(is_batch_mode: bool) -> Self {
        Session {
            options: PlannerOptions {
                is_batch_mode,
                ..Default::default()
            },
            catalog: MemoryCatalog::new(),
        }
    }

    pub fn is_batch_mode(&self) -> bool {
        self.options.is_batch_mode
    }

    pub fn set_batch_mode(&mut self, batch: bool) {
        self.options.is_batch_mode = batch;
    }

    pub fn database(&self) -> &str {
        &self.options.default_db
    }

    pub fn table_names(&self) -> Vec<String> {
        self.catalog.table_names(&self.options.default_db)
    }

    /// Parse and plan `sql`, one statement at a time.
    ///
    /// Each statement's effect on the catalog (CREATE TABLE, DROP TABLE, USE)
    /// is applied as soon as it plans, before the next one is planned. On the
    /// first failure the error is returned and the trees are dropped, but the
    /// catalog effects of the statements that planned before it stay applied.
    pub fn plan(&mut self, sql: &str) -> Result<Vec<PlanNode>, SqlError> {
        let statements = parse_sql(sql)?;
        let mut trees = Vec::with_capacity(statements.len());
        for stmt in &statements {
            let tree = Planner::new(self.options.clone())
                .with_catalog(&self.catalog)
                .plan_statement(stmt)?;
            self.apply(&tree);
            trees.push(tree);
        }
        Ok(trees)
    }

    fn apply(&mut self, tree: &PlanNode) {
        match tree {
            PlanNode::Create(create) => {
                info!(table = %create.table_def.name, db = %self.options.default_db, "registered table");
                self.catalog
                    .add_table(&self.options.default_db, create.table_def.clone());
            }
            PlanNode::Cmd(cmd) => match (cmd.cmd, cmd.args.as_slice()) {
                (CmdType::DropTable, [table]) => {
                    let removed = self.catalog.remove_table(&self.options.default_db, table);
                    debug!(table = %table, removed, "drop table");
                }
                (CmdType::UseDatabase, [db]) => {
                    debug!(db = %db, "switch database");
                    self.options.default_db = db.clone();
                }
                _ => {}
            },
            _ => {}
        }
    }
}
