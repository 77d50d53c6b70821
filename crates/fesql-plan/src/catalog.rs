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

//! Read-only table lookup consulted while planning.

use std::collections::HashMap;
use std::sync::RwLock;

use fesql_node::{ColumnDef, TableDef};

/// Resolves `(db, table)` to a schema. Implementations must be safe to share
/// between planners running on different threads.
pub trait Catalog: Send + Sync {
    fn table_schema(&self, db: &str, table: &str) -> Option<Vec<ColumnDef>>;

    fn has_table(&self, db: &str, table: &str) -> bool {
        self.table_schema(db, table).is_some()
    }
}

/// HashMap-backed catalog used by tests and the CLI.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<(String, String), TableDef>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a table definition under `db`.
    pub fn add_table(&self, db: &str, def: TableDef) {
        let mut tables = match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables.insert((db.to_string(), def.name.clone()), def);
    }

    pub fn remove_table(&self, db: &str, table: &str) -> bool {
        let mut tables = match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables
            .remove(&(db.to_string(), table.to_string()))
            .is_some()
    }

    /// Sorted table names registered under `db`.
    pub fn table_names(&self, db: &str) -> Vec<String> {
        let tables = match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut names: Vec<String> = tables
            .keys()
            .filter(|(d, _)| d == db)
            .map(|(_, t)| t.clone())
            .collect();
        names.sort();
        names
    }
}

impl Catalog for MemoryCatalog {
    fn table_schema(&self, db: &str, table: &str) -> Option<Vec<ColumnDef>> {
        let tables = match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables
            .get(&(db.to_string(), table.to_string()))
            .map(|def| def.columns.clone())
    }
}
