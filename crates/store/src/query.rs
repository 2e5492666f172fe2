// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small SQL query builder for the read paths ledgers need: optional
//! filters, soft-delete/archive exclusion, ordering, and limits, without
//! pulling in a full ORM.

use crate::error::StoreError;
use rusqlite::{params_from_iter, types::ToSqlOutput, Connection, ToSql};

#[derive(Default)]
pub struct Query {
    table: String,
    columns: String,
    clauses: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
    order: Option<String>,
    limit: Option<i64>,
}

impl Query {
    pub fn new(table: impl Into<String>, columns: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: columns.into(),
            clauses: Vec::new(),
            params: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn where_clause(mut self, clause: impl Into<String>, param: impl ToSql + 'static) -> Self {
        self.clauses.push(clause.into());
        self.params.push(Box::new(param));
        self
    }

    /// Only applies the clause/param when `value` is `Some`.
    pub fn where_if<P: ToSql + 'static>(self, clause: impl Into<String>, value: Option<P>) -> Self {
        match value {
            Some(v) => self.where_clause(clause, v),
            None => self,
        }
    }

    pub fn where_in(mut self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            // An empty IN() is always false; short-circuit with a clause that
            // can never match rather than emitting invalid SQL.
            self.clauses.push("1 = 0".to_string());
            return self;
        }
        let placeholders = values.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        self.clauses.push(format!("{column} IN ({placeholders})"));
        for v in values {
            self.params.push(Box::new(v.clone()));
        }
        self
    }

    /// Appends a clause with no bound parameter, for fixed literal conditions
    /// that don't need one (an `IS NOT NULL` check, a literal `LIKE` pattern).
    /// Prefer `where_clause` when the value should be a bound parameter.
    pub fn raw(self, clause: impl Into<String>) -> Self {
        self.where_raw(&clause.into())
    }

    pub fn not_deleted(self) -> Self {
        self.where_raw("deleted_at IS NULL")
    }

    pub fn not_archived(self) -> Self {
        self.where_raw("archived_at IS NULL")
    }

    pub fn active(self) -> Self {
        self.where_raw("status = 'active'")
    }

    fn where_raw(mut self, clause: &str) -> Self {
        self.clauses.push(clause.to_string());
        self
    }

    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    fn build_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns, self.table);
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        if let Some(order) = &self.order {
            sql.push_str(&format!(" ORDER BY {order}"));
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        sql
    }

    pub fn fetch<T>(
        &self,
        conn: &Connection,
        map: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let sql = self.build_sql();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(self.params.iter().map(|p| ParamRef(p.as_ref()))), map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn fetch_one<T>(
        &self,
        conn: &Connection,
        map: impl Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>, StoreError> {
        Ok(self.fetch(conn, map)?.into_iter().next())
    }

    pub fn count(&self, conn: &Connection) -> Result<i64, StoreError> {
        let sql = format!(
            "SELECT COUNT(*) FROM ({})",
            Query {
                columns: "1".to_string(),
                order: None,
                limit: None,
                ..clone_without_boxed(self)
            }
            .build_sql()
        );
        let count: i64 = conn.query_row(
            &sql,
            params_from_iter(self.params.iter().map(|p| ParamRef(p.as_ref()))),
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// `Query` intentionally doesn't derive `Clone` (boxed trait objects aren't
// cloneable); `count()` needs a structural copy with different columns/order/
// limit but the *same* clauses, so rebuild by hand instead of deriving.
fn clone_without_boxed(q: &Query) -> Query {
    Query {
        table: q.table.clone(),
        columns: String::new(),
        clauses: q.clauses.clone(),
        params: Vec::new(),
        order: None,
        limit: None,
    }
}

struct ParamRef<'a>(&'a dyn ToSql);

impl ToSql for ParamRef<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
