//! Reconciles a persisted table against a complete desired state.
//!
//! Editing clients submit the whole list for a collection. Items whose id is
//! persisted are overwritten, items without one are inserted, and persisted
//! rows missing from the list are deleted. Callers run every step on one
//! transaction so a failure leaves the table as it was.
//!
//! An update only touches a row when at least one field differs, so
//! submitting the same list twice leaves ids and `updated_at` alone.

use chrono::Utc;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments};
use sqlx::SqliteConnection;
use std::collections::HashSet;

/// A query with its arguments bound so far.
pub type Bound<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// A child table whose rows are deleted explicitly before their parent.
#[derive(Debug, Clone, Copy)]
pub struct Child {
    pub table: &'static str,
    pub foreign_key: &'static str,
}

/// Describes the table an entity lives in.
///
/// `columns` lists every field [`Record::bind_fields`] binds, in order. The
/// `id` and timestamp columns are handled here.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub timestamps: bool,
    pub children: &'static [Child],
}

/// Restricts a reconciliation to the rows owned by one parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub column: &'static str,
    pub id: i64,
}

impl Scope {
    pub fn new(column: &'static str, id: i64) -> Self {
        Self { column, id }
    }
}

/// An entity that can be written by the reconciler.
pub trait Record {
    /// The persisted id, or `None` for an entity that was never saved.
    fn id(&self) -> Option<i64>;

    /// Binds one value per entry of [`Table::columns`], in the same order.
    fn bind_fields<'q>(&'q self, query: Bound<'q>) -> Bound<'q>;
}

/// What a reconciliation did, by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Final id of every desired item, in submission order.
    pub ids: Vec<i64>,
    pub updated: Vec<i64>,
    pub unchanged: Vec<i64>,
    pub inserted: Vec<i64>,
    pub deleted: Vec<i64>,
}

impl ReconcileReport {
    /// Folds a child reconciliation into this report's counters.
    pub fn absorb(&mut self, other: ReconcileReport) {
        self.updated.extend(other.updated);
        self.unchanged.extend(other.unchanged);
        self.inserted.extend(other.inserted);
        self.deleted.extend(other.deleted);
    }

    pub fn is_noop(&self) -> bool {
        self.updated.is_empty() && self.inserted.is_empty() && self.deleted.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update(i64),
    Insert,
}

/// Splits desired ids into updates and inserts.
///
/// Ids marked for update are removed from `existing`; whatever remains there
/// afterwards is stale and must be deleted.
pub fn partition(
    existing: &mut HashSet<i64>,
    ids: impl IntoIterator<Item = Option<i64>>,
) -> Vec<Action> {
    ids.into_iter()
        .map(|id| match id {
            Some(id) if existing.remove(&id) => Action::Update(id),
            _ => Action::Insert,
        })
        .collect()
}

fn quote(column: &str) -> String {
    format!("\"{}\"", column)
}

impl Table {
    /// The scope column when it is not already one of the bound fields.
    fn extra_scope(&self, scope: Option<Scope>) -> Option<Scope> {
        scope.filter(|scope| !self.columns.contains(&scope.column))
    }

    fn select_ids_sql(&self, scope: Option<Scope>) -> String {
        match scope {
            Some(scope) => format!(
                "SELECT id FROM {} WHERE {} = ? ORDER BY id",
                self.name,
                quote(scope.column)
            ),
            None => format!("SELECT id FROM {} ORDER BY id", self.name),
        }
    }

    fn insert_sql(&self, explicit_id: bool, scope: Option<Scope>) -> String {
        let mut columns: Vec<&str> = Vec::new();
        if explicit_id {
            columns.push("id");
        }
        columns.extend(self.columns.iter().copied());
        if let Some(scope) = self.extra_scope(scope) {
            columns.push(scope.column);
        }
        if self.timestamps {
            columns.push("created_at");
            columns.push("updated_at");
        }

        let names: Vec<String> = columns.iter().map(|c| quote(c)).collect();
        let params = vec!["?"; columns.len()];
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            params.join(", ")
        )
    }

    fn update_sql(&self) -> String {
        let mut assignments: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} = ?", quote(c)))
            .collect();
        if self.timestamps {
            assignments.push("updated_at = ?".to_string());
        }

        // `IS` treats two NULLs as equal.
        let unchanged: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} IS ?", quote(c)))
            .collect();

        format!(
            "UPDATE {} SET {} WHERE id = ? AND NOT ({})",
            self.name,
            assignments.join(", "),
            unchanged.join(" AND ")
        )
    }
}

/// Reads the persisted ids of a table, optionally restricted to one parent.
pub async fn snapshot(
    conn: &mut SqliteConnection,
    table: &Table,
    scope: Option<Scope>,
) -> Result<HashSet<i64>, sqlx::Error> {
    let sql = table.select_ids_sql(scope);
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(scope) = scope {
        query = query.bind(scope.id);
    }
    let ids = query.fetch_all(&mut *conn).await?;
    Ok(ids.into_iter().collect())
}

/// Overwrites every field of row `id`. Returns `false` when nothing differed.
pub async fn update_row<T: Record>(
    conn: &mut SqliteConnection,
    table: &Table,
    id: i64,
    item: &T,
) -> Result<bool, sqlx::Error> {
    let sql = table.update_sql();
    let now = Utc::now().to_rfc3339();

    let mut query = item.bind_fields(sqlx::query(&sql));
    if table.timestamps {
        query = query.bind(&now);
    }
    let query = item.bind_fields(query.bind(id));

    let result = query.execute(&mut *conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Inserts a row and returns its id.
///
/// With `id` set the row is inserted under that id instead of a store-assigned one.
pub async fn insert_row<T: Record>(
    conn: &mut SqliteConnection,
    table: &Table,
    id: Option<i64>,
    scope: Option<Scope>,
    item: &T,
) -> Result<i64, sqlx::Error> {
    let sql = table.insert_sql(id.is_some(), scope);
    let now = Utc::now().to_rfc3339();

    let mut query = sqlx::query(&sql);
    if let Some(id) = id {
        query = query.bind(id);
    }
    let mut query = item.bind_fields(query);
    if let Some(scope) = table.extra_scope(scope) {
        query = query.bind(scope.id);
    }
    if table.timestamps {
        query = query.bind(&now).bind(&now);
    }

    let result = query.execute(&mut *conn).await?;
    Ok(id.unwrap_or_else(|| result.last_insert_rowid()))
}

/// Deletes a row after deleting its declared children.
pub async fn delete_row(
    conn: &mut SqliteConnection,
    table: &Table,
    id: i64,
) -> Result<(), sqlx::Error> {
    for child in table.children {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            child.table,
            quote(child.foreign_key)
        );
        sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    }

    let sql = format!("DELETE FROM {} WHERE id = ?", table.name);
    sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
    Ok(())
}

/// Makes `table` (or the part of it under `scope`) match `desired` exactly.
pub async fn reconcile<T: Record>(
    conn: &mut SqliteConnection,
    table: &Table,
    scope: Option<Scope>,
    desired: &[T],
) -> Result<ReconcileReport, sqlx::Error> {
    let mut existing = snapshot(conn, table, scope).await?;
    let actions = partition(&mut existing, desired.iter().map(Record::id));

    let mut report = ReconcileReport::default();
    let mut ids = vec![0; desired.len()];

    for (index, (item, action)) in desired.iter().zip(&actions).enumerate() {
        if let Action::Update(id) = *action {
            if update_row(conn, table, id, item).await? {
                report.updated.push(id);
            } else {
                report.unchanged.push(id);
            }
            ids[index] = id;
        }
    }

    for (index, (item, action)) in desired.iter().zip(&actions).enumerate() {
        if *action == Action::Insert {
            let id = insert_row(conn, table, None, scope, item).await?;
            report.inserted.push(id);
            ids[index] = id;
        }
    }

    let mut stale: Vec<i64> = existing.into_iter().collect();
    stale.sort_unstable();
    for id in stale {
        delete_row(conn, table, id).await?;
        report.deleted.push(id);
    }

    report.ids = ids;
    Ok(report)
}

/// Saves the only row of a single-row table: update the first row or insert one.
pub async fn save_singleton<T: Record>(
    conn: &mut SqliteConnection,
    table: &Table,
    item: &T,
) -> Result<ReconcileReport, sqlx::Error> {
    let sql = format!("SELECT id FROM {} ORDER BY id LIMIT 1", table.name);
    let existing: Option<i64> = sqlx::query_scalar(&sql)
        .fetch_optional(&mut *conn)
        .await?;

    let mut report = ReconcileReport::default();
    match existing {
        Some(id) => {
            if update_row(conn, table, id, item).await? {
                report.updated.push(id);
            } else {
                report.unchanged.push(id);
            }
            report.ids.push(id);
        }
        None => {
            let id = insert_row(conn, table, None, None, item).await?;
            report.inserted.push(id);
            report.ids.push(id);
        }
    }
    Ok(report)
}
