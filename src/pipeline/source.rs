//! Record sources for progress extraction.
//!
//! A record source hands the pipeline rows of `(run, metric, step)` for one
//! collection. The SQLite source reads the result databases the search
//! writes; the in-memory source backs tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params_from_iter};

use crate::schema::{ColumnRole, FieldSpec, FilterClause, StepOrder, is_identifier};

/// One progress row as read from a source.
///
/// `run` is an opaque key; integer identifiers are stringified on read.
/// `step` is `None` when no step column was selected, in which case the
/// series builder substitutes the per-run record index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Run identifier.
    pub run: String,
    /// Metric value.
    pub metric: f64,
    /// Step value, if an explicit step column was selected.
    pub step: Option<f64>,
}

/// A parameterized read of one collection's rows.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Table to read from.
    pub table: String,
    /// Column selection.
    pub fields: FieldSpec,
    /// Filter clauses, combined with AND.
    pub filter: Vec<FilterClause>,
    /// Optional source-side ordering by step.
    pub order: Option<StepOrder>,
}

impl RecordQuery {
    /// Resolve a filter column role to its configured column name.
    fn column_name(&self, role: ColumnRole) -> Result<&str, DataAccessError> {
        match role {
            ColumnRole::Run => Ok(&self.fields.run),
            ColumnRole::Metric => Ok(&self.fields.metric),
            ColumnRole::Step => self
                .fields
                .step
                .as_deref()
                .ok_or(DataAccessError::FilterWithoutStep),
        }
    }

    /// Render the query as SQL with `?N` placeholders for filter values.
    ///
    /// Identifiers are re-checked here so the source contract holds even
    /// when a query is built outside the validated configuration path.
    fn to_sql(&self) -> Result<String, DataAccessError> {
        for name in [&self.table, &self.fields.run, &self.fields.metric]
            .into_iter()
            .chain(self.fields.step.as_ref())
        {
            if !is_identifier(name) {
                return Err(DataAccessError::Identifier(name.clone()));
            }
        }

        let mut sql = format!("SELECT {}, {}", self.fields.run, self.fields.metric);
        if let Some(step) = &self.fields.step {
            sql.push_str(", ");
            sql.push_str(step);
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for (i, clause) in self.filter.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(self.column_name(clause.column)?);
            sql.push(' ');
            sql.push_str(clause.op.sql());
            sql.push_str(&format!(" ?{}", i + 1));
        }

        if let (Some(order), Some(step)) = (self.order, &self.fields.step) {
            sql.push_str(" ORDER BY ");
            sql.push_str(step);
            sql.push_str(match order {
                StepOrder::Ascending => " ASC",
                StepOrder::Descending => " DESC",
            });
        }

        Ok(sql)
    }
}

/// Errors raised while reading records.
#[derive(Debug, thiserror::Error)]
pub enum DataAccessError {
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("Query failed: {0}")]
    Query(rusqlite::Error),
    #[error("Failed to read row: {0}")]
    Row(rusqlite::Error),
    #[error("Invalid SQL identifier: {0:?}")]
    Identifier(String),
    #[error("Filter references the step column but no step column is selected")]
    FilterWithoutStep,
}

/// A read-only store of progress rows for one collection.
pub trait RecordSource {
    /// Fetch all rows matching the query.
    ///
    /// An empty result is not an error; downstream stages tolerate zero
    /// runs.
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>, DataAccessError>;
}

/// Record source backed by a SQLite result database.
///
/// The connection is scoped to one `fetch` call: opened before extraction
/// and released on every exit path when it drops.
#[derive(Debug, Clone)]
pub struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    /// Create a source for a database file.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSource for SqliteSource {
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>, DataAccessError> {
        let sql = query.to_sql()?;

        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| DataAccessError::Open {
                path: self.path.clone(),
                source,
            })?;

        let mut stmt = conn.prepare(&sql).map_err(DataAccessError::Query)?;
        let has_step = query.fields.step.is_some();
        let params = params_from_iter(query.filter.iter().map(|clause| clause.value));

        let rows = stmt
            .query_map(params, move |row| {
                let run = match row.get::<_, Value>(0)? {
                    Value::Integer(i) => i.to_string(),
                    Value::Real(f) => f.to_string(),
                    Value::Text(s) => s,
                    Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
                    Value::Null => "null".to_string(),
                };
                let metric: f64 = row.get(1)?;
                let step = if has_step { Some(row.get(2)?) } else { None };
                Ok(RawRecord { run, metric, step })
            })
            .map_err(DataAccessError::Query)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(DataAccessError::Row)
    }
}

/// In-memory record source for tests and programmatic use.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: HashMap<String, Vec<RawRecord>>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows for a table, replacing any existing rows.
    pub fn insert<S: Into<String>>(&mut self, table: S, rows: Vec<RawRecord>) {
        self.tables.insert(table.into(), rows);
    }

    fn clause_matches(clause: &FilterClause, record: &RawRecord) -> bool {
        let value = match clause.column {
            ColumnRole::Run => match record.run.parse::<f64>() {
                Ok(v) => v,
                Err(_) => return false,
            },
            ColumnRole::Metric => record.metric,
            ColumnRole::Step => match record.step {
                Some(v) => v,
                None => return false,
            },
        };
        clause.op.matches(value, clause.value)
    }
}

impl RecordSource for MemorySource {
    fn fetch(&self, query: &RecordQuery) -> Result<Vec<RawRecord>, DataAccessError> {
        if query
            .filter
            .iter()
            .any(|clause| clause.column == ColumnRole::Step)
            && query.fields.step.is_none()
        {
            return Err(DataAccessError::FilterWithoutStep);
        }

        let mut rows = self.tables.get(&query.table).cloned().unwrap_or_default();
        rows.retain(|record| {
            query
                .filter
                .iter()
                .all(|clause| Self::clause_matches(clause, record))
        });

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let cmp = a.step.unwrap_or(0.0).total_cmp(&b.step.unwrap_or(0.0));
                match order {
                    StepOrder::Ascending => cmp,
                    StepOrder::Descending => cmp.reverse(),
                }
            });
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CompareOp;
    use tempfile::tempdir;

    fn progress_query() -> RecordQuery {
        RecordQuery {
            table: "progress".to_string(),
            fields: FieldSpec::default(),
            filter: Vec::new(),
            order: None,
        }
    }

    fn sample_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE progress(
                id INTEGER PRIMARY KEY,
                evol_id INTEGER NOT NULL,
                num_indivs INTEGER,
                elapsed_secs INTEGER,
                mean REAL,
                stdev REAL,
                best_fit REAL
            );
            INSERT INTO progress (evol_id, num_indivs, mean) VALUES
                (1, 100, 0.5),
                (1, 200, 0.6),
                (2, 100, 0.7),
                (2, 200, 0.8);",
        )
        .unwrap();
    }

    #[test]
    fn test_sqlite_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.db3");
        sample_db(&path);

        let source = SqliteSource::new(&path);
        let records = source.fetch(&progress_query()).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(
            records[0],
            RawRecord {
                run: "1".to_string(),
                metric: 0.5,
                step: Some(100.0),
            }
        );
    }

    #[test]
    fn test_sqlite_filter_and_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.db3");
        sample_db(&path);

        let source = SqliteSource::new(&path);
        let query = RecordQuery {
            filter: vec![FilterClause {
                column: ColumnRole::Run,
                op: CompareOp::Eq,
                value: 2.0,
            }],
            order: Some(StepOrder::Descending),
            ..progress_query()
        };
        let records = source.fetch(&query).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.run == "2"));
        assert_eq!(records[0].step, Some(200.0));
        assert_eq!(records[1].step, Some(100.0));
    }

    #[test]
    fn test_sqlite_two_column_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.db3");
        sample_db(&path);

        let source = SqliteSource::new(&path);
        let query = RecordQuery {
            fields: FieldSpec {
                run: "evol_id".to_string(),
                metric: "mean".to_string(),
                step: None,
            },
            ..progress_query()
        };
        let records = source.fetch(&query).unwrap();

        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|r| r.step.is_none()));
    }

    #[test]
    fn test_sqlite_missing_database() {
        let source = SqliteSource::new("/nonexistent/baseline.db3");
        let err = source.fetch(&progress_query()).unwrap_err();
        assert!(matches!(err, DataAccessError::Open { .. }));
    }

    #[test]
    fn test_query_rejects_bad_identifier() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("baseline.db3");
        sample_db(&path);

        let source = SqliteSource::new(&path);
        let query = RecordQuery {
            table: "progress; DROP TABLE progress".to_string(),
            ..progress_query()
        };
        let err = source.fetch(&query).unwrap_err();
        assert!(matches!(err, DataAccessError::Identifier(_)));
    }

    #[test]
    fn test_step_filter_requires_step_column() {
        let query = RecordQuery {
            fields: FieldSpec {
                run: "evol_id".to_string(),
                metric: "mean".to_string(),
                step: None,
            },
            filter: vec![FilterClause {
                column: ColumnRole::Step,
                op: CompareOp::Le,
                value: 100.0,
            }],
            ..progress_query()
        };
        let err = MemorySource::new().fetch(&query).unwrap_err();
        assert!(matches!(err, DataAccessError::FilterWithoutStep));
    }

    #[test]
    fn test_memory_source_filter_and_order() {
        let mut source = MemorySource::new();
        source.insert(
            "progress",
            vec![
                RawRecord {
                    run: "1".to_string(),
                    metric: 0.5,
                    step: Some(200.0),
                },
                RawRecord {
                    run: "1".to_string(),
                    metric: 0.4,
                    step: Some(100.0),
                },
                RawRecord {
                    run: "2".to_string(),
                    metric: 0.9,
                    step: Some(100.0),
                },
            ],
        );

        let query = RecordQuery {
            filter: vec![FilterClause {
                column: ColumnRole::Metric,
                op: CompareOp::Lt,
                value: 0.9,
            }],
            order: Some(StepOrder::Ascending),
            ..progress_query()
        };
        let records = source.fetch(&query).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].step, Some(100.0));
        assert_eq!(records[1].step, Some(200.0));
    }

    #[test]
    fn test_memory_source_unknown_table_is_empty() {
        let source = MemorySource::new();
        let records = source.fetch(&progress_query()).unwrap();
        assert!(records.is_empty());
    }
}
