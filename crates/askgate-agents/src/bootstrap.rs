//! One-shot creation of the SQLite database from a CSV file.

use crate::error::AgentError;
use crate::sql::{fetch_table, list_tables};
use crate::table::Table;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

const SAMPLE_ROWS: usize = 5;

/// What `bootstrap_sqlite` found or built.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    /// False when the database already existed and was left untouched.
    pub created: bool,
    pub tables: Vec<String>,
    /// First rows of the target table, empty when it does not exist.
    pub sample: Table,
    pub rows_inserted: usize,
}

/// Create `db_path` from `csv_path` as table `table`, unless the database
/// already exists. A failed build removes the partial file.
pub async fn bootstrap_sqlite(
    csv_path: &Path,
    db_path: &Path,
    table: &str,
) -> Result<BootstrapReport, AgentError> {
    if tokio::fs::try_exists(db_path).await? {
        tracing::info!(db = %db_path.display(), "Database already exists; skipping bootstrap");
        let pool = connect(db_path, false).await?;
        let report = summarize(&pool, table, false, 0).await;
        pool.close().await;
        return report;
    }

    let data = Table::from_csv_path(csv_path).await?;
    if data.columns.is_empty() {
        return Err(AgentError::InvalidSource(format!(
            "{} has no header row",
            csv_path.display()
        )));
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let pool = connect(db_path, true).await?;
    let result = match load_table(&pool, table, &data).await {
        Ok(inserted) => summarize(&pool, table, true, inserted).await,
        Err(e) => Err(e),
    };
    pool.close().await;

    if result.is_err() {
        tracing::warn!(db = %db_path.display(), "Bootstrap failed; removing partial database");
        if let Err(e) = tokio::fs::remove_file(db_path).await {
            tracing::warn!(db = %db_path.display(), error = %e, "Could not remove partial database");
        }
    }
    result
}

async fn connect(path: &Path, create: bool) -> Result<SqlitePool, AgentError> {
    // Rollback journal, so the file opens cleanly on read-only connections.
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Delete);
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?)
}

async fn load_table(pool: &SqlitePool, table: &str, data: &Table) -> Result<usize, AgentError> {
    let name = quote_ident(table);
    let definitions = data
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} {}", quote_ident(c), infer_column_type(data, i)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; data.columns.len()].join(", ");
    let insert = format!("INSERT INTO {} VALUES ({})", name, placeholders);

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", name))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("CREATE TABLE {} ({})", name, definitions))
        .execute(&mut *tx)
        .await?;

    for row in &data.rows {
        let mut query = sqlx::query(&insert);
        for cell in row {
            query = match cell {
                Value::Null => query.bind(None::<String>),
                Value::Bool(b) => query.bind(i64::from(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => query.bind(n.as_f64()),
                },
                Value::String(s) => query.bind(s.clone()),
                other => query.bind(other.to_string()),
            };
        }
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(table, rows = data.row_count(), "Loaded CSV into SQLite");
    Ok(data.row_count())
}

async fn summarize(
    pool: &SqlitePool,
    table: &str,
    created: bool,
    rows_inserted: usize,
) -> Result<BootstrapReport, AgentError> {
    let tables = list_tables(pool).await?;
    let sample = if tables.iter().any(|t| t == table) {
        fetch_table(
            pool,
            &format!("SELECT * FROM {} LIMIT {}", quote_ident(table), SAMPLE_ROWS),
        )
        .await?
    } else {
        Table::default()
    };

    Ok(BootstrapReport {
        created,
        tables,
        sample,
        rows_inserted,
    })
}

/// Double-quote an SQLite identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Narrowest SQLite affinity that fits every non-null value in column `idx`.
pub fn infer_column_type(table: &Table, idx: usize) -> &'static str {
    let mut affinity = "INTEGER";
    for value in table.rows.iter().filter_map(|r| r.get(idx)) {
        match value {
            Value::Null => {}
            Value::Bool(_) => {}
            Value::Number(n) if n.is_i64() || n.is_u64() => {}
            Value::Number(_) => affinity = "REAL",
            _ => return "TEXT",
        }
    }
    affinity
}
