//! SQL question answering over a read-only SQLite database.

use crate::agent::{Agent, AgentKind, SourceDescriptor, render_conversation, wrong_source};
use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::table::Table;
use askgate_core::ChatMessage;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Executor, Row, TypeInfo, ValueRef};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Only URIs of this form are accepted as SQL sources.
pub const SQLITE_URI_PREFIX: &str = "sqlite:///";

const GENERATION_PROMPT: &str = "You are an expert SQLite analyst. Given the schema below, \
write exactly one syntactically correct SQLite SELECT statement that answers the user's \
latest question. Only query the tables and columns shown. Return the SQL only, with no \
explanation.";

const ANSWER_PROMPT: &str = "You answer questions from SQL query results. Use only the \
result rows provided. If the result is empty or does not answer the question, say so.";

/// An open database and the URI it came from.
#[derive(Clone)]
struct SqliteSource {
    uri: String,
    pool: SqlitePool,
}

pub struct SqlAgent {
    model: Arc<dyn LanguageModel>,
    max_rows: u32,
    source: RwLock<Option<SqliteSource>>,
}

impl SqlAgent {
    pub fn new(model: Arc<dyn LanguageModel>, max_rows: u32) -> Self {
        Self {
            model,
            max_rows,
            source: RwLock::new(None),
        }
    }

    /// Open the startup database. Failures leave the agent without a source.
    pub async fn load_default(&self, uri: &str) {
        match open_sqlite(uri).await {
            Ok(source) => {
                tracing::info!(uri, "Connected SQL agent to default database");
                *self.source.write().await = Some(source);
            }
            Err(e) => {
                tracing::warn!(uri, error = %e, "Default database unavailable; SQL agent starts empty");
            }
        }
    }

    /// URI of the current database, if any.
    pub async fn current_uri(&self) -> Option<String> {
        self.source.read().await.as_ref().map(|s| s.uri.clone())
    }
}

#[async_trait]
impl Agent for SqlAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Sql
    }

    async fn ask(&self, conversation: &[ChatMessage]) -> Result<String, AgentError> {
        let source = self
            .source
            .read()
            .await
            .clone()
            .ok_or(AgentError::SourceNotLoaded(AgentKind::Sql))?;

        let schema = describe_schema(&source.pool).await?;
        let question = render_conversation(conversation);

        let generated = self
            .model
            .complete(&[
                ChatMessage::system(format!("{}\n\nSchema:\n{}", GENERATION_PROMPT, schema)),
                ChatMessage::user(question.clone()),
            ])
            .await?;

        let sql = read_only_statement(&extract_sql(&generated))?;
        tracing::debug!(sql = %sql, "Running generated query");

        let result = run_query(&source.pool, &sql, self.max_rows).await?;
        let rendered = result.to_csv(self.max_rows as usize)?;

        self.model
            .complete(&[
                ChatMessage::system(ANSWER_PROMPT),
                ChatMessage::user(format!(
                    "Question:\n{}\n\nSQL query:\n{}\n\nResult ({} rows):\n{}",
                    question,
                    sql,
                    result.row_count(),
                    rendered
                )),
            ])
            .await
    }

    async fn replace_source(&self, source: SourceDescriptor) -> Result<(), AgentError> {
        match source {
            SourceDescriptor::DatabaseUri(uri) => {
                let opened = open_sqlite(&uri).await?;
                tracing::info!(uri = %uri, "Switching SQL agent to new database");
                // The old pool is not closed: questions already running hold
                // a handle to it and finish against the old database. It is
                // freed when the last of them drops it.
                *self.source.write().await = Some(opened);
                Ok(())
            }
            other => Err(wrong_source(AgentKind::Sql, "database URI", &other)),
        }
    }
}

/// File path named by a `sqlite:///<path>` URI.
pub fn sqlite_path_from_uri(uri: &str) -> Result<PathBuf, AgentError> {
    let path = uri
        .strip_prefix(SQLITE_URI_PREFIX)
        .ok_or_else(|| AgentError::InvalidSource("Only sqlite:/// URIs are supported".to_string()))?;
    if path.is_empty() {
        return Err(AgentError::InvalidSource(format!("no database path in {}", uri)));
    }
    Ok(PathBuf::from(path))
}

async fn open_sqlite(uri: &str) -> Result<SqliteSource, AgentError> {
    let path = sqlite_path_from_uri(uri)?;
    if !tokio::fs::try_exists(&path).await? {
        return Err(AgentError::InvalidSource(format!(
            "database file not found: {}",
            path.display()
        )));
    }

    let options = SqliteConnectOptions::new().filename(&path).read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    Ok(SqliteSource {
        uri: uri.to_string(),
        pool,
    })
}

/// `CREATE TABLE` statements for every user table.
pub async fn describe_schema(pool: &SqlitePool) -> Result<String, AgentError> {
    let rows = sqlx::query(
        "SELECT sql FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let statements: Vec<String> = rows
        .iter()
        .map(|r| r.try_get::<String, _>("sql"))
        .collect::<Result<_, _>>()?;
    Ok(statements.join(";\n"))
}

/// Names of the user tables.
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>, AgentError> {
    let rows = sqlx::query(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .iter()
        .map(|r| r.try_get::<String, _>("name"))
        .collect::<Result<_, _>>()?)
}

/// Strip markdown fences and trailing semicolons from a model reply.
pub fn extract_sql(reply: &str) -> String {
    let mut sql = reply.trim();
    if let Some(rest) = sql.strip_prefix("```") {
        let rest = rest.strip_prefix("sql").or_else(|| rest.strip_prefix("SQL")).unwrap_or(rest);
        sql = rest.strip_suffix("```").unwrap_or(rest);
    }
    sql.trim().trim_end_matches(';').trim().to_string()
}

/// Reduce a generated query to a single `SELECT` / `WITH` statement with
/// comments removed. The connection is also opened read-only, so this only
/// filters out obvious misfires early.
pub fn read_only_statement(sql: &str) -> Result<String, AgentError> {
    let (stripped, separators) = strip_comments(sql);
    let body = stripped.trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if separators.iter().any(|&at| at < body.len()) {
        return Err(AgentError::UnsafeQuery("multiple statements are not allowed".to_string()));
    }

    let body = body.trim_start();
    if body.is_empty() {
        return Err(AgentError::UnsafeQuery("the model returned no SQL".to_string()));
    }
    let first = body
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if first != "select" && first != "with" {
        return Err(AgentError::UnsafeQuery(format!(
            "only SELECT queries are allowed, got {}",
            first.to_ascii_uppercase()
        )));
    }
    Ok(body.to_string())
}

/// Drop `--` and `/* */` comments outside quoted text. Also returns the byte
/// offsets, in the stripped text, of every `;` outside quotes.
fn strip_comments(sql: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(sql.len());
    let mut separators = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' | '[' => {
                let close = if c == '[' { ']' } else { c };
                out.push(c);
                // A doubled quote closes and immediately reopens, which
                // copies the escape through unchanged.
                for q in chars.by_ref() {
                    out.push(q);
                    if q == close {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for q in chars.by_ref() {
                    if q == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for q in chars.by_ref() {
                    if prev == '*' && q == '/' {
                        break;
                    }
                    prev = q;
                }
                out.push(' ');
            }
            ';' => {
                separators.push(out.len());
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    (out, separators)
}

/// Run `sql` capped at `max_rows` and collect the result as a table.
pub async fn run_query(pool: &SqlitePool, sql: &str, max_rows: u32) -> Result<Table, AgentError> {
    fetch_table(pool, &format!("SELECT * FROM ({}) LIMIT {}", sql, max_rows)).await
}

/// Run a query and collect its rows. Column names come from the statement
/// itself, so an empty result still carries its header.
pub(crate) async fn fetch_table(pool: &SqlitePool, sql: &str) -> Result<Table, AgentError> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    if rows.is_empty() {
        let described = pool.describe(sql).await?;
        let columns = described
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        return Ok(Table {
            columns,
            rows: Vec::new(),
        });
    }
    Ok(rows_to_table(&rows))
}

pub(crate) fn rows_to_table(rows: &[SqliteRow]) -> Table {
    let columns = rows
        .first()
        .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| decode_cell(row, i)).collect())
        .collect();
    Table { columns, rows }
}

fn decode_cell(row: &SqliteRow, idx: usize) -> Value {
    let Ok(raw) = row.try_get_raw(idx) else {
        return Value::Null;
    };
    if raw.is_null() {
        return Value::Null;
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();
    match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(idx).map(Value::from).unwrap_or(Value::Null),
        "REAL" => row.try_get::<f64, _>(idx).map(Value::from).unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(idx)
            .map(|b| Value::String(format!("<{} bytes>", b.len())))
            .unwrap_or(Value::Null),
        _ => row.try_get::<String, _>(idx).map(Value::String).unwrap_or(Value::Null),
    }
}
