//! In-memory tables for the tabular agent and the SQLite bootstrap.

use crate::error::AgentError;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Column names plus rows of JSON scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// pandas `DataFrame.to_json(orient="split")` layout. `index` is ignored.
#[derive(Deserialize)]
struct SplitFrame {
    columns: Vec<Value>,
    data: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, AgentError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(AgentError::InvalidSource(format!(
                "row {} has {} values but there are {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Parse pandas split-orient JSON (`{"columns": [...], "index": [...], "data": [[...]]}`).
    pub fn from_split_json(json: &str) -> Result<Self, AgentError> {
        let frame: SplitFrame = serde_json::from_str(json)
            .map_err(|e| AgentError::InvalidSource(format!("expected split-orient JSON: {}", e)))?;
        let columns = frame.columns.iter().map(cell_text).collect();
        Self::new(columns, frame.data)
    }

    pub async fn from_csv_path(path: &Path) -> Result<Self, AgentError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_csv_reader(bytes.as_slice())
    }

    /// Read CSV with a header row. Cells are typed as integers, floats,
    /// strings, or null when empty.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AgentError> {
        let mut reader = csv::Reader::from_reader(reader);
        let columns = reader.headers()?.iter().map(str::to_string).collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(infer_cell).collect());
        }
        Self::new(columns, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the header and at most `max_rows` rows as CSV.
    pub fn to_csv(&self, max_rows: usize) -> Result<String, AgentError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in self.rows.iter().take(max_rows) {
            writer.write_record(row.iter().map(cell_text))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AgentError::Io(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Type a raw CSV cell.
pub fn infer_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>()
        && f.is_finite()
    {
        return Value::from(f);
    }
    Value::String(raw.to_string())
}

/// Plain-text rendering of a cell: strings unquoted, null as empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
