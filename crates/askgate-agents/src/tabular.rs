//! Questions about an in-memory table.

use crate::agent::{Agent, AgentKind, SourceDescriptor, wrong_source};
use crate::error::AgentError;
use crate::llm::LanguageModel;
use crate::table::Table;
use askgate_core::ChatMessage;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct TabularAgent {
    model: Arc<dyn LanguageModel>,
    max_prompt_rows: usize,
    table: RwLock<Option<Arc<Table>>>,
}

impl TabularAgent {
    pub fn new(model: Arc<dyn LanguageModel>, max_prompt_rows: usize) -> Self {
        Self {
            model,
            max_prompt_rows,
            table: RwLock::new(None),
        }
    }

    /// Load the startup CSV. A missing or unreadable file leaves the agent
    /// without a table.
    pub async fn load_default(&self, path: &Path) {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::warn!(path = %path.display(), "Default CSV not found; tabular agent starts empty");
            return;
        }
        match Table::from_csv_path(path).await {
            Ok(table) => {
                tracing::info!(
                    path = %path.display(),
                    rows = table.row_count(),
                    columns = table.columns.len(),
                    "Loaded default table"
                );
                *self.table.write().await = Some(Arc::new(table));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load default CSV");
            }
        }
    }

    fn system_prompt(&self, table: &Table) -> Result<String, AgentError> {
        let shown = table.row_count().min(self.max_prompt_rows);
        let csv = table.to_csv(self.max_prompt_rows)?;
        Ok(format!(
            "You are a data analyst working with a table named `df`.\n\
             Columns: {columns}\n\
             Total rows: {total}. The first {shown} rows follow as CSV:\n\n\
             {csv}\n\
             Answer the user's question about this table. When the answer depends on rows \
             that are not shown, say so instead of guessing.",
            columns = table.columns.join(", "),
            total = table.row_count(),
        ))
    }
}

#[async_trait]
impl Agent for TabularAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Tabular
    }

    async fn ask(&self, conversation: &[ChatMessage]) -> Result<String, AgentError> {
        let table = self
            .table
            .read()
            .await
            .clone()
            .ok_or(AgentError::SourceNotLoaded(AgentKind::Tabular))?;

        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt(&table)?));
        messages.extend_from_slice(conversation);
        self.model.complete(&messages).await
    }

    async fn replace_source(&self, source: SourceDescriptor) -> Result<(), AgentError> {
        match source {
            SourceDescriptor::Table(table) => {
                tracing::info!(
                    rows = table.row_count(),
                    columns = table.columns.len(),
                    "Replacing tabular agent data"
                );
                *self.table.write().await = Some(Arc::new(table));
                Ok(())
            }
            other => Err(wrong_source(AgentKind::Tabular, "table", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every prompt and answers with a fixed string.
    #[derive(Default)]
    struct RecordingModel {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl LanguageModel for RecordingModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<String, AgentError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok("42".to_string())
        }
    }

    fn sample_table() -> Table {
        Table::new(
            vec!["Customer".into(), "Total".into()],
            vec![vec![json!("Ann"), json!(10)], vec![json!("Bob"), json!(32)]],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ask_without_table_fails() {
        let agent = TabularAgent::new(Arc::new(RecordingModel::default()), 10);
        let err = agent.ask(&[ChatMessage::user("sum?")]).await.unwrap_err();
        assert!(matches!(err, AgentError::SourceNotLoaded(AgentKind::Tabular)));
    }

    #[tokio::test]
    async fn test_ask_includes_table_in_prompt() {
        let model = Arc::new(RecordingModel::default());
        let agent = TabularAgent::new(model.clone(), 1);
        agent
            .replace_source(SourceDescriptor::Table(sample_table()))
            .await
            .unwrap();

        let answer = agent.ask(&[ChatMessage::user("Total spend?")]).await.unwrap();
        assert_eq!(answer, "42");

        let seen = model.seen.lock().unwrap();
        let prompt = &seen[0];
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, "system");
        assert!(prompt[0].content.contains("Columns: Customer, Total"));
        assert!(prompt[0].content.contains("Total rows: 2"));
        assert!(prompt[0].content.contains("Ann,10"));
        assert!(!prompt[0].content.contains("Bob"));
        assert_eq!(prompt[1], ChatMessage::user("Total spend?"));
    }

    #[tokio::test]
    async fn test_rejects_non_table_source() {
        let agent = TabularAgent::new(Arc::new(RecordingModel::default()), 10);
        let err = agent
            .replace_source(SourceDescriptor::Text("hello".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidSource(_)));
    }

    #[tokio::test]
    async fn test_load_default_missing_file_is_not_fatal() {
        let agent = TabularAgent::new(Arc::new(RecordingModel::default()), 10);
        agent.load_default(Path::new("/nonexistent/data.csv")).await;
        assert!(agent.ask(&[ChatMessage::user("?")]).await.is_err());
    }

    #[tokio::test]
    async fn test_load_default_reads_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retail.csv");
        tokio::fs::write(&path, "Customer,Total\nAnn,10\n").await.unwrap();

        let model = Arc::new(RecordingModel::default());
        let agent = TabularAgent::new(model.clone(), 10);
        agent.load_default(&path).await;

        assert_eq!(agent.ask(&[ChatMessage::user("?")]).await.unwrap(), "42");
        assert!(model.seen.lock().unwrap()[0][0].content.contains("Ann,10"));
    }
}
