//! Dispatch by agent kind.

use crate::agent::{Agent, AgentKind, SourceDescriptor};
use crate::context::ContextAgent;
use crate::error::AgentError;
use crate::llm::{Embedder, LanguageModel};
use crate::sql::SqlAgent;
use crate::tabular::TabularAgent;
use askgate_core::{AgentsConfig, ChatMessage};
use std::sync::Arc;
use std::time::Instant;

/// The three agents behind the API. Arguments and results pass through
/// unchanged; errors are returned to the caller without retry.
#[derive(Clone)]
pub struct AgentFacade {
    tabular: Arc<dyn Agent>,
    context: Arc<dyn Agent>,
    sql: Arc<dyn Agent>,
}

impl AgentFacade {
    pub fn new(tabular: Arc<dyn Agent>, context: Arc<dyn Agent>, sql: Arc<dyn Agent>) -> Self {
        Self {
            tabular,
            context,
            sql,
        }
    }

    /// Build the default agents and load their startup sources.
    pub async fn from_config(
        config: &AgentsConfig,
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        let tabular = TabularAgent::new(model.clone(), config.tabular.max_prompt_rows);
        tabular.load_default(&config.tabular.default_csv).await;

        let context = ContextAgent::new(model.clone(), embedder, config.context.clone());

        let sql = SqlAgent::new(model, config.sql.max_rows);
        sql.load_default(&config.sql.default_db_uri).await;

        Self::new(Arc::new(tabular), Arc::new(context), Arc::new(sql))
    }

    pub fn agent(&self, kind: AgentKind) -> &Arc<dyn Agent> {
        match kind {
            AgentKind::Tabular => &self.tabular,
            AgentKind::Context => &self.context,
            AgentKind::Sql => &self.sql,
        }
    }

    pub async fn ask(
        &self,
        kind: AgentKind,
        conversation: &[ChatMessage],
    ) -> Result<String, AgentError> {
        let start = Instant::now();
        tracing::debug!(agent = %kind, messages = conversation.len(), "Dispatching question");

        let result = self.agent(kind).ask(conversation).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(answer) => {
                tracing::info!(agent = %kind, latency_ms, "Agent answered");
                tracing::debug!(agent = %kind, answer = %answer, "Agent answer");
            }
            Err(e) => tracing::warn!(agent = %kind, latency_ms, error = %e, "Agent failed"),
        }
        result
    }

    pub async fn replace_source(
        &self,
        kind: AgentKind,
        source: SourceDescriptor,
    ) -> Result<(), AgentError> {
        let start = Instant::now();
        let described = source.describe();

        let result = self.agent(kind).replace_source(source).await;
        let latency_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(()) => tracing::info!(agent = %kind, source = described, latency_ms, "Data source replaced"),
            Err(e) => tracing::warn!(agent = %kind, source = described, latency_ms, error = %e, "Data source replacement failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Echo {
        kind: AgentKind,
        sources: Mutex<Vec<&'static str>>,
    }

    impl Echo {
        fn new(kind: AgentKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                sources: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Agent for Echo {
        fn kind(&self) -> AgentKind {
            self.kind
        }

        async fn ask(&self, conversation: &[ChatMessage]) -> Result<String, AgentError> {
            if conversation.is_empty() {
                return Err(AgentError::Upstream("empty".into()));
            }
            Ok(format!("{}:{}", self.kind, conversation.len()))
        }

        async fn replace_source(&self, source: SourceDescriptor) -> Result<(), AgentError> {
            self.sources.lock().unwrap().push(source.describe());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_kind() {
        let tabular = Echo::new(AgentKind::Tabular);
        let context = Echo::new(AgentKind::Context);
        let sql = Echo::new(AgentKind::Sql);
        let facade = AgentFacade::new(tabular.clone(), context.clone(), sql.clone());

        let conversation = [ChatMessage::user("hi"), ChatMessage::assistant("hello")];
        assert_eq!(facade.ask(AgentKind::Tabular, &conversation).await.unwrap(), "tabular:2");
        assert_eq!(facade.ask(AgentKind::Context, &conversation).await.unwrap(), "context:2");
        assert_eq!(facade.ask(AgentKind::Sql, &conversation).await.unwrap(), "sql:2");

        facade
            .replace_source(AgentKind::Sql, SourceDescriptor::DatabaseUri("sqlite:///x.db".into()))
            .await
            .unwrap();
        assert_eq!(*sql.sources.lock().unwrap(), vec!["database URI"]);
        assert!(tabular.sources.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let facade = AgentFacade::new(
            Echo::new(AgentKind::Tabular),
            Echo::new(AgentKind::Context),
            Echo::new(AgentKind::Sql),
        );
        let err = facade.ask(AgentKind::Tabular, &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Upstream(ref m) if m == "empty"));
    }
}
