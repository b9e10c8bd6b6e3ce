//! Request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use askgate_agents::{AgentKind, SourceDescriptor, Table};
use askgate_auth::{TokenRequest, TokenResponse};
use askgate_core::ChatMessage;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// `data` is a pandas split-orient JSON document, as a string.
#[derive(Debug, Deserialize)]
pub struct DataFrameUpdateRequest {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct ContextUpdateRequest {
    pub text: String,
}

/// `db_uri` has the form `sqlite:///path/to/file.db`.
#[derive(Debug, Deserialize)]
pub struct SqlUpdateRequest {
    pub db_uri: String,
}

pub async fn healthz() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "askgate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn issue_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.authority().issue_for(&request)?))
}

async fn ask(
    state: &AppState,
    kind: AgentKind,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.agents().ask(kind, &request.messages).await?;
    Ok(Json(ChatResponse { response }))
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    ask(&state, AgentKind::Tabular, payload).await
}

pub async fn context_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    ask(&state, AgentKind::Context, payload).await
}

pub async fn sql_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    ask(&state, AgentKind::Sql, payload).await
}

pub async fn update_df(
    State(state): State<AppState>,
    payload: Result<Json<DataFrameUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let table = Table::from_split_json(&request.data)?;
    state
        .agents()
        .replace_source(AgentKind::Tabular, SourceDescriptor::Table(table))
        .await?;
    Ok(Json(json!({ "status": "Dataframe data updated successfully." })))
}

pub async fn update_context(
    State(state): State<AppState>,
    payload: Result<Json<ContextUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    state
        .agents()
        .replace_source(AgentKind::Context, SourceDescriptor::Text(request.text))
        .await?;
    Ok(Json(json!({ "message": "Context data updated successfully." })))
}

pub async fn update_sql(
    State(state): State<AppState>,
    payload: Result<Json<SqlUpdateRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    state
        .agents()
        .replace_source(AgentKind::Sql, SourceDescriptor::DatabaseUri(request.db_uri.clone()))
        .await?;
    Ok(Json(json!({
        "message": format!("SQL database updated to: {}", request.db_uri)
    })))
}
