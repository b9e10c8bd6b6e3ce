//! `askgate serve` - start the HTTP API.

use anyhow::Context;
use askgate_agents::{AgentFacade, OpenAiClient};
use askgate_auth::{SharedSecret, TokenAuthority};
use askgate_core::AskgateConfig;
use askgate_server::AppState;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = AskgateConfig::load(config_path.as_deref()).with_context(|| match &config_path {
        Some(p) => format!("Failed to load config file: {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let (secret_id, secret_key) = config.auth.resolve_secrets()?;
    let secret = SharedSecret::new(secret_id, secret_key).context("Invalid shared secret")?;
    let authority = TokenAuthority::new(secret, config.auth.token_ttl_secs);
    tracing::info!(ttl_secs = authority.ttl_secs(), "Token authority ready");

    let api_key = config.llm.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!(
            env = %config.llm.api_key_env,
            "Model provider key not set; agent calls will fail"
        );
    }
    let client = Arc::new(OpenAiClient::new(&config.llm, api_key).context("Failed to build model client")?);
    let agents = AgentFacade::from_config(&config.agents, client.clone(), client).await;

    askgate_server::serve(&config.server, AppState::new(authority, agents))
        .await
        .context("HTTP server failed")
}
