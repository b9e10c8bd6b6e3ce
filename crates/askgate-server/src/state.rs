//! Shared application state.

use askgate_agents::AgentFacade;
use askgate_auth::TokenAuthority;
use std::sync::Arc;

/// Handle to the token authority and agents. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    authority: TokenAuthority,
    agents: AgentFacade,
}

impl AppState {
    pub fn new(authority: TokenAuthority, agents: AgentFacade) -> Self {
        Self {
            inner: Arc::new(AppStateInner { authority, agents }),
        }
    }

    pub fn authority(&self) -> &TokenAuthority {
        &self.inner.authority
    }

    pub fn agents(&self) -> &AgentFacade {
        &self.inner.agents
    }
}
