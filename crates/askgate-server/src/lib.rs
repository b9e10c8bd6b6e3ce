//! # askgate-server
//!
//! HTTP surface for askgate.
//!
//! `POST /auth/token` exchanges the shared secret for the current bearer
//! token. Every agent route sits behind [`middleware::require_bearer`],
//! which rejects the request before its body is read, so no agent work
//! happens for unauthenticated calls.

pub mod assets;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use server::serve;
pub use state::AppState;
