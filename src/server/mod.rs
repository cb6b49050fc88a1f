//! HTTP + WebSocket transport
//!
//! This module provides the service surface:
//! - GET /ws - per-connection streaming event protocol
//! - GET /health - health check
//! - GET /stats - active sessions and registered providers
//! - GET /providers/:id/probe - backend connectivity probe

mod handlers;
mod routes;
mod state;
mod ws;

pub use routes::create_router;
pub use state::AppState;
