//! HTTP proxy server module.
//!
//! Accepts inbound generation requests, validates them, and either redirects
//! the caller or relays the request to an upstream image API.

mod handlers;
pub mod multipart;
mod server;
pub mod types;

pub use server::{create_router, run_server, AppState};
pub use types::{GenerateParams, PermanentParams, Reply};
