//! HTTP API module for the laytime engine.
//!
//! This module provides the REST endpoint the surrounding platform calls
//! to recompute a laytime calculation from a consistent input snapshot.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::ApiError;
pub use state::AppState;
