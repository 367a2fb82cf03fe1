//! Web layer for the departure service.
//!
//! Provides JSON endpoints for finding stops and their next departures.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Service};
