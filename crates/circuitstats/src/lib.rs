//! The circuitstats dashboard: an axum app serving gateway WAN statistics
//! from the Mist cloud.

pub mod error;
pub mod server;

pub use error::{ApiError, AppError};
pub use server::{AppState, build_router};
