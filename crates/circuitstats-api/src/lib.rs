// circuitstats-api: Async Rust client for the Juniper Mist cloud API

pub mod client;
pub mod error;
pub mod models;
pub mod rotator;
pub mod transport;

mod devices;
mod orgs;
mod sites;
mod stats;

pub use client::{DEFAULT_HOST, MistClient};
pub use error::Error;
pub use rotator::{RotationPass, TokenRotator};
pub use transport::TransportConfig;
