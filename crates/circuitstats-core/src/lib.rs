//! Windowed WAN statistics for Juniper Mist gateways.
//!
//! Sits between `circuitstats-api` and the dashboard binary:
//!
//! - **[`StatsService`]** answers every dashboard query from fresh Mist
//!   API calls. The organization id is resolved once, lazily, so nothing
//!   touches the network until the first real request.
//!
//! - **[`Window`] / [`Timeframe`]** turn a dashboard timeframe into an
//!   aligned range split into exactly [`BUCKETS`] buckets.
//!
//! - **[`summarize`]** reduces an insights series to chart samples and
//!   byte totals, treating missing buckets as absent rather than zero.
//!
//! - **Domain model** ([`model`]) are the serializable shapes the
//!   dashboard returns.

pub mod addressing;
pub mod aggregate;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod service;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{PortSample, TrafficTotals, WindowedSummary, summarize};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ServiceConfig;
pub use error::CoreError;
pub use model::{
    AddressType, GatewayPorts, GatewaySummary, Organization, OrganizationRef, PortCounters,
    PortTraffic, Site, WanPort,
};
pub use service::StatsService;
pub use window::{BUCKETS, MIN_INTERVAL_SECS, Timeframe, Window};
