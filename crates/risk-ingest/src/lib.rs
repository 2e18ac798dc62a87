//! Data acquisition for heat-risk zones.
//!
//! The crate is split into focused modules:
//! - `config`: endpoint, timeout and force-mode settings.
//! - `probe`: memoized backend health detection.
//! - `client`: probe-gated fetches that fall back to mock data.
//! - `wire`: upstream payload shapes and their validation.
//! - `session`: view state with stale-response protection.

pub use client::{DataClient, MAX_FORECAST_DAYS};
pub use config::ClientConfig;
pub use error::FetchError;
pub use probe::{AvailabilityProbe, AvailabilityState, ForceMode};
pub use session::{ApplyOutcome, LoadTicket, SessionState, refresh_zones};
pub use sourced::{DataSource, Sourced};

pub mod config;

mod client;
mod error;
mod probe;
mod session;
mod sourced;
mod wire;
