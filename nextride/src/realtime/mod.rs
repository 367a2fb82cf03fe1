//! Real-time departures from OVapi.
//!
//! OVapi tracks vehicles across Dutch public transport and reports live
//! predictions per timing point. Coverage is partial: many stops are not
//! tracked at all, and tracked stops are empty outside service hours.

mod client;
mod convert;
mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, RealtimeClient, RealtimeConfig};
pub use convert::{ConversionError, convert_pass, convert_stop_area};
pub use types::{Pass, StopAreaResponse, TimingPointData, TimingPointStop, TripStopStatus};
