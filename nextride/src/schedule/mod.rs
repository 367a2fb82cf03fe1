//! Scheduled departures from the GTFS backend.
//!
//! The backend serves timetable departures for a stop as a flat list of
//! wall-clock times. It is the fallback when no real-time data exists.

mod client;
mod convert;
mod types;

pub use client::{ScheduleClient, ScheduleConfig};
pub use convert::{ConversionError, convert_entry, convert_schedule};
pub use types::{ScheduleResponse, ScheduledEntry};
