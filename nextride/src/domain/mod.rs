//! Domain types for the departure resolver.
//!
//! This module contains the validated value types shared by every layer:
//! coordinates, stops, the normalized departure model and time anchoring.
//! Types enforce their invariants at construction time, so code that
//! receives them can trust their validity.

mod coordinate;
mod departure;
mod stop;
mod time;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use departure::{Departure, DepartureQueryResult, SourceKind, TransportType};
pub use stop::{InvalidStopCode, RankedStop, Stop, StopCode};
pub use time::{ServiceTime, TimeError, anchor_service_time, parse_provider_timestamp};
