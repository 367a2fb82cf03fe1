//! Departure resolution.
//!
//! Given a position or a saved stop, find candidate stops, try the
//! real-time source on each in distance order, fall back to the timetable
//! for the closest, and order the winning board for display.

mod config;
mod error;
mod fallback;
mod gate;
mod hint;
mod normalize;
mod query;

pub use config::{MAX_RADIUS_KM, ResolverConfig};
pub use error::QueryError;
pub use fallback::FallbackResolver;
pub use gate::{QueryGate, QueryTicket};
pub use hint::service_hint;
pub use normalize::{normalize, sort_departures};
pub use query::{DepartureService, QueryPhase, QueryProgress, QueryTarget};
