//! Nearby public transport departures.
//!
//! Answers "when does the next bus or tram leave from a stop near me?"
//! Real-time predictions are tried stop by stop in distance order, with
//! the published timetable as a fallback.

pub mod cache;
pub mod config;
pub mod display;
pub mod domain;
pub mod geolocate;
pub mod realtime;
pub mod resolver;
pub mod schedule;
pub mod source;
pub mod stops;
pub mod web;
