//! upcheck - continuous HTTP endpoint-health monitor
//!
//! Polls a configured set of HTTP targets on independent schedules, tracks
//! each target's up/down state, streams every probe result to any number of
//! connected observers over SSE, and raises a webhook alert exactly on
//! up/down transitions.

pub mod actors;
pub mod alerts;
pub mod config;
pub mod server;
pub mod target;
