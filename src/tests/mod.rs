//! Integration testing module
//!
//! End-to-end scenarios driving the timeline controller through player
//! events with scripted decoder and parser collaborators.

pub mod fixtures;
