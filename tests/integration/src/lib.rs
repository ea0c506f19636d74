//! Integration test utilities for the onboarding bot
//!
//! This crate provides helpers for driving the onboarding workflow, the
//! preference commands and the health server end-to-end against the in-memory
//! document store (or PostgreSQL when `DATABASE_URL` is set) and a recording
//! fake platform.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
