//! Data Transfer Objects
//!
//! Validated command input.

pub mod requests;

pub use requests::{validation_message, ApplicationForm};
