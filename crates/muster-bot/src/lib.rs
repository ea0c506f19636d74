//! # muster-bot
//!
//! Bot runtime: builds the store, the Discord clients and the service context,
//! routes gateway events to the services and serves the health endpoints.

pub mod bot;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::run;
