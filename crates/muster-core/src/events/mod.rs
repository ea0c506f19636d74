//! Domain events

mod lifecycle;

pub use lifecycle::{LifecycleEvent, MemberRef};
