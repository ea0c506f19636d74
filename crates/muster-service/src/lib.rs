//! # muster-service
//!
//! Application layer: the member onboarding workflow, the preference engine and
//! the slash command registry, written against the `DocumentStore` and
//! `PlatformClient` ports.

pub mod commands;
pub mod dto;
pub mod services;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use commands::{CommandInvocation, CommandName, CommandRegistry, OptionValue, Reply};
pub use services::{
    AuditLog, LifecycleOrchestrator, MemberDirectory, MemberScope, NotificationFanout, PreferenceService,
    ResourceProvisioner, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
