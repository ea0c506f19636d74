//! Test support: an in-process platform that records every call
//!
//! Enabled for this crate's unit tests and, through the `testing` feature, for the
//! integration test crate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use muster_core::traits::{
    ChannelKind, ChannelRef, CreateChannel, GuildRef, PlatformClient, PlatformError, PlatformResult,
    RoleRef,
};
use muster_core::Snowflake;
use parking_lot::Mutex;
use serde_json::Value;

/// Platform operations, used to inject failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformCall {
    FindRole,
    CreateRole,
    MembersWithRole,
    FindChannel,
    CreateChannel,
    ChannelMessage,
    DirectMessage,
    ListGuilds,
    LeaveGuild,
    RegisterCommands,
}

/// A channel known to the fake platform with the request that produced it
#[derive(Debug, Clone)]
pub struct RecordedChannel {
    pub channel: ChannelRef,
    pub request: CreateChannel,
}

#[derive(Debug, Default)]
struct State {
    roles: Vec<RoleRef>,
    role_members: HashMap<Snowflake, Vec<Snowflake>>,
    channels: Vec<RecordedChannel>,
    channel_messages: Vec<(Snowflake, String)>,
    direct_messages: Vec<(Snowflake, String)>,
    unreachable: HashSet<Snowflake>,
    failing: HashSet<PlatformCall>,
    guilds: Vec<GuildRef>,
    left_guilds: Vec<Snowflake>,
    commands: Option<Value>,
    calls: Vec<PlatformCall>,
}

/// Fake [`PlatformClient`] that keeps everything in memory
#[derive(Debug)]
pub struct RecordingPlatform {
    state: Mutex<State>,
    next_id: AtomicU64,
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            next_id: AtomicU64::new(5000),
        }
    }

    fn next_id(&self) -> Snowflake {
        Snowflake::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn record(&self, call: PlatformCall) -> PlatformResult<()> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.failing.contains(&call) {
            return Err(PlatformError::Transport(format!("{call:?} failed")));
        }
        Ok(())
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Add a role that already exists before the test runs
    pub fn with_role(&self, name: &str) -> RoleRef {
        let role = RoleRef {
            id: self.next_id(),
            name: name.to_string(),
        };
        self.state.lock().roles.push(role.clone());
        role
    }

    /// Add a channel that already exists before the test runs
    pub fn with_channel(&self, guild_id: Snowflake, name: &str, kind: ChannelKind) -> ChannelRef {
        let channel = ChannelRef {
            id: self.next_id(),
            guild_id,
            name: name.to_string(),
            kind,
        };
        self.state.lock().channels.push(RecordedChannel {
            channel: channel.clone(),
            request: CreateChannel::new(name, kind),
        });
        channel
    }

    pub fn assign_role(&self, role_id: Snowflake, member_id: Snowflake) {
        self.state.lock().role_members.entry(role_id).or_default().push(member_id);
    }

    pub fn add_guild(&self, id: Snowflake, name: &str) {
        self.state.lock().guilds.push(GuildRef {
            id,
            name: name.to_string(),
        });
    }

    /// Make direct messages to `user_id` fail as if the user blocks them
    pub fn set_unreachable(&self, user_id: Snowflake) {
        self.state.lock().unreachable.insert(user_id);
    }

    /// Make every future call of this kind fail with a transport error
    pub fn fail(&self, call: PlatformCall) {
        self.state.lock().failing.insert(call);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn roles(&self) -> Vec<RoleRef> {
        self.state.lock().roles.clone()
    }

    pub fn channels(&self, kind: ChannelKind) -> Vec<RecordedChannel> {
        self.state
            .lock()
            .channels
            .iter()
            .filter(|recorded| recorded.channel.kind == kind)
            .cloned()
            .collect()
    }

    pub fn channel_messages(&self) -> Vec<(Snowflake, String)> {
        self.state.lock().channel_messages.clone()
    }

    pub fn direct_messages(&self) -> Vec<(Snowflake, String)> {
        self.state.lock().direct_messages.clone()
    }

    pub fn left_guilds(&self) -> Vec<Snowflake> {
        self.state.lock().left_guilds.clone()
    }

    pub fn registered_commands(&self) -> Option<Value> {
        self.state.lock().commands.clone()
    }

    /// Number of times `call` was attempted
    pub fn calls(&self, call: PlatformCall) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == call).count()
    }
}

#[async_trait]
impl PlatformClient for RecordingPlatform {
    async fn find_role_by_name(&self, _guild_id: Snowflake, name: &str) -> PlatformResult<Option<RoleRef>> {
        self.record(PlatformCall::FindRole)?;
        // Let concurrent tasks interleave between lookup and create
        tokio::task::yield_now().await;
        Ok(self.state.lock().roles.iter().find(|role| role.name == name).cloned())
    }

    async fn create_role(&self, _guild_id: Snowflake, name: &str) -> PlatformResult<RoleRef> {
        self.record(PlatformCall::CreateRole)?;
        tokio::task::yield_now().await;
        Ok(self.with_role(name))
    }

    async fn members_with_role(&self, _guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<Vec<Snowflake>> {
        self.record(PlatformCall::MembersWithRole)?;
        Ok(self
            .state
            .lock()
            .role_members
            .get(&role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_channel_by_name(
        &self,
        guild_id: Snowflake,
        name: &str,
        kind: ChannelKind,
    ) -> PlatformResult<Option<ChannelRef>> {
        self.record(PlatformCall::FindChannel)?;
        tokio::task::yield_now().await;
        Ok(self
            .state
            .lock()
            .channels
            .iter()
            .map(|recorded| &recorded.channel)
            .find(|c| c.guild_id == guild_id && c.name == name && c.kind == kind)
            .cloned())
    }

    async fn create_channel(&self, guild_id: Snowflake, request: &CreateChannel) -> PlatformResult<ChannelRef> {
        self.record(PlatformCall::CreateChannel)?;
        tokio::task::yield_now().await;

        let channel = ChannelRef {
            id: self.next_id(),
            guild_id,
            name: request.name.clone(),
            kind: request.kind,
        };
        self.state.lock().channels.push(RecordedChannel {
            channel: channel.clone(),
            request: request.clone(),
        });
        Ok(channel)
    }

    async fn send_channel_message(&self, channel_id: Snowflake, content: &str) -> PlatformResult<()> {
        self.record(PlatformCall::ChannelMessage)?;
        self.state
            .lock()
            .channel_messages
            .push((channel_id, content.to_string()));
        Ok(())
    }

    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()> {
        self.record(PlatformCall::DirectMessage)?;
        let mut state = self.state.lock();
        if state.unreachable.contains(&user_id) {
            return Err(PlatformError::RecipientUnreachable(user_id));
        }
        state.direct_messages.push((user_id, content.to_string()));
        Ok(())
    }

    async fn list_guilds(&self) -> PlatformResult<Vec<GuildRef>> {
        self.record(PlatformCall::ListGuilds)?;
        Ok(self.state.lock().guilds.clone())
    }

    async fn leave_guild(&self, guild_id: Snowflake) -> PlatformResult<()> {
        self.record(PlatformCall::LeaveGuild)?;
        let mut state = self.state.lock();
        state.guilds.retain(|guild| guild.id != guild_id);
        state.left_guilds.push(guild_id);
        Ok(())
    }

    async fn register_commands(
        &self,
        _application_id: Snowflake,
        _guild_id: Snowflake,
        commands: &Value,
    ) -> PlatformResult<()> {
        self.record(PlatformCall::RegisterCommands)?;
        self.state.lock().commands = Some(commands.clone());
        Ok(())
    }
}

/// Guild used by unit tests
#[cfg(test)]
pub(crate) const TEST_GUILD: Snowflake = Snowflake::new(1000);

/// Context over an in-memory store and a recording platform
#[cfg(test)]
pub(crate) fn test_context() -> (
    crate::services::ServiceContext,
    std::sync::Arc<muster_db::MemoryDocumentStore>,
    std::sync::Arc<RecordingPlatform>,
) {
    use std::sync::Arc;

    let store = Arc::new(muster_db::MemoryDocumentStore::new());
    let platform = Arc::new(RecordingPlatform::new());
    let ctx = crate::services::ServiceContext::new(
        store.clone(),
        platform.clone(),
        muster_common::OnboardingConfig::default(),
        TEST_GUILD,
    );
    (ctx, store, platform)
}
