//! Onboarding Integration Tests
//!
//! Drive lifecycle events through the orchestrator against the in-memory store
//! and the recording platform.
//!
//! Run with: cargo test -p integration-tests --test onboarding_tests

use futures::future::join_all;
use integration_tests::{application, member, recruit, unique_id, TestContext, GUILD};
use muster_core::{ChannelKind, LifecycleEvent, Snowflake, StepStatus};
use muster_service::testing::PlatformCall;
use muster_service::LifecycleOrchestrator;

fn joined(member: muster_core::MemberRef) -> LifecycleEvent {
    LifecycleEvent::MemberJoined { guild_id: GUILD, member }
}

// ============================================================================
// Join
// ============================================================================

#[tokio::test]
async fn test_join_provisions_one_private_channel() {
    let t = TestContext::memory();
    let user = member(unique_id(), "Pvt Ryan");

    LifecycleOrchestrator::new(&t.ctx).handle(joined(user.clone())).await;

    assert_eq!(t.platform.roles().len(), 1);
    assert_eq!(t.platform.channels(ChannelKind::Category).len(), 1);

    let channels = t.platform.channels(ChannelKind::Text);
    assert_eq!(channels.len(), 1);
    let channel = &channels[0];
    assert_eq!(channel.channel.name, "pvt-ryan");
    assert_eq!(
        channel.request.parent_id,
        Some(t.platform.channels(ChannelKind::Category)[0].channel.id)
    );
    assert_eq!(channel.request.overwrites.len(), 3);

    let greetings = t.platform.channel_messages();
    assert_eq!(greetings.len(), 1);
    assert_eq!(greetings[0].0, channel.channel.id);
    assert!(greetings[0].1.contains(&user.mention()));

    let record = t.record(user.id).await;
    assert_eq!(record.join_count(), 1);
    let report = record.provisioning.expect("provisioning report stored");
    assert!(report.is_complete());
    assert_eq!(report.channel_id, Some(channel.channel.id));
}

#[tokio::test]
async fn test_join_reuses_existing_role_and_category() {
    let t = TestContext::memory();
    let orchestrator = LifecycleOrchestrator::new(&t.ctx);

    orchestrator.handle(joined(recruit())).await;
    orchestrator.handle(joined(recruit())).await;

    assert_eq!(t.platform.calls(PlatformCall::CreateRole), 1);
    assert_eq!(t.platform.roles().len(), 1);
    assert_eq!(t.platform.channels(ChannelKind::Category).len(), 1);
    assert_eq!(t.platform.channels(ChannelKind::Text).len(), 2);
}

#[tokio::test]
async fn test_concurrent_joins_create_shared_resources_once() {
    let t = TestContext::memory();
    let orchestrator = LifecycleOrchestrator::new(&t.ctx);
    let members: Vec<_> = (0..8).map(|_| recruit()).collect();

    join_all(members.iter().cloned().map(|m| orchestrator.handle(joined(m)))).await;

    assert_eq!(t.platform.roles().len(), 1);
    assert_eq!(t.platform.channels(ChannelKind::Category).len(), 1);
    assert_eq!(t.platform.channels(ChannelKind::Text).len(), members.len());
}

#[tokio::test]
async fn test_recruiters_are_notified_even_when_one_blocks_dms() {
    let t = TestContext::memory();
    let role = t.platform.with_role("ncg/recruitment");
    let recruiters: Vec<Snowflake> = (0..4).map(|_| unique_id()).collect();
    for id in &recruiters {
        t.platform.assign_role(role.id, *id);
    }
    t.platform.set_unreachable(recruiters[1]);

    LifecycleOrchestrator::new(&t.ctx).handle(joined(recruit())).await;

    let dms = t.platform.direct_messages();
    assert_eq!(dms.len(), recruiters.len() - 1);
    assert!(dms.iter().all(|(to, _)| *to != recruiters[1]));

    let channel = t.platform.channels(ChannelKind::Text).remove(0).channel;
    let url = format!("/channels/{GUILD}/{}", channel.id);
    assert!(dms.iter().all(|(_, content)| content.contains(&url)));
}

#[tokio::test]
async fn test_join_without_role_skips_later_steps() {
    let t = TestContext::memory();
    t.platform.fail(PlatformCall::CreateRole);
    let user = recruit();

    LifecycleOrchestrator::new(&t.ctx).handle(joined(user.clone())).await;

    assert!(t.platform.channels(ChannelKind::Text).is_empty());
    assert!(t.platform.direct_messages().is_empty());

    let report = t.record(user.id).await.provisioning.expect("report stored");
    assert_eq!(report.role, StepStatus::Failed);
    assert_eq!(report.container, StepStatus::Skipped);
    assert_eq!(report.channel, StepStatus::Skipped);
    assert_eq!(report.greeting, StepStatus::Skipped);
}

#[tokio::test]
async fn test_join_in_another_guild_is_ignored() {
    let t = TestContext::memory();
    let user = recruit();

    LifecycleOrchestrator::new(&t.ctx)
        .handle(LifecycleEvent::MemberJoined {
            guild_id: Snowflake::new(2000),
            member: user.clone(),
        })
        .await;

    assert!(t.platform.roles().is_empty());
    assert!(muster_service::MemberDirectory::new(&t.ctx)
        .get(user.id)
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Leave and rejoin
// ============================================================================

#[tokio::test]
async fn test_leave_sends_farewell_and_records_history() {
    let t = TestContext::memory();
    let orchestrator = LifecycleOrchestrator::new(&t.ctx);
    let user = recruit();

    orchestrator.handle(joined(user.clone())).await;
    orchestrator
        .handle(LifecycleEvent::MemberLeft {
            guild_id: GUILD,
            member: user.clone(),
        })
        .await;

    let farewell = t
        .platform
        .direct_messages()
        .into_iter()
        .find(|(to, _)| *to == user.id)
        .expect("farewell sent");
    assert!(farewell.1.contains(&user.mention()));

    let record = t.record(user.id).await;
    assert!(record.has_left());

    orchestrator.handle(joined(user.clone())).await;
    let record = t.record(user.id).await;
    assert_eq!(record.join_count(), 2);
    assert!(!record.has_left());
    assert_eq!(t.platform.channels(ChannelKind::Text).len(), 2);
}

#[tokio::test]
async fn test_leave_of_unreachable_member_is_still_recorded() {
    let t = TestContext::memory();
    let user = recruit();
    t.platform.set_unreachable(user.id);

    LifecycleOrchestrator::new(&t.ctx)
        .handle(LifecycleEvent::MemberLeft {
            guild_id: GUILD,
            member: user.clone(),
        })
        .await;

    assert_eq!(t.record(user.id).await.leave_history.len(), 1);
}

// ============================================================================
// Message activity
// ============================================================================

#[tokio::test]
async fn test_message_count_in_any_order() {
    let t = TestContext::memory();
    let orchestrator = LifecycleOrchestrator::new(&t.ctx);
    let user = recruit();

    let created = |n: u64| LifecycleEvent::MessageCreated {
        guild_id: Some(GUILD),
        message_id: Snowflake::new(n),
        author: user.clone(),
    };
    let deleted = LifecycleEvent::MessageDeleted {
        guild_id: Some(GUILD),
        message_id: Snowflake::new(1),
        author: Some(user.clone()),
    };

    join_all([
        orchestrator.handle(deleted),
        orchestrator.handle(created(1)),
        orchestrator.handle(created(2)),
        orchestrator.handle(created(3)),
    ])
    .await;

    assert_eq!(t.record(user.id).await.message_count, 2);
}

#[tokio::test]
async fn test_bot_and_unknown_authors_are_not_counted() {
    let t = TestContext::memory();
    let orchestrator = LifecycleOrchestrator::new(&t.ctx);
    let mut bot = recruit();
    bot.bot = true;

    orchestrator
        .handle(LifecycleEvent::MessageCreated {
            guild_id: Some(GUILD),
            message_id: Snowflake::new(1),
            author: bot.clone(),
        })
        .await;
    orchestrator
        .handle(LifecycleEvent::MessageDeleted {
            guild_id: Some(GUILD),
            message_id: Snowflake::new(2),
            author: None,
        })
        .await;

    assert!(muster_service::MemberDirectory::new(&t.ctx)
        .get(bot.id)
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Applications
// ============================================================================

#[tokio::test]
async fn test_application_lands_in_applications_channel() {
    let t = TestContext::memory();
    let channel = t.platform.with_channel(GUILD, "applications", ChannelKind::Text);
    let user = recruit();

    let reply = t.dispatch(&application(&user, "Ryan", 24)).await;
    assert!(reply.ephemeral);
    assert!(reply.content.starts_with("Your application has been received!"));

    let posts = t.platform.channel_messages();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, channel.id);
    assert!(posts[0].1.contains("\"name\": \"Ryan\""));
}

#[tokio::test]
async fn test_application_without_channel_gets_generic_reply() {
    let t = TestContext::memory();

    let reply = t.dispatch(&application(&recruit(), "Ryan", 24)).await;
    assert_eq!(reply.content, "Something went wrong! 😔");
    assert!(t.platform.channel_messages().is_empty());
}

#[tokio::test]
async fn test_application_with_invalid_age_is_rejected() {
    let t = TestContext::memory();
    t.platform.with_channel(GUILD, "applications", ChannelKind::Text);

    let reply = t.dispatch(&application(&recruit(), "Ryan", 9)).await;
    assert!(reply.ephemeral);
    assert_ne!(reply.content, "Something went wrong! 😔");
    assert!(t.platform.channel_messages().is_empty());
}
