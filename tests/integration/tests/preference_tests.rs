//! Preference Integration Tests
//!
//! Drive `/preferences` through the command registry against the in-memory
//! store, and the same workflow against PostgreSQL when `DATABASE_URL` is set.
//!
//! Run with: cargo test -p integration-tests --test preference_tests

use integration_tests::{check_test_env, member, recruit, unique_id, Preferences, TestContext};
use muster_core::{Rank, RoleKey};
use muster_service::{MemberScope, PreferenceService};

// ============================================================================
// Set / Get
// ============================================================================

#[tokio::test]
async fn test_last_write_wins() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    t.dispatch(&prefs.set("medic", 1)).await;
    t.dispatch(&prefs.set("medic", 3)).await;
    let reply = t.dispatch(&prefs.set("medic", 2)).await;
    assert_eq!(reply.content, "You set your preference for **medic** to `sometimes`");

    let reply = t.dispatch(&prefs.get()).await;
    assert_eq!(reply.content, "# Your role preferences:\n\n**medic**: sometimes");
    assert!(reply.ephemeral);
}

#[tokio::test]
async fn test_get_without_preferences() {
    let t = TestContext::memory();
    let user = recruit();

    let reply = t.dispatch(&Preferences::by(&user).get()).await;
    assert_eq!(reply.content, "You haven't set any role preferences yet.");
}

#[tokio::test]
async fn test_set_records_identity_and_guild() {
    let t = TestContext::memory();
    let user = member(unique_id(), "Sgt Stone");

    t.dispatch(&Preferences::by(&user).set("sniper", 3)).await;

    let record = t.record(user.id).await;
    assert_eq!(record.last_known_display_name, "Sgt Stone");
    assert_eq!(record.last_known_guild_id, Some(integration_tests::GUILD));
    assert_eq!(record.last_known_guild_name.as_deref(), Some(integration_tests::GUILD_NAME));
}

#[tokio::test]
async fn test_invalid_preference_value_is_rejected() {
    let t = TestContext::memory();
    let user = recruit();

    let reply = t.dispatch(&Preferences::by(&user).set("medic", 7)).await;
    assert_eq!(reply.content, "`7` is not a valid preference.");

    let reply = t.dispatch(&Preferences::by(&user).get()).await;
    assert_eq!(reply.content, "You haven't set any role preferences yet.");
}

// ============================================================================
// Remove / Clear
// ============================================================================

#[tokio::test]
async fn test_remove_then_remove_again() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    t.dispatch(&prefs.set("medic", 1)).await;
    t.dispatch(&prefs.set("sniper", 2)).await;

    let reply = t.dispatch(&prefs.remove("medic")).await;
    assert_eq!(reply.content, "You removed your preference for **medic**.");

    let reply = t.dispatch(&prefs.get()).await;
    assert!(!reply.content.contains("medic"));
    assert!(reply.content.contains("**sniper**: sometimes"));

    let reply = t.dispatch(&prefs.remove("medic")).await;
    assert_eq!(reply.content, "You haven't set a preference for **medic** yet.");
}

#[tokio::test]
async fn test_clear_then_clear_again() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    t.dispatch(&prefs.set("medic", 1)).await;
    t.dispatch(&prefs.set("leadership", 3)).await;

    let reply = t.dispatch(&prefs.clear()).await;
    assert_eq!(reply.content, "You cleared all your role preferences.");

    let reply = t.dispatch(&prefs.get()).await;
    assert_eq!(reply.content, "You haven't set any role preferences yet.");

    let reply = t.dispatch(&prefs.clear()).await;
    assert_eq!(reply.content, "You haven't set any role preferences yet.");
}

// ============================================================================
// Import
// ============================================================================

#[tokio::test]
async fn test_import_duplicate_key_last_wins() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    let reply = t
        .dispatch(&prefs.import("medic=never&sniper=sometimes&medic=always"))
        .await;
    assert_eq!(reply.content, "Preferences imported successfully.");

    let stored = PreferenceService::new(&t.ctx).get(user.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.get(RoleKey::Medic).map(|e| e.rank()), Some(Rank::Always));
    assert_eq!(stored.get(RoleKey::Sniper).map(|e| e.rank()), Some(Rank::Sometimes));
}

#[tokio::test]
async fn test_import_merges_with_existing_roles() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    t.dispatch(&prefs.set("leadership", 3)).await;
    t.dispatch(&prefs.import("Medic=NEVER")).await;

    let stored = PreferenceService::new(&t.ctx).get(user.id).await.unwrap();
    assert_eq!(stored.get(RoleKey::Leadership).map(|e| e.rank()), Some(Rank::Always));
    assert_eq!(stored.get(RoleKey::Medic).map(|e| e.rank()), Some(Rank::Never));
}

#[tokio::test]
async fn test_import_with_unknown_label_writes_nothing() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);

    let reply = t
        .dispatch(&prefs.import("rifleman=sometimes&marksman=often&medic=never"))
        .await;
    assert!(reply.ephemeral);
    assert!(reply.content.contains("marksman=often"));
    assert!(reply.content.ends_with("Nothing was imported."));

    let stored = PreferenceService::new(&t.ctx).get(user.id).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_import_with_unknown_role_writes_nothing() {
    let t = TestContext::memory();
    let user = recruit();

    let reply = t
        .dispatch(&Preferences::by(&user).import("medic=always&cook=never"))
        .await;
    assert!(reply.content.contains("cook=never"));

    let stored = PreferenceService::new(&t.ctx).get(user.id).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_import_malformed_string() {
    let t = TestContext::memory();
    let user = recruit();

    let reply = t.dispatch(&Preferences::by(&user).import("medic")).await;
    assert!(reply.content.starts_with("That preferences string could not be read"));
}

// ============================================================================
// Concurrency and isolation
// ============================================================================

#[tokio::test]
async fn test_concurrent_sets_on_different_roles_both_survive() {
    let t = TestContext::memory();
    let user = recruit();
    let prefs = Preferences::by(&user);
    let (medic, sniper) = (prefs.set("medic", 1), prefs.set("sniper", 2));

    let (a, b) = tokio::join!(t.dispatch(&medic), t.dispatch(&sniper));
    assert!(a.content.starts_with("You set"));
    assert!(b.content.starts_with("You set"));

    let stored = PreferenceService::new(&t.ctx).get(user.id).await.unwrap();
    assert_eq!(stored.get(RoleKey::Medic).map(|e| e.rank()), Some(Rank::Never));
    assert_eq!(stored.get(RoleKey::Sniper).map(|e| e.rank()), Some(Rank::Sometimes));
}

#[tokio::test]
async fn test_preference_writes_keep_activity_counters() {
    let t = TestContext::memory();
    let user = recruit();
    let orchestrator = muster_service::LifecycleOrchestrator::new(&t.ctx);

    orchestrator.on_message_created(&user).await;
    orchestrator.on_message_created(&user).await;
    t.dispatch(&Preferences::by(&user).import("medic=always&sniper=never")).await;
    t.dispatch(&Preferences::by(&user).clear()).await;

    let record = t.record(user.id).await;
    assert_eq!(record.message_count, 2);
    assert!(record.inserted_at.is_some());
}

#[tokio::test]
async fn test_members_are_isolated() {
    let t = TestContext::memory();
    let (alice, bob) = (recruit(), recruit());

    t.dispatch(&Preferences::by(&alice).set("medic", 3)).await;
    t.dispatch(&Preferences::by(&bob).clear()).await;

    let stored = PreferenceService::new(&t.ctx).get(alice.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[tokio::test]
async fn test_postgres_preference_workflow() {
    if !check_test_env() {
        return;
    }

    let t = TestContext::postgres().await.expect("Failed to connect to PostgreSQL");
    let user = recruit();
    let scope = MemberScope::new(integration_tests::GUILD, user.clone());
    let service = PreferenceService::new(&t.ctx);

    service.set(&scope, RoleKey::Medic, Rank::Never).await.unwrap();
    service.set(&scope, RoleKey::Medic, Rank::Always).await.unwrap();
    service.import(&scope, "sniper=sometimes").await.unwrap();

    let stored = service.get(user.id).await.unwrap();
    assert_eq!(stored.get(RoleKey::Medic).map(|e| e.rank()), Some(Rank::Always));
    assert_eq!(stored.get(RoleKey::Sniper).map(|e| e.rank()), Some(Rank::Sometimes));

    assert!(service.import(&scope, "medic=often").await.is_err());
    assert_eq!(service.get(user.id).await.unwrap().len(), 2);

    service.clear(&scope).await.unwrap();
    assert!(service.get(user.id).await.unwrap().is_empty());
}
