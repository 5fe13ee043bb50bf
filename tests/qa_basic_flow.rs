//! QA tests for the basic game flow using the public operation surface.
//!
//! These tests walk the tutorial dungeon end to end:
//! - Querying the starting room and player sheet
//! - Moving north into the guard chamber and winning the fight
//! - Moving east into the vault and looting it
//!
//! Run with: `cargo test --test qa_basic_flow`

use dungeon_core::testing::{
    assert_has_item, assert_in_combat, assert_in_room, assert_level, assert_not_in_combat,
    TestHarness,
};
use dungeon_core::{Direction, Request};
use uuid::Uuid;

#[tokio::test]
async fn test_full_play_through() {
    let harness = TestHarness::new();
    let manager = harness.manager();
    let session = harness.session_id();

    // Starting room: the entrance, one exit north, nothing to fight or loot.
    let response = manager
        .handle(session, Uuid::new_v4(), Request::GetCurrentRoom)
        .await
        .unwrap();
    assert!(response.success);
    let payload = response.payload.unwrap();
    assert_eq!(payload["name"], "Entrance Hall");
    assert_eq!(payload["exits"], serde_json::json!(["North"]));
    assert_eq!(payload["has_monster"], false);
    assert_eq!(payload["has_treasure"], false);

    // Moving north engages the goblin.
    let outcome = harness.move_player(Direction::North).await.unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.message, "You move North to Guard Chamber");

    let state = harness.state().await;
    assert_in_room(&state, "Guard Chamber");
    assert_in_combat(&state);

    // The fight blocks further movement until it resolves.
    let blocked = harness.move_player(Direction::South).await.unwrap();
    assert!(!blocked.ok);
    assert_eq!(blocked.message, "You cannot move while in combat!");

    // Attack until the goblin falls.
    let victory = harness.fight_to_the_end(64).await;
    assert!(victory.ok);
    assert!(victory.message.contains("Goblin defeated! You gain 50 XP."));
    assert!(victory.combat.is_none());

    let state = harness.state().await;
    assert_not_in_combat(&state);
    assert_eq!(state.player.experience, 50);
    assert_level(&state, 1);

    // East into the vault, then loot it.
    let outcome = harness.move_player(Direction::East).await.unwrap();
    assert!(outcome.ok);
    assert_eq!(outcome.message, "You move East to Treasure Vault");

    let loot = harness.loot().await.unwrap();
    assert!(loot.ok);
    assert_eq!(
        loot.message,
        "You loot the treasure and find: Iron Sword, Healing Potion"
    );

    let state = harness.state().await;
    assert_has_item(&state, "Iron Sword");
    assert_has_item(&state, "Healing Potion");

    // A second loot of the same vault is refused.
    let again = harness.loot().await.unwrap();
    assert!(!again.ok);
    assert_eq!(again.message, "This treasure has already been looted");
}

#[tokio::test]
async fn test_player_sheet_query() {
    let harness = TestHarness::new();
    let manager = harness.manager();

    let response = manager
        .handle(harness.session_id(), Uuid::new_v4(), Request::GetPlayerStats)
        .await
        .unwrap();
    assert!(response.success);

    let payload = response.payload.unwrap();
    assert_eq!(payload["name"], "Test Hero");
    assert_eq!(payload["class"], "Warrior");
    assert_eq!(payload["level"], 1);
    assert_eq!(payload["health"], 100);
    assert_eq!(payload["max_health"], 100);
    assert_eq!(payload["total_damage"], 7);
    assert_eq!(payload["total_defense"], 1);
}

#[tokio::test]
async fn test_moves_into_missing_exits_are_refused() {
    let harness = TestHarness::new();

    for direction in [Direction::South, Direction::East, Direction::West] {
        let outcome = harness.move_player(direction).await.unwrap();
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            format!("There is no exit to the {direction}")
        );
    }

    // Refused moves leave the player where they were.
    assert_in_room(&harness.state().await, "Entrance Hall");
    assert_eq!(harness.snapshot_count().await, 0);
}

#[tokio::test]
async fn test_backtracking_after_the_fight() {
    let harness = TestHarness::new();

    harness.move_player(Direction::North).await.unwrap();
    harness.fight_to_the_end(64).await;

    // The cleared chamber no longer re-engages on re-entry.
    harness.move_player(Direction::South).await.unwrap();
    let outcome = harness.move_player(Direction::North).await.unwrap();
    assert!(outcome.ok);

    let state = harness.state().await;
    assert_in_room(&state, "Guard Chamber");
    assert_not_in_combat(&state);
}
