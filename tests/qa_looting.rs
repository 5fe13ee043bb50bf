//! QA tests for treasure looting through the session layer.
//!
//! Run with: `cargo test --test qa_looting`

use dungeon_core::testing::{assert_has_item, TestHarness};
use dungeon_core::{Direction, ItemType, Request};
use uuid::Uuid;

/// Clear the guard chamber so the vault is reachable.
async fn reach_the_vault(harness: &TestHarness) {
    harness.move_player(Direction::North).await.unwrap();
    harness.fight_to_the_end(64).await;
    harness.move_player(Direction::East).await.unwrap();
}

#[tokio::test]
async fn test_looting_outside_a_treasure_room_is_refused() {
    let harness = TestHarness::new();

    let outcome = harness.loot().await.unwrap();
    assert!(!outcome.ok);
    assert_eq!(outcome.message, "This room contains no treasure");
    assert_eq!(harness.snapshot_count().await, 0);
}

#[tokio::test]
async fn test_looting_the_vault_transfers_everything() {
    let harness = TestHarness::new();
    reach_the_vault(&harness).await;

    let outcome = harness.loot().await.unwrap();
    assert!(outcome.ok);
    assert_eq!(
        outcome.message,
        "You loot the treasure and find: Iron Sword, Healing Potion"
    );

    let items = outcome.items.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].item_type, ItemType::Weapon);
    assert_eq!(items[1].item_type, ItemType::Consumable);

    let state = harness.state().await;
    assert_has_item(&state, "Iron Sword");
    assert_has_item(&state, "Healing Potion");
    let room = state.current_room().unwrap();
    assert!(room.is_cleared);
    assert!(room.items.is_empty());
    assert!(!room.has_unclaimed_treasure());
}

#[tokio::test]
async fn test_second_loot_is_refused_and_not_persisted() {
    let harness = TestHarness::new();
    reach_the_vault(&harness).await;

    harness.loot().await.unwrap();
    let snapshots_after_loot = harness.snapshot_count().await;

    let again = harness.loot().await.unwrap();
    assert!(!again.ok);
    assert_eq!(again.message, "This treasure has already been looted");
    assert!(again.items.is_none());
    assert_eq!(harness.snapshot_count().await, snapshots_after_loot);

    // Inventory did not grow either.
    let state = harness.state().await;
    assert_eq!(state.player.inventory.len(), 2);
}

#[tokio::test]
async fn test_loot_over_the_request_surface() {
    let harness = TestHarness::new();
    reach_the_vault(&harness).await;

    let response = harness
        .manager()
        .handle(harness.session_id(), Uuid::new_v4(), Request::Loot)
        .await
        .unwrap();
    assert!(response.success);

    let payload = response.payload.unwrap();
    assert_eq!(payload["items"][0]["name"], "Iron Sword");
    assert_eq!(payload["items"][1]["name"], "Healing Potion");
}
