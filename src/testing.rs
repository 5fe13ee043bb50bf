//! Testing utilities for the dungeon engine.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted play-throughs against an in-memory store
//! - Assertion helpers for verifying game state

use crate::persist::{MemorySnapshotStore, SnapshotStore};
use crate::rules::{CombatOutcome, LootOutcome, MoveOutcome};
use crate::session::{SessionConfig, SessionError, SessionManager};
use crate::world::{Direction, GameState};
use uuid::Uuid;

/// A scripted game session over an in-memory snapshot store.
///
/// Each mutating call mints a fresh message id, so snapshot history grows
/// one entry per successful operation just as it would in a live chat.
pub struct TestHarness {
    manager: SessionManager<MemorySnapshotStore>,
    session_id: Uuid,
}

impl TestHarness {
    /// Create a harness with a fixed damage seed for reproducible fights.
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        let manager = SessionManager::new(
            MemorySnapshotStore::new(),
            SessionConfig::new()
                .with_player_name("Test Hero")
                .with_rng_seed(seed),
        );
        Self {
            manager,
            session_id: Uuid::new_v4(),
        }
    }

    pub fn manager(&self) -> &SessionManager<MemorySnapshotStore> {
        &self.manager
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The session's current state as the next operation would see it.
    pub async fn state(&self) -> GameState {
        match self.manager.load_state(self.session_id).await {
            Ok(state) => state,
            Err(error) => panic!("failed to load state: {error}"),
        }
    }

    pub async fn move_player(&self, direction: Direction) -> Result<MoveOutcome, SessionError> {
        let (outcome, _) = self
            .manager
            .move_player(self.session_id, Uuid::new_v4(), direction)
            .await?;
        Ok(outcome)
    }

    pub async fn combat_action(&self, action: &str) -> Result<CombatOutcome, SessionError> {
        self.manager
            .combat_action(self.session_id, Uuid::new_v4(), action)
            .await
    }

    pub async fn loot(&self) -> Result<LootOutcome, SessionError> {
        self.manager.loot(self.session_id, Uuid::new_v4()).await
    }

    /// Attack until the current fight resolves one way or the other.
    ///
    /// Returns the final round's outcome. Panics if the fight is still open
    /// after `max_rounds`, which indicates a stuck combat loop.
    pub async fn fight_to_the_end(&self, max_rounds: usize) -> CombatOutcome {
        for _ in 0..max_rounds {
            let outcome = match self.combat_action("attack").await {
                Ok(outcome) => outcome,
                Err(error) => panic!("combat action failed: {error}"),
            };
            let state = self.state().await;
            if !state.in_combat() {
                return outcome;
            }
        }
        panic!("combat did not resolve within {max_rounds} rounds");
    }

    pub async fn snapshot_count(&self) -> usize {
        match self.manager.store().history(self.session_id).await {
            Ok(history) => history.len(),
            Err(error) => panic!("failed to read history: {error}"),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ASSERTION HELPERS
// =============================================================================

/// Assert the player is in the named room.
#[track_caller]
pub fn assert_in_room(state: &GameState, name: &str) {
    let actual = state.current_room().map(|room| room.name.as_str());
    assert_eq!(
        actual,
        Some(name),
        "Expected to be in '{name}', got {actual:?}"
    );
}

/// Assert player HP is at expected values.
#[track_caller]
pub fn assert_hp(state: &GameState, current: i32, max: i32) {
    assert_eq!(
        (state.player.health, state.player.max_health),
        (current, max),
        "Expected HP {current}/{max}, got {}/{}",
        state.player.health,
        state.player.max_health
    );
}

/// Assert the player is in combat.
#[track_caller]
pub fn assert_in_combat(state: &GameState) {
    assert!(state.in_combat(), "Expected to be in combat");
}

/// Assert the player is NOT in combat.
#[track_caller]
pub fn assert_not_in_combat(state: &GameState) {
    assert!(!state.in_combat(), "Expected to NOT be in combat");
}

/// Assert the player is at the expected level.
#[track_caller]
pub fn assert_level(state: &GameState, level: u32) {
    assert_eq!(
        state.player.level, level,
        "Expected level {level}, got {}",
        state.player.level
    );
}

/// Assert the player's inventory holds an item with the given name.
#[track_caller]
pub fn assert_has_item(state: &GameState, name: &str) {
    assert!(
        state.player.inventory.iter().any(|item| item.name == name),
        "Expected inventory to contain '{name}'"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_starts_at_the_entrance() {
        let harness = TestHarness::new();
        let state = harness.state().await;

        assert_in_room(&state, "Entrance Hall");
        assert_hp(&state, 100, 100);
        assert_not_in_combat(&state);
        assert_eq!(harness.snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn test_fight_to_the_end_resolves_the_goblin() {
        let harness = TestHarness::new();
        harness.move_player(Direction::North).await.unwrap();

        let outcome = harness.fight_to_the_end(64).await;
        assert!(outcome.ok);

        let state = harness.state().await;
        assert_not_in_combat(&state);
    }
}
