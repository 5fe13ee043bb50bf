//! Session orchestration.
//!
//! The `SessionManager` is the engine's front door: for one operation it
//! loads the session's latest snapshot (or builds a fresh game from the
//! template), applies exactly one rules resolution, and appends the updated
//! state to the snapshot store keyed to the triggering message. Rule
//! violations and invalid input never write a snapshot.
//!
//! The load--mutate--persist cycle for a session runs under a per-session
//! mutex, as the read-modify-write contract requires; operations on
//! different sessions proceed in parallel.

use crate::persist::{SnapshotId, SnapshotStore, StoreError};
use crate::rules::{
    combat::combat_action, loot::loot_room, navigation::move_player, CombatOutcome, EngineError,
    LootOutcome, MoveOutcome,
};
use crate::template;
use crate::world::{Direction, GameState, Player, Room};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("snapshot store error: {0}")]
    Store(#[from] StoreError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration for a session manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Player name used when a session materializes without an explicit one.
    pub default_player_name: String,

    /// Seed for the damage generator; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            default_player_name: "Adventurer".to_string(),
            rng_seed: None,
        }
    }

    /// Set the fallback player name for fresh sessions.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.default_player_name = name.into();
        self
    }

    /// Seed the damage generator for deterministic runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates game sessions against a snapshot store.
pub struct SessionManager<S: SnapshotStore> {
    store: S,
    config: SessionConfig,
    rng: Mutex<StdRng>,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: SnapshotStore> SessionManager<S> {
    pub fn new(store: S, config: SessionConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            config,
            rng: Mutex::new(rng),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying snapshot store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The mutex guarding one session's load--mutate--persist cycles.
    async fn session_lock(&self, session_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(session_id).or_default().clone()
    }

    /// Load the session's current state: the latest snapshot if it decodes,
    /// otherwise a fresh game from the template.
    pub async fn load_state(&self, session_id: Uuid) -> Result<GameState, SessionError> {
        match self.store.latest(session_id).await {
            Ok(Some(snapshot)) => match serde_json::from_str::<GameState>(&snapshot.state_json) {
                Ok(state) => Ok(state),
                Err(error) => {
                    tracing::warn!(%session_id, %error, "snapshot did not decode; starting fresh");
                    Ok(self.fresh_state(session_id))
                }
            },
            Ok(None) => {
                tracing::info!(%session_id, "no snapshot; starting fresh");
                Ok(self.fresh_state(session_id))
            }
            Err(StoreError::VersionMismatch { expected, found }) => {
                tracing::warn!(%session_id, expected, found, "snapshot version mismatch; starting fresh");
                Ok(self.fresh_state(session_id))
            }
            Err(error) => Err(error.into()),
        }
    }

    fn fresh_state(&self, session_id: Uuid) -> GameState {
        template::new_game_state(session_id, &self.config.default_player_name)
    }

    /// Explicitly create a session with a named player and persist its
    /// initial snapshot, so the audit trail starts at a known message.
    pub async fn new_session(
        &self,
        session_id: Uuid,
        player_name: &str,
        message_id: Uuid,
    ) -> Result<GameState, SessionError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut state = template::new_game_state(session_id, player_name);
        self.persist(&mut state, message_id).await?;
        Ok(state)
    }

    async fn persist(
        &self,
        state: &mut GameState,
        message_id: Uuid,
    ) -> Result<SnapshotId, SessionError> {
        state.touch();
        let state_json = serde_json::to_string(state)?;
        let id = self
            .store
            .append(state.session_id, message_id, state_json)
            .await?;
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Read-only queries: load only, never persist.
    // ------------------------------------------------------------------------

    /// The room the player currently stands in.
    pub async fn current_room(&self, session_id: Uuid) -> Result<Room, SessionError> {
        let state = self.load_state(session_id).await?;
        let room = state
            .current_room()
            .ok_or(EngineError::CurrentRoomMissing(state.current_room_id))?;
        Ok(room.clone())
    }

    /// The player character's current sheet.
    pub async fn player_stats(&self, session_id: Uuid) -> Result<Player, SessionError> {
        let state = self.load_state(session_id).await?;
        Ok(state.player)
    }

    // ------------------------------------------------------------------------
    // Mutating operations: one resolver call, snapshot on success.
    // ------------------------------------------------------------------------

    /// Move the player. On success the destination room accompanies the
    /// outcome.
    pub async fn move_player(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        direction: Direction,
    ) -> Result<(MoveOutcome, Option<Room>), SessionError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut state = self.load_state(session_id).await?;
        let outcome = move_player(&mut state, direction)?;

        let room = if outcome.ok {
            let room = outcome
                .new_room_id
                .and_then(|id| state.dungeon.room(id))
                .cloned();
            self.persist(&mut state, message_id).await?;
            room
        } else {
            None
        };

        Ok((outcome, room))
    }

    /// Resolve one combat round for the given action string.
    pub async fn combat_action(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        action: &str,
    ) -> Result<CombatOutcome, SessionError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut state = self.load_state(session_id).await?;
        let outcome = {
            let mut rng = self.rng.lock().await;
            combat_action(&mut state, action, &mut *rng)?
        };

        if outcome.ok {
            self.persist(&mut state, message_id).await?;
        }
        Ok(outcome)
    }

    /// Loot the current room.
    pub async fn loot(
        &self,
        session_id: Uuid,
        message_id: Uuid,
    ) -> Result<LootOutcome, SessionError> {
        let lock = self.session_lock(session_id).await;
        let _guard = lock.lock().await;

        let mut state = self.load_state(session_id).await?;
        let outcome = loot_room(&mut state)?;

        if outcome.ok {
            self.persist(&mut state, message_id).await?;
        }
        Ok(outcome)
    }
}
