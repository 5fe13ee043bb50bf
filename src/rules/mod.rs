//! Rules resolution for engine operations.
//!
//! Each resolver computes the next game state and a player-facing message for
//! one class of operation: navigation, combat, or looting. Rule violations
//! (moving mid-combat, acting out of turn, looting an empty chest) are
//! ordinary outcomes with `ok = false` and no state mutation. Data-integrity
//! faults, where the dungeon graph no longer resolves, are hard errors that
//! should end the session.

pub mod combat;
pub mod loot;
pub mod navigation;

use crate::world::{CombatState, Item, RoomId};
use thiserror::Error;

/// Unrecoverable data-integrity faults during resolution.
///
/// These indicate a corrupted game state, not a player mistake; they are never
/// reported back as a gameplay message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("current room {0} not found in dungeon")]
    CurrentRoomMissing(RoomId),

    #[error("exit target room {0} not found in dungeon")]
    TargetRoomMissing(RoomId),

    #[error("combat monster {0} not found in current room")]
    CombatMonsterMissing(crate::world::MonsterId),
}

/// Outcome of a move attempt.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub ok: bool,
    pub message: String,
    /// The room entered, when the move succeeded.
    pub new_room_id: Option<RoomId>,
}

impl MoveOutcome {
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            new_room_id: None,
        }
    }
}

/// Outcome of a combat action.
#[derive(Debug, Clone)]
pub struct CombatOutcome {
    pub ok: bool,
    pub message: String,
    /// The still-open encounter, or `None` when combat has ended (victory or
    /// defeat) or never applied.
    pub combat: Option<CombatState>,
}

impl CombatOutcome {
    pub(crate) fn violation(message: impl Into<String>, combat: Option<CombatState>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            combat,
        }
    }
}

/// Outcome of a loot attempt.
#[derive(Debug, Clone)]
pub struct LootOutcome {
    pub ok: bool,
    pub message: String,
    /// The items transferred to the inventory, when looting succeeded.
    pub items: Option<Vec<Item>>,
}

impl LootOutcome {
    pub(crate) fn violation(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            items: None,
        }
    }
}
