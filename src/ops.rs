//! Chat-facing operation surface.
//!
//! Turns untyped requests (strings out of a chat pipeline) into engine
//! calls and uniform responses. Input validation happens here, before any
//! state is loaded: a malformed direction is rejected without touching the
//! session or writing a snapshot.

use crate::persist::SnapshotStore;
use crate::session::{SessionError, SessionManager};
use crate::world::{CombatState, Direction, Item, Player, Room, RoomType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One operation against a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    GetCurrentRoom,
    GetPlayerStats,
    Move { direction: String },
    CombatAction { action: String },
    Loot,
}

/// Uniform response envelope for every operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl OpResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            payload: None,
        }
    }
}

/// What a player is told about a room. Hides monster stats and treasure
/// contents; those surface through combat and looting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomView {
    pub name: String,
    pub description: String,
    pub room_type: RoomType,
    pub exits: Vec<Direction>,
    pub has_monster: bool,
    pub has_treasure: bool,
}

impl RoomView {
    pub fn from_room(room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            description: room.description.clone(),
            room_type: room.room_type,
            exits: room.exits.iter().map(|exit| exit.direction).collect(),
            has_monster: room.has_live_monsters(),
            has_treasure: room.has_unclaimed_treasure(),
        }
    }
}

/// The player's sheet with derived combat totals folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStatsView {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub experience: u32,
    pub total_damage: i32,
    pub total_defense: i32,
    pub inventory_count: usize,
}

impl PlayerStatsView {
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            class: player.class.clone(),
            level: player.level,
            health: player.health,
            max_health: player.max_health,
            experience: player.experience,
            total_damage: player.total_damage(),
            total_defense: player.total_defense(),
            inventory_count: player.inventory.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CombatView {
    combat: Option<CombatState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LootView {
    items: Vec<Item>,
}

impl<S: SnapshotStore> SessionManager<S> {
    /// Dispatch one request against a session. `message_id` identifies the
    /// chat message that triggered it and keys any snapshot written.
    pub async fn handle(
        &self,
        session_id: Uuid,
        message_id: Uuid,
        request: Request,
    ) -> Result<OpResponse, SessionError> {
        match request {
            Request::GetCurrentRoom => {
                let room = self.current_room(session_id).await?;
                let view = RoomView::from_room(&room);
                Ok(OpResponse {
                    success: true,
                    message: format!("You are in {}", view.name),
                    payload: Some(serde_json::to_value(&view)?),
                })
            }
            Request::GetPlayerStats => {
                let player = self.player_stats(session_id).await?;
                let view = PlayerStatsView::from_player(&player);
                Ok(OpResponse {
                    success: true,
                    message: format!("{}, level {} {}", view.name, view.level, view.class),
                    payload: Some(serde_json::to_value(&view)?),
                })
            }
            Request::Move { direction } => {
                let direction: Direction = match direction.parse() {
                    Ok(direction) => direction,
                    Err(error) => return Ok(OpResponse::failure(format!("{error}"))),
                };
                let (outcome, room) = self.move_player(session_id, message_id, direction).await?;
                let payload = match room {
                    Some(room) => Some(serde_json::to_value(RoomView::from_room(&room))?),
                    None => None,
                };
                Ok(OpResponse {
                    success: outcome.ok,
                    message: outcome.message,
                    payload,
                })
            }
            Request::CombatAction { action } => {
                let outcome = self.combat_action(session_id, message_id, &action).await?;
                let payload = if outcome.ok {
                    Some(serde_json::to_value(CombatView {
                        combat: outcome.combat,
                    })?)
                } else {
                    None
                };
                Ok(OpResponse {
                    success: outcome.ok,
                    message: outcome.message,
                    payload,
                })
            }
            Request::Loot => {
                let outcome = self.loot(session_id, message_id).await?;
                let payload = match outcome.items {
                    Some(items) => Some(serde_json::to_value(LootView { items })?),
                    None => None,
                };
                Ok(OpResponse {
                    success: outcome.ok,
                    message: outcome.message,
                    payload,
                })
            }
        }
    }
}
