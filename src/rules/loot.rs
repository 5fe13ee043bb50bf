//! One-shot treasure transfer.
//!
//! Looting moves every item in the current room into the player's inventory,
//! preserving order, and marks the room cleared. The cleared flag is the
//! idempotency guard: a second attempt always fails with "already looted".

use super::{EngineError, LootOutcome};
use crate::world::{GameState, RoomType};

/// Attempt to loot the current room.
pub fn loot_room(state: &mut GameState) -> Result<LootOutcome, EngineError> {
    let room = state
        .current_room()
        .ok_or(EngineError::CurrentRoomMissing(state.current_room_id))?;

    if room.room_type != RoomType::Treasure {
        return Ok(LootOutcome::violation("This room contains no treasure"));
    }
    if room.is_cleared {
        return Ok(LootOutcome::violation(
            "This treasure has already been looted",
        ));
    }
    if room.items.is_empty() {
        return Ok(LootOutcome::violation("The treasure chest is empty"));
    }

    let current_room_id = state.current_room_id;
    let room = state
        .current_room_mut()
        .ok_or(EngineError::CurrentRoomMissing(current_room_id))?;
    let items = std::mem::take(&mut room.items);
    room.is_cleared = true;

    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    let message = format!("You loot the treasure and find: {}", names.join(", "));

    state.player.inventory.extend(items.iter().cloned());

    Ok(LootOutcome {
        ok: true,
        message,
        items: Some(items),
    })
}
