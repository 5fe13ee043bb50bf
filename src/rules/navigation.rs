//! Room-graph traversal.
//!
//! Moving is blocked while a combat encounter is open. Entering a combat room
//! that still holds a live, unresolved encounter engages its first monster at
//! full health with the player to act.

use super::{EngineError, MoveOutcome};
use crate::world::{CombatState, Direction, GameState, RoomType};

/// Attempt to move the player one room in `direction`.
pub fn move_player(
    state: &mut GameState,
    direction: Direction,
) -> Result<MoveOutcome, EngineError> {
    if state.in_combat() {
        return Ok(MoveOutcome::violation("You cannot move while in combat!"));
    }

    let current = state
        .current_room()
        .ok_or(EngineError::CurrentRoomMissing(state.current_room_id))?;

    let exit = match current.exit(direction) {
        Some(exit) => exit,
        None => {
            return Ok(MoveOutcome::violation(format!(
                "There is no exit to the {direction}"
            )));
        }
    };

    if exit.locked {
        return Ok(MoveOutcome::violation(format!(
            "The door to the {direction} is locked."
        )));
    }

    let target_id = exit.target_room_id;
    let target = state
        .dungeon
        .room(target_id)
        .ok_or(EngineError::TargetRoomMissing(target_id))?;
    let target_name = target.name.clone();

    // All checks passed; mutate.
    state.current_room_id = target_id;
    let room = state
        .current_room_mut()
        .ok_or(EngineError::CurrentRoomMissing(target_id))?;
    room.visited = true;

    let engagement = if room.room_type == RoomType::Combat && !room.is_cleared {
        room.monsters
            .iter()
            .find(|m| m.is_alive)
            .map(|monster| CombatState::engage(monster))
    } else {
        None
    };
    if engagement.is_some() {
        state.active_combat = engagement;
    }

    Ok(MoveOutcome {
        ok: true,
        message: format!("You move {direction} to {target_name}"),
        new_room_id: Some(target_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::new_game_state;
    use crate::world::RoomId;
    use uuid::Uuid;

    fn fresh() -> GameState {
        new_game_state(Uuid::new_v4(), "Hero")
    }

    #[test]
    fn test_move_into_guard_chamber_starts_combat() {
        let mut state = fresh();
        let outcome = move_player(&mut state, Direction::North).unwrap();

        assert!(outcome.ok);
        assert_eq!(outcome.message, "You move North to Guard Chamber");
        assert_eq!(state.current_room().unwrap().name, "Guard Chamber");
        assert!(state.current_room().unwrap().visited);

        let combat = state.active_combat.as_ref().expect("combat should start");
        assert_eq!(combat.monster_health, 20);
        assert!(combat.player_turn);
    }

    #[test]
    fn test_move_with_no_exit_fails_without_mutation() {
        let mut state = fresh();
        let before = state.current_room_id;

        let outcome = move_player(&mut state, Direction::West).unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "There is no exit to the West");
        assert_eq!(state.current_room_id, before);
        assert!(state.active_combat.is_none());
    }

    #[test]
    fn test_move_blocked_while_in_combat() {
        let mut state = fresh();
        move_player(&mut state, Direction::North).unwrap();
        assert!(state.in_combat());

        // Direction validity does not matter while the encounter is open.
        for direction in Direction::all() {
            let outcome = move_player(&mut state, direction).unwrap();
            assert!(!outcome.ok);
            assert_eq!(outcome.message, "You cannot move while in combat!");
        }
        assert_eq!(state.current_room().unwrap().name, "Guard Chamber");
    }

    #[test]
    fn test_locked_exit_is_a_rule_violation() {
        let mut state = fresh();
        state.current_room_mut().unwrap().exits[0].locked = true;

        let outcome = move_player(&mut state, Direction::North).unwrap();
        assert!(!outcome.ok);
        assert_eq!(outcome.message, "The door to the North is locked.");
        assert_eq!(state.current_room().unwrap().name, "Entrance Hall");
    }

    #[test]
    fn test_cleared_combat_room_does_not_rearm() {
        let mut state = fresh();
        move_player(&mut state, Direction::North).unwrap();
        state.active_combat = None;
        state.current_room_mut().unwrap().is_cleared = true;

        move_player(&mut state, Direction::South).unwrap();
        let outcome = move_player(&mut state, Direction::North).unwrap();

        assert!(outcome.ok);
        assert!(state.active_combat.is_none());
    }

    #[test]
    fn test_dangling_exit_is_an_integrity_fault() {
        let mut state = fresh();
        state.current_room_mut().unwrap().exits[0].target_room_id = RoomId::new();

        let err = move_player(&mut state, Direction::North).unwrap_err();
        assert!(matches!(err, EngineError::TargetRoomMissing(_)));
        assert_eq!(state.current_room().unwrap().name, "Entrance Hall");
    }
}
