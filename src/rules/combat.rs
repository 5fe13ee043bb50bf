//! Turn-based combat resolution.
//!
//! One call resolves one full round: the player's action, and, if the
//! encounter stays open, the monster's counter-attack. The monster turn never
//! requires a second request. Combat closes exactly one way per resolution:
//! victory (monster health reaches 0) or defeat (player health reaches 0),
//! never both.
//!
//! Damage draws come from the caller-supplied generator, never a hidden
//! global, so whole fights are reproducible from a seed.

use super::{CombatOutcome, EngineError};
use crate::world::{GameState, MonsterId};
use rand::Rng;

/// A combat action the player can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatAction {
    Attack,
    Defend,
}

impl CombatAction {
    /// Parse an action string, case-insensitively. Unknown strings are a rule
    /// violation handled by the resolver, not a parse error.
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim().to_lowercase().as_str() {
            "attack" => Some(CombatAction::Attack),
            "defend" => Some(CombatAction::Defend),
            _ => None,
        }
    }
}

/// Resolve one combat round for the given player action string.
pub fn combat_action<R: Rng>(
    state: &mut GameState,
    action: &str,
    rng: &mut R,
) -> Result<CombatOutcome, EngineError> {
    let Some(mut combat) = state.active_combat.clone() else {
        return Ok(CombatOutcome::violation("You are not in combat", None));
    };

    if !combat.player_turn {
        return Ok(CombatOutcome::violation(
            "It's not your turn",
            Some(combat),
        ));
    }

    let Some(action) = CombatAction::parse(action) else {
        return Ok(CombatOutcome::violation(
            "Invalid action. Use 'attack' or 'defend'",
            Some(combat),
        ));
    };

    // Monster stats for this round, resolved through the arena.
    let monster_id = combat.monster_id;
    let (monster_name, monster_damage, experience_reward) = {
        let room = state
            .current_room()
            .ok_or(EngineError::CurrentRoomMissing(state.current_room_id))?;
        let monster = room
            .monster(monster_id)
            .ok_or(EngineError::CombatMonsterMissing(monster_id))?;
        (
            monster.name.clone(),
            monster.damage,
            monster.experience_reward,
        )
    };

    let mut message;

    match action {
        CombatAction::Attack => {
            let damage = rng.gen_range(1..=state.player.total_damage());
            combat.monster_health -= damage;
            message = format!("You deal {damage} damage to the {monster_name}!");

            if combat.monster_health <= 0 {
                return Ok(resolve_victory(
                    state,
                    message,
                    monster_id,
                    &monster_name,
                    experience_reward,
                ));
            }
        }
        CombatAction::Defend => {
            message = "You brace yourself for the attack!".to_string();
            combat.player_defending = true;
        }
    }

    // Monster's turn, resolved synchronously within the same round.
    combat.player_turn = false;
    let mut monster_damage = rng.gen_range(1..=monster_damage);
    if combat.player_defending {
        monster_damage = (monster_damage - state.player.total_defense()).max(1);
        combat.player_defending = false;
    }

    state.player.health -= monster_damage;
    message.push_str(&format!(
        "\nThe {monster_name} attacks for {monster_damage} damage!"
    ));

    if state.player.health <= 0 {
        state.player.health = 0;
        state.active_combat = None;
        message.push_str("\nYou have been defeated!");
        return Ok(CombatOutcome {
            ok: true,
            message,
            combat: None,
        });
    }

    combat.player_turn = true;
    state.active_combat = Some(combat.clone());

    Ok(CombatOutcome {
        ok: true,
        message,
        combat: Some(combat),
    })
}

/// Close the encounter in the player's favor: award experience, clear the
/// room, and apply at most one level-up.
fn resolve_victory(
    state: &mut GameState,
    mut message: String,
    monster_id: MonsterId,
    monster_name: &str,
    experience_reward: u32,
) -> CombatOutcome {
    state.player.experience += experience_reward;
    if let Some(room) = state.current_room_mut() {
        room.is_cleared = true;
        if let Some(monster) = room.monster_mut(monster_id) {
            monster.is_alive = false;
        }
    }
    state.active_combat = None;
    message.push_str(&format!(
        "\n{monster_name} defeated! You gain {experience_reward} XP."
    ));

    // One level at most per victory, even if the threshold is exceeded by
    // more than a level's worth of experience.
    if state.player.experience >= state.player.level * 100 {
        state.player.level += 1;
        state.player.max_health += 10;
        state.player.health = state.player.max_health;
        message.push_str(&format!(
            "\nLevel up! You are now level {}!",
            state.player.level
        ));
    }

    CombatOutcome {
        ok: true,
        message,
        combat: None,
    }
}
