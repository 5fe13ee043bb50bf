//! The fixed starting dungeon.
//!
//! Every new session begins from the same small tutorial layout: an entrance,
//! a guard chamber with a goblin, and a treasure vault. Pure construction, no
//! error path. The dungeon's `seed` field is carried for forward compatibility
//! but the layout is always this one.

use crate::world::{
    Direction, Dungeon, GameState, Item, Monster, Player, Room, RoomExit, RoomType,
};
use uuid::Uuid;

/// Build a fresh game state for a session: the tutorial dungeon and a level-1
/// Warrior standing in the entrance hall.
pub fn new_game_state(session_id: Uuid, player_name: &str) -> GameState {
    let mut entrance = Room::new("Entrance Hall", RoomType::Normal).with_description(
        "A dimly lit stone hall with ancient pillars. The air is musty and cold.",
    );

    let mut guard_chamber = Room::new("Guard Chamber", RoomType::Combat)
        .with_description("A chamber once used by dungeon guards. A hostile creature lurks here!")
        .with_monster(
            Monster::new("Goblin", "A small, nasty creature with sharp teeth")
                .with_level(1)
                .with_health(20)
                .with_damage(5)
                .with_defense(2)
                .with_experience_reward(50),
        );

    let mut vault = Room::new("Treasure Vault", RoomType::Treasure)
        .with_description("A small vault containing forgotten treasures")
        .with_item(Item::weapon("Iron Sword", "A sturdy iron sword", 5))
        .with_item(Item::consumable("Healing Potion", "Restores 30 health", 30));

    entrance
        .exits
        .push(RoomExit::new(Direction::North, guard_chamber.id));
    guard_chamber
        .exits
        .push(RoomExit::new(Direction::South, entrance.id));
    guard_chamber
        .exits
        .push(RoomExit::new(Direction::East, vault.id));
    vault
        .exits
        .push(RoomExit::new(Direction::West, guard_chamber.id));

    let starting_room_id = entrance.id;
    let dungeon = Dungeon {
        id: Uuid::new_v4(),
        name: "Tutorial Dungeon".to_string(),
        seed: 0,
        rooms: vec![entrance, guard_chamber, vault],
        starting_room_id,
    };

    let mut state = GameState {
        session_id,
        player: Player::new(player_name),
        dungeon,
        current_room_id: starting_room_id,
        active_combat: None,
        last_updated: 0,
    };
    state.touch();
    state
}
