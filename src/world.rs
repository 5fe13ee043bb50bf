//! Dungeon game state types.
//!
//! Contains all types for representing a session's state: the player, items,
//! monsters, rooms, the dungeon graph, and the active combat encounter. The
//! dungeon owns its rooms and monsters as an arena addressed by id; nothing
//! else holds references into it, so in-place mutation during resolution is
//! safe without shared-ownership hazards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub Uuid);

impl RoomId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub Uuid);

impl MonsterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MonsterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MonsterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Structural problems in a dungeon graph.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("duplicate room id {0} in dungeon")]
    DuplicateRoomId(RoomId),

    #[error("exit {direction} of room {room} targets unknown room {target}")]
    DanglingExit {
        room: RoomId,
        direction: Direction,
        target: RoomId,
    },

    #[error("starting room {0} not found in dungeon")]
    MissingStartingRoom(RoomId),
}

// ============================================================================
// Directions
// ============================================================================

/// Direction of movement between rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error for unrecognized direction strings.
#[derive(Debug, Error)]
#[error("Invalid direction: {0}. Valid directions are: North, South, East, West")]
pub struct ParseDirectionError(pub String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" => Ok(Direction::North),
            "south" => Ok(Direction::South),
            "east" => Ok(Direction::East),
            "west" => Ok(Direction::West),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Type of item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Treasure,
}

/// An item in the game.
///
/// One flat record for all item kinds: the type tag plus the union of bonus
/// fields, with the irrelevant ones left at zero. Items are immutable once
/// created except for the `equipped` flag and ownership transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub description: String,
    pub value: u32,
    pub quantity: u32,
    pub damage_bonus: i32,
    pub defense_bonus: i32,
    pub health_bonus: i32,
    pub equipped: bool,
}

impl Item {
    fn base(name: impl Into<String>, item_type: ItemType, description: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            item_type,
            description: description.into(),
            value: 0,
            quantity: 1,
            damage_bonus: 0,
            defense_bonus: 0,
            health_bonus: 0,
            equipped: false,
        }
    }

    pub fn weapon(name: impl Into<String>, description: impl Into<String>, damage_bonus: i32) -> Self {
        let mut item = Self::base(name, ItemType::Weapon, description);
        item.damage_bonus = damage_bonus;
        item
    }

    pub fn armor(name: impl Into<String>, description: impl Into<String>, defense_bonus: i32) -> Self {
        let mut item = Self::base(name, ItemType::Armor, description);
        item.defense_bonus = defense_bonus;
        item
    }

    pub fn consumable(
        name: impl Into<String>,
        description: impl Into<String>,
        health_bonus: i32,
    ) -> Self {
        let mut item = Self::base(name, ItemType::Consumable, description);
        item.health_bonus = health_bonus;
        item
    }

    pub fn treasure(name: impl Into<String>, description: impl Into<String>, value: u32) -> Self {
        let mut item = Self::base(name, ItemType::Treasure, description);
        item.value = value;
        item
    }

    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

// ============================================================================
// Monsters
// ============================================================================

/// A monster instance inside a room.
///
/// Session-scoped and mutated in place during combat; never shared across
/// rooms or sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub name: String,
    pub description: String,
    pub level: u32,
    pub health: i32,
    pub damage: i32,
    pub defense: i32,
    pub is_alive: bool,
    pub experience_reward: u32,
    pub gold_reward: u32,
    pub possible_drops: Vec<Item>,
}

impl Monster {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: MonsterId::new(),
            name: name.into(),
            description: description.into(),
            level: 1,
            health: 1,
            damage: 1,
            defense: 0,
            is_alive: true,
            experience_reward: 0,
            gold_reward: 0,
            possible_drops: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_experience_reward(mut self, xp: u32) -> Self {
        self.experience_reward = xp;
        self
    }

    pub fn with_gold_reward(mut self, gold: u32) -> Self {
        self.gold_reward = gold;
        self
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// Type of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    /// Normal empty room.
    Normal,
    /// Room with monsters that must be defeated.
    Combat,
    /// Room containing treasure or items.
    Treasure,
    /// Room with a boss monster.
    Boss,
    /// Hidden room with special rewards.
    Secret,
}

/// An exit from a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomExit {
    pub direction: Direction,
    pub target_room_id: RoomId,
    pub locked: bool,
}

impl RoomExit {
    pub fn new(direction: Direction, target_room_id: RoomId) -> Self {
        Self {
            direction,
            target_room_id,
            locked: false,
        }
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }
}

/// A room in the dungeon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: RoomType,
    pub description: String,
    pub visited: bool,
    /// One-shot guard: has this room's encounter or treasure been resolved.
    pub is_cleared: bool,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    pub exits: Vec<RoomExit>,
}

impl Room {
    pub fn new(name: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id: RoomId::new(),
            name: name.into(),
            room_type,
            description: String::new(),
            visited: false,
            is_cleared: false,
            monsters: Vec::new(),
            items: Vec::new(),
            exits: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_monster(mut self, monster: Monster) -> Self {
        self.monsters.push(monster);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    /// Find the exit in the given direction, if any.
    pub fn exit(&self, direction: Direction) -> Option<&RoomExit> {
        self.exits.iter().find(|e| e.direction == direction)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    /// Whether the room still holds a live, unresolved encounter.
    pub fn has_live_monsters(&self) -> bool {
        !self.is_cleared && self.monsters.iter().any(|m| m.is_alive)
    }

    /// Whether the room holds treasure that has not been looted yet.
    pub fn has_unclaimed_treasure(&self) -> bool {
        self.room_type == RoomType::Treasure && !self.is_cleared
    }
}

// ============================================================================
// Dungeon
// ============================================================================

/// A dungeon layout: an owned arena of rooms addressed by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: Uuid,
    pub name: String,
    /// Reserved for future procedural generation; never consulted today.
    pub seed: i64,
    pub rooms: Vec<Room>,
    pub starting_room_id: RoomId,
}

impl Dungeon {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    /// Check the graph invariants: unique room ids, every exit target present,
    /// and a resolvable starting room.
    pub fn validate(&self) -> Result<(), WorldError> {
        let mut seen = HashSet::new();
        for room in &self.rooms {
            if !seen.insert(room.id) {
                return Err(WorldError::DuplicateRoomId(room.id));
            }
        }

        for room in &self.rooms {
            for exit in &room.exits {
                if !seen.contains(&exit.target_room_id) {
                    return Err(WorldError::DanglingExit {
                        room: room.id,
                        direction: exit.direction,
                        target: exit.target_room_id,
                    });
                }
            }
        }

        if !seen.contains(&self.starting_room_id) {
            return Err(WorldError::MissingStartingRoom(self.starting_room_id));
        }

        Ok(())
    }
}

// ============================================================================
// Player
// ============================================================================

/// The player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class: String,
    pub health: i32,
    pub max_health: i32,
    pub level: u32,
    pub experience: u32,
    pub gold: u32,
    /// Insertion order is acquisition order.
    pub inventory: Vec<Item>,
    /// Weak reference into the inventory; a dangling id means "no bonus".
    pub equipped_weapon_id: Option<ItemId>,
    pub equipped_armor_id: Option<ItemId>,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class: "Warrior".to_string(),
            health: 100,
            max_health: 100,
            level: 1,
            experience: 0,
            gold: 0,
            inventory: Vec::new(),
            equipped_weapon_id: None,
            equipped_armor_id: None,
        }
    }

    /// Get the currently equipped weapon, if the reference resolves.
    pub fn equipped_weapon(&self) -> Option<&Item> {
        self.equipped_weapon_id
            .and_then(|id| self.inventory.iter().find(|i| i.id == id))
    }

    /// Get the currently equipped armor, if the reference resolves.
    pub fn equipped_armor(&self) -> Option<&Item> {
        self.equipped_armor_id
            .and_then(|id| self.inventory.iter().find(|i| i.id == id))
    }

    /// Total attack damage: weapon bonus (bare fists count as 5) plus twice
    /// the level.
    pub fn total_damage(&self) -> i32 {
        let base = self.equipped_weapon().map(|w| w.damage_bonus).unwrap_or(5);
        base + self.level as i32 * 2
    }

    /// Total defense: armor bonus (default 0) plus the level.
    pub fn total_defense(&self) -> i32 {
        let base = self.equipped_armor().map(|a| a.defense_bonus).unwrap_or(0);
        base + self.level as i32
    }
}

// ============================================================================
// Combat
// ============================================================================

/// The state of an active combat encounter.
///
/// Exists only while an encounter is open; at most one per game state. The
/// monster is addressed by id into the current room's monster list, and its
/// health for this encounter is tracked here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub monster_id: MonsterId,
    pub monster_health: i32,
    pub player_turn: bool,
    pub player_defending: bool,
}

impl CombatState {
    /// Open an encounter against a monster at full health, player to act.
    pub fn engage(monster: &Monster) -> Self {
        Self {
            monster_id: monster.id,
            monster_health: monster.health,
            player_turn: true,
            player_defending: false,
        }
    }
}

// ============================================================================
// Game State
// ============================================================================

/// The complete state of one session's dungeon run.
///
/// This is the unit of persistence: created once per session on first access,
/// read-modify-written on every engine operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub session_id: Uuid,
    pub player: Player,
    pub dungeon: Dungeon,
    pub current_room_id: RoomId,
    pub active_combat: Option<CombatState>,
    /// Unix seconds of the last mutation.
    pub last_updated: u64,
}

impl GameState {
    /// Get the room the player is in, if the id still resolves.
    pub fn current_room(&self) -> Option<&Room> {
        self.dungeon.room(self.current_room_id)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        self.dungeon.room_mut(self.current_room_id)
    }

    pub fn in_combat(&self) -> bool {
        self.active_combat.is_some()
    }

    /// Refresh the last-updated timestamp.
    pub fn touch(&mut self) {
        self.last_updated = unix_now();
    }
}

/// Current timestamp as unix seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("north".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("SOUTH".parse::<Direction>().unwrap(), Direction::South);
        assert_eq!(" East ".parse::<Direction>().unwrap(), Direction::East);
        assert!("up".parse::<Direction>().is_err());

        let err = "up".parse::<Direction>().unwrap_err();
        assert!(err.to_string().contains("Invalid direction: up"));
    }

    #[test]
    fn test_total_damage_without_weapon() {
        let player = Player::new("Hero");
        // Bare fists: 5 base + level 1 * 2
        assert_eq!(player.total_damage(), 7);
        assert_eq!(player.total_defense(), 1);
    }

    #[test]
    fn test_total_damage_with_equipped_weapon() {
        let mut player = Player::new("Hero");
        let sword = Item::weapon("Iron Sword", "A sturdy iron sword", 5);
        player.equipped_weapon_id = Some(sword.id);
        player.inventory.push(sword);

        assert_eq!(player.total_damage(), 5 + 2);
    }

    #[test]
    fn test_dangling_equipment_reference_means_no_bonus() {
        let mut player = Player::new("Hero");
        player.equipped_weapon_id = Some(ItemId::new());
        player.equipped_armor_id = Some(ItemId::new());

        // Unresolvable references fall back to bare-handed defaults.
        assert_eq!(player.total_damage(), 7);
        assert_eq!(player.total_defense(), 1);
    }

    #[test]
    fn test_dungeon_validate_catches_dangling_exit() {
        let mut room = Room::new("Lonely Cell", RoomType::Normal);
        room.exits.push(RoomExit::new(Direction::North, RoomId::new()));
        let dungeon = Dungeon {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            seed: 0,
            starting_room_id: room.id,
            rooms: vec![room],
        };

        assert!(matches!(
            dungeon.validate(),
            Err(WorldError::DanglingExit { .. })
        ));
    }

    #[test]
    fn test_dungeon_validate_catches_duplicate_ids() {
        let room = Room::new("Echo Chamber", RoomType::Normal);
        let twin = room.clone();
        let dungeon = Dungeon {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            seed: 0,
            starting_room_id: room.id,
            rooms: vec![room, twin],
        };

        assert!(matches!(
            dungeon.validate(),
            Err(WorldError::DuplicateRoomId(_))
        ));
    }

    #[test]
    fn test_room_encounter_queries() {
        let goblin = Monster::new("Goblin", "Small and nasty").with_health(20);
        let mut room = Room::new("Guard Post", RoomType::Combat).with_monster(goblin);

        assert!(room.has_live_monsters());
        assert!(!room.has_unclaimed_treasure());

        room.is_cleared = true;
        assert!(!room.has_live_monsters());
    }

    #[test]
    fn test_combat_engage_snapshots_monster_health() {
        let ogre = Monster::new("Ogre", "Big").with_health(40).with_damage(8);
        let combat = CombatState::engage(&ogre);

        assert_eq!(combat.monster_id, ogre.id);
        assert_eq!(combat.monster_health, 40);
        assert!(combat.player_turn);
        assert!(!combat.player_defending);
    }
}
