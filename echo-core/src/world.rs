//! Echo Dungeon game world types.
//!
//! Contains all types for representing game state: the player, enemies,
//! rooms, the dungeon grid, and the complete game world.

use crate::combat::CombatSession;
use crate::items::{self, StatBonus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for an enemy instance.
///
/// Two enemies of the same type in one room share a name, so status
/// effects are keyed by this id rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyId(pub Uuid);

impl EnemyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EnemyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
        }
    }

    pub fn all() -> [CharacterClass; 3] {
        [
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
        ]
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Positions
// ============================================================================

/// Side length of the square dungeon grid.
pub const DUNGEON_SIZE: i32 = 10;

/// Cell the player enters each level on.
pub const ENTRANCE: Position = Position { x: 5, y: 5 };

/// Integer grid coordinate. North is negative y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(&self, direction: Direction) -> Position {
        match direction {
            Direction::North => Position::new(self.x, self.y - 1),
            Direction::South => Position::new(self.x, self.y + 1),
            Direction::East => Position::new(self.x + 1, self.y),
            Direction::West => Position::new(self.x - 1, self.y),
        }
    }

    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Compass directions for movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

// ============================================================================
// Player
// ============================================================================

/// The player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub class: Option<CharacterClass>,
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,

    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub gold: u32,

    /// Carried items in pickup order. Duplicates are allowed.
    pub inventory: Vec<String>,
    pub equipped_rings: Vec<String>,
    pub equipped_amulet: Option<String>,
    pub learned_abilities: BTreeSet<String>,

    pub base_attack: i32,
    pub defense: i32,
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub shield: Option<String>,

    pub position: Position,
    /// Room the player came from, used to retreat after fleeing.
    #[serde(default)]
    pub previous_position: Option<Position>,
}

impl Player {
    /// A fresh player awaiting class selection.
    pub fn new() -> Self {
        Self {
            class: None,
            level: 1,
            experience: 0,
            experience_to_next: 100,
            health: 100,
            max_health: 100,
            mana: 50,
            max_mana: 50,
            gold: 25,
            inventory: Vec::new(),
            equipped_rings: Vec::new(),
            equipped_amulet: None,
            learned_abilities: BTreeSet::new(),
            base_attack: 15,
            defense: 0,
            weapon: None,
            armor: None,
            shield: None,
            position: ENTRANCE,
            previous_position: None,
        }
    }

    /// Attack including ring and amulet bonuses.
    pub fn attack_power(&self) -> i32 {
        let rings: i32 = self
            .equipped_rings
            .iter()
            .filter_map(|name| items::get_ring(name))
            .map(|ring| match ring.bonus {
                StatBonus::Attack(value) => value,
                _ => 0,
            })
            .sum();

        let amulet = self
            .equipped_amulet
            .as_deref()
            .and_then(items::get_amulet)
            .map(|amulet| match amulet.bonus {
                StatBonus::Attack(value) => value,
                _ => 0,
            })
            .unwrap_or(0);

        self.base_attack + rings + amulet
    }

    /// Multiplier applied to experience gains by the worn amulet.
    pub fn experience_multiplier(&self) -> Option<f64> {
        self.equipped_amulet
            .as_deref()
            .and_then(items::get_amulet)
            .and_then(|amulet| match amulet.bonus {
                StatBonus::ExperienceGain(multiplier) => Some(multiplier),
                _ => None,
            })
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.inventory.iter().any(|item| item == name)
    }

    pub fn item_count(&self, name: &str) -> usize {
        self.inventory.iter().filter(|item| *item == name).count()
    }

    pub fn add_item(&mut self, name: impl Into<String>) {
        self.inventory.push(name.into());
    }

    /// Remove the first carried copy of an item. Returns false if absent.
    pub fn take_item(&mut self, name: &str) -> bool {
        match self.inventory.iter().position(|item| item == name) {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn rings_named(&self, name: &str) -> usize {
        self.equipped_rings.iter().filter(|r| *r == name).count()
    }

    /// Heal up to max health, returning the amount actually restored.
    pub fn restore_health(&mut self, amount: i32) -> i32 {
        let old = self.health;
        self.health = (self.health + amount).min(self.max_health).max(old);
        self.health - old
    }

    /// Restore mana up to max, returning the amount actually restored.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        let old = self.mana;
        self.mana = (self.mana + amount).min(self.max_mana).max(old);
        self.mana - old
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    pub fn class_name(&self) -> &'static str {
        self.class.map(|c| c.name()).unwrap_or("Adventurer")
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Enemies
// ============================================================================

/// A live enemy instance, scaled to the level it was generated on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub name: String,
    /// May go below zero before the enemy is removed from combat.
    pub health: i32,
    pub max_health: i32,
    pub damage: i32,
    #[serde(default)]
    pub defense: i32,
    pub gold: u32,
    pub exp: u32,
    pub flee_chance: Option<f64>,
    pub regenerate: Option<i32>,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health as narrated: never below zero.
    pub fn displayed_health(&self) -> i32 {
        self.health.max(0)
    }
}

// ============================================================================
// Rooms
// ============================================================================

/// Kinds of room the generator can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Entrance,
    Empty,
    Treasure,
    Enemy,
    Boss,
    Trap,
    Stairs,
    Fountain,
    Crypt,
    Merchant,
}

impl RoomType {
    pub fn name(&self) -> &'static str {
        match self {
            RoomType::Entrance => "entrance",
            RoomType::Empty => "empty",
            RoomType::Treasure => "treasure",
            RoomType::Enemy => "enemy",
            RoomType::Boss => "boss",
            RoomType::Trap => "trap",
            RoomType::Stairs => "stairs",
            RoomType::Fountain => "fountain",
            RoomType::Crypt => "crypt",
            RoomType::Merchant => "merchant",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One cell of the dungeon grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_type: RoomType,
    pub description: String,
    pub visited: bool,
    pub searched: bool,
    pub has_chest: bool,
    pub fountain_used: bool,
    pub enemy: Option<Enemy>,
    pub second_enemy: Option<Enemy>,
}

impl Room {
    pub fn new(room_type: RoomType, description: impl Into<String>) -> Self {
        Self {
            room_type,
            description: description.into(),
            visited: false,
            searched: false,
            has_chest: false,
            fountain_used: false,
            enemy: None,
            second_enemy: None,
        }
    }

    pub fn with_chest(mut self, has_chest: bool) -> Self {
        self.has_chest = has_chest;
        self
    }

    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.enemy = Some(enemy);
        self
    }

    pub fn with_second_enemy(mut self, enemy: Enemy) -> Self {
        self.second_enemy = Some(enemy);
        self
    }

    /// All enemies assigned to this room, living or not.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemy.iter().chain(self.second_enemy.iter())
    }

    pub fn has_live_enemy(&self) -> bool {
        self.enemies().any(|e| e.is_alive())
    }

    pub fn clear_enemies(&mut self) {
        self.enemy = None;
        self.second_enemy = None;
    }

    /// Copy combat-time health back onto the room's enemies.
    pub fn sync_enemy(&mut self, enemy: &Enemy) {
        for slot in [&mut self.enemy, &mut self.second_enemy] {
            if let Some(existing) = slot.as_mut() {
                if existing.id == enemy.id {
                    existing.health = enemy.health;
                }
            }
        }
    }
}

// ============================================================================
// Dungeon
// ============================================================================

/// The current level's grid plus level-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    pub size: i32,
    /// Row-major by `y`, then `x`.
    pub rooms: Vec<Room>,
    pub current_level: u32,
    pub has_secret_room: bool,
    pub secret_room_found: bool,
}

impl Dungeon {
    /// An ungenerated level-1 dungeon.
    pub fn new() -> Self {
        Self {
            size: DUNGEON_SIZE,
            rooms: Vec::new(),
            current_level: 1,
            has_secret_room: false,
            secret_room_found: false,
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y * self.size + pos.x) as usize)
        } else {
            None
        }
    }

    pub fn room(&self, pos: Position) -> Option<&Room> {
        self.index(pos).and_then(|i| self.rooms.get(i))
    }

    pub fn room_mut(&mut self, pos: Position) -> Option<&mut Room> {
        self.index(pos).and_then(move |i| self.rooms.get_mut(i))
    }

    /// Iterate rooms with their coordinates.
    pub fn is_generated(&self) -> bool {
        self.rooms.len() == (self.size * self.size) as usize
    }
}

impl Default for Dungeon {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Game World
// ============================================================================

/// Which command vocabulary is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    ClassSelect,
    Exploration,
    Merchant,
    Combat,
}

/// The complete game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameWorld {
    pub session_id: Uuid,
    pub player: Player,
    pub dungeon: Dungeon,
    pub mode: GameMode,
    pub combat: Option<CombatSession>,
}

impl GameWorld {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            player: Player::new(),
            dungeon: Dungeon::new(),
            mode: GameMode::ClassSelect,
            combat: None,
        }
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.dungeon.room(self.player.position)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        self.dungeon.room_mut(self.player.position)
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }

    /// Reset the player to starting defaults and return to class selection.
    pub fn reset_player(&mut self) {
        self.player = Player::new();
        self.combat = None;
        self.mode = GameMode::ClassSelect;
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_defaults() {
        let player = Player::new();
        assert_eq!(player.level, 1);
        assert_eq!(player.experience_to_next, 100);
        assert_eq!((player.health, player.max_health), (100, 100));
        assert_eq!((player.mana, player.max_mana), (50, 50));
        assert_eq!(player.gold, 25);
        assert_eq!(player.base_attack, 15);
        assert_eq!(player.position, ENTRANCE);
        assert!(player.class.is_none());
    }

    #[test]
    fn test_attack_power_includes_rings_and_amulet() {
        let mut player = Player::new();
        player.equipped_rings.push("Ring of Strength".to_string());
        player.equipped_rings.push("Ring of the Berserker".to_string());
        player.equipped_rings.push("Ring of Vitality".to_string());
        assert_eq!(player.attack_power(), 15 + 2 + 4);

        player.equipped_amulet = Some("Amulet of Power".to_string());
        assert_eq!(player.attack_power(), 15 + 2 + 4 + 5);
    }

    #[test]
    fn test_inventory_multiset() {
        let mut player = Player::new();
        player.add_item("Health Potion");
        player.add_item("Ruby Gem");
        player.add_item("Health Potion");
        assert_eq!(player.item_count("Health Potion"), 2);

        assert!(player.take_item("Health Potion"));
        assert_eq!(player.inventory, vec!["Ruby Gem", "Health Potion"]);
        assert!(!player.take_item("Diamond"));
    }

    #[test]
    fn test_restore_caps_at_max() {
        let mut player = Player::new();
        player.health = 90;
        assert_eq!(player.restore_health(40), 10);
        assert_eq!(player.health, 100);

        player.mana = 10;
        assert_eq!(player.restore_mana(30), 30);
        assert_eq!(player.mana, 40);
    }

    #[test]
    fn test_position_step_and_distance() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.step(Direction::North), Position::new(5, 4));
        assert_eq!(pos.step(Direction::East), Position::new(6, 5));
        assert_eq!(Position::new(9, 9).manhattan(ENTRANCE), 8);
    }

    #[test]
    fn test_dungeon_bounds() {
        let dungeon = Dungeon::new();
        assert!(dungeon.contains(Position::new(0, 0)));
        assert!(dungeon.contains(Position::new(9, 9)));
        assert!(!dungeon.contains(Position::new(10, 0)));
        assert!(!dungeon.contains(Position::new(0, -1)));
        assert!(dungeon.room(Position::new(0, 0)).is_none());
    }

    #[test]
    fn test_enemy_displayed_health_clamped() {
        let enemy = Enemy {
            id: EnemyId::new(),
            name: "Goblin".to_string(),
            health: -12,
            max_health: 30,
            damage: 8,
            defense: 0,
            gold: 5,
            exp: 15,
            flee_chance: Some(0.8),
            regenerate: None,
        };
        assert!(!enemy.is_alive());
        assert_eq!(enemy.displayed_health(), 0);
    }

    #[test]
    fn test_reset_player() {
        let mut world = GameWorld::new();
        world.player.level = 4;
        world.player.gold = 999;
        world.mode = GameMode::Exploration;
        world.dungeon.current_level = 3;

        world.reset_player();
        assert_eq!(world.player.level, 1);
        assert_eq!(world.player.gold, 25);
        assert_eq!(world.mode, GameMode::ClassSelect);
        assert_eq!(world.dungeon.current_level, 3);
    }
}
