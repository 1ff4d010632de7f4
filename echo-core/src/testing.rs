//! Testing utilities for Echo Dungeon.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted game scenarios on a hand-built grid
//! - Assertion helpers for verifying game state

use crate::command;
use crate::progression;
use crate::rng::GameRng;
use crate::rules::{Intent, Rejection, Resolution, RulesEngine};
use crate::world::{CharacterClass, Enemy, GameMode, GameWorld, Position, Room, RoomType};

/// Test harness for running game scenarios.
///
/// Draws queued with [`TestHarness::script`] are consumed before the
/// seeded stream, so combat rolls and loot can be pinned exactly.
pub struct TestHarness {
    /// The game world.
    pub world: GameWorld,
    /// The random source.
    pub rng: GameRng,
    engine: RulesEngine,
}

impl TestHarness {
    /// A fresh game at class selection, seeded with 0.
    pub fn new() -> Self {
        Self {
            world: GameWorld::new(),
            rng: GameRng::new(0),
            engine: RulesEngine::new(),
        }
    }

    /// A player of `class` standing in the entrance of a grid of empty,
    /// already searched rooms. Nothing is randomly generated.
    pub fn with_class(class: CharacterClass) -> Self {
        let mut harness = Self::new();
        let world = &mut harness.world;

        progression::select_class(&mut world.player, class, &mut Resolution::empty());
        world.mode = GameMode::Exploration;
        world.dungeon.rooms = (0..world.dungeon.size * world.dungeon.size)
            .map(|_| {
                let mut room = Room::new(RoomType::Empty, "an empty chamber.");
                room.searched = true;
                room
            })
            .collect();
        if let Some(room) = world.current_room_mut() {
            room.room_type = RoomType::Entrance;
            room.visited = true;
        }
        harness
    }

    /// Replace the room at `pos`.
    pub fn place_room(&mut self, pos: Position, room: Room) -> &mut Self {
        if let Some(slot) = self.world.dungeon.room_mut(pos) {
            *slot = room;
        }
        self
    }

    /// Put one or two enemies into the room at `pos`.
    pub fn place_enemies(&mut self, pos: Position, enemies: Vec<Enemy>) -> &mut Self {
        let mut enemies = enemies.into_iter();
        let mut room = Room::new(RoomType::Enemy, "a blood-stained chamber.");
        room.enemy = enemies.next();
        room.second_enemy = enemies.next();
        self.place_room(pos, room)
    }

    /// Queue explicit random draws.
    pub fn script(&mut self, draws: impl IntoIterator<Item = f64>) -> &mut Self {
        self.rng.push_draws(draws);
        self
    }

    /// Parse and resolve spoken input.
    pub fn input(&mut self, text: &str) -> Resolution {
        let intent = command::parse(text, self.world.mode);
        self.apply(intent)
    }

    /// Resolve an intent directly.
    pub fn apply(&mut self, intent: Intent) -> Resolution {
        self.engine.resolve(&mut self.world, &mut self.rng, intent)
    }

    /// Get current player health as (current, max).
    pub fn player_hp(&self) -> (i32, i32) {
        (self.world.player.health, self.world.player.max_health)
    }

    pub fn in_combat(&self) -> bool {
        self.world.in_combat()
    }

    /// Health of each live enemy in the current encounter, in order.
    pub fn enemy_health(&self) -> Vec<i32> {
        self.world
            .combat
            .as_ref()
            .map(|c| c.enemies.iter().map(|e| e.health).collect())
            .unwrap_or_default()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert player health is at expected values.
#[track_caller]
pub fn assert_hp(harness: &TestHarness, current: i32, max: i32) {
    let (actual_current, actual_max) = harness.player_hp();
    assert_eq!(
        (actual_current, actual_max),
        (current, max),
        "Expected HP {current}/{max}, got {actual_current}/{actual_max}"
    );
}

/// Assert the game is in `mode`.
#[track_caller]
pub fn assert_mode(harness: &TestHarness, mode: GameMode) {
    assert_eq!(harness.world.mode, mode, "Expected {mode:?} mode");
}

/// Assert player is in combat.
#[track_caller]
pub fn assert_in_combat(harness: &TestHarness) {
    assert!(harness.in_combat(), "Expected to be in combat");
}

/// Assert player is NOT in combat.
#[track_caller]
pub fn assert_not_in_combat(harness: &TestHarness) {
    assert!(!harness.in_combat(), "Expected to NOT be in combat");
}

/// Assert some narration line contains `fragment`.
#[track_caller]
pub fn assert_narrated(resolution: &Resolution, fragment: &str) {
    assert!(
        resolution.narration.iter().any(|n| n.text.contains(fragment)),
        "Expected narration containing '{fragment}', got: {}",
        resolution.text()
    );
}

/// Assert the resolution is exactly the given rejection.
#[track_caller]
pub fn assert_rejected(resolution: &Resolution, rejection: Rejection) {
    assert!(
        resolution.effects.is_empty(),
        "Expected no effects from a rejection, got {:?}",
        resolution.effects
    );
    assert_eq!(resolution.text(), rejection.to_string());
}
