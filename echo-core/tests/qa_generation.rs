//! QA tests for dungeon generation and level scaling.

use echo_core::bestiary::EnemyKind;
use echo_core::dungeon::{generate_dungeon, level_factor, scale_enemy_for_level, BOSS_ROOM, STAIRS_ROOM};
use echo_core::world::{RoomType, ENTRANCE};
use echo_core::{GameMode, GameRng, GameSession, GameWorld, SessionConfig};
use proptest::prelude::*;

/// Everything about a generated grid except enemy identities.
fn layout(world: &GameWorld) -> Vec<(RoomType, String, bool, Vec<(String, i32)>)> {
    world
        .dungeon
        .rooms
        .iter()
        .map(|room| {
            (
                room.room_type,
                room.description.clone(),
                room.has_chest,
                room.enemies().map(|e| (e.name.clone(), e.health)).collect(),
            )
        })
        .collect()
}

fn generated(seed: u64, level: u32) -> GameWorld {
    let mut world = GameWorld::new();
    world.dungeon.current_level = level;
    generate_dungeon(&mut world, &mut GameRng::new(seed));
    world
}

#[test]
fn test_descending_regenerates_grid() {
    let mut session = GameSession::new(SessionConfig::new().with_seed(11));
    session.player_action("rogue");
    let before = layout(session.world());

    session.world_mut().player.position = STAIRS_ROOM;
    let response = session.player_action("go down the stairs");

    assert_eq!(response.mode, GameMode::Exploration);
    assert!(response.text().contains("You descend to level 2."));
    let world = session.world();
    assert_eq!(world.dungeon.current_level, 2);
    assert_eq!(world.player.position, ENTRANCE);
    assert!(world.player.previous_position.is_none());
    assert_ne!(layout(world), before);

    let dragon = world.dungeon.room(BOSS_ROOM).unwrap().enemy.as_ref().unwrap();
    // 150 * 1.3
    assert_eq!(dragon.health, 195);
}

#[test]
fn test_stairs_only_work_on_stairs() {
    let mut session = GameSession::new(SessionConfig::new().with_seed(11));
    session.player_action("mage");
    let response = session.player_action("descend");
    assert_eq!(response.text(), "There are no stairs here to descend.");
    assert_eq!(session.world().dungeon.current_level, 1);
}

proptest! {
    #[test]
    fn fixed_rooms_are_placed_once(seed in any::<u64>(), level in 1u32..8) {
        let world = generated(seed, level);
        let count = |kind: RoomType| world.dungeon.rooms.iter().filter(|r| r.room_type == kind).count();

        prop_assert_eq!(world.dungeon.rooms.len(), 100);
        prop_assert_eq!(count(RoomType::Entrance), 1);
        prop_assert_eq!(count(RoomType::Boss), 1);
        prop_assert_eq!(count(RoomType::Stairs), 1);
        prop_assert_eq!(world.dungeon.room(ENTRANCE).unwrap().room_type, RoomType::Entrance);
        prop_assert!(world.dungeon.room(ENTRANCE).unwrap().visited);

        let boss = world.dungeon.room(BOSS_ROOM).unwrap();
        prop_assert!(boss.has_chest);
        let dragon = boss.enemy.as_ref().unwrap();
        prop_assert_eq!(dragon.name.as_str(), "Dragon");
        prop_assert_eq!(dragon.health, (150.0 * level_factor(level)).floor() as i32);
        prop_assert_eq!(world.dungeon.room(STAIRS_ROOM).unwrap().room_type, RoomType::Stairs);
        prop_assert!(!world.dungeon.secret_room_found);

        for room in &world.dungeon.rooms {
            prop_assert!(!room.description.is_empty());
            if room.second_enemy.is_some() {
                prop_assert!(level >= 3);
            }
        }
    }

    #[test]
    fn same_seed_same_grid(seed in any::<u64>(), level in 1u32..6) {
        let a = generated(seed, level);
        let b = generated(seed, level);
        prop_assert_eq!(layout(&a), layout(&b));
        prop_assert_eq!(a.dungeon.has_secret_room, b.dungeon.has_secret_room);
    }

    #[test]
    fn scaling_floors_every_stat(level in 1u32..30) {
        let factor = level_factor(level);
        for kind in EnemyKind::all() {
            let template = kind.template();
            let enemy = scale_enemy_for_level(&template, level);

            prop_assert_eq!(enemy.health, (template.health as f64 * factor).floor() as i32);
            prop_assert_eq!(enemy.max_health, enemy.health);
            prop_assert_eq!(enemy.damage, (template.damage as f64 * factor).floor() as i32);
            prop_assert_eq!(enemy.gold, (template.gold as f64 * factor).floor() as u32);
            prop_assert_eq!(enemy.exp, (template.exp as f64 * factor).floor() as u32);
            prop_assert_eq!(enemy.regenerate, template.regenerate);
            prop_assert_eq!(enemy.flee_chance, template.flee_chance);
            prop_assert!(enemy.health >= template.health);
        }
    }
}
