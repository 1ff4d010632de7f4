//! Moving through the dungeon and interacting with rooms.
//!
//! Also owns the mode-aware guidance: help, command lists, hints and the
//! prompt for unrecognized input.

use crate::combat;
use crate::dungeon::{self, determine_loot};
use crate::narration::Pause;
use crate::progression;
use crate::rng::GameRng;
use crate::rules::{Effect, Rejection, Resolution};
use crate::world::{CharacterClass, Direction, GameMode, GameWorld, Room, RoomType};
use log::{debug, info};

/// Chance per search of uncovering the level's secret room.
pub const SECRET_ROOM_SEARCH_CHANCE: f64 = 0.15;

/// Trap damage on level 1 is `TRAP_BASE_DAMAGE + TRAP_DAMAGE_PER_LEVEL`.
pub const TRAP_BASE_DAMAGE: i32 = 15;
pub const TRAP_DAMAGE_PER_LEVEL: i32 = 5;

fn room_here(world: &mut GameWorld) -> Result<&mut Room, Rejection> {
    world.current_room_mut().ok_or(Rejection::NoClass)
}

// ============================================================================
// Rooms
// ============================================================================

/// Narrate the current room. A live enemy here starts combat.
pub fn describe_room(world: &mut GameWorld, out: &mut Resolution) {
    let level = world.dungeon.current_level;
    let Some(room) = world.current_room() else {
        return;
    };

    out.narrate(format!("You are on Level {} in {}", level, room.description));

    let live: Vec<&str> = room
        .enemies()
        .filter(|e| e.is_alive())
        .map(|e| e.name.as_str())
        .collect();

    if room.room_type == RoomType::Stairs {
        out.narrate_with(
            "Dark stairs descend deeper. Say \"go down stairs\" to descend.",
            Pause::Short,
        );
    } else if room.room_type == RoomType::Merchant {
        out.narrate_with(
            "A traveling merchant is here. Say \"merchant\" to trade.",
            Pause::Short,
        );
    } else if room.room_type == RoomType::Fountain && !room.fountain_used {
        out.narrate_with(
            "A magical fountain bubbles here. Say \"drink fountain\" to be healed.",
            Pause::Short,
        );
    } else if !live.is_empty() {
        let line = match live.as_slice() {
            [first, second] => format!("A {} and a {} block your path!", first, second),
            _ => format!("A {} blocks your path!", live.join(" and ")),
        };
        out.narrate_with(line, Pause::Long);
        combat::start_combat(world, out);
        return;
    } else {
        if room.has_chest && !room.searched {
            out.narrate_with(
                "A treasure chest glimmers in the shadows. Say \"open chest\" to loot it.",
                Pause::Short,
            );
        }
        if !room.searched {
            out.narrate_with("You could search this room.", Pause::Short);
        }
    }

    out.narrate("Which direction will you go?");
}

/// Step one room in a direction.
///
/// An unvisited trap room springs on entry and can kill the player.
pub fn move_player(
    world: &mut GameWorld,
    direction: Direction,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let from = world.player.position;
    let to = from.step(direction);
    if !world.dungeon.contains(to) {
        return Err(Rejection::Blocked);
    }

    world.player.previous_position = Some(from);
    world.player.position = to;
    out.record(Effect::PlayerMoved { from, to });
    debug!("Moved {} from {} to {}", direction.name(), from, to);

    let level = world.dungeon.current_level as i32;
    let room = room_here(world)?;
    if room.room_type == RoomType::Trap && !room.visited {
        let damage = TRAP_BASE_DAMAGE + TRAP_DAMAGE_PER_LEVEL * level;
        let player = &mut world.player;
        player.health -= damage;
        out.record(Effect::TrapTriggered {
            damage,
            health: player.health,
        });
        out.narrate(format!(
            "A trap springs! You take {} damage! Health: {}.",
            damage, player.health
        ));
        if player.is_defeated() {
            combat::defeat(world, None, out);
            return Ok(());
        }
    }

    room_here(world)?.visited = true;
    describe_room(world, out);
    Ok(())
}

/// Search the current room once for loot and the level's secret room.
pub fn search(world: &mut GameWorld, rng: &mut GameRng, out: &mut Resolution) -> Result<(), Rejection> {
    let room = room_here(world)?;
    if room.searched {
        return Err(Rejection::AlreadySearched);
    }
    room.searched = true;

    let dungeon = &mut world.dungeon;
    if dungeon.has_secret_room
        && !dungeon.secret_room_found
        && rng.chance(SECRET_ROOM_SEARCH_CHANCE)
    {
        dungeon.secret_room_found = true;
        info!("Secret room found on level {}", dungeon.current_level);
        out.record(Effect::SecretRoomFound);
        out.narrate_with("You found a hidden passage behind a loose stone!", Pause::Short);
        out.narrate("Inside, ancient treasures await!");
    }

    let loot = determine_loot(world.dungeon.current_level, rng);
    progression::apply_loot(&mut world.player, loot, out);
    Ok(())
}

/// Loot the chest in the current room.
pub fn open_chest(
    world: &mut GameWorld,
    rng: &mut GameRng,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let room = room_here(world)?;
    if !room.has_chest || room.searched {
        return Err(Rejection::NoChest);
    }
    room.searched = true;

    out.narrate_with("You open the chest and find...", Pause::Long);
    let loot = determine_loot(world.dungeon.current_level, rng);
    progression::apply_loot(&mut world.player, loot, out);
    Ok(())
}

/// Drink from an unused fountain, fully restoring health and mana.
pub fn drink_fountain(world: &mut GameWorld, out: &mut Resolution) -> Result<(), Rejection> {
    let room = room_here(world)?;
    if room.room_type != RoomType::Fountain || room.fountain_used {
        return Err(Rejection::NoFountain);
    }
    room.fountain_used = true;

    let player = &mut world.player;
    let health = player.restore_health(player.max_health);
    let mana = player.restore_mana(player.max_mana);
    out.record(Effect::FountainUsed);
    out.record(Effect::HealthRestored {
        amount: health,
        health: player.health,
    });
    out.record(Effect::ManaRestored {
        amount: mana,
        mana: player.mana,
    });
    out.narrate("You drink from the fountain and are fully healed and restored!");
    Ok(())
}

/// Take the stairs down to a freshly generated level.
pub fn descend(world: &mut GameWorld, rng: &mut GameRng, out: &mut Resolution) -> Result<(), Rejection> {
    if room_here(world)?.room_type != RoomType::Stairs {
        return Err(Rejection::NoStairs);
    }

    world.dungeon.current_level += 1;
    dungeon::generate_dungeon(world, rng);
    info!("Descended to level {}", world.dungeon.current_level);

    out.record(Effect::LevelGenerated {
        level: world.dungeon.current_level,
        has_secret_room: world.dungeon.has_secret_room,
    });
    out.narrate_with(
        format!("You descend to level {}.", world.dungeon.current_level),
        Pause::Long,
    );
    describe_room(world, out);
    Ok(())
}

// ============================================================================
// Guidance
// ============================================================================

/// What to say when the input matched nothing.
pub fn unknown_prompt(mode: GameMode) -> &'static str {
    match mode {
        GameMode::ClassSelect => "Please say warrior, mage, or rogue.",
        GameMode::Combat => "Say attack, defend, special, cast spell, use potion, or flee.",
        GameMode::Merchant => "Say buy, sell, what do you have, or leave.",
        GameMode::Exploration => "Unknown command. Say help for options.",
    }
}

pub fn help(world: &GameWorld, out: &mut Resolution) {
    out.narrate(match world.mode {
        GameMode::ClassSelect => "Choose your class: warrior, mage, or rogue.",
        GameMode::Combat => "Combat commands: attack, defend, special, cast spell, use potion, switch target, or flee.",
        GameMode::Merchant => "Merchant commands: what do you have, buy, sell, or leave.",
        GameMode::Exploration => "Exploration commands: north, south, east, west, look around, search, open chest, drink fountain, merchant, meditate, wear ring, remove ring, equip amulet, equip gear, read book, use potion, status, or inventory.",
    });
}

/// Spoken command reference for the current mode.
pub fn commands(world: &GameWorld, out: &mut Resolution) {
    let lines: &[&str] = match world.mode {
        GameMode::ClassSelect => &[
            "Classes:",
            "Warrior. High health and a heavy shield.",
            "Mage. Deep mana and devastating spells.",
            "Rogue. Quick blades and plenty of gold.",
        ],
        GameMode::Combat => &[
            "Combat commands:",
            "Attack. Deal damage.",
            "Defend. Reduce incoming damage.",
            "Special. Use your class ability.",
            "Cast spell. Use a learned ability.",
            "Use potion. Heal or restore mana.",
            "Switch target. Face the other enemy.",
            "Flee. Try to escape.",
        ],
        GameMode::Merchant => &[
            "Merchant commands:",
            "What do you have. Hear the stock.",
            "Buy. Purchase potions, up to three at a time.",
            "Sell. Trade treasures for gold.",
            "Leave. Stop trading.",
        ],
        GameMode::Exploration => &[
            "Movement: north, south, east, west, go down stairs.",
            "Actions: look around, search, open chest, drink fountain, merchant, meditate, wear ring, remove ring, equip amulet, equip gear, read book, use potion.",
            "Info: status, inventory, hint.",
            "System: commands, help.",
        ],
    };
    for line in lines {
        out.narrate_with(*line, Pause::Short);
    }
}

/// One piece of situational advice.
pub fn hint(world: &GameWorld, out: &mut Resolution) {
    let player = &world.player;
    let line = match world.mode {
        GameMode::ClassSelect => format!(
            "Say warrior for {}, mage for {}, or rogue for {}.",
            CharacterClass::Warrior.description(),
            CharacterClass::Mage.description(),
            CharacterClass::Rogue.description()
        ),
        GameMode::Merchant => {
            "Stock up on potions before facing the boss, and sell treasures for gold.".to_string()
        }
        GameMode::Combat => {
            let special = player.class.map(|c| c.data().special);
            match special {
                _ if player.health < 30 => {
                    "Your health is low. Consider using a health potion or defending.".to_string()
                }
                Some(special) if player.mana >= special.cost => {
                    format!("You have enough mana for {}.", special.name)
                }
                _ => "Try attacking or defending based on your health.".to_string(),
            }
        }
        GameMode::Exploration => match world.current_room() {
            Some(room) => exploration_hint(world, room),
            None => unknown_prompt(GameMode::Exploration).to_string(),
        },
    };
    out.narrate(line);
}

fn exploration_hint(world: &GameWorld, room: &Room) -> String {
    let player = &world.player;
    let line = if room.room_type == RoomType::Stairs {
        "A staircase is here. Say \"go down stairs\" to descend to the next level."
    } else if room.room_type == RoomType::Merchant {
        "A merchant is here. Say \"merchant\" to trade goods."
    } else if room.room_type == RoomType::Fountain && !room.fountain_used {
        "There is a magical fountain here. Say \"drink fountain\" for full healing."
    } else if room.has_chest && !room.searched {
        "There is a chest here. Say open chest."
    } else if !room.searched {
        "You have not searched this room yet. Try searching."
    } else if (player.mana as f64) < player.max_mana as f64 * 0.5 {
        "Your mana is low. Consider saying meditate to recover."
    } else if room.room_type == RoomType::Boss {
        "This is a boss room. Be prepared for a tough fight."
    } else {
        "Explore in different directions. The boss is at the far south east corner. Look for merchants to buy potions and sell loot."
    };
    line.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bestiary::EnemyKind;
    use crate::dungeon::{scale_enemy_for_level, Loot};
    use crate::world::{Position, ENTRANCE};

    fn explored_world() -> GameWorld {
        let mut world = GameWorld::new();
        world.player.class = Some(CharacterClass::Warrior);
        world.mode = GameMode::Exploration;
        world.dungeon.rooms = (0..100)
            .map(|_| Room::new(RoomType::Empty, "a quiet chamber."))
            .collect();
        world.current_room_mut().unwrap().visited = true;
        world
    }

    fn set_room(world: &mut GameWorld, pos: Position, room: Room) {
        *world.dungeon.room_mut(pos).unwrap() = room;
    }

    #[test]
    fn test_move_into_wall_is_rejected() {
        let mut world = explored_world();
        world.player.position = Position::new(5, 0);
        let mut out = Resolution::empty();

        let err = move_player(&mut world, Direction::North, &mut out).unwrap_err();
        assert_eq!(err, Rejection::Blocked);
        assert_eq!(world.player.position, Position::new(5, 0));
        assert!(world.player.previous_position.is_none());
    }

    #[test]
    fn test_move_describes_room() {
        let mut world = explored_world();
        let mut out = Resolution::empty();
        move_player(&mut world, Direction::East, &mut out).unwrap();

        assert_eq!(world.player.position, Position::new(6, 5));
        assert_eq!(world.player.previous_position, Some(ENTRANCE));
        assert!(world.current_room().unwrap().visited);
        assert_eq!(
            out.text(),
            "You are on Level 1 in a quiet chamber. You could search this room. Which direction will you go?"
        );
    }

    #[test]
    fn test_trap_springs_once() {
        let mut world = explored_world();
        world.dungeon.current_level = 2;
        set_room(&mut world, Position::new(6, 5), Room::new(RoomType::Trap, "a narrow hall."));
        let mut out = Resolution::empty();

        move_player(&mut world, Direction::East, &mut out).unwrap();
        assert_eq!(world.player.health, 75);
        assert!(out.text().contains("A trap springs! You take 25 damage! Health: 75."));

        let mut out = Resolution::empty();
        move_player(&mut world, Direction::West, &mut out).unwrap();
        move_player(&mut world, Direction::East, &mut out).unwrap();
        assert_eq!(world.player.health, 75);
    }

    #[test]
    fn test_fatal_trap_resets_player() {
        let mut world = explored_world();
        world.dungeon.current_level = 3;
        world.player.health = 20;
        set_room(&mut world, Position::new(5, 6), Room::new(RoomType::Trap, "a pit."));
        let mut out = Resolution::empty();

        move_player(&mut world, Direction::South, &mut out).unwrap();
        assert_eq!(world.mode, GameMode::ClassSelect);
        assert!(world.player.class.is_none());
        assert_eq!(world.dungeon.current_level, 3);
        assert!(out.outcome.is_none());
        assert!(out.effects.contains(&Effect::PlayerReset));
    }

    #[test]
    fn test_enemy_room_starts_combat() {
        let mut world = explored_world();
        let orc = scale_enemy_for_level(&EnemyKind::Orc.template(), 1);
        set_room(
            &mut world,
            Position::new(4, 5),
            Room::new(RoomType::Enemy, "a den.").with_enemy(orc),
        );
        let mut out = Resolution::empty();

        move_player(&mut world, Direction::West, &mut out).unwrap();
        assert_eq!(world.mode, GameMode::Combat);
        assert!(out.text().contains("A Orc blocks your path!"));
        assert!(!out.text().contains("Which direction"));
    }

    #[test]
    fn test_search_once_and_secret_room() {
        let mut world = explored_world();
        world.dungeon.has_secret_room = true;
        // secret room roll, loot roll (gold), gold amount
        let mut rng = GameRng::scripted([0.1, 0.1, 0.0]);
        let mut out = Resolution::empty();

        search(&mut world, &mut rng, &mut out).unwrap();
        assert!(world.dungeon.secret_room_found);
        assert!(out.effects.contains(&Effect::SecretRoomFound));
        assert!(out.effects.contains(&Effect::LootFound { loot: Loot::Gold(10) }));
        assert_eq!(world.player.gold, 35);

        let err = search(&mut world, &mut rng, &mut out).unwrap_err();
        assert_eq!(err, Rejection::AlreadySearched);
    }

    #[test]
    fn test_open_chest() {
        let mut world = explored_world();
        let mut rng = GameRng::scripted([0.95, 0.0]);
        let mut out = Resolution::empty();
        assert_eq!(
            open_chest(&mut world, &mut rng, &mut out).unwrap_err(),
            Rejection::NoChest
        );

        world.current_room_mut().unwrap().has_chest = true;
        open_chest(&mut world, &mut rng, &mut out).unwrap();
        assert!(world.player.has_item("Sapphire Gem"));
        assert_eq!(
            open_chest(&mut world, &mut rng, &mut out).unwrap_err(),
            Rejection::NoChest
        );
    }

    #[test]
    fn test_fountain_restores_once() {
        let mut world = explored_world();
        set_room(&mut world, ENTRANCE, Room::new(RoomType::Fountain, "a grotto."));
        world.player.health = 10;
        world.player.mana = 5;
        let mut out = Resolution::empty();

        drink_fountain(&mut world, &mut out).unwrap();
        assert_eq!((world.player.health, world.player.mana), (100, 50));
        assert_eq!(
            drink_fountain(&mut world, &mut out).unwrap_err(),
            Rejection::NoFountain
        );
    }

    #[test]
    fn test_descend_requires_stairs() {
        let mut world = explored_world();
        let mut rng = GameRng::new(5);
        let mut out = Resolution::empty();
        assert_eq!(
            descend(&mut world, &mut rng, &mut out).unwrap_err(),
            Rejection::NoStairs
        );

        world.player.position = dungeon::STAIRS_ROOM;
        set_room(&mut world, dungeon::STAIRS_ROOM, Room::new(RoomType::Stairs, "a stairwell."));
        descend(&mut world, &mut rng, &mut out).unwrap();
        assert_eq!(world.dungeon.current_level, 2);
        assert_eq!(world.player.position, ENTRANCE);
        assert_eq!(
            world.current_room().unwrap().room_type,
            RoomType::Entrance
        );
        assert!(out.text().contains("You descend to level 2."));
    }

    #[test]
    fn test_hint_follows_room() {
        let mut world = explored_world();
        let mut out = Resolution::empty();
        hint(&world, &mut out);
        assert_eq!(out.text(), "You have not searched this room yet. Try searching.");

        world.current_room_mut().unwrap().searched = true;
        world.player.mana = 10;
        let mut out = Resolution::empty();
        hint(&world, &mut out);
        assert_eq!(out.text(), "Your mana is low. Consider saying meditate to recover.");
    }
}
