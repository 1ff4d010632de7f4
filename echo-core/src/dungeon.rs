//! Procedural dungeon generation.
//!
//! Each level is a 10x10 grid. The entrance, boss lair and stairs sit at
//! fixed cells; every other room is rolled from a table chosen by its
//! Manhattan distance from the entrance. Deeper levels scale enemy stats
//! and unlock elite and late-game creatures.

use crate::bestiary::{EnemyKind, EnemyTemplate};
use crate::items::{Potion, AMULETS, RINGS, TREASURES};
use crate::rng::GameRng;
use crate::spells;
use crate::world::{Enemy, EnemyId, GameWorld, Position, Room, RoomType, DUNGEON_SIZE, ENTRANCE};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell holding the level boss.
pub const BOSS_ROOM: Position = Position::new(DUNGEON_SIZE - 1, DUNGEON_SIZE - 1);

/// Cell holding the stairs down.
pub const STAIRS_ROOM: Position = Position::new(DUNGEON_SIZE - 1, DUNGEON_SIZE - 2);

/// Chance that a generated level hides a secret room.
pub const SECRET_ROOM_CHANCE: f64 = 0.3;

/// Stat multiplier for a dungeon level.
pub fn level_factor(level: u32) -> f64 {
    1.0 + (level.max(1) - 1) as f64 * 0.3
}

/// Build a level-scaled enemy from a template.
///
/// Health, damage, gold and experience are multiplied by
/// `1 + (level - 1) * 0.3` and floored. Regeneration and flee chance are
/// copied unchanged.
pub fn scale_enemy_for_level(template: &EnemyTemplate, level: u32) -> Enemy {
    let factor = level_factor(level);
    let health = (template.health as f64 * factor).floor() as i32;

    Enemy {
        id: EnemyId::new(),
        name: template.kind.name().to_string(),
        health,
        max_health: health,
        damage: (template.damage as f64 * factor).floor() as i32,
        defense: 0,
        gold: (template.gold as f64 * factor).floor() as u32,
        exp: (template.exp as f64 * factor).floor() as u32,
        flee_chance: template.flee_chance,
        regenerate: template.regenerate,
    }
}

/// Replace the dungeon grid with a freshly generated level.
///
/// Uses `world.dungeon.current_level`, resets the player to the entrance
/// and rolls whether this level hides a secret room.
pub fn generate_dungeon(world: &mut GameWorld, rng: &mut GameRng) {
    let level = world.dungeon.current_level;
    let size = world.dungeon.size;
    let mut rooms: Vec<Room> = (0..size * size)
        .map(|_| Room::new(RoomType::Empty, ""))
        .collect();

    // Columns first so a given seed always lays out the same grid.
    for x in 0..size {
        for y in 0..size {
            let pos = Position::new(x, y);
            let room = if pos == ENTRANCE {
                Room::new(RoomType::Entrance, describe(RoomType::Entrance, rng))
            } else if pos == BOSS_ROOM {
                let dragon = scale_enemy_for_level(&EnemyKind::Dragon.template(), level);
                Room::new(RoomType::Boss, describe(RoomType::Boss, rng))
                    .with_chest(true)
                    .with_enemy(dragon)
            } else if pos == STAIRS_ROOM {
                Room::new(RoomType::Stairs, describe(RoomType::Stairs, rng))
            } else {
                regular_room(pos.manhattan(ENTRANCE), level, rng)
            };
            rooms[(y * size + x) as usize] = room;
        }
    }

    let dungeon = &mut world.dungeon;
    dungeon.rooms = rooms;
    dungeon.has_secret_room = rng.chance(SECRET_ROOM_CHANCE);
    dungeon.secret_room_found = false;

    world.player.position = ENTRANCE;
    world.player.previous_position = None;
    if let Some(entrance) = world.current_room_mut() {
        entrance.visited = true;
    }

    debug!(
        "Generated level {} ({} enemy rooms, secret room: {})",
        level,
        world
            .dungeon
            .rooms
            .iter()
            .filter(|r| r.enemy.is_some())
            .count(),
        world.dungeon.has_secret_room
    );
}

/// Distance band from the entrance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Near,
    Mid,
    Far,
}

impl Band {
    fn for_distance(distance: i32) -> Band {
        if distance >= 7 {
            Band::Far
        } else if distance >= 4 {
            Band::Mid
        } else {
            Band::Near
        }
    }
}

fn regular_room(distance: i32, level: u32, rng: &mut GameRng) -> Room {
    let roll = rng.next_f64();
    let elite = level >= 2 && rng.chance(0.15);

    if rng.chance(0.1) {
        return Room::new(RoomType::Merchant, describe(RoomType::Merchant, rng));
    }

    let band = Band::for_distance(distance);
    trace!("Rolling {:?} room (roll {:.3}, elite {})", band, roll, elite);

    match band {
        Band::Near => {
            if roll < 0.35 {
                let kind = if elite {
                    EnemyKind::OrcChieftain
                } else if level >= 2 {
                    coin(rng, EnemyKind::Orc, EnemyKind::Skeleton)
                } else {
                    EnemyKind::Goblin
                };
                enemy_room(kind, level, rng)
            } else if roll < 0.55 {
                treasure_room(rng)
            } else if roll < 0.60 {
                Room::new(RoomType::Fountain, describe(RoomType::Fountain, rng))
            } else {
                chest_room(RoomType::Empty, 0.15, rng)
            }
        }
        Band::Mid => {
            if roll < 0.45 {
                let kind = if level >= 5 {
                    if rng.chance(0.3) {
                        EnemyKind::LichKing
                    } else if elite {
                        EnemyKind::ElderTroll
                    } else {
                        coin(rng, EnemyKind::Wraith, EnemyKind::Troll)
                    }
                } else if elite {
                    if level >= 2 {
                        EnemyKind::AncientWraith
                    } else {
                        EnemyKind::OrcChieftain
                    }
                } else if level >= 2 {
                    coin(rng, EnemyKind::Wraith, EnemyKind::Troll)
                } else if rng.chance(0.6) {
                    EnemyKind::Orc
                } else {
                    EnemyKind::Skeleton
                };
                enemy_room(kind, level, rng)
            } else if roll < 0.65 {
                treasure_room(rng)
            } else if roll < 0.75 {
                Room::new(RoomType::Trap, describe(RoomType::Trap, rng))
            } else if roll < 0.80 {
                Room::new(RoomType::Fountain, describe(RoomType::Fountain, rng))
            } else {
                chest_room(RoomType::Empty, 0.2, rng)
            }
        }
        Band::Far => {
            if roll < 0.5 {
                let kind = if level >= 5 {
                    if rng.chance(0.4) {
                        coin(rng, EnemyKind::Hydra, EnemyKind::PhoenixGuardian)
                    } else if elite {
                        EnemyKind::ArchDemon
                    } else {
                        coin(rng, EnemyKind::Demon, EnemyKind::Vampire)
                    }
                } else if elite {
                    if level >= 3 {
                        EnemyKind::ArchDemon
                    } else {
                        EnemyKind::ElderTroll
                    }
                } else if level >= 3 {
                    coin(rng, EnemyKind::Demon, EnemyKind::Vampire)
                } else {
                    coin(rng, EnemyKind::Troll, EnemyKind::Wraith)
                };
                enemy_room(kind, level, rng)
            } else if roll < 0.7 {
                treasure_room(rng)
            } else if roll < 0.8 {
                Room::new(RoomType::Fountain, describe(RoomType::Fountain, rng))
            } else {
                chest_room(RoomType::Crypt, 0.3, rng)
            }
        }
    }
}

fn coin(rng: &mut GameRng, heads: EnemyKind, tails: EnemyKind) -> EnemyKind {
    if rng.chance(0.5) {
        heads
    } else {
        tails
    }
}

fn enemy_room(kind: EnemyKind, level: u32, rng: &mut GameRng) -> Room {
    let template = kind.template();
    let enemy = scale_enemy_for_level(&template, level);

    if level >= 3 && rng.chance(0.2) {
        let description = format!("{} Two creatures lurk here!", describe(RoomType::Enemy, rng));
        Room::new(RoomType::Enemy, description)
            .with_enemy(enemy)
            .with_second_enemy(scale_enemy_for_level(&template, level))
    } else {
        Room::new(RoomType::Enemy, describe(RoomType::Enemy, rng)).with_enemy(enemy)
    }
}

fn treasure_room(rng: &mut GameRng) -> Room {
    Room::new(RoomType::Treasure, describe(RoomType::Treasure, rng)).with_chest(true)
}

fn chest_room(room_type: RoomType, chest_chance: f64, rng: &mut GameRng) -> Room {
    let has_chest = rng.chance(chest_chance);
    Room::new(room_type, describe(room_type, rng)).with_chest(has_chest)
}

fn describe(room_type: RoomType, rng: &mut GameRng) -> String {
    rng.choose(room_descriptions(room_type))
        .copied()
        .unwrap_or("a featureless stone room.")
        .to_string()
}

/// Description pool for each room type.
pub fn room_descriptions(room_type: RoomType) -> &'static [&'static str] {
    match room_type {
        RoomType::Entrance => &[
            "the grand entrance hall. Torches flicker on ancient stone walls.",
            "the entrance chamber. A faded tapestry hangs on the north wall.",
            "the starting hall. Cobwebs drape from vaulted ceilings above.",
        ],
        RoomType::Empty => &[
            "an abandoned barracks. Rusty weapons litter the floor.",
            "a collapsed library. Torn pages scatter at your feet.",
            "a crumbling shrine. A broken altar stands in the center.",
            "a forgotten armory. Empty weapon racks line the walls.",
            "a dusty workshop. Ancient tools hang from hooks.",
            "a meditation chamber. Stone benches circle a dry fountain.",
            "an old prison cell. Iron bars have rusted through.",
            "a guard post. A skeleton sits slumped in a chair.",
        ],
        RoomType::Treasure => &[
            "a glittering treasure vault. Gold coins reflect torchlight.",
            "a dragon's hoard chamber. Piles of jewels gleam in the darkness.",
            "a royal treasury. Ancient chests overflow with riches.",
            "a pirate's cache. Stolen goods fill every corner.",
            "a wizard's vault. Magical artifacts pulse with energy.",
        ],
        RoomType::Enemy => &[
            "a dark chamber. You sense hostile eyes watching you.",
            "a blood-stained arena. Old battle scars mark the floor.",
            "a shadowy lair. Something growls in the darkness.",
            "a monster's den. Bones crunch beneath your feet.",
            "a cursed chamber. An evil presence fills the air.",
        ],
        RoomType::Boss => &[
            "the throne room of darkness. A massive beast awaits on a stone throne.",
            "the dragon's lair. Heat radiates from the enormous creature before you.",
            "the demon king's chamber. Dark energy swirls around your foe.",
        ],
        RoomType::Trap => &[
            "a trapped corridor. Pressure plates cover the floor.",
            "a spike-filled chamber. Deadly traps line the walls.",
            "a poison gas room. Strange vapors seep from cracks.",
        ],
        RoomType::Stairs => &[
            "a spiral stairwell. Dark stone steps descend into deeper darkness.",
            "a grand staircase. Ancient carvings decorate the descent.",
            "a hidden passage. Secret stairs lead to the next level.",
        ],
        RoomType::Fountain => &[
            "a magical fountain room. Crystal clear water bubbles from an enchanted spring.",
            "an ancient healing shrine. A mystical fountain glows with restorative power.",
        ],
        RoomType::Crypt => &[
            "a dusty crypt. Stone sarcophagi line the walls.",
            "an ancient burial chamber. Skeletal remains rest in alcoves.",
            "a forgotten tomb. Hieroglyphs cover every surface.",
        ],
        RoomType::Merchant => &[
            "a merchant's tent. A hooded figure tends to various wares.",
            "a traveling shop. Mysterious goods line makeshift shelves.",
        ],
    }
}

// ============================================================================
// Loot
// ============================================================================

/// A rolled loot drop, applied to the player by the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Loot {
    Gold(u32),
    Potion(Potion),
    Ring(String),
    Amulet(String),
    /// An ability book, named after the ability it teaches.
    Book(String),
    Treasure(String),
}

impl fmt::Display for Loot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loot::Gold(amount) => write!(f, "{} gold", amount),
            Loot::Potion(potion) => write!(f, "{}", potion),
            Loot::Ring(name) | Loot::Amulet(name) | Loot::Book(name) | Loot::Treasure(name) => {
                write!(f, "{}", name)
            }
        }
    }
}

/// Roll a loot drop for a dungeon level.
pub fn determine_loot(level: u32, rng: &mut GameRng) -> Loot {
    let roll = rng.next_f64();

    if roll < 0.30 {
        let base = 10 + rng.index(31) as u32;
        Loot::Gold((base as f64 * level_factor(level)).floor() as u32)
    } else if roll < 0.50 {
        let greater = level >= 3 && rng.chance(0.5);
        let health = rng.chance(0.5);
        let potion = match (greater, health) {
            (true, true) => Potion::GreaterHealth,
            (true, false) => Potion::GreaterMana,
            (false, true) => Potion::Health,
            (false, false) => Potion::Mana,
        };
        Loot::Potion(potion)
    } else if roll < 0.65 {
        let ring = &RINGS[rng.index(RINGS.len())];
        Loot::Ring(ring.name.to_string())
    } else if roll < 0.75 {
        let amulet = &AMULETS[rng.index(AMULETS.len())];
        Loot::Amulet(amulet.name.to_string())
    } else if roll < 0.85 {
        let abilities = spells::all_abilities();
        let ability = &abilities[rng.index(abilities.len())];
        Loot::Book(ability.name.to_string())
    } else {
        let treasure = &TREASURES[rng.index(TREASURES.len())];
        Loot::Treasure(treasure.name.to_string())
    }
}
