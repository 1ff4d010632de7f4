//! Starting data for the playable classes.

use crate::world::CharacterClass;

/// A class's signature ability, always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Special {
    pub name: &'static str,
    pub damage: i32,
    pub cost: i32,
}

/// Class-specific data applied at class selection.
pub struct ClassData {
    pub health: i32,
    pub mana: i32,
    pub gold: u32,
    /// Starting kit. Weapons, armor and shields are equipped on selection.
    pub starting_items: &'static [&'static str],
    pub special: Special,
}

impl CharacterClass {
    /// Get class data for class selection.
    pub fn data(&self) -> ClassData {
        match self {
            CharacterClass::Warrior => ClassData {
                health: 120,
                mana: 30,
                gold: 50,
                starting_items: &[
                    "Steel Sword",
                    "Health Potion",
                    "Health Potion",
                    "Chainmail",
                    "Iron Shield",
                ],
                special: Special {
                    name: "Power Strike",
                    damage: 50,
                    cost: 15,
                },
            },
            CharacterClass::Mage => ClassData {
                health: 80,
                mana: 100,
                gold: 75,
                starting_items: &[
                    "Mystic Staff",
                    "Mana Potion",
                    "Health Potion",
                    "Enchanted Robes",
                ],
                special: Special {
                    name: "Fireball",
                    damage: 100,
                    cost: 20,
                },
            },
            CharacterClass::Rogue => ClassData {
                health: 100,
                mana: 60,
                gold: 100,
                starting_items: &[
                    "Shadow Daggers",
                    "Lockpicks",
                    "Health Potion",
                    "Shadow Leather",
                ],
                special: Special {
                    name: "Backstab",
                    damage: 35,
                    cost: 15,
                },
            },
        }
    }

    /// One-line flavor used on the class selection prompt.
    pub fn description(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "high health and a heavy shield",
            CharacterClass::Mage => "deep mana and devastating spells",
            CharacterClass::Rogue => "quick blades and plenty of gold",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items;

    #[test]
    fn test_class_stats() {
        let warrior = CharacterClass::Warrior.data();
        assert_eq!((warrior.health, warrior.mana, warrior.gold), (120, 30, 50));
        assert_eq!(warrior.special.name, "Power Strike");

        let mage = CharacterClass::Mage.data();
        assert_eq!((mage.health, mage.mana, mage.gold), (80, 100, 75));
        assert_eq!((mage.special.damage, mage.special.cost), (100, 20));

        let rogue = CharacterClass::Rogue.data();
        assert_eq!((rogue.health, rogue.mana, rogue.gold), (100, 60, 100));
    }

    #[test]
    fn test_starting_gear_matches_class() {
        for class in CharacterClass::all() {
            for name in class.data().starting_items {
                if let Some(gear) = items::get_gear(name) {
                    assert_eq!(gear.class, class, "{} in {} kit", name, class);
                }
            }
        }
    }
}
