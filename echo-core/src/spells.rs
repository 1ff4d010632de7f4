//! Learnable combat abilities.
//!
//! Abilities are found as books in the dungeon, read once to learn, and
//! cast in combat for mana.

use crate::world::CharacterClass;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// What an ability does besides its direct damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Damage to the current target only.
    Damage,
    /// Damage and the target skips its next action.
    Freeze,
    /// Damage and the target skips its next action.
    Stun,
    /// Damage now, then damage over time.
    Poison { duration: u32, per_turn: i32 },
    /// Damage to every live enemy.
    Aoe,
    /// Damage with no retaliation on the following enemy phase.
    Sneak,
}

/// A learnable ability.
#[derive(Debug, Clone)]
pub struct Ability {
    pub name: &'static str,
    pub damage: i32,
    pub cost: i32,
    pub kind: AbilityKind,
    pub description: &'static str,
    pub class: CharacterClass,
}

// ============================================================================
// Ability Database
// ============================================================================

static ABILITIES: LazyLock<Vec<Ability>> = LazyLock::new(build_ability_database);

/// Look up an ability by name (case-insensitive).
pub fn get_ability(name: &str) -> Option<&'static Ability> {
    let name_lower = name.to_lowercase();
    ABILITIES.iter().find(|a| a.name.to_lowercase() == name_lower)
}

/// All abilities in table order.
pub fn all_abilities() -> &'static [Ability] {
    &ABILITIES
}

/// Abilities usable by a class.
pub fn abilities_for_class(class: CharacterClass) -> impl Iterator<Item = &'static Ability> {
    ABILITIES.iter().filter(move |a| a.class == class)
}

fn build_ability_database() -> Vec<Ability> {
    vec![
        Ability {
            name: "Icy Blast",
            damage: 70,
            cost: 20,
            kind: AbilityKind::Freeze,
            description: "Deals damage and freezes enemy for 1 turn",
            class: CharacterClass::Mage,
        },
        Ability {
            name: "Shield Bash",
            damage: 60,
            cost: 20,
            kind: AbilityKind::Stun,
            description: "Stun enemy for one turn",
            class: CharacterClass::Warrior,
        },
        Ability {
            name: "Poison Blade",
            damage: 30,
            cost: 20,
            kind: AbilityKind::Poison {
                duration: 3,
                per_turn: 5,
            },
            description: "Poison damages 5 per turn for 3 turns",
            class: CharacterClass::Rogue,
        },
        Ability {
            name: "Chain Lightning",
            damage: 75,
            cost: 30,
            kind: AbilityKind::Damage,
            description: "Devastating lightning attack",
            class: CharacterClass::Mage,
        },
        Ability {
            name: "Arcane Missiles",
            damage: 65,
            cost: 15,
            kind: AbilityKind::Aoe,
            description: "Magic missiles hit all enemies",
            class: CharacterClass::Mage,
        },
        Ability {
            name: "Whirlwind",
            damage: 50,
            cost: 25,
            kind: AbilityKind::Aoe,
            description: "Spin attack hitting all enemies",
            class: CharacterClass::Warrior,
        },
        Ability {
            name: "Shadow Strike",
            damage: 40,
            cost: 20,
            kind: AbilityKind::Sneak,
            description: "Strike from shadows without enemy retaliation",
            class: CharacterClass::Rogue,
        },
    ]
}
