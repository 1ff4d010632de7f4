//! Item database.
//!
//! Contains the weapons, armor, shields, rings, amulets, potions and
//! treasures the dungeon can hand out, referenced by name.

use crate::spells::{self, Ability};
use crate::world::CharacterClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Get a weapon, armor piece or shield by name.
pub fn get_gear(name: &str) -> Option<&'static Gear> {
    let name_lower = name.to_lowercase();
    GEAR.iter().find(|g| g.name.to_lowercase() == name_lower)
}

/// Get a ring by name.
pub fn get_ring(name: &str) -> Option<&'static Trinket> {
    let name_lower = name.to_lowercase();
    RINGS.iter().find(|r| r.name.to_lowercase() == name_lower)
}

/// Get an amulet by name.
pub fn get_amulet(name: &str) -> Option<&'static Trinket> {
    let name_lower = name.to_lowercase();
    AMULETS.iter().find(|a| a.name.to_lowercase() == name_lower)
}

/// Get a sellable treasure by name.
pub fn get_treasure(name: &str) -> Option<&'static Treasure> {
    let name_lower = name.to_lowercase();
    TREASURES.iter().find(|t| t.name.to_lowercase() == name_lower)
}

/// Classify any known item name.
pub fn find_item(name: &str) -> Option<ItemKind> {
    if let Some(potion) = Potion::from_name(name) {
        return Some(ItemKind::Potion(potion));
    }
    if let Some(gear) = get_gear(name) {
        return Some(ItemKind::Gear(gear));
    }
    if let Some(ring) = get_ring(name) {
        return Some(ItemKind::Ring(ring));
    }
    if let Some(amulet) = get_amulet(name) {
        return Some(ItemKind::Amulet(amulet));
    }
    if let Some(book) = spells::get_ability(name) {
        return Some(ItemKind::Book(book));
    }
    if let Some(treasure) = get_treasure(name) {
        return Some(ItemKind::Treasure(treasure));
    }
    None
}

/// A known item from the database.
#[derive(Debug, Clone, Copy)]
pub enum ItemKind {
    Potion(Potion),
    Gear(&'static Gear),
    Ring(&'static Trinket),
    Amulet(&'static Trinket),
    Book(&'static Ability),
    Treasure(&'static Treasure),
}

// ============================================================================
// Equipment
// ============================================================================

/// Which equipment slot a piece of gear occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GearSlot {
    Weapon,
    Armor,
    Shield,
}

/// A class-restricted weapon, armor piece or shield.
#[derive(Debug, Clone)]
pub struct Gear {
    pub name: &'static str,
    pub slot: GearSlot,
    /// Attack for weapons, defense for armor and shields.
    pub power: i32,
    pub class: CharacterClass,
    pub value: u32,
}

impl Gear {
    const fn new(
        name: &'static str,
        slot: GearSlot,
        power: i32,
        class: CharacterClass,
        value: u32,
    ) -> Self {
        Self {
            name,
            slot,
            power,
            class,
            value,
        }
    }
}

lazy_static::lazy_static! {
    /// All weapons, armor and shields.
    pub static ref GEAR: Vec<Gear> = {
        use CharacterClass::*;
        use GearSlot::*;
        vec![
            // Weapons
            Gear::new("Steel Sword", Weapon, 8, Warrior, 100),
            Gear::new("Mystic Staff", Weapon, 10, Mage, 150),
            Gear::new("Shadow Daggers", Weapon, 10, Rogue, 120),
            Gear::new("Legendary Greatsword", Weapon, 15, Warrior, 300),
            Gear::new("Archmage Staff", Weapon, 18, Mage, 350),
            Gear::new("Vorpal Daggers", Weapon, 16, Rogue, 320),
            Gear::new("Demon Slayer Blade", Weapon, 20, Warrior, 500),
            Gear::new("Staff of the Cosmos", Weapon, 25, Mage, 600),
            Gear::new("Ethereal Blades", Weapon, 22, Rogue, 550),
            // Armor
            Gear::new("Chainmail", Armor, 8, Warrior, 100),
            Gear::new("Enchanted Robes", Armor, 5, Mage, 120),
            Gear::new("Shadow Leather", Armor, 6, Rogue, 110),
            Gear::new("Dragonscale Plate", Armor, 15, Warrior, 350),
            Gear::new("Arcane Vestments", Armor, 12, Mage, 380),
            Gear::new("Phantom Suit", Armor, 13, Rogue, 360),
            Gear::new("Titanium Fortress", Armor, 22, Warrior, 550),
            Gear::new("Celestial Robes", Armor, 18, Mage, 600),
            Gear::new("Void Cloak", Armor, 20, Rogue, 580),
            // Shields
            Gear::new("Iron Shield", Shield, 5, Warrior, 80),
            Gear::new("Tower Shield", Shield, 10, Warrior, 250),
            Gear::new("Aegis Shield", Shield, 15, Warrior, 450),
        ]
    };
}

// ============================================================================
// Rings and Amulets
// ============================================================================

/// Stat a ring or amulet modifies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatBonus {
    MaxHealth(i32),
    MaxMana(i32),
    Attack(i32),
    /// Multiplier applied to experience gains.
    ExperienceGain(f64),
}

impl fmt::Display for StatBonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatBonus::MaxHealth(v) => write!(f, "+{} Max Health", v),
            StatBonus::MaxMana(v) => write!(f, "+{} Max Mana", v),
            StatBonus::Attack(v) => write!(f, "+{} Attack", v),
            StatBonus::ExperienceGain(m) => {
                write!(f, "+{}% Experience Gain", ((m - 1.0) * 100.0).round())
            }
        }
    }
}

/// A ring or amulet.
#[derive(Debug, Clone)]
pub struct Trinket {
    pub name: &'static str,
    pub bonus: StatBonus,
}

const fn trinket(name: &'static str, bonus: StatBonus) -> Trinket {
    Trinket { name, bonus }
}

/// Most rings a player may wear at once.
pub const MAX_RINGS: usize = 10;

/// Most copies of one ring a player may wear at once.
pub const MAX_SAME_RING: usize = 2;

lazy_static::lazy_static! {
    pub static ref RINGS: Vec<Trinket> = vec![
        trinket("Ring of Vitality", StatBonus::MaxHealth(10)),
        trinket("Ring of Minor Mana", StatBonus::MaxMana(10)),
        trinket("Ring of Protection", StatBonus::MaxHealth(5)),
        trinket("Ring of Strength", StatBonus::Attack(2)),
        trinket("Ring of Wisdom", StatBonus::MaxMana(5)),
        trinket("Ring of the Titan", StatBonus::MaxHealth(20)),
        trinket("Ring of Arcane Power", StatBonus::MaxMana(15)),
        trinket("Ring of the Berserker", StatBonus::Attack(4)),
    ];

    pub static ref AMULETS: Vec<Trinket> = vec![
        trinket("Amulet of Vitality", StatBonus::MaxHealth(15)),
        trinket("Amulet of Mana", StatBonus::MaxMana(15)),
        trinket("Amulet of Experience", StatBonus::ExperienceGain(1.2)),
        trinket("Amulet of the Archmage", StatBonus::MaxMana(30)),
        trinket("Amulet of the Titan", StatBonus::MaxHealth(30)),
        trinket("Amulet of Power", StatBonus::Attack(5)),
    ];
}

// ============================================================================
// Potions
// ============================================================================

/// Consumable potions sold by merchants and found as loot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Potion {
    Health,
    GreaterHealth,
    Mana,
    GreaterMana,
}

impl Potion {
    pub fn all() -> [Potion; 4] {
        [
            Potion::Health,
            Potion::Mana,
            Potion::GreaterHealth,
            Potion::GreaterMana,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Potion::Health => "Health Potion",
            Potion::GreaterHealth => "Greater Health Potion",
            Potion::Mana => "Mana Potion",
            Potion::GreaterMana => "Greater Mana Potion",
        }
    }

    pub fn from_name(name: &str) -> Option<Potion> {
        let name_lower = name.to_lowercase();
        Potion::all()
            .into_iter()
            .find(|p| p.name().to_lowercase() == name_lower)
    }

    /// Health or mana restored on drinking.
    pub fn restores(&self) -> i32 {
        match self {
            Potion::Health => 40,
            Potion::GreaterHealth => 80,
            Potion::Mana => 30,
            Potion::GreaterMana => 60,
        }
    }

    pub fn restores_health(&self) -> bool {
        matches!(self, Potion::Health | Potion::GreaterHealth)
    }

    /// Merchant price in gold.
    pub fn price(&self) -> u32 {
        match self {
            Potion::Health => 30,
            Potion::GreaterHealth => 60,
            Potion::Mana => 25,
            Potion::GreaterMana => 50,
        }
    }
}

impl fmt::Display for Potion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Treasures
// ============================================================================

/// Valuables that exist only to be sold.
#[derive(Debug, Clone)]
pub struct Treasure {
    pub name: &'static str,
    pub value: u32,
}

lazy_static::lazy_static! {
    pub static ref TREASURES: Vec<Treasure> = vec![
        Treasure { name: "Sapphire Gem", value: 50 },
        Treasure { name: "Ruby Gem", value: 75 },
        Treasure { name: "Diamond", value: 100 },
        Treasure { name: "Emerald", value: 60 },
        Treasure { name: "Ancient Coin Collection", value: 40 },
        Treasure { name: "Golden Chalice", value: 80 },
        Treasure { name: "Silver Crown", value: 90 },
        Treasure { name: "Enchanted Amulet", value: 120 },
    ];
}
