//! Spoken command parsing.
//!
//! Each mode has its own vocabulary, checked in priority order against the
//! lowercased input. The first matching keyword wins, so the order of the
//! checks below is part of the behavior.

use crate::items::Potion;
use crate::rules::Intent;
use crate::world::{CharacterClass, Direction, GameMode};

fn has(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Like [`has`], but only whole words count.
fn has_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|token| words.contains(&token))
}

/// Turn a spoken command into an intent for the current mode.
pub fn parse(input: &str, mode: GameMode) -> Intent {
    let text = input.trim().to_lowercase();

    if mode == GameMode::ClassSelect {
        return parse_class(&text);
    }
    if let Some(intent) = parse_info(&text) {
        return intent;
    }

    match mode {
        GameMode::ClassSelect => parse_class(&text),
        GameMode::Exploration => parse_exploration(&text),
        GameMode::Merchant => parse_merchant(&text),
        GameMode::Combat => parse_combat(&text),
    }
}

fn parse_class(text: &str) -> Intent {
    if has(text, &["warrior", "fighter"]) {
        Intent::ChooseClass(CharacterClass::Warrior)
    } else if has(text, &["mage", "wizard"]) {
        Intent::ChooseClass(CharacterClass::Mage)
    } else if has(text, &["rogue", "thief"]) {
        Intent::ChooseClass(CharacterClass::Rogue)
    } else if has(text, &["commands"]) {
        Intent::Commands
    } else if has(text, &["hint"]) {
        Intent::Hint
    } else if has(text, &["help"]) {
        Intent::Help
    } else {
        Intent::Unknown(text.to_string())
    }
}

/// Reports that work in every mode once a class is chosen.
fn parse_info(text: &str) -> Option<Intent> {
    if has(text, &["status", "stats", "check"]) {
        Some(Intent::Status)
    } else if has(text, &["inventory", "items", "bag"]) {
        Some(Intent::Inventory)
    } else if has(text, &["commands", "what can i"]) {
        Some(Intent::Commands)
    } else if has(text, &["hint", "help me"]) {
        Some(Intent::Hint)
    } else {
        None
    }
}

fn parse_exploration(text: &str) -> Intent {
    if has(text, &["fountain", "drink water"]) {
        Intent::DrinkFountain
    } else if has_word(text, &["ring", "rings"]) && has(text, &["remove", "take off", "unequip"]) {
        Intent::RemoveRing(ring_name(text).map(String::from))
    } else if has_word(text, &["ring", "rings"]) && has(text, &["wear", "equip", "put on"]) {
        Intent::EquipRing(ring_name(text).map(String::from))
    } else if has_word(text, &["amulet"]) && has(text, &["wear", "equip", "put on"]) {
        Intent::EquipAmulet(amulet_name(text).map(String::from))
    } else if has(text, &["potion", "use", "drink", "heal"]) {
        Intent::UsePotion(potion_name(text))
    } else if has(text, &["north", "forward"]) {
        Intent::Move(Direction::North)
    } else if has(text, &["south", "back"]) {
        Intent::Move(Direction::South)
    } else if has(text, &["east", "right"]) {
        Intent::Move(Direction::East)
    } else if has(text, &["west", "left"]) {
        Intent::Move(Direction::West)
    } else if has(text, &["meditate", "rest"]) {
        Intent::Meditate
    } else if has(text, &["look", "around", "where"]) {
        Intent::Look
    } else if has(text, &["search", "examine"]) {
        Intent::Search
    } else if has(text, &["chest", "loot"]) {
        Intent::OpenChest
    } else if has(text, &["stairs", "go down", "descend"]) {
        Intent::Descend
    } else if has(text, &["merchant", "shop", "trade"]) {
        Intent::TalkToMerchant
    } else if has(text, &["equip", "wear", "wield"]) {
        Intent::EquipGear(text.to_string())
    } else if has(text, &["read", "learn"]) {
        Intent::ReadBook(ability_name(text).map(String::from))
    } else if has(text, &["help"]) {
        Intent::Help
    } else {
        Intent::Unknown(text.to_string())
    }
}

fn parse_merchant(text: &str) -> Intent {
    if has(text, &["leave", "exit", "close"]) {
        Intent::LeaveMerchant
    } else if has(text, &["buy"]) {
        Intent::Buy {
            potion: potion_name(text),
            quantity: quantity(text),
        }
    } else if has(text, &["sell"]) {
        Intent::Sell {
            treasure: treasure_name(text).map(String::from),
            quantity: quantity(text),
        }
    } else if has(text, &["what", "wares", "stock"]) {
        Intent::ListWares
    } else if has(text, &["help"]) {
        Intent::Help
    } else {
        Intent::Unknown(text.to_string())
    }
}

fn parse_combat(text: &str) -> Intent {
    if has(text, &["target", "switch"]) {
        Intent::SwitchTarget(target_index(text))
    } else if has(text, &["attack", "fight"]) {
        Intent::Attack
    } else if has(text, &["defend", "block", "guard"]) {
        Intent::Defend
    } else if has(text, &["special", "ability"]) {
        Intent::Special
    } else if has(text, &["cast", "spell"]) {
        Intent::CastSpell(ability_name(text).map(String::from))
    } else if has(text, &["potion", "use", "drink", "heal"]) {
        Intent::UsePotion(potion_name(text))
    } else if has(text, &["flee", "run", "escape"]) {
        Intent::Flee
    } else if has(text, &["help"]) {
        Intent::Help
    } else {
        Intent::Unknown(text.to_string())
    }
}

// ============================================================================
// Names and Quantities
// ============================================================================

/// A quantity of two or three, otherwise one.
pub fn quantity(text: &str) -> u32 {
    if has_word(text, &["two", "2"]) {
        2
    } else if has_word(text, &["three", "3"]) {
        3
    } else {
        1
    }
}

fn target_index(text: &str) -> Option<usize> {
    if has_word(text, &["second", "two", "2"]) {
        Some(1)
    } else if has_word(text, &["first", "one", "1"]) {
        Some(0)
    } else {
        None
    }
}

fn potion_name(text: &str) -> Option<Potion> {
    if text.contains("greater health") {
        Some(Potion::GreaterHealth)
    } else if text.contains("greater mana") {
        Some(Potion::GreaterMana)
    } else if has(text, &["health", "heal"]) {
        Some(Potion::Health)
    } else if text.contains("mana") {
        Some(Potion::Mana)
    } else {
        None
    }
}

fn ring_name(text: &str) -> Option<&'static str> {
    if has(text, &["vitality", "health"]) {
        Some("Ring of Vitality")
    } else if has(text, &["minor mana", "mana ring"]) {
        Some("Ring of Minor Mana")
    } else if text.contains("protection") {
        Some("Ring of Protection")
    } else if text.contains("strength") {
        Some("Ring of Strength")
    } else if text.contains("wisdom") {
        Some("Ring of Wisdom")
    } else if text.contains("titan") {
        Some("Ring of the Titan")
    } else if text.contains("arcane power") {
        Some("Ring of Arcane Power")
    } else if text.contains("berserker") {
        Some("Ring of the Berserker")
    } else {
        None
    }
}

fn amulet_name(text: &str) -> Option<&'static str> {
    if text.contains("vitality") {
        Some("Amulet of Vitality")
    } else if text.contains("amulet of mana") || (text.contains("mana") && !text.contains("archmage")) {
        Some("Amulet of Mana")
    } else if text.contains("experience") {
        Some("Amulet of Experience")
    } else if text.contains("archmage") {
        Some("Amulet of the Archmage")
    } else if text.contains("titan") {
        Some("Amulet of the Titan")
    } else if text.contains("power") {
        Some("Amulet of Power")
    } else {
        None
    }
}

/// Spell and book names share one vocabulary.
fn ability_name(text: &str) -> Option<&'static str> {
    if has(text, &["icy", "blast", "freeze"]) {
        Some("Icy Blast")
    } else if has(text, &["shield", "bash"]) {
        Some("Shield Bash")
    } else if has(text, &["poison", "blade"]) {
        Some("Poison Blade")
    } else if has(text, &["chain", "lightning"]) {
        Some("Chain Lightning")
    } else if has(text, &["arcane", "missile"]) {
        Some("Arcane Missiles")
    } else if text.contains("whirlwind") {
        Some("Whirlwind")
    } else if has(text, &["shadow", "strike"]) {
        Some("Shadow Strike")
    } else {
        None
    }
}

fn treasure_name(text: &str) -> Option<&'static str> {
    if has(text, &["sapphire", "gem"]) && !text.contains("ruby") {
        Some("Sapphire Gem")
    } else if text.contains("ruby") {
        Some("Ruby Gem")
    } else if text.contains("diamond") {
        Some("Diamond")
    } else if text.contains("emerald") {
        Some("Emerald")
    } else if text.contains("coin") {
        Some("Ancient Coin Collection")
    } else if text.contains("chalice") {
        Some("Golden Chalice")
    } else if text.contains("crown") {
        Some("Silver Crown")
    } else if text.contains("amulet") {
        Some("Enchanted Amulet")
    } else {
        None
    }
}
