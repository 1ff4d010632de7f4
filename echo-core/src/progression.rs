//! Character progression and equipment.
//!
//! Experience and levelling, rings, amulets, class gear, ability books,
//! potions, meditation, loot pickup and the status/inventory reports.

use crate::dungeon::Loot;
use crate::items::{self, GearSlot, ItemKind, Potion, StatBonus, MAX_RINGS, MAX_SAME_RING};
use crate::narration::Pause;
use crate::rules::{Effect, Rejection, Resolution};
use crate::spells;
use crate::world::{CharacterClass, GameMode, GameWorld, Player};
use log::debug;
use std::collections::BTreeMap;

/// Health gained per level.
pub const LEVEL_HEALTH_GAIN: i32 = 20;

/// Mana gained per level.
pub const LEVEL_MANA_GAIN: i32 = 10;

/// Mana restored by meditating.
pub const MEDITATION_MANA: i32 = 25;

/// Attack when no weapon is equipped.
pub const UNARMED_ATTACK: i32 = 15;

// ============================================================================
// Class Selection
// ============================================================================

/// Apply a class's stats and starting kit to a fresh player.
///
/// Weapons, armor and shields in the kit go straight into the equipment
/// slots; everything else is carried.
pub fn select_class(player: &mut Player, class: CharacterClass, out: &mut Resolution) {
    let data = class.data();

    player.class = Some(class);
    player.health = data.health;
    player.max_health = data.health;
    player.mana = data.mana;
    player.max_mana = data.mana;
    player.gold = data.gold;
    player.inventory.clear();
    player.equipped_rings.clear();
    player.equipped_amulet = None;
    player.learned_abilities.clear();
    player.weapon = None;
    player.armor = None;
    player.shield = None;

    for name in data.starting_items {
        match items::get_gear(name) {
            Some(gear) => *slot_mut(player, gear.slot) = Some(gear.name.to_string()),
            None => player.add_item(*name),
        }
    }
    recompute_gear_stats(player);
    debug!("Selected {} with attack {} defense {}", class, player.base_attack, player.defense);

    out.record(Effect::ClassChosen { class });
    out.narrate_with(format!("You are now a {}.", class), Pause::Short);
    out.narrate_with(format!("Health: {}.", data.health), Pause::Short);
    out.narrate_with(format!("Mana: {}.", data.mana), Pause::Short);
    out.narrate_with(format!("Starting gold: {}.", data.gold), Pause::Short);
    if let (Some(weapon), Some(armor)) = (&player.weapon, &player.armor) {
        out.narrate_with(format!("Equipped: {} and {}.", weapon, armor), Pause::Short);
    }
    if let Some(shield) = &player.shield {
        out.narrate_with(format!("Shield: {}.", shield), Pause::Short);
    }
}

fn slot_mut(player: &mut Player, slot: GearSlot) -> &mut Option<String> {
    match slot {
        GearSlot::Weapon => &mut player.weapon,
        GearSlot::Armor => &mut player.armor,
        GearSlot::Shield => &mut player.shield,
    }
}

fn gear_power(name: &Option<String>) -> Option<i32> {
    name.as_deref().and_then(items::get_gear).map(|g| g.power)
}

/// Attack comes from the weapon alone, defense from armor plus shield.
fn recompute_gear_stats(player: &mut Player) {
    player.base_attack = gear_power(&player.weapon).unwrap_or(UNARMED_ATTACK);
    player.defense = gear_power(&player.armor).unwrap_or(0) + gear_power(&player.shield).unwrap_or(0);
}

// ============================================================================
// Experience
// ============================================================================

/// Award experience, applying any amulet bonus and every level-up it earns.
pub fn gain_experience(player: &mut Player, amount: u32, out: &mut Resolution) {
    let actual = match player.experience_multiplier() {
        Some(multiplier) => (amount as f64 * multiplier).floor() as u32,
        None => amount,
    };

    player.experience += actual;
    out.record(Effect::ExperienceGained {
        amount: actual,
        total: player.experience,
    });

    while player.experience >= player.experience_to_next {
        level_up(player, out);
    }
}

fn level_up(player: &mut Player, out: &mut Resolution) {
    player.level += 1;
    player.experience -= player.experience_to_next;
    player.experience_to_next = (player.experience_to_next as f64 * 1.5).floor() as u32;

    player.max_health += LEVEL_HEALTH_GAIN;
    player.health = player.max_health;
    player.max_mana += LEVEL_MANA_GAIN;
    player.mana = player.max_mana;
    debug!("Level up to {}, next at {}", player.level, player.experience_to_next);

    out.record(Effect::LevelUp {
        new_level: player.level,
    });
    out.narrate_with(
        format!("Level up! You are now level {}!", player.level),
        Pause::Short,
    );
    out.narrate_with(
        format!("Max health increased by {}!", LEVEL_HEALTH_GAIN),
        Pause::Short,
    );
    out.narrate_with(
        format!("Max mana increased by {}!", LEVEL_MANA_GAIN),
        Pause::Short,
    );
    out.narrate("Fully healed and restored!");
}

// ============================================================================
// Rings and Amulets
// ============================================================================

fn carried_of<'a>(player: &'a Player, known: impl Fn(&str) -> bool) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in &player.inventory {
        if known(item.as_str()) && !seen.contains(&item.as_str()) {
            seen.push(item.as_str());
        }
    }
    seen
}

/// Raise or lower max health/mana, keeping current values in range.
fn apply_bonus(player: &mut Player, bonus: StatBonus, sign: i32, out: &mut Resolution) {
    match bonus {
        StatBonus::MaxHealth(value) => {
            player.max_health += sign * value;
            if sign > 0 {
                player.health += value;
            } else {
                player.health = player.health.min(player.max_health);
            }
            out.record(Effect::MaxHealthChanged {
                amount: sign * value,
                max_health: player.max_health,
            });
        }
        StatBonus::MaxMana(value) => {
            player.max_mana += sign * value;
            if sign > 0 {
                player.mana += value;
            } else {
                player.mana = player.mana.min(player.max_mana);
            }
            out.record(Effect::MaxManaChanged {
                amount: sign * value,
                max_mana: player.max_mana,
            });
        }
        StatBonus::Attack(_) | StatBonus::ExperienceGain(_) => {}
    }
}

/// Put on a carried ring.
///
/// At most [`MAX_RINGS`] rings in total and [`MAX_SAME_RING`] of any one.
pub fn equip_ring(
    player: &mut Player,
    name: Option<&str>,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let Some(name) = name else {
        let carried = carried_of(player, |item| items::get_ring(item).is_some());
        return Err(if carried.is_empty() {
            Rejection::NoRings
        } else {
            Rejection::ChooseRing(carried.join(", "))
        });
    };

    let ring = items::get_ring(name);
    let display = ring.map(|r| r.name).unwrap_or(name);
    if !player.has_item(display) {
        return Err(Rejection::NotCarried(display.to_string()));
    }
    if player.equipped_rings.len() >= MAX_RINGS {
        return Err(Rejection::TooManyRings);
    }
    let ring = ring.ok_or_else(|| Rejection::NotCarried(display.to_string()))?;
    if player.rings_named(ring.name) >= MAX_SAME_RING {
        return Err(Rejection::TooManyOfRing);
    }

    player.take_item(ring.name);
    player.equipped_rings.push(ring.name.to_string());
    apply_bonus(player, ring.bonus, 1, out);
    out.record(Effect::RingEquipped {
        name: ring.name.to_string(),
    });

    out.narrate(match ring.bonus {
        StatBonus::MaxHealth(v) => format!(
            "You equip the {}. Your max health increased by {}!",
            ring.name, v
        ),
        StatBonus::MaxMana(v) => format!(
            "You equip the {}. Your max mana increased by {}!",
            ring.name, v
        ),
        _ => format!("You equip the {}. Your attacks are now stronger!", ring.name),
    });
    Ok(())
}

/// Take off a worn ring and return it to the pack.
pub fn remove_ring(
    player: &mut Player,
    name: Option<&str>,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let Some(name) = name else {
        return Err(if player.equipped_rings.is_empty() {
            Rejection::NoRingsWorn
        } else {
            Rejection::ChooseRingToRemove(player.equipped_rings.join(", "))
        });
    };

    let ring = items::get_ring(name)
        .filter(|r| player.rings_named(r.name) > 0)
        .ok_or_else(|| Rejection::RingNotWorn(name.to_string()))?;

    if let Some(index) = player.equipped_rings.iter().position(|r| r == ring.name) {
        player.equipped_rings.remove(index);
    }
    player.add_item(ring.name);
    apply_bonus(player, ring.bonus, -1, out);
    out.record(Effect::RingRemoved {
        name: ring.name.to_string(),
    });

    out.narrate(match ring.bonus {
        StatBonus::MaxHealth(v) => format!(
            "You remove the {}. Your max health decreased by {}!",
            ring.name, v
        ),
        StatBonus::MaxMana(v) => format!(
            "You remove the {}. Your max mana decreased by {}!",
            ring.name, v
        ),
        _ => format!("You remove the {}. Your attacks are weaker!", ring.name),
    });
    Ok(())
}

/// Wear a carried amulet, swapping out any amulet already worn.
pub fn equip_amulet(
    player: &mut Player,
    name: Option<&str>,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let Some(name) = name else {
        let carried = carried_of(player, |item| items::get_amulet(item).is_some());
        return Err(if carried.is_empty() {
            Rejection::NoAmulets
        } else {
            Rejection::ChooseAmulet(carried.join(", "))
        });
    };

    let amulet = items::get_amulet(name);
    let display = amulet.map(|a| a.name).unwrap_or(name);
    if !player.has_item(display) {
        return Err(Rejection::NotCarried(display.to_string()));
    }
    if player.equipped_amulet.as_deref() == Some(display) {
        return Err(Rejection::AmuletAlreadyWorn(display.to_string()));
    }
    let amulet = amulet.ok_or_else(|| Rejection::NotCarried(display.to_string()))?;

    let replaced = player.equipped_amulet.take();
    if let Some(old) = replaced.as_deref().and_then(items::get_amulet) {
        apply_bonus(player, old.bonus, -1, out);
        player.add_item(old.name);
    }

    player.take_item(amulet.name);
    player.equipped_amulet = Some(amulet.name.to_string());
    apply_bonus(player, amulet.bonus, 1, out);
    out.record(Effect::AmuletEquipped {
        name: amulet.name.to_string(),
        replaced,
    });

    out.narrate(match amulet.bonus {
        StatBonus::MaxHealth(v) => format!(
            "You equip the {}. Your max health increased by {}!",
            amulet.name, v
        ),
        StatBonus::MaxMana(v) => format!(
            "You equip the {}. Your max mana increased by {}!",
            amulet.name, v
        ),
        StatBonus::ExperienceGain(multiplier) => format!(
            "You equip the {}. You now gain {}% more experience!",
            amulet.name,
            ((multiplier - 1.0) * 100.0).round()
        ),
        StatBonus::Attack(v) => format!(
            "You equip the {}. Your attack power increases by {}!",
            amulet.name, v
        ),
    });
    Ok(())
}

// ============================================================================
// Gear and Books
// ============================================================================

/// Equip the first carried weapon, armor piece or shield named in `text`.
pub fn equip_gear(player: &mut Player, text: &str, out: &mut Resolution) -> Result<(), Rejection> {
    let text = text.to_lowercase();
    let gear = player
        .inventory
        .iter()
        .filter(|item| text.contains(&item.to_lowercase()))
        .find_map(|item| items::get_gear(item))
        .ok_or(Rejection::NoEquipment)?;

    if player.class != Some(gear.class) {
        return Err(Rejection::WrongClass {
            item: gear.name.to_string(),
            class: gear.class,
        });
    }

    player.take_item(gear.name);
    let replaced = slot_mut(player, gear.slot).replace(gear.name.to_string());
    if let Some(old) = &replaced {
        player.add_item(old.clone());
    }
    recompute_gear_stats(player);
    out.record(Effect::GearEquipped {
        name: gear.name.to_string(),
        slot: gear.slot,
        replaced: replaced.clone(),
    });

    let stat = match gear.slot {
        GearSlot::Weapon => format!("Attack: {}.", player.base_attack),
        GearSlot::Armor | GearSlot::Shield => format!("Defense: {}.", player.defense),
    };
    match replaced {
        Some(old) => out.narrate(format!(
            "You equip the {} and stow the {}. {}",
            gear.name, old, stat
        )),
        None => out.narrate(format!("You equip the {}. {}", gear.name, stat)),
    }
    Ok(())
}

/// Learn an ability from a carried book usable by the player's class.
pub fn read_book(
    player: &mut Player,
    name: Option<&str>,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let class = player.class;
    let readable: Vec<&'static spells::Ability> = spells::all_abilities()
        .iter()
        .filter(|a| Some(a.class) == class && player.has_item(a.name))
        .collect();

    let chosen = name.and_then(|name| {
        let name = name.to_lowercase();
        readable
            .iter()
            .copied()
            .find(|a| a.name.to_lowercase() == name)
    });

    let Some(ability) = chosen else {
        return Err(if readable.is_empty() {
            Rejection::NoBooks
        } else {
            let names: Vec<&str> = readable.iter().map(|a| a.name).collect();
            Rejection::ChooseBook(names.join(", "))
        });
    };

    if player.learned_abilities.contains(ability.name) {
        return Err(Rejection::AlreadyLearned(ability.name.to_string()));
    }

    player.take_item(ability.name);
    player.learned_abilities.insert(ability.name.to_string());
    out.record(Effect::AbilityLearned {
        name: ability.name.to_string(),
    });
    out.narrate(format!(
        "You read the ancient tome and learn {}! {}. Say \"cast {}\" in combat to use it.",
        ability.name, ability.description, ability.name
    ));
    Ok(())
}

// ============================================================================
// Recovery
// ============================================================================

/// Pick the most useful carried potion when the player did not name one.
fn choose_potion(player: &Player) -> Option<Potion> {
    let carried = |p: &Potion| player.has_item(p.name());
    let hurt = player.health < player.max_health;
    let drained = player.mana < player.max_mana;

    [Potion::Health, Potion::GreaterHealth]
        .into_iter()
        .filter(|_| hurt)
        .chain([Potion::Mana, Potion::GreaterMana].into_iter().filter(|_| drained))
        .chain(Potion::all())
        .find(carried)
}

/// Drink a potion, restoring health or mana up to the maximum.
pub fn drink_potion(
    player: &mut Player,
    potion: Option<Potion>,
    out: &mut Resolution,
) -> Result<Potion, Rejection> {
    let potion = match potion {
        Some(potion) => potion,
        None => choose_potion(player).ok_or(Rejection::NoPotions)?,
    };
    if !player.take_item(potion.name()) {
        return Err(Rejection::NotCarried(potion.name().to_string()));
    }
    out.record(Effect::ItemRemoved {
        name: potion.name().to_string(),
    });

    let label = potion.name().to_lowercase();
    if potion.restores_health() {
        let restored = player.restore_health(potion.restores());
        out.record(Effect::HealthRestored {
            amount: restored,
            health: player.health,
        });
        out.narrate(format!(
            "You drink a {} and restore {} health. Health: {}.",
            label, restored, player.health
        ));
    } else {
        let restored = player.restore_mana(potion.restores());
        out.record(Effect::ManaRestored {
            amount: restored,
            mana: player.mana,
        });
        out.narrate(format!(
            "You drink a {} and restore {} mana. Mana: {}.",
            label, restored, player.mana
        ));
    }
    Ok(potion)
}

/// Recover mana outside of combat.
pub fn meditate(world: &mut GameWorld, out: &mut Resolution) -> Result<(), Rejection> {
    if world.mode == GameMode::Combat {
        return Err(Rejection::CannotMeditateInCombat);
    }
    let player = &mut world.player;
    if player.mana >= player.max_mana {
        return Err(Rejection::FullMana);
    }

    let restored = player.restore_mana(MEDITATION_MANA);
    out.record(Effect::ManaRestored {
        amount: restored,
        mana: player.mana,
    });
    out.narrate(format!(
        "You meditate and restore {} mana. Current mana: {}.",
        restored, player.mana
    ));
    Ok(())
}

// ============================================================================
// Loot
// ============================================================================

/// Hand a rolled loot drop to the player.
pub fn apply_loot(player: &mut Player, loot: Loot, out: &mut Resolution) {
    let line = match &loot {
        Loot::Gold(amount) => {
            player.gold += amount;
            out.record(Effect::GoldChanged {
                amount: *amount as i64,
                total: player.gold,
            });
            format!("You found {} gold! Total gold: {}.", amount, player.gold)
        }
        Loot::Potion(potion) => {
            player.add_item(potion.name());
            format!("You found a {}!", potion)
        }
        Loot::Ring(name) => {
            player.add_item(name.clone());
            format!("You found a {}! Say wear ring to equip it.", name)
        }
        Loot::Amulet(name) => {
            player.add_item(name.clone());
            format!("You found an {}! Say equip amulet to wear it.", name)
        }
        Loot::Book(name) => {
            player.add_item(name.clone());
            format!("You found an ability book: {}! Say read book to study it.", name)
        }
        Loot::Treasure(name) => {
            player.add_item(name.clone());
            format!("You found a {}!", name)
        }
    };

    if !matches!(loot, Loot::Gold(_)) {
        out.record(Effect::ItemAdded {
            name: loot.to_string(),
        });
    }
    out.record(Effect::LootFound { loot });
    out.narrate(line);
}

// ============================================================================
// Reports
// ============================================================================

/// Narrate the character sheet.
pub fn status(world: &GameWorld, out: &mut Resolution) -> Result<(), Rejection> {
    let player = &world.player;
    let class = player.class.ok_or(Rejection::NoClass)?;
    let special = class.data().special;
    let needed = player.experience_to_next.saturating_sub(player.experience);

    let mut lines = vec![
        format!("Level {} {}.", player.level, class),
        format!("Health: {} of {}.", player.health, player.max_health),
        format!("Mana: {} of {}.", player.mana, player.max_mana),
        format!(
            "Attack: {}. Defense: {}.",
            player.attack_power(),
            player.defense
        ),
        format!(
            "Experience: {}. Need {} for next level.",
            player.experience, needed
        ),
        format!(
            "Special ability: {}. Costs {} mana. Deals {} damage.",
            special.name, special.cost, special.damage
        ),
        format!("Gold: {}.", player.gold),
    ];

    let gear: Vec<&str> = [&player.weapon, &player.armor, &player.shield]
        .into_iter()
        .filter_map(|slot| slot.as_deref())
        .collect();
    if !gear.is_empty() {
        lines.push(format!("Wielding: {}.", gear.join(", ")));
    }

    if !player.learned_abilities.is_empty() {
        let learned: Vec<&str> = player.learned_abilities.iter().map(String::as_str).collect();
        lines.push(format!("Learned abilities: {}.", learned.join(", ")));
    }

    if player.equipped_rings.is_empty() {
        lines.push("No rings equipped.".to_string());
    } else {
        lines.push(format!(
            "Equipped rings: {}.",
            player.equipped_rings.join(", ")
        ));
    }

    match &player.equipped_amulet {
        Some(amulet) => lines.push(format!("Equipped amulet: {}.", amulet)),
        None => lines.push("No amulet equipped.".to_string()),
    }

    lines.push(format!(
        "Dungeon level {}.",
        world.dungeon.current_level
    ));

    for line in lines {
        out.narrate_with(line, Pause::Short);
    }
    Ok(())
}

fn counted(names: &BTreeMap<&str, usize>) -> String {
    names
        .iter()
        .map(|(name, count)| {
            if *count > 1 {
                format!("{} x{}", name, count)
            } else {
                name.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Narrate what the player is carrying, grouped by kind.
pub fn inventory(player: &Player, out: &mut Resolution) {
    if player.inventory.is_empty() && player.equipped_rings.is_empty() {
        out.narrate(format!("Empty inventory. Gold: {}.", player.gold));
        return;
    }

    let mut potions: BTreeMap<Potion, usize> = BTreeMap::new();
    let mut books: Vec<&str> = Vec::new();
    let mut rings: BTreeMap<&str, usize> = BTreeMap::new();
    let mut amulets: BTreeMap<&str, usize> = BTreeMap::new();
    let mut other: Vec<&str> = Vec::new();

    for item in &player.inventory {
        match items::find_item(item) {
            Some(ItemKind::Potion(potion)) => *potions.entry(potion).or_default() += 1,
            Some(ItemKind::Book(book)) => books.push(book.name),
            Some(ItemKind::Ring(ring)) => *rings.entry(ring.name).or_default() += 1,
            Some(ItemKind::Amulet(amulet)) => *amulets.entry(amulet.name).or_default() += 1,
            Some(ItemKind::Gear(_)) | Some(ItemKind::Treasure(_)) | None => other.push(item),
        }
    }

    let mut lines = vec!["Inventory:".to_string()];
    for (potion, count) in &potions {
        let label = potion.name().to_lowercase();
        let plural = if *count > 1 { "s" } else { "" };
        lines.push(format!("{} {}{}.", count, label, plural));
    }
    if !books.is_empty() {
        lines.push(format!("Unread books: {}.", books.join(", ")));
    }
    if !rings.is_empty() {
        lines.push(format!("Unequipped rings: {}.", counted(&rings)));
    }
    if !player.equipped_rings.is_empty() {
        lines.push(format!(
            "Equipped rings: {}.",
            player.equipped_rings.join(", ")
        ));
    }
    if !amulets.is_empty() {
        lines.push(format!("Unequipped amulets: {}.", counted(&amulets)));
    }
    if let Some(amulet) = &player.equipped_amulet {
        lines.push(format!("Equipped amulet: {}.", amulet));
    }
    if !other.is_empty() {
        lines.push(format!("Equipment: {}.", other.join(", ")));
    }
    lines.push(format!("Gold: {}.", player.gold));

    for line in lines {
        out.narrate_with(line, Pause::Short);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> Player {
        let mut player = Player::new();
        let mut out = Resolution::empty();
        select_class(&mut player, CharacterClass::Warrior, &mut out);
        player
    }

    #[test]
    fn test_select_class_equips_kit() {
        let player = warrior();
        assert_eq!(player.weapon.as_deref(), Some("Steel Sword"));
        assert_eq!(player.armor.as_deref(), Some("Chainmail"));
        assert_eq!(player.shield.as_deref(), Some("Iron Shield"));
        assert_eq!(player.base_attack, 8);
        assert_eq!(player.defense, 13);
        assert_eq!(player.inventory, vec!["Health Potion", "Health Potion"]);
        assert_eq!((player.health, player.max_health), (120, 120));
    }

    #[test]
    fn test_rogue_keeps_lockpicks() {
        let mut player = Player::new();
        let mut out = Resolution::empty();
        select_class(&mut player, CharacterClass::Rogue, &mut out);
        assert!(player.has_item("Lockpicks"));
        assert!(player.shield.is_none());
        assert_eq!(player.defense, 6);
    }

    #[test]
    fn test_level_up_carries_over() {
        let mut player = Player::new();
        let mut out = Resolution::empty();
        gain_experience(&mut player, 120, &mut out);

        assert_eq!(player.level, 2);
        assert_eq!(player.experience, 20);
        assert_eq!(player.experience_to_next, 150);
        assert_eq!((player.health, player.max_health), (120, 120));
        assert_eq!((player.mana, player.max_mana), (60, 60));
        assert!(out.effects.contains(&Effect::LevelUp { new_level: 2 }));
    }

    #[test]
    fn test_multiple_level_ups() {
        let mut player = Player::new();
        let mut out = Resolution::empty();
        gain_experience(&mut player, 260, &mut out);
        // 260 - 100 = 160, 160 - 150 = 10
        assert_eq!(player.level, 3);
        assert_eq!(player.experience, 10);
        assert_eq!(player.experience_to_next, 225);
    }

    #[test]
    fn test_experience_amulet() {
        let mut player = Player::new();
        player.equipped_amulet = Some("Amulet of Experience".to_string());
        let mut out = Resolution::empty();
        gain_experience(&mut player, 45, &mut out);
        assert_eq!(player.experience, 54);
    }

    #[test]
    fn test_ring_limit_is_a_no_op() {
        let mut player = Player::new();
        player.equipped_rings = vec!["Ring of Wisdom".to_string(); 10];
        player.add_item("Ring of Vitality");
        let before = player.inventory.clone();

        let mut out = Resolution::empty();
        let err = equip_ring(&mut player, Some("Ring of Vitality"), &mut out).unwrap_err();
        assert_eq!(err, Rejection::TooManyRings);
        assert_eq!(player.inventory, before);
        assert_eq!(player.max_health, 100);
    }

    #[test]
    fn test_same_ring_limit() {
        let mut player = Player::new();
        for _ in 0..3 {
            player.add_item("Ring of Vitality");
        }
        let mut out = Resolution::empty();
        equip_ring(&mut player, Some("ring of vitality"), &mut out).unwrap();
        equip_ring(&mut player, Some("Ring of Vitality"), &mut out).unwrap();
        assert_eq!((player.health, player.max_health), (120, 120));

        let err = equip_ring(&mut player, Some("Ring of Vitality"), &mut out).unwrap_err();
        assert_eq!(err, Rejection::TooManyOfRing);
        assert_eq!(player.item_count("Ring of Vitality"), 1);
    }

    #[test]
    fn test_remove_ring_clamps() {
        let mut player = Player::new();
        player.add_item("Ring of the Titan");
        let mut out = Resolution::empty();
        equip_ring(&mut player, Some("Ring of the Titan"), &mut out).unwrap();
        assert_eq!(player.health, 120);

        remove_ring(&mut player, Some("Ring of the Titan"), &mut out).unwrap();
        assert_eq!((player.health, player.max_health), (100, 100));
        assert!(player.has_item("Ring of the Titan"));

        let err = remove_ring(&mut player, Some("Ring of the Titan"), &mut out).unwrap_err();
        assert_eq!(err, Rejection::RingNotWorn("Ring of the Titan".to_string()));
    }

    #[test]
    fn test_amulet_swap_reverses_bonus() {
        let mut player = Player::new();
        player.add_item("Amulet of Vitality");
        player.add_item("Amulet of Mana");
        let mut out = Resolution::empty();

        equip_amulet(&mut player, Some("Amulet of Vitality"), &mut out).unwrap();
        assert_eq!(player.max_health, 115);

        equip_amulet(&mut player, Some("Amulet of Mana"), &mut out).unwrap();
        assert_eq!(player.max_health, 100);
        assert_eq!(player.health, 100);
        assert_eq!(player.max_mana, 65);
        assert_eq!(player.equipped_amulet.as_deref(), Some("Amulet of Mana"));
        assert!(player.has_item("Amulet of Vitality"));
    }

    #[test]
    fn test_equip_gear_swaps_and_restricts_class() {
        let mut player = warrior();
        player.add_item("Legendary Greatsword");
        player.add_item("Archmage Staff");
        let mut out = Resolution::empty();

        equip_gear(&mut player, "equip legendary greatsword", &mut out).unwrap();
        assert_eq!(player.base_attack, 15);
        assert!(player.has_item("Steel Sword"));

        let err = equip_gear(&mut player, "equip archmage staff", &mut out).unwrap_err();
        assert!(matches!(err, Rejection::WrongClass { .. }));
        assert_eq!(player.base_attack, 15);
    }

    #[test]
    fn test_read_book() {
        let mut player = Player::new();
        player.class = Some(CharacterClass::Mage);
        player.add_item("Icy Blast");
        let mut out = Resolution::empty();

        assert_eq!(
            read_book(&mut player, None, &mut out).unwrap_err(),
            Rejection::ChooseBook("Icy Blast".to_string())
        );
        read_book(&mut player, Some("Icy Blast"), &mut out).unwrap();
        assert!(player.learned_abilities.contains("Icy Blast"));
        assert!(!player.has_item("Icy Blast"));

        player.add_item("Icy Blast");
        assert_eq!(
            read_book(&mut player, Some("Icy Blast"), &mut out).unwrap_err(),
            Rejection::AlreadyLearned("Icy Blast".to_string())
        );
    }

    #[test]
    fn test_drink_potion_auto_choice() {
        let mut player = Player::new();
        player.add_item("Health Potion");
        player.add_item("Mana Potion");
        player.mana = 10;
        let mut out = Resolution::empty();

        assert_eq!(drink_potion(&mut player, None, &mut out).unwrap(), Potion::Mana);
        assert_eq!(player.mana, 40);
        assert_eq!(drink_potion(&mut player, None, &mut out).unwrap(), Potion::Health);
        assert_eq!(
            drink_potion(&mut player, None, &mut out).unwrap_err(),
            Rejection::NoPotions
        );
    }

    #[test]
    fn test_meditate() {
        let mut world = GameWorld::new();
        let mut out = Resolution::empty();
        assert_eq!(meditate(&mut world, &mut out).unwrap_err(), Rejection::FullMana);

        world.player.mana = 40;
        meditate(&mut world, &mut out).unwrap();
        assert_eq!(world.player.mana, 50);
    }

    #[test]
    fn test_inventory_groups_items() {
        let mut player = warrior();
        player.add_item("Ruby Gem");
        player.add_item("Ring of Strength");
        player.add_item("Ring of Strength");
        let mut out = Resolution::empty();
        inventory(&player, &mut out);

        let text = out.text();
        assert!(text.contains("2 health potions."));
        assert!(text.contains("Unequipped rings: Ring of Strength x2."));
        assert!(text.contains("Equipment: Ruby Gem."));
        assert!(text.ends_with("Gold: 50."));
    }
}
