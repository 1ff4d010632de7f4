//! Turn-based combat.
//!
//! A [`CombatSession`] exists exactly while the world is in
//! [`GameMode::Combat`]. Each player action is resolved to completion,
//! including the enemy phase it triggers:
//!
//! ```text
//! PlayerTurn -> action -> EnemyPhase -> PlayerTurn | Victory | Defeat
//!                      \-> Victory (last enemy fell)
//!                      \-> Fled
//! ```

use crate::items::Potion;
use crate::narration::Pause;
use crate::progression;
use crate::rng::GameRng;
use crate::rules::{Effect, Rejection, Resolution};
use crate::spells::{self, AbilityKind};
use crate::world::{Enemy, EnemyId, GameMode, GameWorld, Position};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Extra defense granted by defending, for one enemy phase.
pub const GUARD_BONUS: i32 = 5;

/// Flee chance when the lead enemy has none of its own.
pub const DEFAULT_FLEE_CHANCE: f64 = 0.3;

const TURN_PROMPT: &str = "Your turn! Say attack, defend, special, cast spell, use potion, or flee.";

// ============================================================================
// Status Effects
// ============================================================================

/// Ways an enemy can lose its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Incapacitation {
    Freeze,
    Stun,
}

impl Incapacitation {
    pub fn past_tense(&self) -> &'static str {
        match self {
            Incapacitation::Freeze => "frozen",
            Incapacitation::Stun => "stunned",
        }
    }
}

/// A timed condition on one enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEffect {
    Incapacitate {
        kind: Incapacitation,
        remaining_turns: u32,
    },
    DamageOverTime {
        remaining_turns: u32,
        amount_per_turn: i32,
    },
}

impl StatusEffect {
    pub fn remaining_turns(&self) -> u32 {
        match self {
            StatusEffect::Incapacitate {
                remaining_turns, ..
            }
            | StatusEffect::DamageOverTime {
                remaining_turns, ..
            } => *remaining_turns,
        }
    }

    fn tick(&mut self) {
        match self {
            StatusEffect::Incapacitate {
                remaining_turns, ..
            }
            | StatusEffect::DamageOverTime {
                remaining_turns, ..
            } => *remaining_turns = remaining_turns.saturating_sub(1),
        }
    }
}

/// A status effect bound to the enemy it affects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub enemy: EnemyId,
    pub status: StatusEffect,
}

fn incapacitation(effects: &[ActiveEffect], enemy: EnemyId) -> Option<Incapacitation> {
    effects.iter().find_map(|e| match e.status {
        StatusEffect::Incapacitate {
            kind,
            remaining_turns,
        } if e.enemy == enemy && remaining_turns > 0 => Some(kind),
        _ => None,
    })
}

// ============================================================================
// Session
// ============================================================================

/// The mutable record of one encounter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSession {
    /// Enemies still standing, at most two.
    pub enemies: Vec<Enemy>,
    /// The room's enemies when the encounter began, including any already
    /// slain. Rewards are paid on this. Fallen entries keep their final health.
    pub roster: Vec<Enemy>,
    pub target_index: usize,
    pub effects: Vec<ActiveEffect>,
    /// Cycles 0, 1, 2.
    pub turn_index: u8,
    pub room: Position,
}

impl CombatSession {
    pub fn new(roster: Vec<Enemy>, room: Position) -> Self {
        let enemies = roster.iter().filter(|e| e.is_alive()).cloned().collect();
        Self {
            enemies,
            roster,
            target_index: 0,
            effects: Vec::new(),
            turn_index: 0,
            room,
        }
    }

    pub fn target(&self) -> Option<&Enemy> {
        self.enemies.get(self.target_index)
    }

    pub fn incapacitation(&self, enemy: EnemyId) -> Option<Incapacitation> {
        incapacitation(&self.effects, enemy)
    }

    /// Remove every enemy at or below zero health.
    ///
    /// Returns true when no enemies remain.
    fn remove_defeated(&mut self, out: &mut Resolution) -> bool {
        let target_id = self.target().map(|e| e.id);
        let (fallen, standing): (Vec<Enemy>, Vec<Enemy>) =
            self.enemies.drain(..).partition(|e| !e.is_alive());

        for enemy in &fallen {
            if let Some(entry) = self.roster.iter_mut().find(|e| e.id == enemy.id) {
                entry.health = enemy.health;
            }
            out.narrate(format!("The {} is defeated!", enemy.name));
            out.record(Effect::EnemyDefeated {
                name: enemy.name.clone(),
            });
        }
        self.enemies = standing;

        let enemies = &self.enemies;
        self.effects
            .retain(|effect| enemies.iter().any(|e| e.id == effect.enemy));

        self.target_index = target_id
            .and_then(|id| self.enemies.iter().position(|e| e.id == id))
            .unwrap_or(0);

        self.enemies.is_empty()
    }
}

/// Something the player does on their turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    Attack,
    Defend,
    Special,
    CastSpell(Option<String>),
    UsePotion(Option<Potion>),
    Flee,
    SwitchTarget(Option<usize>),
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory { gold: u32, experience: u32 },
    Defeat,
    Fled,
}

/// What follows a successful player action.
enum AfterAction {
    EnemyPhase { guard_bonus: i32, retaliate: bool },
    Victory,
    Fled,
    /// Free action, the player keeps the turn.
    Free,
}

/// Begin an encounter with the live enemies in the current room.
///
/// Returns false when there is nothing to fight.
pub fn start_combat(world: &mut GameWorld, out: &mut Resolution) -> bool {
    let position = world.player.position;
    let Some(room) = world.current_room() else {
        return false;
    };
    if !room.has_live_enemy() {
        return false;
    }

    let session = CombatSession::new(room.enemies().cloned().collect(), position);
    let names: Vec<String> = session.enemies.iter().map(|e| e.name.clone()).collect();
    info!("Combat started at {} against {}", position, names.join(", "));

    out.narrate(format!(
        "Combat begins! You face a {}! Say attack, defend, special, cast spell, use potion, or flee.",
        names.join(" and ")
    ));
    out.record(Effect::CombatStarted { enemies: names });
    out.record(Effect::ModeChanged {
        mode: GameMode::Combat,
    });

    world.combat = Some(session);
    world.mode = GameMode::Combat;
    true
}

/// Resolve one player action and the enemy phase it triggers.
///
/// A rejected action leaves the world untouched and consumes no turn.
pub fn resolve_action(
    world: &mut GameWorld,
    rng: &mut GameRng,
    action: PlayerAction,
    out: &mut Resolution,
) -> Result<(), Rejection> {
    let mut session = world.combat.take().ok_or(Rejection::NotInCombat)?;

    let after = match player_turn(world, &mut session, rng, action, out) {
        Ok(after) => after,
        Err(rejection) => {
            world.combat = Some(session);
            return Err(rejection);
        }
    };

    let outcome = match after {
        AfterAction::Free => None,
        AfterAction::Victory => Some(PhaseEnd::Victory),
        AfterAction::Fled => Some(PhaseEnd::Fled),
        AfterAction::EnemyPhase {
            guard_bonus,
            retaliate,
        } => enemy_phase(world, &mut session, guard_bonus, retaliate, out),
    };

    match outcome {
        None => world.combat = Some(session),
        Some(PhaseEnd::Victory) => victory(world, session, out),
        Some(PhaseEnd::Defeat) => defeat(world, Some(session), out),
        Some(PhaseEnd::Fled) => fled(world, session, out),
    }
    Ok(())
}

fn player_turn(
    world: &mut GameWorld,
    session: &mut CombatSession,
    rng: &mut GameRng,
    action: PlayerAction,
    out: &mut Resolution,
) -> Result<AfterAction, Rejection> {
    let player = &mut world.player;

    match action {
        PlayerAction::Attack => {
            let attack = player.attack_power();
            let target = session
                .enemies
                .get_mut(session.target_index)
                .ok_or(Rejection::NoSuchTarget)?;
            let damage = (attack - target.defense).max(0);
            target.health -= damage;
            out.narrate(format!(
                "You hit the {} for {} damage! {} health: {}.",
                target.name,
                damage,
                target.name,
                target.displayed_health()
            ));
            record_hit(target, damage, out);
            Ok(after_strike(session, out, true))
        }
        PlayerAction::Defend => {
            out.narrate("You raise your guard, increasing your defense!");
            Ok(AfterAction::EnemyPhase {
                guard_bonus: GUARD_BONUS,
                retaliate: true,
            })
        }
        PlayerAction::Special => {
            let class = player.class.ok_or(Rejection::NoClass)?;
            let special = class.data().special;
            if player.mana < special.cost {
                return Err(Rejection::NotEnoughMana {
                    ability: special.name.to_string(),
                    cost: special.cost,
                });
            }
            let target = session
                .enemies
                .get_mut(session.target_index)
                .ok_or(Rejection::NoSuchTarget)?;

            player.mana -= special.cost;
            out.record(Effect::ManaSpent {
                amount: special.cost,
                remaining: player.mana,
            });
            target.health -= special.damage;
            out.narrate(format!(
                "You use {} on the {} for {} damage! {} health: {}. Mana: {}.",
                special.name,
                target.name,
                special.damage,
                target.name,
                target.displayed_health(),
                player.mana
            ));
            record_hit(target, special.damage, out);
            Ok(after_strike(session, out, true))
        }
        PlayerAction::CastSpell(name) => {
            let ability = name
                .as_deref()
                .and_then(spells::get_ability)
                .filter(|a| player.learned_abilities.contains(a.name))
                .ok_or(Rejection::UnknownSpell)?;
            if player.mana < ability.cost {
                return Err(Rejection::NotEnoughMana {
                    ability: ability.name.to_string(),
                    cost: ability.cost,
                });
            }
            if session.target().is_none() {
                return Err(Rejection::NoSuchTarget);
            }

            player.mana -= ability.cost;
            out.record(Effect::ManaSpent {
                amount: ability.cost,
                remaining: player.mana,
            });
            let mana = player.mana;

            if ability.kind == AbilityKind::Aoe {
                out.narrate_with(format!("You cast {}!", ability.name), Pause::Short);
                for enemy in session.enemies.iter_mut() {
                    enemy.health -= ability.damage;
                    out.narrate(format!(
                        "{} hits {} for {} damage! {} health: {}.",
                        ability.name,
                        enemy.name,
                        ability.damage,
                        enemy.name,
                        enemy.displayed_health()
                    ));
                    record_hit(enemy, ability.damage, out);
                }
                return Ok(after_strike(session, out, true));
            }

            let target_index = session.target_index;
            let Some(target) = session.enemies.get_mut(target_index) else {
                return Err(Rejection::NoSuchTarget);
            };
            target.health -= ability.damage;
            let name = target.name.clone();
            let id = target.id;
            let health = target.displayed_health();
            record_hit(target, ability.damage, out);

            let alive = health > 0;
            let mut retaliate = true;
            let line = match ability.kind {
                AbilityKind::Freeze | AbilityKind::Stun => {
                    let kind = if ability.kind == AbilityKind::Freeze {
                        Incapacitation::Freeze
                    } else {
                        Incapacitation::Stun
                    };
                    if alive && session.incapacitation(id).is_none() {
                        let status = StatusEffect::Incapacitate {
                            kind,
                            remaining_turns: 1,
                        };
                        session.effects.push(ActiveEffect { enemy: id, status });
                        out.record(Effect::StatusApplied {
                            name: name.clone(),
                            status,
                        });
                    }
                    format!(
                        "You cast {} for {} damage! The {} is {} for 1 turn. Mana: {}.",
                        ability.name,
                        ability.damage,
                        name,
                        kind.past_tense(),
                        mana
                    )
                }
                AbilityKind::Poison { duration, per_turn } => {
                    if alive {
                        // A fresh dose replaces the old one.
                        session.effects.retain(|e| {
                            !(e.enemy == id
                                && matches!(e.status, StatusEffect::DamageOverTime { .. }))
                        });
                        let status = StatusEffect::DamageOverTime {
                            remaining_turns: duration,
                            amount_per_turn: per_turn,
                        };
                        session.effects.push(ActiveEffect { enemy: id, status });
                        out.record(Effect::StatusApplied {
                            name: name.clone(),
                            status,
                        });
                    }
                    format!(
                        "You cast {} for {} damage! The {} is poisoned for {} turns. Mana: {}.",
                        ability.name, ability.damage, name, duration, mana
                    )
                }
                AbilityKind::Sneak => {
                    retaliate = false;
                    format!(
                        "You use {} for {} damage! {} health: {}. The enemy cannot retaliate this turn. Mana: {}.",
                        ability.name, ability.damage, name, health, mana
                    )
                }
                AbilityKind::Damage | AbilityKind::Aoe => format!(
                    "You cast {} for {} damage! {} health: {}. Mana: {}.",
                    ability.name, ability.damage, name, health, mana
                ),
            };
            out.narrate(line);
            Ok(after_strike(session, out, retaliate))
        }
        PlayerAction::UsePotion(potion) => {
            progression::drink_potion(player, potion, out)?;
            Ok(AfterAction::EnemyPhase {
                guard_bonus: 0,
                retaliate: true,
            })
        }
        PlayerAction::Flee => {
            let chance = session
                .enemies
                .first()
                .and_then(|e| e.flee_chance)
                .map(|c| c * 0.5)
                .unwrap_or(DEFAULT_FLEE_CHANCE);
            let success = rng.chance(chance);
            out.record(Effect::FleeAttempted { chance, success });
            debug!("Flee attempt at {:.2}: {}", chance, success);

            if success {
                out.narrate("You successfully flee from combat!");
                Ok(AfterAction::Fled)
            } else {
                out.narrate("You fail to flee! The enemies block your escape.");
                Ok(AfterAction::EnemyPhase {
                    guard_bonus: 0,
                    retaliate: true,
                })
            }
        }
        PlayerAction::SwitchTarget(index) => {
            let next = match index {
                Some(i) if i < session.enemies.len() => i,
                Some(_) => return Err(Rejection::NoSuchTarget),
                None if session.enemies.is_empty() => return Err(Rejection::NoSuchTarget),
                None => (session.target_index + 1) % session.enemies.len(),
            };
            session.target_index = next;
            let name = session.enemies[next].name.clone();
            if session.enemies.len() == 1 {
                out.narrate(format!("The {} is your only foe.", name));
            } else {
                out.narrate(format!("You turn to face the {}.", name));
            }
            out.record(Effect::TargetChanged { name, index: next });
            Ok(AfterAction::Free)
        }
    }
}

fn record_hit(enemy: &Enemy, amount: i32, out: &mut Resolution) {
    out.record(Effect::EnemyDamaged {
        name: enemy.name.clone(),
        amount,
        health: enemy.health,
    });
}

fn after_strike(session: &mut CombatSession, out: &mut Resolution, retaliate: bool) -> AfterAction {
    if session.remove_defeated(out) {
        AfterAction::Victory
    } else {
        AfterAction::EnemyPhase {
            guard_bonus: 0,
            retaliate,
        }
    }
}

enum PhaseEnd {
    Victory,
    Defeat,
    Fled,
}

/// Run the enemies' half of the round.
///
/// Damage over time lands first. Unless the player struck from the
/// shadows, each live enemy then regenerates and attacks. Durations tick
/// down at the end.
fn enemy_phase(
    world: &mut GameWorld,
    session: &mut CombatSession,
    guard_bonus: i32,
    retaliate: bool,
    out: &mut Resolution,
) -> Option<PhaseEnd> {
    for effect in &session.effects {
        let StatusEffect::DamageOverTime {
            amount_per_turn, ..
        } = effect.status
        else {
            continue;
        };
        if let Some(enemy) = session
            .enemies
            .iter_mut()
            .find(|e| e.id == effect.enemy && e.is_alive())
        {
            enemy.health -= amount_per_turn;
            out.narrate(format!(
                "Poison deals {} damage to {}! {} health: {}.",
                amount_per_turn,
                enemy.name,
                enemy.name,
                enemy.displayed_health()
            ));
            record_hit(enemy, amount_per_turn, out);
        }
    }
    if session.remove_defeated(out) {
        return Some(PhaseEnd::Victory);
    }

    let all_incapacitated = session
        .enemies
        .iter()
        .all(|e| incapacitation(&session.effects, e.id).is_some());

    if !retaliate {
        out.narrate("Your foes are caught off guard and cannot retaliate.");
    } else if all_incapacitated {
        out.narrate("All enemies are frozen or stunned!");
    } else {
        let player = &mut world.player;
        let defense = player.defense + guard_bonus;

        for enemy in session.enemies.iter_mut() {
            if let Some(amount) = enemy.regenerate {
                let old = enemy.health;
                enemy.health = (enemy.health + amount).min(enemy.max_health).max(old);
                if enemy.health > old {
                    out.narrate(format!(
                        "The {} regenerates {} health!",
                        enemy.name,
                        enemy.health - old
                    ));
                    out.record(Effect::EnemyRegenerated {
                        name: enemy.name.clone(),
                        amount: enemy.health - old,
                        health: enemy.health,
                    });
                }
            }

            if let Some(kind) = incapacitation(&session.effects, enemy.id) {
                out.narrate(format!(
                    "The {} is {} and cannot act!",
                    enemy.name,
                    kind.past_tense()
                ));
                continue;
            }

            let damage = (enemy.damage - defense).max(0);
            player.health -= damage;
            out.narrate(format!(
                "The {} attacks for {} damage! Your health: {}.",
                enemy.name,
                damage,
                player.health.max(0)
            ));
            out.record(Effect::PlayerDamaged {
                source: enemy.name.clone(),
                amount: damage,
                health: player.health,
            });

            if player.is_defeated() {
                return Some(PhaseEnd::Defeat);
            }
        }
    }

    for effect in session.effects.iter_mut() {
        effect.status.tick();
    }
    let enemies = &session.enemies;
    session.effects.retain(|effect| {
        effect.status.remaining_turns() > 0 && enemies.iter().any(|e| e.id == effect.enemy)
    });

    session.turn_index = (session.turn_index + 1) % 3;
    out.narrate_with(TURN_PROMPT, Pause::Short);
    None
}

fn victory(world: &mut GameWorld, session: CombatSession, out: &mut Resolution) {
    let gold: u32 = session.roster.iter().map(|e| e.gold).sum();
    let total_exp: u32 = session.roster.iter().map(|e| e.exp).sum();
    let experience = if session.roster.len() > 1 {
        (total_exp as f64 * 1.5).floor() as u32
    } else {
        total_exp
    };
    info!("Victory at {}: {} gold, {} experience", session.room, gold, experience);

    let player = &mut world.player;
    player.gold += gold;
    out.narrate_with(
        format!(
            "Victory! You gained {} experience and {} gold. Total gold: {}.",
            experience, gold, player.gold
        ),
        Pause::Long,
    );
    out.record(Effect::GoldChanged {
        amount: gold as i64,
        total: player.gold,
    });
    progression::gain_experience(player, experience, out);

    if let Some(room) = world.dungeon.room_mut(session.room) {
        room.clear_enemies();
    }

    let outcome = CombatOutcome::Victory { gold, experience };
    end_combat(world, outcome, out);
}

fn fled(world: &mut GameWorld, session: CombatSession, out: &mut Resolution) {
    write_back(world, &session);

    let player = &mut world.player;
    if let Some(previous) = player.previous_position.take() {
        let from = player.position;
        player.position = previous;
        out.record(Effect::PlayerMoved { from, to: previous });
    }
    info!("Player fled combat at {}", session.room);
    end_combat(world, CombatOutcome::Fled, out);
}

/// The player has fallen. Reset them and return to class selection.
///
/// The dungeon level is kept. `session` is the encounter that killed them,
/// if any; a trap can also be fatal.
pub fn defeat(world: &mut GameWorld, session: Option<CombatSession>, out: &mut Resolution) {
    if let Some(session) = &session {
        write_back(world, session);
    }
    info!(
        "Player defeated on level {} at {}",
        world.dungeon.current_level, world.player.position
    );

    out.narrate_with("You have been defeated! Game Over. Restarting...", Pause::Long);
    if session.is_some() {
        out.record(Effect::CombatEnded {
            outcome: CombatOutcome::Defeat,
        });
        out.outcome = Some(CombatOutcome::Defeat);
    }

    world.reset_player();
    out.record(Effect::PlayerReset);
    out.record(Effect::ModeChanged {
        mode: GameMode::ClassSelect,
    });
    out.narrate("Game over! Choose your class: warrior, mage, or rogue.");
}

fn write_back(world: &mut GameWorld, session: &CombatSession) {
    if let Some(room) = world.dungeon.room_mut(session.room) {
        for enemy in session.roster.iter() {
            let current = session
                .enemies
                .iter()
                .find(|e| e.id == enemy.id)
                .unwrap_or(enemy);
            room.sync_enemy(current);
        }
    }
}

fn end_combat(world: &mut GameWorld, outcome: CombatOutcome, out: &mut Resolution) {
    world.combat = None;
    world.mode = GameMode::Exploration;
    out.record(Effect::CombatEnded { outcome });
    out.record(Effect::ModeChanged {
        mode: GameMode::Exploration,
    });
    out.outcome = Some(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bestiary::EnemyKind;
    use crate::dungeon::scale_enemy_for_level;
    use crate::world::{CharacterClass, Room, RoomType};

    fn goblin() -> Enemy {
        scale_enemy_for_level(&EnemyKind::Goblin.template(), 1)
    }

    fn world_in_combat(enemies: Vec<Enemy>) -> GameWorld {
        let mut world = GameWorld::new();
        world.player.class = Some(CharacterClass::Warrior);
        world.dungeon.rooms = (0..100).map(|_| Room::new(RoomType::Empty, "a room")).collect();
        let pos = world.player.position;
        let room = world.dungeon.room_mut(pos).unwrap();
        room.room_type = RoomType::Enemy;
        let mut iter = enemies.into_iter();
        room.enemy = iter.next();
        room.second_enemy = iter.next();

        let mut out = Resolution::empty();
        assert!(start_combat(&mut world, &mut out));
        world
    }

    #[test]
    fn test_attack_subtracts_defense() {
        let mut enemy = goblin();
        enemy.defense = 3;
        let mut world = world_in_combat(vec![enemy]);
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();

        let session = world.combat.as_ref().unwrap();
        assert_eq!(session.enemies[0].health, 18);
        assert!(out.text().contains("You hit the Goblin for 12 damage! Goblin health: 18."));
    }

    #[test]
    fn test_special_without_mana_is_rejected() {
        let mut world = world_in_combat(vec![goblin()]);
        world.player.mana = 10;
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        let err = resolve_action(&mut world, &mut rng, PlayerAction::Special, &mut out).unwrap_err();
        assert_eq!(
            err,
            Rejection::NotEnoughMana {
                ability: "Power Strike".to_string(),
                cost: 15
            }
        );
        assert_eq!(world.player.mana, 10);
        assert_eq!(world.player.health, 100);
        assert_eq!(world.combat.as_ref().unwrap().turn_index, 0);
    }

    #[test]
    fn test_defend_bonus_lasts_one_phase() {
        let mut world = world_in_combat(vec![goblin()]);
        let mut rng = GameRng::new(0);

        let mut out = Resolution::empty();
        resolve_action(&mut world, &mut rng, PlayerAction::Defend, &mut out).unwrap();
        // 8 damage - 5 guard
        assert_eq!(world.player.health, 97);
        assert_eq!(world.player.defense, 0);

        let mut out = Resolution::empty();
        world.player.base_attack = 0;
        resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();
        assert_eq!(world.player.health, 89);
    }

    #[test]
    fn test_enemy_damage_never_negative() {
        let mut world = world_in_combat(vec![goblin()]);
        world.player.defense = 50;
        world.player.base_attack = 0;
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();
        assert_eq!(world.player.health, 100);
        assert!(out.text().contains("The Goblin attacks for 0 damage!"));
    }

    #[test]
    fn test_poison_ticks_exactly_duration_times() {
        let mut troll = scale_enemy_for_level(&EnemyKind::Orc.template(), 1);
        troll.health = 200;
        troll.max_health = 200;
        let mut world = world_in_combat(vec![troll]);
        world.player.class = Some(CharacterClass::Rogue);
        world.player.mana = 100;
        world.player.defense = 100;
        world.player.learned_abilities.insert("Poison Blade".to_string());
        let mut rng = GameRng::new(0);

        let mut out = Resolution::empty();
        resolve_action(
            &mut world,
            &mut rng,
            PlayerAction::CastSpell(Some("Poison Blade".to_string())),
            &mut out,
        )
        .unwrap();
        // 30 from the blade, 5 from the first tick
        assert_eq!(world.combat.as_ref().unwrap().enemies[0].health, 165);

        world.player.base_attack = 0;
        for _ in 0..4 {
            let mut out = Resolution::empty();
            resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();
        }
        let session = world.combat.as_ref().unwrap();
        assert_eq!(session.enemies[0].health, 155);
        assert!(session.effects.is_empty());
    }

    #[test]
    fn test_freeze_skips_one_enemy_action() {
        let mut world = world_in_combat(vec![goblin()]);
        world.player.class = Some(CharacterClass::Mage);
        world.player.mana = 100;
        world.player.learned_abilities.insert("Icy Blast".to_string());
        world.combat.as_mut().unwrap().enemies[0].health = 500;
        let mut rng = GameRng::new(0);

        let mut out = Resolution::empty();
        resolve_action(
            &mut world,
            &mut rng,
            PlayerAction::CastSpell(Some("Icy Blast".to_string())),
            &mut out,
        )
        .unwrap();
        assert_eq!(world.player.health, 100);
        assert!(out.text().contains("All enemies are frozen or stunned!"));
        assert!(world.combat.as_ref().unwrap().effects.is_empty());

        let mut out = Resolution::empty();
        resolve_action(&mut world, &mut rng, PlayerAction::Defend, &mut out).unwrap();
        assert_eq!(world.player.health, 97);
    }

    fn cast(world: &mut GameWorld, rng: &mut GameRng, spell: &str) -> Resolution {
        world.player.learned_abilities.insert(spell.to_string());
        let mut out = Resolution::empty();
        resolve_action(world, rng, PlayerAction::CastSpell(Some(spell.to_string())), &mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_shadow_strike_blocks_retaliation() {
        let troll = scale_enemy_for_level(&EnemyKind::Troll.template(), 1);
        let mut world = world_in_combat(vec![troll, goblin()]);
        world.player.mana = 100;
        let mut rng = GameRng::new(0);

        let poisoned = world.combat.as_ref().unwrap().enemies[1].id;
        world.combat.as_mut().unwrap().effects.push(ActiveEffect {
            enemy: poisoned,
            status: StatusEffect::DamageOverTime {
                remaining_turns: 2,
                amount_per_turn: 5,
            },
        });

        let out = cast(&mut world, &mut rng, "Shadow Strike");
        assert_eq!(world.player.health, 100);
        assert!(!out
            .effects
            .iter()
            .any(|e| matches!(e, Effect::PlayerDamaged { .. })));
        assert!(out.text().contains("cannot retaliate"));

        let session = world.combat.as_ref().unwrap();
        // 80 - 40, and no regeneration while caught off guard.
        assert_eq!(session.enemies[0].health, 40);
        // The poison on the goblin still lands and ticks.
        assert_eq!(session.enemies[1].health, 25);
        assert_eq!(session.effects.len(), 1);
        assert_eq!(session.effects[0].status.remaining_turns(), 1);
    }

    #[test]
    fn test_killing_shadow_strike_is_victory() {
        let mut world = world_in_combat(vec![goblin()]);
        world.player.mana = 100;
        let mut rng = GameRng::new(0);

        let out = cast(&mut world, &mut rng, "Shadow Strike");
        assert_eq!(
            out.outcome,
            Some(CombatOutcome::Victory {
                gold: 5,
                experience: 15
            })
        );
        assert_eq!(world.mode, GameMode::Exploration);
        assert_eq!(world.player.mana, 80);
    }

    #[test]
    fn test_stun_skips_one_enemy_turn() {
        let mut world = world_in_combat(vec![goblin()]);
        world.player.mana = 100;
        world.combat.as_mut().unwrap().enemies[0].health = 500;
        let mut rng = GameRng::new(0);

        let out = cast(&mut world, &mut rng, "Shield Bash");
        assert!(out.effects.iter().any(|e| matches!(
            e,
            Effect::StatusApplied {
                status: StatusEffect::Incapacitate {
                    kind: Incapacitation::Stun,
                    remaining_turns: 1
                },
                ..
            }
        )));
        assert!(out.text().contains("The Goblin is stunned for 1 turn."));
        assert!(out.text().contains("All enemies are frozen or stunned!"));
        assert_eq!(world.player.health, 100);

        let session = world.combat.as_ref().unwrap();
        assert_eq!(session.enemies[0].health, 440);
        assert!(session.effects.is_empty());

        // The stun has worn off.
        let mut out = Resolution::empty();
        world.player.base_attack = 0;
        resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();
        assert!(out.text().contains("The Goblin attacks for 8 damage!"));
        assert_eq!(world.player.health, 92);
    }

    #[test]
    fn test_regeneration_caps_and_ignores_freeze() {
        let mut troll = scale_enemy_for_level(&EnemyKind::Troll.template(), 1);
        troll.health = 78;
        let mut world = world_in_combat(vec![troll, goblin()]);
        world.player.mana = 100;
        let mut rng = GameRng::new(0);

        let mut out = Resolution::empty();
        resolve_action(&mut world, &mut rng, PlayerAction::Defend, &mut out).unwrap();
        assert!(out.text().contains("The Troll regenerates 2 health!"));
        assert_eq!(world.combat.as_ref().unwrap().enemies[0].health, 80);
        // Troll 20 - 5 and goblin 8 - 5.
        assert_eq!(world.player.health, 82);

        // The frozen troll still heals, then loses its action.
        let out = cast(&mut world, &mut rng, "Icy Blast");
        let text = out.text();
        assert!(text.contains("The Troll regenerates 5 health!"));
        assert!(text.contains("The Troll is frozen and cannot act!"));
        assert!(text.find("regenerates").unwrap() < text.find("cannot act").unwrap());
        assert_eq!(world.combat.as_ref().unwrap().enemies[0].health, 15);
        assert_eq!(world.player.health, 74);
    }

    #[test]
    fn test_aoe_victory_skips_enemy_phase() {
        let mut world = world_in_combat(vec![goblin(), goblin()]);
        world.player.class = Some(CharacterClass::Mage);
        world.player.mana = 50;
        world.player.learned_abilities.insert("Arcane Missiles".to_string());
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        resolve_action(
            &mut world,
            &mut rng,
            PlayerAction::CastSpell(Some("Arcane Missiles".to_string())),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            out.outcome,
            Some(CombatOutcome::Victory {
                gold: 10,
                experience: 45
            })
        );
        assert_eq!(world.player.health, 100);
        assert_eq!(world.mode, GameMode::Exploration);
        assert!(world.current_room().unwrap().enemy.is_none());
    }

    #[test]
    fn test_failed_flee_runs_enemy_phase() {
        let mut world = world_in_combat(vec![goblin()]);
        let mut rng = GameRng::scripted([0.5]);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::Flee, &mut out).unwrap();
        assert!(out.effects.contains(&Effect::FleeAttempted {
            chance: 0.4,
            success: false
        }));
        assert_eq!(world.player.health, 92);
        assert!(world.combat.is_some());
    }

    #[test]
    fn test_successful_flee_writes_back_health() {
        let mut world = world_in_combat(vec![goblin()]);
        let entrance = world.player.position;
        world.player.previous_position = Some(Position::new(entrance.x, entrance.y - 1));
        world.combat.as_mut().unwrap().enemies[0].health = 7;
        let mut rng = GameRng::scripted([0.1]);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::Flee, &mut out).unwrap();
        assert_eq!(out.outcome, Some(CombatOutcome::Fled));
        assert_eq!(world.player.position, Position::new(entrance.x, entrance.y - 1));
        let room = world.dungeon.room(entrance).unwrap();
        assert_eq!(room.enemy.as_ref().unwrap().health, 7);
    }

    #[test]
    fn test_switch_target_is_free() {
        let mut world = world_in_combat(vec![goblin(), goblin()]);
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::SwitchTarget(None), &mut out).unwrap();
        assert_eq!(world.combat.as_ref().unwrap().target_index, 1);
        assert_eq!(world.player.health, 100);

        let err = resolve_action(
            &mut world,
            &mut rng,
            PlayerAction::SwitchTarget(Some(2)),
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err, Rejection::NoSuchTarget);
    }

    #[test]
    fn test_defeat_resets_player() {
        let mut world = world_in_combat(vec![goblin()]);
        world.dungeon.current_level = 4;
        world.player.health = 5;
        world.player.base_attack = 0;
        let mut rng = GameRng::new(0);
        let mut out = Resolution::empty();

        resolve_action(&mut world, &mut rng, PlayerAction::Attack, &mut out).unwrap();
        assert_eq!(out.outcome, Some(CombatOutcome::Defeat));
        assert_eq!(world.mode, GameMode::ClassSelect);
        assert!(world.combat.is_none());
        assert_eq!(world.player.health, 100);
        assert_eq!(world.dungeon.current_level, 4);
    }
}
