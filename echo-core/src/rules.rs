//! Echo Dungeon rules engine with the Intent/Effect system.
//!
//! This module implements the core game pipeline:
//! 1. The command layer turns what the player said into an [`Intent`]
//! 2. [`RulesEngine::resolve`] validates the intent against the current mode
//! 3. The owning module (combat, exploration, progression, merchant) applies it
//! 4. The [`Resolution`] carries narration plus an [`Effect`] log of what changed
//!
//! An intent that is illegal right now produces a [`Rejection`]. Rejections
//! are rendered as narration, mutate nothing and never consume a turn.

use crate::combat::{self, CombatOutcome, PlayerAction, StatusEffect};
use crate::dungeon::{self, Loot};
use crate::explore;
use crate::items::{GearSlot, Potion};
use crate::merchant;
use crate::narration::{Narration, Pause};
use crate::progression;
use crate::rng::GameRng;
use crate::world::{CharacterClass, Direction, GameMode, GameWorld, Position};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An intent represents what the player wants to do.
/// The command layer produces intents, the RulesEngine resolves them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    // Class selection
    ChooseClass(CharacterClass),

    // Exploration
    Move(Direction),
    Look,
    Search,
    OpenChest,
    DrinkFountain,
    Descend,
    TalkToMerchant,
    Meditate,
    /// Wear a ring. `None` asks which carried ring to wear.
    EquipRing(Option<String>),
    RemoveRing(Option<String>),
    EquipAmulet(Option<String>),
    /// Equip a carried weapon, armor piece or shield named somewhere in the text.
    EquipGear(String),
    ReadBook(Option<String>),
    /// Drink a potion. `None` picks the most useful carried potion.
    UsePotion(Option<Potion>),

    // Information, valid in every mode
    Status,
    Inventory,
    Help,
    Commands,
    Hint,

    // Merchant
    ListWares,
    Buy {
        potion: Option<Potion>,
        quantity: u32,
    },
    Sell {
        treasure: Option<String>,
        quantity: u32,
    },
    LeaveMerchant,

    // Combat
    Attack,
    Defend,
    Special,
    CastSpell(Option<String>),
    Flee,
    /// Pick a target. `None` cycles to the next live enemy.
    SwitchTarget(Option<usize>),

    /// Nothing matched.
    Unknown(String),
}

/// The result of resolving an intent.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub narration: Vec<Narration>,
    pub effects: Vec<Effect>,
    /// Set when this intent ended a combat encounter.
    pub outcome: Option<CombatOutcome>,
}

impl Resolution {
    pub fn new(narrative: impl Into<String>) -> Self {
        Self {
            narration: vec![Narration::new(narrative)],
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a line with the default pause.
    pub fn narrate(&mut self, text: impl Into<String>) {
        self.narration.push(Narration::new(text));
    }

    pub fn narrate_with(&mut self, text: impl Into<String>, pause: Pause) {
        self.narration.push(Narration::new(text).with_pause(pause));
    }

    pub fn record(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// All narration joined with spaces.
    pub fn text(&self) -> String {
        self.narration
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Effects describe the concrete state changes an intent caused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    ClassChosen { class: CharacterClass },
    LevelGenerated { level: u32, has_secret_room: bool },
    ModeChanged { mode: GameMode },

    PlayerMoved { from: Position, to: Position },
    TrapTriggered { damage: i32, health: i32 },
    SecretRoomFound,
    LootFound { loot: Loot },
    FountainUsed,

    CombatStarted { enemies: Vec<String> },
    TargetChanged { name: String, index: usize },
    EnemyDamaged { name: String, amount: i32, health: i32 },
    EnemyDefeated { name: String },
    EnemyRegenerated { name: String, amount: i32, health: i32 },
    StatusApplied { name: String, status: StatusEffect },
    PlayerDamaged { source: String, amount: i32, health: i32 },
    FleeAttempted { chance: f64, success: bool },
    CombatEnded { outcome: CombatOutcome },
    PlayerReset,

    HealthRestored { amount: i32, health: i32 },
    ManaRestored { amount: i32, mana: i32 },
    ManaSpent { amount: i32, remaining: i32 },
    GoldChanged { amount: i64, total: u32 },
    ExperienceGained { amount: u32, total: u32 },
    LevelUp { new_level: u32 },
    MaxHealthChanged { amount: i32, max_health: i32 },
    MaxManaChanged { amount: i32, max_mana: i32 },

    ItemAdded { name: String },
    ItemRemoved { name: String },
    RingEquipped { name: String },
    RingRemoved { name: String },
    AmuletEquipped { name: String, replaced: Option<String> },
    GearEquipped { name: String, slot: GearSlot, replaced: Option<String> },
    AbilityLearned { name: String },
}

/// Why an intent could not be carried out.
///
/// The display text is what the player hears.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Please say warrior, mage, or rogue.")]
    NoClass,
    #[error("You have already chosen your class.")]
    ClassAlreadyChosen,
    #[error("You are not in combat.")]
    NotInCombat,
    #[error("You cannot do that during combat! Say attack, defend, special, cast spell, use potion, or flee.")]
    InCombat,
    #[error("You are trading with the merchant. Say buy, sell, what do you have, or leave.")]
    AtMerchant,
    #[error("You are not at a merchant.")]
    MerchantClosed,

    #[error("You cannot go that way. A solid wall blocks your path.")]
    Blocked,
    #[error("You already searched this room thoroughly.")]
    AlreadySearched,
    #[error("There is no chest here or it has already been opened.")]
    NoChest,
    #[error("There is no usable fountain here.")]
    NoFountain,
    #[error("There are no stairs here to descend.")]
    NoStairs,
    #[error("There is no merchant here.")]
    NoMerchant,

    #[error("Not enough mana! {ability} requires {cost} mana.")]
    NotEnoughMana { ability: String, cost: i32 },
    #[error("You don't know that spell or it's not available. Say cast followed by a learned spell.")]
    UnknownSpell,
    #[error("There is no such enemy to target.")]
    NoSuchTarget,
    #[error("You cannot meditate during combat!")]
    CannotMeditateInCombat,
    #[error("You are already at full mana.")]
    FullMana,

    #[error("You do not have a {0}.")]
    NotCarried(String),
    #[error("You have no potions.")]
    NoPotions,
    #[error("You have: {0}. Say which one to equip.")]
    ChooseRing(String),
    #[error("You have no rings. Find them in treasure chests or by searching rooms.")]
    NoRings,
    #[error("You already have 10 rings equipped. You must remove one first.")]
    TooManyRings,
    #[error("You can only equip up to 2 of the same ring.")]
    TooManyOfRing,
    #[error("You are not wearing a {0}.")]
    RingNotWorn(String),
    #[error("You are wearing: {0}. Say which one to remove.")]
    ChooseRingToRemove(String),
    #[error("You are not wearing any rings.")]
    NoRingsWorn,
    #[error("You have: {0}. Say which one to equip.")]
    ChooseAmulet(String),
    #[error("You have no amulets. Find them in treasure chests or by searching rooms.")]
    NoAmulets,
    #[error("You are already wearing the {0}.")]
    AmuletAlreadyWorn(String),
    #[error("You do not have that equipment. Check your inventory.")]
    NoEquipment,
    #[error("Only a {class} can use the {item}.")]
    WrongClass { item: String, class: CharacterClass },
    #[error("You have: {0}. Say which one to read.")]
    ChooseBook(String),
    #[error("You have no ability books to read. Find them in treasure chests.")]
    NoBooks,
    #[error("You already know {0}.")]
    AlreadyLearned(String),

    #[error("Say buy greater health potion, greater mana potion, health potion, or mana potion, followed by a quantity like two or three if desired.")]
    UnknownWares,
    #[error("Ha! You only have {have} gold. That'll cost {cost}! Scram!")]
    NotEnoughGold { have: u32, cost: u32 },
    #[error("Say sell sapphire gem, ruby gem, diamond, emerald, ancient coin collection, golden chalice, silver crown, or enchanted amulet, followed by a quantity like two or three if desired.")]
    UnknownTreasure,
    #[error("You only have {have} {name}!")]
    NotEnoughToSell { name: String, have: usize },
}

/// The rules engine routes intents to the module that owns them.
pub struct RulesEngine;

impl RulesEngine {
    pub fn new() -> Self {
        Self
    }

    /// Resolve an intent against the world, mutating it in place.
    pub fn resolve(&self, world: &mut GameWorld, rng: &mut GameRng, intent: Intent) -> Resolution {
        let mut resolution = Resolution::empty();
        match self.dispatch(world, rng, intent, &mut resolution) {
            Ok(()) => resolution,
            Err(rejection) => {
                debug!("Rejected in {:?} mode: {:?}", world.mode, rejection);
                Resolution::new(rejection.to_string())
            }
        }
    }

    fn dispatch(
        &self,
        world: &mut GameWorld,
        rng: &mut GameRng,
        intent: Intent,
        out: &mut Resolution,
    ) -> Result<(), Rejection> {
        // Information works everywhere and never costs a turn.
        match &intent {
            Intent::Status => return progression::status(world, out),
            Intent::Inventory => {
                progression::inventory(&world.player, out);
                return Ok(());
            }
            Intent::Help => {
                explore::help(world, out);
                return Ok(());
            }
            Intent::Commands => {
                explore::commands(world, out);
                return Ok(());
            }
            Intent::Hint => {
                explore::hint(world, out);
                return Ok(());
            }
            Intent::Unknown(_) => {
                out.narrate(explore::unknown_prompt(world.mode));
                return Ok(());
            }
            _ => {}
        }

        match world.mode {
            GameMode::ClassSelect => self.resolve_class_select(world, rng, intent, out),
            GameMode::Combat => self.resolve_combat(world, rng, intent, out),
            GameMode::Merchant => self.resolve_merchant(world, intent, out),
            GameMode::Exploration => self.resolve_exploration(world, rng, intent, out),
        }
    }

    fn resolve_class_select(
        &self,
        world: &mut GameWorld,
        rng: &mut GameRng,
        intent: Intent,
        out: &mut Resolution,
    ) -> Result<(), Rejection> {
        match intent {
            Intent::ChooseClass(class) => {
                progression::select_class(&mut world.player, class, out);
                world.mode = GameMode::Exploration;
                out.record(Effect::ModeChanged {
                    mode: GameMode::Exploration,
                });
                dungeon::generate_dungeon(world, rng);
                out.record(Effect::LevelGenerated {
                    level: world.dungeon.current_level,
                    has_secret_room: world.dungeon.has_secret_room,
                });
                out.narrate_with("Your adventure begins!", Pause::Long);
                explore::describe_room(world, out);
                Ok(())
            }
            _ => Err(Rejection::NoClass),
        }
    }

    fn resolve_combat(
        &self,
        world: &mut GameWorld,
        rng: &mut GameRng,
        intent: Intent,
        out: &mut Resolution,
    ) -> Result<(), Rejection> {
        let action = match intent {
            Intent::Attack => PlayerAction::Attack,
            Intent::Defend => PlayerAction::Defend,
            Intent::Special => PlayerAction::Special,
            Intent::CastSpell(name) => PlayerAction::CastSpell(name),
            Intent::UsePotion(potion) => PlayerAction::UsePotion(potion),
            Intent::Flee => PlayerAction::Flee,
            Intent::SwitchTarget(index) => PlayerAction::SwitchTarget(index),
            Intent::ChooseClass(_) => return Err(Rejection::ClassAlreadyChosen),
            _ => return Err(Rejection::InCombat),
        };

        combat::resolve_action(world, rng, action, out)?;

        if let Some(CombatOutcome::Victory { .. } | CombatOutcome::Fled) = out.outcome {
            explore::describe_room(world, out);
        }
        Ok(())
    }

    fn resolve_merchant(
        &self,
        world: &mut GameWorld,
        intent: Intent,
        out: &mut Resolution,
    ) -> Result<(), Rejection> {
        match intent {
            Intent::ListWares => {
                merchant::list_wares(out);
                Ok(())
            }
            Intent::Buy { potion, quantity } => {
                merchant::buy(&mut world.player, potion, quantity, out)
            }
            Intent::Sell { treasure, quantity } => {
                merchant::sell(&mut world.player, treasure.as_deref(), quantity, out)
            }
            Intent::LeaveMerchant => {
                merchant::leave(world, out);
                Ok(())
            }
            Intent::ChooseClass(_) => Err(Rejection::ClassAlreadyChosen),
            Intent::Attack
            | Intent::Defend
            | Intent::Special
            | Intent::CastSpell(_)
            | Intent::Flee
            | Intent::SwitchTarget(_) => Err(Rejection::NotInCombat),
            _ => Err(Rejection::AtMerchant),
        }
    }

    fn resolve_exploration(
        &self,
        world: &mut GameWorld,
        rng: &mut GameRng,
        intent: Intent,
        out: &mut Resolution,
    ) -> Result<(), Rejection> {
        match intent {
            Intent::Move(direction) => explore::move_player(world, direction, out),
            Intent::Look => {
                explore::describe_room(world, out);
                Ok(())
            }
            Intent::Search => explore::search(world, rng, out),
            Intent::OpenChest => explore::open_chest(world, rng, out),
            Intent::DrinkFountain => explore::drink_fountain(world, out),
            Intent::Descend => explore::descend(world, rng, out),
            Intent::TalkToMerchant => merchant::talk(world, out),
            Intent::Meditate => progression::meditate(world, out),
            Intent::EquipRing(name) => {
                progression::equip_ring(&mut world.player, name.as_deref(), out)
            }
            Intent::RemoveRing(name) => {
                progression::remove_ring(&mut world.player, name.as_deref(), out)
            }
            Intent::EquipAmulet(name) => {
                progression::equip_amulet(&mut world.player, name.as_deref(), out)
            }
            Intent::EquipGear(text) => progression::equip_gear(&mut world.player, &text, out),
            Intent::ReadBook(name) => {
                progression::read_book(&mut world.player, name.as_deref(), out)
            }
            Intent::UsePotion(potion) => {
                progression::drink_potion(&mut world.player, potion, out).map(|_| ())
            }
            Intent::ChooseClass(_) => Err(Rejection::ClassAlreadyChosen),
            Intent::ListWares
            | Intent::Buy { .. }
            | Intent::Sell { .. }
            | Intent::LeaveMerchant => Err(Rejection::MerchantClosed),
            Intent::Attack
            | Intent::Defend
            | Intent::Special
            | Intent::CastSpell(_)
            | Intent::Flee
            | Intent::SwitchTarget(_) => Err(Rejection::NotInCombat),
            Intent::Status
            | Intent::Inventory
            | Intent::Help
            | Intent::Commands
            | Intent::Hint
            | Intent::Unknown(_) => Ok(()),
        }
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}
