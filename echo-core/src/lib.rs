//! Echo Dungeon game engine.
//!
//! This crate provides:
//! - A procedural 10x10 dungeon generator with level scaling
//! - Turn-based combat against one or two enemies
//! - Progression, equipment and a merchant economy
//! - A spoken-command parser and an Intent/Effect rules engine
//!
//! # Quick Start
//!
//! ```
//! use echo_core::{GameSession, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::new().with_seed(7));
//! let response = session.player_action("warrior");
//! for line in &response.narration {
//!     println!("{}", line);
//! }
//! ```

pub mod bestiary;
pub mod class_data;
pub mod combat;
pub mod command;
pub mod dungeon;
pub mod explore;
pub mod items;
pub mod merchant;
pub mod narration;
pub mod progression;
pub mod rng;
pub mod rules;
pub mod session;
pub mod spells;
pub mod testing;
pub mod world;

// Primary public API
pub use combat::{CombatOutcome, CombatSession, StatusEffect};
pub use narration::{Narration, NarrationQueue, Pause};
pub use rng::GameRng;
pub use rules::{Effect, Intent, Rejection, Resolution, RulesEngine};
pub use session::{GameSession, Response, SessionConfig, SessionError};
pub use testing::TestHarness;
pub use world::{CharacterClass, Direction, GameMode, GameWorld, Position};
