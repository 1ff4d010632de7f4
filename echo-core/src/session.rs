//! GameSession - the primary public API for Echo Dungeon.
//!
//! Wraps the world, the random source and the rules engine behind a
//! text-in, narration-out interface.

use crate::combat::CombatOutcome;
use crate::command;
use crate::narration::{Narration, NarrationQueue, Pause};
use crate::rng::GameRng;
use crate::rules::{Effect, Intent, Resolution, RulesEngine};
use crate::world::{GameMode, GameWorld};
use log::{info, trace};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding a fixed dungeon seed.
pub const SEED_VAR: &str = "ECHO_DUNGEON_SEED";

/// Environment variable holding the narration pace in milliseconds.
pub const PACE_VAR: &str = "ECHO_NARRATION_PACE_MS";

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid value {value:?} for {var}")]
    InvalidConfig { var: &'static str, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration for creating a new game session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Seed for the random source. A random seed is drawn when unset.
    pub seed: Option<u64>,

    /// Base pause between narration lines. Zero means no waiting.
    pub pace: Duration,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed seed so the game is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the base narration pace.
    pub fn with_pacing(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Build a config from `ECHO_DUNGEON_SEED` and `ECHO_NARRATION_PACE_MS`.
    ///
    /// Unset variables keep their defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SessionError> {
        let mut config = Self::new();
        if let Some(seed) = parse_var(SEED_VAR, lookup(SEED_VAR))? {
            config = config.with_seed(seed);
        }
        if let Some(ms) = parse_var(PACE_VAR, lookup(PACE_VAR))? {
            config = config.with_pacing(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn parse_var(var: &'static str, value: Option<String>) -> Result<Option<u64>, SessionError> {
    match value {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SessionError::InvalidConfig { var, value }),
    }
}

/// Response from a player action.
#[derive(Debug, Clone)]
pub struct Response {
    /// Lines to speak, in order.
    pub narration: Vec<Narration>,

    /// Effects that were applied to the game world.
    pub effects: Vec<Effect>,

    /// The mode after the action.
    pub mode: GameMode,

    /// Set when the action ended a combat encounter.
    pub outcome: Option<CombatOutcome>,
}

impl Response {
    /// All narration joined with spaces.
    pub fn text(&self) -> String {
        self.narration
            .iter()
            .map(|n| n.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An Echo Dungeon game session.
pub struct GameSession {
    world: GameWorld,
    rng: GameRng,
    engine: RulesEngine,
    config: SessionConfig,
    queue: NarrationQueue,
}

impl GameSession {
    /// Start a new game at class selection.
    pub fn new(config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        let world = GameWorld::new();
        info!("Session {} started with seed {}", world.session_id, rng.seed());

        let mut queue = NarrationQueue::new();
        queue.push(
            Narration::new("Welcome to Echo Dungeon! Choose your class: warrior, mage, or rogue.")
                .with_pause(Pause::Long),
        );

        Self {
            world,
            rng,
            engine: RulesEngine::new(),
            config,
            queue,
        }
    }

    /// Parse and resolve one spoken command.
    pub fn player_action(&mut self, input: &str) -> Response {
        let intent = command::parse(input, self.world.mode);
        trace!("Parsed {:?} as {:?}", input, intent);
        self.apply(intent)
    }

    /// Resolve an already-parsed intent.
    pub fn apply(&mut self, intent: Intent) -> Response {
        let Resolution {
            narration,
            effects,
            outcome,
        } = self.engine.resolve(&mut self.world, &mut self.rng, intent);

        self.queue.extend(narration.iter().cloned());
        Response {
            narration,
            effects,
            mode: self.world.mode,
            outcome,
        }
    }

    /// Take every line waiting to be presented.
    pub fn drain_narration(&mut self) -> Vec<Narration> {
        self.queue.drain()
    }

    /// JSON snapshot of the whole world.
    pub fn snapshot_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(&self.world)?)
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    /// Get a mutable reference to the game world.
    ///
    /// Use with caution - direct modifications bypass the rules engine.
    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.world.mode
    }

    pub fn in_combat(&self) -> bool {
        self.world.in_combat()
    }

    /// Returns (current, max) with current clamped at 0.
    pub fn hp_status(&self) -> (i32, i32) {
        let player = &self.world.player;
        (player.health.max(0), player.max_health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config() {
        let config = SessionConfig::new()
            .with_seed(7)
            .with_pacing(Duration::from_millis(250));

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.pace, Duration::from_millis(250));
    }

    #[test]
    fn test_config_from_vars() {
        let config = SessionConfig::from_vars(|var| match var {
            SEED_VAR => Some("42".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.pace, Duration::ZERO);

        let err = SessionConfig::from_vars(|var| match var {
            PACE_VAR => Some("fast".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"fast\" for ECHO_NARRATION_PACE_MS"
        );
    }

    #[test]
    fn test_opening_line_is_queued() {
        let mut session = GameSession::new(SessionConfig::new().with_seed(1));
        let lines = session.drain_narration();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.starts_with("Welcome to Echo Dungeon!"));
        assert!(session.drain_narration().is_empty());
    }

    #[test]
    fn test_choose_class_and_snapshot() {
        let mut session = GameSession::new(SessionConfig::new().with_seed(3));
        let response = session.player_action("Warrior please");

        assert_eq!(response.mode, GameMode::Exploration);
        assert!(response.text().starts_with("You are now a Warrior."));
        assert_eq!(session.hp_status(), (120, 120));

        let json = session.snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["player"]["class"], "Warrior");
        assert_eq!(value["dungeon"]["current_level"], 1);
    }
}
