//! Enemy templates.
//!
//! Base stats for every creature the generator can place. Templates are
//! scaled to the dungeon level by [`crate::dungeon::scale_enemy_for_level`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every kind of enemy in the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Goblin,
    Skeleton,
    Orc,
    Wraith,
    Troll,
    Dragon,
    Demon,
    Vampire,
    OrcChieftain,
    AncientWraith,
    ElderTroll,
    ArchDemon,
    Hydra,
    PhoenixGuardian,
    LichKing,
}

/// Unscaled stats for one kind of enemy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTemplate {
    pub kind: EnemyKind,
    pub health: i32,
    pub damage: i32,
    pub gold: u32,
    pub exp: u32,
    pub flee_chance: Option<f64>,
    /// Health regained at the start of each of the enemy's turns.
    pub regenerate: Option<i32>,
}

impl EnemyKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Goblin => "Goblin",
            EnemyKind::Skeleton => "Skeleton",
            EnemyKind::Orc => "Orc",
            EnemyKind::Wraith => "Wraith",
            EnemyKind::Troll => "Troll",
            EnemyKind::Dragon => "Dragon",
            EnemyKind::Demon => "Demon",
            EnemyKind::Vampire => "Vampire",
            EnemyKind::OrcChieftain => "Orc Chieftain",
            EnemyKind::AncientWraith => "Ancient Wraith",
            EnemyKind::ElderTroll => "Elder Troll",
            EnemyKind::ArchDemon => "Arch Demon",
            EnemyKind::Hydra => "Hydra",
            EnemyKind::PhoenixGuardian => "Phoenix Guardian",
            EnemyKind::LichKing => "Lich King",
        }
    }

    pub fn template(&self) -> EnemyTemplate {
        // (health, damage, gold, exp, flee, regenerate)
        let (health, damage, gold, exp, flee, regenerate) = match self {
            EnemyKind::Goblin => (30, 8, 5, 15, 0.8, None),
            EnemyKind::Skeleton => (40, 10, 8, 20, 0.7, None),
            EnemyKind::Orc => (60, 15, 12, 30, 0.5, None),
            EnemyKind::Wraith => (50, 18, 15, 35, 0.6, None),
            EnemyKind::Troll => (80, 20, 20, 45, 0.4, Some(5)),
            EnemyKind::Dragon => (150, 30, 50, 100, 0.1, None),
            EnemyKind::Demon => (120, 28, 45, 80, 0.3, None),
            EnemyKind::Vampire => (100, 25, 40, 70, 0.4, Some(8)),
            EnemyKind::OrcChieftain => (100, 22, 25, 50, 0.3, None),
            EnemyKind::AncientWraith => (90, 26, 30, 60, 0.4, None),
            EnemyKind::ElderTroll => (150, 28, 40, 75, 0.2, Some(10)),
            EnemyKind::ArchDemon => (180, 35, 70, 120, 0.2, None),
            EnemyKind::Hydra => (140, 30, 55, 90, 0.3, Some(12)),
            EnemyKind::PhoenixGuardian => (130, 32, 60, 95, 0.3, Some(15)),
            EnemyKind::LichKing => (160, 38, 80, 130, 0.1, Some(10)),
        };

        EnemyTemplate {
            kind: *self,
            health,
            damage,
            gold,
            exp,
            flee_chance: Some(flee),
            regenerate,
        }
    }

    pub fn all() -> [EnemyKind; 15] {
        [
            EnemyKind::Goblin,
            EnemyKind::Skeleton,
            EnemyKind::Orc,
            EnemyKind::Wraith,
            EnemyKind::Troll,
            EnemyKind::Dragon,
            EnemyKind::Demon,
            EnemyKind::Vampire,
            EnemyKind::OrcChieftain,
            EnemyKind::AncientWraith,
            EnemyKind::ElderTroll,
            EnemyKind::ArchDemon,
            EnemyKind::Hydra,
            EnemyKind::PhoenixGuardian,
            EnemyKind::LichKing,
        ]
    }

    pub fn from_name(name: &str) -> Option<EnemyKind> {
        let name_lower = name.to_lowercase();
        Self::all()
            .into_iter()
            .find(|k| k.name().to_lowercase() == name_lower)
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regenerating_enemies() {
        let regenerators: Vec<_> = EnemyKind::all()
            .into_iter()
            .filter(|k| k.template().regenerate.is_some())
            .collect();
        assert_eq!(
            regenerators,
            vec![
                EnemyKind::Troll,
                EnemyKind::Vampire,
                EnemyKind::ElderTroll,
                EnemyKind::Hydra,
                EnemyKind::PhoenixGuardian,
                EnemyKind::LichKing,
            ]
        );
    }

    #[test]
    fn test_dragon_template() {
        let dragon = EnemyKind::Dragon.template();
        assert_eq!(dragon.health, 150);
        assert_eq!(dragon.damage, 30);
        assert_eq!(dragon.flee_chance, Some(0.1));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(EnemyKind::from_name("lich king"), Some(EnemyKind::LichKing));
        assert_eq!(EnemyKind::from_name("Beholder"), None);
    }
}
