//! Narrow seams onto host game entities
//!
//! The engine never builds game entities. Hosts implement these traits on
//! their own player/enemy types (or use the plain structs below) so the
//! modes can apply their one-shot transforms at creation time.

use serde::{Deserialize, Serialize};

/// Health pool of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f64,
    pub max_health: f64,
}

impl Vitals {
    pub fn new(max_health: f64) -> Self {
        Self {
            health: max_health,
            max_health,
        }
    }

    /// Restore a fraction of max health, never above max
    pub fn refill(&mut self, fraction: f64) {
        let restored = self.max_health * fraction.clamp(0.0, 1.0);
        self.health = (self.health + restored).min(self.max_health);
    }
}

/// Anything with health and outgoing damage
pub trait Combatant {
    fn vitals_mut(&mut self) -> &mut Vitals;
    fn damage_mut(&mut self) -> &mut f64;
}

/// The player avatar
pub trait PlayerCombatant {
    fn vitals_mut(&mut self) -> &mut Vitals;
    fn set_healing_enabled(&mut self, enabled: bool);
}

/// Minimal player record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub vitals: Vitals,
    pub healing_enabled: bool,
}

impl Player {
    pub fn new(max_health: f64) -> Self {
        Self {
            vitals: Vitals::new(max_health),
            healing_enabled: true,
        }
    }
}

impl PlayerCombatant for Player {
    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn set_healing_enabled(&mut self, enabled: bool) {
        self.healing_enabled = enabled;
    }
}

/// Minimal enemy/boss record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub vitals: Vitals,
    pub damage: f64,
}

impl Enemy {
    pub fn new(max_health: f64, damage: f64) -> Self {
        Self {
            vitals: Vitals::new(max_health),
            damage,
        }
    }
}

impl Combatant for Enemy {
    fn vitals_mut(&mut self) -> &mut Vitals {
        &mut self.vitals
    }

    fn damage_mut(&mut self) -> &mut f64 {
        &mut self.damage
    }
}

/// Pickup kinds the host can drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupKind {
    Health,
    MegaHealth,
    Ammo,
    Armor,
    SpeedBoost,
    DamageBoost,
    /// Brief invulnerability; the only lifeline in One-Hit
    GhostMode,
}

impl PickupKind {
    /// Pickups that restore health
    pub fn is_healing(&self) -> bool {
        matches!(self, PickupKind::Health | PickupKind::MegaHealth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_caps_at_max() {
        let mut vitals = Vitals::new(100.0);
        vitals.health = 20.0;
        vitals.refill(0.5);
        assert_eq!(vitals.health, 70.0);
        vitals.refill(0.5);
        assert_eq!(vitals.health, 100.0);
    }

    #[test]
    fn test_healing_kinds() {
        assert!(PickupKind::Health.is_healing());
        assert!(PickupKind::MegaHealth.is_healing());
        assert!(!PickupKind::Ammo.is_healing());
        assert!(!PickupKind::GhostMode.is_healing());
    }
}
