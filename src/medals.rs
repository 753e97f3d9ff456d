//! Medals, rewards and style scoring
//!
//! Pure evaluation helpers shared by the modes. Nothing in here keeps state
//! beyond the value it is called on.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Time-based rank for a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    None,
}

impl Medal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Medal::Gold => "gold",
            Medal::Silver => "silver",
            Medal::Bronze => "bronze",
            Medal::None => "none",
        }
    }
}

/// Inclusive medal cut-offs in seconds (gold < silver < bronze)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MedalThresholds {
    pub gold: f64,
    pub silver: f64,
    pub bronze: f64,
}

impl Default for MedalThresholds {
    fn default() -> Self {
        Self {
            gold: GOLD_TIME,
            silver: SILVER_TIME,
            bronze: BRONZE_TIME,
        }
    }
}

impl MedalThresholds {
    /// Medal earned by finishing in `time` seconds
    pub fn medal_for(&self, time: f64) -> Medal {
        if time <= self.gold {
            Medal::Gold
        } else if time <= self.silver {
            Medal::Silver
        } else if time <= self.bronze {
            Medal::Bronze
        } else {
            Medal::None
        }
    }

    /// Thresholds are usable only when strictly ordered
    pub fn is_ordered(&self) -> bool {
        self.gold < self.silver && self.silver < self.bronze
    }
}

/// What a reward grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Temporary buff granted between fights
    PowerUp,
    /// Permanent unlock (weapons, perks, cosmetics)
    Unlock,
}

/// A reward value object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reward {
    #[serde(rename = "type")]
    pub kind: RewardKind,
    pub id: u32,
    pub name: &'static str,
}

impl Reward {
    pub const fn power_up(id: u32, name: &'static str) -> Self {
        Self {
            kind: RewardKind::PowerUp,
            id,
            name,
        }
    }

    pub const fn unlock(id: u32, name: &'static str) -> Self {
        Self {
            kind: RewardKind::Unlock,
            id,
            name,
        }
    }
}

/// Style trackers for a timed run
///
/// `no_damage` and `melee_only` only ever go from true to false;
/// `combo_max` only grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleBonus {
    pub no_damage: bool,
    pub melee_only: bool,
    pub combo_max: u32,
}

impl Default for StyleBonus {
    fn default() -> Self {
        Self {
            no_damage: true,
            melee_only: true,
            combo_max: 0,
        }
    }
}

impl StyleBonus {
    pub fn track_damage(&mut self) {
        self.no_damage = false;
    }

    pub fn track_ranged_kill(&mut self) {
        self.melee_only = false;
    }

    pub fn track_combo(&mut self, combo: u32) {
        self.combo_max = self.combo_max.max(combo);
    }

    /// Points earned by each component
    pub fn score(&self) -> StyleScore {
        let no_damage = if self.no_damage { NO_DAMAGE_BONUS } else { 0 };
        let melee_only = if self.melee_only { MELEE_ONLY_BONUS } else { 0 };
        let combo = if self.combo_max >= COMBO_BONUS_MIN {
            self.combo_max
                .saturating_mul(COMBO_POINTS_PER_HIT)
                .min(COMBO_BONUS_CAP)
        } else {
            0
        };
        StyleScore {
            no_damage,
            melee_only,
            combo,
            total: no_damage + melee_only + combo,
        }
    }
}

/// Style bonus breakdown for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StyleScore {
    pub no_damage: u32,
    pub melee_only: u32,
    pub combo: u32,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_boundaries_inclusive() {
        let t = MedalThresholds::default();
        assert_eq!(t.medal_for(0.0), Medal::Gold);
        assert_eq!(t.medal_for(180.0), Medal::Gold);
        assert_eq!(t.medal_for(180.01), Medal::Silver);
        assert_eq!(t.medal_for(300.0), Medal::Silver);
        assert_eq!(t.medal_for(480.0), Medal::Bronze);
        assert_eq!(t.medal_for(480.01), Medal::None);
        assert!(t.is_ordered());
    }

    #[test]
    fn test_medal_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Medal::Gold).unwrap(), "\"gold\"");
        assert_eq!(Medal::None.as_str(), "none");
    }

    #[test]
    fn test_style_bonus_full_marks() {
        let mut style = StyleBonus::default();
        style.track_combo(12);
        let score = style.score();
        assert_eq!(score.no_damage, 1000);
        assert_eq!(score.melee_only, 500);
        assert_eq!(score.combo, 600);
        assert_eq!(score.total, 2100);
    }

    #[test]
    fn test_style_bonus_combo_capped_and_gated() {
        let mut style = StyleBonus::default();
        style.track_combo(9);
        assert_eq!(style.score().combo, 0);
        style.track_combo(40);
        assert_eq!(style.score().combo, 1000);
    }

    #[test]
    fn test_style_trackers_only_degrade() {
        let mut style = StyleBonus::default();
        style.track_damage();
        style.track_ranged_kill();
        style.track_combo(15);
        style.track_combo(3);
        assert!(!style.no_damage);
        assert!(!style.melee_only);
        assert_eq!(style.combo_max, 15);
        assert_eq!(style.score().total, 750);
    }
}
