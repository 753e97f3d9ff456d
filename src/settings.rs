//! Engine settings and per-mode rulesets
//!
//! Passed explicitly to every mode through `ModeContext`; persisted in the
//! record store under its own key.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::medals::MedalThresholds;
use crate::persistence::{Records, keys};

/// Boss Rush difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyTier {
    #[default]
    Normal,
    Hard,
    Nightmare,
    Insane,
}

impl DifficultyTier {
    /// Tiers in ascending order
    pub const ALL: [DifficultyTier; 4] = [
        DifficultyTier::Normal,
        DifficultyTier::Hard,
        DifficultyTier::Nightmare,
        DifficultyTier::Insane,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Normal => "Normal",
            DifficultyTier::Hard => "Hard",
            DifficultyTier::Nightmare => "Nightmare",
            DifficultyTier::Insane => "Insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(DifficultyTier::Normal),
            "hard" => Some(DifficultyTier::Hard),
            "nightmare" => Some(DifficultyTier::Nightmare),
            "insane" => Some(DifficultyTier::Insane),
            _ => None,
        }
    }

    /// Tier at a menu index, if one exists
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Health/damage multiplier applied to bosses
    pub fn multiplier(&self) -> f64 {
        match self {
            DifficultyTier::Normal => 1.0,
            DifficultyTier::Hard => 1.5,
            DifficultyTier::Nightmare => 2.0,
            DifficultyTier::Insane => 3.0,
        }
    }

    /// Multiplier for a menu index; unknown tiers are neutral
    pub fn multiplier_for_index(index: usize) -> f64 {
        match Self::from_index(index) {
            Some(tier) => tier.multiplier(),
            None => {
                log::warn!("Unknown difficulty tier {index}, using 1.0");
                1.0
            }
        }
    }
}

/// Horde wave scaling rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HordeRuleset {
    /// Added to the difficulty factor per wave
    pub wave_scaling_rate: f64,
    /// Elite chance at `elite_start_wave`
    pub elite_chance_start: f64,
    /// Elite chance from `elite_max_wave` on
    pub elite_chance_max: f64,
    pub elite_start_wave: u32,
    pub elite_max_wave: u32,
    pub mini_boss_interval: u32,
    pub boss_interval: u32,
    /// Offer the vendor between waves
    pub shop_between_waves: bool,
}

impl Default for HordeRuleset {
    fn default() -> Self {
        Self {
            wave_scaling_rate: 0.1,
            elite_chance_start: 0.1,
            elite_chance_max: 0.5,
            elite_start_wave: 3,
            elite_max_wave: 20,
            mini_boss_interval: 5,
            boss_interval: 10,
            shop_between_waves: true,
        }
    }
}

/// Boss Rush policy values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossRushRules {
    /// Fraction of max health the host restores between fights
    pub health_refill_percent: f64,
}

impl Default for BossRushRules {
    fn default() -> Self {
        Self {
            health_refill_percent: BOSS_RUSH_HEALTH_REFILL,
        }
    }
}

/// One-Hit constraint overlay rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneHitRules {
    /// Chance any pickup turns into the ghost-mode power-up
    pub ghost_mode_chance: f64,
    /// Levels in a full run; completing the last one wins the run
    pub total_levels: u32,
}

impl Default for OneHitRules {
    fn default() -> Self {
        Self {
            ghost_mode_chance: GHOST_MODE_CHANCE,
            total_levels: 10,
        }
    }
}

/// Time Attack timer and ghost rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeAttackRules {
    /// Minimum spacing between ghost samples (seconds)
    pub sample_interval: f64,
    /// Ghost sample cap per run
    pub max_samples: usize,
    pub medals: MedalThresholds,
}

impl Default for TimeAttackRules {
    fn default() -> Self {
        Self {
            sample_interval: GHOST_SAMPLE_INTERVAL,
            max_samples: GHOST_MAX_SAMPLES,
            medals: MedalThresholds::default(),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Presentation hints forwarded in results ===
    /// Screen shake on boss kills / wave clears
    pub screen_shake: bool,
    /// Reduced motion (suppresses shake)
    pub reduced_motion: bool,

    // === Generation ===
    /// Fixed RNG seed for reproducible generation (None = random per session)
    pub seed: Option<u64>,

    // === Rulesets ===
    pub horde: HordeRuleset,
    pub boss_rush: BossRushRules,
    pub one_hit: OneHitRules,
    pub time_attack: TimeAttackRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            reduced_motion: false,
            seed: None,
            horde: HordeRuleset::default(),
            boss_rush: BossRushRules::default(),
            one_hit: OneHitRules::default(),
            time_attack: TimeAttackRules::default(),
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Load settings from the record store
    pub fn load(records: &Records) -> Self {
        let settings: Settings = records.load(keys::SETTINGS);
        log::info!("Settings loaded (seed: {:?})", settings.seed);
        settings
    }

    /// Save settings to the record store
    pub fn save(&self, records: &Records) {
        if records.save(keys::SETTINGS, self) {
            log::info!("Settings saved");
        }
    }
}
