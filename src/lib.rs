//! Arena Modes - progression engine for the alternative play modes
//!
//! Core modules:
//! - `modes`: Mode sessions (Horde, Boss Rush, One-Hit, Time Attack)
//! - `persistence`: Record store abstraction and typed record accessors
//! - `settings`: Explicit configuration context and per-mode rulesets
//! - `medals`: Medal tiers, rewards and style bonus scoring
//! - `entity`: Narrow seams onto host game entities
//! - `clock`: Wall-clock sources (system and manually driven)

pub mod clock;
pub mod entity;
pub mod medals;
pub mod modes;
pub mod persistence;
pub mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use medals::{Medal, MedalThresholds, Reward, RewardKind};
pub use modes::{ActiveMode, ModeContext, ModeKind, ModeSession, RunReport, TickInput};
pub use persistence::{MemoryStore, RecordStore, Records, StoreError};
pub use settings::{DifficultyTier, Settings};

/// Engine configuration constants
pub mod consts {
    /// Ghost sampling interval (seconds)
    pub const GHOST_SAMPLE_INTERVAL: f64 = 0.1;
    /// Maximum ghost samples per run (~10 minutes at the default interval)
    pub const GHOST_MAX_SAMPLES: usize = 6000;
    /// Slack applied when comparing sample times, absorbs frame-step rounding
    pub const SAMPLE_EPSILON: f64 = 1e-9;

    /// Medal thresholds (seconds, inclusive)
    pub const GOLD_TIME: f64 = 180.0;
    pub const SILVER_TIME: f64 = 300.0;
    pub const BRONZE_TIME: f64 = 480.0;

    /// Style bonus points
    pub const NO_DAMAGE_BONUS: u32 = 1000;
    pub const MELEE_ONLY_BONUS: u32 = 500;
    pub const COMBO_POINTS_PER_HIT: u32 = 50;
    pub const COMBO_BONUS_CAP: u32 = 1000;
    /// Minimum max-combo before the combo bonus is awarded
    pub const COMBO_BONUS_MIN: u32 = 10;

    /// Horde wave defaults
    pub const BASE_ENEMY_COUNT: u32 = 5;
    pub const ENEMIES_PER_WAVE: f64 = 1.5;
    pub const BOSS_HEALTH_FACTOR: f64 = 2.0;
    pub const BOSS_DAMAGE_FACTOR: f64 = 1.5;
    pub const MINI_BOSS_HEALTH_FACTOR: f64 = 3.0;
    pub const MINI_BOSS_DAMAGE_FACTOR: f64 = 2.0;

    /// Fraction of max health restored between Boss Rush fights
    pub const BOSS_RUSH_HEALTH_REFILL: f64 = 0.5;

    /// One-Hit: chance a pickup becomes the ghost-mode power-up
    pub const GHOST_MODE_CHANCE: f64 = 0.2;
}
