//! Mode sessions
//!
//! Every mode shares one lifecycle: started once with a `ModeContext`,
//! driven by `update` and gameplay event hooks, finalized exactly once.
//! A finished session is never restarted; the host starts a new one.

pub mod boss_rush;
pub mod ghost;
pub mod horde;
pub mod one_hit;
pub mod time_attack;

use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::clock::Clock;
use crate::persistence::{Records, SharedStore};
use crate::settings::Settings;

pub use boss_rush::{BossRushMode, BossRushOutcome, BossRushSummary};
pub use ghost::{GhostRecorder, GhostSample, PlayerPose};
pub use horde::{HordeMode, HordeSummary, WaveCompletion, WaveConfig};
pub use one_hit::{OneHitMode, OneHitSummary};
pub use time_attack::{TimeAttackMode, TimeAttackResult};

/// Which mode a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Horde,
    BossRush,
    OneHit,
    TimeAttack,
}

impl ModeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeKind::Horde => "Horde",
            ModeKind::BossRush => "Boss Rush",
            ModeKind::OneHit => "One-Hit",
            ModeKind::TimeAttack => "Time Attack",
        }
    }
}

/// Per-frame input from the host loop
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Frame delta (seconds)
    pub dt: f64,
    /// Player pose this frame, if the player exists
    pub player: Option<PlayerPose>,
}

/// `{current, total}` progress for HUD display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: u32,
    pub total: u32,
}

/// Final report emitted when a session is finalized
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunReport {
    Horde(HordeSummary),
    BossRush(BossRushSummary),
    OneHit(OneHitSummary),
    TimeAttack(TimeAttackResult),
}

/// Shared capabilities of all mode sessions
pub trait ModeSession {
    fn kind(&self) -> ModeKind;

    /// False once the session has completed, failed or been stopped
    fn is_active(&self) -> bool;

    /// Seed of the session's generation RNG
    fn seed(&self) -> u64;

    /// Per-frame update
    fn update(&mut self, input: &TickInput);

    /// End the session now. `None` if it had already ended.
    fn finalize(&mut self) -> Option<RunReport>;
}

/// Collaborators handed to each mode at start
#[derive(Clone)]
pub struct ModeContext {
    pub records: Records,
    pub clock: Rc<dyn Clock>,
    pub settings: Settings,
}

impl ModeContext {
    /// Build a context, loading settings from the store
    pub fn new(store: SharedStore, clock: Rc<dyn Clock>) -> Self {
        let records = Records::new(store);
        let settings = Settings::load(&records);
        Self {
            records,
            clock,
            settings,
        }
    }

    /// Build a context with explicit settings
    pub fn with_settings(store: SharedStore, clock: Rc<dyn Clock>, settings: Settings) -> Self {
        Self {
            records: Records::new(store),
            clock,
            settings,
        }
    }

    /// Seed for a new session: the configured one, else a random one
    pub fn session_seed(&self) -> u64 {
        self.settings.seed.unwrap_or_else(rand::random)
    }

    /// Seeded generation RNG for a new session
    pub(crate) fn session_rng(&self) -> (u64, Pcg32) {
        let seed = self.session_seed();
        (seed, Pcg32::seed_from_u64(seed))
    }

    pub(crate) fn now(&self) -> f64 {
        self.clock.now_secs()
    }
}

/// The one session the host currently runs
pub enum ActiveMode {
    Horde(HordeMode),
    BossRush(BossRushMode),
    OneHit(OneHitMode),
    TimeAttack(TimeAttackMode),
}

impl ActiveMode {
    fn session(&self) -> &dyn ModeSession {
        match self {
            ActiveMode::Horde(m) => m,
            ActiveMode::BossRush(m) => m,
            ActiveMode::OneHit(m) => m,
            ActiveMode::TimeAttack(m) => m,
        }
    }

    fn session_mut(&mut self) -> &mut dyn ModeSession {
        match self {
            ActiveMode::Horde(m) => m,
            ActiveMode::BossRush(m) => m,
            ActiveMode::OneHit(m) => m,
            ActiveMode::TimeAttack(m) => m,
        }
    }
}

impl ModeSession for ActiveMode {
    fn kind(&self) -> ModeKind {
        self.session().kind()
    }

    fn is_active(&self) -> bool {
        self.session().is_active()
    }

    fn seed(&self) -> u64 {
        self.session().seed()
    }

    fn update(&mut self, input: &TickInput) {
        self.session_mut().update(input);
    }

    fn finalize(&mut self) -> Option<RunReport> {
        self.session_mut().finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::MemoryStore;
    use std::cell::RefCell;

    fn context(seed: u64) -> ModeContext {
        let settings = Settings {
            seed: Some(seed),
            ..Settings::default()
        };
        ModeContext::with_settings(
            Rc::new(RefCell::new(MemoryStore::new())),
            Rc::new(ManualClock::new(0.0)),
            settings,
        )
    }

    #[test]
    fn test_active_mode_delegates() {
        let ctx = context(7);
        let mut mode = ActiveMode::Horde(HordeMode::start(&ctx));
        assert_eq!(mode.kind(), ModeKind::Horde);
        assert!(mode.is_active());
        assert_eq!(mode.seed(), 7);

        mode.update(&TickInput {
            dt: 1.0 / 60.0,
            player: None,
        });
        let report = mode.finalize();
        assert!(matches!(report, Some(RunReport::Horde(_))));
        assert!(!mode.is_active());
        assert!(mode.finalize().is_none());
    }

    #[test]
    fn test_configured_seed_is_reused() {
        let ctx = context(99);
        assert_eq!(ctx.session_seed(), 99);
        let (seed, _) = ctx.session_rng();
        assert_eq!(seed, 99);
    }

    #[test]
    fn test_context_loads_saved_settings() {
        let store: SharedStore = Rc::new(RefCell::new(MemoryStore::new()));
        let records = Records::new(Rc::clone(&store));
        let settings = Settings {
            seed: Some(5),
            ..Settings::default()
        };
        settings.save(&records);

        let ctx = ModeContext::new(store, Rc::new(ManualClock::new(0.0)));
        assert_eq!(ctx.settings.seed, Some(5));
    }
}
