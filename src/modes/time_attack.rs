//! Time Attack mode: timed level runs with medals and ghost replay
//!
//! Elapsed time is wall-clock time since start minus paused time. A ghost
//! of the run is recorded while the clock runs and replaces the stored one
//! only when the run sets a new best.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use super::ghost::{self, GhostRecorder, GhostSample, PlayerPose};
use super::{ModeContext, ModeKind, ModeSession, RunReport, TickInput};
use crate::clock::Clock;
use crate::medals::{Medal, MedalThresholds, StyleBonus, StyleScore};
use crate::persistence::{Records, keys};

/// Stored ghosts, by level
pub type GhostTable = BTreeMap<u32, Vec<GhostSample>>;

/// Result of stopping a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeAttackResult {
    pub completed: bool,
    pub level: u32,
    pub time: f64,
    /// None for runs that were not completed
    pub medal: Option<Medal>,
    pub is_new_best: bool,
    /// Style breakdown, completed runs only
    pub style: Option<StyleScore>,
    pub ghost_saved: bool,
}

/// A timed run of one level
pub struct TimeAttackMode {
    records: Records,
    clock: Rc<dyn Clock>,
    medals: MedalThresholds,
    seed: u64,
    level: u32,

    active: bool,
    start_time: f64,
    paused_at: Option<f64>,
    paused_total: f64,
    /// Frozen elapsed time once stopped
    final_time: Option<f64>,

    recorder: GhostRecorder,
    style: StyleBonus,

    best_time: Option<f64>,
    ghost: Vec<GhostSample>,
}

impl TimeAttackMode {
    pub fn start(ctx: &ModeContext, level: u32) -> Self {
        let records = ctx.records.for_session();
        let rules = ctx.settings.time_attack;
        let best_times: BTreeMap<u32, f64> = records.load(keys::TIME_ATTACK_BEST_TIMES);
        let mut ghosts: GhostTable = records.load(keys::TIME_ATTACK_GHOSTS);
        let ghost = ghosts.remove(&level).unwrap_or_default();
        let best_time = best_times.get(&level).copied();

        if !rules.medals.is_ordered() {
            log::warn!("Medal thresholds are not strictly ordered: {:?}", rules.medals);
        }
        log::info!(
            "Time Attack level {level} started (best {:?}, ghost {} samples)",
            best_time,
            ghost.len()
        );

        Self {
            records,
            clock: Rc::clone(&ctx.clock),
            medals: rules.medals,
            seed: ctx.session_seed(),
            level,
            active: true,
            start_time: ctx.now(),
            paused_at: None,
            paused_total: 0.0,
            final_time: None,
            recorder: GhostRecorder::new(rules.sample_interval, rules.max_samples),
            style: StyleBonus::default(),
            best_time,
            ghost,
        }
    }

    /// Record the player's pose for this frame
    pub fn record_pose(&mut self, pose: PlayerPose) {
        if !self.active || self.paused_at.is_some() {
            return;
        }
        let time = self.elapsed();
        self.recorder.record(time, pose);
    }

    /// Freeze the clock. No-op if already paused or stopped.
    pub fn pause(&mut self) {
        if self.active && self.paused_at.is_none() {
            self.paused_at = Some(self.clock.now_secs());
        }
    }

    /// Restart the clock. No-op if not paused.
    pub fn resume(&mut self) {
        if let Some(at) = self.paused_at.take() {
            self.paused_total += self.clock.now_secs() - at;
        }
    }

    pub fn track_damage(&mut self) {
        if self.active {
            self.style.track_damage();
        }
    }

    pub fn track_ranged_kill(&mut self) {
        if self.active {
            self.style.track_ranged_kill();
        }
    }

    pub fn track_combo(&mut self, combo: u32) {
        if self.active {
            self.style.track_combo(combo);
        }
    }

    /// End the run
    pub fn stop(&mut self, completed: bool) -> Option<TimeAttackResult> {
        if !self.active {
            return None;
        }
        let time = self.elapsed();
        self.final_time = Some(time);
        self.active = false;

        if !completed {
            log::info!("Time Attack level {} stopped at {:.2}s", self.level, time);
            return Some(TimeAttackResult {
                completed: false,
                level: self.level,
                time,
                medal: None,
                is_new_best: false,
                style: None,
                ghost_saved: false,
            });
        }

        let medal = self.medals.medal_for(time);
        let is_new_best = self.best_time.is_none_or(|best| time < best);
        let mut ghost_saved = false;
        if is_new_best {
            self.best_time = Some(time);
            let mut best_times: BTreeMap<u32, f64> = self.records.load(keys::TIME_ATTACK_BEST_TIMES);
            best_times.insert(self.level, time);
            self.records.save(keys::TIME_ATTACK_BEST_TIMES, &best_times);
            ghost_saved = self.save_ghost();
        }

        log::info!(
            "Time Attack level {} finished in {:.2}s ({}){}",
            self.level,
            time,
            medal.as_str(),
            if is_new_best { ", new best" } else { "" }
        );

        Some(TimeAttackResult {
            completed: true,
            level: self.level,
            time,
            medal: Some(medal),
            is_new_best,
            style: Some(self.style.score()),
            ghost_saved,
        })
    }

    fn save_ghost(&mut self) -> bool {
        let samples = self.recorder.samples().to_vec();
        let mut ghosts: GhostTable = self.records.load(keys::TIME_ATTACK_GHOSTS);
        ghosts.insert(self.level, samples.clone());
        let saved = self.records.save(keys::TIME_ATTACK_GHOSTS, &ghosts);
        self.ghost = samples;
        saved
    }

    // === HUD accessors ===

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Run time in seconds, excluding pauses
    pub fn elapsed(&self) -> f64 {
        if let Some(time) = self.final_time {
            return time;
        }
        let now = self.paused_at.unwrap_or_else(|| self.clock.now_secs());
        (now - self.start_time - self.paused_total).max(0.0)
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn best_time(&self) -> Option<f64> {
        self.best_time
    }

    pub fn medal_thresholds(&self) -> MedalThresholds {
        self.medals
    }

    /// Medal the run would earn if it finished now
    pub fn pace_medal(&self) -> Medal {
        self.medals.medal_for(self.elapsed())
    }

    pub fn style(&self) -> StyleBonus {
        self.style
    }

    pub fn samples_recorded(&self) -> usize {
        self.recorder.len()
    }

    pub fn recorded_samples(&self) -> &[GhostSample] {
        self.recorder.samples()
    }

    pub fn has_ghost(&self) -> bool {
        !self.ghost.is_empty()
    }

    /// Stored ghost frame for run time `time` (holds the last frame)
    pub fn ghost_sample_at(&self, time: f64) -> Option<&GhostSample> {
        ghost::sample_at(&self.ghost, time)
    }

    pub fn ghost_pose_at(&self, time: f64) -> Option<PlayerPose> {
        self.ghost_sample_at(time).map(GhostSample::pose)
    }
}

impl ModeSession for TimeAttackMode {
    fn kind(&self) -> ModeKind {
        ModeKind::TimeAttack
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    fn update(&mut self, input: &TickInput) {
        if let Some(pose) = input.player {
            self.record_pose(pose);
        }
    }

    fn finalize(&mut self) -> Option<RunReport> {
        self.stop(false).map(RunReport::TimeAttack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persistence::MemoryStore;
    use crate::settings::Settings;
    use std::cell::RefCell;

    fn setup() -> (ModeContext, ManualClock, Rc<RefCell<MemoryStore>>) {
        let store = Rc::new(RefCell::new(MemoryStore::new()));
        let clock = ManualClock::new(1000.0);
        let settings = Settings {
            seed: Some(4),
            ..Settings::default()
        };
        let ctx = ModeContext::with_settings(store.clone(), Rc::new(clock.clone()), settings);
        (ctx, clock, store)
    }

    fn drive(mode: &mut TimeAttackMode, clock: &ManualClock, secs: f64) {
        let frames = (secs * 60.0).round() as usize;
        for frame in 0..frames {
            clock.advance(1.0 / 60.0);
            mode.update(&TickInput {
                dt: 1.0 / 60.0,
                player: Some(PlayerPose::new(frame as f32, 0.0, 0.0)),
            });
        }
    }

    #[test]
    fn test_pause_excluded_and_idempotent() {
        let (ctx, clock, _store) = setup();
        let mut mode = TimeAttackMode::start(&ctx, 1);
        clock.advance(10.0);
        mode.pause();
        clock.advance(5.0);
        mode.pause();
        clock.advance(5.0);
        assert!((mode.elapsed() - 10.0).abs() < 1e-9);
        mode.resume();
        mode.resume();
        clock.advance(2.0);
        assert!((mode.elapsed() - 12.0).abs() < 1e-9);
        assert!(!mode.is_paused());
    }

    #[test]
    fn test_no_samples_while_paused() {
        let (ctx, clock, _store) = setup();
        let mut mode = TimeAttackMode::start(&ctx, 1);
        drive(&mut mode, &clock, 1.0);
        let before = mode.samples_recorded();
        mode.pause();
        drive(&mut mode, &clock, 1.0);
        assert_eq!(mode.samples_recorded(), before);
    }

    #[test]
    fn test_medal_boundaries() {
        for (secs, medal) in [
            (180.0, Medal::Gold),
            (180.01, Medal::Silver),
            (480.01, Medal::None),
        ] {
            let (ctx, clock, _store) = setup();
            let mut mode = TimeAttackMode::start(&ctx, 2);
            clock.advance(secs);
            let result = mode.stop(true).unwrap();
            assert_eq!(result.medal, Some(medal), "at {secs}s");
        }
    }

    #[test]
    fn test_incomplete_run_touches_nothing() {
        let (ctx, clock, store) = setup();
        let mut mode = TimeAttackMode::start(&ctx, 3);
        drive(&mut mode, &clock, 2.0);
        let result = mode.stop(false).unwrap();
        assert!(!result.completed);
        assert!(result.medal.is_none());
        assert!(store.borrow().is_empty());
        assert!(mode.stop(true).is_none());
    }

    #[test]
    fn test_ghost_saved_only_on_new_best() {
        let (ctx, clock, store) = setup();

        let mut first = TimeAttackMode::start(&ctx, 4);
        drive(&mut first, &clock, 3.0);
        let result = first.stop(true).unwrap();
        assert!(result.is_new_best);
        assert!(result.ghost_saved);
        let saved = first.recorded_samples().len();

        let mut slower = TimeAttackMode::start(&ctx, 4);
        assert!(slower.has_ghost());
        drive(&mut slower, &clock, 5.0);
        let result = slower.stop(true).unwrap();
        assert!(!result.is_new_best);
        assert!(!result.ghost_saved);

        let ghosts: GhostTable =
            serde_json::from_value(store.borrow().raw(keys::TIME_ATTACK_GHOSTS).unwrap().clone())
                .unwrap();
        assert_eq!(ghosts[&4].len(), saved);
    }

    #[test]
    fn test_ghost_playback_holds_last_frame() {
        let (ctx, clock, _store) = setup();
        let mut first = TimeAttackMode::start(&ctx, 5);
        drive(&mut first, &clock, 1.0);
        first.stop(true);

        let replay = TimeAttackMode::start(&ctx, 5);
        let last = replay.ghost_sample_at(1_000.0).unwrap();
        let end = replay.ghost_sample_at(0.95).unwrap();
        assert_eq!(last, end);
        let early = replay.ghost_sample_at(0.0).unwrap();
        assert!(early.time <= 0.1);
    }

    #[test]
    fn test_style_reported_individually() {
        let (ctx, clock, _store) = setup();
        let mut mode = TimeAttackMode::start(&ctx, 6);
        mode.track_combo(14);
        mode.track_ranged_kill();
        clock.advance(100.0);
        let style = mode.stop(true).unwrap().style.unwrap();
        assert_eq!(style.no_damage, 1000);
        assert_eq!(style.melee_only, 0);
        assert_eq!(style.combo, 700);
        assert_eq!(style.total, 1700);
    }
}
