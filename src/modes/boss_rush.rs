//! Boss Rush mode: a fixed gauntlet of boss encounters
//!
//! The encounter order and the reward queue are rolled once at start.
//! Each defeat appends to the history and either hands back the next boss
//! with a power-up, or closes the run.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::{ModeContext, ModeKind, ModeSession, Progress, RunReport, TickInput};
use crate::clock::Clock;
use crate::entity::{Combatant, PlayerCombatant};
use crate::medals::Reward;
use crate::persistence::{Records, keys};
use crate::settings::DifficultyTier;

/// A boss in the gauntlet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BossEntry {
    pub id: u32,
    pub name: &'static str,
}

/// The gauntlet, in default order
pub const BOSS_CATALOG: [BossEntry; 4] = [
    BossEntry { id: 0, name: "Iron Warden" },
    BossEntry { id: 1, name: "Hydra Queen" },
    BossEntry { id: 2, name: "Molten Colossus" },
    BossEntry { id: 3, name: "Lich King" },
];

/// Power-ups handed out between fights
pub const POWER_UPS: [Reward; 6] = [
    Reward::power_up(0, "Damage Up"),
    Reward::power_up(1, "Speed Up"),
    Reward::power_up(2, "Max Health Up"),
    Reward::power_up(3, "Fire Rate Up"),
    Reward::power_up(4, "Shield"),
    Reward::power_up(5, "Life Steal"),
];

pub fn boss_by_id(id: u32) -> Option<&'static BossEntry> {
    BOSS_CATALOG.iter().find(|b| b.id == id)
}

/// One cleared encounter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EncounterRecord {
    pub boss_id: u32,
    pub order: u32,
    pub elapsed_seconds: f64,
}

/// A boss fell and another one is up
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionResult {
    pub completed: bool,
    pub boss_time: f64,
    pub is_new_best: bool,
    pub next_boss_id: u32,
    pub power_up: Option<Reward>,
    /// Fraction of max health the host restores before the next fight
    pub health_refill_percent: f64,
    pub screen_shake: bool,
}

/// The final boss fell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionResult {
    pub completed: bool,
    pub total_time: f64,
    pub encounter_history: Vec<EncounterRecord>,
    pub is_new_best: bool,
    pub difficulty_multiplier: f64,
    pub screen_shake: bool,
}

/// Result of `boss_defeated`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BossRushOutcome {
    Transition(TransitionResult),
    Completed(CompletionResult),
}

impl BossRushOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, BossRushOutcome::Completed(_))
    }
}

/// Report for a finalized session
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BossRushSummary {
    pub completed: bool,
    pub bosses_defeated: u32,
    pub total_time: f64,
    pub difficulty_multiplier: f64,
}

/// A boss gauntlet session
pub struct BossRushMode {
    records: Records,
    clock: Rc<dyn Clock>,
    seed: u64,
    health_refill_percent: f64,
    screen_shake: bool,
    difficulty_multiplier: f64,

    active: bool,
    start_time: f64,
    encounter_start: f64,
    order: Vec<u32>,
    index: usize,
    rewards: VecDeque<Reward>,
    history: Vec<EncounterRecord>,

    unlocked: Vec<u32>,
    best_total: Option<f64>,
    best_times: BTreeMap<u32, f64>,
}

impl BossRushMode {
    /// Start a gauntlet at `start_index` of the catalog
    pub fn start(
        ctx: &ModeContext,
        start_index: usize,
        difficulty_tier: usize,
        randomize_order: bool,
    ) -> Self {
        let records = ctx.records.for_session();
        let (seed, mut rng) = ctx.session_rng();

        let start_index = if start_index < BOSS_CATALOG.len() {
            start_index
        } else {
            log::warn!("Boss Rush start index {start_index} out of range, starting at 0");
            0
        };
        let mut order: Vec<u32> = BOSS_CATALOG[start_index..].iter().map(|b| b.id).collect();
        if randomize_order {
            order.shuffle(&mut rng);
        }

        let rewards: VecDeque<Reward> = (1..order.len())
            .map(|_| POWER_UPS[rng.random_range(0..POWER_UPS.len())])
            .collect();

        let difficulty_multiplier = DifficultyTier::multiplier_for_index(difficulty_tier);
        let now = ctx.now();

        log::info!(
            "Boss Rush started: {} bosses, x{} difficulty, order {:?}",
            order.len(),
            difficulty_multiplier,
            order
        );

        Self {
            unlocked: records.load(keys::BOSS_RUSH_UNLOCKED),
            best_total: records.load(keys::BOSS_RUSH_BEST_TOTAL),
            best_times: records.load(keys::BOSS_RUSH_BEST_TIMES),
            records,
            clock: Rc::clone(&ctx.clock),
            seed,
            health_refill_percent: ctx.settings.boss_rush.health_refill_percent,
            screen_shake: ctx.settings.effective_screen_shake(),
            difficulty_multiplier,
            active: true,
            start_time: now,
            encounter_start: now,
            order,
            index: 0,
            rewards,
            history: Vec::new(),
        }
    }

    /// Record a defeated boss. Ids other than the scheduled boss are ignored.
    pub fn boss_defeated(&mut self, boss_id: u32) -> Option<BossRushOutcome> {
        if !self.active {
            return None;
        }

        let expected = self.order.get(self.index).copied();
        if expected != Some(boss_id) {
            log::warn!("Ignoring defeat of boss {boss_id}, expected {expected:?}");
            return None;
        }

        let now = self.clock.now_secs();
        let boss_time = now - self.encounter_start;

        self.history.push(EncounterRecord {
            boss_id,
            order: self.index as u32,
            elapsed_seconds: boss_time,
        });

        let is_new_best = self
            .best_times
            .get(&boss_id)
            .is_none_or(|&best| boss_time < best);
        if is_new_best {
            self.best_times.insert(boss_id, boss_time);
            self.records.save(keys::BOSS_RUSH_BEST_TIMES, &self.best_times);
        }

        self.index += 1;
        self.encounter_start = now;

        if let Some(&next_boss_id) = self.order.get(self.index) {
            let power_up = self.rewards.pop_front();
            log::info!(
                "Boss {boss_id} down in {boss_time:.1}s, next {next_boss_id}, power-up {:?}",
                power_up.map(|r| r.name)
            );
            return Some(BossRushOutcome::Transition(TransitionResult {
                completed: false,
                boss_time,
                is_new_best,
                next_boss_id,
                power_up,
                health_refill_percent: self.health_refill_percent,
                screen_shake: self.screen_shake,
            }));
        }

        Some(BossRushOutcome::Completed(self.complete(now)))
    }

    fn complete(&mut self, now: f64) -> CompletionResult {
        self.active = false;
        let total_time = now - self.start_time;

        let is_new_best = self.best_total.is_none_or(|best| total_time < best);
        if is_new_best {
            self.best_total = Some(total_time);
            self.records.save(keys::BOSS_RUSH_BEST_TOTAL, &self.best_total);
        }

        let mut changed = false;
        for record in &self.history {
            if !self.unlocked.contains(&record.boss_id) {
                self.unlocked.push(record.boss_id);
                changed = true;
            }
        }
        if changed {
            self.records.save(keys::BOSS_RUSH_UNLOCKED, &self.unlocked);
        }

        log::info!(
            "Boss Rush complete in {total_time:.1}s{}",
            if is_new_best { " (new best)" } else { "" }
        );

        CompletionResult {
            completed: true,
            total_time,
            encounter_history: self.history.clone(),
            is_new_best,
            difficulty_multiplier: self.difficulty_multiplier,
            screen_shake: self.screen_shake,
        }
    }

    /// Give up mid-run. Per-boss bests already recorded are kept.
    pub fn abandon(&mut self) -> Option<BossRushSummary> {
        if !self.active {
            return None;
        }
        self.active = false;
        let summary = BossRushSummary {
            completed: false,
            bosses_defeated: self.history.len() as u32,
            total_time: self.elapsed(),
            difficulty_multiplier: self.difficulty_multiplier,
        };
        log::info!("Boss Rush abandoned after {} bosses", summary.bosses_defeated);
        Some(summary)
    }

    /// Restart the encounter timer when the next fight actually begins
    pub fn begin_encounter(&mut self) {
        if self.active {
            self.encounter_start = self.clock.now_secs();
        }
    }

    /// Scale a freshly spawned boss by the session difficulty
    pub fn apply_difficulty_to_boss<B: Combatant + ?Sized>(&self, boss: &mut B) {
        let m = self.difficulty_multiplier;
        let vitals = boss.vitals_mut();
        vitals.max_health *= m;
        vitals.health *= m;
        *boss.damage_mut() *= m;
    }

    /// Apply the between-fight health refill
    pub fn refill_between_fights<P: PlayerCombatant + ?Sized>(&self, player: &mut P) {
        player.vitals_mut().refill(self.health_refill_percent);
    }

    // === HUD accessors ===

    pub fn current_boss(&self) -> Option<&'static BossEntry> {
        if !self.active {
            return None;
        }
        self.order.get(self.index).and_then(|&id| boss_by_id(id))
    }

    /// Bosses defeated out of the gauntlet length
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.index as u32,
            total: self.order.len() as u32,
        }
    }

    pub fn encounter_order(&self) -> &[u32] {
        &self.order
    }

    pub fn history(&self) -> &[EncounterRecord] {
        &self.history
    }

    pub fn upcoming_reward(&self) -> Option<&Reward> {
        self.rewards.front()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.now_secs() - self.start_time
    }

    pub fn encounter_elapsed(&self) -> f64 {
        self.clock.now_secs() - self.encounter_start
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        self.difficulty_multiplier
    }

    pub fn best_total_time(&self) -> Option<f64> {
        self.best_total
    }

    pub fn best_boss_time(&self, boss_id: u32) -> Option<f64> {
        self.best_times.get(&boss_id).copied()
    }

    pub fn unlocked_bosses(&self) -> &[u32] {
        &self.unlocked
    }

    pub fn is_boss_unlocked(&self, boss_id: u32) -> bool {
        self.unlocked.contains(&boss_id)
    }
}

impl ModeSession for BossRushMode {
    fn kind(&self) -> ModeKind {
        ModeKind::BossRush
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    // Encounter timers are read passively from the clock
    fn update(&mut self, _input: &TickInput) {}

    fn finalize(&mut self) -> Option<RunReport> {
        self.abandon().map(RunReport::BossRush)
    }
}
