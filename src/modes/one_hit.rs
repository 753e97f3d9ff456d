//! One-Hit mode: every entity dies to a single hit
//!
//! The overlay transforms are applied once, when the host creates an
//! entity. The session tracks levels and kills, keeps the best run record
//! and walks the reward ladder.

use std::rc::Rc;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{ModeContext, ModeKind, ModeSession, Progress, RunReport, TickInput};
use crate::clock::Clock;
use crate::entity::{Combatant, PickupKind, PlayerCombatant};
use crate::medals::Reward;
use crate::persistence::{Records, keys};
use crate::settings::OneHitRules;

/// Rewards unlocked by completing levels 1..=10
pub const REWARD_LADDER: [Reward; 10] = [
    Reward::unlock(1, "Glass Blade"),
    Reward::unlock(2, "Featherweight Boots"),
    Reward::unlock(3, "Last Breath Charm"),
    Reward::unlock(4, "Phantom Cloak"),
    Reward::unlock(5, "Razor Edge"),
    Reward::unlock(6, "Ghost Step"),
    Reward::unlock(7, "Executioner Perk"),
    Reward::unlock(8, "Bone Crown"),
    Reward::unlock(9, "Reaper Skin"),
    Reward::unlock(10, "Deathless Title"),
];

/// Reward for completing `level`, if the ladder has one
pub fn reward_for_level(level: u32) -> Option<Reward> {
    let index = level.checked_sub(1)? as usize;
    REWARD_LADDER.get(index).copied()
}

/// Force a player to one hit point with no healing
pub fn apply_to_player<P: PlayerCombatant + ?Sized>(player: &mut P) {
    let vitals = player.vitals_mut();
    vitals.max_health = 1.0;
    vitals.health = 1.0;
    player.set_healing_enabled(false);
}

/// Force an enemy to one hit point
pub fn apply_to_enemy<E: Combatant + ?Sized>(enemy: &mut E) {
    let vitals = enemy.vitals_mut();
    vitals.max_health = 1.0;
    vitals.health = 1.0;
}

/// Substitute a pickup for One-Hit rules
///
/// Healing never drops: it becomes the ghost-mode power-up on a successful
/// roll and ammo otherwise. Anything else gets the same ghost-mode roll.
pub fn modify_pickup_type<R: Rng>(
    original: PickupKind,
    ghost_mode_chance: f64,
    rng: &mut R,
) -> PickupKind {
    let ghost = rng.random_bool(ghost_mode_chance.clamp(0.0, 1.0));
    if ghost {
        return PickupKind::GhostMode;
    }
    if original.is_healing() {
        // TODO: confirm with design whether a failed roll on healing should drop nothing instead of ammo
        PickupKind::Ammo
    } else {
        original
    }
}

/// Persisted best run, ranked by levels completed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestRun {
    pub levels: u32,
    pub kills: u32,
    pub time: f64,
}

/// Result of completing a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelResult {
    pub level: u32,
    pub levels_completed: u32,
    /// Newly unlocked reward (None if already owned or off the ladder)
    pub reward: Option<Reward>,
    pub is_new_best: bool,
    /// Final level cleared, the run is over
    pub victory: bool,
}

/// Report when the run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OneHitSummary {
    pub levels_completed: u32,
    pub kills: u32,
    pub time: f64,
    pub is_new_best: bool,
    pub victory: bool,
}

/// A permadeath session
pub struct OneHitMode {
    records: Records,
    clock: Rc<dyn Clock>,
    rules: OneHitRules,
    seed: u64,
    rng: Pcg32,

    active: bool,
    start_time: f64,
    levels_completed: u32,
    kills: u32,
    /// Best-run replaced at least once this session
    new_best: bool,

    best_run: Option<BestRun>,
    unlocked: Vec<u32>,
}

impl OneHitMode {
    pub fn start(ctx: &ModeContext) -> Self {
        let records = ctx.records.for_session();
        let (seed, rng) = ctx.session_rng();
        let best_run: Option<BestRun> = records.load(keys::ONE_HIT_BEST_RUN);
        let unlocked: Vec<u32> = records.load(keys::ONE_HIT_UNLOCKED_REWARDS);

        log::info!(
            "One-Hit started (best {} levels, {} rewards unlocked)",
            best_run.map_or(0, |b| b.levels),
            unlocked.len()
        );

        Self {
            records,
            clock: Rc::clone(&ctx.clock),
            rules: ctx.settings.one_hit,
            seed,
            rng,
            active: true,
            start_time: ctx.now(),
            levels_completed: 0,
            kills: 0,
            new_best: false,
            best_run,
            unlocked,
        }
    }

    pub fn apply_to_player<P: PlayerCombatant + ?Sized>(&self, player: &mut P) {
        apply_to_player(player);
    }

    pub fn apply_to_enemy<E: Combatant + ?Sized>(&self, enemy: &mut E) {
        apply_to_enemy(enemy);
    }

    /// Pickup substitution using the session RNG
    pub fn modify_pickup_type(&mut self, original: PickupKind) -> PickupKind {
        modify_pickup_type(original, self.rules.ghost_mode_chance, &mut self.rng)
    }

    pub fn enemy_killed(&mut self) {
        if self.active {
            self.kills += 1;
        }
    }

    /// Record a cleared level
    pub fn level_completed(&mut self, level: u32) -> Option<LevelResult> {
        if !self.active {
            return None;
        }

        self.levels_completed += 1;
        let is_new_best = self.check_best_run();
        let reward = self.unlock_reward(level);
        let victory = self.levels_completed >= self.rules.total_levels;
        if victory {
            self.active = false;
            log::info!("One-Hit run won after {} levels", self.levels_completed);
        }

        Some(LevelResult {
            level,
            levels_completed: self.levels_completed,
            reward,
            is_new_best,
            victory,
        })
    }

    /// The player took a hit. Ends the run.
    pub fn player_died(&mut self) -> Option<OneHitSummary> {
        if !self.active {
            return None;
        }
        log::info!("One-Hit run over at level {}", self.levels_completed + 1);
        Some(self.finish())
    }

    /// Leave the run early; it counts like a death
    pub fn quit(&mut self) -> Option<OneHitSummary> {
        if !self.active {
            return None;
        }
        log::info!("One-Hit run abandoned");
        Some(self.finish())
    }

    fn finish(&mut self) -> OneHitSummary {
        self.active = false;
        let improved = self.check_best_run();
        OneHitSummary {
            levels_completed: self.levels_completed,
            kills: self.kills,
            time: self.elapsed(),
            is_new_best: improved || self.new_best,
            victory: false,
        }
    }

    /// Replace the best run if this run completed strictly more levels
    fn check_best_run(&mut self) -> bool {
        let beats = match self.best_run {
            Some(best) => self.levels_completed > best.levels,
            None => self.levels_completed > 0,
        };
        if !beats {
            return false;
        }

        let run = BestRun {
            levels: self.levels_completed,
            kills: self.kills,
            time: self.elapsed(),
        };
        self.best_run = Some(run);
        self.new_best = true;
        self.records.save(keys::ONE_HIT_BEST_RUN, &self.best_run);
        log::info!("New One-Hit best: {} levels", run.levels);
        true
    }

    fn unlock_reward(&mut self, level: u32) -> Option<Reward> {
        let reward = reward_for_level(level)?;
        if self.unlocked.contains(&reward.id) {
            return None;
        }
        self.unlocked.push(reward.id);
        self.records.save(keys::ONE_HIT_UNLOCKED_REWARDS, &self.unlocked);
        log::info!("Reward unlocked: {}", reward.name);
        Some(reward)
    }

    // === HUD accessors ===

    /// Levels cleared out of the run length
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.levels_completed,
            total: self.rules.total_levels,
        }
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.now_secs() - self.start_time
    }

    pub fn best_run(&self) -> Option<BestRun> {
        self.best_run
    }

    pub fn unlocked_rewards(&self) -> &[u32] {
        &self.unlocked
    }
}

impl ModeSession for OneHitMode {
    fn kind(&self) -> ModeKind {
        ModeKind::OneHit
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    // Terminal events come from gameplay hooks
    fn update(&mut self, _input: &TickInput) {}

    fn finalize(&mut self) -> Option<RunReport> {
        self.quit().map(RunReport::OneHit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::entity::{Enemy, Player};
    use crate::persistence::MemoryStore;
    use crate::settings::Settings;
    use rand::SeedableRng;
    use std::cell::RefCell;

    fn setup() -> (ModeContext, ManualClock) {
        let clock = ManualClock::new(0.0);
        let settings = Settings {
            seed: Some(21),
            ..Settings::default()
        };
        let ctx = ModeContext::with_settings(
            Rc::new(RefCell::new(MemoryStore::new())),
            Rc::new(clock.clone()),
            settings,
        );
        (ctx, clock)
    }

    #[test]
    fn test_apply_to_player_forces_one_hp() {
        let mut player = Player::new(250.0);
        player.vitals.health = 90.0;
        apply_to_player(&mut player);
        assert_eq!(player.vitals.max_health, 1.0);
        assert_eq!(player.vitals.health, 1.0);
        assert!(!player.healing_enabled);

        let mut enemy = Enemy::new(500.0, 12.0);
        apply_to_enemy(&mut enemy);
        assert_eq!(enemy.vitals.max_health, 1.0);
        assert_eq!(enemy.vitals.health, 1.0);
        assert_eq!(enemy.damage, 12.0);
    }

    #[test]
    fn test_healing_pickups_never_survive() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut ghosts = 0;
        for _ in 0..1000 {
            let kind = modify_pickup_type(PickupKind::Health, 0.2, &mut rng);
            assert!(matches!(kind, PickupKind::GhostMode | PickupKind::Ammo));
            if kind == PickupKind::GhostMode {
                ghosts += 1;
            }
        }
        // ~20% with generous slack
        assert!((120..=280).contains(&ghosts), "ghosts = {ghosts}");
    }

    #[test]
    fn test_other_pickups_kept_or_ghosted() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..200 {
            let kind = modify_pickup_type(PickupKind::Armor, 0.2, &mut rng);
            assert!(matches!(kind, PickupKind::Armor | PickupKind::GhostMode));
        }
        assert_eq!(
            modify_pickup_type(PickupKind::MegaHealth, 1.0, &mut rng),
            PickupKind::GhostMode
        );
        assert_eq!(
            modify_pickup_type(PickupKind::MegaHealth, 0.0, &mut rng),
            PickupKind::Ammo
        );
    }

    #[test]
    fn test_death_beats_shorter_best_run() {
        let (ctx, clock) = setup();
        let mut first = OneHitMode::start(&ctx);
        first.level_completed(1);
        clock.advance(10.0);
        let summary = first.player_died().unwrap();
        assert_eq!(summary.levels_completed, 1);
        assert!(summary.is_new_best);

        let mut second = OneHitMode::start(&ctx);
        assert_eq!(second.best_run().unwrap().levels, 1);
        second.enemy_killed();
        second.level_completed(1);
        let result = second.level_completed(2).unwrap();
        assert!(result.is_new_best);
        second.player_died();

        let third = OneHitMode::start(&ctx);
        let best = third.best_run().unwrap();
        assert_eq!(best.levels, 2);
        assert_eq!(best.kills, 1);
    }

    #[test]
    fn test_equal_levels_do_not_replace_best() {
        let (ctx, _clock) = setup();
        let mut first = OneHitMode::start(&ctx);
        first.enemy_killed();
        first.level_completed(1);
        first.player_died();

        let mut second = OneHitMode::start(&ctx);
        for _ in 0..5 {
            second.enemy_killed();
        }
        let result = second.level_completed(1).unwrap();
        assert!(!result.is_new_best);
        let summary = second.player_died().unwrap();
        assert!(!summary.is_new_best);
        assert_eq!(second.best_run().unwrap().kills, 1);
    }

    #[test]
    fn test_reward_ladder_unlocks_once() {
        let (ctx, _clock) = setup();
        let mut first = OneHitMode::start(&ctx);
        let result = first.level_completed(1).unwrap();
        assert_eq!(result.reward.map(|r| r.id), Some(1));
        first.player_died();

        let mut second = OneHitMode::start(&ctx);
        let result = second.level_completed(1).unwrap();
        assert!(result.reward.is_none());
        assert_eq!(second.unlocked_rewards(), &[1]);
        assert!(reward_for_level(0).is_none());
        assert!(reward_for_level(11).is_none());
    }

    #[test]
    fn test_final_level_wins_and_closes_session() {
        let (ctx, _clock) = setup();
        let mut mode = OneHitMode::start(&ctx);
        let mut last = None;
        for level in 1..=10 {
            last = mode.level_completed(level);
        }
        let last = last.unwrap();
        assert!(last.victory);
        assert!(!mode.is_active());
        assert!(mode.player_died().is_none());
        assert!(mode.level_completed(11).is_none());
        assert_eq!(mode.unlocked_rewards().len(), 10);
    }
}
