//! Horde mode: endless scaling waves
//!
//! `calculate_wave_config` is a pure function of the wave number, the
//! ruleset and the RNG. `HordeMode` owns the session: kill counting, wave
//! timing, modifier unlocks and the highest-wave record.

use std::collections::BTreeSet;
use std::rc::Rc;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::{ModeContext, ModeKind, ModeSession, Progress, RunReport, TickInput};
use crate::clock::Clock;
use crate::consts::*;
use crate::persistence::{Records, keys};
use crate::settings::HordeRuleset;

/// Rank-and-file enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Grunt,
    Runner,
    Archer,
    Brute,
    Bomber,
    Shielder,
    Sniper,
    Summoner,
    Phantom,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 9] = [
        EnemyKind::Grunt,
        EnemyKind::Runner,
        EnemyKind::Archer,
        EnemyKind::Brute,
        EnemyKind::Bomber,
        EnemyKind::Shielder,
        EnemyKind::Sniper,
        EnemyKind::Summoner,
        EnemyKind::Phantom,
    ];

    /// First wave this type can appear in
    pub fn unlock_wave(&self) -> u32 {
        match self {
            EnemyKind::Grunt | EnemyKind::Runner => 1,
            EnemyKind::Archer => 3,
            EnemyKind::Brute => 5,
            EnemyKind::Bomber => 7,
            EnemyKind::Shielder => 8,
            EnemyKind::Sniper => 10,
            EnemyKind::Summoner => 12,
            EnemyKind::Phantom => 15,
        }
    }
}

/// Horde bosses, cycled every boss wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossKind {
    Warden,
    Hydra,
    Colossus,
    Lich,
}

impl BossKind {
    pub const CYCLE: [BossKind; 4] = [
        BossKind::Warden,
        BossKind::Hydra,
        BossKind::Colossus,
        BossKind::Lich,
    ];
}

/// What the spawner should instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Enemy(EnemyKind),
    Boss(BossKind),
}

/// One unit of a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveEnemy {
    #[serde(rename = "type")]
    pub unit: UnitType,
    pub is_elite: bool,
    pub is_mini_boss: bool,
    pub health_multiplier: f64,
    pub damage_multiplier: f64,
}

impl WaveEnemy {
    pub fn is_boss(&self) -> bool {
        matches!(self.unit, UnitType::Boss(_))
    }
}

/// A wave modifier from the fixed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Modifier {
    pub id: &'static str,
    pub name: &'static str,
    pub unlock_wave: u32,
    pub active: bool,
}

impl Modifier {
    const fn new(id: &'static str, name: &'static str, unlock_wave: u32) -> Self {
        Self {
            id,
            name,
            unlock_wave,
            active: false,
        }
    }
}

/// Modifier catalog, in unlock order
pub const MODIFIERS: [Modifier; 6] = [
    Modifier::new("swift_enemies", "Swift Enemies", 5),
    Modifier::new("armored_foes", "Armored Foes", 10),
    Modifier::new("explosive_deaths", "Explosive Deaths", 15),
    Modifier::new("regeneration", "Regenerating Enemies", 20),
    Modifier::new("vampiric", "Vampiric Strikes", 25),
    Modifier::new("chaos", "Chaos Mode", 30),
];

/// Everything the spawner needs for one wave
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveConfig {
    pub wave_number: u32,
    pub enemies: Vec<WaveEnemy>,
    /// Health/damage factor for rank-and-file units
    pub scaling: f64,
    pub elite_chance: f64,
    pub has_boss: bool,
    pub has_mini_boss: bool,
    pub active_modifier_ids: BTreeSet<String>,
}

impl WaveConfig {
    pub fn total_enemies(&self) -> u32 {
        self.enemies.len() as u32
    }
}

/// `1 + wave × rate`
pub fn difficulty_scale(wave: u32, rules: &HordeRuleset) -> f64 {
    1.0 + f64::from(wave) * rules.wave_scaling_rate
}

/// Linear elite ramp between the start and max waves, 0 before it
pub fn elite_chance(wave: u32, rules: &HordeRuleset) -> f64 {
    if wave < rules.elite_start_wave {
        return 0.0;
    }
    if wave >= rules.elite_max_wave || rules.elite_max_wave <= rules.elite_start_wave {
        return rules.elite_chance_max;
    }
    let span = f64::from(rules.elite_max_wave - rules.elite_start_wave);
    let t = f64::from(wave - rules.elite_start_wave) / span;
    rules.elite_chance_start + t * (rules.elite_chance_max - rules.elite_chance_start)
}

/// Rank-and-file units in a wave
pub fn base_enemy_count(wave: u32) -> u32 {
    BASE_ENEMY_COUNT + (f64::from(wave) * ENEMIES_PER_WAVE).floor() as u32
}

pub fn is_boss_wave(wave: u32, rules: &HordeRuleset) -> bool {
    rules.boss_interval > 0 && wave >= rules.boss_interval && wave % rules.boss_interval == 0
}

pub fn is_mini_boss_wave(wave: u32, rules: &HordeRuleset) -> bool {
    rules.mini_boss_interval > 0
        && wave >= rules.mini_boss_interval
        && wave % rules.mini_boss_interval == 0
        && !is_boss_wave(wave, rules)
}

/// Boss identity for a boss wave
pub fn boss_for_wave(wave: u32, rules: &HordeRuleset) -> BossKind {
    let cycle = (wave / rules.boss_interval.max(1)).saturating_sub(1) as usize;
    BossKind::CYCLE[cycle % BossKind::CYCLE.len()]
}

/// Whether the vendor opens after `wave`
pub fn offers_shop(wave: u32, rules: &HordeRuleset) -> bool {
    rules.shop_between_waves && wave > 1 && !is_boss_wave(wave, rules)
}

/// Enemy types eligible in `wave` (grows monotonically)
pub fn eligible_enemies(wave: u32) -> Vec<EnemyKind> {
    EnemyKind::ALL
        .iter()
        .copied()
        .filter(|kind| kind.unlock_wave() <= wave)
        .collect()
}

/// Catalog modifier ids unlocked by `wave`
pub fn unlocked_modifier_ids(wave: u32) -> BTreeSet<String> {
    MODIFIERS
        .iter()
        .filter(|m| m.unlock_wave <= wave)
        .map(|m| m.id.to_string())
        .collect()
}

/// Build the composition of `wave`
pub fn calculate_wave_config<R: Rng>(wave: u32, rules: &HordeRuleset, rng: &mut R) -> WaveConfig {
    let wave = wave.max(1);
    let scaling = difficulty_scale(wave, rules);
    let elite = elite_chance(wave, rules).clamp(0.0, 1.0);
    let pool = eligible_enemies(wave);

    let count = base_enemy_count(wave);
    let mut enemies = Vec::with_capacity(count as usize + 1);
    for _ in 0..count {
        let kind = pool[rng.random_range(0..pool.len())];
        enemies.push(WaveEnemy {
            unit: UnitType::Enemy(kind),
            is_elite: rng.random_bool(elite),
            is_mini_boss: false,
            health_multiplier: scaling,
            damage_multiplier: scaling,
        });
    }

    let has_boss = is_boss_wave(wave, rules);
    let has_mini_boss = is_mini_boss_wave(wave, rules);

    if has_mini_boss {
        let kind = pool[rng.random_range(0..pool.len())];
        enemies.push(WaveEnemy {
            unit: UnitType::Enemy(kind),
            is_elite: false,
            is_mini_boss: true,
            health_multiplier: scaling * MINI_BOSS_HEALTH_FACTOR,
            damage_multiplier: scaling * MINI_BOSS_DAMAGE_FACTOR,
        });
    }

    if has_boss {
        enemies.push(WaveEnemy {
            unit: UnitType::Boss(boss_for_wave(wave, rules)),
            is_elite: false,
            is_mini_boss: false,
            health_multiplier: scaling * BOSS_HEALTH_FACTOR,
            damage_multiplier: scaling * BOSS_DAMAGE_FACTOR,
        });
    }

    WaveConfig {
        wave_number: wave,
        enemies,
        scaling,
        elite_chance: elite,
        has_boss,
        has_mini_boss,
        active_modifier_ids: unlocked_modifier_ids(wave),
    }
}

/// Returned when the last enemy of a wave dies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaveCompletion {
    pub wave: u32,
    /// Seconds from wave start to the final kill
    pub wave_time: f64,
    pub is_new_record: bool,
    pub offers_shop: bool,
    pub screen_shake: bool,
}

/// Returned when the session ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HordeSummary {
    pub final_wave: u32,
    pub total_kills: u32,
    pub total_time: f64,
    /// Reached wave beats the record held when the session started
    pub is_new_record: bool,
}

/// An endless-wave session
pub struct HordeMode {
    records: Records,
    clock: Rc<dyn Clock>,
    rules: HordeRuleset,
    screen_shake: bool,
    seed: u64,
    rng: Pcg32,

    active: bool,
    start_time: f64,
    wave: u32,
    wave_start_time: f64,
    wave_kills: u32,
    wave_total: u32,
    wave_complete: bool,
    total_kills: u32,
    highest_wave: u32,
    highest_at_start: u32,
    modifiers: Vec<Modifier>,
    current: WaveConfig,
}

impl HordeMode {
    /// Start a session and generate wave 1
    pub fn start(ctx: &ModeContext) -> Self {
        let records = ctx.records.for_session();
        let highest_wave: u32 = records.load(keys::HORDE_HIGHEST_WAVE);
        let (seed, rng) = ctx.session_rng();
        let now = ctx.now();

        log::info!("Horde started (seed {seed}, best wave {highest_wave})");

        let mut mode = Self {
            records,
            clock: Rc::clone(&ctx.clock),
            rules: ctx.settings.horde,
            screen_shake: ctx.settings.effective_screen_shake(),
            seed,
            rng,
            active: true,
            start_time: now,
            wave: 0,
            wave_start_time: now,
            wave_kills: 0,
            wave_total: 0,
            wave_complete: false,
            total_kills: 0,
            highest_wave,
            highest_at_start: highest_wave,
            modifiers: MODIFIERS.to_vec(),
            current: WaveConfig {
                wave_number: 0,
                enemies: Vec::new(),
                scaling: 1.0,
                elite_chance: 0.0,
                has_boss: false,
                has_mini_boss: false,
                active_modifier_ids: BTreeSet::new(),
            },
        };
        mode.begin_wave();
        mode
    }

    /// Advance to the next wave and return its composition
    pub fn next_wave(&mut self) -> Option<&WaveConfig> {
        if !self.active {
            return None;
        }
        if !self.wave_complete {
            log::warn!("Wave {} skipped before it was cleared", self.wave);
        }
        self.begin_wave();
        Some(&self.current)
    }

    fn begin_wave(&mut self) {
        self.wave += 1;
        self.unlock_modifiers();
        self.current = calculate_wave_config(self.wave, &self.rules, &mut self.rng);
        self.current.active_modifier_ids = self.active_modifier_ids();
        self.wave_start_time = self.clock.now_secs();
        self.wave_kills = 0;
        self.wave_total = self.current.total_enemies();
        self.wave_complete = false;

        log::info!(
            "Wave {}: {} enemies, elite {:.0}%{}{}",
            self.wave,
            self.wave_total,
            self.current.elite_chance * 100.0,
            if self.current.has_mini_boss { ", mini-boss" } else { "" },
            if self.current.has_boss { ", BOSS" } else { "" },
        );
    }

    fn unlock_modifiers(&mut self) {
        for modifier in &mut self.modifiers {
            if !modifier.active && modifier.unlock_wave <= self.wave {
                modifier.active = true;
                log::info!("Modifier unlocked: {}", modifier.name);
            }
        }
    }

    /// Count a kill. Returns the completion when the wave is cleared.
    pub fn enemy_killed(&mut self) -> Option<WaveCompletion> {
        if !self.active {
            return None;
        }
        self.total_kills += 1;
        if self.wave_complete {
            return None;
        }

        self.wave_kills += 1;
        if self.wave_kills < self.wave_total {
            return None;
        }

        self.wave_complete = true;
        let wave_time = self.clock.now_secs() - self.wave_start_time;
        let is_new_record = self.wave > self.highest_wave;
        if is_new_record {
            self.highest_wave = self.wave;
            self.records.save(keys::HORDE_HIGHEST_WAVE, &self.highest_wave);
            log::info!("New Horde record: wave {}", self.wave);
        }

        log::info!("Wave {} cleared in {:.1}s", self.wave, wave_time);
        Some(WaveCompletion {
            wave: self.wave,
            wave_time,
            is_new_record,
            offers_shop: offers_shop(self.wave, &self.rules),
            screen_shake: self.screen_shake,
        })
    }

    /// Stop the session (player died or quit)
    pub fn end(&mut self) -> Option<HordeSummary> {
        if !self.active {
            return None;
        }
        self.active = false;

        if self.wave > self.highest_wave {
            self.highest_wave = self.wave;
            self.records.save(keys::HORDE_HIGHEST_WAVE, &self.highest_wave);
        }

        let summary = HordeSummary {
            final_wave: self.wave,
            total_kills: self.total_kills,
            total_time: self.elapsed(),
            is_new_record: self.wave > self.highest_at_start,
        };
        log::info!(
            "Horde ended at wave {} ({} kills, {:.1}s)",
            summary.final_wave,
            summary.total_kills,
            summary.total_time
        );
        Some(summary)
    }

    // === HUD accessors ===

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn current_wave_config(&self) -> &WaveConfig {
        &self.current
    }

    /// Kills this wave out of the wave's total
    pub fn progress(&self) -> Progress {
        Progress {
            current: self.wave_kills,
            total: self.wave_total,
        }
    }

    pub fn is_wave_complete(&self) -> bool {
        self.wave_complete
    }

    pub fn total_kills(&self) -> u32 {
        self.total_kills
    }

    pub fn highest_wave(&self) -> u32 {
        self.highest_wave
    }

    /// Seconds since the session started
    pub fn elapsed(&self) -> f64 {
        self.clock.now_secs() - self.start_time
    }

    /// Seconds since the current wave started
    pub fn wave_elapsed(&self) -> f64 {
        self.clock.now_secs() - self.wave_start_time
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn active_modifier_ids(&self) -> BTreeSet<String> {
        self.modifiers
            .iter()
            .filter(|m| m.active)
            .map(|m| m.id.to_string())
            .collect()
    }

    pub fn active_modifier_names(&self) -> Vec<&'static str> {
        self.modifiers
            .iter()
            .filter(|m| m.active)
            .map(|m| m.name)
            .collect()
    }

    /// Unknown ids are reported inactive
    pub fn is_modifier_active(&self, id: &str) -> bool {
        self.modifiers.iter().any(|m| m.id == id && m.active)
    }
}

impl ModeSession for HordeMode {
    fn kind(&self) -> ModeKind {
        ModeKind::Horde
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn seed(&self) -> u64 {
        self.seed
    }

    // Horde progress is driven by kill events
    fn update(&mut self, _input: &TickInput) {}

    fn finalize(&mut self) -> Option<RunReport> {
        self.end().map(RunReport::Horde)
    }
}
