//! Arena Modes entry point
//!
//! Native: headless driver that plays one scripted, seeded run of every
//! mode against a JSON-file record store, so records build up across
//! invocations. Usage: `arena-modes [STORE_DIR] [SEED] [--tier TIER]`.
//! Web: installs the browser logger and checks LocalStorage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        return;
    }

    match arena_modes::persistence::LocalStorageStore::new() {
        Ok(_) => log::info!("Arena Modes ready (LocalStorage records)"),
        Err(e) => log::warn!("Arena Modes ready without persistence: {e}"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use arena_modes::DifficultyTier;
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Parser)]
#[command(name = "arena-modes")]
#[command(about = "Play seeded runs of every arena mode against a record directory")]
struct Cli {
    /// Directory holding one JSON file per record
    #[arg(default_value = "arena_records")]
    store_dir: PathBuf,
    /// Session seed (random when omitted)
    seed: Option<u64>,
    /// Boss Rush difficulty tier
    #[arg(long, default_value = "hard", value_parser = parse_tier)]
    tier: DifficultyTier,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_tier(s: &str) -> Result<DifficultyTier, String> {
    DifficultyTier::from_str(s)
        .ok_or_else(|| format!("unknown tier `{s}` (normal, hard, nightmare, insane)"))
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = headless::run(&cli.store_dir, cli.seed, cli.tier) {
        log::error!("Headless run failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use arena_modes::entity::{Enemy, PickupKind, Player};
    use arena_modes::modes::boss_rush::BossRushOutcome;
    use arena_modes::modes::{
        ActiveMode, BossRushMode, HordeMode, OneHitMode, PlayerPose, TimeAttackMode,
    };
    use arena_modes::persistence::{JsonFileStore, SharedStore};
    use arena_modes::{
        DifficultyTier, ManualClock, ModeContext, ModeSession, RunReport, StoreError, TickInput,
    };

    /// Simulated frame step
    const FRAME_DT: f64 = 1.0 / 60.0;

    pub fn run(dir: &Path, seed: Option<u64>, tier: DifficultyTier) -> Result<(), StoreError> {
        let store: SharedStore = Rc::new(RefCell::new(JsonFileStore::open(dir)?));
        let clock = ManualClock::new(0.0);
        let mut ctx = ModeContext::new(store, Rc::new(clock.clone()));
        if seed.is_some() {
            ctx.settings.seed = seed;
        }
        log::info!(
            "Records in `{}`, seed {:?}, tier {}",
            dir.display(),
            ctx.settings.seed,
            tier.as_str()
        );

        play_horde(&ctx, &clock);
        play_boss_rush(&ctx, &clock, tier);
        play_one_hit(&ctx, &clock);
        play_time_attack(&ctx, &clock);
        Ok(())
    }

    fn report(label: &str, value: &impl serde::Serialize) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{label}: {json}"),
            Err(e) => log::warn!("Could not print {label}: {e}"),
        }
    }

    fn finish(mut mode: ActiveMode) {
        if let Some(summary) = mode.finalize() {
            report("Run report", &summary);
        }
    }

    fn play_horde(ctx: &ModeContext, clock: &ManualClock) {
        let mut horde = HordeMode::start(ctx);
        for _ in 0..3 {
            report("Wave", horde.current_wave_config());
            for _ in 0..horde.current_wave_config().total_enemies() {
                clock.advance(1.5);
                if let Some(done) = horde.enemy_killed() {
                    report("Wave complete", &done);
                }
            }
            horde.next_wave();
        }
        finish(ActiveMode::Horde(horde));
    }

    fn play_boss_rush(ctx: &ModeContext, clock: &ManualClock, tier: DifficultyTier) {
        let tier_index = DifficultyTier::ALL
            .iter()
            .position(|t| *t == tier)
            .unwrap_or_default();
        let mut rush = BossRushMode::start(ctx, 0, tier_index, true);
        let mut player = Player::new(100.0);
        while let Some(boss) = rush.current_boss() {
            let mut stats = Enemy::new(800.0, 15.0);
            rush.apply_difficulty_to_boss(&mut stats);
            log::info!("Fighting {} ({} hp)", boss.name, stats.vitals.max_health);

            clock.advance(45.0);
            player.vitals.health = 35.0;
            match rush.boss_defeated(boss.id) {
                Some(BossRushOutcome::Transition(t)) => {
                    rush.refill_between_fights(&mut player);
                    rush.begin_encounter();
                    report("Transition", &t);
                }
                Some(BossRushOutcome::Completed(c)) => report("Boss Rush complete", &c),
                None => break,
            }
        }
        finish(ActiveMode::BossRush(rush));
    }

    fn play_one_hit(ctx: &ModeContext, clock: &ManualClock) {
        let mut run = OneHitMode::start(ctx);
        let mut player = Player::new(100.0);
        run.apply_to_player(&mut player);

        let drops: Vec<PickupKind> = [PickupKind::Health, PickupKind::Ammo, PickupKind::Armor]
            .into_iter()
            .map(|kind| run.modify_pickup_type(kind))
            .collect();
        log::info!("One-Hit drops: {drops:?}");

        for level in 1..=2 {
            for _ in 0..8 {
                let mut enemy = Enemy::new(40.0, 5.0);
                run.apply_to_enemy(&mut enemy);
                clock.advance(4.0);
                run.enemy_killed();
            }
            if let Some(result) = run.level_completed(level) {
                report("Level complete", &result);
            }
        }
        if let Some(summary) = run.player_died() {
            report("One-Hit run", &RunReport::OneHit(summary));
        }
        finish(ActiveMode::OneHit(run));
    }

    fn play_time_attack(ctx: &ModeContext, clock: &ManualClock) {
        let mut run = TimeAttackMode::start(ctx, 1);
        let frames = (170.0 / FRAME_DT) as u32;
        for frame in 0..frames {
            clock.advance(FRAME_DT);
            let t = frame as f32 * FRAME_DT as f32;
            let ghost = run.ghost_pose_at(run.elapsed());
            let pose = PlayerPose::new(t * 10.0, (t * 0.5).sin() * 50.0, t * 0.5);
            run.update(&TickInput {
                dt: FRAME_DT,
                player: Some(pose),
            });
            if frame % 1200 == 0 {
                log::info!(
                    "t={:.0}s pace {} ghost {:?}",
                    run.elapsed(),
                    run.pace_medal().as_str(),
                    ghost.map(|g| g.pos)
                );
            }
            if frame == 600 {
                run.track_combo(12);
            }
        }
        if let Some(result) = run.stop(true) {
            report("Time Attack", &result);
        }
        finish(ActiveMode::TimeAttack(run));
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["arena-modes"]).unwrap();
        assert_eq!(cli.store_dir, PathBuf::from("arena_records"));
        assert_eq!(cli.seed, None);
        assert_eq!(cli.tier, DifficultyTier::Hard);
    }

    #[test]
    fn test_cli_parses_seed_and_tier() {
        let cli = Cli::try_parse_from(["arena-modes", "recs", "42", "--tier", "Insane"]).unwrap();
        assert_eq!(cli.store_dir, PathBuf::from("recs"));
        assert_eq!(cli.seed, Some(42));
        assert_eq!(cli.tier, DifficultyTier::Insane);
    }

    #[test]
    fn test_cli_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["arena-modes", "recs", "abc"]).is_err());
        assert!(Cli::try_parse_from(["arena-modes", "recs", "-3"]).is_err());
        assert!(Cli::try_parse_from(["arena-modes", "--tier", "easy"]).is_err());
    }
}
