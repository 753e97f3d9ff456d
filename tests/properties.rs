//! Property tests for the progression rules

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use arena_modes::entity::Player;
use arena_modes::medals::MedalThresholds;
use arena_modes::modes::ghost::{GhostRecorder, PlayerPose};
use arena_modes::modes::horde::{calculate_wave_config, elite_chance};
use arena_modes::modes::one_hit::apply_to_player;
use arena_modes::modes::BossRushMode;
use arena_modes::settings::{HordeRuleset, Settings};
use arena_modes::{ManualClock, MemoryStore, ModeContext};

proptest! {
    #[test]
    fn test_wave_composition(wave in 1u32..300, seed in any::<u64>()) {
        let rules = HordeRuleset::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let config = calculate_wave_config(wave, &rules, &mut rng);

        let base = 5 + (f64::from(wave) * 1.5).floor() as usize;
        let mini = usize::from(wave % 5 == 0 && wave % 10 != 0);
        let boss = usize::from(wave % 10 == 0);
        prop_assert_eq!(config.enemies.len(), base + mini + boss);
        prop_assert_eq!(config.enemies.iter().filter(|e| e.is_mini_boss).count(), mini);
        prop_assert_eq!(config.enemies.iter().filter(|e| e.is_boss()).count(), boss);

        for enemy in &config.enemies {
            let roles = [enemy.is_elite, enemy.is_mini_boss, enemy.is_boss()];
            prop_assert!(roles.iter().filter(|r| **r).count() <= 1);
        }
    }

    #[test]
    fn test_elite_chance_ramp(wave in 1u32..200) {
        let rules = HordeRuleset::default();
        let chance = elite_chance(wave, &rules);
        if wave < 3 {
            prop_assert_eq!(chance, 0.0);
        } else if wave >= 20 {
            prop_assert_eq!(chance, 0.5);
        } else {
            prop_assert!(chance <= 0.5);
            prop_assert!(chance > elite_chance(wave - 1, &rules));
        }
    }

    #[test]
    fn test_medals_monotonic(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
        let thresholds = MedalThresholds::default();
        let (fast, slow) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(thresholds.medal_for(fast) <= thresholds.medal_for(slow));
    }

    #[test]
    fn test_ghost_samples_increasing_and_capped(
        steps in proptest::collection::vec(0.001f64..0.3, 1..2000),
        cap in 1usize..200,
    ) {
        let mut recorder = GhostRecorder::new(0.1, cap);
        let mut time = 0.0;
        for dt in steps {
            time += dt;
            recorder.record(time, PlayerPose::default());
        }
        prop_assert!(recorder.len() <= cap);
        for pair in recorder.samples().windows(2) {
            prop_assert!(pair[1].time > pair[0].time);
            prop_assert!(pair[1].time - pair[0].time >= 0.1 - 1e-9);
        }
    }

    #[test]
    fn test_one_hit_player_always_one_hp(max in 1.0f64..10_000.0, frac in 0.0f64..1.0) {
        let mut player = Player::new(max);
        player.vitals.health = max * frac;
        apply_to_player(&mut player);
        prop_assert_eq!(player.vitals.max_health, 1.0);
        prop_assert_eq!(player.vitals.health, 1.0);
        prop_assert!(!player.healing_enabled);
    }

    #[test]
    fn test_boss_rush_completes_exactly_once(
        seed in any::<u64>(),
        start in 0usize..4,
        randomize in any::<bool>(),
    ) {
        let clock = ManualClock::new(0.0);
        let settings = Settings { seed: Some(seed), ..Settings::default() };
        let ctx = ModeContext::with_settings(
            Rc::new(RefCell::new(MemoryStore::new())),
            Rc::new(clock.clone()),
            settings,
        );
        let mut rush = BossRushMode::start(&ctx, start, 0, randomize);
        let order = rush.encounter_order().to_vec();
        prop_assert_eq!(order.len(), 4 - start);

        let mut completions = 0;
        for (i, id) in order.iter().enumerate() {
            clock.advance(10.0);
            let outcome = rush.boss_defeated(*id).unwrap();
            let last = i + 1 == order.len();
            prop_assert_eq!(outcome.is_completed(), last);
            if outcome.is_completed() {
                completions += 1;
            }
        }
        prop_assert_eq!(completions, 1);
        prop_assert_eq!(rush.history().len(), order.len());
        prop_assert!(rush.boss_defeated(order[0]).is_none());
    }
}
