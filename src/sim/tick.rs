//! Per-frame simulation tick
//!
//! Advances the game by one elapsed-time step. Order matters: actor physics,
//! obstacle motion and removal, spawning, collision, score, stage progression
//! and finally the speed used by the next tick.

use super::collision::first_collision;
use super::rng::RandomSource;
use super::state::{GameEvent, GamePhase, GameState};

/// Advance the game state by `dt` milliseconds
pub fn tick(state: &mut GameState, dt: f32, rng: &mut dyn RandomSource) {
    // Only Playing advances
    if state.phase != GamePhase::Playing {
        return;
    }

    state.elapsed_ms += dt as f64;

    state.actor.update(dt);

    let speed = state.game_speed;
    for obstacle in &mut state.obstacles {
        obstacle.update(dt, speed);
    }
    state.obstacles.retain(|o| !o.is_off_screen());

    update_spawner(state, dt, rng);

    if let Some(index) = first_collision(&state.actor.bounding_rect(), &state.obstacles) {
        log::debug!("Hit {} at x={}", state.obstacles[index].kind.tag(), state.obstacles[index].x);
        state.game_over();
        return;
    }

    state.score += (dt as f64 / state.tuning.score_divisor_ms) * state.speed_multiplier as f64;

    update_stage(state);

    state.game_speed = state.tuning.base_speed * state.speed_multiplier;
}

fn update_spawner(state: &mut GameState, dt: f32, rng: &mut dyn RandomSource) {
    state.spawn_timer += dt;
    if state.spawn_timer < state.spawn_interval {
        return;
    }

    let kinds = state.stage.obstacle_kinds();
    let kind = kinds[rng.pick(kinds.len())];
    state.spawn_obstacle(kind);

    state.spawn_timer = 0.0;
    let t = &state.tuning;
    let span = t.spawn_interval_max_ms - t.spawn_interval_min_ms;
    state.spawn_interval =
        (t.spawn_interval_min_ms + rng.next_unit() * span) / state.speed_multiplier;
}

fn update_stage(state: &mut GameState) {
    if state.score < state.next_stage_score {
        return;
    }

    let (next, wrapped) = state.stage.advance();
    state.stage = next;
    if wrapped {
        state.speed_multiplier += state.tuning.wrap_speed_bonus;
    }
    state.next_stage_score += state.tuning.stage_score_step;
    state.push_event(GameEvent::StageAdvanced {
        stage: next,
        wrapped,
    });
    log::info!(
        "Stage {} (speed x{:.1}, next at {})",
        next.label(),
        state.speed_multiplier,
        state.next_stage_score
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::stage::Stage;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing() -> GameState {
        let mut state = GameState::new(1200.0, 800.0, Tuning::default());
        state.start();
        state.drain_events();
        state
    }

    /// Keeps the spawner quiet so tests can focus on one concern
    fn no_spawns(state: &mut GameState) {
        state.spawn_interval = f32::MAX;
    }

    #[test]
    fn test_tick_ignored_unless_playing() {
        let mut rng = Pcg32::seed_from_u64(1);
        for phase in [GamePhase::Start, GamePhase::Paused, GamePhase::GameOver] {
            let mut state = playing();
            state.spawn_obstacle(ObstacleKind::Cactus);
            state.phase = phase;
            let x = state.obstacles[0].x;

            for _ in 0..50 {
                tick(&mut state, 100.0, &mut rng);
            }

            assert_eq!(state.score, 0.0);
            assert_eq!(state.stage, Stage::FIRST);
            assert_eq!(state.obstacles[0].x, x);
            assert_eq!(state.spawn_timer, 0.0);
            assert_eq!(state.phase, phase);
        }
    }

    #[test]
    fn test_score_accrual_per_tick() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.score, 1.0);
        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.score, 2.0);

        state.speed_multiplier = 1.5;
        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.score, 3.5);
    }

    #[test]
    fn test_fifty_ticks_without_incident() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        for _ in 0..50 {
            tick(&mut state, 100.0, &mut rng);
        }
        assert!((state.score - 50.0).abs() < 1e-6);
        assert_eq!(state.stage, Stage::FIRST);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_stage_advances_at_threshold() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        state.score = 499.5;
        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.stage.number(), 2);
        assert_eq!(state.next_stage_score, 1000.0);
        assert_eq!(state.speed_multiplier, 1.0);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::StageAdvanced {
                stage: Stage::new(2),
                wrapped: false
            }]
        );
    }

    #[test]
    fn test_stage_wraps_and_speeds_up() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        state.stage = Stage::new(5);
        state.score = 2499.5;
        state.next_stage_score = 2500.0;

        tick(&mut state, 100.0, &mut rng);

        assert_eq!(state.stage, Stage::FIRST);
        assert_eq!(state.speed_multiplier, 1.5);
        assert_eq!(state.next_stage_score, 3000.0);
        assert_eq!(state.game_speed, 6.0);
        assert!(state.drain_events().contains(&GameEvent::StageAdvanced {
            stage: Stage::FIRST,
            wrapped: true
        }));
    }

    #[test]
    fn test_thresholds_accumulate() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        // 1600 points worth of ticks at 10 points each
        for _ in 0..160 {
            tick(&mut state, 1000.0, &mut rng);
        }
        assert_eq!(state.stage.number(), 4);
        assert_eq!(state.next_stage_score, 2000.0);
    }

    #[test]
    fn test_off_screen_obstacles_removed() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        let mut gone = Obstacle::new(
            ObstacleKind::Rock,
            -37.0,
            state.ground_y,
            state.stage,
            0.0,
            &state.tuning,
        );
        gone.y -= 400.0;
        let mut stays = gone.clone();
        stays.x = -35.0;
        state.insert_obstacle(gone);
        state.insert_obstacle(stays);

        tick(&mut state, 16.0, &mut rng);

        // -37 - 4 + 40 < 0 is removed, -35 - 4 + 40 = 1 stays
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].x, -39.0);
        assert!(state.obstacles.iter().all(|o| o.x + o.width >= 0.0));
    }

    #[test]
    fn test_obstacle_on_actor_ends_run() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        let target = state.actor.bounding_rect();
        let mut o = Obstacle::new(
            ObstacleKind::Unknown,
            target.x,
            state.ground_y,
            state.stage,
            0.0,
            &state.tuning,
        );
        o.y = target.y;
        o.width = target.w;
        o.height = target.h;
        state.insert_obstacle(o);

        tick(&mut state, 16.0, &mut rng);

        assert_eq!(state.phase, GamePhase::GameOver);
        // Collision stops the tick before scoring
        assert_eq!(state.score, 0.0);
        assert!(matches!(
            state.drain_events().last(),
            Some(GameEvent::GameOver { .. })
        ));
    }

    #[test]
    fn test_first_spawn_after_initial_interval() {
        let mut state = playing();
        let mut rng = ScriptedRandom::new(vec![0.0, 0.5]);
        for _ in 0..19 {
            tick(&mut state, 100.0, &mut rng);
        }
        assert!(state.obstacles.is_empty());

        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].kind, ObstacleKind::Cactus);
        assert_eq!(state.spawn_timer, 0.0);
        assert_eq!(state.spawn_interval, 2250.0);
    }

    #[test]
    fn test_spawn_interval_shrinks_with_multiplier() {
        let mut state = playing();
        state.speed_multiplier = 2.0;
        state.spawn_interval = 100.0;
        let mut rng = ScriptedRandom::new(vec![0.9, 0.5]);
        tick(&mut state, 100.0, &mut rng);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].kind, ObstacleKind::Rock);
        assert_eq!(state.spawn_interval, 1125.0);
    }

    #[test]
    fn test_spawned_kind_belongs_to_stage() {
        let mut state = playing();
        state.stage = Stage::new(3);
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..20 {
            state.spawn_interval = 0.0;
            state.obstacles.clear();
            tick(&mut state, 16.0, &mut rng);
            let kind = state.obstacles[0].kind;
            assert!(Stage::new(3).obstacle_kinds().contains(&kind));
        }
    }

    #[test]
    fn test_speed_follows_multiplier() {
        let mut state = playing();
        no_spawns(&mut state);
        let mut rng = ScriptedRandom::constant(0.0);
        state.speed_multiplier = 2.5;
        tick(&mut state, 16.0, &mut rng);
        assert_eq!(state.game_speed, 10.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = |seed: u64| {
            let mut state = playing();
            let mut rng = Pcg32::seed_from_u64(seed);
            for i in 0..600 {
                if i % 40 == 0 {
                    state.apply_intent(crate::sim::Intent::Jump);
                }
                tick(&mut state, 16.0, &mut rng);
            }
            (
                state.phase,
                state.score,
                state
                    .obstacles
                    .iter()
                    .map(|o| (o.kind, o.x, o.y + o.float_offset))
                    .collect::<Vec<_>>(),
            )
        };
        assert_eq!(run(42), run(42));
    }

    proptest! {
        #[test]
        fn prop_score_never_decreases(dts in prop::collection::vec(0.0f32..100.0, 1..200), seed in any::<u64>()) {
            let mut state = playing();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut last = state.score;
            for dt in dts {
                tick(&mut state, dt, &mut rng);
                prop_assert!(state.score >= last);
                prop_assert!((1..=5).contains(&state.stage.number()));
                prop_assert!(state.speed_multiplier >= 1.0);
                last = state.score;
            }
        }
    }
}
