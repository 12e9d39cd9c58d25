//! Tests for AI state machine orchestrator.

#[cfg(test)]
mod tests {
    use bevy::math::Vec2;
    use proptest::prelude::*;

    use super::super::state_machine::{AiStateMachine, BrainSnapshot};
    use crate::ai::controllers::BehaviorController;
    use crate::ai::cooldowns::Cooldown;
    use crate::ai::game_loop::{GameLoop, LoopChannel, TickSource};
    use crate::ai::test_world::{entity, TestWorld};
    use crate::ai::{CompanionConfig, CompanionState};
    use crate::components::{skills, MovementCommand, Weapon};
    use crate::error::CompanionError;
    use crate::logger::Monitor;

    const OWNER: u32 = 7;

    fn build(config: CompanionConfig) -> AiStateMachine {
        AiStateMachine::builder()
            .owner(entity(OWNER))
            .monitor(Monitor::new("Alex"))
            .weapon(Weapon::sword("Rusty Sword", 8))
            .config(config)
            .build()
            .unwrap()
    }

    fn set_up(world: &mut TestWorld, ticks: &mut GameLoop, config: CompanionConfig) -> AiStateMachine {
        let mut machine = build(config);
        machine.setup(world, ticks).unwrap();
        machine
    }

    fn run(machine: &mut AiStateMachine, world: &mut TestWorld, ticks: std::ops::RangeInclusive<u64>) {
        for tick in ticks {
            machine.update(tick, world);
        }
    }

    fn assert_single_active(machine: &AiStateMachine) {
        let active = machine.controllers().unwrap().active_states();
        assert_eq!(active, vec![machine.current_state()]);
    }

    // ========== Builder / setup ==========

    #[test]
    fn test_builder_reports_missing_dependencies() {
        let no_owner = AiStateMachine::builder()
            .monitor(Monitor::new("Alex"))
            .weapon(Weapon::sword("Rusty Sword", 8))
            .build();
        assert_eq!(no_owner.err(), Some(CompanionError::MissingDependency("owner")));

        let no_monitor = AiStateMachine::builder()
            .owner(entity(OWNER))
            .weapon(Weapon::sword("Rusty Sword", 8))
            .build();
        assert_eq!(no_monitor.err(), Some(CompanionError::MissingDependency("monitor")));

        let no_weapon = AiStateMachine::builder()
            .owner(entity(OWNER))
            .monitor(Monitor::new("Alex"))
            .maybe_weapon(None)
            .build();
        assert_eq!(no_weapon.err(), Some(CompanionError::MissingDependency("weapon")));
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let result = AiStateMachine::builder()
            .owner(entity(OWNER))
            .monitor(Monitor::new("Alex"))
            .weapon(Weapon::sword("Rusty Sword", 8))
            .config(CompanionConfig {
                flee_chance: 0,
                ..Default::default()
            })
            .build();

        assert!(matches!(result, Err(CompanionError::InvalidConfig(_))));
    }

    #[test]
    fn test_setup_follows_arms_grace_and_subscribes() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(world.displayed, vec![CompanionState::Follow]);
        assert_eq!(
            world.movement,
            MovementCommand::FollowEntity {
                target: world.leader.entity
            }
        );
        assert_eq!(machine.cooldowns().remaining(Cooldown::Foraging), 500);
        assert!(ticks.is_subscribed(entity(OWNER), LoopChannel::UpdateTicked));
        assert!(ticks.is_subscribed(entity(OWNER), LoopChannel::TimeChanged));
        assert_single_active(&machine);
    }

    #[test]
    fn test_setup_twice_is_rejected() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        assert_eq!(
            machine.setup(&mut world, &mut ticks),
            Err(CompanionError::AlreadySetUp)
        );
        assert_eq!(ticks.subscription_count(), 2);
    }

    #[test]
    fn test_failed_setup_rolls_back_and_can_retry() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        // Чужая подписка на TimeChanged под тем же owner: второй subscribe падает
        let blocker = ticks
            .subscribe(LoopChannel::TimeChanged, entity(OWNER))
            .unwrap();
        let mut machine = build(CompanionConfig::default());

        assert!(matches!(
            machine.setup(&mut world, &mut ticks),
            Err(CompanionError::Subscription(_))
        ));
        assert!(!machine.is_set_up());
        assert!(machine.controllers().is_none());
        assert!(machine.subscriptions().is_empty());
        assert!(world.displayed.is_empty());
        assert_eq!(ticks.subscription_count(), 1, "UpdateTicked returned");

        ticks.unsubscribe(blocker).unwrap();
        machine.setup(&mut world, &mut ticks).unwrap();
        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(ticks.subscription_count(), 2);
        assert_single_active(&machine);
    }

    // ========== change_state ==========

    #[test]
    fn test_change_state_to_current_reactivates_without_leak() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        world.movement_log.clear();

        machine.change_state(CompanionState::Follow, &mut world);

        // deactivate (Idle) → activate (FollowEntity)
        assert_eq!(
            world.movement_log,
            vec![
                MovementCommand::Idle,
                MovementCommand::FollowEntity {
                    target: world.leader.entity
                }
            ]
        );
        assert_eq!(world.displayed.len(), 2);
        assert_single_active(&machine);
    }

    proptest! {
        #[test]
        fn prop_exactly_one_controller_active(states in prop::collection::vec(0usize..4, 1..24)) {
            let mut world = TestWorld::new()
                .with_hostile_at(3.0, 0.0)
                .with_forage_at(2.0, 0.0, "Leek");
            let mut ticks = GameLoop::default();
            let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

            for (tick, index) in states.into_iter().enumerate() {
                machine.change_state(CompanionState::ALL[index], &mut world);
                machine.update(tick as u64 + 1, &mut world);

                let active = machine.controllers().unwrap().active_states();
                prop_assert_eq!(active, vec![machine.current_state()]);
            }
        }
    }

    // ========== Transition rules ==========

    #[test]
    fn test_change_state_cooldown_expiring_on_cadence_tick_allows_fight() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::FIGHTER])
            .with_hostile_at(4.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        machine.cooldowns_mut().arm(Cooldown::ChangeState, 15);

        run(&mut machine, &mut world, 1..=14);
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 1);

        // Тик 15: cooldown 1 → 0 до проверки переходов
        machine.update(15, &mut world);
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 0);
        assert_eq!(machine.current_state(), CompanionState::Fight);
    }

    #[test]
    fn test_flee_on_cadence_tick_blocks_fight_in_same_pass() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::SCARED, skills::FIGHTER])
            .with_hostile_at(4.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        // cry ✗, flee ✓
        world.script_rolls(&[8, 1]);
        run(&mut machine, &mut world, 1..=15);

        assert_eq!(world.jumps, 1);
        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 200);
        assert!(!world.displayed.contains(&CompanionState::Fight));
    }

    #[test]
    fn test_fear_without_flee_still_lets_fight_start() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::SCARED, skills::FIGHTER])
            .with_hostile_at(4.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        // cry ✗, flee ✗
        world.script_rolls(&[8, 5]);
        run(&mut machine, &mut world, 1..=15);

        assert_eq!(world.shakes, 1);
        assert_eq!(world.jumps, 0);
        assert_eq!(machine.current_state(), CompanionState::Fight);
    }

    #[test]
    fn test_follow_to_fight_waits_for_change_state_cooldown() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::FIGHTER])
            .with_hostile_at(4.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        machine.cooldowns_mut().arm(Cooldown::ChangeState, 20);

        run(&mut machine, &mut world, 1..=15);
        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 5);

        run(&mut machine, &mut world, 16..=30);
        assert_eq!(machine.current_state(), CompanionState::Fight);
        assert_single_active(&machine);
    }

    #[test]
    fn test_no_fight_when_leader_is_far() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::WARRIOR])
            .with_hostile_at(4.0, 0.0);
        world.leader.position = Vec2::new(15.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        run(&mut machine, &mut world, 1..=15);
        assert_eq!(machine.current_state(), CompanionState::Follow);
    }

    #[test]
    fn test_threat_takes_priority_over_idle_fallback() {
        let config = CompanionConfig {
            follow_rest_ticks: 1,
            ..Default::default()
        };
        let mut world = TestWorld::new()
            .with_skills(&[skills::FIGHTER])
            .with_hostile_at(4.0, 0.0);
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, config);

        run(&mut machine, &mut world, 1..=14);
        assert!(machine.current_controller().is_idle());

        machine.update(15, &mut world);
        assert_eq!(machine.current_state(), CompanionState::Fight);
        assert_eq!(world.displayed.last(), Some(&CompanionState::Fight));
    }

    #[test]
    fn test_idle_fallback_extends_foraging_cooldown() {
        let config = CompanionConfig {
            follow_rest_ticks: 1,
            ..Default::default()
        };
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, config);

        // idle increment 400, idle grace 200
        world.script_rolls(&[400, 200]);
        run(&mut machine, &mut world, 1..=15);

        assert_eq!(machine.current_state(), CompanionState::Idle);
        assert_eq!(machine.cooldowns().remaining(Cooldown::Foraging), 500 - 15 + 400);
    }

    #[test]
    fn test_idle_returns_to_follow_when_leader_leaves() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        machine.change_state(CompanionState::Idle, &mut world);

        world.leader.position = Vec2::new(20.0, 0.0);
        run(&mut machine, &mut world, 1..=15);

        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 100);
        assert_single_active(&machine);
    }

    #[test]
    fn test_foraging_grace_expires_then_forage_starts() {
        let mut world = TestWorld::new()
            .with_skills(&[skills::FORAGER])
            .with_forage_at(3.0, 0.0, "Leek");
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        // Шанс 1 из 5 ✓, foraging cooldown 800
        world.script_rolls(&[1, 800]);

        run(&mut machine, &mut world, 1..=500);
        assert!(machine.cooldowns().is_ready(Cooldown::Foraging));
        assert_eq!(machine.current_state(), CompanionState::Follow);
        assert_eq!(world.rolls.len(), 2, "no roll before the grace expires");

        run(&mut machine, &mut world, 501..=510);
        assert_eq!(machine.current_state(), CompanionState::Forage);
        assert_eq!(machine.cooldowns().remaining(Cooldown::Foraging), 800);
        assert_eq!(
            world.movement,
            MovementCommand::MoveToPosition {
                target: Vec2::new(3.0, 0.0)
            }
        );
    }

    #[test]
    fn test_cooldowns_decrement_every_tick_and_stay_non_negative() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        machine.cooldowns_mut().arm(Cooldown::ChangeState, 3);
        machine.cooldowns_mut().arm(Cooldown::Scared, 1);

        run(&mut machine, &mut world, 1..=5);

        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 0);
        assert_eq!(machine.cooldowns().remaining(Cooldown::Scared), 0);
        assert_eq!(machine.cooldowns().remaining(Cooldown::Foraging), 495);
    }

    // ========== change_location / dispose ==========

    #[test]
    fn test_change_location_warps_to_leader() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        machine.change_location("Town", &mut world);

        assert_eq!(world.warps, vec![("Town".to_string(), Vec2::new(1.0, 0.0))]);
        assert_eq!(
            world.location_events,
            vec![("Farm".to_string(), "Town".to_string())]
        );
        assert_eq!(machine.cooldowns().remaining(Cooldown::ChangeState), 30);
    }

    #[test]
    fn test_dispose_clears_arena_and_subscriptions() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        assert_eq!(ticks.subscription_count(), 2);

        machine.dispose(&mut world, &mut ticks).unwrap();

        assert_eq!(ticks.subscription_count(), 0);
        assert!(machine.controllers().is_none());
        assert!(machine.subscriptions().is_empty());
        assert_eq!(world.movement, MovementCommand::Idle);
    }

    #[test]
    fn test_dispose_finishes_teardown_after_unsubscribe_error() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        // Первая подписка уже снята снаружи: её unsubscribe падает
        ticks.unsubscribe(machine.subscriptions()[0]).unwrap();

        let result = machine.dispose(&mut world, &mut ticks);

        assert!(matches!(result, Err(CompanionError::Subscription(_))));
        assert_eq!(ticks.subscription_count(), 0, "second subscription released");
        assert!(machine.subscriptions().is_empty());
        assert!(machine.controllers().is_none());
        assert!(!machine.is_set_up());
        assert_eq!(world.movement, MovementCommand::Idle);
    }

    #[test]
    fn test_release_tears_down_without_world() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        machine.release(&mut ticks).unwrap();

        assert_eq!(ticks.subscription_count(), 0);
        assert!(machine.controllers().is_none());
        assert!(machine.subscriptions().is_empty());
    }

    #[test]
    #[should_panic(expected = "outside of setup/dispose lifetime")]
    fn test_update_after_dispose_panics() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let mut machine = set_up(&mut world, &mut ticks, CompanionConfig::default());
        machine.dispose(&mut world, &mut ticks).unwrap();

        machine.update(1, &mut world);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut world = TestWorld::new();
        let mut ticks = GameLoop::default();
        let machine = set_up(&mut world, &mut ticks, CompanionConfig::default());

        let json = serde_json::to_string(&machine.snapshot()).unwrap();
        let restored: BrainSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, machine.snapshot());
        assert_eq!(restored.state, CompanionState::Follow);
        assert_eq!(restored.medkits, 3);
    }
}
