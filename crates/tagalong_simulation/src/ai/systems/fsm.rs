//! Companion lifecycle systems (game loop, recruit, dismiss, per-tick update).

use bevy::prelude::*;

use crate::ai::events::{DismissCompanion, RecruitCompanion, TimeOfDayChanged};
use crate::ai::game_loop::{GameLoop, LoopChannel};
use crate::ai::host::{CompanionHost, CompanionScene};
use crate::ai::state_machine::AiStateMachine;
use crate::ai::{CompanionBrain, CompanionConfig};
use crate::logger::Monitor;

/// Система: тик game loop (счётчик тиков + часы)
///
/// Первая в цепочке: все остальные системы видят уже новый тик.
pub fn advance_game_loop(
    mut game_loop: ResMut<GameLoop>,
    mut time_events: EventWriter<TimeOfDayChanged>,
) {
    if let Some((old, new)) = game_loop.advance() {
        time_events.write(TimeOfDayChanged { old, new });
    }
}

/// Система: рекрут компаньонов
///
/// Собирает state machine (имя → monitor, оружие из Loadout), делает setup
/// (FOLLOW + подписки на game loop) и вешает `CompanionBrain`.
pub fn recruit_companions(
    mut recruits: EventReader<RecruitCompanion>,
    brains: Query<(), With<CompanionBrain>>,
    mut scene: CompanionScene,
    config: Res<CompanionConfig>,
) {
    for event in recruits.read() {
        if brains.contains(event.companion) {
            crate::logger::log_warning(&format!(
                "⚠️ Companion {:?} is already recruited",
                event.companion
            ));
            continue;
        }

        let Some((name, weapon)) = scene.profile(event.companion) else {
            crate::logger::log_warning(&format!(
                "⚠️ Cannot recruit {:?}: not a companion",
                event.companion
            ));
            continue;
        };

        let built = AiStateMachine::builder()
            .owner(event.companion)
            .monitor(Monitor::new(name.clone()))
            .maybe_weapon(weapon)
            .config(config.clone())
            .build();
        let mut machine = match built {
            Ok(machine) => machine,
            Err(err) => {
                crate::logger::log_error(&format!("❌ Cannot recruit {}: {}", name, err));
                continue;
            }
        };

        let setup = scene.with_world(event.companion, event.leader, |world, ticks| {
            machine.setup(world, ticks)
        });

        match setup {
            Some(Ok(())) => {
                scene.commands().entity(event.companion).insert(CompanionBrain {
                    leader: event.leader,
                    machine,
                });
                crate::logger::log_info(&format!("🤝 {} recruited", name));
            }
            Some(Err(err)) => {
                crate::logger::log_error(&format!("❌ Setup of {} failed: {}", name, err));
            }
            None => {}
        }
    }
}

/// Система: увольнение компаньонов (dispose + снять brain)
///
/// Без world view (leader пропал) teardown идёт через `release`: brain и
/// подписки снимаются в любом случае.
pub fn dismiss_companions(mut dismissals: EventReader<DismissCompanion>, mut host: CompanionHost) {
    for event in dismissals.read() {
        let disposed = host
            .drive(event.companion, |machine, world, ticks| {
                machine.dispose(world, ticks)
            })
            .or_else(|| host.release(event.companion));

        let Some(result) = disposed else {
            crate::logger::log_warning(&format!(
                "⚠️ Cannot dismiss {:?}: not recruited",
                event.companion
            ));
            continue;
        };

        if let Err(err) = result {
            crate::logger::log_error(&format!(
                "❌ Dispose of {:?} failed: {}",
                event.companion, err
            ));
        }

        host.scene
            .commands()
            .entity(event.companion)
            .remove::<CompanionBrain>();
        crate::logger::log_info(&format!("👋 Companion {:?} dismissed", event.companion));
    }
}

/// Система: подписки компаньонов, потерявших brain без dismiss (despawn)
pub fn release_orphaned_subscriptions(
    mut removed: RemovedComponents<CompanionBrain>,
    brains: Query<(), With<CompanionBrain>>,
    mut game_loop: ResMut<GameLoop>,
) {
    for companion in removed.read() {
        // Re-recruit в том же тике: brain уже новый
        if brains.contains(companion) {
            continue;
        }

        let released = game_loop.release_subscriber(companion);
        if released > 0 {
            crate::logger::log_warning(&format!(
                "⚠️ Companion {:?} vanished while recruited, released {} subscriptions",
                companion, released
            ));
        }
    }
}

/// Система: update state machine всех подписчиков UpdateTicked
pub fn tick_companions(mut host: CompanionHost) {
    host.scene.begin_pass();
    let tick = host.scene.tick();

    for companion in host.scene.subscribers(LoopChannel::UpdateTicked) {
        host.drive(companion, |machine, world, _| machine.update(tick, world));
    }
}
