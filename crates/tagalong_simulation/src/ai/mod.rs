//! Companion AI module
//!
//! State machine компаньона: FOLLOW / FIGHT / IDLE / FORAGE, cooldowns,
//! side effects (страх) и opportunistic actions (heal, передача forage).
//! Ядро (`state_machine`, `controllers`) не знает про ECS: окружение приходит
//! через `context::CompanionWorld`. ECS хост: `host` + `systems`.

use bevy::prelude::*;

pub mod actions;
pub mod components;
pub mod context;
pub mod controllers;
pub mod cooldowns;
pub mod events;
pub mod game_loop;
pub mod host;
pub mod side_effects;
pub mod state_machine;
pub mod systems;

#[cfg(test)]
mod state_machine_tests;
#[cfg(test)]
pub(crate) mod test_world;

// Re-export основных типов
pub use components::{CompanionBrain, CompanionConfig, CompanionState};
pub use context::{CompanionWorld, DialogueLine, RandomSource};
pub use cooldowns::{Cooldown, CooldownSet};
pub use events::*;
pub use game_loop::{GameLoop, LoopChannel, Subscription, TickSource};
pub use state_machine::{AiStateMachine, BrainSnapshot, StateMachineBuilder};
pub use systems::CompanionHud;

/// Companion Plugin
///
/// Регистрирует companion системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. advance_game_loop: тик + часы (TimeOfDayChanged)
/// 2. recruit_companions / dismiss_companions: setup / dispose state machine
/// 3. react_to_time_of_day: latch reset, авто-уход вечером
/// 4. follow_leader_warps: warp следом за leader'ом
/// 5. tick_companions: update state machine (cooldowns → transitions → controller)
/// 6. handle_interactions: perform_action или диалог
/// 7. apply_companion_strikes: урон монстрам
/// 8. execute_movement_commands: движение
/// 9. update_companion_hud, tick_companion_animations
#[derive(Default, Clone)]
pub struct CompanionPlugin {
    config: Option<CompanionConfig>,
}

impl CompanionPlugin {
    pub fn with_config(config: CompanionConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for CompanionPlugin {
    fn build(&self, app: &mut App) {
        let config = self.config.clone().unwrap_or_default();
        if let Err(err) = config.validate() {
            crate::logger::log_error(&format!("❌ Invalid companion config: {}", err));
        }

        if !app.world().contains_resource::<crate::DeterministicRng>() {
            app.insert_resource(crate::DeterministicRng::new(42));
        }

        app.insert_resource(GameLoop::new(config.ticks_per_time_step))
            .insert_resource(config)
            .init_resource::<CompanionHud>()
            .add_event::<RecruitCompanion>()
            .add_event::<DismissCompanion>()
            .add_event::<CompanionInteraction>()
            .add_event::<DialogueRequested>()
            .add_event::<CompanionStateChanged>()
            .add_event::<CompanionLocationChanged>()
            .add_event::<LeaderWarped>()
            .add_event::<TimeOfDayChanged>()
            .add_event::<CompanionStrike>()
            .add_event::<CompanionSpoke>()
            .add_event::<CompanionSound>()
            .add_systems(
                FixedUpdate,
                (
                    systems::advance_game_loop,
                    systems::recruit_companions,
                    systems::dismiss_companions,
                    systems::release_orphaned_subscriptions,
                    systems::react_to_time_of_day,
                    systems::follow_leader_warps,
                    systems::tick_companions,
                    systems::handle_interactions,
                    systems::apply_companion_strikes,
                    systems::execute_movement_commands,
                    systems::update_companion_hud,
                    systems::tick_companion_animations,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
