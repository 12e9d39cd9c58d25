//! TAGALONG Simulation Core
//!
//! ECS-симуляция компаньона на Bevy 0.16: компаньон ходит за leader'ом,
//! дерётся с монстрами, отдыхает и собирает forage.
//!
//! Слои:
//! - `ai`: state machine компаньона (ядро без ECS) + ECS хост/системы
//! - `components`: ECS компоненты мира (leader, companion, monsters, forage)
//! - `logger`: глобальный logger + per-companion Monitor

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod error;
pub mod logger;

// Re-export базовых типов для удобства
pub use ai::{
    AiStateMachine, CompanionBrain, CompanionConfig, CompanionPlugin, CompanionState, GameLoop,
    RandomSource,
};
pub use components::*;
pub use error::{CompanionError, Result};
pub use logger::{init_logger, log, log_error, log_info, log_warning};

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Default, Clone)]
pub struct SimulationPlugin {
    pub companion: CompanionPlugin,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0));

        // Детерминистичный RNG (seed по умолчанию, если не задан create_headless_app)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins(self.companion.clone());
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl RandomSource for DeterministicRng {
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Прогнать N fixed тиков без ожидания реального времени (тесты, headless demo)
pub fn run_fixed_ticks(app: &mut App, ticks: u32) {
    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }
}
