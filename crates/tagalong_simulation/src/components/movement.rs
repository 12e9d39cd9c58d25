//! Movement компоненты: команды перемещения и скорость

use bevy::prelude::*;

/// Команда движения компаньона (high-level intent)
///
/// Архитектура:
/// - Behavior controllers пишут MovementCommand (через `CompanionBody`)
/// - `execute_movement_commands` читает и двигает WorldPosition
/// - Pathfinding здесь нет: прямая линия в тайлах
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Стоять на месте
    Idle,
    /// Двигаться к позиции (tile coordinates)
    MoveToPosition { target: Vec2 },
    /// Следовать за entity (target обновляется каждый тик)
    FollowEntity { target: Entity },
    /// Остановиться немедленно (halt)
    Stop,
}

impl Default for MovementCommand {
    fn default() -> Self {
        Self::Idle
    }
}

/// Скорость движения (тайлов за тик) + дистанция "дошёл"
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MovementSpeed {
    pub tiles_per_tick: f32,
    /// FollowEntity останавливается на этой дистанции (не наступаем на leader)
    pub follow_gap: f32,
}

impl Default for MovementSpeed {
    fn default() -> Self {
        Self {
            tiles_per_tick: 0.08, // ~5 тайлов/сек при 60Hz
            follow_gap: 1.0, // ближе reach оружия
        }
    }
}
