//! Companion movement + animation systems.

use bevy::prelude::*;

use crate::components::{Companion, Location, MovementCommand, MovementSpeed, WorldPosition};

/// Система: исполнение MovementCommand
///
/// Простейший steering без pathfinding: прямо к цели с `tiles_per_tick`.
/// FollowEntity держит дистанцию `follow_gap`; цель в другой локации: стоим.
pub fn execute_movement_commands(
    mut movers: Query<
        (&mut WorldPosition, &mut MovementCommand, &MovementSpeed, &Location),
        With<Companion>,
    >,
    targets: Query<(&WorldPosition, &Location), Without<Companion>>,
) {
    for (mut position, mut command, speed, location) in movers.iter_mut() {
        let (goal, gap) = match *command {
            MovementCommand::Idle => continue,
            MovementCommand::Stop => {
                *command = MovementCommand::Idle;
                continue;
            }
            MovementCommand::MoveToPosition { target } => (target, 0.0),
            MovementCommand::FollowEntity { target } => {
                let Ok((target_position, target_location)) = targets.get(target) else {
                    continue;
                };
                if target_location != location {
                    continue;
                }
                (target_position.0, speed.follow_gap)
            }
        };

        let offset = goal - position.0;
        let distance = offset.length();
        if distance <= gap {
            continue;
        }

        let step = (distance - gap).min(speed.tiles_per_tick);
        position.0 += offset / distance * step;
    }
}

/// Система: таймеры emote / shake / jump
pub fn tick_companion_animations(mut companions: Query<&mut Companion>) {
    for mut companion in companions.iter_mut() {
        companion.tick_animations();
    }
}
