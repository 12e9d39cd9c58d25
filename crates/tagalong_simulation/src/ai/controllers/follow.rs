//! Follow controller: сопровождение leader'а (состояние по умолчанию).

use bevy::prelude::*;

use super::BehaviorController;
use crate::ai::context::CompanionWorld;
use crate::ai::CompanionConfig;
use crate::components::MovementCommand;

/// Follow: движение привязано к leader'у.
///
/// Idle почти никогда: только когда компаньон стоит рядом с leader'ом,
/// который не двигался `rest_ticks` тиков подряд.
pub struct FollowController {
    active: bool,
    follow_distance: f32,
    rest_ticks: u32,
    resting_for: u32,
    last_leader_position: Option<Vec2>,
}

impl FollowController {
    pub fn new(config: &CompanionConfig) -> Self {
        Self {
            active: false,
            follow_distance: config.follow_distance,
            rest_ticks: config.follow_rest_ticks,
            resting_for: 0,
            last_leader_position: None,
        }
    }

    fn bind_to_leader(world: &mut dyn CompanionWorld) {
        let leader = world.leader();
        world.set_movement(MovementCommand::FollowEntity {
            target: leader.entity,
        });
    }
}

impl BehaviorController for FollowController {
    fn activate(&mut self, world: &mut dyn CompanionWorld) {
        self.active = true;
        self.resting_for = 0;
        self.last_leader_position = None;
        Self::bind_to_leader(world);
    }

    fn deactivate(&mut self, world: &mut dyn CompanionWorld) {
        if !self.active {
            return;
        }
        self.active = false;
        world.set_movement(MovementCommand::Idle);
    }

    fn update(&mut self, _tick: u64, world: &mut dyn CompanionWorld) {
        if !self.active {
            return;
        }

        let leader = world.leader();
        let leader_moved = self
            .last_leader_position
            .map_or(true, |last| last.distance(leader.position) > f32::EPSILON);
        self.last_leader_position = Some(leader.position);

        if world.distance_to_leader() > self.follow_distance {
            // Отстали (или fear halt сбросил binding): снова за leader'ом
            self.resting_for = 0;
            Self::bind_to_leader(world);
        } else if leader_moved {
            self.resting_for = 0;
        } else {
            self.resting_for = self.resting_for.saturating_add(1);
        }
    }

    fn is_idle(&self) -> bool {
        self.resting_for >= self.rest_ticks
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
