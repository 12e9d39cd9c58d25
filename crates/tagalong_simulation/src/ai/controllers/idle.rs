//! Idle controller: компаньон отдыхает рядом с leader'ом.

use super::BehaviorController;
use crate::ai::context::CompanionWorld;
use crate::ai::CompanionConfig;
use crate::components::MovementCommand;

/// Idle: без направленного движения.
///
/// Idle (готов вернуться в FOLLOW) после случайного grace period,
/// или сразу, если leader ушёл дальше `leave_distance`.
pub struct IdleController {
    active: bool,
    grace_range: (i32, i32),
    leave_distance: f32,
    remaining: u32,
    leader_left: bool,
}

impl IdleController {
    pub fn new(config: &CompanionConfig) -> Self {
        Self {
            active: false,
            grace_range: config.idle_grace_range,
            leave_distance: config.idle_leave_distance,
            remaining: 0,
            leader_left: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl BehaviorController for IdleController {
    fn activate(&mut self, world: &mut dyn CompanionWorld) {
        self.active = true;
        self.leader_left = false;
        self.remaining = world.roll_ticks(self.grace_range);
        world.set_movement(MovementCommand::Idle);
    }

    fn deactivate(&mut self, _world: &mut dyn CompanionWorld) {
        self.active = false;
    }

    fn update(&mut self, _tick: u64, world: &mut dyn CompanionWorld) {
        if !self.active {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.leader_left = world.distance_to_leader() > self.leave_distance;
    }

    fn is_idle(&self) -> bool {
        self.remaining == 0 || self.leader_left
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
