//! Fight controller: бой с ближайшим монстром оружием из loadout.

use super::BehaviorController;
use crate::ai::context::{CompanionWorld, HostileTarget};
use crate::ai::CompanionConfig;
use crate::components::{MovementCommand, Weapon};

/// Fight: преследуем ближайшего монстра, бьём когда он в reach.
///
/// Idle: в радиусе `engage_radius` не осталось монстров.
pub struct FightController {
    active: bool,
    weapon: Weapon,
    engage_radius: f32,
    swing_cooldown: u32,
    target: Option<HostileTarget>,
}

impl FightController {
    pub fn new(config: &CompanionConfig, weapon: Weapon) -> Self {
        Self {
            active: false,
            weapon,
            engage_radius: config.fight_engage_radius,
            swing_cooldown: 0,
            target: None,
        }
    }

    pub fn target(&self) -> Option<HostileTarget> {
        self.target
    }

    fn acquire_target(&mut self, world: &dyn CompanionWorld) {
        self.target = world.nearest_hostile_within(self.engage_radius);
    }
}

impl BehaviorController for FightController {
    fn activate(&mut self, world: &mut dyn CompanionWorld) {
        self.active = true;
        self.swing_cooldown = 0;
        self.acquire_target(world);

        if let Some(target) = self.target {
            world.set_movement(MovementCommand::FollowEntity {
                target: target.entity,
            });
        }
    }

    fn deactivate(&mut self, world: &mut dyn CompanionWorld) {
        if !self.active {
            return;
        }
        self.active = false;
        self.target = None;
        world.set_movement(MovementCommand::Idle);
    }

    fn update(&mut self, _tick: u64, world: &mut dyn CompanionWorld) {
        if !self.active {
            return;
        }

        self.swing_cooldown = self.swing_cooldown.saturating_sub(1);
        self.acquire_target(world);

        let Some(target) = self.target else {
            return;
        };

        let distance = world.distance(world.companion_position(), target.position);
        if distance > self.weapon.reach {
            world.set_movement(MovementCommand::FollowEntity {
                target: target.entity,
            });
            return;
        }

        // В reach: стоим и бьём по cooldown
        world.set_movement(MovementCommand::Idle);
        if self.swing_cooldown == 0 {
            world.strike(target.entity, self.weapon.damage);
            self.swing_cooldown = self.weapon.swing_cooldown;
        }
    }

    fn is_idle(&self) -> bool {
        self.target.is_none()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
