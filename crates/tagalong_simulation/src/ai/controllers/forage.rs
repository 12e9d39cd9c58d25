//! Forage controller: сбор forage вокруг и передача leader'у.

use super::BehaviorController;
use crate::ai::context::{CompanionWorld, ForageSpot};
use crate::ai::CompanionConfig;
use crate::components::{ForageItem, MovementCommand};

/// Forage: идём к ближайшему spot, собираем в сумку, ищем следующий.
///
/// Idle: целей не осталось, сумка полна или её содержимое отдали leader'у.
/// Сумка переживает выход из FORAGE (hand-off возможен позже из FOLLOW).
pub struct ForageController {
    active: bool,
    search_radius: f32,
    reach: f32,
    bag_capacity: usize,
    target: Option<ForageSpot>,
    bag: Vec<ForageItem>,
    done: bool,
}

impl ForageController {
    pub fn new(config: &CompanionConfig) -> Self {
        Self {
            active: false,
            search_radius: config.forage_search_radius,
            reach: config.forage_reach,
            bag_capacity: config.forage_bag_capacity,
            target: None,
            bag: Vec::new(),
            done: false,
        }
    }

    /// Есть что отдать
    pub fn has_any_forage(&self) -> bool {
        !self.bag.is_empty()
    }

    /// Можно начинать forage: есть место в сумке и spot рядом
    pub fn can_forage(&self, world: &dyn CompanionWorld) -> bool {
        self.bag.len() < self.bag_capacity
            && world.nearest_forage_within(self.search_radius).is_some()
    }

    /// Отдать содержимое сумки leader'у. `false`: нечего отдать или не принял.
    pub fn give_forage_to(&mut self, world: &mut dyn CompanionWorld) -> bool {
        if self.bag.is_empty() || !world.give_to_leader(&self.bag) {
            return false;
        }

        self.bag.clear();
        if self.active {
            self.target = None;
            self.done = true;
        }
        true
    }

    pub fn bag(&self) -> &[ForageItem] {
        &self.bag
    }

    fn seek_next(&mut self, world: &mut dyn CompanionWorld) {
        if self.bag.len() >= self.bag_capacity {
            self.target = None;
            self.done = true;
            return;
        }

        self.target = world.nearest_forage_within(self.search_radius);
        match self.target {
            Some(spot) => world.set_movement(MovementCommand::MoveToPosition {
                target: spot.position,
            }),
            None => self.done = true,
        }
    }
}

impl BehaviorController for ForageController {
    fn activate(&mut self, world: &mut dyn CompanionWorld) {
        self.active = true;
        self.done = false;
        self.seek_next(world);
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
        if !self.active || self.done {
            return;
        }

        let Some(spot) = self.target else {
            self.done = true;
            return;
        };

        if world.distance(world.companion_position(), spot.position) > self.reach {
            return;
        }

        if let Some(item) = world.collect_forage(spot.entity) {
            crate::logger::log(&format!("🍄 Companion foraged {}", item.name));
            self.bag.push(item);
        }
        self.seek_next(world);
    }

    fn is_idle(&self) -> bool {
        self.done
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
