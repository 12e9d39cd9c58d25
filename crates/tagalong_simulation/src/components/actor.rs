//! Базовые компоненты акторов: Health, Leader, Hostile

use bevy::prelude::*;

use crate::components::{Inventory, Location, WorldPosition};

/// Здоровье актора (leader, монстры)
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// `current < max / divisor` (целочисленно, как порог "меньше трети")
    pub fn is_below_fraction(&self, divisor: u32) -> bool {
        divisor > 0 && self.current < self.max / divisor
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Leader: тот, кого компаньон сопровождает (игрок)
///
/// Для orchestrator read-only; меняется только через heal / hand-off.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, WorldPosition, Location, Inventory)]
pub struct Leader;

/// Hostile: монстр, на которого реагируют fighter/scared компаньоны
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, WorldPosition, Location)]
pub struct Hostile;
