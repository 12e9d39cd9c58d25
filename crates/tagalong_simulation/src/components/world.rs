//! World positioning компоненты: WorldPosition, Location, Forageable, Inventory

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Позиция в тайлах внутри текущей локации
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WorldPosition(pub Vec2);

impl WorldPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Локация (карта), в которой находится entity
///
/// Proximity запросы работают только внутри одной локации.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub struct Location(pub String);

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Предмет, который forager может собрать и отдать leader'у
#[derive(Debug, Clone, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub struct ForageItem {
    pub name: String,
}

impl ForageItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Forage spot в мире (ягоды, грибы, …). Despawn после сбора.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(WorldPosition, Location)]
pub struct Forageable {
    pub item: ForageItem,
}

/// Инвентарь leader'а (принимает forage hand-off)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Inventory {
    pub items: Vec<ForageItem>,
    pub capacity: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            capacity: 36,
        }
    }
}

impl Inventory {
    pub fn free_slots(&self) -> usize {
        self.capacity.saturating_sub(self.items.len())
    }

    /// Всё или ничего: частичный hand-off не принимаем
    pub fn try_add_all(&mut self, items: &[ForageItem]) -> bool {
        if items.len() > self.free_slots() {
            return false;
        }
        self.items.extend_from_slice(items);
        true
    }
}
