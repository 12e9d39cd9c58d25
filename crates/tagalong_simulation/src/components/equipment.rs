//! Loadout компаньона: оружие для Fight controller

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Melee оружие компаньона
///
/// Cooldown в тиках (не секундах): весь companion AI считает в тиках.
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: u32,
    /// Радиус удара (тайлы)
    pub reach: f32,
    /// Тиков между ударами
    pub swing_cooldown: u32,
}

impl Weapon {
    pub fn sword(name: impl Into<String>, damage: u32) -> Self {
        Self {
            name: name.into(),
            damage,
            reach: 1.5,
            swing_cooldown: 40,
        }
    }
}

/// Loadout: экипировка из метаданных компаньона
///
/// Без оружия компаньона нельзя рекрутировать (`MissingDependency("weapon")`).
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Loadout {
    pub weapon: Option<Weapon>,
}

impl Loadout {
    pub fn with_weapon(weapon: Weapon) -> Self {
        Self {
            weapon: Some(weapon),
        }
    }
}
