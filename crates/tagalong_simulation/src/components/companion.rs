//! Companion компонент: skills + emote/animation status

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Loadout, Location, MovementCommand, MovementSpeed, WorldPosition};

/// Skill tags из метаданных компаньона
pub mod skills {
    pub const FIGHTER: &str = "fighter";
    pub const WARRIOR: &str = "warrior";
    pub const DOCTOR: &str = "doctor";
    pub const FORAGER: &str = "forager";
    pub const SCARED: &str = "scared";
}

/// Длительность emote пузыря (тики)
pub const EMOTE_TICKS: u32 = 120;

/// Длительность прыжка (тики)
pub const JUMP_TICKS: u32 = 24;

/// Эмоции над головой компаньона (id совпадают с emote sheet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum Emote {
    Exclamation,
    Sleep,
    Cry,
}

impl Emote {
    pub fn sheet_id(&self) -> u32 {
        match self {
            Emote::Exclamation => 16,
            Emote::Sleep => 24,
            Emote::Cry => 28,
        }
    }
}

/// Компаньон: NPC под управлением AI state machine
///
/// Мутирует активный behavior controller; orchestrator трогает только
/// позу/движение на границах переходов и в fear реакции.
#[derive(Component, Debug, Clone, Default)]
#[require(WorldPosition, Location, MovementCommand, MovementSpeed, Loadout)]
pub struct Companion {
    pub name: String,
    pub skills: HashSet<String>,
    pub emote: Option<Emote>,
    pub emote_ticks: u32,
    pub shake_ticks: u32,
    pub jump_ticks: u32,
}

impl Companion {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_skills<'a>(mut self, skills: impl IntoIterator<Item = &'a str>) -> Self {
        self.skills.extend(skills.into_iter().map(str::to_owned));
        self
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    pub fn is_emoting(&self) -> bool {
        self.emote.is_some()
    }

    pub fn is_shaking(&self) -> bool {
        self.shake_ticks > 0
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_ticks > 0
    }

    pub fn do_emote(&mut self, emote: Emote) {
        self.emote = Some(emote);
        self.emote_ticks = EMOTE_TICKS;
    }

    /// Shake задаётся в миллисекундах (60 тиков = 1 сек)
    pub fn shake(&mut self, millis: u32) {
        self.shake_ticks = millis.saturating_mul(60) / 1000;
    }

    pub fn jump(&mut self) {
        self.jump_ticks = JUMP_TICKS;
    }

    /// Один тик анимаций: emote/shake/jump таймеры → 0
    pub fn tick_animations(&mut self) {
        self.shake_ticks = self.shake_ticks.saturating_sub(1);
        self.jump_ticks = self.jump_ticks.saturating_sub(1);

        if self.emote_ticks > 0 {
            self.emote_ticks -= 1;
            if self.emote_ticks == 0 {
                self.emote = None;
            }
        }
    }
}
