//! World context для companion AI: внешние collaborators как traits.
//!
//! Controllers не держат back-reference на orchestrator: каждый вызов
//! (`activate`, `update`, …) получает `&mut dyn CompanionWorld`.
//! ECS хост реализует его поверх queries (`ai::host`), тесты: scripted mock.

use bevy::prelude::*;

use crate::components::{Emote, ForageItem, Health, MovementCommand};
use crate::ai::CompanionState;

/// Ближайший монстр (результат threat query)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileTarget {
    pub entity: Entity,
    pub position: Vec2,
}

/// Forage spot рядом с компаньоном
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForageSpot {
    pub entity: Entity,
    pub position: Vec2,
}

/// Read-only снимок leader'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderView {
    pub entity: Entity,
    pub position: Vec2,
    pub health: Health,
}

/// Реплики компаньона (текст/локализация: вне симуляции, здесь только ключ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogueLine {
    /// После лечения leader'а
    Heal,
    /// Relationship-specific реплика при передаче forage
    GiveForages,
    /// Поздно, компаньон уходит сам
    DismissAuto,
    /// Реплика над головой при входе в локацию (текст по текущей локации)
    Entry,
}

impl DialogueLine {
    pub fn key(&self) -> &'static str {
        match self {
            DialogueLine::Heal => "heal",
            DialogueLine::GiveForages => "giveForages",
            DialogueLine::DismissAuto => "companionDismissAuto",
            DialogueLine::Entry => "entry",
        }
    }
}

/// Skill gate: есть ли у компаньона skill tag
pub trait SkillGate {
    fn has_skill(&self, skill: &str) -> bool;

    fn has_any_skill(&self, skills: &[&str]) -> bool {
        skills.iter().any(|skill| self.has_skill(skill))
    }
}

/// Proximity / threat запросы (только текущая локация компаньона)
pub trait ThreatQuery {
    fn companion_position(&self) -> Vec2;

    fn leader(&self) -> LeaderView;

    fn nearest_hostile_within(&self, radius: f32) -> Option<HostileTarget>;

    fn distance(&self, a: Vec2, b: Vec2) -> f32 {
        a.distance(b)
    }

    fn distance_to_leader(&self) -> f32 {
        self.distance(self.companion_position(), self.leader().position)
    }
}

/// Fire-and-forget уведомления наружу (HUD, observers, dialogue)
pub trait DisplaySink {
    fn set_companion_state(&mut self, state: CompanionState);

    fn location_changed(&mut self, previous: &str, current: &str);

    fn say(&mut self, line: DialogueLine);
}

/// Warp между локациями (синхронный, всегда успешен для валидной позиции)
pub trait LocationService {
    fn companion_location(&self) -> String;

    fn warp_companion(&mut self, location: &str, position: Vec2);
}

/// Uniform integer draw в `[lo, hi]` (inclusive)
///
/// Инжектится, чтобы тесты могли подставить детерминированную последовательность.
pub trait RandomSource {
    fn roll(&mut self, lo: i32, hi: i32) -> i32;

    /// Шанс "1 из n"
    fn one_in(&mut self, n: i32) -> bool {
        self.roll(1, n) == 1
    }

    /// Roll диапазона конфига как тики (отрицательное → 0)
    fn roll_ticks(&mut self, range: (i32, i32)) -> u32 {
        u32::try_from(self.roll(range.0, range.1)).unwrap_or(0)
    }
}

/// Актуаторы тела компаньона
pub trait CompanionBody {
    fn set_movement(&mut self, command: MovementCommand);

    fn halt(&mut self) {
        self.set_movement(MovementCommand::Stop);
    }

    fn jump(&mut self);

    fn shake(&mut self, millis: u32);

    fn is_emoting(&self) -> bool;

    fn emote(&mut self, emote: Emote);

    fn play_sound(&mut self, cue: &str);
}

/// Действия над leader'ом (heal, hand-off)
pub trait LeaderCare {
    fn heal_leader(&mut self, amount: u32);

    /// `false`: leader не принял (нет места)
    fn give_to_leader(&mut self, items: &[ForageItem]) -> bool;
}

pub trait ForageWorld {
    fn nearest_forage_within(&self, radius: f32) -> Option<ForageSpot>;

    /// `None`: spot уже собран/исчез
    fn collect_forage(&mut self, spot: Entity) -> Option<ForageItem>;
}

pub trait CombatWorld {
    fn strike(&mut self, target: Entity, damage: u32);
}

/// Всё окружение компаньона одним trait object'ом
pub trait CompanionWorld:
    SkillGate
    + ThreatQuery
    + DisplaySink
    + LocationService
    + RandomSource
    + CompanionBody
    + LeaderCare
    + ForageWorld
    + CombatWorld
{
}

impl<T> CompanionWorld for T where
    T: SkillGate
        + ThreatQuery
        + DisplaySink
        + LocationService
        + RandomSource
        + CompanionBody
        + LeaderCare
        + ForageWorld
        + CombatWorld
{
}
