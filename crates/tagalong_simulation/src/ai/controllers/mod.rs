//! Behavior controllers: per-state логика компаньона.
//!
//! Один controller на каждое `CompanionState`, создаются один раз в `setup`
//! и живут весь recruited lifetime. Activate/Deactivate вызывает только
//! orchestrator; он же гарантирует "ровно один активный".

use crate::ai::context::CompanionWorld;
use crate::ai::{CompanionConfig, CompanionState};
use crate::components::Weapon;

pub mod fight;
pub mod follow;
pub mod forage;
pub mod idle;

pub use fight::FightController;
pub use follow::FollowController;
pub use forage::ForageController;
pub use idle::IdleController;

/// Контракт behavior controller'а
pub trait BehaviorController: Send + Sync {
    /// Вход в состояние (binding движения и т.п.)
    fn activate(&mut self, world: &mut dyn CompanionWorld);

    /// Выход из состояния. Безопасен без предшествующего activate.
    fn deactivate(&mut self, world: &mut dyn CompanionWorld);

    fn update(&mut self, tick: u64, world: &mut dyn CompanionWorld);

    /// "Этому поведению больше нечего делать": pure query
    fn is_idle(&self) -> bool;

    fn is_active(&self) -> bool;
}

/// Arena controller'ов, индексируется `CompanionState`
///
/// Набор закрытый, поэтому поля + `match`, а не map из trait objects.
pub struct ControllerSet {
    follow: FollowController,
    fight: FightController,
    idle: IdleController,
    forage: ForageController,
}

impl ControllerSet {
    pub fn new(config: &CompanionConfig, weapon: Weapon) -> Self {
        Self {
            follow: FollowController::new(config),
            fight: FightController::new(config, weapon),
            idle: IdleController::new(config),
            forage: ForageController::new(config),
        }
    }

    pub fn get(&self, state: CompanionState) -> &dyn BehaviorController {
        match state {
            CompanionState::Follow => &self.follow,
            CompanionState::Fight => &self.fight,
            CompanionState::Idle => &self.idle,
            CompanionState::Forage => &self.forage,
        }
    }

    pub fn get_mut(&mut self, state: CompanionState) -> &mut dyn BehaviorController {
        match state {
            CompanionState::Follow => &mut self.follow,
            CompanionState::Fight => &mut self.fight,
            CompanionState::Idle => &mut self.idle,
            CompanionState::Forage => &mut self.forage,
        }
    }

    /// Forage controller нужен напрямую: transition guard + hand-off
    pub fn forage(&self) -> &ForageController {
        &self.forage
    }

    pub fn forage_mut(&mut self) -> &mut ForageController {
        &mut self.forage
    }

    /// Состояния, чьи controllers сейчас активны (инвариант: ровно одно)
    pub fn active_states(&self) -> Vec<CompanionState> {
        CompanionState::ALL
            .into_iter()
            .filter(|state| self.get(*state).is_active())
            .collect()
    }
}
