//! Cooldown Timer Set: четыре независимых decrement-to-zero счётчика.
//!
//! Взводятся только orchestrator'ом и opportunistic action performer'ом.
//! `u32` гарантирует инвариант "никогда не отрицательный".

use serde::{Deserialize, Serialize};

/// Какой cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cooldown {
    /// Блокирует принудительные переходы (threat preemption, forage)
    ChangeState,
    /// Блокирует повторный вход в FORAGE
    Foraging,
    /// Блокирует повторную fear реакцию
    Scared,
    /// Блокирует opportunistic heal
    Heal,
}

/// Набор cooldown таймеров (тики)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownSet {
    change_state: u32,
    foraging: u32,
    scared: u32,
    heal: u32,
}

impl CooldownSet {
    pub fn remaining(&self, cooldown: Cooldown) -> u32 {
        match cooldown {
            Cooldown::ChangeState => self.change_state,
            Cooldown::Foraging => self.foraging,
            Cooldown::Scared => self.scared,
            Cooldown::Heal => self.heal,
        }
    }

    pub fn is_ready(&self, cooldown: Cooldown) -> bool {
        self.remaining(cooldown) == 0
    }

    /// Взвести на фиксированное значение (перезаписывает остаток)
    pub fn arm(&mut self, cooldown: Cooldown, ticks: u32) {
        *self.slot_mut(cooldown) = ticks;
    }

    /// Продлить (используется для foraging при уходе в IDLE)
    pub fn extend(&mut self, cooldown: Cooldown, ticks: u32) {
        let slot = self.slot_mut(cooldown);
        *slot = slot.saturating_add(ticks);
    }

    /// Тик основного набора: change_state, foraging, scared (-1 пока > 0).
    ///
    /// Heal тикает отдельно в doctor update (только у компаньонов с "doctor").
    pub fn tick(&mut self) {
        for slot in [&mut self.change_state, &mut self.foraging, &mut self.scared] {
            *slot = slot.saturating_sub(1);
        }
    }

    pub fn tick_heal(&mut self) {
        self.heal = self.heal.saturating_sub(1);
    }

    fn slot_mut(&mut self, cooldown: Cooldown) -> &mut u32 {
        match cooldown {
            Cooldown::ChangeState => &mut self.change_state,
            Cooldown::Foraging => &mut self.foraging,
            Cooldown::Scared => &mut self.scared,
            Cooldown::Heal => &mut self.heal,
        }
    }
}
