//! FSM компоненты: состояния компаньона и параметры AI.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CompanionError, Result};

/// Состояния companion AI (закрытый набор)
///
/// Ровно одно состояние текущее; каждому соответствует свой behavior controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum CompanionState {
    /// Follow: сопровождаем leader'а (состояние по умолчанию)
    #[default]
    Follow,
    /// Fight: дерёмся с ближайшим монстром
    Fight,
    /// Idle: стоим/отдыхаем рядом с leader'ом
    Idle,
    /// Forage: собираем forage вокруг
    Forage,
}

impl CompanionState {
    pub const ALL: [CompanionState; 4] = [
        CompanionState::Follow,
        CompanionState::Fight,
        CompanionState::Idle,
        CompanionState::Forage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompanionState::Follow => "FOLLOW",
            CompanionState::Fight => "FIGHT",
            CompanionState::Idle => "IDLE",
            CompanionState::Forage => "FORAGE",
        }
    }
}

impl fmt::Display for CompanionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Параметры companion AI
///
/// Все таймеры в тиках (FixedUpdate 60Hz). Диапазоны: inclusive `(lo, hi)`
/// для `RandomSource::roll`. Шансы вида "1 из N".
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Каждые N тиков: side effects + проверка переходов
    pub transition_interval: u64,
    /// Радиус обнаружения монстров (тайлы)
    pub monster_distance: f32,
    /// Leader считается рядом ближе этой дистанции (тайлы)
    pub leader_near_distance: f32,

    /// Grace после рекрута: не форажим сразу
    pub recruit_forage_grace: u32,
    /// Lock после принудительного возврата в FOLLOW
    pub return_to_follow_cooldown: u32,
    /// Lock после warp в новую локацию
    pub warp_cooldown: u32,
    /// Foraging cooldown после входа в FORAGE
    pub forage_cooldown_range: (i32, i32),
    /// Прибавка к foraging cooldown при уходе в IDLE
    pub idle_forage_increment: (i32, i32),
    pub forage_chance: i32,

    pub scared_cooldown: u32,
    pub scared_shake_millis: u32,
    pub cry_chance: i32,
    pub flee_chance: i32,
    /// Lock после flee (прыжок + визг)
    pub flee_cooldown: u32,
    pub flee_sound: String,

    pub heal_cooldown: u32,
    /// Opportunistic heal: leader health < max / divisor
    pub heal_health_divisor: u32,
    /// Emergency (life saving) heal: leader health < max / divisor
    pub critical_health_divisor: u32,
    /// Heal в процентах от max health
    pub heal_percent_range: (i32, i32),
    pub medkits: u32,

    /// Follow: ближе этой дистанции стоим рядом
    pub follow_distance: f32,
    /// Follow idle: leader стоит на месте дольше N тиков
    pub follow_rest_ticks: u32,
    /// Idle grace period перед возвратом в FOLLOW
    pub idle_grace_range: (i32, i32),
    /// Idle прерывается, если leader ушёл дальше
    pub idle_leave_distance: f32,
    /// Fight: радиус поиска целей
    pub fight_engage_radius: f32,
    pub forage_search_radius: f32,
    pub forage_reach: f32,
    pub forage_bag_capacity: usize,

    /// Тиков на один шаг часов (10 игровых минут)
    pub ticks_per_time_step: u64,
    /// Время (HHMM), после которого компаньон сам уходит домой
    pub auto_dismiss_time: u32,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            transition_interval: 15,
            monster_distance: 9.0,
            leader_near_distance: 11.0,

            recruit_forage_grace: 500,
            return_to_follow_cooldown: 100,
            warp_cooldown: 30,
            forage_cooldown_range: (500, 2000),
            idle_forage_increment: (300, 700),
            forage_chance: 5,

            scared_cooldown: 1200,
            scared_shake_millis: 1000,
            cry_chance: 8,
            flee_chance: 5,
            flee_cooldown: 200,
            flee_sound: "batScreech".to_string(),

            heal_cooldown: 750,
            heal_health_divisor: 3,
            critical_health_divisor: 5,
            heal_percent_range: (25, 40),
            medkits: 3,

            follow_distance: 2.0,
            follow_rest_ticks: 600,
            idle_grace_range: (180, 480),
            idle_leave_distance: 5.0,
            fight_engage_radius: 12.0,
            forage_search_radius: 10.0,
            forage_reach: 1.0,
            forage_bag_capacity: 5,

            ticks_per_time_step: 420, // 7 сек реального времени
            auto_dismiss_time: 2200,
        }
    }
}

impl CompanionConfig {
    /// Проверка диапазонов и шансов (вызывается при сборке state machine)
    pub fn validate(&self) -> Result<()> {
        if self.transition_interval == 0 {
            return Err(CompanionError::InvalidConfig(
                "transition_interval must be positive".into(),
            ));
        }

        let ranges = [
            ("forage_cooldown_range", self.forage_cooldown_range),
            ("idle_forage_increment", self.idle_forage_increment),
            ("heal_percent_range", self.heal_percent_range),
            ("idle_grace_range", self.idle_grace_range),
        ];
        for (name, (lo, hi)) in ranges {
            if lo < 0 || lo > hi {
                return Err(CompanionError::InvalidConfig(format!(
                    "{name}: expected 0 <= lo <= hi, got ({lo}, {hi})"
                )));
            }
        }

        let chances = [
            ("forage_chance", self.forage_chance),
            ("cry_chance", self.cry_chance),
            ("flee_chance", self.flee_chance),
        ];
        for (name, chance) in chances {
            if chance < 1 {
                return Err(CompanionError::InvalidConfig(format!(
                    "{name}: 1-in-N chance needs N >= 1, got {chance}"
                )));
            }
        }

        if self.heal_health_divisor == 0 || self.critical_health_divisor == 0 {
            return Err(CompanionError::InvalidConfig(
                "health divisors must be positive".into(),
            ));
        }

        Ok(())
    }
}
