//! Companion events: вход от игры (recruit, interaction, warp) и выход AI
//! (state/location/dialogue/sound/strike) для presentation layer.

use bevy::prelude::*;

use crate::ai::context::DialogueLine;
use crate::ai::CompanionState;

/// Рекрут компаньона: setup state machine, подписка на game loop
#[derive(Event, Debug, Clone, Copy)]
pub struct RecruitCompanion {
    pub companion: Entity,
    pub leader: Entity,
}

/// Увольнение: dispose state machine, отписка
#[derive(Event, Debug, Clone, Copy)]
pub struct DismissCompanion {
    pub companion: Entity,
}

/// Leader заговорил с компаньоном (одна попытка = один `perform_action`)
#[derive(Event, Debug, Clone, Copy)]
pub struct CompanionInteraction {
    pub companion: Entity,
}

/// Interaction не обработан AI → обычный диалог (dialogue layer вне симуляции)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueRequested {
    pub companion: Entity,
}

/// HUD / observers: компаньон сменил состояние
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionStateChanged {
    pub companion: Entity,
    pub state: CompanionState,
}

/// Компаньон переместился в другую локацию
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CompanionLocationChanged {
    pub companion: Entity,
    pub previous: String,
    pub current: String,
}

/// Leader перешёл в другую локацию (warp); recruited компаньоны идут следом
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct LeaderWarped {
    pub leader: Entity,
    pub location: String,
}

/// Шаг часов (HHMM)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDayChanged {
    pub old: u32,
    pub new: u32,
}

/// Удар компаньона (применяется в `apply_companion_strikes`)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionStrike {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: u32,
}

/// Реплика компаньона (ключ диалога)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanionSpoke {
    pub companion: Entity,
    pub line: DialogueLine,
}

/// Звуковой cue
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct CompanionSound {
    pub companion: Entity,
    pub cue: String,
}
