//! Companion reaction systems (time of day, leader warps, interactions, strikes, HUD).

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ai::context::{CompanionBody, DialogueLine, DisplaySink};
use crate::ai::events::*;
use crate::ai::game_loop::LoopChannel;
use crate::ai::host::CompanionHost;
use crate::ai::{CompanionConfig, CompanionState};
use crate::components::{Emote, Health, Hostile};

/// System: реакция на смену часов
///
/// Сбрасывает life-saving latch у всех подписчиков TimeChanged.
/// Поздно вечером (`auto_dismiss_time`) компаньон прощается и уходит сам.
pub fn react_to_time_of_day(
    mut changes: EventReader<TimeOfDayChanged>,
    mut host: CompanionHost,
    config: Res<CompanionConfig>,
    mut dismissals: EventWriter<DismissCompanion>,
) {
    for change in changes.read() {
        for companion in host.scene.subscribers(LoopChannel::TimeChanged) {
            let leaving = host.drive(companion, |machine, world, _| {
                machine.on_time_changed(change.old, change.new);

                if change.new < config.auto_dismiss_time {
                    return false;
                }
                world.say(DialogueLine::DismissAuto);
                world.emote(Emote::Sleep);
                true
            });

            if leaving == Some(true) {
                crate::logger::log(&format!(
                    "🌙 {:04}: companion {:?} goes home",
                    change.new, companion
                ));
                dismissals.write(DismissCompanion { companion });
            }
        }
    }
}

/// System: leader перешёл в другую локацию → его компаньоны следом
///
/// На месте компаньон говорит entry реплику новой локации.
pub fn follow_leader_warps(mut warps: EventReader<LeaderWarped>, mut host: CompanionHost) {
    for warp in warps.read() {
        for companion in host.companions_of(warp.leader) {
            host.drive(companion, |machine, world, _| {
                machine.change_location(&warp.location, world);
                world.say(DialogueLine::Entry);
            });
        }
    }
}

/// System: взаимодействие leader'а с компаньоном
///
/// Сначала opportunistic action (heal / передача forage); если AI ничего
/// не сделал (или компаньон не recruited): обычный диалог.
pub fn handle_interactions(
    mut interactions: EventReader<CompanionInteraction>,
    mut host: CompanionHost,
    mut dialogues: EventWriter<DialogueRequested>,
) {
    for interaction in interactions.read() {
        let handled = host
            .drive(interaction.companion, |machine, world, _| {
                machine.perform_action(world)
            })
            .unwrap_or(false);

        if !handled {
            dialogues.write(DialogueRequested {
                companion: interaction.companion,
            });
        }
    }
}

/// System: применение ударов компаньонов по монстрам
pub fn apply_companion_strikes(
    mut strikes: EventReader<CompanionStrike>,
    mut hostiles: Query<&mut Health, With<Hostile>>,
    mut commands: Commands,
) {
    for strike in strikes.read() {
        let Ok(mut health) = hostiles.get_mut(strike.target) else {
            continue;
        };
        if !health.is_alive() {
            continue;
        }

        health.take_damage(strike.damage);
        if !health.is_alive() {
            crate::logger::log(&format!(
                "💀 Hostile {:?} slain by companion {:?}",
                strike.target, strike.attacker
            ));
            commands.entity(strike.target).despawn();
        }
    }
}

/// HUD компаньонов: последнее показанное состояние каждого recruited компаньона
#[derive(Resource, Debug, Default, Clone)]
pub struct CompanionHud {
    states: BTreeMap<Entity, CompanionState>,
}

impl CompanionHud {
    pub fn state_of(&self, companion: Entity) -> Option<CompanionState> {
        self.states.get(&companion).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// System: HUD из CompanionStateChanged; уволенные пропадают
pub fn update_companion_hud(
    mut changes: EventReader<CompanionStateChanged>,
    mut dismissals: EventReader<DismissCompanion>,
    mut hud: ResMut<CompanionHud>,
) {
    for change in changes.read() {
        hud.states.insert(change.companion, change.state);
    }
    for dismissal in dismissals.read() {
        hud.states.remove(&dismissal.companion);
    }
}
