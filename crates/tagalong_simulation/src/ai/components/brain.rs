//! Brain компаньона: AI state machine как ECS компонент.

use bevy::prelude::*;

use crate::ai::state_machine::AiStateMachine;

/// Recruited компаньон: state machine + leader, за которым он ходит.
///
/// Вставляется `recruit_companions` после успешного setup, удаляется при dismiss.
#[derive(Component)]
pub struct CompanionBrain {
    pub leader: Entity,
    pub machine: AiStateMachine,
}

impl CompanionBrain {
    pub fn state(&self) -> crate::ai::CompanionState {
        self.machine.current_state()
    }
}
