//! Side effects: реакции, не зависящие от текущего состояния (страх).

use crate::ai::context::CompanionWorld;
use crate::ai::cooldowns::Cooldown;
use crate::ai::state_machine::AiStateMachine;
use crate::ai::CompanionState;
use crate::components::{skills, Emote};

impl AiStateMachine {
    /// Fear reaction: пугливый компаньон рядом с монстром.
    ///
    /// Shake + scared cooldown всегда; cry и flee: по шансу.
    /// Flee не срабатывает в FIGHT.
    pub fn do_side_effects(&mut self, world: &mut dyn CompanionWorld) {
        if !world.has_skill(skills::SCARED)
            || !self.cooldowns.is_ready(Cooldown::Scared)
            || !self.is_there_any_monster(world)
        {
            return;
        }

        world.shake(self.config.scared_shake_millis);
        self.cooldowns
            .arm(Cooldown::Scared, self.config.scared_cooldown);

        if !world.is_emoting() && world.one_in(self.config.cry_chance) {
            world.emote(Emote::Cry);
        }

        if self.current != CompanionState::Fight && world.one_in(self.config.flee_chance) {
            world.halt();
            world.jump();
            world.play_sound(&self.config.flee_sound);
            self.cooldowns
                .arm(Cooldown::ChangeState, self.config.flee_cooldown);

            if !world.is_emoting() {
                world.emote(Emote::Exclamation);
            }
            self.monitor.log("😱 Companion is scared and flees");
        }
    }
}
