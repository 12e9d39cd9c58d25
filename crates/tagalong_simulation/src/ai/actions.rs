//! Opportunistic actions: лечение leader'а и передача forage.
//!
//! `perform_action`: один вызов на попытку взаимодействия, максимум одно действие.
//! Doctor update: каждый тик (heal cooldown + экстренное лечение).

use crate::ai::context::{CompanionWorld, DialogueLine};
use crate::ai::cooldowns::Cooldown;
use crate::ai::state_machine::{arena, AiStateMachine};
use crate::components::skills;

impl AiStateMachine {
    /// Попытка opportunistic action. `true`: действие выполнено.
    pub fn perform_action(&mut self, world: &mut dyn CompanionWorld) -> bool {
        if world.has_skill(skills::DOCTOR)
            && world
                .leader()
                .health
                .is_below_fraction(self.config.heal_health_divisor)
            && self.try_heal_leader(world)
        {
            world.say(DialogueLine::Heal);
            return true;
        }

        if world.has_skill(skills::FORAGER) {
            let forage = arena(&mut self.controllers).forage_mut();
            if forage.has_any_forage() && forage.give_forage_to(world) {
                world.say(DialogueLine::GiveForages);
                self.monitor.log("🎁 Companion gave forage to leader");
                return true;
            }
        }

        false
    }

    /// Лечение leader'а, если heal cooldown готов и есть medkit.
    ///
    /// Лечит процент от max health (случайный в `heal_percent_range`).
    pub fn try_heal_leader(&mut self, world: &mut dyn CompanionWorld) -> bool {
        if !self.cooldowns.is_ready(Cooldown::Heal) || self.medkits == 0 {
            return false;
        }

        let leader = world.leader();
        if !leader.health.is_alive() {
            return false;
        }

        let percent = world.roll_ticks(self.config.heal_percent_range);
        let amount = (leader.health.max * percent / 100).max(1);

        world.heal_leader(amount);
        self.medkits -= 1;
        self.cooldowns.arm(Cooldown::Heal, self.config.heal_cooldown);

        self.monitor.log(&format!(
            "💊 Healed leader for {} HP ({} medkits left)",
            amount, self.medkits
        ));
        true
    }

    /// Doctor tick: heal cooldown -1, экстренное лечение при критическом HP.
    ///
    /// Экстренное лечение: не чаще раза за шаг часов (latch сбрасывает
    /// `on_time_changed`).
    pub fn update_doctor(&mut self, world: &mut dyn CompanionWorld) {
        self.cooldowns.tick_heal();

        if self.life_saved {
            return;
        }

        let critical = world
            .leader()
            .health
            .is_below_fraction(self.config.critical_health_divisor);
        if critical && self.try_heal_leader(world) {
            self.life_saved = true;
            world.say(DialogueLine::Heal);
            self.monitor.info("🚑 Companion saved leader's life");
        }
    }

    /// Время суток сменилось
    pub fn on_time_changed(&mut self, old: u32, new: u32) {
        self.life_saved = false;
        self.monitor
            .log(&format!("Time changed {:04} -> {:04}", old, new));
    }
}
