//! AI State Machine: orchestrator компаньона.
//!
//! Владеет текущим состоянием, arena controller'ов и cooldown'ами.
//! Порядок одного тика (load-bearing, guards читают уже уменьшенные cooldowns):
//! 1. cooldowns -1 (change_state, foraging, scared)
//! 2. каждые `transition_interval` тиков: side effects → проверка переходов
//! 3. doctor update (heal cooldown + life saving), если есть skill "doctor"
//! 4. update активного controller'а
//!
//! Side effects: `ai/side_effects.rs`, opportunistic actions: `ai/actions.rs`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::context::CompanionWorld;
use crate::ai::controllers::{BehaviorController, ControllerSet};
use crate::ai::cooldowns::{Cooldown, CooldownSet};
use crate::ai::game_loop::{LoopChannel, Subscription, TickSource};
use crate::ai::{CompanionConfig, CompanionState};
use crate::components::skills;
use crate::components::Weapon;
use crate::error::{CompanionError, Result};
use crate::logger::Monitor;

/// Сериализуемый снимок brain'а (для save / debug overlay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainSnapshot {
    pub state: CompanionState,
    pub cooldowns: CooldownSet,
    pub medkits: u32,
    pub life_saved: bool,
}

/// Builder: все обязательные collaborators проверяются в `build()`
#[derive(Default)]
pub struct StateMachineBuilder {
    owner: Option<Entity>,
    monitor: Option<Monitor>,
    weapon: Option<Weapon>,
    config: Option<CompanionConfig>,
}

impl StateMachineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity компаньона: identity подписчика в game loop
    pub fn owner(mut self, owner: Entity) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn maybe_weapon(mut self, weapon: Option<Weapon>) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn config(mut self, config: CompanionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<AiStateMachine> {
        let owner = self
            .owner
            .ok_or(CompanionError::MissingDependency("owner"))?;
        let monitor = self
            .monitor
            .ok_or(CompanionError::MissingDependency("monitor"))?;
        let weapon = self
            .weapon
            .ok_or(CompanionError::MissingDependency("weapon"))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(AiStateMachine {
            owner,
            monitor,
            weapon,
            medkits: config.medkits,
            config,
            current: CompanionState::Follow,
            controllers: None,
            cooldowns: CooldownSet::default(),
            life_saved: false,
            subscriptions: Vec::new(),
        })
    }
}

/// State machine companion AI
pub struct AiStateMachine {
    pub(crate) owner: Entity,
    pub(crate) monitor: Monitor,
    pub(crate) config: CompanionConfig,
    weapon: Weapon,
    pub(crate) current: CompanionState,
    pub(crate) controllers: Option<ControllerSet>,
    pub(crate) cooldowns: CooldownSet,
    pub(crate) medkits: u32,
    pub(crate) life_saved: bool,
    subscriptions: Vec<Subscription>,
}

/// Arena доступна только между setup и dispose; иначе: ошибка использования
pub(crate) fn arena(controllers: &mut Option<ControllerSet>) -> &mut ControllerSet {
    match controllers {
        Some(set) => set,
        None => panic!("companion AI controllers accessed outside of setup/dispose lifetime"),
    }
}

impl AiStateMachine {
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    pub fn owner(&self) -> Entity {
        self.owner
    }

    pub fn current_state(&self) -> CompanionState {
        self.current
    }

    pub fn cooldowns(&self) -> &CooldownSet {
        &self.cooldowns
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    pub fn medkits(&self) -> u32 {
        self.medkits
    }

    pub fn life_saved(&self) -> bool {
        self.life_saved
    }

    /// `None` до setup и после dispose
    pub fn controllers(&self) -> Option<&ControllerSet> {
        self.controllers.as_ref()
    }

    pub fn current_controller(&self) -> &dyn BehaviorController {
        match &self.controllers {
            Some(set) => set.get(self.current),
            None => panic!("companion AI controllers accessed outside of setup/dispose lifetime"),
        }
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            state: self.current,
            cooldowns: self.cooldowns,
            medkits: self.medkits,
            life_saved: self.life_saved,
        }
    }

    /// Setup: подписки на game loop, controllers, FOLLOW, forage grace.
    ///
    /// Подписки берутся первыми: при ошибке уже взятые отдаются обратно,
    /// arena не создаётся, повторный setup возможен.
    pub fn setup(
        &mut self,
        world: &mut dyn CompanionWorld,
        ticks: &mut dyn TickSource,
    ) -> Result<()> {
        if self.is_set_up() {
            return Err(CompanionError::AlreadySetUp);
        }

        for channel in [LoopChannel::UpdateTicked, LoopChannel::TimeChanged] {
            match ticks.subscribe(channel, self.owner) {
                Ok(subscription) => self.subscriptions.push(subscription),
                Err(err) => {
                    // Ошибки отката уже в логе, наружу идёт исходная
                    let _ = self.release_subscriptions(ticks);
                    return Err(err);
                }
            }
        }

        self.controllers = Some(ControllerSet::new(&self.config, self.weapon.clone()));

        // По умолчанию AI идёт за leader'ом
        self.change_state(CompanionState::Follow, world);

        // Не форажим сразу после рекрута
        self.cooldowns
            .arm(Cooldown::Foraging, self.config.recruit_forage_grace);

        self.monitor.info("AI state machine set up");
        Ok(())
    }

    /// Между setup и dispose (или release)
    pub fn is_set_up(&self) -> bool {
        self.controllers.is_some() || !self.subscriptions.is_empty()
    }

    /// Смена состояния: deactivate → current = target → activate → HUD.
    ///
    /// Смена на текущее состояние тоже проходит deactivate + activate.
    pub fn change_state(&mut self, target: CompanionState, world: &mut dyn CompanionWorld) {
        self.monitor
            .log(&format!("AI changes state {} -> {}", self.current, target));

        arena(&mut self.controllers)
            .get_mut(self.current)
            .deactivate(world);
        self.current = target;
        arena(&mut self.controllers)
            .get_mut(target)
            .activate(world);

        world.set_companion_state(target);
    }

    /// Один внешний тик
    pub fn update(&mut self, tick: u64, world: &mut dyn CompanionWorld) {
        self.cooldowns.tick();

        if tick % self.config.transition_interval == 0 {
            self.do_side_effects(world);
            self.check_potential_state_change(world);
        }

        if world.has_skill(skills::DOCTOR) {
            self.update_doctor(world);
        }

        arena(&mut self.controllers)
            .get_mut(self.current)
            .update(tick, world);
    }

    /// Правила переходов в фиксированном порядке приоритета.
    ///
    /// Каждое правило перечитывает текущее состояние: за один проход
    /// возможно больше одного перехода.
    pub fn check_potential_state_change(&mut self, world: &mut dyn CompanionWorld) {
        // 1. Threat preemption
        if world.has_any_skill(&[skills::FIGHTER, skills::WARRIOR])
            && self.cooldowns.is_ready(Cooldown::ChangeState)
            && self.current != CompanionState::Fight
            && self.leader_is_near(world)
            && self.is_there_any_monster(world)
        {
            self.change_state(CompanionState::Fight, world);
            self.monitor.log("⚔️ A monster is here!");
        }

        // 2. Return to follow on idleness
        if self.current != CompanionState::Follow && self.current_controller().is_idle() {
            self.cooldowns
                .arm(Cooldown::ChangeState, self.config.return_to_follow_cooldown);
            self.change_state(CompanionState::Follow, world);
        }

        // 3. Opportunistic foraging
        if world.has_skill(skills::FORAGER) && self.follow_or_idle() && self.can_forage(world) {
            let cooldown = world.roll_ticks(self.config.forage_cooldown_range);
            self.cooldowns.arm(Cooldown::Foraging, cooldown);
            self.change_state(CompanionState::Forage, world);
        }

        // 4. Idle fallback
        if self.current == CompanionState::Follow && self.current_controller().is_idle() {
            let increment = world.roll_ticks(self.config.idle_forage_increment);
            self.cooldowns.extend(Cooldown::Foraging, increment);
            self.change_state(CompanionState::Idle, world);
        }
    }

    /// Warp к leader'у в новую локацию + короткий lock переходов
    pub fn change_location(&mut self, location: &str, world: &mut dyn CompanionWorld) {
        let previous = world.companion_location();
        let leader_position = world.leader().position;

        world.warp_companion(location, leader_position);
        self.cooldowns
            .arm(Cooldown::ChangeState, self.config.warp_cooldown);

        self.monitor
            .log(&format!("Companion warped {} -> {}", previous, location));
        world.location_changed(&previous, location);
    }

    /// Dispose: deactivate текущего, затем `release`
    pub fn dispose(
        &mut self,
        world: &mut dyn CompanionWorld,
        ticks: &mut dyn TickSource,
    ) -> Result<()> {
        if let Some(set) = self.controllers.as_mut() {
            set.get_mut(self.current).deactivate(world);
        }

        self.release(ticks)
    }

    /// Teardown без world view (leader пропал, тело недоступно).
    ///
    /// Arena очищается и все подписки отдаются всегда; возвращается
    /// первая ошибка unsubscribe.
    pub fn release(&mut self, ticks: &mut dyn TickSource) -> Result<()> {
        self.controllers = None;
        let result = self.release_subscriptions(ticks);

        self.monitor.info("AI state machine disposed");
        result
    }

    fn release_subscriptions(&mut self, ticks: &mut dyn TickSource) -> Result<()> {
        let mut first_error = None;

        for subscription in self.subscriptions.drain(..) {
            if let Err(err) = ticks.unsubscribe(subscription) {
                self.monitor.warn(&format!(
                    "⚠️ Unsubscribe from {:?} failed: {}",
                    subscription.channel(),
                    err
                ));
                first_error.get_or_insert(err);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn is_there_any_monster(&self, world: &dyn CompanionWorld) -> bool {
        world
            .nearest_hostile_within(self.config.monster_distance)
            .is_some()
    }

    fn leader_is_near(&self, world: &dyn CompanionWorld) -> bool {
        world.distance_to_leader() < self.config.leader_near_distance
    }

    fn follow_or_idle(&self) -> bool {
        matches!(self.current, CompanionState::Follow | CompanionState::Idle)
    }

    /// Forage eligibility; random roll последним (не тратим draw впустую)
    fn can_forage(&mut self, world: &mut dyn CompanionWorld) -> bool {
        self.leader_is_near(world)
            && self.cooldowns.is_ready(Cooldown::ChangeState)
            && self.cooldowns.is_ready(Cooldown::Foraging)
            && arena(&mut self.controllers).forage().can_forage(world)
            && world.one_in(self.config.forage_chance)
    }

    #[cfg(test)]
    pub(crate) fn cooldowns_mut(&mut self) -> &mut CooldownSet {
        &mut self.cooldowns
    }
}
