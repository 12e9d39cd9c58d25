//! ECS host для companion AI.
//!
//! `CompanionScene` собирает queries/resources, нужные state machine, и на время
//! одного вызова (update, perform_action, setup, …) строит `EcsCompanionWorld`:
//! mutable view тела компаньона + leader'а и снимки монстров/forage в той же локации.
//! Всё, что уходит наружу (HUD, реплики, звуки, удары), копится в outbox и
//! пишется events после вызова.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::context::*;
use crate::ai::events::*;
use crate::ai::game_loop::{GameLoop, LoopChannel};
use crate::ai::state_machine::AiStateMachine;
use crate::ai::{CompanionBrain, CompanionState};
use crate::components::*;
use crate::DeterministicRng;

/// Исходящие эффекты одного вызова state machine
#[derive(Debug, Default)]
pub struct CompanionOutbox {
    pub states: Vec<CompanionState>,
    pub locations: Vec<(String, String)>,
    pub lines: Vec<DialogueLine>,
    pub sounds: Vec<String>,
    pub strikes: Vec<(Entity, u32)>,
    pub collected: Vec<Entity>,
}

/// `CompanionWorld` поверх ECS компонентов
pub struct EcsCompanionWorld<'a> {
    body: &'a mut Companion,
    position: &'a mut WorldPosition,
    location: &'a mut Location,
    movement: &'a mut MovementCommand,
    leader_entity: Entity,
    leader_position: Vec2,
    leader_health: &'a mut Health,
    leader_inventory: &'a mut Inventory,
    hostiles: Vec<HostileTarget>,
    forage: Vec<(ForageSpot, ForageItem)>,
    rng: &'a mut DeterministicRng,
    outbox: CompanionOutbox,
}

impl SkillGate for EcsCompanionWorld<'_> {
    fn has_skill(&self, skill: &str) -> bool {
        self.body.has_skill(skill)
    }
}

impl ThreatQuery for EcsCompanionWorld<'_> {
    fn companion_position(&self) -> Vec2 {
        self.position.0
    }

    fn leader(&self) -> LeaderView {
        LeaderView {
            entity: self.leader_entity,
            position: self.leader_position,
            health: *self.leader_health,
        }
    }

    fn nearest_hostile_within(&self, radius: f32) -> Option<HostileTarget> {
        let origin = self.position.0;
        self.hostiles
            .iter()
            .map(|hostile| (hostile, origin.distance(hostile.position)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(hostile, _)| *hostile)
    }
}

impl DisplaySink for EcsCompanionWorld<'_> {
    fn set_companion_state(&mut self, state: CompanionState) {
        self.outbox.states.push(state);
    }

    fn location_changed(&mut self, previous: &str, current: &str) {
        self.outbox
            .locations
            .push((previous.to_string(), current.to_string()));
    }

    fn say(&mut self, line: DialogueLine) {
        self.outbox.lines.push(line);
    }
}

impl LocationService for EcsCompanionWorld<'_> {
    fn companion_location(&self) -> String {
        self.location.0.clone()
    }

    fn warp_companion(&mut self, location: &str, position: Vec2) {
        self.location.0 = location.to_string();
        self.position.0 = position;
        *self.movement = MovementCommand::Idle;
        // Снимки прошлой локации больше не актуальны
        self.hostiles.clear();
        self.forage.clear();
    }
}

impl RandomSource for EcsCompanionWorld<'_> {
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        self.rng.roll(lo, hi)
    }
}

impl CompanionBody for EcsCompanionWorld<'_> {
    fn set_movement(&mut self, command: MovementCommand) {
        *self.movement = command;
    }

    fn jump(&mut self) {
        self.body.jump();
    }

    fn shake(&mut self, millis: u32) {
        self.body.shake(millis);
    }

    fn is_emoting(&self) -> bool {
        self.body.is_emoting()
    }

    fn emote(&mut self, emote: Emote) {
        self.body.do_emote(emote);
    }

    fn play_sound(&mut self, cue: &str) {
        self.outbox.sounds.push(cue.to_string());
    }
}

impl LeaderCare for EcsCompanionWorld<'_> {
    fn heal_leader(&mut self, amount: u32) {
        self.leader_health.heal(amount);
    }

    fn give_to_leader(&mut self, items: &[ForageItem]) -> bool {
        self.leader_inventory.try_add_all(items)
    }
}

impl ForageWorld for EcsCompanionWorld<'_> {
    fn nearest_forage_within(&self, radius: f32) -> Option<ForageSpot> {
        let origin = self.position.0;
        self.forage
            .iter()
            .map(|(spot, _)| (spot, origin.distance(spot.position)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(spot, _)| *spot)
    }

    fn collect_forage(&mut self, spot: Entity) -> Option<ForageItem> {
        let index = self.forage.iter().position(|(s, _)| s.entity == spot)?;
        let (spot, item) = self.forage.remove(index);
        self.outbox.collected.push(spot.entity);
        Some(item)
    }
}

impl CombatWorld for EcsCompanionWorld<'_> {
    fn strike(&mut self, target: Entity, damage: u32) {
        self.outbox.strikes.push((target, damage));
    }
}

type CompanionBodyQuery = (
    &'static mut Companion,
    &'static mut WorldPosition,
    &'static mut Location,
    &'static mut MovementCommand,
    &'static Loadout,
);

/// Всё окружение компаньонов, кроме самих brains
#[derive(SystemParam)]
pub struct CompanionScene<'w, 's> {
    bodies: Query<'w, 's, CompanionBodyQuery, (Without<Leader>, Without<Hostile>)>,
    leaders: Query<
        'w,
        's,
        (
            &'static mut Health,
            &'static WorldPosition,
            &'static mut Inventory,
        ),
        (With<Leader>, Without<Companion>),
    >,
    hostiles: Query<
        'w,
        's,
        (Entity, &'static WorldPosition, &'static Location, &'static Health),
        (With<Hostile>, Without<Companion>, Without<Leader>),
    >,
    forage: Query<
        'w,
        's,
        (Entity, &'static WorldPosition, &'static Location, &'static Forageable),
        (Without<Companion>, Without<Leader>),
    >,
    rng: ResMut<'w, DeterministicRng>,
    game_loop: ResMut<'w, GameLoop>,
    commands: Commands<'w, 's>,
    state_events: EventWriter<'w, CompanionStateChanged>,
    location_events: EventWriter<'w, CompanionLocationChanged>,
    spoke_events: EventWriter<'w, CompanionSpoke>,
    sound_events: EventWriter<'w, CompanionSound>,
    strike_events: EventWriter<'w, CompanionStrike>,
    /// Forage, собранный в этом запуске системы (despawn отложен до sync point)
    collected: Local<'s, Vec<Entity>>,
}

impl<'w, 's> CompanionScene<'w, 's> {
    pub fn tick(&self) -> u64 {
        self.game_loop.tick()
    }

    pub fn subscribers(&self, channel: LoopChannel) -> Vec<Entity> {
        self.game_loop.subscribers(channel)
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    pub fn begin_pass(&mut self) {
        self.collected.clear();
    }

    /// Имя + оружие из loadout (для сборки state machine)
    pub fn profile(&self, companion: Entity) -> Option<(String, Option<Weapon>)> {
        let (body, _, _, _, loadout) = self.bodies.get(companion).ok()?;
        Some((body.name.clone(), loadout.weapon.clone()))
    }

    /// Построить world view компаньона и выполнить `f`; затем разослать outbox.
    ///
    /// `None`: компаньон или leader отсутствуют.
    pub fn with_world<R>(
        &mut self,
        companion: Entity,
        leader: Entity,
        f: impl FnOnce(&mut dyn CompanionWorld, &mut GameLoop) -> R,
    ) -> Option<R> {
        let Ok((mut body, mut position, mut location, mut movement, _)) =
            self.bodies.get_mut(companion)
        else {
            crate::logger::log_warning(&format!("⚠️ Companion {:?} has no body", companion));
            return None;
        };
        let Ok((mut leader_health, leader_position, mut leader_inventory)) =
            self.leaders.get_mut(leader)
        else {
            crate::logger::log_warning(&format!(
                "⚠️ Leader {:?} of companion {:?} not found",
                leader, companion
            ));
            return None;
        };

        let here = location.0.clone();
        let hostiles = self
            .hostiles
            .iter()
            .filter(|(_, _, loc, health)| loc.0 == here && health.is_alive())
            .map(|(entity, pos, _, _)| HostileTarget {
                entity,
                position: pos.0,
            })
            .collect();
        let forage = self
            .forage
            .iter()
            .filter(|(entity, _, loc, _)| loc.0 == here && !self.collected.contains(entity))
            .map(|(entity, pos, _, forageable)| {
                (
                    ForageSpot {
                        entity,
                        position: pos.0,
                    },
                    forageable.item.clone(),
                )
            })
            .collect();

        let mut world = EcsCompanionWorld {
            body: &mut body,
            position: &mut position,
            location: &mut location,
            movement: &mut movement,
            leader_entity: leader,
            leader_position: leader_position.0,
            leader_health: &mut leader_health,
            leader_inventory: &mut leader_inventory,
            hostiles,
            forage,
            rng: &mut self.rng,
            outbox: CompanionOutbox::default(),
        };

        let result = f(&mut world, &mut self.game_loop);
        let outbox = world.outbox;
        self.flush(companion, outbox);

        Some(result)
    }

    /// Остановить тело компаньона (если оно ещё есть)
    fn halt_body(&mut self, companion: Entity) {
        if let Ok((_, _, _, mut movement, _)) = self.bodies.get_mut(companion) {
            *movement = MovementCommand::Idle;
        }
    }

    fn flush(&mut self, companion: Entity, outbox: CompanionOutbox) {
        for state in outbox.states {
            self.state_events
                .write(CompanionStateChanged { companion, state });
        }
        for (previous, current) in outbox.locations {
            self.location_events.write(CompanionLocationChanged {
                companion,
                previous,
                current,
            });
        }
        for line in outbox.lines {
            self.spoke_events.write(CompanionSpoke { companion, line });
        }
        for cue in outbox.sounds {
            self.sound_events.write(CompanionSound { companion, cue });
        }
        for (target, damage) in outbox.strikes {
            self.strike_events.write(CompanionStrike {
                attacker: companion,
                target,
                damage,
            });
        }
        for spot in outbox.collected {
            self.commands.entity(spot).despawn();
            self.collected.push(spot);
        }
    }
}

/// Brains + scene: точка входа систем в state machine
#[derive(SystemParam)]
pub struct CompanionHost<'w, 's> {
    brains: Query<'w, 's, &'static mut CompanionBrain>,
    pub scene: CompanionScene<'w, 's>,
}

impl CompanionHost<'_, '_> {
    /// Вызвать `f` для state machine компаньона с его world view.
    ///
    /// `None`: компаньон не recruited (нет brain) или world view не собрать.
    pub fn drive<R>(
        &mut self,
        companion: Entity,
        f: impl FnOnce(&mut AiStateMachine, &mut dyn CompanionWorld, &mut GameLoop) -> R,
    ) -> Option<R> {
        let Ok(mut brain) = self.brains.get_mut(companion) else {
            return None;
        };
        let brain = &mut *brain;
        let leader = brain.leader;
        let machine = &mut brain.machine;

        self.scene
            .with_world(companion, leader, |world, ticks| f(machine, world, ticks))
    }

    /// Teardown state machine без world view: нужны только brain и game loop.
    ///
    /// `None`: компаньон не recruited.
    pub fn release(&mut self, companion: Entity) -> Option<crate::error::Result<()>> {
        let mut brain = self.brains.get_mut(companion).ok()?;
        let result = brain.machine.release(&mut *self.scene.game_loop);
        self.scene.halt_body(companion);
        Some(result)
    }

    pub fn is_recruited(&self, companion: Entity) -> bool {
        self.brains.contains(companion)
    }

    /// Recruited компаньоны данного leader'а
    pub fn companions_of(&self, leader: Entity) -> Vec<Entity> {
        let mut companions: Vec<Entity> = self
            .brains
            .iter()
            .filter(|brain| brain.leader == leader)
            .map(|brain| brain.machine.owner())
            .collect();
        companions.sort();
        companions
    }
}
