//! Scripted `CompanionWorld` для unit тестов (без ECS).

use std::collections::{HashSet, VecDeque};

use bevy::prelude::*;

use crate::ai::context::*;
use crate::ai::CompanionState;
use crate::components::{Emote, ForageItem, Health, MovementCommand};

pub(crate) fn entity(index: u32) -> Entity {
    Entity::from_raw(index)
}

pub(crate) struct TestWorld {
    pub skills: HashSet<&'static str>,
    pub companion_position: Vec2,
    pub leader: LeaderView,
    pub hostiles: Vec<HostileTarget>,
    pub forage: Vec<(ForageSpot, ForageItem)>,
    /// Scripted rolls; пустая очередь → `hi` ("не повезло")
    pub rolls: VecDeque<i32>,
    pub location: String,
    pub leader_accepts: bool,

    pub movement: MovementCommand,
    pub movement_log: Vec<MovementCommand>,
    pub displayed: Vec<CompanionState>,
    pub location_events: Vec<(String, String)>,
    pub lines: Vec<DialogueLine>,
    pub warps: Vec<(String, Vec2)>,
    pub shakes: u32,
    pub jumps: u32,
    pub emoting: bool,
    pub emotes: Vec<Emote>,
    pub sounds: Vec<String>,
    pub healed: Vec<u32>,
    pub given: Vec<ForageItem>,
    pub strikes: Vec<(Entity, u32)>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            skills: HashSet::new(),
            companion_position: Vec2::ZERO,
            leader: LeaderView {
                entity: entity(1),
                position: Vec2::new(1.0, 0.0),
                health: Health::new(100),
            },
            hostiles: Vec::new(),
            forage: Vec::new(),
            rolls: VecDeque::new(),
            location: "Farm".to_string(),
            leader_accepts: true,

            movement: MovementCommand::Idle,
            movement_log: Vec::new(),
            displayed: Vec::new(),
            location_events: Vec::new(),
            lines: Vec::new(),
            warps: Vec::new(),
            shakes: 0,
            jumps: 0,
            emoting: false,
            emotes: Vec::new(),
            sounds: Vec::new(),
            healed: Vec::new(),
            given: Vec::new(),
            strikes: Vec::new(),
        }
    }

    pub fn with_skills(mut self, skills: &[&'static str]) -> Self {
        self.skills.extend(skills.iter().copied());
        self
    }

    pub fn with_hostile_at(mut self, x: f32, y: f32) -> Self {
        let index = 100 + self.hostiles.len() as u32;
        self.hostiles.push(HostileTarget {
            entity: entity(index),
            position: Vec2::new(x, y),
        });
        self
    }

    pub fn with_forage_at(mut self, x: f32, y: f32, name: &str) -> Self {
        let index = 200 + self.forage.len() as u32;
        self.forage.push((
            ForageSpot {
                entity: entity(index),
                position: Vec2::new(x, y),
            },
            ForageItem::new(name),
        ));
        self
    }

    pub fn script_rolls(&mut self, rolls: &[i32]) {
        self.rolls.extend(rolls.iter().copied());
    }
}

impl SkillGate for TestWorld {
    fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }
}

impl ThreatQuery for TestWorld {
    fn companion_position(&self) -> Vec2 {
        self.companion_position
    }

    fn leader(&self) -> LeaderView {
        self.leader
    }

    fn nearest_hostile_within(&self, radius: f32) -> Option<HostileTarget> {
        self.hostiles
            .iter()
            .map(|h| (h, h.position.distance(self.companion_position)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| *h)
    }
}

impl DisplaySink for TestWorld {
    fn set_companion_state(&mut self, state: CompanionState) {
        self.displayed.push(state);
    }

    fn location_changed(&mut self, previous: &str, current: &str) {
        self.location_events
            .push((previous.to_string(), current.to_string()));
    }

    fn say(&mut self, line: DialogueLine) {
        self.lines.push(line);
    }
}

impl LocationService for TestWorld {
    fn companion_location(&self) -> String {
        self.location.clone()
    }

    fn warp_companion(&mut self, location: &str, position: Vec2) {
        self.location = location.to_string();
        self.companion_position = position;
        self.warps.push((location.to_string(), position));
    }
}

impl RandomSource for TestWorld {
    fn roll(&mut self, lo: i32, hi: i32) -> i32 {
        self.rolls.pop_front().unwrap_or(hi).clamp(lo, hi)
    }
}

impl CompanionBody for TestWorld {
    fn set_movement(&mut self, command: MovementCommand) {
        self.movement = command;
        self.movement_log.push(command);
    }

    fn jump(&mut self) {
        self.jumps += 1;
    }

    fn shake(&mut self, _millis: u32) {
        self.shakes += 1;
    }

    fn is_emoting(&self) -> bool {
        self.emoting
    }

    fn emote(&mut self, emote: Emote) {
        self.emoting = true;
        self.emotes.push(emote);
    }

    fn play_sound(&mut self, cue: &str) {
        self.sounds.push(cue.to_string());
    }
}

impl LeaderCare for TestWorld {
    fn heal_leader(&mut self, amount: u32) {
        self.leader.health.heal(amount);
        self.healed.push(amount);
    }

    fn give_to_leader(&mut self, items: &[ForageItem]) -> bool {
        if !self.leader_accepts {
            return false;
        }
        self.given.extend_from_slice(items);
        true
    }
}

impl ForageWorld for TestWorld {
    fn nearest_forage_within(&self, radius: f32) -> Option<ForageSpot> {
        self.forage
            .iter()
            .map(|(spot, _)| (spot, spot.position.distance(self.companion_position)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(spot, _)| *spot)
    }

    fn collect_forage(&mut self, spot: Entity) -> Option<ForageItem> {
        let index = self.forage.iter().position(|(s, _)| s.entity == spot)?;
        Some(self.forage.remove(index).1)
    }
}

impl CombatWorld for TestWorld {
    fn strike(&mut self, target: Entity, damage: u32) {
        self.strikes.push((target, damage));
    }
}
