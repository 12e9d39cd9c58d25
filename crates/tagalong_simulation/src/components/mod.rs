//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: Health, Leader, Hostile
//! - companion: Companion (skills, emote/animation status)
//! - movement: MovementCommand, MovementSpeed
//! - world: WorldPosition, Location, Forageable, Inventory
//! - equipment: Loadout, Weapon
//! - ai: CompanionBrain (AI state machine), CompanionState, CompanionConfig

pub mod actor;
pub mod ai;
pub mod companion;
pub mod equipment;
pub mod movement;
pub mod world;

// Re-exports для удобного импорта
pub use actor::*;
pub use ai::*;
pub use companion::*;
pub use equipment::*;
pub use movement::*;
pub use world::*;
