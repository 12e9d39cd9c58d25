//! AI компоненты: brain компаньона + state/config

// NOTE: CompanionState и CompanionConfig живут в crate::ai (ai/components/fsm.rs),
// здесь re-export для единообразия импорта
pub use crate::ai::{CompanionBrain, CompanionConfig, CompanionState};
