//! AI components

pub mod brain;
pub mod fsm;


// Re-export all components
pub use brain::*;
pub use fsm::*;
