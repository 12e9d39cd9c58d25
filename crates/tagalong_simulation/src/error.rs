//! Ошибки companion AI

use thiserror::Error;

/// Ошибки конструирования и lifecycle state machine.
///
/// Per-tick логика ошибок не возвращает: отсутствие врага/forage: это
/// `Option`/`bool`, а нарушение инвариантов (нет controller arena): panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanionError {
    /// Обязательный collaborator не передан в builder
    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("invalid companion config: {0}")]
    InvalidConfig(String),

    #[error("state machine is already set up")]
    AlreadySetUp,
}

pub type Result<T> = std::result::Result<T, CompanionError>;
