use pvp_core::EntityId;

/// Reasons a damage request is rejected before anything is mutated
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRequest {
    #[error("raw damage amount {0} is negative")]
    NegativeAmount(f32),

    #[error("raw damage amount is not a finite number")]
    NonFiniteAmount,

    #[error("defender {0} is not registered")]
    DefenderMissing(EntityId),

    #[error("defender {0} has been removed")]
    DefenderRemoved(EntityId),
}

/// Errors surfaced by the combat engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CombatError {
    #[error("invalid damage request: {0}")]
    InvalidRequest(#[from] InvalidRequest),

    #[error("entity reference {0} does not resolve")]
    UnresolvedReference(EntityId),
}
