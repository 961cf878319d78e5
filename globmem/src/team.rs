use crate::address::TeamId;
use crate::address::UnitId;
use crate::engine::EngineError;

/// A group of units supporting collective synchronization.
pub trait Team: Send + Sync {
    fn id(&self) -> TeamId;

    /// The calling unit's id within the team.
    fn my_unit_id(&self) -> UnitId;

    /// Number of units in the team.
    fn size(&self) -> usize;

    /// Block until every unit of the team has arrived.
    fn barrier(&self) -> Result<(), EngineError>;
}
