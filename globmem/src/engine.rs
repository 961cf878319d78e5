use crate::address::GlobalAddress;
use crate::address::SegmentId;
use crate::address::TeamId;
use crate::address::UnitId;

/// Status codes reported alongside fatal engine failures.
pub mod status {
    pub const INVALID: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const OTHER: i32 = 999;
}

/// A byte-offset increment the engine refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("moving {address} by {increment} bytes leaves its segment of {size} bytes")]
    OutOfRange {
        address: GlobalAddress,
        increment: i64,
        size: u64,
    },

    #[error("{address} does not name a registered segment")]
    UnknownSegment { address: GlobalAddress },

    #[error("increment of {increment} elements of {elem_size} bytes overflows")]
    Overflow { increment: i64, elem_size: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown unit {unit}")]
    UnknownUnit { unit: UnitId },

    #[error("unknown segment {segment}")]
    UnknownSegment { segment: SegmentId },

    #[error("unknown team {team}")]
    UnknownTeam { team: TeamId },

    #[error("transfer of {len} bytes at {address} exceeds its segment of {size} bytes")]
    OutOfBounds {
        address: GlobalAddress,
        len: usize,
        size: u64,
    },

    #[error("segment of unit {unit} is poisoned")]
    Poisoned { unit: UnitId },

    #[error("unit {unit} failed")]
    UnitFailed { unit: UnitId },

    #[error(transparent)]
    Address(#[from] AddressError),
}

impl EngineError {
    /// The status code reported for this error.
    pub fn code(&self) -> i32 {
        match self {
            EngineError::UnknownUnit { .. }
            | EngineError::UnknownSegment { .. }
            | EngineError::UnknownTeam { .. } => status::NOT_FOUND,
            EngineError::OutOfBounds { .. } | EngineError::Address(_) => status::INVALID,
            EngineError::Poisoned { .. } | EngineError::UnitFailed { .. } => status::OTHER,
        }
    }
}

/// The one-sided communication engine the reference layer issues
/// requests against.
///
/// Transfers are blocking: they return once the bytes have been copied.
/// The target unit takes no part in the transfer.
pub trait CommEngine: Send + Sync {
    /// Copy `dest.len()` bytes starting at `address` into `dest`.
    fn get_blocking(&self, address: GlobalAddress, dest: &mut [u8]) -> Result<(), EngineError>;

    /// Copy `src` to the bytes starting at `address`.
    fn put_blocking(&self, address: GlobalAddress, src: &[u8]) -> Result<(), EngineError>;

    /// `address` moved by `increment` bytes.
    fn increment_address(
        &self,
        address: GlobalAddress,
        increment: i64,
    ) -> Result<GlobalAddress, AddressError>;

    /// The calling unit's id within `team`.
    fn resolve_local_unit(&self, team: TeamId) -> Result<UnitId, EngineError>;
}

/// Report a failed engine operation and terminate.
pub(crate) fn fatal(op: &str, err: &EngineError) -> ! {
    let code = err.code();
    tracing::error!(op, status = code, "{}", err);
    panic!("{} failed with status {}: {}", op, code, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let address = GlobalAddress::new(0, 0, 0, 0, 0);
        assert_eq!(EngineError::UnknownUnit { unit: 9 }.code(), 3);
        assert_eq!(EngineError::UnknownTeam { team: 1 }.code(), 3);
        assert_eq!(
            EngineError::OutOfBounds {
                address,
                len: 8,
                size: 4
            }
            .code(),
            2
        );
        assert_eq!(EngineError::Poisoned { unit: 0 }.code(), 999);
        assert_eq!(EngineError::UnitFailed { unit: 1 }.code(), 999);

        let err: EngineError = AddressError::UnknownSegment { address }.into();
        assert_eq!(err.code(), 2);
        assert_eq!(
            err.to_string(),
            "(000000|00|0000|0000|0000000000000000) does not name a registered segment"
        );
    }

    #[test]
    #[should_panic(expected = "get failed with status 3: unknown unit 7")]
    fn test_fatal() {
        fatal("get", &EngineError::UnknownUnit { unit: 7 });
    }
}
