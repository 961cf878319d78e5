use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Identifies a unit within the global team.
pub type UnitId = u32;

/// Identifies a team of units.
pub type TeamId = i16;

/// Identifies a memory segment registered with the engine.
pub type SegmentId = i16;

/// An opaque address in the partitioned global address space.
///
/// The fields are never interpreted by the reference layer. Offsets are
/// advanced only through [`crate::CommEngine::increment_address`], which
/// checks them against the bounds of the addressed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalAddress {
    unit_id: UnitId,
    flags: u8,
    segment_id: SegmentId,
    team_id: TeamId,
    offset: u64,
}

impl GlobalAddress {
    pub fn new(
        unit_id: UnitId,
        flags: u8,
        segment_id: SegmentId,
        team_id: TeamId,
        offset: u64,
    ) -> Self {
        Self {
            unit_id,
            flags,
            segment_id,
            team_id,
            offset,
        }
    }

    pub fn unit_id(&self) -> UnitId {
        self.unit_id
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Byte offset into the addressed segment.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The same address at byte offset `offset`.
    pub fn with_offset(&self, offset: u64) -> Self {
        Self { offset, ..*self }
    }
}

impl fmt::Display for GlobalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:06X}|{:02X}|{:04X}|{:04X}|{:016X})",
            self.unit_id, self.flags, self.segment_id, self.team_id, self.offset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let addr = GlobalAddress::new(3, 0, 1, 0, 0x40);
        assert_eq!(addr.to_string(), "(000003|00|0001|0000|0000000000000040)");

        let addr = GlobalAddress::new(0xABCDEF, 0xFF, 0x7FFF, 2, u64::MAX);
        assert_eq!(
            addr.to_string(),
            "(ABCDEF|FF|7FFF|0002|FFFFFFFFFFFFFFFF)"
        );
    }

    #[test]
    fn test_with_offset() {
        let addr = GlobalAddress::new(1, 0, 0, 0, 8);
        let moved = addr.with_offset(24);
        assert_eq!(moved.offset(), 24);
        assert_eq!(
            (moved.unit_id(), moved.flags(), moved.segment_id(), moved.team_id()),
            (1, 0, 0, 0)
        );
        assert_ne!(addr, moved);
        assert_eq!(addr, moved.with_offset(8));
    }
}
