use std::fmt;

use bytemuck::Pod;

use crate::address::GlobalAddress;
use crate::address::SegmentId;
use crate::address::UnitId;
use crate::engine::AddressError;
use crate::engine::CommEngine;
use crate::engine::fatal;
use crate::glob_ptr::GlobPtr;
use crate::team::Team;

/// Everything a unit needs to resolve global addresses: the
/// communication engine, the unit's team and the segment holding the
/// team's shared memory.
///
/// Pointers and references borrow the context they were created from,
/// so a context outlives every handle that uses it.
pub struct Context {
    engine: Box<dyn CommEngine>,
    team: Box<dyn Team>,
    segment: SegmentId,
}

impl Context {
    pub fn new(engine: Box<dyn CommEngine>, team: Box<dyn Team>, segment: SegmentId) -> Self {
        Self {
            engine,
            team,
            segment,
        }
    }

    pub fn engine(&self) -> &dyn CommEngine {
        self.engine.as_ref()
    }

    pub fn team(&self) -> &dyn Team {
        self.team.as_ref()
    }

    pub fn my_unit_id(&self) -> UnitId {
        self.team.my_unit_id()
    }

    /// Number of units in the team.
    pub fn size(&self) -> usize {
        self.team.size()
    }

    /// Block until every unit of the team has arrived. A failed barrier
    /// is fatal.
    pub fn barrier(&self) {
        tracing::debug!(unit = self.my_unit_id(), team = self.team.id(), "barrier");
        if let Err(err) = self.team.barrier() {
            fatal("barrier", &err);
        }
    }

    /// The first byte of `unit`'s segment.
    pub fn segment_base(&self, unit: UnitId) -> GlobalAddress {
        GlobalAddress::new(unit, 0, self.segment, self.team.id(), 0)
    }

    /// A typed pointer to the first byte of `unit`'s segment.
    pub fn segment_ptr<T>(&self, unit: UnitId) -> GlobPtr<'_, T> {
        GlobPtr::new(self, self.segment_base(unit))
    }

    /// Whether `address` lives on the calling unit.
    pub fn is_local(&self, address: GlobalAddress) -> bool {
        match self.engine.resolve_local_unit(address.team_id()) {
            Ok(unit) => unit == address.unit_id(),
            Err(err) => fatal("resolve_local_unit", &err),
        }
    }

    /// `address` moved by `increment` bytes.
    pub fn increment_address(
        &self,
        address: GlobalAddress,
        increment: i64,
    ) -> Result<GlobalAddress, AddressError> {
        let moved = self.engine.increment_address(address, increment)?;
        tracing::trace!(%address, increment, %moved, "increment_address");
        Ok(moved)
    }

    /// Fetch `dest.len()` consecutive elements starting at `address`.
    /// Blocks until the transfer has completed. Failures are fatal.
    pub fn get_blocking<T: Pod>(&self, address: GlobalAddress, dest: &mut [T]) {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(dest);
        tracing::trace!(%address, len = bytes.len(), "get_blocking");
        if let Err(err) = self.engine.get_blocking(address, bytes) {
            fatal("get", &err);
        }
    }

    /// Store `src` as consecutive elements starting at `address`.
    /// Blocks until the transfer has completed. Failures are fatal.
    pub fn put_blocking<T: Pod>(&self, address: GlobalAddress, src: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(src);
        tracing::trace!(%address, len = bytes.len(), "put_blocking");
        if let Err(err) = self.engine.put_blocking(address, bytes) {
            fatal("put", &err);
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("unit", &self.team.my_unit_id())
            .field("team", &self.team.id())
            .field("size", &self.team.size())
            .field("segment", &self.segment)
            .finish()
    }
}
