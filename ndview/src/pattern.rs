use serde::Deserialize;
use serde::Serialize;

use crate::index::DefaultIndex;
use crate::index::IndexType;

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("a pattern needs at least one unit")]
    NoUnits,

    #[error("unit {unit} is not part of a team of {units} units")]
    UnitOutOfRange { unit: usize, units: usize },

    #[error("negative pattern size {size}")]
    NegativeSize { size: DefaultIndex },
}

/// The owner of a global index together with its offset in the owner's
/// local index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPosition<I> {
    pub unit: usize,
    pub index: I,
}

/// A distribution strategy mapping between the global index space and
/// the local index space of the calling unit.
///
/// `global` and `local` are relative to the unit the pattern was built
/// for: `local(global(i)) == i` for every `i` in
/// `[0, local_capacity())`.
pub trait Pattern {
    type Index: IndexType;

    /// The global index of the calling unit's local index `local`.
    fn global(&self, local: Self::Index) -> Self::Index;

    /// The offset of `global` from the calling unit's first global
    /// index. The result lies outside `[0, local_capacity())` when the
    /// calling unit does not own `global`.
    fn local(&self, global: Self::Index) -> Self::Index;

    /// Number of elements resident on the calling unit.
    fn local_capacity(&self) -> Self::Index;

    /// Number of elements in the whole index space.
    fn size(&self) -> Self::Index;

    /// The unit owning `global`, and its local index there.
    fn locate(&self, global: Self::Index) -> LocalPosition<Self::Index>;

    /// The unit owning `global`.
    fn unit_at(&self, global: Self::Index) -> usize {
        self.locate(global).unit
    }
}

/// A balanced one-dimensional block distribution: unit `u` owns the
/// contiguous global range `[u * block, min((u + 1) * block, size))`
/// where `block = ceil(size / units)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPattern {
    size: DefaultIndex,
    units: usize,
    unit: usize,
    block: DefaultIndex,
}

impl BlockPattern {
    /// Distribute `size` elements over `units` units, as seen from
    /// `unit`.
    pub fn new(size: DefaultIndex, units: usize, unit: usize) -> Result<Self, PatternError> {
        if units == 0 {
            return Err(PatternError::NoUnits);
        }
        if unit >= units {
            return Err(PatternError::UnitOutOfRange { unit, units });
        }
        if size < 0 {
            return Err(PatternError::NegativeSize { size });
        }
        let nunits = units as DefaultIndex;
        let block = (size + nunits - 1) / nunits;
        Ok(Self {
            size,
            units,
            unit,
            block,
        })
    }

    /// The same distribution, as seen from another unit.
    pub fn for_unit(&self, unit: usize) -> Result<Self, PatternError> {
        Self::new(self.size, self.units, unit)
    }

    pub fn block_size(&self) -> DefaultIndex {
        self.block
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    fn first_global(&self, unit: usize) -> DefaultIndex {
        (unit as DefaultIndex * self.block).min(self.size)
    }
}

impl Pattern for BlockPattern {
    type Index = DefaultIndex;

    fn global(&self, local: DefaultIndex) -> DefaultIndex {
        self.first_global(self.unit) + local
    }

    fn local(&self, global: DefaultIndex) -> DefaultIndex {
        global - self.first_global(self.unit)
    }

    fn local_capacity(&self) -> DefaultIndex {
        self.first_global(self.unit + 1) - self.first_global(self.unit)
    }

    fn size(&self) -> DefaultIndex {
        self.size
    }

    fn locate(&self, global: DefaultIndex) -> LocalPosition<DefaultIndex> {
        if self.block == 0 {
            return LocalPosition { unit: 0, index: 0 };
        }
        LocalPosition {
            unit: (global / self.block) as usize,
            index: global % self.block,
        }
    }
}
