use std::fmt;
use std::ptr;

use crate::index::IndexType;
use crate::index::LocalRange;
use crate::pattern::Pattern;
use crate::seq;
use crate::view::DistributedOrigin;
use crate::view::IndexSpace;
use crate::view::LocalProjection;
use crate::view::ViewDomain;
use crate::view::ViewError;
use crate::view::ViewLocalMod;
use crate::view::ViewTraits;

/// Restricts dimension `DIM` of its domain to the offsets
/// `[begin, end)`. A non-zero `DIMDIFF` marks a projection that changes
/// the dimensionality of the domain (`-1` fixes one index).
///
/// Offsets are relative to the domain and compose additively: the
/// node's first index is `domain.begin() + begin`.
pub struct ViewSubMod<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32 = 0> {
    domain: &'a D,
    begin: D::Index,
    end: D::Index,
}

impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> ViewSubMod<'a, D, DIM, DIMDIFF> {
    pub const DIM_DIFF: i32 = DIMDIFF;

    /// Restrict `domain` to `[begin, end)`. Fails unless
    /// `0 <= begin <= end`.
    pub fn new(domain: &'a D, begin: D::Index, end: D::Index) -> Result<Self, ViewError> {
        if begin < D::Index::ZERO || end < begin {
            return Err(ViewError::InvalidRange {
                begin: begin.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { domain, begin, end })
    }

    /// The begin offset relative to the domain.
    pub fn offset_begin(&self) -> D::Index {
        self.begin
    }

    /// The end offset relative to the domain.
    pub fn offset_end(&self) -> D::Index {
        self.end
    }

    pub fn local(&self) -> ViewLocalMod<'_, Self, DIMDIFF>
    where
        Self: LocalProjection,
    {
        ViewLocalMod::new(self)
    }
}

impl<'a, D: ViewTraits, const DIM: usize> ViewSubMod<'a, D, DIM, { -1 }> {
    /// The index at which dimension `DIM` is fixed.
    pub fn index(&self) -> D::Index {
        self.begin
    }

    /// Offsets of the remaining dimensions.
    pub fn projected_offsets<const N: usize, const M: usize>(&self) -> [D::Index; M]
    where
        D: IndexSpace<N>,
    {
        seq::remove_nth::<DIM, D::Index, N, M>(&self.domain.offsets())
    }

    /// Extents of the remaining dimensions.
    pub fn projected_extents<const N: usize, const M: usize>(&self) -> [D::Index; M]
    where
        D: IndexSpace<N>,
    {
        seq::remove_nth::<DIM, D::Index, N, M>(&self.domain.extents())
    }
}

impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> Clone
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> Copy
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
}

impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> fmt::Debug
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewSubMod")
            .field("dim", &DIM)
            .field("dimdiff", &DIMDIFF)
            .field("domain", &ptr::from_ref(self.domain))
            .field("begin", &self.begin)
            .field("end", &self.end)
            .finish()
    }
}

impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> ViewTraits
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
    type Origin = D::Origin;
    type Domain = D;
    type Image = Self;
    type Index = D::Index;

    const IS_PROJECTION: bool = DIMDIFF != 0;
    const IS_VIEW: bool = true;
    const IS_ORIGIN: bool = false;
    const IS_LOCAL: bool = D::IS_LOCAL;
}

impl<'a, D: ViewDomain, const DIM: usize, const DIMDIFF: i32> ViewDomain
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
    fn begin(&self) -> D::Index {
        self.domain.begin() + self.begin
    }

    fn end(&self) -> D::Index {
        self.domain.begin() + self.end
    }

    fn domain(&self) -> &D {
        self.domain
    }

    fn origin(&self) -> &D::Origin {
        self.domain.origin()
    }
}

/// Two sub ranges are equal if they are the same node, or if they
/// restrict the *same* domain object to the same offsets. Domains are
/// compared by address, never by value.
impl<'a, D: ViewTraits, const DIM: usize, const DIMDIFF: i32> PartialEq
    for ViewSubMod<'a, D, DIM, DIMDIFF>
{
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
            || (ptr::eq(self.domain, other.domain)
                && self.begin == other.begin
                && self.end == other.end)
    }
}

/// Intersects the sub range with the calling unit's resident range.
impl<'a, D, const DIM: usize, const DIMDIFF: i32> LocalProjection
    for ViewSubMod<'a, D, DIM, DIMDIFF>
where
    D: ViewDomain,
    D::Origin: DistributedOrigin,
    <D::Origin as DistributedOrigin>::Pattern: Pattern<Index = D::Index>,
{
    fn local_image(&self) -> LocalRange<D::Index> {
        if D::IS_LOCAL {
            // Bounds are local indices already.
            return LocalRange::new(self.begin(), self.end());
        }
        let pattern = self.origin().pattern();
        let capacity = pattern.local_capacity();
        if capacity <= D::Index::ZERO {
            return LocalRange::empty();
        }
        let first = pattern.global(D::Index::ZERO);
        let last = pattern.global(capacity - D::Index::ONE) + D::Index::ONE;
        let begin = self.begin().max(first).min(last);
        let end = self.end().min(last).max(begin);
        LocalRange::new(pattern.local(begin), pattern.local(end))
    }
}

impl<'a, D, const DIM: usize, const N: usize> IndexSpace<N> for ViewSubMod<'a, D, DIM, 0>
where
    D: IndexSpace<N>,
{
    fn offsets(&self) -> [D::Index; N] {
        let offsets = self.domain.offsets();
        seq::replace_nth::<DIM, D::Index, N>(offsets[DIM] + self.begin, &offsets)
    }

    fn extents(&self) -> [D::Index; N] {
        seq::replace_nth::<DIM, D::Index, N>(self.end - self.begin, &self.domain.extents())
    }
}
