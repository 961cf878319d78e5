use std::fmt;
use std::ptr;

use crate::index::LocalRange;
use crate::view::LocalProjection;
use crate::view::ViewDomain;
use crate::view::ViewTraits;

/// Restricts its domain to the elements resident on the calling unit.
/// Bounds are local indices.
pub struct ViewLocalMod<'a, D: ViewTraits, const DIMDIFF: i32 = 0> {
    domain: &'a D,
}

impl<'a, D: ViewTraits, const DIMDIFF: i32> ViewLocalMod<'a, D, DIMDIFF> {
    pub fn new(domain: &'a D) -> Self {
        Self { domain }
    }

    /// Resolve the node to its local index range.
    pub fn apply(&self) -> LocalRange<D::Index>
    where
        D: LocalProjection,
    {
        self.domain.local_image()
    }

    /// A local view is already local.
    pub fn local(&self) -> &Self {
        self
    }
}

impl<'a, D: ViewTraits, const DIMDIFF: i32> Clone for ViewLocalMod<'a, D, DIMDIFF> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, D: ViewTraits, const DIMDIFF: i32> Copy for ViewLocalMod<'a, D, DIMDIFF> {}

impl<'a, D: ViewTraits, const DIMDIFF: i32> fmt::Debug for ViewLocalMod<'a, D, DIMDIFF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewLocalMod")
            .field("dimdiff", &DIMDIFF)
            .field("domain", &ptr::from_ref(self.domain))
            .finish()
    }
}

impl<'a, D: ViewTraits, const DIMDIFF: i32> ViewTraits for ViewLocalMod<'a, D, DIMDIFF> {
    type Origin = D::Origin;
    type Domain = D;
    type Image = Self;
    type Index = D::Index;

    const IS_PROJECTION: bool = DIMDIFF != 0;
    const IS_VIEW: bool = true;
    const IS_ORIGIN: bool = false;
    const IS_LOCAL: bool = true;
}

impl<'a, D: LocalProjection, const DIMDIFF: i32> ViewDomain for ViewLocalMod<'a, D, DIMDIFF> {
    fn begin(&self) -> D::Index {
        self.apply().begin
    }

    fn end(&self) -> D::Index {
        self.apply().end
    }

    fn domain(&self) -> &D {
        self.domain
    }

    fn origin(&self) -> &D::Origin {
        self.domain.origin()
    }
}

impl<'a, D: ViewTraits, const DIMDIFF: i32> PartialEq for ViewLocalMod<'a, D, DIMDIFF> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other) || ptr::eq(self.domain, other.domain)
    }
}
