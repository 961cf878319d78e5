//! Lazily composed views over a distributed index space.
//!
//! A view is a chain of modifier nodes, each holding a borrowed
//! reference to its predecessor (its *domain*). The chain ends at an
//! origin: either the unbound [`ViewOrigin`] sentinel or a container
//! that implements [`DistributedOrigin`]. Composing a view never
//! copies or materializes elements; it only records index bounds.
//!
//! ```text
//!   span.sub::<0>(2, 9)?.local()
//!   :                    :
//!   |                    '--> ViewLocalMod<ViewSubMod<GlobSpan>>
//!   |                                      '-------.-------'
//!   |                                              '--> domain
//!   '--> ViewSubMod<GlobSpan>
//!                   '---.--'
//!                       '--> domain
//! ```
//!
//! Every node type carries a static [`ViewTraits`] record derived from
//! its kind and its domain's record, so algorithms can select behavior
//! without inspecting values.
//!
//! Because nodes borrow their domain, the borrow checker enforces that
//! a domain outlives every node derived from it. One consequence is
//! that each link of a chain must be bound before the next is built:
//!
//! ```
//! use ndview::ViewDomain;
//! use ndview::ViewExt;
//! use ndview::ViewOrigin;
//!
//! let origin = ViewOrigin;
//! let outer = origin.sub::<0>(2, 10).unwrap();
//! let inner = outer.sub::<0>(1, 3).unwrap();
//! assert_eq!((inner.begin(), inner.end()), (3, 5));
//! ```

mod local;
mod origin;
mod sub;

pub use local::ViewLocalMod;
pub use origin::ViewOrigin;
pub use sub::ViewSubMod;

use crate::index::IndexType;
use crate::index::LocalRange;
use crate::pattern::Pattern;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("invalid sub range [{begin}, {end}): bounds must satisfy 0 <= begin <= end")]
    InvalidRange { begin: String, end: String },
}

/// Static properties of a view node type.
pub trait ViewTraits {
    /// The root of the chain this node belongs to.
    type Origin;
    /// The node's immediate predecessor.
    type Domain;
    /// The type a node resolves to when applied.
    type Image;
    type Index: IndexType;

    /// Whether the node changes dimensionality relative to its domain.
    const IS_PROJECTION: bool;
    const IS_VIEW: bool;
    const IS_ORIGIN: bool;
    /// Whether the node's indices are local to the calling unit.
    const IS_LOCAL: bool;
}

/// A node that resolves to a half-open index range.
pub trait ViewDomain: ViewTraits {
    fn begin(&self) -> Self::Index;

    fn end(&self) -> Self::Index;

    fn domain(&self) -> &Self::Domain;

    fn origin(&self) -> &Self::Origin;

    fn size(&self) -> Self::Index {
        self.end() - self.begin()
    }

    fn empty(&self) -> bool {
        self.size() == Self::Index::ZERO
    }
}

/// A node whose index range can be restricted to the elements resident
/// on the calling unit.
pub trait LocalProjection: ViewDomain {
    /// The calling unit's share of this node, in local indices.
    fn local_image(&self) -> LocalRange<Self::Index>;
}

/// The container side of a chain: an origin laid out by a pattern.
pub trait DistributedOrigin {
    type Pattern: Pattern;

    fn pattern(&self) -> &Self::Pattern;
}

/// Per-dimension bounds of an `N`-dimensional node.
pub trait IndexSpace<const N: usize>: ViewTraits {
    /// Offset of the node's first element in each dimension.
    fn offsets(&self) -> [Self::Index; N];

    /// Number of elements in each dimension.
    fn extents(&self) -> [Self::Index; N];
}

/// Composition entry points available on every node.
pub trait ViewExt: ViewDomain + Sized {
    /// Restrict dimension `DIM` of this node to `[begin, end)`.
    fn sub<const DIM: usize>(
        &self,
        begin: Self::Index,
        end: Self::Index,
    ) -> Result<ViewSubMod<'_, Self, DIM>, ViewError> {
        ViewSubMod::new(self, begin, end)
    }

    /// Fix dimension `DIM` of this node at `index`, dropping the
    /// dimension.
    fn project<const DIM: usize>(
        &self,
        index: Self::Index,
    ) -> Result<ViewSubMod<'_, Self, DIM, { -1 }>, ViewError> {
        ViewSubMod::new(self, index, index + Self::Index::ONE)
    }

    /// Restrict this node to the calling unit's resident elements.
    fn local(&self) -> ViewLocalMod<'_, Self>
    where
        Self: LocalProjection,
    {
        ViewLocalMod::new(self)
    }
}

impl<V: ViewDomain> ViewExt for V {}

/// Restrict dimension `DIM` of `domain` to `[begin, end)`.
pub fn sub<const DIM: usize, V: ViewDomain>(
    begin: V::Index,
    end: V::Index,
    domain: &V,
) -> Result<ViewSubMod<'_, V, DIM>, ViewError> {
    ViewSubMod::new(domain, begin, end)
}

/// Restrict `domain` to the calling unit's resident elements.
pub fn local<V: LocalProjection>(domain: &V) -> ViewLocalMod<'_, V> {
    ViewLocalMod::new(domain)
}

pub fn domain<V: ViewDomain>(view: &V) -> &V::Domain {
    view.domain()
}

pub fn origin<V: ViewDomain>(view: &V) -> &V::Origin {
    view.origin()
}
