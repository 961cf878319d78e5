//! Index-space building blocks for partitioned global address space
//! containers.
//!
//! Provides lazily composed views ([`ViewSubMod`], [`ViewLocalMod`])
//! over a distributed index space, the [`Pattern`] abstraction that
//! maps global indices to the units owning them, and [`seq`], a small
//! algebra over fixed-length sequences used for per-dimension offsets
//! and extents.
//!
//! Nothing in this crate touches memory: views describe index ranges,
//! and containers bind those ranges to data.

mod index;
pub use index::DefaultIndex;
pub use index::IndexType;
pub use index::LocalRange;

mod pattern;
pub use pattern::BlockPattern;
pub use pattern::LocalPosition;
pub use pattern::Pattern;
pub use pattern::PatternError;

/// Operations over fixed-length sequences.
pub mod seq;

mod view;
pub use view::DistributedOrigin;
pub use view::IndexSpace;
pub use view::LocalProjection;
pub use view::ViewDomain;
pub use view::ViewError;
pub use view::ViewExt;
pub use view::ViewLocalMod;
pub use view::ViewOrigin;
pub use view::ViewSubMod;
pub use view::ViewTraits;
/// Free-function forms of the view combinators.
pub use view::domain;
pub use view::local;
pub use view::origin;
pub use view::sub;
