use crate::index::DefaultIndex;
use crate::view::ViewDomain;
use crate::view::ViewTraits;

/// The logical root of an unbound view chain.
///
/// A `ViewOrigin` is its own domain and its own origin. Modifiers built
/// on it describe index bounds only, starting at zero, and are bound to
/// data once a container takes the sentinel's place.
///
/// Equality is identity: two origins are equal only if they are the
/// same object. `ViewOrigin` is zero-sized, and distinct zero-sized
/// values are not guaranteed distinct addresses, so identity between
/// separately declared sentinels is unspecified.
#[derive(Debug, Default)]
pub struct ViewOrigin;

impl ViewTraits for ViewOrigin {
    type Origin = Self;
    type Domain = Self;
    type Image = Self;
    type Index = DefaultIndex;

    const IS_PROJECTION: bool = false;
    const IS_VIEW: bool = true;
    const IS_ORIGIN: bool = true;
    const IS_LOCAL: bool = false;
}

impl ViewDomain for ViewOrigin {
    fn begin(&self) -> DefaultIndex {
        0
    }

    fn end(&self) -> DefaultIndex {
        0
    }

    fn domain(&self) -> &Self {
        self
    }

    fn origin(&self) -> &Self {
        self
    }
}

impl PartialEq for ViewOrigin {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
