//! Type-level access qualifiers for global pointers and references.
//!
//! `Mut` permits reads and writes, `Const` permits reads only. Mutating
//! operations are implemented for `Mut` alone, so a write through a
//! `Const` handle does not build.

use std::fmt::Debug;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Mut {}
    impl Sealed for super::Const {}
}

/// An access qualifier. Implemented only by [`Mut`] and [`Const`].
pub trait Access: sealed::Sealed + Debug + Copy + Send + Sync + 'static {
    const IS_CONST: bool;
    const NAME: &'static str;
}

/// Read-write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mut;

/// Read-only access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const;

impl Access for Mut {
    const IS_CONST: bool = false;
    const NAME: &'static str = "mut";
}

impl Access for Const {
    const IS_CONST: bool = true;
    const NAME: &'static str = "const";
}

/// The access of a projection: `Const` if either side is `Const`.
pub trait JoinAccess<B: Access>: Access {
    type Output: Access;
}

impl JoinAccess<Mut> for Mut {
    type Output = Mut;
}

impl JoinAccess<Const> for Mut {
    type Output = Const;
}

impl JoinAccess<Mut> for Const {
    type Output = Const;
}

impl JoinAccess<Const> for Const {
    type Output = Const;
}
