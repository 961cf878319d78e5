use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Sub;
use std::ops::SubAssign;

use crate::access::Access;
use crate::access::Const;
use crate::access::Mut;
use crate::address::GlobalAddress;
use crate::context::Context;
use crate::engine::AddressError;
use crate::engine::EngineError;
use crate::engine::fatal;
use crate::glob_ref::GlobRef;

/// A typed pointer into global memory.
///
/// Arithmetic moves the address by whole elements of `T`; every step is
/// validated by the engine against the bounds of the addressed segment,
/// and a rejected step is fatal. Pointers compare by address.
pub struct GlobPtr<'c, T, A: Access = Mut> {
    ctx: &'c Context,
    address: GlobalAddress,
    _marker: PhantomData<fn() -> (T, A)>,
}

impl<'c, T, A: Access> GlobPtr<'c, T, A> {
    pub fn new(ctx: &'c Context, address: GlobalAddress) -> Self {
        Self {
            ctx,
            address,
            _marker: PhantomData,
        }
    }

    pub fn address(&self) -> GlobalAddress {
        self.address
    }

    pub fn context(&self) -> &'c Context {
        self.ctx
    }

    /// The pointer moved by `count` elements, or the engine's reason for
    /// refusing the move.
    pub fn checked_offset(&self, count: isize) -> Result<Self, AddressError> {
        let elem_size = mem::size_of::<T>();
        let overflow = AddressError::Overflow {
            increment: count as i64,
            elem_size,
        };
        let bytes = i64::try_from(elem_size)
            .ok()
            .and_then(|size| (count as i64).checked_mul(size))
            .ok_or(overflow)?;
        let address = self.ctx.increment_address(self.address, bytes)?;
        Ok(Self::new(self.ctx, address))
    }

    /// The pointer moved by `count` elements. Fatal if the engine rejects
    /// the move.
    pub fn offset(&self, count: isize) -> Self {
        match self.checked_offset(count) {
            Ok(ptr) => ptr,
            Err(err) => fatal("increment_address", &EngineError::from(err)),
        }
    }

    /// A reference to the pointee. No data is transferred.
    pub fn to_ref(&self) -> GlobRef<'c, T, A> {
        GlobRef::new(self.ctx, self.address)
    }

    /// A reference to the element `count` elements past the pointee.
    pub fn at(&self, count: isize) -> GlobRef<'c, T, A> {
        self.offset(count).to_ref()
    }

    /// Whether the pointee lives on the calling unit.
    pub fn is_local(&self) -> bool {
        self.ctx.is_local(self.address)
    }

    pub fn as_const(&self) -> GlobPtr<'c, T, Const> {
        GlobPtr::new(self.ctx, self.address)
    }
}

impl<'c, T> GlobPtr<'c, T, Const> {
    /// Drop the const qualifier. This is the only narrowing conversion;
    /// the caller asserts that writing through the result is permitted.
    pub fn cast_mut(&self) -> GlobPtr<'c, T, Mut> {
        GlobPtr::new(self.ctx, self.address)
    }
}

impl<'c, T> From<GlobPtr<'c, T, Mut>> for GlobPtr<'c, T, Const> {
    fn from(ptr: GlobPtr<'c, T, Mut>) -> Self {
        ptr.as_const()
    }
}

impl<'c, T, A: Access> Clone for GlobPtr<'c, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, T, A: Access> Copy for GlobPtr<'c, T, A> {}

impl<'c, T, A: Access> Add<isize> for GlobPtr<'c, T, A> {
    type Output = Self;

    fn add(self, count: isize) -> Self {
        self.offset(count)
    }
}

impl<'c, T, A: Access> Sub<isize> for GlobPtr<'c, T, A> {
    type Output = Self;

    fn sub(self, count: isize) -> Self {
        match count.checked_neg() {
            Some(neg) => self.offset(neg),
            None => fatal(
                "increment_address",
                &EngineError::from(AddressError::Overflow {
                    increment: count as i64,
                    elem_size: mem::size_of::<T>(),
                }),
            ),
        }
    }
}

impl<'c, T, A: Access> AddAssign<isize> for GlobPtr<'c, T, A> {
    fn add_assign(&mut self, count: isize) {
        *self = *self + count;
    }
}

impl<'c, T, A: Access> SubAssign<isize> for GlobPtr<'c, T, A> {
    fn sub_assign(&mut self, count: isize) {
        *self = *self - count;
    }
}

impl<'a, 'b, T, A: Access, B: Access> PartialEq<GlobPtr<'b, T, B>> for GlobPtr<'a, T, A> {
    fn eq(&self, other: &GlobPtr<'b, T, B>) -> bool {
        self.address == other.address
    }
}

impl<'c, T, A: Access> Eq for GlobPtr<'c, T, A> {}

impl<'c, T, A: Access> fmt::Debug for GlobPtr<'c, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobPtr")
            .field("type", &std::any::type_name::<T>())
            .field("access", &A::NAME)
            .field("address", &self.address)
            .finish()
    }
}

impl<'c, T, A: Access> fmt::Display for GlobPtr<'c, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobPtr<{}>{}", std::any::type_name::<T>(), self.address)
    }
}
