use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::mem::MaybeUninit;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::BitXor;
use std::ops::BitXorAssign;
use std::ops::Div;
use std::ops::DivAssign;
use std::ops::Mul;
use std::ops::MulAssign;
use std::ops::Sub;
use std::ops::SubAssign;

use bytemuck::Pod;

use crate::access::Access;
use crate::access::Const;
use crate::access::JoinAccess;
use crate::access::Mut;
use crate::address::GlobalAddress;
use crate::context::Context;
use crate::engine::EngineError;
use crate::engine::fatal;
use crate::glob_ptr::GlobPtr;

/// A handle to one element of type `T` in global memory.
///
/// A reference is always bound to an address; there is no default or
/// null reference. Reads and writes are blocking one-sided transfers
/// issued through the context the reference borrows. Every read,
/// including comparisons and the primitive `From` conversions, fetches
/// the element from its owner.
///
/// `A` is the access qualifier. Writes are only available on
/// `GlobRef<T, Mut>`:
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     r.set(1);
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let mut r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     r += 1;
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     r.put(&1);
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     r.increment();
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     let _old = r.post_increment();
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let a: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     let b: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).at(1).as_const();
///     a.swap(&b);
/// });
/// ```
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let a: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     let b = ctx.segment_ptr::<i32>(0).at(1);
///     a.assign(&b);
/// });
/// ```
///
/// Widening to `Const` is implicit through `From`, narrowing requires
/// [`GlobRef::cast_mut`]:
///
/// ```compile_fail
/// # use globmem::*;
/// # let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let r: GlobRef<'_, i32, Const> = ctx.segment_ptr::<i32>(0).as_const().to_ref();
///     let w: GlobRef<'_, i32, Mut> = r.into();
/// });
/// ```
///
/// A reference cannot be created without an address:
///
/// ```compile_fail
/// # use globmem::*;
/// let r: GlobRef<'static, i32> = Default::default();
/// ```
///
/// Typical use:
///
/// ```
/// use globmem::*;
///
/// let config = PgasConfig { units: 2, ..Default::default() };
/// let sums = SharedMemory::launch(&config, |ctx| {
///     let me = ctx.my_unit_id();
///     let mut r = ctx.segment_ptr::<i64>(me).to_ref();
///     r.set(10 * i64::from(me));
///     r += 1;
///     ctx.barrier();
///     let other = ctx.segment_ptr::<i64>(1 - me).to_ref();
///     r.get() + other.get()
/// })
/// .unwrap();
/// assert_eq!(sums, vec![12, 12]);
/// ```
pub struct GlobRef<'c, T, A: Access = Mut> {
    ctx: &'c Context,
    address: GlobalAddress,
    _marker: PhantomData<fn() -> (T, A)>,
}

impl<'c, T, A: Access> GlobRef<'c, T, A> {
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

    /// A pointer to the referenced element.
    pub fn as_ptr(&self) -> GlobPtr<'c, T, A> {
        GlobPtr::new(self.ctx, self.address)
    }

    /// Whether the element lives on the calling unit.
    pub fn is_local(&self) -> bool {
        self.ctx.is_local(self.address)
    }

    pub fn as_const(&self) -> GlobRef<'c, T, Const> {
        GlobRef::new(self.ctx, self.address)
    }

    /// A reference to the `M` at byte offset `offset` within the
    /// referenced element, with the same access.
    pub fn member<M>(&self, offset: usize) -> GlobRef<'c, M, A> {
        self.project(offset)
    }

    /// A reference to the `M` at byte offset `offset`, accessed through
    /// `MA`. The result is `Const` if either this reference or `MA` is.
    pub fn member_as<M, MA: Access>(
        &self,
        offset: usize,
    ) -> GlobRef<'c, M, <A as JoinAccess<MA>>::Output>
    where
        A: JoinAccess<MA>,
    {
        self.project(offset)
    }

    /// Like [`GlobRef::member`], with the member type taken from a field
    /// accessor. Used by [`glob_member!`](crate::glob_member).
    pub fn member_field<M, F>(&self, offset: usize, _field: F) -> GlobRef<'c, M, A>
    where
        F: for<'x> Fn(&'x T) -> &'x M,
    {
        self.project(offset)
    }

    fn project<M, MA: Access>(&self, offset: usize) -> GlobRef<'c, M, MA> {
        debug_assert!(
            offset + mem::size_of::<M>() <= mem::size_of::<T>(),
            "member at offset {} does not fit in {}",
            offset,
            std::any::type_name::<T>()
        );
        let bytes = i64::try_from(offset).unwrap_or(i64::MAX);
        match self.ctx.increment_address(self.address, bytes) {
            Ok(address) => GlobRef::new(self.ctx, address),
            Err(err) => fatal("increment_address", &EngineError::from(err)),
        }
    }
}

impl<'c, T: Pod, A: Access> GlobRef<'c, T, A> {
    /// Fetch the element. Blocks until the transfer has completed.
    pub fn get(&self) -> T {
        let mut value = T::zeroed();
        self.get_into(&mut value);
        value
    }

    /// Fetch the element into `dest`.
    pub fn get_into(&self, dest: &mut T) {
        self.ctx.get_blocking(self.address, std::slice::from_mut(dest));
    }

    /// Fetch the element into uninitialized storage and return it,
    /// initialized.
    pub fn get_uninit<'d>(&self, dest: &'d mut MaybeUninit<T>) -> &'d mut T {
        dest.write(self.get())
    }

    /// Compare the element with `value`. Fetches the element.
    pub fn eq_value(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.get() == *value
    }
}

impl<'c, T> GlobRef<'c, T, Const> {
    /// Drop the const qualifier. This is the only narrowing conversion;
    /// the caller asserts that writing through the result is permitted.
    pub fn cast_mut(&self) -> GlobRef<'c, T, Mut> {
        GlobRef::new(self.ctx, self.address)
    }
}

impl<'c, T: Pod> GlobRef<'c, T, Mut> {
    /// Store `value` in the element. Blocks until the transfer has
    /// completed.
    pub fn set(&self, value: T) {
        self.put(&value);
    }

    /// Store `*value` in the element.
    pub fn put(&self, value: &T) {
        self.ctx.put_blocking(self.address, std::slice::from_ref(value));
    }

    /// Store the value of the element `other` references. A fetch
    /// followed by a store, not atomic. The two references keep their
    /// own addresses.
    pub fn assign<B: Access>(&self, other: &GlobRef<'_, T, B>) {
        self.set(other.get());
    }

    /// Exchange the elements of `self` and `other` through one local
    /// temporary. Costs two fetches and two stores, and is not atomic.
    pub fn swap(&self, other: &GlobRef<'_, T, Mut>) {
        let tmp = other.get();
        other.assign(self);
        self.set(tmp);
    }

    /// Prefix increment. Not atomic.
    pub fn increment(&self) -> &Self
    where
        T: One + Add<Output = T>,
    {
        self.set(self.get() + T::ONE);
        self
    }

    /// Prefix decrement. Not atomic.
    pub fn decrement(&self) -> &Self
    where
        T: One + Sub<Output = T>,
    {
        self.set(self.get() - T::ONE);
        self
    }

    /// Postfix increment: returns the value before the update. Not
    /// atomic.
    pub fn post_increment(&self) -> T
    where
        T: One + Add<Output = T>,
    {
        let old = self.get();
        self.set(old + T::ONE);
        old
    }

    /// Postfix decrement: returns the value before the update. Not
    /// atomic.
    pub fn post_decrement(&self) -> T
    where
        T: One + Sub<Output = T>,
    {
        let old = self.get();
        self.set(old - T::ONE);
        old
    }
}

/// Exchange the elements referenced by `a` and `b`.
pub fn swap<T: Pod>(a: &GlobRef<'_, T, Mut>, b: &GlobRef<'_, T, Mut>) {
    a.swap(b);
}

/// Element types with a unit step, for increments and decrements.
pub trait One {
    const ONE: Self;
}

macro_rules! impl_one {
    ($($ty:ty => $one:expr),* $(,)?) => {
        $(
            impl One for $ty {
                const ONE: Self = $one;
            }
        )*
    };
}

impl_one!(
    i8 => 1, i16 => 1, i32 => 1, i64 => 1, i128 => 1, isize => 1,
    u8 => 1, u16 => 1, u32 => 1, u64 => 1, u128 => 1, usize => 1,
    f32 => 1.0, f64 => 1.0,
);

// Compound assignment is get, modify, put. Concurrent writers to the same
// element may lose updates.
macro_rules! impl_compound_assign {
    ($($assign:ident :: $assign_fn:ident => $op:ident :: $op_fn:ident),* $(,)?) => {
        $(
            impl<'c, T: Pod + $op<Output = T>> $assign<T> for GlobRef<'c, T, Mut> {
                fn $assign_fn(&mut self, rhs: T) {
                    self.set(self.get().$op_fn(rhs));
                }
            }
        )*
    };
}

impl_compound_assign!(
    AddAssign::add_assign => Add::add,
    SubAssign::sub_assign => Sub::sub,
    MulAssign::mul_assign => Mul::mul,
    DivAssign::div_assign => Div::div,
    BitXorAssign::bitxor_assign => BitXor::bitxor,
);

impl<'c, T> From<GlobRef<'c, T, Mut>> for GlobRef<'c, T, Const> {
    fn from(r: GlobRef<'c, T, Mut>) -> Self {
        r.as_const()
    }
}

impl<'c, T, A: Access> Clone for GlobRef<'c, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'c, T, A: Access> Copy for GlobRef<'c, T, A> {}

/// Compares the referenced *values*: both elements are fetched, even
/// when the two references share an address.
impl<'a, 'b, T, A, B> PartialEq<GlobRef<'b, T, B>> for GlobRef<'a, T, A>
where
    T: Pod + PartialEq,
    A: Access,
    B: Access,
{
    fn eq(&self, other: &GlobRef<'b, T, B>) -> bool {
        self.get() == other.get()
    }
}

// Reading a primitive through `From`/`Into` or comparing it against a
// plain value fetches the element.
macro_rules! impl_primitive_reads {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<'c, A: Access> From<GlobRef<'c, $ty, A>> for $ty {
                fn from(r: GlobRef<'c, $ty, A>) -> $ty {
                    r.get()
                }
            }

            impl<'c, A: Access> PartialEq<$ty> for GlobRef<'c, $ty, A> {
                fn eq(&self, other: &$ty) -> bool {
                    self.get() == *other
                }
            }
        )*
    };
}

impl_primitive_reads!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<'c, T, A: Access> fmt::Debug for GlobRef<'c, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobRef")
            .field("type", &std::any::type_name::<T>())
            .field("access", &A::NAME)
            .field("address", &self.address)
            .finish()
    }
}

impl<'c, T, A: Access> fmt::Display for GlobRef<'c, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobRef<{}>{}", std::any::type_name::<T>(), self.address)
    }
}

/// A reference to field `$field` of the `$ty` referenced by `$r`.
///
/// ```
/// use bytemuck::Pod;
/// use bytemuck::Zeroable;
/// use globmem::*;
///
/// #[repr(C)]
/// #[derive(Clone, Copy, Pod, Zeroable)]
/// struct Pair {
///     key: u32,
///     value: f32,
/// }
///
/// let config = PgasConfig { units: 1, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let pair = ctx.segment_ptr::<Pair>(0).to_ref();
///     pair.set(Pair { key: 7, value: 0.5 });
///     let value = glob_member!(pair, Pair, value);
///     assert_eq!(value.get(), 0.5);
/// })
/// .unwrap();
/// ```
#[macro_export]
macro_rules! glob_member {
    ($r:expr, $ty:ty, $field:ident) => {
        $r.member_field(::core::mem::offset_of!($ty, $field), |value: &$ty| {
            &value.$field
        })
    };
}

#[cfg(test)]
mod tests {
    use bytemuck::Zeroable;
    use rand::Rng;

    use super::*;
    use crate::config::PgasConfig;
    use crate::shmem::SharedMemory;

    fn config(units: usize) -> PgasConfig {
        PgasConfig {
            units,
            segment_bytes: 256,
            ..Default::default()
        }
    }

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
    struct Particle {
        id: u32,
        mass: f32,
        position: [f64; 3],
    }

    #[test]
    fn test_put_get_round_trip() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let ints: [i64; 4] = rng.r#gen();
        let floats: [f64; 4] = rng.r#gen();
        let bytes: [u8; 4] = rng.r#gen();
        SharedMemory::launch(&config(1), |ctx| {
            let p = ctx.segment_ptr::<i64>(0);
            for (i, v) in ints.iter().enumerate() {
                let r = p.at(i as isize);
                r.set(*v);
                assert_eq!(r.get(), *v);
            }
            let f = ctx.segment_ptr::<f64>(0) + 4;
            for v in floats {
                f.to_ref().put(&v);
                assert_eq!(f.to_ref().get(), v);
            }
            let b = ctx.segment_ptr::<u8>(0) + 100;
            for v in bytes {
                b.to_ref().set(v);
                assert_eq!(b.to_ref().get(), v);
            }
        })?;
        Ok(())
    }

    #[test]
    fn test_read_entries_agree() -> anyhow::Result<()> {
        SharedMemory::launch(&config(1), |ctx| {
            let r = ctx.segment_ptr::<i32>(0).at(3);
            r.set(-17);

            let mut into = 0;
            r.get_into(&mut into);
            let mut uninit = MaybeUninit::uninit();
            let from_uninit = *r.get_uninit(&mut uninit);
            let converted: i32 = r.into();

            assert_eq!(r.get(), -17);
            assert_eq!(into, -17);
            assert_eq!(from_uninit, -17);
            assert_eq!(converted, -17);
            assert!(r == -17i32);
            assert!(r.eq_value(&-17));
        })?;
        Ok(())
    }

    #[test]
    fn test_swap() -> anyhow::Result<()> {
        SharedMemory::launch(&config(2), |ctx| {
            let me = ctx.my_unit_id();
            ctx.segment_ptr::<u64>(me).to_ref().set(100 + u64::from(me));
            ctx.barrier();
            if me == 0 {
                let a = ctx.segment_ptr::<u64>(0).to_ref();
                let b = ctx.segment_ptr::<u64>(1).to_ref();
                swap(&a, &b);
                assert_eq!((a.get(), b.get()), (101, 100));
                a.swap(&b);
                assert_eq!((a.get(), b.get()), (100, 101));
            }
            ctx.barrier();
        })?;
        Ok(())
    }

    #[test]
    fn test_assign_copies_value() -> anyhow::Result<()> {
        SharedMemory::launch(&config(2), |ctx| {
            let me = ctx.my_unit_id();
            ctx.segment_ptr::<i64>(me).to_ref().set(-7 * i64::from(me + 1));
            ctx.barrier();
            if me == 0 {
                let a = ctx.segment_ptr::<i64>(0).to_ref();
                let b = ctx.segment_ptr::<i64>(1).to_ref();
                a.assign(&b);
                assert_eq!(a.get(), -14);
                assert_eq!(b.get(), -14);
                assert_ne!(a.address(), b.address());

                // The source may be read-only.
                b.set(3);
                a.assign(&b.as_const());
                assert_eq!(a.get(), 3);
            }
            ctx.barrier();
        })?;
        Ok(())
    }

    #[test]
    fn test_equality_compares_values() -> anyhow::Result<()> {
        SharedMemory::launch(&config(1), |ctx| {
            let p = ctx.segment_ptr::<i32>(0);
            let a = p.at(0);
            let b = p.at(1);
            a.set(5);
            b.set(5);
            assert_ne!(a.address(), b.address());
            assert!(a == b);
            assert!(a == b.as_const());

            b.set(6);
            assert!(a != b);
            assert!(a != 6i32);
            // Same address, same value.
            assert!(a == p.at(0));
        })?;
        Ok(())
    }

    #[test]
    fn test_compound_ops() -> anyhow::Result<()> {
        SharedMemory::launch(&config(1), |ctx| {
            let mut r = ctx.segment_ptr::<i64>(0).to_ref();
            r.set(10);
            r += 5;
            assert_eq!(r.get(), 15);
            r -= 3;
            assert_eq!(r.get(), 12);
            r *= 4;
            assert_eq!(r.get(), 48);
            r /= 6;
            assert_eq!(r.get(), 8);
            r ^= 0b1010;
            assert_eq!(r.get(), 2);

            assert_eq!(r.increment().get(), 3);
            assert_eq!(r.decrement().get(), 2);
            assert_eq!(r.post_increment(), 2);
            assert_eq!(r.get(), 3);
            assert_eq!(r.post_decrement(), 3);
            assert_eq!(r.get(), 2);

            let mut f = (ctx.segment_ptr::<f64>(0) + 1).to_ref();
            f.set(1.5);
            f *= 2.0;
            assert_eq!(f.get(), 3.0);
        })?;
        Ok(())
    }

    #[test]
    fn test_member_projection() -> anyhow::Result<()> {
        let particle = Particle {
            id: 42,
            mass: 2.5,
            position: [1.0, -2.0, 3.5],
        };
        SharedMemory::launch(&config(1), |ctx| {
            let r = ctx.segment_ptr::<Particle>(0).to_ref();
            r.set(particle);

            let local = r.get();
            assert_eq!(local, particle);

            let id = r.member::<u32>(mem::offset_of!(Particle, id));
            let mass = glob_member!(r, Particle, mass);
            let position = glob_member!(r, Particle, position);
            assert_eq!(id.get(), local.id);
            assert_eq!(mass.get(), local.mass);
            assert_eq!(position.get(), local.position);
            assert_eq!(
                mass.address().offset() - r.address().offset(),
                mem::offset_of!(Particle, mass) as u64
            );

            // Writes through a member land in the enclosing element.
            mass.set(9.0);
            assert_eq!(r.get().mass, 9.0);
        })?;
        Ok(())
    }

    #[test]
    fn test_member_constness() -> anyhow::Result<()> {
        SharedMemory::launch(&config(1), |ctx| {
            let r = ctx.segment_ptr::<Particle>(0).to_ref();
            r.set(Particle::zeroed());

            let offset = mem::offset_of!(Particle, id);
            let writable: GlobRef<'_, u32, Mut> = r.member_as::<u32, Mut>(offset);
            writable.set(3);
            let read_only: GlobRef<'_, u32, Const> = r.member_as::<u32, Const>(offset);
            let from_const: GlobRef<'_, u32, Const> =
                r.as_const().member_as::<u32, Mut>(offset);
            assert_eq!(read_only.get(), 3);
            assert_eq!(from_const.get(), 3);

            let reopened = read_only.cast_mut();
            reopened.set(4);
            assert_eq!(writable.get(), 4);
        })?;
        Ok(())
    }

    #[test]
    fn test_locality() -> anyhow::Result<()> {
        let flags = SharedMemory::launch(&config(3), |ctx| {
            (0..3)
                .map(|unit| ctx.segment_ptr::<u8>(unit).to_ref().is_local())
                .collect::<Vec<_>>()
        })?;
        assert_eq!(
            flags,
            vec![
                vec![true, false, false],
                vec![false, true, false],
                vec![false, false, true],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_display() -> anyhow::Result<()> {
        let rendered = SharedMemory::launch(&config(1), |ctx| {
            ctx.segment_ptr::<i16>(0).at(2).as_const().to_string()
        })?;
        assert_eq!(
            rendered,
            vec!["GlobRef<i16>(000000|00|0000|0000|0000000000000004)".to_string()]
        );
        Ok(())
    }

    #[test]
    #[should_panic(expected = "get failed with status 3")]
    fn test_unknown_unit_is_fatal() {
        let _ = SharedMemory::launch(&config(1), |ctx| {
            let _ = ctx.segment_ptr::<u32>(5).to_ref().get();
        });
    }
}
