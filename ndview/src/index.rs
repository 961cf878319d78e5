use std::fmt;
use std::hash::Hash;
use std::ops::Add;
use std::ops::Sub;

/// The index type used when a view does not name one.
pub type DefaultIndex = i64;

/// Integer types that can address positions in a view or pattern.
pub trait IndexType:
    Copy
    + Ord
    + Hash
    + Default
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;
    const ONE: Self;

    /// Convert to a `usize`, if the value is representable.
    fn to_usize(self) -> Option<usize>;

    /// Convert from a `usize`, if the value is representable.
    fn from_usize(value: usize) -> Option<Self>;
}

macro_rules! impl_index_type {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IndexType for $ty {
                const ZERO: Self = 0;
                const ONE: Self = 1;

                fn to_usize(self) -> Option<usize> {
                    usize::try_from(self).ok()
                }

                fn from_usize(value: usize) -> Option<Self> {
                    <$ty>::try_from(value).ok()
                }
            }
        )*
    };
}

impl_index_type!(i32, i64, isize, u32, u64, usize);

/// A half-open range `[begin, end)` of local indices, as produced by
/// projecting a view onto the calling unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalRange<I> {
    /// First index of the range.
    pub begin: I,
    /// One past the last index of the range.
    pub end: I,
}

impl<I: IndexType> LocalRange<I> {
    pub fn new(begin: I, end: I) -> Self {
        Self { begin, end }
    }

    /// The empty range anchored at zero.
    pub fn empty() -> Self {
        Self::new(I::ZERO, I::ZERO)
    }

    pub fn size(&self) -> I {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}

impl<I: IndexType> fmt::Display for LocalRange<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(5i64.to_usize(), Some(5));
        assert_eq!((-1i64).to_usize(), None);
        assert_eq!(i32::from_usize(7), Some(7));
        assert_eq!(u32::from_usize(usize::MAX), None);
    }

    #[test]
    fn test_local_range() {
        let r = LocalRange::new(2i64, 5);
        assert_eq!(r.size(), 3);
        assert!(!r.is_empty());
        assert_eq!(r.to_string(), "[2, 5)");

        assert!(LocalRange::<i64>::empty().is_empty());
        assert!(LocalRange::new(3usize, 3).is_empty());
    }
}
