//! Functional operations over fixed-length sequences.
//!
//! Sequences are plain arrays `[T; N]`. Every operation returns a new
//! array and leaves its input untouched. Result lengths are const
//! generic parameters, usually inferred from the binding they flow
//! into, and are checked against the input lengths when the function
//! is instantiated: asking for a result of the wrong length is a build
//! error, not a runtime one.
//!
//! Amounts passed to [`take`] and [`drop`] are clamped to the input
//! length, so `take::<5>` of a 3-element sequence yields 3 elements
//! and `drop::<5>` yields none.
//!
//! ```
//! use ndview::seq;
//!
//! let s = [1, 2, 3, 4];
//! let front: [i32; 2] = seq::take::<2, i32, 4, 2>(&s);
//! let back: [i32; 2] = seq::drop::<2, i32, 4, 2>(&s);
//! assert_eq!(front, [1, 2]);
//! assert_eq!(back, [3, 4]);
//!
//! let whole: [i32; 4] = seq::append(&front, &back);
//! assert_eq!(whole, s);
//! ```

const fn clamp(amount: usize, len: usize) -> usize {
    if amount > len { len } else { amount }
}

/// The first `K` elements of `values`, or all of them if `K > N`.
pub fn take<const K: usize, T: Copy, const N: usize, const M: usize>(values: &[T; N]) -> [T; M] {
    const { assert!(M == clamp(K, N), "take: result length must be min(K, N)") };
    std::array::from_fn(|i| values[i])
}

/// `values` without its first `K` elements; empty if `K > N`.
pub fn drop<const K: usize, T: Copy, const N: usize, const M: usize>(values: &[T; N]) -> [T; M] {
    const { assert!(M == N - clamp(K, N), "drop: result length must be N - min(K, N)") };
    let skip = N - M;
    std::array::from_fn(|i| values[skip + i])
}

/// The first element of `values` as a sequence; empty for an empty input.
pub fn head<T: Copy, const N: usize, const M: usize>(values: &[T; N]) -> [T; M] {
    take::<1, T, N, M>(values)
}

/// All but the first element of `values`.
pub fn tail<T: Copy, const N: usize, const M: usize>(values: &[T; N]) -> [T; M] {
    drop::<1, T, N, M>(values)
}

/// Concatenate two sequences.
pub fn append<T: Copy, const A: usize, const B: usize, const C: usize>(
    left: &[T; A],
    right: &[T; B],
) -> [T; C] {
    const { assert!(C == A + B, "append: result length must be A + B") };
    std::array::from_fn(|i| if i < A { left[i] } else { right[i - A] })
}

/// Append a single element to the end of a sequence.
pub fn append_elem<T: Copy, const N: usize, const M: usize>(values: &[T; N], elem: T) -> [T; M] {
    append(values, &[elem])
}

/// The elements of `values` in reverse order.
pub fn reverse<T: Copy, const N: usize>(values: &[T; N]) -> [T; N] {
    std::array::from_fn(|i| values[N - 1 - i])
}

/// A copy of `values` with the element at index `I` replaced by `elem`.
pub fn replace_nth<const I: usize, T: Copy, const N: usize>(elem: T, values: &[T; N]) -> [T; N] {
    const { assert!(I < N, "replace_nth: index out of bounds") };
    let mut replaced = *values;
    replaced[I] = elem;
    replaced
}

/// A copy of `values` without the element at index `I`.
pub fn remove_nth<const I: usize, T: Copy, const N: usize, const M: usize>(
    values: &[T; N],
) -> [T; M] {
    const { assert!(I < N && M + 1 == N, "remove_nth: result length must be N - 1") };
    std::array::from_fn(|i| if i < I { values[i] } else { values[i + 1] })
}

/// A sequence of `L + R` elements viewed as a left part of `L` elements
/// followed by a right part of `R` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<T, const L: usize, const R: usize> {
    left: [T; L],
    right: [T; R],
}

impl<T: Copy, const L: usize, const R: usize> Split<T, L, R> {
    pub fn new<const N: usize>(values: &[T; N]) -> Self {
        const { assert!(N == L + R, "split: input length must be L + R") };
        Self {
            left: take::<L, T, N, L>(values),
            right: drop::<L, T, N, R>(values),
        }
    }

    pub fn left(&self) -> [T; L] {
        self.left
    }

    pub fn right(&self) -> [T; R] {
        self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_drop() {
        let s = [1, 2, 3, 4];
        assert_eq!(take::<2, i32, 4, 2>(&s), [1, 2]);
        assert_eq!(drop::<2, i32, 4, 2>(&s), [3, 4]);
        assert_eq!(take::<0, i32, 4, 0>(&s), [0i32; 0]);
        assert_eq!(drop::<0, i32, 4, 4>(&s), s);
    }

    #[test]
    fn test_take_drop_clamped() {
        let s = [1, 2, 3];
        assert_eq!(take::<7, i32, 3, 3>(&s), [1, 2, 3]);
        assert_eq!(drop::<7, i32, 3, 0>(&s), [0i32; 0]);
        assert_eq!(take::<1, i32, 0, 0>(&[]), [0i32; 0]);
    }

    #[test]
    fn test_head_tail() {
        let s = ['a', 'b', 'c'];
        let h: [char; 1] = head(&s);
        let t: [char; 2] = tail(&s);
        assert_eq!(h, ['a']);
        assert_eq!(t, ['b', 'c']);

        let empty: [char; 0] = [];
        let h: [char; 0] = head(&empty);
        let t: [char; 0] = tail(&empty);
        assert_eq!(h, empty);
        assert_eq!(t, empty);
    }

    #[test]
    fn test_append() {
        let joined: [i32; 5] = append(&[1, 2], &[3, 4, 5]);
        assert_eq!(joined, [1, 2, 3, 4, 5]);

        let pushed: [i32; 3] = append_elem(&[1, 2], 9);
        assert_eq!(pushed, [1, 2, 9]);

        let onto_empty: [i32; 1] = append_elem(&[], 4);
        assert_eq!(onto_empty, [4]);
    }

    #[test]
    fn test_reverse() {
        assert_eq!(reverse(&[1, 2, 3]), [3, 2, 1]);
        assert_eq!(reverse(&[7]), [7]);
        assert_eq!(reverse::<i32, 0>(&[]), [0i32; 0]);
    }

    #[test]
    fn test_replace_remove_nth() {
        assert_eq!(replace_nth::<1, i32, 3>(9, &[1, 2, 3]), [1, 9, 3]);
        assert_eq!(replace_nth::<0, i32, 1>(4, &[0]), [4]);

        let removed: [i32; 2] = remove_nth::<1, i32, 3, 2>(&[1, 2, 3]);
        assert_eq!(removed, [1, 3]);
        let removed: [i32; 2] = remove_nth::<2, i32, 3, 2>(&[1, 2, 3]);
        assert_eq!(removed, [1, 2]);
    }

    #[test]
    fn test_split() {
        let split = Split::<i32, 1, 3>::new(&[1, 2, 3, 4]);
        assert_eq!(split.left(), [1]);
        assert_eq!(split.right(), [2, 3, 4]);

        let split = Split::<i32, 0, 2>::new(&[5, 6]);
        assert_eq!(split.left(), [0i32; 0]);
        assert_eq!(split.right(), [5, 6]);
    }

    // append(take(k, s), drop(k, s)) == s for every 0 <= k <= len(s).
    macro_rules! assert_split_inverse {
        ($s:expr; $n:literal; $($k:literal),*) => {
            $(
                let left: [i64; $k] = take::<$k, i64, $n, $k>(&$s);
                let right: [i64; $n - $k] = drop::<$k, i64, $n, { $n - $k }>(&$s);
                let joined: [i64; $n] = append(&left, &right);
                assert_eq!(joined, $s, "k = {}", $k);
            )*
        };
    }

    #[test]
    fn test_split_append_inverse() {
        let s: [i64; 5] = [10, 20, 30, 40, 50];
        assert_split_inverse!(s; 5; 0, 1, 2, 3, 4, 5);

        let split = Split::<i64, 2, 3>::new(&s);
        let joined: [i64; 5] = append(&split.left(), &split.right());
        assert_eq!(joined, s);
    }
}
