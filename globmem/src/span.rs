use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use bytemuck::Pod;
use ndview::BlockPattern;
use ndview::DistributedOrigin;
use ndview::IndexSpace;
use ndview::IndexType;
use ndview::LocalProjection;
use ndview::LocalRange;
use ndview::Pattern;
use ndview::ViewDomain;
use ndview::ViewTraits;

use crate::address::UnitId;
use crate::context::Context;
use crate::glob_ptr::GlobPtr;
use crate::glob_ref::GlobRef;

/// A one-dimensional distributed index space of `T`s, laid out over the
/// team's segments by pattern `P`.
///
/// Unit `u` stores its local elements contiguously in its own segment,
/// starting at byte `base_offset`. The span is the origin of the view
/// chains built over it, and resolves their indices to global pointers.
///
/// ```
/// use globmem::*;
/// use ndview::BlockPattern;
/// use ndview::ViewExt;
///
/// let config = PgasConfig { units: 2, ..Default::default() };
/// SharedMemory::launch(&config, |ctx| {
///     let pattern = BlockPattern::new(8, 2, ctx.my_unit_id() as usize).unwrap();
///     let span = GlobSpan::<u32>::new(ctx, pattern, 0);
///     let local = span.local();
///     for r in span.refs(&local) {
///         r.set(ctx.my_unit_id());
///     }
///     ctx.barrier();
///     let owners = span.refs(&span).map(|r| r.get()).collect::<Vec<_>>();
///     assert_eq!(owners, vec![0, 0, 0, 0, 1, 1, 1, 1]);
/// })
/// .unwrap();
/// ```
pub struct GlobSpan<'c, T, P: Pattern = BlockPattern> {
    ctx: &'c Context,
    pattern: P,
    base_offset: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<'c, T, P: Pattern> GlobSpan<'c, T, P> {
    /// `pattern` must describe the distribution as seen from the unit
    /// owning `ctx`.
    pub fn new(ctx: &'c Context, pattern: P, base_offset: u64) -> Self {
        Self {
            ctx,
            pattern,
            base_offset,
            _marker: PhantomData,
        }
    }

    pub fn context(&self) -> &'c Context {
        self.ctx
    }

    /// A pointer to the element at `global`, or `None` if `global` lies
    /// outside the span.
    pub fn ptr_at(&self, global: P::Index) -> Option<GlobPtr<'c, T>> {
        if global < P::Index::ZERO || global >= self.pattern.size() {
            return None;
        }
        let position = self.pattern.locate(global);
        let unit = UnitId::try_from(position.unit).ok()?;
        self.element(unit, position.index)
    }

    /// A pointer to the calling unit's element at `local`, or `None` if
    /// `local` lies outside its resident range.
    pub fn local_ptr_at(&self, local: P::Index) -> Option<GlobPtr<'c, T>> {
        if local < P::Index::ZERO || local >= self.pattern.local_capacity() {
            return None;
        }
        self.element(self.ctx.my_unit_id(), local)
    }

    fn element(&self, unit: UnitId, index: P::Index) -> Option<GlobPtr<'c, T>> {
        let base = self.ctx.segment_base(unit).with_offset(self.base_offset);
        let count = isize::try_from(index.to_usize()?).ok()?;
        GlobPtr::new(self.ctx, base).checked_offset(count).ok()
    }

    /// References to the elements of `view`, a view rooted at this span.
    /// Local views yield the calling unit's elements, global views yield
    /// elements wherever they reside.
    ///
    /// `view` must lie within the span. Indices past the end have no
    /// element and are skipped in release builds, so fewer than
    /// `view.size()` references are yielded.
    pub fn refs<V>(&self, view: &V) -> impl Iterator<Item = GlobRef<'c, T>>
    where
        V: ViewDomain<Index = P::Index, Origin = Self>,
    {
        debug_assert!(ptr::eq(view.origin(), self));
        debug_assert!(
            V::IS_LOCAL || view.end() <= self.end(),
            "view [{}, {}) exceeds span of {} elements",
            view.begin(),
            view.end(),
            self.end()
        );
        let begin = view.begin().to_usize().unwrap_or(0);
        let end = view.end().to_usize().unwrap_or(0).max(begin);
        (begin..end).filter_map(move |i| {
            let index = P::Index::from_usize(i)?;
            let ptr = if V::IS_LOCAL {
                self.local_ptr_at(index)
            } else {
                self.ptr_at(index)
            };
            ptr.map(|p| p.to_ref())
        })
    }
}

impl<'c, T: Pod, P: Pattern> GlobSpan<'c, T, P> {
    /// Fill the calling unit's resident elements with `value`.
    pub fn fill_local(&self, value: T) {
        let capacity = self.pattern.local_capacity().to_usize().unwrap_or(0);
        if capacity == 0 {
            return;
        }
        if let Some(first) = self.local_ptr_at(P::Index::ZERO) {
            let values = vec![value; capacity];
            self.ctx.put_blocking(first.address(), &values);
        }
    }
}

impl<'c, T, P: Pattern> ViewTraits for GlobSpan<'c, T, P> {
    type Origin = Self;
    type Domain = Self;
    type Image = Self;
    type Index = P::Index;

    const IS_PROJECTION: bool = false;
    const IS_VIEW: bool = false;
    const IS_ORIGIN: bool = true;
    const IS_LOCAL: bool = false;
}

impl<'c, T, P: Pattern> ViewDomain for GlobSpan<'c, T, P> {
    fn begin(&self) -> P::Index {
        P::Index::ZERO
    }

    fn end(&self) -> P::Index {
        self.pattern.size()
    }

    fn domain(&self) -> &Self {
        self
    }

    fn origin(&self) -> &Self {
        self
    }
}

impl<'c, T, P: Pattern> LocalProjection for GlobSpan<'c, T, P> {
    fn local_image(&self) -> LocalRange<P::Index> {
        LocalRange::new(P::Index::ZERO, self.pattern.local_capacity())
    }
}

impl<'c, T, P: Pattern> DistributedOrigin for GlobSpan<'c, T, P> {
    type Pattern = P;

    fn pattern(&self) -> &P {
        &self.pattern
    }
}

impl<'c, T, P: Pattern> IndexSpace<1> for GlobSpan<'c, T, P> {
    fn offsets(&self) -> [P::Index; 1] {
        [P::Index::ZERO]
    }

    fn extents(&self) -> [P::Index; 1] {
        [self.pattern.size()]
    }
}

impl<'c, T, P: Pattern + fmt::Debug> fmt::Debug for GlobSpan<'c, T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobSpan")
            .field("type", &std::any::type_name::<T>())
            .field("pattern", &self.pattern)
            .field("base_offset", &self.base_offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ndview::ViewExt;

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

    fn block_span<'c>(ctx: &'c Context, size: i64, base_offset: u64) -> GlobSpan<'c, i64> {
        let pattern = BlockPattern::new(size, ctx.size(), ctx.my_unit_id() as usize).unwrap();
        GlobSpan::new(ctx, pattern, base_offset)
    }

    #[test]
    fn test_origin_record() {
        type Span = GlobSpan<'static, i64>;
        assert!(Span::IS_ORIGIN);
        assert!(!Span::IS_VIEW);
        assert!(!Span::IS_LOCAL);
        assert!(!Span::IS_PROJECTION);
    }

    #[test]
    fn test_ptr_at() -> anyhow::Result<()> {
        let addresses = SharedMemory::launch(&config(4), |ctx| {
            // block = 3: units own [0, 3), [3, 6), [6, 9), [9, 10).
            let span = block_span(ctx, 10, 16);
            assert!(span.ptr_at(-1).is_none());
            assert!(span.ptr_at(10).is_none());
            [0, 4, 9]
                .into_iter()
                .map(|g| span.ptr_at(g).map(|p| p.address()))
                .map(|a| a.map(|a| (a.unit_id(), a.offset())))
                .collect::<Vec<_>>()
        })?;
        for per_unit in addresses {
            assert_eq!(per_unit, vec![Some((0, 16)), Some((1, 24)), Some((3, 16))]);
        }
        Ok(())
    }

    #[test]
    fn test_local_ptr_at() -> anyhow::Result<()> {
        let locals = SharedMemory::launch(&config(4), |ctx| {
            let span = block_span(ctx, 10, 0);
            let first = span.local_ptr_at(0).map(|p| p.is_local());
            (first, span.local_ptr_at(3).is_none(), span.local().size())
        })?;
        assert_eq!(
            locals,
            vec![
                (Some(true), true, 3),
                (Some(true), true, 3),
                (Some(true), true, 3),
                (Some(true), true, 1),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_fill_and_read_through_views() -> anyhow::Result<()> {
        let totals = SharedMemory::launch(&config(4), |ctx| {
            let span = block_span(ctx, 16, 0);
            span.fill_local(i64::from(ctx.my_unit_id()) + 1);
            ctx.barrier();

            let sub = span.sub::<0>(2, 14).unwrap();
            let values = span.refs(&sub).map(|r| r.get()).collect::<Vec<_>>();
            assert_eq!(values, vec![1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4]);

            let local = sub.local();
            span.refs(&local).map(|r| r.get()).sum::<i64>()
        })?;
        // Each unit sees its share of [2, 14).
        assert_eq!(totals, vec![2, 8, 12, 8]);
        Ok(())
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "view [10, 20) exceeds span of 16 elements")]
    fn test_refs_past_the_end() {
        let _ = SharedMemory::launch(&config(1), |ctx| {
            let span = block_span(ctx, 16, 0);
            let sub = span.sub::<0>(10, 20).unwrap();
            assert_eq!(sub.size(), 10);
            span.refs(&sub).count()
        });
    }

    #[test]
    fn test_index_space() -> anyhow::Result<()> {
        SharedMemory::launch(&config(2), |ctx| {
            let span = block_span(ctx, 12, 0);
            let sub = span.sub::<0>(3, 7).unwrap();
            assert_eq!(span.extents(), [12]);
            assert_eq!(sub.offsets(), [3]);
            assert_eq!(sub.extents(), [4]);
        })?;
        Ok(())
    }
}
