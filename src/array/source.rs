//! Offset-addressed array sources.
//!
//! A source reports its length and hands out chunks on request. A chunk may
//! be shorter than asked for; callers resume from the new offset.

use std::borrow::Cow;

use super::ArrayElement;

/// A bounded, randomly addressable array of one element kind.
///
/// Implementations must not change length or contents while a read is in
/// progress. `read_chunk` may return fewer than `max_count` elements, but
/// must return at least one whenever `offset < len()`.
pub trait ArraySource {
    /// Element type of this source.
    type Element: ArrayElement;

    /// Total number of elements.
    fn len(&self) -> usize;

    /// Whether the source holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read up to `max_count` elements starting at `offset`.
    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [Self::Element]>;
}

impl<T: ArrayElement> ArraySource for [T] {
    type Element = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [T]> {
        Cow::Borrowed(bounded(self, offset, max_count))
    }
}

impl<T: ArrayElement> ArraySource for Vec<T> {
    type Element = T;

    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [T]> {
        self.as_slice().read_chunk(offset, max_count)
    }
}

impl<S: ArraySource + ?Sized> ArraySource for &S {
    type Element = S::Element;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [S::Element]> {
        (**self).read_chunk(offset, max_count)
    }
}

/// Slice view that never returns more than `chunk_limit` elements per read.
///
/// Models sources (shared buffers, remote arrays) that refuse large reads.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedSlice<'a, T> {
    data: &'a [T],
    chunk_limit: usize,
}

impl<'a, T: ArrayElement> ChunkedSlice<'a, T> {
    /// Create a view over `data`.
    ///
    /// A `chunk_limit` of 0 is raised to 1.
    pub fn new(data: &'a [T], chunk_limit: usize) -> Self {
        Self {
            data,
            chunk_limit: chunk_limit.max(1),
        }
    }

    /// Maximum elements returned per chunk.
    #[inline]
    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }
}

impl<T: ArrayElement> ArraySource for ChunkedSlice<'_, T> {
    type Element = T;

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    fn read_chunk(&self, offset: usize, max_count: usize) -> Cow<'_, [T]> {
        Cow::Borrowed(bounded(self.data, offset, max_count.min(self.chunk_limit)))
    }
}

fn bounded<T>(data: &[T], offset: usize, max_count: usize) -> &[T] {
    if offset >= data.len() {
        return &[];
    }
    let end = offset.saturating_add(max_count).min(data.len());
    &data[offset..end]
}
