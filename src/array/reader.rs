//! Bulk reader that drains a chunked source into a contiguous vector.
//!
//! The reader keeps a running offset, asks for everything that remains and
//! appends whatever comes back until the offset reaches the source length.
//! Sources that stall or overshoot are reported as errors instead of being
//! retried.

use std::borrow::Cow;

use super::{ArrayElement, ArraySource};
use crate::error::{PvRpcError, Result};

/// Stateless reader for [`ArraySource`]s.
///
/// All methods are generic over the element kind; the typed entry points are
/// aliases that pin the element type at the call site.
pub struct BulkArrayReader;

impl BulkArrayReader {
    /// Read every element of `source`, in order.
    ///
    /// # Errors
    ///
    /// - [`PvRpcError::IncompleteSource`] if a chunk is empty while elements remain.
    /// - [`PvRpcError::OversizedChunk`] if a chunk exceeds the requested count.
    pub fn read_all<S>(source: &S) -> Result<Vec<S::Element>>
    where
        S: ArraySource + ?Sized,
    {
        let kind = <S::Element as ArrayElement>::KIND;
        let length = source.len();
        let mut values = Vec::with_capacity(length);
        let mut offset = 0;

        while offset < length {
            let requested = length - offset;
            let chunk = source.read_chunk(offset, requested);
            let returned = chunk.len();

            if returned == 0 {
                tracing::warn!(%kind, offset, length, "source returned an empty chunk");
                return Err(PvRpcError::IncompleteSource {
                    kind,
                    offset,
                    length,
                });
            }
            if returned > requested {
                tracing::warn!(%kind, offset, requested, returned, "source returned an oversized chunk");
                return Err(PvRpcError::OversizedChunk {
                    kind,
                    offset,
                    requested,
                    returned,
                });
            }

            tracing::trace!(%kind, offset, returned, "read chunk");
            match chunk {
                Cow::Borrowed(slice) => values.extend_from_slice(slice),
                Cow::Owned(owned) => values.extend(owned),
            }
            offset += returned;
        }

        Ok(values)
    }

    /// Read a `f64` array.
    #[inline]
    pub fn read_doubles<S>(source: &S) -> Result<Vec<f64>>
    where
        S: ArraySource<Element = f64> + ?Sized,
    {
        Self::read_all(source)
    }

    /// Read an `i64` array.
    #[inline]
    pub fn read_longs<S>(source: &S) -> Result<Vec<i64>>
    where
        S: ArraySource<Element = i64> + ?Sized,
    {
        Self::read_all(source)
    }

    /// Read an `i8` array.
    #[inline]
    pub fn read_bytes<S>(source: &S) -> Result<Vec<i8>>
    where
        S: ArraySource<Element = i8> + ?Sized,
    {
        Self::read_all(source)
    }

    /// Read a `String` array.
    #[inline]
    pub fn read_strings<S>(source: &S) -> Result<Vec<String>>
    where
        S: ArraySource<Element = String> + ?Sized,
    {
        Self::read_all(source)
    }
}
