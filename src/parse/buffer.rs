use std::fmt::{self, Debug, Formatter};

use bstr::ByteSlice;
use memchr::{memchr, memchr2};

use crate::error::BufferError;

/// An append-only growable byte buffer with O(1) amortized append and
/// in-place erase of a prefix range.
///
/// [`MiParser`](crate::MiParser) and
/// [`AnnotationParser`](crate::AnnotationParser) use a `ByteBuffer` to hold
/// bytes that have been pushed but not yet consumed up to a line boundary.
/// Lines sliced out of it are copied before being handed to the grammar, so
/// the buffer's own storage can be compacted independently of anything the
/// caller retains.
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// The capacity growth schedule: start at 128, double up to 4096, then
    /// grow by a flat 4096 at a time.
    const INITIAL_CAPACITY: usize = 128;
    const DOUBLING_CEILING: usize = 4096;
    const LINEAR_STEP: usize = 4096;

    #[inline]
    #[must_use]
    pub fn new() -> Self {
        ByteBuffer { data: Vec::new() }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Appends `bytes` to the buffer, amortized O(n).
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.reserve_for(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends `bytes` as though it were a NUL-terminated C string: if the
    /// final byte is NUL, it is not counted in the buffer's logical size
    /// (but is still present in storage, matching
    /// `gdbwire_string_append_cstr`'s contract of not including the
    /// terminator in `size`).
    pub fn append_nul_terminated(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.append(bytes)?;
        if self.data.last() == Some(&0) {
            self.data.pop();
        }
        Ok(())
    }

    /// Resets the logical size to 0. Capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the earliest index whose byte appears in `chars`, or
    /// [`ByteBuffer::len`] when none does. NUL bytes inside the buffer do not
    /// terminate the scan.
    #[must_use]
    pub fn find_first_of(&self, chars: &[u8]) -> usize {
        match chars {
            [a] => memchr(*a, &self.data).unwrap_or(self.data.len()),
            [a, b] => memchr2(*a, *b, &self.data).unwrap_or(self.data.len()),
            _ => self
                .data
                .iter()
                .position(|b| chars.contains(b))
                .unwrap_or(self.data.len()),
        }
    }

    /// Removes up to `count` bytes starting at `pos`, truncating at the end
    /// of the buffer if `pos + count` overruns it. Returns an error if `pos`
    /// is not a valid index into the buffer.
    pub fn erase(&mut self, pos: usize, count: usize) -> Result<(), BufferError> {
        if pos >= self.data.len() {
            return Err(BufferError::EraseOutOfBounds { pos, len: self.data.len() });
        }
        let end = pos.saturating_add(count).min(self.data.len());
        self.data.drain(pos..end);
        Ok(())
    }

    fn reserve_for(&mut self, additional: usize) -> Result<(), BufferError> {
        let needed = self
            .data
            .len()
            .checked_add(additional)
            .ok_or(BufferError::CapacityOverflow)?;
        let mut capacity = self.data.capacity();
        if capacity >= needed {
            return Ok(());
        }
        if capacity == 0 {
            capacity = Self::INITIAL_CAPACITY;
        }
        while capacity < needed {
            capacity = if capacity < Self::DOUBLING_CEILING {
                capacity
                    .checked_mul(2)
                    .ok_or(BufferError::CapacityOverflow)?
            } else {
                capacity
                    .checked_add(Self::LINEAR_STEP)
                    .ok_or(BufferError::CapacityOverflow)?
            };
        }
        self.data.reserve(capacity - self.data.len());
        Ok(())
    }
}

impl Default for ByteBuffer {
    #[inline]
    fn default() -> Self {
        ByteBuffer::new()
    }
}

impl Debug for ByteBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteBuffer").field(&self.data.as_bstr()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_read() {
        let mut buf = ByteBuffer::new();
        buf.append(b"hello").unwrap();
        buf.append(b" world").unwrap();
        assert_eq!(buf.as_bytes(), b"hello world");
        assert_eq!(buf.len(), 11);
    }

    #[test]
    fn nul_terminated_excludes_terminator_from_size() {
        let mut buf = ByteBuffer::new();
        buf.append_nul_terminated(b"hi\0").unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(&buf.as_bytes()[..2], b"hi");
    }

    #[test]
    fn find_first_of_scans_past_nul() {
        let mut buf = ByteBuffer::new();
        buf.append(b"a\0b,c").unwrap();
        assert_eq!(buf.find_first_of(b","), 4);
        assert_eq!(buf.find_first_of(b"xyz"), buf.len());
    }

    #[test]
    fn erase_prefix() {
        let mut buf = ByteBuffer::new();
        buf.append(b"0123456789").unwrap();
        buf.erase(0, 4).unwrap();
        assert_eq!(buf.as_bytes(), b"456789");
    }

    #[test]
    fn erase_truncates_past_end() {
        let mut buf = ByteBuffer::new();
        buf.append(b"abc").unwrap();
        buf.erase(1, 100).unwrap();
        assert_eq!(buf.as_bytes(), b"a");
    }

    #[test]
    fn erase_rejects_out_of_bounds_start() {
        let mut buf = ByteBuffer::new();
        buf.append(b"abc").unwrap();
        assert!(buf.erase(3, 1).is_err());
        assert!(buf.erase(10, 1).is_err());
    }

    #[test]
    fn clear_resets_size_not_capacity() {
        let mut buf = ByteBuffer::new();
        buf.append(b"0123456789").unwrap();
        let cap = buf.capacity();
        buf.clear();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn growth_schedule_follows_doubling_then_linear() {
        let mut buf = ByteBuffer::new();
        buf.append(&vec![0u8; 1]).unwrap();
        assert_eq!(buf.capacity(), 128);
        buf.append(&vec![0u8; 200]).unwrap();
        assert!(buf.capacity() >= 201);
    }
}
