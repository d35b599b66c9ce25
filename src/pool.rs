/***************************************************************************************************
 * Copyright (c) 2021-2023 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * rs_streamcbor CBOR string allocator
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::MIN_MEM_POOL_SIZE;
use crate::error::{CBORError, Result};

use std::marker::PhantomData;
use std::slice;

/// A string allocator backs the decoder when it must materialise bytes that do not exist
/// contiguously in the input: the chunks of an indefinite-length string, or every string when
/// the decoder runs in all-strings mode.
///
/// The whole interface is the single entry point [`StringAllocator::realloc`], whose mode is
/// selected by its arguments:
///
/// | (old, size) | Mode | Contract |
/// |---|---|---|
/// | (None, n > 0) | Allocate | Return a buffer of size n, or None. |
/// | (Some(p), n > 0) | Reallocate | Grow p, which is always the most recent allocation, to n. |
/// | (Some(p), 0) | Free | Release p, which is always the most recent allocation. |
/// | (None, 0) | Destruct | Tear down the allocator. Called once, by `CBORDecoder::finish`. |
///
/// Buffers handed back to the caller keep the `'pool` lifetime, so decoded items may borrow
/// from allocator memory exactly as they borrow from the input buffer.
pub trait StringAllocator<'pool> {
    /// The four-mode allocation entry point. See the trait documentation for the mode table.
    fn realloc(&mut self, old: Option<&'pool mut [u8]>, size: usize) -> Option<&'pool mut [u8]>;
}

/// The default string allocator: a fixed pool carved out of one caller-supplied buffer.
///
/// Allocation is a bump pointer; only the most recent allocation can be grown or freed, which
/// is all the decoder ever needs while it concatenates the chunks of one string. After
/// destruction every further request fails; construct a new `MemPool` to reuse the buffer.
#[derive(Debug)]
pub struct MemPool<'pool> {
    base: *mut u8,
    capacity: usize,
    next: usize,
    last: usize,
    _pool: PhantomData<&'pool mut [u8]>,
}

impl<'pool> MemPool<'pool> {
    /// Construct a pool over `buf`, which must provide at least `MIN_MEM_POOL_SIZE` bytes.
    pub fn new(buf: &'pool mut [u8]) -> Result<MemPool<'pool>> {
        if buf.len() < MIN_MEM_POOL_SIZE {
            return Err(CBORError::BufferTooSmall);
        }
        Ok(MemPool {
            base: buf.as_mut_ptr(),
            capacity: buf.len(),
            next: 0,
            last: 0,
            _pool: PhantomData,
        })
    }

    /// The number of bytes still available.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.next
    }

    /// Carve the region `start..start + size` out of the pool.
    ///
    /// Exclusivity: the pool holds the unique borrow of the underlying buffer for `'pool`, and
    /// every region is handed out at most once unless it was first returned through the
    /// reallocate or free modes, so the returned `&mut` never aliases a live borrow.
    fn region(&self, start: usize, size: usize) -> &'pool mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.base.add(start), size) }
    }
}

impl<'pool> StringAllocator<'pool> for MemPool<'pool> {
    fn realloc(&mut self, old: Option<&'pool mut [u8]>, size: usize) -> Option<&'pool mut [u8]> {
        match (old, size) {
            (None, 0) => {
                // Destruct: the pool is dead from here on
                self.capacity = 0;
                self.next = 0;
                self.last = 0;
                None
            }
            (None, n) => {
                if self.capacity - self.next < n {
                    return None;
                }
                self.last = self.next;
                self.next += n;
                Some(self.region(self.last, n))
            }
            (Some(p), 0) => {
                debug_assert_eq!(p.as_ptr() as usize, self.base as usize + self.last);
                self.next = self.last;
                None
            }
            (Some(p), n) => {
                debug_assert_eq!(p.as_ptr() as usize, self.base as usize + self.last);
                if self.capacity - self.last < n {
                    return None;
                }
                self.next = self.last + n;
                Some(self.region(self.last, n))
            }
        }
    }
}
