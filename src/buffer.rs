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
 * rs_streamcbor byte buffer primitives
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::MAX_DECODE_INPUT_SIZE;
use crate::error::{CBORError, Result};

use std::convert::TryInto;

#[cfg(feature = "preferred-float")]
use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Return `true` if it is possible to obtain a slice of length `len` starting from `start` from
/// `buf`
#[inline]
pub(crate) fn within(buf: &[u8], start: usize, len: usize) -> bool {
    len <= buf.len() && start <= buf.len() - len
}

/***************************************************************************************************
 * Bounded write cursor
 **************************************************************************************************/

/// A bounded write cursor over a caller-supplied byte buffer.
///
/// `WriteBuf` may also be constructed without a buffer, in which case no bytes are stored and
/// only the length of the would-be output is computed. This lets a caller size a buffer with a
/// dry-run encode before committing memory.
#[derive(Debug)]
pub(crate) struct WriteBuf<'buf> {
    bytes: Option<&'buf mut [u8]>,
    len: usize,
}

impl<'buf> WriteBuf<'buf> {
    /// Construct a write cursor over `b`.
    ///
    /// The buffer is cleared on each instantiation. This allows the same underlying mutable
    /// buffer to be re-used.
    #[cfg_attr(feature = "trace", trace)]
    pub fn new(b: &'buf mut [u8]) -> WriteBuf<'buf> {
        b.fill(0);
        WriteBuf {
            bytes: Some(b),
            len: 0,
        }
    }

    /// Construct a write cursor which computes the encoded length without storing any bytes.
    #[inline]
    pub fn size_only() -> WriteBuf<'buf> {
        WriteBuf {
            bytes: None,
            len: 0,
        }
    }

    /// The number of bytes written (or counted) so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Append a single byte.
    #[cfg_attr(feature = "trace", trace)]
    pub fn put_u8(&mut self, v: u8) -> Result<()> {
        self.reserve(1)?;
        if let Some(bytes) = &mut self.bytes {
            bytes[self.len] = v;
        }
        self.len += 1;
        Ok(())
    }

    /// Append a slice of bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        self.reserve(src.len())?;
        if let Some(bytes) = &mut self.bytes {
            bytes[self.len..self.len + src.len()].copy_from_slice(src);
        }
        self.len += src.len();
        Ok(())
    }

    /// Overwrite bytes at an absolute position within the already-written prefix.
    pub fn write_at(&mut self, at: usize, src: &[u8]) -> Result<()> {
        if at + src.len() > self.len {
            return Err(CBORError::BufferTooSmall);
        }
        if let Some(bytes) = &mut self.bytes {
            bytes[at..at + src.len()].copy_from_slice(src);
        }
        Ok(())
    }

    /// Shift the written bytes in `at..len` right by `gap` positions, growing the buffer by
    /// `gap` bytes. The freed region keeps its previous content until overwritten.
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_gap(&mut self, at: usize, gap: usize) -> Result<()> {
        debug_assert!(at <= self.len);
        self.reserve(gap)?;
        if let Some(bytes) = &mut self.bytes {
            bytes.copy_within(at..self.len, at + gap);
        }
        self.len += gap;
        Ok(())
    }

    /// Discard bytes written after position `len`.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        debug_assert!(len <= self.len);
        self.len = len;
    }

    /// Return the encoded prefix, or `None` in size-only mode.
    #[inline]
    pub fn as_encoded(&self) -> Option<&[u8]> {
        match &self.bytes {
            Some(bytes) => Some(&bytes[..self.len]),
            None => None,
        }
    }

    /// Check that `extra` additional bytes can be accepted.
    #[inline]
    fn reserve(&self, extra: usize) -> Result<()> {
        if self.len + extra > MAX_DECODE_INPUT_SIZE {
            return Err(CBORError::OutputTooLarge);
        }
        match &self.bytes {
            Some(bytes) if !within(bytes, self.len, extra) => Err(CBORError::BufferTooSmall),
            _ => Ok(()),
        }
    }
}

/***************************************************************************************************
 * Bounded read cursor
 **************************************************************************************************/

/// A bounded read cursor over the input buffer, with big-endian unsigned integer reads.
#[derive(Debug, Copy, Clone)]
pub(crate) struct ReadBuf<'buf> {
    bytes: &'buf [u8],
    index: usize,
}

impl<'buf> ReadBuf<'buf> {
    #[inline]
    pub fn new(init: &'buf [u8]) -> ReadBuf<'buf> {
        ReadBuf {
            bytes: init,
            index: 0,
        }
    }

    /// The total input length.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// The current read position.
    #[inline]
    pub fn tell(&self) -> usize {
        self.index
    }

    /// Move the read position to an absolute offset.
    #[inline]
    pub fn seek(&mut self, index: usize) {
        self.index = index;
    }

    /// Return `true` when every input byte has been consumed.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.index >= self.bytes.len()
    }

    /// Return the next byte without consuming it.
    #[inline]
    pub fn peek_u8(&self) -> Option<u8> {
        if self.at_end() {
            None
        } else {
            Some(self.bytes[self.index])
        }
    }

    /// Consume and return the next byte.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_u8(&mut self) -> Result<u8> {
        if self.at_end() {
            Err(CBORError::HitEnd)
        } else {
            let v = self.bytes[self.index];
            self.index += 1;
            Ok(v)
        }
    }

    /// Consume and return the next `len` bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_slice(&mut self, len: usize) -> Result<&'buf [u8]> {
        if within(self.bytes, self.index, len) {
            let s = &self.bytes[self.index..self.index + len];
            self.index += len;
            Ok(s)
        } else {
            Err(CBORError::HitEnd)
        }
    }

    /// Consume two bytes as a big-endian u16.
    pub fn get_u16(&mut self) -> Result<u16> {
        let s = self.get_slice(2)?;
        let bytes: [u8; 2] = s.try_into().map_err(|_| CBORError::HitEnd)?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Consume four bytes as a big-endian u32.
    pub fn get_u32(&mut self) -> Result<u32> {
        let s = self.get_slice(4)?;
        let bytes: [u8; 4] = s.try_into().map_err(|_| CBORError::HitEnd)?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Consume eight bytes as a big-endian u64.
    pub fn get_u64(&mut self) -> Result<u64> {
        let s = self.get_slice(8)?;
        let bytes: [u8; 8] = s.try_into().map_err(|_| CBORError::HitEnd)?;
        Ok(u64::from_be_bytes(bytes))
    }
}

/***************************************************************************************************
 * Half-precision expansion
 **************************************************************************************************/

/// Expand an IEEE 754 binary16 bit pattern to a double. Subnormals, infinities and NaN all
/// follow the binary16 rules.
#[cfg(feature = "preferred-float")]
#[inline]
pub(crate) fn half_to_double(raw: u16) -> f64 {
    f64::from(f16::from_bits(raw))
}
