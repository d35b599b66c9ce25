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
 * rs_streamcbor CBOR Encoder
 *
 * A streaming, memory efficient, serializer for CBOR (RFC8949). This serializer is designed
 * for use in constrained systems and requires neither the Rust standard library nor an
 * allocator.
 **************************************************************************************************/
use crate::buffer::WriteBuf;
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::head::{encode_head, encode_indefinite_head, head_size, patch_head};
use crate::nesting::{EncodeKind, EncodeNesting};

#[cfg(feature = "preferred-float")]
use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/***************************************************************************************************
 * Encode Buffer
 **************************************************************************************************/

/// `EncodeBuffer` streams well-formed CBOR into a caller-supplied byte buffer.
///
/// Containers are encoded with an open/close call pair; the encoder keeps a bounded stack of
/// the open containers and patches each definite-length head with its final entry count on
/// close. One byte is reserved for the head when a container is opened and the payload is
/// shifted right on close only when the count needs a wider head, so small containers cost
/// no movement at all.
///
/// An `EncodeBuffer` constructed with [`EncodeBuffer::size_only`] stores nothing and simply
/// computes the encoded length, so a caller can size a buffer with a dry run.
///
/// ## Example
/// ```
///# use tps_streamcbor::encoder::EncodeBuffer;
///# use tps_streamcbor::error::CBORError;
///# fn main() -> Result<(), CBORError> {
///    let mut bytes = [0u8; 16];
///    let mut buf = EncodeBuffer::new(&mut bytes);
///    buf.open_array()?;
///    buf.add_int64(1)?;
///    buf.add_text("hi")?;
///    buf.close_array()?;
///    assert_eq!(buf.finish()?, &[0x82, 0x01, 0x62, 0x68, 0x69]);
///#    Ok(())
///# }
/// ```
#[derive(Debug)]
pub struct EncodeBuffer<'buf> {
    buf: WriteBuf<'buf>,
    nesting: EncodeNesting,
}

impl<'buf> EncodeBuffer<'buf> {
    /// Construct an instance of `EncodeBuffer` over a byte buffer.
    ///
    /// The buffer is cleared on each instantiation of `EncodeBuffer`. This allows the same
    /// underlying mutable buffer to be re-used.
    pub fn new(b: &'buf mut [u8]) -> EncodeBuffer<'buf> {
        EncodeBuffer {
            buf: WriteBuf::new(b),
            nesting: EncodeNesting::new(),
        }
    }

    /// Construct an instance of `EncodeBuffer` which computes the encoded size without
    /// storing any bytes. Use [`EncodeBuffer::finish_size`] to obtain the length.
    pub fn size_only() -> EncodeBuffer<'buf> {
        EncodeBuffer {
            buf: WriteBuf::size_only(),
            nesting: EncodeNesting::new(),
        }
    }

    /***********************************************************************************************
     * Primitive items
     **********************************************************************************************/

    /// Add an unsigned integer, using preferred serialization.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_uint64(&mut self, v: u64) -> Result<&mut Self> {
        encode_head(&mut self.buf, MT_UINT, v)?;
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a signed integer, using preferred serialization. Negative values encode as Major
    /// Type 1 with argument `-1 - v`.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_int64(&mut self, v: i64) -> Result<&mut Self> {
        if v < 0 {
            // -1 - v without overflow at i64::MIN
            encode_head(&mut self.buf, MT_NINT, !(v as u64))?;
        } else {
            encode_head(&mut self.buf, MT_UINT, v as u64)?;
        }
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a byte string.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_bytes(&mut self, v: &[u8]) -> Result<&mut Self> {
        encode_head(&mut self.buf, MT_BSTR, v.len() as u64)?;
        self.buf.put_slice(v)?;
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a text string.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_text(&mut self, v: &str) -> Result<&mut Self> {
        encode_head(&mut self.buf, MT_TSTR, v.len() as u64)?;
        self.buf.put_slice(v.as_bytes())?;
        self.nesting.count_item();
        Ok(self)
    }

    /// Tag the item that follows. Several tags may be stacked by calling `add_tag` more than
    /// once; they apply outermost-first to the next item.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_tag(&mut self, tag: u64) -> Result<&mut Self> {
        // A tag is part of the next item, so it does not count towards the open container
        encode_head(&mut self.buf, MT_TAG, tag)?;
        Ok(self)
    }

    /// Add a simple value. Values 20..23 are the booleans, null and undefined; values 24..31
    /// are reserved and cannot be encoded.
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_simple(&mut self, v: u8) -> Result<&mut Self> {
        if (24..=31).contains(&v) {
            return Err(CBORError::EncodeUnsupported);
        }
        encode_head(&mut self.buf, MT_SIMPLE, v as u64)?;
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a boolean.
    #[inline]
    pub fn add_bool(&mut self, v: bool) -> Result<&mut Self> {
        self.add_simple(if v { 21 } else { 20 })
    }

    /// Add a null.
    #[inline]
    pub fn add_null(&mut self) -> Result<&mut Self> {
        self.add_simple(22)
    }

    /// Add an undefined.
    #[inline]
    pub fn add_undefined(&mut self) -> Result<&mut Self> {
        self.add_simple(23)
    }

    /// Add a double-precision float, using the narrowest of half, single and double precision
    /// that represents the value exactly. NaN and the infinities always collapse to
    /// half-precision.
    #[cfg(feature = "preferred-float")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_double(&mut self, v: f64) -> Result<&mut Self> {
        let half = f16::from_f64(v);
        if v.is_nan() {
            self.put_f16(f16::NAN)?;
        } else if v.is_infinite() || f64::from(half) == v {
            self.put_f16(half)?;
        } else if (v as f32) as f64 == v {
            self.put_f32(v as f32)?;
        } else {
            self.put_f64(v)?;
        }
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a double-precision float at full width.
    #[cfg(all(feature = "float", not(feature = "preferred-float")))]
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_double(&mut self, v: f64) -> Result<&mut Self> {
        self.put_f64(v)?;
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a single-precision float, narrowed to half precision when the value is exactly
    /// representable. NaN and the infinities always collapse to half-precision.
    #[cfg(feature = "preferred-float")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_float(&mut self, v: f32) -> Result<&mut Self> {
        let half = f16::from_f32(v);
        if v.is_nan() {
            self.put_f16(f16::NAN)?;
        } else if v.is_infinite() || f32::from(half) == v {
            self.put_f16(half)?;
        } else {
            self.put_f32(v)?;
        }
        self.nesting.count_item();
        Ok(self)
    }

    /// Add a single-precision float at full width.
    #[cfg(all(feature = "float", not(feature = "preferred-float")))]
    #[cfg_attr(feature = "trace", trace)]
    pub fn add_float(&mut self, v: f32) -> Result<&mut Self> {
        self.put_f32(v)?;
        self.nesting.count_item();
        Ok(self)
    }

    #[cfg(feature = "preferred-float")]
    fn put_f16(&mut self, v: f16) -> Result<()> {
        self.buf.put_u8(MT_FLOAT | PAYLOAD_TWO_BYTES)?;
        self.buf.put_slice(&v.to_be_bytes())
    }

    #[cfg(feature = "float")]
    fn put_f32(&mut self, v: f32) -> Result<()> {
        self.buf.put_u8(MT_FLOAT | PAYLOAD_FOUR_BYTES)?;
        self.buf.put_slice(&v.to_be_bytes())
    }

    #[cfg(feature = "float")]
    fn put_f64(&mut self, v: f64) -> Result<()> {
        self.buf.put_u8(MT_FLOAT | PAYLOAD_EIGHT_BYTES)?;
        self.buf.put_slice(&v.to_be_bytes())
    }

    /***********************************************************************************************
     * Arrays, maps and byte string wrapping
     **********************************************************************************************/

    /// Open a definite-length array. Must be balanced by [`EncodeBuffer::close_array`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_array(&mut self) -> Result<&mut Self> {
        self.open_definite(EncodeKind::Array)
    }

    /// Open a definite-length map. Must be balanced by [`EncodeBuffer::close_map`]. Labels
    /// and values are added alternately; a map holding an odd number of items cannot be
    /// closed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_map(&mut self) -> Result<&mut Self> {
        self.open_definite(EncodeKind::Map)
    }

    /// Open a byte-string wrap: everything added until the matching
    /// [`EncodeBuffer::close_bstr_wrap`] becomes the payload of a single byte string.
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_bstr_wrap(&mut self) -> Result<&mut Self> {
        self.open_definite(EncodeKind::BstrWrap)
    }

    /// Open an indefinite-length array, closed with a break by
    /// [`EncodeBuffer::close_array`].
    #[cfg(feature = "indef-arrays")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_array_indefinite(&mut self) -> Result<&mut Self> {
        self.open_indefinite(EncodeKind::Array, MT_ARRAY)
    }

    /// Open an indefinite-length map, closed with a break by [`EncodeBuffer::close_map`].
    #[cfg(feature = "indef-arrays")]
    #[cfg_attr(feature = "trace", trace)]
    pub fn open_map_indefinite(&mut self) -> Result<&mut Self> {
        self.open_indefinite(EncodeKind::Map, MT_MAP)
    }

    /// Close the open array.
    #[cfg_attr(feature = "trace", trace)]
    pub fn close_array(&mut self) -> Result<&mut Self> {
        self.close_container(EncodeKind::Array)
    }

    /// Close the open map.
    #[cfg_attr(feature = "trace", trace)]
    pub fn close_map(&mut self) -> Result<&mut Self> {
        self.close_container(EncodeKind::Map)
    }

    /// Close the open byte-string wrap, turning everything added since the open into the
    /// payload of one byte string.
    #[cfg_attr(feature = "trace", trace)]
    pub fn close_bstr_wrap(&mut self) -> Result<&mut Self> {
        let frame = self.nesting.pop(EncodeKind::BstrWrap)?;
        let payload_len = (self.buf.len() - frame.head_offset - 1) as u64;
        self.patch_definite_head(frame.head_offset, MT_BSTR, payload_len)?;
        Ok(self)
    }

    /// Abandon an open byte-string wrap. Only legal when nothing has been added since the
    /// open.
    #[cfg_attr(feature = "trace", trace)]
    pub fn cancel_bstr_wrap(&mut self) -> Result<&mut Self> {
        match self.nesting.top() {
            Some(frame) if frame.kind == EncodeKind::BstrWrap => {
                if frame.count != 0 || self.buf.len() != frame.head_offset + 1 {
                    return Err(CBORError::CannotCancel);
                }
            }
            Some(_) => return Err(CBORError::CloseMismatch),
            None => return Err(CBORError::TooManyCloses),
        }
        let frame = self.nesting.pop(EncodeKind::BstrWrap)?;
        self.buf.truncate(frame.head_offset);
        // The wrap no longer occupies a slot of its parent
        self.nesting.uncount_item();
        Ok(self)
    }

    fn open_definite(&mut self, kind: EncodeKind) -> Result<&mut Self> {
        // The container is one item of its parent
        self.nesting.count_item();
        let head_offset = self.buf.len();
        self.nesting.push(kind, false, head_offset)?;
        // Reserve the smallest head; close_container widens it if the count demands
        self.buf.put_u8(0)?;
        Ok(self)
    }

    #[cfg(feature = "indef-arrays")]
    fn open_indefinite(&mut self, kind: EncodeKind, mt: u8) -> Result<&mut Self> {
        self.nesting.count_item();
        let head_offset = self.buf.len();
        self.nesting.push(kind, true, head_offset)?;
        encode_indefinite_head(&mut self.buf, mt)?;
        Ok(self)
    }

    fn close_container(&mut self, kind: EncodeKind) -> Result<&mut Self> {
        let frame = self.nesting.pop(kind)?;
        if kind == EncodeKind::Map && frame.count % 2 != 0 {
            return Err(CBORError::MapOddItems);
        }
        if frame.indefinite {
            self.buf.put_u8(BREAK)?;
            return Ok(self);
        }
        let (mt, arg) = match kind {
            EncodeKind::Map => (MT_MAP, frame.count / 2),
            _ => (MT_ARRAY, frame.count),
        };
        if arg > MAX_ITEMS_IN_CONTAINER {
            return Err(CBORError::ArrayTooLong);
        }
        self.patch_definite_head(frame.head_offset, mt, arg)?;
        Ok(self)
    }

    /// Backpatch the one-byte placeholder head at `head_offset` with the final argument,
    /// shifting the payload right when the argument needs a wider head.
    fn patch_definite_head(&mut self, head_offset: usize, mt: u8, arg: u64) -> Result<()> {
        let hs = head_size(arg);
        if hs > 1 {
            self.buf.open_gap(head_offset + 1, hs - 1)?;
        }
        patch_head(&mut self.buf, head_offset, mt, arg)
    }

    /***********************************************************************************************
     * Completion
     **********************************************************************************************/

    /// Return a slice holding the encoded output.
    ///
    /// Fails with `ArrayOrMapStillOpen` if any container remains open, and with
    /// `EncodeUnsupported` on a size-only buffer (use [`EncodeBuffer::finish_size`] there).
    #[cfg_attr(feature = "trace", trace)]
    pub fn finish(&self) -> Result<&[u8]> {
        if !self.nesting.is_empty() {
            return Err(CBORError::ArrayOrMapStillOpen);
        }
        self.buf.as_encoded().ok_or(CBORError::EncodeUnsupported)
    }

    /// Return the length of the encoded output. Works on both real and size-only buffers.
    #[cfg_attr(feature = "trace", trace)]
    pub fn finish_size(&self) -> Result<usize> {
        if !self.nesting.is_empty() {
            return Err(CBORError::ArrayOrMapStillOpen);
        }
        Ok(self.buf.len())
    }

    /***********************************************************************************************
     * EncodeItem layer
     **********************************************************************************************/

    /// Insert an `EncodeItem` item into an `EncodeBuffer`.
    #[inline]
    pub fn insert(&mut self, item: &dyn EncodeItem) -> Result<&mut Self> {
        item.encode(self)
    }

    /// Insert a (key, value) pair of `EncodeItem`s into an `EncodeBuffer`.
    ///
    /// This function is most likely to be useful when encoding CBOR maps, although it is just
    /// a convenience for calling `insert` twice in sequence.
    pub fn insert_key_value(
        &mut self,
        key: &dyn EncodeItem,
        value: &dyn EncodeItem,
    ) -> Result<&mut Self> {
        key.encode(self)?;
        value.encode(self)
    }
}

/***************************************************************************************************
 * Encode Item
 **************************************************************************************************/

/// The `EncodeItem` trait encapsulates encoding operations as anything that can be serialized
/// to CBOR.
pub trait EncodeItem {
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>>;
}

impl EncodeItem for u64 {
    /// Encode a `u64` using the preferred (shortest) serialization as a Major Type 0.
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_uint64(*self)
    }
}

impl EncodeItem for u32 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_uint64(*self as u64)
    }
}

impl EncodeItem for u16 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_uint64(*self as u64)
    }
}

impl EncodeItem for u8 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_uint64(*self as u64)
    }
}

impl EncodeItem for i64 {
    /// Encode an `i64` using the preferred (shortest) serialization as a Major Type 0 or
    /// Major Type 1.
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_int64(*self)
    }
}

impl EncodeItem for i32 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_int64(*self as i64)
    }
}

impl EncodeItem for i16 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_int64(*self as i64)
    }
}

impl EncodeItem for i8 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_int64(*self as i64)
    }
}

impl EncodeItem for bool {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_bool(*self)
    }
}

impl EncodeItem for &str {
    /// Encode an `&str` as a CBOR text string.
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_text(self)
    }
}

impl EncodeItem for &[u8] {
    /// Encode an `&[u8]` as a CBOR byte string.
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_bytes(self)
    }
}

#[cfg(feature = "float")]
impl EncodeItem for f64 {
    /// Encode an `f64`, narrowed to the shortest exact representation when preferred float
    /// serialization is enabled.
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_double(*self)
    }
}

#[cfg(feature = "float")]
impl EncodeItem for f32 {
    #[inline]
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_float(*self)
    }
}

/***************************************************************************************************
 * Closure builders for arrays, maps and tags
 **************************************************************************************************/

/// A container structure for the closure used to manage encoding of CBOR arrays, and in
/// particular to ensure that the correct lifetime bounds are specified.
///
/// The user encodes the members of the array within a closure, and the array length is fixed
/// up automatically. Arbitrary nesting of arrays and maps is supported.
///
/// Users should never need to directly instantiate `Array`. Instead, see [`array`].
pub struct Array<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    f: F,
}

impl<F> EncodeItem for Array<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.open_array()?;
        let _ = (self.f)(buf)?;
        buf.close_array()
    }
}

/// A convenience function for the user to create an instance of a CBOR array. The user
/// provides a closure which constructs the array contents.
///
/// ```
///# use tps_streamcbor::encoder::EncodeBuffer;
///# use tps_streamcbor::error::CBORError;
///# use tps_streamcbor::types::array;
///# fn main() -> Result<(), CBORError> {
///    let mut buffer = [0u8; 16];
///    let expected: &[u8] = &[132, 1, 2, 3, 4];
///
///    let mut encoder = EncodeBuffer::new(&mut buffer);
///    encoder.insert(&array(|buff| {
///        buff.insert(&1)?.insert(&2)?.insert(&3)?.insert(&4)
///    }))?;
///    assert_eq!(encoder.finish()?, expected);
///#    Ok(())
///# }
/// ```
pub fn array<F>(f: F) -> Array<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    Array { f }
}

/// A container structure for the closure used to manage encoding of CBOR maps. See [`map`].
pub struct Map<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    f: F,
}

/// The [`EncodeItem`] instance for `Map` performs the required manipulations to correctly
/// calculate the size of the map and ensure that the number of items inserted is a multiple
/// of two.
impl<F> EncodeItem for Map<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.open_map()?;
        let _ = (self.f)(buf)?;
        buf.close_map()
    }
}

/// A convenience function for the user to create an instance of a CBOR map. The user provides
/// a closure which constructs the map contents.
///
/// The user can insert the map keys and values separately, but the use of the convenience
/// function [`EncodeBuffer::insert_key_value`] helps to avoid errors.
///
/// ```
///# use tps_streamcbor::encoder::EncodeBuffer;
///# use tps_streamcbor::error::CBORError;
///# use tps_streamcbor::types::map;
///# fn main() -> Result<(), CBORError> {
///    let mut buffer = [0u8; 16];
///    let expected: &[u8] = &[162, 1, 101, 72, 101, 108, 108, 111, 2, 101, 87, 111, 114, 108, 100];
///
///    let mut encoder = EncodeBuffer::new(&mut buffer);
///    encoder.insert(&map(|buff| {
///        buff.insert_key_value(&1, &"Hello")?
///            .insert_key_value(&2, &"World")
///    }))?;
///    assert_eq!(encoder.finish()?, expected);
///#    Ok(())
///# }
/// ```
pub fn map<F>(f: F) -> Map<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    Map { f }
}

/// A container structure for the closure used to manage encoding of CBOR tags. See [`tag`].
pub struct Tag<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    tag: u64,
    f: F,
}

impl<F> EncodeItem for Tag<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    fn encode<'f, 'buf>(
        &self,
        buf: &'f mut EncodeBuffer<'buf>,
    ) -> Result<&'f mut EncodeBuffer<'buf>> {
        buf.add_tag(self.tag)?;
        (self.f)(buf)
    }
}

/// A convenience function for the user to tag a CBOR item. The user provides a closure which
/// constructs the tagged content; the closure should insert exactly one item.
///
/// ```
///# use tps_streamcbor::encoder::EncodeBuffer;
///# use tps_streamcbor::error::CBORError;
///# use tps_streamcbor::types::tag;
///# fn main() -> Result<(), CBORError> {
///    let mut buffer = [0u8; 16];
///
///    let mut encoder = EncodeBuffer::new(&mut buffer);
///    encoder.insert(&tag(37, |buf| buf.insert(&-31i16)))?;
///#    Ok(())
///# }
/// ```
pub fn tag<F>(tag: u64, f: F) -> Tag<F>
where
    F: for<'f, 'buf> Fn(&'f mut EncodeBuffer<'buf>) -> Result<&'f mut EncodeBuffer<'buf>>,
{
    Tag { tag, f }
}
