/***************************************************************************************************
 * Copyright (c) 2021-2023 Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * rs_streamcbor CBOR Decoder
 *
 * A streaming, memory efficient, deserializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// # Low-level CBOR decoding
///
/// The decoder performs a pre-order traversal of an in-memory CBOR byte sequence. Each call to
/// [`CBORDecoder::get_next`] consumes exactly one data item; for an array or map only the head
/// is consumed and the children are produced by subsequent calls. The nesting depth before and
/// after every item is reported on the item so that a caller can reconstruct the tree.
///
/// ## Example
///
/// ```
///# use tps_streamcbor::decoder::{CBORDecoder, DecodeMode};
///# use tps_streamcbor::types::CBOR;
/// let b = [0x18u8, 0x18];
/// let mut decoder = CBORDecoder::new(&b, DecodeMode::Normal);
/// let item = decoder.get_next().unwrap();
/// assert_eq!(CBOR::Int(24), item.value);
/// ```
use crate::buffer::ReadBuf;
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::head::{decode_head, Head};
use crate::item::{CBORItem, CBORLabel, TagSet, CBOR};
use crate::nesting::{DecodeFrame, DecodeNesting};
use crate::pool::{MemPool, StringAllocator};

use std::convert::TryFrom;
use std::str::from_utf8;

#[cfg(feature = "preferred-float")]
use crate::buffer::half_to_double;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// Built-in tags recognised by the decoder, in bitmap-bit order: bit `i` of an item's
/// `TagSet` reports that `BUILTIN_TAG_TABLE[i]` appeared on the item's tag chain.
const BUILTIN_TAG_TABLE: [u64; 8] = [
    TAG_DATE_STRING,
    TAG_DATE_EPOCH,
    TAG_POS_BIGNUM,
    TAG_NEG_BIGNUM,
    TAG_DECIMAL_FRACTION,
    TAG_BIG_FLOAT,
    TAG_DAYS_EPOCH,
    TAG_DAYS_STRING,
];

fn builtin_tag_bit(tag: u64) -> Option<u32> {
    BUILTIN_TAG_TABLE
        .iter()
        .position(|&t| t == tag)
        .map(|i| i as u32)
}

/// The decode mode, fixed at construction.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum DecodeMode {
    /// Map labels may be integers, text strings or byte strings, and each map entry is
    /// reported as one item carrying its label.
    Normal,
    /// As `Normal`, but only text string labels are accepted.
    MapStringsOnly,
    /// Maps are reported as arrays of alternating labels and values, with a doubled entry
    /// count; no label typing is enforced.
    MapAsArray,
}

/// The configured string allocator, if any.
enum Allocator<'buf> {
    None,
    Pool(MemPool<'buf>),
    Custom(&'buf mut dyn StringAllocator<'buf>),
}

impl<'buf> core::fmt::Debug for Allocator<'buf> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Allocator::None => f.write_str("None"),
            Allocator::Pool(p) => f.debug_tuple("Pool").field(p).finish(),
            Allocator::Custom(_) => f.write_str("Custom"),
        }
    }
}

impl<'buf> Allocator<'buf> {
    fn is_none(&self) -> bool {
        matches!(self, Allocator::None)
    }

    fn realloc(&mut self, old: Option<&'buf mut [u8]>, size: usize) -> Option<&'buf mut [u8]> {
        match self {
            Allocator::None => None,
            Allocator::Pool(p) => p.realloc(old, size),
            Allocator::Custom(a) => a.realloc(old, size),
        }
    }
}

/// The CBOR decode context. The context borrows the input for `'buf`; decoded string items
/// borrow either from the input or, when allocated, from the configured string allocator's
/// pool, which must therefore also live for `'buf`.
///
/// Two APIs share this context: the streaming [`CBORDecoder::get_next`] traversal defined
/// here, and the entered-container navigation defined alongside it (`enter_map` and friends),
/// which layers a bounded cursor and a sticky error discipline on top.
#[derive(Debug)]
pub struct CBORDecoder<'buf> {
    pub(crate) input: ReadBuf<'buf>,
    pub(crate) mode: DecodeMode,
    pub(crate) nesting: DecodeNesting,
    strict: bool,
    alloc: Allocator<'buf>,
    all_strings: bool,
    custom_tags: [u64; MAX_CUSTOM_TAGS],
    n_custom_tags: usize,
    pub(crate) last_error: Option<CBORError>,
    pub(crate) last_next_level: u8,
    destructed: bool,
}

impl<'buf> CBORDecoder<'buf> {
    /// Construct a decode context over `input`. Construction is infallible; an oversized
    /// input is reported by the first decode call.
    pub fn new(input: &'buf [u8], mode: DecodeMode) -> CBORDecoder<'buf> {
        CBORDecoder {
            input: ReadBuf::new(input),
            mode,
            nesting: DecodeNesting::new(),
            strict: false,
            alloc: Allocator::None,
            all_strings: false,
            custom_tags: [0; MAX_CUSTOM_TAGS],
            n_custom_tags: 0,
            last_error: None,
            last_next_level: 0,
            destructed: false,
        }
    }

    /// Reject non-minimal integer argument encodings. The default is lax: any argument width
    /// is accepted.
    pub fn set_strict_preferred(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Configure the default fixed-pool string allocator over `pool`. With `all_strings` set,
    /// every decoded string (definite-length included) is copied into the pool, so the input
    /// buffer may be released once decoding completes.
    pub fn set_mem_pool(&mut self, pool: &'buf mut [u8], all_strings: bool) -> Result<()> {
        self.alloc = Allocator::Pool(MemPool::new(pool)?);
        self.all_strings = all_strings;
        Ok(())
    }

    /// Configure a caller-supplied string allocator.
    pub fn set_string_allocator(
        &mut self,
        allocator: &'buf mut dyn StringAllocator<'buf>,
        all_strings: bool,
    ) {
        self.alloc = Allocator::Custom(allocator);
        self.all_strings = all_strings;
    }

    /// Configure additional tags to be tracked through each item's `TagSet`, mapped from bit
    /// `constants::CUSTOM_TAG_BASE_BIT` upward in list order.
    pub fn set_custom_tags(&mut self, tags: &[u64]) -> Result<()> {
        if tags.len() > MAX_CUSTOM_TAGS {
            return Err(CBORError::TooManyTags);
        }
        self.custom_tags[..tags.len()].copy_from_slice(tags);
        self.n_custom_tags = tags.len();
        Ok(())
    }

    /// Return `true` if `tag` was recognised on `item`, either as a built-in tag or through
    /// the caller-configured tag list.
    pub fn item_has_tag(&self, item: &CBORItem, tag: u64) -> bool {
        if let Some(bit) = builtin_tag_bit(tag) {
            if item.tags.has_bit(bit) {
                return true;
            }
        }
        self.custom_tags[..self.n_custom_tags]
            .iter()
            .enumerate()
            .any(|(i, &t)| t == tag && item.tags.has_bit(CUSTOM_TAG_BASE_BIT + i as u32))
    }

    /// Consume and return the next data item.
    ///
    /// For an array or map only the head is consumed; `nest_level` and `next_nest_level` on
    /// the returned item report the traversal depth around it. Returns `NoMoreItems` once the
    /// input (or the entered container, in map mode) is exhausted.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_next(&mut self) -> Result<CBORItem<'buf>> {
        self.next_item(None)
    }

    /// As [`CBORDecoder::get_next`], additionally writing every tag on the item (recognised
    /// or not, outermost first) into `tags_out`. Fails with `TooManyTags` when `tags_out` is
    /// too short.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_next_with_tags(&mut self, tags_out: &mut [u64]) -> Result<(CBORItem<'buf>, usize)> {
        let mut written = 0;
        let item = self.next_item(Some((tags_out, &mut written)))?;
        Ok((item, written))
    }

    /// Finalise decoding: tears down the string allocator (exactly once), then reports the
    /// sticky error if one is pending, an unterminated container, or unconsumed input.
    ///
    /// Dropping the context without calling `finish` leaks any allocator-tracked strings, as
    /// documented on [`StringAllocator`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn finish(&mut self) -> Result<()> {
        if !self.destructed {
            self.alloc.realloc(None, 0);
            self.destructed = true;
        }
        if let Some(e) = self.last_error {
            return Err(e);
        }
        if !self.nesting.is_empty() {
            return Err(CBORError::HitEnd);
        }
        if !self.input.at_end() {
            return Err(CBORError::EofExpected);
        }
        Ok(())
    }

    /***********************************************************************************************
     * Traversal internals
     **********************************************************************************************/

    /// Decode one complete item: label (inside a map), tag chain, value, and the nesting
    /// update that follows it.
    pub(crate) fn next_item(
        &mut self,
        tags_out: Option<(&mut [u64], &mut usize)>,
    ) -> Result<CBORItem<'buf>> {
        if self.input.len() > MAX_DECODE_INPUT_SIZE {
            return Err(CBORError::InputTooLarge);
        }
        match self.nesting.top() {
            Some(f) if f.bounded && f.exhausted => return Err(CBORError::NoMoreItems),
            None if self.input.at_end() => return Err(CBORError::NoMoreItems),
            _ => {}
        }
        let nest_level = self.nesting.level();

        // Label, when the enclosing container is a map traversed as a map
        let mut label = CBORLabel::None;
        let mut label_allocated = false;
        let in_map = matches!(self.nesting.top(), Some(f) if f.is_map)
            && self.mode != DecodeMode::MapAsArray;
        if in_map {
            let (l, allocated) = self.read_label()?;
            label = l;
            label_allocated = allocated;
            self.consume_one();
        }

        // Tag chain
        let mut tag_stack = [0u64; MAX_TAGS_PER_ITEM];
        let mut n_tags = 0usize;
        let mut head = decode_head(&mut self.input, self.strict)?;
        loop {
            match head {
                Head::Arg { mt, arg, .. } if mt == MT_TAG => {
                    if n_tags == MAX_TAGS_PER_ITEM {
                        return Err(CBORError::TooManyTags);
                    }
                    tag_stack[n_tags] = arg;
                    n_tags += 1;
                    head = decode_head(&mut self.input, self.strict)?;
                }
                _ => break,
            }
        }
        if let Some((out, written)) = tags_out {
            if n_tags > out.len() {
                return Err(CBORError::TooManyTags);
            }
            out[..n_tags].copy_from_slice(&tag_stack[..n_tags]);
            *written = n_tags;
        }

        // Value
        let mut tags = TagSet::new();
        let mut data_allocated = false;
        let mut container: Option<DecodeFrame> = None;
        let mut value = self.read_value(head, &tag_stack, &mut n_tags, &mut tags, &mut data_allocated, &mut container)?;

        // Remaining tag promotions, innermost first
        for i in (0..n_tags).rev() {
            let tag = tag_stack[i];
            if let Some(bit) = builtin_tag_bit(tag) {
                if container.is_some() {
                    // A recognised tag over an unconsumed array or map head cannot be promoted
                    return Err(CBORError::UnrecoverableTagContent);
                }
                value = self.promote(tag, value)?;
                tags.set_bit(bit);
            } else if let Some(idx) = self.custom_tags[..self.n_custom_tags]
                .iter()
                .position(|&t| t == tag)
            {
                tags.set_bit(CUSTOM_TAG_BASE_BIT + idx as u32);
            }
            // Unlisted unknown tags are consumed without note; use get_next_with_tags to see them
        }

        // Nesting update
        let next_nest_level = match container {
            Some(frame) => {
                self.consume_one();
                self.nesting.push(frame)?;
                self.ascend()?;
                self.nesting.level()
            }
            None => {
                self.consume_one();
                self.ascend()?;
                self.nesting.level()
            }
        };
        self.last_next_level = next_nest_level;

        let mut item = CBORItem::new(value, nest_level, next_nest_level);
        item.label = label;
        item.label_allocated = label_allocated;
        item.tags = tags;
        item.data_allocated = data_allocated;
        Ok(item)
    }

    /// Interpret a non-tag head into a value, reading any string payload and preparing the
    /// nesting frame of a container head. Decimal fractions and big floats are intercepted
    /// here because they consume their content array inline.
    fn read_value(
        &mut self,
        head: Head,
        tag_stack: &[u64; MAX_TAGS_PER_ITEM],
        n_tags: &mut usize,
        tags: &mut TagSet,
        data_allocated: &mut bool,
        container: &mut Option<DecodeFrame>,
    ) -> Result<CBOR<'buf>> {
        // Innermost tag 4 or 5 over an array head is an exponent/mantissa composite
        let innermost = if *n_tags > 0 {
            Some(tag_stack[*n_tags - 1])
        } else {
            None
        };
        let is_exp_mantissa_tag =
            innermost == Some(TAG_DECIMAL_FRACTION) || innermost == Some(TAG_BIG_FLOAT);
        let over_array = matches!(head, Head::Arg { mt, .. } if mt == MT_ARRAY)
            || matches!(head, Head::Indefinite { mt } if mt == MT_ARRAY);
        if is_exp_mantissa_tag && over_array {
            #[cfg(feature = "exp-mantissa")]
            {
                let tag = tag_stack[*n_tags - 1];
                *n_tags -= 1;
                if let Some(bit) = builtin_tag_bit(tag) {
                    tags.set_bit(bit);
                }
                return self.decode_exp_mantissa(tag, head);
            }
            #[cfg(not(feature = "exp-mantissa"))]
            return Err(CBORError::ExpMantissaDisabled);
        }

        match head {
            Head::Break => Err(CBORError::BadBreak),
            Head::Indefinite { mt } => match mt {
                MT_BSTR | MT_TSTR => {
                    #[cfg(feature = "indef-strings")]
                    {
                        let (bytes, allocated) = self.read_indefinite_string(mt)?;
                        *data_allocated = allocated;
                        if mt == MT_BSTR {
                            Ok(CBOR::Bstr(bytes))
                        } else {
                            Ok(CBOR::Tstr(from_utf8(bytes).map_err(|_| CBORError::Utf8)?))
                        }
                    }
                    #[cfg(not(feature = "indef-strings"))]
                    {
                        Err(CBORError::IndefLenStringsDisabled)
                    }
                }
                MT_ARRAY | MT_MAP => {
                    #[cfg(feature = "indef-arrays")]
                    {
                        let is_map = mt == MT_MAP;
                        *container =
                            Some(DecodeFrame::indefinite(is_map, self.input.tell()));
                        Ok(match (is_map, self.mode) {
                            (false, _) => CBOR::Array(INDEFINITE_COUNT),
                            (true, DecodeMode::MapAsArray) => CBOR::MapAsArray(INDEFINITE_COUNT),
                            (true, _) => CBOR::Map(INDEFINITE_COUNT),
                        })
                    }
                    #[cfg(not(feature = "indef-arrays"))]
                    {
                        Err(CBORError::IndefLenArraysDisabled)
                    }
                }
                _ => Err(CBORError::Unsupported),
            },
            Head::Arg { mt, ai, arg } => match mt {
                MT_UINT => Ok(if arg <= i64::MAX as u64 {
                    CBOR::Int(arg as i64)
                } else {
                    CBOR::UInt(arg)
                }),
                // A magnitude beyond i64 cannot be represented as a signed value; the raw
                // argument is reported and the caller must recognise the case
                MT_NINT => Ok(if arg <= i64::MAX as u64 {
                    CBOR::Int(-(arg as i64) - 1)
                } else {
                    CBOR::UInt(arg)
                }),
                MT_BSTR => {
                    let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                    let (bytes, allocated) = self.read_definite_string(len)?;
                    *data_allocated = allocated;
                    Ok(CBOR::Bstr(bytes))
                }
                MT_TSTR => {
                    let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                    let (bytes, allocated) = self.read_definite_string(len)?;
                    *data_allocated = allocated;
                    Ok(CBOR::Tstr(from_utf8(bytes).map_err(|_| CBORError::Utf8)?))
                }
                MT_ARRAY => {
                    if arg > MAX_ITEMS_IN_CONTAINER {
                        return Err(CBORError::ContainerTooLong);
                    }
                    *container = Some(DecodeFrame::definite(
                        false,
                        arg as u16,
                        arg as u32,
                        self.input.tell(),
                    ));
                    Ok(CBOR::Array(arg as u16))
                }
                MT_MAP => {
                    if arg > MAX_ITEMS_IN_CONTAINER {
                        return Err(CBORError::ContainerTooLong);
                    }
                    let reported = if self.mode == DecodeMode::MapAsArray {
                        // Labels and values are reported separately, so the count doubles
                        if arg * 2 > MAX_ITEMS_IN_CONTAINER {
                            return Err(CBORError::ContainerTooLong);
                        }
                        CBOR::MapAsArray((arg * 2) as u16)
                    } else {
                        CBOR::Map(arg as u16)
                    };
                    *container = Some(DecodeFrame::definite(
                        true,
                        arg as u16,
                        (arg * 2) as u32,
                        self.input.tell(),
                    ));
                    Ok(reported)
                }
                MT_SIMPLE => self.read_simple(ai, arg),
                _ => Err(CBORError::Unsupported),
            },
        }
    }

    /// Decode a Major Type 7 head: simple values, booleans, null, undefined and floats.
    fn read_simple(&mut self, ai: u8, arg: u64) -> Result<CBOR<'buf>> {
        match ai {
            0..=PAYLOAD_AI_BITS => Ok(match arg as u8 {
                20 => CBOR::False,
                21 => CBOR::True,
                22 => CBOR::Null,
                23 => CBOR::Undefined,
                v => CBOR::Simple(v),
            }),
            PAYLOAD_ONE_BYTE => {
                // Simple values below 32 must be encoded directly on the AI bits
                if arg < 32 {
                    Err(CBORError::BadType7)
                } else {
                    Ok(CBOR::Simple(arg as u8))
                }
            }
            PAYLOAD_TWO_BYTES => {
                #[cfg(feature = "preferred-float")]
                {
                    Ok(CBOR::Float64(half_to_double(arg as u16)))
                }
                #[cfg(all(feature = "float", not(feature = "preferred-float")))]
                {
                    Err(CBORError::HalfPrecisionDisabled)
                }
                #[cfg(not(feature = "float"))]
                {
                    Err(CBORError::AllFloatDisabled)
                }
            }
            PAYLOAD_FOUR_BYTES => {
                #[cfg(feature = "float")]
                {
                    Ok(CBOR::Float32(f32::from_bits(arg as u32)))
                }
                #[cfg(not(feature = "float"))]
                {
                    Err(CBORError::AllFloatDisabled)
                }
            }
            _ => {
                #[cfg(feature = "float")]
                {
                    Ok(CBOR::Float64(f64::from_bits(arg)))
                }
                #[cfg(not(feature = "float"))]
                {
                    Err(CBORError::AllFloatDisabled)
                }
            }
        }
    }

    /// Apply one built-in tag promotion to an already-decoded value.
    fn promote(&self, tag: u64, value: CBOR<'buf>) -> Result<CBOR<'buf>> {
        match tag {
            TAG_DATE_STRING => match value {
                CBOR::Tstr(s) => Ok(CBOR::DateString(s)),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            TAG_DAYS_STRING => match value {
                CBOR::Tstr(s) => Ok(CBOR::DaysString(s)),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            TAG_DATE_EPOCH => match value {
                CBOR::Int(v) => Ok(CBOR::DateEpoch {
                    seconds: v,
                    fraction: 0.0,
                }),
                CBOR::UInt(_) => Err(CBORError::DateOverflow),
                #[cfg(feature = "float")]
                CBOR::Float64(f) => split_epoch(f),
                #[cfg(feature = "float")]
                CBOR::Float32(f) => split_epoch(f as f64),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            TAG_DAYS_EPOCH => match value {
                CBOR::Int(v) => Ok(CBOR::DaysEpoch(v)),
                CBOR::UInt(_) => Err(CBORError::DateOverflow),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            TAG_POS_BIGNUM => match value {
                CBOR::Bstr(b) => Ok(CBOR::PosBignum(b)),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            TAG_NEG_BIGNUM => match value {
                CBOR::Bstr(b) => Ok(CBOR::NegBignum(b)),
                _ => Err(CBORError::UnrecoverableTagContent),
            },
            // Tags 4 and 5 over anything but an array head arrive here
            TAG_DECIMAL_FRACTION | TAG_BIG_FLOAT => {
                #[cfg(feature = "exp-mantissa")]
                {
                    Err(CBORError::UnrecoverableTagContent)
                }
                #[cfg(not(feature = "exp-mantissa"))]
                {
                    Err(CBORError::ExpMantissaDisabled)
                }
            }
            _ => Ok(value),
        }
    }

    /// Decode the two-element [exponent, mantissa] array of a decimal fraction or big float.
    /// The array content is consumed inline; the composite is one leaf item for nesting
    /// purposes.
    #[cfg(feature = "exp-mantissa")]
    fn decode_exp_mantissa(&mut self, tag: u64, head: Head) -> Result<CBOR<'buf>> {
        let indefinite = matches!(head, Head::Indefinite { .. });
        if let Head::Arg { arg, .. } = head {
            if arg != 2 {
                return Err(CBORError::UnrecoverableTagContent);
            }
        }

        let exponent = match decode_head(&mut self.input, self.strict)? {
            Head::Arg { mt, arg, .. } if mt == MT_UINT && arg <= i64::MAX as u64 => arg as i64,
            Head::Arg { mt, arg, .. } if mt == MT_NINT && arg <= i64::MAX as u64 => {
                -(arg as i64) - 1
            }
            // The exponent must be a signed 64-bit integer
            Head::Arg { mt, .. } if mt == MT_UINT || mt == MT_NINT => {
                return Err(CBORError::IntOverflow)
            }
            _ => return Err(CBORError::UnrecoverableTagContent),
        };

        // The mantissa is an integer, or a tag 2/3 bignum
        let mut mantissa_tag = None;
        let mut mhead = decode_head(&mut self.input, self.strict)?;
        if let Head::Arg { mt, arg, .. } = mhead {
            if mt == MT_TAG {
                if arg != TAG_POS_BIGNUM && arg != TAG_NEG_BIGNUM {
                    return Err(CBORError::UnrecoverableTagContent);
                }
                mantissa_tag = Some(arg);
                mhead = decode_head(&mut self.input, self.strict)?;
            }
        }
        let value = match (mantissa_tag, mhead) {
            (None, Head::Arg { mt, arg, .. }) if mt == MT_UINT && arg <= i64::MAX as u64 => {
                self.exp_mantissa_int(tag, exponent, arg as i64)
            }
            (None, Head::Arg { mt, arg, .. }) if mt == MT_NINT && arg <= i64::MAX as u64 => {
                self.exp_mantissa_int(tag, exponent, -(arg as i64) - 1)
            }
            (None, Head::Arg { mt, .. }) if mt == MT_UINT || mt == MT_NINT => {
                return Err(CBORError::IntOverflow)
            }
            (Some(mtag), Head::Arg { mt, arg, .. }) if mt == MT_BSTR => {
                let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                let bytes = self.input.get_slice(len)?;
                match (tag, mtag) {
                    (TAG_DECIMAL_FRACTION, TAG_POS_BIGNUM) => CBOR::DecimalFractionPosBignum {
                        exponent,
                        mantissa: bytes,
                    },
                    (TAG_DECIMAL_FRACTION, _) => CBOR::DecimalFractionNegBignum {
                        exponent,
                        mantissa: bytes,
                    },
                    (_, TAG_POS_BIGNUM) => CBOR::BigFloatPosBignum {
                        exponent,
                        mantissa: bytes,
                    },
                    (_, _) => CBOR::BigFloatNegBignum {
                        exponent,
                        mantissa: bytes,
                    },
                }
            }
            _ => return Err(CBORError::UnrecoverableTagContent),
        };

        if indefinite && self.input.get_u8()? != BREAK {
            return Err(CBORError::UnrecoverableTagContent);
        }
        Ok(value)
    }

    #[cfg(feature = "exp-mantissa")]
    fn exp_mantissa_int(&self, tag: u64, exponent: i64, mantissa: i64) -> CBOR<'buf> {
        if tag == TAG_DECIMAL_FRACTION {
            CBOR::DecimalFraction { exponent, mantissa }
        } else {
            CBOR::BigFloat { exponent, mantissa }
        }
    }

    /***********************************************************************************************
     * Labels and strings
     **********************************************************************************************/

    /// Read one map label. Labels are restricted to integers and strings; anything else,
    /// including a tagged or aggregate label, is a `MapLabelType` failure.
    fn read_label(&mut self) -> Result<(CBORLabel<'buf>, bool)> {
        let head = decode_head(&mut self.input, self.strict)?;
        let strings_only = self.mode == DecodeMode::MapStringsOnly;
        match head {
            Head::Break => Err(CBORError::BadBreak),
            Head::Indefinite { mt } if mt == MT_TSTR || (mt == MT_BSTR && !strings_only) => {
                #[cfg(feature = "indef-strings")]
                {
                    let (bytes, allocated) = self.read_indefinite_string(mt)?;
                    if mt == MT_TSTR {
                        let s = from_utf8(bytes).map_err(|_| CBORError::Utf8)?;
                        Ok((CBORLabel::Tstr(s), allocated))
                    } else {
                        Ok((CBORLabel::Bstr(bytes), allocated))
                    }
                }
                #[cfg(not(feature = "indef-strings"))]
                {
                    Err(CBORError::IndefLenStringsDisabled)
                }
            }
            Head::Arg { mt, arg, .. } => match mt {
                MT_TSTR => {
                    let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                    let (bytes, allocated) = self.read_definite_string(len)?;
                    let s = from_utf8(bytes).map_err(|_| CBORError::Utf8)?;
                    Ok((CBORLabel::Tstr(s), allocated))
                }
                MT_UINT if !strings_only => Ok((
                    if arg <= i64::MAX as u64 {
                        CBORLabel::Int(arg as i64)
                    } else {
                        CBORLabel::UInt(arg)
                    },
                    false,
                )),
                MT_NINT if !strings_only => {
                    if arg <= i64::MAX as u64 {
                        Ok((CBORLabel::Int(-(arg as i64) - 1), false))
                    } else {
                        // A magnitude beyond i64 is reported as the raw 64-bit argument,
                        // as on the value side
                        Ok((CBORLabel::UInt(arg), false))
                    }
                }
                MT_BSTR if !strings_only => {
                    let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                    let (bytes, allocated) = self.read_definite_string(len)?;
                    Ok((CBORLabel::Bstr(bytes), allocated))
                }
                _ => Err(CBORError::MapLabelType),
            },
            _ => Err(CBORError::MapLabelType),
        }
    }

    /// Read the payload of a definite-length string, copying it into the allocator pool when
    /// all-strings mode is active.
    fn read_definite_string(&mut self, len: usize) -> Result<(&'buf [u8], bool)> {
        let bytes = self.input.get_slice(len)?;
        if self.all_strings && !self.alloc.is_none() && len > 0 {
            let copy = self
                .alloc
                .realloc(None, len)
                .ok_or(CBORError::StringAllocate)?;
            copy.copy_from_slice(bytes);
            let shared: &'buf [u8] = copy;
            Ok((shared, true))
        } else {
            Ok((bytes, false))
        }
    }

    /// Concatenate the chunks of an indefinite-length string through the allocator. Every
    /// chunk must be a definite-length string of the same major type as the wrapper.
    #[cfg(feature = "indef-strings")]
    fn read_indefinite_string(&mut self, mt: u8) -> Result<(&'buf [u8], bool)> {
        if self.alloc.is_none() {
            return Err(CBORError::NoStringAllocator);
        }
        let mut total = 0usize;
        let mut grown: Option<&'buf mut [u8]> = None;
        loop {
            match decode_head(&mut self.input, self.strict)? {
                Head::Break => break,
                Head::Arg { mt: chunk_mt, arg, .. } if chunk_mt == mt => {
                    let len = usize::try_from(arg).map_err(|_| CBORError::HitEnd)?;
                    let chunk = self.input.get_slice(len)?;
                    if chunk.is_empty() {
                        continue;
                    }
                    let buf = self
                        .alloc
                        .realloc(grown.take(), total + chunk.len())
                        .ok_or(CBORError::StringAllocate)?;
                    buf[total..total + chunk.len()].copy_from_slice(chunk);
                    total += chunk.len();
                    grown = Some(buf);
                }
                // A chunk of another major type, or a nested indefinite chunk
                _ => return Err(CBORError::IndefiniteStringChunk),
            }
        }
        match grown {
            Some(buf) => {
                let shared: &'buf [u8] = buf;
                Ok((shared, true))
            }
            None => Ok((&[], false)),
        }
    }

    /***********************************************************************************************
     * Nesting maintenance
     **********************************************************************************************/

    /// Account for one consumed item in the innermost definite-length container.
    fn consume_one(&mut self) {
        if let Some(f) = self.nesting.top_mut() {
            if !f.indefinite && f.remaining > 0 {
                f.remaining -= 1;
            }
        }
    }

    /// Close every container satisfied at the current position: definite-length frames whose
    /// items are all consumed, and indefinite-length frames whose break is next in the input.
    /// A run of closures may pop several frames at once. Bounded (entered) frames are never
    /// popped here; they are marked exhausted and left for `exit_map`/`exit_array`.
    pub(crate) fn ascend(&mut self) -> Result<()> {
        loop {
            let (indefinite, bounded, remaining) = match self.nesting.top() {
                None => return Ok(()),
                Some(f) => (f.indefinite, f.bounded, f.remaining),
            };
            if bounded {
                if indefinite {
                    if self.input.peek_u8() == Some(BREAK) {
                        let _ = self.input.get_u8();
                        if let Some(f) = self.nesting.top_mut() {
                            f.exhausted = true;
                        }
                    }
                } else if remaining == 0 {
                    if let Some(f) = self.nesting.top_mut() {
                        f.exhausted = true;
                    }
                }
                return Ok(());
            }
            if indefinite {
                if self.input.peek_u8() == Some(BREAK) {
                    let _ = self.input.get_u8();
                    self.nesting.pop();
                    continue;
                }
                return Ok(());
            }
            if remaining == 0 {
                self.nesting.pop();
                continue;
            }
            return Ok(());
        }
    }
}

/// Split an epoch date float into whole seconds and a positive fraction.
#[cfg(feature = "float")]
fn split_epoch<'buf>(f: f64) -> Result<CBOR<'buf>> {
    // 2^63 as f64; anything at or beyond cannot be floored into an i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= LIMIT || f < -LIMIT {
        return Err(CBORError::DateOverflow);
    }
    let mut seconds = f as i64;
    if seconds as f64 > f {
        seconds -= 1;
    }
    Ok(CBOR::DateEpoch {
        seconds,
        fraction: f - seconds as f64,
    })
}
