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
 * rs_streamcbor CBOR item model
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::error::CBORError;

use std::convert::TryFrom;

#[cfg(feature = "full")]
use chrono::{DateTime, FixedOffset};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// The decoded value of a single CBOR item. CBOR values may borrow immutably from an underlying
/// buffer which must therefore outlive the item itself - this is the 'buf lifetime.
///
/// Representations are as follows:
///
/// - Integers representable on `i64` are stored as `Int`. Positive values above `i64::MAX` are
///   stored as `UInt`. A negative value whose magnitude exceeds `i64::MAX` cannot be
///   represented directly; it is reported as `UInt` holding the raw 64-bit argument of the
///   Major Type 1 encoding and the caller must recognise this case.
/// - The bstr and tstr types are held as immutable borrowed slices, either over the decode
///   input or over allocator memory (see `CBORItem::data_allocated`).
/// - Arrays and maps carry only their entry count; their children are streamed by subsequent
///   `get_next` calls. An in-progress indefinite-length container reports
///   `constants::INDEFINITE_COUNT`. A map counts pairs, except in `MapAsArray` mode where
///   labels and values are counted separately.
/// - Recognised tags promote their content to a dedicated variant (dates, bignums, decimal
///   fractions and big floats).
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum CBOR<'buf> {
    Int(i64),
    UInt(u64),
    Array(u16),
    Map(u16),
    MapAsArray(u16),
    Bstr(&'buf [u8]),
    Tstr(&'buf str),
    PosBignum(&'buf [u8]),
    NegBignum(&'buf [u8]),
    DateString(&'buf str),
    DateEpoch { seconds: i64, fraction: f64 },
    DaysString(&'buf str),
    DaysEpoch(i64),
    #[cfg(feature = "exp-mantissa")]
    DecimalFraction { exponent: i64, mantissa: i64 },
    #[cfg(feature = "exp-mantissa")]
    DecimalFractionPosBignum { exponent: i64, mantissa: &'buf [u8] },
    #[cfg(feature = "exp-mantissa")]
    DecimalFractionNegBignum { exponent: i64, mantissa: &'buf [u8] },
    #[cfg(feature = "exp-mantissa")]
    BigFloat { exponent: i64, mantissa: i64 },
    #[cfg(feature = "exp-mantissa")]
    BigFloatPosBignum { exponent: i64, mantissa: &'buf [u8] },
    #[cfg(feature = "exp-mantissa")]
    BigFloatNegBignum { exponent: i64, mantissa: &'buf [u8] },
    Simple(u8),
    False,
    True,
    Null,
    Undefined,
    #[cfg(feature = "float")]
    Float32(f32),
    #[cfg(feature = "float")]
    Float64(f64),
}

/// The type of a CBOR value, without its payload. Used to state type expectations in map
/// lookups, where `Any` matches every value.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum CBORType {
    Any,
    Int,
    UInt,
    Array,
    Map,
    MapAsArray,
    Bstr,
    Tstr,
    PosBignum,
    NegBignum,
    DateString,
    DateEpoch,
    DaysString,
    DaysEpoch,
    #[cfg(feature = "exp-mantissa")]
    DecimalFraction,
    #[cfg(feature = "exp-mantissa")]
    DecimalFractionPosBignum,
    #[cfg(feature = "exp-mantissa")]
    DecimalFractionNegBignum,
    #[cfg(feature = "exp-mantissa")]
    BigFloat,
    #[cfg(feature = "exp-mantissa")]
    BigFloatPosBignum,
    #[cfg(feature = "exp-mantissa")]
    BigFloatNegBignum,
    Simple,
    False,
    True,
    Null,
    Undefined,
    #[cfg(feature = "float")]
    Float32,
    #[cfg(feature = "float")]
    Float64,
}

impl<'buf> CBOR<'buf> {
    /// The type of this value.
    pub fn cbor_type(&self) -> CBORType {
        match self {
            CBOR::Int(_) => CBORType::Int,
            CBOR::UInt(_) => CBORType::UInt,
            CBOR::Array(_) => CBORType::Array,
            CBOR::Map(_) => CBORType::Map,
            CBOR::MapAsArray(_) => CBORType::MapAsArray,
            CBOR::Bstr(_) => CBORType::Bstr,
            CBOR::Tstr(_) => CBORType::Tstr,
            CBOR::PosBignum(_) => CBORType::PosBignum,
            CBOR::NegBignum(_) => CBORType::NegBignum,
            CBOR::DateString(_) => CBORType::DateString,
            CBOR::DateEpoch { .. } => CBORType::DateEpoch,
            CBOR::DaysString(_) => CBORType::DaysString,
            CBOR::DaysEpoch(_) => CBORType::DaysEpoch,
            #[cfg(feature = "exp-mantissa")]
            CBOR::DecimalFraction { .. } => CBORType::DecimalFraction,
            #[cfg(feature = "exp-mantissa")]
            CBOR::DecimalFractionPosBignum { .. } => CBORType::DecimalFractionPosBignum,
            #[cfg(feature = "exp-mantissa")]
            CBOR::DecimalFractionNegBignum { .. } => CBORType::DecimalFractionNegBignum,
            #[cfg(feature = "exp-mantissa")]
            CBOR::BigFloat { .. } => CBORType::BigFloat,
            #[cfg(feature = "exp-mantissa")]
            CBOR::BigFloatPosBignum { .. } => CBORType::BigFloatPosBignum,
            #[cfg(feature = "exp-mantissa")]
            CBOR::BigFloatNegBignum { .. } => CBORType::BigFloatNegBignum,
            CBOR::Simple(_) => CBORType::Simple,
            CBOR::False => CBORType::False,
            CBOR::True => CBORType::True,
            CBOR::Null => CBORType::Null,
            CBOR::Undefined => CBORType::Undefined,
            #[cfg(feature = "float")]
            CBOR::Float32(_) => CBORType::Float32,
            #[cfg(feature = "float")]
            CBOR::Float64(_) => CBORType::Float64,
        }
    }

    /// Return `true` if this value matches `expected`, where `Any` matches everything.
    #[inline]
    pub fn is_type(&self, expected: CBORType) -> bool {
        expected == CBORType::Any || self.cbor_type() == expected
    }
}

/// The label of a map entry. Labels are restricted to integers and strings; an entry outside a
/// map carries `CBORLabel::None`.
#[derive(PartialEq, Debug, Copy, Clone)]
pub enum CBORLabel<'buf> {
    None,
    Int(i64),
    UInt(u64),
    Bstr(&'buf [u8]),
    Tstr(&'buf str),
}

/// The set of recognised tags seen on one item, as a 64-bit bitmap. Bit positions are assigned
/// by the decoder's tag table: the built-in tags occupy fixed low bits and caller-configured
/// tags are mapped from `constants::CUSTOM_TAG_BASE_BIT` upward. Use
/// `CBORDecoder::item_has_tag` to test for a tag by number.
#[derive(PartialEq, Eq, Debug, Copy, Clone, Default)]
pub struct TagSet(pub(crate) u64);

impl TagSet {
    /// The empty tag set.
    #[inline]
    pub fn new() -> TagSet {
        TagSet(0)
    }

    /// Return `true` if no recognised tag was seen.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Return `true` if bit `bit` is set.
    #[inline]
    pub fn has_bit(&self, bit: u32) -> bool {
        bit < 64 && self.0 & (1u64 << bit) != 0
    }

    #[inline]
    pub(crate) fn set_bit(&mut self, bit: u32) {
        if bit < 64 {
            self.0 |= 1u64 << bit;
        }
    }
}

/// One decoded CBOR data item, as produced by `CBORDecoder::get_next`.
///
/// `nest_level` is the array/map depth at which the item occurred (0 at the top).
/// `next_nest_level` is the depth the decode cursor is at after this item; it never exceeds
/// `nest_level + 1` (a container head opens one level) and a drop below `nest_level` means one
/// or more enclosing containers just closed.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct CBORItem<'buf> {
    /// The decoded value.
    pub value: CBOR<'buf>,
    /// The map label paired with this value, or `CBORLabel::None` outside a map.
    pub label: CBORLabel<'buf>,
    /// Nesting depth at which the item occurred.
    pub nest_level: u8,
    /// Nesting depth of the cursor after this item.
    pub next_nest_level: u8,
    /// Recognised tags seen on this item.
    pub tags: TagSet,
    /// `true` when the value's string bytes live in allocator memory rather than the input.
    pub data_allocated: bool,
    /// `true` when the label's string bytes live in allocator memory rather than the input.
    pub label_allocated: bool,
}

impl<'buf> CBORItem<'buf> {
    pub(crate) fn new(value: CBOR<'buf>, nest_level: u8, next_nest_level: u8) -> CBORItem<'buf> {
        CBORItem {
            value,
            label: CBORLabel::None,
            nest_level,
            next_nest_level,
            tags: TagSet::new(),
            data_allocated: false,
            label_allocated: false,
        }
    }

    /// Attempt to interpret a date string as a `chrono` date/time value.
    #[cfg(feature = "full")]
    pub fn as_datetime(&self) -> Result<DateTime<FixedOffset>, CBORError> {
        match self.value {
            CBOR::DateString(s) | CBOR::DaysString(s) => {
                DateTime::parse_from_rfc3339(s).map_err(|_| CBORError::BadDateTime)
            }
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/***************************************************************************************************
 * Standard Trait Implementations: Try to convert a decoded value. Always fallible
 **************************************************************************************************/

/// Attempt to convert a decoded value into bool
impl<'buf> TryFrom<CBOR<'buf>> for bool {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        match value {
            CBOR::True => Ok(true),
            CBOR::False => Ok(false),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/// Attempt to convert a decoded value into u64
impl<'buf> TryFrom<CBOR<'buf>> for u64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        match value {
            CBOR::UInt(v) => Ok(v),
            CBOR::Int(v) if v >= 0 => Ok(v as u64),
            CBOR::Int(_) => Err(CBORError::NumberSignConversion),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/// Attempt to convert a decoded value into u32
impl<'buf> TryFrom<CBOR<'buf>> for u32 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        let v = u64::try_from(value)?;
        if v <= u32::MAX as u64 {
            Ok(v as u32)
        } else {
            Err(CBORError::ConversionUnderOverFlow)
        }
    }
}

/// Attempt to convert a decoded value into i64.
///
/// A decoded `UInt` above `i64::MAX` cannot fit; this includes the raw argument of a Major
/// Type 1 item whose magnitude exceeded `i64::MAX`.
impl<'buf> TryFrom<CBOR<'buf>> for i64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        match value {
            CBOR::Int(v) => Ok(v),
            CBOR::UInt(v) if v <= i64::MAX as u64 => Ok(v as i64),
            CBOR::UInt(_) => Err(CBORError::ConversionUnderOverFlow),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/// Attempt to convert a decoded value into i128. Always succeeds for integer values as CBOR
/// only supports integers up to 64 bits, which all fit on 128 bits.
impl<'buf> TryFrom<CBOR<'buf>> for i128 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        match value {
            CBOR::Int(v) => Ok(v as i128),
            CBOR::UInt(v) => Ok(v as i128),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/// Attempt to convert a decoded value into a &str
///
/// # Lifetime
///
/// The lifetime of the str will be the lifetime of the underlying buffer on which the item is
/// bounded.
impl<'buf> TryFrom<CBOR<'buf>> for &'buf str {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR<'buf>) -> Result<Self, Self::Error> {
        match value {
            CBOR::Tstr(s) => Ok(s),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

/// Attempt to convert a decoded value into a &[u8]
///
/// # Lifetime
///
/// The lifetime of the &[u8] will be the lifetime of the underlying buffer on which the item is
/// bounded.
impl<'buf> TryFrom<CBOR<'buf>> for &'buf [u8] {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR<'buf>) -> Result<Self, Self::Error> {
        match value {
            CBOR::Bstr(bytes) => Ok(bytes),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}

#[cfg(feature = "float")]
impl<'buf> TryFrom<CBOR<'buf>> for f64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self, Self::Error> {
        match value {
            CBOR::Float64(v) => Ok(v),
            CBOR::Float32(v) => Ok(v as f64),
            _ => Err(CBORError::UnexpectedType),
        }
    }
}
