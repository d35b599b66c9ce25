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
 * rs_streamcbor CBOR Error API
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use std::result;

#[cfg(any(feature = "full", test))]
use thiserror::Error;

/// An alias for Result<T, CBORError> used throughout this crate.
pub type Result<T> = result::Result<T, CBORError>;

/// `CBORError` provides information about errors encoding or decoding CBOR.
///
/// Every error has a stable numeric code, obtained with [`CBORError::code`]. The codes are
/// partitioned into bands so that a caller can classify an error with a range comparison
/// instead of enumerating variants:
///
/// - `1..=19`: encoding errors.
/// - `20..=29`: input is not well-formed CBOR.
/// - `30..=39`: input is not well-formed and decoding cannot continue.
/// - `40..=59`: input is well-formed but hit an implementation limit or invalid content from
///   which decoding cannot continue.
/// - `60..`: recoverable content errors. These may be cleared with
///   `CBORDecoder::get_and_reset_error` and decoding resumed.
#[repr(u8)]
#[cfg_attr(any(feature = "full", test), derive(Copy, Clone, Error, Debug, PartialEq, Eq))]
#[cfg_attr(all(not(feature = "full"), not(test)), derive(Copy, Clone, Debug, PartialEq, Eq))]
pub enum CBORError {
    /// The output buffer is too small for the encoded item.
    #[cfg_attr(any(feature = "full", test), error("Output buffer too small for the encoded item"))]
    BufferTooSmall = 1,
    /// The requested encoding is not supported (e.g. simple values 24..31).
    #[cfg_attr(any(feature = "full", test), error("Requested encoding is reserved or unsupported"))]
    EncodeUnsupported = 2,
    /// The encoded output would exceed the maximum supported size.
    #[cfg_attr(any(feature = "full", test), error("Encoded output exceeds the maximum supported size"))]
    OutputTooLarge = 3,
    /// Too many items were added to a single array or map.
    #[cfg_attr(any(feature = "full", test), error("Too many items in a single array or map"))]
    ArrayTooLong = 4,
    /// A close call does not match the kind of the open container.
    #[cfg_attr(any(feature = "full", test), error("Close does not match the open container"))]
    CloseMismatch = 5,
    /// `finish` was called while an array or map is still open.
    #[cfg_attr(any(feature = "full", test), error("An array or map is still open"))]
    ArrayOrMapStillOpen = 6,
    /// More closes than opens.
    #[cfg_attr(any(feature = "full", test), error("More closes than opens"))]
    TooManyCloses = 7,
    /// Arrays and maps are nested deeper than the encoder supports.
    #[cfg_attr(any(feature = "full", test), error("Array and map nesting too deep to encode"))]
    EncodeNestingTooDeep = 8,
    /// A byte string wrap cannot be cancelled after items have been added.
    #[cfg_attr(any(feature = "full", test), error("Byte string wrap cannot be cancelled"))]
    CannotCancel = 9,
    /// A map was closed holding an odd number of items.
    #[cfg_attr(any(feature = "full", test), error("Map closed with an odd number of items"))]
    MapOddItems = 10,

    /// The input ended in the middle of a data item.
    #[cfg_attr(any(feature = "full", test), error("Input ended in the middle of a data item"))]
    HitEnd = 20,
    /// A reserved additional-information value (28..30) was encountered.
    #[cfg_attr(any(feature = "full", test), error("Reserved additional-information value"))]
    Unsupported = 21,
    /// A break occurred where the enclosing item is not indefinite-length.
    #[cfg_attr(any(feature = "full", test), error("Break in a definite-length context"))]
    BadBreak = 22,
    /// A simple value was encoded illegally (e.g. two-byte encoding below 32).
    #[cfg_attr(any(feature = "full", test), error("Illegal encoding of a simple value"))]
    BadType7 = 23,
    /// A non-minimal argument encoding was rejected in strict mode.
    #[cfg_attr(any(feature = "full", test), error("Argument is not in preferred serialization"))]
    NotPreferred = 24,

    /// A chunk of an indefinite-length string has the wrong major type.
    #[cfg_attr(any(feature = "full", test), error("Indefinite-length string chunk of wrong type"))]
    IndefiniteStringChunk = 30,

    /// The input is larger than the decoder supports.
    #[cfg_attr(any(feature = "full", test), error("Input larger than the decoder supports"))]
    InputTooLarge = 40,
    /// Arrays and maps are nested deeper than the decoder supports.
    #[cfg_attr(any(feature = "full", test), error("Array and map nesting too deep to decode"))]
    NestingTooDeep = 41,
    /// A text string contains an invalid UTF8 sequence.
    #[cfg_attr(any(feature = "full", test), error("A text string contains an invalid UTF8 sequence"))]
    Utf8 = 42,
    /// An indefinite-length string was found and no string allocator is configured.
    #[cfg_attr(any(feature = "full", test), error("No string allocator configured"))]
    NoStringAllocator = 43,
    /// The string allocator could not satisfy an allocation.
    #[cfg_attr(any(feature = "full", test), error("String allocation failed"))]
    StringAllocate = 44,
    /// More tags on one item than the implementation can track.
    #[cfg_attr(any(feature = "full", test), error("Too many tags on one item"))]
    TooManyTags = 45,
    /// A map label has a type that is not permitted in the current decode mode.
    #[cfg_attr(any(feature = "full", test), error("Map label type not permitted"))]
    MapLabelType = 46,
    /// The content of a recognised tag does not satisfy the tag's contract.
    #[cfg_attr(any(feature = "full", test), error("Tag content does not match the tag"))]
    UnrecoverableTagContent = 47,
    /// Half-precision input found while half-precision support is disabled.
    #[cfg_attr(any(feature = "full", test), error("Half-precision support is disabled"))]
    HalfPrecisionDisabled = 48,
    /// Floating-point input found while all float support is disabled.
    #[cfg_attr(any(feature = "full", test), error("Floating-point support is disabled"))]
    AllFloatDisabled = 49,
    /// Indefinite-length string found while support for them is disabled.
    #[cfg_attr(any(feature = "full", test), error("Indefinite-length string support is disabled"))]
    IndefLenStringsDisabled = 50,
    /// Indefinite-length array or map found while support for them is disabled.
    #[cfg_attr(any(feature = "full", test), error("Indefinite-length array support is disabled"))]
    IndefLenArraysDisabled = 51,
    /// Decimal fraction or big float found while support for them is disabled.
    #[cfg_attr(any(feature = "full", test), error("Decimal fraction and big float support is disabled"))]
    ExpMantissaDisabled = 52,
    /// A single array or map holds more items than the decoder can count.
    #[cfg_attr(any(feature = "full", test), error("Array or map holds more items than can be counted"))]
    ContainerTooLong = 53,

    /// The item does not have the requested type.
    #[cfg_attr(any(feature = "full", test), error("Item does not have the requested type"))]
    UnexpectedType = 60,
    /// A map holds the same label more than once.
    #[cfg_attr(any(feature = "full", test), error("Duplicate label in map"))]
    DuplicateLabel = 61,
    /// A map does not hold the requested label.
    #[cfg_attr(any(feature = "full", test), error("Label not found in map"))]
    LabelNotFound = 62,
    /// A number conversion has overflowed or underflowed the destination type.
    #[cfg_attr(any(feature = "full", test), error("Overflow or underflow in number conversion"))]
    ConversionUnderOverFlow = 63,
    /// A negative number cannot be converted to an unsigned destination.
    #[cfg_attr(any(feature = "full", test), error("Sign mismatch in number conversion"))]
    NumberSignConversion = 64,
    /// A negative integer is too large in magnitude for a signed 64-bit value.
    #[cfg_attr(any(feature = "full", test), error("Integer exceeds the signed 64-bit range"))]
    IntOverflow = 65,
    /// An epoch date is outside the representable range.
    #[cfg_attr(any(feature = "full", test), error("Date outside the representable range"))]
    DateOverflow = 66,
    /// An exit call does not match the kind of the entered container.
    #[cfg_attr(any(feature = "full", test), error("Exit does not match the entered container"))]
    ExitMismatch = 67,
    /// Tag content is invalid but was fully consumed; decoding may continue.
    #[cfg_attr(any(feature = "full", test), error("Tag content is invalid but was consumed"))]
    RecoverableBadTagContent = 68,
    /// A date string does not hold a legal RFC 3339 date/time.
    #[cfg_attr(any(feature = "full", test), error("Bad date/time value"))]
    BadDateTime = 69,
    /// A conversion needing hardware float arithmetic was requested while it is disabled.
    #[cfg_attr(any(feature = "full", test), error("Hardware float use is disabled"))]
    HwFloatDisabled = 70,
    /// No further items at this nesting level - this is usually recoverable.
    #[cfg_attr(any(feature = "full", test), error("No more items - this is usually recoverable"))]
    NoMoreItems = 71,
    /// Input remained after the expected end of the encoded data.
    #[cfg_attr(any(feature = "full", test), error("Expected end of input"))]
    EofExpected = 72,
}

impl CBORError {
    /// The stable numeric code for this error. Codes are banded; see the type-level
    /// documentation.
    #[inline]
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Return `true` if the input was not well-formed CBOR.
    #[inline]
    pub fn is_not_well_formed(&self) -> bool {
        (20..=39).contains(&self.code())
    }

    /// Return `true` if decoding cannot continue after this error.
    #[inline]
    pub fn is_unrecoverable(&self) -> bool {
        (30..=59).contains(&self.code())
    }

    /// Return `true` if the error may be cleared and decoding resumed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        self.code() >= 60
    }
}
