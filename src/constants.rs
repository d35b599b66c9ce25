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
 * rs_streamcbor CBOR constants
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// Major type bitmask
pub const MT_MASK: u8 = 0b111_00000;
/// Additional Information bitmask
pub const AI_MASK: u8 = 0b000_11111;

/// Major Type 0 (Positive integers)
pub const MT_UINT: u8 = 0b000_00000;
/// Major Type 1 (Negative integers)
pub const MT_NINT: u8 = 0b001_00000;
/// Major Type 2 (Byte Strings)
pub const MT_BSTR: u8 = 0b010_00000;
/// Major Type 3 (Text Strings)
pub const MT_TSTR: u8 = 0b011_00000;
/// Major Type 4 (Array)
pub const MT_ARRAY: u8 = 0b100_00000;
/// Major Type 5 (Map)
pub const MT_MAP: u8 = 0b101_00000;
/// Major Type 6 (Tag)
pub const MT_TAG: u8 = 0b110_00000;
/// Major Type 7 (Floats, simple types etc.)
pub const MT_SIMPLE: u8 = 0b111_00000;
pub const MT_FLOAT: u8 = 0b111_00000;

/// Maximum value of a "simple" payload mapped on AI bits
pub const PAYLOAD_AI_BITS: u8 = 23;
/// Indicates one byte of length or value information follows MT/AI byte
pub const PAYLOAD_ONE_BYTE: u8 = 24;
/// Indicates two bytes of length or value information follows MT/AI byte
pub const PAYLOAD_TWO_BYTES: u8 = 25;
/// Indicates four bytes of length or value information follows MT/AI byte
pub const PAYLOAD_FOUR_BYTES: u8 = 26;
/// Indicates eight bytes of length or value information follows MT/AI byte
pub const PAYLOAD_EIGHT_BYTES: u8 = 27;
/// Indicates an indefinite-length item (strings, arrays and maps), or on Major Type 7 a break.
pub const PAYLOAD_INDEFINITE: u8 = 31;

/// The break sentinel terminating an indefinite-length item.
pub const BREAK: u8 = 0xff;

/// Maximum nesting of arrays and maps, on both encode and decode.
pub const MAX_ARRAY_NESTING: usize = 15;
/// Maximum number of entries in a single definite-length array or map. The all-ones value is
/// reserved to report an indefinite-length container still in progress.
pub const MAX_ITEMS_IN_CONTAINER: u64 = u16::MAX as u64 - 1;
/// Reported entry count of an indefinite-length container before its break is seen.
pub const INDEFINITE_COUNT: u16 = u16::MAX;
/// Maximum size of a decode input buffer.
pub const MAX_DECODE_INPUT_SIZE: usize = u32::MAX as usize;
/// Minimum size of a buffer handed to `CBORDecoder::set_mem_pool`.
pub const MIN_MEM_POOL_SIZE: usize = 8;
/// Maximum number of caller-configured tags tracked through the tag bitmap.
pub const MAX_CUSTOM_TAGS: usize = 16;
/// Maximum number of consecutive tags on a single item.
pub const MAX_TAGS_PER_ITEM: usize = 64;
/// First tag bitmap bit used for caller-configured tags.
pub const CUSTOM_TAG_BASE_BIT: u32 = 48;

/// Tag 0: an RFC 3339 date/time string.
pub const TAG_DATE_STRING: u64 = 0;
/// Tag 1: seconds since the POSIX epoch.
pub const TAG_DATE_EPOCH: u64 = 1;
/// Tag 2: a positive bignum.
pub const TAG_POS_BIGNUM: u64 = 2;
/// Tag 3: a negative bignum.
pub const TAG_NEG_BIGNUM: u64 = 3;
/// Tag 4: a decimal fraction.
pub const TAG_DECIMAL_FRACTION: u64 = 4;
/// Tag 5: a big float.
pub const TAG_BIG_FLOAT: u64 = 5;
/// Tag 100: days since the epoch date 1970-01-01.
pub const TAG_DAYS_EPOCH: u64 = 100;
/// Tag 1004: an RFC 8943 full-date string.
pub const TAG_DAYS_STRING: u64 = 1004;

/// Module defining bitfield values for the numeric conversions permitted by the typed decoder
/// accessors. See `Conversions`.
pub mod convert {
    /// Conversion from signed 64-bit integers.
    pub const INT64: u32 = 1;
    /// Conversion from unsigned 64-bit integers.
    pub const UINT64: u32 = 2;
    /// Conversion from single-precision floats.
    pub const FLOAT: u32 = 4;
    /// Conversion from double-precision floats.
    pub const DOUBLE: u32 = 8;
    /// Conversion from big floats.
    pub const BIG_FLOAT: u32 = 16;
    /// Conversion from decimal fractions.
    pub const DECIMAL_FRACTION: u32 = 32;
    /// Conversion from positive and negative bignums.
    pub const BIGNUM: u32 = 64;
    /// All conversions permitted.
    pub const ALL: u32 = INT64 | UINT64 | FLOAT | DOUBLE | BIG_FLOAT | DECIMAL_FRACTION | BIGNUM;
}
