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
 * rs_streamcbor module definition
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/

// Default configuration
#![no_std]
#![warn(missing_docs)]

//! # TPS_STREAMCBOR
//!
//! The `tps_streamcbor` crate provides a streaming CBOR implementation aimed at embedded
//! targets where the programmer wants to maintain low-level control over serialization and
//! deserialization. The typical use-case is implementation of a standardized CBOR-based
//! container or protocol such as COSE [RFC 9052](https://datatracker.ietf.org/doc/rfc9052/)
//! or [Entity Attestation Token](https://www.ietf.org/archive/id/draft-ietf-rats-eat-18.txt).
//!
//! `tps_streamcbor` does not require an allocator: the encoder serializes onto a byte buffer
//! of your choice and the decoder walks the input in place. The only memory the decoder ever
//! asks for is a caller-supplied pool buffer, used to assemble the chunks of indefinite-length
//! strings.
//!
//! ## Features
//!
//! - Encoder with automatic array and map head fix-up: open a container, add its items, close
//!   it, and the entry count is patched in using the smallest available representation.
//!   Preferred serialization for integers and floats, including `f16`.
//! - Streaming decoder producing one typed item per call, with nesting depth reported around
//!   every item, covering definite and indefinite lengths in full.
//! - Labelled map navigation: enter a map, look values up by integer or text label (with
//!   duplicate-label detection), rewind and batch lookups, with a sticky error state so a run
//!   of lookups needs only one check at the end.
//! - Recognised tags are promoted to typed values: dates, bignums, decimal fractions and big
//!   floats.
//! - Safe numeric conversions between the integer, float, bignum and mantissa/exponent forms,
//!   controlled by a per-call conversion policy.
//!
//! ## Encoding
//!
//! The example below encodes a small attestation-style claims map on the buffer `bytes`.
//!
//! ```
//! use tps_streamcbor::encoder::EncodeBuffer;
//! use tps_streamcbor::error::CBORError;
//! use tps_streamcbor::types::{array, map};
//!
//! fn main() -> Result<(), CBORError> {
//!     let mut bytes = [0u8; 64];
//!     let expected: &[u8] = &[
//!         163, 10, 72, 148, 143, 136, 96, 209, 58, 70, 62, 25, 1, 2, 25, 250, 242,
//!         25, 1, 4, 130, 99, 51, 46, 49, 1,
//!     ];
//!
//!     let mut encoder = EncodeBuffer::new(&mut bytes);
//!     encoder.insert(&map(|buff| {
//!         buff.insert_key_value(&10, &[0x94u8, 0x8f, 0x88, 0x60, 0xd1, 0x3a, 0x46, 0x3e].as_slice())?
//!             .insert_key_value(&258, &64242)?
//!             .insert_key_value(&260, &array(|buf| buf.insert(&"3.1")?.insert(&1)))
//!     }))?;
//!     assert_eq!(encoder.finish()?, expected);
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding
//!
//! The same claims map is decoded below with the labelled map API. Note that only one error
//! check is needed: every lookup after a failure would be a no-op, and `finish` reports the
//! first failure.
//!
//! ```
//! use tps_streamcbor::decoder::{CBORDecoder, DecodeMode};
//! use tps_streamcbor::error::CBORError;
//!
//! fn main() -> Result<(), CBORError> {
//!     let input: &[u8] = &[
//!         163, 10, 72, 148, 143, 136, 96, 209, 58, 70, 62, 25, 1, 2, 25, 250, 242,
//!         25, 1, 4, 130, 99, 51, 46, 49, 1,
//!     ];
//!
//!     let mut decoder = CBORDecoder::new(input, DecodeMode::Normal);
//!     decoder.enter_map()?;
//!     let nonce = decoder.get_bytes_in_map_n(10)?;
//!     let oemid = decoder.get_uint64_in_map_n(258)?;
//!     decoder.enter_array_from_map_n(260)?;
//!     let version = decoder.get_text()?;
//!     let part = decoder.get_uint64()?;
//!     decoder.exit_array()?;
//!     decoder.exit_map()?;
//!     decoder.finish()?;
//!
//!     assert_eq!(nonce, &[0x94, 0x8f, 0x88, 0x60, 0xd1, 0x3a, 0x46, 0x3e]);
//!     assert_eq!(oemid, 64242);
//!     assert_eq!((version, part), ("3.1", 1));
//!     Ok(())
//! }
//! ```

// Pull in std if we are testing or if it is defined as feature (because we run tests on a
// platform supporting I/O and full feature set.
#[cfg(any(feature = "full", test))]
extern crate std;

// If we are really building no_std, pull in core as well. It is aliased as std so that "use"
// statements are always the same
#[cfg(all(not(feature = "std"), not(test)))]
extern crate core as std;

#[cfg(any(feature = "float", test))]
extern crate half;

#[cfg(any(feature = "full", test))]
extern crate chrono;

pub(crate) mod access;
pub(crate) mod buffer;
pub(crate) mod constants;
pub(crate) mod convert;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod head;
pub(crate) mod item;
pub(crate) mod nesting;
pub(crate) mod pool;

/// The `error` module contains error definitions used throughout `tps_streamcbor`.
pub mod error;

/// The `types` module exports the types modelling a single decoded CBOR item, and the
/// [`types::array`], [`types::map`] and [`types::tag`] builders which simplify encoding of
/// arrays, maps and tags, respectively.
pub mod types {
    pub use super::constants::{
        INDEFINITE_COUNT, TAG_BIG_FLOAT, TAG_DATE_EPOCH, TAG_DATE_STRING, TAG_DAYS_EPOCH,
        TAG_DAYS_STRING, TAG_DECIMAL_FRACTION, TAG_NEG_BIGNUM, TAG_POS_BIGNUM,
    };
    pub use super::encode::{array, map, tag, Array, Map, Tag};
    pub use super::item::{CBORItem, CBORLabel, CBORType, TagSet, CBOR};
}

/// The `decoder` module exports types, functions and traits for decoding CBOR items from a
/// buffer.
pub mod decoder {
    pub use super::access::MapQuery;
    pub use super::convert::Conversions;
    pub use super::decode::{CBORDecoder, DecodeMode};
    pub use super::pool::{MemPool, StringAllocator};

    pub use super::constants::convert;
}

/// The `encoder` module exports the [`encoder::EncodeBuffer`] type, which is used to encode
/// values as CBOR items, and the [`encoder::EncodeItem`] trait for anything that can be
/// serialized to CBOR.
pub mod encoder {
    pub use super::encode::{EncodeBuffer, EncodeItem};
}
