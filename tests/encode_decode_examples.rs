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
 * Encode-decode round trip examples and error taxonomy checks
 **************************************************************************************************/

extern crate tps_streamcbor;

use tps_streamcbor::decoder::{CBORDecoder, DecodeMode};
use tps_streamcbor::encoder::EncodeBuffer;
use tps_streamcbor::error::CBORError;
use tps_streamcbor::types::{array, map, CBOR};

/// Decode `input`, re-encode every item through the encoder, and check the bytes match.
/// Valid for inputs in preferred serialization without indefinite lengths or tags.
fn round_trip(input: &[u8]) {
    let mut decoder = CBORDecoder::new(input, DecodeMode::Normal);
    let mut bytes = [0u8; 256];
    let mut encoder = EncodeBuffer::new(&mut bytes);
    let mut open_counts: Vec<(u8, bool)> = Vec::new();

    loop {
        let item = match decoder.get_next() {
            Ok(item) => item,
            Err(CBORError::NoMoreItems) => break,
            Err(e) => panic!("decode failed: {:?}", e),
        };
        match item.label {
            tps_streamcbor::types::CBORLabel::None => (),
            tps_streamcbor::types::CBORLabel::Int(l) => {
                encoder.add_int64(l).unwrap();
            }
            tps_streamcbor::types::CBORLabel::UInt(l) => {
                encoder.add_uint64(l).unwrap();
            }
            tps_streamcbor::types::CBORLabel::Tstr(l) => {
                encoder.add_text(l).unwrap();
            }
            tps_streamcbor::types::CBORLabel::Bstr(l) => {
                encoder.add_bytes(l).unwrap();
            }
        }
        match item.value {
            CBOR::Int(v) => {
                encoder.add_int64(v).unwrap();
            }
            CBOR::UInt(v) => {
                encoder.add_uint64(v).unwrap();
            }
            CBOR::Bstr(v) => {
                encoder.add_bytes(v).unwrap();
            }
            CBOR::Tstr(v) => {
                encoder.add_text(v).unwrap();
            }
            CBOR::Array(_) => {
                encoder.open_array().unwrap();
                open_counts.push((item.nest_level + 1, false));
            }
            CBOR::Map(_) => {
                encoder.open_map().unwrap();
                open_counts.push((item.nest_level + 1, true));
            }
            CBOR::False => {
                encoder.add_bool(false).unwrap();
            }
            CBOR::True => {
                encoder.add_bool(true).unwrap();
            }
            CBOR::Null => {
                encoder.add_null().unwrap();
            }
            CBOR::Undefined => {
                encoder.add_undefined().unwrap();
            }
            #[cfg(feature = "float")]
            CBOR::Float64(v) => {
                encoder.add_double(v).unwrap();
            }
            #[cfg(feature = "float")]
            CBOR::Float32(v) => {
                encoder.add_float(v).unwrap();
            }
            other => panic!("value not supported by this round trip: {:?}", other),
        }
        // Close every container the traversal just left
        while let Some((child_level, is_map)) = open_counts.last().copied() {
            if item.next_nest_level < child_level {
                if is_map {
                    encoder.close_map().unwrap();
                } else {
                    encoder.close_array().unwrap();
                }
                open_counts.pop();
            } else {
                break;
            }
        }
    }
    decoder.finish().unwrap();
    assert_eq!(encoder.finish().unwrap(), input);
}

#[test]
fn round_trip_documents() {
    println!("<======================= round_trip_documents =====================>");
    // Single integers and strings
    round_trip(&[0x00]);
    round_trip(&[0x18, 0x2a]);
    round_trip(&[0x39, 0x03, 0xe7]);
    round_trip(&[0x64, 0x49, 0x45, 0x54, 0x46]);

    // [1, [2, 3], "hi"]
    round_trip(&[0x83, 0x01, 0x82, 0x02, 0x03, 0x62, 0x68, 0x69]);

    // {"a": 1, "b": [2, 3]}
    round_trip(&[0xa2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x82, 0x02, 0x03]);

    // [[[]], {}]
    round_trip(&[0x82, 0x81, 0x80, 0xa0]);
}

#[cfg(feature = "preferred-float")]
#[test]
fn round_trip_floats() {
    println!("<======================= round_trip_floats =====================>");
    round_trip(&[0xf9, 0x3e, 0x00]);
    round_trip(&[0xfa, 0x47, 0xc3, 0x50, 0x00]);
    round_trip(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]);
    round_trip(&[0x82, 0xf9, 0x7c, 0x00, 0xf9, 0x00, 0x01]);
}

#[test]
fn encode_then_decode_claims_map() -> Result<(), CBORError> {
    println!("<======================= encode_then_decode_claims_map =====================>");
    let mut bytes = [0u8; 128];
    let mut encoder = EncodeBuffer::new(&mut bytes);
    encoder.insert(&map(|b| {
        b.insert_key_value(&10, &[0x94u8, 0x8f, 0x88, 0x60].as_slice())?
            .insert_key_value(&258, &64242)?
            .insert_key_value(&262, &true)?
            .insert_key_value(&260, &array(|b| b.insert(&"3.1")?.insert(&1)))
    }))?;
    let encoded = encoder.finish()?;

    let mut decoder = CBORDecoder::new(encoded, DecodeMode::Normal);
    decoder.enter_map()?;
    assert_eq!(decoder.get_bytes_in_map_n(10)?, &[0x94, 0x8f, 0x88, 0x60]);
    assert_eq!(decoder.get_uint64_in_map_n(258)?, 64242);
    assert!(decoder.get_bool_in_map_n(262)?);
    decoder.enter_array_from_map_n(260)?;
    assert_eq!(decoder.get_text()?, "3.1");
    assert_eq!(decoder.get_uint64()?, 1);
    decoder.exit_array()?;
    decoder.exit_map()?;
    decoder.finish()
}

#[test]
fn error_code_bands() {
    println!("<======================= error_code_bands =====================>");
    // Encode band
    assert_eq!(CBORError::BufferTooSmall.code(), 1);
    assert_eq!(CBORError::CannotCancel.code(), 9);
    assert!(!CBORError::CloseMismatch.is_not_well_formed());
    assert!(!CBORError::CloseMismatch.is_unrecoverable());

    // Not well-formed, recoverable band
    for e in [
        CBORError::HitEnd,
        CBORError::Unsupported,
        CBORError::BadBreak,
        CBORError::BadType7,
        CBORError::NotPreferred,
    ] {
        assert!(e.is_not_well_formed(), "{:?}", e);
        assert!(!e.is_unrecoverable(), "{:?}", e);
    }

    // Not well-formed and unrecoverable
    assert!(CBORError::IndefiniteStringChunk.is_not_well_formed());
    assert!(CBORError::IndefiniteStringChunk.is_unrecoverable());

    // Content and limit errors: unrecoverable but well-formed
    for e in [
        CBORError::InputTooLarge,
        CBORError::NestingTooDeep,
        CBORError::NoStringAllocator,
        CBORError::MapLabelType,
        CBORError::UnrecoverableTagContent,
    ] {
        assert!(!e.is_not_well_formed(), "{:?}", e);
        assert!(e.is_unrecoverable(), "{:?}", e);
    }

    // Recoverable content errors
    for e in [
        CBORError::UnexpectedType,
        CBORError::DuplicateLabel,
        CBORError::LabelNotFound,
        CBORError::ConversionUnderOverFlow,
        CBORError::NumberSignConversion,
        CBORError::ExitMismatch,
        CBORError::NoMoreItems,
    ] {
        assert!(e.is_recoverable(), "{:?}", e);
        assert!(!e.is_unrecoverable(), "{:?}", e);
        assert!(!e.is_not_well_formed(), "{:?}", e);
    }

    // Codes are stable
    assert_eq!(CBORError::HitEnd.code(), 20);
    assert_eq!(CBORError::IndefiniteStringChunk.code(), 30);
    assert_eq!(CBORError::InputTooLarge.code(), 40);
    assert_eq!(CBORError::UnexpectedType.code(), 60);
}

#[cfg(feature = "full")]
#[test]
fn error_messages() {
    println!("<======================= error_messages =====================>");
    assert_eq!(
        CBORError::DuplicateLabel.to_string(),
        "Duplicate label in map"
    );
}
