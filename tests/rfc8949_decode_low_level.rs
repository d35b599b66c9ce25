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
 * Test cases from RFC8949, for the streaming decoder
 *
 * Test cases from RFC8949, Appendix A, plus traversal nesting checks.
 **************************************************************************************************/

extern crate tps_streamcbor;

use tps_streamcbor::decoder::{CBORDecoder, DecodeMode};
use tps_streamcbor::error::CBORError;
use tps_streamcbor::types::{CBORLabel, CBORItem, CBOR, INDEFINITE_COUNT};

fn decode_single(buf: &[u8]) -> Result<CBORItem, CBORError> {
    let mut decoder = CBORDecoder::new(buf, DecodeMode::Normal);
    decoder.get_next()
}

// Decode a whole document, asserting the (value, nest_level, next_nest_level) sequence.
fn check_sequence(buf: &[u8], expect: &[(CBOR, u8, u8)]) {
    let mut decoder = CBORDecoder::new(buf, DecodeMode::Normal);
    for (i, (value, nest, next)) in expect.iter().enumerate() {
        let item = decoder.get_next().unwrap();
        println!("item {}: {:?}", i, item);
        assert_eq!(item.value, *value);
        assert_eq!(item.nest_level, *nest, "nest_level of item {}", i);
        assert_eq!(item.next_nest_level, *next, "next_nest_level of item {}", i);
    }
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::NoMoreItems);
    decoder.finish().unwrap();
}

#[test]
fn rfc8949_decode_uint() {
    println!("<======================= rfc8949_decode_uint =====================>");
    for (buf, expect) in [
        (&[0x00u8][..], CBOR::Int(0)),
        (&[0x01], CBOR::Int(1)),
        (&[0x0a], CBOR::Int(10)),
        (&[0x17], CBOR::Int(23)),
        (&[0x18, 0x18], CBOR::Int(24)),
        (&[0x18, 0x64], CBOR::Int(100)),
        (&[0x19, 0x03, 0xe8], CBOR::Int(1000)),
        (&[0x1a, 0x00, 0x0f, 0x42, 0x40], CBOR::Int(1000000)),
        (
            &[0x1b, 0x00, 0x00, 0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00],
            CBOR::Int(1000000000000),
        ),
        (
            &[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            CBOR::UInt(u64::MAX),
        ),
    ]
    .iter()
    {
        let item = decode_single(buf).unwrap();
        assert_eq!(item.value, *expect);
        assert_eq!(item.nest_level, 0);
        assert_eq!(item.next_nest_level, 0);
    }
}

#[test]
fn rfc8949_decode_nint() {
    println!("<======================= rfc8949_decode_nint =====================>");
    for (buf, expect) in [
        (&[0x20u8][..], CBOR::Int(-1)),
        (&[0x29], CBOR::Int(-10)),
        (&[0x38, 0x63], CBOR::Int(-100)),
        (&[0x39, 0x03, 0xe7], CBOR::Int(-1000)),
        (
            &[0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
            CBOR::Int(i64::MIN),
        ),
    ]
    .iter()
    {
        assert_eq!(decode_single(buf).unwrap().value, *expect);
    }

    // A negative whose magnitude exceeds i64 surfaces as the raw 64-bit argument
    let item = decode_single(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap();
    assert_eq!(item.value, CBOR::UInt(u64::MAX));
}

#[test]
fn rfc8949_decode_strings() {
    println!("<======================= rfc8949_decode_strings =====================>");
    let item = decode_single(&[0x44, 0x01, 0x02, 0x03, 0x04]).unwrap();
    assert_eq!(item.value, CBOR::Bstr(&[0x01, 0x02, 0x03, 0x04]));
    assert!(!item.data_allocated);

    let item = decode_single(&[0x64, 0x49, 0x45, 0x54, 0x46]).unwrap();
    assert_eq!(item.value, CBOR::Tstr("IETF"));

    let item = decode_single(&[0x62, 0xc3, 0xbc]).unwrap();
    assert_eq!(item.value, CBOR::Tstr("\u{00fc}"));

    // Broken UTF8
    assert_eq!(
        decode_single(&[0x61, 0xc3]).unwrap_err(),
        CBORError::Utf8
    );
}

#[cfg(feature = "preferred-float")]
#[test]
fn rfc8949_decode_half_precision() {
    println!("<======================= rfc8949_decode_half_precision =====================>");
    for (buf, expect) in [
        (&[0xf9u8, 0x00, 0x00][..], 0.0f64),
        (&[0xf9, 0x3c, 0x00], 1.0),
        (&[0xf9, 0x3e, 0x00], 1.5),
        (&[0xf9, 0x7b, 0xff], 65504.0),
        // Least positive subnormal
        (&[0xf9, 0x00, 0x01], 5.960464477539063e-8),
        (&[0xf9, 0x04, 0x00], 0.00006103515625),
        (&[0xf9, 0xc4, 0x00], -4.0),
        (&[0xf9, 0x7c, 0x00], f64::INFINITY),
        (&[0xf9, 0xfc, 0x00], f64::NEG_INFINITY),
    ]
    .iter()
    {
        assert_eq!(decode_single(buf).unwrap().value, CBOR::Float64(*expect));
    }

    // NaN cannot be compared for equality
    if let CBOR::Float64(v) = decode_single(&[0xf9, 0x7e, 0x00]).unwrap().value {
        assert!(v.is_nan());
    } else {
        panic!("expected a float");
    }

    // -0.0 keeps its sign bit
    if let CBOR::Float64(v) = decode_single(&[0xf9, 0x80, 0x00]).unwrap().value {
        assert!(v == 0.0 && v.is_sign_negative());
    } else {
        panic!("expected a float");
    }
}

#[cfg(feature = "float")]
#[test]
fn rfc8949_decode_float() {
    println!("<======================= rfc8949_decode_float =====================>");
    let item = decode_single(&[0xfa, 0x47, 0xc3, 0x50, 0x00]).unwrap();
    assert_eq!(item.value, CBOR::Float32(100000.0));

    let item = decode_single(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]).unwrap();
    assert_eq!(item.value, CBOR::Float64(1.1));
}

#[test]
fn rfc8949_decode_simple() {
    println!("<======================= rfc8949_decode_simple =====================>");
    assert_eq!(decode_single(&[0xf4]).unwrap().value, CBOR::False);
    assert_eq!(decode_single(&[0xf5]).unwrap().value, CBOR::True);
    assert_eq!(decode_single(&[0xf6]).unwrap().value, CBOR::Null);
    assert_eq!(decode_single(&[0xf7]).unwrap().value, CBOR::Undefined);
    assert_eq!(decode_single(&[0xf0]).unwrap().value, CBOR::Simple(16));
    assert_eq!(decode_single(&[0xf8, 0xff]).unwrap().value, CBOR::Simple(255));

    // Two-byte encoding of a simple value below 32 is not well-formed
    assert_eq!(decode_single(&[0xf8, 0x10]).unwrap_err(), CBORError::BadType7);
}

#[test]
fn decode_reserved_additional_info() {
    println!("<======================= decode_reserved_additional_info =====================>");
    // AI 28..30 are reserved for every major type
    assert_eq!(decode_single(&[0x1c]).unwrap_err(), CBORError::Unsupported);
    assert_eq!(decode_single(&[0x1d]).unwrap_err(), CBORError::Unsupported);
    assert_eq!(decode_single(&[0x1e]).unwrap_err(), CBORError::Unsupported);
    assert_eq!(decode_single(&[0xfc]).unwrap_err(), CBORError::Unsupported);
    // Indefinite length has no meaning for integers
    assert_eq!(decode_single(&[0x1f]).unwrap_err(), CBORError::Unsupported);
}

#[test]
fn decode_truncated_input() {
    println!("<======================= decode_truncated_input =====================>");
    assert_eq!(decode_single(&[0x19, 0x01]).unwrap_err(), CBORError::HitEnd);
    assert_eq!(decode_single(&[0x44, 0x01]).unwrap_err(), CBORError::HitEnd);
    // An array head with a missing element surfaces on the second call
    let mut decoder = CBORDecoder::new(&[0x82, 0x01], DecodeMode::Normal);
    decoder.get_next().unwrap();
    decoder.get_next().unwrap();
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::HitEnd);
}

#[test]
fn decode_bad_break() {
    println!("<======================= decode_bad_break =====================>");
    // A break at the top level
    assert_eq!(decode_single(&[0xff]).unwrap_err(), CBORError::BadBreak);
    // A break inside a definite-length array
    let mut decoder = CBORDecoder::new(&[0x82, 0x01, 0xff], DecodeMode::Normal);
    decoder.get_next().unwrap();
    decoder.get_next().unwrap();
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::BadBreak);
}

#[test]
fn decode_nested_array_levels() {
    println!("<======================= decode_nested_array_levels =====================>");
    // [1, [2, 3], "hi"]
    check_sequence(
        &[0x83, 0x01, 0x82, 0x02, 0x03, 0x62, 0x68, 0x69],
        &[
            (CBOR::Array(3), 0, 1),
            (CBOR::Int(1), 1, 1),
            (CBOR::Array(2), 1, 2),
            (CBOR::Int(2), 2, 2),
            (CBOR::Int(3), 2, 1),
            (CBOR::Tstr("hi"), 1, 0),
        ],
    );
}

#[test]
fn decode_empty_containers() {
    println!("<======================= decode_empty_containers =====================>");
    check_sequence(&[0x80], &[(CBOR::Array(0), 0, 0)]);
    check_sequence(&[0xa0], &[(CBOR::Map(0), 0, 0)]);
}

#[cfg(feature = "indef-arrays")]
#[test]
fn decode_indefinite_map() {
    println!("<======================= decode_indefinite_map =====================>");
    // {_ "a": 1, "b": 2}
    let buf = [0xbf, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02, 0xff];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);

    let head = decoder.get_next().unwrap();
    assert_eq!(head.value, CBOR::Map(INDEFINITE_COUNT));
    assert_eq!((head.nest_level, head.next_nest_level), (0, 1));

    let a = decoder.get_next().unwrap();
    assert_eq!(a.label, CBORLabel::Tstr("a"));
    assert_eq!(a.value, CBOR::Int(1));
    assert_eq!((a.nest_level, a.next_nest_level), (1, 1));

    // The terminal break lowers the next nesting level to 0
    let b = decoder.get_next().unwrap();
    assert_eq!(b.label, CBORLabel::Tstr("b"));
    assert_eq!(b.value, CBOR::Int(2));
    assert_eq!((b.nest_level, b.next_nest_level), (1, 0));

    assert_eq!(decoder.get_next().unwrap_err(), CBORError::NoMoreItems);
    decoder.finish().unwrap();
}

#[cfg(feature = "indef-arrays")]
#[test]
fn decode_indefinite_runs() {
    println!("<======================= decode_indefinite_runs =====================>");
    // [_ [_ 1]] closes two levels on one run of breaks
    let buf = [0x9f, 0x9f, 0x01, 0xff, 0xff];
    check_sequence(
        &buf,
        &[
            (CBOR::Array(INDEFINITE_COUNT), 0, 1),
            (CBOR::Array(INDEFINITE_COUNT), 1, 2),
            (CBOR::Int(1), 2, 0),
        ],
    );

    // [_ ] and {_ } close immediately
    check_sequence(&[0x9f, 0xff], &[(CBOR::Array(INDEFINITE_COUNT), 0, 0)]);
    check_sequence(&[0xbf, 0xff], &[(CBOR::Map(INDEFINITE_COUNT), 0, 0)]);
}

#[test]
fn decode_map_labels() {
    println!("<======================= decode_map_labels =====================>");
    // {1: "a", -2: "b", h'03': "c", "d": 4}
    let buf = [
        0xa4, 0x01, 0x61, 0x61, 0x21, 0x61, 0x62, 0x41, 0x03, 0x61, 0x63, 0x61, 0x64, 0x04,
    ];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    let i1 = decoder.get_next().unwrap();
    assert_eq!(i1.nest_level, 0);
    let i2 = decoder.get_next().unwrap();
    assert_eq!(i2.label, CBORLabel::Int(1));
    assert_eq!(i2.value, CBOR::Tstr("a"));
    let i3 = decoder.get_next().unwrap();
    assert_eq!(i3.label, CBORLabel::Int(-2));
    let i4 = decoder.get_next().unwrap();
    assert_eq!(i4.label, CBORLabel::Bstr(&[0x03]));
    let i5 = decoder.get_next().unwrap();
    assert_eq!(i5.label, CBORLabel::Tstr("d"));
    assert_eq!(i5.value, CBOR::Int(4));
    assert_eq!(i5.next_nest_level, 0);
    decoder.finish().unwrap();

    // A negative label whose magnitude exceeds i64 follows the same raw-argument
    // convention as values
    let buf = [0xa1, 0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.get_next().unwrap();
    let entry = decoder.get_next().unwrap();
    assert_eq!(entry.label, CBORLabel::UInt(u64::MAX));
    assert_eq!(entry.value, CBOR::Int(1));
    decoder.finish().unwrap();
}

#[test]
fn decode_map_label_type_policy() {
    println!("<======================= decode_map_label_type_policy =====================>");
    // An array label is never permitted
    let buf = [0xa1, 0x80, 0x01];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.get_next().unwrap();
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::MapLabelType);

    // Integer labels are rejected in MapStringsOnly mode
    let buf = [0xa1, 0x01, 0x02];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::MapStringsOnly);
    decoder.get_next().unwrap();
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::MapLabelType);

    // A tagged label is rejected
    let buf = [0xa1, 0xc1, 0x01, 0x02];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.get_next().unwrap();
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::MapLabelType);
}

#[test]
fn decode_map_as_array() {
    println!("<======================= decode_map_as_array =====================>");
    // {1: 2, 3: 4} read back as a four-item sequence with a doubled count
    let buf = [0xa2, 0x01, 0x02, 0x03, 0x04];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::MapAsArray);
    let head = decoder.get_next().unwrap();
    assert_eq!(head.value, CBOR::MapAsArray(4));
    for expect in [1i64, 2, 3, 4] {
        let item = decoder.get_next().unwrap();
        assert_eq!(item.value, CBOR::Int(expect));
        assert_eq!(item.label, CBORLabel::None);
    }
    decoder.finish().unwrap();
}

#[test]
fn decode_strict_preferred() {
    println!("<======================= decode_strict_preferred =====================>");
    // 23 encoded on two bytes is accepted by default
    let buf = [0x18, 0x17];
    assert_eq!(decode_single(&buf).unwrap().value, CBOR::Int(23));

    // and rejected in strict mode
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.set_strict_preferred(true);
    assert_eq!(decoder.get_next().unwrap_err(), CBORError::NotPreferred);

    // A minimally encoded argument passes strict mode
    let mut decoder = CBORDecoder::new(&[0x18, 0x18], DecodeMode::Normal);
    decoder.set_strict_preferred(true);
    assert_eq!(decoder.get_next().unwrap().value, CBOR::Int(24));
}

#[test]
fn decode_nesting_too_deep() {
    println!("<======================= decode_nesting_too_deep =====================>");
    let mut buf = [0x81u8; 17];
    buf[16] = 0x01;
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    let mut result = Ok(());
    for _ in 0..16 {
        match decoder.get_next() {
            Ok(_) => (),
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    assert_eq!(result.unwrap_err(), CBORError::NestingTooDeep);
}

#[test]
fn decode_finish_checks() {
    println!("<======================= decode_finish_checks =====================>");
    // Unconsumed input
    let buf = [0x01, 0x02];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.get_next().unwrap();
    assert_eq!(decoder.finish().unwrap_err(), CBORError::EofExpected);

    // Clean completion
    let buf = [0x01];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    decoder.get_next().unwrap();
    decoder.finish().unwrap();
}

// Decoding the same buffer twice with fresh contexts yields the same item sequence.
#[test]
fn decode_idempotence() {
    println!("<======================= decode_idempotence =====================>");
    let buf = [0x83, 0x01, 0x82, 0x02, 0x03, 0x62, 0x68, 0x69];
    let mut first: Vec<CBORItem> = Vec::new();
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    while let Ok(item) = decoder.get_next() {
        first.push(item);
    }
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    for expect in &first {
        assert_eq!(decoder.get_next().unwrap(), *expect);
    }
}

// The next_nest_level sequence of a traversal forms a valid parenthesisation: within one
// item it never rises except through a container head, and it ends at zero.
#[test]
fn decode_nesting_invariant() {
    println!("<======================= decode_nesting_invariant =====================>");
    let buf = [
        0xa2, 0x01, 0x83, 0x01, 0xa1, 0x02, 0x03, 0x04, 0x05, 0x82, 0x80, 0xa0,
    ];
    let mut decoder = CBORDecoder::new(&buf, DecodeMode::Normal);
    let mut level = 0u8;
    let mut last = 0u8;
    loop {
        match decoder.get_next() {
            Ok(item) => {
                assert_eq!(item.nest_level, level);
                assert!(item.next_nest_level <= item.nest_level + 1);
                level = item.next_nest_level;
                last = item.next_nest_level;
            }
            Err(CBORError::NoMoreItems) => break,
            Err(e) => panic!("unexpected error {:?}", e),
        }
    }
    assert_eq!(last, 0);
    decoder.finish().unwrap();
}
