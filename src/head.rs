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
 * rs_streamcbor CBOR head codec
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::buffer::{ReadBuf, WriteBuf};
use crate::constants::*;
use crate::error::{CBORError, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// One decoded CBOR item head. The head is the single MT/AI byte together with its argument
/// of zero to eight following bytes. The argument of a float head is the raw big-endian bit
/// pattern; interpretation belongs to the caller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Head {
    /// A head with a complete argument. `ai` is retained so that Major Type 7 heads can be
    /// told apart by encoded width.
    Arg { mt: u8, ai: u8, arg: u64 },
    /// The head of an indefinite-length string, array or map.
    Indefinite { mt: u8 },
    /// The break sentinel terminating an indefinite-length item.
    Break,
}

/// Decode one item head from `input`.
///
/// When `strict` is set, arguments of Major Types 0 and 1 must use preferred (minimal length)
/// serialization; a wider-than-necessary argument yields `NotPreferred`. The default decoding
/// mode is lax and accepts any argument width.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn decode_head(input: &mut ReadBuf, strict: bool) -> Result<Head> {
    let mt_ai_byte = input.get_u8()?;
    let mt = mt_ai_byte & MT_MASK;
    let ai = mt_ai_byte & AI_MASK;
    let arg = match ai {
        0..=PAYLOAD_AI_BITS => ai as u64,
        PAYLOAD_ONE_BYTE => input.get_u8()? as u64,
        PAYLOAD_TWO_BYTES => input.get_u16()? as u64,
        PAYLOAD_FOUR_BYTES => input.get_u32()? as u64,
        PAYLOAD_EIGHT_BYTES => input.get_u64()?,
        PAYLOAD_INDEFINITE => {
            return match mt {
                MT_BSTR | MT_TSTR | MT_ARRAY | MT_MAP => Ok(Head::Indefinite { mt }),
                MT_SIMPLE => Ok(Head::Break),
                // Indefinite length has no meaning for integers and tags
                _ => Err(CBORError::Unsupported),
            };
        }
        // AI values 28..30 are reserved in RFC8949
        _ => return Err(CBORError::Unsupported),
    };
    if strict && (mt == MT_UINT || mt == MT_NINT) && ai > PAYLOAD_AI_BITS {
        let minimal = match ai {
            PAYLOAD_ONE_BYTE => arg >= 24,
            PAYLOAD_TWO_BYTES => arg > u8::MAX as u64,
            PAYLOAD_FOUR_BYTES => arg > u16::MAX as u64,
            _ => arg > u32::MAX as u64,
        };
        if !minimal {
            return Err(CBORError::NotPreferred);
        }
    }
    Ok(Head::Arg { mt, ai, arg })
}

/// The encoded size in bytes of a head carrying `arg` in preferred serialization.
#[inline]
pub(crate) fn head_size(arg: u64) -> usize {
    match arg {
        0..=23 => 1,
        24..=0xff => 2,
        0x100..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Serialize a head into `scratch`, returning the number of bytes used.
///
/// The argument is always encoded using preferred serialization as defined in RFC8949.
fn head_bytes(scratch: &mut [u8; 9], mt: u8, arg: u64) -> usize {
    let vs = arg.to_be_bytes();
    match head_size(arg) {
        1 => {
            scratch[0] = mt | vs[7];
            1
        }
        2 => {
            scratch[0] = mt | PAYLOAD_ONE_BYTE;
            scratch[1] = vs[7];
            2
        }
        3 => {
            scratch[0] = mt | PAYLOAD_TWO_BYTES;
            scratch[1..3].copy_from_slice(&vs[6..8]);
            3
        }
        5 => {
            scratch[0] = mt | PAYLOAD_FOUR_BYTES;
            scratch[1..5].copy_from_slice(&vs[4..8]);
            5
        }
        _ => {
            scratch[0] = mt | PAYLOAD_EIGHT_BYTES;
            scratch[1..9].copy_from_slice(&vs);
            9
        }
    }
}

/// Append the head for `(mt, arg)` to `out`, returning its size.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn encode_head(out: &mut WriteBuf, mt: u8, arg: u64) -> Result<usize> {
    let mut scratch = [0u8; 9];
    let n = head_bytes(&mut scratch, mt, arg);
    out.put_slice(&scratch[..n])?;
    Ok(n)
}

/// Overwrite the head for `(mt, arg)` at an absolute offset within the written prefix. The
/// caller must already have opened a gap of exactly `head_size(arg)` bytes at `at`.
pub(crate) fn patch_head(out: &mut WriteBuf, at: usize, mt: u8, arg: u64) -> Result<()> {
    let mut scratch = [0u8; 9];
    let n = head_bytes(&mut scratch, mt, arg);
    out.write_at(at, &scratch[..n])
}

/// Append the head of an indefinite-length string, array or map.
#[inline]
pub(crate) fn encode_indefinite_head(out: &mut WriteBuf, mt: u8) -> Result<()> {
    out.put_u8(mt | PAYLOAD_INDEFINITE)
}
