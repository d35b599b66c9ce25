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
 * rs_streamcbor CBOR numeric conversions
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::convert;
use crate::error::{CBORError, Result};
use crate::item::CBOR;

/// The set of source types a typed accessor is permitted to convert from, as a bitmask over
/// the `constants::convert` bits. An accessor presented with a value outside its permitted
/// set fails with `UnexpectedType`; a permitted value that cannot fit the destination fails
/// with `ConversionUnderOverFlow` or `NumberSignConversion`.
#[derive(Debug, Copy, Clone)]
pub struct Conversions(u32);

impl Conversions {
    pub fn new(v: u32) -> Self {
        Conversions(v)
    }

    /// The conversions applied by the plain integer accessors: both integer types, nothing
    /// else.
    pub fn int_types() -> Self {
        Conversions(convert::INT64 | convert::UINT64)
    }

    /// The conversions applied by the plain float accessor: both float widths, nothing else.
    #[cfg(feature = "float")]
    pub fn float_types() -> Self {
        Conversions(convert::FLOAT | convert::DOUBLE)
    }

    /// Every supported conversion.
    pub fn all() -> Self {
        Conversions(convert::ALL)
    }

    pub fn allow_int64(&self) -> bool {
        self.0 & convert::INT64 != 0
    }

    pub fn allow_uint64(&self) -> bool {
        self.0 & convert::UINT64 != 0
    }

    pub fn allow_float(&self) -> bool {
        self.0 & convert::FLOAT != 0
    }

    pub fn allow_double(&self) -> bool {
        self.0 & convert::DOUBLE != 0
    }

    pub fn allow_big_float(&self) -> bool {
        self.0 & convert::BIG_FLOAT != 0
    }

    pub fn allow_decimal_fraction(&self) -> bool {
        self.0 & convert::DECIMAL_FRACTION != 0
    }

    pub fn allow_bignum(&self) -> bool {
        self.0 & convert::BIGNUM != 0
    }
}

/***************************************************************************************************
 * Conversions to i64
 **************************************************************************************************/

pub(crate) fn to_int64(value: &CBOR, opts: Conversions) -> Result<i64> {
    match *value {
        CBOR::Int(v) if opts.allow_int64() => Ok(v),
        CBOR::UInt(v) if opts.allow_uint64() => {
            if v <= i64::MAX as u64 {
                Ok(v as i64)
            } else {
                Err(CBORError::ConversionUnderOverFlow)
            }
        }
        #[cfg(feature = "float")]
        CBOR::Float64(f) if opts.allow_double() => round_to_i64(f),
        #[cfg(feature = "float")]
        CBOR::Float32(f) if opts.allow_float() => round_to_i64(f as f64),
        CBOR::PosBignum(b) if opts.allow_bignum() => {
            let m = bignum_to_u64(b).ok_or(CBORError::ConversionUnderOverFlow)?;
            if m <= i64::MAX as u64 {
                Ok(m as i64)
            } else {
                Err(CBORError::ConversionUnderOverFlow)
            }
        }
        CBOR::NegBignum(b) if opts.allow_bignum() => {
            let m = bignum_to_u64(b).ok_or(CBORError::ConversionUnderOverFlow)?;
            if m <= i64::MAX as u64 {
                Ok(-(m as i64) - 1)
            } else {
                Err(CBORError::ConversionUnderOverFlow)
            }
        }
        #[cfg(feature = "exp-mantissa")]
        CBOR::DecimalFraction { exponent, mantissa } if opts.allow_decimal_fraction() => {
            exponentiate_i64(mantissa, exponent, 10)
        }
        #[cfg(feature = "exp-mantissa")]
        CBOR::BigFloat { exponent, mantissa } if opts.allow_big_float() => {
            exponentiate_i64(mantissa, exponent, 2)
        }
        _ => Err(CBORError::UnexpectedType),
    }
}

/***************************************************************************************************
 * Conversions to u64
 **************************************************************************************************/

pub(crate) fn to_uint64(value: &CBOR, opts: Conversions) -> Result<u64> {
    match *value {
        CBOR::Int(v) if opts.allow_int64() => {
            if v >= 0 {
                Ok(v as u64)
            } else {
                Err(CBORError::NumberSignConversion)
            }
        }
        CBOR::UInt(v) if opts.allow_uint64() => Ok(v),
        #[cfg(feature = "float")]
        CBOR::Float64(f) if opts.allow_double() => round_to_u64(f),
        #[cfg(feature = "float")]
        CBOR::Float32(f) if opts.allow_float() => round_to_u64(f as f64),
        CBOR::PosBignum(b) if opts.allow_bignum() => {
            bignum_to_u64(b).ok_or(CBORError::ConversionUnderOverFlow)
        }
        CBOR::NegBignum(_) if opts.allow_bignum() => Err(CBORError::NumberSignConversion),
        #[cfg(feature = "exp-mantissa")]
        CBOR::DecimalFraction { exponent, mantissa } if opts.allow_decimal_fraction() => {
            if mantissa < 0 {
                Err(CBORError::NumberSignConversion)
            } else {
                exponentiate_u64(mantissa as u64, exponent, 10)
            }
        }
        #[cfg(feature = "exp-mantissa")]
        CBOR::BigFloat { exponent, mantissa } if opts.allow_big_float() => {
            if mantissa < 0 {
                Err(CBORError::NumberSignConversion)
            } else {
                exponentiate_u64(mantissa as u64, exponent, 2)
            }
        }
        _ => Err(CBORError::UnexpectedType),
    }
}

/***************************************************************************************************
 * Conversions to f64
 **************************************************************************************************/

/// Convert a numeric value to a double. Integer sources tolerate precision loss silently;
/// bignum, decimal fraction and big float sources clamp to the infinities on overflow and to
/// zero on underflow.
#[cfg(feature = "float")]
pub(crate) fn to_double(value: &CBOR, opts: Conversions) -> Result<f64> {
    match *value {
        CBOR::Float64(f) if opts.allow_double() => Ok(f),
        CBOR::Float32(f) if opts.allow_float() => Ok(f as f64),
        #[cfg(feature = "float-hw")]
        CBOR::Int(v) if opts.allow_int64() => Ok(v as f64),
        #[cfg(feature = "float-hw")]
        CBOR::UInt(v) if opts.allow_uint64() => Ok(v as f64),
        #[cfg(feature = "float-hw")]
        CBOR::PosBignum(b) if opts.allow_bignum() => Ok(bignum_to_f64(b)),
        #[cfg(feature = "float-hw")]
        CBOR::NegBignum(b) if opts.allow_bignum() => Ok(-1.0 - bignum_to_f64(b)),
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::DecimalFraction { exponent, mantissa } if opts.allow_decimal_fraction() => {
            Ok(exponentiate_f64(mantissa as f64, exponent, 10.0))
        }
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::BigFloat { exponent, mantissa } if opts.allow_big_float() => {
            Ok(exponentiate_f64(mantissa as f64, exponent, 2.0))
        }
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::DecimalFractionPosBignum { exponent, mantissa }
            if opts.allow_decimal_fraction() =>
        {
            Ok(exponentiate_f64(bignum_to_f64(mantissa), exponent, 10.0))
        }
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::DecimalFractionNegBignum { exponent, mantissa }
            if opts.allow_decimal_fraction() =>
        {
            Ok(exponentiate_f64(-1.0 - bignum_to_f64(mantissa), exponent, 10.0))
        }
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::BigFloatPosBignum { exponent, mantissa } if opts.allow_big_float() => {
            Ok(exponentiate_f64(bignum_to_f64(mantissa), exponent, 2.0))
        }
        #[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
        CBOR::BigFloatNegBignum { exponent, mantissa } if opts.allow_big_float() => {
            Ok(exponentiate_f64(-1.0 - bignum_to_f64(mantissa), exponent, 2.0))
        }
        #[cfg(not(feature = "float-hw"))]
        CBOR::Int(_) | CBOR::UInt(_) | CBOR::PosBignum(_) | CBOR::NegBignum(_) => {
            Err(CBORError::HwFloatDisabled)
        }
        _ => Err(CBORError::UnexpectedType),
    }
}

/***************************************************************************************************
 * Simple extractors used by the typed accessors
 **************************************************************************************************/

pub(crate) fn to_bool(value: &CBOR) -> Result<bool> {
    match value {
        CBOR::True => Ok(true),
        CBOR::False => Ok(false),
        _ => Err(CBORError::UnexpectedType),
    }
}

pub(crate) fn to_bytes<'buf>(value: &CBOR<'buf>) -> Result<&'buf [u8]> {
    match value {
        CBOR::Bstr(b) => Ok(b),
        _ => Err(CBORError::UnexpectedType),
    }
}

pub(crate) fn to_text<'buf>(value: &CBOR<'buf>) -> Result<&'buf str> {
    match value {
        CBOR::Tstr(s) => Ok(s),
        _ => Err(CBORError::UnexpectedType),
    }
}

pub(crate) fn to_pos_bignum<'buf>(value: &CBOR<'buf>) -> Result<&'buf [u8]> {
    match value {
        CBOR::PosBignum(b) => Ok(b),
        _ => Err(CBORError::UnexpectedType),
    }
}

pub(crate) fn to_neg_bignum<'buf>(value: &CBOR<'buf>) -> Result<&'buf [u8]> {
    match value {
        CBOR::NegBignum(b) => Ok(b),
        _ => Err(CBORError::UnexpectedType),
    }
}

/***************************************************************************************************
 * Arithmetic helpers
 **************************************************************************************************/

/// Interpret a big-endian bignum as a u64, when it fits.
fn bignum_to_u64(bytes: &[u8]) -> Option<u64> {
    let mut significant = bytes;
    while let Some((0, rest)) = significant.split_first() {
        significant = rest;
    }
    if significant.len() > 8 {
        return None;
    }
    let mut v = 0u64;
    for &b in significant {
        v = v << 8 | b as u64;
    }
    Some(v)
}

/// Interpret a big-endian bignum as a double, saturating to infinity when too large.
#[cfg(feature = "float-hw")]
fn bignum_to_f64(bytes: &[u8]) -> f64 {
    let mut v = 0.0f64;
    for &b in bytes {
        v = v * 256.0 + b as f64;
    }
    v
}

/// Scale `mantissa` by `base` to the power `exponent`, exactly. A positive exponent uses
/// checked multiplication; a negative exponent requires the divisions to be exact. Anything
/// inexact or out of range is a `ConversionUnderOverFlow`.
#[cfg(feature = "exp-mantissa")]
fn exponentiate_i64(mantissa: i64, exponent: i64, base: i64) -> Result<i64> {
    if mantissa == 0 {
        return Ok(0);
    }
    if exponent >= 0 {
        if exponent > 64 {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        let mut v = mantissa;
        for _ in 0..exponent {
            v = v.checked_mul(base).ok_or(CBORError::ConversionUnderOverFlow)?;
        }
        Ok(v)
    } else {
        if exponent < -64 {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        let mut v = mantissa;
        for _ in 0..-exponent {
            if v % base != 0 {
                return Err(CBORError::ConversionUnderOverFlow);
            }
            v /= base;
        }
        Ok(v)
    }
}

/// As `exponentiate_i64`, for an unsigned destination: the full u64 range is usable, so a
/// value too large for i64 can still scale exactly.
#[cfg(feature = "exp-mantissa")]
fn exponentiate_u64(mantissa: u64, exponent: i64, base: u64) -> Result<u64> {
    if mantissa == 0 {
        return Ok(0);
    }
    if exponent >= 0 {
        if exponent > 64 {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        let mut v = mantissa;
        for _ in 0..exponent {
            v = v.checked_mul(base).ok_or(CBORError::ConversionUnderOverFlow)?;
        }
        Ok(v)
    } else {
        if exponent < -64 {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        let mut v = mantissa;
        for _ in 0..-exponent {
            if v % base != 0 {
                return Err(CBORError::ConversionUnderOverFlow);
            }
            v /= base;
        }
        Ok(v)
    }
}

/// Scale `mantissa` by `base` to the power `exponent` in doubles, saturating to the
/// infinities on overflow and to zero on underflow.
#[cfg(all(feature = "float-hw", feature = "exp-mantissa"))]
fn exponentiate_f64(mantissa: f64, exponent: i64, base: f64) -> f64 {
    // 2^-1074 is the smallest subnormal and 10^309 overflows, so 2200 steps covers every
    // non-saturated case for both bases
    let steps = exponent.unsigned_abs().min(2200);
    let mut v = mantissa;
    if exponent >= 0 {
        for _ in 0..steps {
            v *= base;
        }
    } else {
        for _ in 0..steps {
            v /= base;
        }
    }
    v
}

/// Round a double to the nearest i64, ties to even.
#[cfg(feature = "float")]
fn round_to_i64(f: f64) -> Result<i64> {
    #[cfg(not(feature = "float-hw"))]
    {
        let _ = f;
        Err(CBORError::HwFloatDisabled)
    }
    #[cfg(feature = "float-hw")]
    {
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if f.is_nan() || f >= LIMIT || f < -LIMIT {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        let t = f as i64;
        let frac = f - t as f64;
        let rounded = if frac > 0.5 || (frac == 0.5 && t % 2 != 0) {
            t.checked_add(1)
        } else if frac < -0.5 || (frac == -0.5 && t % 2 != 0) {
            t.checked_sub(1)
        } else {
            Some(t)
        };
        rounded.ok_or(CBORError::ConversionUnderOverFlow)
    }
}

/// Round a double to the nearest u64, ties to even. A value that rounds below zero is a sign
/// conversion failure.
#[cfg(feature = "float")]
fn round_to_u64(f: f64) -> Result<u64> {
    #[cfg(not(feature = "float-hw"))]
    {
        let _ = f;
        Err(CBORError::HwFloatDisabled)
    }
    #[cfg(feature = "float-hw")]
    {
        const LIMIT: f64 = 18_446_744_073_709_551_616.0;
        if f.is_nan() || f >= LIMIT {
            return Err(CBORError::ConversionUnderOverFlow);
        }
        if f <= -1.0 {
            return Err(CBORError::NumberSignConversion);
        }
        if f < 0.0 {
            // -1.0 < f < 0.0 rounds to zero except below -0.5
            return if f < -0.5 {
                Err(CBORError::NumberSignConversion)
            } else {
                Ok(0)
            };
        }
        let t = f as u64;
        let frac = f - t as f64;
        let rounded = if frac > 0.5 || (frac == 0.5 && t % 2 != 0) {
            t.checked_add(1)
        } else {
            Some(t)
        };
        rounded.ok_or(CBORError::ConversionUnderOverFlow)
    }
}
