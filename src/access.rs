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
 * rs_streamcbor CBOR map and array navigation
 *
 * A streaming, memory efficient, deserializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
/// # Entered-container decoding
///
/// This layer restricts the streaming traversal to one entered map or array at a time and adds
/// labelled lookup on maps. It carries a sticky error: once any operation here fails, the
/// failure is latched on the context and every subsequent operation is a no-op returning the
/// same error, until [`CBORDecoder::get_and_reset_error`] clears it (recoverable errors only)
/// or [`CBORDecoder::finish`] reports it. This allows a long run of lookups to be written
/// without intermediate error handling:
///
/// ```
///# use tps_streamcbor::decoder::{CBORDecoder, DecodeMode};
/// // {"a": 1, "b": 2}
/// let b = [0xa2, 0x61, 0x61, 0x01, 0x61, 0x62, 0x02];
/// let mut d = CBORDecoder::new(&b, DecodeMode::Normal);
/// d.enter_map().unwrap();
/// let a = d.get_int64_in_map_sz("a");
/// let b_ = d.get_int64_in_map_sz("b");
/// d.exit_map().unwrap();
/// assert_eq!((a.unwrap(), b_.unwrap()), (1, 2));
/// d.finish().unwrap();
/// ```
use crate::convert::{
    to_bool, to_bytes, to_int64, to_neg_bignum, to_pos_bignum, to_text, to_uint64, Conversions,
};
use crate::decode::{CBORDecoder, DecodeMode};
use crate::error::{CBORError, Result};
use crate::item::{CBORItem, CBORLabel, CBORType, CBOR};
use crate::nesting::{DecodeFrame, DecodeNesting};

#[cfg(feature = "float")]
use crate::convert::to_double;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// One requested map entry for [`CBORDecoder::get_items_in_map`]: the label to find, the
/// type the value must have (or `Any`), and the slot the found item is written to.
#[derive(Debug, Clone)]
pub struct MapQuery<'buf> {
    pub label: CBORLabel<'buf>,
    pub expected: CBORType,
    pub item: Option<CBORItem<'buf>>,
}

impl<'buf> MapQuery<'buf> {
    pub fn new(label: CBORLabel<'buf>, expected: CBORType) -> MapQuery<'buf> {
        MapQuery {
            label,
            expected,
            item: None,
        }
    }

    /// A query with an integer label.
    pub fn int(label: i64, expected: CBORType) -> MapQuery<'buf> {
        Self::new(CBORLabel::Int(label), expected)
    }

    /// A query with a text label.
    pub fn text(label: &'buf str, expected: CBORType) -> MapQuery<'buf> {
        Self::new(CBORLabel::Tstr(label), expected)
    }
}

impl<'buf> CBORDecoder<'buf> {
    /***********************************************************************************************
     * Sticky error discipline
     **********************************************************************************************/

    /// The latched error, if any operation of this layer has failed.
    #[inline]
    pub fn get_error(&self) -> Option<CBORError> {
        self.last_error
    }

    /// Take and clear the latched error, so that decoding may resume. Clearing an
    /// unrecoverable error does not make the underlying input decodable again.
    #[inline]
    pub fn get_and_reset_error(&mut self) -> Option<CBORError> {
        self.last_error.take()
    }

    /// Short-circuit entry check: every operation of this layer is a no-op once an error is
    /// latched.
    fn guard(&self) -> Result<()> {
        match self.last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Latch a failure.
    fn track<T>(&mut self, r: Result<T>) -> Result<T> {
        if let Err(e) = &r {
            self.last_error = Some(*e);
        }
        r
    }

    /***********************************************************************************************
     * Entering and leaving containers
     **********************************************************************************************/

    /// Consume the next item, which must be a map, and restrict traversal to its entries
    /// until the matching [`CBORDecoder::exit_map`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn enter_map(&mut self) -> Result<()> {
        self.guard()?;
        let r = self.enter_container(true);
        self.track(r)
    }

    /// Consume the next item, which must be an array, and restrict traversal to its entries
    /// until the matching [`CBORDecoder::exit_array`].
    #[cfg_attr(feature = "trace", trace)]
    pub fn enter_array(&mut self) -> Result<()> {
        self.guard()?;
        let r = self.enter_container(false);
        self.track(r)
    }

    /// Leave the entered map, fast-forwarding over any entries not yet consumed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn exit_map(&mut self) -> Result<()> {
        self.guard()?;
        let r = self.exit_container(true);
        self.track(r)
    }

    /// Leave the entered array, fast-forwarding over any entries not yet consumed.
    #[cfg_attr(feature = "trace", trace)]
    pub fn exit_array(&mut self) -> Result<()> {
        self.guard()?;
        let r = self.exit_container(false);
        self.track(r)
    }

    /// Reset the traversal cursor to the first entry of the entered container, or to the
    /// start of the input when no container is entered.
    #[cfg_attr(feature = "trace", trace)]
    pub fn rewind(&mut self) -> Result<()> {
        self.guard()?;
        if self.nesting.has_bounded() {
            let r = self.rewind_bounded();
            self.track(r)
        } else {
            self.input.seek(0);
            self.nesting = DecodeNesting::new();
            self.last_next_level = 0;
            Ok(())
        }
    }

    /// Find a labelled entry which must be a map, and enter it.
    pub fn enter_map_from_map_n(&mut self, label: i64) -> Result<()> {
        self.guard()?;
        let r = self.enter_from_map(CBORLabel::Int(label), true);
        self.track(r)
    }

    /// Find a text-labelled entry which must be a map, and enter it.
    pub fn enter_map_from_map_sz(&mut self, label: &'buf str) -> Result<()> {
        self.guard()?;
        let r = self.enter_from_map(CBORLabel::Tstr(label), true);
        self.track(r)
    }

    /// Find a labelled entry which must be an array, and enter it.
    pub fn enter_array_from_map_n(&mut self, label: i64) -> Result<()> {
        self.guard()?;
        let r = self.enter_from_map(CBORLabel::Int(label), false);
        self.track(r)
    }

    /// Find a text-labelled entry which must be an array, and enter it.
    pub fn enter_array_from_map_sz(&mut self, label: &'buf str) -> Result<()> {
        self.guard()?;
        let r = self.enter_from_map(CBORLabel::Tstr(label), false);
        self.track(r)
    }

    /***********************************************************************************************
     * Labelled lookup
     **********************************************************************************************/

    /// Look up `label` in the entered map and return its value item.
    ///
    /// The whole map is always scanned, so a second entry with the same label is detected and
    /// reported as `DuplicateLabel`. An absent label is `LabelNotFound`; a present label
    /// whose value is not of type `expected` (with `Any` matching everything) is
    /// `UnexpectedType`. The traversal cursor is unchanged on success.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_item_in_map_n(
        &mut self,
        label: i64,
        expected: CBORType,
    ) -> Result<CBORItem<'buf>> {
        self.guard()?;
        let r = self.search_restoring(CBORLabel::Int(label), expected);
        self.track(r)
    }

    /// As [`CBORDecoder::get_item_in_map_n`], with a text label.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_item_in_map_sz(
        &mut self,
        label: &'buf str,
        expected: CBORType,
    ) -> Result<CBORItem<'buf>> {
        self.guard()?;
        let r = self.search_restoring(CBORLabel::Tstr(label), expected);
        self.track(r)
    }

    /// Fetch a batch of labelled entries in one pass over the entered map.
    ///
    /// Each query's `item` slot is filled with the found entry. Every requested label must be
    /// present exactly once: a missing label is `LabelNotFound` and a second occurrence is
    /// `DuplicateLabel`. The traversal cursor is unchanged on success.
    #[cfg_attr(feature = "trace", trace)]
    pub fn get_items_in_map(&mut self, queries: &mut [MapQuery<'buf>]) -> Result<()> {
        self.guard()?;
        let r = self.batch_search(queries);
        self.track(r)
    }

    /***********************************************************************************************
     * Typed accessors
     **********************************************************************************************/

    /// Consume the next item as a signed integer.
    pub fn get_int64(&mut self) -> Result<i64> {
        self.typed_next(|v| to_int64(v, Conversions::int_types()))
    }

    /// Consume the next item as a signed integer, converting from any source permitted by
    /// `opts`.
    pub fn get_int64_convert(&mut self, opts: Conversions) -> Result<i64> {
        self.typed_next(|v| to_int64(v, opts))
    }

    /// Look up `label` and return its value as a signed integer.
    pub fn get_int64_in_map_n(&mut self, label: i64) -> Result<i64> {
        self.typed_in_map(CBORLabel::Int(label), |v| {
            to_int64(v, Conversions::int_types())
        })
    }

    /// Look up text `label` and return its value as a signed integer.
    pub fn get_int64_in_map_sz(&mut self, label: &'buf str) -> Result<i64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| {
            to_int64(v, Conversions::int_types())
        })
    }

    /// Look up `label` and return its value as a signed integer, converting from any source
    /// permitted by `opts`.
    pub fn get_int64_convert_in_map_n(&mut self, label: i64, opts: Conversions) -> Result<i64> {
        self.typed_in_map(CBORLabel::Int(label), |v| to_int64(v, opts))
    }

    /// Look up text `label` and return its value as a signed integer, converting from any
    /// source permitted by `opts`.
    pub fn get_int64_convert_in_map_sz(&mut self, label: &'buf str, opts: Conversions) -> Result<i64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| to_int64(v, opts))
    }

    /// Consume the next item as an unsigned integer.
    pub fn get_uint64(&mut self) -> Result<u64> {
        self.typed_next(|v| to_uint64(v, Conversions::int_types()))
    }

    /// Consume the next item as an unsigned integer, converting from any source permitted by
    /// `opts`.
    pub fn get_uint64_convert(&mut self, opts: Conversions) -> Result<u64> {
        self.typed_next(|v| to_uint64(v, opts))
    }

    /// Look up `label` and return its value as an unsigned integer.
    pub fn get_uint64_in_map_n(&mut self, label: i64) -> Result<u64> {
        self.typed_in_map(CBORLabel::Int(label), |v| {
            to_uint64(v, Conversions::int_types())
        })
    }

    /// Look up text `label` and return its value as an unsigned integer.
    pub fn get_uint64_in_map_sz(&mut self, label: &'buf str) -> Result<u64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| {
            to_uint64(v, Conversions::int_types())
        })
    }

    /// Look up `label` and return its value as an unsigned integer, converting from any
    /// source permitted by `opts`.
    pub fn get_uint64_convert_in_map_n(&mut self, label: i64, opts: Conversions) -> Result<u64> {
        self.typed_in_map(CBORLabel::Int(label), |v| to_uint64(v, opts))
    }

    /// Look up text `label` and return its value as an unsigned integer, converting from any
    /// source permitted by `opts`.
    pub fn get_uint64_convert_in_map_sz(&mut self, label: &'buf str, opts: Conversions) -> Result<u64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| to_uint64(v, opts))
    }

    /// Consume the next item as a double.
    #[cfg(feature = "float")]
    pub fn get_double(&mut self) -> Result<f64> {
        self.typed_next(|v| to_double(v, Conversions::float_types()))
    }

    /// Consume the next item as a double, converting from any source permitted by `opts`.
    #[cfg(feature = "float")]
    pub fn get_double_convert(&mut self, opts: Conversions) -> Result<f64> {
        self.typed_next(|v| to_double(v, opts))
    }

    /// Look up `label` and return its value as a double.
    #[cfg(feature = "float")]
    pub fn get_double_in_map_n(&mut self, label: i64) -> Result<f64> {
        self.typed_in_map(CBORLabel::Int(label), |v| {
            to_double(v, Conversions::float_types())
        })
    }

    /// Look up text `label` and return its value as a double.
    #[cfg(feature = "float")]
    pub fn get_double_in_map_sz(&mut self, label: &'buf str) -> Result<f64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| {
            to_double(v, Conversions::float_types())
        })
    }

    /// Look up `label` and return its value as a double, converting from any source permitted
    /// by `opts`.
    #[cfg(feature = "float")]
    pub fn get_double_convert_in_map_n(&mut self, label: i64, opts: Conversions) -> Result<f64> {
        self.typed_in_map(CBORLabel::Int(label), |v| to_double(v, opts))
    }

    /// Look up text `label` and return its value as a double, converting from any source
    /// permitted by `opts`.
    #[cfg(feature = "float")]
    pub fn get_double_convert_in_map_sz(&mut self, label: &'buf str, opts: Conversions) -> Result<f64> {
        self.typed_in_map(CBORLabel::Tstr(label), |v| to_double(v, opts))
    }

    /// Consume the next item as a boolean.
    pub fn get_bool(&mut self) -> Result<bool> {
        self.typed_next(to_bool)
    }

    /// Look up `label` and return its value as a boolean.
    pub fn get_bool_in_map_n(&mut self, label: i64) -> Result<bool> {
        self.typed_in_map(CBORLabel::Int(label), to_bool)
    }

    /// Look up text `label` and return its value as a boolean.
    pub fn get_bool_in_map_sz(&mut self, label: &'buf str) -> Result<bool> {
        self.typed_in_map(CBORLabel::Tstr(label), to_bool)
    }

    /// Consume the next item as a byte string.
    pub fn get_bytes(&mut self) -> Result<&'buf [u8]> {
        self.typed_next(to_bytes)
    }

    /// Look up `label` and return its value as a byte string.
    pub fn get_bytes_in_map_n(&mut self, label: i64) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Int(label), to_bytes)
    }

    /// Look up text `label` and return its value as a byte string.
    pub fn get_bytes_in_map_sz(&mut self, label: &'buf str) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Tstr(label), to_bytes)
    }

    /// Consume the next item as a text string.
    pub fn get_text(&mut self) -> Result<&'buf str> {
        self.typed_next(to_text)
    }

    /// Look up `label` and return its value as a text string.
    pub fn get_text_in_map_n(&mut self, label: i64) -> Result<&'buf str> {
        self.typed_in_map(CBORLabel::Int(label), to_text)
    }

    /// Look up text `label` and return its value as a text string.
    pub fn get_text_in_map_sz(&mut self, label: &'buf str) -> Result<&'buf str> {
        self.typed_in_map(CBORLabel::Tstr(label), to_text)
    }

    /// Consume the next item as a positive bignum.
    pub fn get_pos_bignum(&mut self) -> Result<&'buf [u8]> {
        self.typed_next(to_pos_bignum)
    }

    /// Look up `label` and return its value as a positive bignum.
    pub fn get_pos_bignum_in_map_n(&mut self, label: i64) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Int(label), to_pos_bignum)
    }

    /// Look up text `label` and return its value as a positive bignum.
    pub fn get_pos_bignum_in_map_sz(&mut self, label: &'buf str) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Tstr(label), to_pos_bignum)
    }

    /// Consume the next item as a negative bignum.
    pub fn get_neg_bignum(&mut self) -> Result<&'buf [u8]> {
        self.typed_next(to_neg_bignum)
    }

    /// Look up `label` and return its value as a negative bignum.
    pub fn get_neg_bignum_in_map_n(&mut self, label: i64) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Int(label), to_neg_bignum)
    }

    /// Look up text `label` and return its value as a negative bignum.
    pub fn get_neg_bignum_in_map_sz(&mut self, label: &'buf str) -> Result<&'buf [u8]> {
        self.typed_in_map(CBORLabel::Tstr(label), to_neg_bignum)
    }

    /***********************************************************************************************
     * Internals
     **********************************************************************************************/

    fn typed_next<T>(&mut self, f: impl FnOnce(&CBOR<'buf>) -> Result<T>) -> Result<T> {
        self.guard()?;
        let r = match self.next_item(None) {
            Ok(item) => f(&item.value),
            Err(e) => Err(e),
        };
        self.track(r)
    }

    fn typed_in_map<T>(
        &mut self,
        label: CBORLabel<'buf>,
        f: impl FnOnce(&CBOR<'buf>) -> Result<T>,
    ) -> Result<T> {
        self.guard()?;
        let r = match self.search_restoring(label, CBORType::Any) {
            Ok(item) => f(&item.value),
            Err(e) => Err(e),
        };
        self.track(r)
    }

    fn enter_container(&mut self, want_map: bool) -> Result<()> {
        let item = self.next_item(None)?;
        let is_map = match item.value {
            CBOR::Map(_) => true,
            CBOR::Array(_) | CBOR::MapAsArray(_) => false,
            _ => return Err(CBORError::UnexpectedType),
        };
        // In MapAsArray mode a map is traversed as an array
        let container_is_map = matches!(item.value, CBOR::Map(_) | CBOR::MapAsArray(_));
        if is_map != want_map {
            return Err(CBORError::UnexpectedType);
        }
        self.mark_entered(container_is_map, &item)
    }

    /// Mark the container whose head was just consumed as the bounded traversal frame. An
    /// empty container has already been closed by the traversal, so a placeholder exhausted
    /// frame is pushed for it.
    fn mark_entered(&mut self, container_is_map: bool, item: &CBORItem<'buf>) -> Result<()> {
        if self.nesting.level() > item.nest_level {
            if let Some(f) = self.nesting.top_mut() {
                f.bounded = true;
            }
            Ok(())
        } else {
            self.nesting.push(DecodeFrame {
                is_map: container_is_map,
                indefinite: false,
                count: 0,
                remaining: 0,
                bounded: true,
                exhausted: true,
                first_child: self.input.tell(),
            })
        }
    }

    fn exit_container(&mut self, want_map: bool) -> Result<()> {
        match self.nesting.innermost_bounded() {
            Some(f) => {
                let treat_as_map = f.is_map && self.mode != DecodeMode::MapAsArray;
                if treat_as_map != want_map {
                    return Err(CBORError::ExitMismatch);
                }
            }
            None => return Err(CBORError::ExitMismatch),
        }
        // Fast-forward over unconsumed entries, then over the container end itself
        loop {
            match self.nesting.top() {
                Some(f) if f.bounded && f.exhausted => break,
                _ => {
                    self.next_item(None)?;
                }
            }
        }
        self.nesting.pop();
        // Closures of enclosing containers were deferred while the frame was bounded
        self.ascend()?;
        self.last_next_level = self.nesting.level();
        Ok(())
    }

    /// Reset the bounded frame to its first child: cursor, remaining count and any traversal
    /// state above the frame.
    fn rewind_bounded(&mut self) -> Result<()> {
        self.nesting.truncate_to_bounded();
        let (first_child, remaining, exhausted) = match self.nesting.top() {
            Some(f) if f.bounded => {
                let remaining = if f.indefinite {
                    0
                } else {
                    f.count as u32 * if f.is_map { 2 } else { 1 }
                };
                (f.first_child, remaining, !f.indefinite && remaining == 0)
            }
            _ => return Err(CBORError::UnexpectedType),
        };
        if let Some(f) = self.nesting.top_mut() {
            f.remaining = remaining;
            f.exhausted = exhausted;
        }
        self.input.seek(first_child);
        self.last_next_level = self.nesting.level();
        Ok(())
    }

    /// The innermost entered container must be a map traversed as a map.
    fn bounded_map_check(&self) -> Result<()> {
        match self.nesting.innermost_bounded() {
            Some(f) if f.is_map && self.mode != DecodeMode::MapAsArray => Ok(()),
            _ => Err(CBORError::UnexpectedType),
        }
    }

    /// Consume the children of `item`, leaving the cursor on the next entry at the item's
    /// level. A leaf item has nothing to consume.
    fn consume_subtree(&mut self, item: &CBORItem<'buf>) -> Result<()> {
        while self.last_next_level > item.nest_level {
            self.next_item(None)?;
        }
        Ok(())
    }

    /// Scan the whole entered map for `label`. Saves and restores the traversal position so
    /// the caller's cursor is unaffected on success.
    fn search_restoring(
        &mut self,
        label: CBORLabel<'buf>,
        expected: CBORType,
    ) -> Result<CBORItem<'buf>> {
        self.bounded_map_check()?;
        let saved_nesting = self.nesting.clone();
        let saved_pos = self.input.tell();
        let saved_next = self.last_next_level;

        let found = self.scan_for(&label)?;
        let item = found.ok_or(CBORError::LabelNotFound)?;
        if !item.value.is_type(expected) {
            return Err(CBORError::UnexpectedType);
        }

        self.nesting = saved_nesting;
        self.input.seek(saved_pos);
        self.last_next_level = saved_next;
        Ok(item)
    }

    /// One full pass over the entered map: every entry is visited so that duplicate labels
    /// are always detected, whichever duplicate was sought.
    fn scan_for(&mut self, label: &CBORLabel<'buf>) -> Result<Option<CBORItem<'buf>>> {
        self.rewind_bounded()?;
        let mut found: Option<CBORItem<'buf>> = None;
        loop {
            let item = match self.next_item(None) {
                Ok(item) => item,
                Err(CBORError::NoMoreItems) => break,
                Err(e) => return Err(e),
            };
            let matched = item.label == *label;
            self.consume_subtree(&item)?;
            if matched {
                if found.is_some() {
                    return Err(CBORError::DuplicateLabel);
                }
                found = Some(item);
            }
        }
        Ok(found)
    }

    fn enter_from_map(&mut self, label: CBORLabel<'buf>, want_map: bool) -> Result<()> {
        self.bounded_map_check()?;
        // First pass detects duplicates and verifies the value's type
        let found = self.scan_for(&label)?.ok_or(CBORError::LabelNotFound)?;
        let is_map = match found.value {
            CBOR::Map(_) => true,
            CBOR::Array(_) => false,
            _ => return Err(CBORError::UnexpectedType),
        };
        if is_map != want_map {
            return Err(CBORError::UnexpectedType);
        }
        // Second pass stops on the matched entry with its head consumed, then bounds it
        self.rewind_bounded()?;
        loop {
            let item = match self.next_item(None) {
                Ok(item) => item,
                Err(e) => return Err(e),
            };
            if item.label == label {
                return self.mark_entered(is_map, &item);
            }
            self.consume_subtree(&item)?;
        }
    }

    fn batch_search(&mut self, queries: &mut [MapQuery<'buf>]) -> Result<()> {
        self.bounded_map_check()?;
        let saved_nesting = self.nesting.clone();
        let saved_pos = self.input.tell();
        let saved_next = self.last_next_level;

        for q in queries.iter_mut() {
            q.item = None;
        }
        self.rewind_bounded()?;
        loop {
            let item = match self.next_item(None) {
                Ok(item) => item,
                Err(CBORError::NoMoreItems) => break,
                Err(e) => return Err(e),
            };
            self.consume_subtree(&item)?;
            for q in queries.iter_mut() {
                if item.label == q.label {
                    if q.item.is_some() {
                        return Err(CBORError::DuplicateLabel);
                    }
                    if !item.value.is_type(q.expected) {
                        return Err(CBORError::UnexpectedType);
                    }
                    q.item = Some(item);
                }
            }
        }
        if queries.iter().any(|q| q.item.is_none()) {
            return Err(CBORError::LabelNotFound);
        }

        self.nesting = saved_nesting;
        self.input.seek(saved_pos);
        self.last_next_level = saved_next;
        Ok(())
    }
}
