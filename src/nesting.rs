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
 * rs_streamcbor CBOR nesting tracker
 *
 * A streaming, memory efficient, deserializer and serializer for CBOR (RFC8949).
 * This implementation is designed for use in constrained systems and requires neither the Rust
 * standard library nor an allocator.
 **************************************************************************************************/
use crate::constants::MAX_ARRAY_NESTING;
use crate::error::{CBORError, Result};

/***************************************************************************************************
 * Encoder nesting
 **************************************************************************************************/

/// The kind of an open encoder container.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub(crate) enum EncodeKind {
    Array,
    Map,
    BstrWrap,
}

/// One open container on the encoder side. `count` holds the number of child items added so
/// far (labels and values count separately in a map); for a byte-string wrap the payload
/// length is derived from offsets instead. `head_offset` is the byte offset of the container
/// head, used to backpatch definite-length heads on close.
#[derive(Debug, Copy, Clone)]
pub(crate) struct EncodeFrame {
    pub kind: EncodeKind,
    pub indefinite: bool,
    pub count: u64,
    pub head_offset: usize,
}

/// A fixed-capacity stack of the currently open containers on the encoder side.
#[derive(Debug)]
pub(crate) struct EncodeNesting {
    frames: [EncodeFrame; MAX_ARRAY_NESTING],
    depth: usize,
}

impl EncodeNesting {
    pub fn new() -> EncodeNesting {
        EncodeNesting {
            frames: [EncodeFrame {
                kind: EncodeKind::Array,
                indefinite: false,
                count: 0,
                head_offset: 0,
            }; MAX_ARRAY_NESTING],
            depth: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// Open a new container.
    pub fn push(&mut self, kind: EncodeKind, indefinite: bool, head_offset: usize) -> Result<()> {
        if self.depth == MAX_ARRAY_NESTING {
            return Err(CBORError::EncodeNestingTooDeep);
        }
        self.frames[self.depth] = EncodeFrame {
            kind,
            indefinite,
            count: 0,
            head_offset,
        };
        self.depth += 1;
        Ok(())
    }

    /// Close the innermost container, which must be of kind `kind`.
    pub fn pop(&mut self, kind: EncodeKind) -> Result<EncodeFrame> {
        if self.depth == 0 {
            return Err(CBORError::TooManyCloses);
        }
        let frame = self.frames[self.depth - 1];
        if frame.kind != kind {
            return Err(CBORError::CloseMismatch);
        }
        self.depth -= 1;
        Ok(frame)
    }

    #[inline]
    pub fn top(&self) -> Option<&EncodeFrame> {
        if self.depth == 0 {
            None
        } else {
            Some(&self.frames[self.depth - 1])
        }
    }

    /// Count one child item added to the innermost open container.
    #[inline]
    pub fn count_item(&mut self) {
        if self.depth > 0 {
            self.frames[self.depth - 1].count += 1;
        }
    }

    /// Remove one child item from the innermost open container's count. Used when a cancelled
    /// byte-string wrap is withdrawn from its parent.
    #[inline]
    pub fn uncount_item(&mut self) {
        if self.depth > 0 {
            self.frames[self.depth - 1].count -= 1;
        }
    }
}

/***************************************************************************************************
 * Decoder nesting
 **************************************************************************************************/

/// One open container on the decoder side.
///
/// For a definite-length container, `remaining` holds the number of child items (labels and
/// values separately) still to be consumed; at zero the frame is popped. An indefinite-length
/// frame is popped when a break is seen at its level. `count` retains the decoded head
/// argument for reporting and for map-mode rewind, and `first_child` the byte offset just
/// after the head.
///
/// `bounded` marks a container the caller has entered in map mode; the traversal ascender
/// never pops a bounded frame, it marks it `exhausted` instead, so that the cursor can be
/// rewound to `first_child` without reconstructing the enclosing state.
#[derive(Debug, Copy, Clone)]
pub(crate) struct DecodeFrame {
    pub is_map: bool,
    pub indefinite: bool,
    pub count: u16,
    pub remaining: u32,
    pub bounded: bool,
    pub exhausted: bool,
    pub first_child: usize,
}

impl DecodeFrame {
    pub fn definite(is_map: bool, count: u16, remaining: u32, first_child: usize) -> DecodeFrame {
        DecodeFrame {
            is_map,
            indefinite: false,
            count,
            remaining,
            bounded: false,
            exhausted: remaining == 0,
            first_child,
        }
    }

    pub fn indefinite(is_map: bool, first_child: usize) -> DecodeFrame {
        DecodeFrame {
            is_map,
            indefinite: true,
            count: 0,
            remaining: 0,
            bounded: false,
            exhausted: false,
            first_child,
        }
    }
}

/// A fixed-capacity stack of the currently open containers on the decoder side. The depth of
/// the stack is the current nesting level; level 0 is the top of the input.
#[derive(Debug, Clone)]
pub(crate) struct DecodeNesting {
    frames: [DecodeFrame; MAX_ARRAY_NESTING],
    depth: usize,
}

impl DecodeNesting {
    pub fn new() -> DecodeNesting {
        DecodeNesting {
            frames: [DecodeFrame::definite(false, 0, 0, 0); MAX_ARRAY_NESTING],
            depth: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    /// The current nesting level.
    #[inline]
    pub fn level(&self) -> u8 {
        self.depth as u8
    }

    pub fn push(&mut self, frame: DecodeFrame) -> Result<()> {
        if self.depth == MAX_ARRAY_NESTING {
            return Err(CBORError::NestingTooDeep);
        }
        self.frames[self.depth] = frame;
        self.depth += 1;
        Ok(())
    }

    /// Remove the innermost frame. Only legal on a non-empty stack.
    pub fn pop(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
    }

    #[inline]
    pub fn top(&self) -> Option<&DecodeFrame> {
        if self.depth == 0 {
            None
        } else {
            Some(&self.frames[self.depth - 1])
        }
    }

    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut DecodeFrame> {
        if self.depth == 0 {
            None
        } else {
            Some(&mut self.frames[self.depth - 1])
        }
    }

    /// Return `true` when some open frame has been entered in map mode.
    pub fn has_bounded(&self) -> bool {
        self.frames[..self.depth].iter().any(|f| f.bounded)
    }

    /// The innermost entered frame, if any.
    pub fn innermost_bounded(&self) -> Option<&DecodeFrame> {
        self.frames[..self.depth].iter().rev().find(|f| f.bounded)
    }

    /// Drop every frame above the innermost bounded frame. Used when rewinding an entered
    /// container whose traversal stopped part-way into a child container.
    pub fn truncate_to_bounded(&mut self) {
        while self.depth > 0 && !self.frames[self.depth - 1].bounded {
            self.depth -= 1;
        }
    }
}
