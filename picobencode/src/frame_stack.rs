// SPDX-License-Identifier: Apache-2.0

//! Nesting state for the streaming parser.
//!
//! One [`Frame`] per open list or dictionary. A dictionary frame alternates between
//! expecting a key and expecting a value, and remembers the last key it accepted so the
//! next one can be checked for order and uniqueness. That key is the only payload the
//! streaming parser ever retains, so its memory stays proportional to nesting depth.

use alloc::vec::Vec;
use core::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    List,
    Dictionary,
}

#[derive(Debug)]
pub(crate) struct Frame {
    pub kind: FrameKind,
    /// Dictionaries only: the next byte string is a key. Always false for lists.
    pub expecting_key: bool,
    /// Dictionaries only: most recent accepted key. `None` until the first key.
    last_key: Option<Vec<u8>>,
}

/// Why a key was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOrder {
    Duplicate,
    Unsorted,
}

#[derive(Debug, Default)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            expecting_key: kind == FrameKind::Dictionary,
            last_key: None,
        });
    }

    /// Removes the innermost frame. Its stored key goes with it.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// True if the innermost frame is a dictionary waiting for a key.
    pub fn expects_key(&self) -> bool {
        self.frames.last().is_some_and(|frame| frame.expecting_key)
    }

    /// Validates and stores `key` in the innermost dictionary, which must be
    /// [expecting a key](Self::expects_key).
    pub fn record_key(&mut self, key: &[u8]) -> Result<(), KeyOrder> {
        let Some(frame) = self.frames.last_mut() else {
            return Ok(());
        };
        match &mut frame.last_key {
            Some(previous) => {
                match previous.as_slice().cmp(key) {
                    Ordering::Less => {}
                    Ordering::Equal => return Err(KeyOrder::Duplicate),
                    Ordering::Greater => return Err(KeyOrder::Unsorted),
                }
                previous.clear();
                previous.extend_from_slice(key);
            }
            None => frame.last_key = Some(key.to_vec()),
        }
        frame.expecting_key = false;
        Ok(())
    }

    /// Notes that a value finished inside the innermost frame. A dictionary that was
    /// waiting for a value goes back to waiting for a key.
    pub fn value_completed(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.kind == FrameKind::Dictionary {
                frame.expecting_key = true;
            }
        }
    }
}
