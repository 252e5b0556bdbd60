// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Temporary string pool for string-valued info queries
//!
//! String answers are written into one of a fixed ring of reusable buffers.
//! A returned string stays valid until the pool is asked for
//! [`TEMP_STRING_POOL_ENTRIES`] more strings; after that its buffer is
//! recycled. The pool is an explicit value owned by the caller, so two
//! callers never share buffers.
//!
//! ```
//! use devcore::core::device::string_pool::TempStringPool;
//!
//! let mut pool = TempStringPool::new();
//! let buffer = pool.acquire();
//! buffer.push_str("Z80");
//! assert_eq!(pool.current(), "Z80");
//! ```

/// Number of buffers in the ring
pub const TEMP_STRING_POOL_ENTRIES: usize = 16;

/// Capacity of each buffer in bytes, including room for a terminator
pub const MAX_STRING_LENGTH: usize = 256;

/// Ring of reusable string buffers
#[derive(Debug, Clone)]
pub struct TempStringPool {
    /// Preallocated buffers
    entries: Vec<String>,
    /// Total number of buffers handed out
    index: usize,
}

impl TempStringPool {
    /// Create a pool with every buffer preallocated
    pub fn new() -> Self {
        Self {
            entries: (0..TEMP_STRING_POOL_ENTRIES)
                .map(|_| String::with_capacity(MAX_STRING_LENGTH))
                .collect(),
            index: 0,
        }
    }

    /// Hand out the next buffer in the ring, cleared
    pub fn acquire(&mut self) -> &mut String {
        let slot = self.index % TEMP_STRING_POOL_ENTRIES;
        self.index = self.index.wrapping_add(1);
        let buffer = &mut self.entries[slot];
        buffer.clear();
        buffer
    }

    /// Slot index of the most recently acquired buffer
    pub fn last_slot(&self) -> usize {
        (self.index + TEMP_STRING_POOL_ENTRIES - 1) % TEMP_STRING_POOL_ENTRIES
    }

    /// Contents of the most recently acquired buffer
    pub fn current(&self) -> &str {
        &self.entries[self.last_slot()]
    }

    /// Number of buffers handed out so far
    pub fn acquired(&self) -> usize {
        self.index
    }

    /// Take the next buffer out of the ring so a device can fill it
    ///
    /// The buffer must be handed back with [`TempStringPool::store`] before
    /// the next call to `take_next`.
    pub(crate) fn take_next(&mut self) -> String {
        std::mem::take(self.acquire())
    }

    /// Put a filled buffer back into the slot it was taken from
    ///
    /// The contents are clipped to `MAX_STRING_LENGTH - 1` bytes on a
    /// character boundary.
    pub(crate) fn store(&mut self, mut value: String) -> &str {
        truncate_to_boundary(&mut value, MAX_STRING_LENGTH - 1);
        let slot = self.last_slot();
        self.entries[slot] = value;
        &self.entries[slot]
    }
}

impl Default for TempStringPool {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_to_boundary(value: &mut String, max: usize) {
    if value.len() <= max {
        return;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value.truncate(end);
}
