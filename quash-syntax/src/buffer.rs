// This file is part of quash, a job-control shell.
// Copyright (C) 2026 WATANABE Yuki
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Growable string storage used by the lexer.
//!
//! The expansion pass produces many short fragments per line. Instead of
//! allocating each fragment separately, [`StringBuffer`] stores all of them
//! back to back in a single byte buffer and remembers where each one ends.
//! Both the byte buffer and the offset table grow by doubling.

use std::ops::Range;

/// Buffer of interned strings
///
/// Strings are appended with [`push`](Self::push) and accessed by their
/// insertion index.
///
/// ```
/// # use quash_syntax::buffer::StringBuffer;
/// let mut buffer = StringBuffer::new();
/// assert_eq!(buffer.push("echo"), 0);
/// assert_eq!(buffer.push("hello"), 1);
/// assert_eq!(buffer.get(1), Some("hello"));
/// assert_eq!(buffer.iter().collect::<Vec<_>>(), ["echo", "hello"]);
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StringBuffer {
    bytes: String,
    ends: Vec<usize>,
}

impl StringBuffer {
    /// Initial capacity of the byte buffer
    pub const DEFAULT_BYTES: usize = 256;

    /// Initial capacity of the offset table
    pub const DEFAULT_STRINGS: usize = 8;

    /// Creates an empty buffer with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_BYTES, Self::DEFAULT_STRINGS)
    }

    /// Creates an empty buffer that can hold `bytes` bytes in `strings`
    /// strings without reallocating.
    #[must_use]
    pub fn with_capacity(bytes: usize, strings: usize) -> Self {
        StringBuffer {
            bytes: String::with_capacity(bytes),
            ends: Vec::with_capacity(strings),
        }
    }

    /// Appends a string and returns its index.
    pub fn push(&mut self, s: &str) -> usize {
        let needed = self.bytes.len() + s.len();
        if needed > self.bytes.capacity() {
            let target = needed.max(self.bytes.capacity() * 2);
            self.bytes.reserve_exact(target - self.bytes.len());
        }
        if self.ends.len() == self.ends.capacity() {
            let target = (self.ends.capacity() * 2).max(Self::DEFAULT_STRINGS);
            self.ends.reserve_exact(target - self.ends.len());
        }

        self.bytes.push_str(s);
        self.ends.push(self.bytes.len());
        self.ends.len() - 1
    }

    /// Returns the number of strings in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Tests whether the buffer contains no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the number of bytes the buffer can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    fn range(&self, index: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(index)?;
        let start = match index.checked_sub(1) {
            Some(previous) => self.ends[previous],
            None => 0,
        };
        Some(start..end)
    }

    /// Returns the string at the index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.range(index).map(|range| &self.bytes[range])
    }

    /// Returns an iterator over the strings in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        (0..self.ends.len()).map(move |index| {
            let start = index.checked_sub(1).map_or(0, |previous| self.ends[previous]);
            &self.bytes[start..self.ends[index]]
        })
    }

    /// Removes all strings, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.ends.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_distinct_entries() {
        let mut buffer = StringBuffer::new();
        buffer.push("");
        buffer.push("a");
        buffer.push("");
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.get(0), Some(""));
        assert_eq!(buffer.get(1), Some("a"));
        assert_eq!(buffer.get(2), Some(""));
        assert_eq!(buffer.get(3), None);
    }

    #[test]
    fn growth_doubles_capacity() {
        let mut buffer = StringBuffer::with_capacity(4, 1);
        buffer.push("abc");
        let before = buffer.capacity();
        buffer.push("de");
        assert!(buffer.capacity() >= before * 2, "{}", buffer.capacity());
        assert_eq!(buffer.iter().collect::<Vec<_>>(), ["abc", "de"]);
    }

    #[test]
    fn iter_knows_its_length() {
        let mut buffer = StringBuffer::new();
        buffer.push("a");
        buffer.push("");
        buffer.push("bc");
        let mut iter = buffer.iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some("a"));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.collect::<Vec<_>>(), ["", "bc"]);
    }

    #[test]
    fn large_string_exceeding_double() {
        let mut buffer = StringBuffer::with_capacity(2, 1);
        let long = "x".repeat(100);
        buffer.push(&long);
        assert_eq!(buffer.get(0), Some(long.as_str()));
        assert!(buffer.capacity() >= 100);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buffer = StringBuffer::new();
        for word in ["one", "two", "three"] {
            buffer.push(word);
        }
        let capacity = buffer.capacity();
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }
}
