// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// components.rs
//
// This file contains the storage structures of the simulator: the cache
// line and victim line records, the per-set LRU sequence, and the
// fully-associative FIFO victim buffer. Only tags and metadata are
// stored; there is no data array.

use std::collections::VecDeque;

/// One block in an L1 cache set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheLine {
    pub tag: u64,
    pub dirty: bool,
    pub prefetched: bool,
}

impl CacheLine {
    /// A line fetched from main memory on a demand miss.
    pub fn demand(tag: u64) -> Self {
        Self {
            tag,
            dirty: false,
            prefetched: false,
        }
    }

    /// A line installed speculatively by the prefetcher.
    pub fn speculative(tag: u64) -> Self {
        Self {
            tag,
            dirty: false,
            prefetched: true,
        }
    }
}

/// One block in the victim buffer. The set index is carried because the
/// buffer is fully associative across all sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VictimLine {
    pub tag: u64,
    pub set_index: u32,
    pub dirty: bool,
    pub prefetched: bool,
}

impl VictimLine {
    /// Capture a line evicted from the given L1 set, flags intact.
    pub fn evicted(line: CacheLine, set_index: u32) -> Self {
        Self {
            tag: line.tag,
            set_index,
            dirty: line.dirty,
            prefetched: line.prefetched,
        }
    }
}

/// One L1 set: an ordered sequence of at most `capacity` lines with the
/// MRU line at the front and the LRU line at the back.
#[derive(Clone, Debug)]
pub struct CacheSet {
    pub lines: VecDeque<CacheLine>,
    capacity: usize,
}

impl CacheSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Linear scan for a line with the given tag.
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| line.tag == tag)
    }

    /// Move the line at `position` to the MRU slot. The relative order of
    /// the other lines is preserved.
    pub fn promote(&mut self, position: usize) {
        if let Some(line) = self.lines.remove(position) {
            self.lines.push_front(line);
        }
    }

    /// Insert at the MRU position. The caller guarantees the tag is not
    /// already present.
    pub fn insert_mru(&mut self, line: CacheLine) {
        self.lines.push_front(line);
    }

    /// Insert at the LRU position. Used for prefetched lines so they do
    /// not displace hot demand lines on first install.
    pub fn insert_lru(&mut self, line: CacheLine) {
        self.lines.push_back(line);
    }

    /// Remove and return the LRU line.
    pub fn pop_lru(&mut self) -> Option<CacheLine> {
        self.lines.pop_back()
    }

    pub fn peek_lru(&self) -> Option<&CacheLine> {
        self.lines.back()
    }

    pub fn front_mut(&mut self) -> Option<&mut CacheLine> {
        self.lines.front_mut()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() == self.capacity
    }
}

/// The victim buffer: at most `capacity` entries, oldest insertion at the
/// front. FIFO on insertion; a hit does not reorder surviving entries.
#[derive(Clone, Debug)]
pub struct VictimBuffer {
    pub entries: VecDeque<VictimLine>,
    capacity: usize,
}

impl VictimBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Linear scan matching both the set index and the tag.
    pub fn find(&self, set_index: u32, tag: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.set_index == set_index && entry.tag == tag)
    }

    /// Replace the entry at `position` with `line` and return the old
    /// entry. The buffer's internal order is untouched, so the swapped-in
    /// line inherits the hit entry's age.
    pub fn swap_at(&mut self, position: usize, line: VictimLine) -> VictimLine {
        std::mem::replace(&mut self.entries[position], line)
    }

    /// Remove and return the oldest entry.
    pub fn pop_oldest(&mut self) -> Option<VictimLine> {
        self.entries.pop_front()
    }

    /// Append the newest entry at the back.
    pub fn push_newest(&mut self, line: VictimLine) {
        self.entries.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_promote_preserves_relative_order() {
        let mut set = CacheSet::new(4);
        set.insert_mru(CacheLine::demand(1));
        set.insert_mru(CacheLine::demand(2));
        set.insert_mru(CacheLine::demand(3)); // order: 3 2 1

        let pos = set.find(1).unwrap();
        set.promote(pos); // order: 1 3 2

        let tags: Vec<u64> = set.lines.iter().map(|l| l.tag).collect();
        assert_eq!(tags, vec![1, 3, 2]);
    }

    #[test]
    fn set_pop_lru_returns_back() {
        let mut set = CacheSet::new(2);
        set.insert_mru(CacheLine::demand(7));
        set.insert_mru(CacheLine::demand(8));
        assert!(set.is_full());
        assert_eq!(set.pop_lru().unwrap().tag, 7);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn set_insert_lru_lands_at_back() {
        let mut set = CacheSet::new(3);
        set.insert_mru(CacheLine::demand(1));
        set.insert_lru(CacheLine::speculative(2));
        assert_eq!(set.peek_lru().unwrap().tag, 2);
        assert!(set.peek_lru().unwrap().prefetched);
    }

    #[test]
    fn buffer_is_fifo_on_insertion() {
        let mut vb = VictimBuffer::new(2);
        vb.push_newest(VictimLine::evicted(CacheLine::demand(1), 0));
        vb.push_newest(VictimLine::evicted(CacheLine::demand(2), 3));
        assert!(vb.is_full());
        assert_eq!(vb.pop_oldest().unwrap().tag, 1);
        assert_eq!(vb.pop_oldest().unwrap().tag, 2);
    }

    #[test]
    fn buffer_find_matches_index_and_tag() {
        let mut vb = VictimBuffer::new(4);
        vb.push_newest(VictimLine::evicted(CacheLine::demand(5), 1));
        // Same tag under a different set index is a different block
        assert_eq!(vb.find(0, 5), None);
        assert_eq!(vb.find(1, 5), Some(0));
    }

    #[test]
    fn buffer_swap_keeps_position() {
        let mut vb = VictimBuffer::new(3);
        vb.push_newest(VictimLine::evicted(CacheLine::demand(1), 0));
        vb.push_newest(VictimLine::evicted(CacheLine::demand(2), 0));
        vb.push_newest(VictimLine::evicted(CacheLine::demand(3), 0));

        let old = vb.swap_at(1, VictimLine::evicted(CacheLine::demand(9), 0));
        assert_eq!(old.tag, 2);
        let tags: Vec<u64> = vb.entries.iter().map(|e| e.tag).collect();
        assert_eq!(tags, vec![1, 9, 3]);
    }

    #[test]
    fn zero_capacity_buffer_is_always_full() {
        let vb = VictimBuffer::new(0);
        assert!(vb.is_full());
        assert!(vb.is_empty());
    }
}
