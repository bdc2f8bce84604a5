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

// config.rs
//
// This file contains the geometry configuration for the cache simulator
// and the address decoder derived from it. All log2 parameters are fixed
// at construction time.

use serde::{Deserialize, Serialize};

/// Default geometry: 32KB cache, 32-byte blocks, 8-way sets, 4 victim
/// blocks, prefetch distance 2.
pub const DEFAULT_C: u32 = 15;
pub const DEFAULT_B: u32 = 5;
pub const DEFAULT_S: u32 = 3;
pub const DEFAULT_V: usize = 4;
pub const DEFAULT_K: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CacheConfig {
    pub c: u32,   // log2 of total data capacity in bytes
    pub b: u32,   // log2 of block size in bytes
    pub s: u32,   // log2 of associativity
    pub v: usize, // victim buffer capacity in blocks (0 disables it)
    pub k: usize, // prefetch distance in blocks (0 disables prefetching)
}

impl CacheConfig {
    pub fn new(c: u32, b: u32, s: u32) -> Self {
        // Validate geometry
        assert!(c >= b + s, "Capacity must be at least block size * associativity");
        assert!(c < 64, "Capacity exponent must fit a 64-bit address");

        Self {
            c,
            b,
            s,
            v: 0,
            k: 0,
        }
    }

    pub fn with_victim_blocks(mut self, v: usize) -> Self {
        self.v = v;
        self
    }

    pub fn with_prefetch_distance(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Number of lines per set (2^S).
    pub fn associativity(&self) -> usize {
        1usize << self.s
    }

    /// Number of sets (2^(C-B-S)).
    pub fn num_sets(&self) -> usize {
        1usize << (self.c - self.b - self.s)
    }

    /// Block address: byte address with the offset bits discarded.
    pub fn block_address(&self, address: u64) -> u64 {
        address >> self.b
    }

    /// Decode a byte address into (set index, tag).
    pub fn decode_address(&self, address: u64) -> (u32, u64) {
        self.decode_block(self.block_address(address))
    }

    /// Decode a block address into (set index, tag). The tag covers all
    /// bits above the set index.
    pub fn decode_block(&self, block: u64) -> (u32, u64) {
        let index_bits = self.c - self.b - self.s;
        let set_index = (block & ((1u64 << index_bits) - 1)) as u32;
        let tag = block >> index_bits;
        (set_index, tag)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_C, DEFAULT_B, DEFAULT_S)
            .with_victim_blocks(DEFAULT_V)
            .with_prefetch_distance(DEFAULT_K)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_derivation() {
        let config = CacheConfig::new(15, 5, 3);
        assert_eq!(config.associativity(), 8);
        assert_eq!(config.num_sets(), 128);
    }

    #[test]
    fn decode_splits_offset_index_tag() {
        // C=4, B=1, S=0: 8 sets of 1, 2-byte blocks
        let config = CacheConfig::new(4, 1, 0);
        let (idx, tag) = config.decode_address(0x0);
        assert_eq!((idx, tag), (0, 0));
        let (idx, tag) = config.decode_address(0x2);
        assert_eq!((idx, tag), (1, 0));
        // Address 16 wraps back to set 0 with tag 1
        let (idx, tag) = config.decode_address(0x10);
        assert_eq!((idx, tag), (0, 1));
    }

    #[test]
    fn decode_fully_associative() {
        // S == C - B: a single set; the tag is the whole block address
        let config = CacheConfig::new(6, 2, 4);
        assert_eq!(config.num_sets(), 1);
        let (idx, tag) = config.decode_address(0xFC);
        assert_eq!(idx, 0);
        assert_eq!(tag, 0xFC >> 2);
    }

    #[test]
    #[should_panic]
    fn rejects_capacity_below_block_times_assoc() {
        let _ = CacheConfig::new(4, 3, 2);
    }
}
