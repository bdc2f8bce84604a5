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

// stats.rs
//
// This file contains the statistics aggregator. Per-access deltas from
// the access engine are folded into the counter bundle; the derived
// quantities (rates, bytes transferred, average access time) are filled
// in at completion.

use serde::{Deserialize, Serialize};

use super::simulator::{AccessDelta, AccessKind};

/// Fixed L1 miss penalty in cycles.
pub const MISS_PENALTY: u64 = 200;

/// Counter bundle for a simulation run. All counters are u64 with wrap
/// semantics on overflow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub accesses: u64,
    pub reads: u64,
    pub read_misses: u64,
    pub read_misses_combined: u64,
    pub writes: u64,
    pub write_misses: u64,
    pub write_misses_combined: u64,
    pub misses: u64,
    pub write_backs: u64,
    pub vc_misses: u64,
    pub prefetched_blocks: u64,
    pub useful_prefetches: u64,
    pub bytes_transferred: u64,

    pub hit_time: f64,
    pub miss_rate: f64,
    pub miss_penalty: u64,
    pub avg_access_time: f64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one access delta into the running counters.
    pub fn record(&mut self, kind: AccessKind, delta: &AccessDelta) {
        match kind {
            AccessKind::Read => {
                self.reads = self.reads.wrapping_add(1);
                self.read_misses = self.read_misses.wrapping_add(delta.misses);
                self.read_misses_combined =
                    self.read_misses_combined.wrapping_add(delta.vc_misses);
            },
            AccessKind::Write => {
                self.writes = self.writes.wrapping_add(1);
                self.write_misses = self.write_misses.wrapping_add(delta.misses);
                self.write_misses_combined =
                    self.write_misses_combined.wrapping_add(delta.vc_misses);
            },
        }
        self.write_backs = self.write_backs.wrapping_add(delta.writebacks);
        self.prefetched_blocks = self.prefetched_blocks.wrapping_add(delta.prefetch_blocks);
        self.useful_prefetches = self.useful_prefetches.wrapping_add(delta.useful_prefetches);
    }

    /// Derive totals, rates and the average access time. The AAT charges
    /// victim-buffer hits at the hit time, so it is driven by the
    /// combined miss rate rather than the L1 miss rate.
    pub fn complete(&mut self, b: u32, s: u32) {
        self.accesses = self.reads.wrapping_add(self.writes);
        self.misses = self.read_misses.wrapping_add(self.write_misses);
        self.vc_misses = self
            .read_misses_combined
            .wrapping_add(self.write_misses_combined);
        self.bytes_transferred = (1u64 << b).wrapping_mul(
            self.vc_misses
                .wrapping_add(self.write_backs)
                .wrapping_add(self.prefetched_blocks),
        );

        self.hit_time = 2.0 + 0.2 * s as f64;
        self.miss_penalty = MISS_PENALTY;
        if self.accesses == 0 {
            self.miss_rate = 0.0;
            self.avg_access_time = self.hit_time;
        } else {
            self.miss_rate = self.misses as f64 / self.accesses as f64;
            let vc_miss_rate = self.vc_misses as f64 / self.accesses as f64;
            self.avg_access_time = self.hit_time + vc_miss_rate * self.miss_penalty as f64;
        }
    }
}
