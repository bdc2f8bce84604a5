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

// simulator.rs
//
// This file contains the access engine: the per-reference transition that
// consults the L1 set, the victim buffer and the prefetcher, and emits a
// delta of counters for the statistics aggregator. One simulator instance
// owns all of its storage structures; references are strictly sequential.

use log::debug;

use super::components::{CacheLine, CacheSet, VictimBuffer, VictimLine};
use super::config::CacheConfig;
use super::prefetcher::StridePrefetcher;
use super::stats::CacheStats;

/// The two demand reference kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    /// Map a trace tag character to an access kind. Anything other than
    /// 'r' or 'w' is rejected so malformed trace lines never reach the
    /// engine.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'r' => Some(AccessKind::Read),
            'w' => Some(AccessKind::Write),
            _ => None,
        }
    }
}

/// Counter delta produced by a single access.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessDelta {
    pub misses: u64,
    pub vc_misses: u64,
    pub writebacks: u64,
    pub useful_prefetches: u64,
    pub prefetch_blocks: u64,
}

/// A single-level set-associative cache with a fully-associative victim
/// buffer and a stride prefetcher. Tags and metadata only; no data array.
pub struct CacheSimulator {
    pub config: CacheConfig,
    pub sets: Vec<CacheSet>,
    pub victim_buffer: VictimBuffer,
    prefetcher: StridePrefetcher,
    pub stats: CacheStats,
}

impl CacheSimulator {
    pub fn new(config: CacheConfig) -> Self {
        let num_sets = config.num_sets();
        let associativity = config.associativity();
        let sets = (0..num_sets).map(|_| CacheSet::new(associativity)).collect();

        debug!(
            "Creating cache with {} sets of {} lines, {}-byte blocks, {} victim blocks, prefetch distance {}",
            num_sets,
            associativity,
            1u64 << config.b,
            config.v,
            config.k
        );

        Self {
            config,
            sets,
            victim_buffer: VictimBuffer::new(config.v),
            prefetcher: StridePrefetcher::new(config.k),
            stats: CacheStats::new(),
        }
    }

    /// Apply one demand reference and fold its counter delta into the
    /// running statistics.
    pub fn access(&mut self, kind: AccessKind, address: u64) {
        let delta = self.simulate(kind, address);
        self.stats.record(kind, &delta);
    }

    /// Return the counter bundle with all derived quantities filled in.
    /// The instance can keep accepting references afterwards; finalize
    /// reads a snapshot.
    pub fn finalize(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.complete(self.config.b, self.config.s);
        stats
    }

    fn simulate(&mut self, kind: AccessKind, address: u64) -> AccessDelta {
        let mut delta = AccessDelta::default();
        let (set_index, tag) = self.config.decode_address(address);
        let si = set_index as usize;

        if let Some(position) = self.sets[si].find(tag) {
            // L1 hit. The first demand touch on a prefetched line counts
            // as one useful prefetch and demotes the line to a normal one.
            let line = &mut self.sets[si].lines[position];
            if line.prefetched {
                line.prefetched = false;
                delta.useful_prefetches += 1;
            }
            self.sets[si].promote(position);
        } else if self.config.v == 0 {
            // L1 miss, victim buffer disabled: evict the LRU line when the
            // set is full and install the block at the MRU position.
            delta.misses += 1;
            delta.vc_misses += 1;
            if self.sets[si].is_full() {
                if let Some(victim) = self.sets[si].pop_lru() {
                    if victim.dirty {
                        delta.writebacks += 1;
                    }
                }
            }
            self.sets[si].insert_mru(CacheLine::demand(tag));
        } else {
            // L1 miss, victim buffer enabled: probe the buffer.
            delta.misses += 1;
            if let Some(position) = self.victim_buffer.find(set_index, tag) {
                // VC hit: the set must be full, otherwise the block could
                // not have been evicted into the buffer in the first place.
                debug_assert!(self.sets[si].is_full());
                let entry = &mut self.victim_buffer.entries[position];
                if entry.prefetched {
                    entry.prefetched = false;
                    delta.useful_prefetches += 1;
                }
                // Swap the hit entry with the L1 LRU line, keeping the
                // buffer order, then promote the rescued block to MRU.
                if let Some(lru) = self.sets[si].pop_lru() {
                    let rescued = self
                        .victim_buffer
                        .swap_at(position, VictimLine::evicted(lru, set_index));
                    self.sets[si].insert_mru(CacheLine {
                        tag: rescued.tag,
                        dirty: rescued.dirty,
                        prefetched: false,
                    });
                }
            } else {
                // VC miss: install the block at MRU, routing the displaced
                // LRU line through the buffer. A dirty line leaves the
                // hierarchy only when it falls out of the buffer.
                delta.vc_misses += 1;
                if self.sets[si].is_full() {
                    if self.victim_buffer.is_full() {
                        if let Some(oldest) = self.victim_buffer.pop_oldest() {
                            if oldest.dirty {
                                delta.writebacks += 1;
                            }
                        }
                    }
                    if let Some(lru) = self.sets[si].pop_lru() {
                        self.victim_buffer
                            .push_newest(VictimLine::evicted(lru, set_index));
                    }
                }
                self.sets[si].insert_mru(CacheLine::demand(tag));
            }
        }

        // A write dirties the accessed block; every path above leaves it
        // at the MRU position of its set.
        if kind == AccessKind::Write {
            if let Some(front) = self.sets[si].front_mut() {
                front.dirty = true;
            }
        }

        // The prefetcher sees every demand miss, including those rescued
        // by the victim buffer.
        if self.config.k > 0 && delta.misses > 0 {
            let targets = self
                .prefetcher
                .observe_miss(self.config.block_address(address));
            delta.prefetch_blocks += targets.len() as u64;
            for block in targets {
                self.install_prefetch(block, &mut delta);
            }
        }

        delta
    }

    /// Install one prefetched block. Prefetched lines land at the LRU
    /// position and earn MRU only on a demand touch.
    fn install_prefetch(&mut self, block: u64, delta: &mut AccessDelta) {
        let (set_index, tag) = self.config.decode_block(block);
        let si = set_index as usize;

        // Already resident in L1: leave ordering and flags alone.
        if self.sets[si].find(tag).is_some() {
            return;
        }

        if self.config.v == 0 {
            if self.sets[si].is_full() {
                if let Some(victim) = self.sets[si].pop_lru() {
                    if victim.dirty {
                        delta.writebacks += 1;
                    }
                }
            }
            self.sets[si].insert_lru(CacheLine::speculative(tag));
        } else if let Some(position) = self.victim_buffer.find(set_index, tag) {
            // Resident in the buffer: swap with the L1 LRU of the target
            // set, which must be full for the buffer to hold one of its
            // blocks. The line re-enters L1 marked prefetched, dirty flag
            // intact.
            debug_assert!(self.sets[si].is_full());
            if let Some(lru) = self.sets[si].pop_lru() {
                let rescued = self
                    .victim_buffer
                    .swap_at(position, VictimLine::evicted(lru, set_index));
                self.sets[si].insert_lru(CacheLine {
                    tag: rescued.tag,
                    dirty: rescued.dirty,
                    prefetched: true,
                });
            }
        } else {
            if self.sets[si].is_full() {
                if self.victim_buffer.is_full() {
                    if let Some(oldest) = self.victim_buffer.pop_oldest() {
                        if oldest.dirty {
                            delta.writebacks += 1;
                        }
                    }
                }
                if let Some(lru) = self.sets[si].pop_lru() {
                    self.victim_buffer
                        .push_newest(VictimLine::evicted(lru, set_index));
                }
            }
            self.sets[si].insert_lru(CacheLine::speculative(tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct_mapped() -> CacheSimulator {
        // 8 sets of 1, 2-byte blocks
        CacheSimulator::new(CacheConfig::new(4, 1, 0))
    }

    #[test]
    fn repeated_reads_hit() {
        let mut sim = direct_mapped();
        sim.access(AccessKind::Read, 0x0);
        sim.access(AccessKind::Read, 0x0);
        let stats = sim.finalize();
        assert_eq!(stats.reads, 2);
        assert_eq!(stats.read_misses, 1);
    }

    #[test]
    fn write_dirties_mru_line() {
        let mut sim = direct_mapped();
        sim.access(AccessKind::Write, 0x0);
        assert!(sim.sets[0].lines[0].dirty);
    }

    #[test]
    fn conflict_eviction_of_dirty_line_writes_back() {
        let mut sim = direct_mapped();
        sim.access(AccessKind::Write, 0x0); // set 0, tag 0, dirtied
        sim.access(AccessKind::Read, 0x10); // set 0, tag 1, evicts dirty line
        let stats = sim.finalize();
        assert_eq!(stats.write_backs, 1);
    }

    #[test]
    fn victim_buffer_rescue_is_not_a_combined_miss() {
        // Direct-mapped, 4 sets, 1-byte blocks, 2 victim blocks
        let config = CacheConfig::new(2, 0, 0).with_victim_blocks(2);
        let mut sim = CacheSimulator::new(config);
        sim.access(AccessKind::Read, 0); // set 0, tag 0
        sim.access(AccessKind::Read, 4); // evicts tag 0 into the buffer
        sim.access(AccessKind::Read, 0); // L1 miss, buffer hit
        let stats = sim.finalize();
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.vc_misses, 2);
        assert!(sim.victim_buffer.find(0, 1).is_some()); // tag 1 swapped out
    }

    #[test]
    fn prefetched_line_installs_at_lru() {
        // 32 sets, direct-mapped, 1-byte blocks, K=1
        let config = CacheConfig::new(5, 0, 0).with_prefetch_distance(1);
        let mut sim = CacheSimulator::new(config);
        sim.access(AccessKind::Read, 0);
        sim.access(AccessKind::Read, 4); // stride 4 recorded
        sim.access(AccessKind::Read, 8); // fires: block 12 prefetched
        assert!(sim.sets[12].lines[0].prefetched);
        let stats = sim.finalize();
        assert_eq!(stats.prefetched_blocks, 1);
        assert_eq!(stats.useful_prefetches, 0);
    }

    #[test]
    fn demand_touch_clears_prefetched_flag_once() {
        let config = CacheConfig::new(5, 0, 0).with_prefetch_distance(1);
        let mut sim = CacheSimulator::new(config);
        for addr in [0u64, 4, 8] {
            sim.access(AccessKind::Read, addr);
        }
        sim.access(AccessKind::Read, 12); // hit on the prefetched block
        sim.access(AccessKind::Read, 12); // plain hit, counted once only
        let stats = sim.finalize();
        assert_eq!(stats.useful_prefetches, 1);
        assert_eq!(stats.misses, 3);
    }
}
