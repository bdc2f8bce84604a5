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

// prefetcher.rs
//
// This file contains the stride-detecting sequential prefetcher. The
// stride between consecutive demand-miss block addresses is tracked as an
// unsigned magnitude plus a sign bit; when the same signed stride repeats,
// the prefetcher issues the next K blocks along that stride.

/// Stride prefetcher state. `stride_sign` is true for the non-negative
/// direction.
#[derive(Clone, Debug)]
pub struct StridePrefetcher {
    distance: usize,
    last_miss_block: u64,
    pending_stride: u64,
    stride_sign: bool,
}

impl StridePrefetcher {
    pub fn new(distance: usize) -> Self {
        Self {
            distance,
            last_miss_block: 0,
            pending_stride: 0,
            stride_sign: true,
        }
    }

    /// Record a demand miss at `block` and return the block addresses to
    /// prefetch. The returned list is empty unless the signed stride from
    /// the previous miss matches the pending one; state is updated either
    /// way. Target generation wraps in unsigned arithmetic.
    pub fn observe_miss(&mut self, block: u64) -> Vec<u64> {
        let sign = block > self.last_miss_block;
        let stride = if sign {
            block - self.last_miss_block
        } else {
            self.last_miss_block - block
        };

        let mut targets = Vec::new();
        if sign == self.stride_sign && stride == self.pending_stride {
            let mut addr = block;
            for _ in 0..self.distance {
                addr = if sign {
                    addr.wrapping_add(stride)
                } else {
                    addr.wrapping_sub(stride)
                };
                targets.push(addr);
            }
        }

        self.pending_stride = stride;
        self.stride_sign = sign;
        self.last_miss_block = block;

        targets
    }
}
