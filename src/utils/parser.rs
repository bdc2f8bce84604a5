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

// parser.rs
//
// This file contains the trace-line parser. A trace line is
// "<rw> <hex_address>" where <rw> is 'r' or 'w' and <hex_address> is an
// unprefixed hexadecimal integer. Malformed lines become typed errors so
// the driver can skip them without touching any counters.

use crate::cache_simulator::simulator::AccessKind;
use crate::errors::SimulatorError;

/// One parsed trace reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    pub kind: AccessKind,
    pub address: u64,
}

/// Parse a single trace line.
pub fn parse_trace_line(line: &str) -> Result<TraceRecord, SimulatorError> {
    let mut fields = line.split_whitespace();

    let tag_field = fields.next().ok_or(SimulatorError::EmptyTraceLine)?;
    let mut tag_chars = tag_field.chars();
    let tag = tag_chars.next().ok_or(SimulatorError::EmptyTraceLine)?;
    if tag_chars.next().is_some() {
        return Err(SimulatorError::UnknownAccessTag(tag));
    }
    let kind = AccessKind::from_tag(tag).ok_or(SimulatorError::UnknownAccessTag(tag))?;

    let address_field = fields.next().ok_or(SimulatorError::MissingAddress)?;
    let address = u64::from_str_radix(address_field, 16)
        .map_err(|_| SimulatorError::InvalidAddress(address_field.to_string()))?;

    Ok(TraceRecord { kind, address })
}

/// Parse a whole trace, silently dropping lines that do not parse. Used
/// by the sweep harness, which replays the same trace many times.
pub fn parse_trace(text: &str) -> Vec<TraceRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_trace_line(line).ok())
        .collect()
}
