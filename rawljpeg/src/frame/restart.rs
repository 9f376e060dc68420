// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    bit_reader::BitReader,
    error::{Error, Result},
    headers::markers::{NUM_RESTART_MARKERS, RST0, next_marker},
    util::tracing_wrappers::*,
};

/// Tracks restart intervals of an entropy-coded segment and the `RSTn`
/// marker expected at the next boundary.
#[derive(Debug)]
pub struct RestartTracker {
    interval: Option<usize>,
    next_index: u8,
    segment_start: usize,
}

impl RestartTracker {
    pub fn new(interval: Option<u32>, scan_offset: usize) -> RestartTracker {
        RestartTracker {
            interval: interval.map(|i| i as usize),
            next_index: 0,
            segment_start: scan_offset,
        }
    }

    /// Whether `row` begins a new restart interval. Intervals count columns
    /// and are only honored at row starts.
    pub fn starts_interval(&self, row: usize, width: usize) -> bool {
        match self.interval {
            None => row == 0,
            Some(interval) => (row * width) % interval == 0,
        }
    }

    /// Positions `br` just past the restart marker that ends the current
    /// interval.
    pub fn resync(&mut self, br: &mut BitReader, row: usize) -> Result<()> {
        // The reader never consumes a marker, but may have stopped up to two
        // bytes short of it; never look back into the previous interval.
        let from = br.byte_position().saturating_sub(2).max(self.segment_start);
        let expected = RST0 + self.next_index as u16;
        match next_marker(br.data(), from) {
            Some((marker, end)) if marker == expected => {
                debug!("RST{} for row {row} at {}", self.next_index, end - 2);
                br.reset_at(end);
                self.segment_start = end;
                self.next_index = (self.next_index + 1) % NUM_RESTART_MARKERS;
                Ok(())
            }
            _ => {
                warn!("RST{} not found before row {row}", self.next_index);
                Err(Error::SyncLost {
                    row,
                    marker: self.next_index,
                })
            }
        }
    }
}
