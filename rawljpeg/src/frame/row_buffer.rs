// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::error::Result;

/// The row being reconstructed and the one above it, component-interleaved.
#[derive(Debug)]
pub struct RowBuffer {
    data: Vec<u16>,
    stride: usize,
}

impl RowBuffer {
    pub fn new(samples_per_row: usize) -> Result<RowBuffer> {
        let mut data = Vec::new();
        data.try_reserve_exact(samples_per_row * 2)?;
        data.resize(samples_per_row * 2, 0);
        Ok(RowBuffer {
            data,
            stride: samples_per_row,
        })
    }

    /// Returns the storage for `row` and the contents of `row - 1`.
    pub fn current_and_previous(&mut self, row: usize) -> (&mut [u16], &[u16]) {
        let (even, odd) = self.data.split_at_mut(self.stride);
        if row % 2 == 0 {
            (even, odd)
        } else {
            (odd, even)
        }
    }

    pub fn row(&self, row: usize) -> &[u16] {
        let start = (row % 2) * self.stride;
        &self.data[start..start + self.stride]
    }
}
