// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    bit_reader::BitReader,
    entropy_coding::{difference::read_difference, huffman::HuffmanTable},
    error::{Error, Result},
    headers::frame_header::{FrameHeader, MAX_COMPONENTS},
    util::tracing_wrappers::*,
};

use super::{restart::RestartTracker, row_buffer::RowBuffer};

/// How the components of one column relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentLayout {
    /// Every component predicts from its own left neighbour.
    Interleaved,
    /// Components `0..=luma` are the luma samples of one subsampled block;
    /// each predicts from the luma sample decoded just before it.
    Subsampled { luma: usize },
}

impl ComponentLayout {
    pub fn for_header(header: &FrameHeader) -> ComponentLayout {
        match header.sraw() {
            0 => ComponentLayout::Interleaved,
            luma => ComponentLayout::Subsampled { luma },
        }
    }

    fn is_luma(self, component: usize) -> bool {
        match self {
            ComponentLayout::Interleaved => component == 0,
            ComponentLayout::Subsampled { luma } => component <= luma,
        }
    }
}

/// Reconstructs the rows of one frame, in order, from its entropy-coded
/// data.
#[derive(Debug)]
pub struct RowDecoder<'a> {
    header: &'a FrameHeader,
    br: BitReader<'a>,
    tables: Vec<&'a HuffmanTable>,
    layout: ComponentLayout,
    rows: RowBuffer,
    vpred: [i32; MAX_COMPONENTS],
    restarts: RestartTracker,
    allow_length16_sentinel: bool,
    next_row: usize,
}

impl<'a> RowDecoder<'a> {
    /// `data` is the stream `header` was read from.
    pub fn new(
        header: &'a FrameHeader,
        data: &'a [u8],
        allow_length16_sentinel: bool,
    ) -> Result<RowDecoder<'a>> {
        let tables = (0..header.component_count())
            .map(|c| header.huffman_table(c).ok_or(Error::MissingHuffmanTable(c)))
            .collect::<Result<Vec<_>>>()?;
        let mut br = BitReader::new_jpeg(data);
        br.reset_at(header.scan_offset());
        Ok(RowDecoder {
            header,
            br,
            tables,
            layout: ComponentLayout::for_header(header),
            rows: RowBuffer::new(header.samples_per_row())?,
            vpred: [0; MAX_COMPONENTS],
            restarts: RestartTracker::new(header.restart_interval(), header.scan_offset()),
            allow_length16_sentinel,
            next_row: 0,
        })
    }

    pub fn header(&self) -> &'a FrameHeader {
        self.header
    }

    pub fn layout(&self) -> ComponentLayout {
        self.layout
    }

    /// Index of the row the next call to `decode_row` must ask for.
    pub fn next_row(&self) -> usize {
        self.next_row
    }

    /// The most recently decoded row. After a `Truncated` error, this is the
    /// partial row with every sample past the truncation point set to 0.
    pub fn last_row(&self) -> &[u16] {
        self.rows.row(self.next_row.saturating_sub(1))
    }

    /// Decodes row `row`, which must be the row following the previous call.
    pub fn decode_row(&mut self, row: usize) -> Result<&[u16]> {
        assert_eq!(row, self.next_row, "rows must be decoded in order");
        assert!(row < self.header.height());
        let width = self.header.width();
        let count = self.header.component_count();
        let bit_depth = self.header.bit_depth();
        let predictor = self.header.predictor();

        if self.restarts.starts_interval(row, width) {
            self.vpred = [1 << (bit_depth - 1); MAX_COMPONENTS];
            if row > 0 {
                self.restarts.resync(&mut self.br, row)?;
            } else {
                self.br.reset();
            }
        }

        self.next_row += 1;
        let (cur, prev) = self.rows.current_and_previous(row);
        let mut luma_pred = 0;
        for col in 0..width {
            for c in 0..count {
                let pos = col * count + c;
                let result =
                    read_difference(&mut self.br, self.tables[c], self.allow_length16_sentinel);
                // Canonical codes fill the code space from zero, so a window
                // completed with zero padding that matches no code is corrupt
                // whatever bits would have followed.
                if self.br.is_overrun() {
                    cur[pos..].fill(0);
                    debug!("stream truncated at row {row}, column {col}");
                    return Err(Error::Truncated { row, column: col });
                }
                let diff = result?;

                let mut pred = match self.layout {
                    ComponentLayout::Subsampled { luma } if c <= luma && (col | c) != 0 => {
                        luma_pred
                    }
                    _ if col > 0 => cur[pos - count] as i32,
                    _ => {
                        // The first column predicts from the first column of
                        // the row above, or the seed after a restart.
                        let seed = self.vpred[c];
                        self.vpred[c] += diff;
                        seed
                    }
                };
                if row > 0 && col > 0 {
                    pred = predictor.predict(pred, prev[pos] as i32, prev[pos - count] as i32);
                }

                let value = pred + diff;
                if value < 0 || value >= 1 << bit_depth {
                    return Err(Error::SampleOverflow {
                        value,
                        bit_depth,
                        row,
                        column: col,
                        component: c,
                    });
                }
                cur[pos] = value as u16;
                if self.layout.is_luma(c) {
                    luma_pred = value;
                }
            }
        }
        trace!("decoded row {row}");
        Ok(self.rows.row(row))
    }
}
