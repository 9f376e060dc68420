// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Synthesizes lossless-JPEG streams for decoder tests.

mod bit_writer;

pub use bit_writer::BitWriter;

pub const SOI: u16 = 0xffd8;
pub const EOI: u16 = 0xffd9;
pub const SOF3: u16 = 0xffc3;
pub const DHT: u16 = 0xffc4;
pub const SOS: u16 = 0xffda;
pub const DRI: u16 = 0xffdd;
pub const RST0: u16 = 0xffd0;

/// Difference that length category 16 stands for.
pub const LENGTH16_DIFFERENCE: i32 = -32768;

/// Marker segment with its big-endian length prefix.
pub fn segment(marker: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = marker.to_be_bytes().to_vec();
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

/// A canonical Huffman code given as counts per length and symbols in code
/// order, as carried by a DHT segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanSpec {
    pub counts: [u8; 16],
    pub symbols: Vec<u8>,
}

impl Default for HuffmanSpec {
    /// Codes every difference length `0..=16`: one code of length 2, four of
    /// length 3, then one each of lengths 4 to 15.
    fn default() -> HuffmanSpec {
        let mut counts = [0u8; 16];
        counts[1] = 1;
        counts[2] = 4;
        for count in &mut counts[3..15] {
            *count = 1;
        }
        HuffmanSpec {
            counts,
            symbols: (0..=16).collect(),
        }
    }
}

impl HuffmanSpec {
    /// A table whose only code is `0`, of length 1, for `symbol`.
    pub fn single(symbol: u8) -> HuffmanSpec {
        let mut counts = [0u8; 16];
        counts[0] = 1;
        HuffmanSpec {
            counts,
            symbols: vec![symbol],
        }
    }

    /// `(symbol, length, code)` for every code, in canonical order.
    pub fn codes(&self) -> Vec<(u8, usize, u32)> {
        let mut codes = vec![];
        let mut symbols = self.symbols.iter();
        let mut code = 0u32;
        for len in 1..=16 {
            for _ in 0..self.counts[len - 1] {
                let symbol = *symbols.next().expect("fewer symbols than counts");
                codes.push((symbol, len, code));
                code += 1;
            }
            code <<= 1;
        }
        codes
    }

    pub fn code_for(&self, symbol: u8) -> (usize, u32) {
        self.codes()
            .into_iter()
            .find(|&(s, _, _)| s == symbol)
            .map(|(_, len, code)| (len, code))
            .unwrap_or_else(|| panic!("symbol {symbol} has no code"))
    }

    /// DHT payload for this table with the given class byte.
    pub fn dht_payload(&self, class: u8) -> Vec<u8> {
        let mut out = vec![class];
        out.extend_from_slice(&self.counts);
        out.extend_from_slice(&self.symbols);
        out
    }
}

/// Writes a single-scan lossless-JPEG stream from samples, predicting them
/// the same way a camera encoder does.
#[derive(Debug, Clone)]
pub struct LjpegWriter {
    width: u16,
    height: u16,
    bit_depth: u8,
    sampling: Vec<u8>,
    predictor: u8,
    point_transform: u8,
    restart_interval: Option<u16>,
    tables: Vec<HuffmanSpec>,
    segments: Vec<(u16, Vec<u8>)>,
    omit_restart: Option<usize>,
}

impl LjpegWriter {
    /// One component at `bit_depth` effective bits, left prediction, and
    /// the default Huffman table.
    pub fn new(width: u16, height: u16, bit_depth: u8) -> LjpegWriter {
        LjpegWriter {
            width,
            height,
            bit_depth,
            sampling: vec![0x11],
            predictor: 1,
            point_transform: 0,
            restart_interval: None,
            tables: vec![HuffmanSpec::default()],
            segments: vec![],
            omit_restart: None,
        }
    }

    /// Sampling byte of each SOF component. A first component sampled at
    /// more than 1x1 makes the stream subsampled.
    pub fn sampling(mut self, sampling: &[u8]) -> Self {
        self.sampling = sampling.to_vec();
        self
    }

    pub fn predictor(mut self, psv: u8) -> Self {
        self.predictor = psv;
        self
    }

    pub fn point_transform(mut self, al: u8) -> Self {
        self.point_transform = al;
        self
    }

    pub fn restart_interval(mut self, interval: u16) -> Self {
        self.restart_interval = Some(interval);
        self
    }

    /// Tables for DHT classes `0..tables.len()`.
    pub fn tables(mut self, tables: Vec<HuffmanSpec>) -> Self {
        assert!(!tables.is_empty());
        self.tables = tables;
        self
    }

    /// Adds a marker segment right after SOI.
    pub fn segment(mut self, marker: u16, payload: &[u8]) -> Self {
        self.segments.push((marker, payload.to_vec()));
        self
    }

    /// Leaves out the `index`-th restart marker (counting from 0) while still
    /// restarting prediction there.
    pub fn omit_restart(mut self, index: usize) -> Self {
        self.omit_restart = Some(index);
        self
    }

    pub fn sraw(&self) -> usize {
        let first = self.sampling.first().copied().unwrap_or(0x11);
        let blocks = (first >> 4) as usize * (first & 15) as usize;
        blocks.wrapping_sub(1) & 3
    }

    pub fn component_count(&self) -> usize {
        self.sampling.len() + self.sraw()
    }

    pub fn samples_per_row(&self) -> usize {
        self.width as usize * self.component_count()
    }

    /// Everything from SOI up to and including SOS.
    pub fn header(&self) -> Vec<u8> {
        let mut out = SOI.to_be_bytes().to_vec();
        for (marker, payload) in &self.segments {
            out.extend(segment(*marker, payload));
        }
        if let Some(interval) = self.restart_interval {
            out.extend(segment(DRI, &interval.to_be_bytes()));
        }

        let mut sof = vec![self.bit_depth + self.point_transform];
        sof.extend_from_slice(&self.height.to_be_bytes());
        sof.extend_from_slice(&self.width.to_be_bytes());
        sof.push(self.sampling.len() as u8);
        for (i, &s) in self.sampling.iter().enumerate() {
            sof.extend_from_slice(&[i as u8 + 1, s, 0]);
        }
        out.extend(segment(SOF3, &sof));

        let mut dht = vec![];
        for (class, table) in self.tables.iter().enumerate() {
            dht.extend(table.dht_payload(class as u8));
        }
        out.extend(segment(DHT, &dht));

        let mut sos = vec![self.sampling.len() as u8];
        for i in 0..self.sampling.len() {
            let table = i.min(self.tables.len() - 1) as u8;
            sos.extend_from_slice(&[i as u8 + 1, table << 4]);
        }
        sos.extend_from_slice(&[self.predictor, 0, self.point_transform]);
        out.extend(segment(SOS, &sos));
        out
    }

    /// Encodes `samples`, row-major and component-interleaved, into a
    /// complete stream.
    pub fn encode(&self, samples: &[u16]) -> Vec<u8> {
        self.encode_differences(&self.differences(samples))
    }

    /// Prediction residuals of `samples`.
    pub fn differences(&self, samples: &[u16]) -> Vec<i32> {
        let stride = self.samples_per_row();
        let count = self.component_count();
        let sraw = self.sraw();
        assert_eq!(samples.len(), stride * self.height as usize);
        let mut diffs = Vec::with_capacity(samples.len());
        let mut vpred = [0i32; 6];
        for row in 0..self.height as usize {
            if self.starts_interval(row) {
                vpred = [1 << (self.bit_depth - 1); 6];
            }
            let cur = &samples[row * stride..][..stride];
            let mut luma_pred = 0;
            for col in 0..self.width as usize {
                for c in 0..count {
                    let pos = col * count + c;
                    let value = cur[pos] as i32;
                    let mut pred = if sraw > 0 && c <= sraw && (col | c) != 0 {
                        luma_pred
                    } else if col > 0 {
                        cur[pos - count] as i32
                    } else {
                        let seed = vpred[c];
                        vpred[c] = value;
                        seed
                    };
                    if row > 0 && col > 0 {
                        let prev = &samples[(row - 1) * stride..][..stride];
                        let top = prev[pos] as i32;
                        let top_left = prev[pos - count] as i32;
                        pred = predict(self.predictor, pred, top, top_left);
                    }
                    diffs.push(value - pred);
                    if sraw > 0 && c <= sraw {
                        luma_pred = value;
                    }
                }
            }
        }
        diffs
    }

    /// Entropy-codes residuals laid out like the samples, with restart
    /// markers at interval boundaries, followed by EOI.
    pub fn encode_differences(&self, diffs: &[i32]) -> Vec<u8> {
        let stride = self.samples_per_row();
        let count = self.component_count();
        let mut bw = BitWriter::new();
        let mut restarts = 0;
        for (row, row_diffs) in diffs.chunks(stride).enumerate() {
            if row > 0 && self.starts_interval(row) {
                if self.omit_restart == Some(restarts) {
                    bw.pad_to_byte();
                } else {
                    bw.write_raw(&(RST0 + (restarts % 8) as u16).to_be_bytes());
                }
                restarts += 1;
            }
            for (pos, &diff) in row_diffs.iter().enumerate() {
                self.write_difference(&mut bw, pos % count, diff);
            }
        }
        let mut out = self.header();
        out.extend(bw.finish());
        out.extend_from_slice(&EOI.to_be_bytes());
        out
    }

    fn starts_interval(&self, row: usize) -> bool {
        match self.restart_interval {
            None | Some(0) => row == 0,
            Some(interval) => (row * self.width as usize) % interval as usize == 0,
        }
    }

    fn table_for(&self, component: usize) -> &HuffmanSpec {
        let last = self.tables.len() - 1;
        let sraw = self.sraw();
        let slot = match sraw {
            0 => component.min(last),
            _ if component <= sraw => 0,
            _ => last.min(1),
        };
        &self.tables[slot]
    }

    fn write_difference(&self, bw: &mut BitWriter, component: usize, diff: i32) {
        let table = self.table_for(component);
        if diff == LENGTH16_DIFFERENCE {
            let (len, code) = table.code_for(16);
            bw.write(len, code);
            return;
        }
        let len = 32 - diff.unsigned_abs().leading_zeros() as usize;
        assert!(len < 16, "difference {diff} cannot be coded");
        let (code_len, code) = table.code_for(len as u8);
        bw.write(code_len, code);
        let raw = if diff < 0 { diff + (1 << len) - 1 } else { diff };
        bw.write(len, raw as u32);
    }
}

fn predict(psv: u8, left: i32, top: i32, top_left: i32) -> i32 {
    match psv {
        0 => 0,
        1 => left,
        2 => top,
        3 => top_left,
        4 => left + top - top_left,
        5 => left + ((top - top_left) >> 1),
        6 => top + ((left - top_left) >> 1),
        7 => (left + top) >> 1,
        _ => panic!("predictor {psv} out of range"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_table_is_canonical() {
        let codes = HuffmanSpec::default().codes();
        assert_eq!(codes.len(), 17);
        assert_eq!(codes[0], (0, 2, 0b00));
        assert_eq!(codes[1], (1, 3, 0b010));
        assert_eq!(codes[4], (4, 3, 0b101));
        assert_eq!(codes[5], (5, 4, 0b1100));
        assert_eq!(codes[16], (16, 15, 0b110_1111_1111_1110));
    }

    #[test]
    fn single_symbol_stream() {
        let writer = LjpegWriter::new(4, 2, 8).tables(vec![HuffmanSpec::single(0)]);
        let data = writer.encode(&[128; 8]);
        let header = writer.header();
        assert_eq!(&data[..header.len()], &header[..]);
        assert_eq!(&data[header.len()..], &[0x00, 0xff, 0xd9]);
    }

    #[test]
    fn residuals_reset_at_restarts() {
        let writer = LjpegWriter::new(2, 2, 8).restart_interval(2);
        let diffs = writer.differences(&[130, 131, 129, 129]);
        assert_eq!(diffs, vec![2, 1, 1, 0]);
        let writer = LjpegWriter::new(2, 2, 8);
        let diffs = writer.differences(&[130, 131, 129, 129]);
        assert_eq!(diffs, vec![2, 1, -1, 0]);
    }

    #[test]
    fn restart_markers_cycle() {
        let writer = LjpegWriter::new(1, 10, 8).restart_interval(1);
        let data = writer.encode(&[128; 10]);
        let markers: Vec<u8> = data
            .windows(2)
            .filter(|w| w[0] == 0xff && (0xd0..=0xd7).contains(&w[1]))
            .map(|w| w[1] - 0xd0)
            .collect();
        assert_eq!(markers, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }
}
