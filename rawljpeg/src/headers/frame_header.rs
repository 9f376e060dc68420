// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::sync::Arc;

use byteorder::{BigEndian, ByteOrder};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::{
    entropy_coding::huffman::HuffmanTable,
    error::{Error, Result},
    frame::predict::Predictor,
    headers::markers::*,
    util::tracing_wrappers::*,
};

/// DHT class bytes `0..=3` (DC) and `16..=19` (AC) index the slots directly.
pub const NUM_HUFFMAN_SLOTS: usize = 20;
pub const MAX_COMPONENTS: usize = 6;
pub const MAX_BIT_DEPTH: u32 = 16;
/// Marker segments allowed before start of scan.
pub const MAX_SEGMENTS: usize = 1024;

#[repr(u8)]
#[derive(Debug, FromPrimitive, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Baseline = 0xc0,
    ExtendedSequential = 0xc1,
    Lossless = 0xc3,
}

/// Frame component from the SOF segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: u8,
    pub h_samp_factor: u8,
    pub v_samp_factor: u8,
    pub quant_idx: u8,
}

/// Scan component from the SOS segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanComponent {
    pub id: u8,
    pub dc_table: u8,
    pub ac_table: u8,
}

/// Geometry and coding parameters of one lossless-JPEG frame.
#[derive(Debug, Clone)]
pub struct FrameHeader {
    algorithm: Algorithm,
    bit_depth: u32,
    component_count: usize,
    width: usize,
    height: usize,
    restart_interval: Option<u32>,
    quant_table: Option<[u16; 64]>,
    huffman_tables: [Option<Arc<HuffmanTable>>; NUM_HUFFMAN_SLOTS],
    sraw: usize,
    predictor: Predictor,
    point_transform: u8,
    components: Vec<ComponentInfo>,
    scan_components: Vec<ScanComponent>,
    scan_offset: usize,
}

#[derive(Default)]
struct HeaderParser {
    algorithm: Option<Algorithm>,
    bits: i32,
    width: usize,
    height: usize,
    sraw: usize,
    components: Vec<ComponentInfo>,
    restart_interval: Option<u32>,
    quant_table: Option<[u16; 64]>,
    huffman_tables: [Option<Arc<HuffmanTable>>; NUM_HUFFMAN_SLOTS],
    psv: u8,
    point_transform: u8,
    scan_components: Vec<ScanComponent>,
}

impl HeaderParser {
    fn read_frame(&mut self, marker: u16, segment: &[u8]) -> Result<()> {
        if segment.len() < 6 {
            return Err(Error::InvalidSegmentLength(marker, segment.len() + 2));
        }
        let num_components = segment[5] as usize;
        if segment.len() < 6 + 3 * num_components {
            return Err(Error::InvalidSegmentLength(marker, segment.len() + 2));
        }
        self.algorithm = Algorithm::from_u8(marker as u8);
        self.bits = segment[0] as i32;
        self.height = BigEndian::read_u16(&segment[1..]) as usize;
        self.width = BigEndian::read_u16(&segment[3..]) as usize;
        self.components = segment[6..6 + 3 * num_components]
            .chunks_exact(3)
            .map(|c| ComponentInfo {
                id: c[0],
                h_samp_factor: c[1] >> 4,
                v_samp_factor: c[1] & 15,
                quant_idx: c[2],
            })
            .collect();
        // Subsampled lossless streams code the extra luma samples of each
        // block as additional components.
        self.sraw = match (marker, self.components.first()) {
            (SOF3, Some(c)) => {
                ((c.h_samp_factor as i32 * c.v_samp_factor as i32 - 1) & 3) as usize
            }
            _ => 0,
        };
        Ok(())
    }

    fn read_huffman_tables(&mut self, mut segment: &[u8]) -> Result<()> {
        while let Some((&class, rest)) = segment.split_first() {
            if class & !0x13 != 0 {
                return Err(Error::InvalidHuffmanSlot(class));
            }
            segment = rest;
            let table = HuffmanTable::parse(&mut segment)?;
            trace!("huffman table {class}: {table:?}");
            self.huffman_tables[class as usize] = Some(Arc::new(table));
        }
        Ok(())
    }

    fn read_scan(&mut self, segment: &[u8]) -> Result<()> {
        let num_components = segment.first().copied().unwrap_or(0) as usize;
        if segment.len() < 4 + 2 * num_components {
            return Err(Error::InvalidSegmentLength(SOS, segment.len() + 2));
        }
        self.scan_components = segment[1..1 + 2 * num_components]
            .chunks_exact(2)
            .map(|c| ScanComponent {
                id: c[0],
                dc_table: c[1] >> 4,
                ac_table: c[1] & 15,
            })
            .collect();
        let params = &segment[1 + 2 * num_components..];
        self.psv = params[0];
        self.point_transform = params[2] & 15;
        self.bits -= self.point_transform as i32;
        Ok(())
    }

    fn read_quant_table(&mut self, segment: &[u8]) -> Result<()> {
        let Some((&pq_tq, values)) = segment.split_first() else {
            return Err(Error::InvalidSegmentLength(DQT, segment.len() + 2));
        };
        let wide = pq_tq >> 4 != 0;
        let needed = if wide { 128 } else { 64 };
        if values.len() < needed {
            return Err(Error::InvalidSegmentLength(DQT, segment.len() + 2));
        }
        self.quant_table = Some(array_init::array_init(|i| {
            if wide {
                BigEndian::read_u16(&values[2 * i..])
            } else {
                values[i] as u16
            }
        }));
        Ok(())
    }

    fn read_restart_interval(&mut self, segment: &[u8]) -> Result<()> {
        if segment.len() < 2 {
            return Err(Error::InvalidSegmentLength(DRI, segment.len() + 2));
        }
        let interval = BigEndian::read_u16(segment) as u32;
        self.restart_interval = (interval != 0).then_some(interval);
        Ok(())
    }

    fn finish(mut self, info_only: bool, scan_offset: usize) -> Result<FrameHeader> {
        let algorithm = self.algorithm.ok_or(Error::MissingFrameHeader)?;
        if !(1..=MAX_BIT_DEPTH as i32).contains(&self.bits) {
            return Err(Error::InvalidBitDepth(self.bits));
        }
        let component_count = self.components.len() + self.sraw;
        if !(1..=MAX_COMPONENTS).contains(&component_count) {
            return Err(Error::InvalidComponentCount(component_count));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidImageSize(self.width, self.height));
        }
        let predictor = Predictor::try_from(self.psv)?;

        if !info_only {
            if self.huffman_tables[0].is_none() {
                return Err(Error::MissingHuffmanTable(0));
            }
            let tables = &mut self.huffman_tables;
            for slot in 1..NUM_HUFFMAN_SLOTS {
                if tables[slot].is_none() {
                    tables[slot] = tables[slot - 1].clone();
                }
            }
            if self.sraw > 0 {
                for slot in 2..MAX_COMPONENTS {
                    tables[slot] = tables[1].clone();
                }
                for slot in 1..=self.sraw {
                    tables[slot] = tables[0].clone();
                }
            }
        }

        Ok(FrameHeader {
            algorithm,
            bit_depth: self.bits as u32,
            component_count,
            width: self.width,
            height: self.height,
            restart_interval: self.restart_interval,
            quant_table: self.quant_table,
            huffman_tables: self.huffman_tables,
            sraw: self.sraw,
            predictor,
            point_transform: self.point_transform,
            components: self.components,
            scan_components: self.scan_components,
            scan_offset,
        })
    }
}

impl FrameHeader {
    /// Parses marker segments from start of image up to and including start
    /// of scan. With `info_only`, Huffman tables are skipped and not required,
    /// and data ending after the frame segment but before start of scan still
    /// yields the frame geometry, with predictor 0 and no point transform.
    pub fn read(data: &[u8], info_only: bool) -> Result<FrameHeader> {
        if data.len() < 2 || BigEndian::read_u16(data) != SOI {
            return Err(Error::MissingStartOfImage(
                data.first().copied().unwrap_or(0),
                data.get(1).copied().unwrap_or(0),
            ));
        }
        let mut parser = HeaderParser::default();
        let mut pos = 2;
        let mut num_segments = 0;
        loop {
            if num_segments == MAX_SEGMENTS {
                return Err(Error::TooManySegments(MAX_SEGMENTS));
            }
            num_segments += 1;
            let geometry_known = info_only && parser.algorithm.is_some();
            if pos + 4 > data.len() {
                if geometry_known {
                    break;
                }
                return Err(Error::UnexpectedEndOfHeader);
            }
            let marker = BigEndian::read_u16(&data[pos..]);
            let len = BigEndian::read_u16(&data[pos + 2..]) as usize;
            if marker <= 0xff00 {
                return Err(Error::InvalidMarker(marker));
            }
            if len < 2 {
                return Err(Error::InvalidSegmentLength(marker, len));
            }
            let end = pos + 2 + len;
            if end > data.len() {
                if geometry_known {
                    break;
                }
                return Err(Error::SegmentTruncated(marker));
            }
            let segment = &data[pos + 4..end];
            debug!("segment {marker:04x} at {pos}, length {len}");
            match marker {
                SOF0 | SOF1 | SOF3 => parser.read_frame(marker, segment)?,
                DHT if !info_only => parser.read_huffman_tables(segment)?,
                SOS => parser.read_scan(segment)?,
                DQT => parser.read_quant_table(segment)?,
                DRI => parser.read_restart_interval(segment)?,
                _ => {}
            }
            pos = end;
            if marker == SOS {
                break;
            }
        }
        let header = parser.finish(info_only, pos)?;
        debug!(
            "frame {}x{}, {} components, {} bits, {:?}",
            header.width, header.height, header.component_count, header.bit_depth, header.predictor
        );
        Ok(header)
    }

    /// Checks the frame geometry against dimensions expected by the caller.
    pub fn check_dimensions(&self, width: Option<usize>, height: Option<usize>) -> Result<()> {
        let expected_width = width.unwrap_or(self.width);
        let expected_height = height.unwrap_or(self.height);
        if (expected_width, expected_height) != (self.width, self.height) {
            return Err(Error::DimensionMismatch(
                self.width,
                self.height,
                expected_width,
                expected_height,
            ));
        }
        Ok(())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Effective sample precision, after the scan's point transform.
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Components per column, including the luma components folded in for
    /// subsampled streams.
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    /// Columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples_per_row(&self) -> usize {
        self.width * self.component_count
    }

    /// Restart interval in columns, `None` when the stream has no restarts.
    pub fn restart_interval(&self) -> Option<u32> {
        self.restart_interval
    }

    /// Quantization coefficients in zig-zag order.
    pub fn quant_table(&self) -> Option<&[u16; 64]> {
        self.quant_table.as_ref()
    }

    pub fn huffman_table(&self, slot: usize) -> Option<&HuffmanTable> {
        self.huffman_tables.get(slot)?.as_deref()
    }

    pub fn sraw(&self) -> usize {
        self.sraw
    }

    pub fn predictor(&self) -> Predictor {
        self.predictor
    }

    pub fn point_transform(&self) -> u8 {
        self.point_transform
    }

    pub fn components(&self) -> &[ComponentInfo] {
        &self.components
    }

    pub fn scan_components(&self) -> &[ScanComponent] {
        &self.scan_components
    }

    /// Offset of the first entropy-coded byte after the SOS segment.
    pub fn scan_offset(&self) -> usize {
        self.scan_offset
    }
}
