// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{DecodedFrame, LjpegDecoderOptions, Plane, SampleSink};
use crate::{
    error::{Error, Result},
    frame::RowDecoder,
    headers::FrameHeader,
    util::tracing_wrappers::*,
};

/// Decodes one lossless-JPEG stream held in memory.
///
/// The decoder borrows the stream and keeps no state between calls, so
/// independent decoders may run on separate threads.
#[derive(Debug)]
pub struct LjpegDecoder<'a> {
    data: &'a [u8],
    options: LjpegDecoderOptions,
}

impl<'a> LjpegDecoder<'a> {
    pub fn new(data: &'a [u8], options: LjpegDecoderOptions) -> LjpegDecoder<'a> {
        LjpegDecoder { data, options }
    }

    pub fn options(&self) -> &LjpegDecoderOptions {
        &self.options
    }

    /// Reads the frame geometry without building Huffman tables or decoding
    /// any rows.
    pub fn read_header(&self) -> Result<FrameHeader> {
        let header = FrameHeader::read(self.data, true)?;
        header.check_dimensions(self.options.width_hint, self.options.height_hint)?;
        Ok(header)
    }

    /// Decodes every row into `sink` and returns the header.
    ///
    /// If the stream ends early, the row it ends in is still delivered, with
    /// the missing samples set to 0, before [`Error::Truncated`] is returned.
    /// With `info_only` set, this is [`LjpegDecoder::read_header`].
    pub fn decode(&self, sink: &mut impl SampleSink) -> Result<FrameHeader> {
        if self.options.info_only {
            return self.read_header();
        }
        let header = self.prepare()?;
        self.decode_rows(&header, sink)?;
        Ok(header)
    }

    /// Decodes the whole frame into a newly allocated plane. Ignores
    /// `info_only`.
    pub fn decode_to_plane(&self) -> Result<DecodedFrame> {
        let header = self.prepare()?;
        let mut plane = Plane::for_header(&header)?;
        self.decode_rows(&header, &mut plane)?;
        Ok(DecodedFrame {
            header,
            plane,
            tile_width: self.options.tile_width,
        })
    }

    fn prepare(&self) -> Result<FrameHeader> {
        let header = FrameHeader::read(self.data, false)?;
        header.check_dimensions(self.options.width_hint, self.options.height_hint)?;
        self.options.limits.check(&header)?;
        Ok(header)
    }

    fn decode_rows(&self, header: &FrameHeader, sink: &mut impl SampleSink) -> Result<()> {
        let mut rows = RowDecoder::new(header, self.data, self.options.allow_length16_sentinel)?;
        let count = header.component_count();
        for row in 0..header.height() {
            if self
                .options
                .cancellation
                .as_ref()
                .is_some_and(|token| token.is_cancelled())
            {
                debug!("cancelled before row {row}");
                return Err(Error::Cancelled);
            }
            match rows.decode_row(row) {
                Ok(samples) => deliver(sink, row, count, samples),
                Err(err) => {
                    if let Error::Truncated { .. } = err {
                        deliver(sink, row, count, rows.last_row());
                    }
                    warn!("decode failed: {err}");
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

fn deliver(sink: &mut impl SampleSink, row: usize, count: usize, samples: &[u16]) {
    for (column, block) in samples.chunks_exact(count).enumerate() {
        for (component, &value) in block.iter().enumerate() {
            sink.place_sample(row, column, component, value);
        }
    }
    sink.end_row(row);
}
