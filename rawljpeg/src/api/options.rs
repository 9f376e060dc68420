// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{CancellationToken, DecoderLimits};

#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct LjpegDecoderOptions {
    /// Stop after the header: Huffman tables are neither built nor required.
    pub info_only: bool,
    /// Expected columns per row. A frame of a different width is rejected.
    pub width_hint: Option<usize>,
    /// Expected number of rows. A frame of a different height is rejected.
    pub height_hint: Option<usize>,
    /// Width of the tile this stream covers in the final image, for callers
    /// that assemble tiled sensors. Passed through to the decoded frame.
    pub tile_width: Option<usize>,
    /// Whether difference length 16 decodes to -32768. Some format revisions
    /// never emit it and treat it as corruption.
    pub allow_length16_sentinel: bool,
    pub limits: DecoderLimits,
    /// Polled once per row.
    pub cancellation: Option<CancellationToken>,
}

impl Default for LjpegDecoderOptions {
    fn default() -> Self {
        Self {
            info_only: false,
            width_hint: None,
            height_hint: None,
            tile_width: None,
            allow_length16_sentinel: true,
            limits: DecoderLimits::default(),
            cancellation: None,
        }
    }
}
