// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use rayon::prelude::*;

use super::{DecodedFrame, LjpegDecoder, LjpegDecoderOptions};
use crate::error::Result;

/// Decodes independent streams, such as the tiles of one sensor readout,
/// concurrently. Results are in the order of `tiles`.
pub fn decode_tiles(tiles: &[&[u8]], options: &LjpegDecoderOptions) -> Vec<Result<DecodedFrame>> {
    tiles
        .par_iter()
        .map(|data| LjpegDecoder::new(data, options.clone()).decode_to_plane())
        .collect()
}
