// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

mod decoder;
mod limits;
mod options;
#[cfg(feature = "parallel")]
mod parallel;
mod sink;

pub use decoder::LjpegDecoder;
pub use limits::{CancellationToken, DecoderLimits};
pub use options::LjpegDecoderOptions;
#[cfg(feature = "parallel")]
pub use parallel::decode_tiles;
pub use sink::{DecodedFrame, Plane, SampleSink};
