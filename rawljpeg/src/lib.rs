// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoder for the lossless-JPEG bitstreams that carry compressed camera RAW
//! pixel data.
//!
//! ```
//! use rawljpeg::api::{LjpegDecoder, LjpegDecoderOptions};
//!
//! // 8-bit 4x2 frame whose only Huffman code means "difference 0".
//! let mut data = vec![0xff, 0xd8];
//! data.extend([0xff, 0xc3, 0, 11, 8, 0, 2, 0, 4, 1, 1, 0x11, 0]);
//! data.extend([0xff, 0xc4, 0, 20, 0, 1]);
//! data.extend([0; 15]);
//! data.push(0);
//! data.extend([0xff, 0xda, 0, 8, 1, 1, 0, 1, 0, 0]);
//! data.extend([0x00, 0xff, 0xd9]);
//!
//! let frame = LjpegDecoder::new(&data, LjpegDecoderOptions::default())
//!     .decode_to_plane()
//!     .unwrap();
//! assert_eq!(frame.plane.samples(), &[128; 8]);
//! ```

#![deny(unsafe_code)]
pub mod api;
pub mod bit_reader;
pub mod entropy_coding;
pub mod error;
pub mod frame;
pub mod headers;
pub mod util;
