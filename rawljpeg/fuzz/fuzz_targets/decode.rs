// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use libfuzzer_sys::fuzz_target;
use rawljpeg::api::{DecoderLimits, LjpegDecoder, LjpegDecoderOptions};

fuzz_target!(|data: &[u8]| {
    let mut options = LjpegDecoderOptions::default();
    options.limits = DecoderLimits {
        max_pixels: Some(1 << 22),
        max_components_per_row: Some(1 << 16),
    };
    let mut checksum = 0u64;
    let _ = LjpegDecoder::new(data, options).decode(&mut |_: usize, _: usize, _: usize, v: u16| {
        checksum = checksum.wrapping_add(v as u64);
    });
    std::hint::black_box(checksum);
});
