// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.
#![no_main]

use libfuzzer_sys::fuzz_target;
use rawljpeg::api::{LjpegDecoder, LjpegDecoderOptions};

fuzz_target!(|data: &[u8]| {
    let _ = LjpegDecoder::new(data, LjpegDecoderOptions::default()).read_header();
});
