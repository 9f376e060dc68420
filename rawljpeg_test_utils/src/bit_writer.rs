// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// MSB-first bit writer for entropy-coded segments, inserting a zero byte
/// after every `ff`.
#[derive(Debug, Default)]
pub struct BitWriter {
    out: Vec<u8>,
    acc: u64,
    nbits: usize,
}

impl BitWriter {
    pub fn new() -> BitWriter {
        BitWriter::default()
    }

    pub fn write(&mut self, num: usize, bits: u32) {
        assert!(num <= 32);
        if num == 0 {
            return;
        }
        let mask = (1u64 << num) - 1;
        self.acc = (self.acc << num) | (bits as u64 & mask);
        self.nbits += num;
        while self.nbits >= 8 {
            self.push_byte((self.acc >> (self.nbits - 8)) as u8);
            self.nbits -= 8;
        }
        self.acc &= (1u64 << self.nbits) - 1;
    }

    /// Pads the last partial byte with one bits.
    pub fn pad_to_byte(&mut self) {
        if self.nbits > 0 {
            let pad = 8 - self.nbits;
            self.write(pad, (1 << pad) - 1);
        }
    }

    /// Appends bytes verbatim, after padding. Used for markers.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.pad_to_byte();
        self.out.extend_from_slice(bytes);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pad_to_byte();
        self.out
    }

    fn push_byte(&mut self, byte: u8) {
        self.out.push(byte);
        if byte == 0xff {
            self.out.push(0);
        }
    }
}
