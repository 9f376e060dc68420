// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::{
    entropy_coding::huffman::HuffmanTable,
    error::{Error, Result},
};

/// Reads bits MSB-first from a sequence of bytes, optionally undoing JPEG
/// byte stuffing.
///
/// Once the data runs out, or a marker is reached while byte stuffing is
/// enabled, the reader keeps returning zero bits. Consuming any of those
/// bits marks the reader as overrun, which callers turn into a truncation
/// error.
#[derive(Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u64,
    bits_in_buf: usize,
    padding_bits: usize,
    byte_stuffing: bool,
    halted: bool,
    overrun: bool,
}

impl Debug for BitReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitReader{{ data: [{} of {} bytes], bit_buf: {:0width$b}, halted: {}, overrun: {} }}",
            self.pos,
            self.data.len(),
            self.bit_buf,
            self.halted,
            self.overrun,
            width = self.bits_in_buf
        )
    }
}

pub const MAX_BITS_PER_CALL: usize = 25;

impl<'a> BitReader<'a> {
    /// Constructs a BitReader for a given range of data, without byte stuffing.
    pub fn new(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            data,
            pos: 0,
            bit_buf: 0,
            bits_in_buf: 0,
            padding_bits: 0,
            byte_stuffing: false,
            halted: false,
            overrun: false,
        }
    }

    /// Constructs a BitReader over JPEG entropy-coded data: `ff 00` reads as
    /// `ff`, and any other byte after `ff` ends the segment.
    pub fn new_jpeg(data: &'a [u8]) -> BitReader<'a> {
        BitReader {
            byte_stuffing: true,
            ..BitReader::new(data)
        }
    }

    /// Drops all buffered bits and clears the end-of-segment state. Reading
    /// continues from the next unread byte.
    pub fn reset(&mut self) {
        self.bit_buf = 0;
        self.bits_in_buf = 0;
        self.padding_bits = 0;
        self.halted = false;
        self.overrun = false;
    }

    /// Resets the reader and moves it to byte offset `pos`.
    pub fn reset_at(&mut self, pos: usize) {
        self.reset();
        self.pos = pos.min(self.data.len());
    }

    /// Reads `num` bits without consuming them.
    pub fn peek(&mut self, num: usize) -> u32 {
        assert!(num <= MAX_BITS_PER_CALL);
        if num == 0 {
            return 0;
        }
        self.refill(num);
        ((self.bit_buf >> (self.bits_in_buf - num)) & ((1u64 << num) - 1)) as u32
    }

    /// Advances by `num` bits, which must already be buffered.
    pub fn consume(&mut self, num: usize) {
        debug_assert!(num <= self.bits_in_buf);
        self.bits_in_buf -= num;
        self.bit_buf &= (1u64 << self.bits_in_buf) - 1;
        if self.bits_in_buf < self.padding_bits {
            self.overrun = true;
            self.padding_bits = self.bits_in_buf;
        }
    }

    /// Reads `num` bits, most significant first.
    /// ```
    /// # use rawljpeg::bit_reader::BitReader;
    /// let mut br = BitReader::new(&[0xa5, 0x0f]);
    /// assert_eq!(br.read(4), 0xa);
    /// assert_eq!(br.read(8), 0x50);
    /// assert_eq!(br.read(0), 0);
    /// assert_eq!(br.read(4), 0xf);
    /// assert!(!br.is_overrun());
    /// assert_eq!(br.read(1), 0);
    /// assert!(br.is_overrun());
    /// ```
    pub fn read(&mut self, num: usize) -> u32 {
        let ret = self.peek(num);
        self.consume(num);
        ret
    }

    /// Decodes one symbol of `table`. Nothing is consumed if the buffered
    /// bits do not form a code of the table.
    pub fn read_huffman(&mut self, table: &HuffmanTable) -> Result<u8> {
        let max_len = table.max_len();
        if max_len == 0 {
            return Err(Error::InvalidHuffmanCode);
        }
        let bits = self.peek(max_len);
        let (len, symbol) = table.lookup(bits).ok_or(Error::InvalidHuffmanCode)?;
        self.consume(len);
        Ok(symbol)
    }

    /// Returns whether bits past the end of the data (or past a marker) were
    /// consumed since the last reset.
    pub fn is_overrun(&self) -> bool {
        self.overrun
    }

    /// Returns whether a marker stopped the reader.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Number of bits currently buffered, including zero padding.
    pub fn bits_in_buf(&self) -> usize {
        self.bits_in_buf
    }

    /// Offset of the next byte that has not been pulled into the buffer.
    pub fn byte_position(&self) -> usize {
        self.pos
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    fn refill(&mut self, num: usize) {
        while self.bits_in_buf < num {
            let byte = self.next_byte();
            self.bit_buf = (self.bit_buf << 8) | byte as u64;
            self.bits_in_buf += 8;
        }
    }

    fn next_byte(&mut self) -> u8 {
        if !self.halted && self.pos < self.data.len() {
            let byte = self.data[self.pos];
            if !self.byte_stuffing || byte != 0xff {
                self.pos += 1;
                return byte;
            }
            if self.data.get(self.pos + 1) == Some(&0) {
                self.pos += 2;
                return byte;
            }
            // A marker; leave it in place for whoever resynchronizes.
            self.halted = true;
        }
        self.padding_bits += 8;
        0
    }
}
