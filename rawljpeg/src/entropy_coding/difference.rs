// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use crate::{
    bit_reader::BitReader,
    entropy_coding::huffman::{HUFFMAN_MAX_BITS, HuffmanTable},
    error::{Error, Result},
};

/// Difference coded by the length-16 symbol in formats that reserve it.
pub const LENGTH16_DIFFERENCE: i32 = -32768;

/// Maps `len` raw bits to a signed difference: values with the top bit clear
/// are negative.
pub fn extend_difference(raw: u32, len: usize) -> i32 {
    if len == 0 {
        return 0;
    }
    let raw = raw as i32;
    if raw & (1 << (len - 1)) == 0 {
        raw - ((1 << len) - 1)
    } else {
        raw
    }
}

/// Reads one lossless-JPEG difference: a Huffman-coded length followed by
/// that many magnitude bits.
pub fn read_difference(
    br: &mut BitReader,
    table: &HuffmanTable,
    allow_length16_sentinel: bool,
) -> Result<i32> {
    let len = br.read_huffman(table)?;
    let len_bits = len as usize;
    if len_bits > HUFFMAN_MAX_BITS {
        return Err(Error::InvalidDifferenceLength(len));
    }
    if len_bits == HUFFMAN_MAX_BITS {
        return if allow_length16_sentinel {
            Ok(LENGTH16_DIFFERENCE)
        } else {
            Err(Error::Length16NotAllowed)
        };
    }
    let raw = br.read(len_bits);
    Ok(extend_difference(raw, len_bits))
}
