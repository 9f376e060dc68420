// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt::Debug;

use crate::error::{Error, Result};

pub const HUFFMAN_MAX_BITS: usize = 16;

/// Flat lookup table for a canonical Huffman code.
///
/// Entry 0 holds the longest code length `L`. Entries `1..=2^L` are indexed
/// by the next `L` bits of the stream plus one, and hold `length << 8 | symbol`
/// for the code that prefixes those bits, or 0 if no code does.
#[derive(Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    table: Box<[u16]>,
}

impl Debug for HuffmanTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HuffmanTable{{ max_len: {}, entries: {} }}",
            self.max_len(),
            self.table.len() - 1
        )
    }
}

impl HuffmanTable {
    /// Builds the table from the number of codes of each length `1..=16` and
    /// the symbols sorted by code length.
    pub fn build(counts: &[u8; HUFFMAN_MAX_BITS], symbols: &[u8]) -> Result<HuffmanTable> {
        let max_len = counts.iter().rposition(|&c| c != 0).map_or(0, |i| i + 1);
        let num_symbols: usize = counts.iter().map(|&c| c as usize).sum();
        if symbols.len() < num_symbols {
            return Err(Error::HuffmanTableTruncated(num_symbols, symbols.len()));
        }

        let size = (1usize << max_len) + 1;
        let mut table = Vec::new();
        table
            .try_reserve_exact(size)
            .map_err(|_| Error::HuffmanTableAllocation(max_len))?;
        table.resize(size, 0u16);
        table[0] = max_len as u16;

        // Canonical codes of one length are consecutive, so filling slots in
        // order assigns every code the range of slots it prefixes.
        let mut slot = 1;
        let mut symbols = symbols.iter();
        for len in 1..=max_len {
            let span = 1usize << (max_len - len);
            for _ in 0..counts[len - 1] {
                let Some(&symbol) = symbols.next() else {
                    return Err(Error::HuffmanTableTruncated(num_symbols, 0));
                };
                if slot + span > size {
                    return Err(Error::HuffmanTableOverfull(len, max_len));
                }
                table[slot..slot + span].fill(((len as u16) << 8) | symbol as u16);
                slot += span;
            }
        }

        Ok(HuffmanTable {
            table: table.into_boxed_slice(),
        })
    }

    /// Parses 16 length counts followed by the symbol list, advancing `data`
    /// past them.
    pub fn parse(data: &mut &[u8]) -> Result<HuffmanTable> {
        if data.len() < HUFFMAN_MAX_BITS {
            return Err(Error::HuffmanTableTruncated(HUFFMAN_MAX_BITS, data.len()));
        }
        let (counts, rest) = data.split_at(HUFFMAN_MAX_BITS);
        let counts: [u8; HUFFMAN_MAX_BITS] = array_init::array_init(|i| counts[i]);
        let num_symbols: usize = counts.iter().map(|&c| c as usize).sum();
        if rest.len() < num_symbols {
            return Err(Error::HuffmanTableTruncated(num_symbols, rest.len()));
        }
        let (symbols, rest) = rest.split_at(num_symbols);
        let table = HuffmanTable::build(&counts, symbols)?;
        *data = rest;
        Ok(table)
    }

    /// Longest code length, 0 for a table without codes.
    pub fn max_len(&self) -> usize {
        self.table[0] as usize
    }

    /// Resolves `max_len()` bits of lookahead to `(code length, symbol)`.
    pub fn lookup(&self, bits: u32) -> Option<(usize, u8)> {
        let entry = *self.table.get(bits as usize + 1)?;
        let len = (entry >> 8) as usize;
        if len == 0 {
            None
        } else {
            Some((len, entry as u8))
        }
    }
}
