// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! JPEG marker codes used by lossless camera streams.

pub const SOF0: u16 = 0xffc0;
pub const SOF1: u16 = 0xffc1;
pub const SOF3: u16 = 0xffc3;
pub const DHT: u16 = 0xffc4;
pub const RST0: u16 = 0xffd0;
pub const SOI: u16 = 0xffd8;
pub const SOS: u16 = 0xffda;
pub const DQT: u16 = 0xffdb;
pub const DRI: u16 = 0xffdd;

/// Number of distinct restart markers; `RSTn` indices cycle modulo this.
pub const NUM_RESTART_MARKERS: u8 = 8;

/// Scans forward from `from` for the next marker, skipping stuffed `ff 00`
/// pairs and `ff` fill bytes. Returns the marker and the offset just past it.
pub fn next_marker(data: &[u8], from: usize) -> Option<(u16, usize)> {
    let mut pos = from;
    while pos + 1 < data.len() {
        if data[pos] != 0xff {
            pos += 1;
            continue;
        }
        match data[pos + 1] {
            0x00 => pos += 2,
            0xff => pos += 1,
            code => return Some((0xff00 | code as u16, pos + 2)),
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn finds_markers() {
        let data = [0x12, 0xff, 0x00, 0xff, 0xff, 0xd1, 0x34];
        assert_eq!(next_marker(&data, 0), Some((0xffd1, 6)));
        assert_eq!(next_marker(&data, 6), None);
        assert_eq!(next_marker(&[0x12, 0xff], 0), None);
    }
}
