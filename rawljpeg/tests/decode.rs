// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! End-to-end decoding of synthesized lossless-JPEG streams.

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rawljpeg::api::{
    CancellationToken, DecoderLimits, LjpegDecoder, LjpegDecoderOptions, Plane, SampleSink,
};
use rawljpeg::error::{Error, ErrorKind};
use rawljpeg_test_utils::{HuffmanSpec, LENGTH16_DIFFERENCE, LjpegWriter, SOF3, SOI, segment};
use test_log::test;

fn decode(data: &[u8]) -> Result<Vec<u16>, Error> {
    decode_with(data, LjpegDecoderOptions::default())
}

fn decode_with(data: &[u8], options: LjpegDecoderOptions) -> Result<Vec<u16>, Error> {
    let frame = LjpegDecoder::new(data, options).decode_to_plane()?;
    Ok(frame.plane.into_samples())
}

#[test]
fn single_code_table() {
    let writer = LjpegWriter::new(4, 2, 8).tables(vec![HuffmanSpec::single(0)]);
    let data = writer.encode(&[128; 8]);
    let frame = LjpegDecoder::new(&data, LjpegDecoderOptions::default())
        .decode_to_plane()
        .unwrap();
    assert_eq!(frame.header.width(), 4);
    assert_eq!(frame.header.height(), 2);
    assert_eq!(frame.header.bit_depth(), 8);
    assert_eq!(frame.header.component_count(), 1);
    assert_eq!(frame.plane.samples(), &[128; 8]);
}

#[test]
fn segment_cap() {
    let mut writer = LjpegWriter::new(1, 1, 8);
    for _ in 0..1025 {
        writer = writer.segment(0xffe1, &[0; 2]);
    }
    let data = writer.encode(&[0]);
    let err = LjpegDecoder::new(&data, LjpegDecoderOptions::default())
        .read_header()
        .unwrap_err();
    assert!(matches!(err, Error::TooManySegments(1024)));
    assert_eq!(err.kind(), ErrorKind::MalformedStream);
}

#[test]
fn restart_interval_resync() {
    let writer = LjpegWriter::new(2, 2, 8).restart_interval(2);
    let samples = [10, 20, 30, 40];
    let data = writer.encode(&samples);
    assert_eq!(decode(&data).unwrap(), samples);

    let data = writer.clone().omit_restart(0).encode(&samples);
    let err = decode(&data).unwrap_err();
    assert!(matches!(err, Error::SyncLost { row: 1, marker: 0 }), "{err}");
    assert_eq!(err.kind(), ErrorKind::SyncLost);
}

#[test]
fn restart_markers_wrap_around() {
    let mut rng = XorShiftRng::seed_from_u64(3);
    let writer = LjpegWriter::new(3, 12, 12).restart_interval(3).predictor(4);
    let samples: Vec<u16> = (0..36).map(|_| rng.random_range(0..4096)).collect();
    assert_eq!(decode(&writer.encode(&samples)).unwrap(), samples);

    // A missing marker late in the cycle is still detected.
    let data = writer.omit_restart(9).encode(&samples);
    assert!(matches!(
        decode(&data),
        Err(Error::SyncLost { row: 10, marker: 1 })
    ));
}

#[test]
fn restart_interval_spanning_rows() {
    let writer = LjpegWriter::new(2, 6, 8).restart_interval(6);
    let samples: Vec<u16> = (0..12).map(|i| 100 + 10 * i).collect();
    assert_eq!(decode(&writer.encode(&samples)).unwrap(), samples);
}

#[test]
fn length16_sentinel() {
    let writer = LjpegWriter::new(1, 1, 16);
    let data = writer.encode_differences(&[LENGTH16_DIFFERENCE]);
    assert_eq!(decode(&data).unwrap(), vec![0]);

    let mut options = LjpegDecoderOptions::default();
    options.allow_length16_sentinel = false;
    let err = decode_with(&data, options).unwrap_err();
    assert!(matches!(err, Error::Length16NotAllowed));
    assert_eq!(err.kind(), ErrorKind::MalformedStream);
}

#[test]
fn stuffed_bytes() {
    // Symbol 8 has code "1", so a difference of 255 is nine one bits.
    let mut counts = [0u8; 16];
    counts[0] = 2;
    let table = HuffmanSpec {
        counts,
        symbols: vec![0, 8],
    };
    let writer = LjpegWriter::new(2, 1, 10).tables(vec![table]);
    let data = writer.encode(&[767, 1022]);
    let scan = &data[writer.header().len()..];
    assert_eq!(scan, &[0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0xd9]);
    assert_eq!(decode(&data).unwrap(), vec![767, 1022]);
}

#[test]
fn truncated_stream() {
    let writer = LjpegWriter::new(16, 4, 12);
    let samples: Vec<u16> = (0..64).map(|i| (i * 61 % 4096) as u16).collect();
    let data = writer.encode(&samples);
    let cut = &data[..data.len() - 20];

    let mut rows = vec![];
    let mut sink = |row: usize, _: usize, _: usize, value: u16| {
        if rows.len() <= row {
            rows.push(vec![]);
        }
        rows[row].push(value);
    };
    let err = LjpegDecoder::new(cut, LjpegDecoderOptions::default())
        .decode(&mut sink)
        .unwrap_err();
    let Error::Truncated { row, column } = err else {
        panic!("unexpected error {err}");
    };
    assert_eq!(rows.len(), row + 1);
    for (r, decoded) in rows[..row].iter().enumerate() {
        assert_eq!(decoded, &samples[r * 16..(r + 1) * 16]);
    }
    let partial = &rows[row];
    assert_eq!(partial.len(), 16);
    assert_eq!(&partial[..column], &samples[row * 16..row * 16 + column]);
    assert!(partial[column..].iter().all(|&s| s == 0));
}

#[test]
fn missing_scan_data() {
    let writer = LjpegWriter::new(4, 4, 8);
    let data = writer.header();
    let err = decode(&data).unwrap_err();
    assert!(matches!(err, Error::Truncated { row: 0, column: 0 }));
}

struct CancelAfterFirstRow {
    token: CancellationToken,
    rows: usize,
}

impl SampleSink for CancelAfterFirstRow {
    fn place_sample(&mut self, _: usize, _: usize, _: usize, _: u16) {}

    fn end_row(&mut self, _row: usize) {
        self.rows += 1;
        self.token.cancel();
    }
}

#[test]
fn cancellation() {
    let writer = LjpegWriter::new(4, 4, 8);
    let data = writer.encode(&[7; 16]);
    let token = CancellationToken::new();
    let mut options = LjpegDecoderOptions::default();
    options.cancellation = Some(token.clone());

    let mut sink = CancelAfterFirstRow { token, rows: 0 };
    let decoder = LjpegDecoder::new(&data, options);
    let err = decoder.decode(&mut sink).unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert_eq!(sink.rows, 1);

    sink.token.reset();
    sink.rows = 0;
    decoder.decode(&mut sink).unwrap_err();
    assert_eq!(sink.rows, 1);
}

#[test]
fn info_only() {
    let writer = LjpegWriter::new(6, 5, 14)
        .sampling(&[0x21, 0x11, 0x11])
        .point_transform(1)
        .restart_interval(12);
    let data = writer.header();
    let mut options = LjpegDecoderOptions::default();
    options.info_only = true;
    let mut placed = 0;
    let header = LjpegDecoder::new(&data, options)
        .decode(&mut |_: usize, _: usize, _: usize, _: u16| placed += 1)
        .unwrap();
    assert_eq!(placed, 0);
    assert_eq!((header.width(), header.height()), (6, 5));
    assert_eq!(header.bit_depth(), 14);
    assert_eq!(header.point_transform(), 1);
    assert_eq!(header.sraw(), 1);
    assert_eq!(header.component_count(), 4);
    assert_eq!(header.restart_interval(), Some(12));
    assert_eq!(header.scan_offset(), data.len());
}

#[test]
fn info_only_from_frame_segment_alone() {
    let mut data = SOI.to_be_bytes().to_vec();
    data.extend(segment(SOF3, &[12, 0, 16, 0, 8, 1, 1, 0x11, 0]));
    let mut options = LjpegDecoderOptions::default();
    options.info_only = true;
    let header = LjpegDecoder::new(&data, options).read_header().unwrap();
    assert_eq!((header.width(), header.height()), (8, 16));
    assert_eq!(header.bit_depth(), 12);
    assert!(matches!(decode(&data), Err(Error::UnexpectedEndOfHeader)));
}

#[test]
fn dimension_hints() {
    let writer = LjpegWriter::new(4, 2, 8);
    let data = writer.encode(&[1; 8]);
    let mut options = LjpegDecoderOptions::default();
    options.width_hint = Some(4);
    options.height_hint = Some(2);
    assert!(decode_with(&data, options.clone()).is_ok());
    options.height_hint = Some(3);
    assert!(matches!(
        decode_with(&data, options),
        Err(Error::DimensionMismatch(4, 2, 4, 3))
    ));
}

#[test]
fn limits() {
    let writer = LjpegWriter::new(64, 64, 8).sampling(&[0x11, 0x11]);
    let data = writer.encode(&vec![3; 64 * 64 * 2]);

    let mut options = LjpegDecoderOptions::default();
    options.limits = DecoderLimits::restrictive();
    assert!(decode_with(&data, options.clone()).is_ok());

    options.limits.max_pixels = Some(64 * 63);
    let err = decode_with(&data, options.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);

    options.limits = DecoderLimits::default();
    options.limits.max_components_per_row = Some(127);
    assert!(matches!(
        decode_with(&data, options),
        Err(Error::ImageSizeTooLarge(64, 64))
    ));
}

#[test]
fn point_transform() {
    let mut rng = XorShiftRng::seed_from_u64(4);
    let writer = LjpegWriter::new(8, 8, 10).point_transform(2).predictor(7);
    let samples: Vec<u16> = (0..64).map(|_| rng.random_range(0..1024)).collect();
    let frame = LjpegDecoder::new(&writer.encode(&samples), LjpegDecoderOptions::default())
        .decode_to_plane()
        .unwrap();
    assert_eq!(frame.header.bit_depth(), 10);
    assert_eq!(frame.plane.samples(), &samples[..]);
}

#[test]
fn tile_width_is_passed_through() {
    let data = LjpegWriter::new(2, 2, 8).encode(&[5; 4]);
    let mut options = LjpegDecoderOptions::default();
    options.tile_width = Some(2);
    let frame = LjpegDecoder::new(&data, options).decode_to_plane().unwrap();
    assert_eq!(frame.tile_width, Some(2));
}

#[test]
fn deterministic_across_threads() {
    let mut rng = XorShiftRng::seed_from_u64(5);
    let writer = LjpegWriter::new(32, 16, 14)
        .sampling(&[0x11, 0x11])
        .restart_interval(64)
        .predictor(5);
    let samples: Vec<u16> = (0..32 * 16 * 2).map(|_| rng.random_range(0..1 << 14)).collect();
    let data = writer.encode(&samples);

    let first = decode(&data).unwrap();
    assert_eq!(first, samples);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..2).map(|_| s.spawn(|| decode(&data).unwrap())).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), first);
        }
    });
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_tiles() {
    let tiles: Vec<Vec<u8>> = (0..4u16)
        .map(|i| LjpegWriter::new(3, 2, 8).encode(&[i * 10; 6]))
        .collect();
    let mut broken = tiles[2].clone();
    broken.truncate(broken.len() - 4);
    let mut inputs: Vec<&[u8]> = tiles.iter().map(|t| &t[..]).collect();
    inputs[2] = &broken[..];

    let results = rawljpeg::api::decode_tiles(&inputs, &LjpegDecoderOptions::default());
    assert_eq!(results.len(), 4);
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(frame) => assert_eq!(frame.plane.samples(), &[i as u16 * 10; 6]),
            Err(err) => {
                assert_eq!(i, 2);
                assert_eq!(err.kind(), ErrorKind::Truncated);
            }
        }
    }
    assert!(results[2].is_err());
}

#[test]
fn samples_stay_in_range() {
    arbtest::arbtest(|u| {
        let width = u.int_in_range(1..=12)?;
        let height = u.int_in_range(1..=6)?;
        let bits = u.int_in_range(2..=14)?;
        let psv = u.int_in_range(0..=7)?;
        let components = u.int_in_range(1..=3)?;
        let mut writer = LjpegWriter::new(width, height, bits)
            .predictor(psv)
            .sampling(&vec![0x11; components]);
        if u.arbitrary()? {
            writer = writer.restart_interval(u.int_in_range(1..=24)? * width);
        }
        let len = writer.samples_per_row() * height as usize;
        let mut samples = Vec::with_capacity(len);
        for _ in 0..len {
            samples.push(u.int_in_range(0..=(1u16 << bits) - 1)?);
        }
        let decoded = decode(&writer.encode(&samples)).unwrap();
        assert!(decoded.iter().all(|&s| s < 1 << bits));
        assert_eq!(decoded, samples);
        Ok(())
    });
}

#[test]
fn plane_sink_matches_closure_sink() {
    let writer = LjpegWriter::new(5, 3, 12).sampling(&[0x11, 0x11, 0x11]);
    let samples: Vec<u16> = (0..45).map(|i| (i * 89 % 4096) as u16).collect();
    let data = writer.encode(&samples);
    let decoder = LjpegDecoder::new(&data, LjpegDecoderOptions::default());

    let mut plane = Plane::new(5, 3, 3).unwrap();
    decoder.decode(&mut plane).unwrap();
    let mut collected = vec![];
    decoder
        .decode(&mut |row: usize, column: usize, component: usize, value: u16| {
            collected.push(((row * 5 + column) * 3 + component, value))
        })
        .unwrap();
    for (index, value) in collected {
        assert_eq!(plane.samples()[index], value);
    }
    assert_eq!(plane.samples(), &samples[..]);
}
