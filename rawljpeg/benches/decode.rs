// Copyright (c) the rawljpeg Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use criterion::{BenchmarkId, Criterion, SamplingMode, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rawljpeg::api::{LjpegDecoder, LjpegDecoderOptions};
use rawljpeg_test_utils::LjpegWriter;

fn decode_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.sampling_mode(SamplingMode::Flat);

    let mut rng = XorShiftRng::seed_from_u64(0);
    // Two-component rows like a Bayer readout, with smooth content so that
    // short codes dominate.
    for (width, height, bits, psv) in [(1024, 256, 12, 1), (1024, 256, 14, 6), (2048, 64, 14, 4)]
    {
        let writer = LjpegWriter::new(width, height, bits)
            .sampling(&[0x11, 0x11])
            .predictor(psv)
            .restart_interval(width * 16);
        let len = writer.samples_per_row() * height as usize;
        let mut value = 1i32 << (bits - 1);
        let samples: Vec<u16> = (0..len)
            .map(|_| {
                value = (value + rng.random_range(-40..=40)).clamp(0, (1 << bits) - 1);
                value as u16
            })
            .collect();
        let data = writer.encode(&samples);

        group.throughput(criterion::Throughput::Elements(len as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{height}_{bits}bit_psv{psv}")),
            &data,
            |b, data| {
                b.iter(|| {
                    LjpegDecoder::new(data, LjpegDecoderOptions::default())
                        .decode_to_plane()
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    name = decode;
    config = Criterion::default().sample_size(50);
    targets = decode_benches
);
criterion_main!(decode);
