use std::hint::black_box;

use chunkpipe_core::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const INPUT_LEN: usize = 8 * 1024 * 1024;
const BLOCK_SIZE: usize = 256 * 1024;

fn sample() -> Vec<u8> {
    (0..INPUT_LEN).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect()
}

/// Encode throughput by worker count, one group per transform.
fn bench_encode(c: &mut Criterion) {
    let data = sample();

    for transform in ["base64", "zstd"] {
        let mut group = c.benchmark_group(format!("encode/{transform}"));
        group.throughput(Throughput::Bytes(INPUT_LEN as u64));
        group.sample_size(10);

        for workers in [1usize, 4, 8] {
            let cfg = PipelineConfig::encode()
                .with_transform(transform)
                .with_workers(workers)
                .with_block_size(BLOCK_SIZE);

            group.bench_with_input(BenchmarkId::from_parameter(workers), &cfg, |b, cfg| {
                b.iter(|| {
                    let report =
                        encode_stream(InputSource::Memory(data.clone()), OutputSink::Memory, cfg, &CancelToken::new())
                            .unwrap();
                    black_box(report.bytes_out)
                });
            });
        }
        group.finish();
    }
}

fn bench_decode(c: &mut Criterion) {
    let cancel = CancelToken::new();
    let encoded = encode_stream(
        InputSource::Memory(sample()),
        OutputSink::Memory,
        &PipelineConfig::encode().with_block_size(BLOCK_SIZE),
        &cancel,
    )
    .unwrap()
    .output
    .unwrap();

    let mut group = c.benchmark_group("decode/base64");
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.sample_size(10);

    for workers in [1usize, 4, 8] {
        let cfg = PipelineConfig::decode().with_workers(workers).with_rows_per_chunk(4);
        group.bench_with_input(BenchmarkId::from_parameter(workers), &cfg, |b, cfg| {
            b.iter(|| {
                let report =
                    decode_stream(InputSource::Memory(encoded.clone()), OutputSink::Memory, cfg, &cancel).unwrap();
                black_box(report.bytes_out)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
