use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use spdx_tu::CodecConfig;
use spdx_tu_testkit::TestFixture;

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for workers in [1, 4] {
        let fixture = TestFixture::with_config(CodecConfig {
            best_effort: true,
            workers,
            ..CodecConfig::default()
        });
        let bytes = fixture.codec.encode(&fixture.noisy_payload(1_000)).unwrap();
        group.bench_with_input(BenchmarkId::new("workers", workers), &bytes, |b, bytes| {
            b.iter(|| fixture.codec.decode(black_box(bytes)).unwrap())
        });
    }
    group.finish();
}

fn encode(c: &mut Criterion) {
    let fixture = TestFixture::new();
    let payload = fixture.noisy_payload(1_000);
    c.bench_function("encode 1000", |b| {
        b.iter(|| fixture.codec.encode(black_box(&payload)).unwrap())
    });
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);
