//! JSONL 인코더 벤치마크
//!
//! 레코드 인코딩과 줄바꿈 제거 처리량을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use normlog_log_pipeline::config::PipelineConfig;
use normlog_log_pipeline::encoder::{append_join_lines, join_lines, JsonlEncoder};
use normlog_log_pipeline::registry::ParserRegistry;

const TELEPORT_SESSION_DATA: &[u8] = br#"{"addr.local":"127.0.0.1:3022","addr.remote":"1.1.1.1:63558","code":"T2006I","ei":2147483646,"event":"session.data","login":"root","rx":5286,"server_id":"411b9b66-b686-471a-b2c6-f6dc6c745f93","sid":"e527ab2a-d882-11ea-9f82-0a588c28e4c2","time":"2020-08-07T07:52:25Z","tx":5848,"uid":"9f2bc778-e87e-4536-9c3f-0d4a57955fd0","user":"kostaspap"}"#;

fn bench_encode_records(c: &mut Criterion) {
    let registry = ParserRegistry::with_defaults(&PipelineConfig::default()).unwrap();
    let records = registry
        .parse("Gravitational.TeleportAudit", TELEPORT_SESSION_DATA)
        .unwrap();
    let record = &records[0];

    let mut group = c.benchmark_group("jsonl_encode");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("canonical_record_x1000", |b| {
        b.iter(|| {
            let mut encoder = JsonlEncoder::new(Vec::with_capacity(512 * 1024));
            for _ in 0..1000 {
                encoder.encode(black_box(record)).unwrap();
            }
            encoder.into_inner()
        })
    });
    group.finish();
}

fn bench_join_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_lines");
    for size in [64usize, 4096, 65536] {
        let src: Vec<u8> = (0..size)
            .map(|i| if i % 40 == 39 { b'\n' } else { b'a' + (i % 26) as u8 })
            .collect();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("in_place", size), &src, |b, src| {
            b.iter(|| {
                let mut buf = src.clone();
                join_lines(&mut buf);
                buf
            })
        });
        group.bench_with_input(BenchmarkId::new("append", size), &src, |b, src| {
            b.iter(|| {
                let mut dst = Vec::with_capacity(src.len());
                append_join_lines(&mut dst, black_box(src));
                dst
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode_records, bench_join_lines);
criterion_main!(benches);
