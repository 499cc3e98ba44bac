//! 레코드 모델 벤치마크
//!
//! 지표 추출과 레코드 직렬화 성능을 측정합니다.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use normlog_core::record::CanonicalRecord;
use normlog_core::schema::{FieldSpec, FieldType, Schema, SchemaBuilder, ValueFormat};
use normlog_core::walker::IndicatorWalker;
use normlog_core::IndicatorKind;
use serde_json::{json, Map, Value};

fn session_schema() -> Schema {
    SchemaBuilder::new("Bench.Session")
        .event_time("time")
        .fields([
            FieldSpec::string("addr.local").indicator(IndicatorKind::IpAddress, ValueFormat::HostPort),
            FieldSpec::string("addr.remote").indicator(IndicatorKind::IpAddress, ValueFormat::HostPort),
            FieldSpec::string("event").required(),
            FieldSpec::array("participants", FieldType::String),
            FieldSpec::string("server_hostname").domain(),
            FieldSpec::string("sid").trace_id(),
            FieldSpec::timestamp("time"),
            FieldSpec::string("user"),
        ])
        .build()
        .unwrap()
}

fn session_fields() -> Map<String, Value> {
    match json!({
        "addr.local": "172.31.14.137:3022",
        "addr.remote": "1.1.1.1:63558",
        "event": "session.start",
        "participants": ["admin"],
        "server_hostname": "ip-172-31-14-137.us-west-2.compute.internal",
        "sid": "e527ab2a-d87a-11ea-9c6f-0a8a0c8c0a3c",
        "time": "2020-08-07T07:52:09.821Z",
        "user": "admin"
    }) {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn bench_walker(c: &mut Criterion) {
    let schema = session_schema();
    let fields = session_fields();

    let mut group = c.benchmark_group("walker");
    group.throughput(Throughput::Elements(1));
    group.bench_function("apply_session_record", |b| {
        b.iter(|| {
            let mut record = CanonicalRecord::new(fields.clone());
            let stats = IndicatorWalker::new(&schema)
                .apply(&mut record, 0)
                .unwrap();
            black_box(stats)
        })
    });
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let schema = session_schema();
    let mut record = CanonicalRecord::new(session_fields());
    IndicatorWalker::new(&schema).apply(&mut record, 0).unwrap();

    let mut group = c.benchmark_group("record_serialize");
    group.throughput(Throughput::Elements(1));
    group.bench_function("to_vec", |b| {
        b.iter(|| black_box(serde_json::to_vec(black_box(&record)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_walker, bench_serialize);
criterion_main!(benches);
