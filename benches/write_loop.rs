//! Benchmarks for the socket handler write loop over the in-memory provider.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use femtosocket::{
    FemtoHandlerTrait, FemtoLevel, FemtoLogRecord, FemtoSocketHandler, LineFormatter,
    MemorySocketProvider, MessagePackFormatter, ScriptedWrite,
};

fn fresh_handler() -> (MemorySocketProvider, FemtoSocketHandler<MemorySocketProvider>) {
    let provider = MemorySocketProvider::new();
    let handler = FemtoSocketHandler::with_provider("tcp://localhost:5140", provider.clone())
        .expect("valid connection string");
    (provider, handler)
}

fn sample_record() -> FemtoLogRecord {
    FemtoLogRecord::new("bench.socket", FemtoLevel::Info, "request served")
        .with_key_value("status", "200")
        .with_key_value("path", "/health")
}

fn write_benchmarks(c: &mut Criterion) {
    let payload = vec![b'x'; 512];
    let record = sample_record();
    let mut group = c.benchmark_group("socket_write");

    group.bench_function("full_write", |b| {
        b.iter_batched_ref(
            fresh_handler,
            |(_, handler)| handler.write(black_box(&payload)).expect("write"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("partial_writes", |b| {
        b.iter_batched_ref(
            || {
                let (provider, handler) = fresh_handler();
                provider.script_writes([
                    ScriptedWrite::Accept(64),
                    ScriptedWrite::Accept(128),
                    ScriptedWrite::Accept(0),
                ]);
                (provider, handler)
            },
            |(_, handler)| handler.write(black_box(&payload)).expect("write"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("handle_default_formatter", |b| {
        b.iter_batched_ref(
            fresh_handler,
            |(_, handler)| handler.handle(black_box(&record)).expect("handle"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("handle_line_formatter", |b| {
        b.iter_batched_ref(
            || {
                let (provider, mut handler) = fresh_handler();
                handler.set_formatter(LineFormatter);
                (provider, handler)
            },
            |(_, handler)| handler.handle(black_box(&record)).expect("handle"),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("handle_msgpack_formatter", |b| {
        b.iter_batched_ref(
            || {
                let (provider, mut handler) = fresh_handler();
                handler.set_formatter(MessagePackFormatter);
                (provider, handler)
            },
            |(_, handler)| handler.handle(black_box(&record)).expect("handle"),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, write_benchmarks);
criterion_main!(benches);
