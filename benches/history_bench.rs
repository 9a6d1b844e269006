use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use skein::buffer::Buffer;
use skein::position::Pos;

fn history_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_push");

    group.bench_function("coalesced_typing_run", |b| {
        b.iter_batched(
            Buffer::default,
            |mut buf| {
                let mut end = Pos::ZERO;
                for _ in 0..200 {
                    end = buf.insert_str(black_box(end), "x");
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("separate_entries", |b| {
        b.iter_batched(
            Buffer::default,
            |mut buf| {
                let mut end = Pos::ZERO;
                for _ in 0..200 {
                    buf.force_next_entry();
                    end = buf.insert_str(black_box(end), "x");
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn undo_redo_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("undo_redo");

    let setup = || {
        let mut buf = Buffer::default();
        let mut end = Pos::ZERO;
        for i in 0..100 {
            buf.force_next_entry();
            end = buf.insert_str(end, if i % 5 == 0 { "line\n" } else { "word " });
        }
        buf
    };

    group.bench_function("undo_redo_100_entries", |b| {
        b.iter_batched(
            setup,
            |mut buf| {
                while buf.undo().is_some() {}
                while buf.redo().is_some() {}
                black_box(buf.version());
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, history_push, undo_redo_cycle);
criterion_main!(benches);
