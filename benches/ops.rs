use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relaxed_vector::Vector;

pub fn push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");

    group.bench_function("push_back 10k, N=32", |b| {
        b.iter(|| {
            let mut vec = Vector::<u32, 32>::new();
            for i in 0..10000 {
                vec.push_back(i);
            }
            black_box(vec)
        })
    });

    group.bench_function("push_front 10k, N=32", |b| {
        b.iter(|| {
            let mut vec = Vector::<u32, 32>::new();
            for i in 0..10000 {
                vec.push_front(i);
            }
            black_box(vec)
        })
    });
}

pub fn append(c: &mut Criterion) {
    let left: Vector<u32, 32> = (0..10000).collect();
    let right: Vector<u32, 32> = (0..10000).collect();
    let small: Vector<u32, 32> = (0..10).collect();
    let mut group = c.benchmark_group("append");

    group.bench_function("10k ++ 10k, N=32", |b| {
        b.iter(|| {
            let mut joined = left.clone();
            joined.append(right.clone());
            black_box(joined)
        })
    });

    group.bench_function("10k ++ 10, N=32", |b| {
        b.iter(|| {
            let mut joined = left.clone();
            joined.append(small.clone());
            black_box(joined)
        })
    });
}

pub fn reads(c: &mut Criterion) {
    let vec: Vector<u32, 32> = (0..10000).collect();
    let mut group = c.benchmark_group("reads");

    group.bench_function("get sequential 10k, N=32", |b| {
        b.iter(|| {
            for i in 0..10000 {
                black_box(vec.get(i));
            }
        })
    });

    group.bench_function("focus sequential 10k, N=32", |b| {
        b.iter(|| {
            let mut focus = vec.focus();
            for i in 0..10000 {
                black_box(focus.get(i));
            }
        })
    });

    group.bench_function("iter 10k, N=32", |b| {
        b.iter(|| black_box(vec.iter().count()));
    });
}

pub fn slicing(c: &mut Criterion) {
    let vec: Vector<u32, 32> = (0..10000).collect();
    let mut group = c.benchmark_group("slice");

    group.bench_function("slice 100 out of 10k, N=32", |b| {
        b.iter(|| {
            let mut sliced = vec.clone();
            sliced.slice(5000, 5100);
            black_box(sliced)
        })
    });
}

criterion_group!(benches, push, append, reads, slicing);
criterion_main!(benches);
