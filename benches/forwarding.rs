use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dense_array::DenseArray;
use metadata_arrays::{broadcast2, metadata, sel, Container, MetadataArray};
use rand::{rngs::StdRng, Rng, SeedableRng};

// Julia equivalent for `bench_sum_forwarding`:
// ```julia
// using BenchmarkTools, MetadataArrays
//
// for n in (1_000, 100_000)
//     a = rand(n)
//     m = MetadataArray(a, (unit = "m",))
//     @btime sum($a)
//     @btime sum($m)
// end
// ```
fn bench_sum_forwarding(c: &mut Criterion) {
    let mut group = c.benchmark_group("sum_forwarding");
    let mut rng = StdRng::seed_from_u64(0);
    for n in [1_000usize, 100_000] {
        group.throughput(Throughput::Elements(n as u64));
        let a: Vec<f64> = (0..n).map(|_| rng.gen()).collect();
        let w = MetadataArray::new(a.clone(), metadata!(unit = "m"));

        group.bench_with_input(BenchmarkId::new("plain", n), &n, |b, _| {
            b.iter(|| Container::iter(black_box(&a)).sum::<f64>());
        });
        group.bench_with_input(BenchmarkId::new("wrapped", n), &n, |b, _| {
            b.iter(|| black_box(&w).iter().sum::<f64>());
        });
    }
    group.finish();
}

fn bench_slice_rewrap(c: &mut Criterion) {
    let mut group = c.benchmark_group("slice_rewrap");
    let a: Vec<f64> = (0..10_000).map(f64::from).collect();
    let w = MetadataArray::new(a.clone(), metadata!(unit = "m"));
    let terms = sel![100..1100];

    group.bench_function("plain", |b| {
        b.iter(|| black_box(&a).select(black_box(&terms)));
    });
    group.bench_function("wrapped", |b| {
        b.iter(|| black_box(&w).get(black_box(&terms)));
    });
    group.finish();
}

fn bench_broadcast_outer(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast_outer");
    for size in [100usize, 500] {
        group.throughput(Throughput::Elements((size * size) as u64));
        let col: Vec<f64> = (0..size).map(|i| i as f64).collect();
        let row = DenseArray::from_vec(col.clone(), &[1, size]).unwrap();
        let w = MetadataArray::new(col.clone(), metadata!(unit = "m"));

        group.bench_with_input(BenchmarkId::new("plain", size), &size, |b, _| {
            b.iter(|| broadcast2(&col, &row, |x, y| x * y).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("wrapped", size), &size, |b, _| {
            b.iter(|| broadcast2(&w, &row, |x, y| x * y).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_sum_forwarding,
    bench_slice_rewrap,
    bench_broadcast_outer
);
criterion_main!(benches);
