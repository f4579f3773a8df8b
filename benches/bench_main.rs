use criterion::criterion_main;

mod benchmarks;

criterion_main!(
    benchmarks::assembly::benches,
    benchmarks::lanczos::benches,
);
