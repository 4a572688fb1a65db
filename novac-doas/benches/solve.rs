use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use novac_doas::evaluate;
use novac_model::data::{FitInterval, FitMode, FitWindow, ParameterPolicy, Reference};

fn synthetic_window(length: usize) -> (FitWindow, Vec<f64>, Vec<f64>) {
    let cross_section: Vec<f64> = (0..length)
        .map(|i| {
            let x = (i as f64 - length as f64 / 2.0) / (length as f64 / 12.0);
            (-x * x).exp()
        })
        .collect();
    let sky: Vec<f64> = (0..length).map(|i| 10_000.0 + 500.0 * (i as f64 * 0.01).sin()).collect();
    let measurement: Vec<f64> = sky
        .iter()
        .zip(cross_section.iter())
        .map(|(s, xs)| s * (-xs * 2.0e3 / 1e4).exp())
        .collect();

    let window = FitWindow::new(
        "bench",
        vec![Reference::new("SO2", cross_section, ParameterPolicy::Free, ParameterPolicy::Free, ParameterPolicy::Fixed(1.0))],
        3,
        FitInterval::new(20, length - 20),
        length,
        FitMode::HpSub,
        None,
        true,
    );

    (window, sky, measurement)
}

fn benchmark_solve(c: &mut Criterion) {
    let (window, sky, measurement) = synthetic_window(2048);

    let mut group = c.benchmark_group("doas_evaluate");
    group.bench_function("fit_window_2048px", |b| {
        b.iter(|| {
            let result = evaluate(black_box(&window), black_box(&sky), black_box(&measurement), black_box(0.3));
            black_box(result)
        })
    });
    group.finish();
}

criterion_group!(benches, benchmark_solve);
criterion_main!(benches);
