//! Calibration loop benchmark: a 60x10 matrix is the common production
//! shape (one competency, one audit window).

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use calibra_analysis::irt::{calibrate, probability};
use calibra_analysis::matrix::{MatrixBuilder, ResponseMatrix};
use calibra_core::config::CalibrationConfig;
use calibra_core::types::{ItemId, Response, SessionId};

fn van_der_corput(mut n: u64) -> f64 {
    let mut q = 0.0;
    let mut bk = 0.5;
    while n > 0 {
        q += (n & 1) as f64 * bk;
        n >>= 1;
        bk *= 0.5;
    }
    q
}

fn build_matrix(respondents: usize, items: usize) -> ResponseMatrix {
    let mut responses = Vec::new();
    for j in 0..respondents {
        let theta = -2.0 + 4.0 * j as f64 / (respondents - 1) as f64;
        let session = SessionId::new(format!("s{j:03}"));
        for i in 0..items {
            let b = -1.5 + 3.0 * i as f64 / (items - 1) as f64;
            let p = probability(theta, 1.0 + 0.05 * i as f64, b);
            let score = if van_der_corput(j as u64 + 7 * i as u64 + 1) < p {
                1.0
            } else {
                0.0
            };
            responses.push(Response::new(
                session.clone(),
                ItemId::new(format!("q{i:02}")),
                score,
            ));
        }
    }
    MatrixBuilder::new(&CalibrationConfig::default()).build(&responses)
}

fn bench_calibration(c: &mut Criterion) {
    let config = CalibrationConfig::default();
    let small = build_matrix(60, 10);
    let large = build_matrix(500, 30);

    c.bench_function("calibrate_60x10", |bencher| {
        bencher.iter(|| calibrate(black_box(&small), &config))
    });
    c.bench_function("calibrate_500x30", |bencher| {
        bencher.iter(|| calibrate(black_box(&large), &config))
    });
}

criterion_group!(benches, bench_calibration);
criterion_main!(benches);
