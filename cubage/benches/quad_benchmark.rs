use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wide::f64x4;

use cubage::integrand::{Integrand, SimdIntegrand};
use cubage::{Cubature, Quad, QuadConfig, Sub};

// Scalar integrand
struct GaussianIntegrand;

impl Integrand for GaussianIntegrand {
    fn dim(&self) -> usize {
        2
    }
    fn eval(&self, x: &[f64]) -> f64 {
        (-(x[0].powi(2)) - x[1].powi(2)).exp()
    }
}

// SIMD integrand
struct GaussianSimdIntegrand;
impl SimdIntegrand for GaussianSimdIntegrand {
    fn dim(&self) -> usize {
        2
    }
    fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
        let x = points[0];
        let y = points[1];
        (-(x * x) - (y * y)).exp()
    }
}

// Scalar 3D integrand
struct Complex3DIntegrand;
impl Integrand for Complex3DIntegrand {
    fn dim(&self) -> usize {
        3
    }
    fn eval(&self, x: &[f64]) -> f64 {
        x[0].sin() * x[1].cos() * (-(x[2] * x[2])).exp()
    }
}

// SIMD 3D integrand
struct Complex3DSimdIntegrand;
impl SimdIntegrand for Complex3DSimdIntegrand {
    fn dim(&self) -> usize {
        3
    }
    fn eval_simd(&self, points: &[f64x4]) -> f64x4 {
        let x = points[0];
        let y = points[1];
        let z = points[2];
        x.sin() * y.cos() * (-(z * z)).exp()
    }
}

fn quad_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gauss-Kronrod 1D");
    let quad = Quad::with_config(QuadConfig::one_dim().with_epsrel(1e-10));

    group.bench_function("Smooth", |b| {
        b.iter(|| quad.integrate(|x: f64| (-x * x).exp(), black_box(-3.0), black_box(3.0)))
    });

    group.bench_function("Endpoint singularity", |b| {
        b.iter(|| quad.integrate(f64::ln, black_box(0.0), black_box(1.0)))
    });

    group.bench_function("Reciprocal tail", |b| {
        b.iter(|| {
            quad.integrate_sub(
                |x: f64| 1.0 / (1.0 + x * x),
                black_box(1.0),
                f64::INFINITY,
                &Sub::Reciprocal,
            )
        })
    });
    group.finish();
}

fn cubature_benchmark(c: &mut Criterion) {
    let cubature = Cubature::with_config(QuadConfig::multi_dim().with_epsrel(1e-8));

    let mut group = c.benchmark_group("Genz-Malik 2D Gaussian");
    let (a2, b2) = ([-1.0, -1.0], [1.0, 1.0]);

    group.bench_function("Scalar", |b| {
        b.iter(|| cubature.integrate(black_box(&GaussianIntegrand), &a2, &b2))
    });

    group.bench_function("SIMD", |b| {
        b.iter(|| cubature.integrate_simd(black_box(&GaussianSimdIntegrand), &a2, &b2))
    });
    group.finish();

    let mut group2 = c.benchmark_group("Genz-Malik 3D Complex");
    let (a3, b3) = ([0.0; 3], [1.0; 3]);

    group2.bench_function("Scalar", |b| {
        b.iter(|| cubature.integrate(black_box(&Complex3DIntegrand), &a3, &b3))
    });

    group2.bench_function("SIMD", |b| {
        b.iter(|| cubature.integrate_simd(black_box(&Complex3DSimdIntegrand), &a3, &b3))
    });
    group2.finish();
}

criterion_group!(benches, quad_benchmark, cubature_benchmark);
criterion_main!(benches);
