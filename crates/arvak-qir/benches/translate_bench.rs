//! Benchmarks for QIR generation
//!
//! Run with: cargo bench -p arvak-qir

use arvak_ir::{Program, QubitId};
use arvak_qir::{BitcodeModule, Profile, translate};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f64::consts::PI;

/// Benchmark GHZ translation under both profiles
fn bench_ghz_translation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghz_translation");

    for num_qubits in &[5, 20, 100, 500] {
        let program = Program::ghz(*num_qubits).unwrap();
        for profile in Profile::ALL {
            group.bench_with_input(
                BenchmarkId::new(profile.as_str(), num_qubits),
                &program,
                |b, program| {
                    b.iter(|| translate(black_box(program), profile).unwrap());
                },
            );
        }
    }

    group.finish();
}

/// Benchmark a rotation-heavy layer, which exercises float rendering
fn bench_rotation_layers(c: &mut Criterion) {
    let mut program = Program::with_size("rotations", 20, 0);
    for layer in 0..50 {
        for q in 0..20 {
            let theta = PI * f64::from(layer * 20 + q) / 1000.0;
            program.rz(theta, QubitId(q)).unwrap();
        }
    }

    c.bench_function("rotation_layers", |b| {
        b.iter(|| translate(black_box(&program), Profile::Base).unwrap());
    });
}

/// Benchmark loading the bitcode back through LLVM
fn bench_decode(c: &mut Criterion) {
    let program = Program::ghz(200).unwrap();
    let bytes = translate(&program, Profile::Base).unwrap().bytes().to_vec();

    c.bench_function("decode_ghz_200", |b| {
        b.iter(|| BitcodeModule::parse(black_box(&bytes)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_ghz_translation,
    bench_rotation_layers,
    bench_decode
);
criterion_main!(benches);
