use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fusion_compass::{Certification, FusionHandle, SensorSample, VectorKind, fixed};
use rand::prelude::*;
use rand_pcg::Pcg64;
use std::f32::consts::PI;

// Pre-generated sensor data to eliminate RNG overhead during benchmarks
struct PreGeneratedData {
    samples: Vec<[SensorSample; 2]>,
    index: usize,
}

impl PreGeneratedData {
    fn new(count: usize, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            let time_us = i as u32 * 10_000; // 100Hz sample rate
            let theta = i as f32 * 0.05 * 2.0 * PI;

            // A rotating geomagnetic field with hard-iron bias and noise
            let mag = SensorSample::magnetometer(
                [
                    fixed::to_q16(40.0 * theta.cos() + 8.0 + rng.random_range(-0.5..0.5)),
                    fixed::to_q16(40.0 * theta.sin() - 5.0 + rng.random_range(-0.5..0.5)),
                    fixed::to_q16(-30.0 + rng.random_range(-0.5..0.5)),
                ],
                time_us,
            );

            // Gravity plus small motion noise
            let acc = SensorSample::accelerometer(
                [
                    fixed::to_q16(rng.random_range(-0.05..0.05)),
                    fixed::to_q16(rng.random_range(-0.05..0.05)),
                    fixed::to_q16(9.80665 + rng.random_range(-0.05..0.05)),
                ],
                time_us,
            );

            samples.push([mag, acc]);
        }

        Self { samples, index: 0 }
    }

    fn next(&mut self) -> [SensorSample; 2] {
        let sample = self.samples[self.index];
        self.index = (self.index + 1) % self.samples.len();
        sample
    }
}

/// Benchmark sample ingest through the guarded handle
fn bench_set_vector(c: &mut Criterion) {
    let handle = FusionHandle::new(Certification::default(), 1);
    handle.start_measurement(None);
    let mut data = PreGeneratedData::new(1024, 42);

    c.bench_function("set_vector", |b| {
        b.iter(|| {
            let batch = data.next();
            handle.set_vector(black_box(&batch)).unwrap();
        })
    });
}

/// Benchmark the fusion pipeline with filled windows
fn bench_compute_fusion(c: &mut Criterion) {
    let handle = FusionHandle::new(Certification::default(), 1);
    handle.start_measurement(None);
    let mut data = PreGeneratedData::new(1024, 42);

    // Fill both channel windows before measuring steady state
    for _ in 0..16 {
        handle.set_vector(&data.next()).unwrap();
    }

    c.bench_function("compute_fusion", |b| {
        b.iter(|| handle.compute_fusion().unwrap())
    });
}

/// Benchmark the full per-callback cycle: ingest, fuse, read
fn bench_full_cycle(c: &mut Criterion) {
    let handle = FusionHandle::new(Certification::default(), 1);
    handle.start_measurement(None);
    let mut data = PreGeneratedData::new(1024, 42);

    for _ in 0..16 {
        handle.set_vector(&data.next()).unwrap();
    }

    c.bench_function("full_cycle", |b| {
        b.iter(|| {
            let batch = data.next();
            handle.set_vector(black_box(&batch)).unwrap();
            handle.compute_fusion().unwrap();

            let mut orientation = [0i32; 3];
            handle
                .get_vector(VectorKind::Orientation, &mut orientation)
                .unwrap();
            black_box(orientation)
        })
    });
}

/// Benchmark calibration blob encode/decode round trip
fn bench_calibration_codec(c: &mut Criterion) {
    let handle = FusionHandle::new(Certification::default(), 1);
    handle.start_measurement(None);
    let mut blob = [0u8; fusion_compass::CALIBRATION_RECORD_SIZE];

    c.bench_function("calibration_codec", |b| {
        b.iter(|| {
            handle.stop_measurement(black_box(&mut blob)).unwrap();
            black_box(fusion_compass::CalibrationRecord::decode(&blob))
        })
    });
}

criterion_group!(
    benches,
    bench_set_vector,
    bench_compute_fusion,
    bench_full_cycle,
    bench_calibration_codec
);
criterion_main!(benches);
