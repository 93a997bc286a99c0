use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phaser_dsp::{
    cic::SuperCic, complex_mul::ComplexMultiplier, cossin::CosSin, fft::BlockFft,
    hbf::HalfBandFir, iir::IirServo, interpolator::InterpolationMode, sample::Complex,
    SuperInterpolator,
};

fn bench_cossin(c: &mut Criterion) {
    let mut cs = CosSin::with_defaults();
    let mut z = 0u32;
    c.bench_function("cossin_step", |b| {
        b.iter(|| {
            z = z.wrapping_add(12345);
            black_box(cs.step(black_box(z)))
        })
    });
}

fn bench_complex_mul(c: &mut Criterion) {
    let mut cm = ComplexMultiplier::new(15);
    let a = Complex::new(1234, -5678);
    let b = Complex::new(-4321, 8765);
    c.bench_function("complex_multiplier_step", |bch| {
        bch.iter(|| black_box(cm.step(black_box(a), black_box(b))))
    });
}

fn bench_hbf(c: &mut Criterion) {
    let mut hbf = HalfBandFir::design(8, 17);
    let mut tick = 0u64;
    c.bench_function("half_band_fir_step", |b| {
        b.iter(|| {
            tick += 1;
            let input = if tick % 2 == 0 {
                Some(Complex::new(1000, -1000))
            } else {
                None
            };
            black_box(hbf.step(black_box(input)))
        })
    });
}

fn bench_super_cic(c: &mut Criterion) {
    let mut cic = SuperCic::new(3, 32, 18);
    c.bench_function("super_cic_step", |b| {
        b.iter(|| {
            let due = cic.input_due(8);
            let input = due.then_some(Complex::new(500, 500));
            black_box(cic.step(8, black_box(input)))
        })
    });
}

fn bench_interpolator_chain(c: &mut Criterion) {
    let mut interp = SuperInterpolator::with_defaults(InterpolationMode::Hbf0Hbf1Cic(4), 16);
    let rate = interp.rate() as u64;
    let mut tick = 0u64;
    c.bench_function("super_interpolator_step", |b| {
        b.iter(|| {
            let input = if tick % rate == 0 {
                Some(Complex::new(2000, -2000))
            } else {
                None
            };
            tick += 1;
            black_box(interp.step(black_box(input)))
        })
    });
}

fn bench_block_fft(c: &mut Criterion) {
    let transformer = BlockFft::new(10, 16, 0);
    let mut buf = vec![Complex::new(1, 0); transformer.len()];
    c.bench_function("block_fft_1024", |b| {
        b.iter(|| {
            transformer.forward(black_box(&mut buf));
        })
    });
}

fn bench_iir_servo(c: &mut Criterion) {
    let mut servo = IirServo::new(8, 1, 18, 1 << 20);
    for ch in 0..8 {
        servo.set_coeffs(ch, 0, 1 << 16, 0, -(1 << 10), 0);
    }
    let inputs = [100i64; 8];
    c.bench_function("iir_servo_full_sweep", |b| {
        b.iter(|| black_box(servo.sweep(black_box(&inputs))))
    });
}

criterion_group!(
    benches,
    bench_cossin,
    bench_complex_mul,
    bench_hbf,
    bench_super_cic,
    bench_interpolator_chain,
    bench_block_fft,
    bench_iir_servo,
);
criterion_main!(benches);
