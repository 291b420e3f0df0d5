use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dive_plan_core::{BuhlmannModel, Config, Depth, Gas, Time};

pub fn record_single_step(c: &mut Criterion) {
    let air = Gas::air();
    c.bench_function("record 1s step at 20m", |b| {
        b.iter(|| {
            let mut model = BuhlmannModel::new(Config::default());
            model.record(Depth::from_meters(20.0), Time::from_seconds(5.0), &air);
            black_box(model.ceiling());
        })
    });
}

pub fn ceiling_with_gf_slope(c: &mut Criterion) {
    let air = Gas::air();
    let config = Config::default().with_gradient_factors(30, 70);
    c.bench_function("ceiling, GF 30/70, after 40m/20min", |b| {
        b.iter(|| {
            let mut model = BuhlmannModel::new(config);
            model.record(Depth::from_meters(40.0), Time::from_minutes(20.0), &air);
            black_box(model.ceiling());
        })
    });
}

pub fn travel_descent(c: &mut Criterion) {
    let air = Gas::air();
    c.bench_function("descend 0m to 60m at 20m/min", |b| {
        b.iter(|| {
            let mut model = BuhlmannModel::new(Config::default());
            model.record_travel_with_rate(black_box(Depth::from_meters(60.0)), 20.0 / 60.0, &air);
        })
    });
}

pub fn model_fork(c: &mut Criterion) {
    let air = Gas::air();
    let mut model = BuhlmannModel::new(Config::default());
    model.record(Depth::from_meters(40.0), Time::from_minutes(20.0), &air);
    c.bench_function("fork loaded model (16 compartments)", |b| {
        b.iter(|| black_box(model.fork()))
    });
}

pub fn trimix_step(c: &mut Criterion) {
    let tmx = Gas::new(0.18, 0.35).unwrap();
    c.bench_function("record 1min step at 60m on trimix", |b| {
        b.iter(|| {
            let mut model = BuhlmannModel::new(Config::default());
            model.record(Depth::from_meters(60.0), Time::from_minutes(1.0), &tmx);
            black_box((model.cns(), model.otu()));
        })
    });
}

criterion_group!(
    benches,
    record_single_step,
    ceiling_with_gf_slope,
    travel_descent,
    model_fork,
    trimix_step,
);
criterion_main!(benches);
