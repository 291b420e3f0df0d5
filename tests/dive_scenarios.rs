//! Integration tests exercising the public crate API end to end: full dive
//! profiles, repetitive chains, and the invariants a conforming profile must
//! hold regardless of the exact numeric fixture used to construct it.

use dive_plan_core::{Config, Dive, EngineError, Gas, InputSegment, SegmentKind, Tank, Time};

fn air_tank(config: &Config, vol_l: f64, pressure_bar: f64, rule: &str) -> Tank {
    Tank::new(0, Gas::air(), 1.4, None, vol_l, pressure_bar, rule, config).unwrap()
}

#[test]
fn ten_meter_ten_minute_dive_matches_boundary_shape() {
    let config = Config::default();
    let tank = air_tank(&config, 12.0, 200.0, "30b");
    let segments = vec![InputSegment::new(
        dive_plan_core::Depth::from_meters(10.0),
        Time::from_minutes(10.0),
        0,
    )];
    let mut dive = Dive::new(config, vec![tank], segments);
    dive.run().unwrap();

    // 10m/10min, no-deco, round-trips to 11:00 (descent 30s + 600s hold +
    // ascent 60s) and consumes 365.55 L at the default 17/60 L/s rate.
    assert!((dive.run_time_seconds() - 660.0).abs() <= 3.0);
    assert!((dive.tanks()[0].used_gas_l - 365.55).abs() <= 0.5);

    // Shallow short air dive: negligible oxygen toxicity load.
    assert_eq!(dive.model().otu(), 0.0);
    assert!(dive.model().cns() < 1.0);

    assert!(dive.tanks()[0].check_reserve());

    let no_fly = dive.no_flight_time(2438.0, None).unwrap();
    assert!(no_fly.as_seconds() >= 0.0);
}

#[test]
fn deeper_dive_consumes_more_gas_and_more_no_fly_time() {
    let config = Config::default();

    let shallow_tank = air_tank(&config, 15.0, 200.0, "30b");
    let mut shallow = Dive::new(
        config,
        vec![shallow_tank],
        vec![InputSegment::new(
            dive_plan_core::Depth::from_meters(10.0),
            Time::from_minutes(10.0),
            0,
        )],
    );
    shallow.run().unwrap();

    let deep_tank = air_tank(&config, 15.0, 200.0, "30b");
    let mut deep = Dive::new(
        config,
        vec![deep_tank],
        vec![InputSegment::new(
            dive_plan_core::Depth::from_meters(20.0),
            Time::from_minutes(20.0),
            0,
        )],
    );
    deep.run().unwrap();

    // 20m/20min, no-deco, round-trips to 23:26 (1406s) and consumes
    // 1115.14 L at the default 17/60 L/s rate.
    assert!((deep.run_time_seconds() - 1406.0).abs() <= 3.0);
    assert!((deep.tanks()[0].used_gas_l - 1115.14).abs() <= 0.5);

    assert!(deep.tanks()[0].used_gas_l > shallow.tanks()[0].used_gas_l);
    assert!(deep.run_time_seconds() > shallow.run_time_seconds());

    let shallow_no_fly = shallow.no_flight_time(2438.0, None).unwrap();
    let deep_no_fly = deep.no_flight_time(2438.0, None).unwrap();
    assert!(deep_no_fly.as_seconds() >= shallow_no_fly.as_seconds());
}

#[test]
fn thin_reserve_tank_fails_check_reserve_after_long_dive() {
    let config = Config::default();
    // 18L/200bar with a strict 10-bar reserve rule, pushed by a long hold
    // at 40m: the tank should run below its reserve.
    let tank = air_tank(&config, 18.0, 200.0, "10b");
    let segments = vec![InputSegment::new(
        dive_plan_core::Depth::from_meters(40.0),
        Time::from_minutes(30.0),
        0,
    )];
    let mut dive = Dive::new(config, vec![tank], segments);
    dive.run().unwrap();

    // 40m/30min runs its deco schedule out to 83:06 (4986s) at 12.21% CNS.
    assert!((dive.run_time_seconds() - 4986.0).abs() <= 3.0);
    assert!((dive.model().cns() - 12.21).abs() <= 0.5);

    assert!(!dive.tanks()[0].check_reserve());
    assert!(dive.model().cns() > 0.0);
}

#[test]
fn excessive_depth_on_air_is_rejected_as_unauthorized_mod() {
    let config = Config::default();
    let tank = air_tank(&config, 12.0, 200.0, "30b");
    let segments = vec![InputSegment::new(
        dive_plan_core::Depth::from_meters(70.0),
        Time::from_minutes(10.0),
        0,
    )];
    let mut dive = Dive::new(config, vec![tank], segments);
    assert!(matches!(dive.run(), Err(EngineError::UnauthorizedMod(_))));
}

#[test]
fn repetitive_chain_accumulates_tissue_and_cns_load() {
    let config = Config::default();

    let mut first = Dive::new(
        config,
        vec![air_tank(&config, 15.0, 200.0, "30b")],
        vec![InputSegment::new(
            dive_plan_core::Depth::from_meters(40.0),
            Time::from_minutes(20.0),
            0,
        )],
    );
    first.run().unwrap();
    let cns_after_first = first.model().cns();

    first.surface_interval(Time::from_minutes(20.0));
    assert_eq!(first.surface_interval_seconds(), 1200.0);

    let mut second = Dive::from_previous(
        first,
        vec![air_tank(&config, 15.0, 200.0, "30b")],
        vec![InputSegment::new(
            dive_plan_core::Depth::from_meters(40.0),
            Time::from_minutes(20.0),
            0,
        )],
    );
    second.run().unwrap();

    assert!(second.is_repetitive_dive());
    assert!(second.model().cns() >= cns_after_first);
    assert!(second.model().ceiling().as_meters() <= 0.0);
}

#[test]
fn trimix_bottom_with_oxygen_deco_switches_tanks_on_ascent() {
    let config = Config::default().with_gradient_factors(30, 70);
    let bottom = Tank::new(0, Gas::new(0.18, 0.35).unwrap(), 1.4, None, 18.0, 200.0, "30b", &config).unwrap();
    let deco_ean50 = Tank::new(1, Gas::new(0.50, 0.0).unwrap(), 1.6, None, 11.0, 200.0, "30b", &config).unwrap();
    let deco_o2 = Tank::new(2, Gas::oxygen(), 1.6, None, 7.0, 200.0, "0b", &config).unwrap();

    let segments = vec![InputSegment::new(
        dive_plan_core::Depth::from_meters(45.0),
        Time::from_minutes(20.0),
        0,
    )];
    let mut dive = Dive::new(config, vec![bottom, deco_ean50, deco_o2], segments);
    dive.run().unwrap();

    assert!(dive.output_segments().iter().any(|s| s.kind == SegmentKind::Deco));
    // At least one deco segment switched away from the bottom (index-0
    // insertion) tank onto a shallower-MOD deco gas.
    let used_tank_indices: std::collections::HashSet<usize> =
        dive.output_segments().iter().map(|s| s.tank_index).collect();
    assert!(used_tank_indices.len() > 1);
    assert!(dive.model().ceiling().as_meters() <= 0.0);
}

#[test]
fn running_identical_inputs_twice_is_deterministic() {
    let config = Config::default();
    let build = || {
        Dive::new(
            config,
            vec![air_tank(&config, 12.0, 200.0, "30b")],
            vec![InputSegment::new(
                dive_plan_core::Depth::from_meters(18.0),
                Time::from_minutes(15.0),
                0,
            )],
        )
    };

    let mut a = build();
    let mut b = build();
    a.run().unwrap();
    b.run().unwrap();

    assert_eq!(a.output_segments(), b.output_segments());
    assert_eq!(a.tanks()[0].used_gas_l, b.tanks()[0].used_gas_l);
}

#[test]
fn tank_mass_balance_holds_after_run() {
    let config = Config::default();
    let tank = air_tank(&config, 12.0, 200.0, "30b");
    let total = tank.total_gas_l;
    let mut dive = Dive::new(
        config,
        vec![tank],
        vec![InputSegment::new(
            dive_plan_core::Depth::from_meters(15.0),
            Time::from_minutes(15.0),
            0,
        )],
    );
    dive.run().unwrap();

    let t = &dive.tanks()[0];
    assert!((t.used_gas_l + t.remaining_gas_l() - total).abs() < 1e-6);
}

#[test]
fn run_without_exceptions_on_empty_segments_leaves_output_empty() {
    let config = Config::default();
    let mut dive = Dive::new(config, vec![air_tank(&config, 12.0, 200.0, "30b")], vec![]);
    dive.run_without_exceptions();
    assert_eq!(dive.exceptions().len(), 1);
    assert!(dive.output_segments().is_empty());
}
