use dive_plan_core::{Config, Depth, Dive, Gas, InputSegment, Tank, Time};

fn main() {
    let config = Config::default().with_gradient_factors(30, 70);

    // bottom gas
    let bottom = Tank::new(0, Gas::air(), 1.4, None, 15.0, 200.0, "30b", &config).unwrap();
    // deco gases
    let ean_50 = Tank::new(1, Gas::new(0.5, 0.0).unwrap(), 1.6, None, 11.0, 200.0, "30b", &config).unwrap();
    let oxygen = Tank::new(2, Gas::oxygen(), 1.6, None, 7.0, 200.0, "0b", &config).unwrap();

    let segments = vec![InputSegment::new(
        Depth::from_meters(40.0),
        Time::from_minutes(20.0),
        0, // breathe the bottom tank
    )];

    let mut dive = Dive::new(config, vec![bottom, ean_50, oxygen], segments);
    dive.run().expect("valid profile");

    for seg in dive.output_segments() {
        println!(
            "{:?} {:?}m -> {:?}m, {:.0}s, tank {}, run_time {:.0}s",
            seg.kind,
            seg.start_depth.as_meters(),
            seg.end_depth.as_meters(),
            seg.duration.as_seconds(),
            seg.tank_index,
            seg.run_time.as_seconds(),
        );
    }

    println!("Total run time: {:.0}s", dive.run_time_seconds());
    println!("CNS: {:.1}%, OTU: {:.1}", dive.model().cns(), dive.model().otu());
    for tank in dive.tanks() {
        println!("{}: {}", tank.name(), tank.info());
    }
}
