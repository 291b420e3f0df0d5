use dive_plan_core::{Config, Depth, Dive, Gas, InputSegment, Tank, Time};

fn main() {
    let config = Config::default();
    let tank = Tank::new(0, Gas::air(), 1.4, None, 15.0, 200.0, "30b", &config).unwrap();
    let segments = vec![InputSegment::new(Depth::from_meters(30.0), Time::from_minutes(25.0), 0)];

    let mut dive = Dive::new(config, vec![tank], segments);
    dive.run().expect("valid profile");

    // commercial flight cabin altitude, no accelerator gas
    let no_fly = dive.no_flight_time(2438.0, None).unwrap();
    println!("No-fly time: {:.0} min", no_fly.as_minutes());
}
