use dive_plan_core::{BuhlmannModel, Config, Depth, Gas, Time};

fn main() {
    let mut model = BuhlmannModel::new(Config::default());

    let nitrox_32 = Gas::new(0.32, 0.0).unwrap();

    // ceiling after 20 min at 20 meters using EAN32
    model.record(Depth::from_meters(20.0), Time::from_minutes(20.0), &nitrox_32);
    println!("Ceiling: {}", model.ceiling());

    // ceiling after another 42 min at 30 meters using EAN32
    model.record(Depth::from_meters(30.0), Time::from_minutes(42.0), &nitrox_32);
    println!("Ceiling: {}", model.ceiling());
    println!("Controlling compartment: {}", model.control_compartment());
}
