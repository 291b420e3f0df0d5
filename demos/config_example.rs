use dive_plan_core::{BuhlmannModel, Config};

fn main() {
    // model with default config (GF 100/100)
    let default_config = Config::default();
    let model_1 = BuhlmannModel::new(default_config);
    println!("{:?}", model_1.config());

    // model with a full config instance
    let config_instance = Config::default()
        .with_water_density(1000.0) // fresh water
        .with_gradient_factors(85, 85);
    let model_2 = BuhlmannModel::new(config_instance);
    println!("{:?}", model_2.config());

    // model with fluent-interface-style config
    let config_with_gf = Config::default().with_gradient_factors(30, 70);
    let model_3 = BuhlmannModel::new(config_with_gf);
    println!("{:?}", model_3.config());
}
