//! Immutable engine-wide configuration. Read only at dive/model construction
//! time and never mutated afterward; every value a dive needs beyond the
//! input segments and tanks lives here.

use crate::error::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TravelSwitch {
    Early,
    Late,
}

pub type GradientFactor = u8;
pub type GradientFactors = (GradientFactor, GradientFactor);

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub water_density: f64,
    pub ambient_pressure_surface: f64,
    pub descent_rate: f64,
    pub ascent_rate: f64,
    pub stop_depth_increment: f64,
    pub last_stop_depth: f64,
    pub stop_time_increment: f64,
    pub force_all_stops: bool,
    pub gf: GradientFactors,
    pub multilevel_mode: bool,
    pub use_oc_deco: bool,
    pub run_time: bool,
    pub dive_consumption_rate: f64,
    pub deco_consumption_rate: f64,
    pub default_max_ppo2: f64,
    pub absolute_max_ppo2: f64,
    pub absolute_min_ppo2: f64,
    pub default_max_end: f64,
    pub default_min_ppo2: f64,
    pub travel_switch: TravelSwitch,
    pub automatic_tank_refill: bool,
    pub flight_altitude: f64,
    pub water_vapor_temp_c: f64,
    pub real_gas_temp_c: f64,
    pub absolute_max_tank_pressure: f64,
    pub absolute_max_tank_volume: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            water_density: crate::units::DEFAULT_WATER_DENSITY,
            ambient_pressure_surface: 1.01325,
            descent_rate: 20.0 / 60.0,
            ascent_rate: 10.0 / 60.0,
            stop_depth_increment: 3.0,
            last_stop_depth: 3.0,
            stop_time_increment: 60.0,
            force_all_stops: true,
            gf: (100, 100),
            multilevel_mode: false,
            use_oc_deco: true,
            run_time: true,
            dive_consumption_rate: 17.0 / 60.0,
            deco_consumption_rate: 17.0 / 60.0,
            default_max_ppo2: 1.4,
            absolute_max_ppo2: 1.6,
            absolute_min_ppo2: 0.18,
            default_max_end: 30.0,
            default_min_ppo2: 0.18,
            travel_switch: TravelSwitch::Late,
            automatic_tank_refill: false,
            flight_altitude: 2438.0,
            water_vapor_temp_c: 37.0,
            real_gas_temp_c: 15.0,
            absolute_max_tank_pressure: 500.0,
            absolute_max_tank_volume: 30.0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_water_density(mut self, water_density: f64) -> Self {
        self.water_density = water_density;
        self
    }

    pub fn with_gradient_factors(mut self, gf_low: GradientFactor, gf_high: GradientFactor) -> Self {
        self.gf = (gf_low, gf_high);
        self
    }

    pub fn with_descent_rate(mut self, rate: f64) -> Self {
        self.descent_rate = rate;
        self
    }

    pub fn with_ascent_rate(mut self, rate: f64) -> Self {
        self.ascent_rate = rate;
        self
    }

    pub fn with_force_all_stops(mut self, force_all_stops: bool) -> Self {
        self.force_all_stops = force_all_stops;
        self
    }

    pub fn with_multilevel_mode(mut self, multilevel_mode: bool) -> Self {
        self.multilevel_mode = multilevel_mode;
        self
    }

    pub fn with_use_oc_deco(mut self, use_oc_deco: bool) -> Self {
        self.use_oc_deco = use_oc_deco;
        self
    }

    pub fn with_travel_switch(mut self, travel_switch: TravelSwitch) -> Self {
        self.travel_switch = travel_switch;
        self
    }

    pub fn with_flight_altitude(mut self, altitude_m: f64) -> Self {
        self.flight_altitude = altitude_m;
        self
    }

    pub fn with_absolute_max_tank_pressure(mut self, bar: f64) -> Self {
        self.absolute_max_tank_pressure = bar;
        self
    }

    pub fn with_absolute_max_tank_volume(mut self, liters: f64) -> Self {
        self.absolute_max_tank_volume = liters;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let (gf_low, gf_high) = self.gf;
        let gf_range = 1..=100;
        if !gf_range.contains(&gf_low) || !gf_range.contains(&gf_high) {
            return Err(EngineError::InstantiationError(
                "GF values have to be in 1-100 range".into(),
            ));
        }
        if gf_low > gf_high {
            return Err(EngineError::InstantiationError(
                "GFLow can't be higher than GFHigh".into(),
            ));
        }
        if self.water_density <= 0.0 {
            return Err(EngineError::InstantiationError(
                "water_density must be positive".into(),
            ));
        }
        if !(1.0..=30.0).contains(&(self.ascent_rate * 60.0)) {
            return Err(EngineError::InstantiationError(
                "ascent_rate must be in 1-30 m/min range".into(),
            ));
        }
        if self.stop_depth_increment <= 0.0 || self.last_stop_depth < 0.0 {
            return Err(EngineError::InstantiationError(
                "stop depth increments must be positive".into(),
            ));
        }
        if self.absolute_min_ppo2 >= self.absolute_max_ppo2 {
            return Err(EngineError::InstantiationError(
                "absolute_min_ppo2 must be below absolute_max_ppo2".into(),
            ));
        }
        Ok(())
    }
}
