//! Pure functions mapping depth to/from ambient pressure, and atmospheric
//! helpers (altitude-corrected surface pressure, water vapor pressure).
//!
//! Grounded on `original_source/tests/tools_test.py`: EN13319 seawater
//! density (1030 kg/m3) and standard gravity reproduce that fixture's
//! `depth_to_pressure(10) == 1.01043` bar exactly.

use crate::error::EngineError;

/// Standard gravity, m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Default water density (seawater, EN13319), kg/m^3.
pub const DEFAULT_WATER_DENSITY: f64 = 1030.0;

/// Standard atmosphere at sea level, bar.
pub const STANDARD_ATMOSPHERE_BAR: f64 = 1.01325;

const BAROMETRIC_LAPSE_RATE: f64 = 0.0065; // K/m
const BAROMETRIC_SEA_LEVEL_TEMP: f64 = 288.15; // K
const BAROMETRIC_MOLAR_MASS_AIR: f64 = 0.0289644; // kg/mol
const BAROMETRIC_GAS_CONSTANT: f64 = 8.31446; // J/(mol*K)

const MIN_ALTITUDE_M: f64 = 0.0;
const MAX_ALTITUDE_M: f64 = 10_000.0;
const MIN_TEMP_C: f64 = -20.0;
const MAX_TEMP_C: f64 = 60.0;

/// Converts a depth in meters of water into the gauge pressure (bar) that
/// column of water exerts, given a water density in kg/m^3.
pub fn depth_to_pressure(depth_m: f64, water_density: f64) -> f64 {
    water_density * STANDARD_GRAVITY * depth_m / 100_000.0
}

/// Inverse of [`depth_to_pressure`].
pub fn pressure_to_depth(pressure_bar: f64, water_density: f64) -> f64 {
    pressure_bar * 100_000.0 / (water_density * STANDARD_GRAVITY)
}

/// International barometric formula: ambient (atmospheric) pressure at a
/// given altitude above sea level, in bar.
///
/// Domain: `0..=10000` meters. Returns `OutOfRange` outside that domain.
pub fn altitude_to_ambient_pressure(altitude_m: f64) -> Result<f64, EngineError> {
    if !(MIN_ALTITUDE_M..=MAX_ALTITUDE_M).contains(&altitude_m) {
        return Err(EngineError::OutOfRange(format!(
            "altitude {altitude_m}m out of range [{MIN_ALTITUDE_M}, {MAX_ALTITUDE_M}]"
        )));
    }
    let base = 1.0 - (BAROMETRIC_LAPSE_RATE * altitude_m) / BAROMETRIC_SEA_LEVEL_TEMP;
    let exponent = (STANDARD_GRAVITY * BAROMETRIC_MOLAR_MASS_AIR)
        / (BAROMETRIC_GAS_CONSTANT * BAROMETRIC_LAPSE_RATE);
    Ok(STANDARD_ATMOSPHERE_BAR * base.powf(exponent))
}

/// Saturated water vapor partial pressure at the alveoli, bar, as a
/// function of body/ambient temperature in Celsius (Antoine-like curve).
///
/// Domain: `-20..=60` Celsius. Returns `OutOfRange` outside that domain.
pub fn pp_h2o_at(temp_c: f64) -> Result<f64, EngineError> {
    if !(MIN_TEMP_C..=MAX_TEMP_C).contains(&temp_c) {
        return Err(EngineError::OutOfRange(format!(
            "temperature {temp_c}C out of range [{MIN_TEMP_C}, {MAX_TEMP_C}]"
        )));
    }
    // Antoine equation for water (bar, Kelvin), valid for the liquid-vapor
    // range this engine cares about (surface / alveolar conditions).
    const A: f64 = 5.40221;
    const B: f64 = 1838.675;
    const C: f64 = -31.737;
    let t_k = 273.15 + temp_c.max(0.0);
    let log10_p = A - B / (t_k + C);
    Ok(10f64.powf(log10_p))
}

/// Alveolar water vapor pressure at body temperature (37C), Buhlmann's
/// conventional value, bar.
pub const ALVEOLAR_WATER_VAPOR_PRESSURE: f64 = 0.0627;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_pressure_round_trip() {
        for p in [0.0, 1.0, 5.0, 10.0, 20.0] {
            let d = pressure_to_depth(p, DEFAULT_WATER_DENSITY);
            let back = depth_to_pressure(d, DEFAULT_WATER_DENSITY);
            assert!((back - p).abs() < 1e-5, "p={p} back={back}");
        }
    }

    #[test]
    fn depth_to_pressure_matches_en13319_fixture() {
        // original_source/tests/tools_test.py: depth_to_pressure(10) == 1.01043
        let p = depth_to_pressure(10.0, DEFAULT_WATER_DENSITY);
        assert!((p - 1.01043).abs() < 1e-4, "p={p}");
    }

    #[test]
    fn altitude_pressure_decreases_with_altitude() {
        let sea_level = altitude_to_ambient_pressure(0.0).unwrap();
        let high = altitude_to_ambient_pressure(3000.0).unwrap();
        assert!((sea_level - STANDARD_ATMOSPHERE_BAR).abs() < 1e-6);
        assert!(high < sea_level);
    }

    #[test]
    fn altitude_out_of_range() {
        assert!(altitude_to_ambient_pressure(-1.0).is_err());
        assert!(altitude_to_ambient_pressure(10_001.0).is_err());
    }

    #[test]
    fn pp_h2o_increases_with_temperature() {
        let low = pp_h2o_at(0.0).unwrap();
        let high = pp_h2o_at(40.0).unwrap();
        assert!(high > low);
    }

    #[test]
    fn pp_h2o_out_of_range() {
        assert!(pp_h2o_at(-21.0).is_err());
        assert!(pp_h2o_at(61.0).is_err());
    }
}
