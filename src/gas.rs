//! Breathing gas composition: fractions of O2/He/N2, partial pressures at
//! depth, and the narcotic/oxygen-limit conversions (MOD, min OD, END).

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::depth::Depth;
use crate::error::EngineError;
use crate::units::{depth_to_pressure, pressure_to_depth, ALVEOLAR_WATER_VAPOR_PRESSURE};

/// Narcotic index of nitrogen, relative to itself (reference value).
pub const N2_NARCOTIC_VALUE: f64 = 1.0;
/// Narcotic index of oxygen. dipplanner's default treats O2 as equally
/// narcotic to N2, which is the common conservative convention.
pub const O2_NARCOTIC_VALUE: f64 = 1.0;
/// Narcotic index of helium: effectively non-narcotic.
pub const HE_NARCOTIC_VALUE: f64 = 0.23;
/// Narcotic index of argon, used only in the reference-to-air computation.
pub const AR_NARCOTIC_VALUE: f64 = 2.33;

/// Ambient pressure at the surface, bar, used as the narcotic-index
/// reference point (distinct from a dive's configured surface pressure).
pub const AMBIENT_PRESSURE_SURFACE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PartialPressures {
    pub o2: f64,
    pub n2: f64,
    pub he: f64,
}

/// A breathing gas composition: fractions of O2, He, and (derived) N2.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gas {
    pub f_o2: f64,
    pub f_he: f64,
    pub f_n2: f64,
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Gas {
    /// Builds a gas from O2/He fractions, deriving N2 as the remainder.
    /// Fails with `InvalidGas` if the fractions are out of `0..=1` or
    /// their sum exceeds 1.
    pub fn new(f_o2: f64, f_he: f64) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&f_o2) {
            return Err(EngineError::InvalidGas(format!(
                "O2 fraction {f_o2} out of range"
            )));
        }
        if !(0.0..=1.0).contains(&f_he) {
            return Err(EngineError::InvalidGas(format!(
                "He fraction {f_he} out of range"
            )));
        }
        if f_o2 + f_he > 1.0 {
            return Err(EngineError::InvalidGas(format!(
                "O2 ({f_o2}) + He ({f_he}) fractions exceed 1.0"
            )));
        }
        Ok(Self {
            f_o2,
            f_he,
            f_n2: 1.0 - (f_o2 + f_he),
        })
    }

    pub fn air() -> Self {
        Self::new(0.21, 0.0).expect("air is a valid composition")
    }

    pub fn oxygen() -> Self {
        Self::new(1.0, 0.0).expect("pure O2 is a valid composition")
    }

    /// `"32/0"`-style identifier: O2%/He%.
    pub fn id(&self) -> String {
        format!("{:.0}/{:.0}", self.f_o2 * 100.0, self.f_he * 100.0)
    }

    /// Human-readable classification: Air, Oxygen, Nitrox NN, Heliox NN/MM,
    /// or Trimix NN/MM.
    pub fn name(&self) -> String {
        if self.f_he == 0.0 {
            if self.f_o2 == 0.21 {
                "Air".to_string()
            } else if self.f_o2 == 1.0 {
                "Oxygen".to_string()
            } else {
                format!("Nitrox {}", (self.f_o2 * 100.0) as i32)
            }
        } else {
            let composition = format!("{}/{}", (self.f_o2 * 100.0) as i32, (self.f_he * 100.0) as i32);
            if self.f_he + self.f_o2 == 1.0 {
                format!("Heliox {composition}")
            } else {
                format!("Trimix {composition}")
            }
        }
    }

    fn gas_pressures_compound(&self, gas_pressure: f64) -> PartialPressures {
        PartialPressures {
            o2: self.f_o2 * gas_pressure,
            n2: self.f_n2 * gas_pressure,
            he: self.f_he * gas_pressure,
        }
    }

    /// Partial pressures of each component at the given depth and surface
    /// pressure (bar).
    pub fn partial_pressures(&self, depth: Depth, surface_pressure: f64) -> PartialPressures {
        let ambient = surface_pressure + depth_to_pressure(depth.as_meters(), crate::units::DEFAULT_WATER_DENSITY);
        self.gas_pressures_compound(ambient)
    }

    /// Partial pressures as inspired at the alveoli, correcting for water
    /// vapor pressure.
    pub fn inspired_partial_pressures(&self, depth: Depth, surface_pressure: f64) -> PartialPressures {
        let ambient = surface_pressure + depth_to_pressure(depth.as_meters(), crate::units::DEFAULT_WATER_DENSITY)
            - ALVEOLAR_WATER_VAPOR_PRESSURE;
        self.gas_pressures_compound(ambient)
    }

    /// Maximum operating depth for a given ppO2 ceiling.
    pub fn max_operating_depth(&self, pp_o2_limit: f64) -> Depth {
        if self.f_o2 == 0.0 {
            return Depth::from_meters(f64::INFINITY);
        }
        Depth::from_meters((10.0 * ((pp_o2_limit / self.f_o2) - 1.0)).max(0.0))
    }

    /// Minimum operating depth for a given ppO2 floor (hypoxic mixes).
    pub fn min_operating_depth(&self, pp_o2_floor: f64) -> Depth {
        if self.f_o2 == 0.0 {
            return Depth::zero();
        }
        let d = 10.0 * ((pp_o2_floor / self.f_o2) - 1.0);
        Depth::from_meters(d.max(0.0))
    }

    fn narcotic_index(&self) -> f64 {
        self.f_n2 * N2_NARCOTIC_VALUE + self.f_o2 * O2_NARCOTIC_VALUE + self.f_he * HE_NARCOTIC_VALUE
    }

    fn air_reference_narcotic_index() -> f64 {
        AMBIENT_PRESSURE_SURFACE * (N2_NARCOTIC_VALUE * 0.7808 + O2_NARCOTIC_VALUE * 0.2095 + AR_NARCOTIC_VALUE * 0.00934)
    }

    /// Equivalent narcotic depth: the depth at which breathing air would
    /// produce the same narcotic load as this gas at `depth`.
    pub fn equivalent_narcotic_depth(&self, depth: Depth) -> Depth {
        let p_absolute = depth_to_pressure(depth.as_meters(), crate::units::DEFAULT_WATER_DENSITY)
            + AMBIENT_PRESSURE_SURFACE;
        let narcotic_index = p_absolute * self.narcotic_index();
        let end = pressure_to_depth(
            narcotic_index / Self::air_reference_narcotic_index() - AMBIENT_PRESSURE_SURFACE,
            crate::units::DEFAULT_WATER_DENSITY,
        );
        Depth::from_meters(end.max(0.0))
    }

    /// Inverse of [`equivalent_narcotic_depth`]: the actual depth this gas
    /// can be breathed at to stay within a given END.
    pub fn mod_for_given_end(&self, end: Depth) -> Depth {
        let reference_narcotic = Self::air_reference_narcotic_index();
        let narcotic_tank = self.narcotic_index();
        let p_absolute = (depth_to_pressure(end.as_meters(), crate::units::DEFAULT_WATER_DENSITY)
            + AMBIENT_PRESSURE_SURFACE)
            * reference_narcotic
            / narcotic_tank;
        let d = pressure_to_depth(
            p_absolute - AMBIENT_PRESSURE_SURFACE,
            crate::units::DEFAULT_WATER_DENSITY,
        );
        Depth::from_meters(d.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_gas_air() {
        let air = Gas::air();
        assert_eq!(air.f_o2, 0.21);
        assert!((air.f_n2 - 0.79).abs() < 1e-9);
        assert_eq!(air.f_he, 0.0);
    }

    #[test]
    fn valid_gas_trimix() {
        let tmx = Gas::new(0.18, 0.35).unwrap();
        assert_eq!(tmx.f_he, 0.35);
        assert!((tmx.f_n2 - 0.47).abs() < 1e-9);
    }

    #[test]
    fn invalid_o2_rejected() {
        assert!(Gas::new(1.1, 0.0).is_err());
        assert!(Gas::new(-0.1, 0.0).is_err());
        assert!(Gas::new(0.5, 0.51).is_err());
    }

    #[test]
    fn partial_pressures_air_at_10m() {
        let air = Gas::air();
        let pp = air.partial_pressures(Depth::from_meters(10.0), 1.0);
        assert!((pp.o2 - 0.42).abs() < 1e-3);
        assert!((pp.n2 - 1.58).abs() < 1e-3);
        assert_eq!(pp.he, 0.0);
    }

    #[test]
    fn mod_air() {
        let air = Gas::air();
        let mod_ = air.max_operating_depth(1.4);
        assert!((mod_.as_meters() - 56.666).abs() < 1e-2);
    }

    #[test]
    fn mod_pure_o2_is_shallow() {
        let o2 = Gas::oxygen();
        let mod_ = o2.max_operating_depth(1.6);
        assert!((mod_.as_meters() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn end_of_air_equals_depth() {
        let air = Gas::air();
        let end = air.equivalent_narcotic_depth(Depth::from_meters(40.0));
        assert!((end.as_meters() - 40.0).abs() < 0.5);
    }

    #[test]
    fn end_helium_mix_is_shallower() {
        let tmx = Gas::new(0.21, 0.35).unwrap();
        let end = tmx.equivalent_narcotic_depth(Depth::from_meters(60.0));
        assert!(end.as_meters() < 60.0);
    }

    #[test]
    fn naming_classification() {
        assert_eq!(Gas::air().name(), "Air");
        assert_eq!(Gas::oxygen().name(), "Oxygen");
        assert_eq!(Gas::new(0.32, 0.0).unwrap().name(), "Nitrox 32");
        assert_eq!(Gas::new(0.21, 0.35).unwrap().name(), "Trimix 21/35");
        assert_eq!(Gas::new(0.17, 0.83).unwrap().name(), "Heliox 17/83");
    }
}
