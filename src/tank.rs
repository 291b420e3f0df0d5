//! A physical gas cylinder: composition, size/pressure, real-gas volume,
//! consumption bookkeeping, and the MOD/END conversions that make it usable
//! (or not) at a given depth.

use std::cmp::Ordering;

use crate::config::Config;
use crate::depth::Depth;
use crate::error::EngineError;
use crate::gas::Gas;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const VDW_A_O2: f64 = 1.382;
const VDW_B_O2: f64 = 0.03186;
const VDW_A_N2: f64 = 1.37;
const VDW_B_N2: f64 = 0.0387;
const VDW_A_HE: f64 = 0.0346;
const VDW_B_HE: f64 = 0.0238;
const VDW_R: f64 = 0.0831451;

/// A physical cylinder holding a [`Gas`] mixture at some pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tank {
    pub gas: Gas,
    pub max_ppo2: f64,
    pub tank_vol_l: f64,
    pub tank_pressure_bar: f64,
    pub mod_m: Depth,
    pub in_use: bool,
    pub total_gas_l: f64,
    pub used_gas_l: f64,
    pub min_gas_l: f64,
    /// Stable ordering tiebreak, set at construction from insertion order.
    pub insertion_index: usize,
}

impl Tank {
    /// Builds a tank. `mod_override` lets the caller pin a shallower MOD
    /// than the gas's ppO2 limit would otherwise allow; a deeper override is
    /// rejected.
    pub fn new(
        insertion_index: usize,
        gas: Gas,
        max_ppo2: f64,
        mod_override: Option<Depth>,
        tank_vol_l: f64,
        tank_pressure_bar: f64,
        tank_rule: &str,
        config: &Config,
    ) -> Result<Self, EngineError> {
        let calculated_mod = Self::calculate_mod(gas, max_ppo2);
        let mod_m = match mod_override {
            Some(requested) => {
                if requested > calculated_mod {
                    return Err(EngineError::InvalidMod(
                        "requested MOD exceeds maximum MOD for the given max ppO2".into(),
                    ));
                }
                requested
            }
            None => calculated_mod,
        };

        let mut tank = Self {
            gas,
            max_ppo2,
            tank_vol_l,
            tank_pressure_bar,
            mod_m,
            in_use: true,
            total_gas_l: 0.0,
            used_gas_l: 0.0,
            min_gas_l: 0.0,
            insertion_index,
        };
        tank.validate(config)?;

        tank.total_gas_l = tank.calculate_real_volume(tank_vol_l, tank_pressure_bar, gas, config);
        tank.min_gas_l = tank.parse_reserve_rule(tank_rule, config);
        Ok(tank)
    }

    fn validate(&self, config: &Config) -> Result<(), EngineError> {
        if self.gas.f_o2 + self.gas.f_he > 1.0 {
            return Err(EngineError::InvalidGas(
                "proportion of O2+He is more than 100%".into(),
            ));
        }
        if self.gas.f_o2 <= 0.0 || self.gas.f_he < 0.0 || self.gas.f_n2 < 0.0 {
            return Err(EngineError::InvalidGas("proportion of O2 must be greater than 0".into()));
        }
        if self.mod_m.as_meters() <= 0.0 {
            return Err(EngineError::InvalidMod("MOD should be >= 0".into()));
        }
        let max_mod = Self::calculate_mod(self.gas, self.max_ppo2);
        let absolute_max_mod = Self::calculate_mod(self.gas, config.absolute_max_ppo2);
        if self.mod_m > max_mod || self.mod_m > absolute_max_mod {
            return Err(EngineError::InvalidMod(
                "MOD exceeds maximum tolerable MOD".into(),
            ));
        }
        if self.tank_pressure_bar > config.absolute_max_tank_pressure {
            return Err(EngineError::InvalidTank(
                "tank pressure exceeds maximum tolerable pressure".into(),
            ));
        }
        if self.tank_pressure_bar <= 0.0 {
            return Err(EngineError::InvalidTank(
                "tank pressure should be greater than zero".into(),
            ));
        }
        if self.tank_vol_l > config.absolute_max_tank_volume {
            return Err(EngineError::InvalidTank(
                "tank size exceeds maximum tolerable tank size".into(),
            ));
        }
        if self.tank_vol_l <= 0.0 {
            return Err(EngineError::InvalidTank(
                "tank size should be greater than zero".into(),
            ));
        }
        Ok(())
    }

    fn calculate_mod(gas: Gas, max_ppo2: f64) -> Depth {
        if gas.f_o2 == 0.0 {
            return Depth::from_meters(f64::INFINITY);
        }
        Depth::from_meters((10.0 * (max_ppo2 / gas.f_o2) - 10.0).max(0.0).floor())
    }

    /// Solves Van der Waals `(P + n^2 a/V^2)(V - nb) = nRT` for `n`, then
    /// reconverts to the free-gas volume at atmospheric pressure. Mixing
    /// rule is the plain `sum sqrt(a_i a_j) f_i f_j` form (no binary
    /// interaction correction — acceptable for O2/N2/He per the spec's
    /// resolved open question).
    fn calculate_real_volume(&self, tank_vol_l: f64, tank_pressure_bar: f64, gas: Gas, config: &Config) -> f64 {
        let t = 273.15 + config.real_gas_temp_c;
        let (f_o2, f_he, f_n2) = (gas.f_o2, gas.f_he, gas.f_n2);

        let a_gas = (VDW_A_O2 * VDW_A_O2).sqrt() * f_o2 * f_o2
            + (VDW_A_O2 * VDW_A_HE).sqrt() * f_o2 * f_he
            + (VDW_A_O2 * VDW_A_N2).sqrt() * f_o2 * f_n2
            + (VDW_A_HE * VDW_A_O2).sqrt() * f_he * f_o2
            + (VDW_A_HE * VDW_A_HE).sqrt() * f_he * f_he
            + (VDW_A_HE * VDW_A_N2).sqrt() * f_he * f_n2
            + (VDW_A_N2 * VDW_A_O2).sqrt() * f_n2 * f_o2
            + (VDW_A_N2 * VDW_A_HE).sqrt() * f_n2 * f_he
            + (VDW_A_N2 * VDW_A_N2).sqrt() * f_n2 * f_n2;

        let b_gas = (VDW_B_O2 * VDW_B_O2).sqrt() * f_o2 * f_o2
            + (VDW_B_O2 * VDW_B_HE).sqrt() * f_o2 * f_he
            + (VDW_B_O2 * VDW_B_N2).sqrt() * f_o2 * f_n2
            + (VDW_B_HE * VDW_B_O2).sqrt() * f_he * f_o2
            + (VDW_B_HE * VDW_B_HE).sqrt() * f_he * f_he
            + (VDW_B_HE * VDW_B_N2).sqrt() * f_he * f_n2
            + (VDW_B_N2 * VDW_B_O2).sqrt() * f_n2 * f_o2
            + (VDW_B_N2 * VDW_B_HE).sqrt() * f_n2 * f_he
            + (VDW_B_N2 * VDW_B_N2).sqrt() * f_n2 * f_n2;

        let approx_n = (tank_pressure_bar * tank_vol_l) / (VDW_R * t);
        let pressure_at = |n: f64| -> f64 {
            (n * VDW_R * t) / (tank_vol_l - n * b_gas) - (n * n * a_gas) / (tank_vol_l * tank_vol_l)
        };

        let mid_pressure = pressure_at(approx_n);
        let (mut n_left, mut n_right) = if mid_pressure < tank_pressure_bar {
            (approx_n, approx_n * 2.0)
        } else {
            (approx_n / 2.0, approx_n)
        };

        let mut n_mid = (n_left + n_right) / 2.0;
        let mut current_pressure = pressure_at(n_mid);
        while (current_pressure * 100.0).round() != (tank_pressure_bar * 100.0).round() {
            n_mid = (n_left + n_right) / 2.0;
            current_pressure = pressure_at(n_mid);
            if current_pressure > tank_pressure_bar {
                n_right = n_mid;
            } else {
                n_left = n_mid;
            }
        }

        let surface = config.ambient_pressure_surface;
        n_mid * VDW_R.powi(3) * t.powi(3) / (surface * VDW_R.powi(2) * t.powi(2) + a_gas * surface.powi(2))
            + n_mid * b_gas
    }

    fn parse_reserve_rule(&self, tank_rule: &str, _config: &Config) -> f64 {
        if let Some(bars) = tank_rule.strip_suffix('b').and_then(|n| n.parse::<f64>().ok()) {
            return self.calculate_real_volume(self.tank_vol_l, bars, self.gas, _config);
        }
        if let Some(k) = tank_rule
            .strip_prefix("1/")
            .and_then(|n| n.parse::<f64>().ok())
        {
            if k != 0.0 {
                return self.total_gas_l * (1.0 - 2.0 / k);
            }
        }
        0.0
    }

    pub fn remaining_gas_l(&self) -> f64 {
        self.total_gas_l - self.used_gas_l
    }

    pub fn consume_gas(&mut self, gas_consumed_l: f64) {
        self.used_gas_l += gas_consumed_l;
    }

    pub fn refill(&mut self) {
        self.used_gas_l = 0.0;
    }

    /// `false` once remaining gas has fallen below the configured reserve.
    pub fn check_reserve(&self) -> bool {
        self.remaining_gas_l() >= self.min_gas_l
    }

    pub fn mod_for_ppo2(&self, ppo2: f64) -> Depth {
        Self::calculate_mod(self.gas, ppo2)
    }

    /// Shallowest depth at which this gas provides at least `min_ppo2`.
    pub fn min_operating_depth(&self, min_ppo2: f64) -> Depth {
        self.gas.min_operating_depth(min_ppo2)
    }

    pub fn end_for_depth(&self, depth: Depth) -> Depth {
        self.gas.equivalent_narcotic_depth(depth)
    }

    pub fn mod_for_end(&self, end: Depth) -> Depth {
        self.gas.mod_for_given_end(end)
    }

    pub fn name(&self) -> String {
        self.gas.name()
    }

    /// `"15.0l-90.0% (2700.00/3000.00l)"`-style status string.
    pub fn info(&self) -> String {
        if self.total_gas_l > 0.0 {
            format!(
                "{}l-{:.1}% ({:.2}/{:.2}l)",
                self.tank_vol_l,
                (100.0 * self.remaining_gas_l() / self.total_gas_l * 10.0).round() / 10.0,
                self.remaining_gas_l(),
                self.total_gas_l
            )
        } else {
            format!("(no tank info, used:{}l)", self.used_gas_l)
        }
    }
}

impl PartialOrd for Tank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(
            self.mod_m
                .partial_cmp(&other.mod_m)
                .unwrap_or(Ordering::Equal)
                .then(self.insertion_index.cmp(&other.insertion_index)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air12l(config: &Config) -> Tank {
        Tank::new(0, Gas::air(), 1.6, None, 12.0, 200.0, "30b", config).unwrap()
    }

    #[test]
    fn air_tank_has_positive_total_gas() {
        let config = Config::default();
        let tank = air12l(&config);
        assert!(tank.total_gas_l > 2000.0);
        assert!(tank.total_gas_l < 2600.0);
    }

    #[test]
    fn consume_and_refill_round_trip() {
        let config = Config::default();
        let mut tank = air12l(&config);
        let total = tank.total_gas_l;
        tank.consume_gas(500.0);
        assert_eq!(tank.used_gas_l, 500.0);
        assert!((tank.remaining_gas_l() - (total - 500.0)).abs() < 1e-9);
        tank.refill();
        assert_eq!(tank.used_gas_l, 0.0);
        assert_eq!(tank.remaining_gas_l(), total);
    }

    #[test]
    fn consume_gas_can_go_negative_without_raising() {
        let config = Config::default();
        let mut tank = air12l(&config);
        tank.consume_gas(tank.total_gas_l + 1000.0);
        assert!(tank.remaining_gas_l() < 0.0);
        assert!(!tank.check_reserve());
    }

    #[test]
    fn reserve_rule_bars_parses() {
        let config = Config::default();
        let tank = Tank::new(0, Gas::air(), 1.6, None, 18.0, 200.0, "10b", &config).unwrap();
        assert!(tank.min_gas_l > 0.0);
    }

    #[test]
    fn reserve_rule_thirds_parses() {
        let config = Config::default();
        let tank = Tank::new(0, Gas::air(), 1.6, None, 12.0, 200.0, "1/3", &config).unwrap();
        let expected = tank.total_gas_l * (1.0 - 2.0 / 3.0);
        assert!((tank.min_gas_l - expected).abs() < 1e-6);
    }

    #[test]
    fn reserve_rule_unknown_is_zero() {
        let config = Config::default();
        let tank = Tank::new(0, Gas::air(), 1.6, None, 12.0, 200.0, "nonsense", &config).unwrap();
        assert_eq!(tank.min_gas_l, 0.0);
    }

    #[test]
    fn mod_override_must_not_exceed_calculated() {
        let config = Config::default();
        let too_deep = Depth::from_meters(100.0);
        let result = Tank::new(0, Gas::air(), 1.4, Some(too_deep), 12.0, 200.0, "30b", &config);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_gas_fractions_rejected() {
        let config = Config::default();
        // f_o2+f_he > 1 is rejected by Gas::new already, but Tank validates
        // the tank-level invariants independently once constructed with
        // a valid Gas.
        let gas = Gas::new(0.0, 0.0).unwrap();
        let result = Tank::new(0, gas, 1.4, None, 12.0, 200.0, "30b", &config);
        assert!(result.is_err()); // f_o2 == 0 => infinite MOD, rejected by max_ppo2 bound check
    }

    #[test]
    fn ordering_by_mod_with_insertion_tiebreak() {
        let config = Config::default();
        let deco1 = Tank::new(0, Gas::new(0.50, 0.0).unwrap(), 1.6, None, 7.0, 200.0, "0b", &config).unwrap();
        let deco2 = Tank::new(1, Gas::new(0.80, 0.0).unwrap(), 1.6, None, 7.0, 200.0, "0b", &config).unwrap();
        assert!(deco2 < deco1 || deco2.mod_m == deco1.mod_m);
    }

    #[test]
    fn naming_matches_gas_classification() {
        let config = Config::default();
        let tank = air12l(&config);
        assert_eq!(tank.name(), "Air");
    }
}
