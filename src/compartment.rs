//! A single ZH-L16C tissue compartment, tracking N2 and He loadings
//! separately and blending their Workman a/b coefficients by the weight of
//! each gas to derive the compartment's combined M-value line.

use crate::config::{Config, GradientFactor, GradientFactors};
use crate::depth::Depth;
use crate::gas::Gas;
use crate::time::Time;
use crate::units::{self, DEFAULT_WATER_DENSITY};
use crate::zhl_values::ZhlParams;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Supersaturation {
    pub gf_99: f64,
    pub gf_surf: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Compartment {
    pub no: u8,
    pub min_tolerable_amb_pressure: f64,
    pub total_ip: f64,
    pub n2_ip: f64,
    pub he_ip: f64,
    pub params: ZhlParams,
    surface_pressure: f64,
}

impl Compartment {
    /// Initial loadings: alveolar N2 at the surface, breathing air, water
    /// vapor corrected.
    pub fn new(no: u8, params: ZhlParams, config: &Config) -> Self {
        let surface_pressure = config.ambient_pressure_surface;
        let inspired_n2 = Gas::air()
            .inspired_partial_pressures(Depth::zero(), surface_pressure)
            .n2;
        let mut compartment = Self {
            no,
            params,
            n2_ip: inspired_n2,
            he_ip: 0.0,
            total_ip: inspired_n2,
            min_tolerable_amb_pressure: 0.0,
            surface_pressure,
        };
        compartment.min_tolerable_amb_pressure =
            compartment.calc_min_tolerable_amb_pressure(config.gf);
        compartment
    }

    /// Weighted half-time (unused by callers but kept for symmetry with the
    /// per-gas tuple), a, and b coefficients, blended by each inert gas's
    /// share of the total inert pressure.
    pub fn weighted_zhl_params(&self, he_ip: f64, n2_ip: f64) -> (f64, f64, f64) {
        let (n2_ht, n2_a, n2_b, he_ht, he_a, he_b) = self.params;
        let total = he_ip + n2_ip;
        if total <= 0.0 {
            return (n2_ht, n2_a, n2_b);
        }
        let ht = (he_ht * he_ip + n2_ht * n2_ip) / total;
        let a = (he_a * he_ip + n2_a * n2_ip) / total;
        let b = (he_b * he_ip + n2_b * n2_ip) / total;
        (ht, a, b)
    }

    pub fn recalculate(&mut self, depth: Depth, time: Time, gas: &Gas, gf_high: GradientFactor, surface_pressure: f64) {
        self.surface_pressure = surface_pressure;
        let inspired = gas.inspired_partial_pressures(depth, surface_pressure);
        let (n2_ht, _, _, he_ht, _, _) = self.params;
        self.n2_ip = Self::haldane(self.n2_ip, inspired.n2, n2_ht, time);
        self.he_ip = Self::haldane(self.he_ip, inspired.he, he_ht, time);
        self.total_ip = self.n2_ip + self.he_ip;
        self.min_tolerable_amb_pressure = self.calc_min_tolerable_amb_pressure_at(gf_high);
    }

    fn haldane(current: f64, inspired: f64, half_time: f64, time: Time) -> f64 {
        current + (inspired - current) * (1.0 - 2f64.powf(-(time.as_minutes()) / half_time))
    }

    fn calc_min_tolerable_amb_pressure(&self, gf: GradientFactors) -> f64 {
        self.calc_min_tolerable_amb_pressure_at(gf.1)
    }

    fn calc_min_tolerable_amb_pressure_at(&self, gf_high: GradientFactor) -> f64 {
        let (_, a_weighted, b_weighted) = self.weighted_zhl_params(self.he_ip, self.n2_ip);
        let gf_hi_fraction = gf_high as f64 / 100.0;
        let a_adjusted = a_weighted * gf_hi_fraction;
        let b_adjusted = b_weighted / (gf_hi_fraction - (gf_hi_fraction * b_weighted) + b_weighted);
        (self.total_ip - a_adjusted) * b_adjusted
    }

    /// Shallowest depth (meters) at which this compartment's current
    /// loading still satisfies its tolerated-ambient-pressure line.
    pub fn ceiling(&self) -> Depth {
        let delta = self.min_tolerable_amb_pressure - self.surface_pressure;
        if delta <= 0.0 {
            Depth::zero()
        } else {
            Depth::from_meters(units::pressure_to_depth(delta, DEFAULT_WATER_DENSITY))
        }
    }

    /// Current supersaturation expressed as a percentage of the M-value
    /// line, both at the present depth (`gf_99`) and referenced to a direct
    /// ascent to the surface (`gf_surf`).
    pub fn supersaturation(&self, surface_pressure: f64, depth: Depth) -> Supersaturation {
        let (_, a, b) = self.weighted_zhl_params(self.he_ip, self.n2_ip);
        let ambient_now = surface_pressure + units::depth_to_pressure(depth.as_meters(), DEFAULT_WATER_DENSITY);
        let m_value_now = a + ambient_now / b;
        let gf_99 = if m_value_now > ambient_now {
            ((self.total_ip - ambient_now) / (m_value_now - ambient_now)) * 100.0
        } else {
            0.0
        };

        let m_value_surf = a + surface_pressure / b;
        let gf_surf = if m_value_surf > surface_pressure {
            ((self.total_ip - surface_pressure) / (m_value_surf - surface_pressure)) * 100.0
        } else {
            0.0
        };

        Supersaturation { gf_99, gf_surf }
    }
}
