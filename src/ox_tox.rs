//! Oxygen toxicity accumulators: OTU (pulmonary) and CNS% (central nervous
//! system), both incremented per recorded time step from inspired ppO2.

use crate::cns_table::CNS_COEFFICIENTS;
use crate::depth::Depth;
use crate::gas::Gas;
use crate::time::Time;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const CNS_ELIMINATION_HALF_TIME_MINUTES: f64 = 90.0;
const CNS_LIMIT_OVER_MAX_PPO2_SECONDS: f64 = 400.0;
const OTU_REFERENCE_PPO2: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OxTox {
    cns: f64,
    otu: f64,
}

impl OxTox {
    pub fn cns(&self) -> f64 {
        self.cns
    }

    pub fn otu(&self) -> f64 {
        self.otu
    }

    /// Updates both accumulators for one recorded step at constant `depth`
    /// for `time` breathing `gas`, given the dive's surface pressure (bar).
    pub fn recalculate(&mut self, depth: Depth, time: Time, gas: &Gas, surface_pressure: f64) {
        let pp_o2 = gas.inspired_partial_pressures(depth, surface_pressure).o2;
        self.recalculate_cns(pp_o2, depth, time);
        self.recalculate_otu(pp_o2, time);
    }

    fn recalculate_cns(&mut self, pp_o2: f64, depth: Depth, time: Time) {
        match self.assign_cns_coeffs(pp_o2) {
            Some((_, slope, intercept)) => {
                let t_lim_minutes = (slope as f64) * pp_o2 + (intercept as f64);
                self.cns += (time.as_seconds() / (t_lim_minutes * 60.0)) * 100.0;
            }
            None => {
                if depth.as_meters() == 0.0 && pp_o2 <= 0.5 {
                    self.cns /= 2f64.powf(time.as_seconds() / (CNS_ELIMINATION_HALF_TIME_MINUTES * 60.0));
                } else if pp_o2 > 1.6 {
                    self.cns += (time.as_seconds() / CNS_LIMIT_OVER_MAX_PPO2_SECONDS) * 100.0;
                }
            }
        }
    }

    fn assign_cns_coeffs(&self, pp_o2: f64) -> Option<(std::ops::RangeInclusive<f64>, i32, i32)> {
        for row in CNS_COEFFICIENTS.into_iter() {
            let in_range_start_exclusive = &pp_o2 != row.0.start() && row.0.contains(&pp_o2);
            if in_range_start_exclusive {
                return Some(row);
            }
        }
        None
    }

    fn recalculate_otu(&mut self, pp_o2: f64, time: Time) {
        if pp_o2 < OTU_REFERENCE_PPO2 {
            return;
        }
        let otu_per_minute = ((pp_o2 - OTU_REFERENCE_PPO2) / OTU_REFERENCE_PPO2).powf(5.0 / 6.0);
        self.otu += time.as_minutes() * otu_per_minute;
    }
}
