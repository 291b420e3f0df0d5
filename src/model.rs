//! The Buhlmann ZH-L16C tissue model: 16 compartments, gradient-factor
//! ceiling, and the oxygen-toxicity accumulators riding along with it.

use crate::compartment::Compartment;
use crate::config::Config;
use crate::depth::Depth;
use crate::gas::Gas;
use crate::ox_tox::OxTox;
use crate::time::Time;
use crate::zhl_values::ZHL_16C_N2_HE_VALUES;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuhlmannModel {
    config: Config,
    compartments: Vec<Compartment>,
    depth: Depth,
    time: Time,
    gas: Gas,
    gf_low_depth: Option<Depth>,
    ox_tox: OxTox,
}

impl BuhlmannModel {
    pub fn new(config: Config) -> Self {
        let compartments = ZHL_16C_N2_HE_VALUES
            .into_iter()
            .enumerate()
            .map(|(i, params)| Compartment::new(i as u8 + 1, params, &config))
            .collect();
        Self {
            config,
            compartments,
            depth: Depth::zero(),
            time: Time::zero(),
            gas: Gas::air(),
            gf_low_depth: None,
            ox_tox: OxTox::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn gas(&self) -> Gas {
        self.gas
    }

    pub fn cns(&self) -> f64 {
        self.ox_tox.cns()
    }

    pub fn otu(&self) -> f64 {
        self.ox_tox.otu()
    }

    /// Clones the model for speculative projection (no-fly time, adaptive
    /// ceiling convergence) without mutating the original.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    /// Records a constant-depth exposure of `time` at `depth` breathing
    /// `gas`.
    pub fn record(&mut self, depth: Depth, time: Time, gas: &Gas) {
        self.depth = depth;
        self.gas = *gas;
        self.time += time;
        self.recalculate(depth, time, gas, true);
    }

    /// Records travel between the model's current depth and `target_depth`
    /// over `time`, integrated in one-second Haldane steps (matches the
    /// teacher's `record_travel`; a Schreiner-equation closed form would be
    /// more precise but this engine never needs sub-second resolution).
    pub fn record_travel(&mut self, target_depth: Depth, time: Time, gas: &Gas) {
        self.gas = *gas;
        let distance = target_depth - self.depth;
        let rate_per_sec = distance.as_meters() / time.as_seconds().max(1e-9);
        let whole_seconds = time.as_seconds().floor() as i64;
        for _ in 0..whole_seconds {
            let step_depth = self.depth + Depth::from_meters(rate_per_sec);
            self.recalculate(step_depth, Time::from_seconds(1.0), gas, true);
            self.depth = step_depth;
            self.time += Time::from_seconds(1.0);
        }
        self.depth = target_depth;
    }

    /// Records travel at a given rate (m/s).
    pub fn record_travel_with_rate(&mut self, target_depth: Depth, rate_m_per_s: f64, gas: &Gas) {
        let distance = (target_depth - self.depth).as_meters().abs();
        self.record_travel(target_depth, Time::from_seconds(distance / rate_m_per_s), gas);
    }

    /// Shallowest depth at which every compartment's current loading is
    /// tolerated, modulated by the active gradient factor.
    pub fn ceiling(&self) -> Depth {
        self.leading_comp().ceiling()
    }

    /// 1-indexed number of the compartment currently controlling the
    /// ceiling.
    pub fn control_compartment(&self) -> u8 {
        self.leading_comp().no
    }

    /// Tolerated ambient pressure (bar) of the controlling compartment —
    /// used to annotate deco segments with the peak M-value encountered.
    pub fn m_value(&self) -> f64 {
        self.leading_comp().min_tolerable_amb_pressure
    }

    /// Absolute ambient pressure (bar) corresponding to [`Self::ceiling`],
    /// used by no-fly projection to compare against a target altitude's
    /// ambient pressure without an intermediate depth conversion.
    pub fn ceiling_in_absolute_pressure(&self) -> f64 {
        self.config.ambient_pressure_surface
            + crate::units::depth_to_pressure(self.ceiling().as_meters(), self.config.water_density)
    }

    fn leading_comp(&self) -> &Compartment {
        self.compartments
            .iter()
            .max_by(|a, b| {
                a.min_tolerable_amb_pressure
                    .partial_cmp(&b.min_tolerable_amb_pressure)
                    .unwrap()
            })
            .expect("model always has 16 compartments")
    }

    fn leading_comp_index(&self) -> usize {
        let mut index = 0;
        for (i, comp) in self.compartments.iter().enumerate().skip(1) {
            if comp.min_tolerable_amb_pressure > self.compartments[index].min_tolerable_amb_pressure {
                index = i;
            }
        }
        index
    }

    fn recalculate(&mut self, depth: Depth, time: Time, gas: &Gas, update_ox_tox: bool) {
        let (gf_low, gf_high) = self.config.gf;
        for comp in self.compartments.iter_mut() {
            comp.recalculate(depth, time, gas, gf_high, self.config.ambient_pressure_surface);
        }

        if gf_high != gf_low {
            let max_gf = self.calc_max_sloped_gf(depth);
            let leading = self.leading_comp_index();
            self.compartments[leading].recalculate(
                depth,
                Time::zero(),
                gas,
                max_gf,
                self.config.ambient_pressure_surface,
            );
        }

        if update_ox_tox {
            self.ox_tox
                .recalculate(depth, time, gas, self.config.ambient_pressure_surface);
        }
    }

    /// Maximum supersaturation permitted on the slope between `gf_low` (at
    /// the first deco stop) and `gf_high` (at the surface), for `depth`.
    ///
    /// In normal mode this fixes `gf_low_depth` on first entry into deco, as
    /// the profile is assumed to only get shallower from there. In
    /// `multilevel_mode` a later, deeper excursion can still deepen the
    /// theoretical first stop, so the depth is recomputed on every call
    /// instead of cached — it settles on its own once the dive enters its
    /// final ascent and stops generating deeper tissue loading.
    fn calc_max_sloped_gf(&mut self, depth: Depth) -> u8 {
        let (gf_low, gf_high) = self.config.gf;
        if self.ceiling() <= Depth::zero() {
            return gf_high;
        }

        let gf_low_depth = if self.config.multilevel_mode {
            self.compute_gf_low_depth(gf_low)
        } else {
            match self.gf_low_depth {
                Some(d) => d,
                None => {
                    let computed = self.compute_gf_low_depth(gf_low);
                    self.gf_low_depth = Some(computed);
                    computed
                }
            }
        };

        if depth > gf_low_depth {
            return gf_low;
        }

        self.gf_slope_point(gf_low_depth, depth)
    }

    fn compute_gf_low_depth(&self, gf_low: u8) -> Depth {
        let surface_pressure = self.config.ambient_pressure_surface;
        let gf_low_fraction = gf_low as f64 / 100.0;
        let mut max_depth_m = 0.0f64;
        for comp in self.compartments.iter() {
            let (_, a, b) = comp.weighted_zhl_params(comp.he_ip, comp.n2_ip);
            let max_amb_p =
                (comp.total_ip - gf_low_fraction * a) / (1.0 - gf_low_fraction + gf_low_fraction / b);
            let max_depth = crate::units::pressure_to_depth(
                (max_amb_p - surface_pressure).max(0.0),
                crate::units::DEFAULT_WATER_DENSITY,
            );
            max_depth_m = max_depth_m.max(max_depth);
        }
        Depth::from_meters(max_depth_m)
    }

    fn gf_slope_point(&self, gf_low_depth: Depth, depth: Depth) -> u8 {
        let (gf_low, gf_high) = self.config.gf;
        let slope = gf_high as f64
            - ((gf_high - gf_low) as f64 / gf_low_depth.as_meters()) * depth.as_meters();
        slope as u8
    }

    /// Resets deco-slope state for a fresh ascent — called when an existing
    /// model is inherited by a repetitive dive.
    pub fn reset_gradient_state(&mut self) {
        self.gf_low_depth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_ceiling_is_surface() {
        let model = BuhlmannModel::new(Config::default());
        assert_eq!(model.ceiling(), Depth::zero());
    }

    #[test]
    fn deep_dive_raises_ceiling() {
        let mut model = BuhlmannModel::new(Config::default().with_gradient_factors(30, 70));
        let air = Gas::air();
        model.record(Depth::from_meters(40.0), Time::from_minutes(30.0), &air);
        assert!(model.ceiling().as_meters() > 0.0);
    }

    #[test]
    fn max_gf_is_high_within_ndl() {
        let mut model = BuhlmannModel::new(Config::default().with_gradient_factors(50, 100));
        let air = Gas::air();
        model.record(Depth::zero(), Time::zero(), &air);
        assert_eq!(model.calc_max_sloped_gf(Depth::zero()), 100);
    }

    #[test]
    fn gf_slope_point_matches_linear_interpolation() {
        let model = BuhlmannModel::new(Config::default().with_gradient_factors(30, 85));
        let slope_point = model.gf_slope_point(Depth::from_meters(33.528), Depth::from_meters(30.48));
        assert_eq!(slope_point, 35);
    }

    #[test]
    fn record_travel_reaches_target_depth() {
        let mut model = BuhlmannModel::new(Config::default());
        let air = Gas::air();
        model.record_travel(Depth::from_meters(30.0), Time::from_seconds(90.0), &air);
        assert_eq!(model.depth(), Depth::from_meters(30.0));
    }

    #[test]
    fn fork_does_not_mutate_original() {
        let mut model = BuhlmannModel::new(Config::default());
        let air = Gas::air();
        model.record(Depth::from_meters(20.0), Time::from_minutes(5.0), &air);
        let mut sim = model.fork();
        sim.record(Depth::from_meters(40.0), Time::from_minutes(20.0), &air);
        assert_ne!(sim.depth(), model.depth());
        assert!(sim.ceiling().as_meters() >= model.ceiling().as_meters());
    }

    #[test]
    fn trimix_tracks_helium_separately_from_nitrogen() {
        let mut model = BuhlmannModel::new(Config::default());
        let tmx = Gas::new(0.21, 0.35).unwrap();
        model.record(Depth::from_meters(60.0), Time::from_minutes(15.0), &tmx);
        assert!(model.compartments[2].he_ip > 0.0);
    }
}
