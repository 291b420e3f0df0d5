//! The dive executor: walks a list of input segments against a tank
//! inventory and a tissue model, producing an annotated output profile.
//!
//! Construction never fails outright — like `dipplanner.dive.Dive.__init__`,
//! problems are captured so the caller can still inspect whatever state was
//! built — but running the profile (`run`) raises directly; `run_without_exceptions`
//! is the non-raising wrapper for callers that want the capture-everything
//! behavior end to end.

use crate::config::{Config, TravelSwitch};
use crate::depth::Depth;
use crate::error::EngineError;
use crate::gas::Gas;
use crate::model::BuhlmannModel;
use crate::segment::{InputSegment, OutputSegment, SegmentKind};
use crate::tank::Tank;
use crate::time::Time;
use crate::units;

const INFINITE_DECO_CAP_SECONDS: f64 = 300_000.0;
const NO_FLIGHT_GRANULE_SECONDS: f64 = 60.0;
const NO_FLIGHT_AIR_TANK_FILL_PRESSURE: f64 = 232.0;

/// Drives a single dive profile: input segments plus a tank inventory,
/// against an owned tissue model. Not `serde`-serializable as a whole — the
/// façade exposes read-only accessors (`output_segments`, `tanks`, ...)
/// rather than the executor's internal walking state.
#[derive(Debug, Clone)]
pub struct Dive {
    config: Config,
    model: BuhlmannModel,
    tanks: Vec<Tank>,
    input_segments: Vec<InputSegment>,
    output_segments: Vec<OutputSegment>,
    current_tank_index: usize,
    current_depth: Depth,
    pp_o2: f64,
    is_closed_circuit: bool,
    in_final_ascent: bool,
    run_time: Time,
    surface_interval: Time,
    no_flight_time_value: Option<Time>,
    is_repetitive_dive: bool,
    exceptions: Vec<EngineError>,
}

impl Dive {
    /// Starts a fresh dive with a brand-new model.
    pub fn new(config: Config, tanks: Vec<Tank>, input_segments: Vec<InputSegment>) -> Self {
        Self::build(config, BuhlmannModel::new(config), tanks, input_segments, false)
    }

    /// Starts a repetitive dive, inheriting the tissue loadings of the
    /// previous dive. Resets the gradient-factor slope state so the new
    /// dive fixes its own first-stop depth.
    pub fn from_previous(previous: Dive, tanks: Vec<Tank>, input_segments: Vec<InputSegment>) -> Self {
        let mut model = previous.model;
        model.reset_gradient_state();
        Self::build(previous.config, model, tanks, input_segments, true)
    }

    fn build(
        config: Config,
        model: BuhlmannModel,
        tanks: Vec<Tank>,
        input_segments: Vec<InputSegment>,
        is_repetitive_dive: bool,
    ) -> Self {
        Self {
            config,
            model,
            tanks: tanks.into_iter().filter(|t| t.in_use).collect(),
            input_segments: input_segments.into_iter().filter(|s| s.in_use).collect(),
            output_segments: Vec::new(),
            current_tank_index: 0,
            current_depth: Depth::zero(),
            pp_o2: 0.0,
            is_closed_circuit: false,
            in_final_ascent: false,
            run_time: Time::zero(),
            surface_interval: Time::zero(),
            no_flight_time_value: None,
            is_repetitive_dive,
            exceptions: Vec::new(),
        }
    }

    pub fn output_segments(&self) -> &[OutputSegment] {
        &self.output_segments
    }

    pub fn tanks(&self) -> &[Tank] {
        &self.tanks
    }

    pub fn run_time_seconds(&self) -> f64 {
        self.run_time.as_seconds()
    }

    pub fn model(&self) -> &BuhlmannModel {
        &self.model
    }

    pub fn exceptions(&self) -> &[EngineError] {
        &self.exceptions
    }

    pub fn is_repetitive_dive(&self) -> bool {
        self.is_repetitive_dive
    }

    /// Looks up a tank by its stable `insertion_index`, not by its current
    /// position in `self.tanks` — the Vec is re-sorted by MOD during `run`,
    /// so a raw position would drift out from under `tank_index` fields
    /// recorded on segments before the sort.
    fn tank_by_index(&self, tank_index: usize) -> &Tank {
        self.tanks
            .iter()
            .find(|t| t.insertion_index == tank_index)
            .expect("tank_index always refers to a tank present in this dive's inventory")
    }

    fn current_tank(&self) -> &Tank {
        self.tank_by_index(self.current_tank_index)
    }

    fn current_gas(&self) -> Gas {
        self.current_tank().gas
    }

    /// Runs the full profile: phases A through D. Raises directly; see
    /// [`Self::run_without_exceptions`] for the capturing variant.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.input_segments.is_empty() {
            return Err(EngineError::NothingToProcess);
        }

        self.validate_segments()?;
        self.initialize_state();

        self.patch_travel_gas()?;

        let mut run_time_flag = self.config.run_time;
        let segments = self.input_segments.clone();
        for seg in &segments {
            let delta_depth = seg.depth.as_meters() - self.current_depth.as_meters();
            if delta_depth > 0.0 {
                self.descend(seg.depth)?;
            } else if delta_depth < 0.0 {
                self.ascend(seg.depth)?;
            }

            self.current_depth = seg.depth;
            self.pp_o2 = seg.setpoint;
            self.is_closed_circuit = seg.setpoint > 0.0;
            self.current_tank_index = seg.tank_index;

            if seg.time.as_seconds() > 0.0 {
                let duration = if run_time_flag {
                    run_time_flag = false;
                    seg.time - self.run_time
                } else {
                    seg.time
                };
                let gas = self.current_gas();
                self.model.record(seg.depth, duration, &gas);
                self.output_segments.push(OutputSegment::dive(
                    seg.depth,
                    duration,
                    seg.tank_index,
                    self.pp_o2,
                ));
                self.run_time += duration;
            } else {
                self.output_segments
                    .push(OutputSegment::dive(seg.depth, Time::zero(), seg.tank_index, self.pp_o2));
            }
        }

        self.in_final_ascent = true;
        self.ascend(Depth::zero())?;

        self.backfill_run_times();
        self.consume_gas_for_all_segments();
        Ok(())
    }

    /// Like [`Self::run`], but funnels every error into [`Self::exceptions`]
    /// instead of returning it.
    pub fn run_without_exceptions(&mut self) {
        if let Err(err) = self.run() {
            self.exceptions.push(err);
        }
    }

    fn validate_segments(&self) -> Result<(), EngineError> {
        for seg in &self.input_segments {
            seg.check()?;
            if seg.setpoint == 0.0 {
                let tank = self.tank_by_index(seg.tank_index);
                let min_od = tank.min_operating_depth(self.config.default_min_ppo2);
                if seg.depth > tank.mod_m || seg.depth < min_od {
                    return Err(EngineError::UnauthorizedMod(format!(
                        "segment depth {:?} outside tank MOD window [{:?}, {:?}]",
                        seg.depth, min_od, tank.mod_m
                    )));
                }
            }
        }
        Ok(())
    }

    fn initialize_state(&mut self) {
        let first = self.input_segments[0];
        self.current_tank_index = first.tank_index;
        self.tanks.sort_by(|a, b| a.partial_cmp(b).unwrap());
        self.current_depth = Depth::zero();
        self.pp_o2 = first.setpoint;
        self.is_closed_circuit = first.setpoint > 0.0;
        self.in_final_ascent = false;
    }

    /// Phase B: if the descent tank is unbreathable at the surface, either
    /// adopt a better one outright or splice a mid-descent gas switch.
    fn patch_travel_gas(&mut self) -> Result<(), EngineError> {
        if self.is_closed_circuit {
            return Ok(());
        }
        let first_tank = self.tank_by_index(self.current_tank_index);
        if first_tank.min_operating_depth(self.config.absolute_min_ppo2) <= Depth::zero() {
            return Ok(());
        }

        let first_target = self.input_segments[0].depth;
        let mut reversed: Vec<usize> = (0..self.tanks.len()).collect();
        reversed.sort_by(|&a, &b| self.tanks[b].partial_cmp(&self.tanks[a]).unwrap());

        for &idx in &reversed {
            let tank = &self.tanks[idx];
            if tank.min_operating_depth(self.config.absolute_min_ppo2) <= Depth::zero()
                && tank.mod_m >= first_target
                && tank.end_for_depth(first_target).as_meters() < self.config.default_max_end
            {
                self.current_tank_index = tank.insertion_index;
                return Ok(());
            }
        }

        for &idx in &reversed {
            let tank = &self.tanks[idx];
            if tank.min_operating_depth(self.config.absolute_min_ppo2) <= Depth::zero() {
                let original_tank_index = self.input_segments[0].tank_index;
                let switch_tank_index = tank.insertion_index;
                let switch_depth = match self.config.travel_switch {
                    TravelSwitch::Late => {
                        tank.mod_m.min(tank.mod_for_end(Depth::from_meters(self.config.default_max_end)))
                    }
                    TravelSwitch::Early => {
                        self.tank_by_index(original_tank_index).min_operating_depth(self.config.default_min_ppo2)
                    }
                };
                let mut front = vec![
                    InputSegment::new(switch_depth, Time::zero(), switch_tank_index),
                    InputSegment::new(switch_depth, Time::zero(), original_tank_index),
                ];
                front.append(&mut self.input_segments);
                self.input_segments = front;
                self.current_tank_index = switch_tank_index;
                break;
            }
        }

        self.tanks.sort_by(|a, b| a.partial_cmp(b).unwrap());
        Ok(())
    }

    fn descend(&mut self, target_depth: Depth) -> Result<(), EngineError> {
        let gas = self.current_gas();
        let rate = self.config.descent_rate;
        self.model.record_travel_with_rate(target_depth, rate, &gas);
        self.output_segments.push(OutputSegment::asc_desc(
            self.current_depth,
            target_depth,
            Time::from_seconds((target_depth.as_meters() - self.current_depth.as_meters()).abs() / rate),
            self.current_tank_index,
            self.pp_o2,
        ));
        self.run_time += Time::from_seconds((target_depth.as_meters() - self.current_depth.as_meters()).abs() / rate);
        Ok(())
    }

    /// Implements §4.4: decompress on the way from `current_depth` to
    /// `target_depth`, emitting ascent, deco, and gas-switch segments.
    fn ascend(&mut self, target_depth: Depth) -> Result<(), EngineError> {
        if self.current_depth < target_depth {
            return Err(EngineError::ProcessingError(
                "not allowed to ascend while descending".into(),
            ));
        }

        if self.in_final_ascent && self.config.use_oc_deco {
            self.set_deco_gas(self.current_depth);
        }

        let mut next_stop_depth = self.next_rounded_stop(self.current_depth, target_depth);

        let mut start_depth = self.current_depth;
        let mut in_ascent_cycle = true;
        let mut force_deco_stop = false;

        let mut max_mv = self.model.m_value();
        let mut control = self.model.control_compartment();

        while self.current_depth > target_depth {
            let mut in_deco_cycle = false;
            let mut deco_stop_time = Time::zero();

            while force_deco_stop || next_stop_depth < self.model.ceiling() {
                in_deco_cycle = true;
                force_deco_stop = false;

                if in_ascent_cycle {
                    if start_depth > self.current_depth {
                        self.output_segments.push(OutputSegment::asc_desc(
                            start_depth,
                            self.current_depth,
                            Time::from_seconds(
                                (start_depth.as_meters() - self.current_depth.as_meters()).abs() / self.config.ascent_rate,
                            ),
                            self.current_tank_index,
                            self.pp_o2,
                        ));
                    }
                    in_ascent_cycle = false;
                }

                let granule = self.next_deco_granule(deco_stop_time);
                let gas = self.current_gas();
                self.model.record(self.current_depth, granule, &gas);
                deco_stop_time += granule;

                if deco_stop_time.as_seconds() > INFINITE_DECO_CAP_SECONDS {
                    return Err(EngineError::InfiniteDeco);
                }
            }

            if in_deco_cycle {
                self.run_time += deco_stop_time;
                if self.config.force_all_stops {
                    force_deco_stop = true;
                }
                self.output_segments.push(OutputSegment::deco(
                    self.current_depth,
                    deco_stop_time,
                    self.current_tank_index,
                    self.pp_o2,
                    max_mv,
                    self.config.gf,
                    control,
                ));
            } else if in_ascent_cycle {
                let gas = self.current_gas();
                self.model.record_travel_with_rate(next_stop_depth, self.config.ascent_rate, &gas);
                self.run_time += Time::from_seconds(
                    (self.current_depth.as_meters() - next_stop_depth.as_meters()).abs() / self.config.ascent_rate,
                );
            }

            self.current_depth = next_stop_depth;
            max_mv = self.model.m_value();
            control = self.model.control_compartment();

            let previous_tank_index = self.current_tank_index;
            if self.set_deco_gas(self.current_depth) && in_ascent_cycle {
                self.output_segments.push(OutputSegment::asc_desc(
                    start_depth,
                    self.current_depth,
                    Time::from_seconds(
                        (start_depth.as_meters() - self.current_depth.as_meters()).abs() / self.config.ascent_rate,
                    ),
                    previous_tank_index,
                    self.pp_o2,
                ));
                start_depth = self.current_depth;
            }

            next_stop_depth = self.next_rounded_stop_in_loop(self.current_depth, target_depth);
        }

        if in_ascent_cycle && start_depth > self.current_depth {
            self.output_segments.push(OutputSegment::asc_desc(
                start_depth,
                self.current_depth,
                Time::from_seconds(
                    (start_depth.as_meters() - self.current_depth.as_meters()).abs() / self.config.ascent_rate,
                ),
                self.current_tank_index,
                self.pp_o2,
            ));
        }

        Ok(())
    }

    /// First next-stop-depth computation before the ascent loop begins.
    fn next_rounded_stop(&self, current_depth: Depth, target_depth: Depth) -> Depth {
        let increment = self.config.stop_depth_increment;
        let current_m = current_depth.as_meters();
        let mut next = if current_m % increment > 0.0 {
            ((current_m / increment).floor()) * increment
        } else {
            current_m - increment
        };

        if next < target_depth.as_meters() || current_m < self.config.last_stop_depth {
            next = target_depth.as_meters();
        } else if next == self.config.last_stop_depth {
            next = target_depth.as_meters();
        } else if next < self.config.last_stop_depth {
            next = self.config.last_stop_depth;
        }
        Depth::from_meters(next)
    }

    /// Per spec.md §9's resolved open question: the plain subtraction is not
    /// clamped against `last_stop_depth` here; clamping happens only via the
    /// target/last-stop checks immediately below.
    fn next_rounded_stop_in_loop(&self, current_depth: Depth, target_depth: Depth) -> Depth {
        let increment = self.config.stop_depth_increment;
        let mut next = current_depth.as_meters() - increment;

        if next < target_depth.as_meters() || current_depth.as_meters() < self.config.last_stop_depth {
            next = target_depth.as_meters();
        }
        Depth::from_meters(next)
    }

    fn next_deco_granule(&self, deco_stop_time: Time) -> Time {
        let increment = self.config.stop_time_increment;
        if deco_stop_time == Time::zero() && self.run_time.as_seconds() % increment > 0.0 {
            let remainder = (self.run_time.as_seconds() / increment).floor() * increment + increment
                - self.run_time.as_seconds();
            if remainder == 0.0 {
                Time::from_seconds(increment)
            } else {
                Time::from_seconds(remainder)
            }
        } else {
            Time::from_seconds(increment)
        }
    }

    /// §4.6: returns `true` iff the current tank changed.
    fn set_deco_gas(&mut self, depth: Depth) -> bool {
        if !self.in_final_ascent || !self.config.use_oc_deco || self.tanks.is_empty() {
            return false;
        }

        let mut changed = false;
        let current_mod = self.current_tank().mod_m;
        for idx in 0..self.tanks.len() {
            let tank = &self.tanks[idx];
            if tank.mod_m >= depth && tank.min_operating_depth(self.config.absolute_min_ppo2) < depth && tank.mod_m < current_mod
            {
                if self.is_closed_circuit {
                    self.pp_o2 = 0.0;
                    self.is_closed_circuit = false;
                }
                self.current_tank_index = tank.insertion_index;
                changed = true;
            }
        }
        changed
    }

    fn backfill_run_times(&mut self) {
        let mut total = Time::zero();
        for seg in self.output_segments.iter_mut() {
            total += seg.duration;
            seg.run_time = total;
        }
    }

    fn consume_gas_for_all_segments(&mut self) {
        for i in 0..self.output_segments.len() {
            let seg = self.output_segments[i];
            let used = seg.gas_used_l(&self.config);
            if let Some(tank) = self.tanks.iter_mut().find(|t| t.insertion_index == seg.tank_index) {
                tank.consume_gas(used);
            }
        }
    }

    /// §4.9: integrates the owned model at surface pressure on air, in
    /// place, and records the interval. Optionally refills all tanks.
    pub fn surface_interval(&mut self, duration: Time) {
        let air = Gas::air();
        self.model.record(Depth::zero(), duration, &air);
        self.surface_interval = duration;
        if self.config.automatic_tank_refill {
            for tank in self.tanks.iter_mut() {
                tank.refill();
            }
        }
    }

    pub fn surface_interval_seconds(&self) -> f64 {
        self.surface_interval.as_seconds()
    }

    /// §4.8: deep-copies the model and projects it forward at surface
    /// pressure until the ceiling clears the target altitude's ambient
    /// pressure.
    pub fn no_flight_time(&mut self, altitude_m: f64, accelerator_tank: Option<Tank>) -> Result<Time, EngineError> {
        let target_pressure = units::altitude_to_ambient_pressure(altitude_m)?;

        let air_tank = Tank::new(
            0,
            Gas::air(),
            self.config.absolute_max_ppo2,
            None,
            30.0,
            NO_FLIGHT_AIR_TANK_FILL_PRESSURE,
            "30b",
            &self.config,
        )
        .expect("air tank at standard fill pressure always validates");

        let mut using_accelerator = accelerator_tank.is_some();
        let mut active_tank = accelerator_tank.unwrap_or(air_tank);

        let mut model_copy = self.model.fork();
        let mut elapsed = Time::zero();
        let granule = Time::from_seconds(NO_FLIGHT_GRANULE_SECONDS);

        while model_copy.ceiling_in_absolute_pressure() > target_pressure {
            let gas = active_tank.gas;
            model_copy.record(Depth::zero(), granule, &gas);
            elapsed += granule;

            if using_accelerator {
                if active_tank.remaining_gas_l() <= 0.0 {
                    using_accelerator = false;
                    active_tank = air_tank;
                } else {
                    active_tank.consume_gas(self.config.deco_consumption_rate * granule.as_seconds());
                }
            }

            if elapsed.as_seconds() > INFINITE_DECO_CAP_SECONDS {
                return Err(EngineError::InfiniteDeco);
            }
        }

        self.no_flight_time_value = Some(elapsed);
        Ok(elapsed)
    }

    pub fn no_flight_time_without_exception(&mut self, altitude_m: f64, accelerator_tank: Option<Tank>) {
        if let Err(err) = self.no_flight_time(altitude_m, accelerator_tank) {
            self.exceptions.push(err);
        }
    }

    pub fn no_flight_time_value(&self) -> Option<Time> {
        self.no_flight_time_value
    }
}
