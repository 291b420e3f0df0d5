//! Dive plan segments: what the user asks for (`InputSegment`) and what the
//! executor actually produced (`OutputSegment`), including the ascent/deco
//! legs the executor synthesizes along the way.

use crate::config::{Config, GradientFactors};
use crate::depth::Depth;
use crate::error::EngineError;
use crate::time::Time;
use crate::units::{self, DEFAULT_WATER_DENSITY};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A user-requested leg of the dive: descend/ascend to `depth` (at the
/// executor's configured rate) and remain there for `time` — or, when
/// `time` is zero, pass through the depth as a waypoint without a hold.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputSegment {
    pub depth: Depth,
    pub time: Time,
    pub tank_index: usize,
    /// CCR setpoint in bar; `0.0` means open circuit.
    pub setpoint: f64,
    pub in_use: bool,
}

impl InputSegment {
    pub fn new(depth: Depth, time: Time, tank_index: usize) -> Self {
        Self {
            depth,
            time,
            tank_index,
            setpoint: 0.0,
            in_use: true,
        }
    }

    pub fn with_setpoint(mut self, setpoint: f64) -> Self {
        self.setpoint = setpoint;
        self
    }

    pub fn is_closed_circuit(&self) -> bool {
        self.setpoint > 0.0
    }

    pub fn check(&self) -> Result<(), EngineError> {
        if self.depth.as_meters() < 0.0 {
            return Err(EngineError::ProcessingError(
                "segment depth must be non-negative".into(),
            ));
        }
        if self.time.as_seconds() < 0.0 {
            return Err(EngineError::ProcessingError(
                "segment time must be non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentKind {
    /// A hold at constant depth on the bottom gas.
    Dive,
    /// A hold at constant depth during the ascent, with decompression
    /// annotations attached.
    Deco,
    /// Travel between two depths at the configured ascent/descent rate.
    AscDesc,
}

/// A leg the executor actually ran, annotated with cumulative run time and
/// (for deco stops) the controlling-compartment bookkeeping used to explain
/// the stop afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutputSegment {
    pub kind: SegmentKind,
    pub start_depth: Depth,
    pub end_depth: Depth,
    pub duration: Time,
    pub tank_index: usize,
    pub setpoint: f64,
    /// Cumulative dive run time at the end of this segment; filled in once
    /// the whole profile is known.
    pub run_time: Time,
    pub m_value_max: Option<f64>,
    pub gf_used: Option<GradientFactors>,
    pub controlling_compartment: Option<u8>,
}

impl OutputSegment {
    pub fn dive(depth: Depth, duration: Time, tank_index: usize, setpoint: f64) -> Self {
        Self {
            kind: SegmentKind::Dive,
            start_depth: depth,
            end_depth: depth,
            duration,
            tank_index,
            setpoint,
            run_time: Time::zero(),
            m_value_max: None,
            gf_used: None,
            controlling_compartment: None,
        }
    }

    pub fn asc_desc(start_depth: Depth, end_depth: Depth, duration: Time, tank_index: usize, setpoint: f64) -> Self {
        Self {
            kind: SegmentKind::AscDesc,
            start_depth,
            end_depth,
            duration,
            tank_index,
            setpoint,
            run_time: Time::zero(),
            m_value_max: None,
            gf_used: None,
            controlling_compartment: None,
        }
    }

    pub fn deco(
        depth: Depth,
        duration: Time,
        tank_index: usize,
        setpoint: f64,
        m_value_max: f64,
        gf_used: GradientFactors,
        controlling_compartment: u8,
    ) -> Self {
        Self {
            kind: SegmentKind::Deco,
            start_depth: depth,
            end_depth: depth,
            duration,
            tank_index,
            setpoint,
            run_time: Time::zero(),
            m_value_max: Some(m_value_max),
            gf_used: Some(gf_used),
            controlling_compartment: Some(controlling_compartment),
        }
    }

    /// Volume of gas (liters, at surface pressure) consumed from the
    /// segment's tank: average ambient pressure over the segment times a
    /// SAC rate, deco segments billed at the (typically lower) deco rate.
    pub fn gas_used_l(&self, config: &Config) -> f64 {
        if self.setpoint > 0.0 {
            return 0.0; // closed-circuit: diluent/O2 bookkeeping not modeled here
        }
        let avg_depth_m = (self.start_depth.as_meters() + self.end_depth.as_meters()) / 2.0;
        let avg_ambient_pressure = config.ambient_pressure_surface
            + units::depth_to_pressure(avg_depth_m, DEFAULT_WATER_DENSITY);
        let rate = match self.kind {
            SegmentKind::Deco => config.deco_consumption_rate,
            SegmentKind::Dive | SegmentKind::AscDesc => config.dive_consumption_rate,
        };
        rate * self.duration.as_seconds() * avg_ambient_pressure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waypoint_has_zero_time() {
        let seg = InputSegment::new(Depth::from_meters(20.0), Time::zero(), 0);
        assert_eq!(seg.time, Time::zero());
        assert!(seg.check().is_ok());
    }

    #[test]
    fn negative_depth_rejected() {
        let seg = InputSegment::new(Depth::from_meters(-1.0), Time::from_minutes(5.0), 0);
        assert!(seg.check().is_err());
    }

    #[test]
    fn closed_circuit_detected_from_setpoint() {
        let seg = InputSegment::new(Depth::from_meters(20.0), Time::from_minutes(5.0), 0).with_setpoint(1.3);
        assert!(seg.is_closed_circuit());
    }

    #[test]
    fn gas_used_scales_with_depth_and_duration() {
        let config = Config::default();
        let shallow = OutputSegment::dive(Depth::from_meters(10.0), Time::from_minutes(10.0), 0, 0.0);
        let deep = OutputSegment::dive(Depth::from_meters(30.0), Time::from_minutes(10.0), 0, 0.0);
        assert!(deep.gas_used_l(&config) > shallow.gas_used_l(&config));
    }

    #[test]
    fn deco_segment_uses_deco_consumption_rate() {
        let config = Config::default();
        let dive_seg = OutputSegment::dive(Depth::from_meters(20.0), Time::from_minutes(5.0), 0, 0.0);
        let deco_seg = OutputSegment::deco(Depth::from_meters(20.0), Time::from_minutes(5.0), 0, 0.0, 2.5, (30, 85), 5);
        assert!(deco_seg.gas_used_l(&config) < dive_seg.gas_used_l(&config));
    }

    #[test]
    fn closed_circuit_segment_consumes_no_diluent_in_this_model() {
        let config = Config::default();
        let seg = OutputSegment::dive(Depth::from_meters(20.0), Time::from_minutes(5.0), 0, 1.3);
        assert_eq!(seg.gas_used_l(&config), 0.0);
    }
}
