//! A Buhlmann ZH-L16C decompression planning engine: tissue model with
//! gradient factors, a real-gas tank model, and a dive executor that turns
//! a list of input segments into a fully annotated, gas-consumption-costed
//! output profile.

mod cns_table;
mod compartment;
mod config;
mod depth;
mod dive;
mod error;
mod gas;
mod model;
mod ox_tox;
mod segment;
mod tank;
mod time;
mod units;
mod zhl_values;

pub use compartment::{Compartment, Supersaturation};
pub use config::{Config, GradientFactor, GradientFactors, TravelSwitch};
pub use depth::{Depth, DepthType, Unit, Units};
pub use dive::Dive;
pub use error::EngineError;
pub use gas::{Gas, PartialPressures};
pub use model::BuhlmannModel;
pub use ox_tox::OxTox;
pub use segment::{InputSegment, OutputSegment, SegmentKind};
pub use tank::Tank;
pub use time::Time;
pub use units::{altitude_to_ambient_pressure, depth_to_pressure, pp_h2o_at, pressure_to_depth};
