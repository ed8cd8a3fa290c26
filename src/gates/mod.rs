// src/gates/mod.rs
// Gate geometry for the scope canvas: scaling, gates, DAC profile and what
// gets drawn on top of the A-scan.
pub mod dac;
pub mod display;
pub mod error;
pub mod gate;
pub mod overlay;
pub mod snapshot;
pub mod trace;
pub mod units;
pub use dac::{DacProfile, MAX_DAC_GATES};
pub use display::{CanvasSize, ChannelSettings, DisplayMode, DisplayState};
pub use error::ScopeError;
pub use gate::{Gate, GateSet, SampleSpan};
pub use units::{DistanceUnits, TimeDistance};
