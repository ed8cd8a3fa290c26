// src/types.rs
use crate::gates::{ChannelSettings, DisplayMode, DistanceUnits, SampleSpan};

// Control changes coming from the UI into the calibrator
#[derive(Clone, Debug, PartialEq)]
pub enum ControlEvent {
    RangeChanged(f64),
    DelayChanged(f64),
    DisplayModeChanged(DisplayMode),
    InterfaceTrackingToggled(bool),
    GateStartChanged { gate: usize, us: f64 },
    GateWidthChanged { gate: usize, us: f64 },
    GateLevelChanged { gate: usize, percent: f64 },
    DacEnabled(bool),
    DacLocked(bool),
    DeleteSelectedDacGate,
    DeleteAllDacGates,
    CanvasResized { width: i32, height: i32 },
    Pointer(PointerEvent),
    UnitsChanged(DistanceUnits),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

// Canvas coordinates, origin top left
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Press { x: i32, y: i32, button: PointerButton },
    Drag { x: i32, y: i32 },
    Release { x: i32, y: i32 },
}

// Calibrator -> UI
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Log(String),
    GatesChanged,
    DacProfileChanged { active: usize },
    DeleteEnabled(bool),
    SpanChanged(SampleSpan),
}

// UI -> simulator thread
#[derive(Clone, Debug)]
pub enum EngineCommand {
    Start,
    Stop,
    Configure(ChannelSettings),
    Shutdown,
}

// One A-scan from the simulator
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanFrame {
    /// Amplitude per point, percent of screen height, starting at the delay.
    pub samples: Vec<f64>,
    pub us_per_point: f64,
    /// Interface echo position in digitizer samples from the initial pulse.
    pub crossing_sample: Option<u32>,
}
