//! Per-channel display state: scale, vertical offset and the live interface
//! crossing. Everything here is derived from `ChannelSettings` and the
//! canvas size, so every setter simply recomputes.
use log::trace;
use serde::{Deserialize, Serialize};
use super::units::PixelScale;
/// Marker value handed to renderers when no interface crossing applies.
pub const NO_CROSSING: i32 = -1;
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    PositiveHalf,
    NegativeHalf,
    FullWave,
    Rf,
    Off,
}
impl DisplayMode {
    pub const ALL: [DisplayMode; 5] = [
        DisplayMode::PositiveHalf,
        DisplayMode::NegativeHalf,
        DisplayMode::FullWave,
        DisplayMode::Rf,
        DisplayMode::Off,
    ];
    pub fn label(self) -> &'static str {
        match self {
            DisplayMode::PositiveHalf => "+Half",
            DisplayMode::NegativeHalf => "-Half",
            DisplayMode::FullWave => "Full",
            DisplayMode::Rf => "RF",
            DisplayMode::Off => "Off",
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: i32,
    pub height: i32,
}
impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 350,
            height: 350,
        }
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSettings {
    pub range_us: f64,
    pub delay_us: f64,
    pub interface_tracking: bool,
    pub mode: DisplayMode,
    /// Digitizer sample period; crossings are reported in these units.
    pub us_per_sample: f64,
}
impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            range_us: 100.0,
            delay_us: 0.0,
            interface_tracking: false,
            mode: DisplayMode::PositiveHalf,
            us_per_sample: 0.015,
        }
    }
}
/// Everything a gate needs to move between time and pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub us_per_pixel: f64,
    pub delay_pix: i32,
    pub canvas_height: i32,
    pub vert_offset: i32,
}
#[derive(Clone, Debug)]
pub struct DisplayState {
    settings: ChannelSettings,
    canvas: CanvasSize,
    scale: PixelScale,
    vert_offset: i32,
    crossing_pix: Option<i32>,
}
impl DisplayState {
    pub fn new(settings: ChannelSettings, canvas: CanvasSize) -> Self {
        let mut state = Self {
            settings,
            canvas,
            scale: PixelScale::new(settings.range_us, canvas.width, settings.delay_us),
            vert_offset: 0,
            crossing_pix: None,
        };
        state.recompute();
        state
    }
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }
    pub fn scale(&self) -> &PixelScale {
        &self.scale
    }
    pub fn vert_offset(&self) -> i32 {
        self.vert_offset
    }
    pub fn interface_tracking(&self) -> bool {
        self.settings.interface_tracking
    }
    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
        self.recompute();
    }
    pub fn set_range(&mut self, range_us: f64) {
        self.settings.range_us = range_us;
        self.recompute();
    }
    pub fn set_delay(&mut self, delay_us: f64) {
        self.settings.delay_us = delay_us;
        self.recompute();
    }
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.settings.mode = mode;
        self.recompute();
    }
    pub fn set_interface_tracking(&mut self, on: bool) {
        self.settings.interface_tracking = on;
        self.recompute();
    }
    fn recompute(&mut self) {
        // RF shows both halves of the signal, so the baseline sits mid-screen.
        self.vert_offset = match self.settings.mode {
            DisplayMode::Rf => self.canvas.height / 2,
            _ => 0,
        };
        self.scale = PixelScale::new(
            self.settings.range_us,
            self.canvas.width,
            self.settings.delay_us,
        );
        if !self.settings.interface_tracking {
            self.crossing_pix = None;
        }
        trace!(
            "display recomputed: {:.1} ns/px, delay {} px, vert offset {}",
            self.scale.ns_per_pixel,
            self.scale.delay_pix,
            self.vert_offset
        );
    }
    /// Converts the crossing reported by the hardware (in samples from the
    /// initial pulse) into a canvas x position.
    pub fn update_interface_crossing(&mut self, crossing_sample: Option<u32>) -> Option<i32> {
        self.crossing_pix = match (self.settings.interface_tracking, crossing_sample) {
            (true, Some(sample)) => {
                let us = sample as f64 * self.settings.us_per_sample;
                Some(self.scale.us_to_pixels(us).floor() as i32 - self.scale.delay_pix)
            }
            _ => None,
        };
        self.crossing_pix
    }
    pub fn interface_crossing_pix(&self) -> Option<i32> {
        self.crossing_pix
    }
    /// Crossing position for renderers, [`NO_CROSSING`] when not applicable.
    pub fn crossing_marker_x(&self) -> i32 {
        self.crossing_pix.unwrap_or(NO_CROSSING)
    }
    /// Offset added to tracked gates when drawing; `None` with tracking off.
    pub fn tracking_offset(&self) -> Option<i32> {
        self.settings
            .interface_tracking
            .then(|| self.crossing_pix.unwrap_or(0))
    }
    /// Projection for positions measured from the left edge of the canvas.
    pub fn absolute_projection(&self) -> Projection {
        Projection {
            us_per_pixel: self.scale.us_per_pixel,
            delay_pix: self.scale.delay_pix,
            canvas_height: self.canvas.height,
            vert_offset: self.vert_offset,
        }
    }
    /// Projection for tracked gates; the delay is already part of the
    /// interface crossing so it is left out while tracking.
    pub fn gate_projection(&self) -> Projection {
        let mut projection = self.absolute_projection();
        if self.settings.interface_tracking {
            projection.delay_pix = 0;
        }
        projection
    }
    /// Canvas x to the coordinate space tracked gates are stored in.
    pub fn to_gate_space_x(&self, x: i32) -> i32 {
        match self.tracking_offset() {
            Some(offset) => x - offset,
            None => x,
        }
    }
}
