//! Time/pixel/distance scaling for the scope canvas.
//!
//! The instrument works in microseconds; the canvas works in whole pixels.
//! `PixelScale` is recomputed whenever the range, the delay or the canvas
//! width changes.
use serde::{Deserialize, Serialize};
/// Fallback used when `range / width` is not a usable positive number.
pub const FALLBACK_US_PER_PIXEL: f64 = 0.1;
/// Delay spinner limits (μs).
pub const DELAY_LIMITS_US: (f64, f64) = (0.0, 273.0);
/// Range spinner limits in time units (μs).
pub const RANGE_LIMITS_US: (f64, f64) = (0.1, 112.8);
/// Upper range limit when values are shown as distance.
pub const RANGE_MAX_DISTANCE: f64 = 15.0;
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelScale {
    pub us_per_pixel: f64,
    pub ns_per_pixel: f64,
    /// Delay expressed in whole pixels, truncated.
    pub delay_pix: i32,
}
impl PixelScale {
    pub fn new(range_us: f64, canvas_width: i32, delay_us: f64) -> Self {
        let us_per_pixel = us_per_pixel(range_us, canvas_width);
        Self {
            us_per_pixel,
            ns_per_pixel: us_per_pixel * 1000.0,
            delay_pix: (delay_us / us_per_pixel).floor() as i32,
        }
    }
    pub fn us_to_pixels(&self, us: f64) -> f64 {
        us / self.us_per_pixel
    }
}
/// `range / width`, replaced by [`FALLBACK_US_PER_PIXEL`] when the result
/// is zero, negative or not finite.
pub fn us_per_pixel(range_us: f64, canvas_width: i32) -> f64 {
    let ratio = range_us / canvas_width as f64;
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        FALLBACK_US_PER_PIXEL
    }
}
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnits {
    #[default]
    Time,
    Inches,
    Millimeters,
}
impl DistanceUnits {
    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnits::Time => "uS",
            DistanceUnits::Inches => "in",
            DistanceUnits::Millimeters => "mm",
        }
    }
}
/// Converts between the instrument's time base and the value shown to the
/// operator. In distance units the multiplier is the sound velocity of the
/// test piece, entered in distance-per-μs of the selected unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeDistance {
    pub units: DistanceUnits,
    pub velocity_per_us: f64,
}
impl Default for TimeDistance {
    fn default() -> Self {
        Self {
            units: DistanceUnits::Time,
            // shear wave velocity
            velocity_per_us: 0.133,
        }
    }
}
impl TimeDistance {
    fn multiplier(&self) -> f64 {
        match self.units {
            DistanceUnits::Time => 1.0,
            _ => self.velocity_per_us,
        }
    }
    pub fn to_display(&self, us: f64) -> f64 {
        us * self.multiplier()
    }
    pub fn from_display(&self, value: f64) -> f64 {
        let mult = self.multiplier();
        if mult > 0.0 {
            value / mult
        } else {
            value
        }
    }
    /// Range spinner limits in display units.
    pub fn range_limits(&self) -> (f64, f64) {
        match self.units {
            DistanceUnits::Time => RANGE_LIMITS_US,
            _ => (RANGE_LIMITS_US.0, RANGE_MAX_DISTANCE),
        }
    }
    pub fn decimals(&self) -> usize {
        match self.units {
            DistanceUnits::Time => 1,
            _ => 3,
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn scale_reproduces_range_across_width() {
        for (range, width) in [(100.0, 350), (10.0, 350), (0.5, 1024), (112.8, 17)] {
            let scale = PixelScale::new(range, width, 0.0);
            assert!((scale.us_per_pixel * width as f64 - range).abs() < 1e-9);
            assert!((scale.ns_per_pixel - scale.us_per_pixel * 1000.0).abs() < 1e-9);
        }
    }
    #[test]
    fn degenerate_width_falls_back() {
        assert_eq!(PixelScale::new(100.0, 0, 0.0).us_per_pixel, FALLBACK_US_PER_PIXEL);
        assert_eq!(PixelScale::new(0.0, 350, 0.0).us_per_pixel, FALLBACK_US_PER_PIXEL);
        assert_eq!(PixelScale::new(-5.0, 350, 0.0).us_per_pixel, FALLBACK_US_PER_PIXEL);
    }
    #[test]
    fn delay_is_truncated_to_whole_pixels() {
        // 100 / 350 = 0.2857 us per pixel; 10 us = 35 px exactly, 10.1 us = 35.35 px
        assert_eq!(PixelScale::new(100.0, 350, 10.1).delay_pix, 35);
        assert_eq!(PixelScale::new(100.0, 350, 0.0).delay_pix, 0);
    }
    #[test]
    fn distance_conversion_uses_velocity() {
        let td = TimeDistance {
            units: DistanceUnits::Inches,
            velocity_per_us: 0.125,
        };
        assert!((td.to_display(8.0) - 1.0).abs() < 1e-12);
        assert!((td.from_display(1.0) - 8.0).abs() < 1e-12);
        assert_eq!(td.range_limits().1, RANGE_MAX_DISTANCE);
        let time = TimeDistance::default();
        assert_eq!(time.to_display(8.0), 8.0);
        assert_eq!(time.decimals(), 1);
    }
}
