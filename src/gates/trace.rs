//! A-scan samples to canvas coordinates.
use super::display::{CanvasSize, DisplayState};
/// Projects one A-scan onto the canvas.
///
/// `samples` are amplitudes in percent of screen height (negative values
/// only make sense in RF mode) and start at the delay. Points past the
/// right edge are dropped.
pub fn project_ascan(samples: &[f64], us_per_point: f64, display: &DisplayState) -> Vec<(i32, i32)> {
    let canvas = display.canvas();
    let usp = display.scale().us_per_pixel;
    let offset = display.vert_offset();
    let height = canvas.height.max(0);
    let mut points = Vec::with_capacity(samples.len().min(canvas.width.max(0) as usize * 4));
    for (i, amplitude) in samples.iter().enumerate() {
        let x = (i as f64 * us_per_point / usp).floor() as i32;
        if x > canvas.width {
            break;
        }
        let raw = (amplitude * height as f64 / 100.0).round() as i32 + offset;
        points.push((x, height - raw.clamp(0, height)));
    }
    points
}
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    pub vertical: Vec<i32>,
    pub horizontal: Vec<i32>,
}
/// Interior division lines for a canvas split `divisions` ways each axis.
pub fn grid(canvas: CanvasSize, divisions: i32) -> Grid {
    if divisions <= 1 {
        return Grid::default();
    }
    let lines = |extent: i32| (1..divisions).map(|i| i * extent / divisions).collect();
    Grid {
        vertical: lines(canvas.width),
        horizontal: lines(canvas.height),
    }
}
