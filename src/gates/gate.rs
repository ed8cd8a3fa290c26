use log::debug;
use super::display::{DisplayState, Projection};
/// Cached pixel positions for one gate. The `*_adjusted` values are the
/// ones to draw; they include the interface tracking offset when it applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GatePixels {
    pub start: i32,
    pub end: i32,
    pub mid: i32,
    pub level: i32,
    pub start_adjusted: i32,
    pub end_adjusted: i32,
    pub mid_adjusted: i32,
}
/// Time window shared by measurement gates and DAC segments.
#[derive(Clone, Debug, PartialEq)]
pub struct GateWindow {
    pub start_us: f64,
    pub width_us: f64,
    /// Trigger threshold, percent of screen height.
    pub level: f64,
    pub pix: GatePixels,
}
impl GateWindow {
    pub fn new(start_us: f64, width_us: f64, level: f64) -> Self {
        Self {
            start_us,
            width_us: width_us.max(0.0),
            level,
            pix: GatePixels::default(),
        }
    }
    pub fn end_us(&self) -> f64 {
        self.start_us + self.width_us
    }
    /// Time to pixels. Returns true if any cached pixel value changed.
    pub fn calculate_pixel_location(&mut self, p: &Projection) -> bool {
        let before = self.pix;
        let start = (self.start_us / p.us_per_pixel - p.delay_pix as f64).round() as i32;
        let end = start + (self.width_us / p.us_per_pixel).round() as i32;
        self.pix.start = start;
        self.pix.end = end;
        self.pix.mid = (start + end) / 2;
        // screen y grows downward, the display puts 0% at the bottom
        let raw = (self.level * p.canvas_height as f64 / 100.0).round() as i32 + p.vert_offset;
        self.pix.level = p.canvas_height - raw.clamp(0, p.canvas_height.max(0));
        self.pix != before
    }
    /// Pixels back to time; the inverse of `calculate_pixel_location`.
    pub fn calculate_time_location(&mut self, p: &Projection) -> bool {
        let start_us = (self.pix.start + p.delay_pix) as f64 * p.us_per_pixel;
        let width_us = (self.pix.end - self.pix.start).max(0) as f64 * p.us_per_pixel;
        let height = p.canvas_height.max(0);
        let raw = height - self.pix.level.clamp(0, height) - p.vert_offset;
        let level = if height > 0 {
            raw as f64 / height as f64 * 100.0
        } else {
            self.level
        };
        let changed = start_us != self.start_us || width_us != self.width_us || level != self.level;
        self.start_us = start_us;
        self.width_us = width_us;
        self.level = level;
        changed
    }
    /// `None` draws the gate where it was computed; `Some(offset)` moves it
    /// along with the interface crossing.
    pub fn adjust_positions(&mut self, offset: Option<i32>) {
        let offset = offset.unwrap_or(0);
        self.pix.start_adjusted = self.pix.start + offset;
        self.pix.end_adjusted = self.pix.end + offset;
        self.pix.mid_adjusted = self.pix.mid + offset;
    }
}
#[derive(Clone, Debug)]
pub struct Gate {
    pub title: String,
    pub window: GateWindow,
    is_interface: bool,
    start_tracking_on: f64,
    start_tracking_off: f64,
}
impl Gate {
    pub fn new(title: impl Into<String>, start_us: f64, width_us: f64, level: f64) -> Self {
        Self {
            title: title.into(),
            window: GateWindow::new(start_us, width_us, level),
            is_interface: false,
            start_tracking_on: start_us,
            start_tracking_off: start_us,
        }
    }
    pub fn is_interface(&self) -> bool {
        self.is_interface
    }
    /// Sets the start and remembers it for the current tracking mode.
    pub fn set_start(&mut self, start_us: f64, tracking: bool) {
        self.window.start_us = start_us;
        if tracking {
            self.start_tracking_on = start_us;
        } else {
            self.start_tracking_off = start_us;
        }
    }
    pub fn set_width(&mut self, width_us: f64) {
        self.window.width_us = width_us.max(0.0);
    }
    pub fn set_level(&mut self, level: f64) {
        self.window.level = level.clamp(0.0, 100.0);
    }
    #[cfg(test)]
    pub fn remembered_starts(&self) -> (f64, f64) {
        (self.start_tracking_off, self.start_tracking_on)
    }
    fn apply_tracking_mode(&mut self, tracking: bool) {
        self.window.start_us = if tracking {
            self.start_tracking_on
        } else {
            self.start_tracking_off
        };
    }
}
/// Sample positions the digitizer has to cover so every gate sees data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleSpan {
    pub first: i64,
    pub last: i64,
}
/// A channel's gates. Gate 0 is the interface gate: it is always placed
/// absolutely, the others follow the interface crossing when tracking.
#[derive(Clone, Debug, Default)]
pub struct GateSet {
    gates: Vec<Gate>,
}
impl GateSet {
    pub fn new(mut gates: Vec<Gate>) -> Self {
        for (i, gate) in gates.iter_mut().enumerate() {
            gate.is_interface = i == 0;
        }
        Self { gates }
    }
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.gates.len()
    }
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Gate> {
        self.gates.get(index)
    }
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Gate> {
        self.gates.get_mut(index)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter()
    }
    pub fn interface_gate(&self) -> Option<&Gate> {
        self.gates.first()
    }
    /// Switches every gate to the start remembered for the new mode.
    pub fn set_interface_tracking(&mut self, tracking: bool) {
        for gate in &mut self.gates {
            gate.apply_tracking_mode(tracking);
        }
    }
    pub fn calculate_pixel_locations(&mut self, display: &DisplayState) -> bool {
        let tracked = display.gate_projection();
        let absolute = display.absolute_projection();
        let mut changed = false;
        for gate in &mut self.gates {
            let projection = if gate.is_interface {
                &absolute
            } else {
                &tracked
            };
            changed |= gate.window.calculate_pixel_location(projection);
        }
        changed
    }
    pub fn adjust_positions(&mut self, display: &DisplayState) {
        let offset = display.tracking_offset();
        for gate in &mut self.gates {
            if gate.is_interface {
                gate.window.adjust_positions(None);
            } else {
                gate.window.adjust_positions(offset);
            }
        }
    }
    /// Earliest and latest sample any gate can touch. With tracking on the
    /// crossing is unknown ahead of time, so tracked gates are measured
    /// from the interface gate's leading edge (earliest) and trailing edge
    /// (latest).
    pub fn sample_span(&self, us_per_sample: f64, tracking: bool) -> Option<SampleSpan> {
        if us_per_sample <= 0.0 {
            return None;
        }
        let to_samples = |us: f64| (us / us_per_sample) as i64;
        let interface = self.gates.first()?;
        let others: &[Gate] = if tracking { &self.gates[1..] } else { &self.gates };
        let earliest = others
            .iter()
            .map(|g| g.window.start_us)
            .fold(f64::INFINITY, f64::min);
        let latest = others
            .iter()
            .map(|g| g.window.end_us())
            .fold(f64::NEG_INFINITY, f64::max);
        let span = if !tracking {
            SampleSpan {
                first: to_samples(earliest),
                last: to_samples(latest),
            }
        } else {
            let lead = to_samples(interface.window.start_us);
            let trail = to_samples(interface.window.end_us());
            if others.is_empty() {
                SampleSpan {
                    first: lead,
                    last: trail,
                }
            } else {
                SampleSpan {
                    first: to_samples(interface.window.start_us + earliest).min(lead),
                    last: to_samples(interface.window.end_us() + latest).max(trail),
                }
            }
        };
        debug!("gate span {}..{} samples", span.first, span.last);
        Some(span)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::display::{CanvasSize, ChannelSettings, DisplayMode};
    fn display(range: f64, delay: f64, tracking: bool) -> DisplayState {
        DisplayState::new(
            ChannelSettings {
                range_us: range,
                delay_us: delay,
                interface_tracking: tracking,
                mode: DisplayMode::PositiveHalf,
                us_per_sample: 0.015,
            },
            CanvasSize::default(),
        )
    }
    fn three_gates() -> GateSet {
        GateSet::new(vec![
            Gate::new("Interface", 5.0, 4.0, 40.0),
            Gate::new("Flaw 1", 20.0, 10.0, 50.0),
            Gate::new("Flaw 2", 35.0, 6.0, 30.0),
        ])
    }
    #[test]
    fn absolute_gate_matches_reference_scenario() {
        let d = display(100.0, 0.0, false);
        let mut w = GateWindow::new(20.0, 10.0, 50.0);
        assert!(w.calculate_pixel_location(&d.absolute_projection()));
        assert_eq!(w.pix.start, 70);
        assert_eq!(w.pix.end, 105);
        assert_eq!(w.pix.mid, 87);
        assert_eq!(w.pix.level, 175);
        // nothing moves on a second pass
        assert!(!w.calculate_pixel_location(&d.absolute_projection()));
    }
    #[test]
    fn width_in_pixels_is_rounded_width() {
        for (range, width_us, delay) in [(100.0, 10.0, 0.0), (37.0, 3.3, 2.2), (112.8, 0.7, 50.0)] {
            let d = display(range, delay, false);
            let mut w = GateWindow::new(12.3, width_us, 10.0);
            w.calculate_pixel_location(&d.absolute_projection());
            let usp = d.scale().us_per_pixel;
            assert_eq!(w.pix.end - w.pix.start, (width_us / usp).round() as i32);
        }
    }
    #[test]
    fn level_is_inverted_shifted_and_clamped() {
        let mut d = display(100.0, 0.0, false);
        let mut w = GateWindow::new(0.0, 1.0, 20.0);
        w.calculate_pixel_location(&d.absolute_projection());
        assert_eq!(w.pix.level, 350 - 70);
        d.set_mode(DisplayMode::Rf);
        w.calculate_pixel_location(&d.absolute_projection());
        assert_eq!(w.pix.level, 350 - 70 - 175);
        w.level = 80.0;
        w.calculate_pixel_location(&d.absolute_projection());
        assert_eq!(w.pix.level, 0);
    }
    #[test]
    fn pixel_time_round_trip_stays_within_a_pixel() {
        let d = display(73.0, 4.0, false);
        let p = d.absolute_projection();
        let usp = p.us_per_pixel;
        let mut w = GateWindow::new(21.7, 8.9, 33.0);
        w.calculate_pixel_location(&p);
        let (start, width) = (w.start_us, w.width_us);
        w.calculate_time_location(&p);
        assert!((w.start_us - start).abs() <= usp);
        assert!((w.width_us - width).abs() <= usp);
        assert!((w.level - 33.0).abs() <= 100.0 / 350.0);
    }
    #[test]
    fn tracked_gates_keep_raw_offset_under_translation() {
        let mut d = display(100.0, 7.0, true);
        let mut set = three_gates();
        set.calculate_pixel_locations(&d);
        d.update_interface_crossing(Some(2000));
        set.adjust_positions(&d);
        let crossing = d.interface_crossing_pix().unwrap();
        for gate in set.iter().skip(1) {
            assert_eq!(gate.window.pix.start_adjusted - crossing, gate.window.pix.start);
            assert_eq!(gate.window.pix.end_adjusted - crossing, gate.window.pix.end);
        }
        // interface gate stays absolute, delay included
        let iface = set.interface_gate().unwrap();
        assert_eq!(iface.window.pix.start, (5.0_f64 / (100.0 / 350.0) - 24.0).round() as i32);
        assert_eq!(iface.window.pix.start_adjusted, iface.window.pix.start);
    }
    #[test]
    fn only_first_gate_is_interface() {
        let set = three_gates();
        let flags: Vec<bool> = set.iter().map(Gate::is_interface).collect();
        assert_eq!(flags, vec![true, false, false]);
    }
    #[test]
    fn tracking_toggle_restores_per_mode_starts() {
        let mut set = three_gates();
        set.get_mut(1).unwrap().set_start(2.0, true);
        set.set_interface_tracking(true);
        assert_eq!(set.get(1).unwrap().window.start_us, 2.0);
        set.set_interface_tracking(false);
        assert_eq!(set.get(1).unwrap().window.start_us, 20.0);
        assert_eq!(set.get(1).unwrap().remembered_starts(), (20.0, 2.0));
    }
    #[test]
    fn span_without_tracking_covers_all_gates() {
        let set = three_gates();
        let span = set.sample_span(0.5, false).unwrap();
        assert_eq!(span, SampleSpan { first: 10, last: 82 });
    }
    #[test]
    fn span_with_tracking_is_worst_case_around_interface() {
        let set = three_gates();
        let span = set.sample_span(0.5, true).unwrap();
        // interface 5..9 us: lead 10, trail 18 samples
        // first = (5 + 20) / 0.5 = 50 -> interface lead 10 is earlier
        // last = (9 + 41) / 0.5 = 100
        assert_eq!(span, SampleSpan { first: 10, last: 100 });
        let single = GateSet::new(vec![Gate::new("Interface", 5.0, 4.0, 40.0)]);
        assert_eq!(single.sample_span(0.5, true), Some(SampleSpan { first: 10, last: 18 }));
        assert_eq!(GateSet::default().sample_span(0.5, false), None);
    }
}
