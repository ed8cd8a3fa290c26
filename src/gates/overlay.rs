//! Renderer-ready description of everything drawn on top of the trace.
//!
//! Both the live egui painter and the PNG snapshot consume an [`Overlay`],
//! so neither needs to know how gates track the interface.
use super::dac::DacProfile;
use super::display::DisplayState;
use super::gate::GateSet;
/// Half height of the tick marking the interface crossing.
pub const CROSSING_TICK_HALF: i32 = 10;
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pub from: (i32, i32),
    pub to: (i32, i32),
}
impl Line {
    pub fn new(from: (i32, i32), to: (i32, i32)) -> Self {
        Self { from, to }
    }
}
#[derive(Clone, Debug, PartialEq)]
pub struct GateLine {
    pub title: String,
    pub line: Line,
    pub interface: bool,
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DacSegment {
    pub slot: usize,
    pub line: Line,
    pub selected: bool,
}
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub gates: Vec<GateLine>,
    pub dac_segments: Vec<DacSegment>,
    pub dac_connectors: Vec<Line>,
    /// Start points that can be grabbed with the mouse; empty when locked.
    pub grab_points: Vec<(i32, i32)>,
    pub crossing: Option<Line>,
}
/// Collects the lines for the current state. Pixel positions must already
/// be computed and adjusted for tracking.
pub fn build(
    gates: &GateSet,
    dac: &DacProfile,
    display: &DisplayState,
    dac_visible: bool,
    dac_unlocked: bool,
) -> Overlay {
    let mut overlay = Overlay {
        gates: gates
            .iter()
            .map(|g| {
                let pix = &g.window.pix;
                GateLine {
                    title: g.title.clone(),
                    line: Line::new((pix.start_adjusted, pix.level), (pix.end_adjusted, pix.level)),
                    interface: g.is_interface(),
                }
            })
            .collect(),
        ..Overlay::default()
    };
    if dac_visible {
        let mut previous: Option<(i32, i32)> = None;
        for (slot, gate) in dac.active() {
            let pix = &gate.window.pix;
            let start = (pix.start_adjusted, pix.level);
            overlay.dac_segments.push(DacSegment {
                slot,
                line: Line::new(start, (pix.end_adjusted, pix.level)),
                selected: gate.is_selected(),
            });
            if let Some(end_of_previous) = previous {
                overlay.dac_connectors.push(Line::new(end_of_previous, start));
            }
            if dac_unlocked {
                overlay.grab_points.push(start);
            }
            previous = Some((pix.end_adjusted, pix.level));
        }
    }
    if let (Some(x), Some(interface)) = (display.interface_crossing_pix(), gates.interface_gate()) {
        let level = interface.window.pix.level;
        overlay.crossing = Some(Line::new(
            (x, level - CROSSING_TICK_HALF),
            (x, level + CROSSING_TICK_HALF),
        ));
    }
    overlay
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::display::{CanvasSize, ChannelSettings};
    use crate::gates::gate::Gate;
    fn setup(tracking: bool) -> (GateSet, DacProfile, DisplayState) {
        let mut display = DisplayState::new(
            ChannelSettings {
                interface_tracking: tracking,
                ..ChannelSettings::default()
            },
            CanvasSize::default(),
        );
        let mut gates = GateSet::new(vec![
            Gate::new("Interface", 5.0, 4.0, 40.0),
            Gate::new("Flaw 1", 20.0, 10.0, 50.0),
        ]);
        gates.calculate_pixel_locations(&display);
        display.update_interface_crossing(Some(1000));
        gates.adjust_positions(&display);
        let mut dac = DacProfile::new(4);
        dac.insert(50, 100);
        dac.insert(200, 150);
        dac.adjust_positions(display.tracking_offset());
        (gates, dac, display)
    }
    #[test]
    fn gate_lines_use_adjusted_pixels() {
        let (gates, dac, display) = setup(true);
        let overlay = build(&gates, &dac, &display, false, false);
        let flaw = &overlay.gates[1];
        let crossing = display.interface_crossing_pix().unwrap();
        assert_eq!(flaw.line.from.0, gates.get(1).unwrap().window.pix.start + crossing);
        assert!(overlay.gates[0].interface);
        assert!(overlay.dac_segments.is_empty());
    }
    #[test]
    fn dac_segments_are_connected() {
        let (gates, mut dac, display) = setup(false);
        dac.select(1);
        let overlay = build(&gates, &dac, &display, true, true);
        assert_eq!(overlay.dac_segments.len(), 2);
        assert_eq!(overlay.dac_connectors, vec![Line::new((85, 100), (85, 150))]);
        assert_eq!(overlay.grab_points, vec![(50, 100), (85, 150)]);
        assert!(overlay.dac_segments[1].selected);
        let locked = build(&gates, &dac, &display, true, false);
        assert!(locked.grab_points.is_empty());
    }
    #[test]
    fn crossing_tick_only_while_tracking() {
        let (gates, dac, display) = setup(false);
        assert_eq!(build(&gates, &dac, &display, true, true).crossing, None);
        let (gates, dac, display) = setup(true);
        let tick = build(&gates, &dac, &display, true, true).crossing.unwrap();
        let level = gates.interface_gate().unwrap().window.pix.level;
        // 1000 samples * 15 ns = 15 us = 52.5 px
        assert_eq!(tick, Line::new((52, level - 10), (52, level + 10)));
    }
}
