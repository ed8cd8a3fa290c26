//! Distance amplitude correction profile.
//!
//! The profile is a fixed array of slots. Active slots, read in slot order,
//! form a contiguous curve: each active gate ends where the next active
//! gate starts. All editing happens in pixel space (mouse coordinates); the
//! caller converts back to time with `calculate_time_locations` once an
//! edit is finished.
use log::{debug, trace};
use super::display::{CanvasSize, Projection};
use super::gate::GateWindow;
pub const MAX_DAC_GATES: usize = 20;
/// Width given to a gate appended past the end of the curve.
pub const INSERT_WIDTH_PIX: i32 = 35;
/// Half size of the square around a gate's start point that grabs it.
pub const GRAB_RADIUS_PIX: i32 = 5;
#[derive(Clone, Debug, PartialEq)]
pub struct DacGate {
    pub title: String,
    pub window: GateWindow,
    active: bool,
    selected: bool,
}
impl DacGate {
    fn new(index: usize) -> Self {
        Self {
            title: format!("DAC Gate {}", index + 1),
            window: GateWindow::new(0.0, 0.0, 0.0),
            active: false,
            selected: false,
        }
    }
    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.active
    }
    pub fn is_selected(&self) -> bool {
        self.selected
    }
    fn set_pixels(&mut self, start: i32, end: i32, level: i32) {
        let pix = &mut self.window.pix;
        pix.start = start;
        pix.end = end;
        pix.level = level;
        refresh_mid(&mut self.window);
        self.window.adjust_positions(None);
    }
}
fn refresh_mid(window: &mut GateWindow) {
    window.pix.mid = (window.pix.start + window.pix.end) / 2;
}
#[derive(Clone, Debug, PartialEq)]
pub struct DacProfile {
    gates: Vec<DacGate>,
}
impl DacProfile {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_DAC_GATES);
        Self {
            gates: (0..capacity).map(DacGate::new).collect(),
        }
    }
    pub fn capacity(&self) -> usize {
        self.gates.len()
    }
    pub fn active_count(&self) -> usize {
        self.gates.iter().filter(|g| g.active).count()
    }
    pub fn is_full(&self) -> bool {
        self.active_count() == self.gates.len()
    }
    pub fn gate(&self, index: usize) -> Option<&DacGate> {
        self.gates.get(index)
    }
    pub fn active(&self) -> impl Iterator<Item = (usize, &DacGate)> {
        self.gates.iter().enumerate().filter(|(_, g)| g.active)
    }
    fn prev_active(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| self.gates[i].active)
    }
    fn next_active(&self, index: usize) -> Option<usize> {
        (index + 1..self.gates.len()).find(|&i| self.gates[i].active)
    }
    fn is_active_index(&self, index: usize) -> bool {
        self.gates.get(index).map_or(false, |g| g.active)
    }
    /// Adds a gate at the clicked point, reusing the first unused slot.
    ///
    /// Clicking before the curve makes a gate ending where the curve starts,
    /// clicking past it appends a gate at the curve's end, and clicking
    /// inside a gate splits that gate at `x`. Returns the slot of the new
    /// gate, or `None` (and changes nothing) when every slot is in use.
    pub fn insert(&mut self, x: i32, y: i32) -> Option<usize> {
        let Some(free) = self.gates.iter().position(|g| !g.active) else {
            debug!("DAC profile full, insert at ({x}, {y}) ignored");
            return None;
        };
        let actives: Vec<usize> = self.active().map(|(i, _)| i).collect();
        let (before, start, end) = match (actives.first().copied(), actives.last().copied()) {
            (Some(first), Some(last)) => {
                let first_start = self.gates[first].window.pix.start;
                let last_end = self.gates[last].window.pix.end;
                if x < first_start {
                    (first, x, first_start)
                } else if x > last_end {
                    (last + 1, last_end, last_end + INSERT_WIDTH_PIX)
                } else {
                    let host = actives
                        .iter()
                        .copied()
                        .find(|&i| {
                            let pix = &self.gates[i].window.pix;
                            x >= pix.start && x <= pix.end
                        })
                        .or_else(|| {
                            actives
                                .iter()
                                .copied()
                                .rev()
                                .find(|&i| self.gates[i].window.pix.start <= x)
                        })
                        .unwrap_or(last);
                    let host_window = &mut self.gates[host].window;
                    let end = host_window.pix.end.max(x);
                    host_window.pix.end = x;
                    refresh_mid(host_window);
                    (host + 1, x, end)
                }
            }
            _ => (free, x, x + INSERT_WIDTH_PIX),
        };
        // Move the vacant slot to the insertion point so slot order stays
        // time order.
        let slot = if free >= before {
            self.gates[before..=free].rotate_right(1);
            before
        } else {
            self.gates[free..before].rotate_left(1);
            before - 1
        };
        let gate = &mut self.gates[slot];
        gate.set_pixels(start, end, y);
        gate.active = true;
        gate.selected = false;
        debug!("DAC gate inserted in slot {slot}: {start}..{end} px, level {y}");
        Some(slot)
    }
    /// Deactivates one slot. Other gates keep their indices; the
    /// neighbours either side are re-joined so the curve stays continuous.
    pub fn delete(&mut self, index: usize) -> bool {
        if !self.is_active_index(index) {
            return false;
        }
        let gate = &mut self.gates[index];
        gate.active = false;
        gate.selected = false;
        if let (Some(prev), Some(next)) = (self.prev_active(index), self.next_active(index)) {
            let next_start = self.gates[next].window.pix.start;
            let prev_window = &mut self.gates[prev].window;
            prev_window.pix.end = next_start;
            refresh_mid(prev_window);
        }
        debug!("DAC gate {index} deleted, {} remain", self.active_count());
        true
    }
    pub fn delete_all(&mut self) {
        for gate in &mut self.gates {
            gate.active = false;
            gate.selected = false;
        }
        debug!("all DAC gates deleted");
    }
    /// Moves the start point of an active gate to (`x`, `y`).
    ///
    /// `x` is in gate space (already corrected for interface tracking). The
    /// start cannot pass the previous gate's start, nor its own end unless
    /// it is the last gate, whose end is pushed along instead. The previous
    /// gate's end follows the new start.
    pub fn drag(&mut self, index: usize, x: i32, y: i32, canvas: CanvasSize) -> bool {
        if !self.is_active_index(index) {
            return false;
        }
        let mut x = x.clamp(0, canvas.width.max(0));
        let y = y.clamp(0, canvas.height.max(0));
        let prev = self.prev_active(index);
        if let Some(prev) = prev {
            x = x.max(self.gates[prev].window.pix.start);
        }
        let has_next = self.next_active(index).is_some();
        let window = &mut self.gates[index].window;
        if has_next {
            x = x.min(window.pix.end);
        } else if x > window.pix.end {
            window.pix.end = x;
        }
        window.pix.start = x;
        window.pix.level = y;
        refresh_mid(window);
        if let Some(prev) = prev {
            let prev_window = &mut self.gates[prev].window;
            prev_window.pix.end = x;
            refresh_mid(prev_window);
        }
        trace!("DAC gate {index} dragged to ({x}, {y})");
        true
    }
    /// Active gate whose start point (as drawn) is within grab distance.
    pub fn pointed(&self, x: i32, y: i32) -> Option<usize> {
        self.active()
            .find(|(_, g)| {
                let pix = &g.window.pix;
                (x - pix.start_adjusted).abs() <= GRAB_RADIUS_PIX
                    && (y - pix.level).abs() <= GRAB_RADIUS_PIX
            })
            .map(|(i, _)| i)
    }
    /// Selects one active gate, deselecting any other.
    pub fn select(&mut self, index: usize) -> bool {
        self.clear_selection();
        if !self.is_active_index(index) {
            return false;
        }
        self.gates[index].selected = true;
        true
    }
    pub fn clear_selection(&mut self) {
        for gate in &mut self.gates {
            gate.selected = false;
        }
    }
    pub fn selected(&self) -> Option<usize> {
        self.active().find(|(_, g)| g.selected).map(|(i, _)| i)
    }
    /// Recomputes pixels from the stored times. Start and width round
    /// separately, so each active gate's end is snapped back onto the next
    /// active gate's start afterwards.
    pub fn calculate_pixel_locations(&mut self, projection: &Projection) -> bool {
        let mut changed = false;
        for gate in self.gates.iter_mut().filter(|g| g.active) {
            changed |= gate.window.calculate_pixel_location(projection);
        }
        let actives: Vec<usize> = self.active().map(|(i, _)| i).collect();
        for pair in actives.windows(2) {
            let next_start = self.gates[pair[1]].window.pix.start;
            let prev_window = &mut self.gates[pair[0]].window;
            if prev_window.pix.end != next_start {
                prev_window.pix.end = next_start;
                refresh_mid(prev_window);
                changed = true;
            }
        }
        changed
    }
    /// Stores the edited pixel positions back as times so they survive a
    /// change of range, delay or canvas size.
    pub fn calculate_time_locations(&mut self, projection: &Projection) -> bool {
        let mut changed = false;
        for gate in self.gates.iter_mut().filter(|g| g.active) {
            changed |= gate.window.calculate_time_location(projection);
        }
        changed
    }
    pub fn adjust_positions(&mut self, offset: Option<i32>) {
        for gate in self.gates.iter_mut().filter(|g| g.active) {
            gate.window.adjust_positions(offset);
        }
    }
    /// The curve in the time domain: (μs, % height) corner points.
    pub fn curve_points(&self) -> Vec<[f64; 2]> {
        self.active()
            .flat_map(|(_, g)| {
                [
                    [g.window.start_us, g.window.level],
                    [g.window.end_us(), g.window.level],
                ]
            })
            .collect()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    const CANVAS: CanvasSize = CanvasSize {
        width: 350,
        height: 350,
    };
    fn starts_ends(profile: &DacProfile) -> Vec<(usize, i32, i32)> {
        profile
            .active()
            .map(|(i, g)| (i, g.window.pix.start, g.window.pix.end))
            .collect()
    }
    fn assert_contiguous(profile: &DacProfile) {
        let active: Vec<&DacGate> = profile.active().map(|(_, g)| g).collect();
        for pair in active.windows(2) {
            assert_eq!(pair[0].window.pix.end, pair[1].window.pix.start);
        }
    }
    fn three_gate_profile() -> DacProfile {
        let mut p = DacProfile::new(8);
        p.insert(50, 100);
        p.insert(200, 120);
        p.insert(300, 140);
        p
    }
    #[test]
    fn capacity_is_capped() {
        assert_eq!(DacProfile::new(64).capacity(), MAX_DAC_GATES);
        assert_eq!(DacProfile::new(4).capacity(), 4);
    }
    #[test]
    fn first_insert_uses_slot_zero_with_default_width() {
        let mut p = DacProfile::new(4);
        assert_eq!(p.insert(40, 100), Some(0));
        assert_eq!(starts_ends(&p), vec![(0, 40, 75)]);
        assert_eq!(p.gate(0).unwrap().window.pix.level, 100);
    }
    #[test]
    fn inserts_past_end_append_to_curve() {
        let p = three_gate_profile();
        assert_eq!(starts_ends(&p), vec![(0, 50, 85), (1, 85, 120), (2, 120, 155)]);
        assert_contiguous(&p);
    }
    #[test]
    fn insert_before_first_ends_at_curve_start() {
        let mut p = three_gate_profile();
        assert_eq!(p.insert(10, 90), Some(0));
        assert_eq!(starts_ends(&p)[..2], [(0, 10, 50), (1, 50, 85)]);
        assert_contiguous(&p);
    }
    #[test]
    fn insert_inside_gate_splits_it() {
        let mut p = three_gate_profile();
        assert_eq!(p.insert(100, 90), Some(2));
        assert_eq!(
            starts_ends(&p),
            vec![(0, 50, 85), (1, 85, 100), (2, 100, 120), (3, 120, 155)]
        );
        assert_contiguous(&p);
    }
    #[test]
    fn insert_when_full_changes_nothing() {
        let mut p = DacProfile::new(3);
        p.insert(10, 10);
        p.insert(100, 10);
        p.insert(200, 10);
        assert!(p.is_full());
        let before = p.clone();
        assert_eq!(p.insert(20, 30), None);
        assert_eq!(p, before);
    }
    #[test]
    fn delete_keeps_indices_and_rejoins_neighbours() {
        let mut p = three_gate_profile();
        p.drag(2, 140, 140, CANVAS);
        assert!(p.delete(1));
        assert!(!p.gate(1).unwrap().is_active());
        assert_eq!(starts_ends(&p), vec![(0, 50, 140), (2, 140, 155)]);
        assert!(!p.delete(1));
        assert!(!p.delete(99));
    }
    #[test]
    fn insert_fills_hole_left_by_delete() {
        let mut p = three_gate_profile();
        p.delete(1);
        // appended past the end: the vacant slot 1 moves up behind gate 2
        assert_eq!(p.insert(320, 50), Some(2));
        assert_eq!(starts_ends(&p), vec![(0, 50, 120), (1, 120, 155), (2, 155, 190)]);
        assert_contiguous(&p);
    }
    #[test]
    fn delete_all_clears_every_slot() {
        let mut p = three_gate_profile();
        p.select(1);
        p.delete_all();
        assert_eq!(p.active_count(), 0);
        assert_eq!(p.selected(), None);
    }
    #[test]
    fn drag_cannot_pass_previous_start() {
        let mut p = three_gate_profile();
        assert!(p.drag(2, 40, 130, CANVAS));
        let g1 = p.gate(1).unwrap().window.pix;
        let g2 = p.gate(2).unwrap().window.pix;
        assert_eq!(g2.start, g1.start);
        assert_eq!(g1.end, g2.start);
        assert_eq!(g2.level, 130);
    }
    #[test]
    fn drag_of_inner_gate_stops_at_own_end() {
        let mut p = three_gate_profile();
        p.drag(1, 300, 100, CANVAS);
        assert_eq!(p.gate(1).unwrap().window.pix.start, 120);
        assert_eq!(p.gate(0).unwrap().window.pix.end, 120);
        assert_contiguous(&p);
    }
    #[test]
    fn drag_of_last_gate_stretches_its_end() {
        let mut p = three_gate_profile();
        p.drag(2, 200, 100, CANVAS);
        let last = p.gate(2).unwrap().window.pix;
        assert_eq!((last.start, last.end), (200, 200));
        assert_eq!(p.gate(1).unwrap().window.pix.end, 200);
    }
    #[test]
    fn drag_clamps_to_canvas() {
        let mut p = three_gate_profile();
        p.drag(0, -30, -5, CANVAS);
        let first = p.gate(0).unwrap().window.pix;
        assert_eq!((first.start, first.level), (0, 0));
        p.drag(2, 900, 900, CANVAS);
        let last = p.gate(2).unwrap().window.pix;
        assert_eq!((last.start, last.level), (350, 350));
        assert!(!p.drag(5, 10, 10, CANVAS));
    }
    #[test]
    fn contiguity_holds_through_mixed_edits() {
        let mut p = DacProfile::new(10);
        let edits: [(i32, i32); 6] = [(60, 80), (20, 70), (150, 90), (90, 60), (40, 50), (330, 40)];
        for (step, (x, y)) in edits.iter().enumerate() {
            p.insert(*x, *y);
            let idx = p.active().map(|(i, _)| i).nth(step % p.active_count()).unwrap();
            p.drag(idx, x + 7, *y, CANVAS);
            assert_contiguous(&p);
        }
    }
    #[test]
    fn pointed_hits_start_point_within_grab_box() {
        let mut p = three_gate_profile();
        p.adjust_positions(Some(10));
        assert_eq!(p.pointed(95, 123), Some(1));
        assert_eq!(p.pointed(85, 120), None);
        assert_eq!(p.pointed(64, 96), Some(0));
    }
    #[test]
    fn selection_is_exclusive() {
        let mut p = three_gate_profile();
        assert!(p.select(0));
        assert!(p.select(2));
        assert_eq!(p.selected(), Some(2));
        assert!(!p.gate(0).unwrap().is_selected());
        assert!(!p.select(7));
        assert_eq!(p.selected(), None);
    }
    #[test]
    fn reverse_transform_survives_rescale() {
        let projection = Projection {
            us_per_pixel: 100.0 / 350.0,
            delay_pix: 0,
            canvas_height: 350,
            vert_offset: 0,
        };
        let mut p = three_gate_profile();
        p.calculate_time_locations(&projection);
        let g = &p.gate(0).unwrap().window;
        assert!((g.start_us - 50.0 * 100.0 / 350.0).abs() < 1e-9);
        assert!((g.width_us - 10.0).abs() < 1e-9);
        // canvas doubled in width: pixels double, times stay put
        let wide = Projection {
            us_per_pixel: 100.0 / 700.0,
            ..projection
        };
        p.calculate_pixel_locations(&wide);
        assert_eq!(starts_ends(&p), vec![(0, 100, 170), (1, 170, 240), (2, 240, 310)]);
        assert_eq!(p.curve_points().len(), 6);
    }
    #[test]
    fn rescale_keeps_curve_contiguous() {
        let narrow = Projection {
            us_per_pixel: 100.0 / 350.0,
            delay_pix: 0,
            canvas_height: 350,
            vert_offset: 0,
        };
        let mut p = DacProfile::new(8);
        for x in [15, 60, 120, 150, 200] {
            p.insert(x, 100);
        }
        p.drag(2, 95, 100, CANVAS);
        p.drag(4, 162, 100, CANVAS);
        p.calculate_time_locations(&narrow);
        // 15 px -> 22.4 and 35 px -> 52.3: start and width round apart
        let odd = Projection {
            us_per_pixel: 100.0 / 523.0,
            ..narrow
        };
        assert!(p.calculate_pixel_locations(&odd));
        assert_contiguous(&p);
        assert_eq!(p.gate(0).unwrap().window.pix.start, 22);
        assert_eq!(p.gate(0).unwrap().window.pix.end, 75);
        let last = p.gate(4).unwrap().window.pix;
        assert_eq!(last.mid, (last.start + last.end) / 2);
    }
}
