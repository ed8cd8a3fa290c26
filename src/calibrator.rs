// src/calibrator.rs
//! Single-thread owner of one channel's display state, gates and DAC
//! profile. The UI feeds it typed [`ControlEvent`]s and scan frames; it
//! answers with [`Notice`]s over a channel and never holds a reference back
//! into the UI.
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::Sender;
use log::{debug, info, trace};
use crate::config::ScopeConfig;
use crate::gates::overlay::{self, Overlay};
use crate::gates::snapshot::{render_png, SnapshotStyle};
use crate::gates::trace::project_ascan;
use crate::gates::units::{DELAY_LIMITS_US, RANGE_LIMITS_US};
use crate::gates::{
    CanvasSize, ChannelSettings, DacProfile, DisplayState, Gate, GateSet, SampleSpan, ScopeError,
    TimeDistance,
};
use crate::types::{ControlEvent, Notice, PointerButton, PointerEvent, ScanFrame};
/// Sends notices upward unless a [`SuppressGuard`] is alive.
pub struct Notifier {
    tx: Sender<Notice>,
    suppressed: Rc<Cell<u32>>,
}
impl Notifier {
    pub fn new(tx: Sender<Notice>) -> Self {
        Self {
            tx,
            suppressed: Rc::new(Cell::new(0)),
        }
    }
    /// Silences notices (and control echoes) until the guard is dropped.
    /// Guards nest.
    pub fn suppress(&self) -> SuppressGuard {
        self.suppressed.set(self.suppressed.get() + 1);
        SuppressGuard {
            depth: Rc::clone(&self.suppressed),
        }
    }
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get() > 0
    }
    pub fn send(&self, notice: Notice) {
        if self.is_suppressed() {
            trace!("suppressed {notice:?}");
            return;
        }
        // the UI may already be gone during shutdown
        self.tx.send(notice).ok();
    }
}
#[must_use = "notices are only suppressed while the guard is alive"]
pub struct SuppressGuard {
    depth: Rc<Cell<u32>>,
}
impl Drop for SuppressGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
pub struct Calibrator {
    display: DisplayState,
    gates: GateSet,
    dac: DacProfile,
    units: TimeDistance,
    dac_enabled: bool,
    dac_locked: bool,
    dragging: Option<usize>,
    span: Option<SampleSpan>,
    notifier: Notifier,
}
impl Calibrator {
    pub fn new(config: &ScopeConfig, notices: Sender<Notice>) -> Self {
        let mut calibrator = Self {
            display: DisplayState::new(config.channel, config.canvas),
            gates: config.gate_set(),
            dac: DacProfile::new(config.dac_capacity),
            units: config.time_distance(),
            dac_enabled: false,
            dac_locked: false,
            dragging: None,
            span: None,
            notifier: Notifier::new(notices),
        };
        {
            // laying out the configured gates is not an edit
            let _quiet = calibrator.notifier.suppress();
            calibrator
                .gates
                .set_interface_tracking(config.channel.interface_tracking);
            calibrator.refresh_geometry();
        }
        calibrator.update_span();
        calibrator
    }
    pub fn display(&self) -> &DisplayState {
        &self.display
    }
    pub fn settings(&self) -> ChannelSettings {
        *self.display.settings()
    }
    pub fn gates(&self) -> &GateSet {
        &self.gates
    }
    pub fn dac(&self) -> &DacProfile {
        &self.dac
    }
    pub fn units(&self) -> TimeDistance {
        self.units
    }
    pub fn dac_enabled(&self) -> bool {
        self.dac_enabled
    }
    pub fn dac_locked(&self) -> bool {
        self.dac_locked
    }
    #[cfg(test)]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
    pub fn handle(&mut self, event: ControlEvent) {
        if self.notifier.is_suppressed() {
            trace!("ignoring echoed {event:?}");
            return;
        }
        debug!("control event {event:?}");
        match event {
            ControlEvent::RangeChanged(us) => {
                self.display
                    .set_range(us.clamp(RANGE_LIMITS_US.0, RANGE_LIMITS_US.1));
                self.refresh_geometry();
            }
            ControlEvent::DelayChanged(us) => {
                self.display
                    .set_delay(us.clamp(DELAY_LIMITS_US.0, DELAY_LIMITS_US.1));
                self.refresh_geometry();
            }
            ControlEvent::DisplayModeChanged(mode) => {
                self.display.set_mode(mode);
                self.refresh_geometry();
            }
            ControlEvent::InterfaceTrackingToggled(on) => {
                self.display.set_interface_tracking(on);
                self.gates.set_interface_tracking(on);
                self.refresh_geometry();
                self.update_span();
                self.notifier.send(Notice::Log(format!(
                    "interface tracking {}",
                    if on { "on" } else { "off" }
                )));
            }
            ControlEvent::GateStartChanged { gate, us } => {
                let tracking = self.display.interface_tracking();
                self.edit_gate(gate, |g| g.set_start(us.max(0.0), tracking));
            }
            ControlEvent::GateWidthChanged { gate, us } => {
                self.edit_gate(gate, |g| g.set_width(us));
            }
            ControlEvent::GateLevelChanged { gate, percent } => {
                self.edit_gate(gate, |g| g.set_level(percent));
            }
            ControlEvent::DacEnabled(on) => {
                self.dac_enabled = on;
                if !on {
                    self.dragging = None;
                    self.dac.clear_selection();
                    self.notifier.send(Notice::DeleteEnabled(false));
                }
            }
            ControlEvent::DacLocked(locked) => {
                self.dac_locked = locked;
                if locked {
                    self.dragging = None;
                }
            }
            ControlEvent::DeleteSelectedDacGate => {
                if let Some(index) = self.dac.selected() {
                    self.dac.delete(index);
                    self.dac_changed();
                    self.notifier.send(Notice::DeleteEnabled(false));
                }
            }
            ControlEvent::DeleteAllDacGates => {
                self.dac.delete_all();
                self.dragging = None;
                self.dac_changed();
                self.notifier.send(Notice::DeleteEnabled(false));
            }
            ControlEvent::CanvasResized { width, height } => {
                let canvas = CanvasSize { width, height };
                if canvas != self.display.canvas() {
                    self.display.set_canvas(canvas);
                    self.refresh_geometry();
                }
            }
            ControlEvent::Pointer(pointer) => self.handle_pointer(pointer),
            ControlEvent::UnitsChanged(units) => {
                self.units.units = units;
                info!("display units set to {}", units.suffix());
            }
        }
    }
    fn edit_gate(&mut self, index: usize, edit: impl FnOnce(&mut Gate)) {
        let Some(gate) = self.gates.get_mut(index) else {
            debug!("no gate {index}");
            return;
        };
        edit(gate);
        self.refresh_geometry();
        self.update_span();
    }
    fn handle_pointer(&mut self, event: PointerEvent) {
        if !self.dac_enabled || self.dac_locked {
            return;
        }
        let canvas = self.display.canvas();
        match event {
            PointerEvent::Press {
                x,
                y,
                button: PointerButton::Primary,
            } => {
                self.dragging = self.dac.pointed(x, y);
                match self.dragging {
                    Some(index) => {
                        self.dac.select(index);
                    }
                    None => self.dac.clear_selection(),
                }
                self.notifier
                    .send(Notice::DeleteEnabled(self.dragging.is_some()));
            }
            PointerEvent::Press {
                x,
                y,
                button: PointerButton::Secondary,
            } => {
                if self.dac.is_full() {
                    debug!("DAC profile full, right click ignored");
                    return;
                }
                let gx = self.display.to_gate_space_x(x);
                if self.dac.insert(gx, y.clamp(0, canvas.height)).is_some() {
                    // insert reorders slots, so a held index is stale now
                    self.dragging = None;
                    self.dac.clear_selection();
                    self.dac_changed();
                    self.notifier.send(Notice::DeleteEnabled(false));
                }
            }
            PointerEvent::Drag { x, y } => {
                if let Some(index) = self.dragging {
                    let gx = self.display.to_gate_space_x(x);
                    self.dac.drag(index, gx, y, canvas);
                    self.dac.adjust_positions(self.display.tracking_offset());
                }
            }
            PointerEvent::Release { x, y } => {
                if let Some(index) = self.dragging.take() {
                    let gx = self.display.to_gate_space_x(x);
                    self.dac.drag(index, gx, y, canvas);
                    self.dac_changed();
                }
            }
        }
    }
    /// Persists edited DAC pixels as times and tells the UI.
    fn dac_changed(&mut self) {
        self.dac
            .calculate_time_locations(&self.display.gate_projection());
        self.dac.adjust_positions(self.display.tracking_offset());
        self.notifier.send(Notice::DacProfileChanged {
            active: self.dac.active_count(),
        });
    }
    fn refresh_geometry(&mut self) {
        let changed = self.gates.calculate_pixel_locations(&self.display);
        self.dac
            .calculate_pixel_locations(&self.display.gate_projection());
        self.adjust_positions();
        if changed {
            self.notifier.send(Notice::GatesChanged);
        }
    }
    fn adjust_positions(&mut self) {
        self.gates.adjust_positions(&self.display);
        self.dac.adjust_positions(self.display.tracking_offset());
    }
    fn update_span(&mut self) {
        let settings = self.display.settings();
        let span = self
            .gates
            .sample_span(settings.us_per_sample, settings.interface_tracking);
        if span != self.span {
            self.span = span;
            if let Some(span) = span {
                self.notifier.send(Notice::SpanChanged(span));
            }
        }
    }
    /// Per-refresh hook: follows the interface crossing and returns the
    /// trace projected onto the canvas.
    pub fn display_frame(&mut self, frame: &ScanFrame) -> Vec<(i32, i32)> {
        let before = self.display.interface_crossing_pix();
        let after = self.display.update_interface_crossing(frame.crossing_sample);
        if before != after {
            self.adjust_positions();
        }
        project_ascan(&frame.samples, frame.us_per_point, &self.display)
    }
    pub fn overlay(&self) -> Overlay {
        overlay::build(
            &self.gates,
            &self.dac,
            &self.display,
            self.dac_enabled,
            !self.dac_locked,
        )
    }
    pub fn snapshot(&self, trace: &[(i32, i32)]) -> Result<Vec<u8>, ScopeError> {
        render_png(
            trace,
            &self.overlay(),
            self.display.canvas(),
            &SnapshotStyle::default(),
        )
    }
}
