// src/gui.rs
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;
use anyhow::Context;
use eframe::egui;
use egui::{Color32, DragValue, Vec2};
use egui_plot::{Line, Plot, PlotPoints};
use log::{info, warn};
use crate::calibrator::Calibrator;
use crate::config::ScopeConfig;
use crate::engine;
use crate::gates::display::NO_CROSSING;
use crate::gates::units::DELAY_LIMITS_US;
use crate::gates::{DisplayMode, DistanceUnits, SampleSpan, TimeDistance};
use crate::oscope;
use crate::types::*;
const LOG_LINES: usize = 8;
const DAC_PLOT_HEIGHT: f32 = 140.0;
// Values shown in the side panel, in display units
#[derive(Clone, Debug, Default, PartialEq)]
struct GateControls {
    title: String,
    start: f64,
    width: f64,
    level: f64,
}
#[derive(Clone, Debug, PartialEq)]
struct Controls {
    range: f64,
    delay: f64,
    mode: DisplayMode,
    tracking: bool,
    units: DistanceUnits,
    dac_enabled: bool,
    dac_locked: bool,
    gates: Vec<GateControls>,
}
impl Controls {
    fn from_calibrator(cal: &Calibrator) -> Self {
        let td = cal.units();
        let settings = cal.settings();
        Self {
            range: td.to_display(settings.range_us),
            delay: td.to_display(settings.delay_us),
            mode: settings.mode,
            tracking: settings.interface_tracking,
            units: td.units,
            dac_enabled: cal.dac_enabled(),
            dac_locked: cal.dac_locked(),
            gates: cal
                .gates()
                .iter()
                .map(|g| GateControls {
                    title: g.title.clone(),
                    start: td.to_display(g.window.start_us),
                    width: td.to_display(g.window.width_us),
                    level: g.window.level,
                })
                .collect(),
        }
    }
    fn show(&mut self, ui: &mut egui::Ui, td: TimeDistance, delete_enabled: bool, events: &mut Vec<ControlEvent>) {
        let suffix = format!(" {}", td.units.suffix());
        let decimals = td.decimals();
        let (range_lo, range_hi) = td.range_limits();
        egui::Grid::new("channel_controls").num_columns(2).show(ui, |ui| {
            ui.label("Range");
            if ui
                .add(
                    DragValue::new(&mut self.range)
                        .clamp_range(range_lo..=range_hi)
                        .speed(0.1)
                        .fixed_decimals(decimals)
                        .suffix(&suffix),
                )
                .changed()
            {
                events.push(ControlEvent::RangeChanged(td.from_display(self.range)));
            }
            ui.end_row();
            ui.label("Delay");
            let delay_hi = td.to_display(DELAY_LIMITS_US.1);
            if ui
                .add(
                    DragValue::new(&mut self.delay)
                        .clamp_range(0.0..=delay_hi)
                        .speed(0.1)
                        .fixed_decimals(decimals)
                        .suffix(&suffix),
                )
                .changed()
            {
                events.push(ControlEvent::DelayChanged(td.from_display(self.delay)));
            }
            ui.end_row();
            ui.label("Display");
            let before = self.mode;
            egui::ComboBox::from_id_source("display_mode")
                .selected_text(self.mode.label())
                .show_ui(ui, |ui| {
                    for mode in DisplayMode::ALL {
                        ui.selectable_value(&mut self.mode, mode, mode.label());
                    }
                });
            if self.mode != before {
                events.push(ControlEvent::DisplayModeChanged(self.mode));
            }
            ui.end_row();
        });
        if ui.checkbox(&mut self.tracking, "Interface tracking").changed() {
            events.push(ControlEvent::InterfaceTrackingToggled(self.tracking));
        }
        ui.horizontal(|ui| {
            let before = self.units;
            ui.selectable_value(&mut self.units, DistanceUnits::Time, "uS");
            ui.selectable_value(&mut self.units, DistanceUnits::Inches, "in");
            ui.selectable_value(&mut self.units, DistanceUnits::Millimeters, "mm");
            if self.units != before {
                events.push(ControlEvent::UnitsChanged(self.units));
            }
        });
        ui.separator();
        ui.label("GATES");
        egui::Grid::new("gate_controls").num_columns(4).show(ui, |ui| {
            ui.label("");
            ui.label("Start");
            ui.label("Width");
            ui.label("Level %");
            ui.end_row();
            for (gate, controls) in self.gates.iter_mut().enumerate() {
                ui.label(controls.title.as_str());
                if ui
                    .add(DragValue::new(&mut controls.start).clamp_range(0.0..=f64::MAX).speed(0.05).fixed_decimals(decimals))
                    .changed()
                {
                    events.push(ControlEvent::GateStartChanged {
                        gate,
                        us: td.from_display(controls.start),
                    });
                }
                if ui
                    .add(DragValue::new(&mut controls.width).clamp_range(0.0..=f64::MAX).speed(0.05).fixed_decimals(decimals))
                    .changed()
                {
                    events.push(ControlEvent::GateWidthChanged {
                        gate,
                        us: td.from_display(controls.width),
                    });
                }
                if ui
                    .add(DragValue::new(&mut controls.level).clamp_range(0.0..=100.0).speed(0.5).fixed_decimals(0))
                    .changed()
                {
                    events.push(ControlEvent::GateLevelChanged {
                        gate,
                        percent: controls.level,
                    });
                }
                ui.end_row();
            }
        });
        ui.separator();
        ui.label("DAC");
        ui.horizontal(|ui| {
            if ui.checkbox(&mut self.dac_enabled, "Enabled").changed() {
                events.push(ControlEvent::DacEnabled(self.dac_enabled));
            }
            if ui.checkbox(&mut self.dac_locked, "Locked").changed() {
                events.push(ControlEvent::DacLocked(self.dac_locked));
            }
        });
        ui.horizontal(|ui| {
            if ui
                .add_enabled(delete_enabled, egui::Button::new("Delete"))
                .clicked()
            {
                events.push(ControlEvent::DeleteSelectedDacGate);
            }
            if ui
                .add_enabled(self.dac_enabled, egui::Button::new("Delete All"))
                .clicked()
            {
                events.push(ControlEvent::DeleteAllDacGates);
            }
        });
        ui.label(
            egui::RichText::new("Right click: add point. Drag: move point.")
                .small()
                .color(Color32::GRAY),
        );
    }
}
pub struct UtScopeApp {
    calibrator: Calibrator,
    controls: Controls,
    trace: Vec<(i32, i32)>,
    is_running: bool,
    delete_enabled: bool,
    span: Option<SampleSpan>,
    snapshot_path: String,
    log_messages: Vec<String>,
    notices: Receiver<Notice>,
    frames: Receiver<ScanFrame>,
    tx_cmd: Sender<EngineCommand>,
    engine: Option<JoinHandle<()>>,
}
impl UtScopeApp {
    pub fn new(config: ScopeConfig) -> Self {
        let (tx_notice, notices) = channel();
        let (tx_frame, frames) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let engine = engine::spawn_thread(tx_frame, rx_cmd);
        let calibrator = Calibrator::new(&config, tx_notice);
        tx_cmd.send(EngineCommand::Configure(calibrator.settings())).ok();
        Self {
            controls: Controls::from_calibrator(&calibrator),
            calibrator,
            trace: Vec::new(),
            is_running: false,
            delete_enabled: false,
            span: None,
            snapshot_path: "scope.png".to_owned(),
            log_messages: vec!["UT scope ready.".to_owned()],
            notices,
            frames,
            tx_cmd,
            engine: Some(engine),
        }
    }
    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > LOG_LINES {
            self.log_messages.remove(0);
        }
    }
    fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices.try_recv() {
            match notice {
                Notice::Log(s) => self.log(&s),
                Notice::GatesChanged => {}
                Notice::DacProfileChanged { active } => {
                    let capacity = self.calibrator.dac().capacity();
                    self.log(&format!("DAC points: {active}/{capacity}"));
                }
                Notice::DeleteEnabled(on) => self.delete_enabled = on,
                Notice::SpanChanged(span) => self.span = Some(span),
            }
        }
    }
    fn drain_frames(&mut self) {
        // only the newest frame is worth drawing
        if let Some(frame) = self.frames.try_iter().last() {
            self.trace = self.calibrator.display_frame(&frame);
        }
    }
    fn apply(&mut self, events: Vec<ControlEvent>) {
        let before = self.calibrator.settings();
        for event in events {
            self.calibrator.handle(event);
        }
        let after = self.calibrator.settings();
        if after != before {
            self.tx_cmd.send(EngineCommand::Configure(after)).ok();
        }
        self.controls = Controls::from_calibrator(&self.calibrator);
    }
    fn save_snapshot(&self) -> anyhow::Result<PathBuf> {
        let path = PathBuf::from(self.snapshot_path.trim());
        let png = self
            .calibrator
            .snapshot(&self.trace)
            .context("rendering scope snapshot")?;
        fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
    fn dac_plot(&self, ui: &mut egui::Ui) {
        let points = self.calibrator.dac().curve_points();
        let range = self.calibrator.settings().range_us;
        Plot::new("dac_curve")
            .height(DAC_PLOT_HEIGHT)
            .include_x(0.0)
            .include_x(range)
            .include_y(0.0)
            .include_y(100.0)
            .allow_drag(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                if !points.is_empty() {
                    plot_ui.line(Line::new(PlotPoints::new(points)).name("DAC (us, %)").color(Color32::YELLOW));
                }
            });
    }
}
impl eframe::App for UtScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_notices();
        self.drain_frames();
        if self.is_running {
            ctx.request_repaint();
        }
        let mut events = Vec::new();
        let td = self.calibrator.units();
        egui::SidePanel::left("controls").min_width(300.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("UT Scope");
            ui.separator();
            let run_txt = if self.is_running { "STOP" } else { "START" };
            if ui.button(run_txt).clicked() {
                let cmd = if self.is_running {
                    EngineCommand::Stop
                } else {
                    EngineCommand::Start
                };
                self.tx_cmd.send(cmd).ok();
                self.is_running = !self.is_running;
            }
            ui.separator();
            self.controls.show(ui, td, self.delete_enabled, &mut events);
            ui.separator();
            let dac = self.calibrator.dac();
            if let Some(gate) = dac.selected().and_then(|i| dac.gate(i)) {
                ui.label(format!("Selected: {}", gate.title));
            }
            let crossing = self.calibrator.display().crossing_marker_x();
            if crossing != NO_CROSSING {
                ui.label(format!("Interface at {crossing} px"));
            }
            if let Some(span) = self.span {
                ui.label(format!("Digitizer span: {} .. {} samples", span.first, span.last));
            }
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.snapshot_path);
                if ui.button("Snapshot").clicked() {
                    let msg = match self.save_snapshot() {
                        Ok(path) => {
                            info!("snapshot saved to {}", path.display());
                            format!("Saved {}", path.display())
                        }
                        Err(err) => {
                            warn!("snapshot failed: {err:#}");
                            format!("Snapshot failed: {err:#}")
                        }
                    };
                    self.log(&msg);
                }
            });
            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let size = Vec2::new(
                available.x.max(100.0),
                (available.y - DAC_PLOT_HEIGHT - 10.0).max(100.0),
            );
            let overlay = self.calibrator.overlay();
            let scope = oscope::draw_scope(ui, &self.trace, &overlay, size);
            let canvas = self.calibrator.display().canvas();
            if scope.canvas != canvas {
                events.push(ControlEvent::CanvasResized {
                    width: scope.canvas.width,
                    height: scope.canvas.height,
                });
            }
            events.extend(scope.pointer.into_iter().map(ControlEvent::Pointer));
            ui.add_space(10.0);
            self.dac_plot(ui);
        });
        if !events.is_empty() {
            self.apply(events);
        }
    }
}
impl Drop for UtScopeApp {
    fn drop(&mut self) {
        self.tx_cmd.send(EngineCommand::Shutdown).ok();
        if let Some(handle) = self.engine.take() {
            if handle.join().is_err() {
                warn!("simulator thread panicked");
            }
        }
    }
}
