// src/oscope.rs
// Live scope canvas: paints the projected trace and overlay, reports size
// and mouse activity in canvas pixels.
use eframe::egui;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Shape, Stroke, Vec2};
use crate::gates::overlay::{Line, Overlay};
use crate::gates::trace::grid;
use crate::gates::CanvasSize;
use crate::types::{PointerButton, PointerEvent};
const BACKGROUND: Color32 = Color32::from_rgb(10, 10, 10);
const GRID: Color32 = Color32::from_rgb(40, 60, 40);
const TRACE: Color32 = Color32::from_rgb(80, 255, 80);
const GATE: Color32 = Color32::from_rgb(230, 60, 60);
const INTERFACE_GATE: Color32 = Color32::from_rgb(0, 220, 220);
const DAC: Color32 = Color32::from_rgb(240, 220, 40);
const DAC_SELECTED: Color32 = Color32::WHITE;
const CROSSING: Color32 = Color32::from_rgb(255, 0, 255);
pub struct ScopeResponse {
    pub canvas: CanvasSize,
    pub pointer: Vec<PointerEvent>,
}
pub fn draw_scope(ui: &mut egui::Ui, trace: &[(i32, i32)], overlay: &Overlay, size: Vec2) -> ScopeResponse {
    let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
    let rect = response.rect;
    let canvas = CanvasSize {
        width: rect.width().round() as i32,
        height: rect.height().round() as i32,
    };
    let painter = painter.with_clip_rect(rect);
    let at = |(x, y): (i32, i32)| rect.min + Vec2::new(x as f32, y as f32);
    let segment = |line: &Line, stroke: Stroke| painter.line_segment([at(line.from), at(line.to)], stroke);
    painter.rect_filled(rect, Rounding::same(0.0), BACKGROUND);
    let lines = grid(canvas, 10);
    for x in lines.vertical {
        segment(&Line::new((x, 0), (x, canvas.height)), Stroke::new(1.0, GRID));
    }
    for y in lines.horizontal {
        segment(&Line::new((0, y), (canvas.width, y)), Stroke::new(1.0, GRID));
    }
    if trace.len() > 1 {
        let points: Vec<Pos2> = trace.iter().copied().map(at).collect();
        painter.add(Shape::line(points, Stroke::new(1.0, TRACE)));
    }
    for gate in &overlay.gates {
        let color = if gate.interface { INTERFACE_GATE } else { GATE };
        segment(&gate.line, Stroke::new(2.0, color));
    }
    for dac in &overlay.dac_segments {
        let color = if dac.selected { DAC_SELECTED } else { DAC };
        segment(&dac.line, Stroke::new(1.5, color));
    }
    for connector in &overlay.dac_connectors {
        segment(connector, Stroke::new(1.0, DAC));
    }
    for point in &overlay.grab_points {
        painter.circle_stroke(at(*point), 4.0, Stroke::new(1.0, DAC));
    }
    if let Some(tick) = &overlay.crossing {
        segment(tick, Stroke::new(2.0, CROSSING));
    }
    painter.rect_stroke(rect, Rounding::same(0.0), Stroke::new(1.0, GRID));
    ScopeResponse {
        canvas,
        pointer: pointer_events(&response, rect),
    }
}
fn pointer_events(response: &egui::Response, rect: Rect) -> Vec<PointerEvent> {
    let mut events = Vec::new();
    let Some(pos) = response.interact_pointer_pos() else {
        return events;
    };
    let x = (pos.x - rect.min.x).round() as i32;
    let y = (pos.y - rect.min.y).round() as i32;
    if response.secondary_clicked() {
        events.push(PointerEvent::Press {
            x,
            y,
            button: PointerButton::Secondary,
        });
    }
    if response.drag_started_by(egui::PointerButton::Primary) {
        events.push(PointerEvent::Press {
            x,
            y,
            button: PointerButton::Primary,
        });
    } else if response.dragged_by(egui::PointerButton::Primary) && response.drag_delta() != Vec2::ZERO {
        events.push(PointerEvent::Drag { x, y });
    }
    if response.drag_released_by(egui::PointerButton::Primary) {
        events.push(PointerEvent::Release { x, y });
    }
    events
}
