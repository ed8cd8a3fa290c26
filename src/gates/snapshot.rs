use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use super::display::CanvasSize;
use super::error::ScopeError;
use super::overlay::Overlay;
use super::trace::grid;
#[derive(Clone, Debug)]
pub struct SnapshotStyle {
    pub background: RGBColor,
    pub grid: RGBColor,
    pub trace: RGBColor,
    pub gate: RGBColor,
    pub interface_gate: RGBColor,
    pub dac: RGBColor,
    pub dac_selected: RGBColor,
    pub crossing: RGBColor,
}
impl Default for SnapshotStyle {
    fn default() -> Self {
        Self {
            background: RGBColor(10, 10, 10),
            grid: RGBColor(40, 60, 40),
            trace: RGBColor(80, 255, 80),
            gate: RED,
            interface_gate: CYAN,
            dac: YELLOW,
            dac_selected: WHITE,
            crossing: MAGENTA,
        }
    }
}
/// Draws the trace and overlay at canvas resolution and encodes a PNG.
pub fn render_png(
    trace: &[(i32, i32)],
    overlay: &Overlay,
    canvas: CanvasSize,
    style: &SnapshotStyle,
) -> Result<Vec<u8>, ScopeError> {
    if canvas.width <= 0 || canvas.height <= 0 {
        return Err(ScopeError::InvalidCanvas {
            width: canvas.width,
            height: canvas.height,
        });
    }
    let (width, height) = (canvas.width as u32, canvas.height as u32);
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&style.background)?;
        let lines = grid(canvas, 10);
        for x in lines.vertical {
            root.draw(&PathElement::new(vec![(x, 0), (x, canvas.height)], &style.grid))?;
        }
        for y in lines.horizontal {
            root.draw(&PathElement::new(vec![(0, y), (canvas.width, y)], &style.grid))?;
        }
        if trace.len() > 1 {
            root.draw(&PathElement::new(trace.to_vec(), &style.trace))?;
        }
        for gate in &overlay.gates {
            let color = if gate.interface {
                &style.interface_gate
            } else {
                &style.gate
            };
            root.draw(&PathElement::new(vec![gate.line.from, gate.line.to], color.stroke_width(2)))?;
        }
        for segment in &overlay.dac_segments {
            let color = if segment.selected {
                &style.dac_selected
            } else {
                &style.dac
            };
            root.draw(&PathElement::new(vec![segment.line.from, segment.line.to], color))?;
        }
        for connector in &overlay.dac_connectors {
            root.draw(&PathElement::new(vec![connector.from, connector.to], &style.dac))?;
        }
        for point in &overlay.grab_points {
            root.draw(&Circle::new(*point, 4, &style.dac))?;
        }
        if let Some(tick) = overlay.crossing {
            root.draw(&PathElement::new(vec![tick.from, tick.to], &style.crossing))?;
        }
        root.present()?;
    }
    encode_png(&buffer, width, height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScopeError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ScopeError::Snapshot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::overlay::{GateLine, Line};
    #[test]
    fn renders_png_at_canvas_size() {
        let overlay = Overlay {
            gates: vec![GateLine {
                title: "Interface".into(),
                line: Line::new((20, 200), (60, 200)),
                interface: true,
            }],
            crossing: Some(Line::new((40, 190), (40, 210))),
            ..Overlay::default()
        };
        let trace: Vec<(i32, i32)> = (0..200).map(|x| (x, 150 + (x % 7))).collect();
        let canvas = CanvasSize {
            width: 200,
            height: 300,
        };
        let png = render_png(&trace, &overlay, canvas, &SnapshotStyle::default()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 300));
    }
    #[test]
    fn empty_canvas_is_rejected() {
        let canvas = CanvasSize {
            width: 0,
            height: 300,
        };
        let err = render_png(&[], &Overlay::default(), canvas, &SnapshotStyle::default()).unwrap_err();
        assert!(matches!(err, ScopeError::InvalidCanvas { .. }));
    }
}
