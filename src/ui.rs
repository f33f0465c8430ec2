use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use geo_overlay::braille::BrailleCanvas;
use geo_overlay::heatmap::DensityField;
use geo_overlay::map::GlobeViewport;

use crate::app::App;

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Overlay Globe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut heat = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let mut markers = BrailleCanvas::new(inner.width as usize, inner.height as usize);
    let mut labels: Vec<(u16, u16, String)> = Vec::new();

    if app.show_heatmap {
        if let Some(field) = &app.heatmap {
            draw_heatmap(&mut heat, field, &app.globe);
        }
    }

    // Cluster engine output: aggregate markers get a ring plus a count
    // label, individuals a small dot
    for marker in &app.engine.host().markers {
        let x = marker.position.x.round() as i32;
        let y = marker.position.y.round() as i32;
        if marker.count > 1 {
            markers.stroke_circle(x, y, 4);
            markers.fill_circle(x, y, 1);
        } else {
            markers.fill_circle(x, y, 2);
        }
    }
    for label in &app.engine.host().labels {
        let cx = (label.position.x / 2.0) as u16;
        let cy = (label.position.y / 4.0) as u16;
        labels.push((cx.saturating_add(3), cy, label.text.clone()));
    }

    let widget = OverlayWidget {
        heat,
        markers,
        labels,
    };
    frame.render_widget(widget, inner);
}

/// Rasterize the density field into the braille layer with an ordered
/// 2x2 dither so heavier alpha reads as denser dots.
fn draw_heatmap(canvas: &mut BrailleCanvas, field: &DensityField, globe: &GlobeViewport) {
    const THRESHOLDS: [u8; 4] = [32, 96, 160, 224];
    for py in 0..canvas.pixel_height() {
        for px in 0..canvas.pixel_width() {
            let Some((lon, lat)) = globe.unproject(px as f64, py as f64) else {
                continue;
            };
            let Some(rgba) = field.sample_geo(lon, lat) else {
                continue;
            };
            let threshold = THRESHOLDS[(px % 2) + 2 * (py % 2)];
            if rgba[3] > threshold {
                canvas.set_pixel(px as i32, py as i32);
            }
        }
    }
}

/// Layered braille widget: heatmap below, markers above, labels on top.
struct OverlayWidget {
    heat: BrailleCanvas,
    markers: BrailleCanvas,
    labels: Vec<(u16, u16, String)>,
}

impl OverlayWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for OverlayWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.heat, Color::Red, area, buf);
        Self::render_layer(&self.markers, Color::Cyan, area, buf);

        let label_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        for (lx, ly, text) in &self.labels {
            if *lx >= area.width || *ly >= area.height {
                continue;
            }
            let y = area.y + *ly;
            for (i, ch) in text.chars().enumerate() {
                let x = area.x + *lx + i as u16;
                if x < area.x + area.width {
                    buf[(x, y)].set_char(ch).set_style(label_style);
                }
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let marker_count = app.engine.host().markers.len();
    let cluster_count = app.engine.clusters().len();
    let point_count = app.engine.points().len();

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{point_count} pts / {cluster_count} clusters / {marker_count} markers "),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            if app.clustering_enabled { "[C]luster " } else { "[c]luster " },
            Style::default().fg(if app.clustering_enabled {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            if app.show_heatmap { "[M]heat " } else { "[m]heat " },
            Style::default().fg(if app.show_heatmap {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(
            "| hjkl:pan +/-:zoom q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
