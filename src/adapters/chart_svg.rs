//! SVG rendering of chart views.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::domain::chart::{ChartView, MarkerShape};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 420.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 40.0;
const PAD_BOTTOM: f64 = 40.0;
const MARKER_SIZE: f64 = 6.0;

struct Frame {
    dates: Vec<NaiveDate>,
    min: f64,
    max: f64,
}

impl Frame {
    fn plot_width(&self) -> f64 {
        WIDTH - PAD_LEFT - PAD_RIGHT
    }

    fn plot_height(&self) -> f64 {
        HEIGHT - PAD_TOP - PAD_BOTTOM
    }

    fn x(&self, idx: usize) -> f64 {
        if self.dates.len() > 1 {
            PAD_LEFT + idx as f64 * self.plot_width() / (self.dates.len() - 1) as f64
        } else {
            PAD_LEFT + self.plot_width() / 2.0
        }
    }

    fn y(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range > 0.0 {
            HEIGHT - PAD_BOTTOM - (value - self.min) / range * self.plot_height()
        } else {
            PAD_TOP + self.plot_height() / 2.0
        }
    }

    fn x_of_date(&self, date: NaiveDate) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.x(i))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Split a series into runs of consecutive defined values.
fn segments(frame: &Frame, points: &[(NaiveDate, Option<f64>)]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();

    for (i, (_, value)) in points.iter().enumerate() {
        match value {
            Some(v) => current.push((frame.x(i), frame.y(*v))),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn triangle(x: f64, y: f64, shape: MarkerShape) -> String {
    let s = MARKER_SIZE;
    match shape {
        MarkerShape::TriangleUp => format!(
            "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
            x,
            y - s,
            x - s,
            y + s,
            x + s,
            y + s
        ),
        MarkerShape::TriangleDown => format!(
            "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
            x,
            y + s,
            x - s,
            y - s,
            x + s,
            y - s
        ),
    }
}

pub fn render_svg(view: &ChartView) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" width="{w:.0}" height="{h:.0}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r#"<rect width="100%" height="100%" fill="white"/><text x="{:.1}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        escape(&view.title)
    );

    let dates = view.dates();
    let Some((min, max)) = view.value_range().filter(|_| !dates.is_empty()) else {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" fill="{}">No data available.</text></svg>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0,
            "#6b7280"
        );
        return svg;
    };

    let frame = Frame { dates, min, max };

    // axes
    let _ = write!(
        svg,
        r##"<line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="#374151"/><line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#374151"/>"##,
        l = PAD_LEFT,
        t = PAD_TOP,
        b = HEIGHT - PAD_BOTTOM,
        r = WIDTH - PAD_RIGHT
    );
    for value in [min, (min + max) / 2.0, max] {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PAD_LEFT - 6.0,
            frame.y(value) + 4.0,
            value
        );
    }
    if let (Some(first), Some(last)) = (frame.dates.first(), frame.dates.last()) {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="{:.1}">{}</text><text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            PAD_LEFT,
            HEIGHT - PAD_BOTTOM + 18.0,
            first,
            WIDTH - PAD_RIGHT,
            HEIGHT - PAD_BOTTOM + 18.0,
            last
        );
    }

    for reference in &view.reference_lines {
        let y = frame.y(reference.value);
        let _ = write!(
            svg,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-dasharray="6,4"/>"#,
            PAD_LEFT,
            WIDTH - PAD_RIGHT,
            reference.color.hex(),
        );
    }

    for line in &view.lines {
        for segment in segments(&frame, &line.points) {
            let points: Vec<String> = segment
                .iter()
                .map(|(x, y)| format!("{:.1},{:.1}", x, y))
                .collect();
            let _ = write!(
                svg,
                r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
                line.color.hex(),
                points.join(" ")
            );
        }
    }

    for markers in &view.markers {
        for (date, value) in &markers.points {
            if let Some(x) = frame.x_of_date(*date) {
                let _ = write!(
                    svg,
                    r#"<polygon fill="{}" points="{}"/>"#,
                    markers.color.hex(),
                    triangle(x, frame.y(*value), markers.shape)
                );
            }
        }
    }

    // legend, one entry per line, reference line and marker set
    let entries = view
        .lines
        .iter()
        .map(|l| (l.label.as_str(), l.color.hex(), false))
        .chain(
            view.reference_lines
                .iter()
                .map(|r| (r.label.as_str(), r.color.hex(), true)),
        )
        .chain(
            view.markers
                .iter()
                .map(|m| (m.label.as_str(), m.color.hex(), false)),
        );
    for (i, (label, color, dashed)) in entries.enumerate() {
        let y = PAD_TOP + 14.0 + i as f64 * 16.0;
        let x = PAD_LEFT + 12.0;
        let dash = if dashed { r#" stroke-dasharray="4,3""# } else { "" };
        let _ = write!(
            svg,
            r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{}" stroke-width="2"{}/><text x="{:.1}" y="{:.1}">{}</text>"#,
            x,
            x + 18.0,
            color,
            dash,
            x + 24.0,
            y + 4.0,
            escape(label)
        );
    }

    svg.push_str("</svg>");
    svg
}
