//! Chart views handed to the presentation adapters.
//!
//! A view is plain data: dated line series, horizontal reference lines and
//! marker sets. Adapters decide how to draw them.

use chrono::NaiveDate;

use crate::domain::pipeline::EnrichedSeries;
use crate::domain::signal::{self, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Blue,
    Orange,
    Purple,
    Red,
    Green,
    Gray,
}

impl Color {
    pub fn hex(self) -> &'static str {
        match self {
            Color::Blue => "#2563eb",
            Color::Orange => "#f97316",
            Color::Purple => "#7c3aed",
            Color::Red => "#dc2626",
            Color::Green => "#16a34a",
            Color::Gray => "#6b7280",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    TriangleUp,
    TriangleDown,
}

#[derive(Debug, Clone)]
pub struct LineSeries {
    pub label: String,
    pub color: Color,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

#[derive(Debug, Clone)]
pub struct ReferenceLine {
    pub label: String,
    pub value: f64,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct MarkerSeries {
    pub label: String,
    pub color: Color,
    pub shape: MarkerShape,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone)]
pub struct ChartView {
    /// Stable identifier, used for file names.
    pub slug: &'static str,
    pub title: String,
    pub lines: Vec<LineSeries>,
    pub reference_lines: Vec<ReferenceLine>,
    pub markers: Vec<MarkerSeries>,
}

impl ChartView {
    fn new(slug: &'static str, title: &str) -> Self {
        Self {
            slug,
            title: title.to_string(),
            lines: Vec::new(),
            reference_lines: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Min and max over every defined value, reference line and marker.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let values = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter().filter_map(|(_, v)| *v))
            .chain(self.reference_lines.iter().map(|r| r.value))
            .chain(self.markers.iter().flat_map(|m| m.points.iter().map(|(_, v)| *v)));

        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Shared x axis: the dates of the first line series.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.lines
            .first()
            .map(|l| l.points.iter().map(|(d, _)| *d).collect())
            .unwrap_or_default()
    }
}

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

/// The price chart title is prefixed with `symbol`.
pub fn build_chart_views(series: &EnrichedSeries, symbol: &str) -> Vec<ChartView> {
    vec![
        price_view(series, symbol),
        rsi_view(series),
        signal_view(series),
        cumulative_view(series),
    ]
}

fn line<F>(series: &EnrichedSeries, label: &str, color: Color, f: F) -> LineSeries
where
    F: Fn(&crate::domain::pipeline::EnrichedRow) -> Option<f64>,
{
    LineSeries {
        label: label.to_string(),
        color,
        points: series.rows.iter().map(|r| (r.date, f(r))).collect(),
    }
}

fn price_view(series: &EnrichedSeries, symbol: &str) -> ChartView {
    let title = format!("{} Historical Prices with Moving Averages", symbol);
    let mut view = ChartView::new("prices", &title);
    view.lines.push(line(series, "Close Price", Color::Blue, |r| Some(r.close)));
    view.lines.push(line(
        series,
        &format!("{}-day MA", series.params.ma_short),
        Color::Orange,
        |r| r.ma_short,
    ));
    view.lines.push(line(
        series,
        &format!("{}-day MA", series.params.ma_long),
        Color::Purple,
        |r| r.ma_long,
    ));
    view
}

fn rsi_view(series: &EnrichedSeries) -> ChartView {
    let mut view = ChartView::new("rsi", "Relative Strength Index (RSI)");
    view.lines.push(line(series, "RSI", Color::Blue, |r| r.rsi));
    view.reference_lines.push(ReferenceLine {
        label: "Overbought".into(),
        value: RSI_OVERBOUGHT,
        color: Color::Red,
    });
    view.reference_lines.push(ReferenceLine {
        label: "Oversold".into(),
        value: RSI_OVERSOLD,
        color: Color::Green,
    });
    view
}

fn signal_view(series: &EnrichedSeries) -> ChartView {
    let mut view = ChartView::new("signals", "Buy and Sell Signals");
    view.lines.push(line(series, "Close Price", Color::Blue, |r| Some(r.close)));

    let signals = series.signals();
    let marks = |target: Signal| -> Vec<(NaiveDate, f64)> {
        signal::flips_to(&signals, target)
            .into_iter()
            .map(|i| (series.rows[i].date, series.rows[i].close))
            .collect()
    };

    view.markers.push(MarkerSeries {
        label: "Buy Signal".into(),
        color: Color::Green,
        shape: MarkerShape::TriangleUp,
        points: marks(Signal::Long),
    });
    view.markers.push(MarkerSeries {
        label: "Sell Signal".into(),
        color: Color::Red,
        shape: MarkerShape::TriangleDown,
        points: marks(Signal::Short),
    });
    view
}

fn cumulative_view(series: &EnrichedSeries) -> ChartView {
    let mut view = ChartView::new("cumulative", "Cumulative Returns for Strategy");
    view.lines.push(line(series, "Cumulative Return", Color::Blue, |r| r.cum_ret));
    view.lines.push(line(
        series,
        "Cumulative Strategy Return",
        Color::Orange,
        |r| r.cum_strategy_ret,
    ));
    view
}
