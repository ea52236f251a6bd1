//! # Crossing Report Rendering
//!
//! This module turns a [`DisplayState`] into the text report printed to the terminal:
//!
//! 1. **Header**: title, station and data-source link
//! 2. **Status**: "Can I cross?", trend arrow, and the "soon underwater" banner
//! 3. **Chart**: ASCII plot of the series, oldest on the left, with a dashed reference
//!    line at the underwater threshold and the latest reading marked `X`
//! 4. **List**: every reading with its local time, coloured safe/unsafe
//!
//! Rendering builds a `String` so it can be tested; [`draw_ascii`] prints it.

use crate::{
    classifier::{Thresholds, Trend, ValueColor},
    config::{Config, ConfigError, DisplayConfig, StationConfig, TrendArrow},
    format::{format_date_time, format_time, format_value},
    monitor::{DisplayState, Snapshot},
    ReadingSeries,
};
use chrono_tz::Tz;
use crossterm::style::{Color, Stylize};

const TITLE: &str = "Crammond Island Crossing Checker";

/// Width of the chart's value labels, excluding the axis line
const LABEL_WIDTH: usize = 6;

const WARNING_COLOR: Color = Color::Yellow;

/// Terminal colour for a reading's colour token.
pub fn term_color(color: ValueColor) -> Color {
    match color {
        ValueColor::Safe => Color::Green,
        ValueColor::Unsafe => Color::Red,
    }
}

/// Renders crossing reports with a fixed configuration.
pub struct Renderer {
    thresholds: Thresholds,
    station: StationConfig,
    display: DisplayConfig,
    tz: Tz,
    color: bool,
}

impl Renderer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            thresholds: config.thresholds,
            station: config.station.clone(),
            display: config.display.clone(),
            tz: config.station.tz()?,
            color: true,
        })
    }

    /// Enable or disable ANSI colours.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn render(&self, state: &DisplayState) -> String {
        let mut lines = vec![
            TITLE.to_string(),
            format!("Station: {} ({})", self.station.name, self.station.id),
            format!("Data source: {}", self.station.source_page()),
            String::new(),
        ];

        match state {
            DisplayState::Loading => lines.push("Loading tide data...".to_string()),
            DisplayState::Unavailable { reason } => {
                lines.push(format!("Tide data unavailable: {}", reason));
            }
            DisplayState::Ready(snapshot) => self.render_snapshot(snapshot, &mut lines),
        }

        lines.join("\n")
    }

    fn render_snapshot(&self, snapshot: &Snapshot, lines: &mut Vec<String>) {
        self.render_status(&snapshot.series, lines);
        lines.push(format!(
            "Updated {}",
            format_time(&snapshot.fetched_at, &self.tz)
        ));

        if self.display.show_chart && !snapshot.series.is_empty() {
            lines.push(String::new());
            lines.extend(self.chart_lines(&snapshot.series));
        }

        lines.push(String::new());
        self.render_list(&snapshot.series, lines);
    }

    fn render_status(&self, series: &ReadingSeries, lines: &mut Vec<String>) {
        let readings = series.as_slice();

        match self.thresholds.can_cross(readings) {
            Ok(can_cross) => {
                let (answer, color) = if can_cross {
                    ("Yes", ValueColor::Safe)
                } else {
                    ("No", ValueColor::Unsafe)
                };
                lines.push(format!("Can I cross? {}", self.paint(answer, term_color(color))));
            }
            Err(e) => lines.push(format!("Can I cross? Unknown ({})", e)),
        }

        match self.thresholds.trend(readings) {
            Ok(trend) => lines.push(format!("{} {}", self.arrow(trend), trend.label())),
            Err(e) => lines.push(format!("Trend unknown ({})", e)),
        }

        if self.display.show_warning
            && matches!(self.thresholds.show_soon_underwater_warning(readings), Ok(true))
        {
            lines.push(self.paint(
                "⚠ Crossing will soon be underwater. Get back to mainland!",
                WARNING_COLOR,
            ));
        }
    }

    fn render_list(&self, series: &ReadingSeries, lines: &mut Vec<String>) {
        lines.push("Latest tide values".to_string());
        lines.push(format!(
            "Crossing is possible when the tide value is at or below {}",
            format_value(self.thresholds.underwater_value)
        ));

        for reading in &series.readings {
            let value = format!("{:>LABEL_WIDTH$}", format_value(reading.value));
            let color = term_color(self.thresholds.value_color(reading.value));
            lines.push(format!(
                "  • {}  {}",
                self.paint(&value, color),
                format_date_time(&reading.timestamp, &self.tz)
            ));
        }

        if !series.is_empty() {
            lines.push(format!("We display the latest {} tide values", series.len()));
        }

        // Measurement streams the values link to, each listed once
        let mut measures: Vec<&str> = Vec::new();
        for reading in &series.readings {
            let measure = reading.source_ref.as_str();
            if !measure.is_empty() && !measures.contains(&measure) {
                measures.push(measure);
            }
        }
        for measure in measures {
            lines.push(format!("Measure: {}", measure));
        }
    }

    /// Plot the series oldest to newest, one column per reading.
    fn chart_lines(&self, series: &ReadingSeries) -> Vec<String> {
        let rows = self.display.chart_rows;
        let values: Vec<f64> = series.oldest_first().map(|r| r.value).collect();
        let (Some(oldest), Some(latest)) = (series.readings.last(), series.latest()) else {
            return Vec::new();
        };

        // Always keep the reference line inside the plot
        let threshold = self.thresholds.underwater_value;
        let (min, max) = values
            .iter()
            .fold((threshold, threshold), |(min, max), &v| (min.min(v), max.max(v)));
        let span = if max - min > f64::EPSILON { max - min } else { 1.0 };

        let value_to_row = |value: f64| {
            let normalized = (value - min) / span;
            (((1.0 - normalized) * (rows as f64 - 1.0)).round() as usize).min(rows - 1)
        };

        let mut grid = vec![vec![' '; values.len()]; rows];

        let threshold_row = value_to_row(threshold);
        for cell in grid[threshold_row].iter_mut() {
            *cell = '┄';
        }

        let last_column = values.len() - 1;
        for (column, &value) in values.iter().enumerate() {
            grid[value_to_row(value)][column] = if column == last_column { 'X' } else { '•' };
        }

        let mut lines: Vec<String> = grid
            .into_iter()
            .enumerate()
            .map(|(row, cells)| {
                let label = if row == threshold_row {
                    format_value(threshold)
                } else if row == 0 {
                    format_value(max)
                } else if row == rows - 1 {
                    format_value(min)
                } else {
                    String::new()
                };
                format!(
                    "{:>LABEL_WIDTH$} │{}",
                    label,
                    cells.into_iter().collect::<String>()
                )
            })
            .collect();

        lines.push(format!("{:>LABEL_WIDTH$} └{}", "", "─".repeat(values.len())));

        // Time labels under the first and last columns
        let left = format_time(&oldest.timestamp, &self.tz);
        let right = format_time(&latest.timestamp, &self.tz);
        let time_row = if values.len() > left.len() + right.len() {
            format!("{}{:>width$}", left, right, width = values.len() - left.len())
        } else {
            right
        };
        lines.push(format!("{:>LABEL_WIDTH$}  {}", "", time_row));

        lines
    }

    fn arrow(&self, trend: Trend) -> char {
        let rising = trend == Trend::ComingIn;
        match (self.display.trend_arrow, rising) {
            (TrendArrow::Standard, true) | (TrendArrow::Inverted, false) => '▲',
            (TrendArrow::Standard, false) | (TrendArrow::Inverted, true) => '▼',
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Print the report for `state` to stdout.
pub fn draw_ascii(renderer: &Renderer, state: &DisplayState) {
    println!("{}", renderer.render(state));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reading, ReadingSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn test_series(values: &[f64]) -> ReadingSeries {
        let newest = Utc.with_ymd_and_hms(2023, 3, 1, 9, 5, 0).unwrap();
        ReadingSeries::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &value)| Reading {
                    timestamp: newest - Duration::minutes(15 * i as i64),
                    source_ref: "test".to_string(),
                    value,
                })
                .collect(),
        )
    }

    fn ready(values: &[f64]) -> DisplayState {
        DisplayState::Ready(Snapshot {
            series: test_series(values),
            fetched_at: Utc.with_ymd_and_hms(2023, 3, 1, 9, 7, 0).unwrap(),
        })
    }

    fn plain_renderer(config: &Config) -> Renderer {
        Renderer::new(config).unwrap().with_color(false)
    }

    #[test]
    fn test_loading_and_unavailable() {
        let renderer = plain_renderer(&Config::default());
        let loading = renderer.render(&DisplayState::Loading);
        assert!(loading.starts_with(TITLE));
        assert!(loading.contains("Loading tide data"));

        let unavailable = renderer.render(&DisplayState::Unavailable {
            reason: "upstream returned status 503 Service Unavailable".to_string(),
        });
        assert!(unavailable.contains("Tide data unavailable: upstream returned status 503"));
        assert!(!unavailable.contains("Can I cross?"));
    }

    #[test]
    fn test_warning_banner() {
        let renderer = plain_renderer(&Config::default());
        let report = renderer.render(&ready(&[-0.90, -0.95]));
        assert!(report.contains("Can I cross? Yes"));
        assert!(report.contains("▲ Tide is coming in"));
        assert!(report.contains("Crossing will soon be underwater. Get back to mainland!"));
        assert!(report.contains("Updated 09:07"));
    }

    #[test]
    fn test_no_banner_when_going_out_or_disabled() {
        let renderer = plain_renderer(&Config::default());
        let report = renderer.render(&ready(&[-0.95, -0.90]));
        assert!(report.contains("▼ Tide is going out"));
        assert!(!report.contains("soon be underwater"));

        let mut config = Config::default();
        config.display.show_warning = false;
        let report = plain_renderer(&config).render(&ready(&[-0.90, -0.95]));
        assert!(!report.contains("soon be underwater"));
    }

    #[test]
    fn test_inverted_arrow() {
        let mut config = Config::default();
        config.display.trend_arrow = TrendArrow::Inverted;
        let report = plain_renderer(&config).render(&ready(&[-0.90, -0.95]));
        assert!(report.contains("▼ Tide is coming in"));
    }

    #[test]
    fn test_closed_crossing() {
        let report = plain_renderer(&Config::default()).render(&ready(&[-0.50, -0.60]));
        assert!(report.contains("Can I cross? No"));
        assert!(!report.contains("soon be underwater"));
    }

    #[test]
    fn test_degraded_status() {
        let renderer = plain_renderer(&Config::default());
        let report = renderer.render(&ready(&[]));
        assert!(report.contains("Can I cross? Unknown (no tide readings available)"));
        assert!(!report.contains("We display the latest"));

        let report = renderer.render(&ready(&[-1.2]));
        assert!(report.contains("Can I cross? Yes"));
        assert!(report.contains("Trend unknown (insufficient data: need 2 readings, have 1)"));
    }

    #[test]
    fn test_reading_list() {
        let report = plain_renderer(&Config::default()).render(&ready(&[-0.90, -0.70]));
        assert!(report.contains("  •  -0.90  09:05, 01 March"));
        assert!(report.contains("  •  -0.70  08:50, 01 March"));
        assert!(report.contains("We display the latest 2 tide values"));
    }

    #[test]
    fn test_chart_shape() {
        let config = Config::default();
        let renderer = plain_renderer(&config);
        let lines = renderer.chart_lines(&test_series(&[-0.6, -0.9, -1.2, -1.5]));

        // rows + axis + time labels
        assert_eq!(lines.len(), config.display.chart_rows + 2);
        assert!(lines.iter().any(|l| l.contains('┄')));
        assert!(lines.iter().any(|l| l.contains("-0.80 │")));
        // Newest reading is the rightmost column and the highest value
        assert!(lines[0].ends_with('X'));
        assert!(lines[0].starts_with(" -0.60 │"));
        // Too narrow for both time labels: only the latest is shown
        assert_eq!(lines.last().unwrap().trim_start(), "09:05");
    }

    #[test]
    fn test_chart_time_labels() {
        let renderer = plain_renderer(&Config::default());
        let values: Vec<f64> = (0..20).map(|i| -1.0 + i as f64 * 0.01).collect();
        let lines = renderer.chart_lines(&test_series(&values));
        let time_row = lines.last().unwrap().trim();
        // 20 readings, 15 minutes apart, newest at 09:05
        assert!(time_row.starts_with("04:20"));
        assert!(time_row.ends_with("09:05"));
    }

    #[test]
    fn test_chart_flat_series() {
        let renderer = plain_renderer(&Config::default());
        let lines = renderer.chart_lines(&test_series(&[-0.8, -0.8, -0.8]));
        assert_eq!(lines.len(), 16 + 2);
        assert!(lines.iter().any(|l| l.ends_with('X')));
    }

    #[test]
    fn test_chart_hidden() {
        let mut config = Config::default();
        config.display.show_chart = false;
        let report = plain_renderer(&config).render(&ready(&[-0.90, -0.95]));
        assert!(!report.contains('┄'));
    }

    #[test]
    fn test_colour_output() {
        let renderer = Renderer::new(&Config::default()).unwrap();
        let report = renderer.render(&ready(&[-0.90, -0.70]));
        let safe = " -0.90".with(Color::Green).to_string();
        let unsafe_value = " -0.70".with(Color::Red).to_string();
        assert!(report.contains(&format!("  • {}  09:05, 01 March", safe)));
        assert!(report.contains(&format!("  • {}  08:50, 01 March", unsafe_value)));
        assert!(report.contains(&"Yes".with(Color::Green).to_string()));
    }

    #[test]
    fn test_term_color_mapping() {
        assert_eq!(term_color(ValueColor::Safe), Color::Green);
        assert_eq!(term_color(ValueColor::Unsafe), Color::Red);
    }

    #[test]
    fn test_measure_listed_once() {
        let report = plain_renderer(&Config::default()).render(&ready(&[-0.90, -0.95, -1.0]));
        assert_eq!(report.matches("Measure: test").count(), 1);

        let report = plain_renderer(&Config::default()).render(&ready(&[]));
        assert!(!report.contains("Measure:"));
    }
}
