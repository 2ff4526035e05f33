//! Inline SVG line charts.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::utils::escape_xml;

const PALETTE: &[&str] = &[
    "#1b4965", "#ca6702", "#0a9396", "#9b2226", "#6a4c93", "#5fa8d3",
    "#bb3e03", "#005f73",
];

const MARGIN_LEFT: f64 = 64.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 56.0;
const TICKS: usize = 5;

/// A named series of `(month, value)` points.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Line {
    pub(crate) label: String,
    pub(crate) points: Vec<(String, f64)>,
}

impl Line {
    pub(crate) fn new<S: Into<String>>(
        label: S,
        points: Vec<(String, f64)>,
    ) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LineChart {
    pub(crate) title: String,
    pub(crate) y_label: String,
    pub(crate) lines: Vec<Line>,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

/// Formats an axis value compactly (`1.2M`, `35k`, `12`).
pub(crate) fn compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.0}k", value / 1e3)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

impl LineChart {
    pub(crate) fn new<S: Into<String>, T: Into<String>>(
        title: S,
        y_label: T,
        lines: Vec<Line>,
    ) -> Self {
        Self {
            title: title.into(),
            y_label: y_label.into(),
            lines,
            width: 800.0,
            height: 360.0,
        }
    }

    /// Returns the sorted union of all months.
    fn months(&self) -> Vec<&str> {
        self.lines
            .iter()
            .flat_map(|line| line.points.iter().map(|(m, _)| m.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn y_max(&self) -> f64 {
        let max = self
            .lines
            .iter()
            .flat_map(|line| line.points.iter().map(|(_, v)| *v))
            .fold(0.0, f64::max);

        if max > 0.0 {
            max
        } else {
            1.0
        }
    }

    /// Renders the chart. Every data point carries a title with its
    /// series, month and value, which browsers show on hover.
    pub(crate) fn to_svg(&self) -> String {
        let months = self.months();
        let y_max = self.y_max();

        let plot_w = self.width - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = self.height - MARGIN_TOP - MARGIN_BOTTOM;
        let step = if months.len() > 1 {
            plot_w / (months.len() - 1) as f64
        } else {
            0.0
        };

        let x = |month: &str| -> f64 {
            let idx = months.iter().position(|m| *m == month).unwrap_or(0);
            MARGIN_LEFT + idx as f64 * step
        };
        let y = |value: f64| -> f64 {
            MARGIN_TOP + plot_h - (value / y_max) * plot_h
        };

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"chart\" \
                viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" \
                font-family=\"Helvetica, Arial, sans-serif\" \
                font-size=\"11\">",
            w = self.width,
            h = self.height,
        );

        let _ = write!(
            svg,
            "<text x=\"{MARGIN_LEFT}\" y=\"20\" font-size=\"15\" \
                font-weight=\"bold\">{}</text>",
            escape_xml(&self.title)
        );

        // grid and y axis labels
        for tick in 0..=TICKS {
            let value = y_max * tick as f64 / TICKS as f64;
            let ty = y(value);
            let _ = write!(
                svg,
                "<line x1=\"{MARGIN_LEFT}\" y1=\"{ty:.1}\" x2=\"{:.1}\" \
                    y2=\"{ty:.1}\" stroke=\"#dddddd\"/>\
                    <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\">{}</text>",
                MARGIN_LEFT + plot_w,
                MARGIN_LEFT - 6.0,
                ty + 4.0,
                compact(value),
            );
        }

        let _ = write!(
            svg,
            "<text transform=\"translate(14 {:.1}) rotate(-90)\" \
                text-anchor=\"middle\">{}</text>",
            MARGIN_TOP + plot_h / 2.0,
            escape_xml(&self.y_label),
        );

        // x axis labels, thinned out to at most twelve
        let every = months.len().div_ceil(12).max(1);
        for (idx, month) in months.iter().enumerate() {
            if idx % every != 0 {
                continue;
            }

            let label = month.get(0..7).unwrap_or(month);
            let _ = write!(
                svg,
                "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
                x(month),
                MARGIN_TOP + plot_h + 16.0,
                escape_xml(label),
            );
        }

        for (idx, line) in self.lines.iter().enumerate() {
            let color = PALETTE[idx % PALETTE.len()];
            let label = escape_xml(&line.label);

            let path = line
                .points
                .iter()
                .map(|(month, value)| format!("{:.1},{:.1}", x(month), y(*value)))
                .collect::<Vec<_>>()
                .join(" ");

            let _ = write!(
                svg,
                "<g class=\"series\"><polyline fill=\"none\" \
                    stroke=\"{color}\" stroke-width=\"2\" points=\"{path}\"/>",
            );

            for (month, value) in line.points.iter() {
                let _ = write!(
                    svg,
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3.5\" \
                        fill=\"{color}\"><title>{label} {}: {}</title>\
                        </circle>",
                    x(month),
                    y(*value),
                    escape_xml(month.get(0..7).unwrap_or(month)),
                    compact(*value),
                );
            }

            // legend
            let lx = MARGIN_LEFT + (idx as f64) * 150.0;
            let ly = self.height - 12.0;
            let _ = write!(
                svg,
                "<rect x=\"{lx:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" \
                    fill=\"{color}\"/><text x=\"{:.1}\" y=\"{ly:.1}\">{label}</text></g>",
                ly - 10.0,
                lx + 16.0,
            );
        }

        svg.push_str("</svg>");
        svg
    }
}
