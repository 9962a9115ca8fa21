// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Backend-neutral figure model and the plotting helpers.

use std::str::FromStr;

use ndarray::Array2;

use super::colormap::{Colormap, Rgba};
use crate::error::PlotError;

/// Default number of image panels per grid row.
pub const DEFAULT_PANEL_COLUMNS: usize = 3;

/// matplotlib's default color cycle.
const COLOR_CYCLE: [u32; 10] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
    0x17becf,
];

/// Color for the `index`-th line without an explicit color.
pub fn cycle_color(index: usize) -> Rgba {
    Rgba::from_hex(COLOR_CYCLE[index % COLOR_CYCLE.len()])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
    DashDot,
    /// Markers only.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Point,
    Cross,
    Triangle,
}

/// Line appearance parsed from a matplotlib-style format string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Option<Rgba>,
    pub line: LineKind,
    pub marker: Option<Marker>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: None,
            line: LineKind::Solid,
            marker: None,
        }
    }
}

impl LineStyle {
    /// Parse a format string such as `"r--"`, `"bo"` or `"k:"`.
    ///
    /// A marker without a line style draws markers only.
    pub fn parse(fmt: &str) -> Result<Self, PlotError> {
        let invalid = || PlotError::InvalidFormat(fmt.to_string());
        let mut color = None;
        let mut line = None;
        let mut marker = None;

        let mut rest = fmt.trim();
        while !rest.is_empty() {
            let (kind, len) = if rest.starts_with("--") {
                (Some(LineKind::Dashed), 2)
            } else if rest.starts_with("-.") {
                (Some(LineKind::DashDot), 2)
            } else if rest.starts_with('-') {
                (Some(LineKind::Solid), 1)
            } else if rest.starts_with(':') {
                (Some(LineKind::Dotted), 1)
            } else {
                (None, 0)
            };

            if let Some(kind) = kind {
                if line.replace(kind).is_some() {
                    return Err(invalid());
                }
                rest = &rest[len..];
                continue;
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };
            if let Some(c) = color_code(ch) {
                if color.replace(c).is_some() {
                    return Err(invalid());
                }
            } else if let Some(m) = marker_code(ch) {
                if marker.replace(m).is_some() {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
            rest = &rest[ch.len_utf8()..];
        }

        let line = line.unwrap_or(if marker.is_some() {
            LineKind::None
        } else {
            LineKind::Solid
        });
        Ok(Self {
            color,
            line,
            marker,
        })
    }
}

impl FromStr for LineStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn color_code(ch: char) -> Option<Rgba> {
    let c = match ch {
        'b' => Rgba::rgb(0.0, 0.0, 1.0),
        'g' => Rgba::rgb(0.0, 0.5, 0.0),
        'r' => Rgba::rgb(1.0, 0.0, 0.0),
        'c' => Rgba::rgb(0.0, 0.75, 0.75),
        'm' => Rgba::rgb(0.75, 0.0, 0.75),
        'y' => Rgba::rgb(0.75, 0.75, 0.0),
        'k' => Rgba::rgb(0.0, 0.0, 0.0),
        'w' => Rgba::rgb(1.0, 1.0, 1.0),
        _ => return None,
    };
    Some(c)
}

fn marker_code(ch: char) -> Option<Marker> {
    match ch {
        'o' => Some(Marker::Circle),
        '.' => Some(Marker::Point),
        'x' | '+' => Some(Marker::Cross),
        '^' => Some(Marker::Triangle),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub style: LineStyle,
}

/// A single set of axes holding line plots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Axes {
    pub lines: Vec<Line>,
    /// Labels for the first lines, in drawing order.
    pub legend: Option<Vec<String>>,
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl Axes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }

    /// Add one line. `xs` and `ys` must have equal, non-zero length.
    pub fn plot(&mut self, xs: &[f64], ys: &[f64], style: LineStyle) -> Result<(), PlotError> {
        if xs.is_empty() {
            return Err(PlotError::EmptySeries("x values".into()));
        }
        if ys.len() != xs.len() {
            return Err(PlotError::LengthMismatch {
                what: format!("series {}", self.lines.len()),
                expected: xs.len(),
                actual: ys.len(),
            });
        }
        self.lines.push(Line {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            style,
        });
        Ok(())
    }

    /// `(x_min, x_max, y_min, y_max)` over finite data, if any.
    pub fn data_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let xs = finite_range(self.lines.iter().flat_map(|l| l.xs.iter().copied()))?;
        let ys = finite_range(self.lines.iter().flat_map(|l| l.ys.iter().copied()))?;
        Some((xs.0, xs.1, ys.0, ys.1))
    }

    /// Color a line will be drawn with.
    pub fn line_color(&self, index: usize) -> Rgba {
        self.lines
            .get(index)
            .and_then(|l| l.style.color)
            .unwrap_or_else(|| cycle_color(index))
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Plot every series against the shared `xs`.
///
/// Lines are added to `axes` when given, otherwise to fresh axes, which are
/// returned. `styles` holds one format string per series; `legend` labels the
/// lines of the axes in order.
pub fn plot_common_x<S: AsRef<[f64]>>(
    xs: &[f64],
    series: &[S],
    axes: Option<Axes>,
    styles: Option<&[&str]>,
    legend: Option<&[&str]>,
) -> Result<Axes, PlotError> {
    let mut axes = axes.unwrap_or_default();

    for (i, ys) in series.iter().enumerate() {
        let style = match styles {
            Some(styles) => LineStyle::parse(styles.get(i).ok_or(PlotError::MissingStyle(i))?)?,
            None => LineStyle::default(),
        };
        axes.plot(xs, ys.as_ref(), style)?;
    }

    if let Some(labels) = legend {
        axes.legend = Some(labels.iter().map(|s| s.to_string()).collect());
    }
    Ok(axes)
}

/// Axis coordinates shared by all panels or given per panel.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValues {
    Shared(Vec<f64>),
    PerPanel(Vec<Vec<f64>>),
}

impl AxisValues {
    fn for_panel(&self, index: usize) -> Option<&[f64]> {
        match self {
            AxisValues::Shared(v) => Some(v),
            AxisValues::PerPanel(v) => v.get(index).map(Vec::as_slice),
        }
    }
}

impl From<Vec<f64>> for AxisValues {
    fn from(v: Vec<f64>) -> Self {
        AxisValues::Shared(v)
    }
}

impl From<Vec<Vec<f64>>> for AxisValues {
    fn from(v: Vec<Vec<f64>>) -> Self {
        AxisValues::PerPanel(v)
    }
}

/// Data rectangle an image is stretched over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePanel {
    /// Row 0 is drawn at the top.
    pub data: Array2<f64>,
    pub extent: Extent,
    pub label: Option<String>,
    /// Colorbar range, from the finite data.
    pub value_range: (f64, f64),
}

impl ImagePanel {
    /// Position of `value` within the colorbar range, in `[0, 1]`.
    pub fn normalize(&self, value: f64) -> f64 {
        let (lo, hi) = self.value_range;
        if hi > lo {
            ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Panels laid out row-major, `columns` per row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGrid {
    pub panels: Vec<ImagePanel>,
    pub columns: usize,
    pub colormap: Colormap,
}

impl ImageGrid {
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn with_colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    /// `(rows, columns)` actually used for the panels.
    pub fn shape(&self) -> (usize, usize) {
        let n = self.panels.len();
        if n == 0 {
            return (0, 0);
        }
        let columns = self.columns.clamp(1, n);
        ((n + columns - 1) / columns, columns)
    }
}

/// One image panel per matrix in `zs`, each with its own colorbar.
///
/// Panel extents are `(min x, max x, min y, max y)` of that panel's axis
/// values. `labels` become panel titles.
pub fn multi_panel_image(
    xs: &AxisValues,
    ys: &AxisValues,
    zs: &[Array2<f64>],
    labels: Option<&[&str]>,
) -> Result<ImageGrid, PlotError> {
    let mut panels = Vec::with_capacity(zs.len());

    for (i, z) in zs.iter().enumerate() {
        if z.is_empty() {
            return Err(PlotError::EmptySeries(format!("image {}", i)));
        }
        let (x_min, x_max) = panel_range(xs, "x", i, zs.len())?;
        let (y_min, y_max) = panel_range(ys, "y", i, zs.len())?;
        let value_range = finite_range(z.iter().copied()).unwrap_or((0.0, 1.0));

        panels.push(ImagePanel {
            data: z.clone(),
            extent: Extent {
                x_min,
                x_max,
                y_min,
                y_max,
            },
            label: labels.and_then(|l| l.get(i)).map(|s| s.to_string()),
            value_range,
        });
    }

    Ok(ImageGrid {
        panels,
        columns: DEFAULT_PANEL_COLUMNS,
        colormap: Colormap::default(),
    })
}

fn panel_range(
    values: &AxisValues,
    axis: &str,
    index: usize,
    panels: usize,
) -> Result<(f64, f64), PlotError> {
    let values = values
        .for_panel(index)
        .ok_or_else(|| PlotError::LengthMismatch {
            what: format!("{} axis values per panel", axis),
            expected: panels,
            actual: index,
        })?;
    finite_range(values.iter().copied())
        .ok_or_else(|| PlotError::EmptySeries(format!("{} values of panel {}", axis, index)))
}

/// `(xs[0], ys[0], xs[last], ys[last])`, the extent matching sampled data.
pub fn plot_extent<T: Copy>(xs: &[T], ys: &[T]) -> Result<(T, T, T, T), PlotError> {
    match (xs.first(), xs.last(), ys.first(), ys.last()) {
        (Some(&x0), Some(&x1), Some(&y0), Some(&y1)) => Ok((x0, y0, x1, y1)),
        _ if xs.is_empty() => Err(PlotError::EmptySeries("x values".into())),
        _ => Err(PlotError::EmptySeries("y values".into())),
    }
}
