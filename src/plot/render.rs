// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! SVG rendering of the figure model with `plotters`.

use plotters::chart::{ChartContext, SeriesAnno};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::debug;

use super::colormap::{Colormap, Rgba};
use super::figure::{Axes, ImageGrid, ImagePanel, LineKind, Marker};
use crate::error::PlotError;

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Steps used to draw a colorbar gradient.
const COLORBAR_STEPS: usize = 64;

fn render_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Render(e.to_string())
}

fn to_rgb(c: Rgba) -> RGBColor {
    let (r, g, b) = c.to_rgb8();
    RGBColor(r, g, b)
}

/// Widen a degenerate range so plotters has something to map.
fn padded(lo: f64, hi: f64) -> std::ops::Range<f64> {
    if hi > lo {
        let margin = (hi - lo) * 0.02;
        (lo - margin)..(hi + margin)
    } else {
        (lo - 0.5)..(hi + 0.5)
    }
}

/// `(start, length)` of an image axis; a single coordinate spans one unit.
fn span(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi - lo)
    } else {
        (lo - 0.5, 1.0)
    }
}

/// Draw `axes` as an SVG document of `size` pixels.
pub fn axes_to_svg(axes: &Axes, size: (u32, u32)) -> Result<String, PlotError> {
    let (x_min, x_max, y_min, y_max) = axes
        .data_bounds()
        .ok_or_else(|| PlotError::EmptySeries("axes have no finite data".into()))?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(12).x_label_area_size(40).y_label_area_size(55);
        if let Some(title) = &axes.title {
            builder.caption(title, ("sans-serif", 20).into_font());
        }
        let mut chart = builder
            .build_cartesian_2d(padded(x_min, x_max), padded(y_min, y_max))
            .map_err(render_err)?;

        {
            let mut mesh = chart.configure_mesh();
            if let Some(label) = &axes.x_label {
                mesh.x_desc(label.as_str());
            }
            if let Some(label) = &axes.y_label {
                mesh.y_desc(label.as_str());
            }
            mesh.draw().map_err(render_err)?;
        }

        for (index, line) in axes.lines.iter().enumerate() {
            let color = to_rgb(axes.line_color(index));
            let stroke = color.stroke_width(2);
            let points: Vec<(f64, f64)> = line
                .xs
                .iter()
                .copied()
                .zip(line.ys.iter().copied())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect();

            let anno = match line.style.line {
                LineKind::Solid => chart
                    .draw_series(LineSeries::new(points.clone(), stroke))
                    .map_err(render_err)?,
                LineKind::Dashed => chart
                    .draw_series(DashedLineSeries::new(points.clone(), 10, 6, stroke))
                    .map_err(render_err)?,
                LineKind::Dotted => chart
                    .draw_series(DashedLineSeries::new(points.clone(), 2, 4, stroke))
                    .map_err(render_err)?,
                LineKind::DashDot => chart
                    .draw_series(DashedLineSeries::new(points.clone(), 12, 4, stroke))
                    .map_err(render_err)?,
                LineKind::None => {
                    let marker = line.style.marker.unwrap_or(Marker::Circle);
                    draw_markers(&mut chart, &points, marker, color)?
                }
            };

            if let Some(label) = axes.legend.as_ref().and_then(|l| l.get(index)) {
                anno.label(label.as_str()).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }

            match (line.style.line, line.style.marker) {
                (LineKind::None, _) | (_, None) => {}
                (_, Some(marker)) => {
                    draw_markers(&mut chart, &points, marker, color)?;
                }
            }
        }

        if axes.legend.is_some() {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }

    debug!(lines = axes.lines.len(), bytes = svg.len(), "Rendered axes");
    Ok(svg)
}

fn draw_markers<'a, 'b, DB: DrawingBackend + 'a>(
    chart: &'b mut Chart<'a, DB>,
    points: &[(f64, f64)],
    marker: Marker,
    color: RGBColor,
) -> Result<&'b mut SeriesAnno<'a, DB>, PlotError> {
    let fill = color.filled();
    let anno = match marker {
        Marker::Circle => chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, fill))),
        Marker::Point => chart.draw_series(points.iter().map(|&p| Circle::new(p, 2, fill))),
        Marker::Cross => chart.draw_series(
            points
                .iter()
                .map(|&p| Cross::new(p, 4, color.stroke_width(2))),
        ),
        Marker::Triangle => {
            chart.draw_series(points.iter().map(|&p| TriangleMarker::new(p, 5, fill)))
        }
    };
    anno.map_err(render_err)
}

/// Draw an image grid as an SVG document of `size` pixels.
pub fn image_grid_to_svg(grid: &ImageGrid, size: (u32, u32)) -> Result<String, PlotError> {
    let (rows, columns) = grid.shape();
    if rows == 0 {
        return Err(PlotError::EmptySeries("image grid has no panels".into()));
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let cells = root.split_evenly((rows, columns));
        for (panel, cell) in grid.panels.iter().zip(cells.iter()) {
            draw_panel(cell, panel, grid.colormap)?;
        }

        root.present().map_err(render_err)?;
    }

    debug!(panels = grid.panels.len(), rows, columns, "Rendered image grid");
    Ok(svg)
}

/// Image with a horizontal colorbar above it.
fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &ImagePanel,
    colormap: Colormap,
) -> Result<(), PlotError> {
    let (_, pixels) = area.dim_in_pixel();
    let bar_height = (pixels / 6).max(30);
    let (bar_area, image_area) = area.split_vertically(bar_height);

    let (lo, hi) = panel.value_range;
    let bar_range = padded(lo, hi);
    let mut bar = ChartBuilder::on(&bar_area)
        .margin(6)
        .x_label_area_size(18)
        .build_cartesian_2d(bar_range.clone(), 0.0..1.0)
        .map_err(render_err)?;
    bar.configure_mesh()
        .disable_mesh()
        .y_labels(0)
        .x_labels(5)
        .draw()
        .map_err(render_err)?;
    let step = (bar_range.end - bar_range.start) / COLORBAR_STEPS as f64;
    bar.draw_series((0..COLORBAR_STEPS).map(|k| {
        let x0 = bar_range.start + k as f64 * step;
        let color = colormap.sample(panel.normalize(x0 + step / 2.0));
        Rectangle::new([(x0, 0.0), (x0 + step, 1.0)], to_rgb(color).filled())
    }))
    .map_err(render_err)?;

    let extent = panel.extent;
    let mut builder = ChartBuilder::on(&image_area);
    builder.margin(6).x_label_area_size(25).y_label_area_size(40);
    if let Some(label) = &panel.label {
        builder.caption(label, ("sans-serif", 16).into_font());
    }
    let mut chart = builder
        .build_cartesian_2d(
            padded(extent.x_min, extent.x_max),
            padded(extent.y_min, extent.y_max),
        )
        .map_err(render_err)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .draw()
        .map_err(render_err)?;

    let (nrows, ncols) = panel.data.dim();
    let (left0, width) = span(extent.x_min, extent.x_max);
    let (bottom0, height) = span(extent.y_min, extent.y_max);
    let (dx, dy) = (width / ncols as f64, height / nrows as f64);
    let top0 = bottom0 + height;

    chart
        .draw_series(panel.data.indexed_iter().filter(|(_, v)| v.is_finite()).map(
            |((i, j), &v)| {
                let left = left0 + j as f64 * dx;
                let top = top0 - i as f64 * dy;
                let color = colormap.sample(panel.normalize(v));
                Rectangle::new([(left, top), (left + dx, top - dy)], to_rgb(color).filled())
            },
        ))
        .map_err(render_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{multi_panel_image, plot_common_x, AxisValues};
    use ndarray::array;

    #[test]
    fn test_axes_to_svg_draws_lines_and_legend() {
        let xs = [0.0, 0.5, 1.0];
        let axes = plot_common_x(
            &xs,
            &[vec![0.0, 0.25, 1.0], vec![1.0, 0.5, 0.0]],
            Some(Axes::new().with_title("populations").with_labels("t", "p")),
            Some(&["r-", "bo"][..]),
            Some(&["p0", "p1"][..]),
        )
        .unwrap();
        let svg = axes_to_svg(&axes, (400, 300)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_axes_to_svg_with_dashes_and_flat_series() {
        let xs = [1.0, 2.0];
        let axes = plot_common_x(&xs, &[[3.0, 3.0]], None, Some(&["k--x"][..]), None).unwrap();
        let svg = axes_to_svg(&axes, (200, 150)).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_empty_axes_cannot_render() {
        assert!(matches!(
            axes_to_svg(&Axes::new(), (100, 100)),
            Err(PlotError::EmptySeries(_))
        ));
    }

    #[test]
    fn test_image_grid_to_svg() {
        let xs = AxisValues::from(vec![0.0, 1.0]);
        let ys = AxisValues::from(vec![0.0, 2.0]);
        let zs = vec![array![[0.0, 1.0], [2.0, 3.0]], array![[f64::NAN, 1.0], [1.0, 1.0]]];
        let grid = multi_panel_image(&xs, &ys, &zs, Some(&["a", "b"][..]))
            .unwrap()
            .with_colormap(Colormap::by_name("jet").unwrap());
        let svg = image_grid_to_svg(&grid, (600, 300)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("<rect"));
    }
}
