// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Plotting helpers.
//!
//! The helpers build a small figure model ([`Axes`], [`ImageGrid`]) that
//! [`render`] turns into SVG.

pub mod colormap;
pub mod figure;
pub mod render;

pub use colormap::{sample_colormap, Colormap, Rgba};
pub use figure::{
    multi_panel_image, plot_common_x, plot_extent, AxisValues, Axes, Extent, ImageGrid,
    ImagePanel, Line, LineKind, LineStyle, Marker,
};
