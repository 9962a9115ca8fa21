// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Named colormaps.
//!
//! `gray`, `hot`, `jet` and `hsv` use matplotlib's piecewise-linear segment
//! data. `viridis` and `coolwarm` interpolate evenly spaced anchor colors.
//! A `_r` suffix reverses any map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::linalg::linspace;

/// Color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Opaque color from `0xRRGGBB`.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f64 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let q = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

type Anchors = &'static [(f64, f64)];

enum Table {
    /// Per-channel `(x, value)` anchors.
    Segmented {
        red: Anchors,
        green: Anchors,
        blue: Anchors,
    },
    /// Colors evenly spaced over `[0, 1]`.
    Listed(&'static [[f64; 3]]),
}

const GRAY: Table = Table::Segmented {
    red: &[(0.0, 0.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (1.0, 1.0)],
};

const HOT: Table = Table::Segmented {
    red: &[(0.0, 0.0416), (0.365079, 1.0), (1.0, 1.0)],
    green: &[(0.0, 0.0), (0.365079, 0.0), (0.746032, 1.0), (1.0, 1.0)],
    blue: &[(0.0, 0.0), (0.746032, 0.0), (1.0, 1.0)],
};

const JET: Table = Table::Segmented {
    red: &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
    green: &[
        (0.0, 0.0),
        (0.125, 0.0),
        (0.375, 1.0),
        (0.64, 1.0),
        (0.91, 0.0),
        (1.0, 0.0),
    ],
    blue: &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
};

const HSV: Table = Table::Segmented {
    red: &[
        (0.0, 1.0),
        (0.158730, 1.0),
        (0.174603, 0.96875),
        (0.333333, 0.03125),
        (0.349206, 0.0),
        (0.666667, 0.0),
        (0.682540, 0.03125),
        (0.841270, 0.96875),
        (0.857143, 1.0),
        (1.0, 1.0),
    ],
    green: &[
        (0.0, 0.0),
        (0.158730, 0.9375),
        (0.174603, 1.0),
        (0.507937, 1.0),
        (0.666667, 0.0625),
        (0.682540, 0.0),
        (1.0, 0.0),
    ],
    blue: &[
        (0.0, 0.0),
        (0.333333, 0.0),
        (0.349206, 0.0625),
        (0.507937, 1.0),
        (0.841270, 1.0),
        (0.857143, 0.9375),
        (1.0, 0.09375),
    ],
};

/// Eleven evenly spaced entries of matplotlib's 256-entry viridis table.
/// Colors between them are interpolated, so they approximate the full table.
const VIRIDIS: Table = Table::Listed(&[
    [0.267004, 0.004874, 0.329415],
    [0.282623, 0.140926, 0.457517],
    [0.253935, 0.265254, 0.529983],
    [0.206756, 0.371758, 0.553117],
    [0.163625, 0.471133, 0.558148],
    [0.127568, 0.566949, 0.550556],
    [0.134692, 0.658636, 0.517649],
    [0.266941, 0.748751, 0.440573],
    [0.477504, 0.821444, 0.318195],
    [0.741388, 0.873449, 0.149561],
    [0.993248, 0.906157, 0.143936],
]);

/// Five anchors of the diverging coolwarm map, interpolated linearly.
const COOLWARM: Table = Table::Listed(&[
    [0.229806, 0.298718, 0.753683],
    [0.552011, 0.689870, 0.995352],
    [0.865003, 0.865003, 0.865003],
    [0.957717, 0.602739, 0.481127],
    [0.705673, 0.015556, 0.150233],
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Viridis,
    Gray,
    Hot,
    Jet,
    Hsv,
    Coolwarm,
}

impl Kind {
    const ALL: [(Kind, &'static str); 6] = [
        (Kind::Viridis, "viridis"),
        (Kind::Gray, "gray"),
        (Kind::Hot, "hot"),
        (Kind::Jet, "jet"),
        (Kind::Hsv, "hsv"),
        (Kind::Coolwarm, "coolwarm"),
    ];

    fn table(self) -> &'static Table {
        match self {
            Kind::Viridis => &VIRIDIS,
            Kind::Gray => &GRAY,
            Kind::Hot => &HOT,
            Kind::Jet => &JET,
            Kind::Hsv => &HSV,
            Kind::Coolwarm => &COOLWARM,
        }
    }

    fn name(self) -> &'static str {
        Self::ALL
            .iter()
            .find(|(k, _)| *k == self)
            .map_or("viridis", |(_, n)| *n)
    }
}

/// A named mapping from `[0, 1]` to colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colormap {
    kind: Kind,
    reversed: bool,
}

impl Default for Colormap {
    fn default() -> Self {
        Self {
            kind: Kind::Viridis,
            reversed: false,
        }
    }
}

impl Colormap {
    /// Look up a colormap by name, e.g. `"jet"` or `"gray_r"`.
    pub fn by_name(name: &str) -> Result<Self, PlotError> {
        let trimmed = name.trim();
        let (base, reversed) = match trimmed.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (trimmed, false),
        };
        let base = match base {
            "grey" => "gray",
            other => other,
        };
        Kind::ALL
            .iter()
            .find(|(_, n)| *n == base)
            .map(|(kind, _)| Self {
                kind: *kind,
                reversed,
            })
            .ok_or_else(|| PlotError::UnknownColormap(name.to_string()))
    }

    /// Names accepted by [`Colormap::by_name`], without `_r` variants.
    pub fn names() -> Vec<&'static str> {
        Kind::ALL.iter().map(|(_, n)| *n).collect()
    }

    pub fn name(&self) -> String {
        if self.reversed {
            format!("{}_r", self.kind.name())
        } else {
            self.kind.name().to_string()
        }
    }

    pub fn reversed(self) -> Self {
        Self {
            reversed: !self.reversed,
            ..self
        }
    }

    /// Color at `x`, clamped to `[0, 1]`. NaN maps to transparent.
    pub fn sample(&self, x: f64) -> Rgba {
        if x.is_nan() {
            return Rgba::new(0.0, 0.0, 0.0, 0.0);
        }
        let x = x.clamp(0.0, 1.0);
        let x = if self.reversed { 1.0 - x } else { x };
        match self.kind.table() {
            Table::Segmented { red, green, blue } => {
                Rgba::rgb(interpolate(red, x), interpolate(green, x), interpolate(blue, x))
            }
            Table::Listed(colors) => listed(colors, x),
        }
    }
}

impl FromStr for Colormap {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::by_name(s)
    }
}

fn interpolate(anchors: Anchors, x: f64) -> f64 {
    for pair in anchors.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            if x1 <= x0 {
                return y1;
            }
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    anchors.last().map_or(0.0, |&(_, y)| y)
}

fn listed(colors: &[[f64; 3]], x: f64) -> Rgba {
    match colors.len() {
        0 => Rgba::rgb(0.0, 0.0, 0.0),
        1 => Rgba::rgb(colors[0][0], colors[0][1], colors[0][2]),
        n => {
            let pos = x * (n - 1) as f64;
            let i = (pos.floor() as usize).min(n - 2);
            let frac = pos - i as f64;
            let (a, b) = (colors[i], colors[i + 1]);
            let mix = |k: usize| a[k] + (b[k] - a[k]) * frac;
            Rgba::rgb(mix(0), mix(1), mix(2))
        }
    }
}

/// `count` colors from `name`, evenly spaced over `[0, 1]`.
///
/// A single sample is the color at 0; zero samples give an empty list.
pub fn sample_colormap(name: &str, count: usize) -> Result<Vec<Rgba>, PlotError> {
    let cmap = Colormap::by_name(name)?;
    Ok(linspace(0.0, 1.0, count)
        .into_iter()
        .map(|x| cmap.sample(x))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gray_endpoints_and_midpoint() {
        let colors = sample_colormap("gray", 5).unwrap();
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], Rgba::rgb(0.0, 0.0, 0.0));
        assert_eq!(colors[4], Rgba::rgb(1.0, 1.0, 1.0));
        assert_relative_eq!(colors[2].r, 0.5);
    }

    #[test]
    fn test_single_sample_is_low_end() {
        let one = sample_colormap("viridis", 1).unwrap();
        assert_eq!(one, vec![Colormap::by_name("viridis").unwrap().sample(0.0)]);
        assert!(sample_colormap("viridis", 0).unwrap().is_empty());
    }

    #[test]
    fn test_reversed_map() {
        let forward = sample_colormap("hot", 7).unwrap();
        let mut backward = sample_colormap("hot_r", 7).unwrap();
        backward.reverse();
        for (a, b) in forward.iter().zip(&backward) {
            assert_relative_eq!(a.r, b.r, epsilon = 1e-12);
            assert_relative_eq!(a.g, b.g, epsilon = 1e-12);
        }
        assert_eq!(Colormap::by_name("hot_r").unwrap().name(), "hot_r");
    }

    #[test]
    fn test_jet_anchors() {
        let jet = Colormap::by_name("jet").unwrap();
        assert_relative_eq!(jet.sample(0.0).b, 0.5);
        assert_relative_eq!(jet.sample(1.0).r, 0.5);
        assert_relative_eq!(jet.sample(0.5).g, 1.0);
    }

    #[test]
    fn test_unknown_colormap() {
        assert!(matches!(
            sample_colormap("plasma", 3),
            Err(PlotError::UnknownColormap(_))
        ));
    }

    #[test]
    fn test_hex_and_display() {
        let c = Rgba::from_hex(0x1f77b4);
        assert_eq!(c.to_rgb8(), (0x1f, 0x77, 0xb4));
        assert_eq!(c.to_string(), "#1f77b4");
    }

    #[test]
    fn test_nan_is_transparent() {
        assert_eq!(Colormap::default().sample(f64::NAN).a, 0.0);
    }
}
