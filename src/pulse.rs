// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time-dependent amplitude callbacks for driven segments.
//!
//! A driven term contributes f(t, args) · H₁ to the Hamiltonian. `f` is any
//! closure wrapped in a [`Coefficient`]; the [`PulseShape`] catalogue covers
//! the envelopes that experiment description files can name.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Named real parameters handed to an amplitude callback.
pub type PulseArgs = BTreeMap<String, f64>;

/// Amplitude callback `f(t, args)`.
#[derive(Clone)]
pub struct Coefficient(Arc<dyn Fn(f64, &PulseArgs) -> f64 + Send + Sync>);

impl Coefficient {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, &PulseArgs) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Amplitude that ignores both time and args.
    pub fn constant(value: f64) -> Self {
        Self::new(move |_, _| value)
    }

    /// Evaluate at time `t`. Missing args are treated as an empty bag.
    pub fn eval(&self, t: f64, args: Option<&PulseArgs>) -> f64 {
        static EMPTY: PulseArgs = BTreeMap::new();
        (self.0)(t, args.unwrap_or(&EMPTY))
    }
}

impl fmt::Debug for Coefficient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Coefficient(<fn>)")
    }
}

/// Built-in pulse envelopes, parameterised through [`PulseArgs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseShape {
    /// `amplitude`
    Constant,
    /// `amplitude · exp(−(t − center)² / 2σ²)`
    Gaussian,
    /// `amplitude · cos(2π · frequency · t + phase)`
    Cosine,
    /// `amplitude` inside `[t_on, t_off)`, zero elsewhere
    Square,
}

impl PulseShape {
    /// Argument names the shape reads.
    pub fn required_args(&self) -> &'static [&'static str] {
        match self {
            PulseShape::Constant => &["amplitude"],
            PulseShape::Gaussian => &["amplitude", "center", "sigma"],
            PulseShape::Cosine => &["amplitude", "frequency", "phase"],
            PulseShape::Square => &["amplitude", "t_on", "t_off"],
        }
    }

    /// Check that every required argument is present and finite.
    pub fn validate_args(&self, args: &PulseArgs) -> Result<(), ValidationError> {
        for key in self.required_args() {
            match args.get(*key) {
                None => {
                    return Err(ValidationError::Field {
                        field: format!("args.{key}"),
                        message: format!("required by {self:?} pulse"),
                    })
                }
                Some(v) if !v.is_finite() => {
                    return Err(ValidationError::Field {
                        field: format!("args.{key}"),
                        message: format!("must be finite, got {v}"),
                    })
                }
                Some(_) => {}
            }
        }
        if *self == PulseShape::Gaussian && args["sigma"] <= 0.0 {
            return Err(ValidationError::Field {
                field: "args.sigma".into(),
                message: "must be > 0".into(),
            });
        }
        Ok(())
    }

    /// Envelope value at `t`.
    pub fn evaluate(&self, t: f64, args: &PulseArgs) -> f64 {
        let arg = |k: &str| args.get(k).copied().unwrap_or(0.0);
        let amplitude = arg("amplitude");
        match self {
            PulseShape::Constant => amplitude,
            PulseShape::Gaussian => {
                let sigma = arg("sigma");
                let x = t - arg("center");
                amplitude * (-(x * x) / (2.0 * sigma * sigma)).exp()
            }
            PulseShape::Cosine => {
                amplitude * (2.0 * PI * arg("frequency") * t + arg("phase")).cos()
            }
            PulseShape::Square => {
                if t >= arg("t_on") && t < arg("t_off") {
                    amplitude
                } else {
                    0.0
                }
            }
        }
    }
}

impl From<PulseShape> for Coefficient {
    fn from(shape: PulseShape) -> Self {
        Coefficient::new(move |t, args| shape.evaluate(t, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn args(pairs: &[(&str, f64)]) -> PulseArgs {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_gaussian_peak_and_width() {
        let a = args(&[("amplitude", 2.0), ("center", 5.0), ("sigma", 1.0)]);
        let shape = PulseShape::Gaussian;
        assert_relative_eq!(shape.evaluate(5.0, &a), 2.0, epsilon = 1e-12);
        assert_relative_eq!(shape.evaluate(6.0, &a), 2.0 * (-0.5_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_square_window_is_half_open() {
        let a = args(&[("amplitude", 1.0), ("t_on", 1.0), ("t_off", 2.0)]);
        let shape = PulseShape::Square;
        assert_eq!(shape.evaluate(0.5, &a), 0.0);
        assert_eq!(shape.evaluate(1.0, &a), 1.0);
        assert_eq!(shape.evaluate(2.0, &a), 0.0);
    }

    #[test]
    fn test_cosine_phase() {
        let a = args(&[("amplitude", 1.0), ("frequency", 0.25), ("phase", 0.0)]);
        assert_relative_eq!(PulseShape::Cosine.evaluate(1.0, &a), 0.0, epsilon = 1e-12);
        assert_relative_eq!(PulseShape::Cosine.evaluate(2.0, &a), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validate_args_missing_key() {
        let a = args(&[("amplitude", 1.0), ("center", 0.0)]);
        let err = PulseShape::Gaussian.validate_args(&a).unwrap_err();
        assert!(err.to_string().contains("args.sigma"));
    }

    #[test]
    fn test_validate_args_rejects_zero_sigma() {
        let a = args(&[("amplitude", 1.0), ("center", 0.0), ("sigma", 0.0)]);
        assert!(PulseShape::Gaussian.validate_args(&a).is_err());
    }

    #[test]
    fn test_coefficient_from_shape_and_closure() {
        let a = args(&[("amplitude", 3.0)]);
        let coeff: Coefficient = PulseShape::Constant.into();
        assert_eq!(coeff.eval(10.0, Some(&a)), 3.0);

        let ramp = Coefficient::new(|t, args| t * args.get("slope").copied().unwrap_or(1.0));
        assert_eq!(ramp.eval(2.0, None), 2.0);
        assert_eq!(ramp.eval(2.0, Some(&args(&[("slope", 4.0)]))), 8.0);
    }

    #[test]
    fn test_shape_serde_names() {
        let shape: PulseShape = serde_yaml::from_str("gaussian").unwrap();
        assert_eq!(shape, PulseShape::Gaussian);
    }
}
