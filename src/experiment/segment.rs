// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Time segments of an experiment.
//!
//! A [`Segment`] pairs an optional driven term with a [`TimeWindow`]. The
//! window is materialized into uniformly spaced sample times only when the
//! experiment runs.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::linalg::linspace;
use crate::pulse::{Coefficient, PulseArgs, PulseShape};
use crate::quantum::Operator;
use crate::solver::{DriveTerm, Hamiltonian};

/// Sampling schedule: `num_points` uniform samples over `[start, stop]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub stop: f64,
    pub num_points: usize,
}

impl TimeWindow {
    pub fn new(start: f64, stop: f64, num_points: usize) -> Self {
        Self {
            start,
            stop,
            num_points,
        }
    }

    /// Uniform sample times, first = `start`, last = `stop`.
    pub fn sample_times(&self) -> Vec<f64> {
        linspace(self.start, self.stop, self.num_points)
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }

    /// Window must be finite, non-decreasing, with at least one point.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(ValidationError::Field {
                field: "window".into(),
                message: format!(
                    "bounds must be finite, got [{}, {}]",
                    self.start, self.stop
                ),
            });
        }
        if self.stop < self.start {
            return Err(ValidationError::Field {
                field: "window.stop".into(),
                message: format!("stop {} is before start {}", self.stop, self.start),
            });
        }
        if self.num_points == 0 {
            return Err(ValidationError::Field {
                field: "window.num_points".into(),
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// Driven term f(t, args) · H₁ active during one segment.
#[derive(Debug, Clone)]
pub struct Perturbation {
    pub operator: Operator,
    pub coefficient: Coefficient,
    pub args: PulseArgs,
}

impl Perturbation {
    pub fn new(operator: Operator, coefficient: Coefficient, args: PulseArgs) -> Self {
        Self {
            operator,
            coefficient,
            args,
        }
    }

    /// Perturbation with a built-in envelope; `args` must carry its parameters.
    pub fn from_shape(
        operator: Operator,
        shape: PulseShape,
        args: PulseArgs,
    ) -> Result<Self, ValidationError> {
        shape.validate_args(&args)?;
        Ok(Self::new(operator, shape.into(), args))
    }
}

/// One sub-interval of the experiment.
#[derive(Debug, Clone)]
pub struct Segment {
    pub perturbation: Option<Perturbation>,
    pub window: TimeWindow,
}

impl Segment {
    pub fn new(
        perturbation: Option<Perturbation>,
        start: f64,
        stop: f64,
        num_points: usize,
    ) -> Self {
        Self {
            perturbation,
            window: TimeWindow::new(start, stop, num_points),
        }
    }

    /// Segment under the generator alone.
    pub fn free(start: f64, stop: f64, num_points: usize) -> Self {
        Self::new(None, start, stop, num_points)
    }

    /// Segment with a driven term on top of the generator.
    pub fn driven(perturbation: Perturbation, start: f64, stop: f64, num_points: usize) -> Self {
        Self::new(Some(perturbation), start, stop, num_points)
    }

    pub fn is_driven(&self) -> bool {
        self.perturbation.is_some()
    }

    pub fn sample_times(&self) -> Vec<f64> {
        self.window.sample_times()
    }

    /// Effective Hamiltonian for this segment.
    pub fn hamiltonian(&self, generator: &Operator) -> Hamiltonian {
        match &self.perturbation {
            None => Hamiltonian::Constant(generator.clone()),
            Some(p) => Hamiltonian::Driven {
                static_term: generator.clone(),
                terms: vec![DriveTerm {
                    operator: p.operator.clone(),
                    coefficient: p.coefficient.clone(),
                }],
            },
        }
    }

    /// Args handed to the solver; free segments pass none.
    pub fn args(&self) -> Option<&PulseArgs> {
        self.perturbation.as_ref().map(|p| &p.args)
    }
}
