// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! YAML experiment descriptions.
//!
//! ```yaml
//! generator: { op: sigmaz, scale: 0.5 }
//! initial_state:
//!   basis: { dim: 2, index: 0 }
//! segments:
//!   - window: { start: 0.0, stop: 1.0, num_points: 51 }
//!     perturbation:
//!       operator: sigmax
//!       shape: gaussian
//!       args: { amplitude: 3.0, center: 0.5, sigma: 0.1 }
//!   - window: { start: 1.0, stop: 4.0, num_points: 151 }
//! collapse_ops:
//!   - { operator: "destroy:2", rate: 0.1, label: T1_q0 }
//! observables:
//!   - { label: sz, operator: sigmaz }
//! ```

use std::path::Path;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::runner::{Experiment, Observable};
use super::segment::{Perturbation, Segment, TimeWindow};
use crate::error::{Result, ValidationError};
use crate::lindblad::CollapseOperator;
use crate::linalg::c;
use crate::pulse::{PulseArgs, PulseShape};
use crate::quantum::{
    basis, create, destroy, identity, num, sigmax, sigmay, sigmaz, Operator, QuantumState,
};

/// An operator written in a description file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperatorSpec {
    /// `sigmax`, `sigmay`, `sigmaz`, `identity:N`, `destroy:N`, `create:N`,
    /// `num:N`, `zero:N`.
    Named(String),
    /// Explicit rows of `[re, im]` pairs.
    Matrix(Vec<Vec<[f64; 2]>>),
    Scaled { op: Box<OperatorSpec>, scale: f64 },
    Sum { sum: Vec<OperatorSpec> },
}

impl OperatorSpec {
    pub fn build(&self) -> std::result::Result<Operator, ValidationError> {
        match self {
            OperatorSpec::Named(name) => named_operator(name),
            OperatorSpec::Matrix(rows) => {
                let m = complex_matrix("operator", rows)?;
                if m.nrows() != m.ncols() {
                    return Err(ValidationError::Field {
                        field: "operator".into(),
                        message: format!("must be square, got {}x{}", m.nrows(), m.ncols()),
                    });
                }
                Ok(m)
            }
            OperatorSpec::Scaled { op, scale } => Ok(op.build()? * c(*scale)),
            OperatorSpec::Sum { sum } => {
                let mut terms = sum.iter();
                let Some(first) = terms.next() else {
                    return Err(ValidationError::Field {
                        field: "sum".into(),
                        message: "must contain at least one operator".into(),
                    });
                };
                let mut total = first.build()?;
                for term in terms {
                    let op = term.build()?;
                    if op.dim() != total.dim() {
                        return Err(ValidationError::DimensionMismatch {
                            what: "sum term".into(),
                            expected: total.nrows(),
                            actual: op.nrows(),
                        });
                    }
                    total += &op;
                }
                Ok(total)
            }
        }
    }
}

fn named_operator(name: &str) -> std::result::Result<Operator, ValidationError> {
    let unknown = || ValidationError::Field {
        field: "operator".into(),
        message: format!("unknown operator '{}'", name),
    };

    match name {
        "sigmax" => return Ok(sigmax()),
        "sigmay" => return Ok(sigmay()),
        "sigmaz" => return Ok(sigmaz()),
        _ => {}
    }

    let (kind, dim) = name.split_once(':').ok_or_else(unknown)?;
    let dim: usize = dim.trim().parse().map_err(|_| ValidationError::Field {
        field: "operator".into(),
        message: format!("invalid dimension in '{}'", name),
    })?;
    if dim == 0 {
        return Err(ValidationError::Field {
            field: "operator".into(),
            message: format!("dimension must be positive in '{}'", name),
        });
    }

    match kind.trim() {
        "identity" => Ok(identity(dim)),
        "destroy" => Ok(destroy(dim)),
        "create" => Ok(create(dim)),
        "num" => Ok(num(dim)),
        "zero" => Ok(Operator::zeros((dim, dim))),
        _ => Err(unknown()),
    }
}

fn complex_matrix(
    field: &str,
    rows: &[Vec<[f64; 2]>],
) -> std::result::Result<Array2<Complex64>, ValidationError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.is_empty() || ncols == 0 {
        return Err(ValidationError::Field {
            field: field.into(),
            message: "matrix is empty".into(),
        });
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("row {} has {} entries, expected {}", bad, rows[bad].len(), ncols),
        });
    }
    Ok(Array2::from_shape_fn((rows.len(), ncols), |(i, j)| {
        let [re, im] = rows[i][j];
        Complex64::new(re, im)
    }))
}

/// Initial condition in a description file, written as a single-key map
/// such as `basis: { dim: 2, index: 0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateSpec {
    Basis { dim: usize, index: usize },
    Ket(Vec<[f64; 2]>),
    DensityMatrix(Vec<Vec<[f64; 2]>>),
}

impl StateSpec {
    pub fn build(&self) -> std::result::Result<QuantumState, ValidationError> {
        match self {
            StateSpec::Basis { dim, index } => Ok(QuantumState::Ket(basis(*dim, *index)?)),
            StateSpec::Ket(amplitudes) => {
                if amplitudes.is_empty() {
                    return Err(ValidationError::Field {
                        field: "initial_state.ket".into(),
                        message: "ket is empty".into(),
                    });
                }
                Ok(QuantumState::Ket(
                    amplitudes
                        .iter()
                        .map(|[re, im]| Complex64::new(*re, *im))
                        .collect::<Array1<_>>(),
                ))
            }
            StateSpec::DensityMatrix(rows) => {
                let rho = complex_matrix("initial_state.density_matrix", rows)?;
                if rho.nrows() != rho.ncols() {
                    return Err(ValidationError::Field {
                        field: "initial_state.density_matrix".into(),
                        message: "must be square".into(),
                    });
                }
                Ok(QuantumState::DensityMatrix(rho))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerturbationSpec {
    pub operator: OperatorSpec,
    pub shape: PulseShape,
    #[serde(default)]
    pub args: PulseArgs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub window: TimeWindow,
    #[serde(default)]
    pub perturbation: Option<PerturbationSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseSpec {
    pub operator: OperatorSpec,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservableSpec {
    pub label: String,
    pub operator: OperatorSpec,
}

/// A whole experiment as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDescription {
    pub generator: OperatorSpec,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub initial_state: StateSpec,
    pub segments: Vec<SegmentSpec>,
    #[serde(default)]
    pub collapse_ops: Vec<CollapseSpec>,
    #[serde(default)]
    pub observables: Vec<ObservableSpec>,
}

impl ExperimentDescription {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Build the runnable experiment. Shapes are checked later by `simulate`.
    pub fn build(&self) -> Result<Experiment> {
        let generator = self.generator.build()?;
        let mut experiment = Experiment::new(generator);

        for spec in &self.segments {
            let perturbation = match &spec.perturbation {
                Some(p) => Some(Perturbation::from_shape(
                    p.operator.build()?,
                    p.shape,
                    p.args.clone(),
                )?),
                None => None,
            };
            experiment.push_segment(Segment {
                perturbation,
                window: spec.window,
            });
        }

        let collapse_ops = self
            .collapse_ops
            .iter()
            .enumerate()
            .map(|(i, spec)| {
                let label = spec.label.clone().unwrap_or_else(|| format!("c{}", i));
                CollapseOperator::new(spec.operator.build()?, spec.rate, label)
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let observables = self
            .observables
            .iter()
            .map(|spec| Ok(Observable::new(spec.label.clone(), spec.operator.build()?)))
            .collect::<std::result::Result<Vec<_>, ValidationError>>()?;

        experiment.setup(self.initial_state.build()?, collapse_ops, observables);
        Ok(experiment)
    }
}
