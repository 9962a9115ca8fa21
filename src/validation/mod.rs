// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for experiments.

use crate::config::ResourceLimits;
use crate::error::{Error, Result, ValidationError};
use crate::experiment::Experiment;
use crate::quantum::Operator;

/// Validate that an operator is square, of dimension `dim`, with finite entries.
pub fn validate_operator(field: &str, op: &Operator, dim: usize) -> Result<()> {
    if op.nrows() != op.ncols() {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("must be square, got {}x{}", op.nrows(), op.ncols()),
        }
        .into());
    }

    if op.nrows() != dim {
        return Err(ValidationError::DimensionMismatch {
            what: field.into(),
            expected: dim,
            actual: op.nrows(),
        }
        .into());
    }

    // Check for NaN or Inf
    if let Some(((i, j), _)) = op
        .indexed_iter()
        .find(|(_, z)| !z.re.is_finite() || !z.im.is_finite())
    {
        return Err(ValidationError::Field {
            field: field.into(),
            message: format!("contains a non-finite entry at ({}, {})", i, j),
        }
        .into());
    }

    Ok(())
}

/// Validate everything `simulate` needs before any numerical work.
///
/// An empty segment list or a missing initial state is a configuration error;
/// shape problems are validation errors.
pub fn validate_experiment(experiment: &Experiment) -> Result<()> {
    if experiment.segments().is_empty() {
        return Err(Error::Config(
            "experiment has no segments; call define_segments before simulate".into(),
        ));
    }

    let Some(initial) = experiment.initial_state() else {
        return Err(Error::Config(
            "experiment has no initial state; call setup before simulate".into(),
        ));
    };

    let generator = experiment.generator();
    let dim = generator.nrows();
    validate_operator("generator", generator, dim)?;

    if initial.dim() != dim {
        return Err(ValidationError::DimensionMismatch {
            what: "initial_state".into(),
            expected: dim,
            actual: initial.dim(),
        }
        .into());
    }
    if !initial.is_finite() {
        return Err(ValidationError::Field {
            field: "initial_state".into(),
            message: "contains non-finite amplitudes".into(),
        }
        .into());
    }

    for (i, segment) in experiment.segments().iter().enumerate() {
        segment.window.validate().map_err(|e| match e {
            ValidationError::Field { field, message } => ValidationError::Field {
                field: format!("segments[{}].{}", i, field),
                message,
            },
            other => other,
        })?;
        if let Some(p) = &segment.perturbation {
            validate_operator(&format!("segments[{}].perturbation", i), &p.operator, dim)?;
        }
    }

    for (i, op) in experiment.collapse_ops().iter().enumerate() {
        validate_operator(&format!("collapse_ops[{}]", i), &op.matrix, dim)?;
    }

    for obs in experiment.observables() {
        validate_operator(&format!("observable '{}'", obs.label), &obs.operator, dim)?;
    }

    Ok(())
}

/// Validate experiment size against configured resource limits.
pub fn validate_resource_limits(experiment: &Experiment, limits: &ResourceLimits) -> Result<()> {
    let dim = experiment.generator().nrows();
    if dim > limits.max_hilbert_dim as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "hilbert_dim".into(),
            limit: limits.max_hilbert_dim as u64,
            requested: dim as u64,
        }
        .into());
    }

    let segments = experiment.segments().len();
    if segments > limits.max_segments as usize {
        return Err(ValidationError::ResourceLimit {
            resource: "segments".into(),
            limit: limits.max_segments as u64,
            requested: segments as u64,
        }
        .into());
    }

    for segment in experiment.segments() {
        if segment.window.num_points > limits.max_points_per_segment as usize {
            return Err(ValidationError::ResourceLimit {
                resource: "points_per_segment".into(),
                limit: limits.max_points_per_segment as u64,
                requested: segment.window.num_points as u64,
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Observable, Segment};
    use crate::lindblad::CollapseOperator;
    use crate::linalg::c;
    use crate::quantum::{basis, identity, sigmax, sigmaz, QuantumState};

    fn qubit_experiment() -> Experiment {
        let mut exp = Experiment::new(sigmaz());
        exp.define_segments(vec![Segment::free(0.0, 1.0, 11)]);
        exp.setup(basis(2, 0).unwrap(), vec![], vec![Observable::new("sz", sigmaz())]);
        exp
    }

    #[test]
    fn test_validate_operator() {
        assert!(validate_operator("h", &sigmax(), 2).is_ok());

        // Wrong dimension
        assert!(validate_operator("h", &identity(3), 2).is_err());

        // Contains NaN
        let mut bad = sigmax();
        bad[[0, 1]] = c(f64::NAN);
        assert!(validate_operator("h", &bad, 2).is_err());
    }

    #[test]
    fn test_validate_experiment() {
        assert!(validate_experiment(&qubit_experiment()).is_ok());

        // No segments
        let mut exp = qubit_experiment();
        exp.define_segments(vec![]);
        assert!(matches!(validate_experiment(&exp), Err(Error::Config(_))));

        // No initial state
        let mut exp = Experiment::new(sigmaz());
        exp.push_segment(Segment::free(0.0, 1.0, 2));
        assert!(matches!(validate_experiment(&exp), Err(Error::Config(_))));

        // Initial state of the wrong size
        let mut exp = qubit_experiment();
        exp.setup(QuantumState::Ket(basis(3, 0).unwrap()), vec![], vec![]);
        assert!(matches!(
            validate_experiment(&exp),
            Err(Error::Validation(ValidationError::DimensionMismatch { .. }))
        ));

        // Collapse operator of the wrong size
        let mut exp = qubit_experiment();
        let op = CollapseOperator::new(identity(3), 1.0, "bad").unwrap();
        exp.setup(basis(2, 0).unwrap(), vec![op], vec![]);
        assert!(validate_experiment(&exp).is_err());
    }

    #[test]
    fn test_window_error_names_segment() {
        let mut exp = qubit_experiment();
        exp.define_segments(vec![Segment::free(0.0, 1.0, 2), Segment::free(1.0, 0.5, 2)]);
        let err = validate_experiment(&exp).unwrap_err();
        assert!(err.to_string().contains("segments[1]"));
    }

    #[test]
    fn test_validate_resource_limits() {
        let limits = ResourceLimits::default();
        assert!(validate_resource_limits(&qubit_experiment(), &limits).is_ok());

        let mut exp = qubit_experiment();
        exp.define_segments(vec![Segment::free(0.0, 1.0, 1_000_000)]);
        assert!(validate_resource_limits(&exp, &limits).is_err());

        let exp = Experiment::new(identity(128));
        assert!(validate_resource_limits(&exp, &limits).is_err());
    }
}
