// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Collapse operator type.
//!
//! Ref: Lindblad (1976), Commun. Math. Phys. 48, 119.
//! Ref: Gorini, Kossakowski, Sudarshan (1976), J. Math. Phys. 17, 821.

use ndarray::Array2;

use crate::error::ValidationError;
use crate::linalg::c;
use crate::quantum::Operator;

/// A Lindblad collapse (jump) operator with its rate.
///
/// Represents a single dissipation channel:
///   D[L](ρ) = γ (L ρ L† − ½{L†L, ρ})
///
/// Rates are in inverse units of the experiment's time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapseOperator {
    /// Operator matrix (d × d).
    pub matrix: Operator,
    /// Decay rate γ ≥ 0.
    pub rate: f64,
    /// Human-readable label (e.g., "T1_q0").
    pub label: String,
}

impl CollapseOperator {
    /// Create a collapse operator, checking shape and rate.
    pub fn new(
        matrix: Operator,
        rate: f64,
        label: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let label = label.into();
        if matrix.nrows() != matrix.ncols() {
            return Err(ValidationError::Field {
                field: format!("collapse_ops.{label}"),
                message: format!(
                    "matrix must be square ({} × {})",
                    matrix.nrows(),
                    matrix.ncols()
                ),
            });
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::PhysicsConstraint(format!(
                "collapse operator '{label}' has invalid rate {rate:.3e}"
            )));
        }
        Ok(Self {
            matrix,
            rate,
            label,
        })
    }

    /// Single-qubit amplitude damping: L = |0⟩⟨1|, γ = `rate`.
    pub fn amplitude_damping(rate: f64, qubit_label: &str) -> Result<Self, ValidationError> {
        let mut lowering = Array2::zeros((2, 2));
        lowering[[0, 1]] = c(1.0);
        Self::new(lowering, rate, format!("T1_{qubit_label}"))
    }

    /// Single-qubit pure dephasing: L = σz/2, γ = `rate`.
    pub fn dephasing(rate: f64, qubit_label: &str) -> Result<Self, ValidationError> {
        let mut sigma_z_half = Array2::zeros((2, 2));
        sigma_z_half[[0, 0]] = c(0.5);
        sigma_z_half[[1, 1]] = c(-0.5);
        Self::new(sigma_z_half, rate, format!("Tphi_{qubit_label}"))
    }

    /// Amplitude damping plus pure dephasing from T1 and T2.
    ///
    /// 1/T_φ = 1/T2 − 1/(2 T1), which requires T2 ≤ 2 T1.
    pub fn from_t1_t2(t1: f64, t2: f64, qubit_label: &str) -> Result<Vec<Self>, ValidationError> {
        if t1 <= 0.0 || t2 <= 0.0 {
            return Err(ValidationError::PhysicsConstraint(format!(
                "T1 and T2 must be positive, got T1={t1}, T2={t2}"
            )));
        }
        if t2 > 2.0 * t1 {
            return Err(ValidationError::PhysicsConstraint(format!(
                "T2 ({t2}) must be ≤ 2*T1 ({})",
                2.0 * t1
            )));
        }
        let gamma_phi = (1.0 / t2 - 1.0 / (2.0 * t1)).max(0.0);
        Ok(vec![
            Self::amplitude_damping(1.0 / t1, qubit_label)?,
            Self::dephasing(gamma_phi, qubit_label)?,
        ])
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }
}
