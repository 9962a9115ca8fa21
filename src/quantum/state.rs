// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pure and mixed quantum states.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::operators::{ket2dm, Operator};
use crate::error::ValidationError;
use crate::linalg::trace;

/// A state vector or a density matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumState {
    /// Pure state |ψ⟩.
    Ket(Array1<Complex64>),
    /// Density matrix ρ (d × d).
    DensityMatrix(Array2<Complex64>),
}

impl QuantumState {
    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        match self {
            QuantumState::Ket(psi) => psi.len(),
            QuantumState::DensityMatrix(rho) => rho.nrows(),
        }
    }

    pub fn is_ket(&self) -> bool {
        matches!(self, QuantumState::Ket(_))
    }

    /// ρ for this state; kets become |ψ⟩⟨ψ|.
    pub fn to_density_matrix(&self) -> Array2<Complex64> {
        match self {
            QuantumState::Ket(psi) => ket2dm(psi),
            QuantumState::DensityMatrix(rho) => rho.clone(),
        }
    }

    /// Promote to a density matrix state.
    pub fn into_density_matrix(self) -> Self {
        match self {
            QuantumState::Ket(psi) => QuantumState::DensityMatrix(ket2dm(&psi)),
            dm => dm,
        }
    }

    /// Expectation value ⟨ψ|O|ψ⟩ or Tr(Oρ).
    pub fn expect(&self, op: &Operator) -> Result<Complex64, ValidationError> {
        if op.nrows() != self.dim() || op.ncols() != self.dim() {
            return Err(ValidationError::DimensionMismatch {
                what: "observable".into(),
                expected: self.dim(),
                actual: op.nrows(),
            });
        }
        Ok(match self {
            QuantumState::Ket(psi) => psi.mapv(|z| z.conj()).dot(&op.dot(psi)),
            QuantumState::DensityMatrix(rho) => trace(&op.dot(rho)),
        })
    }

    /// Tr(ρ), or ⟨ψ|ψ⟩ for a ket.
    pub fn trace(&self) -> f64 {
        match self {
            QuantumState::Ket(psi) => psi.iter().map(|z| z.norm_sqr()).sum(),
            QuantumState::DensityMatrix(rho) => trace(rho).re,
        }
    }

    /// Purity Tr(ρ²); a normalized ket always has purity 1.
    pub fn purity(&self) -> f64 {
        match self {
            QuantumState::Ket(_) => self.trace().powi(2),
            QuantumState::DensityMatrix(rho) => trace(&rho.dot(rho)).re,
        }
    }

    /// True if every amplitude is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            QuantumState::Ket(psi) => psi.iter().all(|z| z.is_finite()),
            QuantumState::DensityMatrix(rho) => rho.iter().all(|z| z.is_finite()),
        }
    }
}

impl From<Array1<Complex64>> for QuantumState {
    fn from(psi: Array1<Complex64>) -> Self {
        QuantumState::Ket(psi)
    }
}

impl From<Array2<Complex64>> for QuantumState {
    fn from(rho: Array2<Complex64>) -> Self {
        QuantumState::DensityMatrix(rho)
    }
}
