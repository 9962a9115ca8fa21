// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Standard operators and basis states.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::error::ValidationError;
use crate::linalg::{c, kron};

/// Dense operator on a finite Hilbert space.
pub type Operator = Array2<Complex64>;

/// Pauli X.
pub fn sigmax() -> Operator {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = c(1.0);
    m[[1, 0]] = c(1.0);
    m
}

/// Pauli Y.
pub fn sigmay() -> Operator {
    let mut m = Array2::zeros((2, 2));
    m[[0, 1]] = Complex64::new(0.0, -1.0);
    m[[1, 0]] = Complex64::new(0.0, 1.0);
    m
}

/// Pauli Z = diag(1, −1).
pub fn sigmaz() -> Operator {
    let mut m = Array2::zeros((2, 2));
    m[[0, 0]] = c(1.0);
    m[[1, 1]] = c(-1.0);
    m
}

/// Identity on a `dim`-level space.
pub fn identity(dim: usize) -> Operator {
    Array2::from_diag_elem(dim, c(1.0))
}

/// Annihilation operator truncated to `dim` levels.
pub fn destroy(dim: usize) -> Operator {
    let mut m = Array2::zeros((dim, dim));
    for k in 1..dim {
        m[[k - 1, k]] = c((k as f64).sqrt());
    }
    m
}

/// Creation operator truncated to `dim` levels.
pub fn create(dim: usize) -> Operator {
    let mut m = Array2::zeros((dim, dim));
    for k in 1..dim {
        m[[k, k - 1]] = c((k as f64).sqrt());
    }
    m
}

/// Number operator a†a.
pub fn num(dim: usize) -> Operator {
    let mut m = Array2::zeros((dim, dim));
    for k in 0..dim {
        m[[k, k]] = c(k as f64);
    }
    m
}

/// Projector |k⟩⟨k|.
pub fn projector(dim: usize, k: usize) -> Result<Operator, ValidationError> {
    let ket = basis(dim, k)?;
    Ok(ket2dm(&ket))
}

/// Basis ket |k⟩ in a `dim`-level space.
pub fn basis(dim: usize, k: usize) -> Result<Array1<Complex64>, ValidationError> {
    if k >= dim {
        return Err(ValidationError::Field {
            field: "basis".into(),
            message: format!("index {k} out of range for dimension {dim}"),
        });
    }
    let mut v = Array1::zeros(dim);
    v[k] = c(1.0);
    Ok(v)
}

/// |ψ⟩⟨ψ|.
pub fn ket2dm(ket: &Array1<Complex64>) -> Operator {
    let n = ket.len();
    Array2::from_shape_fn((n, n), |(i, j)| ket[i] * ket[j].conj())
}

/// Tensor product of a list of operators, left to right.
pub fn tensor(ops: &[Operator]) -> Operator {
    ops.iter().fold(identity(1), |acc, op| kron(&acc, op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::{commutator, dagger};

    #[test]
    fn test_pauli_algebra() {
        // [σx, σy] = 2i σz
        let comm = commutator(&sigmax(), &sigmay());
        let expected = sigmaz().mapv(|z| z * Complex64::new(0.0, 2.0));
        assert_eq!(comm, expected);
    }

    #[test]
    fn test_ladder_operators() {
        let a = destroy(4);
        assert_eq!(dagger(&a), create(4));
        let diff = dagger(&a).dot(&a) - num(4);
        assert!(diff.iter().all(|z| z.norm() < 1e-12));
        // a|1⟩ = |0⟩
        let one = basis(4, 1).unwrap();
        assert_eq!(a.dot(&one), basis(4, 0).unwrap());
    }

    #[test]
    fn test_basis_out_of_range() {
        assert!(basis(2, 2).is_err());
        assert!(projector(3, 5).is_err());
    }

    #[test]
    fn test_ket2dm_is_projector() {
        let p = ket2dm(&basis(3, 2).unwrap());
        assert_eq!(p.dot(&p), p);
        assert_eq!(p[[2, 2]], c(1.0));
    }

    #[test]
    fn test_tensor_dimension() {
        let op = tensor(&[sigmaz(), identity(3), sigmax()]);
        assert_eq!(op.dim(), (12, 12));
        assert_eq!(tensor(&[]).dim(), (1, 1));
    }
}
