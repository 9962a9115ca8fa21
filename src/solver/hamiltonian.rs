// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Constant and driven Hamiltonians.

use crate::error::SolverError;
use crate::linalg::c;
use crate::pulse::{Coefficient, PulseArgs};
use crate::quantum::Operator;

/// One driven term f(t, args) · H_k.
#[derive(Debug, Clone)]
pub struct DriveTerm {
    pub operator: Operator,
    pub coefficient: Coefficient,
}

/// Hamiltonian handed to a solver for one segment.
///
/// `Driven` is H(t) = H₀ + Σ_k f_k(t, args) H_k.
#[derive(Debug, Clone)]
pub enum Hamiltonian {
    Constant(Operator),
    Driven {
        static_term: Operator,
        terms: Vec<DriveTerm>,
    },
}

impl Hamiltonian {
    /// Hilbert space dimension of the static term.
    pub fn dim(&self) -> usize {
        self.static_term().nrows()
    }

    pub fn static_term(&self) -> &Operator {
        match self {
            Hamiltonian::Constant(h) => h,
            Hamiltonian::Driven { static_term, .. } => static_term,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Hamiltonian::Constant(_))
    }

    /// H(t).
    pub fn at(&self, t: f64, args: Option<&PulseArgs>) -> Operator {
        match self {
            Hamiltonian::Constant(h) => h.clone(),
            Hamiltonian::Driven { static_term, terms } => {
                let mut h = static_term.clone();
                for term in terms {
                    let amp = term.coefficient.eval(t, args);
                    if amp != 0.0 {
                        h.scaled_add(c(amp), &term.operator);
                    }
                }
                h
            }
        }
    }

    /// Every term must be square and share one dimension.
    pub fn validate(&self) -> Result<(), SolverError> {
        let d = self.dim();
        let check = |what: &str, op: &Operator| {
            if op.nrows() != d || op.ncols() != d {
                return Err(SolverError::DimensionMismatch {
                    what: what.into(),
                    expected: d,
                    actual: if op.nrows() != d { op.nrows() } else { op.ncols() },
                });
            }
            Ok(())
        };
        check("hamiltonian static term", self.static_term())?;
        if let Hamiltonian::Driven { terms, .. } = self {
            for (k, term) in terms.iter().enumerate() {
                check(&format!("hamiltonian drive term {k}"), &term.operator)?;
            }
        }
        Ok(())
    }
}
