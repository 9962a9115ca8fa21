// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Solver trait definition.

use num_complex::Complex64;

use super::hamiltonian::Hamiltonian;
use crate::error::SolverError;
use crate::lindblad::CollapseOperator;
use crate::pulse::PulseArgs;
use crate::quantum::{Operator, QuantumState};

/// States produced for one segment.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    /// Sample times, as requested.
    pub times: Vec<f64>,
    /// One state per sample time; the first is the initial state.
    pub states: Vec<QuantumState>,
}

/// The trait that every master equation solver implements.
pub trait MasterEquationSolver: Send + Sync {
    /// Solver name, used in logs.
    fn name(&self) -> &str;

    /// Evolve `initial` over `tlist` under `hamiltonian` and the collapse
    /// operators, returning the state at every sample time.
    fn mesolve(
        &self,
        hamiltonian: &Hamiltonian,
        initial: &QuantumState,
        tlist: &[f64],
        collapse_ops: &[CollapseOperator],
        args: Option<&PulseArgs>,
    ) -> Result<SolverOutput, SolverError>;

    /// Expectation value of `observable` for each state.
    fn expect(
        &self,
        observable: &Operator,
        states: &[QuantumState],
    ) -> Result<Vec<Complex64>, SolverError> {
        states
            .iter()
            .map(|state| {
                state
                    .expect(observable)
                    .map_err(|_| SolverError::DimensionMismatch {
                        what: "observable".into(),
                        expected: state.dim(),
                        actual: observable.nrows(),
                    })
            })
            .collect()
    }
}
