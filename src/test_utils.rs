// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities: mock solvers.

use ndarray::array;
use parking_lot::Mutex;

use crate::error::SolverError;
use crate::lindblad::CollapseOperator;
use crate::linalg::c;
use crate::pulse::PulseArgs;
use crate::quantum::QuantumState;
use crate::solver::{Hamiltonian, MasterEquationSolver, SolverOutput};

/// Arguments seen by one `mesolve` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub initial: QuantumState,
    pub tlist: Vec<f64>,
    pub args: Option<PulseArgs>,
    pub constant_hamiltonian: bool,
}

/// Mock solver that records its calls and returns recognizable states.
///
/// The first output state is the initial state; every later one is
/// [`StampSolver::stamp`] of the call index and sample time.
#[derive(Default)]
pub struct StampSolver {
    calls: Mutex<Vec<RecordedCall>>,
}

impl StampSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two-level ket `[t, call]`, unique per call and sample time.
    pub fn stamp(call: usize, t: f64) -> QuantumState {
        QuantumState::Ket(array![c(t), c(call as f64)])
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

impl MasterEquationSolver for StampSolver {
    fn name(&self) -> &str {
        "stamp"
    }

    fn mesolve(
        &self,
        hamiltonian: &Hamiltonian,
        initial: &QuantumState,
        tlist: &[f64],
        _collapse_ops: &[CollapseOperator],
        args: Option<&PulseArgs>,
    ) -> Result<SolverOutput, SolverError> {
        let mut calls = self.calls.lock();
        let index = calls.len();
        calls.push(RecordedCall {
            initial: initial.clone(),
            tlist: tlist.to_vec(),
            args: args.cloned(),
            constant_hamiltonian: hamiltonian.is_constant(),
        });

        let states = tlist
            .iter()
            .enumerate()
            .map(|(k, &t)| {
                if k == 0 {
                    initial.clone()
                } else {
                    Self::stamp(index, t)
                }
            })
            .collect();
        Ok(SolverOutput {
            times: tlist.to_vec(),
            states,
        })
    }
}

/// Mock solver that always fails.
pub struct FailingSolver;

impl MasterEquationSolver for FailingSolver {
    fn name(&self) -> &str {
        "failing"
    }

    fn mesolve(
        &self,
        _hamiltonian: &Hamiltonian,
        _initial: &QuantumState,
        _tlist: &[f64],
        _collapse_ops: &[CollapseOperator],
        _args: Option<&PulseArgs>,
    ) -> Result<SolverOutput, SolverError> {
        Err(SolverError::NonFinite(0.0))
    }
}

/// Mock solver that drops the last sample.
pub struct TruncatingSolver;

impl MasterEquationSolver for TruncatingSolver {
    fn name(&self) -> &str {
        "truncating"
    }

    fn mesolve(
        &self,
        _hamiltonian: &Hamiltonian,
        initial: &QuantumState,
        tlist: &[f64],
        _collapse_ops: &[CollapseOperator],
        _args: Option<&PulseArgs>,
    ) -> Result<SolverOutput, SolverError> {
        let n = tlist.len().saturating_sub(1);
        Ok(SolverOutput {
            times: tlist[..n].to_vec(),
            states: vec![initial.clone(); n],
        })
    }
}
