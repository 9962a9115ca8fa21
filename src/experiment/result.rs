// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Values produced by a run: the stitched trajectory and expectation table.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::quantum::QuantumState;

/// Time-ordered states across all segments, boundary points recorded once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<QuantumState>,
    segment_starts: Vec<usize>,
}

impl Trajectory {
    pub(crate) fn new(
        times: Vec<f64>,
        states: Vec<QuantumState>,
        segment_starts: Vec<usize>,
    ) -> Self {
        debug_assert_eq!(times.len(), states.len());
        Self {
            times,
            states,
            segment_starts,
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[QuantumState] {
        &self.states
    }

    /// Index of the first trajectory point contributed by each segment.
    pub fn segment_starts(&self) -> &[usize] {
        &self.segment_starts
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// `(time, state)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &QuantumState)> {
        self.times.iter().copied().zip(self.states.iter())
    }

    pub fn final_state(&self) -> Option<&QuantumState> {
        self.states.last()
    }

    /// Tr(ρ²) at every point.
    pub fn purities(&self) -> Vec<f64> {
        self.states.iter().map(QuantumState::purity).collect()
    }

    /// Tr(ρ) (or ⟨ψ|ψ⟩) at every point.
    pub fn traces(&self) -> Vec<f64> {
        self.states.iter().map(QuantumState::trace).collect()
    }
}

/// Expectation values of one observable over the trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectationRow {
    pub label: String,
    pub values: Vec<Complex64>,
}

impl ExpectationRow {
    pub fn real(&self) -> Vec<f64> {
        self.values.iter().map(|z| z.re).collect()
    }
}

/// One row per observable, in observable order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectationTable {
    rows: Vec<ExpectationRow>,
}

impl ExpectationTable {
    pub fn new(rows: Vec<ExpectationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ExpectationRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&ExpectationRow> {
        self.rows.get(index)
    }

    /// Row by observable label.
    pub fn by_label(&self, label: &str) -> Option<&ExpectationRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Number of observables.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.label.as_str()).collect()
    }
}

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub trajectory: Trajectory,
    pub expectations: ExpectationTable,
}

/// Compact, state-free summary written by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultReport {
    pub solver: String,
    pub times: Vec<f64>,
    pub segment_starts: Vec<usize>,
    pub purity: Vec<f64>,
    pub expectations: Vec<ReportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

impl SimulationResult {
    pub fn report(&self, solver: &str) -> ResultReport {
        ResultReport {
            solver: solver.to_string(),
            times: self.trajectory.times().to_vec(),
            segment_starts: self.trajectory.segment_starts().to_vec(),
            purity: self.trajectory.purities(),
            expectations: self
                .expectations
                .rows()
                .iter()
                .map(|row| ReportRow {
                    label: row.label.clone(),
                    real: row.real(),
                    imag: row.values.iter().map(|z| z.im).collect(),
                })
                .collect(),
        }
    }
}
