// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Master equation solver interface.
//!
//! The experiment runner never integrates anything itself; it hands each
//! segment to a [`MasterEquationSolver`]. The crate ships
//! [`RungeKuttaSolver`](crate::lindblad::RungeKuttaSolver); tests use mocks.

pub mod hamiltonian;
pub mod r#trait;

pub use hamiltonian::{DriveTerm, Hamiltonian};
pub use r#trait::{MasterEquationSolver, SolverOutput};
