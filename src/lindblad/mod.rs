// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad master equation solver for open quantum systems.
//!
//! Implements the Gorini–Kossakowski–Sudarshan–Lindblad (GKSL) master equation:
//!
//!   dρ/dt = -i[H(t), ρ] + Σ_k γ_k (L_k ρ L_k† − ½{L_k†L_k, ρ})
//!
//! This module provides:
//! - Collapse operators (amplitude damping, dephasing, arbitrary channels)
//! - The dissipator and full right-hand side
//! - [`RungeKuttaSolver`], implementing
//!   [`MasterEquationSolver`](crate::solver::MasterEquationSolver)
//!
//! # Example
//!
//! ```
//! use qubit_os_experiment::lindblad::{CollapseOperator, RungeKuttaSolver};
//! use qubit_os_experiment::quantum::{basis, QuantumState};
//! use qubit_os_experiment::solver::{Hamiltonian, MasterEquationSolver};
//! use ndarray::Array2;
//!
//! let ops = vec![CollapseOperator::amplitude_damping(0.5, "q0").unwrap()];
//! let excited = QuantumState::Ket(basis(2, 1).unwrap());
//! let h = Hamiltonian::Constant(Array2::zeros((2, 2)));
//!
//! let out = RungeKuttaSolver::default()
//!     .mesolve(&h, &excited, &[0.0, 1.0, 2.0], &ops, None)
//!     .unwrap();
//! assert_eq!(out.states.len(), 3);
//! ```
//!
//! # References
//!
//! - Lindblad, G. (1976). Commun. Math. Phys. 48, 119.
//!   DOI: 10.1007/BF01608499
//! - Breuer, H.-P. & Petruccione, F. (2002). "The Theory of Open Quantum Systems." Oxford.

pub mod dissipator;
pub mod integrate;
pub mod types;

pub use integrate::RungeKuttaSolver;
pub use types::CollapseOperator;
