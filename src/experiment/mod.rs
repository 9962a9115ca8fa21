// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Segmented experiments.
//!
//! An [`Experiment`] holds a static generator H₀ and an ordered list of
//! [`Segment`]s. Each segment adds an optional driven term f(t)·H₁ and is
//! sampled over its own [`TimeWindow`]. Running the experiment evolves the
//! initial state through every segment in turn with a
//! [`MasterEquationSolver`](crate::solver::MasterEquationSolver) and returns
//! a [`SimulationResult`].
//!
//! ```
//! use qubit_os_experiment::experiment::{Experiment, Observable, Segment};
//! use qubit_os_experiment::lindblad::RungeKuttaSolver;
//! use qubit_os_experiment::quantum::{basis, sigmaz};
//!
//! let mut exp = Experiment::new(sigmaz());
//! exp.define_segments(vec![Segment::free(0.0, 1.0, 11), Segment::free(1.0, 2.0, 11)])
//!     .setup(basis(2, 0).unwrap(), vec![], vec![Observable::new("sz", sigmaz())]);
//!
//! let result = exp.run(&RungeKuttaSolver::default()).unwrap();
//! assert_eq!(result.trajectory.len(), 21);
//! ```

pub mod description;
pub mod result;
pub mod runner;
pub mod segment;

pub use description::ExperimentDescription;
pub use result::{ExpectationRow, ExpectationTable, ResultReport, SimulationResult, Trajectory};
pub use runner::{Experiment, Observable};
pub use segment::{Perturbation, Segment, TimeWindow};
