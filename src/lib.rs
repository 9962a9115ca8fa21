// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS segmented experiments
//!
//! This crate runs open- and closed-system quantum dynamics as a sequence of
//! time segments, each with its own drive, and collects expectation values
//! over the stitched trajectory.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      Experiment (segments, setup)        │
//! ├─────────────────────────────────────────┤
//! │     MasterEquationSolver (trait)         │
//! ├──────────────────┬──────────────────────┤
//! │ RungeKuttaSolver │   Plot helpers       │
//! │ (Lindblad, RK4)  │   (plotters, SVG)    │
//! └──────────────────┴──────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`experiment`]: Segments, the runner, results and YAML descriptions
//! - [`solver`]: Solver trait and Hamiltonians
//! - [`lindblad`]: Collapse operators and the RK4 integrator
//! - [`quantum`]: Operators and states
//! - [`pulse`]: Drive envelopes
//! - [`plot`]: Figure model, colormaps and SVG rendering
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod experiment;
pub mod linalg;
pub mod lindblad;
pub mod plot;
pub mod pulse;
pub mod quantum;
pub mod solver;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use experiment::{Experiment, Segment, SimulationResult};

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
