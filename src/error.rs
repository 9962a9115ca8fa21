// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for experiment staging, integration and plotting.

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (including unmet run preconditions)
    #[error("Configuration error: {0}")]
    Config(String),
    /// Solver error
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Plotting error
    #[error("Plot error: {0}")]
    Plot(#[from] PlotError),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Errors raised by a master equation solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// No sample times were supplied
    #[error("Time list is empty")]
    EmptyTimeList,
    /// Sample times are decreasing or not finite
    #[error("Invalid time list: {0}")]
    InvalidTimeList(String),
    /// Operator or state dimensions disagree
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// Solver returned the wrong number of states
    #[error("Solver returned {actual} states for {expected} sample times")]
    OutputLength { expected: usize, actual: usize },
    /// Integration produced NaN or Inf
    #[error("Non-finite state at t = {0}")]
    NonFinite(f64),
    /// Integration step is not a positive finite number
    #[error("Invalid max step: {0}")]
    InvalidStep(f64),
    /// Linear solve hit a (numerically) singular matrix
    #[error("Singular matrix: {0}")]
    SingularMatrix(String),
}

/// Validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Field validation failed
    #[error("Field '{field}': {message}")]
    Field { field: String, message: String },
    /// Dimensions of two inputs disagree
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// Resource limit exceeded
    #[error("Resource limit exceeded for {resource}: limit={limit}, requested={requested}")]
    ResourceLimit {
        resource: String,
        limit: u64,
        requested: u64,
    },
    /// Physics constraint violated
    #[error("Physics constraint violated: {0}")]
    PhysicsConstraint(String),
}

/// Plotting errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    /// A required series or axis is empty
    #[error("Empty input: {0}")]
    EmptySeries(String),
    /// Two inputs that must line up do not
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
    /// Fewer styles than series
    #[error("No style given for series {0}")]
    MissingStyle(usize),
    /// Colormap name not recognised
    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),
    /// Format string could not be parsed
    #[error("Invalid format string '{0}'")]
    InvalidFormat(String),
    /// Drawing backend failure
    #[error("Render failed: {0}")]
    Render(String),
}
