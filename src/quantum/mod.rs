// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Operator and state types shared by the solver and the experiment runner.
//!
//! Conventions: `|0⟩` is the ground state, σz = diag(1, −1) and the ladder
//! operator `destroy(n)` maps |k⟩ to √k |k−1⟩.

pub mod operators;
pub mod state;

pub use operators::{
    basis, create, destroy, identity, ket2dm, num, projector, sigmax, sigmay, sigmaz, tensor,
    Operator,
};
pub use state::QuantumState;
