// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lindblad dissipator and right-hand side.
//!
//! Ref: Breuer & Petruccione, "The Theory of Open Quantum Systems" (2002), Ch. 3.

use num_complex::Complex64;

use super::types::CollapseOperator;
use crate::linalg::{c, dagger};
use crate::quantum::Operator;

/// Collapse operator with L† and L†L precomputed for repeated RHS calls.
#[derive(Debug, Clone)]
pub struct PreparedCollapse {
    l: Operator,
    l_dag: Operator,
    l_dag_l: Operator,
    rate: Complex64,
}

impl PreparedCollapse {
    pub fn new(op: &CollapseOperator) -> Self {
        let l_dag = dagger(&op.matrix);
        let l_dag_l = l_dag.dot(&op.matrix);
        Self {
            l: op.matrix.clone(),
            l_dag,
            l_dag_l,
            rate: c(op.rate),
        }
    }

    /// D[L](ρ) = γ (L ρ L† − ½ L†L ρ − ½ ρ L†L)
    pub fn apply(&self, rho: &Operator) -> Operator {
        let jump = self.l.dot(rho).dot(&self.l_dag);
        let anti = self.l_dag_l.dot(rho) + rho.dot(&self.l_dag_l);
        (jump - anti * c(0.5)) * self.rate
    }
}

/// Prepare the channels that actually contribute (γ > 0).
pub fn prepare(collapse_ops: &[CollapseOperator]) -> Vec<PreparedCollapse> {
    collapse_ops
        .iter()
        .filter(|op| op.rate > 0.0)
        .map(PreparedCollapse::new)
        .collect()
}

/// dρ/dt = −i[H, ρ] + Σ_k D[L_k](ρ).
pub fn lindblad_rhs(
    hamiltonian: &Operator,
    channels: &[PreparedCollapse],
    rho: &Operator,
) -> Operator {
    let minus_i = Complex64::new(0.0, -1.0);
    let mut drho = (hamiltonian.dot(rho) - rho.dot(hamiltonian)) * minus_i;
    for channel in channels {
        drho = drho + channel.apply(rho);
    }
    drho
}
