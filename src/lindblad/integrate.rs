// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the Schrödinger and Lindblad equations.
//!
//! Kets without collapse operators evolve under dψ/dt = −iH(t)ψ. Anything
//! with dissipation is promoted to a density matrix and evolves under
//! dρ/dt = −i[H(t), ρ] + Σ D[L](ρ). Each interval between sample times is
//! split into equal substeps no longer than `max_step`, and H(t) is sampled
//! at the RK4 stage times, so driven terms are resolved inside a substep.
//!
//! Constant closed-system segments can skip RK4 entirely and apply
//! U = exp(−iH dt) per interval.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::trace;

use super::dissipator::{lindblad_rhs, prepare, PreparedCollapse};
use super::types::CollapseOperator;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::linalg::{c, dagger, matrix_exp};
use crate::pulse::PulseArgs;
use crate::quantum::{Operator, QuantumState};
use crate::solver::{Hamiltonian, MasterEquationSolver, SolverOutput};

const MINUS_I: Complex64 = Complex64::new(0.0, -1.0);

/// Fixed-step RK4 master equation solver.
#[derive(Debug, Clone)]
pub struct RungeKuttaSolver {
    max_step: f64,
    exact_unitary: bool,
}

impl Default for RungeKuttaSolver {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl RungeKuttaSolver {
    pub fn new(max_step: f64, exact_unitary: bool) -> Self {
        Self {
            max_step,
            exact_unitary,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.max_step, config.exact_unitary)
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Advance `state` from `t0` by `dt` with RK4 substeps.
    fn integrate_interval(
        &self,
        state: QuantumState,
        hamiltonian: &Hamiltonian,
        channels: &[PreparedCollapse],
        args: Option<&PulseArgs>,
        t0: f64,
        dt: f64,
    ) -> QuantumState {
        let substeps = (dt / self.max_step).ceil().max(1.0) as usize;
        let h = dt / substeps as f64;

        match state {
            QuantumState::Ket(mut psi) => {
                for k in 0..substeps {
                    psi = rk4_ket(&psi, hamiltonian, args, t0 + k as f64 * h, h);
                }
                QuantumState::Ket(psi)
            }
            QuantumState::DensityMatrix(mut rho) => {
                for k in 0..substeps {
                    rho = rk4_density(&rho, hamiltonian, channels, args, t0 + k as f64 * h, h);
                }
                QuantumState::DensityMatrix(rho)
            }
        }
    }
}

impl MasterEquationSolver for RungeKuttaSolver {
    fn name(&self) -> &str {
        "rk4"
    }

    fn mesolve(
        &self,
        hamiltonian: &Hamiltonian,
        initial: &QuantumState,
        tlist: &[f64],
        collapse_ops: &[CollapseOperator],
        args: Option<&PulseArgs>,
    ) -> Result<SolverOutput, SolverError> {
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(SolverError::InvalidStep(self.max_step));
        }
        check_tlist(tlist)?;
        check_dimensions(hamiltonian, initial, collapse_ops)?;

        let channels = prepare(collapse_ops);
        let mut state = if collapse_ops.is_empty() {
            initial.clone()
        } else {
            initial.clone().into_density_matrix()
        };

        let exact = self.exact_unitary && hamiltonian.is_constant() && channels.is_empty();
        let mut propagator = PropagatorCache::new();

        let mut states = Vec::with_capacity(tlist.len());
        states.push(state.clone());

        for window in tlist.windows(2) {
            let (t0, t1) = (window[0], window[1]);
            let dt = t1 - t0;
            if dt > 0.0 {
                state = if exact {
                    apply_unitary(state, propagator.get(hamiltonian.static_term(), dt)?)
                } else {
                    self.integrate_interval(state, hamiltonian, &channels, args, t0, dt)
                };
                if !state.is_finite() {
                    return Err(SolverError::NonFinite(t1));
                }
            }
            states.push(state.clone());
        }

        trace!(
            points = tlist.len(),
            exact,
            channels = channels.len(),
            "Segment integrated"
        );

        Ok(SolverOutput {
            times: tlist.to_vec(),
            states,
        })
    }
}

/// Sample times must be non-empty, finite and non-decreasing.
fn check_tlist(tlist: &[f64]) -> Result<(), SolverError> {
    if tlist.is_empty() {
        return Err(SolverError::EmptyTimeList);
    }
    if let Some(bad) = tlist.iter().find(|t| !t.is_finite()) {
        return Err(SolverError::InvalidTimeList(format!(
            "non-finite sample time {bad}"
        )));
    }
    if let Some(k) = tlist.windows(2).position(|w| w[1] < w[0]) {
        return Err(SolverError::InvalidTimeList(format!(
            "sample times decrease at index {}: {} -> {}",
            k + 1,
            tlist[k],
            tlist[k + 1]
        )));
    }
    Ok(())
}

fn check_dimensions(
    hamiltonian: &Hamiltonian,
    initial: &QuantumState,
    collapse_ops: &[CollapseOperator],
) -> Result<(), SolverError> {
    hamiltonian.validate()?;

    let d = hamiltonian.dim();
    if initial.dim() != d {
        return Err(SolverError::DimensionMismatch {
            what: "initial state".into(),
            expected: d,
            actual: initial.dim(),
        });
    }
    if let QuantumState::DensityMatrix(rho) = initial {
        if rho.ncols() != d {
            return Err(SolverError::DimensionMismatch {
                what: "initial density matrix columns".into(),
                expected: d,
                actual: rho.ncols(),
            });
        }
    }
    for op in collapse_ops {
        if op.matrix.nrows() != d || op.matrix.ncols() != d {
            return Err(SolverError::DimensionMismatch {
                what: format!("collapse operator '{}'", op.label),
                expected: d,
                actual: op.matrix.nrows(),
            });
        }
    }
    Ok(())
}

/// exp(−iH dt), recomputed only when dt changes.
struct PropagatorCache {
    dt: f64,
    u: Operator,
}

impl PropagatorCache {
    fn new() -> Self {
        Self {
            dt: f64::NAN,
            u: Array2::zeros((0, 0)),
        }
    }

    fn get(&mut self, hamiltonian: &Operator, dt: f64) -> Result<&Operator, SolverError> {
        let fresh = (self.dt - dt).abs() <= 1e-12 * dt.abs().max(1.0);
        if !fresh {
            self.u = matrix_exp(&(hamiltonian * (MINUS_I * dt)))?;
            self.dt = dt;
        }
        Ok(&self.u)
    }
}

fn apply_unitary(state: QuantumState, u: &Operator) -> QuantumState {
    match state {
        QuantumState::Ket(psi) => QuantumState::Ket(u.dot(&psi)),
        QuantumState::DensityMatrix(rho) => {
            QuantumState::DensityMatrix(u.dot(&rho).dot(&dagger(u)))
        }
    }
}

/// One RK4 step of dψ/dt = −iH(t)ψ.
fn rk4_ket(
    psi: &Array1<Complex64>,
    hamiltonian: &Hamiltonian,
    args: Option<&PulseArgs>,
    t: f64,
    dt: f64,
) -> Array1<Complex64> {
    let h_start = hamiltonian.at(t, args);
    let h_mid = hamiltonian.at(t + 0.5 * dt, args);
    let h_end = hamiltonian.at(t + dt, args);
    let f = |h: &Operator, v: &Array1<Complex64>| h.dot(v) * MINUS_I;

    let half = c(0.5 * dt);
    let k1 = f(&h_start, psi);
    let k2 = f(&h_mid, &(psi + &(&k1 * half)));
    let k3 = f(&h_mid, &(psi + &(&k2 * half)));
    let k4 = f(&h_end, &(psi + &(&k3 * c(dt))));

    psi + &((k1 + k2 * c(2.0) + k3 * c(2.0) + k4) * c(dt / 6.0))
}

/// One RK4 step of the Lindblad equation.
fn rk4_density(
    rho: &Array2<Complex64>,
    hamiltonian: &Hamiltonian,
    channels: &[PreparedCollapse],
    args: Option<&PulseArgs>,
    t: f64,
    dt: f64,
) -> Array2<Complex64> {
    let h_start = hamiltonian.at(t, args);
    let h_mid = hamiltonian.at(t + 0.5 * dt, args);
    let h_end = hamiltonian.at(t + dt, args);

    let half = c(0.5 * dt);
    let k1 = lindblad_rhs(&h_start, channels, rho);
    let k2 = lindblad_rhs(&h_mid, channels, &(rho + &(&k1 * half)));
    let k3 = lindblad_rhs(&h_mid, channels, &(rho + &(&k2 * half)));
    let k4 = lindblad_rhs(&h_end, channels, &(rho + &(&k3 * c(dt))));

    rho + &((k1 + k2 * c(2.0) + k3 * c(2.0) + k4) * c(dt / 6.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::linspace;
    use crate::pulse::Coefficient;
    use crate::quantum::{basis, ket2dm, sigmax, sigmaz};
    use crate::solver::DriveTerm;
    use approx::assert_relative_eq;

    fn excited_dm() -> QuantumState {
        QuantumState::DensityMatrix(ket2dm(&basis(2, 1).unwrap()))
    }

    fn plus_ket() -> QuantumState {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        QuantumState::Ket(Array1::from(vec![c(s), c(s)]))
    }

    fn rabi(omega: f64) -> Hamiltonian {
        Hamiltonian::Driven {
            static_term: Array2::zeros((2, 2)),
            terms: vec![DriveTerm {
                operator: sigmax(),
                coefficient: Coefficient::constant(omega / 2.0),
            }],
        }
    }

    #[test]
    fn test_unitary_evolution_preserves_purity() {
        let solver = RungeKuttaSolver::new(1e-3, false);
        let h = Hamiltonian::Constant(sigmaz().mapv(|z| z * c(2.0)));
        let rho0 = plus_ket().into_density_matrix();
        let out = solver
            .mesolve(&h, &rho0, &linspace(0.0, 3.0, 31), &[], None)
            .unwrap();
        let last = out.states.last().unwrap();
        assert_relative_eq!(last.purity(), 1.0, epsilon = 1e-8);
        assert_relative_eq!(last.trace(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_t1_decay_matches_exponential() {
        let gamma = 0.8;
        let ops = vec![CollapseOperator::amplitude_damping(gamma, "q0").unwrap()];
        let solver = RungeKuttaSolver::new(1e-3, true);
        let h = Hamiltonian::Constant(Array2::zeros((2, 2)));
        let tlist = linspace(0.0, 4.0, 9);
        let out = solver.mesolve(&h, &excited_dm(), &tlist, &ops, None).unwrap();

        for (t, state) in tlist.iter().zip(&out.states) {
            let p1 = state.to_density_matrix()[[1, 1]].re;
            assert_relative_eq!(p1, (-gamma * t).exp(), epsilon = 1e-8);
            assert_relative_eq!(state.trace(), 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_dephasing_kills_coherence() {
        let ops = vec![CollapseOperator::dephasing(1.0, "q0").unwrap()];
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(Array2::zeros((2, 2)));
        let out = solver
            .mesolve(&h, &plus_ket(), &linspace(0.0, 20.0, 3), &ops, None)
            .unwrap();
        let last = out.states.last().unwrap();
        assert!(!last.is_ket());
        assert!(last.to_density_matrix()[[0, 1]].norm() < 1e-3);
        assert!(last.purity() < 0.51);
    }

    #[test]
    fn test_ground_state_is_steady_state() {
        let ops = vec![CollapseOperator::amplitude_damping(5.0, "q0").unwrap()];
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(Array2::zeros((2, 2)));
        let ground = QuantumState::Ket(basis(2, 0).unwrap());
        let out = solver
            .mesolve(&h, &ground, &linspace(0.0, 2.0, 5), &ops, None)
            .unwrap();
        let rho = out.states.last().unwrap().to_density_matrix();
        assert_relative_eq!(rho[[0, 0]].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_driven_rabi_flop() {
        // H = (Ω/2) σx: P₁(t) = sin²(Ωt/2)
        let omega = std::f64::consts::PI;
        let solver = RungeKuttaSolver::new(1e-3, true);
        let ground = QuantumState::Ket(basis(2, 0).unwrap());
        let tlist = linspace(0.0, 1.0, 11);
        let out = solver.mesolve(&rabi(omega), &ground, &tlist, &[], None).unwrap();

        assert!(out.states.iter().all(QuantumState::is_ket));
        for (t, state) in tlist.iter().zip(&out.states) {
            let p1 = state.to_density_matrix()[[1, 1]].re;
            assert_relative_eq!(p1, (omega * t / 2.0).sin().powi(2), epsilon = 1e-8);
        }
    }

    #[test]
    fn test_exact_and_rk4_paths_agree() {
        let h = Hamiltonian::Constant(sigmax().mapv(|z| z * c(0.7)) + sigmaz());
        let tlist = linspace(0.0, 2.0, 21);
        let exact = RungeKuttaSolver::new(1e-3, true)
            .mesolve(&h, &plus_ket(), &tlist, &[], None)
            .unwrap();
        let rk4 = RungeKuttaSolver::new(1e-3, false)
            .mesolve(&h, &plus_ket(), &tlist, &[], None)
            .unwrap();
        for (a, b) in exact.states.iter().zip(&rk4.states) {
            let diff = &a.to_density_matrix() - &b.to_density_matrix();
            assert!(diff.iter().all(|z| z.norm() < 1e-9));
        }
    }

    #[test]
    fn test_output_shape_and_initial_state() {
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(sigmaz());
        let tlist = linspace(1.0, 2.0, 7);
        let out = solver.mesolve(&h, &plus_ket(), &tlist, &[], None).unwrap();
        assert_eq!(out.states.len(), 7);
        assert_eq!(out.times, tlist);
        assert_eq!(out.states[0], plus_ket());
    }

    #[test]
    fn test_single_point_returns_initial_state() {
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(sigmaz());
        let out = solver.mesolve(&h, &plus_ket(), &[3.0], &[], None).unwrap();
        assert_eq!(out.states, vec![plus_ket()]);
    }

    #[test]
    fn test_rejects_bad_time_lists() {
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(sigmaz());
        assert_eq!(
            solver.mesolve(&h, &plus_ket(), &[], &[], None).unwrap_err(),
            SolverError::EmptyTimeList
        );
        assert!(matches!(
            solver.mesolve(&h, &plus_ket(), &[0.0, 1.0, 0.5], &[], None),
            Err(SolverError::InvalidTimeList(_))
        ));
        assert!(matches!(
            solver.mesolve(&h, &plus_ket(), &[0.0, f64::NAN], &[], None),
            Err(SolverError::InvalidTimeList(_))
        ));
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let solver = RungeKuttaSolver::default();
        let h = Hamiltonian::Constant(sigmaz());
        let qutrit = QuantumState::Ket(basis(3, 0).unwrap());
        assert!(matches!(
            solver.mesolve(&h, &qutrit, &[0.0, 1.0], &[], None),
            Err(SolverError::DimensionMismatch { .. })
        ));

        let wide = CollapseOperator::new(Array2::zeros((3, 3)), 1.0, "wide").unwrap();
        assert!(matches!(
            solver.mesolve(&h, &plus_ket(), &[0.0, 1.0], &[wide], None),
            Err(SolverError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_max_step() {
        let h = Hamiltonian::Constant(sigmaz());
        for step in [0.0, -1e-3, f64::NAN] {
            let solver = RungeKuttaSolver::new(step, false);
            assert!(matches!(
                solver.mesolve(&h, &plus_ket(), &[0.0, 1.0], &[], None),
                Err(SolverError::InvalidStep(_))
            ));
        }
    }

    #[test]
    fn test_default_expect_uses_state_expectation() {
        let solver = RungeKuttaSolver::default();
        let values = solver
            .expect(&sigmax(), &[plus_ket(), excited_dm()])
            .unwrap();
        assert_relative_eq!(values[0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(values[1].re, 0.0, epsilon = 1e-12);
    }
}
