// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! The segmented evolution runner.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::result::{ExpectationRow, ExpectationTable, SimulationResult, Trajectory};
use super::segment::Segment;
use crate::error::{Error, Result, SolverError};
use crate::lindblad::CollapseOperator;
use crate::quantum::{Operator, QuantumState};
use crate::solver::MasterEquationSolver;
use crate::validation::validate_experiment;

/// Relative tolerance when checking that consecutive windows meet.
const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Operator whose expectation value is tracked over the trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    pub label: String,
    pub operator: Operator,
}

impl Observable {
    pub fn new(label: impl Into<String>, operator: Operator) -> Self {
        Self {
            label: label.into(),
            operator,
        }
    }
}

/// Sequence of time segments sharing one static generator.
///
/// Segments run strictly in order: the final state of segment *i* seeds
/// segment *i+1*, and the boundary point is recorded only once in the
/// stitched [`Trajectory`]. Running never mutates the experiment.
#[derive(Debug, Clone)]
pub struct Experiment {
    generator: Operator,
    segments: Vec<Segment>,
    initial_state: Option<QuantumState>,
    collapse_ops: Vec<CollapseOperator>,
    observables: Vec<Observable>,
}

impl Experiment {
    pub fn new(generator: Operator) -> Self {
        Self {
            generator,
            segments: Vec::new(),
            initial_state: None,
            collapse_ops: Vec::new(),
            observables: Vec::new(),
        }
    }

    pub fn generator(&self) -> &Operator {
        &self.generator
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn initial_state(&self) -> Option<&QuantumState> {
        self.initial_state.as_ref()
    }

    pub fn collapse_ops(&self) -> &[CollapseOperator] {
        &self.collapse_ops
    }

    pub fn observables(&self) -> &[Observable] {
        &self.observables
    }

    /// Replace the segment list.
    pub fn define_segments(&mut self, segments: Vec<Segment>) -> &mut Self {
        self.segments = segments;
        self
    }

    pub fn push_segment(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    /// Set the initial state, dissipators and observables. Checked at run time.
    pub fn setup(
        &mut self,
        initial_state: impl Into<QuantumState>,
        collapse_ops: Vec<CollapseOperator>,
        observables: Vec<Observable>,
    ) -> &mut Self {
        self.initial_state = Some(initial_state.into());
        self.collapse_ops = collapse_ops;
        self.observables = observables;
        self
    }

    /// Total number of trajectory points a run will produce.
    pub fn expected_len(&self) -> usize {
        let total: usize = self.segments.iter().map(|s| s.window.num_points).sum();
        (total + 1).saturating_sub(self.segments.len())
    }

    /// Evolve through every segment and stitch the results.
    pub fn simulate(&self, solver: &dyn MasterEquationSolver) -> Result<Trajectory> {
        validate_experiment(self)?;
        let Some(initial) = self.initial_state.as_ref() else {
            return Err(Error::Config("experiment has no initial state".into()));
        };

        let started = Instant::now();
        info!(
            solver = solver.name(),
            segments = self.segments.len(),
            dim = self.generator.nrows(),
            collapse_ops = self.collapse_ops.len(),
            "Starting segmented simulation"
        );

        let capacity = self.expected_len();
        let mut times = Vec::with_capacity(capacity);
        let mut states = Vec::with_capacity(capacity);
        let mut segment_starts = Vec::with_capacity(self.segments.len());

        let mut current = initial.clone();
        let mut closing_time: Option<f64> = None;

        for (index, segment) in self.segments.iter().enumerate() {
            let tlist = segment.sample_times();
            let (first, last) = match (tlist.first(), tlist.last()) {
                (Some(&first), Some(&last)) => (first, last),
                _ => return Err(SolverError::EmptyTimeList.into()),
            };

            if let Some(previous) = closing_time {
                let scale = previous.abs().max(first.abs()).max(1.0);
                if (first - previous).abs() > BOUNDARY_TOLERANCE * scale {
                    warn!(
                        segment = index,
                        previous_stop = previous,
                        start = first,
                        "Segment does not start where the previous one stopped"
                    );
                }
            }

            debug!(
                segment = index,
                driven = segment.is_driven(),
                start = first,
                stop = last,
                points = tlist.len(),
                "Simulating segment"
            );

            let hamiltonian = segment.hamiltonian(&self.generator);
            let output = solver.mesolve(
                &hamiltonian,
                &current,
                &tlist,
                &self.collapse_ops,
                segment.args(),
            )?;

            if output.states.len() != tlist.len() {
                return Err(SolverError::OutputLength {
                    expected: tlist.len(),
                    actual: output.states.len(),
                }
                .into());
            }

            let mut segment_states = output.states;
            let Some(final_state) = segment_states.pop() else {
                return Err(SolverError::EmptyTimeList.into());
            };

            segment_starts.push(times.len());
            times.extend_from_slice(&tlist[..tlist.len() - 1]);
            states.extend(segment_states);

            current = final_state;
            closing_time = Some(last);
        }

        let Some(closing_time) = closing_time else {
            return Err(Error::Config("experiment has no segments".into()));
        };
        times.push(closing_time);
        states.push(current);

        info!(
            points = times.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Simulation complete"
        );

        Ok(Trajectory::new(times, states, segment_starts))
    }

    /// Expectation value of every observable at every trajectory point.
    pub fn calculate_expects(
        &self,
        solver: &dyn MasterEquationSolver,
        trajectory: &Trajectory,
    ) -> Result<ExpectationTable> {
        let mut rows = Vec::with_capacity(self.observables.len());
        for observable in &self.observables {
            let values = solver.expect(&observable.operator, trajectory.states())?;
            if values.len() != trajectory.len() {
                return Err(SolverError::OutputLength {
                    expected: trajectory.len(),
                    actual: values.len(),
                }
                .into());
            }
            rows.push(ExpectationRow {
                label: observable.label.clone(),
                values,
            });
        }
        debug!(observables = rows.len(), "Computed expectation values");
        Ok(ExpectationTable::new(rows))
    }

    /// Simulate, then compute expectation values.
    pub fn run(&self, solver: &dyn MasterEquationSolver) -> Result<SimulationResult> {
        let trajectory = self.simulate(solver)?;
        let expectations = self.calculate_expects(solver, &trajectory)?;
        Ok(SimulationResult {
            trajectory,
            expectations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::Perturbation;
    use crate::lindblad::RungeKuttaSolver;
    use crate::pulse::{PulseArgs, PulseShape};
    use crate::quantum::{basis, sigmax, sigmaz};
    use crate::test_utils::{FailingSolver, StampSolver, TruncatingSolver};
    use approx::assert_relative_eq;

    fn free_experiment(segments: Vec<Segment>) -> Experiment {
        let mut exp = Experiment::new(sigmaz());
        exp.define_segments(segments);
        exp.setup(basis(2, 0).unwrap(), vec![], vec![]);
        exp
    }

    #[test]
    fn test_single_segment_trajectory() {
        let exp = free_experiment(vec![Segment::free(0.0, 1.0, 11)]);
        let solver = StampSolver::new();
        let traj = exp.simulate(&solver).unwrap();

        assert_eq!(traj.len(), 11);
        assert_eq!(traj.times()[0], 0.0);
        assert_eq!(traj.times()[10], 1.0);
        assert_eq!(traj.segment_starts(), &[0]);
        assert_eq!(solver.calls().len(), 1);
    }

    #[test]
    fn test_two_segments_share_boundary_point() {
        let exp = free_experiment(vec![
            Segment::free(0.0, 1.0, 11),
            Segment::free(1.0, 2.0, 11),
        ]);
        let traj = exp.simulate(&StampSolver::new()).unwrap();

        assert_eq!(traj.len(), 21);
        assert_eq!(traj.times()[10], 1.0);
        assert_eq!(traj.times()[20], 2.0);
        assert_eq!(traj.segment_starts(), &[0, 10]);
        assert_eq!(traj.times().iter().filter(|&&t| t == 1.0).count(), 1);
    }

    #[test]
    fn test_length_is_sum_minus_boundaries() {
        let exp = free_experiment(vec![
            Segment::free(0.0, 1.0, 5),
            Segment::free(1.0, 3.0, 7),
            Segment::free(3.0, 4.0, 3),
        ]);
        assert_eq!(exp.expected_len(), 5 + 7 + 3 - 2);
        let traj = exp.simulate(&StampSolver::new()).unwrap();
        assert_eq!(traj.len(), 13);
        assert!(traj.times().windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_final_state_seeds_next_segment() {
        let exp = free_experiment(vec![
            Segment::free(0.0, 1.0, 4),
            Segment::free(1.0, 2.0, 4),
            Segment::free(2.0, 3.0, 4),
        ]);
        let solver = StampSolver::new();
        let traj = exp.simulate(&solver).unwrap();
        let calls = solver.calls();

        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].initial, QuantumState::Ket(basis(2, 0).unwrap()));
        assert_eq!(calls[1].initial, StampSolver::stamp(0, 1.0));
        assert_eq!(calls[2].initial, StampSolver::stamp(1, 2.0));

        // Boundary state is the one returned by the earlier segment.
        assert_eq!(traj.states()[3], StampSolver::stamp(0, 1.0));
        assert_eq!(traj.final_state(), Some(&StampSolver::stamp(2, 3.0)));
    }

    #[test]
    fn test_free_segments_pass_no_args() {
        let mut args = PulseArgs::new();
        args.insert("amplitude".into(), 0.5);
        let drive = Perturbation::from_shape(sigmax(), PulseShape::Constant, args).unwrap();
        let exp = free_experiment(vec![
            Segment::free(0.0, 1.0, 3),
            Segment::driven(drive, 1.0, 2.0, 3),
        ]);
        let solver = StampSolver::new();
        exp.simulate(&solver).unwrap();
        let calls = solver.calls();

        assert!(calls[0].args.is_none());
        assert!(calls[0].constant_hamiltonian);
        assert_eq!(calls[1].args.as_ref().unwrap()["amplitude"], 0.5);
        assert!(!calls[1].constant_hamiltonian);
        assert_eq!(calls[1].tlist, vec![1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_single_point_segment() {
        let exp = free_experiment(vec![Segment::free(0.5, 0.5, 1)]);
        let traj = exp.simulate(&StampSolver::new()).unwrap();
        assert_eq!(traj.times(), &[0.5]);
        assert_eq!(traj.states()[0], QuantumState::Ket(basis(2, 0).unwrap()));
    }

    #[test]
    fn test_empty_segments_is_config_error() {
        let exp = free_experiment(vec![]);
        let err = exp.simulate(&StampSolver::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("no segments"));
    }

    #[test]
    fn test_missing_setup_is_config_error() {
        let mut exp = Experiment::new(sigmaz());
        exp.push_segment(Segment::free(0.0, 1.0, 2));
        assert!(matches!(
            exp.simulate(&StampSolver::new()),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_solver_errors_propagate() {
        let exp = free_experiment(vec![Segment::free(0.0, 1.0, 3)]);
        assert!(matches!(exp.simulate(&FailingSolver), Err(Error::Solver(_))));
        assert!(matches!(
            exp.simulate(&TruncatingSolver),
            Err(Error::Solver(SolverError::OutputLength {
                expected: 3,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_expectation_table_shape() {
        let mut exp = free_experiment(vec![
            Segment::free(0.0, 1.0, 6),
            Segment::free(1.0, 2.0, 6),
        ]);
        exp.setup(
            basis(2, 0).unwrap(),
            vec![],
            vec![Observable::new("sz", sigmaz()), Observable::new("sx", sigmax())],
        );
        let result = exp.run(&RungeKuttaSolver::default()).unwrap();

        assert_eq!(result.trajectory.len(), 11);
        assert_eq!(result.expectations.len(), 2);
        assert_eq!(result.expectations.labels(), vec!["sz", "sx"]);
        for row in result.expectations.rows() {
            assert_eq!(row.values.len(), 11);
        }
        // |0> is an eigenstate of σz.
        for z in &result.expectations.rows()[0].values {
            assert_relative_eq!(z.re, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_zero_observables_gives_empty_table() {
        let exp = free_experiment(vec![Segment::free(0.0, 1.0, 5)]);
        let result = exp.run(&StampSolver::new()).unwrap();
        assert!(result.expectations.is_empty());
        assert_eq!(result.trajectory.len(), 5);
    }

    #[test]
    fn test_rabi_across_segments_matches_single_segment() {
        let mut args = PulseArgs::new();
        args.insert("amplitude".into(), 1.0);
        let drive =
            || Perturbation::from_shape(sigmax(), PulseShape::Constant, args.clone()).unwrap();
        let zero = Operator::zeros((2, 2));

        let mut split = Experiment::new(zero.clone());
        split
            .define_segments(vec![
                Segment::driven(drive(), 0.0, 0.5, 11),
                Segment::driven(drive(), 0.5, 1.0, 11),
            ])
            .setup(basis(2, 0).unwrap(), vec![], vec![Observable::new("sz", sigmaz())]);

        let mut whole = Experiment::new(zero);
        whole
            .define_segments(vec![Segment::driven(drive(), 0.0, 1.0, 21)])
            .setup(basis(2, 0).unwrap(), vec![], vec![Observable::new("sz", sigmaz())]);

        let solver = RungeKuttaSolver::new(1e-3, true);
        let a = split.run(&solver).unwrap();
        let b = whole.run(&solver).unwrap();

        assert_eq!(a.trajectory.len(), b.trajectory.len());
        for (x, y) in a.expectations.rows()[0]
            .values
            .iter()
            .zip(&b.expectations.rows()[0].values)
        {
            assert_relative_eq!(x.re, y.re, epsilon = 1e-8);
        }
        // H = σx rotates |0> to cos(2t) along z.
        let last = a.expectations.rows()[0].values[20].re;
        assert_relative_eq!(last, (2.0f64).cos(), epsilon = 1e-6);
    }

    #[test]
    fn test_runs_do_not_mutate_experiment() {
        let exp = free_experiment(vec![Segment::free(0.0, 1.0, 3)]);
        let a = exp.run(&StampSolver::new()).unwrap();
        let b = exp.run(&StampSolver::new()).unwrap();
        assert_eq!(a, b);
    }
}
