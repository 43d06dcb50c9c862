//! Trajectory results.

use sw_core::{OdeState, Real};

/// Parallel time and state sequences produced by one run.
///
/// Immutable once returned: the integrator hands ownership to the caller and
/// keeps nothing behind.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory<S> {
    times: Vec<Real>,
    states: Vec<S>,
    dt: Real,
    rhs_evaluations: usize,
}

impl<S> Trajectory<S> {
    pub(crate) fn with_capacity(capacity: usize, dt: Real) -> Self {
        Self {
            times: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
            dt,
            rhs_evaluations: 0,
        }
    }

    pub(crate) fn push(&mut self, t: Real, state: S) {
        self.times.push(t);
        self.states.push(state);
    }

    pub(crate) fn set_rhs_evaluations(&mut self, count: usize) {
        self.rhs_evaluations = count;
    }

    /// Number of recorded (time, state) points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Number of completed steps (points minus the initial condition).
    pub fn steps(&self) -> usize {
        self.len().saturating_sub(1)
    }

    pub fn times(&self) -> &[Real] {
        &self.times
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Step size the run used; the first interval for runs on sample times.
    pub fn dt(&self) -> Real {
        self.dt
    }

    /// Right-hand side evaluations spent producing this trajectory.
    pub fn rhs_evaluations(&self) -> usize {
        self.rhs_evaluations
    }

    pub fn last(&self) -> Option<(Real, &S)> {
        Some((*self.times.last()?, self.states.last()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Real, &S)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    pub fn into_parts(self) -> (Vec<Real>, Vec<S>) {
        (self.times, self.states)
    }
}

impl<S: OdeState> Trajectory<S> {
    /// Dimension of the recorded states, or `None` for an empty trajectory.
    pub fn dim(&self) -> Option<usize> {
        self.states.first().map(OdeState::dim)
    }

    /// One row of components per recorded state.
    pub fn state_rows(&self) -> Vec<Vec<Real>> {
        self.states.iter().map(|s| s.components().to_vec()).collect()
    }

    /// States laid out row-major in a single buffer.
    pub fn flatten_states(&self) -> Vec<Real> {
        self.states
            .iter()
            .flat_map(|s| s.components().iter().copied())
            .collect()
    }

    /// Converts typed states into dynamically sized ones.
    pub fn into_dynamic(self) -> Trajectory<Vec<Real>> {
        Trajectory {
            states: self.states.iter().map(|s| s.components().to_vec()).collect(),
            times: self.times,
            dt: self.dt,
            rhs_evaluations: self.rhs_evaluations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trajectory<[Real; 2]> {
        let mut traj = Trajectory::with_capacity(3, 0.5);
        traj.push(0.0, [1.0, 2.0]);
        traj.push(0.5, [3.0, 4.0]);
        traj.set_rhs_evaluations(4);
        traj
    }

    #[test]
    fn accessors() {
        let traj = sample();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.steps(), 1);
        assert_eq!(traj.dim(), Some(2));
        assert_eq!(traj.rhs_evaluations(), 4);
        assert_eq!(traj.last(), Some((0.5, &[3.0, 4.0])));
        assert_eq!(traj.iter().count(), 2);
    }

    #[test]
    fn flattening() {
        let traj = sample();
        assert_eq!(traj.flatten_states(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(traj.state_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);

        let dynamic = traj.into_dynamic();
        assert_eq!(dynamic.states()[1], vec![3.0, 4.0]);
        assert_eq!(dynamic.rhs_evaluations(), 4);
    }

    #[test]
    fn empty_trajectory() {
        let traj: Trajectory<Real> = Trajectory::with_capacity(0, 0.1);
        assert!(traj.is_empty());
        assert_eq!(traj.steps(), 0);
        assert_eq!(traj.last(), None);
        assert_eq!(traj.dim(), None);
    }
}
