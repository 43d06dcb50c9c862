//! Fixed-step explicit steppers.

use sw_core::{OdeState, Real};

use crate::error::IntegrateResult;
use crate::rhs::{RhsEvaluator, RhsFunction};

/// Trait for single-step advance rules.
///
/// Steppers are stateless: the same inputs always produce the same next
/// state. The integrator loop is generic over this trait, so the choice of
/// method is resolved at compile time.
pub trait Stepper {
    /// Short lowercase method name.
    const NAME: &'static str;

    /// Right-hand side evaluations per step.
    const RHS_EVALS_PER_STEP: usize;

    /// Global order of accuracy.
    const ORDER: u32;

    /// Advance `state` from `t` to `t + dt`.
    fn advance<S, R>(
        &self,
        state: &S,
        t: Real,
        dt: Real,
        rhs: &mut RhsEvaluator<'_, S, R>,
        params: &[Real],
    ) -> IntegrateResult<S>
    where
        S: OdeState,
        R: RhsFunction<S> + ?Sized;
}

/// Forward Euler (explicit, 1st order).
/// Calls rhs() once per step.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euler;

impl Stepper for Euler {
    const NAME: &'static str = "euler";
    const RHS_EVALS_PER_STEP: usize = 1;
    const ORDER: u32 = 1;

    fn advance<S, R>(
        &self,
        state: &S,
        t: Real,
        dt: Real,
        rhs: &mut RhsEvaluator<'_, S, R>,
        params: &[Real],
    ) -> IntegrateResult<S>
    where
        S: OdeState,
        R: RhsFunction<S> + ?Sized,
    {
        let dydt = rhs.evaluate(state, t, params)?;
        Ok(state.add_scaled(dt, &dydt))
    }
}

/// Classical RK4 (Runge-Kutta 4th order) stepper.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rk4;

impl Stepper for Rk4 {
    const NAME: &'static str = "rk4";
    const RHS_EVALS_PER_STEP: usize = 4;
    const ORDER: u32 = 4;

    fn advance<S, R>(
        &self,
        state: &S,
        t: Real,
        dt: Real,
        rhs: &mut RhsEvaluator<'_, S, R>,
        params: &[Real],
    ) -> IntegrateResult<S>
    where
        S: OdeState,
        R: RhsFunction<S> + ?Sized,
    {
        let half_dt = 0.5 * dt;

        let k1 = rhs.evaluate(state, t, params)?;
        let k2 = rhs.evaluate(&state.add_scaled(half_dt, &k1), t + half_dt, params)?;
        let k3 = rhs.evaluate(&state.add_scaled(half_dt, &k2), t + half_dt, params)?;
        let k4 = rhs.evaluate(&state.add_scaled(dt, &k3), t + dt, params)?;

        // Combine: y_new = y + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = k1
            .add_scaled(2.0, &k2)
            .add_scaled(2.0, &k3)
            .add_scaled(1.0, &k4);

        Ok(state.add_scaled(dt / 6.0, &k_sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(_y: &Real, t: Real, _p: &[Real]) -> Real {
        t
    }

    fn decay(y: &Real, _t: Real, p: &[Real]) -> Real {
        -p[0] * y
    }

    #[test]
    fn euler_single_step() {
        let mut rhs = RhsEvaluator::new(&decay);
        let next = Euler.advance(&10.0, 0.0, 0.1, &mut rhs, &[2.0]).unwrap();
        assert!((next - 8.0).abs() < 1e-12);
        assert_eq!(rhs.evaluations(), Euler::RHS_EVALS_PER_STEP);
    }

    #[test]
    fn rk4_is_exact_for_quadratic_solutions() {
        // y' = t has y = t^2 / 2, which Simpson's rule integrates exactly.
        let mut rhs = RhsEvaluator::new(&linear);
        let next = Rk4.advance(&0.0, 1.0, 0.5, &mut rhs, &[]).unwrap();
        let exact = (1.5_f64.powi(2) - 1.0) / 2.0;
        assert!((next - exact).abs() < 1e-14);
        assert_eq!(rhs.evaluations(), Rk4::RHS_EVALS_PER_STEP);
    }

    #[test]
    fn rk4_matches_taylor_expansion() {
        // For y' = -y one RK4 step multiplies by 1 - h + h^2/2 - h^3/6 + h^4/24.
        let h: Real = 0.2;
        let mut rhs = RhsEvaluator::new(&decay);
        let next = Rk4.advance(&1.0, 0.0, h, &mut rhs, &[1.0]).unwrap();
        let factor = 1.0 - h + h.powi(2) / 2.0 - h.powi(3) / 6.0 + h.powi(4) / 24.0;
        assert!((next - factor).abs() < 1e-14);
    }

    #[test]
    fn steppers_work_on_vector_states() {
        let rotate = |y: &[Real; 2], _t: Real, _p: &[Real]| [y[1], -y[0]];
        let mut rhs = RhsEvaluator::new(&rotate);
        let next = Euler.advance(&[1.0, 0.0], 0.0, 0.1, &mut rhs, &[]).unwrap();
        assert_eq!(next, [1.0, -0.1]);
    }
}
