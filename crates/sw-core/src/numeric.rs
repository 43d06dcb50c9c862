use crate::CoreError;

/// Floating point type for states, times and parameters.
pub type Real = f64;

/// `v` unchanged when finite, otherwise a [`CoreError::NonFinite`] naming `what`.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Time of sample `index` on a uniform grid.
///
/// Uses the multiply form so rounding error does not accumulate with the
/// sample index.
#[inline]
pub fn grid_time(t0: Real, dt: Real, index: usize) -> Real {
    t0 + index as Real * dt
}

/// Largest absolute element-wise difference between two equally long slices.
pub fn max_abs_diff(a: &[Real], b: &[Real]) -> Result<Real, CoreError> {
    if a.len() != b.len() {
        return Err(CoreError::DimensionMismatch {
            what: "max_abs_diff operands",
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, Real::max))
}

/// Observed convergence order from two errors whose step sizes differ by
/// `refinement` (e.g. 2.0 when dt was halved).
pub fn observed_order(err_coarse: Real, err_fine: Real, refinement: Real) -> Option<Real> {
    if err_coarse <= 0.0 || err_fine <= 0.0 || refinement <= 1.0 {
        return None;
    }
    let order = (err_coarse / err_fine).ln() / refinement.ln();
    order.is_finite().then_some(order)
}
