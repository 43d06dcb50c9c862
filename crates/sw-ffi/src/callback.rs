//! Host callbacks wrapped as right-hand sides.

use std::ffi::c_void;

use sw_integrate::{Real, RhsFailure, RhsFunction};

/// Host right-hand side.
///
/// Called as `f(state, dim, t, params, n_params, out, user_data)`, matching
/// the engine's `(state, time, params)` order. It writes the derivative into
/// `out` (room for `dim` values) and returns the number of components written,
/// or a negative value on failure.
pub type SwRhsCallback = unsafe extern "C" fn(
    state: *const f64,
    dim: usize,
    t: f64,
    params: *const f64,
    n_params: usize,
    out: *mut f64,
    user_data: *mut c_void,
) -> i64;

/// A callback borrowed for the duration of one boundary call.
pub(crate) struct CallbackRhs {
    func: SwRhsCallback,
    user_data: *mut c_void,
}

impl CallbackRhs {
    /// # Safety
    /// `func` must be safe to call with valid buffers for as long as this value
    /// lives, and `user_data` must be whatever `func` expects.
    pub(crate) unsafe fn new(func: SwRhsCallback, user_data: *mut c_void) -> Self {
        Self { func, user_data }
    }

    fn call(&self, state: &[Real], t: Real, params: &[Real]) -> Result<Vec<Real>, RhsFailure> {
        let mut out = vec![Real::NAN; state.len()];
        // SAFETY: `state`, `params` and `out` are live slices of the lengths
        // passed alongside them; the callback contract comes from `new`.
        let written = unsafe {
            (self.func)(
                state.as_ptr(),
                state.len(),
                t,
                params.as_ptr(),
                params.len(),
                out.as_mut_ptr(),
                self.user_data,
            )
        };
        let Ok(written) = usize::try_from(written) else {
            return Err(RhsFailure::new(format!("callback returned status {written}")));
        };
        // Checked on every call, not only the first.
        if written != state.len() {
            return Err(RhsFailure::wrong_shape(state.len(), written));
        }
        Ok(out)
    }
}

impl RhsFunction<Vec<Real>> for CallbackRhs {
    fn eval(&self, state: &Vec<Real>, t: Real, params: &[Real]) -> Result<Vec<Real>, RhsFailure> {
        self.call(state, t, params)
    }
}

impl RhsFunction<Real> for CallbackRhs {
    fn eval(&self, state: &Real, t: Real, params: &[Real]) -> Result<Real, RhsFailure> {
        let out = self.call(std::slice::from_ref(state), t, params)?;
        out.first()
            .copied()
            .ok_or_else(|| RhsFailure::wrong_shape(1, 0))
    }
}
