//! C ABI for the stepwise integration engine.
//!
//! Every entry point borrows the callback and the input buffers for the
//! duration of the call only, and copies the trajectory into caller-owned
//! output buffers. On failure the partial trajectory is still copied and
//! `written_out` reports its length.
//!
//! Scalar entry points write `steps + 1` values into `times_out` and
//! `states_out`. Vector entry points write `steps + 1` times and
//! `(steps + 1) * dim` row-major state values; `capacity` always counts points.

pub mod callback;
pub mod status;

use std::ffi::c_void;

use sw_integrate::{
    Aborted, Euler, IntegrateError, OdeState, Real, Rk4, StepOptions, Stepper, integrate,
    smoke_report,
};

pub use callback::SwRhsCallback;
pub use status::{BoundaryError, SwStatus, status_of};

use callback::CallbackRhs;

/// Caller-owned output buffers.
struct Output {
    times: *mut f64,
    states: *mut f64,
    capacity: usize,
    written: *mut usize,
}

impl Output {
    fn check(&self, needed: usize) -> Result<(), BoundaryError> {
        if self.times.is_null() {
            return Err(BoundaryError::NullPointer { what: "times_out" });
        }
        if self.states.is_null() {
            return Err(BoundaryError::NullPointer { what: "states_out" });
        }
        if self.capacity < needed {
            return Err(BoundaryError::InsufficientCapacity {
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// # Safety
    /// `times` must hold `capacity` values and `states` `capacity * dim`
    /// values; `written` must be null or valid for a write.
    unsafe fn copy_from<S: OdeState>(&self, times: &[Real], states: &[S]) {
        let points = times.len().min(self.capacity);
        for (i, t) in times.iter().take(points).enumerate() {
            // SAFETY: i < capacity.
            unsafe { *self.times.add(i) = *t };
        }
        let mut offset = 0;
        for state in states.iter().take(points) {
            for v in state.components() {
                // SAFETY: offset < points * dim <= capacity * dim.
                unsafe { *self.states.add(offset) = *v };
                offset += 1;
            }
        }
        unsafe { set_written(self.written, points) };
    }
}

/// # Safety
/// `written` must be null or valid for a write.
unsafe fn set_written(written: *mut usize, value: usize) {
    if !written.is_null() {
        // SAFETY: checked for null; validity is the caller's contract.
        unsafe { *written = value };
    }
}

/// # Safety
/// `ptr` must be null only when `len` is zero, otherwise valid for `len` reads.
unsafe fn borrow_slice<'a>(
    ptr: *const f64,
    len: usize,
    what: &'static str,
) -> Result<&'a [f64], BoundaryError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(BoundaryError::NullPointer { what });
    }
    // SAFETY: non-null and valid for `len` reads per the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

fn step_options(steps: i64, dt: f64) -> Result<StepOptions, BoundaryError> {
    let steps = usize::try_from(steps)
        .ok()
        .filter(|&s| s > 0)
        .ok_or(IntegrateError::InvalidStepCount { steps })?;
    let opts = StepOptions::new(steps, dt);
    opts.validate()?;
    Ok(opts)
}

/// Shared body of every solve entry point.
///
/// # Safety
/// Pointer arguments must satisfy the contracts documented on the public
/// entry points.
#[allow(clippy::too_many_arguments)]
unsafe fn solve_into<M, S>(
    stepper: &M,
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: S,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    out: Output,
) -> SwStatus
where
    M: Stepper,
    S: OdeState,
    CallbackRhs: sw_integrate::RhsFunction<S>,
{
    unsafe { set_written(out.written, 0) };

    let prepared = (|| {
        let opts = step_options(steps, dt)?;
        let func = rhs.ok_or(BoundaryError::NullPointer { what: "rhs" })?;
        // SAFETY: forwarded from the entry point's contract.
        let params = unsafe { borrow_slice(params, n_params, "params")? };
        out.check(opts.steps + 1)?;
        Ok::<_, BoundaryError>((opts, func, params))
    })();

    let (opts, func, params) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return e.status(),
    };

    // SAFETY: the callback is only used inside this call.
    let callback = unsafe { CallbackRhs::new(func, user_data) };
    match integrate(stepper, &callback, y0, params, &opts) {
        Ok(trajectory) => {
            unsafe { out.copy_from(trajectory.times(), trajectory.states()) };
            SwStatus::Ok
        }
        Err(Aborted { trajectory, error }) => {
            unsafe { out.copy_from(trajectory.times(), trajectory.states()) };
            status_of(&error)
        }
    }
}

/// Integrate a scalar ODE with explicit Euler from `t = 0`.
///
/// # Safety
/// - `rhs` must follow the [`SwRhsCallback`] contract; `user_data` is passed
///   through untouched.
/// - `params` must be valid for `n_params` reads (may be null when zero).
/// - `times_out` and `states_out` must be valid for `capacity` writes.
/// - `written_out` must be null or valid for a write.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sw_solve_scalar_euler(
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: f64,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    times_out: *mut f64,
    states_out: *mut f64,
    capacity: usize,
    written_out: *mut usize,
) -> i32 {
    let out = Output {
        times: times_out,
        states: states_out,
        capacity,
        written: written_out,
    };
    unsafe { solve_into(&Euler, rhs, user_data, y0, steps, dt, params, n_params, out) as i32 }
}

/// Integrate a scalar ODE with classical RK4 from `t = 0`.
///
/// # Safety
/// Same contract as [`sw_solve_scalar_euler`].
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sw_solve_scalar_rk4(
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: f64,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    times_out: *mut f64,
    states_out: *mut f64,
    capacity: usize,
    written_out: *mut usize,
) -> i32 {
    let out = Output {
        times: times_out,
        states: states_out,
        capacity,
        written: written_out,
    };
    unsafe { solve_into(&Rk4, rhs, user_data, y0, steps, dt, params, n_params, out) as i32 }
}

/// # Safety
/// `y0` must be valid for `dim` reads and outputs sized per the vector
/// contract.
#[allow(clippy::too_many_arguments)]
unsafe fn solve_vector<M: Stepper>(
    stepper: &M,
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: *const f64,
    dim: usize,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    out: Output,
) -> i32 {
    if dim == 0 {
        unsafe { set_written(out.written, 0) };
        return SwStatus::InvalidArgument as i32;
    }
    let y0 = match unsafe { borrow_slice(y0, dim, "y0") } {
        Ok(y0) => y0.to_vec(),
        Err(e) => {
            unsafe { set_written(out.written, 0) };
            return e.status() as i32;
        }
    };
    unsafe { solve_into(stepper, rhs, user_data, y0, steps, dt, params, n_params, out) as i32 }
}

/// Integrate a `dim`-dimensional ODE with explicit Euler from `t = 0`.
///
/// # Safety
/// As [`sw_solve_scalar_euler`], plus `y0` valid for `dim` reads and
/// `states_out` valid for `capacity * dim` writes.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sw_solve_euler(
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: *const f64,
    dim: usize,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    times_out: *mut f64,
    states_out: *mut f64,
    capacity: usize,
    written_out: *mut usize,
) -> i32 {
    let out = Output {
        times: times_out,
        states: states_out,
        capacity,
        written: written_out,
    };
    unsafe { solve_vector(&Euler, rhs, user_data, y0, dim, steps, dt, params, n_params, out) }
}

/// Integrate a `dim`-dimensional ODE with classical RK4 from `t = 0`.
///
/// # Safety
/// Same contract as [`sw_solve_euler`].
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sw_solve_rk4(
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: *const f64,
    dim: usize,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
    times_out: *mut f64,
    states_out: *mut f64,
    capacity: usize,
    written_out: *mut usize,
) -> i32 {
    let out = Output {
        times: times_out,
        states: states_out,
        capacity,
        written: written_out,
    };
    unsafe { solve_vector(&Rk4, rhs, user_data, y0, dim, steps, dt, params, n_params, out) }
}

/// Run a short Euler and RK4 integration and print every step to stdout.
///
/// # Safety
/// `rhs` and `params` follow the [`sw_solve_scalar_euler`] contract.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sw_smoke_test(
    rhs: Option<SwRhsCallback>,
    user_data: *mut c_void,
    y0: f64,
    steps: i64,
    dt: f64,
    params: *const f64,
    n_params: usize,
) -> i32 {
    let prepared = (|| {
        let opts = step_options(steps, dt)?;
        let func = rhs.ok_or(BoundaryError::NullPointer { what: "rhs" })?;
        // SAFETY: forwarded from this function's contract.
        let params = unsafe { borrow_slice(params, n_params, "params")? };
        Ok::<_, BoundaryError>((opts, func, params))
    })();
    let (opts, func, params) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => return e.status() as i32,
    };

    // SAFETY: the callback is only used inside this call.
    let callback = unsafe { CallbackRhs::new(func, user_data) };
    match smoke_report::<CallbackRhs>(&callback, y0, opts.steps, opts.dt, params) {
        Ok(report) => {
            println!("{report}");
            SwStatus::Ok as i32
        }
        Err(e) => {
            println!("smoke test failed: {e}");
            status_of(&e) as i32
        }
    }
}
