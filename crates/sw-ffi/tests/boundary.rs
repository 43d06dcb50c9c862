//! Calls the C entry points the way a host harness would.

use std::ffi::c_void;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use stepwise::{
    SwStatus, sw_smoke_test, sw_solve_euler, sw_solve_rk4, sw_solve_scalar_euler,
    sw_solve_scalar_rk4,
};
use sw_integrate::{models, solve_scalar_ode_euler, solve_scalar_ode_rk4};

/// dy/dt = p0 * (p1 - y); counts calls through `user_data` when non-null.
unsafe extern "C" fn relaxation_cb(
    state: *const f64,
    dim: usize,
    _t: f64,
    params: *const f64,
    n_params: usize,
    out: *mut f64,
    user_data: *mut c_void,
) -> i64 {
    assert_eq!(dim, 1);
    assert_eq!(n_params, 2);
    unsafe {
        if !user_data.is_null() {
            (*(user_data as *const AtomicUsize)).fetch_add(1, Ordering::Relaxed);
        }
        let y = *state;
        *out = *params * (*params.add(1) - y);
    }
    1
}

/// Rotation [y1, -y0].
unsafe extern "C" fn rotation_cb(
    state: *const f64,
    dim: usize,
    _t: f64,
    _params: *const f64,
    _n_params: usize,
    out: *mut f64,
    _user_data: *mut c_void,
) -> i64 {
    unsafe {
        *out = *state.add(1);
        *out.add(1) = -*state;
    }
    dim as i64
}

/// Writes fewer components than the state has.
unsafe extern "C" fn short_cb(
    state: *const f64,
    _dim: usize,
    _t: f64,
    _params: *const f64,
    _n_params: usize,
    out: *mut f64,
    _user_data: *mut c_void,
) -> i64 {
    unsafe { *out = -*state };
    1
}

/// Fails once t exceeds 0.25.
unsafe extern "C" fn failing_cb(
    state: *const f64,
    _dim: usize,
    t: f64,
    _params: *const f64,
    _n_params: usize,
    out: *mut f64,
    _user_data: *mut c_void,
) -> i64 {
    if t > 0.25 {
        return -1;
    }
    unsafe { *out = -*state };
    1
}

/// Full derivative on the first call, one component short afterwards. Counts
/// calls through `user_data`.
unsafe extern "C" fn shrinking_cb(
    state: *const f64,
    dim: usize,
    _t: f64,
    _params: *const f64,
    _n_params: usize,
    out: *mut f64,
    user_data: *mut c_void,
) -> i64 {
    let call = unsafe { (*(user_data as *const AtomicUsize)).fetch_add(1, Ordering::Relaxed) };
    let len = if call == 0 { dim } else { dim - 1 };
    for i in 0..len {
        unsafe { *out.add(i) = -0.1 * *state.add(i) };
    }
    len as i64
}

/// Writes nothing and reports zero components.
unsafe extern "C" fn empty_cb(
    _state: *const f64,
    _dim: usize,
    _t: f64,
    _params: *const f64,
    _n_params: usize,
    _out: *mut f64,
    _user_data: *mut c_void,
) -> i64 {
    0
}

/// Returns an infinite derivative once t exceeds 0.25.
unsafe extern "C" fn blow_up_cb(
    state: *const f64,
    _dim: usize,
    t: f64,
    _params: *const f64,
    _n_params: usize,
    out: *mut f64,
    _user_data: *mut c_void,
) -> i64 {
    unsafe { *out = if t > 0.25 { f64::INFINITY } else { -*state } };
    1
}

const PARAMS: [f64; 2] = [0.02, 5.0];

fn run_scalar(
    rk4: bool,
    steps: i64,
    dt: f64,
    counter: Option<&AtomicUsize>,
) -> (i32, Vec<f64>, Vec<f64>) {
    let capacity = steps.max(0) as usize + 1;
    let mut times = vec![0.0; capacity];
    let mut states = vec![0.0; capacity];
    let mut written = usize::MAX;
    let user_data = counter.map_or(ptr::null_mut(), |c| {
        c as *const AtomicUsize as *mut c_void
    });
    let entry = if rk4 {
        sw_solve_scalar_rk4
    } else {
        sw_solve_scalar_euler
    };
    let status = unsafe {
        entry(
            Some(relaxation_cb),
            user_data,
            10.0,
            steps,
            dt,
            PARAMS.as_ptr(),
            PARAMS.len(),
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            capacity,
            &mut written,
        )
    };
    let written = written.min(capacity);
    times.truncate(written);
    states.truncate(written);
    (status, times, states)
}

#[test]
fn scalar_entry_points_match_native_engine() {
    let (status, times, states) = run_scalar(false, 50, 0.1, None);
    assert_eq!(status, SwStatus::Ok as i32);
    let native = solve_scalar_ode_euler(&models::relaxation, 10.0, 50, 0.1, &PARAMS).unwrap();
    assert_eq!(times, native.times());
    assert_eq!(states, native.states());

    let (status, times, states) = run_scalar(true, 50, 0.1, None);
    assert_eq!(status, SwStatus::Ok as i32);
    let native = solve_scalar_ode_rk4(&models::relaxation, 10.0, 50, 0.1, &PARAMS).unwrap();
    assert_eq!(times, native.times());
    assert_eq!(states, native.states());
}

#[test]
fn callback_invocations_follow_method_cost() {
    let counter = AtomicUsize::new(0);
    run_scalar(false, 20, 0.1, Some(&counter));
    assert_eq!(counter.swap(0, Ordering::Relaxed), 20);
    run_scalar(true, 20, 0.1, Some(&counter));
    assert_eq!(counter.load(Ordering::Relaxed), 80);
}

#[test]
fn invalid_arguments_are_rejected_before_calling_back() {
    let counter = AtomicUsize::new(0);

    let (status, times, _) = run_scalar(true, 0, 0.1, Some(&counter));
    assert_eq!(status, SwStatus::InvalidStepCount as i32);
    assert!(times.is_empty());

    let (status, _, _) = run_scalar(true, -5, 0.1, Some(&counter));
    assert_eq!(status, SwStatus::InvalidStepCount as i32);

    let (status, _, _) = run_scalar(false, 10, 0.0, Some(&counter));
    assert_eq!(status, SwStatus::InvalidStepSize as i32);

    let (status, _, _) = run_scalar(false, 10, f64::INFINITY, Some(&counter));
    assert_eq!(status, SwStatus::InvalidStepSize as i32);

    assert_eq!(counter.load(Ordering::Relaxed), 0);
}

#[test]
fn null_callback_and_small_buffers_are_invalid_arguments() {
    let mut times = [0.0; 4];
    let mut states = [0.0; 4];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_scalar_euler(
            None,
            ptr::null_mut(),
            1.0,
            3,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            4,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::InvalidArgument as i32);

    let status = unsafe {
        sw_solve_scalar_euler(
            Some(relaxation_cb),
            ptr::null_mut(),
            1.0,
            10,
            0.1,
            PARAMS.as_ptr(),
            PARAMS.len(),
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            4,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::InvalidArgument as i32);
    assert_eq!(written, 0);
}

#[test]
fn vector_entry_point_writes_row_major_states() {
    let y0 = [1.0, 0.0];
    let steps = 3usize;
    let mut times = vec![0.0; steps + 1];
    let mut states = vec![0.0; (steps + 1) * 2];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_euler(
            Some(rotation_cb),
            ptr::null_mut(),
            y0.as_ptr(),
            2,
            steps as i64,
            0.5,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            steps + 1,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::Ok as i32);
    assert_eq!(written, 4);
    assert_eq!(times, vec![0.0, 0.5, 1.0, 1.5]);
    // Euler on the rotation: [x, v] -> [x + h v, v - h x].
    assert_eq!(&states[..6], &[1.0, 0.0, 1.0, -0.5, 0.75, -1.0]);
}

#[test]
fn short_derivative_is_a_shape_mismatch() {
    let y0 = [1.0, 2.0];
    let mut times = vec![0.0; 6];
    let mut states = vec![0.0; 12];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_rk4(
            Some(short_cb),
            ptr::null_mut(),
            y0.as_ptr(),
            2,
            5,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            6,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::ShapeMismatch as i32);
    assert_eq!(written, 1);
    assert_eq!(&states[..2], &y0);
}

#[test]
fn derivative_shrinking_mid_run_is_a_shape_mismatch() {
    let calls = AtomicUsize::new(0);
    let y0 = [1.0, 2.0];
    let mut times = vec![0.0; 4];
    let mut states = vec![0.0; 8];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_euler(
            Some(shrinking_cb),
            &calls as *const AtomicUsize as *mut c_void,
            y0.as_ptr(),
            2,
            3,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            4,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::ShapeMismatch as i32);
    // The first step completes; the second call writes one component.
    assert_eq!(written, 2);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert_eq!(&states[..2], &y0);
    assert!((states[2] - 0.99).abs() < 1e-12);
    assert!((states[3] - 1.98).abs() < 1e-12);
}

#[test]
fn scalar_callback_writing_nothing_is_a_shape_mismatch() {
    let mut times = [0.0; 4];
    let mut states = [0.0; 4];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_scalar_euler(
            Some(empty_cb),
            ptr::null_mut(),
            1.0,
            3,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            4,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::ShapeMismatch as i32);
    assert_eq!(written, 1);
    assert_eq!(states[0], 1.0);
}

#[test]
fn non_finite_derivative_returns_partial_trajectory() {
    let mut times = vec![0.0; 11];
    let mut states = vec![0.0; 11];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_scalar_euler(
            Some(blow_up_cb),
            ptr::null_mut(),
            1.0,
            10,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            11,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::NonFiniteResult as i32);
    assert_eq!(written, 4);
    assert!(states[..4].iter().all(|y| y.is_finite()));
    assert!((states[1] - 0.9).abs() < 1e-12);
}

#[test]
fn callback_failure_returns_partial_trajectory() {
    let mut times = vec![0.0; 11];
    let mut states = vec![0.0; 11];
    let mut written = 0usize;

    let status = unsafe {
        sw_solve_scalar_euler(
            Some(failing_cb),
            ptr::null_mut(),
            1.0,
            10,
            0.1,
            ptr::null(),
            0,
            times.as_mut_ptr(),
            states.as_mut_ptr(),
            11,
            &mut written,
        )
    };
    assert_eq!(status, SwStatus::CallbackFailed as i32);
    // Evaluations at t = 0.0, 0.1, 0.2 succeed; t = 0.3 fails.
    assert_eq!(written, 4);
    assert_eq!(&times[..4], &[0.0, 0.1, 0.2, 3.0 * 0.1]);
}

#[test]
fn smoke_test_reports_status() {
    let status = unsafe {
        sw_smoke_test(
            Some(relaxation_cb),
            ptr::null_mut(),
            10.0,
            3,
            0.01,
            PARAMS.as_ptr(),
            PARAMS.len(),
        )
    };
    assert_eq!(status, SwStatus::Ok as i32);

    let status = unsafe {
        sw_smoke_test(
            Some(relaxation_cb),
            ptr::null_mut(),
            10.0,
            0,
            0.01,
            PARAMS.as_ptr(),
            PARAMS.len(),
        )
    };
    assert_eq!(status, SwStatus::InvalidStepCount as i32);
}
