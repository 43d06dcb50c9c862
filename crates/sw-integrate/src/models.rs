//! Built-in right-hand sides.
//!
//! All models take `(state, time, params)`. Each indexes `params` directly
//! and panics when given fewer parameters than documented; the config layer
//! checks parameter counts before dispatching here.

use sw_core::Real;

/// `dy/dt = -p0 * y`. Parameters: `[rate]`.
///
/// # Panics
/// If `p` has fewer than one parameter.
pub fn exponential_decay(y: &Real, _t: Real, p: &[Real]) -> Real {
    -p[0] * y
}

/// `dy/dt = p0 * (p1 - y)`: relaxation towards `p1`. Parameters: `[rate, target]`.
///
/// # Panics
/// If `p` has fewer than two parameters.
pub fn relaxation(y: &Real, _t: Real, p: &[Real]) -> Real {
    p[0] * (p[1] - y)
}

/// `dy/dt = p0 * y * (1 - y / p1)`. Parameters: `[rate, capacity]`.
///
/// # Panics
/// If `p` has fewer than two parameters.
pub fn logistic(y: &Real, _t: Real, p: &[Real]) -> Real {
    p[0] * y * (1.0 - y / p[1])
}

/// Undamped oscillator `x'' = -p0^2 x` as `[x, v]`. Parameters: `[omega]`.
///
/// # Panics
/// If `p` has fewer than one parameter.
pub fn harmonic_oscillator(y: &[Real; 2], _t: Real, p: &[Real]) -> [Real; 2] {
    [y[1], -p[0] * p[0] * y[0]]
}

/// Lorenz system. Parameters: `[sigma, rho, beta]`.
///
/// # Panics
/// If `p` has fewer than three parameters.
pub fn lorenz(y: &[Real; 3], _t: Real, p: &[Real]) -> [Real; 3] {
    let [x, yy, z] = *y;
    [p[0] * (yy - x), x * (p[1] - z) - yy, x * yy - p[2] * z]
}
