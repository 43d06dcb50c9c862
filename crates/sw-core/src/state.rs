//! State vectors the integrators step over.

use nalgebra::SVector;

use crate::Real;

/// An ordered fixed-size numeric vector.
///
/// The scalar `f64` is the one-dimensional case. Integrators only need
/// `state + h * derivative`, so that is the one arithmetic operation required.
/// Derivatives share the state's type.
pub trait OdeState: Clone {
    /// Components in order.
    fn components(&self) -> &[Real];

    /// Returns `self + h * k`.
    fn add_scaled(&self, h: Real, k: &Self) -> Self;

    /// Number of components.
    fn dim(&self) -> usize {
        self.components().len()
    }

    /// True when no component is NaN or infinite.
    fn is_finite(&self) -> bool {
        self.components().iter().all(|v| v.is_finite())
    }
}

impl OdeState for Real {
    fn components(&self) -> &[Real] {
        std::slice::from_ref(self)
    }

    #[inline]
    fn add_scaled(&self, h: Real, k: &Self) -> Self {
        self + h * k
    }

    fn dim(&self) -> usize {
        1
    }

    fn is_finite(&self) -> bool {
        Real::is_finite(*self)
    }
}

impl<const N: usize> OdeState for [Real; N] {
    fn components(&self) -> &[Real] {
        self
    }

    fn add_scaled(&self, h: Real, k: &Self) -> Self {
        std::array::from_fn(|i| self[i] + h * k[i])
    }

    fn dim(&self) -> usize {
        N
    }
}

/// Dynamically sized state. `add_scaled` zips, so a short derivative yields a
/// short state; the integrator rejects any update that changes the length.
impl OdeState for Vec<Real> {
    fn components(&self) -> &[Real] {
        self
    }

    fn add_scaled(&self, h: Real, k: &Self) -> Self {
        self.iter().zip(k).map(|(y, dy)| y + h * dy).collect()
    }
}

impl<const N: usize> OdeState for SVector<Real, N> {
    fn components(&self) -> &[Real] {
        self.as_slice()
    }

    fn add_scaled(&self, h: Real, k: &Self) -> Self {
        self + k * h
    }

    fn dim(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn scalar_state() {
        let y: Real = 2.0;
        assert_eq!(y.dim(), 1);
        assert_eq!(y.add_scaled(0.5, &4.0), 4.0);
        assert!(!Real::NAN.is_finite());
        assert_eq!(y.components(), &[2.0]);
    }

    #[test]
    fn array_state() {
        let y = [1.0, 2.0, 3.0];
        let k = [1.0, 0.0, -1.0];
        assert_eq!(y.add_scaled(2.0, &k), [3.0, 2.0, 1.0]);
        assert_eq!(OdeState::dim(&y), 3);
        assert!(!OdeState::is_finite(&[1.0, Real::INFINITY]));
    }

    #[test]
    fn vec_state() {
        let y = vec![1.0, 1.0];
        let k = vec![0.5, -0.5];
        assert_eq!(y.add_scaled(2.0, &k), vec![2.0, 0.0]);
        assert_eq!(y.dim(), 2);
    }

    #[test]
    fn nalgebra_state() {
        let y = Vector3::new(1.0, 2.0, 3.0);
        let k = Vector3::new(1.0, 1.0, 1.0);
        let next = y.add_scaled(0.5, &k);
        assert_eq!(next, Vector3::new(1.5, 2.5, 3.5));
        assert_eq!(next.components(), &[1.5, 2.5, 3.5]);
        assert_eq!(OdeState::dim(&next), 3);
    }
}
