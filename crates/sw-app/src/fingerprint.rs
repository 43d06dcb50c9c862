//! Content hashes of trajectories.

use sha2::{Digest, Sha256};
use sw_core::OdeState;
use sw_integrate::Trajectory;

/// SHA-256 over the point count and the little-endian bytes of every time and
/// state component, hex encoded.
///
/// Equal fingerprints mean bit-identical trajectories.
pub fn trajectory_fingerprint<S: OdeState>(trajectory: &Trajectory<S>) -> String {
    let mut hasher = Sha256::new();
    hasher.update((trajectory.len() as u64).to_le_bytes());
    for (t, state) in trajectory.iter() {
        hasher.update(t.to_le_bytes());
        for v in state.components() {
            hasher.update(v.to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}
