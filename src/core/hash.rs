//! State Hashing for Replay Checks
//!
//! SHA-256 digest of a whole simulation. A replay reproduces the live run
//! only if both end in the same digest, so every field that can influence
//! a later tick goes in, in a fixed order.

use sha2::{Sha256, Digest};
use super::fixed::Fixed;
use super::vec2::Aabb;

/// Digest of one simulation state (32 bytes).
pub type StateHash = [u8; 32];

/// Domain tag prefixed to every state digest.
const STATE_DOMAIN: &[u8] = b"LEDGE_RUNNER_STATE_V1";

/// Incremental state hasher.
///
/// Field order is part of the digest; callers visit entities, platforms
/// and board items in their iteration order.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Start a digest under the given domain tag.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Start a simulation-state digest.
    pub fn for_simulation_state() -> Self {
        Self::new(STATE_DOMAIN)
    }

    /// Add a byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Add a u32 (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Add a u64 (little-endian).
    #[inline]
    pub fn update_u64(&mut self, value: u64) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Add a fixed-point value.
    #[inline]
    pub fn update_fixed(&mut self, value: Fixed) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Add a flag.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Add a collection length, so `[a] ++ [b, c]` and `[a, b] ++ [c]`
    /// hash differently.
    #[inline]
    pub fn update_count(&mut self, len: usize) {
        self.update_u64(len as u64);
    }

    /// Add a box: corner, then size.
    pub fn update_aabb(&mut self, bounds: &Aabb) {
        self.update_fixed(bounds.origin.x);
        self.update_fixed(bounds.origin.y);
        self.update_fixed(bounds.width);
        self.update_fixed(bounds.height);
    }

    /// Finish the digest.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

/// Digest a simulation.
///
/// The tick, simulated clock and seed lead the digest; `add_state` appends
/// the world itself.
pub fn compute_state_hash<F>(tick: u64, clock_ms: u64, rng_seed: u64, add_state: F) -> StateHash
where
    F: FnOnce(&mut StateHasher),
{
    let mut hasher = StateHasher::for_simulation_state();
    hasher.update_u64(tick);
    hasher.update_u64(clock_ms);
    hasher.update_u64(rng_seed);

    add_state(&mut hasher);

    hasher.finalize()
}

/// Lowercase hex form of a digest, for logs.
pub fn hash_hex(hash: &StateHash) -> String {
    hex::encode(hash)
}
