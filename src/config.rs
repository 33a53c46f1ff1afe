//! Store configuration.

use crate::error::{Error, Result};

/// The default per-node payload bucket capacity (spec section 4.4's `K`).
pub const DEFAULT_PAYLOAD_CAPACITY: usize = 16;

/// The maximum tuple arity this crate will accept (spec section 3's
/// invariant I1: `0 <= arity <= 256`).
pub const MAX_TUPLE_ARITY: usize = 256;

/// Construction-time configuration for a [`crate::store::Store`].
///
/// Built with the builder-style setters below (mirroring the teacher
/// repo's preference for small, validated, immutable config structs over
/// public fields), then frozen by [`StoreConfig::build`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    payload_capacity: usize,
    notify_all: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            payload_capacity: DEFAULT_PAYLOAD_CAPACITY,
            notify_all: false,
        }
    }
}

impl StoreConfig {
    /// Starts a new configuration at the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-node payload bucket capacity. Must be at least 1.
    pub fn with_payload_capacity(mut self, capacity: usize) -> Self {
        self.payload_capacity = capacity;
        self
    }

    /// Spec section 9's Open Question on reader fairness: the original
    /// wakes exactly one blocked reader per insert (`notify_one`). Setting
    /// this to `true` switches to `notify_all`, trading a documented
    /// thundering-herd cost for removing the (already benign, since every
    /// woken reader re-checks its own template) risk of a reader sleeping
    /// past a tuple that would have satisfied it. Default preserves the
    /// original's `notify_one` behavior; see `DESIGN.md`.
    pub fn with_notify_all(mut self, notify_all: bool) -> Self {
        self.notify_all = notify_all;
        self
    }

    /// Validates and freezes this configuration.
    pub fn build(self) -> Result<StoreConfig> {
        if self.payload_capacity == 0 {
            return Err(Error::LogicError(
                "payload_capacity must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// The configured per-node payload bucket capacity.
    pub fn payload_capacity(&self) -> usize {
        self.payload_capacity
    }

    /// Whether blocking retrieval wakes all waiters or just one.
    pub fn notify_all(&self) -> bool {
        self.notify_all
    }
}
