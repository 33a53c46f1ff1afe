//! The pluggable await/broadcast seam (spec section 4.7, component C7).
//!
//! Grounded in the teacher repo's `concurrency::distributed` module, which
//! wraps a `Uuid`-identified node id and serde-friendly envelope types
//! around a pub/sub transport. `original_source`'s `bcast/broadcaster.hxx`
//! and `bcast/null_broadcast.hxx` show the same shape on the C++ side: a
//! `broadcaster` concept with `broadcast_insert`/`broadcast_delete`/
//! `await` operations, and a `null_broadcast` no-op default used whenever a
//! `store` isn't wired up to a real replication transport.
//!
//! This crate never implements the transport itself (out of scope, spec
//! section 1's Non-goals) — only the seam a transport would plug into.

use uuid::Uuid;

use crate::tuple::Tuple;

/// Identifies a participant in a replicated tuple space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Generates a fresh, random node id.
    pub fn new() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A replication event raised by a mutating store operation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Envelope {
    /// A tuple was inserted.
    Insert {
        /// The tuple that was inserted.
        tuple: Tuple,
    },
    /// A tuple was removed.
    Remove {
        /// The tuple that was removed.
        tuple: Tuple,
    },
    /// The store is shutting down and will raise no further events.
    Terminate,
}

/// A handle a [`Broadcast`] implementation returns for an in-flight
/// replication round; [`Broadcast::await_handle`] blocks on it.
///
/// The default, no-op sink ([`NullBroadcast`]) returns an already-settled
/// handle, so `await_handle` returns immediately — matching
/// `null_broadcast`'s behavior in the original.
pub trait Awaiter: Send {
    /// Blocks until the replication round this handle represents has
    /// settled (or immediately, for transports with no round-trip).
    fn join(self: Box<Self>);
}

/// An already-settled awaiter, used by [`NullBroadcast`].
struct Settled;
impl Awaiter for Settled {
    fn join(self: Box<Self>) {}
}

/// The pluggable broadcast seam a [`crate::store::Store`] notifies on every
/// mutation.
///
/// Implementations decide how (or whether) `insert`/`remove` events reach
/// other replicas; the store only needs `on_insert`/`on_remove` to return
/// an [`Awaiter`] it can block on before acknowledging the local mutation,
/// and `on_terminate` to signal a clean shutdown.
pub trait Broadcast: Send + Sync {
    /// Raised after a tuple is inserted, before the store notifies waiting
    /// readers.
    fn on_insert(&self, tuple: &Tuple) -> Box<dyn Awaiter>;

    /// Raised after a tuple is removed.
    fn on_remove(&self, tuple: &Tuple) -> Box<dyn Awaiter>;

    /// Raised when the store is being torn down.
    fn on_terminate(&self) -> Box<dyn Awaiter> {
        Box::new(Settled)
    }
}

/// The default broadcast sink: acknowledges every event immediately
/// without telling anyone. Mirrors `original_source`'s `null_broadcast`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBroadcast;

impl Broadcast for NullBroadcast {
    fn on_insert(&self, _tuple: &Tuple) -> Box<dyn Awaiter> {
        Box::new(Settled)
    }

    fn on_remove(&self, _tuple: &Tuple) -> Box<dyn Awaiter> {
        Box::new(Settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_broadcast_awaiters_settle_immediately() {
        let bcast = NullBroadcast;
        let tup = Tuple::from_values(vec![1i32.into()]).unwrap();
        bcast.on_insert(&tup).join();
        bcast.on_remove(&tup).join();
        bcast.on_terminate().join();
    }

    #[test]
    fn node_ids_are_distinct() {
        assert_ne!(NodeId::new(), NodeId::new());
    }
}
