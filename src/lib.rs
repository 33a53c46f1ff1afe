//! # lindadb
//!
//! A single-node, in-memory tuple space implementing the Linda coordination
//! model. Processes exchange work through a shared associative memory of
//! heterogeneous tuples via three primitives: non-destructive read
//! ([`Store::read`]/[`Store::try_read`]), destructive take
//! ([`Store::take`]/[`Store::try_take`]), and insert ([`Store::insert`]).
//! Each primitive accepts either a concrete [`Tuple`] or a [`Template`] that
//! mixes literal [`Value`]s with typed wildcards; a template matches a tuple
//! iff arities agree, literals equal positionally, and wildcards agree in
//! dynamic type.
//!
//! ## Architecture
//!
//! - [`value`]: the tagged-union scalar stored at every tuple position, with
//!   a total order and a compact binary wire format.
//! - [`tuple`]: a short-optimized, ordered, heterogeneous sequence of
//!   [`Value`]s.
//! - [`template`]: a tuple-shaped query pattern mixing literals and typed
//!   wildcards, with the four-way match outcome (`equal`/`less`/`greater`/
//!   `incomparable`) that makes wildcard lookups possible in an ordered
//!   index.
//! - [`payload`]: the fixed-capacity sorted bucket carried by every index
//!   node.
//! - [`index`]: the arena-backed AVL "T-tree" that buckets several entries
//!   per node.
//! - [`store`]: the synchronized tuple space itself, wrapping the index with
//!   blocking retrieval and a pluggable replication seam.
//! - [`broadcast`]: the narrow outbound interface a store calls on every
//!   mutation; the default is a no-op, real deployments plug in a
//!   replication driver.
//! - [`wire`]: the bit-exact binary format peers agree on when replicating
//!   tuples.
//! - [`config`]: construction-time configuration for a [`Store`].
//! - [`error`]: the crate-wide error taxonomy.
//!
//! ## Example
//!
//! ```
//! use lindadb::{Store, StoreConfig, Template, Tuple, Value, ValueTag};
//!
//! let store = Store::new(StoreConfig::new().build().unwrap());
//! store.insert(Tuple::from_values(vec!["job".into(), 7i32.into()]).unwrap());
//!
//! let template = Template::new(
//!     Tuple::from_values(vec!["job".into(), Value::wildcard(ValueTag::Int32)]).unwrap(),
//! );
//! assert!(store.try_read(&template).is_some());
//! ```
//!
//! ## Out of scope
//!
//! The multi-process broadcast layer that actually replicates inserts/
//! deletes across peers, the macro-driven `eval` front-end that ships a
//! captured call site to a worker, the SQL-backed store variant, and
//! persistence to disk are all collaborators this crate exposes interfaces
//! for but does not implement. See `DESIGN.md` for the full disposition.

#![warn(missing_docs, rust_2018_idioms)]
#![allow(clippy::module_inception)]

/// The pluggable await/broadcast seam a store notifies on every mutation.
pub mod broadcast;
/// Construction-time configuration for a [`Store`].
pub mod config;
/// The crate-wide error type and result alias.
pub mod error;
/// The arena-backed AVL "T-tree" ordered index.
pub mod index;
/// The fixed-capacity sorted bucket carried by every index node.
pub mod payload;
/// The synchronized, in-memory tuple space.
pub mod store;
/// Query patterns mixing literal values with typed wildcards.
pub mod template;
/// The ordered, heterogeneous sequence of values exchanged with the store.
pub mod tuple;
/// The tagged-union scalar type stored at every tuple position.
pub mod value;
/// The bit-exact replication wire format.
pub mod wire;

pub use broadcast::{Awaiter, Broadcast, NullBroadcast};
pub use config::StoreConfig;
pub use error::{Error, Result};
pub use store::Store;
pub use template::Template;
pub use tuple::Tuple;
pub use value::{Outcome, Value, ValueTag};
