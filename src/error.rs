//! The crate-wide error type.
//!
//! Five kinds are named by the tuple-space's error taxonomy, but only three
//! of them are ever constructed as an `Err`: [`Error::TypeMismatch`] and
//! [`Error::NotFound`] describe control flow that surfaces as `Option::None`
//! or a blocking retry rather than a propagated error (template lookups that
//! don't match just don't match; there is nothing exceptional about it).
//! They stay in the enum so call sites that *do* want to report them through
//! the wire-replication path (`ReplicationError`) have a matching variant to
//! wrap.

use thiserror::Error as ThisError;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// The tuple space's error taxonomy.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A programming error: an invariant the caller was responsible for
    /// upholding was violated (out-of-range tuple access, a malformed
    /// template, an arity that exceeds the configured maximum). Fatal —
    /// callers should not attempt to recover from this, only report it.
    #[error("logic error: {0}")]
    LogicError(String),

    /// A value was found but did not have the expected dynamic type.
    /// Never constructed directly by this crate today (reserved for
    /// typed accessor APIs); kept so downstream wrappers around
    /// [`crate::value::Value`] have a variant to report through.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The type the caller expected.
        expected: &'static str,
        /// The type that was actually found.
        found: &'static str,
    },

    /// A lookup found no matching entry. Non-blocking retrieval
    /// (`try_read`/`try_take`) reports this as `Option::None` rather than
    /// an `Err`; the variant exists for callers building their own
    /// retrieval wrappers around [`crate::store::Store`].
    #[error("no matching tuple found")]
    NotFound,

    /// A broadcast/replication round failed. Carries the underlying
    /// cause as a string since the broadcast seam (`crate::broadcast`) is
    /// intentionally transport-agnostic.
    #[error("replication error: {0}")]
    ReplicationError(String),

    /// The wire format (`crate::wire`) encountered malformed or truncated
    /// input while decoding.
    #[error("invalid wire data: {0}")]
    InvalidWire(String),
}
