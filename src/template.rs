//! Templates: the tuple-shaped query pattern used by `rd`/`in`/`rdp`/`inp`.
//!
//! A [`Template`] has the same shape as a [`Tuple`] — one [`Value`] per
//! position — but a position holding a [`Value::TypeRef`] acts as a typed
//! wildcard rather than literal data (spec section 4.3).

use crate::tuple::Tuple;
use crate::value::Outcome;

/// A query pattern: a tuple shape where any position may be a typed
/// wildcard instead of a literal value.
#[derive(Debug, Clone)]
pub struct Template(Tuple);

impl Template {
    /// Wraps a tuple of literals/wildcards as a template.
    pub fn new(positions: Tuple) -> Self {
        Template(positions)
    }

    /// The template's arity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty template (matches only the empty tuple).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Implements spec section 4.3's `Template.match(Tuple t) -> Outcome`.
    ///
    /// Differing arity is decided first and is itself four-way: a shorter
    /// template orders before a longer tuple, a longer template after a
    /// shorter tuple, exactly mirroring [`Tuple`]'s own length-first
    /// ordering. Equal arity falls through to a position-by-position
    /// comparison; the first position whose comparison is not `Equal`
    /// decides the whole match, with one exception: `Incomparable` at any
    /// position makes the whole match `Incomparable`, since a mismatched
    /// wildcard type means the two tuples cannot be placed relative to one
    /// another at all, not just "unequal at this position".
    pub fn match_tuple(&self, t: &Tuple) -> Outcome {
        if self.len() != t.len() {
            return if self.len() < t.len() {
                Outcome::Less
            } else {
                Outcome::Greater
            };
        }
        for i in 0..self.len() {
            let template_value = &self.0[i];
            let concrete_value = &t[i];
            match template_value.match_against(concrete_value) {
                Outcome::Equal => continue,
                other => return other,
            }
        }
        Outcome::Equal
    }

    /// True if every position of `t` satisfies this template.
    pub fn matches(&self, t: &Tuple) -> bool {
        self.match_tuple(t).is_equal()
    }
}
