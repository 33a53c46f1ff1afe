//! The ordered, variable-arity collection of [`Value`]s exchanged with the
//! store.
//!
//! Grounded in `original_source/src/LindaDB/public/ldb/lv/linda_tuple.hxx`:
//! the original keeps a fixed `std::array<linda_value, 3>` for the first
//! three positions plus a `std::variant<monostate, linda_value,
//! vector<linda_value>>` tail, so tuples of arity 0–4 never touch the heap
//! beyond the `Value`s themselves. We keep the same three-tier shape here.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::config::MAX_TUPLE_ARITY;
use crate::error::{Error, Result};
use crate::value::Value;

/// The tail of a [`Tuple`] beyond its first three inline positions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
enum Tail {
    /// Arity 0–3: nothing beyond the inline slots.
    None,
    /// Arity exactly 4: the fourth value, stored without a heap allocation.
    One(Value),
    /// Arity 5+: positions 3.. spilled into a heap-allocated vector.
    Many(Vec<Value>),
}

/// A short-optimized, ordered, variable-arity collection of [`Value`]s.
///
/// Tuples compare first by length, then lexicographically by position
/// (spec section 3's invariant I2) — two tuples of different arity are
/// never equal, and a shorter tuple always orders before a longer one that
/// shares its prefix.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Tuple {
    len: usize,
    inline: [Option<Value>; 3],
    tail: Tail,
}

impl Tuple {
    /// The empty tuple.
    pub fn unit() -> Self {
        Tuple {
            len: 0,
            inline: [None, None, None],
            tail: Tail::None,
        }
    }

    /// Builds a tuple from an owned sequence of values.
    ///
    /// Fails with [`Error::LogicError`] if `values.len()` exceeds
    /// [`MAX_TUPLE_ARITY`].
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        if values.len() > MAX_TUPLE_ARITY {
            return Err(Error::LogicError(format!(
                "tuple arity {} exceeds the maximum of {MAX_TUPLE_ARITY}",
                values.len()
            )));
        }
        let len = values.len();
        let mut values = values.into_iter();
        let inline = [values.next(), values.next(), values.next()];
        let tail = match values.next() {
            None => Tail::None,
            Some(fourth) => {
                let rest: Vec<Value> = values.collect();
                if rest.is_empty() {
                    Tail::One(fourth)
                } else {
                    let mut many = Vec::with_capacity(rest.len() + 1);
                    many.push(fourth);
                    many.extend(rest);
                    Tail::Many(many)
                }
            }
        };
        Ok(Tuple { len, inline, tail })
    }

    /// The tuple's arity.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for the empty tuple.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the value at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<&Value> {
        if index >= self.len {
            return None;
        }
        match index {
            0 | 1 | 2 => self.inline[index].as_ref(),
            3 => match &self.tail {
                Tail::One(v) => Some(v),
                Tail::Many(v) => v.first(),
                Tail::None => None,
            },
            n => match &self.tail {
                Tail::Many(v) => v.get(n - 3),
                _ => None,
            },
        }
    }

    /// Returns an iterator over this tuple's positions in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        (0..self.len).map(move |i| self.get(i).expect("index within len is always present"))
    }
}

impl std::ops::Index<usize> for Tuple {
    type Output = Value;

    /// Out-of-range indexing is a programming error (spec section 4.2):
    /// the index invariant is the caller's responsibility, so this panics
    /// rather than returning a `Result`. Use [`Tuple::get`] for a
    /// checked lookup.
    #[track_caller]
    fn index(&self, index: usize) -> &Value {
        self.get(index)
            .unwrap_or_else(|| panic!("tuple index {index} out of range (arity {})", self.len))
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Tuple {}

impl PartialOrd for Tuple {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tuple {
    fn cmp(&self, other: &Self) -> Ordering {
        self.len
            .cmp(&other.len)
            .then_with(|| self.iter().cmp(other.iter()))
    }
}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for v in self.iter() {
            v.hash(state);
        }
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Tuple::from_values(iter.into_iter().collect())
            .expect("FromIterator callers are trusted to respect the arity bound")
    }
}
