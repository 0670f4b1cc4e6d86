//! Eviction Policy Module
//!
//! The engine asks its policy two things: what a value costs, and whether the
//! current totals are over the limit. Count and byte bounds are the two
//! provided policies.

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use crate::byte_length::TryByteLength;
use crate::error::{CacheError, Result};

// == Eviction Policy ==
/// Capacity rule applied by [`Lru`](crate::cache::Lru) after every write.
pub trait EvictionPolicy<V> {
    /// Error returned when a value cannot be costed.
    type Error;

    /// Cost charged against the limit for holding `value`.
    fn cost(&self, value: &V) -> std::result::Result<usize, Self::Error>;

    /// True while entries must be evicted from the tail.
    fn over_budget(&self, len: usize, usage: usize) -> bool;
}

// == Capacity ==
/// Entry limit for the count-bounded cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// At most this many entries (always >= 2)
    Bounded(usize),
    /// Never evicts
    Unbounded,
}

impl Capacity {
    /// Smallest accepted bounded capacity.
    pub const MIN: usize = 2;

    /// Validates a bounded capacity.
    pub fn bounded(limit: usize) -> Result<Self> {
        if limit < Self::MIN {
            return Err(CacheError::InvalidCapacity(format!(
                "{} (must be at least {} or unbounded)",
                limit,
                Self::MIN
            )));
        }
        Ok(Capacity::Bounded(limit))
    }

    /// Returns the limit, or None when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Capacity::Bounded(limit) => Some(*limit),
            Capacity::Unbounded => None,
        }
    }
}

/// `-1` is the unbounded sentinel; every other value must be >= 2.
impl TryFrom<i64> for Capacity {
    type Error = CacheError;

    fn try_from(raw: i64) -> Result<Self> {
        match raw {
            -1 => Ok(Capacity::Unbounded),
            n if n >= Self::MIN as i64 => Capacity::bounded(n as usize),
            n => Err(CacheError::InvalidCapacity(format!(
                "{} (must be at least {} or -1 for unbounded)",
                n,
                Self::MIN
            ))),
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capacity::Bounded(limit) => write!(f, "{} entries", limit),
            Capacity::Unbounded => f.write_str("unbounded"),
        }
    }
}

// == Count Policy ==
/// Evicts once the entry count exceeds the capacity. Every entry costs 1.
#[derive(Debug, Clone, Copy)]
pub struct CountPolicy {
    capacity: Capacity,
}

impl CountPolicy {
    pub fn new(capacity: Capacity) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }
}

impl<V> EvictionPolicy<V> for CountPolicy {
    type Error = Infallible;

    fn cost(&self, _value: &V) -> std::result::Result<usize, Infallible> {
        Ok(1)
    }

    fn over_budget(&self, len: usize, _usage: usize) -> bool {
        match self.capacity {
            Capacity::Bounded(limit) => len > limit,
            Capacity::Unbounded => false,
        }
    }
}

// == Byte Policy ==
/// Evicts once the summed byte length of values exceeds the budget.
pub struct BytePolicy<V> {
    budget: usize,
    _value: PhantomData<fn(&V)>,
}

impl<V> BytePolicy<V> {
    /// Validates the budget (>= 1 byte).
    pub fn new(budget: usize) -> Result<Self> {
        if budget < 1 {
            return Err(CacheError::InvalidByteBudget(budget));
        }
        Ok(Self {
            budget,
            _value: PhantomData,
        })
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// True when `usage + incoming` would exceed the budget.
    pub fn needs_room(&self, usage: usize, incoming: usize) -> bool {
        usage.saturating_add(incoming) > self.budget
    }
}

impl<V> fmt::Debug for BytePolicy<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BytePolicy")
            .field("budget", &self.budget)
            .finish()
    }
}

impl<V: TryByteLength> EvictionPolicy<V> for BytePolicy<V> {
    type Error = CacheError;

    fn cost(&self, value: &V) -> Result<usize> {
        value.try_byte_length()
    }

    fn over_budget(&self, _len: usize, usage: usize) -> bool {
        usage > self.budget
    }
}
