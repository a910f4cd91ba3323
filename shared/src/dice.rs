//! Dice rolling.
//!
//! Provides a validated inclusive range, the `DiceRoll` value, and the
//! `DiceSource` trait that decouples handlers from the random number generator.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors that can occur when building a dice range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RollError {
    /// The lower bound is greater than the upper bound.
    #[error("Invalid dice range: min ({min}) is greater than max ({max})")]
    InvalidRange {
        /// Requested lower bound.
        min: i64,
        /// Requested upper bound.
        max: i64,
    },
}

/// The result of a single roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiceRoll(i64);

impl DiceRoll {
    /// Returns the rolled value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inclusive `[min, max]` range of roll values.
///
/// # Example
///
/// ```
/// use rolldice_shared::dice::DiceRange;
///
/// let range = DiceRange::new(1, 20).unwrap();
/// let roll = range.roll(&mut rand::thread_rng());
/// assert!(range.contains(roll.value()));
///
/// assert!(DiceRange::new(6, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRange {
    min: i64,
    max: i64,
}

impl DiceRange {
    /// A standard six-sided die.
    pub const STANDARD: Self = Self { min: 1, max: 6 };

    /// Creates a range.
    ///
    /// # Errors
    ///
    /// Returns [`RollError::InvalidRange`] if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, RollError> {
        if min > max {
            return Err(RollError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Lower bound (inclusive).
    #[must_use]
    pub const fn min(self) -> i64 {
        self.min
    }

    /// Upper bound (inclusive).
    #[must_use]
    pub const fn max(self) -> i64 {
        self.max
    }

    /// Returns true if `value` lies within the range.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Rolls once, uniformly over the range.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> DiceRoll {
        DiceRoll(rng.gen_range(self.min..=self.max))
    }

    /// Rolls `count` times.
    pub fn roll_many<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> Vec<DiceRoll> {
        (0..count).map(|_| self.roll(rng)).collect()
    }

    fn clamp(self, value: i64) -> DiceRoll {
        DiceRoll(value.clamp(self.min, self.max))
    }
}

impl Default for DiceRange {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A source of dice rolls.
///
/// Implementations must be thread-safe (Send + Sync) so they can live in
/// shared handler state.
pub trait DiceSource: Send + Sync {
    /// Rolls once within `range`.
    fn roll(&self, range: DiceRange) -> DiceRoll;

    /// Rolls `count` times within `range`.
    fn roll_many(&self, range: DiceRange, count: usize) -> Vec<DiceRoll> {
        (0..count).map(|_| self.roll(range)).collect()
    }
}

/// Dice backed by the thread-local random number generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDice;

impl DiceSource for ThreadRngDice {
    fn roll(&self, range: DiceRange) -> DiceRoll {
        range.roll(&mut rand::thread_rng())
    }

    fn roll_many(&self, range: DiceRange, count: usize) -> Vec<DiceRoll> {
        range.roll_many(count, &mut rand::thread_rng())
    }
}

/// Dice that replay a fixed sequence, cycling when exhausted.
///
/// Values outside the requested range are clamped into it.
#[derive(Debug)]
pub struct ScriptedDice {
    values: Vec<i64>,
    next: AtomicUsize,
}

impl ScriptedDice {
    /// Creates scripted dice. An empty script always yields the range minimum.
    #[must_use]
    pub fn new(values: impl Into<Vec<i64>>) -> Self {
        Self {
            values: values.into(),
            next: AtomicUsize::new(0),
        }
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&self, range: DiceRange) -> DiceRoll {
        if self.values.is_empty() {
            return DiceRoll(range.min());
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.values.len();
        range.clamp(self.values[index])
    }
}
