//! Bounded scalar with an inclusive `[min, max]` window.
//!
//! Shared by anything that needs a threshold window: the acceptable soil
//! moisture band, the probe's documented physical range, and so on.  Bounds
//! are fixed at construction; only `current` moves.

use core::cmp::Ordering;

use crate::error::ConfigError;

/// Where a value sits relative to a [`RangedValue`] window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Below,
    Within,
    Above,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangedValue<T> {
    current: T,
    min: T,
    max: T,
}

impl<T: PartialOrd + Copy> RangedValue<T> {
    /// Build a window.  Rejects `min > max`; `current` may lie anywhere.
    pub fn new(current: T, min: T, max: T) -> Result<Self, ConfigError> {
        // Unordered (NaN) bounds are rejected too.
        match min.partial_cmp(&max) {
            Some(Ordering::Less | Ordering::Equal) => Ok(Self { current, min, max }),
            _ => Err(ConfigError::InvalidRange),
        }
    }

    /// Window with `current` starting at the lower bound.
    pub fn bounds(min: T, max: T) -> Result<Self, ConfigError> {
        Self::new(min, min, max)
    }

    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }

    pub fn position(&self, v: T) -> Position {
        if v < self.min {
            Position::Below
        } else if v > self.max {
            Position::Above
        } else {
            Position::Within
        }
    }

    pub fn min_value(&self) -> T {
        self.min
    }

    pub fn max_value(&self) -> T {
        self.max
    }

    pub fn current(&self) -> T {
        self.current
    }

    /// Store `v` unchanged and report where it fell.
    pub fn set(&mut self, v: T) -> Position {
        self.current = v;
        self.position(v)
    }

    /// Store `v` pulled into the window.  Returns the position of the
    /// original value so the caller can report the clamp.
    pub fn set_clamped(&mut self, v: T) -> Position {
        let position = self.position(v);
        self.current = self.clamp(v);
        position
    }

    pub fn clamp(&self, v: T) -> T {
        match self.position(v) {
            Position::Below => self.min,
            Position::Above => self.max,
            Position::Within => v,
        }
    }
}
