//! Simulated time.
//!
//! Simulated time is a non-negative `f64`. Plain `f64` has no total order
//! (`NaN`), which `BinaryHeap` requires, so it is wrapped in
//! `ordered_float::OrderedFloat` the way the rest of the corpus does when a
//! float needs to key a heap.

use ordered_float::OrderedFloat;
use std::fmt;
use std::ops::Add;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(OrderedFloat<f64>);

impl SimTime {
    pub const ZERO: SimTime = SimTime(OrderedFloat(0.0));

    pub fn new(t: f64) -> Self {
        SimTime(OrderedFloat(t))
    }

    pub fn as_f64(self) -> f64 {
        self.0.into_inner()
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: f64) -> SimTime {
        SimTime::new(self.as_f64() + rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}

impl From<f64> for SimTime {
    fn from(t: f64) -> Self {
        SimTime::new(t)
    }
}
