//! Image set identifiers.
//!
//! An image set is the unit of work: a positive integer *image number*.
//! Group number and group index are 1-based metadata carried alongside it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive integer identifying one image set within the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageNumber(pub u32);

impl ImageNumber {
    pub fn new(n: u32) -> Self {
        debug_assert!(n > 0, "image numbers are 1-based");
        Self(n)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ImageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ImageNumber {
    fn from(n: u32) -> Self {
        Self::new(n)
    }
}

/// 1-based group identifier; image sets sharing a group number are
/// dispatched as a single job when the pipeline needs aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupNumber(pub u32);

/// 1-based position of an image set within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupIndex(pub u32);

#[cfg(test)]
#[path = "image_set_tests.rs"]
mod tests;
