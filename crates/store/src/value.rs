//! Logical measurement values (§3, §4.8).

use serde::{Deserialize, Serialize};

/// A single measurement value. Arrays compare element-wise ("any differs");
/// scalars and text compare by equality — matching the merge rule in §4.8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeasurementValue {
    Scalar(f64),
    Text(String),
    FloatArray(Vec<f64>),
}

impl MeasurementValue {
    /// Whether `self` (the remote/incoming value) differs from `local`,
    /// using the comparison the interface loop applies when merging
    /// worker-returned `Image` measurements.
    pub fn differs_from(&self, local: &Self) -> bool {
        match (self, local) {
            (Self::Scalar(a), Self::Scalar(b)) => a != b,
            (Self::Text(a), Self::Text(b)) => a != b,
            (Self::FloatArray(a), Self::FloatArray(b)) => {
                a.len() != b.len() || a.iter().zip(b).any(|(x, y)| x != y)
            }
            // Mismatched shapes are always a difference.
            _ => true,
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
