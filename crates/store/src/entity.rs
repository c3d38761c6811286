//! Well-known entity names. Any other string is a user-defined object name
//! (e.g. "Nuclei", "Cells") — the store treats entities opaquely.

/// Run-scoped measurements with no per-image-set value (§4.8: always skipped
/// on merge — the interface loop never writes to it).
pub const EXPERIMENT: &str = "Experiment";

/// Per-image-set measurements, including `ProcessingStatus` (§3).
pub const IMAGE: &str = "Image";
