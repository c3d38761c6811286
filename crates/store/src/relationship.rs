//! Relationship records (§4.3 `copy_relationships`).
//!
//! A relationship links two objects, possibly in different image sets —
//! e.g. "Parent" between a Nuclei object and the Cell object that contains
//! it. The coordinator never interprets these; it only merges them
//! additively from completed jobs into the run's store.

use ac_core::ImageNumber;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub module_number: u32,
    pub relationship: String,
    pub object_name_1: String,
    pub image_number_1: ImageNumber,
    pub object_number_1: u32,
    pub object_name_2: String,
    pub image_number_2: ImageNumber,
    pub object_number_2: u32,
}
