//! The `MeasurementStore` trait (§4.3): the logical tensor
//! `(entity, feature, image_number) -> value`, plus relationships and a
//! handful of metadata queries the planner and interface loop need.
//!
//! Kept as a plain (non-async) trait: only the interface loop mutates a
//! run's store, and it does so from a single task, so there is no need for
//! interior synchronization or async machinery here — callers that do need
//! to keep the event loop responsive around a slow implementation can wrap
//! calls in `spawn_blocking` at the seam.

use crate::relationship::RelationshipRecord;
use crate::value::MeasurementValue;
use ac_core::{GroupIndex, GroupNumber, ImageNumber, ProcessingStatus};

pub trait MeasurementStore: Send {
    /// Every image number in the manifest, in ascending order. Fixed for
    /// the lifetime of a run (§3: the manifest is established at creation).
    fn image_numbers(&self) -> Vec<ImageNumber>;

    /// Whether this run's image sets are partitioned into groups (§4.5:
    /// forces per-group dispatch when the pipeline also requires
    /// aggregation).
    fn has_groups(&self) -> bool;

    fn group_number(&self, image_number: ImageNumber) -> Option<GroupNumber>;
    fn group_index(&self, image_number: ImageNumber) -> Option<GroupIndex>;

    fn get(&self, entity: &str, feature: &str, image_number: ImageNumber)
        -> Option<MeasurementValue>;

    fn set(
        &mut self,
        entity: &str,
        feature: &str,
        image_number: ImageNumber,
        value: MeasurementValue,
    );

    /// Vectorised read over a sequence of image numbers, in order. The
    /// default calls `get` per element; implementations backed by a
    /// columnar layout may override for a single lookup.
    fn get_many(
        &self,
        entity: &str,
        feature: &str,
        image_numbers: &[ImageNumber],
    ) -> Vec<Option<MeasurementValue>> {
        image_numbers.iter().map(|n| self.get(entity, feature, *n)).collect()
    }

    /// Vectorised write, `image_numbers[i]` paired with `values[i]`.
    fn set_many(
        &mut self,
        entity: &str,
        feature: &str,
        image_numbers: &[ImageNumber],
        values: Vec<MeasurementValue>,
    ) {
        for (n, v) in image_numbers.iter().zip(values) {
            self.set(entity, feature, *n, v);
        }
    }

    fn has_feature(&self, entity: &str, feature: &str) -> bool;

    fn has_measurement(&self, entity: &str, feature: &str, image_number: ImageNumber) -> bool {
        self.get(entity, feature, image_number).is_some()
    }

    /// Feature names recorded for the given entity, in no particular order.
    fn feature_names(&self, entity: &str) -> Vec<String>;

    /// Every entity name that has at least one recorded feature.
    fn object_names(&self) -> Vec<String>;

    fn relationships(&self) -> &[RelationshipRecord];

    fn add_relationship(&mut self, record: RelationshipRecord);

    /// Merge every relationship from `src` into `self` (§4.8: additive,
    /// never deduplicated — a worker that legitimately reports the same
    /// relationship twice across jobs is not this store's concern).
    fn copy_relationships(&mut self, src: &dyn MeasurementStore) {
        for record in src.relationships() {
            self.add_relationship(record.clone());
        }
    }

    fn status(&self, image_number: ImageNumber) -> Option<ProcessingStatus> {
        match self.get(crate::entity::IMAGE, ProcessingStatus::FEATURE, image_number) {
            Some(MeasurementValue::Text(s)) => ProcessingStatus::parse(&s),
            _ => None,
        }
    }

    /// Write `status`, enforcing the state-machine invariant (§8 Testable
    /// Property 2: status only moves forward, or resets to `Unprocessed`
    /// on replan). A missing prior status is treated as `Unprocessed`, its
    /// documented initial state. An illegal transition is logged and
    /// dropped rather than written — the store never regresses a status
    /// even if a caller tries to.
    fn set_status(&mut self, image_number: ImageNumber, status: ProcessingStatus) {
        let current = self.status(image_number).unwrap_or(ProcessingStatus::Unprocessed);
        if !current.can_transition_to(status) {
            tracing::warn!(
                image_number = image_number.get(),
                from = %current,
                to = %status,
                "rejecting illegal processing status transition"
            );
            return;
        }
        self.set(
            crate::entity::IMAGE,
            ProcessingStatus::FEATURE,
            image_number,
            MeasurementValue::Text(status.as_str().to_string()),
        );
    }

    /// Durability checkpoint. Implementations with no backing file may
    /// treat this as a no-op; it exists so callers never need to know
    /// which kind of store they were handed.
    fn flush(&mut self) -> Result<(), crate::error::StoreError>;
}
