//! In-process `MeasurementStore` implementation.
//!
//! Backed by a plain map rather than an HDF5-style column file — adequate
//! for a coordinator whose job is to shuttle measurements between workers
//! and an embedder, not to be the long-term measurements database itself.

use crate::error::StoreError;
use crate::relationship::RelationshipRecord;
use crate::store::MeasurementStore;
use crate::value::MeasurementValue;
use ac_core::{GroupIndex, GroupNumber, ImageNumber};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

type Key = (String, String, u32);

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    manifest: Vec<ImageNumber>,
    groups: BTreeMap<u32, (GroupNumber, GroupIndex)>,
    table: BTreeMap<Key, MeasurementValue>,
    relationships: Vec<RelationshipRecord>,
}

/// Wire shape for `open_copy`/checkpointing — `BTreeMap` keys must be
/// strings to round-trip through `serde_json`, so the table is flattened to
/// a list of entries for transport and rebuilt into the map on load.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    manifest: Vec<u32>,
    groups: Vec<(u32, u32, u32)>,
    table: Vec<(String, String, u32, MeasurementValue)>,
    relationships: Vec<RelationshipRecord>,
}

impl InMemoryStore {
    /// A fresh store over the given manifest, with no groups and no
    /// recorded measurements — the shape a run starts from before its
    /// bootstrap image set completes.
    pub fn new(manifest: Vec<ImageNumber>) -> Self {
        Self { manifest, groups: BTreeMap::new(), table: BTreeMap::new(), relationships: Vec::new() }
    }

    pub fn assign_group(&mut self, image_number: ImageNumber, group: GroupNumber, index: GroupIndex) {
        self.groups.insert(image_number.get(), (group, index));
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            manifest: self.manifest.iter().map(|n| n.get()).collect(),
            groups: self.groups.iter().map(|(n, (g, i))| (*n, g.0, i.0)).collect(),
            table: self
                .table
                .iter()
                .map(|((e, f, n), v)| (e.clone(), f.clone(), *n, v.clone()))
                .collect(),
            relationships: self.relationships.clone(),
        }
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            manifest: snapshot.manifest.into_iter().map(ImageNumber::new).collect(),
            groups: snapshot
                .groups
                .into_iter()
                .map(|(n, g, i)| (n, (GroupNumber(g), GroupIndex(i))))
                .collect(),
            table: snapshot
                .table
                .into_iter()
                .map(|(e, f, n, v)| ((e, f, n), v))
                .collect(),
            relationships: snapshot.relationships,
        }
    }

    /// Serialize to the blob format workers/embedders exchange.
    pub fn to_blob(&self) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(&self.to_snapshot())?)
    }

    fn from_blob(blob: &[u8]) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_slice(blob)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Materialize a writable store seeded from `initial_blob` (§4.3,
    /// Design Note 9's bootstrap dance): the blob is written to a scratch
    /// file under `scratch_dir`, the scratch file is opened back up
    /// read-only, its contents are cloned into the writable copy this
    /// function returns, and only then is the scratch file unlinked — by
    /// which point this process, not the filesystem, owns the only copy.
    pub fn open_copy(initial_blob: &[u8], scratch_dir: &Path) -> Result<Self, StoreError> {
        let scratch_path = scratch_dir.join(format!("bootstrap-{}.json", nanoid::nanoid!(8)));
        std::fs::write(&scratch_path, initial_blob)?;

        let read_only = {
            let bytes = std::fs::read(&scratch_path)?;
            Self::from_blob(&bytes)?
        };
        let writable = read_only.clone();

        std::fs::remove_file(&scratch_path)?;
        Ok(writable)
    }
}

impl MeasurementStore for InMemoryStore {
    fn image_numbers(&self) -> Vec<ImageNumber> {
        self.manifest.clone()
    }

    fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    fn group_number(&self, image_number: ImageNumber) -> Option<GroupNumber> {
        self.groups.get(&image_number.get()).map(|(g, _)| *g)
    }

    fn group_index(&self, image_number: ImageNumber) -> Option<GroupIndex> {
        self.groups.get(&image_number.get()).map(|(_, i)| *i)
    }

    fn get(
        &self,
        entity: &str,
        feature: &str,
        image_number: ImageNumber,
    ) -> Option<MeasurementValue> {
        self.table.get(&(entity.to_string(), feature.to_string(), image_number.get())).cloned()
    }

    fn set(
        &mut self,
        entity: &str,
        feature: &str,
        image_number: ImageNumber,
        value: MeasurementValue,
    ) {
        self.table.insert((entity.to_string(), feature.to_string(), image_number.get()), value);
    }

    fn has_feature(&self, entity: &str, feature: &str) -> bool {
        self.table.keys().any(|(e, f, _)| e == entity && f == feature)
    }

    fn feature_names(&self, entity: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .table
            .keys()
            .filter(|(e, _, _)| e == entity)
            .map(|(_, f, _)| f.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.keys().map(|(e, _, _)| e.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    fn relationships(&self) -> &[RelationshipRecord] {
        &self.relationships
    }

    fn add_relationship(&mut self, record: RelationshipRecord) {
        self.relationships.push(record);
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
