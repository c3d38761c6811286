//! Job planner (C5, §4.5): a pure function from store state + pipeline
//! flags to the set of image sets that need (re)processing and their
//! partition into jobs.

use ac_core::{CoordinatorError, GroupNumber, ImageNumber, Job, Pipeline, ProcessingStatus};
use ac_store::MeasurementStore;
use std::collections::BTreeMap;

/// An inclusive `[start, end]` window over image numbers. The planner does
/// not validate that the window respects group boundaries — a documented
/// caller precondition (§4.5 Correctness note).
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub start: ImageNumber,
    pub end: ImageNumber,
}

pub struct PlanResult {
    pub jobs: Vec<Job>,
    /// Every image number selected for (re)processing — the set the
    /// interface loop's progress histogram and completion check track.
    pub image_sets_to_process: Vec<ImageNumber>,
    /// Whether jobs are one-per-group (grouped run or aggregation
    /// pipeline) — decides how the interface loop seeds the work queue.
    pub grouped: bool,
}

/// Compute the plan. `store` is mutated in place: every image number the
/// plan retains for processing has its status reset to `Unprocessed`.
pub fn plan(
    store: &mut dyn MeasurementStore,
    window: Option<Window>,
    overwrite: bool,
    pipeline: &dyn Pipeline,
) -> Result<PlanResult, CoordinatorError> {
    let manifest = store.image_numbers();
    if manifest.is_empty() {
        return Err(CoordinatorError::Planning("manifest has no image numbers".to_string()));
    }

    let overwrite = overwrite || pipeline.requires_aggregation();
    let grouped = store.has_groups() || pipeline.requires_aggregation();

    let (start, end) = match window {
        Some(w) => (w.start, w.end),
        None => (manifest[0], *manifest.last().unwrap()),
    };
    let selected: Vec<ImageNumber> =
        manifest.iter().copied().filter(|n| *n >= start && *n <= end).collect();

    // Group completion is computed over the whole manifest's membership,
    // not just the selected window, since a window may cover only part of
    // a group.
    let mut group_done: BTreeMap<GroupNumber, bool> = BTreeMap::new();
    if store.has_groups() && !overwrite {
        let mut group_members: BTreeMap<GroupNumber, Vec<ImageNumber>> = BTreeMap::new();
        for n in &manifest {
            if let Some(g) = store.group_number(*n) {
                group_members.entry(g).or_default().push(*n);
            }
        }
        for (group, members) in group_members {
            let done = members.iter().all(|n| store.status(*n) == Some(ProcessingStatus::Done));
            group_done.insert(group, done);
        }
    }

    let mut image_sets_to_process = Vec::new();
    for n in selected {
        let status = store.status(n);
        let group_not_done = store.has_groups()
            && !overwrite
            && store.group_number(n).map(|g| !group_done.get(&g).copied().unwrap_or(false)).unwrap_or(true);

        let needs_reset =
            overwrite || status.is_none() || status != Some(ProcessingStatus::Done) || group_not_done;

        if needs_reset {
            store.set_status(n, ProcessingStatus::Unprocessed);
            image_sets_to_process.push(n);
        }
    }

    let jobs = if grouped {
        partition_by_group(store, &image_sets_to_process)
    } else {
        image_sets_to_process.iter().map(|n| Job::new(vec![*n], false, false)).collect()
    };

    Ok(PlanResult { jobs, image_sets_to_process, grouped })
}

fn partition_by_group(store: &dyn MeasurementStore, image_numbers: &[ImageNumber]) -> Vec<Job> {
    let mut groups: BTreeMap<GroupNumber, Vec<ImageNumber>> = BTreeMap::new();
    for &n in image_numbers {
        let group = store.group_number(n).unwrap_or(GroupNumber(0));
        groups.entry(group).or_default().push(n);
    }
    groups
        .into_iter()
        .map(|(group, mut members)| {
            members.sort_by_key(|n| store.group_index(*n).map(|i| i.0).unwrap_or(0));
            let _ = group;
            Job::new(members, true, false)
        })
        .collect()
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
