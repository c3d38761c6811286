//! The pipeline contract (§3): opaque to the core except for serializability,
//! module count, and the aggregation flag.

/// Per-module state produced during the first image set of a run and reused
/// by every subsequent image set on that run. Opaque to the coordinator —
/// it is round-tripped, never interpreted.
pub type SharedDictionary = serde_json::Value;

/// One shared dictionary per pipeline module, in module order.
pub type SharedDictionaries = Vec<SharedDictionary>;

/// A declarative, serializable sequence of processing modules.
///
/// Everything about *what* a module does is external to the coordinator;
/// only scheduling-relevant facts (module count, aggregation need,
/// serializability) and the two run-completion callbacks cross this
/// boundary.
pub trait Pipeline: Send + Sync {
    /// Number of modules in the pipeline. Used to validate shared-dictionary
    /// length after bootstrap (§3 invariant).
    fn module_count(&self) -> usize;

    /// Whether any module declares a need to run a post-group aggregation
    /// step over a complete group before its results are meaningful. Forces
    /// `overwrite = true` and one-job-per-group dispatch in the planner.
    fn requires_aggregation(&self) -> bool;

    /// Serialize the pipeline into the opaque blob format workers expect
    /// (the dumper itself is an external collaborator, §1).
    fn serialize(&self) -> Vec<u8>;

    /// Group-level finalization hook. Invoked by the interface loop once,
    /// after every image set reaches `Done`, but only when no job in the
    /// run carried `worker_runs_post_group` — grouped/aggregation runs
    /// already had their worker run this step per group. Pipelines with no
    /// such hook are a no-op.
    fn post_group(&self) {}

    /// Run-level finalization hook invoked once by the interface loop after
    /// every image set reaches `Done`, before `Finished` is posted. Module
    /// execution proper happens in workers and is out of the core's scope;
    /// this is the one pipeline-level callback the core itself calls,
    /// producing the data forwarded as `DisplayPostRun`. Pipelines with no
    /// such hook return `None`.
    fn post_run(&self) -> Option<serde_json::Value> {
        None
    }
}

/// Validate the bootstrap invariant: after the first image set completes,
/// the shared-dictionaries vector must have exactly one entry per module.
pub fn validate_shared_dictionaries(
    pipeline: &dyn Pipeline,
    dictionaries: &SharedDictionaries,
) -> Result<(), crate::error::CoordinatorError> {
    if dictionaries.len() != pipeline.module_count() {
        return Err(crate::error::CoordinatorError::Planning(format!(
            "shared dictionary bootstrap produced {} entries, pipeline has {} modules",
            dictionaries.len(),
            pipeline.module_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
