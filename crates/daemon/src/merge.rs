//! Measurement merge rules (§4.8), invoked by the interface loop (C7) once
//! per drained `received_measurements_queue` entry.

use ac_core::{ImageNumber, ProcessingStatus};
use ac_store::{entity, MeasurementStore};

/// Merge `received` into `main` for exactly the image numbers in `batch`:
/// - `Experiment` is skipped entirely.
/// - `Image` features are written only where the remote value differs
///   from (or is absent in) the local store.
/// - Every other entity's features are written unconditionally.
///
/// Relationships are merged additively, and every image number in `batch`
/// is finally marked `Done`.
pub fn merge_received(
    main: &mut dyn MeasurementStore,
    received: &dyn MeasurementStore,
    batch: &[ImageNumber],
) {
    for object in received.object_names() {
        if object == entity::EXPERIMENT {
            continue;
        }

        if object == entity::IMAGE {
            for feature in received.feature_names(&object) {
                for &n in batch {
                    let Some(remote) = received.get(&object, &feature, n) else { continue };
                    let differs = match main.get(&object, &feature, n) {
                        Some(local) => remote.differs_from(&local),
                        None => true,
                    };
                    if differs {
                        main.set(&object, &feature, n, remote);
                    }
                }
            }
        } else {
            for feature in received.feature_names(&object) {
                for &n in batch {
                    if let Some(remote) = received.get(&object, &feature, n) {
                        main.set(&object, &feature, n, remote);
                    }
                }
            }
        }
    }

    main.copy_relationships(received);

    for &n in batch {
        main.set_status(n, ProcessingStatus::Done);
    }
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
