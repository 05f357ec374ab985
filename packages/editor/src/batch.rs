//! Ordered edit lists with per-edit failure isolation

use crate::patcher::Patcher;
use crate::types::{BatchResult, EditRequest, EditResult};
use pinpoint_common::{panic_message, FileSystem};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

impl<F: FileSystem> Patcher<F> {
    /// Apply `requests` in order. Each edit reads its file fresh, so later
    /// edits see earlier ones; a failing or panicking edit does not stop
    /// the rest.
    pub fn apply_batch(&self, requests: &[EditRequest]) -> BatchResult {
        let results: Vec<EditResult> = requests
            .iter()
            .map(|request| {
                catch_unwind(AssertUnwindSafe(|| self.apply_edit(request))).unwrap_or_else(|payload| {
                    let message = panic_message(&*payload);
                    tracing::error!("Edit of {} panicked: {}", request.file_path, message);
                    EditResult::failed(request, format!("Edit panicked: {}", message))
                })
            })
            .collect();

        let batch = BatchResult::from_results(results);
        tracing::info!(
            "Batch finished: {} total, {} succeeded, {} failed",
            batch.summary.total,
            batch.summary.success,
            batch.summary.failed
        );
        batch
    }
}

/// Apply a batch against the real file system
pub fn apply_batch(root_dir: impl AsRef<Path>, requests: &[EditRequest]) -> BatchResult {
    Patcher::new(root_dir.as_ref()).apply_batch(requests)
}
