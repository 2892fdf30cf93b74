//! Bulk deletion of resource handles.

use crate::client::ResourceClient;
use crate::error::LifecycleError;
use crate::resource::Resource;
use sagekit_resources::ResourceKind;
use tracing::{info, warn};

/// Outcome of [`delete_all`].
///
/// Failed handles are returned with the error that stopped them, so the
/// caller can retry after the resource reaches a deletable state.
#[derive(Debug)]
pub struct BatchDeleteReport<K: ResourceKind> {
    pub deleted: Vec<String>,
    pub failed: Vec<(Resource<K>, LifecycleError)>,
}

impl<K: ResourceKind> BatchDeleteReport<K> {
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }
}

/// Deletes every handle in turn, continuing past individual failures.
pub fn delete_all<K: ResourceKind>(
    client: &ResourceClient<K>,
    handles: impl IntoIterator<Item = Resource<K>>,
) -> BatchDeleteReport<K> {
    let mut report = BatchDeleteReport { deleted: Vec::new(), failed: Vec::new() };

    for handle in handles {
        match client.delete(&handle) {
            Ok(()) => report.deleted.push(handle.name().to_string()),
            Err(err) => {
                warn!(name = %handle.name(), error = %err, "Failed to delete resource");
                report.failed.push((handle, err));
            }
        }
    }

    info!(
        resource = K::schema().type_name,
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "Batch delete finished"
    );
    report
}
