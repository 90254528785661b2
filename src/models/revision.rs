//! Revision counter exposed in every response envelope.

use serde::{Deserialize, Serialize};

/// Revision information for change detection.
///
/// Every write to the catalog bumps `revision_id`, so storefront caches can
/// poll this instead of refetching lookbooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
