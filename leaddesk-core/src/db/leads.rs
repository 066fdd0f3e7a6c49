//! Lead collection access
//!
//! These are the FULL-collection load/save used by read-modify-write
//! cycles. Visibility filtering happens above this layer; applying it here
//! would silently drop leads the current user cannot see on the next save.

use leaddesk_common::Result;

use crate::db::records::{RecordStore, LEADS_KEY};
use crate::db::seed;
use crate::models::Lead;

/// Load the full lead collection, seeding defaults on first access
pub async fn load(store: &RecordStore) -> Result<Vec<Lead>> {
    store.load_collection(LEADS_KEY, seed::seed_leads).await
}

/// Persist the full lead collection
pub async fn save(store: &RecordStore, leads: &[Lead]) -> Result<()> {
    store.save_collection(LEADS_KEY, leads).await
}
