//! Touch collection access

use leaddesk_common::Result;

use crate::db::records::{RecordStore, TOUCHES_KEY};
use crate::db::seed;
use crate::models::Touch;

/// Load the full touch collection (seeds empty)
pub async fn load(store: &RecordStore) -> Result<Vec<Touch>> {
    store.load_collection(TOUCHES_KEY, seed::seed_touches).await
}

/// Persist the full touch collection
pub async fn save(store: &RecordStore, touches: &[Touch]) -> Result<()> {
    store.save_collection(TOUCHES_KEY, touches).await
}
