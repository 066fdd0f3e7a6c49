//! User collection access

use leaddesk_common::Result;

use crate::db::records::{RecordStore, USERS_KEY};
use crate::db::seed;
use crate::models::User;

/// Load the user collection, seeding defaults on first access
pub async fn load(store: &RecordStore) -> Result<Vec<User>> {
    store.load_collection(USERS_KEY, seed::seed_users).await
}
