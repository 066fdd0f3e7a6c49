//! Bulk export snapshots and the destructive reset

use chrono::{DateTime, Utc};
use leaddesk_common::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::records::{RecordStore, CURRENT_USER_KEY, LEADS_KEY, TOUCHES_KEY, USERS_KEY};
use crate::db::{leads, touches, users};
use crate::models::{Lead, Touch, User};

/// Informal schema tag stamped into snapshots
const EXPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub exported_at: DateTime<Utc>,
    pub version: String,
}

/// Point-in-time copy of all three collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub leads: Vec<Lead>,
    pub touches: Vec<Touch>,
    pub users: Vec<User>,
    pub meta: ExportMeta,
}

/// Export everything; goes through the normal accessors, so a snapshot of
/// a fresh store observes (and writes) the seed data
pub async fn export_snapshot(store: &RecordStore) -> Result<ExportSnapshot> {
    let snapshot = ExportSnapshot {
        leads: leads::load(store).await?,
        touches: touches::load(store).await?,
        users: users::load(store).await?,
        meta: ExportMeta {
            exported_at: Utc::now(),
            version: EXPORT_VERSION.to_string(),
        },
    };
    info!(
        leads = snapshot.leads.len(),
        touches = snapshot.touches.len(),
        "Exported snapshot"
    );
    Ok(snapshot)
}

/// Destructive reset: clears all collections and the current-user pointer
/// so the next access reseeds
pub async fn reset_all(store: &RecordStore) -> Result<()> {
    for key in [LEADS_KEY, TOUCHES_KEY, USERS_KEY, CURRENT_USER_KEY] {
        store.delete(key).await?;
    }
    info!("Reset all collections; next access reseeds");
    Ok(())
}
