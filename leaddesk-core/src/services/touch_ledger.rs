//! Touch Ledger: append-only interaction log
//!
//! Appending and deleting touches also maintains the derived statistics on
//! the owning lead (`total_touches`, last-touch metadata, and the one-way
//! New → AttemptedContact status nudge). Lead updates here write straight
//! to the full collection — the ledger is not subject to visibility rules.

use chrono::Utc;
use leaddesk_common::Result;
use tracing::debug;
use uuid::Uuid;

use crate::db::records::RecordStore;
use crate::db::{leads, touches};
use crate::models::{Lead, LeadStatus, NewTouch, Role, Touch};
use crate::services::session::SessionProvider;

#[derive(Debug, Clone)]
pub struct TouchLedger {
    store: RecordStore,
    session: SessionProvider,
}

impl TouchLedger {
    pub fn new(store: RecordStore, session: SessionProvider) -> Self {
        Self { store, session }
    }

    /// Touches for one lead, newest first
    pub async fn list(&self, lead_id: Uuid) -> Result<Vec<Touch>> {
        let mut result: Vec<Touch> = touches::load(&self.store)
            .await?
            .into_iter()
            .filter(|t| t.lead_id == lead_id)
            .collect();
        result.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(result)
    }

    /// Append a touch (id and timestamp assigned here) and update the
    /// owning lead's derived stats. A touch referencing a lead that no
    /// longer exists is still recorded; the lead update is skipped.
    pub async fn append(&self, new: NewTouch) -> Result<Touch> {
        let touch = Touch {
            id: Uuid::new_v4(),
            lead_id: new.lead_id,
            touch_type: new.touch_type,
            outcome: new.outcome,
            content: new.content,
            timestamp: Utc::now(),
            author: new.author,
        };

        let mut all = touches::load(&self.store).await?;
        all.push(touch.clone());
        touches::save(&self.store, &all).await?;

        let mut all_leads = leads::load(&self.store).await?;
        match all_leads.iter_mut().find(|l| l.id == touch.lead_id) {
            Some(lead) => {
                lead.last_touch_at = Some(touch.timestamp);
                lead.last_touch_type = Some(touch.touch_type);
                lead.total_touches += 1;
                if lead.status == LeadStatus::New {
                    lead.status = LeadStatus::AttemptedContact;
                }
                lead.updated_at = touch.timestamp;
                leads::save(&self.store, &all_leads).await?;
            }
            None => {
                debug!(lead_id = %touch.lead_id, "Lead gone, skipping derived-stat update");
            }
        }

        Ok(touch)
    }

    /// Delete a touch and recompute the owning lead's derived stats from
    /// whatever touches remain. Admin-only: any other role is refused
    /// silently with no store write, like the other non-fatal fallbacks.
    /// Unknown ids are likewise a no-op. Status never reverts on delete.
    pub async fn delete(&self, touch_id: Uuid, lead_id: Uuid) -> Result<()> {
        let user = self.session.current_user().await?;
        if user.role != Role::Admin {
            debug!(user = %user.name, role = ?user.role, "Touch delete refused, admin only");
            return Ok(());
        }

        let mut all = touches::load(&self.store).await?;
        let before = all.len();
        all.retain(|t| t.id != touch_id);
        if all.len() == before {
            debug!(%touch_id, "Touch not found, nothing to delete");
            return Ok(());
        }
        touches::save(&self.store, &all).await?;

        let mut all_leads = leads::load(&self.store).await?;
        if let Some(lead) = all_leads.iter_mut().find(|l| l.id == lead_id) {
            recompute_touch_stats(lead, &all);
            leads::save(&self.store, &all_leads).await?;
        }
        Ok(())
    }
}

/// Rebuild `total_touches` and last-touch metadata from the remaining
/// touches for this lead; stamps `updated_at` like any other derived-stat
/// write
fn recompute_touch_stats(lead: &mut Lead, all_touches: &[Touch]) {
    let mut remaining: Vec<&Touch> = all_touches
        .iter()
        .filter(|t| t.lead_id == lead.id)
        .collect();
    remaining.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    lead.total_touches = remaining.len() as i64;
    lead.last_touch_at = remaining.first().map(|t| t.timestamp);
    lead.last_touch_type = remaining.first().map(|t| t.touch_type);
    lead.updated_at = Utc::now();
}
