//! Lead Repository: CRUD and duplicate detection over the lead collection
//!
//! Reads are filtered through the access control rules; writes always run
//! against the full unfiltered collection so a narrow-visibility user can
//! never clobber leads they cannot see.

use chrono::Utc;
use leaddesk_common::{Error, Result};
use tracing::debug;
use uuid::Uuid;

use crate::db::records::RecordStore;
use crate::db::{leads, seed};
use crate::models::{Borrower, Lead, LeadStatus, LoanParams, MAX_BORROWERS};
use crate::services::session::SessionProvider;
use crate::services::visibility::visible_leads;

#[derive(Debug, Clone)]
pub struct LeadRepository {
    store: RecordStore,
    session: SessionProvider,
}

impl LeadRepository {
    pub fn new(store: RecordStore, session: SessionProvider) -> Self {
        Self { store, session }
    }

    pub fn session(&self) -> &SessionProvider {
        &self.session
    }

    /// Leads visible to the current user, with legacy records migrated
    pub async fn list(&self) -> Result<Vec<Lead>> {
        let user = self.session.current_user().await?;
        let all = self.load_all_migrated().await?;
        Ok(visible_leads(all, &user))
    }

    /// Look up one visible lead. An invisible lead reads as absent — the
    /// caller cannot distinguish "not found" from "not authorized".
    pub async fn get(&self, id: Uuid) -> Result<Option<Lead>> {
        Ok(self.list().await?.into_iter().find(|lead| lead.id == id))
    }

    /// Scan visible leads' borrowers (all of them, not just the primary)
    /// for a matching email (case-insensitive) or phone (exact). Empty
    /// query values never match; first hit in collection order wins.
    pub async fn find_duplicate(&self, email: &str, phone: &str) -> Result<Option<Lead>> {
        let email = email.trim();
        let phone = phone.trim();
        if email.is_empty() && phone.is_empty() {
            return Ok(None);
        }
        let email_lower = email.to_lowercase();

        for lead in self.list().await? {
            let hit = lead.borrowers.iter().any(|b| {
                let email_hit = !email.is_empty() && b.email.to_lowercase() == email_lower;
                let phone_hit = !phone.is_empty() && b.phone == phone;
                email_hit || phone_hit
            });
            if hit {
                return Ok(Some(lead));
            }
        }
        Ok(None)
    }

    /// Upsert against the full collection, matched by id.
    ///
    /// Updates stamp `updated_at` and preserve the caller's `created_at`;
    /// inserts stamp both and default ownership to the session user.
    pub async fn save(&self, mut lead: Lead) -> Result<Lead> {
        let mut all = leads::load(&self.store).await?;
        let now = Utc::now();

        match all.iter_mut().find(|existing| existing.id == lead.id) {
            Some(slot) => {
                lead.updated_at = now;
                *slot = lead.clone();
            }
            None => {
                if lead.assigned_to.is_none() {
                    lead.assigned_to = Some(self.session.current_user().await?.id);
                }
                lead.created_at = now;
                lead.updated_at = now;
                all.push(lead.clone());
            }
        }

        leads::save(&self.store, &all).await?;
        debug!(lead_id = %lead.id, "Saved lead");
        Ok(lead)
    }

    /// Create a new lead: fresh ids throughout, initial pipeline status,
    /// zeroed loan numerics, owned by the session user
    pub async fn create(&self, borrowers: Vec<Borrower>, purpose: &str) -> Result<Lead> {
        if borrowers.is_empty() {
            return Err(Error::InvalidInput(
                "a lead requires at least one borrower".to_string(),
            ));
        }
        if borrowers.len() > MAX_BORROWERS {
            return Err(Error::InvalidInput(format!(
                "a lead allows at most {MAX_BORROWERS} borrowers"
            )));
        }

        let user = self.session.current_user().await?;
        let now = Utc::now();
        let borrowers = borrowers
            .into_iter()
            .enumerate()
            .map(|(i, b)| Borrower {
                id: Uuid::new_v4(),
                is_primary: i == 0,
                ..b
            })
            .collect();

        let lead = Lead {
            id: Uuid::new_v4(),
            assigned_to: Some(user.id),
            processor_id: None,
            borrowers,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
            last_touch_at: None,
            last_touch_type: None,
            total_touches: 0,
            next_follow_up: None,
            loan_params: LoanParams {
                loan_purpose: purpose.to_string(),
                ..LoanParams::default()
            },
            change_log: Vec::new(),
        };

        self.save(lead).await
    }

    /// Full collection with legacy defaults filled in before filtering
    async fn load_all_migrated(&self) -> Result<Vec<Lead>> {
        let mut all = leads::load(&self.store).await?;
        for lead in &mut all {
            if lead.assigned_to.is_none() {
                lead.assigned_to = Some(seed::FALLBACK_OFFICER_ID);
            }
        }
        Ok(all)
    }
}
