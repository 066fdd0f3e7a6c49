//! Change Reconciliation Engine
//!
//! Per-lead edit session holding two copies of the lead: the persisted
//! baseline and an in-progress draft. `prepare_review` diffs the two into
//! independently curatable [`DetectedChange`] records; committing reverts
//! whatever the user rejected, writes one audit-log entry per accepted
//! change, and persists the merged lead as the new baseline.
//!
//! Structural borrower edits bypass the review flow entirely: they persist
//! (and log) the moment they are confirmed, regardless of unrelated edits
//! still pending in the draft.

use chrono::Utc;
use leaddesk_common::Result;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::models::{
    Borrower, ChangeLogEntry, ChangeReason, Lead, LoanParams, User, MAX_BORROWERS,
};
use crate::services::lead_repository::LeadRepository;

/// Editable borrower fields covered by the diff (id and isPrimary are not
/// user-editable)
const BORROWER_FIELDS: [&str; 4] = ["firstName", "lastName", "email", "phone"];

/// Edit-session lifecycle, derived from the session contents rather than
/// cached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewPhase {
    /// Draft identical to the persisted baseline
    Clean,
    /// Draft differs; no diff computed yet
    Dirty,
    /// Diff computed and awaiting curation
    Reviewing,
}

/// Which field a detected change reverts to when rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeTarget {
    Status,
    AssignedTo,
    ProcessorId,
    LoanParam(&'static str),
    BorrowerField {
        borrower_id: Uuid,
        field: &'static str,
    },
}

/// One field-level difference staged for user review
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedChange {
    /// Stable synthetic id, e.g. `loan.interestRate`
    pub id: String,
    pub target: ChangeTarget,
    /// Human-readable label carried into the audit log
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    pub reason: ChangeReason,
    pub comment: String,
    pub is_applied: bool,
}

impl DetectedChange {
    fn new(id: String, target: ChangeTarget, field: String, old: Value, new: Value) -> Self {
        Self {
            id,
            target,
            field,
            old_value: old,
            new_value: new,
            reason: ChangeReason::Correction,
            comment: String::new(),
            is_applied: true,
        }
    }
}

/// Dual-state edit session for one lead
#[derive(Debug, Clone)]
pub struct EditSession {
    persisted: Lead,
    draft: Lead,
    changes: Vec<DetectedChange>,
}

impl EditSession {
    pub fn new(persisted: Lead) -> Self {
        let draft = persisted.clone();
        Self {
            persisted,
            draft,
            changes: Vec::new(),
        }
    }

    pub fn persisted(&self) -> &Lead {
        &self.persisted
    }

    pub fn draft(&self) -> &Lead {
        &self.draft
    }

    /// Mutable access for field edits; structural borrower edits go through
    /// [`Self::add_borrower`] / [`Self::remove_borrower`] instead
    pub fn draft_mut(&mut self) -> &mut Lead {
        &mut self.draft
    }

    pub fn changes(&self) -> &[DetectedChange] {
        &self.changes
    }

    /// Deep structural comparison, recomputed on every call
    pub fn is_dirty(&self) -> bool {
        self.persisted != self.draft
    }

    pub fn phase(&self) -> ReviewPhase {
        if !self.changes.is_empty() {
            ReviewPhase::Reviewing
        } else if self.is_dirty() {
            ReviewPhase::Dirty
        } else {
            ReviewPhase::Clean
        }
    }

    /// Compute the diff set in fixed source order: status, assignment,
    /// loan parameters, borrower fields. Assignment changes are displayed
    /// as resolved user names; reverting them still restores the original
    /// ids. Borrowers present only in the draft (newly added) are skipped —
    /// the structural path already logged their creation.
    pub fn prepare_review(&mut self, users: &[User]) {
        let mut changes = Vec::new();

        if self.persisted.status != self.draft.status {
            changes.push(DetectedChange::new(
                "status".to_string(),
                ChangeTarget::Status,
                "Status".to_string(),
                json!(self.persisted.status),
                json!(self.draft.status),
            ));
        }

        if self.persisted.assigned_to != self.draft.assigned_to {
            changes.push(DetectedChange::new(
                "assignedTo".to_string(),
                ChangeTarget::AssignedTo,
                "Loan Officer".to_string(),
                display_name(users, self.persisted.assigned_to),
                display_name(users, self.draft.assigned_to),
            ));
        }

        if self.persisted.processor_id != self.draft.processor_id {
            changes.push(DetectedChange::new(
                "processorId".to_string(),
                ChangeTarget::ProcessorId,
                "Processor".to_string(),
                display_name(users, self.persisted.processor_id),
                display_name(users, self.draft.processor_id),
            ));
        }

        let old_params = loan_param_values(&self.persisted.loan_params);
        let new_params = loan_param_values(&self.draft.loan_params);
        for ((key, old), (_, new)) in old_params.into_iter().zip(new_params) {
            if !loosely_equal(&old, &new) {
                changes.push(DetectedChange::new(
                    format!("loan.{key}"),
                    ChangeTarget::LoanParam(key),
                    format!("Loan {key}"),
                    old,
                    new,
                ));
            }
        }

        for (index, draft_b) in self.draft.borrowers.iter().enumerate() {
            let Some(persisted_b) = self
                .persisted
                .borrowers
                .iter()
                .find(|b| b.id == draft_b.id)
            else {
                continue;
            };
            for field in BORROWER_FIELDS {
                let old = borrower_field(persisted_b, field);
                let new = borrower_field(draft_b, field);
                if old != new {
                    changes.push(DetectedChange::new(
                        format!("borrower.{}.{}", draft_b.id, field),
                        ChangeTarget::BorrowerField {
                            borrower_id: draft_b.id,
                            field,
                        },
                        format!("Borrower {} {}", index + 1, field),
                        json!(old),
                        json!(new),
                    ));
                }
            }
        }

        debug!(count = changes.len(), "Prepared review");
        self.changes = changes;
    }

    /// Toggle whether a change will be applied; marks intent only, the
    /// draft is untouched. Unknown ids are ignored.
    pub fn set_applied(&mut self, change_id: &str, applied: bool) {
        if let Some(change) = self.change_mut(change_id) {
            change.is_applied = applied;
        }
    }

    pub fn set_reason(&mut self, change_id: &str, reason: ChangeReason) {
        if let Some(change) = self.change_mut(change_id) {
            change.reason = reason;
        }
    }

    pub fn set_comment(&mut self, change_id: &str, comment: impl Into<String>) {
        if let Some(change) = self.change_mut(change_id) {
            change.comment = comment.into();
        }
    }

    /// Commit the curated batch: rejected changes revert to their recorded
    /// old values (assignment reverts to the original persisted ids),
    /// accepted changes each gain an audit-log entry prepended newest-first,
    /// and the merged lead persists as the new baseline. Committing with
    /// zero accepted changes is legal and writes zero entries.
    pub async fn execute_batch_save(&mut self, repo: &LeadRepository) -> Result<Lead> {
        let author = repo.session().current_user().await?.name;
        let now = Utc::now();
        let mut merged = self.draft.clone();
        let mut entries = Vec::new();

        for change in &self.changes {
            if change.is_applied {
                entries.push(ChangeLogEntry {
                    id: Uuid::new_v4(),
                    timestamp: now,
                    field: change.field.clone(),
                    old_value: change.old_value.clone(),
                    new_value: change.new_value.clone(),
                    reason: change.reason,
                    comment: if change.comment.is_empty() {
                        None
                    } else {
                        Some(change.comment.clone())
                    },
                    author: author.clone(),
                });
                continue;
            }

            match &change.target {
                ChangeTarget::Status => merged.status = self.persisted.status,
                // Assignment diffs carry display names; revert from the
                // persisted ids, not the rendered values
                ChangeTarget::AssignedTo => merged.assigned_to = self.persisted.assigned_to,
                ChangeTarget::ProcessorId => merged.processor_id = self.persisted.processor_id,
                ChangeTarget::LoanParam(key) => {
                    apply_loan_param(&mut merged.loan_params, key, &change.old_value);
                }
                ChangeTarget::BorrowerField { borrower_id, field } => {
                    if let Some(b) = merged.borrowers.iter_mut().find(|b| b.id == *borrower_id) {
                        apply_borrower_field(b, field, change.old_value.as_str().unwrap_or(""));
                    }
                }
            }
        }

        let new_entry_count = entries.len();
        entries.extend(merged.change_log.drain(..));
        merged.change_log = entries;

        let saved = repo.save(merged).await?;
        debug!(lead_id = %saved.id, entries = new_entry_count, "Committed reconciliation batch");
        self.persisted = saved.clone();
        self.draft = saved.clone();
        self.changes.clear();
        Ok(saved)
    }

    /// Throw away the draft: replaced by a fresh copy of the persisted
    /// baseline, no log entries written
    pub fn discard(&mut self) {
        self.draft = self.persisted.clone();
        self.changes.clear();
    }

    /// Structural edit: append a placeholder co-borrower and persist
    /// immediately with its own audit entry. No-op at the borrower cap.
    pub async fn add_borrower(&mut self, repo: &LeadRepository) -> Result<()> {
        if self.draft.borrowers.len() >= MAX_BORROWERS {
            debug!(lead_id = %self.draft.id, "Borrower cap reached, ignoring add");
            return Ok(());
        }
        let author = repo.session().current_user().await?.name;
        let borrower = Borrower::placeholder();
        let entry = ChangeLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            field: "Borrower Added".to_string(),
            old_value: Value::Null,
            new_value: json!(borrower.display_name()),
            reason: ChangeReason::BorrowerRequest,
            comment: None,
            author,
        };

        let mut base = self.persisted.clone();
        base.borrowers.push(borrower.clone());
        base.change_log.insert(0, entry);
        let saved = repo.save(base).await?;

        // Mirror the structural change into the draft without disturbing
        // whatever field edits are still pending
        self.draft.borrowers.push(borrower);
        self.draft.change_log = saved.change_log.clone();
        self.draft.updated_at = saved.updated_at;
        self.persisted = saved;
        Ok(())
    }

    /// Structural edit: remove a non-primary borrower and persist
    /// immediately with its own audit entry. Removing the primary borrower
    /// or an unknown id is a no-op.
    pub async fn remove_borrower(&mut self, repo: &LeadRepository, borrower_id: Uuid) -> Result<()> {
        let Some(position) = self
            .draft
            .borrowers
            .iter()
            .position(|b| b.id == borrower_id)
        else {
            return Ok(());
        };
        if position == 0 || self.draft.borrowers[position].is_primary {
            debug!(lead_id = %self.draft.id, "Primary borrower cannot be removed");
            return Ok(());
        }

        let author = repo.session().current_user().await?.name;
        let removed_name = self.draft.borrowers[position].display_name();
        let entry = ChangeLogEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            field: "Borrower Removed".to_string(),
            old_value: json!(removed_name),
            new_value: Value::Null,
            reason: ChangeReason::Other,
            comment: None,
            author,
        };

        let mut base = self.persisted.clone();
        base.borrowers.retain(|b| b.id != borrower_id);
        base.change_log.insert(0, entry);
        let saved = repo.save(base).await?;

        self.draft.borrowers.remove(position);
        self.changes.retain(|c| {
            !matches!(c.target, ChangeTarget::BorrowerField { borrower_id: id, .. } if id == borrower_id)
        });
        self.draft.change_log = saved.change_log.clone();
        self.draft.updated_at = saved.updated_at;
        self.persisted = saved;
        Ok(())
    }

    fn change_mut(&mut self, change_id: &str) -> Option<&mut DetectedChange> {
        self.changes.iter_mut().find(|c| c.id == change_id)
    }
}

/// Render an assignment id as a user display name
fn display_name(users: &[User], id: Option<Uuid>) -> Value {
    match id.and_then(|id| users.iter().find(|u| u.id == id)) {
        Some(user) => json!(user.name),
        None => json!("Unassigned"),
    }
}

/// Loan parameter values in declared field order, keyed by their stored
/// (camelCase) names
fn loan_param_values(params: &LoanParams) -> Vec<(&'static str, Value)> {
    vec![
        ("loanAmount", json!(params.loan_amount)),
        ("purchasePrice", json!(params.purchase_price)),
        ("interestRate", json!(params.interest_rate)),
        ("loanType", json!(params.loan_type)),
        ("loanPurpose", json!(params.loan_purpose)),
        ("propertyType", json!(params.property_type)),
        ("propertyUse", json!(params.property_use)),
        ("state", json!(params.state)),
        ("zip", json!(params.zip)),
        ("creditScore", json!(params.credit_score)),
    ]
}

fn apply_loan_param(params: &mut LoanParams, key: &str, value: &Value) {
    match key {
        "loanAmount" => {
            if let Some(v) = numeric(value) {
                params.loan_amount = v;
            }
        }
        "purchasePrice" => {
            if let Some(v) = numeric(value) {
                params.purchase_price = v;
            }
        }
        "interestRate" => {
            if let Some(v) = numeric(value) {
                params.interest_rate = v;
            }
        }
        "creditScore" => {
            if let Some(v) = numeric(value) {
                params.credit_score = v as i64;
            }
        }
        "loanType" => params.loan_type = value.as_str().unwrap_or("").to_string(),
        "loanPurpose" => params.loan_purpose = value.as_str().unwrap_or("").to_string(),
        "propertyType" => params.property_type = value.as_str().unwrap_or("").to_string(),
        "propertyUse" => params.property_use = value.as_str().unwrap_or("").to_string(),
        "state" => params.state = value.as_str().unwrap_or("").to_string(),
        "zip" => params.zip = value.as_str().unwrap_or("").to_string(),
        _ => {}
    }
}

fn borrower_field(borrower: &Borrower, field: &str) -> String {
    match field {
        "firstName" => borrower.first_name.clone(),
        "lastName" => borrower.last_name.clone(),
        "email" => borrower.email.clone(),
        "phone" => borrower.phone.clone(),
        _ => String::new(),
    }
}

fn apply_borrower_field(borrower: &mut Borrower, field: &str, value: &str) {
    match field {
        "firstName" => borrower.first_name = value.to_string(),
        "lastName" => borrower.last_name = value.to_string(),
        "email" => borrower.email = value.to_string(),
        "phone" => borrower.phone = value.to_string(),
        _ => {}
    }
}

/// Loose equality for loan parameter values: `0`, `0.0`, and `"0"` all
/// count as "no change", so values that round-tripped through storage as
/// strings never produce spurious diffs
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}
