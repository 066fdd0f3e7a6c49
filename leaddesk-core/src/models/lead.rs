//! Lead aggregate: borrowers, loan parameters, pipeline status, and the
//! append-only change log

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::touch::TouchType;

/// Upper bound on borrowers per lead
pub const MAX_BORROWERS: usize = 4;

/// Days without activity before a non-terminal lead is considered stale
pub const STALE_AFTER_DAYS: i64 = 3;

/// Pipeline lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeadStatus {
    New,
    AttemptedContact,
    InCommunication,
    ApplicationTaken,
    Processing,
    Funded,
    Archived,
    Lost,
}

impl LeadStatus {
    /// Terminal stages never count as stale
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Funded | Self::Archived | Self::Lost)
    }
}

/// Why an audited edit was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeReason {
    Correction,
    BorrowerRequest,
    ScenarioTest,
    Other,
}

/// Immutable audit record; written only by a committed reconciliation batch
/// or a direct structural edit (borrower add/remove)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Human-readable field label, e.g. "Loan interestRate"
    pub field: String,
    pub old_value: Value,
    pub new_value: Value,
    pub reason: ChangeReason,
    #[serde(default)]
    pub comment: Option<String>,
    pub author: String,
}

/// Person named on the loan; embedded in the lead, not independently
/// addressable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrower {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub is_primary: bool,
}

impl Borrower {
    /// Placeholder co-borrower created by the structural "add borrower" edit
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: "New".to_string(),
            last_name: "Borrower".to_string(),
            email: String::new(),
            phone: String::new(),
            is_primary: false,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Loan scenario value object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParams {
    pub loan_amount: f64,
    pub purchase_price: f64,
    pub interest_rate: f64,
    pub loan_type: String,
    pub loan_purpose: String,
    pub property_type: String,
    pub property_use: String,
    pub state: String,
    pub zip: String,
    pub credit_score: i64,
}

/// The central aggregate moving through the sales pipeline
///
/// Derived fields (`total_touches`, `last_touch_at`, `last_touch_type`) are
/// maintained by the touch ledger, never edited directly. `change_log` is
/// newest-first and only ever prepended to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    /// Owning loan officer; legacy records without one are migrated on read
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub processor_id: Option<Uuid>,
    pub borrowers: Vec<Borrower>,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_touch_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_touch_type: Option<TouchType>,
    #[serde(default)]
    pub total_touches: i64,
    #[serde(default)]
    pub next_follow_up: Option<DateTime<Utc>>,
    pub loan_params: LoanParams,
    #[serde(default)]
    pub change_log: Vec<ChangeLogEntry>,
}

impl Lead {
    /// The primary borrower; by convention index 0
    pub fn primary_borrower(&self) -> Option<&Borrower> {
        self.borrowers
            .iter()
            .find(|b| b.is_primary)
            .or_else(|| self.borrowers.first())
    }

    /// UI-level derived flag: non-terminal and no activity (touch or
    /// creation) within the staleness window. Never persisted.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let last_activity = self.last_touch_at.unwrap_or(self.created_at);
        now - last_activity > Duration::days(STALE_AFTER_DAYS)
    }
}
