//! Touch records: one logged interaction with a lead

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interaction channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchType {
    Call,
    Email,
    Text,
    Meeting,
    Note,
}

/// What came of the interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchOutcome {
    Spoke,
    LeftVoicemail,
    NoAnswer,
    Sent,
    Received,
    Completed,
    None,
}

/// Immutable interaction record, linked to its lead by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touch {
    pub id: Uuid,
    pub lead_id: Uuid,
    #[serde(rename = "type")]
    pub touch_type: TouchType,
    pub outcome: TouchOutcome,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
}

/// Caller-supplied fields for a touch about to be appended; the ledger
/// assigns the id and timestamp
#[derive(Debug, Clone)]
pub struct NewTouch {
    pub lead_id: Uuid,
    pub touch_type: TouchType,
    pub outcome: TouchOutcome,
    pub content: String,
    pub author: String,
}
