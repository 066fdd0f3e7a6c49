//! User identities and roles

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role driving lead visibility decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Sees everything, may delete touches
    Admin,
    /// Sees only leads assigned to them
    LoanOfficer,
    /// Sees everything (needs the full pipeline to work files)
    Processor,
}

/// Seeded identity; immutable apart from the session's "current user" pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}
