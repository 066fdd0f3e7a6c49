//! Access Control Filter
//!
//! Pure role-based narrowing of the lead collection. Every outward read
//! path applies this; persistence cycles never do.

use crate::models::{Lead, Role, User};

/// Leads the given user may see: admins and processors see everything,
/// loan officers only their own book
pub fn visible_leads(all: Vec<Lead>, user: &User) -> Vec<Lead> {
    match user.role {
        Role::Admin | Role::Processor => all,
        Role::LoanOfficer => all
            .into_iter()
            .filter(|lead| lead.assigned_to == Some(user.id))
            .collect(),
    }
}
