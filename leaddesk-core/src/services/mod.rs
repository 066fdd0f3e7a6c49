//! Business services layered over the record store

pub mod advisory;
pub mod lead_repository;
pub mod reconcile;
pub mod session;
pub mod touch_ledger;
pub mod visibility;

pub use advisory::{AdvisoryClient, NextAction};
pub use lead_repository::LeadRepository;
pub use reconcile::{ChangeTarget, DetectedChange, EditSession, ReviewPhase};
pub use session::SessionProvider;
pub use touch_ledger::TouchLedger;
pub use visibility::visible_leads;
