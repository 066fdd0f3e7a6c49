//! LeadDesk core — a small CRM for mortgage brokers
//!
//! Tracks leads through a sales pipeline, records interaction history
//! ("touches"), and layers a review/audit workflow over edits: field
//! changes are diffed against the persisted baseline, curated one by one,
//! and committed together with an append-only change log.

pub mod db;
pub mod models;
pub mod services;

pub use leaddesk_common::{Error, Result};

use leaddesk_common::config::AppConfig;
use sqlx::SqlitePool;

use crate::db::records::RecordStore;
use crate::services::{AdvisoryClient, LeadRepository, SessionProvider, TouchLedger};

/// Wired application state: one store, one session, and the services
/// layered on top
#[derive(Debug, Clone)]
pub struct Crm {
    pub store: RecordStore,
    pub session: SessionProvider,
    pub leads: LeadRepository,
    pub touches: TouchLedger,
    pub advisory: AdvisoryClient,
}

impl Crm {
    /// Open (or create) the database at the configured path and wire up
    /// the services
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let pool = db::init::init_database_pool(&config.database_path()).await?;
        Ok(Self::with_pool(pool, config))
    }

    /// Wire services over an existing pool (tests use in-memory pools)
    pub fn with_pool(pool: SqlitePool, config: &AppConfig) -> Self {
        let store = RecordStore::new(pool);
        let session = SessionProvider::new(store.clone());
        let leads = LeadRepository::new(store.clone(), session.clone());
        let touches = TouchLedger::new(store.clone(), session.clone());
        let advisory = AdvisoryClient::new(&config.advisory);
        Self {
            store,
            session,
            leads,
            touches,
            advisory,
        }
    }
}
