//! End-to-end workflow tests: create → duplicate check → touch →
//! reconciled edit, exercised through the wired `Crm` state

use leaddesk_common::config::{AdvisoryConfig, AppConfig};
use leaddesk_core::db::{self, init::create_records_table};
use leaddesk_core::models::{
    Borrower, ChangeReason, LeadStatus, NewTouch, TouchOutcome, TouchType,
};
use leaddesk_core::services::EditSession;
use leaddesk_core::Crm;
use serde_json::json;
use sqlx::SqlitePool;
use uuid::Uuid;

async fn test_crm() -> Crm {
    // Surface service logs when running with RUST_LOG set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let pool = SqlitePool::connect(":memory:").await.unwrap();
    create_records_table(&pool).await.unwrap();
    let config = AppConfig {
        data_dir: ".".into(),
        advisory: AdvisoryConfig::default(),
    };
    let crm = Crm::with_pool(pool, &config);
    // Start from an empty book so assertions are deterministic
    db::leads::save(&crm.store, &[]).await.unwrap();
    crm
}

fn primary_borrower() -> Borrower {
    Borrower {
        id: Uuid::new_v4(),
        first_name: "Alex".to_string(),
        last_name: "Hart".to_string(),
        email: "a@x.com".to_string(),
        phone: "555-0123".to_string(),
        is_primary: true,
    }
}

#[tokio::test]
async fn full_lead_lifecycle_with_audited_rate_change() {
    let crm = test_crm().await;
    let users = db::users::load(&crm.store).await.unwrap();

    // Create a lead with one borrower
    let lead = crm
        .leads
        .create(vec![primary_borrower()], "PURCHASE")
        .await
        .unwrap();
    assert_eq!(lead.status, LeadStatus::New);

    // Duplicate detection hits on the email even with a non-matching phone
    let duplicate = crm
        .leads
        .find_duplicate("a@x.com", "000")
        .await
        .unwrap()
        .expect("expected a duplicate hit");
    assert_eq!(duplicate.id, lead.id);

    // A CALL/SPOKE touch nudges the pipeline and bumps the counters
    crm.touches
        .append(NewTouch {
            lead_id: lead.id,
            touch_type: TouchType::Call,
            outcome: TouchOutcome::Spoke,
            content: "Spoke about purchase timeline".to_string(),
            author: "Dana Whitfield".to_string(),
        })
        .await
        .unwrap();

    let touched = crm.leads.get(lead.id).await.unwrap().unwrap();
    assert_eq!(touched.status, LeadStatus::AttemptedContact);
    assert_eq!(touched.total_touches, 1);

    // Put a baseline rate on the lead, then edit it through reconciliation
    let mut with_rate = touched.clone();
    with_rate.loan_params.interest_rate = 7.125;
    let baseline = crm.leads.save(with_rate).await.unwrap();

    let mut session = EditSession::new(baseline);
    session.draft_mut().loan_params.interest_rate = 6.875;
    session.prepare_review(&users);
    assert_eq!(session.changes().len(), 1);

    session.set_reason("loan.interestRate", ChangeReason::Correction);
    let committed = session.execute_batch_save(&crm.leads).await.unwrap();

    assert_eq!(committed.loan_params.interest_rate, 6.875);
    let entry = &committed.change_log[0];
    assert_eq!(entry.field, "Loan interestRate");
    assert_eq!(entry.old_value, json!(7.125));
    assert_eq!(entry.new_value, json!(6.875));
    assert_eq!(entry.reason, ChangeReason::Correction);

    // The stored record agrees with what the commit returned
    let stored = crm.leads.get(lead.id).await.unwrap().unwrap();
    assert_eq!(stored, committed);
}

#[tokio::test]
async fn two_changes_deselected_restores_the_baseline() {
    let crm = test_crm().await;
    let users = db::users::load(&crm.store).await.unwrap();

    let lead = crm
        .leads
        .create(vec![primary_borrower()], "PURCHASE")
        .await
        .unwrap();
    let mut baseline = lead.clone();
    baseline.loan_params.loan_amount = 300_000.0;
    let baseline = crm.leads.save(baseline).await.unwrap();

    let mut session = EditSession::new(baseline.clone());
    session.draft_mut().status = LeadStatus::InCommunication;
    session.draft_mut().loan_params.loan_amount = 320_000.0;
    session.prepare_review(&users);
    assert_eq!(session.changes().len(), 2);

    for id in ["status", "loan.loanAmount"] {
        session.set_applied(id, false);
    }
    let committed = session.execute_batch_save(&crm.leads).await.unwrap();

    assert_eq!(committed.status, baseline.status);
    assert_eq!(committed.loan_params.loan_amount, 300_000.0);
    assert!(committed.change_log.is_empty());
}

#[tokio::test]
async fn export_reflects_workflow_state_and_reset_reseeds() {
    let crm = test_crm().await;

    let lead = crm
        .leads
        .create(vec![primary_borrower()], "PURCHASE")
        .await
        .unwrap();
    crm.touches
        .append(NewTouch {
            lead_id: lead.id,
            touch_type: TouchType::Email,
            outcome: TouchOutcome::Sent,
            content: "Sent pre-approval checklist".to_string(),
            author: "Dana Whitfield".to_string(),
        })
        .await
        .unwrap();

    let snapshot = db::export::export_snapshot(&crm.store).await.unwrap();
    assert_eq!(snapshot.leads.len(), 1);
    assert_eq!(snapshot.touches.len(), 1);
    assert_eq!(snapshot.users.len(), 3);
    assert_eq!(snapshot.leads[0].total_touches, 1);

    db::export::reset_all(&crm.store).await.unwrap();
    // Collections reseed on next access; the created lead is gone
    assert!(crm.leads.get(lead.id).await.unwrap().is_none());
    assert_eq!(db::users::load(&crm.store).await.unwrap().len(), 3);
}
