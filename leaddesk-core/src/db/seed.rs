//! First-run seed data
//!
//! Seed ids are fixed so that tests and legacy-record migration can refer
//! to them. The seed loan officer doubles as the fallback owner for stored
//! leads that predate the `assignedTo` field.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Borrower, Lead, LeadStatus, LoanParams, Role, Touch, User};

/// Seed admin; also the default current user when the pointer is unset
pub const ADMIN_USER_ID: Uuid = Uuid::from_u128(0x1dde_5c01_0000_0000_0000_0000_0000_0001);
/// Seed loan officer; fallback owner for legacy leads missing `assignedTo`
pub const FALLBACK_OFFICER_ID: Uuid = Uuid::from_u128(0x1dde_5c01_0000_0000_0000_0000_0000_0002);
/// Seed processor
pub const PROCESSOR_USER_ID: Uuid = Uuid::from_u128(0x1dde_5c01_0000_0000_0000_0000_0000_0003);

pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: ADMIN_USER_ID,
            name: "Dana Whitfield".to_string(),
            role: Role::Admin,
        },
        User {
            id: FALLBACK_OFFICER_ID,
            name: "Marcus Bell".to_string(),
            role: Role::LoanOfficer,
        },
        User {
            id: PROCESSOR_USER_ID,
            name: "Priya Nair".to_string(),
            role: Role::Processor,
        },
    ]
}

pub fn seed_leads() -> Vec<Lead> {
    let now = Utc::now();
    vec![
        Lead {
            id: Uuid::new_v4(),
            assigned_to: Some(FALLBACK_OFFICER_ID),
            processor_id: None,
            borrowers: vec![Borrower {
                id: Uuid::new_v4(),
                first_name: "Morgan".to_string(),
                last_name: "Avery".to_string(),
                email: "morgan.avery@example.com".to_string(),
                phone: "555-0188".to_string(),
                is_primary: true,
            }],
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
            last_touch_at: None,
            last_touch_type: None,
            total_touches: 0,
            next_follow_up: None,
            loan_params: LoanParams {
                loan_amount: 420_000.0,
                purchase_price: 525_000.0,
                interest_rate: 6.99,
                loan_type: "CONVENTIONAL".to_string(),
                loan_purpose: "PURCHASE".to_string(),
                property_type: "SFR".to_string(),
                property_use: "PRIMARY".to_string(),
                state: "CA".to_string(),
                zip: "95814".to_string(),
                credit_score: 742,
            },
            change_log: Vec::new(),
        },
        Lead {
            id: Uuid::new_v4(),
            assigned_to: Some(FALLBACK_OFFICER_ID),
            processor_id: Some(PROCESSOR_USER_ID),
            borrowers: vec![
                Borrower {
                    id: Uuid::new_v4(),
                    first_name: "Elena".to_string(),
                    last_name: "Vasquez".to_string(),
                    email: "elena.v@example.com".to_string(),
                    phone: "555-0142".to_string(),
                    is_primary: true,
                },
                Borrower {
                    id: Uuid::new_v4(),
                    first_name: "Rob".to_string(),
                    last_name: "Vasquez".to_string(),
                    email: "rob.v@example.com".to_string(),
                    phone: "555-0143".to_string(),
                    is_primary: false,
                },
            ],
            status: LeadStatus::Processing,
            created_at: now,
            updated_at: now,
            last_touch_at: None,
            last_touch_type: None,
            total_touches: 0,
            next_follow_up: None,
            loan_params: LoanParams {
                loan_amount: 310_000.0,
                purchase_price: 0.0,
                interest_rate: 6.375,
                loan_type: "FHA".to_string(),
                loan_purpose: "REFINANCE".to_string(),
                property_type: "CONDO".to_string(),
                property_use: "PRIMARY".to_string(),
                state: "AZ".to_string(),
                zip: "85004".to_string(),
                credit_score: 688,
            },
            change_log: Vec::new(),
        },
    ]
}

pub fn seed_touches() -> Vec<Touch> {
    Vec::new()
}
