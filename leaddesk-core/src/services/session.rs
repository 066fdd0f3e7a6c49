//! Session/Identity Provider
//!
//! Tracks the "current user" pointer that every RBAC-sensitive call reads.
//! This is identity selection, not authentication — there are no
//! credentials anywhere in the system.

use leaddesk_common::{Error, Result};
use tracing::info;
use uuid::Uuid;

use crate::db::records::{RecordStore, CURRENT_USER_KEY};
use crate::db::users;
use crate::models::{Role, User};

#[derive(Debug, Clone)]
pub struct SessionProvider {
    store: RecordStore,
}

impl SessionProvider {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Resolve the current user. An unset or dangling pointer falls back to
    /// the seed admin (first admin in the collection), so there is always
    /// an active identity.
    pub async fn current_user(&self) -> Result<User> {
        let all = users::load(&self.store).await?;
        let pointer: Option<Uuid> = self.store.get_scalar(CURRENT_USER_KEY).await?;

        pointer
            .and_then(|id| all.iter().find(|u| u.id == id).cloned())
            .or_else(|| all.iter().find(|u| u.role == Role::Admin).cloned())
            .or_else(|| all.first().cloned())
            .ok_or_else(|| Error::Internal("user collection is empty".to_string()))
    }

    /// Switch the active identity; the id must name an existing user
    pub async fn switch_user(&self, id: Uuid) -> Result<User> {
        let all = users::load(&self.store).await?;
        let user = all
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?;

        self.store.set_scalar(CURRENT_USER_KEY, &user.id).await?;
        info!(user = %user.name, role = ?user.role, "Switched current user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::create_records_table;
    use crate::db::seed::{ADMIN_USER_ID, FALLBACK_OFFICER_ID};
    use sqlx::SqlitePool;

    async fn test_session() -> SessionProvider {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        create_records_table(&pool).await.unwrap();
        SessionProvider::new(RecordStore::new(pool))
    }

    #[tokio::test]
    async fn unset_pointer_falls_back_to_seed_admin() {
        let session = test_session().await;
        let user = session.current_user().await.unwrap();
        assert_eq!(user.id, ADMIN_USER_ID);
        assert_eq!(user.role, Role::Admin);
    }

    #[tokio::test]
    async fn switch_user_persists_the_pointer() {
        let session = test_session().await;
        session.switch_user(FALLBACK_OFFICER_ID).await.unwrap();
        let user = session.current_user().await.unwrap();
        assert_eq!(user.id, FALLBACK_OFFICER_ID);
        assert_eq!(user.role, Role::LoanOfficer);
    }

    #[tokio::test]
    async fn switching_to_unknown_user_fails_without_moving_the_pointer() {
        let session = test_session().await;
        session.switch_user(FALLBACK_OFFICER_ID).await.unwrap();

        let result = session.switch_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert_eq!(
            session.current_user().await.unwrap().id,
            FALLBACK_OFFICER_ID
        );
    }
}
