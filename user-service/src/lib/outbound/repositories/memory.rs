use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

#[derive(Default)]
struct Table {
    rows: BTreeMap<i64, User>,
    last_id: i64,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .values()
            .any(|u| u.email.as_str() == email && Some(u.id) != except)
    }
}

/// Process-local user store.
///
/// Used when no database is configured and by the test-suite. Ids come from
/// a monotonically increasing counter and are never reused after a delete.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut table = self.table.write().await;

        if table.email_taken(user.email.as_str(), None) {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        table.last_id += 1;
        let stored = User {
            id: UserId(table.last_id),
            email: user.email,
            password_hash: user.password_hash,
            token_version: 0,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        table.rows.insert(stored.id.0, stored.clone());

        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.table.read().await.rows.get(&id.0).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut table = self.table.write().await;

        if !table.rows.contains_key(&user.id.0) {
            return Err(UserError::NotFound(user.id.to_string()));
        }
        if table.email_taken(user.email.as_str(), Some(user.id)) {
            return Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        table.rows.insert(user.id.0, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id.0)
            .map(|_| ())
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}
