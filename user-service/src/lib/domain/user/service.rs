use std::sync::Arc;

use async_trait::async_trait;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Concrete implementation of UserServicePort over an injected repository
/// and password hasher.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher producing the stored digests
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, password_hasher: PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    async fn ensure_email_available(
        &self,
        email: &str,
        owner: Option<UserId>,
    ) -> Result<(), UserError> {
        match self.repository.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(UserError::EmailAlreadyExists(email.to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        self.ensure_email_available(command.email.as_str(), None)
            .await?;

        let password_hash = self.password_hasher.hash(&command.password)?;

        let new_user = NewUser {
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = self.repository.create(new_user).await?;
        tracing::info!(user_id = %created_user.id, "User registered");

        Ok(created_user)
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.repository.list_all().await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.repository.find_by_email(email).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.get_user(id).await?;

        if let Some(new_email) = command.email {
            if new_email != user.email {
                self.ensure_email_available(new_email.as_str(), Some(user.id))
                    .await?;
            }
            user.email = new_email;
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.password_hasher.hash(&new_password)?;
            user.token_version = user.token_version.saturating_add(1);
        }

        user.updated_at = Utc::now();

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        if self.repository.find_by_id(id).await?.is_none() {
            return Err(UserError::NotFound(id.to_string()));
        }

        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use auth::HashingCost;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::user::errors::StoreError;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: NewUser) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn list_all(&self) -> Result<Vec<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(HashingCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn service(repository: MockTestUserRepository) -> UserService<MockTestUserRepository> {
        UserService::new(Arc::new(repository), hasher())
    }

    fn stored_user(id: i64, email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId(id),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: hasher().hash("secret1").unwrap(),
            token_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn persisted(user: NewUser, id: i64) -> User {
        User {
            id: UserId(id),
            email: user.email,
            password_hash: user.password_hash,
            token_version: 0,
            created_at: user.created_at,
            updated_at: user.created_at,
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .withf(|email| email == "test@example.com")
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "password123"
            })
            .times(1)
            .returning(|user| Ok(persisted(user, 1)));

        let command = CreateUserCommand::new(
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            "password123".to_string(),
        );

        let user = service(repository).create_user(command).await.unwrap();

        assert_eq!(user.id, UserId(1));
        assert_eq!(user.email.as_str(), "test@example.com");
        assert!(hasher().verify("password123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_precheck() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|email| Ok(Some(stored_user(1, email))));

        repository.expect_create().times(0);

        let command = CreateUserCommand::new(
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            "password456".to_string(),
        );

        let result = service(repository).create_user(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_at_store() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        repository.expect_create().times(1).returning(|user| {
            Err(UserError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ))
        });

        let command = CreateUserCommand::new(
            EmailAddress::new("test@example.com".to_string()).unwrap(),
            "password456".to_string(),
        );

        let result = service(repository).create_user(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_list_users() {
        let mut repository = MockTestUserRepository::new();

        repository.expect_list_all().times(1).returning(|| {
            Ok(vec![
                stored_user(1, "a@example.com"),
                stored_user(2, "b@example.com"),
            ])
        });

        let users = service(repository).list_users().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, UserId(1));
        assert_eq!(users[1].email.as_str(), "b@example.com");
    }

    #[tokio::test]
    async fn test_get_user_success() {
        let mut repository = MockTestUserRepository::new();
        let expected_user = stored_user(5, "test@example.com");

        let returned_user = expected_user.clone();
        repository
            .expect_find_by_id()
            .withf(|id| *id == UserId(5))
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        let user = service(repository).get_user(&UserId(5)).await.unwrap();
        assert_eq!(user, expected_user);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).get_user(&UserId(99)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_user_by_email_absent_is_not_an_error() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository)
            .get_user_by_email("nobody@example.com")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_update_user_email_only_keeps_password() {
        let mut repository = MockTestUserRepository::new();
        let existing_user = stored_user(1, "old@example.com");
        let original_hash = existing_user.password_hash.clone();

        let returned_user = existing_user.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_find_by_email()
            .withf(|email| email == "new@example.com")
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_update()
            .withf(move |user| {
                user.email.as_str() == "new@example.com"
                    && user.password_hash == original_hash
                    && user.token_version == 0
            })
            .times(1)
            .returning(|user| Ok(user));

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
            password: None,
        };

        let updated_user = service(repository)
            .update_user(&UserId(1), command)
            .await
            .unwrap();
        assert_eq!(updated_user.email.as_str(), "new@example.com");
    }

    #[tokio::test]
    async fn test_update_user_password_rehashes_and_bumps_version() {
        let mut repository = MockTestUserRepository::new();
        let existing_user = stored_user(1, "test@example.com");

        let returned_user = existing_user.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_update()
            .withf(|user| user.token_version == 1 && user.email.as_str() == "test@example.com")
            .times(1)
            .returning(|user| Ok(user));

        let command = UpdateUserCommand {
            email: None,
            password: Some("new".to_string()),
        };

        let updated_user = service(repository)
            .update_user(&UserId(1), command)
            .await
            .unwrap();

        assert!(hasher().verify("new", &updated_user.password_hash).unwrap());
        assert!(!hasher()
            .verify("secret1", &updated_user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_user_empty_password_is_applied() {
        let mut repository = MockTestUserRepository::new();
        let existing_user = stored_user(1, "test@example.com");

        let returned_user = existing_user.clone();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_update()
            .times(1)
            .returning(|user| Ok(user));

        let command = UpdateUserCommand {
            email: None,
            password: Some(String::new()),
        };

        let updated_user = service(repository)
            .update_user(&UserId(1), command)
            .await
            .unwrap();

        assert!(hasher().verify("", &updated_user.password_hash).unwrap());
        assert_eq!(updated_user.token_version, 1);
    }

    #[tokio::test]
    async fn test_update_user_email_taken_by_other_user() {
        let mut repository = MockTestUserRepository::new();
        let existing_user = stored_user(1, "mine@example.com");

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(existing_user.clone())));

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|email| Ok(Some(stored_user(2, email))));

        repository.expect_update().times(0);

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("taken@example.com".to_string()).unwrap()),
            password: None,
        };

        let result = service(repository).update_user(&UserId(1), command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        repository.expect_update().times(0);

        let command = UpdateUserCommand {
            email: Some(EmailAddress::new("new@example.com".to_string()).unwrap()),
            password: None,
        };

        let result = service(repository).update_user(&UserId(3), command).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(stored_user(id.0, "test@example.com"))));

        repository
            .expect_delete()
            .withf(|id| *id == UserId(4))
            .times(1)
            .returning(|_| Ok(()));

        let result = service(repository).delete_user(&UserId(4)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_not_found_skips_delete() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        repository.expect_delete().times(0);

        let result = service(repository).delete_user(&UserId(4)).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user_store_failure_propagates() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(stored_user(id.0, "test@example.com"))));

        repository
            .expect_delete()
            .times(1)
            .returning(|_| Err(StoreError::Query("connection reset".to_string()).into()));

        let result = service(repository).delete_user(&UserId(4)).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::Store(StoreError::Query(_))
        ));
    }
}
