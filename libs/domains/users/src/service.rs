use database::Propagation;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, User};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Look up the user with exactly this username and password.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    pub async fn authenticate(&self, username: &str, password: &str) -> UserResult<User> {
        self.repository
            .find_by_username_and_password(username, password)
            .await?
            .ok_or_else(|| {
                debug!(username, "Authentication failed");
                UserError::Authentication
            })
    }

    /// Every user, with value-equal entries collapsed.
    pub async fn find_all(&self) -> UserResult<HashSet<User>> {
        let users = self.repository.find_all().await?;
        Ok(users.into_iter().collect())
    }

    /// Persist a new user and its addresses in an independent unit of work.
    ///
    /// Addresses are saved first, then the user. Nothing is stored if any
    /// step fails.
    pub async fn add(&self, input: CreateUser) -> UserResult<User> {
        let mut uow = self.repository.begin(Propagation::RequiresNew).await?;

        if uow.username_exists(&input.username).await? {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let (new_user, addresses) = input.into_parts();
        let mut saved = Vec::with_capacity(addresses.len());
        for address in addresses {
            saved.push(uow.save_address(address).await?);
        }

        let user = uow.save_user(new_user, saved).await?;
        uow.commit().await?;

        info!(
            user_id = user.id,
            username = %user.username,
            addresses = user.addresses.len(),
            "Added user"
        );
        Ok(user)
    }

    /// Delete by id. A missing id is not an error.
    pub async fn remove(&self, id: i32) -> UserResult<()> {
        let mut uow = self.repository.begin(Propagation::Required).await?;
        let deleted = uow.delete_by_id(id).await?;
        uow.commit().await?;

        if deleted {
            info!(user_id = id, "Removed user");
        } else {
            debug!(user_id = id, "No user to remove");
        }
        Ok(())
    }

    pub async fn get_by_username(&self, username: &str) -> UserResult<User> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound {
                username: username.to_string(),
            })
    }

    /// `None` for ids that cannot exist (`id <= 0`); the store is not queried.
    pub async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        if id <= 0 {
            warn!(id, "Id cannot be <= 0");
            return Ok(None);
        }
        self.repository.get_by_id(id).await
    }

    pub async fn list_ordered_by_last_name(&self) -> UserResult<Vec<User>> {
        self.repository.list_ordered_by_last_name().await
    }

    /// Users whose email contains `pattern` (case-sensitive).
    pub async fn find_by_email_containing(&self, pattern: &str) -> UserResult<Vec<User>> {
        self.repository.find_by_email_contains(pattern).await
    }
}
