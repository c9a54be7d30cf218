use async_trait::async_trait;
use database::Propagation;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{Address, CreateAddress, NewUser, User};

/// Read access to stored users plus the entry point for writes.
///
/// Every user returned carries its addresses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive username match
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    async fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> UserResult<Option<User>>;

    /// Ascending by last name
    async fn list_ordered_by_last_name(&self) -> UserResult<Vec<User>>;

    async fn find_all(&self) -> UserResult<Vec<User>>;

    /// Case-sensitive substring match on email
    async fn find_by_email_contains(&self, pattern: &str) -> UserResult<Vec<User>>;

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>>;

    /// Open a unit of work for writes.
    async fn begin(&self, propagation: Propagation) -> UserResult<Box<dyn UserUnitOfWork>>;
}

/// Writes that become visible together on [`commit`](UserUnitOfWork::commit).
///
/// Dropping a unit of work without committing discards every write in it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserUnitOfWork: Send {
    async fn username_exists(&mut self, username: &str) -> UserResult<bool>;

    async fn save_address(&mut self, address: CreateAddress) -> UserResult<Address>;

    /// Insert the user and link the already saved `addresses` to it.
    async fn save_user(&mut self, user: NewUser, addresses: Vec<Address>) -> UserResult<User>;

    /// Returns whether a user was deleted
    async fn delete_by_id(&mut self, id: i32) -> UserResult<bool>;

    async fn commit(&mut self) -> UserResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    users: BTreeMap<i32, User>,
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<Store>>,
    user_ids: Arc<AtomicI32>,
    address_ids: Arc<AtomicI32>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::default())),
            user_ids: Arc::new(AtomicI32::new(1)),
            address_ids: Arc::new(AtomicI32::new(1)),
        }
    }

    async fn filter(&self, predicate: impl Fn(&User) -> bool) -> Vec<User> {
        let store = self.store.read().await;
        store
            .users
            .values()
            .filter(|u| predicate(u))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        Ok(self
            .filter(|u| u.username == username)
            .await
            .into_iter()
            .next())
    }

    async fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> UserResult<Option<User>> {
        Ok(self
            .filter(|u| u.username == username && u.password == password)
            .await
            .into_iter()
            .next())
    }

    async fn list_ordered_by_last_name(&self) -> UserResult<Vec<User>> {
        let mut users = self.filter(|_| true).await;
        // Stable sort keeps id order among equal last names
        users.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(users)
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_email_contains(&self, pattern: &str) -> UserResult<Vec<User>> {
        Ok(self.filter(|u| u.email.contains(pattern)).await)
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.get(&id).cloned())
    }

    async fn begin(&self, propagation: Propagation) -> UserResult<Box<dyn UserUnitOfWork>> {
        tracing::trace!(?propagation, "Opening in-memory unit of work");
        Ok(Box::new(InMemoryUnitOfWork {
            repository: self.clone(),
            inserts: Vec::new(),
            deletes: Vec::new(),
            committed: false,
        }))
    }
}

/// Staged writes applied under one write lock on commit.
///
/// Ids are drawn when a row is staged, so a rolled back unit leaves gaps in
/// the sequence the same way a database sequence does.
struct InMemoryUnitOfWork {
    repository: InMemoryUserRepository,
    inserts: Vec<User>,
    deletes: Vec<i32>,
    committed: bool,
}

impl InMemoryUnitOfWork {
    fn ensure_open(&self) -> UserResult<()> {
        if self.committed {
            return Err(UserError::Internal(
                "unit of work already committed".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UserUnitOfWork for InMemoryUnitOfWork {
    async fn username_exists(&mut self, username: &str) -> UserResult<bool> {
        self.ensure_open()?;
        if self.inserts.iter().any(|u| u.username == username) {
            return Ok(true);
        }

        let store = self.repository.store.read().await;
        Ok(store
            .users
            .values()
            .any(|u| u.username == username && !self.deletes.contains(&u.id)))
    }

    async fn save_address(&mut self, address: CreateAddress) -> UserResult<Address> {
        self.ensure_open()?;
        let id = self.repository.address_ids.fetch_add(1, Ordering::SeqCst);
        Ok(address.into_address(id))
    }

    async fn save_user(&mut self, user: NewUser, addresses: Vec<Address>) -> UserResult<User> {
        self.ensure_open()?;
        if self.username_exists(&user.username).await? {
            return Err(UserError::DuplicateUsername(user.username));
        }

        let id = self.repository.user_ids.fetch_add(1, Ordering::SeqCst);
        let user = user.into_user(id, addresses);
        self.inserts.push(user.clone());
        Ok(user)
    }

    async fn delete_by_id(&mut self, id: i32) -> UserResult<bool> {
        self.ensure_open()?;
        if let Some(pos) = self.inserts.iter().position(|u| u.id == id) {
            self.inserts.remove(pos);
            return Ok(true);
        }
        if self.deletes.contains(&id) {
            return Ok(false);
        }

        let exists = self.repository.store.read().await.users.contains_key(&id);
        if exists {
            self.deletes.push(id);
        }
        Ok(exists)
    }

    async fn commit(&mut self) -> UserResult<()> {
        self.ensure_open()?;
        let mut store = self.repository.store.write().await;

        // Another unit may have committed the same username since it was checked
        for user in &self.inserts {
            let taken = store
                .users
                .values()
                .any(|u| u.username == user.username && !self.deletes.contains(&u.id));
            if taken {
                return Err(UserError::DuplicateUsername(user.username.clone()));
            }
        }

        for id in &self.deletes {
            store.users.remove(id);
        }
        for user in self.inserts.drain(..) {
            store.users.insert(user.id, user);
        }

        self.committed = true;
        Ok(())
    }
}
