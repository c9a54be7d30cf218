use async_trait::async_trait;
use database::{Propagation, unit_of_work};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, SqlErr,
};
use std::collections::HashMap;

use crate::entity::{address, user, user_address};
use crate::error::{UserError, UserResult};
use crate::models::{Address, CreateAddress, NewUser, User};
use crate::repository::{UserRepository, UserUnitOfWork};

/// PostgreSQL-backed [`UserRepository`].
///
/// Reads run directly on the pool. Addresses are loaded with two follow-up
/// queries (join rows, then addresses) for the whole batch of users.
#[derive(Clone)]
pub struct PgUserRepository {
    db: DatabaseConnection,
}

impl PgUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, query: Select<user::Entity>) -> UserResult<Vec<User>> {
        let models = query.all(&self.db).await?;
        with_addresses(&self.db, models).await
    }

    async fn fetch_one(&self, query: Select<user::Entity>) -> UserResult<Option<User>> {
        let model = query.one(&self.db).await?;
        Ok(with_addresses(&self.db, model.into_iter().collect())
            .await?
            .pop())
    }
}

/// Attach addresses to `models`, keeping the order of `models`.
async fn with_addresses<C: ConnectionTrait>(
    db: &C,
    models: Vec<user::Model>,
) -> UserResult<Vec<User>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let links = user_address::Entity::find()
        .filter(user_address::Column::UserId.is_in(user_ids))
        .order_by_asc(user_address::Column::AddressId)
        .all(db)
        .await?;

    let mut by_id: HashMap<i32, Address> = HashMap::new();
    if !links.is_empty() {
        let address_ids: Vec<i32> = links.iter().map(|l| l.address_id).collect();
        by_id = address::Entity::find()
            .filter(address::Column::Id.is_in(address_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, Address::from(a)))
            .collect();
    }

    let mut owned: HashMap<i32, Vec<Address>> = HashMap::new();
    for link in links {
        if let Some(address) = by_id.get(&link.address_id) {
            owned
                .entry(link.user_id)
                .or_default()
                .push(address.clone());
        }
    }

    Ok(models
        .into_iter()
        .map(|m| {
            let addresses = owned.remove(&m.id).unwrap_or_default();
            m.into_user(addresses)
        })
        .collect())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        self.fetch_one(user::Entity::find().filter(user::Column::Username.eq(username)))
            .await
    }

    async fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> UserResult<Option<User>> {
        self.fetch_one(
            user::Entity::find()
                .filter(user::Column::Username.eq(username))
                .filter(user::Column::Password.eq(password)),
        )
        .await
    }

    async fn list_ordered_by_last_name(&self) -> UserResult<Vec<User>> {
        self.fetch(
            user::Entity::find()
                .order_by_asc(user::Column::LastName)
                .order_by_asc(user::Column::Id),
        )
        .await
    }

    async fn find_all(&self) -> UserResult<Vec<User>> {
        self.fetch(user::Entity::find().order_by_asc(user::Column::Id))
            .await
    }

    async fn find_by_email_contains(&self, pattern: &str) -> UserResult<Vec<User>> {
        // strpos keeps the match literal; LIKE would treat % and _ as wildcards
        self.fetch(
            user::Entity::find()
                .filter(Expr::cust_with_values(
                    r#"strpos("users"."email", ?) > 0"#,
                    [pattern],
                ))
                .order_by_asc(user::Column::Id),
        )
        .await
    }

    async fn get_by_id(&self, id: i32) -> UserResult<Option<User>> {
        self.fetch_one(user::Entity::find_by_id(id)).await
    }

    async fn begin(&self, propagation: Propagation) -> UserResult<Box<dyn UserUnitOfWork>> {
        let txn = unit_of_work::begin(&self.db, None, propagation).await?;
        Ok(Box::new(PgUserUnitOfWork { txn: Some(txn) }))
    }
}

/// Writes inside one PostgreSQL transaction.
///
/// The transaction is rolled back when this is dropped before `commit`.
pub struct PgUserUnitOfWork {
    txn: Option<DatabaseTransaction>,
}

impl PgUserUnitOfWork {
    fn txn(&self) -> UserResult<&DatabaseTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| UserError::Internal("unit of work already committed".to_string()))
    }
}

fn map_insert_error(err: DbErr, username: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserError::DuplicateUsername(username.to_string())
        }
        _ => UserError::Database(err),
    }
}

#[async_trait]
impl UserUnitOfWork for PgUserUnitOfWork {
    async fn username_exists(&mut self, username: &str) -> UserResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .count(self.txn()?)
            .await?;
        Ok(count > 0)
    }

    async fn save_address(&mut self, address: CreateAddress) -> UserResult<Address> {
        let model = address::ActiveModel::from(address)
            .insert(self.txn()?)
            .await?;
        Ok(model.into())
    }

    async fn save_user(&mut self, user: NewUser, addresses: Vec<Address>) -> UserResult<User> {
        let txn = self.txn()?;
        let username = user.username.clone();

        let model = user::ActiveModel::from(user)
            .insert(txn)
            .await
            .map_err(|e| map_insert_error(e, &username))?;

        if !addresses.is_empty() {
            let links = addresses.iter().map(|a| user_address::ActiveModel {
                user_id: sea_orm::ActiveValue::Set(model.id),
                address_id: sea_orm::ActiveValue::Set(a.id),
            });
            user_address::Entity::insert_many(links)
                .exec_without_returning(txn)
                .await?;
        }

        Ok(model.into_user(addresses))
    }

    async fn delete_by_id(&mut self, id: i32) -> UserResult<bool> {
        let result = user::Entity::delete_by_id(id).exec(self.txn()?).await?;
        Ok(result.rows_affected > 0)
    }

    async fn commit(&mut self) -> UserResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| UserError::Internal("unit of work already committed".to_string()))?;
        txn.commit().await?;
        Ok(())
    }
}
