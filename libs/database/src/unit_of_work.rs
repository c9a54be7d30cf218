//! Explicit transaction boundaries.
//!
//! Writes run inside a [`DatabaseTransaction`] opened through [`begin`]. The
//! transaction commits only when the caller says so; dropping it rolls back.

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::debug;

/// How a new unit of work relates to one that is already open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Join the caller's transaction (as a savepoint) or open a new one.
    #[default]
    Required,
    /// Always open an independent transaction. Its commit or rollback never
    /// depends on the caller's outcome.
    RequiresNew,
}

/// Open a transaction according to `propagation`.
///
/// `parent` is the transaction the caller is running in, if any.
pub async fn begin(
    db: &DatabaseConnection,
    parent: Option<&DatabaseTransaction>,
    propagation: Propagation,
) -> Result<DatabaseTransaction, DbErr> {
    match (propagation, parent) {
        (Propagation::Required, Some(parent)) => {
            debug!("Joining enclosing transaction");
            parent.begin().await
        }
        (Propagation::Required, None) | (Propagation::RequiresNew, _) => {
            debug!(?propagation, "Opening new transaction");
            db.begin().await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_db() -> DatabaseConnection {
        MockDatabase::new(DatabaseBackend::Postgres).into_connection()
    }

    #[test]
    fn test_default_propagation_is_required() {
        assert_eq!(Propagation::default(), Propagation::Required);
    }

    #[tokio::test]
    async fn test_requires_new_without_parent() {
        let db = mock_db();
        let txn = begin(&db, None, Propagation::RequiresNew).await.unwrap();
        assert!(txn.commit().await.is_ok());
    }

    #[tokio::test]
    async fn test_requires_new_ignores_parent() {
        let db = mock_db();
        let parent = db.begin().await.unwrap();

        let independent = begin(&db, Some(&parent), Propagation::RequiresNew)
            .await
            .unwrap();
        assert!(independent.commit().await.is_ok());

        parent.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_required_joins_parent() {
        let db = mock_db();
        let parent = db.begin().await.unwrap();

        let nested = begin(&db, Some(&parent), Propagation::Required)
            .await
            .unwrap();
        assert!(nested.commit().await.is_ok());
        assert!(parent.commit().await.is_ok());
    }

    #[tokio::test]
    async fn test_required_without_parent_opens_transaction() {
        let db = mock_db();
        let txn = begin(&db, None, Propagation::Required).await.unwrap();
        assert!(txn.rollback().await.is_ok());
    }
}
