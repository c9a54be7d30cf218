//! Integration tests for the Users domain
//!
//! These use real PostgreSQL via testcontainers to check:
//! - the three-table mapping of users and addresses
//! - the unique username constraint
//! - rollback of uncommitted units of work
//!
//! Run with `--ignored` on a machine with a Docker daemon.

use database::Propagation;
use domain_users::*;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn create_input(builder: &TestDataBuilder, suffix: &str, last_name: &str) -> CreateUser {
    CreateUser {
        first_name: "Alice".to_string(),
        last_name: last_name.to_string(),
        username: builder.username(suffix),
        password: "pw1".to_string(),
        email: builder.email(suffix),
        addresses: vec![
            CreateAddress {
                street: builder.name("street", "home"),
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                zip: "62701".to_string(),
            },
            CreateAddress {
                street: builder.name("street", "work"),
                city: "Shelbyville".to_string(),
                state: "IL".to_string(),
                zip: "62565".to_string(),
            },
        ],
    }
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_add_and_get_by_id() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("add_and_get");

    let input = create_input(&builder, "main", "Anders");
    let added = service.add(input.clone()).await.unwrap();

    assert_assigned_id(added.id, "added user");
    assert_eq!(added.username, input.username);
    assert_eq!(added.addresses.len(), 2);

    let fetched = assert_some(service.get_by_id(added.id).await.unwrap(), "user should exist");
    assert_eq!(fetched, added);

    let by_name = service.get_by_username(&input.username).await.unwrap();
    assert_eq!(by_name.id, added.id);

    let authenticated = service.authenticate(&input.username, "pw1").await.unwrap();
    assert_eq!(authenticated.id, added.id);
    assert!(matches!(
        service.authenticate(&input.username, "wrong").await,
        Err(UserError::Authentication)
    ));
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_duplicate_username_is_rejected() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("duplicate_username");

    service
        .add(create_input(&builder, "dup", "Anders"))
        .await
        .unwrap();

    let result = service.add(create_input(&builder, "dup", "Other")).await;
    assert!(matches!(result, Err(UserError::DuplicateUsername(_))));

    assert_eq!(service.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_dropped_unit_of_work_rolls_back() {
    let db = TestDatabase::new().await;
    let repository = PgUserRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("rollback");

    {
        let mut uow = repository.begin(Propagation::RequiresNew).await.unwrap();
        let (user, addresses) = create_input(&builder, "gone", "Anders").into_parts();
        let mut saved = Vec::new();
        for address in addresses {
            saved.push(uow.save_address(address).await.unwrap());
        }
        uow.save_user(user, saved).await.unwrap();
    }

    assert!(repository.find_all().await.unwrap().is_empty());
    assert!(
        repository
            .find_by_username(&builder.username("gone"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[ignore = "requires a Docker daemon"]
async fn test_queries_and_remove() {
    let db = TestDatabase::new().await;
    let service = UserService::new(PgUserRepository::new(db.connection()));
    let builder = TestDataBuilder::from_test_name("queries");

    let zed = service
        .add(create_input(&builder, "zed", "Zimmer"))
        .await
        .unwrap();
    let amy = service
        .add(create_input(&builder, "amy", "Abbott"))
        .await
        .unwrap();

    let ordered = service.list_ordered_by_last_name().await.unwrap();
    let last_names: Vec<_> = ordered.iter().map(|u| u.last_name.as_str()).collect();
    assert_eq!(last_names, vec!["Abbott", "Zimmer"]);

    let matches = service.find_by_email_containing("-amy@").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, amy.id);

    // '%' is matched literally, not as a wildcard
    assert!(service.find_by_email_containing("%").await.unwrap().is_empty());

    service.remove(zed.id).await.unwrap();
    service.remove(zed.id).await.unwrap();

    assert!(service.get_by_id(zed.id).await.unwrap().is_none());
    assert_eq!(service.find_all().await.unwrap().len(), 1);
}
