//! Seeding tests against in-memory SQLite.

use sea_orm::{ConnectOptions, EntityTrait, PaginatorTrait};

use common::IdentityOptions;
use domain::{Claim, DataModel, CLAIM_TYPE_ROLE, CLAIM_TYPE_USERS_NAME};
use identity_service_lib::infra::Database;
use identity_service_lib::repository::entities::{employee, role};
use identity_service_lib::seed::{Seeder, DEFAULT_PASSWORD, SEED_ACCOUNTS};
use identity_service_lib::IdentityScope;

async fn setup() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    Database::connect_with_options(options)
        .await
        .expect("connect to in-memory sqlite")
}

async fn assert_seeded(db: &Database) {
    assert_eq!(role::Entity::find().count(db.connection()).await.unwrap(), 3);
    assert_eq!(
        employee::Entity::find().count(db.connection()).await.unwrap(),
        3
    );

    let scope = IdentityScope::new(db.get_connection(), IdentityOptions::default(), None);
    let mut role_names: Vec<String> = scope
        .roles
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    role_names.sort();
    assert_eq!(role_names, vec!["admin", "readonly", "user"]);

    for account in &SEED_ACCOUNTS {
        let employee = scope
            .employees
            .find_by_name(account.email)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("{} missing", account.label));

        assert_eq!(employee.role_names(), vec![account.role.to_string()]);
        assert!(employee.email_confirmed);
        assert!(!employee.lockout_enabled);
        assert!(scope.employees.check_password(&employee, DEFAULT_PASSWORD));

        let claims = scope.employees.get_claims(employee.id()).await.unwrap();
        assert_eq!(claims.len(), 2);
        assert!(claims.contains(&Claim::new(CLAIM_TYPE_ROLE, account.role)));
        assert!(claims.contains(&Claim::new(
            CLAIM_TYPE_USERS_NAME,
            format!("user, {}", account.first_name)
        )));
    }
}

#[tokio::test]
async fn test_seed_clear_then_seed_again() {
    let db = setup().await;
    let seeder = Seeder::new(db.clone(), IdentityOptions::default());

    let first = seeder.seed_database(true).await;
    assert!(first.all_succeeded(), "{}", first);
    assert_seeded(&db).await;

    let second = seeder.seed_database(true).await;
    assert!(second.all_succeeded(), "{}", second);
    assert_seeded(&db).await;
}

#[tokio::test]
async fn test_reseed_without_clear_aborts_on_first_account() {
    let db = setup().await;
    let seeder = Seeder::new(db.clone(), IdentityOptions::default());
    seeder.seed_database(false).await;

    let results = seeder.seed_database(false).await;

    assert!(!results.all_succeeded());
    let failures: Vec<String> = results.failures().map(|r| r.message.clone()).collect();
    assert!(failures
        .iter()
        .any(|m| m.contains("Error seeding Standard User account")));
    // The admin account is never attempted once the standard one fails
    assert!(!results
        .results()
        .iter()
        .any(|r| r.message.contains("Admin User")));

    assert_eq!(
        employee::Entity::find().count(db.connection()).await.unwrap(),
        3
    );
}
