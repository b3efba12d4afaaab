//! Persistence context tests against in-memory SQLite.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sea_orm::{
    ColumnTrait, ConnectOptions, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use sea_orm_migration::SchemaManager;

use domain::{Claim, DataModel, Employee, EmployeeClaim, EmployeeLogin, Role};
use identity_service_lib::infra::Database;
use identity_service_lib::repository::entities::{employee, employee_claim, employee_login, role};
use identity_service_lib::repository::{
    EmployeeRepository, EmployeeStore, EntityState, PersistenceContext, TrackedEntity,
};

async fn connect() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    Database::connect_with_options(options)
        .await
        .expect("connect to in-memory sqlite")
}

async fn setup() -> Database {
    let db = connect().await;
    db.run_migrations().await.expect("apply migrations");
    db
}

fn test_employee() -> Employee {
    Employee::new("jdoe@example.com", "jdoe@example.com", "Jane", "Doe")
}

#[tokio::test]
async fn test_delete_of_audited_entity_keeps_row() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection())
        .with_actor("actor-1")
        .into_shared();

    let role = Role::new("auditors");
    let id = role.id().to_string();
    context.add(role);
    context.save_changes().await.unwrap();

    let before = role::Entity::find_by_id(id.clone())
        .one(db.connection())
        .await
        .unwrap()
        .unwrap();

    let stored = Role::from(before.clone());
    context.remove(stored);
    let written = context.save_changes().await.unwrap();
    assert_eq!(written, 1);

    let after = role::Entity::find_by_id(id.clone())
        .one(db.connection())
        .await
        .unwrap()
        .expect("row must survive a delete");

    assert!(after.is_deleted);
    assert_eq!(after.id, before.id);
    assert_eq!(after.created, before.created);
    assert!(after.modified >= before.modified);
    assert_eq!(after.employee_id, "actor-1");
    assert_eq!(after.name, "auditors");
}

#[tokio::test]
async fn test_soft_delete_twice_is_idempotent() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();
    let store = EmployeeStore::new(context.clone());

    let created = store.create(test_employee()).await.unwrap();
    let deleted = store.delete(created).await.unwrap();
    assert!(deleted.is_deleted());

    let again = store.delete(deleted).await.unwrap();
    assert!(again.is_deleted());

    assert!(store.find_by_id(again.id()).await.unwrap().is_none());
    assert!(store
        .find_by_id_with_deleted(again.id())
        .await
        .unwrap()
        .is_some());
    assert_eq!(
        employee::Entity::find().all(db.connection()).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_non_audited_entity_is_physically_deleted() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();
    let store = EmployeeStore::new(context.clone());

    let created = store.create(test_employee()).await.unwrap();
    let login = EmployeeLogin {
        login_provider: "github".to_string(),
        provider_key: "jdoe".to_string(),
        provider_display_name: Some("GitHub".to_string()),
        user_id: created.id().to_string(),
    };
    store.add_login(login.clone()).await.unwrap();
    assert_eq!(store.get_logins(created.id()).await.unwrap().len(), 1);

    store.remove_login(login.clone()).await.unwrap();

    assert!(employee_login::Entity::find()
        .all(db.connection())
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        context.state_of(&TrackedEntity::from(login)),
        None,
        "removed rows leave the tracker"
    );
}

#[tokio::test]
async fn test_save_marks_entries_unchanged() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();

    let role = Role::new("auditors");
    let tracked = TrackedEntity::from(role.clone());
    context.add(role);
    assert_eq!(context.state_of(&tracked), Some(EntityState::Added));
    assert!(context.has_changes());

    context.save_changes().await.unwrap();

    assert_eq!(context.state_of(&tracked), Some(EntityState::Unchanged));
    assert!(!context.has_changes());
    assert_eq!(context.save_changes().await.unwrap(), 0);
}

#[tokio::test]
async fn test_add_then_remove_never_writes() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();

    let role = Role::new("temporary");
    context.add(role.clone());
    context.remove(role);

    assert!(!context.has_changes());
    assert_eq!(context.save_changes().await.unwrap(), 0);
    assert!(role::Entity::find()
        .all(db.connection())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_entries() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();

    context.add(Role::new("duplicate"));
    context.save_changes().await.unwrap();

    // Same normalized name violates the unique index
    let clash = Role::new("DUPLICATE");
    let tracked = TrackedEntity::from(clash.clone());
    context.add(clash);

    assert!(context.save_changes().await.is_err());
    assert_eq!(context.state_of(&tracked), Some(EntityState::Added));

    context.clear_change_tracker();
    assert!(context.entries().is_empty());
}

#[tokio::test]
async fn test_clear_change_tracker_fires_hooks() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    context.on_tracker_cleared(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    context.add(Role::new("pending"));
    context.clear_change_tracker();

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!context.has_changes());
}

#[tokio::test]
async fn test_employee_loads_roles_with_claims() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();
    let store = EmployeeStore::new(context.clone());

    let role = Role::new("admin");
    let role_id = role.id().to_string();
    context.add(role);
    context.add(domain::RoleClaim::new(&role_id, &Claim::new("Permission", "all")));
    context.save_changes().await.unwrap();

    let created = store.create(test_employee()).await.unwrap();
    store.add_to_role(created.id(), &role_id).await.unwrap();

    let loaded = store.find_by_id(created.id()).await.unwrap().unwrap();
    assert_eq!(loaded.role_names(), vec!["admin".to_string()]);
    assert!(loaded
        .all_claims()
        .contains(&Claim::new("Permission", "all")));

    store.remove_from_role(created.id(), &role_id).await.unwrap();
    let loaded = store.find_by_id(created.id()).await.unwrap().unwrap();
    assert!(loaded.roles.is_empty());
}

#[tokio::test]
async fn test_list_filters_deleted_and_searches() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();
    let store = EmployeeStore::new(context);

    store.create(test_employee()).await.unwrap();
    let other = store
        .create(Employee::new("bsmith@example.com", "bsmith@example.com", "Bob", "Smith"))
        .await
        .unwrap();
    store.delete(other).await.unwrap();

    assert_eq!(store.list(None).await.unwrap().len(), 1);
    assert_eq!(store.list(Some("doe".to_string())).await.unwrap().len(), 1);
    assert!(store.list(Some("smith".to_string())).await.unwrap().is_empty());
    assert_eq!(store.list_with_deleted().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_identical_new_claims_insert_separate_rows() {
    let db = setup().await;
    let context = PersistenceContext::new(db.get_connection()).into_shared();
    let store = EmployeeStore::new(context.clone());

    let created = store.create(test_employee()).await.unwrap();
    let claim = Claim::new("department", "inspections");
    context.add(EmployeeClaim::new(created.id(), &claim));
    context.add(EmployeeClaim::new(created.id(), &claim));

    assert_eq!(context.save_changes().await.unwrap(), 2);
    assert!(!context.has_changes());

    let rows = employee_claim::Entity::find()
        .filter(employee_claim::Column::UserId.eq(created.id()))
        .count(db.connection())
        .await
        .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn test_ensure_deleted_drops_migrated_schema() {
    let db = setup().await;
    let manager = SchemaManager::new(db.connection());

    assert!(db.ensure_deleted().await.unwrap());
    assert!(!manager.has_table("employees").await.unwrap());
    assert!(!manager.has_table("roles").await.unwrap());

    // Nothing left to drop, and migrations apply again from scratch
    assert!(!db.ensure_deleted().await.unwrap());
    db.run_migrations().await.unwrap();
    assert!(manager.has_table("employees").await.unwrap());
}

#[tokio::test]
async fn test_ensure_deleted_drops_tables_without_migration_history() {
    let db = connect().await;
    db.connection()
        .execute(Statement::from_string(
            db.connection().get_database_backend(),
            "CREATE TABLE employees (id TEXT PRIMARY KEY)".to_string(),
        ))
        .await
        .unwrap();

    assert!(db.ensure_deleted().await.unwrap());
    assert!(!SchemaManager::new(db.connection())
        .has_table("employees")
        .await
        .unwrap());
}
