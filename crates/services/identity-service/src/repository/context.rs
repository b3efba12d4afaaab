//! Persistence context: the single point of write access to the identity
//! tables.
//!
//! Entities are staged in a change tracker and written together by
//! [`PersistenceContext::save_changes`] inside one transaction. Deleting an
//! audited entity ([`DataModel`]) never removes its row: the save converts the
//! delete into an update of `is_deleted`, `modified` and `employee_id` only.
//! Everything else staged for deletion is physically removed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Select, TransactionTrait,
};

use common::{AppError, AppResult};
use domain::{
    DataModel, Employee, EmployeeClaim, EmployeeLogin, EmployeeRole, EmployeeToken, Role,
    RoleClaim,
};

use super::entities::{
    employee, employee_claim, employee_login, employee_role, employee_token, role, role_claim,
};

/// Change-tracker state of a staged entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

/// Any entity the context can track.
#[derive(Debug, Clone)]
pub enum TrackedEntity {
    Employee(Employee),
    Role(Role),
    RoleClaim(RoleClaim),
    EmployeeRole(EmployeeRole),
    EmployeeClaim(EmployeeClaim),
    EmployeeLogin(EmployeeLogin),
    EmployeeToken(EmployeeToken),
}

/// Identity of a tracked entity. Two entries with the same key are the same
/// entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    kind: &'static str,
    parts: Vec<String>,
}

impl EntityKey {
    fn new(kind: &'static str, parts: &[&str]) -> Self {
        Self {
            kind,
            parts: parts.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TrackedEntity {
    pub fn key(&self) -> EntityKey {
        match self {
            TrackedEntity::Employee(e) => EntityKey::new("employee", &[e.id()]),
            TrackedEntity::Role(r) => EntityKey::new("role", &[r.id()]),
            TrackedEntity::RoleClaim(c) if c.id == 0 => EntityKey::new(
                "role_claim",
                &["new", &c.role_id, &c.claim_type, &c.claim_value],
            ),
            TrackedEntity::RoleClaim(c) => EntityKey::new("role_claim", &[&c.id.to_string()]),
            TrackedEntity::EmployeeRole(j) => {
                EntityKey::new("employee_role", &[&j.user_id, &j.role_id])
            }
            TrackedEntity::EmployeeClaim(c) if c.id == 0 => EntityKey::new(
                "employee_claim",
                &["new", &c.user_id, &c.claim_type, &c.claim_value],
            ),
            TrackedEntity::EmployeeClaim(c) => {
                EntityKey::new("employee_claim", &[&c.id.to_string()])
            }
            TrackedEntity::EmployeeLogin(l) => {
                EntityKey::new("employee_login", &[&l.login_provider, &l.provider_key])
            }
            TrackedEntity::EmployeeToken(t) => {
                EntityKey::new("employee_token", &[&t.user_id, &t.login_provider, &t.name])
            }
        }
    }

    /// Claim without a database id yet. Its key is its content, so equal
    /// unsaved claims share a key.
    fn is_unsaved_claim(&self) -> bool {
        matches!(
            self,
            TrackedEntity::RoleClaim(RoleClaim { id: 0, .. })
                | TrackedEntity::EmployeeClaim(EmployeeClaim { id: 0, .. })
        )
    }

    /// Audited entities carry the soft delete envelope.
    pub fn data_model(&self) -> Option<&dyn DataModel> {
        match self {
            TrackedEntity::Employee(e) => Some(e),
            TrackedEntity::Role(r) => Some(r),
            _ => None,
        }
    }

    fn data_model_mut(&mut self) -> Option<&mut dyn DataModel> {
        match self {
            TrackedEntity::Employee(e) => Some(e),
            TrackedEntity::Role(r) => Some(r),
            _ => None,
        }
    }
}

macro_rules! impl_tracked_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for TrackedEntity {
                fn from(entity: $variant) -> Self {
                    TrackedEntity::$variant(entity)
                }
            }
        )*
    };
}

impl_tracked_from!(
    Employee,
    Role,
    RoleClaim,
    EmployeeRole,
    EmployeeClaim,
    EmployeeLogin,
    EmployeeToken
);

/// A tracked entity and its state.
#[derive(Debug, Clone)]
pub struct TrackedEntry {
    pub entity: TrackedEntity,
    pub state: EntityState,
}

/// Callback fired after the change tracker is cleared.
pub type TrackerClearedHook = Box<dyn Fn() + Send + Sync>;

/// Request-scoped unit of work over the identity tables.
///
/// Reads go straight to the connection; writes are staged and applied by
/// `save_changes`. The tracker lock is never held across an await.
pub struct PersistenceContext {
    db: DatabaseConnection,
    actor: Option<String>,
    entries: Mutex<Vec<TrackedEntry>>,
    cleared_hooks: Mutex<Vec<TrackerClearedHook>>,
}

impl PersistenceContext {
    /// Create a context with no acting employee (system operations).
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            actor: None,
            entries: Mutex::new(Vec::new()),
            cleared_hooks: Mutex::new(Vec::new()),
        }
    }

    /// Attribute every audited write to the given employee.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Connection for reads and for tables outside the change tracker.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    // =========================================================================
    // Change tracking
    // =========================================================================

    /// Stage a new entity for insert.
    pub fn add(&self, entity: impl Into<TrackedEntity>) {
        self.stage(entity.into(), EntityState::Added);
    }

    /// Stage an existing entity for update.
    pub fn update(&self, entity: impl Into<TrackedEntity>) {
        self.stage(entity.into(), EntityState::Modified);
    }

    /// Stage an entity for deletion (soft delete for audited entities).
    pub fn remove(&self, entity: impl Into<TrackedEntity>) {
        self.stage(entity.into(), EntityState::Deleted);
    }

    /// Track an entity as unchanged.
    pub fn attach(&self, entity: impl Into<TrackedEntity>) {
        self.stage(entity.into(), EntityState::Unchanged);
    }

    fn stage(&self, entity: TrackedEntity, state: EntityState) {
        let key = entity.key();
        let mut entries = self.lock_entries();

        // Each staged insert of an unsaved claim becomes its own row
        if state == EntityState::Added && entity.is_unsaved_claim() {
            entries.push(TrackedEntry { entity, state });
            return;
        }

        match entries.iter().position(|e| e.entity.key() == key) {
            Some(index) => {
                let previous = entries[index].state;
                match (previous, state) {
                    // Never written, so nothing to delete
                    (EntityState::Added, EntityState::Deleted) => {
                        entries.remove(index);
                    }
                    (EntityState::Added, EntityState::Modified) => {
                        entries[index].entity = entity;
                    }
                    _ => {
                        entries[index] = TrackedEntry { entity, state };
                    }
                }
            }
            None => entries.push(TrackedEntry { entity, state }),
        }
    }

    /// State of the tracked entity with the same identity, if any.
    pub fn state_of(&self, entity: &TrackedEntity) -> Option<EntityState> {
        let key = entity.key();
        self.lock_entries()
            .iter()
            .find(|e| e.entity.key() == key)
            .map(|e| e.state)
    }

    /// Snapshot of every tracked entry.
    pub fn entries(&self) -> Vec<TrackedEntry> {
        self.lock_entries().clone()
    }

    pub fn has_changes(&self) -> bool {
        self.lock_entries()
            .iter()
            .any(|e| e.state != EntityState::Unchanged)
    }

    /// Register a hook fired whenever the tracker is cleared.
    pub fn on_tracker_cleared(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.lock_hooks().push(Box::new(hook));
    }

    /// Forget every tracked entry and notify listeners.
    pub fn clear_change_tracker(&self) {
        self.lock_entries().clear();

        for hook in self.lock_hooks().iter() {
            hook();
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<TrackedEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_hooks(&self) -> MutexGuard<'_, Vec<TrackerClearedHook>> {
        self.cleared_hooks.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Write every pending change in one transaction. Returns the number of
    /// entries written.
    ///
    /// On failure the transaction is rolled back, the error is returned as is
    /// and the tracker keeps its entries.
    pub async fn save_changes(&self) -> AppResult<usize> {
        let pending: Vec<TrackedEntry> = self
            .lock_entries()
            .iter()
            .filter(|e| e.state != EntityState::Unchanged)
            .cloned()
            .collect();

        if pending.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await.map_err(AppError::from)?;

        let mut written = Vec::with_capacity(pending.len());
        for entry in pending {
            let key = entry.entity.key();
            match self.apply(&txn, entry).await {
                Ok(saved) => written.push((key, saved)),
                Err(e) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        tracing::error!("Transaction rollback failed: {}", rollback_err);
                    }
                    return Err(e);
                }
            }
        }

        txn.commit().await.map_err(AppError::from)?;

        let count = written.len();
        let mut entries = self.lock_entries();
        for (key, saved) in written {
            let Some(index) = entries.iter().position(|e| e.entity.key() == key) else {
                continue;
            };
            match saved {
                Some(entity) => {
                    entries[index] = TrackedEntry {
                        entity,
                        state: EntityState::Unchanged,
                    };
                }
                None => {
                    entries.remove(index);
                }
            }
        }

        tracing::debug!(count, "Saved tracked changes");
        Ok(count)
    }

    /// Apply one entry. Returns the saved entity, or `None` once it has been
    /// physically removed.
    async fn apply(
        &self,
        txn: &DatabaseTransaction,
        entry: TrackedEntry,
    ) -> AppResult<Option<TrackedEntity>> {
        let actor = self.actor.as_deref();
        let mut entity = entry.entity;

        match entry.state {
            EntityState::Deleted => {
                if let Some(model) = entity.data_model_mut() {
                    model.on_delete(actor);
                    soft_delete(txn, &entity).await?;
                    return Ok(Some(entity));
                }
                hard_delete(txn, &entity).await?;
                Ok(None)
            }
            EntityState::Added => {
                if let Some(model) = entity.data_model_mut() {
                    model.on_created(actor);
                }
                insert(txn, entity).await.map(Some)
            }
            EntityState::Modified => {
                if let Some(model) = entity.data_model_mut() {
                    model.on_updated(actor);
                }
                update(txn, &entity).await?;
                Ok(Some(entity))
            }
            EntityState::Unchanged => Ok(Some(entity)),
        }
    }

    // =========================================================================
    // Eager loading
    // =========================================================================

    /// Run an employee query and load each employee's roles together with
    /// the roles' claims.
    pub async fn load_employees(&self, query: Select<employee::Entity>) -> AppResult<Vec<Employee>> {
        let models = query.all(&self.db).await.map_err(AppError::from)?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let joins = employee_role::Entity::find()
            .filter(employee_role::Column::UserId.is_in(ids))
            .find_also_related(role::Entity)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        let roles: Vec<role::Model> = joins
            .iter()
            .filter_map(|(_, role)| role.clone())
            .filter(|role| !role.is_deleted)
            .collect();
        let roles_by_id: HashMap<String, Role> = self
            .with_role_claims(roles)
            .await?
            .into_iter()
            .map(|role| (role.id().to_string(), role))
            .collect();

        let mut joins_by_user: HashMap<String, Vec<EmployeeRole>> = HashMap::new();
        for (join, _) in joins {
            let Some(role) = roles_by_id.get(&join.role_id).cloned() else {
                continue;
            };
            let mut employee_role = EmployeeRole::from(join);
            employee_role.role = Some(role);
            joins_by_user
                .entry(employee_role.user_id.clone())
                .or_default()
                .push(employee_role);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut employee = Employee::from(model);
                employee.roles = joins_by_user.remove(employee.id()).unwrap_or_default();
                employee
            })
            .collect())
    }

    /// Single-row variant of [`Self::load_employees`].
    pub async fn load_employee(&self, query: Select<employee::Entity>) -> AppResult<Option<Employee>> {
        Ok(self.load_employees(query).await?.into_iter().next())
    }

    /// Run a role query and load each role's claims.
    pub async fn load_roles(&self, query: Select<role::Entity>) -> AppResult<Vec<Role>> {
        let models = query.all(&self.db).await.map_err(AppError::from)?;
        self.with_role_claims(models).await
    }

    async fn with_role_claims(&self, models: Vec<role::Model>) -> AppResult<Vec<Role>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut claims_by_role: HashMap<String, Vec<RoleClaim>> = HashMap::new();
        for claim in role_claim::Entity::find()
            .filter(role_claim::Column::RoleId.is_in(ids))
            .order_by_asc(role_claim::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::from)?
        {
            claims_by_role
                .entry(claim.role_id.clone())
                .or_default()
                .push(RoleClaim::from(claim));
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut role = Role::from(model);
                role.claims = claims_by_role.remove(role.id()).unwrap_or_default();
                role
            })
            .collect())
    }
}

// =============================================================================
// Write helpers
// =============================================================================

fn not_updated() -> AppError {
    AppError::from(DbErr::RecordNotUpdated)
}

/// Write only the soft delete columns.
async fn soft_delete(txn: &DatabaseTransaction, entity: &TrackedEntity) -> AppResult<()> {
    let rows = match entity {
        TrackedEntity::Employee(e) => {
            employee::Entity::update_many()
                .col_expr(employee::Column::IsDeleted, Expr::value(true))
                .col_expr(employee::Column::Modified, Expr::value(e.audit.modified()))
                .col_expr(
                    employee::Column::EmployeeId,
                    Expr::value(e.audit.employee_id().to_string()),
                )
                .filter(employee::Column::Id.eq(e.id()))
                .exec(txn)
                .await?
                .rows_affected
        }
        TrackedEntity::Role(r) => {
            role::Entity::update_many()
                .col_expr(role::Column::IsDeleted, Expr::value(true))
                .col_expr(role::Column::Modified, Expr::value(r.audit.modified()))
                .col_expr(
                    role::Column::EmployeeId,
                    Expr::value(r.audit.employee_id().to_string()),
                )
                .filter(role::Column::Id.eq(r.id()))
                .exec(txn)
                .await?
                .rows_affected
        }
        _ => return Err(AppError::internal("Soft delete on an unaudited entity")),
    };

    if rows == 0 {
        return Err(not_updated());
    }
    Ok(())
}

async fn hard_delete(txn: &DatabaseTransaction, entity: &TrackedEntity) -> AppResult<()> {
    match entity {
        TrackedEntity::RoleClaim(c) => {
            let query = role_claim::Entity::delete_many();
            let query = if c.id == 0 {
                query
                    .filter(role_claim::Column::RoleId.eq(c.role_id.as_str()))
                    .filter(role_claim::Column::ClaimType.eq(c.claim_type.as_str()))
                    .filter(role_claim::Column::ClaimValue.eq(c.claim_value.as_str()))
            } else {
                query.filter(role_claim::Column::Id.eq(c.id))
            };
            query.exec(txn).await?;
        }
        TrackedEntity::EmployeeClaim(c) => {
            let query = employee_claim::Entity::delete_many();
            let query = if c.id == 0 {
                query
                    .filter(employee_claim::Column::UserId.eq(c.user_id.as_str()))
                    .filter(employee_claim::Column::ClaimType.eq(c.claim_type.as_str()))
                    .filter(employee_claim::Column::ClaimValue.eq(c.claim_value.as_str()))
            } else {
                query.filter(employee_claim::Column::Id.eq(c.id))
            };
            query.exec(txn).await?;
        }
        TrackedEntity::EmployeeRole(j) => {
            employee_role::Entity::delete_many()
                .filter(employee_role::Column::UserId.eq(j.user_id.as_str()))
                .filter(employee_role::Column::RoleId.eq(j.role_id.as_str()))
                .exec(txn)
                .await?;
        }
        TrackedEntity::EmployeeLogin(l) => {
            employee_login::Entity::delete_many()
                .filter(employee_login::Column::LoginProvider.eq(l.login_provider.as_str()))
                .filter(employee_login::Column::ProviderKey.eq(l.provider_key.as_str()))
                .exec(txn)
                .await?;
        }
        TrackedEntity::EmployeeToken(t) => {
            employee_token::Entity::delete_many()
                .filter(employee_token::Column::UserId.eq(t.user_id.as_str()))
                .filter(employee_token::Column::LoginProvider.eq(t.login_provider.as_str()))
                .filter(employee_token::Column::Name.eq(t.name.as_str()))
                .exec(txn)
                .await?;
        }
        TrackedEntity::Employee(_) | TrackedEntity::Role(_) => {
            return Err(AppError::internal("Physical delete on an audited entity"));
        }
    }
    Ok(())
}

/// Insert a new row. Claims come back with their database id.
async fn insert(txn: &DatabaseTransaction, entity: TrackedEntity) -> AppResult<TrackedEntity> {
    match entity {
        TrackedEntity::Employee(e) => {
            employee::Entity::insert(employee::ActiveModel::from(&e))
                .exec_without_returning(txn)
                .await?;
            Ok(TrackedEntity::Employee(e))
        }
        TrackedEntity::Role(r) => {
            role::Entity::insert(role::ActiveModel::from(&r))
                .exec_without_returning(txn)
                .await?;
            Ok(TrackedEntity::Role(r))
        }
        TrackedEntity::RoleClaim(c) => {
            let model = role_claim::ActiveModel::from(&c).insert(txn).await?;
            Ok(TrackedEntity::RoleClaim(RoleClaim::from(model)))
        }
        TrackedEntity::EmployeeClaim(c) => {
            let model = employee_claim::ActiveModel::from(&c).insert(txn).await?;
            Ok(TrackedEntity::EmployeeClaim(EmployeeClaim::from(model)))
        }
        TrackedEntity::EmployeeRole(j) => {
            employee_role::Entity::insert(employee_role::ActiveModel::from(&j))
                .exec_without_returning(txn)
                .await?;
            Ok(TrackedEntity::EmployeeRole(j))
        }
        TrackedEntity::EmployeeLogin(l) => {
            employee_login::Entity::insert(employee_login::ActiveModel::from(&l))
                .exec_without_returning(txn)
                .await?;
            Ok(TrackedEntity::EmployeeLogin(l))
        }
        TrackedEntity::EmployeeToken(t) => {
            employee_token::Entity::insert(employee_token::ActiveModel::from(&t))
                .exec_without_returning(txn)
                .await?;
            Ok(TrackedEntity::EmployeeToken(t))
        }
    }
}

/// Full-row update keyed by primary key.
async fn update(txn: &DatabaseTransaction, entity: &TrackedEntity) -> AppResult<()> {
    match entity {
        TrackedEntity::Employee(e) => {
            employee::ActiveModel::from(e).update(txn).await?;
        }
        TrackedEntity::Role(r) => {
            role::ActiveModel::from(r).update(txn).await?;
        }
        TrackedEntity::RoleClaim(c) => {
            if c.id == 0 {
                return Err(not_updated());
            }
            role_claim::ActiveModel::from(c).update(txn).await?;
        }
        TrackedEntity::EmployeeClaim(c) => {
            if c.id == 0 {
                return Err(not_updated());
            }
            employee_claim::ActiveModel::from(c).update(txn).await?;
        }
        TrackedEntity::EmployeeLogin(l) => {
            employee_login::ActiveModel::from(l).update(txn).await?;
        }
        TrackedEntity::EmployeeToken(t) => {
            employee_token::ActiveModel::from(t).update(txn).await?;
        }
        // Only key columns; nothing to update
        TrackedEntity::EmployeeRole(_) => {}
    }
    Ok(())
}
