//! Persisted grant store used by the token issuer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select};

use common::{AppError, AppResult};
use domain::{GrantFilter, PersistedGrant};

use super::context::PersistenceContext;
use super::entities::persisted_grant;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Grant persistence. Grants carry no audit envelope; removal is physical.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Insert or replace a grant by key
    async fn store(&self, grant: PersistedGrant) -> AppResult<()>;

    async fn get(&self, key: &str) -> AppResult<Option<PersistedGrant>>;

    async fn get_all(&self, filter: GrantFilter) -> AppResult<Vec<PersistedGrant>>;

    /// Mark a grant consumed. Returns false if it was missing or already consumed.
    async fn consume(&self, key: &str, at: DateTime<Utc>) -> AppResult<bool>;

    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Remove every grant matching the filter. Returns the number removed.
    async fn remove_all(&self, filter: GrantFilter) -> AppResult<u64>;

    /// Remove grants that expired before `now`
    async fn remove_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

/// SeaORM-backed grant store.
pub struct PersistedGrantStore {
    context: Arc<PersistenceContext>,
}

impl PersistedGrantStore {
    pub fn new(context: Arc<PersistenceContext>) -> Self {
        Self { context }
    }
}

fn filter_condition(filter: &GrantFilter) -> AppResult<Condition> {
    if filter.is_empty() {
        return Err(AppError::validation("No grant filter values set"));
    }

    let mut condition = Condition::all();
    if let Some(subject_id) = &filter.subject_id {
        condition = condition.add(persisted_grant::Column::SubjectId.eq(subject_id.as_str()));
    }
    if let Some(session_id) = &filter.session_id {
        condition = condition.add(persisted_grant::Column::SessionId.eq(session_id.as_str()));
    }
    if let Some(client_id) = &filter.client_id {
        condition = condition.add(persisted_grant::Column::ClientId.eq(client_id.as_str()));
    }
    if let Some(grant_type) = &filter.grant_type {
        condition = condition.add(persisted_grant::Column::GrantType.eq(grant_type.as_str()));
    }
    Ok(condition)
}

fn filtered(filter: &GrantFilter) -> AppResult<Select<persisted_grant::Entity>> {
    Ok(persisted_grant::Entity::find().filter(filter_condition(filter)?))
}

#[async_trait]
impl GrantStore for PersistedGrantStore {
    async fn store(&self, grant: PersistedGrant) -> AppResult<()> {
        persisted_grant::Entity::insert(persisted_grant::ActiveModel::from(&grant))
            .on_conflict(
                OnConflict::column(persisted_grant::Column::Key)
                    .update_columns([
                        persisted_grant::Column::GrantType,
                        persisted_grant::Column::SubjectId,
                        persisted_grant::Column::SessionId,
                        persisted_grant::Column::ClientId,
                        persisted_grant::Column::Description,
                        persisted_grant::Column::CreationTime,
                        persisted_grant::Column::Expiration,
                        persisted_grant::Column::ConsumedTime,
                        persisted_grant::Column::Data,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.context.db())
            .await
            .map_err(AppError::from)?;

        tracing::debug!(grant_type = %grant.grant_type, "Stored persisted grant");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Option<PersistedGrant>> {
        let model = persisted_grant::Entity::find_by_id(key.to_string())
            .one(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(model.map(PersistedGrant::from))
    }

    async fn get_all(&self, filter: GrantFilter) -> AppResult<Vec<PersistedGrant>> {
        let models = filtered(&filter)?
            .order_by_asc(persisted_grant::Column::CreationTime)
            .all(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(PersistedGrant::from).collect())
    }

    async fn consume(&self, key: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let result = persisted_grant::Entity::update_many()
            .col_expr(
                persisted_grant::Column::ConsumedTime,
                sea_orm::sea_query::Expr::value(at),
            )
            .filter(persisted_grant::Column::Key.eq(key))
            .filter(persisted_grant::Column::ConsumedTime.is_null())
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        persisted_grant::Entity::delete_by_id(key.to_string())
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn remove_all(&self, filter: GrantFilter) -> AppResult<u64> {
        let result = persisted_grant::Entity::delete_many()
            .filter(filter_condition(&filter)?)
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = persisted_grant::Entity::delete_many()
            .filter(persisted_grant::Column::Expiration.lt(now))
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected > 0 {
            tracing::info!(removed = result.rows_affected, "Removed expired grants");
        }
        Ok(result.rows_affected)
    }
}
