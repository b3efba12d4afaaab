//! Role repository over the persistence context.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use common::{AppError, AppResult, OptionExt};
use domain::{Claim, DataModel, Role, RoleClaim};

use super::context::PersistenceContext;
use super::entities::{role, role_claim};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role repository trait for dependency injection.
///
/// Query methods exclude soft-deleted roles unless suffixed
/// `_with_deleted`. Roles are returned with their claims loaded.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Role>>;

    async fn find_by_name(&self, normalized_name: &str) -> AppResult<Option<Role>>;

    async fn find_by_name_with_deleted(&self, normalized_name: &str) -> AppResult<Option<Role>>;

    async fn list(&self) -> AppResult<Vec<Role>>;

    async fn create(&self, role: Role) -> AppResult<Role>;

    async fn update(&self, role: Role) -> AppResult<Role>;

    /// Soft delete
    async fn delete(&self, role: Role) -> AppResult<Role>;

    async fn get_claims(&self, role_id: &str) -> AppResult<Vec<RoleClaim>>;

    async fn add_claim(&self, role_id: &str, claim: Claim) -> AppResult<()>;

    async fn remove_claim(&self, role_id: &str, claim: Claim) -> AppResult<usize>;
}

/// Concrete implementation of RoleRepository.
pub struct RoleStore {
    context: Arc<PersistenceContext>,
}

impl RoleStore {
    pub fn new(context: Arc<PersistenceContext>) -> Self {
        Self { context }
    }

    async fn reload(&self, id: &str) -> AppResult<Role> {
        self.context
            .load_roles(role::Entity::find_by_id(id.to_string()))
            .await?
            .into_iter()
            .next()
            .ok_or_not_found()
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Role>> {
        Ok(self
            .context
            .load_roles(
                role::Entity::find_by_id(id.to_string()).filter(role::Column::IsDeleted.eq(false)),
            )
            .await?
            .into_iter()
            .next())
    }

    async fn find_by_name(&self, normalized_name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .context
            .load_roles(
                role::Entity::find()
                    .filter(role::Column::NormalizedName.eq(normalized_name))
                    .filter(role::Column::IsDeleted.eq(false)),
            )
            .await?
            .into_iter()
            .next())
    }

    async fn find_by_name_with_deleted(&self, normalized_name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .context
            .load_roles(
                role::Entity::find().filter(role::Column::NormalizedName.eq(normalized_name)),
            )
            .await?
            .into_iter()
            .next())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        self.context
            .load_roles(
                role::Entity::find()
                    .filter(role::Column::IsDeleted.eq(false))
                    .order_by_asc(role::Column::Name),
            )
            .await
    }

    async fn create(&self, role: Role) -> AppResult<Role> {
        let id = role.id().to_string();
        self.context.add(role);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn update(&self, role: Role) -> AppResult<Role> {
        let id = role.id().to_string();
        self.context.update(role);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn delete(&self, role: Role) -> AppResult<Role> {
        let id = role.id().to_string();
        self.context.remove(role);
        self.context.save_changes().await?;
        self.reload(&id).await
    }

    async fn get_claims(&self, role_id: &str) -> AppResult<Vec<RoleClaim>> {
        let models = role_claim::Entity::find()
            .filter(role_claim::Column::RoleId.eq(role_id))
            .order_by_asc(role_claim::Column::Id)
            .all(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(RoleClaim::from).collect())
    }

    async fn add_claim(&self, role_id: &str, claim: Claim) -> AppResult<()> {
        self.context.add(RoleClaim::new(role_id, &claim));
        self.context.save_changes().await?;
        Ok(())
    }

    async fn remove_claim(&self, role_id: &str, claim: Claim) -> AppResult<usize> {
        let matching: Vec<RoleClaim> = self
            .get_claims(role_id)
            .await?
            .into_iter()
            .filter(|c| c.claim_type == claim.claim_type && c.claim_value == claim.value)
            .collect();

        let count = matching.len();
        for stored in matching {
            self.context.remove(stored);
        }
        self.context.save_changes().await?;
        Ok(count)
    }
}
