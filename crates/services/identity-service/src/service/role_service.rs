//! Role service - role lifecycle and role claims.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use common::{AppResult, OptionExt};
use domain::{normalize, Claim, IdentityResult, Role};

use crate::repository::RoleRepository;

/// Role service trait for dependency injection.
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn create(&self, name: &str) -> AppResult<IdentityResult>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    async fn role_exists(&self, name: &str) -> AppResult<bool>;

    async fn list(&self) -> AppResult<Vec<Role>>;

    async fn delete(&self, id: &str) -> AppResult<IdentityResult>;

    async fn add_claim(&self, role_id: &str, claim: Claim) -> AppResult<IdentityResult>;

    async fn remove_claim(&self, role_id: &str, claim: Claim) -> AppResult<IdentityResult>;

    async fn get_claims(&self, role_id: &str) -> AppResult<Vec<Claim>>;
}

/// Concrete implementation of RoleService.
pub struct RoleManager {
    roles: Arc<dyn RoleRepository>,
}

impl RoleManager {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl RoleService for RoleManager {
    async fn create(&self, name: &str) -> AppResult<IdentityResult> {
        if name.trim().is_empty() {
            return Ok(IdentityResult::failed_with(
                "InvalidRoleName",
                format!("Role name '{}' is invalid.", name),
            ));
        }

        // Soft-deleted roles still hold their unique name
        if self
            .roles
            .find_by_name_with_deleted(&normalize(name))
            .await?
            .is_some()
        {
            return Ok(IdentityResult::failed_with(
                "DuplicateRoleName",
                format!("Role name '{}' is already taken.", name),
            ));
        }

        let mut role = Role::new(name);
        role.concurrency_stamp = Uuid::new_v4().to_string();
        self.roles.create(role).await?;
        tracing::info!(role = name, "Role created");
        Ok(IdentityResult::success())
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Role>> {
        self.roles.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.roles.find_by_name(&normalize(name)).await
    }

    async fn role_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.find_by_name(name).await?.is_some())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    async fn delete(&self, id: &str) -> AppResult<IdentityResult> {
        let role = self.roles.find_by_id(id).await?.ok_or_not_found()?;
        self.roles.delete(role).await?;
        Ok(IdentityResult::success())
    }

    async fn add_claim(&self, role_id: &str, claim: Claim) -> AppResult<IdentityResult> {
        let role = self.roles.find_by_id(role_id).await?.ok_or_not_found()?;
        if role.claim_values().contains(&claim) {
            return Ok(IdentityResult::failed_with(
                "DuplicateRoleClaim",
                format!("Role already has claim '{}'.", claim.claim_type),
            ));
        }
        self.roles.add_claim(role_id, claim).await?;
        Ok(IdentityResult::success())
    }

    async fn remove_claim(&self, role_id: &str, claim: Claim) -> AppResult<IdentityResult> {
        self.roles.remove_claim(role_id, claim).await?;
        Ok(IdentityResult::success())
    }

    async fn get_claims(&self, role_id: &str) -> AppResult<Vec<Claim>> {
        Ok(self
            .roles
            .get_claims(role_id)
            .await?
            .iter()
            .map(|c| c.to_claim())
            .collect())
    }
}
