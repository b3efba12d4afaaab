//! Signing key store used by the token issuer.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{EntityTrait, QueryOrder};

use common::{AppError, AppResult};
use domain::SigningKey;

use super::context::PersistenceContext;
use super::entities::signing_key;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// All stored keys, oldest first
    async fn load_keys(&self) -> AppResult<Vec<SigningKey>>;

    async fn store_key(&self, key: SigningKey) -> AppResult<()>;

    async fn delete_key(&self, id: &str) -> AppResult<()>;
}

/// SeaORM-backed key store.
pub struct SigningKeyStore {
    context: Arc<PersistenceContext>,
}

impl SigningKeyStore {
    pub fn new(context: Arc<PersistenceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl KeyStore for SigningKeyStore {
    async fn load_keys(&self) -> AppResult<Vec<SigningKey>> {
        let models = signing_key::Entity::find()
            .order_by_asc(signing_key::Column::Created)
            .all(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(SigningKey::from).collect())
    }

    async fn store_key(&self, key: SigningKey) -> AppResult<()> {
        signing_key::Entity::insert(signing_key::ActiveModel::from(&key))
            .exec_without_returning(self.context.db())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn delete_key(&self, id: &str) -> AppResult<()> {
        let result = signing_key::Entity::delete_by_id(id.to_string())
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            tracing::warn!(key_id = id, "Signing key to delete was not found");
        }
        Ok(())
    }
}
