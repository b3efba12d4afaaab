//! Device-flow code store used by the token issuer.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{AppError, AppResult, OptionExt};
use domain::DeviceFlowCode;

use super::context::PersistenceContext;
use super::entities::device_code;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DeviceFlowStore: Send + Sync {
    async fn store_device_authorization(&self, code: DeviceFlowCode) -> AppResult<()>;

    async fn find_by_user_code(&self, user_code: &str) -> AppResult<Option<DeviceFlowCode>>;

    async fn find_by_device_code(&self, device_code: &str) -> AppResult<Option<DeviceFlowCode>>;

    /// Replace subject, session, description and data of a pending code
    async fn update_by_user_code(&self, user_code: &str, code: DeviceFlowCode) -> AppResult<()>;

    async fn remove_by_device_code(&self, device_code: &str) -> AppResult<()>;
}

/// SeaORM-backed device-flow store.
pub struct DeviceFlowCodeStore {
    context: Arc<PersistenceContext>,
}

impl DeviceFlowCodeStore {
    pub fn new(context: Arc<PersistenceContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DeviceFlowStore for DeviceFlowCodeStore {
    async fn store_device_authorization(&self, code: DeviceFlowCode) -> AppResult<()> {
        device_code::Entity::insert(device_code::ActiveModel::from(&code))
            .exec_without_returning(self.context.db())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn find_by_user_code(&self, user_code: &str) -> AppResult<Option<DeviceFlowCode>> {
        let model = device_code::Entity::find_by_id(user_code.to_string())
            .one(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(model.map(DeviceFlowCode::from))
    }

    async fn find_by_device_code(&self, device_code: &str) -> AppResult<Option<DeviceFlowCode>> {
        let model = device_code::Entity::find()
            .filter(device_code::Column::DeviceCode.eq(device_code))
            .one(self.context.db())
            .await
            .map_err(AppError::from)?;

        Ok(model.map(DeviceFlowCode::from))
    }

    async fn update_by_user_code(&self, user_code: &str, code: DeviceFlowCode) -> AppResult<()> {
        let existing = self.find_by_user_code(user_code).await?.ok_or_not_found()?;

        let updated = DeviceFlowCode {
            user_code: existing.user_code,
            device_code: existing.device_code,
            client_id: existing.client_id,
            creation_time: existing.creation_time,
            expiration: existing.expiration,
            subject_id: code.subject_id,
            session_id: code.session_id,
            description: code.description,
            data: code.data,
        };

        device_code::Entity::update(device_code::ActiveModel::from(&updated))
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }

    async fn remove_by_device_code(&self, device_code: &str) -> AppResult<()> {
        device_code::Entity::delete_many()
            .filter(device_code::Column::DeviceCode.eq(device_code))
            .exec(self.context.db())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
