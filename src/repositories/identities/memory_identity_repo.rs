//! 메모리 기반 Identity 저장소
//!
//! 테스트와 로컬 개발용입니다. MongoDB 구현과 같은 유니크 의미론을 가지며,
//! 모든 쓰기는 하나의 쓰기 락 안에서 검사와 삽입을 함께 수행합니다.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::debug;
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::entities::{Auth, AuthFilter, AuthIdentity, AuthWithUser, User};
use crate::domain::models::provider::ProviderId;
use crate::errors::{StorageError, StorageErrorKind};
use crate::repositories::identities::IdentityStore;

#[derive(Default)]
pub struct MemoryIdentityRepository {
    records: RwLock<Vec<AuthWithUser>>,
}

impl MemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수
    pub fn user_count(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<AuthWithUser>>, StorageError> {
        self.records
            .read()
            .map_err(|_| StorageError::other("identity store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<AuthWithUser>>, StorageError> {
        self.records
            .write()
            .map_err(|_| StorageError::other("identity store lock poisoned"))
    }
}

fn matches_provider_id(identity: &AuthIdentity, provider_id: &ProviderId) -> bool {
    identity.provider_name == provider_id.provider_name()
        && identity.provider_user_id == provider_id.provider_user_id()
}

fn matches_filter(record: &AuthWithUser, filter: &AuthFilter) -> bool {
    match filter {
        AuthFilter::AuthId(auth_id) => record.auth.id == *auth_id,
        AuthFilter::UserId(user_id) => record.user.id == *user_id,
        AuthFilter::Identity(provider_id) => record
            .identities
            .iter()
            .any(|identity| matches_provider_id(identity, provider_id)),
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityRepository {
    async fn create_user_with_identity(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
        user_fields: Map<String, Value>,
    ) -> Result<User, StorageError> {
        let mut records = self.write()?;

        let taken = records
            .iter()
            .any(|record| matches_filter(record, &AuthFilter::Identity(provider_id.clone())));
        if taken {
            return Err(StorageError::new(
                StorageErrorKind::UniqueViolation,
                format!("duplicate identity {}", provider_id),
            ));
        }

        let user = User::new(ObjectId::new().to_hex(), user_fields);
        let auth = Auth {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
        };
        let identity = AuthIdentity {
            provider_name: provider_id.provider_name(),
            provider_user_id: provider_id.provider_user_id().to_string(),
            provider_data,
            auth_id: auth.id.clone(),
        };

        debug!("🆕 메모리 저장소에 사용자 생성: {}", user.id);
        records.push(AuthWithUser {
            auth,
            user: user.clone(),
            identities: vec![identity],
        });

        Ok(user)
    }

    async fn find_identity(&self, provider_id: &ProviderId) -> Result<Option<AuthIdentity>, StorageError> {
        let records = self.read()?;

        Ok(records
            .iter()
            .flat_map(|record| record.identities.iter())
            .find(|identity| matches_provider_id(identity, provider_id))
            .cloned())
    }

    async fn update_identity_provider_data(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
    ) -> Result<Option<AuthIdentity>, StorageError> {
        let mut records = self.write()?;

        let identity = records
            .iter_mut()
            .flat_map(|record| record.identities.iter_mut())
            .find(|identity| matches_provider_id(identity, provider_id));

        Ok(identity.map(|identity| {
            identity.provider_data = provider_data;
            identity.clone()
        }))
    }

    async fn find_auth_with_user(&self, filter: &AuthFilter) -> Result<Option<AuthWithUser>, StorageError> {
        let records = self.read()?;

        Ok(records.iter().find(|record| matches_filter(record, filter)).cloned())
    }

    async fn delete_user_by_auth_id(&self, auth_id: &str) -> Result<u64, StorageError> {
        let mut records = self.write()?;

        let before = records.len();
        records.retain(|record| record.auth.id != auth_id);

        Ok((before - records.len()) as u64)
    }
}
