//! # Identity Store Gateway
//!
//! [`IdentityStore`] 위에서 "없음"을 `AuthFailure::NotFound`로 바꾸고 운영 로그를 남기는
//! 얇은 계층입니다. 저장소 실패는 분류된 `StorageError` 그대로 올라가며, 공개 에러로의
//! 변환은 [`normalize`](crate::errors::normalize)가 담당합니다.
//!
//! ## 동시 생성
//!
//! 같은 ProviderId로 `create_user`가 동시에 두 번 호출되면 저장소의 유니크 제약에서
//! 경합이 결정됩니다. 하나만 성공하고 나머지는 `UniqueViolation`을 받으며, 이는 공개
//! 계층에서 "user with the same identity already exists" 검증 에러가 됩니다.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::domain::entities::{AuthFilter, AuthIdentity, AuthWithUser, User};
use crate::domain::models::provider::ProviderId;
use crate::errors::AuthFailure;
use crate::repositories::identities::IdentityStore;

#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// User와 첫 Identity를 원자적으로 생성합니다.
    ///
    /// `user_fields`는 검증하지 않습니다. 호출 전에
    /// [`SignupFieldsConfig::validate`](crate::services::users::SignupFieldsConfig::validate)를 거쳐야 합니다.
    pub async fn create_user(
        &self,
        provider_id: &ProviderId,
        serialized_provider_data: String,
        user_fields: Map<String, Value>,
    ) -> Result<User, AuthFailure> {
        let user = self
            .store
            .create_user_with_identity(provider_id, serialized_provider_data, user_fields)
            .await?;

        info!("✅ 사용자 생성: {} ({})", user.id, provider_id.provider_name());
        Ok(user)
    }

    /// 정규화된 키로 Identity를 조회합니다.
    ///
    /// # Errors
    ///
    /// * `AuthFailure::NotFound` - 해당 ProviderId로 생성된 Identity가 없음
    pub async fn find_identity(&self, provider_id: &ProviderId) -> Result<AuthIdentity, AuthFailure> {
        self.store
            .find_identity(provider_id)
            .await?
            .ok_or_else(|| {
                debug!("Identity 없음: {}", provider_id.provider_name());
                AuthFailure::NotFound("identity".to_string())
            })
    }

    /// 직렬화된 ProviderData를 교체합니다.
    pub async fn update_provider_data(
        &self,
        provider_id: &ProviderId,
        serialized_provider_data: String,
    ) -> Result<AuthIdentity, AuthFailure> {
        self.store
            .update_identity_provider_data(provider_id, serialized_provider_data)
            .await?
            .ok_or_else(|| AuthFailure::NotFound("identity".to_string()))
    }

    pub async fn find_auth_with_user(&self, filter: &AuthFilter) -> Result<AuthWithUser, AuthFailure> {
        self.store
            .find_auth_with_user(filter)
            .await?
            .ok_or_else(|| AuthFailure::NotFound("user".to_string()))
    }

    /// 사용자 집합체를 연쇄 삭제하고 실제로 삭제된 수를 반환합니다.
    pub async fn delete_user_by_auth_id(&self, auth_id: &str) -> Result<u64, AuthFailure> {
        let count = self.store.delete_user_by_auth_id(auth_id).await?;

        if count > 0 {
            info!("🗑️ 사용자 삭제: auth_id={}", auth_id);
        } else {
            warn!("⚠️ 삭제된 사용자 없음: auth_id={}", auth_id);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderName;
    use crate::errors::{normalizer::IDENTITY_EXISTS_MESSAGE, AppError};
    use crate::repositories::identities::MemoryIdentityRepository;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryIdentityRepository::new()))
    }

    #[tokio::test]
    async fn test_find_identity_not_found_then_found() {
        let service = service();
        let provider_id = ProviderId::new(ProviderName::Email, "ann@example.com");

        assert!(matches!(
            service.find_identity(&provider_id).await,
            Err(AuthFailure::NotFound(_))
        ));

        service
            .create_user(&provider_id, "{}".to_string(), Map::new())
            .await
            .unwrap();

        let identity = service.find_identity(&provider_id).await.unwrap();
        assert_eq!(identity.provider_id(), provider_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_create_exactly_one_wins() {
        let service = service();
        let provider_id = ProviderId::new(ProviderName::Email, "race@example.com");

        let first = {
            let service = service.clone();
            let provider_id = provider_id.clone();
            tokio::spawn(async move { service.create_user(&provider_id, "{}".to_string(), Map::new()).await })
        };
        let second = {
            let service = service.clone();
            let provider_id = provider_id.clone();
            tokio::spawn(async move { service.create_user(&provider_id, "{}".to_string(), Map::new()).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);

        let failure = results.into_iter().find_map(Result::err).unwrap();
        match AppError::from(failure) {
            AppError::ValidationError(msg) => assert_eq!(msg, IDENTITY_EXISTS_MESSAGE),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_then_identity_is_gone() {
        let service = service();
        let provider_id = ProviderId::new(ProviderName::Username, "bob");
        service
            .create_user(&provider_id, "{}".to_string(), Map::new())
            .await
            .unwrap();

        let identity = service.find_identity(&provider_id).await.unwrap();
        assert_eq!(service.delete_user_by_auth_id(&identity.auth_id).await.unwrap(), 1);

        assert!(matches!(
            service.find_identity(&provider_id).await,
            Err(AuthFailure::NotFound(_))
        ));
        assert!(matches!(
            service.find_auth_with_user(&AuthFilter::AuthId(identity.auth_id.clone())).await,
            Err(AuthFailure::NotFound(_))
        ));
        assert_eq!(service.delete_user_by_auth_id(&identity.auth_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_identity_is_not_found() {
        let service = service();
        let provider_id = ProviderId::new(ProviderName::Username, "ghost");

        assert!(matches!(
            service.update_provider_data(&provider_id, "{}".to_string()).await,
            Err(AuthFailure::NotFound(_))
        ));
    }
}
