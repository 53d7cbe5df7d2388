//! 영속성 협력자 계약
//!
//! 코어는 저장소 엔진 자체가 아니라 이 트레이트가 돌려주는 결과와
//! [`StorageErrorKind`](crate::errors::StorageErrorKind) 분류에만 의존합니다.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::entities::{AuthFilter, AuthIdentity, AuthWithUser, User};
use crate::domain::models::provider::ProviderId;
use crate::errors::StorageError;

/// Identity 저장소
///
/// 구현체는 `(provider_name, provider_user_id)` 유니크 제약을 보장해야 하며,
/// 위반 시 `StorageErrorKind::UniqueViolation`을 반환해야 합니다.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// User와 첫 Identity를 하나의 원자적 연산으로 생성합니다.
    ///
    /// `user_fields`는 검증 없이 그대로 저장됩니다.
    async fn create_user_with_identity(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
        user_fields: Map<String, Value>,
    ) -> Result<User, StorageError>;

    /// 정규화된 키로 Identity를 정확히 일치 조회합니다.
    async fn find_identity(&self, provider_id: &ProviderId) -> Result<Option<AuthIdentity>, StorageError>;

    /// Identity의 직렬화된 ProviderData를 교체하고 갱신된 Identity를 반환합니다.
    ///
    /// 일치하는 Identity가 없으면 `Ok(None)`.
    async fn update_identity_provider_data(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
    ) -> Result<Option<AuthIdentity>, StorageError>;

    async fn find_auth_with_user(&self, filter: &AuthFilter) -> Result<Option<AuthWithUser>, StorageError>;

    /// Auth ID로 사용자 집합체(User, Auth, 모든 Identity)를 삭제하고 삭제된 사용자 수를 반환합니다.
    async fn delete_user_by_auth_id(&self, auth_id: &str) -> Result<u64, StorageError>;
}
