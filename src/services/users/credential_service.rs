//! Credential Sanitizer
//!
//! 새로 들어온 평문 비밀번호를 해싱 협력자의 출력으로 바꾸고, 부분 업데이트를 기존
//! ProviderData에 병합해 저장합니다.
//!
//! 해싱은 `RawPassword → HashedPassword` 변환이므로, 이미 해싱된 값은 `sanitize`에
//! 다시 넣을 수 없습니다. 한 번의 자격 증명 변경에 해싱은 정확히 한 번 일어납니다.
//!
//! `update_provider_data`는 읽기-수정-쓰기이며 낙관적 동시성 제어가 없습니다.
//! 같은 Identity에 대한 동시 업데이트는 나중 쓰기가 이기고 먼저 쓴 필드는 사라질 수 있습니다.

use std::sync::Arc;

use log::info;

use crate::domain::entities::AuthIdentity;
use crate::domain::models::provider::{
    serialize_provider_data, HashedPassword, ProviderData, ProviderDataUpdate, ProviderId, RawPassword,
    UnsanitizedProviderData,
};
use crate::errors::{AuthFailure, HashError};
use crate::services::auth::PasswordHasher;
use crate::services::users::IdentityService;

#[derive(Clone)]
pub struct CredentialService {
    hasher: Arc<dyn PasswordHasher>,
    identities: IdentityService,
}

impl CredentialService {
    pub fn new(hasher: Arc<dyn PasswordHasher>, identities: IdentityService) -> Self {
        Self { hasher, identities }
    }

    /// 새 입력의 평문 비밀번호를 해시로 바꿉니다. 비밀번호 외의 필드는 그대로입니다.
    pub fn sanitize(&self, data: UnsanitizedProviderData) -> Result<ProviderData, HashError> {
        data.try_map_password(|password| self.hasher.hash(&password))
    }

    /// 부분 업데이트에 들어 있는 평문 비밀번호만 해싱합니다.
    pub fn sanitize_update(
        &self,
        update: ProviderDataUpdate,
    ) -> Result<ProviderDataUpdate<HashedPassword>, HashError> {
        update.try_map_password(|password| self.hasher.hash(&password))
    }

    /// 로그인 비밀번호 검증. 비밀번호가 없는 프로바이더는 항상 `false`입니다.
    pub fn verify_password(&self, data: &ProviderData, password: &RawPassword) -> Result<bool, HashError> {
        match data.hashed_password() {
            Some(hashed) => self.hasher.verify(password, hashed),
            None => Ok(false),
        }
    }

    /// `update`를 `existing` 위에 병합해 저장하고 갱신된 Identity를 반환합니다.
    ///
    /// `existing`은 비밀번호 해시를 제거하지 않고(`strip_secret: false`) 읽은 값이어야 합니다.
    /// 제거된 값을 넘기면 저장된 해시가 사라집니다.
    ///
    /// # Errors
    ///
    /// * `AuthFailure::Auth(ProviderMismatch)` - 업데이트와 기존 데이터의 프로바이더가 다름
    /// * `AuthFailure::NotFound` - `provider_id`와 일치하는 Identity가 없음
    pub async fn update_provider_data(
        &self,
        provider_id: &ProviderId,
        existing: ProviderData,
        update: ProviderDataUpdate,
    ) -> Result<AuthIdentity, AuthFailure> {
        let changes_password = update.has_password();

        let update = self.sanitize_update(update)?;
        let merged = existing.merge(update)?;
        let serialized = serialize_provider_data(&merged)?;

        let identity = self
            .identities
            .update_provider_data(provider_id, serialized)
            .await?;

        if changes_password {
            info!("🔑 비밀번호 변경: {}", provider_id.provider_name());
        }
        Ok(identity)
    }
}
