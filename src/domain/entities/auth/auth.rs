//! Auth / Identity 엔티티
//!
//! ```text
//! User 1 ── 1 Auth 1 ── N AuthIdentity
//! ```
//!
//! `Auth`는 사용자의 인증 정보 묶음이며, 각 `AuthIdentity`는 프로바이더 하나의
//! 자격 증명을 나타냅니다. Identity의 키 `(provider_name, provider_user_id)`는
//! 전체 Identity 공간에서 유일합니다.

use serde::{Deserialize, Serialize};

use crate::config::ProviderName;
use crate::domain::entities::User;
use crate::domain::models::provider::{
    deserialize_provider_data, DeserializeOptions, ProviderData, ProviderId,
};
use crate::errors::CodecError;

/// 인증 집합체 루트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    pub id: String,
    pub user_id: String,
}

/// 프로바이더 하나의 자격 증명
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub provider_name: ProviderName,
    /// 항상 소문자로 정규화된 값
    pub provider_user_id: String,
    /// 직렬화된 ProviderData (해석은 코덱이 담당)
    pub provider_data: String,
    pub auth_id: String,
}

impl AuthIdentity {
    pub fn provider_id(&self) -> ProviderId {
        ProviderId::new(self.provider_name, &self.provider_user_id)
    }

    /// 저장된 ProviderData를 해석합니다.
    pub fn decode_provider_data(&self, options: DeserializeOptions) -> Result<ProviderData, CodecError> {
        deserialize_provider_data(self.provider_name, &self.provider_data, options)
    }
}

/// Auth와 그 소유 User의 조인 결과
#[derive(Debug, Clone, PartialEq)]
pub struct AuthWithUser {
    pub auth: Auth,
    pub user: User,
    pub identities: Vec<AuthIdentity>,
}

impl AuthWithUser {
    /// 주어진 프로바이더의 Identity를 찾습니다.
    pub fn identity(&self, provider_name: ProviderName) -> Option<&AuthIdentity> {
        self.identities
            .iter()
            .find(|identity| identity.provider_name == provider_name)
    }
}

/// `find_auth_with_user` 조회 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFilter {
    AuthId(String),
    UserId(String),
    Identity(ProviderId),
}
