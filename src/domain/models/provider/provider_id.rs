//! ProviderId 값 타입
//!
//! Identity를 유일하게 식별하는 `(provider_name, provider_user_id)` 키입니다.
//! 예: `email` 프로바이더의 `test@test.com`, `google` 프로바이더의 `1234567890`.

use std::fmt;

use crate::config::ProviderName;

/// 정규화된 Identity 키
///
/// `provider_user_id`는 생성 시점에 항상 소문자로 정규화되므로,
/// 대소문자만 다른 두 요청은 같은 Identity로 해석됩니다.
/// 필드를 직접 바꿀 수 없도록 getter만 제공합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId {
    provider_name: ProviderName,
    provider_user_id: String,
}

impl ProviderId {
    /// ProviderId를 생성합니다. `raw_user_id`는 소문자로 정규화됩니다.
    ///
    /// # 예제
    ///
    /// ```rust,ignore
    /// let id = ProviderId::new(ProviderName::Email, "User@Example.com");
    /// assert_eq!(id.provider_user_id(), "user@example.com");
    /// ```
    pub fn new(provider_name: ProviderName, raw_user_id: &str) -> Self {
        Self {
            provider_name,
            provider_user_id: raw_user_id.to_lowercase(),
        }
    }

    pub fn provider_name(&self) -> ProviderName {
        self.provider_name
    }

    pub fn provider_user_id(&self) -> &str {
        &self.provider_user_id
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name, self.provider_user_id)
    }
}
