//! ProviderData 모델과 저장용 텍스트 코덱
//!
//! 프로바이더마다 구조가 다른 자격 증명 페이로드를 닫힌 열거형 하나로 다룹니다.
//! 저장 형식은 JSON이며 필드 이름은 camelCase 입니다.
//!
//! | 프로바이더 | 저장 형식 |
//! |-----------|-----------|
//! | `email` | `{"hashedPassword", "isEmailVerified", "emailVerificationSentAt", "passwordResetSentAt"}` |
//! | `username` | `{"hashedPassword"}` |
//! | `google`, `github` | `{}` |
//!
//! ## 비밀번호 슬롯
//!
//! `ProviderData<P>`는 비밀번호 슬롯의 타입 `P`로 매개변수화되어 있습니다.
//!
//! - `ProviderData<RawPassword>`: 아직 해싱되지 않은 새 입력. 직렬화할 수 없습니다.
//! - `ProviderData<HashedPassword>` (기본값): 해싱이 끝난 저장 가능한 값.
//!
//! 해싱은 `RawPassword → HashedPassword` 변환으로만 일어나므로 이미 해싱된 값을
//! 다시 해싱하는 코드는 컴파일되지 않습니다.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProviderName;
use crate::errors::{AuthError, CodecError};

/// 해싱 협력자가 만든 단방향 해시
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword(String);

impl HashedPassword {
    /// 해싱 협력자의 출력으로부터 생성합니다.
    ///
    /// 평문 비밀번호를 넣어서는 안 됩니다.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedPassword(***)")
    }
}

/// 사용자가 입력한 평문 비밀번호
///
/// `Serialize`를 구현하지 않으므로 저장 형식으로 흘러갈 수 없습니다.
#[derive(Clone, PartialEq, Eq)]
pub struct RawPassword(String);

impl RawPassword {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword(***)")
    }
}

/// `email` 프로바이더 데이터
///
/// `hashed_password`가 `None`인 값은 비밀번호를 제거한 조회 결과뿐입니다.
/// 저장 형식에서는 모든 키가 필수입니다 ([`deserialize_provider_data`] 참고).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailProviderData<P = HashedPassword> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<P>,
    pub is_email_verified: bool,
    pub email_verification_sent_at: Option<DateTime<Utc>>,
    pub password_reset_sent_at: Option<DateTime<Utc>>,
}

impl<P> EmailProviderData<P> {
    /// 인증되지 않은 이메일 계정 데이터를 만듭니다.
    pub fn new(password: P) -> Self {
        Self {
            hashed_password: Some(password),
            is_email_verified: false,
            email_verification_sent_at: None,
            password_reset_sent_at: None,
        }
    }
}

/// `username` 프로바이더 데이터
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameProviderData<P = HashedPassword> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_password: Option<P>,
}

impl<P> UsernameProviderData<P> {
    pub fn new(password: P) -> Self {
        Self {
            hashed_password: Some(password),
        }
    }
}

/// OAuth 계열 프로바이더 데이터 (로컬 비밀번호 없음)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthProviderData {}

/// 프로바이더별 자격 증명 페이로드
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderData<P = HashedPassword> {
    Email(EmailProviderData<P>),
    Username(UsernameProviderData<P>),
    Google(OAuthProviderData),
    GitHub(OAuthProviderData),
}

/// 해싱 전의 새 입력
pub type UnsanitizedProviderData = ProviderData<RawPassword>;

impl<P> ProviderData<P> {
    /// 비밀번호 없는 OAuth 데이터를 만듭니다.
    ///
    /// 비밀번호를 보관하는 프로바이더가 들어오면 `None`을 반환합니다.
    pub fn oauth(provider: ProviderName) -> Option<Self> {
        match provider {
            ProviderName::Google => Some(ProviderData::Google(OAuthProviderData {})),
            ProviderName::GitHub => Some(ProviderData::GitHub(OAuthProviderData {})),
            ProviderName::Email | ProviderName::Username => None,
        }
    }

    pub fn provider_name(&self) -> ProviderName {
        match self {
            ProviderData::Email(_) => ProviderName::Email,
            ProviderData::Username(_) => ProviderName::Username,
            ProviderData::Google(_) => ProviderName::Google,
            ProviderData::GitHub(_) => ProviderName::GitHub,
        }
    }

    /// 비밀번호 슬롯의 현재 값
    pub fn password(&self) -> Option<&P> {
        match self {
            ProviderData::Email(data) => data.hashed_password.as_ref(),
            ProviderData::Username(data) => data.hashed_password.as_ref(),
            ProviderData::Google(_) | ProviderData::GitHub(_) => None,
        }
    }

    /// 비밀번호 슬롯을 비운 값을 반환합니다.
    pub fn without_password(self) -> Self {
        match self {
            ProviderData::Email(data) => ProviderData::Email(EmailProviderData {
                hashed_password: None,
                ..data
            }),
            ProviderData::Username(_) => ProviderData::Username(UsernameProviderData {
                hashed_password: None,
            }),
            oauth => oauth,
        }
    }

    /// 비밀번호 슬롯의 타입을 바꿉니다. 나머지 필드는 그대로 유지됩니다.
    pub fn try_map_password<Q, E>(
        self,
        f: impl FnOnce(P) -> Result<Q, E>,
    ) -> Result<ProviderData<Q>, E> {
        Ok(match self {
            ProviderData::Email(data) => ProviderData::Email(EmailProviderData {
                hashed_password: data.hashed_password.map(f).transpose()?,
                is_email_verified: data.is_email_verified,
                email_verification_sent_at: data.email_verification_sent_at,
                password_reset_sent_at: data.password_reset_sent_at,
            }),
            ProviderData::Username(data) => ProviderData::Username(UsernameProviderData {
                hashed_password: data.hashed_password.map(f).transpose()?,
            }),
            ProviderData::Google(data) => ProviderData::Google(data),
            ProviderData::GitHub(data) => ProviderData::GitHub(data),
        })
    }
}

impl ProviderData {
    /// 저장된 비밀번호 해시
    pub fn hashed_password(&self) -> Option<&HashedPassword> {
        self.password()
    }

    /// `update`를 현재 값 위에 덮어씁니다 (얕은 필드 덮어쓰기).
    ///
    /// `update`의 비밀번호는 이미 해싱된 상태여야 합니다.
    /// 프로바이더가 다르면 `AuthError::ProviderMismatch`를 반환합니다.
    pub fn merge(self, update: ProviderDataUpdate<HashedPassword>) -> Result<Self, AuthError> {
        match (self, update) {
            (ProviderData::Email(mut data), ProviderDataUpdate::Email(update)) => {
                if let Some(password) = update.password {
                    data.hashed_password = Some(password);
                }
                if let Some(verified) = update.is_email_verified {
                    data.is_email_verified = verified;
                }
                if let Some(sent_at) = update.email_verification_sent_at {
                    data.email_verification_sent_at = sent_at;
                }
                if let Some(sent_at) = update.password_reset_sent_at {
                    data.password_reset_sent_at = sent_at;
                }
                Ok(ProviderData::Email(data))
            }
            (ProviderData::Username(mut data), ProviderDataUpdate::Username(update)) => {
                if let Some(password) = update.password {
                    data.hashed_password = Some(password);
                }
                Ok(ProviderData::Username(data))
            }
            (existing, _) => Err(AuthError::ProviderMismatch {
                expected: existing.provider_name(),
            }),
        }
    }
}

/// `email` 데이터의 부분 업데이트
///
/// `None`인 필드는 기존 값을 유지합니다. 시각 필드의 `Some(None)`은 값을 지웁니다.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailProviderDataUpdate<P = RawPassword> {
    pub password: Option<P>,
    pub is_email_verified: Option<bool>,
    pub email_verification_sent_at: Option<Option<DateTime<Utc>>>,
    pub password_reset_sent_at: Option<Option<DateTime<Utc>>>,
}

impl<P> Default for EmailProviderDataUpdate<P> {
    fn default() -> Self {
        Self {
            password: None,
            is_email_verified: None,
            email_verification_sent_at: None,
            password_reset_sent_at: None,
        }
    }
}

/// `username` 데이터의 부분 업데이트
#[derive(Debug, Clone, PartialEq)]
pub struct UsernameProviderDataUpdate<P = RawPassword> {
    pub password: Option<P>,
}

/// ProviderData 부분 업데이트
///
/// OAuth 계열은 바꿀 필드가 없으므로 변형이 없습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderDataUpdate<P = RawPassword> {
    Email(EmailProviderDataUpdate<P>),
    Username(UsernameProviderDataUpdate<P>),
}

impl<P> ProviderDataUpdate<P> {
    /// 업데이트에 새 비밀번호가 들어 있는지 여부
    pub fn has_password(&self) -> bool {
        match self {
            ProviderDataUpdate::Email(update) => update.password.is_some(),
            ProviderDataUpdate::Username(update) => update.password.is_some(),
        }
    }

    pub fn try_map_password<Q, E>(
        self,
        f: impl FnOnce(P) -> Result<Q, E>,
    ) -> Result<ProviderDataUpdate<Q>, E> {
        Ok(match self {
            ProviderDataUpdate::Email(update) => ProviderDataUpdate::Email(EmailProviderDataUpdate {
                password: update.password.map(f).transpose()?,
                is_email_verified: update.is_email_verified,
                email_verification_sent_at: update.email_verification_sent_at,
                password_reset_sent_at: update.password_reset_sent_at,
            }),
            ProviderDataUpdate::Username(update) => {
                ProviderDataUpdate::Username(UsernameProviderDataUpdate {
                    password: update.password.map(f).transpose()?,
                })
            }
        })
    }
}

/// `email` 저장 형식. 시각 필드는 `null`일 수 있지만 키는 빠질 수 없습니다.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredEmailData {
    hashed_password: HashedPassword,
    is_email_verified: bool,
    #[serde(deserialize_with = "Option::deserialize")]
    email_verification_sent_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "Option::deserialize")]
    password_reset_sent_at: Option<DateTime<Utc>>,
}

impl From<StoredEmailData> for EmailProviderData {
    fn from(stored: StoredEmailData) -> Self {
        Self {
            hashed_password: Some(stored.hashed_password),
            is_email_verified: stored.is_email_verified,
            email_verification_sent_at: stored.email_verification_sent_at,
            password_reset_sent_at: stored.password_reset_sent_at,
        }
    }
}

/// `username` 저장 형식
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct StoredUsernameData {
    hashed_password: HashedPassword,
}

impl From<StoredUsernameData> for UsernameProviderData {
    fn from(stored: StoredUsernameData) -> Self {
        Self::new(stored.hashed_password)
    }
}

/// 역직렬화 옵션
#[derive(Debug, Clone, Copy, Default)]
pub struct DeserializeOptions {
    /// 결과에서 비밀번호 해시를 제거할지 여부
    pub strip_secret: bool,
}

/// 저장된 텍스트를 `provider`에 맞는 ProviderData로 해석합니다.
///
/// 해당 프로바이더의 저장 형식과 맞지 않으면(필수 키 누락 포함) `CodecError::MalformedData`를
/// 반환합니다. `options.strip_secret`은 해석이 끝난 뒤에 적용되므로 해시가 빠진 저장값은
/// 옵션과 관계없이 거부됩니다.
pub fn deserialize_provider_data(
    provider: ProviderName,
    raw: &str,
    options: DeserializeOptions,
) -> Result<ProviderData, CodecError> {
    let malformed = |source| CodecError::MalformedData { provider, source };

    let data = match provider {
        ProviderName::Email => {
            let stored: StoredEmailData = serde_json::from_str(raw).map_err(malformed)?;
            ProviderData::Email(stored.into())
        }
        ProviderName::Username => {
            let stored: StoredUsernameData = serde_json::from_str(raw).map_err(malformed)?;
            ProviderData::Username(stored.into())
        }
        ProviderName::Google => ProviderData::Google(serde_json::from_str(raw).map_err(malformed)?),
        ProviderName::GitHub => ProviderData::GitHub(serde_json::from_str(raw).map_err(malformed)?),
    };

    if options.strip_secret {
        Ok(data.without_password())
    } else {
        Ok(data)
    }
}

/// ProviderData를 저장용 텍스트로 직렬화합니다.
///
/// 같은 값은 항상 같은 텍스트가 됩니다 (필드 순서 고정).
pub fn serialize_provider_data(data: &ProviderData) -> Result<String, CodecError> {
    match data {
        ProviderData::Email(data) => serde_json::to_string(data),
        ProviderData::Username(data) => serde_json::to_string(data),
        ProviderData::Google(data) | ProviderData::GitHub(data) => serde_json::to_string(data),
    }
    .map_err(CodecError::Serialization)
}
