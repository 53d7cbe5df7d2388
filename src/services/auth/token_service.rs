//! JWT 토큰 발급/검증 서비스
//!
//! HMAC-SHA256으로 서명된 상태 없는 토큰을 다룹니다.
//!
//! - **세션 토큰**: 사용자 ID와 만료 시각만 담음 (`SessionClaims`)
//! - **이메일 토큰**: 이메일 인증/비밀번호 재설정 링크용 (`EmailTokenClaims`)
//!
//! 두 토큰은 클레임 구조가 달라 서로 대신 사용할 수 없으며, 검증 실패는 만료와
//! 위조를 구분하지 않고 `TokenError::Invalid` 하나로 보고됩니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::AuthSettings;
use crate::domain::models::token::{EmailTokenClaims, EmailTokenPurpose, SessionClaims};
use crate::errors::{AuthError, AuthFailure, TokenError};

/// JWT 토큰 서비스
///
/// 키와 검증 규칙은 생성 시 한 번 만들어지며, 이후 모든 메서드는 `&self`만 필요하므로
/// 여러 작업에서 동시에 호출해도 안전합니다.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    session_lifetime: Duration,
    email_token_lifetime: Duration,
}

impl TokenService {
    pub fn new(secret: &str, session_lifetime: Duration, email_token_lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            session_lifetime,
            email_token_lifetime,
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            &settings.jwt_secret,
            settings.session_lifetime,
            settings.email_token_lifetime,
        )
    }

    /// 사용자 세션 토큰을 발급합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let token = token_service.issue_session_token(&user.id)?;
    /// let claims = token_service.verify_session_token(&token)?;
    /// assert_eq!(claims.sub, user.id);
    /// ```
    pub fn issue_session_token(&self, user_id: &str) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.session_lifetime).timestamp(),
        };

        self.sign(&claims)
    }

    /// 세션 토큰을 검증하고 클레임을 반환합니다.
    ///
    /// # Errors
    ///
    /// * `TokenError::Invalid` - 서명 불일치, 만료, 형식 오류, 다른 종류의 토큰
    pub fn verify_session_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode(token)
    }

    /// 이메일 인증/비밀번호 재설정용 토큰을 발급합니다.
    pub fn issue_email_token(&self, email: &str, purpose: EmailTokenPurpose) -> Result<String, TokenError> {
        let now = Utc::now();

        let claims = EmailTokenClaims {
            email: email.to_lowercase(),
            purpose,
            iat: now.timestamp(),
            exp: (now + self.email_token_lifetime).timestamp(),
        };

        self.sign(&claims)
    }

    /// 이메일 토큰을 검증합니다.
    ///
    /// # Errors
    ///
    /// * `AuthFailure::Token(TokenError::Invalid)` - 서명/만료/형식 검증 실패
    /// * `AuthFailure::Auth(AuthError::TokenPurposeMismatch)` - 다른 용도로 발급된 토큰
    pub fn verify_email_token(
        &self,
        token: &str,
        purpose: EmailTokenPurpose,
    ) -> Result<EmailTokenClaims, AuthFailure> {
        let claims: EmailTokenClaims = self.decode(token)?;

        if claims.purpose != purpose {
            log::warn!("⚠️ 용도가 다른 이메일 토큰: expected={:?}, actual={:?}", purpose, claims.purpose);
            return Err(AuthError::TokenPurposeMismatch.into());
        }

        Ok(claims)
    }

    /// `Authorization` 헤더의 `Bearer {token}` 형식에서 토큰 부분만 추출합니다.
    pub fn extract_bearer_token<'a>(&self, auth_header: &'a str) -> Result<&'a str, TokenError> {
        match auth_header.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim()),
            _ => Err(TokenError::Invalid),
        }
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| {
                // 만료/위조 구분은 운영 로그에만 남김
                log::debug!("토큰 검증 실패: {:?}", e.kind());
                TokenError::Invalid
            })
    }
}
