//! 인증 코어 전역에서 사용하는 에러 시스템
//!
//! 내부 에러(`AuthFailure`와 그 하위 에러들)와 외부로 노출되는 공개 에러(`AppError`)를
//! 분리합니다. 내부 에러는 [`normalizer`](crate::errors::normalizer)를 거쳐서만
//! 공개 에러로 변환되며, 이 과정에서 어떤 필드가 충돌했는지나 저장소의 세부 원인은
//! 호출자에게 전달되지 않습니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use auth_identity_core::errors::{AppError, AuthFailure, StorageError, StorageErrorKind};
//!
//! let failure = AuthFailure::from(StorageError::new(
//!     StorageErrorKind::UniqueViolation,
//!     "E11000 duplicate key error",
//! ));
//!
//! let public: AppError = failure.into();
//! assert_eq!(public.to_string(), "Validation error: user with the same identity already exists");
//! ```

use std::fmt;

use thiserror::Error;

use crate::config::ProviderName;

/// 공개 에러 타입
///
/// 호출자(HTTP 계층 등)에게 노출되는 닫힌 에러 분류입니다.
/// `actix_web::ResponseError`를 구현하여 그대로 HTTP 응답으로 변환할 수 있습니다.
#[derive(Error, Debug)]
pub enum AppError {
    /// 입력값/비즈니스 규칙 위반 (422 Unprocessable Entity)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 인증 실패 (401 Unauthorized)
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// 내부 서버 에러 (500 Internal Server Error), 메시지는 항상 일반화된 문구
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// 분류되지 않은 내부 실패 (500 Internal Server Error)
    ///
    /// 원래 실패를 그대로 담아 운영자가 볼 수 있도록 합니다.
    #[error(transparent)]
    Unexpected(Box<AuthFailure>),
}

impl AppError {
    /// 클라이언트에게 보여줄 메시지
    ///
    /// `Unexpected`는 원인을 숨기고 일반화된 문구만 반환합니다.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::AuthenticationError(msg)
            | AppError::InternalError(msg) => msg,
            AppError::Unexpected(_) => "there was an unexpected error",
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;

        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// HTTP 에러 응답을 생성합니다.
    ///
    /// `Unexpected`의 경우 원래 실패 내용은 응답에 포함하지 않습니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match self {
            AppError::Unexpected(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        actix_web::HttpResponse::build(self.status_code())
            .json(serde_json::json!({
                "error": error,
                "message": self.public_message(),
            }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 인증 코어 내부에서 발생하는 모든 실패
#[derive(Error, Debug)]
pub enum AuthFailure {
    /// 코어가 직접 만든 검증/불변식 에러
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// 저장소 실패
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// 토큰 서명/검증 실패
    #[error(transparent)]
    Token(#[from] TokenError),

    /// ProviderData 직렬화/역직렬화 실패
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// 비밀번호 해싱 실패
    #[error(transparent)]
    Hash(#[from] HashError),

    /// 인증/재설정 메일 발송 실패
    #[error(transparent)]
    Email(#[from] EmailError),

    /// 대상 Identity/Auth가 존재하지 않음
    #[error("{0} not found")]
    NotFound(String),

    /// 로그인 자격 증명 불일치
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// 코어가 직접 발생시키는 검증/불변식 에러
///
/// 메시지는 코어가 작성한 것이므로 그대로 공개해도 안전합니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// 입력값 검증 실패
    #[error("{0}")]
    Validation(String),

    /// 업데이트가 기존 ProviderData와 다른 프로바이더용인 경우
    #[error("provider data update does not match provider {expected}")]
    ProviderMismatch { expected: ProviderName },

    /// 이메일 토큰이 다른 용도로 발급된 경우
    #[error("token was issued for a different purpose")]
    TokenPurposeMismatch,
}

/// 저장소가 돌려주는 실패 신호의 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    /// `(provider_name, provider_user_id)` 유니크 제약 위반
    UniqueViolation,
    /// 스키마/문서 검증 실패
    SchemaValidation,
    /// 컬렉션(테이블)이 없거나 스키마가 초기화되지 않음
    MissingRelation,
    /// 외래 키(참조 무결성) 위반
    ForeignKeyViolation,
    /// 그 밖의 실패
    Other,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageErrorKind::UniqueViolation => "unique violation",
            StorageErrorKind::SchemaValidation => "schema validation",
            StorageErrorKind::MissingRelation => "missing relation",
            StorageErrorKind::ForeignKeyViolation => "foreign key violation",
            StorageErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// 저장소 실패
///
/// `message`에는 드라이버가 돌려준 원문이 담기며, 운영 로그에만 기록됩니다.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("storage error ({kind}): {message}")]
pub struct StorageError {
    pub kind: StorageErrorKind,
    pub message: String,
}

impl StorageError {
    pub fn new(kind: StorageErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::Other, message)
    }
}

/// 토큰 에러
///
/// 검증 실패는 만료와 위조를 구분하지 않고 `Invalid` 하나로 표현합니다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// ProviderData 코덱 에러
#[derive(Error, Debug)]
pub enum CodecError {
    /// 저장된 텍스트가 해당 프로바이더의 구조와 맞지 않음
    #[error("malformed {provider} provider data: {source}")]
    MalformedData {
        provider: ProviderName,
        #[source]
        source: serde_json::Error,
    },

    #[error("provider data serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// 해싱 협력자 에러
#[derive(Error, Debug, Clone, PartialEq)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

/// 메일 발송 협력자 에러
#[derive(Error, Debug, Clone, PartialEq)]
#[error("email delivery failed: {0}")]
pub struct EmailError(pub String);

/// 시작 시 설정 검증 실패
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {min} bytes in production (got {actual})")]
    WeakJwtSecret { min: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::http::StatusCode;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Email is required".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("identity".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_authentication_error_response() {
        let error = AppError::AuthenticationError("unauthorized".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_internal_error_response() {
        let error = AppError::InternalError("there was a database error".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unexpected_error_keeps_original_failure() {
        let failure = AuthFailure::Storage(StorageError::other("connection reset by peer"));
        let error = AppError::Unexpected(Box::new(failure));

        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // Display는 원래 실패 그대로
        assert!(error.to_string().contains("connection reset by peer"));
        // 공개 메시지에는 원인이 없음
        assert!(!error.public_message().contains("connection reset"));
    }

    #[test]
    fn test_storage_error_display() {
        let error = StorageError::new(StorageErrorKind::UniqueViolation, "E11000");
        assert_eq!(error.to_string(), "storage error (unique violation): E11000");
    }
}
