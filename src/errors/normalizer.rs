//! 내부 실패 → 공개 에러 변환
//!
//! 규칙은 위에서부터 순서대로 검사하며, 처음 일치하는 규칙이 적용됩니다.
//!
//! | 순서 | 내부 실패 | 공개 에러 |
//! |------|-----------|-----------|
//! | 1 | `AuthError` | `ValidationError` (메시지 그대로) |
//! | 2 | 저장소 유니크 위반 | `ValidationError` ("user with the same identity already exists") |
//! | 3 | 저장소 스키마 검증 실패 | `InternalError` ("there was a database error") |
//! | 4 | 저장소 컬렉션 없음 | `InternalError` + 마이그레이션 힌트 로그 |
//! | 5 | 저장소 외래 키 위반 | `InternalError` + cascade 설정 힌트 로그 |
//! | 6 | `TokenError::Invalid` | `AuthenticationError` ("unauthorized") |
//! | 7 | 로그인 자격 증명 불일치 | `AuthenticationError` ("invalid credentials") |
//! | 8 | Identity 없음 | `NotFound` |
//! | - | 그 밖의 모든 실패 | 변환하지 않고 그대로 돌려줌 |
//!
//! 공개 메시지에는 어떤 필드가 충돌했는지, 어떤 저장소 세부사항이 원인인지가
//! 들어가지 않습니다. 원인은 운영 로그에만 남습니다.

use log::{error, info};

use crate::errors::{AppError, AuthFailure, StorageErrorKind, TokenError};

pub const IDENTITY_EXISTS_MESSAGE: &str = "user with the same identity already exists";
pub const DATABASE_ERROR_MESSAGE: &str = "there was a database error";
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "invalid credentials";

/// 내부 실패를 공개 에러로 변환합니다.
///
/// # 반환값
///
/// * `Ok(AppError)` - 규칙에 일치한 경우의 공개 에러
/// * `Err(AuthFailure)` - 어떤 규칙에도 맞지 않아 원래 실패를 그대로 돌려준 경우
pub fn normalize(failure: AuthFailure) -> Result<AppError, AuthFailure> {
    match failure {
        AuthFailure::Auth(e) => Ok(AppError::ValidationError(e.to_string())),

        AuthFailure::Storage(e) if e.kind == StorageErrorKind::UniqueViolation => {
            Ok(AppError::ValidationError(IDENTITY_EXISTS_MESSAGE.to_string()))
        }

        AuthFailure::Storage(e) if e.kind == StorageErrorKind::SchemaValidation => {
            // 요청에 필수 필드가 빠진 경우가 대부분이므로 개발자가 알 수 있게 기록
            error!("❌ {}", e);
            Ok(AppError::InternalError(DATABASE_ERROR_MESSAGE.to_string()))
        }

        AuthFailure::Storage(e) if e.kind == StorageErrorKind::MissingRelation => {
            error!("❌ {}", e);
            info!("🐝 This error can happen if the database migrations were not applied (run the auth_identity_core binary to create the collection and indexes).");
            Ok(AppError::InternalError(DATABASE_ERROR_MESSAGE.to_string()))
        }

        AuthFailure::Storage(e) if e.kind == StorageErrorKind::ForeignKeyViolation => {
            error!("❌ {}", e);
            info!("🐝 This error can happen if some relation on the user entity does not specify an on-delete behaviour of either \"Cascade\" or \"SetNull\".");
            Ok(AppError::InternalError(DATABASE_ERROR_MESSAGE.to_string()))
        }

        AuthFailure::Token(TokenError::Invalid) => {
            Ok(AppError::AuthenticationError(UNAUTHORIZED_MESSAGE.to_string()))
        }

        AuthFailure::InvalidCredentials => {
            Ok(AppError::AuthenticationError(INVALID_CREDENTIALS_MESSAGE.to_string()))
        }

        AuthFailure::NotFound(what) => Ok(AppError::NotFound(what)),

        other => Err(other),
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        normalize(failure).unwrap_or_else(|unhandled| {
            error!("❌ Unhandled auth failure: {}", unhandled);
            AppError::Unexpected(Box::new(unhandled))
        })
    }
}
