//! 인증 및 보안 서비스 모듈
//!
//! 비밀번호 해싱, HS256 토큰 발급/검증, 응답 시간 평탄화, 인증 메일 링크 생성과
//! 이들을 조합한 인증 플로우를 제공합니다.
//!
//! # Security
//!
//! - bcrypt 비밀번호 해싱 (평문은 `RawPassword`로만 다룸)
//! - HMAC-SHA256 토큰 서명, 만료 여유 시간 없음
//! - 이메일 토큰 용도 구분 (인증 토큰으로 비밀번호 재설정 불가)
//! - 사용자 열거 방지용 랜덤 지연
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_identity_core::services::auth::{AuthService, BcryptPasswordHasher, LoggingEmailSender};
//!
//! let service = AuthService::new(
//!     AuthSettings::global()?,
//!     Arc::new(MongoIdentityRepository::new(&database)),
//!     Arc::new(BcryptPasswordHasher::new(settings.bcrypt_cost)),
//!     Arc::new(LoggingEmailSender),
//!     Arc::new(SignupFieldsConfig::new()),
//! );
//! let session = service.login_with_email("ann@example.com", &RawPassword::new("pw")).await?;
//! ```

pub mod password_service;
pub mod token_service;
pub mod timing_guard;
pub mod email_sender;
pub mod auth_service;

pub use password_service::*;
pub use token_service::*;
pub use timing_guard::*;
pub use email_sender::*;
pub use auth_service::*;
