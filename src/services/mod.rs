//! 비즈니스 로직을 담당하는 서비스 계층 모듈
//!
//! 서비스는 전역 싱글톤이 아니라 생성자로 협력자(`IdentityStore`, `PasswordHasher`,
//! `AuthEmailSender`)를 주입받습니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use auth_identity_core::services::users::IdentityService;
//!
//! let identities = IdentityService::new(Arc::new(MemoryIdentityRepository::new()));
//! let identity = identities.find_identity(&provider_id).await?;
//! ```

pub mod users;
pub mod auth;
