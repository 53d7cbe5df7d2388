//! # Domain Entities Module
//!
//! 식별자를 가진 도메인 엔티티를 정의합니다.
//!
//! ```text
//! entities/
//! ├── users/   - User, MongoDB 사용자 문서
//! └── auth/    - Auth, AuthIdentity, AuthWithUser, AuthFilter
//! ```
//!
//! Identity의 `provider_data`는 직렬화된 텍스트 그대로 보관되며,
//! 해석은 [`models::provider`](crate::domain::models::provider)의 코덱이 담당합니다.

pub mod users;
pub mod auth;

pub use users::*;
pub use auth::*;
