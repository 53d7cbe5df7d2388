//! # Domain Layer Module
//!
//! 인증 코어의 도메인 타입을 정의합니다.
//!
//! ```text
//! Domain Layer (이 모듈)
//! ├── Entities  - User, Auth, AuthIdentity, 저장 문서
//! └── Models    - ProviderId, ProviderData, 토큰 클레임
//!      │
//!      ▼
//! Services (credential, identity, token, auth flows)
//!      │
//!      ▼
//! Repositories (IdentityStore: MongoDB / in-memory)
//! ```
//!
//! ## 핵심 불변식
//!
//! - `ProviderId.provider_user_id`는 비교, 조회, 저장 전에 항상 소문자로 정규화됩니다.
//! - 저장된 비밀번호 슬롯에는 해싱 협력자의 출력만 들어갑니다.
//!   `ProviderData<RawPassword>`는 직렬화할 수 없으므로 평문이 저장 형식으로 흘러갈 수 없습니다.

pub mod entities;
pub mod models;

pub use entities::*;
pub use models::*;
