//! # Domain Models
//!
//! 저장 형식과 독립적인 값 타입들을 모아 둔 모듈입니다.
//!
//! ```text
//! models/
//! ├── provider/   - ProviderId, ProviderData, 비밀번호 newtype, 코덱
//! └── token/      - 세션/이메일 토큰 클레임
//! ```
//!
//! 엔티티(`entities`)와 달리 이 모듈의 타입들은 식별자를 갖지 않으며,
//! 값이 같으면 같은 것으로 취급합니다.

pub mod provider;
pub mod token;

pub use provider::*;
pub use token::*;
