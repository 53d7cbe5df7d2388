//! Users Entity Module
//!
//! 사용자 엔티티와 MongoDB 저장 문서를 정의합니다.
//!
//! # 주요 구성 요소
//!
//! - [`user`] - 도메인 `User` (ID + 배포 환경별 추가 필드)
//! - [`user_document`] - `users` 컬렉션 문서 구조 (Auth와 Identity 내장)

pub mod user;
pub mod user_document;

pub use user::User;
pub use user_document::*;
