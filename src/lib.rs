//! 인증 아이덴티티 코어
//!
//! 이메일/비밀번호, 사용자명/비밀번호, 외부(OAuth) 프로바이더 로그인을 하나의
//! User + Identity 모델로 다루는 인증 코어입니다. HTTP 계층은 포함하지 않으며,
//! 공개 에러는 `actix_web::ResponseError`를 구현하므로 웹 계층에 그대로 연결할 수 있습니다.
//!
//! # Features
//!
//! - **Provider Data Codec**: 프로바이더별 데이터의 엄격한 JSON 직렬화/역직렬화
//! - **Credential Sanitizer**: 평문 비밀번호를 한 번만 해싱하는 타입 수준 보장
//! - **Token Issuer/Verifier**: HS256 세션/이메일 토큰
//! - **Identity Store Gateway**: MongoDB(또는 메모리) 저장소와 실패 분류
//! - **Error Normalizer**: 내부 실패를 안전한 공개 에러로 변환
//! - **Timing-Attack Guard**: 열거 방지용 랜덤 지연
//! - **Signup Field Validator**: 배포별 추가 회원가입 필드
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AuthService   │ ← 인증 플로우
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← 자격 증명, 토큰, Identity 게이트웨이
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← IdentityStore 구현
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     MongoDB     │ ← users 컬렉션
//! └─────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod domain;
pub mod repositories;
pub mod services;
pub mod errors;
