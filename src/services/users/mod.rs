//! 사용자/Identity 관리 서비스 모듈
//!
//! 저장소 게이트웨이, 자격 증명 정리, 추가 회원가입 필드 검증을 담당합니다.
//!
//! # Features
//!
//! - User + 첫 Identity 원자적 생성
//! - 정규화된 ProviderId로 Identity 조회/갱신
//! - 비밀번호 해싱 후 ProviderData 부분 업데이트 병합
//! - 배포별 추가 필드 추출 (비밀번호는 추출기에 노출되지 않음)

pub mod identity_service;
pub mod credential_service;
pub mod signup_fields;

pub use identity_service::IdentityService;
pub use credential_service::CredentialService;
pub use signup_fields::{FieldExtractor, SignupFieldsConfig, SECRET_FIELD};
