//! # Configuration Module
//!
//! 인증 코어의 설정 관리를 담당하는 모듈입니다.
//! 환경 변수 기반의 설정값들을 관심사별로 묶어 제공하고,
//! 서비스에는 시작 시 한 번 구성된 불변 스냅샷([`AuthSettings`])을 전달합니다.
//!
//! ## 모듈 구성
//!
//! - [`data_config`] - 실행 환경, bcrypt cost, MongoDB 연결 설정
//! - [`auth_config`] - 프로바이더, JWT, 타이밍 가드, 이메일 링크 설정
//!
//! ## 환경 변수 설정 가이드
//!
//! ```bash
//! # 환경 설정
//! export ENVIRONMENT="production"  # development, test, staging, production
//!
//! # 데이터베이스
//! export MONGODB_URI="mongodb://localhost:27017"
//! export DATABASE_NAME="auth_identity"
//!
//! # 보안 설정
//! export BCRYPT_COST="12"          # 4-15 범위
//! export JWT_SECRET="your-super-secret-key"
//! ```

pub mod data_config;
pub mod auth_config;

pub use data_config::*;
pub use auth_config::*;
