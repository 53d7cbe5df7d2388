//! JWT 클레임 구조체
//!
//! 세션 토큰과 이메일 용도 토큰(인증/재설정)의 페이로드를 정의합니다.
//! 두 토큰은 클레임 구조가 달라 서로 대신 사용할 수 없습니다.
use serde::{Deserialize, Serialize};

/// 세션 토큰 클레임
///
/// 서버 측 세션 기록 없이 사용자 식별자와 만료 시각만 담습니다.
///
/// - `sub`: 사용자 ID
/// - `iat`: 발급 시각 (Unix timestamp)
/// - `exp`: 만료 시각 (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// 이메일 토큰의 용도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTokenPurpose {
    EmailVerification,
    PasswordReset,
}

/// 이메일 인증/비밀번호 재설정 링크에 들어가는 토큰 클레임
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailTokenClaims {
    /// 정규화된(소문자) 이메일 주소
    pub email: String,
    pub purpose: EmailTokenPurpose,
    pub iat: i64,
    pub exp: i64,
}
