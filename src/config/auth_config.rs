//! # Authentication Configuration Module
//!
//! 인증 프로바이더, 세션 토큰, 타이밍 공격 방어, 이메일 링크 등
//! 인증 코어가 사용하는 설정을 관리하는 모듈입니다.
//!
//! ## 지원하는 인증 프로바이더
//!
//! 1. **email**: 이메일/패스워드 인증 (이메일 인증, 비밀번호 재설정 지원)
//! 2. **username**: 사용자명/패스워드 인증
//! 3. **google**, **github**: 로컬 비밀번호가 없는 OAuth 방식
//!
//! ## 환경 변수 설정
//!
//! ```bash
//! export JWT_SECRET="your-super-secret-jwt-key"
//! export JWT_EXPIRATION_HOURS="168"
//! export EMAIL_TOKEN_EXPIRATION_HOURS="24"
//! export TIMING_GUARD_MIN_MS="1000"
//! export TIMING_GUARD_MAX_MS="2000"
//! export CLIENT_URL="http://localhost:3000"
//! export EMAIL_RESEND_COOLDOWN_SECS="60"
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use auth_identity_core::config::{AuthSettings, ProviderName};
//!
//! // 시작 시 한 번 로드된 불변 설정
//! let settings = AuthSettings::global()?;
//!
//! let provider = ProviderName::from_str("email")?;
//! assert!(provider.stores_password());
//! ```

use std::env;
use std::fmt;
use std::time::Duration as StdDuration;

use chrono::Duration;
use once_cell::sync::Lazy;

use crate::config::{Environment, PasswordConfig};
use crate::errors::ConfigError;

/// 프로덕션에서 요구하는 JWT 서명 키 최소 길이 (바이트)
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

const DEVELOPMENT_SECRET: &str = "your-secret-key";

/// 인증 프로바이더 이름
///
/// Identity 키 `(provider_name, provider_user_id)`의 앞부분이며,
/// 저장된 ProviderData를 어떤 형태로 해석할지 결정합니다.
///
/// `serde`를 통해 소문자 문자열(`"email"`, `"github"` 등)로 직렬화되어
/// 데이터베이스에 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    /// 이메일/패스워드 인증
    ///
    /// 이메일 인증 여부와 인증/재설정 메일 발송 시각을 함께 저장합니다.
    Email,

    /// 사용자명/패스워드 인증
    Username,

    /// Google OAuth 2.0 인증 (로컬 비밀번호 없음)
    Google,

    /// GitHub OAuth 인증 (로컬 비밀번호 없음)
    GitHub,
}

impl ProviderName {
    /// 문자열에서 ProviderName을 생성합니다.
    ///
    /// # 인자
    ///
    /// * `s` - 프로바이더 이름 (대소문자 무관)
    ///
    /// # 반환값
    ///
    /// * `Ok(ProviderName)` - 유효한 프로바이더인 경우
    /// * `Err(String)` - 지원하지 않는 프로바이더인 경우
    ///
    /// # 예제
    ///
    /// ```rust,ignore
    /// let provider = ProviderName::from_str("GitHub")?;
    /// assert_eq!(provider, ProviderName::GitHub);
    ///
    /// assert!(ProviderName::from_str("twitter").is_err());
    /// ```
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "email" => Ok(ProviderName::Email),
            "username" => Ok(ProviderName::Username),
            "google" => Ok(ProviderName::Google),
            "github" => Ok(ProviderName::GitHub),
            _ => Err(format!("Unsupported auth provider: {}", s)),
        }
    }

    /// ProviderName을 저장용 문자열로 변환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Email => "email",
            ProviderName::Username => "username",
            ProviderName::Google => "google",
            ProviderName::GitHub => "github",
        }
    }

    /// 이 프로바이더가 로컬 비밀번호 해시를 보관하는지 여부
    pub fn stores_password(&self) -> bool {
        matches!(self, ProviderName::Email | ProviderName::Username)
    }
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT 토큰 설정
///
/// ## 권장 설정값
///
/// - **개발**: 세션 토큰 7일
/// - **프로덕션**: 세션 토큰 24시간 이하
pub struct JwtConfig;

impl JwtConfig {
    /// JWT 서명에 사용할 비밀키를 반환합니다.
    ///
    /// 최소 256비트 길이의 랜덤 값을 사용해야 합니다.
    ///
    /// ```bash
    /// openssl rand -base64 32
    /// ```
    ///
    /// # Errors
    ///
    /// 프로덕션 환경에서 `JWT_SECRET`이 없거나 [`MIN_PRODUCTION_SECRET_LEN`]보다 짧으면
    /// `ConfigError`를 반환합니다.
    pub fn secret() -> Result<String, ConfigError> {
        Self::resolve_secret(env::var("JWT_SECRET").ok(), &Environment::current())
    }

    /// 환경 변수 값과 실행 환경으로 서명 키를 결정합니다.
    ///
    /// 프로덕션이 아니면 값이 없을 때 개발용 기본값을 쓰고 경고 로그를 남깁니다.
    pub fn resolve_secret(raw: Option<String>, environment: &Environment) -> Result<String, ConfigError> {
        match (raw, environment) {
            (None, Environment::Production) => Err(ConfigError::MissingJwtSecret),
            (Some(secret), Environment::Production) if secret.len() < MIN_PRODUCTION_SECRET_LEN => {
                Err(ConfigError::WeakJwtSecret {
                    min: MIN_PRODUCTION_SECRET_LEN,
                    actual: secret.len(),
                })
            }
            (Some(secret), _) => Ok(secret),
            (None, _) => {
                log::warn!("JWT_SECRET not set, using default (not secure for production!)");
                Ok(DEVELOPMENT_SECRET.to_string())
            }
        }
    }

    /// 세션 토큰 만료 시간 (시간 단위). 기본값: 168시간 (1주일)
    pub fn expiration_hours() -> i64 {
        env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse()
            .unwrap_or(168)
    }

    /// 이메일 인증/비밀번호 재설정 토큰 만료 시간 (시간 단위). 기본값: 24시간
    pub fn email_token_expiration_hours() -> i64 {
        env::var("EMAIL_TOKEN_EXPIRATION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .unwrap_or(24)
    }
}

/// 타이밍 공격 방어 설정
///
/// 존재 여부를 드러내면 안 되는 경로에서 주입할 지연 시간의 범위입니다.
pub struct TimingGuardConfig;

impl TimingGuardConfig {
    /// 최소 지연 (밀리초). 기본값: 1000
    pub fn min_delay_ms() -> u64 {
        env::var("TIMING_GUARD_MIN_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000)
    }

    /// 최대 지연 (밀리초). 기본값: 2000
    pub fn max_delay_ms() -> u64 {
        env::var("TIMING_GUARD_MAX_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .unwrap_or(2000)
    }
}

/// 이메일 링크 설정
///
/// 인증/재설정 메일에 들어갈 클라이언트 URL과 경로를 관리합니다.
pub struct EmailLinkConfig;

impl EmailLinkConfig {
    /// 클라이언트(프론트엔드) 기본 URL. 기본값: `http://localhost:3000`
    pub fn client_url() -> String {
        env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
    }

    /// 이메일 인증 페이지 경로. 기본값: `/email-verification`
    pub fn email_verification_path() -> String {
        env::var("EMAIL_VERIFICATION_PATH").unwrap_or_else(|_| "/email-verification".to_string())
    }

    /// 비밀번호 재설정 페이지 경로. 기본값: `/password-reset`
    pub fn password_reset_path() -> String {
        env::var("PASSWORD_RESET_PATH").unwrap_or_else(|_| "/password-reset".to_string())
    }

    /// 같은 종류의 메일을 다시 보낼 수 있을 때까지의 대기 시간 (초). 기본값: 60
    pub fn resend_cooldown_secs() -> i64 {
        env::var("EMAIL_RESEND_COOLDOWN_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60)
    }
}

/// 인증 코어 설정 스냅샷
///
/// 시작 시 한 번 구성되어 이후 변경되지 않으며, 서비스 생성 시
/// 참조로 전달됩니다.
#[derive(Clone)]
pub struct AuthSettings {
    /// JWT HMAC 서명 키
    pub jwt_secret: String,
    /// 세션 토큰 수명
    pub session_lifetime: Duration,
    /// 이메일 인증/재설정 토큰 수명
    pub email_token_lifetime: Duration,
    /// bcrypt cost
    pub bcrypt_cost: u32,
    /// 타이밍 가드 최소 지연
    pub timing_guard_min: StdDuration,
    /// 타이밍 가드 최대 지연
    pub timing_guard_max: StdDuration,
    /// 클라이언트 기본 URL
    pub client_url: String,
    /// 이메일 인증 페이지 경로
    pub email_verification_path: String,
    /// 비밀번호 재설정 페이지 경로
    pub password_reset_path: String,
    /// 메일 재발송 대기 시간
    pub email_resend_cooldown: Duration,
}

static SETTINGS: Lazy<Result<AuthSettings, ConfigError>> = Lazy::new(AuthSettings::from_env);

impl AuthSettings {
    /// 환경 변수에서 설정을 읽어 스냅샷을 만듭니다.
    ///
    /// 프로덕션에서 서명 키가 없거나 약하면 실패합니다.
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            jwt_secret: JwtConfig::secret()?,
            session_lifetime: Duration::hours(JwtConfig::expiration_hours()),
            email_token_lifetime: Duration::hours(JwtConfig::email_token_expiration_hours()),
            bcrypt_cost: PasswordConfig::bcrypt_cost(),
            timing_guard_min: StdDuration::from_millis(TimingGuardConfig::min_delay_ms()),
            timing_guard_max: StdDuration::from_millis(TimingGuardConfig::max_delay_ms()),
            client_url: EmailLinkConfig::client_url(),
            email_verification_path: EmailLinkConfig::email_verification_path(),
            password_reset_path: EmailLinkConfig::password_reset_path(),
            email_resend_cooldown: Duration::seconds(EmailLinkConfig::resend_cooldown_secs()),
        };

        log::info!("인증 설정 로드됨: {:?}", settings);
        Ok(settings)
    }

    /// 프로세스 전역 설정 스냅샷을 반환합니다.
    ///
    /// 첫 호출 시 환경 변수에서 로드되며 이후에는 같은 결과를 반환합니다.
    pub fn global() -> Result<&'static AuthSettings, ConfigError> {
        SETTINGS.as_ref().map_err(Clone::clone)
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEVELOPMENT_SECRET.to_string(),
            session_lifetime: Duration::hours(168),
            email_token_lifetime: Duration::hours(24),
            bcrypt_cost: PasswordConfig::bcrypt_cost_for_env(&crate::config::Environment::Test),
            timing_guard_min: StdDuration::from_millis(1000),
            timing_guard_max: StdDuration::from_millis(2000),
            client_url: "http://localhost:3000".to_string(),
            email_verification_path: "/email-verification".to_string(),
            password_reset_path: "/password-reset".to_string(),
            email_resend_cooldown: Duration::seconds(60),
        }
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"***")
            .field("session_lifetime", &self.session_lifetime)
            .field("email_token_lifetime", &self.email_token_lifetime)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("timing_guard_min", &self.timing_guard_min)
            .field("timing_guard_max", &self.timing_guard_max)
            .field("client_url", &self.client_url)
            .field("email_verification_path", &self.email_verification_path)
            .field("password_reset_path", &self.password_reset_path)
            .field("email_resend_cooldown", &self.email_resend_cooldown)
            .finish()
    }
}
