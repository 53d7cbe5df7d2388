//! 데이터 및 실행 환경 설정 관리 모듈
//!
//! 실행 환경, 비밀번호 해싱 비용, MongoDB 연결 정보를 관리합니다.

use std::env;

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    /// 개발 환경 - 빠른 개발을 위한 설정
    Development,
    /// 테스트 환경 - 자동화된 테스트용 설정
    Test,
    /// 스테이징 환경 - 프로덕션 유사 환경
    Staging,
    /// 프로덕션 환경 - 최고 수준의 보안 및 성능
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        Self::from_str(
            &env::var("ENVIRONMENT")
                .unwrap_or_else(|_| env::var("NODE_ENV").unwrap_or_else(|_| "production".to_string())),
        )
    }

    /// 문자열에서 Environment를 생성합니다.
    ///
    /// 알 수 없는 값인 경우 `Production`을 반환합니다.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }
}

/// 패스워드 해싱 설정
pub struct PasswordConfig;

impl PasswordConfig {
    /// 현재 환경에 맞는 bcrypt cost를 반환합니다.
    ///
    /// `BCRYPT_COST`가 4-15 범위의 값이면 그대로 사용하고,
    /// 그렇지 않으면 환경별 기본값을 사용합니다.
    ///
    /// # Environment Defaults
    ///
    /// - Development/Test: 4 (빠른 처리)
    /// - Staging: 10 (중간 보안)
    /// - Production: 12 (고보안)
    pub fn bcrypt_cost() -> u32 {
        if let Ok(cost_str) = env::var("BCRYPT_COST") {
            if let Ok(cost) = cost_str.parse::<u32>() {
                if (4..=15).contains(&cost) {
                    return cost;
                }
            }
            log::warn!("BCRYPT_COST 값이 올바르지 않습니다: {}. 환경 기본값 사용", cost_str);
        }

        Self::bcrypt_cost_for_env(&Environment::current())
    }

    /// 특정 환경에 대한 bcrypt cost를 반환합니다.
    pub fn bcrypt_cost_for_env(env: &Environment) -> u32 {
        match env {
            Environment::Development => 4,
            Environment::Test => 4,
            Environment::Staging => 10,
            Environment::Production => 12,
        }
    }
}

/// MongoDB 연결 설정
pub struct DatabaseConfig;

impl DatabaseConfig {
    /// MongoDB 연결 URI. 기본값: `mongodb://localhost:27017`
    pub fn mongodb_uri() -> String {
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    /// 사용할 데이터베이스 이름. 기본값: `auth_identity_dev`
    pub fn database_name() -> String {
        env::var("DATABASE_NAME").unwrap_or_else(|_| "auth_identity_dev".to_string())
    }

    /// 모니터링 및 로깅에 표시될 애플리케이션 이름
    pub fn app_name() -> String {
        env::var("DATABASE_APP_NAME").unwrap_or_else(|_| "auth_identity_core".to_string())
    }
}
