//! 인증 아이덴티티 코어 스토리지 초기화 도구
//!
//! 인증 설정을 검증하고, MongoDB에 연결해 `users` 컬렉션의 스키마 검증기와 유니크 인덱스를
//! 적용한 뒤 종료합니다.
//! 배포 전에 한 번 실행하며, 여러 번 실행해도 결과는 같습니다.

use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use auth_identity_core::config::AuthSettings;
use auth_identity_core::db::Database;
use auth_identity_core::repositories::identities::MongoIdentityRepository;

#[tokio::main]
async fn main() {
    load_env_file();
    init_logging();

    info!("🚀 인증 스토리지 초기화 시작...");

    if let Err(e) = AuthSettings::global() {
        error!("❌ 인증 설정 오류: {}", e);
        std::process::exit(1);
    }

    let database = match Database::new().await {
        Ok(database) => database,
        Err(e) => {
            error!("❌ MongoDB 연결 실패: {}", e);
            std::process::exit(1);
        }
    };

    let repository = MongoIdentityRepository::new(&database);
    if let Err(e) = repository.initialize().await {
        error!("❌ 컬렉션 초기화 실패: {}", e);
        std::process::exit(1);
    }

    info!("✅ 인증 스토리지 초기화 완료: {}", database.database_name());
}

/// PROFILE 환경변수에 따라 .env 파일을 로드합니다
///
/// * `prod` → `.env.prod`
/// * `dev` (기본값) → `.env.dev`
/// * 그 외 → `.env`
fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    match profile.as_str() {
        "prod" => {
            if let Err(e) = dotenv::from_filename(".env.prod") {
                eprintln!(".env.prod 파일 로드 실패: {}", e);
            }
        }
        "dev" => {
            if let Err(e) = dotenv::from_filename(".env.dev") {
                eprintln!(".env.dev 파일 로드 실패: {}", e);
            }
        }
        _ => {
            dotenv().ok();
        }
    }
}

/// 로깅 시스템을 초기화합니다
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
}
