//! # 인증 플로우 서비스
//!
//! 코어 구성 요소(코덱, 자격 증명 정리, 토큰, Identity 게이트웨이, 타이밍 가드,
//! 회원가입 필드 검증)를 조합해 사용자 인증 흐름을 제공합니다.
//!
//! ```text
//! ┌──────────────────────────── AuthService ────────────────────────────┐
//! │ signup_with_email / signup_with_username / sign_in_with_external    │
//! │ login_with_email / login_with_username                              │
//! │ resend_verification_email / verify_email                            │
//! │ request_password_reset / reset_password                             │
//! │ current_user / delete_account                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//!        │               │               │              │
//!        ▼               ▼               ▼              ▼
//!  SignupFields   CredentialService  TokenService  IdentityService ── IdentityStore
//! ```
//!
//! 모든 공개 메서드는 `AppResult`를 반환합니다. 내부 실패는
//! [`normalize`](crate::errors::normalize) 규칙을 거쳐 공개 에러가 됩니다.
//!
//! ## 사용자 열거 방지
//!
//! - 로그인 실패는 원인(없는 계정, 틀린 비밀번호, 미인증 이메일)과 관계없이
//!   "invalid credentials" 하나로 응답합니다.
//! - 비밀번호 재설정 요청은 주소가 없거나 미인증이거나 재발송 대기 중이어도 성공으로 응답하며,
//!   이때는 [`TimingGuard`]로 응답 시간을 흐립니다. 인증 메일 재발송 요청도 같습니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use validator::ValidateEmail;

use crate::config::{AuthSettings, ProviderName};
use crate::domain::entities::{AuthFilter, AuthWithUser, User};
use crate::domain::models::provider::{
    serialize_provider_data, DeserializeOptions, EmailProviderData, EmailProviderDataUpdate, ProviderData,
    ProviderDataUpdate, ProviderId, RawPassword, UsernameProviderData,
};
use crate::domain::models::token::EmailTokenPurpose;
use crate::errors::{AppResult, AuthError, AuthFailure, TokenError};
use crate::repositories::identities::IdentityStore;
use crate::services::auth::{
    build_email_link, AuthEmailSender, PasswordHasher, TimingGuard, TokenService,
};
use crate::services::users::{CredentialService, IdentityService, SignupFieldsConfig};

/// 로그인 성공 결과
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

pub struct AuthService {
    identities: IdentityService,
    credentials: CredentialService,
    tokens: TokenService,
    timing_guard: TimingGuard,
    mailer: Arc<dyn AuthEmailSender>,
    signup_fields: Arc<SignupFieldsConfig>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        settings: &AuthSettings,
        store: Arc<dyn IdentityStore>,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn AuthEmailSender>,
        signup_fields: Arc<SignupFieldsConfig>,
    ) -> Self {
        let identities = IdentityService::new(store);

        Self {
            credentials: CredentialService::new(hasher, identities.clone()),
            identities,
            tokens: TokenService::from_settings(settings),
            timing_guard: TimingGuard::from_settings(settings),
            mailer,
            signup_fields,
            settings: settings.clone(),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// 이메일/비밀번호 회원가입
    ///
    /// 입력: `{ "email": ..., "password": ..., <추가 필드>... }`
    ///
    /// 같은 주소(대소문자 무관)로 이미 가입되어 있으면
    /// "user with the same identity already exists" 검증 에러가 됩니다.
    /// 가입 후 이메일 인증 링크를 보냅니다. 발송에 실패하면 방금 만든 사용자를 삭제하고
    /// 실패를 돌려주므로 같은 주소로 다시 가입할 수 있습니다.
    pub async fn signup_with_email(&self, input: &Map<String, Value>) -> AppResult<User> {
        Ok(self.try_signup_with_email(input).await?)
    }

    async fn try_signup_with_email(&self, input: &Map<String, Value>) -> Result<User, AuthFailure> {
        let email = required_string(input, "email")?;
        ensure_valid_email(&email)?;
        let password = required_password(input)?;
        let user_fields = self.signup_fields.validate(input)?;

        let provider_id = ProviderId::new(ProviderName::Email, &email);
        let now = Utc::now();

        let data = self.credentials.sanitize(ProviderData::Email(EmailProviderData {
            email_verification_sent_at: Some(now),
            ..EmailProviderData::new(password)
        }))?;

        let user = self
            .identities
            .create_user(&provider_id, serialize_provider_data(&data)?, user_fields)
            .await?;

        if let Err(e) = self.send_verification_email(provider_id.provider_user_id()).await {
            self.discard_new_user(&user).await;
            return Err(e);
        }
        Ok(user)
    }

    async fn discard_new_user(&self, user: &User) {
        let removed = match self
            .identities
            .find_auth_with_user(&AuthFilter::UserId(user.id.clone()))
            .await
        {
            Ok(joined) => self.identities.delete_user_by_auth_id(&joined.auth.id).await,
            Err(e) => Err(e),
        };

        match removed {
            Ok(_) => warn!("⚠️ 인증 메일 발송 실패로 가입 취소: user_id={}", user.id),
            Err(e) => error!("❌ 가입 취소 실패: user_id={} ({})", user.id, e),
        }
    }

    /// 인증 메일 재발송
    ///
    /// 주소가 없거나, 이미 인증되었거나, 재발송 대기 시간 안이면 메일을 보내지 않고
    /// 타이밍 가드만 거친 뒤 성공으로 응답합니다.
    pub async fn resend_verification_email(&self, email: &str) -> AppResult<()> {
        Ok(self.try_resend_verification_email(email).await?)
    }

    async fn try_resend_verification_email(&self, email: &str) -> Result<(), AuthFailure> {
        ensure_valid_email(email)?;
        let provider_id = ProviderId::new(ProviderName::Email, email);

        let identity = match self.identities.find_identity(&provider_id).await {
            Ok(identity) => identity,
            Err(AuthFailure::NotFound(_)) => {
                self.timing_guard.guard().await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let data = identity.decode_provider_data(DeserializeOptions::default())?;
        let ProviderData::Email(email_data) = &data else {
            self.timing_guard.guard().await;
            return Ok(());
        };

        let now = Utc::now();
        if email_data.is_email_verified || !self.resend_allowed(email_data.email_verification_sent_at, now) {
            self.timing_guard.guard().await;
            return Ok(());
        }

        self.credentials
            .update_provider_data(
                &provider_id,
                data,
                ProviderDataUpdate::Email(EmailProviderDataUpdate {
                    email_verification_sent_at: Some(Some(now)),
                    ..Default::default()
                }),
            )
            .await?;

        self.send_verification_email(provider_id.provider_user_id()).await
    }

    /// 사용자명/비밀번호 회원가입
    ///
    /// 입력: `{ "username": ..., "password": ..., <추가 필드>... }`
    pub async fn signup_with_username(&self, input: &Map<String, Value>) -> AppResult<User> {
        Ok(self.try_signup_with_username(input).await?)
    }

    async fn try_signup_with_username(&self, input: &Map<String, Value>) -> Result<User, AuthFailure> {
        let username = required_string(input, "username")?;
        let password = required_password(input)?;
        let user_fields = self.signup_fields.validate(input)?;

        let provider_id = ProviderId::new(ProviderName::Username, &username);
        let data = self
            .credentials
            .sanitize(ProviderData::Username(UsernameProviderData::new(password)))?;

        Ok(self
            .identities
            .create_user(&provider_id, serialize_provider_data(&data)?, user_fields)
            .await?)
    }

    /// 외부(OAuth 계열) 프로바이더로 인증된 사용자의 로그인
    ///
    /// Identity가 없으면 추가 필드를 검증해 새 사용자를 만듭니다.
    /// 외부 프로바이더와의 토큰 교환은 호출자가 끝낸 상태여야 합니다.
    pub async fn sign_in_with_external(
        &self,
        provider_name: ProviderName,
        provider_user_id: &str,
        input: &Map<String, Value>,
    ) -> AppResult<AuthSession> {
        Ok(self
            .try_sign_in_with_external(provider_name, provider_user_id, input)
            .await?)
    }

    async fn try_sign_in_with_external(
        &self,
        provider_name: ProviderName,
        provider_user_id: &str,
        input: &Map<String, Value>,
    ) -> Result<AuthSession, AuthFailure> {
        let Some(data) = ProviderData::oauth(provider_name) else {
            return Err(AuthError::Validation(format!("{} is not an external provider", provider_name)).into());
        };
        let provider_id = ProviderId::new(provider_name, provider_user_id);

        let user = match self.identities.find_identity(&provider_id).await {
            Ok(identity) => {
                self.identities
                    .find_auth_with_user(&AuthFilter::AuthId(identity.auth_id))
                    .await?
                    .user
            }
            Err(AuthFailure::NotFound(_)) => {
                let user_fields = self.signup_fields.validate(input)?;
                self.identities
                    .create_user(&provider_id, serialize_provider_data(&data)?, user_fields)
                    .await?
            }
            Err(e) => return Err(e),
        };

        let token = self.tokens.issue_session_token(&user.id)?;
        Ok(AuthSession { token, user })
    }

    /// 이메일/비밀번호 로그인. 인증되지 않은 이메일은 로그인할 수 없습니다.
    pub async fn login_with_email(&self, email: &str, password: &RawPassword) -> AppResult<AuthSession> {
        Ok(self
            .try_login(ProviderId::new(ProviderName::Email, email), password)
            .await?)
    }

    pub async fn login_with_username(&self, username: &str, password: &RawPassword) -> AppResult<AuthSession> {
        Ok(self
            .try_login(ProviderId::new(ProviderName::Username, username), password)
            .await?)
    }

    async fn try_login(&self, provider_id: ProviderId, password: &RawPassword) -> Result<AuthSession, AuthFailure> {
        let identity = match self.identities.find_identity(&provider_id).await {
            Ok(identity) => identity,
            Err(AuthFailure::NotFound(_)) => return Err(AuthFailure::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let data = identity.decode_provider_data(DeserializeOptions::default())?;
        if !self.credentials.verify_password(&data, password)? {
            debug!("로그인 실패: 비밀번호 불일치 ({})", provider_id.provider_name());
            return Err(AuthFailure::InvalidCredentials);
        }

        if let ProviderData::Email(email) = &data {
            if !email.is_email_verified {
                debug!("로그인 실패: 미인증 이메일");
                return Err(AuthFailure::InvalidCredentials);
            }
        }

        let AuthWithUser { user, .. } = self
            .identities
            .find_auth_with_user(&AuthFilter::AuthId(identity.auth_id))
            .await?;

        let token = self.tokens.issue_session_token(&user.id)?;
        info!("🔓 로그인 성공: user_id={}", user.id);

        Ok(AuthSession { token, user })
    }

    /// 비밀번호 재설정 메일 요청
    ///
    /// 주소가 없거나, 인증되지 않았거나, 재발송 대기 시간 안이면 메일을 보내지 않고
    /// 타이밍 가드만 거친 뒤 성공으로 응답합니다.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        Ok(self.try_request_password_reset(email).await?)
    }

    async fn try_request_password_reset(&self, email: &str) -> Result<(), AuthFailure> {
        ensure_valid_email(email)?;
        let provider_id = ProviderId::new(ProviderName::Email, email);

        let identity = match self.identities.find_identity(&provider_id).await {
            Ok(identity) => identity,
            Err(AuthFailure::NotFound(_)) => {
                self.timing_guard.guard().await;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let data = identity.decode_provider_data(DeserializeOptions::default())?;
        let ProviderData::Email(email_data) = &data else {
            self.timing_guard.guard().await;
            return Ok(());
        };

        let now = Utc::now();
        if !email_data.is_email_verified || !self.resend_allowed(email_data.password_reset_sent_at, now) {
            self.timing_guard.guard().await;
            return Ok(());
        }

        let token = self
            .tokens
            .issue_email_token(provider_id.provider_user_id(), EmailTokenPurpose::PasswordReset)?;

        self.credentials
            .update_provider_data(
                &provider_id,
                data,
                ProviderDataUpdate::Email(EmailProviderDataUpdate {
                    password_reset_sent_at: Some(Some(now)),
                    ..Default::default()
                }),
            )
            .await?;

        let link = build_email_link(&self.settings.client_url, &self.settings.password_reset_path, &token);
        self.mailer
            .send_password_reset(provider_id.provider_user_id(), &link)
            .await?;

        Ok(())
    }

    /// 재설정 토큰으로 새 비밀번호를 설정합니다.
    pub async fn reset_password(&self, token: &str, new_password: RawPassword) -> AppResult<()> {
        Ok(self.try_reset_password(token, new_password).await?)
    }

    async fn try_reset_password(&self, token: &str, new_password: RawPassword) -> Result<(), AuthFailure> {
        if new_password.is_empty() {
            return Err(AuthError::Validation("password must be present".to_string()).into());
        }

        let claims = self
            .tokens
            .verify_email_token(token, EmailTokenPurpose::PasswordReset)?;
        let provider_id = ProviderId::new(ProviderName::Email, &claims.email);

        let identity = self.identities.find_identity(&provider_id).await?;
        let existing = identity.decode_provider_data(DeserializeOptions::default())?;

        self.credentials
            .update_provider_data(
                &provider_id,
                existing,
                ProviderDataUpdate::Email(EmailProviderDataUpdate {
                    password: Some(new_password),
                    ..Default::default()
                }),
            )
            .await?;

        info!("🔑 비밀번호 재설정 완료");
        Ok(())
    }

    /// 인증 토큰으로 이메일을 인증 상태로 바꿉니다.
    pub async fn verify_email(&self, token: &str) -> AppResult<()> {
        Ok(self.try_verify_email(token).await?)
    }

    async fn try_verify_email(&self, token: &str) -> Result<(), AuthFailure> {
        let claims = self
            .tokens
            .verify_email_token(token, EmailTokenPurpose::EmailVerification)?;
        let provider_id = ProviderId::new(ProviderName::Email, &claims.email);

        let identity = self.identities.find_identity(&provider_id).await?;
        let existing = identity.decode_provider_data(DeserializeOptions::default())?;

        self.credentials
            .update_provider_data(
                &provider_id,
                existing,
                ProviderDataUpdate::Email(EmailProviderDataUpdate {
                    is_email_verified: Some(true),
                    ..Default::default()
                }),
            )
            .await?;

        info!("✅ 이메일 인증 완료");
        Ok(())
    }

    /// 세션 토큰의 소유자를 조회합니다.
    ///
    /// 토큰이 유효해도 사용자가 삭제되었으면 인증 실패입니다.
    pub async fn current_user(&self, session_token: &str) -> AppResult<AuthWithUser> {
        Ok(self.try_current_user(session_token).await?)
    }

    async fn try_current_user(&self, session_token: &str) -> Result<AuthWithUser, AuthFailure> {
        let claims = self.tokens.verify_session_token(session_token)?;

        match self
            .identities
            .find_auth_with_user(&AuthFilter::UserId(claims.sub))
            .await
        {
            Err(AuthFailure::NotFound(_)) => Err(TokenError::Invalid.into()),
            other => other,
        }
    }

    /// 사용자 집합체를 삭제합니다. 삭제된 것이 없으면 `NotFound`입니다.
    pub async fn delete_account(&self, auth_id: &str) -> AppResult<()> {
        Ok(self.try_delete_account(auth_id).await?)
    }

    async fn try_delete_account(&self, auth_id: &str) -> Result<(), AuthFailure> {
        match self.identities.delete_user_by_auth_id(auth_id).await? {
            0 => Err(AuthFailure::NotFound("user".to_string())),
            _ => Ok(()),
        }
    }

    async fn send_verification_email(&self, email: &str) -> Result<(), AuthFailure> {
        let token = self
            .tokens
            .issue_email_token(email, EmailTokenPurpose::EmailVerification)?;
        let link = build_email_link(
            &self.settings.client_url,
            &self.settings.email_verification_path,
            &token,
        );

        self.mailer.send_email_verification(email, &link).await?;
        Ok(())
    }

    fn resend_allowed(&self, last_sent_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_sent_at {
            Some(sent_at) => now - sent_at >= self.settings.email_resend_cooldown,
            None => true,
        }
    }
}

fn required_string(input: &Map<String, Value>, field: &str) -> Result<String, AuthError> {
    match input.get(field) {
        Some(Value::String(value)) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AuthError::Validation(format!("{} must be present", field))),
    }
}

fn required_password(input: &Map<String, Value>) -> Result<RawPassword, AuthError> {
    match input.get("password") {
        Some(Value::String(value)) if !value.is_empty() => Ok(RawPassword::new(value.as_str())),
        _ => Err(AuthError::Validation("password must be present".to_string())),
    }
}

fn ensure_valid_email(email: &str) -> Result<(), AuthError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(AuthError::Validation("email must be a valid email".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::normalizer::{IDENTITY_EXISTS_MESSAGE, INVALID_CREDENTIALS_MESSAGE};
    use crate::errors::{AppError, EmailError};
    use crate::repositories::identities::MemoryIdentityRepository;
    use crate::services::auth::BcryptPasswordHasher;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingEmailSender {
        sent: Mutex<Vec<(String, String, String)>>,
        down: AtomicBool,
    }

    impl RecordingEmailSender {
        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check_up(&self) -> Result<(), EmailError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(EmailError("smtp down".to_string()));
            }
            Ok(())
        }

        fn last_token(&self, kind: &str) -> Option<String> {
            let sent = self.sent.lock().unwrap();
            sent.iter()
                .rev()
                .find(|(k, _, _)| k == kind)
                .and_then(|(_, _, link)| link.split("token=").nth(1))
                .map(|token| urlencoding::decode(token).unwrap().into_owned())
        }

        fn count(&self, kind: &str) -> usize {
            self.sent.lock().unwrap().iter().filter(|(k, _, _)| k == kind).count()
        }
    }

    #[async_trait]
    impl AuthEmailSender for RecordingEmailSender {
        async fn send_email_verification(&self, email: &str, link: &str) -> Result<(), EmailError> {
            self.check_up()?;
            self.sent
                .lock()
                .unwrap()
                .push(("verify".to_string(), email.to_string(), link.to_string()));
            Ok(())
        }

        async fn send_password_reset(&self, email: &str, link: &str) -> Result<(), EmailError> {
            self.check_up()?;
            self.sent
                .lock()
                .unwrap()
                .push(("reset".to_string(), email.to_string(), link.to_string()));
            Ok(())
        }
    }

    struct Fixture {
        service: AuthService,
        store: Arc<MemoryIdentityRepository>,
        mailer: Arc<RecordingEmailSender>,
    }

    fn fixture_with(settings: AuthSettings, signup_fields: SignupFieldsConfig) -> Fixture {
        let _ = env_logger::builder().is_test(true).try_init();

        let store = Arc::new(MemoryIdentityRepository::new());
        let mailer = Arc::new(RecordingEmailSender::default());
        let service = AuthService::new(
            &settings,
            store.clone(),
            Arc::new(BcryptPasswordHasher::new(settings.bcrypt_cost)),
            mailer.clone(),
            Arc::new(signup_fields),
        );

        Fixture { service, store, mailer }
    }

    fn fixture() -> Fixture {
        fixture_with(AuthSettings::default(), SignupFieldsConfig::new())
    }

    fn input(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    async fn signup_verified(fixture: &Fixture, email: &str, password: &str) -> User {
        let user = fixture
            .service
            .signup_with_email(&input(json!({ "email": email, "password": password })))
            .await
            .unwrap();
        let token = fixture.mailer.last_token("verify").unwrap();
        fixture.service.verify_email(&token).await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_signup_normalizes_email_and_rejects_duplicate() {
        let fixture = fixture();

        fixture
            .service
            .signup_with_email(&input(json!({ "email": "User@Example.com", "password": "pw-123456" })))
            .await
            .unwrap();

        let identity = fixture
            .store
            .find_identity(&ProviderId::new(ProviderName::Email, "user@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.provider_user_id, "user@example.com");
        assert!(!identity.provider_data.contains("pw-123456"));

        let duplicate = fixture
            .service
            .signup_with_email(&input(json!({ "email": "user@example.com", "password": "other" })))
            .await;
        match duplicate {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, IDENTITY_EXISTS_MESSAGE),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signup_is_undone_when_verification_mail_fails() {
        let fixture = fixture();
        let signup = input(json!({ "email": "ann@example.com", "password": "pw" }));

        fixture.mailer.set_down(true);
        match fixture.service.signup_with_email(&signup).await {
            Err(AppError::Unexpected(failure)) => assert!(matches!(*failure, AuthFailure::Email(_))),
            other => panic!("Expected Unexpected(Email), got {:?}", other),
        }
        assert_eq!(fixture.store.user_count().unwrap(), 0);

        fixture.mailer.set_down(false);
        fixture.service.signup_with_email(&signup).await.unwrap();
        assert_eq!(fixture.store.user_count().unwrap(), 1);

        let token = fixture.mailer.last_token("verify").unwrap();
        fixture.service.verify_email(&token).await.unwrap();
        assert!(fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("pw"))
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_verification_email() {
        let settings = AuthSettings {
            email_resend_cooldown: chrono::Duration::zero(),
            ..AuthSettings::default()
        };
        let fixture = fixture_with(settings, SignupFieldsConfig::new());
        fixture
            .service
            .signup_with_email(&input(json!({ "email": "ann@example.com", "password": "pw" })))
            .await
            .unwrap();

        fixture.service.resend_verification_email("ANN@example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("verify"), 2);

        let token = fixture.mailer.last_token("verify").unwrap();
        fixture.service.verify_email(&token).await.unwrap();

        // 이미 인증된 주소와 없는 주소는 메일 없이 성공
        fixture.service.resend_verification_email("ann@example.com").await.unwrap();
        fixture.service.resend_verification_email("ghost@example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("verify"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resend_verification_respects_cooldown() {
        let fixture = fixture();
        fixture
            .service
            .signup_with_email(&input(json!({ "email": "ann@example.com", "password": "pw" })))
            .await
            .unwrap();

        fixture.service.resend_verification_email("ann@example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("verify"), 1);
    }

    #[tokio::test]
    async fn test_signup_input_validation() {
        let fixture = fixture();

        let cases = [
            (json!({ "password": "pw" }), "email must be present"),
            (json!({ "email": "not-an-email", "password": "pw" }), "email must be a valid email"),
            (json!({ "email": "a@b.com" }), "password must be present"),
            (json!({ "email": "a@b.com", "password": "" }), "password must be present"),
        ];

        for (raw, expected) in cases {
            match fixture.service.signup_with_email(&input(raw)).await {
                Err(AppError::ValidationError(msg)) => assert_eq!(msg, expected),
                other => panic!("Expected ValidationError({}), got {:?}", expected, other),
            }
        }
        assert_eq!(fixture.store.user_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_signup_extra_fields_are_validated_and_stored() {
        let fields = SignupFieldsConfig::new()
            .field("name", |input| match input.get("name") {
                Some(Value::String(name)) if !name.is_empty() => Ok(json!(name)),
                _ => Err("name is required".to_string()),
            });
        let fixture = fixture_with(AuthSettings::default(), fields);

        match fixture
            .service
            .signup_with_username(&input(json!({ "username": "ann", "password": "pw", "name": "" })))
            .await
        {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "name is required"),
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let user = fixture
            .service
            .signup_with_username(&input(json!({ "username": "Ann", "password": "pw", "name": "Ann" })))
            .await
            .unwrap();
        assert_eq!(user.field("name"), Some(&json!("Ann")));
        assert!(user.field("password").is_none());
        assert!(user.field("username").is_none());
    }

    #[tokio::test]
    async fn test_email_login_requires_verification() {
        let fixture = fixture();
        fixture
            .service
            .signup_with_email(&input(json!({ "email": "ann@example.com", "password": "pw" })))
            .await
            .unwrap();
        assert_eq!(fixture.mailer.count("verify"), 1);

        let unverified = fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("pw"))
            .await;
        assert!(matches!(unverified, Err(AppError::AuthenticationError(_))));

        let token = fixture.mailer.last_token("verify").unwrap();
        fixture.service.verify_email(&token).await.unwrap();

        let session = fixture
            .service
            .login_with_email("ANN@example.com", &RawPassword::new("pw"))
            .await
            .unwrap();
        let claims = fixture.service.tokens().verify_session_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_share_one_message() {
        let fixture = fixture();
        signup_verified(&fixture, "ann@example.com", "pw").await;

        let wrong_password = fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("nope"))
            .await;
        let unknown = fixture
            .service
            .login_with_email("nobody@example.com", &RawPassword::new("pw"))
            .await;

        for result in [wrong_password, unknown] {
            match result {
                Err(AppError::AuthenticationError(msg)) => assert_eq!(msg, INVALID_CREDENTIALS_MESSAGE),
                other => panic!("Expected AuthenticationError, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_username_login_and_current_user() {
        let fixture = fixture();
        let user = fixture
            .service
            .signup_with_username(&input(json!({ "username": "Bob", "password": "pw" })))
            .await
            .unwrap();

        let session = fixture
            .service
            .login_with_username("bob", &RawPassword::new("pw"))
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);

        let current = fixture.service.current_user(&session.token).await.unwrap();
        assert_eq!(current.user.id, user.id);
        assert!(current.identity(ProviderName::Username).is_some());

        assert!(matches!(
            fixture.service.current_user("garbage").await,
            Err(AppError::AuthenticationError(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_reset_flow() {
        let fixture = fixture();
        signup_verified(&fixture, "ann@example.com", "old-pw").await;

        fixture.service.request_password_reset("Ann@Example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("reset"), 1);

        // 재발송 대기 시간 안의 두 번째 요청은 메일 없이 성공
        fixture.service.request_password_reset("ann@example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("reset"), 1);

        let token = fixture.mailer.last_token("reset").unwrap();
        fixture
            .service
            .reset_password(&token, RawPassword::new("new-pw"))
            .await
            .unwrap();

        assert!(fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("new-pw"))
            .await
            .is_ok());
        assert!(fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("old-pw"))
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_reset_for_unknown_address_is_guarded() {
        let fixture = fixture();

        let start = tokio::time::Instant::now();
        fixture.service.request_password_reset("ghost@example.com").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert_eq!(fixture.mailer.count("reset"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_password_reset_for_unverified_address_sends_nothing() {
        let fixture = fixture();
        fixture
            .service
            .signup_with_email(&input(json!({ "email": "ann@example.com", "password": "pw" })))
            .await
            .unwrap();

        fixture.service.request_password_reset("ann@example.com").await.unwrap();
        assert_eq!(fixture.mailer.count("reset"), 0);
    }

    #[tokio::test]
    async fn test_verification_token_cannot_reset_password() {
        let fixture = fixture();
        fixture
            .service
            .signup_with_email(&input(json!({ "email": "ann@example.com", "password": "pw" })))
            .await
            .unwrap();
        let verify_token = fixture.mailer.last_token("verify").unwrap();

        let result = fixture
            .service
            .reset_password(&verify_token, RawPassword::new("hijack"))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_external_sign_in_creates_once() {
        let fixture = fixture();

        let first = fixture
            .service
            .sign_in_with_external(ProviderName::GitHub, "OctoCat", &Map::new())
            .await
            .unwrap();
        let second = fixture
            .service
            .sign_in_with_external(ProviderName::GitHub, "octocat", &Map::new())
            .await
            .unwrap();

        assert_eq!(first.user.id, second.user.id);
        assert_eq!(fixture.store.user_count().unwrap(), 1);

        let not_external = fixture
            .service
            .sign_in_with_external(ProviderName::Email, "a@b.com", &Map::new())
            .await;
        assert!(matches!(not_external, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let fixture = fixture();
        signup_verified(&fixture, "ann@example.com", "pw").await;
        let session = fixture
            .service
            .login_with_email("ann@example.com", &RawPassword::new("pw"))
            .await
            .unwrap();
        let current = fixture.service.current_user(&session.token).await.unwrap();

        fixture.service.delete_account(&current.auth.id).await.unwrap();

        assert!(matches!(
            fixture.service.delete_account(&current.auth.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            fixture.service.current_user(&session.token).await,
            Err(AppError::AuthenticationError(_))
        ));
        assert!(fixture
            .store
            .find_identity(&ProviderId::new(ProviderName::Email, "ann@example.com"))
            .await
            .unwrap()
            .is_none());
    }
}
