//! 인증 메일 발송 협력자
//!
//! 실제 메일 전송은 이 크레이트 밖의 일입니다. 코어는 링크를 만들어
//! [`AuthEmailSender`]에 넘기기만 합니다.

use async_trait::async_trait;
use log::info;

use crate::errors::EmailError;

/// 인증/재설정 메일 발송
#[async_trait]
pub trait AuthEmailSender: Send + Sync {
    async fn send_email_verification(&self, email: &str, verification_link: &str) -> Result<(), EmailError>;

    async fn send_password_reset(&self, email: &str, reset_link: &str) -> Result<(), EmailError>;
}

/// 개발용 발송기. 메일을 보내지 않고 수신자만 로그에 남깁니다.
///
/// 링크에는 토큰이 들어 있으므로 기록하지 않습니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingEmailSender;

#[async_trait]
impl AuthEmailSender for LoggingEmailSender {
    async fn send_email_verification(&self, email: &str, _verification_link: &str) -> Result<(), EmailError> {
        info!("📧 이메일 인증 메일 발송 (개발 모드): {}", email);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str, _reset_link: &str) -> Result<(), EmailError> {
        info!("📧 비밀번호 재설정 메일 발송 (개발 모드): {}", email);
        Ok(())
    }
}

/// `<client_url><path>?token=<token>` 형식의 링크를 만듭니다.
///
/// ```rust,ignore
/// let link = build_email_link("http://localhost:3000/", "/password-reset", "a.b+c");
/// assert_eq!(link, "http://localhost:3000/password-reset?token=a.b%2Bc");
/// ```
pub fn build_email_link(client_url: &str, path: &str, token: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    format!(
        "{}{}?token={}",
        client_url.trim_end_matches('/'),
        path,
        urlencoding::encode(token)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_email_link() {
        assert_eq!(
            build_email_link("http://localhost:3000", "/email-verification", "abc.def"),
            "http://localhost:3000/email-verification?token=abc.def"
        );
        assert_eq!(
            build_email_link("https://app.example.com/", "password-reset", "a+b/c="),
            "https://app.example.com/password-reset?token=a%2Bb%2Fc%3D"
        );
    }

    #[tokio::test]
    async fn test_logging_sender_always_succeeds() {
        let sender = LoggingEmailSender;

        assert!(sender.send_email_verification("a@b.com", "http://x?token=t").await.is_ok());
        assert!(sender.send_password_reset("a@b.com", "http://x?token=t").await.is_ok());
    }
}
