//! 타이밍 공격 방어
//!
//! 대상 Identity가 존재하는지 응답 지연으로 드러나면 안 되는 경로(예: 모르는 주소로 들어온
//! 비밀번호 재설정 요청)에서 고정 범위 안의 무작위 시간만큼 대기합니다.
//!
//! 부분적인 완화책입니다. 타이밍 기반 사용자 열거를 어렵게 만들지만 없애지는 못하며,
//! 네트워크 수준의 정밀한 측정에 대해서는 보장하지 않습니다.

use std::time::Duration;

use rand::Rng;

use crate::config::AuthSettings;

#[derive(Debug, Clone, Copy)]
pub struct TimingGuard {
    min_delay: Duration,
    max_delay: Duration,
}

impl TimingGuard {
    /// `max_delay`가 `min_delay`보다 작으면 `min_delay`로 고정됩니다.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(settings.timing_guard_min, settings.timing_guard_max)
    }

    /// 범위 안에서 균등하게 뽑은 지연 시간
    pub fn next_delay(&self) -> Duration {
        let min_ms = self.min_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;

        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// 무작위 시간만큼 비동기로 대기합니다. 스레드를 막지 않습니다.
    pub async fn guard(&self) {
        let delay = self.next_delay();
        log::debug!("⏳ 타이밍 가드 대기: {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
