//! 비밀번호 해싱 협력자
//!
//! 코어가 해싱에 대해 아는 것은 `hash`/`verify` 호출 계약뿐입니다.
//! 같은 비밀번호라도 솔트 때문에 매번 다른 해시가 나오지만, 어떤 해시든 원래 비밀번호로
//! 검증되어야 합니다.

use crate::domain::models::provider::{HashedPassword, RawPassword};
use crate::errors::HashError;

/// 단방향 비밀번호 해싱
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &RawPassword) -> Result<HashedPassword, HashError>;

    /// `password`가 `hashed`의 원래 값인지 확인합니다.
    fn verify(&self, password: &RawPassword, hashed: &HashedPassword) -> Result<bool, HashError>;
}

/// bcrypt 구현
///
/// cost는 `PasswordConfig::bcrypt_cost()`(환경별 기본값, `BCRYPT_COST`)에서 옵니다.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &RawPassword) -> Result<HashedPassword, HashError> {
        let hash_start = std::time::Instant::now();
        let hashed = bcrypt::hash(password.expose(), self.cost)
            .map_err(|e| HashError(e.to_string()))?;

        log::debug!("Password hashing took: {:?}", hash_start.elapsed());
        Ok(HashedPassword::from_hash(hashed))
    }

    fn verify(&self, password: &RawPassword, hashed: &HashedPassword) -> Result<bool, HashError> {
        let verify_start = std::time::Instant::now();
        let is_valid = bcrypt::verify(password.expose(), hashed.as_str())
            .map_err(|e| HashError(e.to_string()))?;

        log::debug!("Password verification took: {:?}", verify_start.elapsed());
        Ok(is_valid)
    }
}
