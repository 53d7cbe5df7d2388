//! 데이터 액세스 계층을 담당하는 리포지토리 모듈
//!
//! 서비스 계층은 구체 타입이 아니라 [`IdentityStore`](identities::IdentityStore) 트레이트에
//! 의존하며, 구현체는 시작 시점에 명시적으로 생성되어 `Arc`로 전달됩니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use auth_identity_core::repositories::identities::{IdentityStore, MemoryIdentityRepository};
//!
//! let store: Arc<dyn IdentityStore> = Arc::new(MemoryIdentityRepository::new());
//! let identity = store.find_identity(&provider_id).await?;
//! ```

pub mod identities;
