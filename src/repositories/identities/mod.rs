//! Identity 저장소
//!
//! - [`identity_store`] - 영속성 협력자 계약 (`IdentityStore` 트레이트)
//! - [`mongo_identity_repo`] - MongoDB 구현 (운영)
//! - [`memory_identity_repo`] - 메모리 구현 (테스트, 로컬 개발)

pub mod identity_store;
pub mod mongo_identity_repo;
pub mod memory_identity_repo;

pub use identity_store::IdentityStore;
pub use mongo_identity_repo::MongoIdentityRepository;
pub use memory_identity_repo::MemoryIdentityRepository;
