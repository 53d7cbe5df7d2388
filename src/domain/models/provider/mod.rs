//! 프로바이더별 자격 증명 모델
//!
//! - [`provider_id`] - 정규화된 Identity 키
//! - [`provider_data`] - 프로바이더별 페이로드와 저장용 코덱

pub mod provider_id;
pub mod provider_data;

pub use provider_id::ProviderId;
pub use provider_data::*;
