//! 에러 타입과 공개 에러 변환 규칙
//!
//! - [`errors`] - 공개 에러(`AppError`)와 내부 실패(`AuthFailure`) 정의
//! - [`normalizer`] - 내부 실패를 공개 에러로 바꾸는 우선순위 규칙

#[allow(clippy::module_inception)]
pub mod errors;
pub mod normalizer;

pub use errors::*;
pub use normalizer::normalize;
