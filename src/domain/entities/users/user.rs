//! User Entity
//!
//! 인증 코어가 관리하는 사용자 집합체의 루트입니다.
//! 배포 환경마다 다른 추가 필드(`fields`)는 코어가 해석하지 않고 그대로 보관합니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 사용자 엔티티
///
/// 하나 이상의 Identity를 소유합니다 (Identity는 [`Auth`](crate::domain::entities::Auth)를 통해 연결).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// 사용자 ID (ObjectId 16진수 문자열)
    pub id: String,
    /// 회원가입 시 검증된 추가 필드
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl User {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// 추가 필드 값을 조회합니다.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
