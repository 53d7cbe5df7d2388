//! MongoDB 저장 문서
//!
//! 사용자 하나가 `users` 컬렉션의 문서 하나이며, Auth와 모든 Identity를 내장합니다.
//! 그래서 User + 첫 Identity 생성은 `insert_one` 한 번으로 원자적으로 처리됩니다.
//!
//! ```json
//! {
//!   "_id": ObjectId("..."),
//!   "auth": {
//!     "id": "1f0c...-uuid",
//!     "identities": [
//!       {
//!         "provider_name": "email",
//!         "provider_user_id": "user@example.com",
//!         "identity_key": "email:user@example.com",
//!         "provider_data": "{\"hashedPassword\":\"...\",...}"
//!       }
//!     ]
//!   },
//!   "fields": { "name": "..." },
//!   "created_at": ISODate("..."),
//!   "updated_at": ISODate("...")
//! }
//! ```
//!
//! `identity_key`에는 유니크 인덱스가 걸려 있어 같은 ProviderId가 두 문서에 존재할 수 없습니다.

use mongodb::bson::{self, oid::ObjectId, Bson, DateTime, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::config::ProviderName;
use crate::domain::entities::{Auth, AuthIdentity, AuthWithUser, User};
use crate::domain::models::provider::ProviderId;
use crate::errors::{StorageError, StorageErrorKind};

/// `users` 컬렉션 문서
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub auth: AuthDocument,
    #[serde(default)]
    pub fields: Document,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// 사용자 문서에 내장된 Auth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthDocument {
    pub id: String,
    pub identities: Vec<IdentityDocument>,
}

/// Auth에 내장된 Identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub provider_name: ProviderName,
    pub provider_user_id: String,
    /// `"<provider_name>:<provider_user_id>"`, 유니크 인덱스 대상
    pub identity_key: String,
    pub provider_data: String,
}

impl IdentityDocument {
    pub fn new(provider_id: &ProviderId, provider_data: String) -> Self {
        Self {
            provider_name: provider_id.provider_name(),
            provider_user_id: provider_id.provider_user_id().to_string(),
            identity_key: identity_key(provider_id),
            provider_data,
        }
    }

    fn into_identity(self, auth_id: &str) -> AuthIdentity {
        AuthIdentity {
            provider_name: self.provider_name,
            provider_user_id: self.provider_user_id,
            provider_data: self.provider_data,
            auth_id: auth_id.to_string(),
        }
    }
}

impl UserDocument {
    /// 첫 Identity를 가진 새 사용자 문서를 만듭니다. `_id`는 삽입 시 할당됩니다.
    pub fn new(identity: IdentityDocument, fields: Document) -> Self {
        let now = DateTime::now();

        Self {
            id: None,
            auth: AuthDocument {
                id: Uuid::new_v4().to_string(),
                identities: vec![identity],
            },
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// 문서를 도메인 조인 결과로 변환합니다.
    pub fn into_auth_with_user(self) -> Result<AuthWithUser, StorageError> {
        let user_id = self
            .id
            .ok_or_else(|| StorageError::new(StorageErrorKind::SchemaValidation, "user document without _id"))?
            .to_hex();

        let auth_id = self.auth.id;
        let identities = self
            .auth
            .identities
            .into_iter()
            .map(|identity| identity.into_identity(&auth_id))
            .collect();

        Ok(AuthWithUser {
            auth: Auth {
                id: auth_id,
                user_id: user_id.clone(),
            },
            user: User::new(user_id, document_to_fields(self.fields)),
            identities,
        })
    }

    /// `provider_id`와 일치하는 내장 Identity를 꺼냅니다.
    pub fn take_identity(self, provider_id: &ProviderId) -> Option<AuthIdentity> {
        let key = identity_key(provider_id);
        let auth_id = self.auth.id;

        self.auth
            .identities
            .into_iter()
            .find(|identity| identity.identity_key == key)
            .map(|identity| identity.into_identity(&auth_id))
    }
}

/// Identity 유니크 키
pub fn identity_key(provider_id: &ProviderId) -> String {
    provider_id.to_string()
}

/// 사용자 추가 필드를 BSON 문서로 변환합니다.
///
/// BSON으로 표현할 수 없는 값(예: `i64` 범위를 넘는 정수)은 스키마 검증 실패입니다.
pub fn fields_to_document(fields: &Map<String, Value>) -> Result<Document, StorageError> {
    bson::to_document(fields)
        .map_err(|e| StorageError::new(StorageErrorKind::SchemaValidation, e.to_string()))
}

/// BSON 문서를 relaxed Extended JSON 규칙으로 JSON 객체로 변환합니다.
pub fn document_to_fields(document: Document) -> Map<String, Value> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;
    use serde_json::json;

    #[test]
    fn test_identity_document_key() {
        let provider_id = ProviderId::new(ProviderName::Email, "User@Example.com");
        let identity = IdentityDocument::new(&provider_id, "{}".to_string());

        assert_eq!(identity.identity_key, "email:user@example.com");
        assert_eq!(identity.provider_user_id, "user@example.com");
    }

    #[test]
    fn test_fields_roundtrip_through_bson() {
        let fields = json!({ "name": "Ann", "age": 30, "tags": ["a", "b"], "nickname": null });
        let map = fields.as_object().unwrap().clone();

        let document = fields_to_document(&map).unwrap();
        assert_eq!(document.get_str("name").unwrap(), "Ann");

        assert_eq!(Value::Object(document_to_fields(document)), fields);
    }

    #[test]
    fn test_unrepresentable_field_is_schema_validation() {
        let mut map = Map::new();
        map.insert("huge".to_string(), json!(u64::MAX));

        let err = fields_to_document(&map).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::SchemaValidation);
    }

    #[test]
    fn test_fields_named_like_document_keys_stay_nested() {
        let provider_id = ProviderId::new(ProviderName::GitHub, "42");
        let fields = json!({ "auth": "sso", "_id": 7, "created_at": "yesterday" });
        let mut document = UserDocument::new(
            IdentityDocument::new(&provider_id, "{}".to_string()),
            fields_to_document(fields.as_object().unwrap()).unwrap(),
        );

        let stored = bson::to_document(&document).unwrap();
        assert!(stored.get_document("auth").unwrap().contains_key("identities"));
        assert_eq!(stored.get_document("fields").unwrap().get_str("auth").unwrap(), "sso");
        assert!(stored.get_datetime("created_at").is_ok());

        document.id = Some(ObjectId::new());
        let joined = document.into_auth_with_user().unwrap();
        assert_eq!(joined.user.field("auth"), Some(&json!("sso")));
        assert_eq!(joined.user.field("_id"), Some(&json!(7)));
        assert_eq!(joined.identities.len(), 1);
    }

    #[test]
    fn test_into_auth_with_user() {
        let provider_id = ProviderId::new(ProviderName::Username, "Bob");
        let mut document = UserDocument::new(
            IdentityDocument::new(&provider_id, r#"{"hashedPassword":"h"}"#.to_string()),
            doc! { "name": "Bob" },
        );

        assert!(document.clone().into_auth_with_user().is_err());

        let id = ObjectId::new();
        document.id = Some(id);
        let auth_id = document.auth.id.clone();

        let joined = document.clone().into_auth_with_user().unwrap();
        assert_eq!(joined.user.id, id.to_hex());
        assert_eq!(joined.auth.user_id, id.to_hex());
        assert_eq!(joined.auth.id, auth_id);
        assert_eq!(joined.user.field("name"), Some(&json!("Bob")));
        assert_eq!(joined.identities.len(), 1);
        assert_eq!(joined.identities[0].auth_id, auth_id);

        let identity = document.take_identity(&provider_id).unwrap();
        assert_eq!(identity.provider_user_id, "bob");
    }
}
