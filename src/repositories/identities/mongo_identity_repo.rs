//! # MongoDB Identity 저장소
//!
//! `users` 컬렉션에 사용자 하나당 문서 하나를 저장하며, Auth와 Identity는 문서에 내장됩니다.
//! 문서 구조는 [`UserDocument`](crate::domain::entities::UserDocument)를 참고하세요.
//!
//! ## 인덱스
//!
//! | 이름 | 키 | 옵션 |
//! |------|----|------|
//! | `identity_key_unique` | `auth.identities.identity_key` | unique |
//! | `auth_id_unique` | `auth.id` | unique |
//!
//! ## 에러 코드 분류
//!
//! | 서버 코드 | 분류 |
//! |-----------|------|
//! | 11000, 11001 (DuplicateKey) | `UniqueViolation` |
//! | 121 (DocumentValidationFailure) | `SchemaValidation` |
//! | 26 (NamespaceNotFound) | `MissingRelation` |
//! | BSON 직렬화/역직렬화 실패 | `SchemaValidation` |
//! | 그 밖 | `Other` |
//!
//! 문서 내장 구조이므로 외래 키 위반(`ForeignKeyViolation`)은 이 구현에서 발생하지 않습니다.

use async_trait::async_trait;
use log::{debug, info, warn};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{CreateCollectionOptions, FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Collection, IndexModel,
};
use serde_json::{Map, Value};

use crate::db::Database;
use crate::domain::entities::{
    fields_to_document, identity_key, AuthFilter, AuthIdentity, AuthWithUser, IdentityDocument, User,
    UserDocument,
};
use crate::domain::models::provider::ProviderId;
use crate::errors::{StorageError, StorageErrorKind};
use crate::repositories::identities::IdentityStore;

pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;
const DUPLICATE_KEY_ON_UPDATE: i32 = 11001;
const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
const NAMESPACE_NOT_FOUND: i32 = 26;
const NAMESPACE_EXISTS: i32 = 48;

/// MongoDB 기반 [`IdentityStore`] 구현
#[derive(Clone)]
pub struct MongoIdentityRepository {
    database: mongodb::Database,
    collection: Collection<UserDocument>,
}

impl MongoIdentityRepository {
    pub fn new(database: &Database) -> Self {
        let database = database.get_database();
        let collection = database.collection::<UserDocument>(USERS_COLLECTION);

        Self { database, collection }
    }

    /// 컬렉션 스키마 검증 규칙과 인덱스를 만듭니다.
    ///
    /// 여러 번 실행해도 안전합니다. 컬렉션이 이미 있으면 검증 규칙만 갱신합니다.
    /// 이 작업이 실행되지 않은 데이터베이스에서는 유니크 제약이 보장되지 않습니다.
    pub async fn initialize(&self) -> Result<(), StorageError> {
        let options = CreateCollectionOptions::builder()
            .validator(user_schema_validator())
            .build();

        match self
            .database
            .create_collection(USERS_COLLECTION)
            .with_options(options)
            .await
        {
            Ok(()) => info!("✅ 컬렉션 생성: {}", USERS_COLLECTION),
            Err(e) if server_error_code(&e) == Some(NAMESPACE_EXISTS) => {
                self.database
                    .run_command(doc! {
                        "collMod": USERS_COLLECTION,
                        "validator": user_schema_validator(),
                    })
                    .await
                    .map_err(storage_error)?;
                info!("🔄 컬렉션 검증 규칙 갱신: {}", USERS_COLLECTION);
            }
            Err(e) => return Err(storage_error(e)),
        }

        let identity_index = IndexModel::builder()
            .keys(doc! { "auth.identities.identity_key": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("identity_key_unique".to_string())
                .build())
            .build();

        let auth_id_index = IndexModel::builder()
            .keys(doc! { "auth.id": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("auth_id_unique".to_string())
                .build())
            .build();

        self.collection
            .create_indexes([identity_index, auth_id_index])
            .await
            .map_err(storage_error)?;

        info!("✅ 인덱스 생성 완료: {}", USERS_COLLECTION);
        Ok(())
    }

    fn filter_for(filter: &AuthFilter) -> Option<Document> {
        match filter {
            AuthFilter::AuthId(auth_id) => Some(doc! { "auth.id": auth_id.as_str() }),
            // 형식이 잘못된 ID는 어떤 문서와도 일치하지 않음
            AuthFilter::UserId(user_id) => ObjectId::parse_str(user_id)
                .ok()
                .map(|id| doc! { "_id": id }),
            AuthFilter::Identity(provider_id) => Some(identity_filter(provider_id)),
        }
    }
}

fn identity_filter(provider_id: &ProviderId) -> Document {
    doc! { "auth.identities.identity_key": identity_key(provider_id) }
}

#[async_trait]
impl IdentityStore for MongoIdentityRepository {
    async fn create_user_with_identity(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
        user_fields: Map<String, Value>,
    ) -> Result<User, StorageError> {
        let document = UserDocument::new(
            IdentityDocument::new(provider_id, provider_data),
            fields_to_document(&user_fields)?,
        );

        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(storage_error)?;

        let user_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StorageError::other("inserted _id is not an ObjectId"))?;

        debug!("🆕 사용자 생성: {} ({})", user_id, provider_id.provider_name());
        Ok(User::new(user_id.to_hex(), user_fields))
    }

    async fn find_identity(&self, provider_id: &ProviderId) -> Result<Option<AuthIdentity>, StorageError> {
        let document = self
            .collection
            .find_one(identity_filter(provider_id))
            .await
            .map_err(storage_error)?;

        Ok(document.and_then(|document| document.take_identity(provider_id)))
    }

    async fn update_identity_provider_data(
        &self,
        provider_id: &ProviderId,
        provider_data: String,
    ) -> Result<Option<AuthIdentity>, StorageError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let document = self
            .collection
            .find_one_and_update(
                identity_filter(provider_id),
                doc! {
                    "$set": {
                        "auth.identities.$.provider_data": provider_data,
                        "updated_at": DateTime::now(),
                    }
                },
            )
            .with_options(options)
            .await
            .map_err(storage_error)?;

        Ok(document.and_then(|document| document.take_identity(provider_id)))
    }

    async fn find_auth_with_user(&self, filter: &AuthFilter) -> Result<Option<AuthWithUser>, StorageError> {
        let Some(query) = Self::filter_for(filter) else {
            return Ok(None);
        };

        let document = self
            .collection
            .find_one(query)
            .await
            .map_err(storage_error)?;

        document.map(UserDocument::into_auth_with_user).transpose()
    }

    async fn delete_user_by_auth_id(&self, auth_id: &str) -> Result<u64, StorageError> {
        let result = self
            .collection
            .delete_one(doc! { "auth.id": auth_id })
            .await
            .map_err(storage_error)?;

        if result.deleted_count == 0 {
            warn!("⚠️ 삭제할 사용자가 없음: auth_id={}", auth_id);
        }
        Ok(result.deleted_count)
    }
}

/// `users` 컬렉션의 `$jsonSchema` 검증 규칙
fn user_schema_validator() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["auth", "fields", "created_at", "updated_at"],
            "properties": {
                "auth": {
                    "bsonType": "object",
                    "required": ["id", "identities"],
                    "properties": {
                        "id": { "bsonType": "string" },
                        "identities": {
                            "bsonType": "array",
                            "minItems": 1,
                            "items": {
                                "bsonType": "object",
                                "required": ["provider_name", "provider_user_id", "identity_key", "provider_data"],
                                "properties": {
                                    "provider_name": { "enum": ["email", "username", "google", "github"] },
                                    "provider_user_id": { "bsonType": "string" },
                                    "identity_key": { "bsonType": "string" },
                                    "provider_data": { "bsonType": "string" },
                                },
                            },
                        },
                    },
                },
                "fields": { "bsonType": "object" },
                "created_at": { "bsonType": "date" },
                "updated_at": { "bsonType": "date" },
            },
        }
    }
}

fn storage_error(error: mongodb::error::Error) -> StorageError {
    StorageError::new(classify_error(&error), error.to_string())
}

/// 드라이버 에러를 저장소 실패 분류로 변환합니다.
pub fn classify_error(error: &mongodb::error::Error) -> StorageErrorKind {
    match error.kind.as_ref() {
        ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
            StorageErrorKind::SchemaValidation
        }
        _ => server_error_code(error)
            .map(classify_code)
            .unwrap_or(StorageErrorKind::Other),
    }
}

/// 서버 에러 코드를 저장소 실패 분류로 변환합니다.
pub fn classify_code(code: i32) -> StorageErrorKind {
    match code {
        DUPLICATE_KEY | DUPLICATE_KEY_ON_UPDATE => StorageErrorKind::UniqueViolation,
        DOCUMENT_VALIDATION_FAILURE => StorageErrorKind::SchemaValidation,
        NAMESPACE_NOT_FOUND => StorageErrorKind::MissingRelation,
        _ => StorageErrorKind::Other,
    }
}

fn server_error_code(error: &mongodb::error::Error) -> Option<i32> {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        ErrorKind::Write(WriteFailure::WriteConcernError(e)) => Some(e.code),
        ErrorKind::Command(e) => Some(e.code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderName;

    #[test]
    fn test_classify_code() {
        assert_eq!(classify_code(11000), StorageErrorKind::UniqueViolation);
        assert_eq!(classify_code(11001), StorageErrorKind::UniqueViolation);
        assert_eq!(classify_code(121), StorageErrorKind::SchemaValidation);
        assert_eq!(classify_code(26), StorageErrorKind::MissingRelation);
        assert_eq!(classify_code(13), StorageErrorKind::Other);
        assert_eq!(classify_code(0), StorageErrorKind::Other);
    }

    #[test]
    fn test_filters() {
        let provider_id = ProviderId::new(ProviderName::Email, "Ann@Example.com");
        assert_eq!(
            MongoIdentityRepository::filter_for(&AuthFilter::Identity(provider_id)),
            Some(doc! { "auth.identities.identity_key": "email:ann@example.com" })
        );

        assert_eq!(
            MongoIdentityRepository::filter_for(&AuthFilter::AuthId("a-1".to_string())),
            Some(doc! { "auth.id": "a-1" })
        );

        let id = ObjectId::new();
        assert_eq!(
            MongoIdentityRepository::filter_for(&AuthFilter::UserId(id.to_hex())),
            Some(doc! { "_id": id })
        );
        assert_eq!(
            MongoIdentityRepository::filter_for(&AuthFilter::UserId("not-an-object-id".to_string())),
            None
        );
    }

    #[test]
    fn test_schema_validator_requires_identities() {
        let validator = user_schema_validator();
        let schema = validator.get_document("$jsonSchema").unwrap();
        let required = schema.get_array("required").unwrap();

        assert!(required.iter().any(|v| v.as_str() == Some("auth")));
    }
}
