//! Signup Field Validator
//!
//! 배포 환경이 정의한 추가 회원가입 필드를 원시 입력에서 추출합니다.
//!
//! 설정은 시작 시점에 한 번 만들어져 변경되지 않으며, 참조로 전달됩니다.
//! 처리는 등록 순서대로 진행되고, 처음 실패한 추출기의 메시지가 그대로
//! `AuthError::Validation`이 됩니다. 뒤의 필드는 시도하지 않습니다.
//!
//! ```rust,ignore
//! let config = SignupFieldsConfig::new()
//!     .field("name", |input| match input.get("name") {
//!         Some(Value::String(name)) if !name.is_empty() => Ok(Value::String(name.clone())),
//!         _ => Err("name is required".to_string()),
//!     });
//!
//! let fields = config.validate(&raw_input)?;
//! ```

use std::fmt;

use serde_json::{Map, Value};

use crate::errors::AuthError;

/// 추출기에 넘기기 전에 입력에서 제거되는 비밀 필드
pub const SECRET_FIELD: &str = "password";

/// `(비밀 필드가 제거된 입력) -> 값 | 실패 메시지`
pub type FieldExtractor = Box<dyn Fn(&Map<String, Value>) -> Result<Value, String> + Send + Sync>;

/// 추가 회원가입 필드 설정
#[derive(Default)]
pub struct SignupFieldsConfig {
    fields: Vec<(String, FieldExtractor)>,
}

impl SignupFieldsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드를 추가합니다. 등록 순서가 처리 순서입니다.
    pub fn field<F>(mut self, name: impl Into<String>, extractor: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.fields.push((name.into(), Box::new(extractor)));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// 비밀 필드를 제거한 입력으로 각 추출기를 차례로 실행합니다.
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - 처음 실패한 추출기의 메시지
    pub fn validate(&self, raw_input: &Map<String, Value>) -> Result<Map<String, Value>, AuthError> {
        let mut sanitized = raw_input.clone();
        sanitized.remove(SECRET_FIELD);

        let mut result = Map::new();
        for (name, extractor) in &self.fields {
            let value = extractor(&sanitized).map_err(AuthError::Validation)?;
            result.insert(name.clone(), value);
        }

        Ok(result)
    }
}

impl fmt::Debug for SignupFieldsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupFieldsConfig")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn input(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_failing_extractor_aborts_and_hides_password() {
        let config = SignupFieldsConfig::new()
            .field("name", |input| Ok(input.get("name").cloned().unwrap_or(Value::Null)))
            .field("extra", |input| match input.get("extra") {
                Some(Value::Number(n)) => Ok(Value::Number(n.clone())),
                _ => Err("extra must be a number".to_string()),
            });

        let result = config.validate(&input(json!({ "password": "x", "name": "", "extra": "bad" })));

        match result {
            Err(AuthError::Validation(msg)) => assert_eq!(msg, "extra must be a number"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_extractors_never_see_password() {
        let config = SignupFieldsConfig::new().field("echo", |input| {
            assert!(!input.contains_key(SECRET_FIELD));
            Ok(Value::Object(input.clone()))
        });

        let fields = config
            .validate(&input(json!({ "password": "hunter2", "name": "Ann" })))
            .unwrap();

        let rendered = serde_json::to_string(&fields).unwrap();
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("Ann"));
    }

    #[test]
    fn test_fail_fast_skips_remaining_fields() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let config = SignupFieldsConfig::new()
            .field("first", |_| Err("first failed".to_string()))
            .field("second", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            });

        assert_eq!(
            config.validate(&Map::new()),
            Err(AuthError::Validation("first failed".to_string()))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_only_configured_fields_are_returned_in_order() {
        let config = SignupFieldsConfig::new()
            .field("name", |input| Ok(input.get("name").cloned().unwrap_or(Value::Null)))
            .field("age", |_| Ok(json!(30)));

        let fields = config
            .validate(&input(json!({ "name": "Ann", "unlisted": true, "password": "pw" })))
            .unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("name"), Some(&json!("Ann")));
        assert_eq!(fields.get("age"), Some(&json!(30)));
        assert!(fields.get("unlisted").is_none());
        assert_eq!(config.field_names().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn test_empty_config_yields_no_fields() {
        let fields = SignupFieldsConfig::new()
            .validate(&input(json!({ "password": "pw", "name": "Ann" })))
            .unwrap();

        assert!(fields.is_empty());
    }
}
