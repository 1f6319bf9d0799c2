//! Numeric-coded application errors.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::codes;
use crate::observability::fields::{Field, FieldValue};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// An error with a stable numeric code, serializable as `{"code":..,"msg":..}`.
#[derive(Debug, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct CodedError {
    code: i64,
    #[serde(rename = "msg")]
    message: String,
    #[serde(skip)]
    #[source]
    source: Option<BoxError>,
}

impl CodedError {
    pub fn build(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::build(codes::SYSTEM, message)
    }

    /// A user-facing error whose message is safe to show.
    pub fn message(message: impl Into<String>) -> Self {
        Self::build(codes::MESSAGE, message)
    }

    /// Wrap `err`, keeping it as the source and its text as the message.
    pub fn wrap<E>(code: i64, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            code,
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn wrap_system<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap(codes::SYSTEM, err)
    }

    pub fn wrap_message<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap(codes::MESSAGE, err)
    }

    pub fn net<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::wrap(codes::SYSTEM_NET, err)
    }

    /// Turn any boxed error into a coded one; coded errors pass through untouched.
    pub fn convert(err: BoxError) -> Self {
        match err.downcast::<CodedError>() {
            Ok(coded) => *coded,
            Err(other) => Self {
                code: codes::SYSTEM,
                message: other.to_string(),
                source: Some(other),
            },
        }
    }

    /// Decode the JSON form. Returns `None` when `data` is not a coded error.
    pub fn from_json(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }

    /// Decode the JSON form, falling back to an RPC error describing the failure.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(err) => err,
            Err(e) => Self::build(
                codes::SYSTEM_RPC,
                format!("unparseable error message [{}]: {}", text, e),
            ),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn text(&self) -> &str {
        &self.message
    }

    /// Same code, regardless of message.
    pub fn is(&self, other: &CodedError) -> bool {
        self.code == other.code
    }

    /// `errCode` followed by `extra`.
    pub fn fields(&self, extra: &[Field]) -> Vec<Field> {
        let mut fields = Vec::with_capacity(extra.len() + 1);
        fields.push(Field::int("errCode", self.code));
        fields.extend_from_slice(extra);
        fields
    }

    /// `errCode` and `error` followed by `extra`.
    pub fn fields_with_cause(&self, extra: &[Field]) -> Vec<Field> {
        let mut fields = Vec::with_capacity(extra.len() + 2);
        fields.push(Field::int("errCode", self.code));
        fields.push(Field::new("error", FieldValue::Error(self.message.clone())));
        fields.extend_from_slice(extra);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_constructors() {
        assert_eq!(CodedError::system("x").code(), codes::SYSTEM);
        assert_eq!(CodedError::message("x").code(), codes::MESSAGE);
        let err = CodedError::build(42, "custom");
        assert_eq!(err.code(), 42);
        assert_eq!(err.to_string(), "custom");
        assert!(err.source().is_none());
    }

    #[test]
    fn test_wrap_keeps_source() {
        let err = CodedError::net(io::Error::new(io::ErrorKind::TimedOut, "dial timeout"));
        assert_eq!(err.code(), codes::SYSTEM_NET);
        assert_eq!(err.text(), "dial timeout");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_json_round_trip_shape() {
        let err = CodedError::build(7, "bad input");
        assert_eq!(err.to_json(), r#"{"code":7,"msg":"bad input"}"#);

        let back = CodedError::from_json(err.to_json().as_bytes()).unwrap();
        assert!(back.is(&err));
        assert_eq!(back.text(), "bad input");
        assert!(CodedError::from_json(b"not json").is_none());
    }

    #[test]
    fn test_parse_falls_back_to_rpc_error() {
        let err = CodedError::parse("<html>");
        assert_eq!(err.code(), codes::SYSTEM_RPC);
        assert!(err.text().contains("<html>"));
    }

    #[test]
    fn test_convert() {
        let coded: BoxError = Box::new(CodedError::message("keep me"));
        let err = CodedError::convert(coded);
        assert_eq!(err.code(), codes::MESSAGE);

        let plain: BoxError = Box::new(io::Error::new(io::ErrorKind::Other, "disk"));
        let err = CodedError::convert(plain);
        assert_eq!(err.code(), codes::SYSTEM);
        assert_eq!(err.text(), "disk");
    }

    #[test]
    fn test_fields() {
        let err = CodedError::build(9, "nope");
        let rendered: Vec<String> = err
            .fields_with_cause(&[Field::str("scope", "auth")])
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, vec!["errCode=9", "error=nope", "scope=auth"]);
        assert_eq!(err.fields(&[]).len(), 1);
    }
}
