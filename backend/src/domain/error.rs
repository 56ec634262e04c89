//! Domain-level error types.
//!
//! These errors carry no transport concerns. The HTTP adapter maps each
//! [`ErrorCode`] onto a status code and serializes the payload as JSON.

use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or a precondition is not met.
    InvalidRequest,
    /// The requested resource does not exist.
    NotFound,
    /// The request clashes with work already in progress.
    Conflict,
    /// A dependency needed to serve the request is unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload returned to inbound adapters.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("zone not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    #[schema(example = "not_found")]
    code: ErrorCode,
    #[schema(example = "zone not found")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl Error {
    /// Create a new error. Blank messages are replaced with the code name.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            format!("{code:?}")
        } else {
            message
        };
        Self {
            code,
            message,
            details: None,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured context attached to the error, if any.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::invalid(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
    #[case::missing(Error::not_found("gone"), ErrorCode::NotFound)]
    #[case::conflict(Error::conflict("busy"), ErrorCode::Conflict)]
    #[case::unavailable(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable)]
    #[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
    fn constructors_set_expected_codes(#[case] error: Error, #[case] expected: ErrorCode) {
        assert_eq!(error.code(), expected);
    }

    #[test]
    fn blank_messages_fall_back_to_code_name() {
        let error = Error::conflict("   ");
        assert_eq!(error.message(), "Conflict");
    }

    #[test]
    fn serializes_snake_case_code_and_details() {
        let error = Error::conflict("import running").with_details(json!({ "state": "fetching" }));
        let value = serde_json::to_value(&error).expect("error serializes");
        assert_eq!(value["code"], "conflict");
        assert_eq!(value["message"], "import running");
        assert_eq!(value["details"]["state"], "fetching");
    }

    #[test]
    fn omits_absent_details() {
        let value = serde_json::to_value(Error::not_found("zone")).expect("error serializes");
        assert!(value.get("details").is_none());
    }
}
