//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every validation failure becomes an `invalid_request` error whose details
//! name the offending field and a stable code.

use pagination::{PageField, PageRequestError};
use serde_json::json;

use crate::domain::{Error, RoleParseError, UserValidationError};

/// Message returned for any unusable pagination input.
pub(crate) const PAGINATION_MESSAGE: &str = "Page and rows per page must be integer.";

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// A required body field was absent.
pub(crate) fn missing_field_error(field: &'static str) -> Error {
    field_error(field, "missing_field", format!("missing required field: {field}"))
}

/// A user value failed domain validation.
pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    field_error(err.field(), err.code(), err.to_string())
}

/// The `role` field did not name a role.
pub(crate) fn role_error(err: &RoleParseError) -> Error {
    field_error("role", "invalid_role", err.to_string())
}

/// Pagination query values were not usable integers.
///
/// Reported as `422 Unprocessable Entity`, naming the wire field.
pub(crate) fn pagination_error(err: PageRequestError) -> Error {
    let (field, code) = match err {
        PageRequestError::NotAnInteger { field } => (Some(field), "not_an_integer"),
        PageRequestError::BelowMinimum { field } => (Some(field), "below_minimum"),
        PageRequestError::Overflow => (None, "out_of_range"),
    };
    let field = field.map(|field| match field {
        PageField::Page => "page",
        PageField::PerPage => "rowsPerPage",
    });
    Error::unprocessable_entity(PAGINATION_MESSAGE).with_details(json!({
        "field": field,
        "code": code,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, NameField};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(PageRequestError::NotAnInteger { field: PageField::PerPage }, json!("rowsPerPage"), "not_an_integer")]
    #[case(PageRequestError::BelowMinimum { field: PageField::Page }, json!("page"), "below_minimum")]
    #[case(PageRequestError::Overflow, Value::Null, "out_of_range")]
    fn pagination_errors_are_unprocessable(
        #[case] err: PageRequestError,
        #[case] field: Value,
        #[case] code: &str,
    ) {
        let error = pagination_error(err);
        assert_eq!(error.code(), ErrorCode::UnprocessableEntity);
        assert_eq!(error.message(), PAGINATION_MESSAGE);
        assert_eq!(error.details(), Some(&json!({"field": field, "code": code})));
    }

    #[rstest]
    fn user_errors_name_the_wire_field() {
        let error = user_validation_error(&UserValidationError::EmptyName {
            field: NameField::LastName,
        });
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "lastName must not be empty");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "lastName", "code": "empty"}))
        );
    }
}
