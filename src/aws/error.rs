// ABOUTME: AWS SDK error classification for control-plane calls.
// ABOUTME: Uses error codes from ProvideErrorMetadata instead of string matching.

use aws_sdk_ecs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::fmt::Debug;
use thiserror::Error;

/// AWS error categories surfaced to callers.
#[derive(Debug, Error)]
pub enum AwsError {
    /// The caller is not allowed to perform the operation
    #[error("{operation}: access denied: {message}")]
    AccessDenied {
        operation: &'static str,
        message: String,
    },

    /// Rate limit exceeded
    #[error("{operation}: rate limit exceeded: {message}")]
    Throttled {
        operation: &'static str,
        message: String,
    },

    /// Referenced resource does not exist
    #[error("{operation}: not found: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },

    /// A request could not be assembled from the given values
    #[error("{operation}: invalid request: {message}")]
    InvalidRequest {
        operation: &'static str,
        message: String,
    },

    /// The response was missing a field the caller depends on
    #[error("{operation}: response missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    /// Any other SDK failure
    #[error("{operation} failed: {message}")]
    Sdk {
        operation: &'static str,
        code: Option<String>,
        message: String,
    },
}

/// Known AWS error codes for authorization failures
const ACCESS_DENIED_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "UnauthorizedOperation",
    "NotAuthorized",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "PriorRequestNotComplete",
];

/// Known AWS error codes for missing resources
const NOT_FOUND_CODES: &[&str] = &[
    "NoSuchHostedZone",
    "ServiceNotFoundException",
    "ClusterNotFoundException",
];

impl AwsError {
    /// Classify a failed SDK call by its error code.
    pub fn from_sdk<E, R>(operation: &'static str, err: SdkError<E, R>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
        R: Debug,
    {
        let code = err.code().map(str::to_string);
        let message = DisplayErrorContext(&err).to_string();
        classify(operation, code, message)
    }

    pub fn missing(operation: &'static str, field: &'static str) -> Self {
        AwsError::MissingField { operation, field }
    }

    pub fn invalid_request(operation: &'static str, err: impl std::fmt::Display) -> Self {
        AwsError::InvalidRequest {
            operation,
            message: err.to_string(),
        }
    }

    /// Check if this is an authorization failure
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AwsError::AccessDenied { .. })
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }
}

/// Classify an AWS error code into an [`AwsError`].
pub fn classify(operation: &'static str, code: Option<String>, message: String) -> AwsError {
    match code.as_deref() {
        Some(c) if ACCESS_DENIED_CODES.contains(&c) => AwsError::AccessDenied { operation, message },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled { operation, message },
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { operation, message },
        _ => AwsError::Sdk {
            operation,
            code,
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_codes() {
        for code in ACCESS_DENIED_CODES {
            let err = classify("ListHostedZonesByName", Some(code.to_string()), "no".into());
            assert!(err.is_access_denied(), "Expected AccessDenied for code: {code}");
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify("DescribeServices", Some(code.to_string()), "slow".into());
            assert!(
                matches!(err, AwsError::Throttled { .. }),
                "Expected Throttled for code: {code}"
            );
        }
    }

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify("DescribeServices", Some(code.to_string()), "gone".into());
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify("UpdateService", Some("InvalidParameterException".into()), "x".into());
        assert!(matches!(err, AwsError::Sdk { code: Some(_), .. }));

        let err = classify("UpdateService", None, "dispatch failure".into());
        assert!(matches!(err, AwsError::Sdk { code: None, .. }));
    }

    #[test]
    fn display_names_operation() {
        let err = AwsError::missing("RegisterTaskDefinition", "taskDefinitionArn");
        assert_eq!(
            err.to_string(),
            "RegisterTaskDefinition: response missing taskDefinitionArn"
        );
    }
}
