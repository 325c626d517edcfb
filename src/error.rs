// ABOUTME: Application-wide error types for convoy.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::aws::AwsError;
use crate::metadata::MetadataError;
use crate::types::{HostNameError, ImageTagError, ParseTaskDefinitionRefError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("you don't have access to the hosted zone {domain}")]
    ZoneAccess {
        domain: String,
        #[source]
        source: Option<AwsError>,
    },

    #[error("failed to commit record change for {hostname}: {source}")]
    ChangeNotCommitted { hostname: String, source: AwsError },

    #[error("expected exactly one service {service} in cluster {cluster}, found {found}")]
    ServiceCount {
        cluster: String,
        service: String,
        found: usize,
    },

    #[error("could not find task definition in service: {0}")]
    TaskDefinitionRef(#[from] ParseTaskDefinitionRefError),

    #[error("no task definitions found for family {0}")]
    NoTaskDefinitions(String),

    #[error("service {service} did not stabilize after {attempts} checks")]
    RolloutTimeout { service: String, attempts: u32 },

    #[error("invalid hostname: {0}")]
    HostName(#[from] HostNameError),

    #[error("invalid image tag: {0}")]
    ImageTag(#[from] ImageTagError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("instance metadata: {0}")]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Aws(#[from] AwsError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No permission on the target resource.
    Access,
    /// The cloud state did not match what the operation requires.
    Precondition,
    /// A rollout did not converge within its polling budget.
    Timeout,
    /// A change submission was rejected.
    Commit,
    /// Bad input or configuration.
    Usage,
    /// A control plane or metadata call failed.
    Remote,
}

impl Error {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ZoneAccess { .. } => ErrorKind::Access,
            Error::Aws(e) if e.is_access_denied() => ErrorKind::Access,
            Error::ServiceCount { .. }
            | Error::TaskDefinitionRef(_)
            | Error::NoTaskDefinitions(_) => ErrorKind::Precondition,
            Error::RolloutTimeout { .. } => ErrorKind::Timeout,
            Error::ChangeNotCommitted { .. } => ErrorKind::Commit,
            Error::HostName(_)
            | Error::ImageTag(_)
            | Error::InvalidArgument(_)
            | Error::MissingEnvVar(_) => ErrorKind::Usage,
            Error::Metadata(_) | Error::Aws(_) => ErrorKind::Remote,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
