// ABOUTME: Structured task definition references parsed from ARNs.
// ABOUTME: Extracts family and revision from task-definition/<family>:<revision>.

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

const RESOURCE_PREFIX: &str = "task-definition/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseTaskDefinitionRefError {
    #[error("not a task definition identifier: {0}")]
    MissingResource(String),

    #[error("task definition identifier has no revision: {0}")]
    MissingRevision(String),

    #[error("task definition identifier has an empty family: {0}")]
    EmptyFamily(String),

    #[error("invalid task definition revision in {input}: {source}")]
    InvalidRevision {
        input: String,
        source: ParseIntError,
    },
}

/// One immutable revision of a task definition family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskDefinitionRef {
    family: String,
    revision: u32,
}

impl TaskDefinitionRef {
    pub fn new(family: impl Into<String>, revision: u32) -> Self {
        Self {
            family: family.into(),
            revision,
        }
    }

    /// Parse `arn:aws:ecs:<region>:<account>:task-definition/<family>:<revision>`.
    pub fn from_arn(arn: &str) -> Result<Self, ParseTaskDefinitionRefError> {
        let arn = arn.trim();
        let (_, resource) = arn
            .split_once(RESOURCE_PREFIX)
            .ok_or_else(|| ParseTaskDefinitionRefError::MissingResource(arn.to_string()))?;

        let (family, revision) = resource
            .rsplit_once(':')
            .ok_or_else(|| ParseTaskDefinitionRefError::MissingRevision(arn.to_string()))?;

        if family.is_empty() {
            return Err(ParseTaskDefinitionRefError::EmptyFamily(arn.to_string()));
        }

        let revision = revision
            .parse::<u32>()
            .map_err(|source| ParseTaskDefinitionRefError::InvalidRevision {
                input: arn.to_string(),
                source,
            })?;

        Ok(Self::new(family, revision))
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }
}

impl fmt::Display for TaskDefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.revision)
    }
}

/// Pick the newest revision of exactly `family` out of a listing.
///
/// Family prefix listings also return families that merely share the
/// prefix (`web` matches `web-worker`), and unparseable entries are skipped.
pub fn newest_revision<'a, I>(family: &str, arns: I) -> Option<(&'a str, TaskDefinitionRef)>
where
    I: IntoIterator<Item = &'a String>,
{
    arns.into_iter()
        .filter_map(|arn| {
            TaskDefinitionRef::from_arn(arn)
                .ok()
                .map(|parsed| (arn.as_str(), parsed))
        })
        .filter(|(_, parsed)| parsed.family() == family)
        .max_by_key(|(_, parsed)| parsed.revision())
}
