// ABOUTME: Container image tags and tag rewriting for image references.
// ABOUTME: Handles formats like nginx, nginx:tag, registry:5000/image:tag@digest.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageTagError {
    #[error("image tag cannot be empty")]
    Empty,

    #[error("image tag exceeds maximum length of 128 characters")]
    TooLong,

    #[error("image tag cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in image tag: '{0}'")]
    InvalidChar(char),
}

/// A docker image tag such as `v42` or `2024.06.1-rc1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageTag(String);

impl ImageTag {
    pub fn new(value: &str) -> Result<Self, ImageTagError> {
        let value = value.trim();
        let first = value.chars().next().ok_or(ImageTagError::Empty)?;

        if value.len() > 128 {
            return Err(ImageTagError::TooLong);
        }

        if first == '.' || first == '-' {
            return Err(ImageTagError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
                return Err(ImageTagError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The repository part of an image reference, without tag or digest.
///
/// A colon inside the registry host (`registry:5000/app`) is part of the
/// repository, not a tag separator.
pub fn repository(image: &str) -> &str {
    let image = image.trim();
    let without_digest = image.split_once('@').map_or(image, |(before, _)| before);

    match without_digest.rsplit_once(':') {
        Some((before, after)) if !after.contains('/') => before,
        _ => without_digest,
    }
}

/// Rewrite the tag of an image reference, dropping any existing tag or digest.
///
/// `repo:v1` becomes `repo:v2`, and an untagged `repo` becomes `repo:v2`.
pub fn retag(image: &str, tag: &ImageTag) -> String {
    format!("{}:{}", repository(image), tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(value: &str) -> ImageTag {
        ImageTag::new(value).unwrap()
    }

    #[test]
    fn repository_keeps_registry_port() {
        assert_eq!(repository("registry:5000/app:v1"), "registry:5000/app");
        assert_eq!(repository("registry:5000/app"), "registry:5000/app");
    }

    #[test]
    fn repository_drops_digest() {
        assert_eq!(repository("app@sha256:abc123"), "app");
        assert_eq!(repository("app:v1@sha256:abc123"), "app");
    }

    #[test]
    fn retag_ecr_image() {
        let image = "123456789012.dkr.ecr.us-east-1.amazonaws.com/web:v41";
        assert_eq!(
            retag(image, &tag("v42")),
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/web:v42"
        );
    }

    #[test]
    fn tag_rejects_leading_separator() {
        assert_eq!(ImageTag::new("-rc1"), Err(ImageTagError::InvalidStart('-')));
        assert_eq!(ImageTag::new(".v1"), Err(ImageTagError::InvalidStart('.')));
    }

    #[test]
    fn tag_rejects_colon() {
        assert_eq!(ImageTag::new("v1:v2"), Err(ImageTagError::InvalidChar(':')));
    }
}
