// ABOUTME: Process configuration resolved once from the environment and CLI.
// ABOUTME: Region, static credentials, and the instance metadata endpoint.

use crate::error::{Error, Result};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";

const REGION_VARS: &[&str] = &["AWS_EC2_REGION", "AWS_REGION"];
const METADATA_ENDPOINT_VAR: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";

/// Environment variable pairs holding static credentials, in lookup order.
/// The second pair is the legacy naming older deploy scripts export.
const CREDENTIAL_VARS: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"),
    ("AWS_ACCESS_KEY", "AWS_SECRET_KEY"),
];

/// An access key pair read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    /// `None` defers to the SDK's default provider chain.
    pub credentials: Option<StaticKeys>,
    pub metadata_endpoint: String,
}

impl AwsSettings {
    /// Resolve settings from the process environment.
    ///
    /// An explicit `region` wins over `AWS_EC2_REGION` and `AWS_REGION`.
    pub fn from_env(region: Option<&str>) -> Result<Self> {
        let region = region
            .map(str::to_string)
            .or_else(|| REGION_VARS.iter().find_map(|var| non_empty_var(var)))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let metadata_endpoint = non_empty_var(METADATA_ENDPOINT_VAR)
            .unwrap_or_else(|| DEFAULT_METADATA_ENDPOINT.to_string());

        Ok(Self {
            region,
            credentials: static_keys()?,
            metadata_endpoint,
        })
    }
}

fn static_keys() -> Result<Option<StaticKeys>> {
    for (id_var, secret_var) in CREDENTIAL_VARS {
        match (non_empty_var(id_var), non_empty_var(secret_var)) {
            (Some(access_key_id), Some(secret_access_key)) => {
                return Ok(Some(StaticKeys {
                    access_key_id,
                    secret_access_key,
                }));
            }
            (Some(_), None) => return Err(Error::MissingEnvVar(secret_var.to_string())),
            (None, Some(_)) => return Err(Error::MissingEnvVar(id_var.to_string())),
            (None, None) => {}
        }
    }
    Ok(None)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
