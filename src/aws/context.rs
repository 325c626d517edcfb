// ABOUTME: Shared AWS SDK configuration loaded once per process.
// ABOUTME: Builds ECS and Route53 clients from explicit settings.

use crate::config::AwsSettings;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use std::sync::Arc;

/// Loaded AWS configuration shared by every client of a run.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
}

impl AwsContext {
    /// Load AWS configuration for the given settings.
    ///
    /// Static keys from the settings take precedence; otherwise credentials
    /// come from the SDK's default provider chain.
    pub async fn load(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let Some(keys) = &settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                keys.access_key_id.clone(),
                keys.secret_access_key.clone(),
                None,
                None,
                "convoy-environment",
            ));
        }

        let config = loader.load().await;
        tracing::debug!(region = %settings.region, "Loaded AWS configuration");

        Self {
            config: Arc::new(config),
        }
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn ecs_client(&self) -> aws_sdk_ecs::Client {
        aws_sdk_ecs::Client::new(self.sdk_config())
    }

    pub fn route53_client(&self) -> aws_sdk_route53::Client {
        aws_sdk_route53::Client::new(self.sdk_config())
    }
}
