// ABOUTME: Control-plane seams for Route53 and ECS plus their SDK adapters.
// ABOUTME: Operations depend on DnsOps/EcsOps so tests can substitute fakes.

mod context;
mod ecs;
mod error;
mod route53;

pub use context::AwsContext;
pub use ecs::{DeploymentStatus, EcsClient, EcsOps, ServiceDescription, TaskDefinition, TaskSettings};
pub use error::{AwsError, classify};
pub use route53::{AddressRecord, ChangeInfo, DnsOps, HostedZone, Route53Client};
