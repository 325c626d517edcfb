// ABOUTME: Rolls a service forward to the newest active revision of its family.
// ABOUTME: Submits the update, then waits for the rollout to converge.

use super::rollout::{RolloutPolicy, describe_single_service, wait_for_steady_state};
use crate::aws::EcsOps;
use crate::error::{Error, Result};
use crate::output::Output;
use crate::types::{TaskDefinitionRef, newest_revision};

/// The service to roll forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTarget {
    pub cluster: String,
    pub service: String,
}

/// What a successful update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUpdate {
    pub previous: TaskDefinitionRef,
    pub target: TaskDefinitionRef,
    pub target_arn: String,
    /// Number of checks until the rollout converged.
    pub checks: u32,
}

/// Point the service at the newest active revision and wait for it to settle.
pub async fn update_service<E>(
    ecs: &E,
    target: &ServiceTarget,
    policy: &RolloutPolicy,
    output: &Output,
) -> Result<ServiceUpdate>
where
    E: EcsOps + ?Sized,
{
    let ServiceTarget { cluster, service } = target;
    output.progress(&format!("Updating service {service}"));

    let current = describe_single_service(ecs, cluster, service).await?;
    let previous = TaskDefinitionRef::from_arn(&current.task_definition)?;
    output.progress(&format!(
        "Current task: {} version {}",
        previous.family(),
        previous.revision()
    ));

    let arns = ecs.list_task_definitions(previous.family()).await?;
    let (target_arn, newest) = newest_revision(previous.family(), &arns)
        .ok_or_else(|| Error::NoTaskDefinitions(previous.family().to_string()))?;
    let target_arn = target_arn.to_string();
    output.progress(&format!("Target task: {target_arn}"));

    if newest == previous {
        tracing::info!(%newest, "Service already references the newest revision");
    }

    ecs.update_service(cluster, service, &target_arn).await?;
    tracing::info!(%cluster, %service, %previous, target = %newest, "Submitted service update");

    let checks = wait_for_steady_state(ecs, cluster, service, policy, output).await?;

    Ok(ServiceUpdate {
        previous,
        target: newest,
        target_arn,
        checks,
    })
}
