// ABOUTME: Polls a service until its rollout converges or the budget runs out.
// ABOUTME: Fixed attempts and interval, no backoff; sleeps on the tokio clock.

use crate::aws::{EcsOps, ServiceDescription};
use crate::error::{Error, Result};
use crate::output::Output;
use std::time::Duration;

/// How long to wait for a service to settle after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutPolicy {
    /// Number of describe calls before giving up.
    pub max_attempts: u32,
    /// Pause after every unsettled check.
    pub interval: Duration,
}

impl Default for RolloutPolicy {
    /// 120 checks, 5 seconds apart: roughly ten minutes.
    fn default() -> Self {
        Self {
            max_attempts: 120,
            interval: Duration::from_secs(5),
        }
    }
}

impl RolloutPolicy {
    /// A service has converged once a single deployment remains and it runs
    /// as many tasks as it wants.
    pub fn is_converged(service: &ServiceDescription) -> bool {
        match service.deployments.as_slice() {
            [only] => only.running_count == only.desired_count,
            _ => false,
        }
    }
}

/// Describe `service` and require exactly one match.
///
/// A missing cluster or service reported as an API error counts as zero matches.
pub async fn describe_single_service<E>(
    ecs: &E,
    cluster: &str,
    service: &str,
) -> Result<ServiceDescription>
where
    E: EcsOps + ?Sized,
{
    let mut services = match ecs.describe_services(cluster, service).await {
        Ok(services) => services,
        Err(e) if e.is_not_found() => {
            tracing::debug!(error = %e, "Service lookup reported not found");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    if services.len() != 1 {
        return Err(Error::ServiceCount {
            cluster: cluster.to_string(),
            service: service.to_string(),
            found: services.len(),
        });
    }
    Ok(services.remove(0))
}

/// Poll until the service converges.
///
/// Returns the number of checks it took. Every API error is fatal.
pub async fn wait_for_steady_state<E>(
    ecs: &E,
    cluster: &str,
    service: &str,
    policy: &RolloutPolicy,
    output: &Output,
) -> Result<u32>
where
    E: EcsOps + ?Sized,
{
    for attempt in 1..=policy.max_attempts {
        let current = describe_single_service(ecs, cluster, service).await?;
        if RolloutPolicy::is_converged(&current) {
            tracing::debug!(service, attempt, "Rollout converged");
            return Ok(attempt);
        }

        for deployment in &current.deployments {
            output.progress(&format!(
                "{} {}/{}",
                deployment.task_definition, deployment.running_count, deployment.desired_count
            ));
        }
        output.progress("");

        tokio::time::sleep(policy.interval).await;
    }

    Err(Error::RolloutTimeout {
        service: service.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::DeploymentStatus;

    fn service(deployments: &[(i32, i32)]) -> ServiceDescription {
        ServiceDescription {
            task_definition: "arn:aws:ecs:us-east-1:1:task-definition/web:9".to_string(),
            deployments: deployments
                .iter()
                .map(|&(running, desired)| DeploymentStatus {
                    task_definition: "arn:aws:ecs:us-east-1:1:task-definition/web:9".to_string(),
                    desired_count: desired,
                    running_count: running,
                })
                .collect(),
        }
    }

    #[test]
    fn converged_with_single_full_deployment() {
        assert!(RolloutPolicy::is_converged(&service(&[(3, 3)])));
    }

    #[test]
    fn not_converged_while_scaling() {
        assert!(!RolloutPolicy::is_converged(&service(&[(2, 3)])));
    }

    #[test]
    fn not_converged_with_two_deployments() {
        assert!(!RolloutPolicy::is_converged(&service(&[(3, 3), (0, 0)])));
    }

    #[test]
    fn not_converged_without_deployments() {
        assert!(!RolloutPolicy::is_converged(&service(&[])));
    }

    #[test]
    fn default_policy_is_ten_minutes() {
        let policy = RolloutPolicy::default();
        assert_eq!(policy.max_attempts, 120);
        assert_eq!(policy.interval * policy.max_attempts, Duration::from_secs(600));
    }
}
