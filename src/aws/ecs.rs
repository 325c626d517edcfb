// ABOUTME: ECS service and task definition operations.
// ABOUTME: EcsOps trait plus the SDK-backed EcsClient implementation.

use super::error::AwsError;
use async_trait::async_trait;
use aws_sdk_ecs::Client;
use aws_sdk_ecs::types::{
    Compatibility, ContainerDefinition, NetworkMode, SortOrder, TaskDefinitionPlacementConstraint,
    TaskDefinitionStatus, Volume,
};

/// A service as seen by a describe call.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescription {
    /// ARN of the task definition the service wants to run.
    pub task_definition: String,
    pub deployments: Vec<DeploymentStatus>,
}

/// One in-flight deployment of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStatus {
    pub task_definition: String,
    pub desired_count: i32,
    pub running_count: i32,
}

/// Task-level settings copied from one revision to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSettings {
    pub task_role_arn: Option<String>,
    pub execution_role_arn: Option<String>,
    pub network_mode: Option<NetworkMode>,
    pub volumes: Vec<Volume>,
    pub placement_constraints: Vec<TaskDefinitionPlacementConstraint>,
    pub requires_compatibilities: Vec<Compatibility>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

/// A task definition revision, or the draft of a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    pub family: String,
    pub container_definitions: Vec<ContainerDefinition>,
    pub settings: TaskSettings,
}

/// Container orchestration control plane operations.
#[async_trait]
pub trait EcsOps: Send + Sync {
    /// Describe services matching `service` in `cluster`.
    async fn describe_services(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<ServiceDescription>, AwsError>;

    /// List ARNs of ACTIVE revisions whose family starts with `family_prefix`,
    /// newest first.
    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, AwsError>;

    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, AwsError>;

    /// Register a new revision and return its ARN.
    async fn register_task_definition(
        &self,
        definition: &TaskDefinition,
    ) -> Result<String, AwsError>;

    async fn deregister_task_definition(&self, arn: &str) -> Result<(), AwsError>;

    /// Point a service at a task definition.
    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), AwsError>;
}

/// ECS client for service and task definition updates.
pub struct EcsClient {
    client: Client,
}

impl EcsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn service_description(service: &aws_sdk_ecs::types::Service) -> ServiceDescription {
    ServiceDescription {
        task_definition: service.task_definition().unwrap_or_default().to_string(),
        deployments: service
            .deployments()
            .iter()
            .map(|deployment| DeploymentStatus {
                task_definition: deployment.task_definition().unwrap_or_default().to_string(),
                desired_count: deployment.desired_count(),
                running_count: deployment.running_count(),
            })
            .collect(),
    }
}

#[async_trait]
impl EcsOps for EcsClient {
    async fn describe_services(
        &self,
        cluster: &str,
        service: &str,
    ) -> Result<Vec<ServiceDescription>, AwsError> {
        let response = self
            .client
            .describe_services()
            .cluster(cluster)
            .services(service)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("DescribeServices", e))?;

        for failure in response.failures() {
            tracing::debug!(
                arn = failure.arn().unwrap_or_default(),
                reason = failure.reason().unwrap_or_default(),
                "DescribeServices reported a failure"
            );
        }

        Ok(response.services().iter().map(service_description).collect())
    }

    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, AwsError> {
        let mut arns = Vec::new();
        let mut next_token = None;

        loop {
            let response = self
                .client
                .list_task_definitions()
                .family_prefix(family_prefix)
                .status(TaskDefinitionStatus::Active)
                .sort(SortOrder::Desc)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| AwsError::from_sdk("ListTaskDefinitions", e))?;

            arns.extend(response.task_definition_arns().iter().cloned());

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        tracing::debug!(family_prefix, count = arns.len(), "Listed task definitions");
        Ok(arns)
    }

    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, AwsError> {
        const OPERATION: &str = "DescribeTaskDefinition";

        let response = self
            .client
            .describe_task_definition()
            .task_definition(arn)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, e))?;

        let definition = response
            .task_definition
            .ok_or_else(|| AwsError::missing(OPERATION, "taskDefinition"))?;

        Ok(TaskDefinition {
            family: definition
                .family
                .ok_or_else(|| AwsError::missing(OPERATION, "family"))?,
            container_definitions: definition.container_definitions.unwrap_or_default(),
            settings: TaskSettings {
                task_role_arn: definition.task_role_arn,
                execution_role_arn: definition.execution_role_arn,
                network_mode: definition.network_mode,
                volumes: definition.volumes.unwrap_or_default(),
                placement_constraints: definition.placement_constraints.unwrap_or_default(),
                requires_compatibilities: definition.requires_compatibilities.unwrap_or_default(),
                cpu: definition.cpu,
                memory: definition.memory,
            },
        })
    }

    async fn register_task_definition(
        &self,
        definition: &TaskDefinition,
    ) -> Result<String, AwsError> {
        const OPERATION: &str = "RegisterTaskDefinition";
        let settings = &definition.settings;

        let response = self
            .client
            .register_task_definition()
            .family(&definition.family)
            .set_container_definitions(Some(definition.container_definitions.clone()))
            .set_task_role_arn(settings.task_role_arn.clone())
            .set_execution_role_arn(settings.execution_role_arn.clone())
            .set_network_mode(settings.network_mode.clone())
            .set_volumes(non_empty(&settings.volumes))
            .set_placement_constraints(non_empty(&settings.placement_constraints))
            .set_requires_compatibilities(non_empty(&settings.requires_compatibilities))
            .set_cpu(settings.cpu.clone())
            .set_memory(settings.memory.clone())
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, e))?;

        response
            .task_definition()
            .and_then(|registered| registered.task_definition_arn())
            .map(str::to_string)
            .ok_or_else(|| AwsError::missing(OPERATION, "taskDefinitionArn"))
    }

    async fn deregister_task_definition(&self, arn: &str) -> Result<(), AwsError> {
        self.client
            .deregister_task_definition()
            .task_definition(arn)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("DeregisterTaskDefinition", e))?;
        Ok(())
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), AwsError> {
        self.client
            .update_service()
            .cluster(cluster)
            .service(service)
            .task_definition(task_definition)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("UpdateService", e))?;
        Ok(())
    }
}

fn non_empty<T: Clone>(items: &[T]) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items.to_vec())
    }
}
