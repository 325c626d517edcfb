// ABOUTME: In-memory fakes for the DNS, ECS, and metadata seams.
// ABOUTME: Scripted responses in, recorded calls out.

#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_ecs::types::ContainerDefinition;
use convoy::aws::{
    AddressRecord, AwsError, ChangeInfo, DeploymentStatus, DnsOps, EcsOps, HostedZone,
    ServiceDescription, TaskDefinition, TaskSettings, classify,
};
use convoy::metadata::{AddressScope, MetadataError, MetadataSource};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;

pub fn arn(family: &str, revision: u32) -> String {
    format!("arn:aws:ecs:us-east-1:123456789012:task-definition/{family}:{revision}")
}

pub fn access_denied(operation: &'static str) -> AwsError {
    classify(
        operation,
        Some("AccessDenied".to_string()),
        "User is not authorized".to_string(),
    )
}

pub fn service(task_definition: &str, deployments: &[(&str, i32, i32)]) -> ServiceDescription {
    ServiceDescription {
        task_definition: task_definition.to_string(),
        deployments: deployments
            .iter()
            .map(|&(task_definition, running, desired)| DeploymentStatus {
                task_definition: task_definition.to_string(),
                desired_count: desired,
                running_count: running,
            })
            .collect(),
    }
}

pub fn container(name: &str, image: &str) -> ContainerDefinition {
    ContainerDefinition::builder()
        .name(name)
        .image(image)
        .memory(256)
        .essential(true)
        .build()
}

/// A recorded mutating call.
#[derive(Debug, Clone, PartialEq)]
pub enum EcsCall {
    UpdateService {
        cluster: String,
        service: String,
        task_definition: String,
    },
    Register(TaskDefinition),
    Deregister(String),
}

/// ECS fake with scripted describe responses.
///
/// Each describe call pops the next scripted response; once one response is
/// left it is repeated forever.
#[derive(Default)]
pub struct FakeEcs {
    describes: Mutex<VecDeque<Vec<ServiceDescription>>>,
    describe_count: Mutex<u32>,
    listings: Mutex<HashMap<String, Vec<String>>>,
    definitions: Mutex<HashMap<String, TaskDefinition>>,
    next_revision: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<EcsCall>>,
    fail_update: Mutex<Option<AwsError>>,
    fail_describe: Mutex<Option<AwsError>>,
}

impl FakeEcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_describe(&self, response: Vec<ServiceDescription>) -> &Self {
        self.describes.lock().push_back(response);
        self
    }

    pub fn set_listing(&self, prefix: &str, arns: Vec<String>) -> &Self {
        self.listings.lock().insert(prefix.to_string(), arns);
        self
    }

    pub fn add_definition(&self, arn: &str, definition: TaskDefinition, next_revision: u32) {
        self.next_revision
            .lock()
            .insert(definition.family.clone(), next_revision);
        self.definitions.lock().insert(arn.to_string(), definition);
    }

    pub fn fail_update_with(&self, error: AwsError) {
        *self.fail_update.lock() = Some(error);
    }

    pub fn fail_describe_with(&self, error: AwsError) {
        *self.fail_describe.lock() = Some(error);
    }

    pub fn describe_count(&self) -> u32 {
        *self.describe_count.lock()
    }

    pub fn calls(&self) -> Vec<EcsCall> {
        self.calls.lock().clone()
    }

    pub fn registered(&self) -> Vec<TaskDefinition> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EcsCall::Register(definition) => Some(definition),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EcsOps for FakeEcs {
    async fn describe_services(
        &self,
        _cluster: &str,
        _service: &str,
    ) -> Result<Vec<ServiceDescription>, AwsError> {
        *self.describe_count.lock() += 1;
        if let Some(error) = self.fail_describe.lock().take() {
            return Err(error);
        }
        let mut describes = self.describes.lock();
        let response = if describes.len() > 1 {
            describes.pop_front()
        } else {
            describes.front().cloned()
        };
        Ok(response.unwrap_or_default())
    }

    async fn list_task_definitions(&self, family_prefix: &str) -> Result<Vec<String>, AwsError> {
        Ok(self
            .listings
            .lock()
            .get(family_prefix)
            .cloned()
            .unwrap_or_default())
    }

    async fn describe_task_definition(&self, arn: &str) -> Result<TaskDefinition, AwsError> {
        self.definitions.lock().get(arn).cloned().ok_or_else(|| {
            classify(
                "DescribeTaskDefinition",
                Some("ClientException".to_string()),
                format!("Unable to describe task definition {arn}"),
            )
        })
    }

    async fn register_task_definition(
        &self,
        definition: &TaskDefinition,
    ) -> Result<String, AwsError> {
        self.calls.lock().push(EcsCall::Register(definition.clone()));
        let mut revisions = self.next_revision.lock();
        let revision = revisions.entry(definition.family.clone()).or_insert(1);
        let registered = arn(&definition.family, *revision);
        *revision += 1;
        Ok(registered)
    }

    async fn deregister_task_definition(&self, arn: &str) -> Result<(), AwsError> {
        self.calls.lock().push(EcsCall::Deregister(arn.to_string()));
        Ok(())
    }

    async fn update_service(
        &self,
        cluster: &str,
        service: &str,
        task_definition: &str,
    ) -> Result<(), AwsError> {
        if let Some(error) = self.fail_update.lock().take() {
            return Err(error);
        }
        self.calls.lock().push(EcsCall::UpdateService {
            cluster: cluster.to_string(),
            service: service.to_string(),
            task_definition: task_definition.to_string(),
        });
        Ok(())
    }
}

pub fn definition(family: &str, containers: Vec<ContainerDefinition>) -> TaskDefinition {
    TaskDefinition {
        family: family.to_string(),
        container_definitions: containers,
        settings: TaskSettings {
            task_role_arn: Some("arn:aws:iam::123456789012:role/web-task".to_string()),
            cpu: Some("256".to_string()),
            memory: Some("512".to_string()),
            ..Default::default()
        },
    }
}

/// Outcome a fake DNS lookup should produce.
pub enum ZoneLookup {
    Found(HostedZone),
    Missing,
    Denied,
}

pub struct FakeDns {
    lookup: ZoneLookup,
    reject_upsert: bool,
    pub looked_up: Mutex<Vec<String>>,
    pub upserts: Mutex<Vec<(String, AddressRecord)>>,
}

impl FakeDns {
    pub fn new(lookup: ZoneLookup) -> Self {
        Self {
            lookup,
            reject_upsert: false,
            looked_up: Mutex::new(Vec::new()),
            upserts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_zone(id: &str, name: &str) -> Self {
        Self::new(ZoneLookup::Found(HostedZone {
            id: id.to_string(),
            name: name.to_string(),
        }))
    }

    pub fn rejecting_upserts(mut self) -> Self {
        self.reject_upsert = true;
        self
    }
}

#[async_trait]
impl DnsOps for FakeDns {
    async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>, AwsError> {
        self.looked_up.lock().push(domain.to_string());
        match &self.lookup {
            ZoneLookup::Found(zone) => Ok(Some(zone.clone())),
            ZoneLookup::Missing => Ok(None),
            ZoneLookup::Denied => Err(access_denied("ListHostedZonesByName")),
        }
    }

    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &AddressRecord,
    ) -> Result<ChangeInfo, AwsError> {
        if self.reject_upsert {
            return Err(classify(
                "ChangeResourceRecordSets",
                Some("InvalidChangeBatch".to_string()),
                "RRSet of type CNAME already exists".to_string(),
            ));
        }
        self.upserts
            .lock()
            .push((zone_id.to_string(), record.clone()));
        Ok(ChangeInfo {
            id: "C2682N5HXP0BZ4".to_string(),
            status: "PENDING".to_string(),
        })
    }
}

pub struct FakeMetadata {
    pub local: Ipv4Addr,
    pub public: Ipv4Addr,
    pub requested: Mutex<Vec<AddressScope>>,
}

impl FakeMetadata {
    pub fn new(local: Ipv4Addr, public: Ipv4Addr) -> Self {
        Self {
            local,
            public,
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MetadataSource for FakeMetadata {
    async fn instance_address(&self, scope: AddressScope) -> Result<Ipv4Addr, MetadataError> {
        self.requested.lock().push(scope);
        Ok(match scope {
            AddressScope::Local => self.local,
            AddressScope::Public => self.public,
        })
    }
}
