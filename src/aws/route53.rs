// ABOUTME: Route53 hosted zone lookup and A record upserts.
// ABOUTME: DnsOps trait plus the SDK-backed Route53Client implementation.

use super::error::AwsError;
use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use std::net::Ipv4Addr;

/// A hosted zone as returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Bare zone id, without the `/hostedzone/` prefix.
    pub id: String,
    pub name: String,
}

/// A single-value A record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub name: String,
    pub address: Ipv4Addr,
    pub ttl: u32,
}

/// Status of a submitted change batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInfo {
    pub id: String,
    /// `PENDING` or `INSYNC`.
    pub status: String,
}

/// DNS control plane operations.
#[async_trait]
pub trait DnsOps: Send + Sync {
    /// Find the hosted zone named exactly `domain`.
    ///
    /// Returns `Ok(None)` when no visible zone has that name.
    async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>, AwsError>;

    /// Create or replace an A record in the zone.
    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &AddressRecord,
    ) -> Result<ChangeInfo, AwsError>;
}

/// Route53 client for presence registration.
pub struct Route53Client {
    client: Client,
}

impl Route53Client {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Strip the `/hostedzone/` or `/change/` prefix Route53 puts on ids.
fn bare_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Compare zone names ignoring the trailing root dot and case.
fn same_zone_name(zone_name: &str, domain: &str) -> bool {
    zone_name
        .trim_end_matches('.')
        .eq_ignore_ascii_case(domain.trim_end_matches('.'))
}

#[async_trait]
impl DnsOps for Route53Client {
    async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>, AwsError> {
        let response = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(domain)
            .max_items(1)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk("ListHostedZonesByName", e))?;

        // The listing starts at `domain` but continues with later names
        let zone = response
            .hosted_zones()
            .iter()
            .find(|zone| same_zone_name(zone.name(), domain))
            .map(|zone| HostedZone {
                id: bare_id(zone.id()).to_string(),
                name: zone.name().trim_end_matches('.').to_string(),
            });

        tracing::debug!(domain, found = zone.is_some(), "Looked up hosted zone");
        Ok(zone)
    }

    async fn upsert_record(
        &self,
        zone_id: &str,
        record: &AddressRecord,
    ) -> Result<ChangeInfo, AwsError> {
        const OPERATION: &str = "ChangeResourceRecordSets";

        let value = ResourceRecord::builder()
            .value(record.address.to_string())
            .build()
            .map_err(|e| AwsError::invalid_request(OPERATION, e))?;

        let record_set = ResourceRecordSet::builder()
            .name(&record.name)
            .r#type(RrType::A)
            .ttl(i64::from(record.ttl))
            .resource_records(value)
            .build()
            .map_err(|e| AwsError::invalid_request(OPERATION, e))?;

        let change = Change::builder()
            .action(ChangeAction::Upsert)
            .resource_record_set(record_set)
            .build()
            .map_err(|e| AwsError::invalid_request(OPERATION, e))?;

        let batch = ChangeBatch::builder()
            .comment(format!("convoy presence for {}", record.name))
            .changes(change)
            .build()
            .map_err(|e| AwsError::invalid_request(OPERATION, e))?;

        let response = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| AwsError::from_sdk(OPERATION, e))?;

        let info = response
            .change_info()
            .ok_or_else(|| AwsError::missing(OPERATION, "ChangeInfo"))?;

        Ok(ChangeInfo {
            id: bare_id(info.id()).to_string(),
            status: info.status().as_str().to_string(),
        })
    }
}
