// ABOUTME: Registers the running instance's address under a DNS name.
// ABOUTME: Resolves the hosted zone, reads instance metadata, and upserts an A record.

use crate::aws::{AddressRecord, ChangeInfo, DnsOps};
use crate::error::{Error, Result};
use crate::metadata::{AddressScope, MetadataSource};
use crate::output::Output;
use crate::types::HostName;
use std::net::Ipv4Addr;

pub const DEFAULT_TTL: u32 = 600;

/// What to register.
#[derive(Debug, Clone)]
pub struct PresenceRequest {
    pub hostname: HostName,
    pub scope: AddressScope,
    pub ttl: u32,
}

/// The record that was committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub zone_id: String,
    pub address: Ipv4Addr,
    pub change: ChangeInfo,
}

/// Upsert an A record for `request.hostname` pointing at this instance.
pub async fn register_presence<D, M>(
    dns: &D,
    metadata: &M,
    request: &PresenceRequest,
    output: &Output,
) -> Result<Registration>
where
    D: DnsOps + ?Sized,
    M: MetadataSource + ?Sized,
{
    let domain = request.hostname.zone_domain();

    let zone = match dns.find_hosted_zone(domain).await {
        Ok(Some(zone)) => zone,
        Ok(None) => {
            return Err(Error::ZoneAccess {
                domain: domain.to_string(),
                source: None,
            });
        }
        Err(e) if e.is_access_denied() => {
            return Err(Error::ZoneAccess {
                domain: domain.to_string(),
                source: Some(e),
            });
        }
        Err(e) => return Err(e.into()),
    };
    output.progress(&format!("Zone id: {}", zone.id));

    let address = metadata.instance_address(request.scope).await?;
    tracing::info!(scope = %request.scope, %address, "Resolved instance address");

    let record = AddressRecord {
        name: request.hostname.to_string(),
        address,
        ttl: request.ttl,
    };

    let change = dns
        .upsert_record(&zone.id, &record)
        .await
        .map_err(|source| Error::ChangeNotCommitted {
            hostname: record.name.clone(),
            source,
        })?;

    Ok(Registration {
        zone_id: zone.id,
        address,
        change,
    })
}
