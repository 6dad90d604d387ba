//! VIM tenant and inventory operations for MockTcaClient

use super::{body_of, MockTcaClient};
use crate::common::paths;
use crate::error::{Result, TcaError};
use crate::models::*;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

pub async fn list_vims(client: &MockTcaClient, cancel: &CancellationToken) -> Result<Vec<VimTenant>> {
    client.record(Method::GET, paths::VIM_TENANTS, None, cancel)?;
    Ok(client.vims.lock().unwrap().clone())
}

pub async fn get_vim(client: &MockTcaClient, vim_id: &str, cancel: &CancellationToken) -> Result<VimTenant> {
    let path = paths::vim_tenant(vim_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .vims
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.vim_id == vim_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn register_vim(client: &MockTcaClient, spec: &CloudProviderSpec, cancel: &CancellationToken) -> Result<VimTenant> {
    client.record(Method::POST, paths::VIM_TENANTS, body_of(&spec.for_wire()), cancel)?;
    let mut vims = client.vims.lock().unwrap();
    if vims.iter().any(|t| t.vim_name == spec.vim_name) {
        return Err(TcaError::ServerRejected {
            messages: vec![format!("vim {} already registered", spec.vim_name)],
            path: paths::VIM_TENANTS.to_string(),
            status: 409,
        });
    }
    let tenant = VimTenant {
        tenant_id: MockTcaClient::new_id(),
        vim_id: format!("vmware_{}", uuid::Uuid::new_v4().simple()),
        vim_name: spec.vim_name.clone(),
        tenant_name: spec.tenant_name.clone().unwrap_or_default(),
        vim_type: VimType::Vc,
        hcx_cloud_url: spec.hcx_cloud_url.clone(),
        hcx_uuid: MockTcaClient::new_id(),
        username: spec.username.clone(),
        vim_conn: Some(VimConnection {
            status: "ok".to_string(),
            remarks: None,
        }),
        location: spec.location.clone(),
        ..Default::default()
    };
    vims.push(tenant.clone());
    Ok(tenant)
}

pub async fn delete_vim(client: &MockTcaClient, tenant_id: &str, cancel: &CancellationToken) -> Result<()> {
    let path = paths::vim_tenant_delete(tenant_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut vims = client.vims.lock().unwrap();
    let before = vims.len();
    vims.retain(|t| t.tenant_id != tenant_id);
    if vims.len() == before {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(())
}

pub async fn query_containers(client: &MockTcaClient, query: &ContainerQuery, cancel: &CancellationToken) -> Result<Vec<InventoryContainer>> {
    client.record(Method::POST, paths::INVENTORY_CONTAINERS, body_of(query), cancel)?;
    let inventories = client.inventories.lock().unwrap();
    let inventory = inventories
        .get(&query.vim_id)
        .ok_or_else(|| MockTcaClient::not_found(paths::INVENTORY_CONTAINERS))?;
    Ok(match query.container_type {
        ContainerType::ClusterComputeResource => inventory.compute_clusters.clone(),
        ContainerType::Folder => inventory.folders.clone(),
        ContainerType::ResourcePool => inventory.resource_pools.clone(),
    })
}

pub async fn query_networks(client: &MockTcaClient, query: &NetworkQuery, cancel: &CancellationToken) -> Result<Vec<VimNetwork>> {
    client.record(Method::POST, paths::NETWORKS, body_of(query), cancel)?;
    let vim_id = client
        .vims
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.tenant_id == query.tenant_id)
        .map(|t| t.vim_id.clone())
        .ok_or_else(|| MockTcaClient::not_found(paths::NETWORKS))?;
    client
        .inventories
        .lock()
        .unwrap()
        .get(&vim_id)
        .map(|i| i.networks.clone())
        .ok_or_else(|| MockTcaClient::not_found(paths::NETWORKS))
}

pub async fn query_vm_templates(client: &MockTcaClient, query: &VmTemplateQuery, cancel: &CancellationToken) -> Result<Vec<VmTemplate>> {
    client.record(Method::POST, paths::VM_TEMPLATES, body_of(query), cancel)?;
    client
        .inventories
        .lock()
        .unwrap()
        .get(&query.cloud_urn)
        .map(|i| i.vm_templates.clone())
        .ok_or_else(|| MockTcaClient::not_found(paths::VM_TEMPLATES))
}
