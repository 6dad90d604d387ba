//! VIM inventory models

use serde::{Deserialize, Serialize};

/// Container families served by the inventory containers endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContainerType {
    ClusterComputeResource,
    Folder,
    ResourcePool,
}

/// Body for `POST /hybridity/api/service/inventory/containers`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerQuery {
    pub vim_id: String,
    pub container_type: ContainerType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DatastoreSummary {
    pub capacity: u64,
    pub free_space: u64,
    pub accessible: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Datastore {
    pub entity_id: String,
    pub name: String,
    /// `ds:///vmfs/volumes/<vsan-id>/`
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DatastoreSummary>,
}

/// Compute cluster, folder or resource pool
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryContainer {
    pub entity_id: String,
    pub name: String,
    pub entity_type: String,
    pub full_path: String,
    /// Only populated for compute clusters
    pub datastores: Vec<Datastore>,
}

/// Body for `POST /hybridity/api/nfv/networks`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkQuery {
    pub tenant_id: String,
}

/// Distributed virtual port-group
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VimNetwork {
    pub id: String,
    pub name: String,
    /// `/Datacenter/network/<pg>`
    pub full_network_path: String,
    pub dvs_name: String,
    pub network_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworksResponse {
    pub networks: Vec<VimNetwork>,
}

/// Body for `POST /hybridity/api/infra/inventory/vc/templates`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VmTemplateQuery {
    pub cloud_urn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VmTemplate {
    pub entity_id: String,
    pub name: String,
    pub full_path: String,
    pub guest_os: String,
    pub k8s_version: String,
}
