//! Kubernetes cluster models

use super::{NodePoolSpec, PlacementParam, SpecKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Cluster role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterType {
    #[serde(alias = "management", alias = "Management")]
    Management,
    #[serde(alias = "workload", alias = "Workload")]
    Workload,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::Management => "MANAGEMENT",
            ClusterType::Workload => "WORKLOAD",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MANAGEMENT" => Ok(ClusterType::Management),
            "WORKLOAD" => Ok(ClusterType::Workload),
            other => Err(format!("unknown cluster type {}", other)),
        }
    }
}

/// Name + free-form properties entry (CNI plugins, template CSI entries)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamedProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// CSI-specific properties
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CsiProperties {
    /// `ds:///vmfs/volumes/<id>/` for vsphere-csi
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore_url: Option<String>,
    /// Overwritten from inventory during validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore_name: Option<String>,
    #[serde(rename = "serverIP", default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_path: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

pub const CSI_VSPHERE: &str = "vsphere-csi";
pub const CSI_NFS_CLIENT: &str = "nfs_client";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CsiEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: CsiProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolProperties {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Repository name on input, repository id after validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

pub const TOOL_HARBOR: &str = "harbor";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ToolProperties>,
}

/// `clusterConfig` block of a cluster spec
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfigSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cni: Vec<NamedProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csi: Vec<CsiEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolEntry>,
    /// Base64 kubeconfig, present on server records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kube_config: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Declarative cluster spec (`kind: cluster`), also the create request body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "password")]
    pub cluster_password: String,
    #[serde(default, alias = "templateId")]
    pub cluster_template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<ClusterType>,
    #[serde(default)]
    pub hcx_cloud_url: String,
    #[serde(rename = "endpointIP", default)]
    pub endpoint_ip: String,
    /// Required iff `cluster_type` is WORKLOAD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_cluster_id: Option<String>,
    #[serde(default)]
    pub vm_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default)]
    pub master_nodes: Vec<NodePoolSpec>,
    #[serde(default)]
    pub worker_nodes: Vec<NodePoolSpec>,
    #[serde(default)]
    pub placement_params: Vec<PlacementParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<ClusterConfigSpec>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ClusterSpec {
    /// Copy suitable for a request body (drops the document discriminator)
    pub fn for_wire(&self) -> Self {
        let mut wire = self.clone();
        wire.kind = None;
        for node in wire.master_nodes.iter_mut().chain(wire.worker_nodes.iter_mut()) {
            node.kind = None;
        }
        wire
    }

    /// Every master and worker entry, masters first
    pub fn all_nodes(&self) -> impl Iterator<Item = &NodePoolSpec> {
        self.master_nodes.iter().chain(self.worker_nodes.iter())
    }

    pub fn all_nodes_mut(&mut self) -> impl Iterator<Item = &mut NodePoolSpec> {
        self.master_nodes.iter_mut().chain(self.worker_nodes.iter_mut())
    }
}

/// Cluster record as returned by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    pub id: String,
    #[serde(alias = "name")]
    pub cluster_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<ClusterType>,
    pub vim_id: String,
    pub hcx_cloud_url: String,
    #[serde(rename = "endpointIP")]
    pub endpoint_ip: String,
    pub cluster_template_id: String,
    pub status: String,
    pub active_tasks_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_cluster_id: Option<String>,
    pub cluster_url: String,
    pub master_nodes: Vec<NodePoolSpec>,
    pub worker_nodes: Vec<NodePoolSpec>,
    pub placement_params: Vec<PlacementParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_config: Option<ClusterConfigSpec>,
}

impl Cluster {
    pub fn is_management(&self) -> bool {
        self.cluster_type == Some(ClusterType::Management)
    }

    pub fn kube_config(&self) -> Option<&str> {
        self.cluster_config
            .as_ref()
            .and_then(|c| c.kube_config.as_deref())
            .filter(|k| !k.is_empty())
    }
}

/// Body for the cluster password change endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPasswordChange {
    pub existing_cluster_password: String,
    pub cluster_password: String,
}
