//! Node pool models
//!
//! `NodePoolSpec` is used both for the master/worker entries embedded in a cluster
//! spec and for standalone node-pool create/update requests.

use super::SpecKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Placement object families that are checked against VIM inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementType {
    Folder,
    Datastore,
    ResourcePool,
    ClusterComputeResource,
}

impl PlacementType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Folder" => Some(PlacementType::Folder),
            "Datastore" => Some(PlacementType::Datastore),
            "ResourcePool" => Some(PlacementType::ResourcePool),
            "ClusterComputeResource" => Some(PlacementType::ClusterComputeResource),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementType::Folder => "Folder",
            PlacementType::Datastore => "Datastore",
            PlacementType::ResourcePool => "ResourcePool",
            PlacementType::ClusterComputeResource => "ClusterComputeResource",
        }
    }

    /// Category name used in validation messages
    pub fn category(&self) -> &'static str {
        match self {
            PlacementType::Folder => "folder",
            PlacementType::Datastore => "datastore",
            PlacementType::ResourcePool => "resource-pool",
            PlacementType::ClusterComputeResource => "compute",
        }
    }
}

impl fmt::Display for PlacementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed name/type pair describing where a node is materialized
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: String,
}

impl PlacementParam {
    pub fn new(name: impl Into<String>, placement: PlacementType) -> Self {
        Self {
            name: name.into(),
            param_type: placement.as_str().to_string(),
        }
    }

    /// Typed view of `param_type`; `None` for types the client does not check
    pub fn placement_type(&self) -> Option<PlacementType> {
        PlacementType::parse(&self.param_type)
    }
}

/// Node network attachment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetwork {
    #[serde(default)]
    pub label: String,
    /// Port-group short name or full `/Datacenter/network/<pg>` path
    #[serde(default)]
    pub network_name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CloneMode {
    #[serde(rename = "linkedClone")]
    LinkedClone,
    #[serde(rename = "fullClone")]
    FullClone,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpuManagerPolicy {
    #[serde(rename = "type", default)]
    pub policy_type: String,
    #[serde(default)]
    pub policy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnhealthyCondition {
    #[serde(rename = "type", default)]
    pub condition_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timeout: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_start_timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unhealthy_conditions: Vec<UnhealthyCondition>,
}

/// CPU-manager and health-check policy attached to a pool
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_manager_policy: Option<CpuManagerPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheck>,
}

/// Node pool spec (standalone `kind: node_pool` document or cluster master/worker entry)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpu: u32,
    /// Memory in MB
    #[serde(default)]
    pub memory: u64,
    /// Storage in GB
    #[serde(default)]
    pub storage: u64,
    #[serde(default)]
    pub replica: u32,
    /// Ordered `key=value` tags; the first carries the canonical type tag
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<NodeNetwork>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placement_params: Vec<PlacementParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_mode: Option<CloneMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NodePoolSpec {
    /// Copy suitable for a request body (drops the document discriminator)
    pub fn for_wire(&self) -> Self {
        Self {
            kind: None,
            ..self.clone()
        }
    }

    /// Label value for `key`, e.g. `type` from `type=hwaccel`
    pub fn label_value(&self, key: &str) -> Option<&str> {
        self.labels.iter().find_map(|l| {
            l.split_once('=')
                .filter(|(k, _)| k.trim() == key)
                .map(|(_, v)| v.trim())
        })
    }
}

/// A VM backing a node pool
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeInstance {
    pub ip: String,
    pub vm_name: String,
}

/// Node pool record as returned by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePool {
    pub id: String,
    pub name: String,
    pub cpu: u32,
    pub memory: u64,
    pub storage: u64,
    pub replica: u32,
    pub labels: Vec<String>,
    pub networks: Vec<NodeNetwork>,
    pub placement_params: Vec<PlacementParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_mode: Option<CloneMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    pub status: String,
    pub nodes: Vec<NodeInstance>,
    pub is_node_customization_deprecated: bool,
}

/// Node pool list envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePoolList {
    pub items: Vec<NodePool>,
}
