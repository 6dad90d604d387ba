//! Cluster template models

use super::{ClusterSpec, ClusterType, CloneMode, NamedProperties, NodeConfig, SpecKind, ToolEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateClusterConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cni: Vec<NamedProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub csi: Vec<NamedProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNetwork {
    #[serde(default)]
    pub label: String,
}

/// Master or worker entry of a template
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cpu: u32,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub storage: u64,
    #[serde(default)]
    pub replica: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<TemplateNetwork>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_mode: Option<CloneMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
}

/// Cluster template (`kind: template`), same shape on the wire and on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<ClusterType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub cluster_config: TemplateClusterConfig,
    #[serde(default)]
    pub master_nodes: Vec<TemplateNode>,
    #[serde(default)]
    pub worker_nodes: Vec<TemplateNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ClusterTemplate {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn for_wire(&self) -> Self {
        Self {
            kind: None,
            ..self.clone()
        }
    }

    /// Pool names declared by the template, masters first
    pub fn pool_names(&self) -> impl Iterator<Item = &str> {
        self.master_nodes
            .iter()
            .chain(self.worker_nodes.iter())
            .map(|n| n.name.as_str())
    }

    /// Template pool names missing from the cluster spec.
    ///
    /// The template validates the spec iff this is empty.
    pub fn missing_pools<'a>(&'a self, spec: &ClusterSpec) -> Vec<&'a str> {
        self.pool_names()
            .filter(|name| !spec.all_nodes().any(|n| n.name == *name))
            .collect()
    }
}
