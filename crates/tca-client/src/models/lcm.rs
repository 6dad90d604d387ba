//! CNF/VNF lifecycle models

use super::{SpecKind, TaskHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Instantiation state reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstantiationState {
    NotInstantiated,
    Instantiated,
    Terminated,
}

impl InstantiationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstantiationState::NotInstantiated => "NOT_INSTANTIATED",
            InstantiationState::Instantiated => "INSTANTIATED",
            InstantiationState::Terminated => "TERMINATED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NOT_INSTANTIATED" => Some(InstantiationState::NotInstantiated),
            "INSTANTIATED" => Some(InstantiationState::Instantiated),
            "TERMINATED" => Some(InstantiationState::Terminated),
            _ => None,
        }
    }
}

impl fmt::Display for InstantiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LcmOperationState {
    Starting,
    Processing,
    Completed,
    FailedTemp,
    Failed,
    RollingBack,
    RolledBack,
    #[serde(other)]
    Unknown,
}

/// Client-side name of every link-guarded LCM operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LcmOperation {
    Instantiate,
    Terminate,
    Rollback,
    UpdateState,
    Reconfigure,
    Retry,
    Heal,
    Scale,
}

impl LcmOperation {
    pub const ALL: [LcmOperation; 8] = [
        LcmOperation::Instantiate,
        LcmOperation::Terminate,
        LcmOperation::Rollback,
        LcmOperation::UpdateState,
        LcmOperation::Reconfigure,
        LcmOperation::Retry,
        LcmOperation::Heal,
        LcmOperation::Scale,
    ];

    /// Key of the policy link that permits this operation
    pub fn link_key(&self) -> &'static str {
        match self {
            LcmOperation::Instantiate => "instantiate",
            LcmOperation::Terminate => "terminate",
            LcmOperation::Rollback => "rollback",
            LcmOperation::UpdateState => "update_state",
            LcmOperation::Reconfigure => "reconfigure",
            LcmOperation::Retry => "retry",
            LcmOperation::Heal => "heal",
            LcmOperation::Scale => "scale",
        }
    }
}

impl fmt::Display for LcmOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.link_key())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Link {
    #[serde(default)]
    pub href: String,
}

/// Server-returned `_links` map; the only source of allowed next operations
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PolicyLinks(pub BTreeMap<String, Link>);

impl PolicyLinks {
    pub fn href(&self, op: LcmOperation) -> Option<&str> {
        self.0
            .get(op.link_key())
            .map(|l| l.href.as_str())
            .filter(|h| !h.is_empty())
    }

    pub fn allows(&self, op: LcmOperation) -> bool {
        self.href(op).is_some()
    }

    pub fn self_href(&self) -> Option<&str> {
        self.0.get("self").map(|l| l.href.as_str())
    }

    /// Every operation the server currently permits
    pub fn allowed(&self) -> Vec<LcmOperation> {
        LcmOperation::ALL
            .into_iter()
            .filter(|op| self.allows(*op))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LcmMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcm_operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcm_operation_state: Option<LcmOperationState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnf_catalog_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnf_pkg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nf_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VimConnectionExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_pool_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_pool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_profile_id: Option<String>,
}

/// One attached pool per entry
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VimConnectionInfo {
    pub id: String,
    pub vim_id: String,
    pub vim_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<VimConnectionExtra>,
}

/// LCM info record for a CNF/VNF instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LcmInfo {
    pub id: String,
    pub vnf_instance_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnf_instance_description: Option<String>,
    pub vnfd_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnf_pkg_id: Option<String>,
    pub vnf_provider: String,
    pub vnf_product_name: String,
    pub vnf_software_version: String,
    pub vnfd_version: String,
    pub instantiation_state: String,
    pub metadata: LcmMetadata,
    pub vim_connection_info: Vec<VimConnectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instantiated_vnf_info: Option<Value>,
    #[serde(rename = "_links")]
    pub links: PolicyLinks,
}

impl LcmInfo {
    pub fn state(&self) -> Option<InstantiationState> {
        InstantiationState::parse(&self.instantiation_state)
    }

    pub fn operation_state(&self) -> Option<LcmOperationState> {
        self.metadata.lcm_operation_state
    }

    pub fn catalog_name(&self) -> Option<&str> {
        self.metadata.vnf_catalog_name.as_deref()
    }

    pub fn package_id(&self) -> Option<&str> {
        self.vnf_pkg_id
            .as_deref()
            .or(self.metadata.vnf_pkg_id.as_deref())
    }

    pub fn lcm_operation(&self) -> &str {
        self.metadata.lcm_operation.as_deref().unwrap_or("UNKNOWN")
    }
}

/// Declarative CNF instance request (`kind: instance`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catalog name, descriptor id or package id
    #[serde(default)]
    pub catalog_name: String,
    #[serde(default)]
    pub cluster_name: String,
    #[serde(default)]
    pub node_pool: String,
    #[serde(default)]
    pub namespace: String,
    /// Repository name or URL; must be linked to the cluster's VIM
    #[serde(default)]
    pub repo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_name: Option<String>,
    /// Generate a unique name on collision instead of failing
    #[serde(default)]
    pub auto_name: bool,
    #[serde(default)]
    pub disable_grant: bool,
    #[serde(default)]
    pub ignore_grant_failure: bool,
    #[serde(default)]
    pub disable_auto_rollback: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnfMetadata {
    #[serde(default)]
    pub vnf_pkg_id: String,
    #[serde(default)]
    pub vnf_catalog_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nf_type: Option<String>,
}

/// Body for `POST /telco/api/vnflcm/v2/vnf_instances`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnfRequest {
    pub vnfd_id: String,
    pub vnf_instance_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnf_instance_description: Option<String>,
    pub metadata: CreateVnfMetadata,
}

/// Per-VDU Helm parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VduParam {
    pub namespace: String,
    pub repo_url: String,
    pub username: String,
    pub password: String,
    pub vdu_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateAdditionalParams {
    pub vdu_params: Vec<VduParam>,
    pub disable_grant: bool,
    pub ignore_grant_failure: bool,
    pub disable_auto_rollback: bool,
}

/// Body posted to the `instantiate` policy link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstantiateVnfRequest {
    pub flavour_id: String,
    pub vim_connection_info: Vec<VimConnectionInfo>,
    pub additional_params: InstantiateAdditionalParams,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationType {
    #[default]
    Graceful,
    Forceful,
}

/// Body posted to the `terminate` policy link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TerminateVnfRequest {
    pub termination_type: TerminationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graceful_termination_timeout: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_params: Option<Value>,
}

/// Body posted to the `update_state` policy link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_lcm_operation: Option<String>,
    pub current_state: String,
    pub target_state: String,
}

/// What an LCM operation endpoint answered with
#[derive(Debug, Clone, PartialEq)]
pub enum LcmResponse {
    /// Updated LCM info record
    Instance(Box<LcmInfo>),
    /// Asynchronous task handle
    Task(TaskHandle),
    /// 2xx with an empty body
    Accepted,
}

impl LcmResponse {
    /// Decode a raw operation response body.
    ///
    /// A body carrying an `instantiationState` is an LCM info record; any other
    /// object is a task handle.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        if body.trim().is_empty() {
            return Ok(LcmResponse::Accepted);
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Probe {
            instantiation_state: Option<String>,
        }
        let probe: Probe = serde_json::from_str(body)?;
        if probe.instantiation_state.is_some() {
            Ok(LcmResponse::Instance(Box::new(serde_json::from_str(body)?)))
        } else {
            Ok(LcmResponse::Task(serde_json::from_str(body)?))
        }
    }
}
