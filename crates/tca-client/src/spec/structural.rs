//! Shape-only checks on parsed specs
//!
//! These never look at the server; cross-reference checks live in the validator.

use crate::error::{Result, TcaError};
use crate::models::*;

/// Required-field checks that report every violation at once
pub trait StructuralValidation {
    /// Every missing or empty required field, in document order
    fn violations(&self) -> Vec<String>;

    fn check_structure(&self) -> Result<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(TcaError::invalid_spec(violations.join("; ")))
        }
    }
}

fn require(out: &mut Vec<String>, value: &str, field: &str) {
    if value.trim().is_empty() {
        out.push(format!("{} is required", field));
    }
}

/// Checks shared by cluster master/worker entries and standalone pool specs
pub(crate) fn node_violations(out: &mut Vec<String>, node: &NodePoolSpec, at: &str) {
    if node.name.trim().is_empty() {
        out.push(format!("{}: name is required", at));
    }
    let at = if node.name.is_empty() {
        at.to_string()
    } else {
        format!("{} {}", at, node.name)
    };
    if node.placement_params.is_empty() {
        out.push(format!("{}: placementParams is required", at));
    }
    if !node
        .networks
        .iter()
        .any(|n| !n.label.trim().is_empty() && !n.network_name.trim().is_empty())
    {
        out.push(format!(
            "{}: at least one network with label and networkName is required",
            at
        ));
    }
}

/// An HCX URL is either `https://host[...]` or a bare host name
pub(crate) fn is_valid_hcx_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }
    match url.split_once("://") {
        Some((scheme, rest)) => scheme.eq_ignore_ascii_case("https") && !rest.is_empty(),
        None => !url.contains(char::is_whitespace),
    }
}

impl StructuralValidation for ClusterSpec {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require(&mut out, &self.name, "name");
        require(&mut out, &self.cluster_password, "clusterPassword");
        require(&mut out, &self.cluster_template_id, "clusterTemplateId");
        if self.cluster_type.is_none() {
            out.push("clusterType is required".to_string());
        }
        require(&mut out, &self.hcx_cloud_url, "hcxCloudUrl");
        require(&mut out, &self.endpoint_ip, "endpointIP");
        require(&mut out, &self.vm_template, "vmTemplate");
        if self.master_nodes.is_empty() {
            out.push("masterNodes is required".to_string());
        }
        if self.worker_nodes.is_empty() {
            out.push("workerNodes is required".to_string());
        }
        if self.placement_params.is_empty() {
            out.push("placementParams is required".to_string());
        }
        if self.cluster_type == Some(ClusterType::Workload)
            && self
                .management_cluster_id
                .as_deref()
                .is_none_or(|id| id.trim().is_empty())
        {
            out.push("managementClusterId is required for a WORKLOAD cluster".to_string());
        }
        for (i, node) in self.master_nodes.iter().enumerate() {
            node_violations(&mut out, node, &format!("masterNodes[{}]", i));
        }
        for (i, node) in self.worker_nodes.iter().enumerate() {
            node_violations(&mut out, node, &format!("workerNodes[{}]", i));
        }
        out
    }
}

impl StructuralValidation for NodePoolSpec {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        node_violations(&mut out, self, "node pool");
        if self.replica == 0 {
            out.push("replica must be at least 1".to_string());
        }
        out
    }
}

impl StructuralValidation for ClusterTemplate {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require(&mut out, &self.name, "name");
        if self.cluster_type.is_none() {
            out.push("clusterType is required".to_string());
        }
        if self.master_nodes.is_empty() {
            out.push("masterNodes is required".to_string());
        }
        for (i, node) in self.master_nodes.iter().chain(&self.worker_nodes).enumerate() {
            if node.name.trim().is_empty() {
                out.push(format!("template node {}: name is required", i));
            }
        }
        out
    }
}

impl StructuralValidation for CloudProviderSpec {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.hcx_cloud_url.trim().is_empty() {
            out.push("hcxCloudUrl is required".to_string());
        } else if !is_valid_hcx_url(&self.hcx_cloud_url) {
            out.push(format!(
                "hcxCloudUrl {} must use https:// or be a bare host",
                self.hcx_cloud_url
            ));
        }
        require(&mut out, &self.username, "username");
        require(&mut out, &self.password, "password");
        require(&mut out, &self.vim_name, "vimName");
        out
    }
}

impl StructuralValidation for ExtensionSpec {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require(&mut out, &self.name, "name");
        if self.extension_type == ExtensionType::Unknown {
            out.push("type must be Repository or SVNFM".to_string());
        }
        require(&mut out, &self.interface_info.url, "interfaceInfo.url");
        require(&mut out, &self.access_info.username, "accessInfo.username");
        require(&mut out, &self.access_info.password, "accessInfo.password");
        if !self.vim_info.iter().any(|v| !v.vim_name.trim().is_empty()) {
            out.push("vimInfo needs at least one vimName".to_string());
        }
        out
    }
}

impl StructuralValidation for InstanceSpec {
    fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        require(&mut out, &self.instance_name, "instanceName");
        require(&mut out, &self.catalog_name, "catalogName");
        require(&mut out, &self.cluster_name, "clusterName");
        require(&mut out, &self.node_pool, "nodePool");
        require(&mut out, &self.namespace, "namespace");
        require(&mut out, &self.repo_url, "repoUrl");
        out
    }
}
