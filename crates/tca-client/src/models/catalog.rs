//! VNF catalog models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDefinedData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nf_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Catalog entry from `GET /telco/api/vnfpkgm/v2/vnf_packages`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VnfPackage {
    /// Package id
    pub id: String,
    /// Descriptor id
    pub vnfd_id: String,
    pub vnf_provider: String,
    pub vnf_product_name: String,
    pub vnf_software_version: String,
    pub vnfd_version: String,
    pub onboarding_state: String,
    pub operational_state: String,
    pub usage_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_defined_data: Option<UserDefinedData>,
}

impl VnfPackage {
    /// Catalog name shown in the UI; falls back to the product name
    pub fn catalog_name(&self) -> &str {
        self.user_defined_data
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.vnf_product_name)
    }

    pub fn nf_type(&self) -> Option<&str> {
        self.user_defined_data.as_ref().and_then(|u| u.nf_type.as_deref())
    }
}

/// VDU described by a catalog descriptor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Vdu {
    pub vdu_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Overrides the caller-supplied flavour when non-empty
    #[serde(rename = "flavour_id", alias = "flavourId", skip_serializing_if = "Option::is_none")]
    pub flavour_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_version: Option<String>,
}

impl Vdu {
    pub fn flavour(&self) -> Option<&str> {
        self.flavour_id.as_deref().filter(|f| !f.is_empty())
    }
}

/// Descriptor from `GET /telco/api/vnfpkgm/v2/vnf_packages/{id}/vnfd`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VnfDescriptor {
    pub vnfd_id: String,
    pub vdus: Vec<Vdu>,
}
