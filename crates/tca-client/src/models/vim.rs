//! VIM tenant (cloud provider) models

use super::SpecKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VimType {
    #[serde(rename = "VC")]
    Vc,
    #[serde(rename = "KUBERNETES")]
    Kubernetes,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for VimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VimType::Vc => "VC",
            VimType::Kubernetes => "KUBERNETES",
            VimType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VimConnection {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub city_ascii: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Registered VIM tenant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VimTenant {
    pub tenant_id: String,
    /// `vmware_` followed by 32 hex characters
    pub vim_id: String,
    pub vim_name: String,
    pub tenant_name: String,
    pub vim_type: VimType,
    pub vim_url: String,
    pub hcx_cloud_url: String,
    #[serde(rename = "hcxUUID")]
    pub hcx_uuid: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vim_conn: Option<VimConnection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl VimTenant {
    pub fn is_vmware(&self) -> bool {
        self.vim_type == VimType::Vc
    }

    pub fn is_connected(&self) -> bool {
        self.vim_conn
            .as_ref()
            .is_some_and(|c| c.status.eq_ignore_ascii_case("ok"))
    }

    /// Name used in error messages
    pub fn display_name(&self) -> &str {
        if self.vim_name.is_empty() {
            &self.vim_id
        } else {
            &self.vim_name
        }
    }
}

/// VIM registration document (`kind: provider`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CloudProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default)]
    pub hcx_cloud_url: String,
    #[serde(default)]
    pub vim_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CloudProviderSpec {
    pub fn for_wire(&self) -> Self {
        Self {
            kind: None,
            ..self.clone()
        }
    }
}
