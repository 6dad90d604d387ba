//! Extension and repository models

use super::SpecKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ExtensionType {
    Repository,
    #[serde(rename = "SVNFM")]
    Svnfm,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InterfaceInfo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessInfo {
    pub username: String,
    /// Base64 on the wire
    pub password: String,
}

/// VIM attachment of an extension
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionVim {
    pub vim_id: String,
    pub vim_name: String,
    #[serde(rename = "vimSystemUUID")]
    pub vim_system_uuid: String,
}

/// Registered extension record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Extension {
    #[serde(alias = "id")]
    pub extension_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub extension_type: ExtensionType,
    pub extension_subtype: String,
    /// ENABLED or DISABLED
    pub state: String,
    pub version: String,
    pub interface_info: InterfaceInfo,
    pub access_info: AccessInfo,
    pub vim_info: Vec<ExtensionVim>,
}

impl Extension {
    pub fn is_enabled(&self) -> bool {
        self.state.eq_ignore_ascii_case("ENABLED")
    }

    pub fn is_attached_to(&self, vim_id: &str) -> bool {
        self.vim_info.iter().any(|v| v.vim_id == vim_id)
    }
}

/// VIM reference inside an extension spec, by name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionVimRef {
    #[serde(default)]
    pub vim_name: String,
}

/// Extension registration document (`kind: extensions`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<SpecKind>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default)]
    pub extension_type: ExtensionType,
    #[serde(default)]
    pub extension_subtype: String,
    #[serde(default)]
    pub interface_info: InterfaceInfo,
    /// Plain-text password here; encoded when registering
    #[serde(default)]
    pub access_info: AccessInfo,
    #[serde(default)]
    pub vim_info: Vec<ExtensionVimRef>,
    #[serde(default)]
    pub auto_scale_enabled: bool,
    #[serde(default)]
    pub auto_sync_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_parameters: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Wire body for `POST /hybridity/api/extensions`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRegistration {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub extension_type: ExtensionType,
    pub extension_subtype: String,
    pub interface_info: InterfaceInfo,
    pub access_info: AccessInfo,
    pub vim_info: Vec<ExtensionVim>,
    pub auto_scale_enabled: bool,
    pub auto_sync_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_parameters: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtensionCreated {
    pub extension_id: String,
}

/// Repository linked to a VIM
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    #[serde(alias = "repoId")]
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub repo_type: String,
    pub username: String,
    pub password: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryExtraFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vim_id: Option<String>,
    #[serde(rename = "vimSystemUUID", default, skip_serializing_if = "Option::is_none")]
    pub vim_system_uuid: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFilter {
    pub extra_filter: RepositoryExtraFilter,
}

/// Body for `POST /hybridity/api/repositories/query`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryQuery {
    pub filter: RepositoryFilter,
}

impl RepositoryQuery {
    pub fn for_vim(vim_id: &str) -> Self {
        Self {
            filter: RepositoryFilter {
                extra_filter: RepositoryExtraFilter {
                    vim_id: Some(vim_id.to_string()),
                    vim_system_uuid: None,
                },
            },
        }
    }
}
