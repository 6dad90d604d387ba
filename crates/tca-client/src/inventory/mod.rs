//! VIM inventory snapshot
//!
//! A snapshot is built from five concurrent queries (compute clusters, folders,
//! resource pools, networks, VM templates) and used read-only while validating one
//! spec. Only vCenter VIMs carry an inventory; anything else is rejected before a
//! query is issued.

#[cfg(test)]
mod inventory_test;

use crate::error::{Result, TcaError};
use crate::models::*;
use crate::tca_trait::TcaClientTrait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Prefix of a fully qualified port-group path
pub const NETWORK_PATH_MARKER: &str = "/network/";

#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    pub vim_id: String,
    pub vim_name: String,
    pub compute_clusters: Vec<InventoryContainer>,
    pub folders: Vec<InventoryContainer>,
    pub resource_pools: Vec<InventoryContainer>,
    pub networks: Vec<VimNetwork>,
    pub vm_templates: Vec<VmTemplate>,
}

fn ensure_vmware(vim: &VimTenant) -> Result<()> {
    if vim.is_vmware() {
        Ok(())
    } else {
        warn!("VIM {} is {}, inventory requires VC", vim.display_name(), vim.vim_type);
        Err(TcaError::UnsupportedVim {
            name: vim.display_name().to_string(),
        })
    }
}

fn container_query(vim: &VimTenant, container_type: ContainerType) -> ContainerQuery {
    ContainerQuery {
        vim_id: vim.vim_id.clone(),
        container_type,
    }
}

fn template_query(vim: &VimTenant) -> VmTemplateQuery {
    VmTemplateQuery {
        cloud_urn: vim.vim_id.clone(),
        template_type: None,
    }
}

/// List the VM templates of a vCenter VIM
pub async fn list_vm_templates<C: TcaClientTrait + ?Sized>(
    client: &C,
    vim: &VimTenant,
    cancel: &CancellationToken,
) -> Result<Vec<VmTemplate>> {
    ensure_vmware(vim)?;
    client.query_vm_templates(&template_query(vim), cancel).await
}

fn same_datastore_url(a: &str, b: &str) -> bool {
    a.trim().trim_end_matches('/') == b.trim().trim_end_matches('/')
}

impl InventorySnapshot {
    /// Fetch the inventory of `vim`.
    ///
    /// A 404 from any of the five queries fails the whole snapshot with
    /// `InventoryUnavailable`.
    pub async fn fetch<C: TcaClientTrait + ?Sized>(
        client: &C,
        vim: &VimTenant,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        ensure_vmware(vim)?;

        let compute_query = container_query(vim, ContainerType::ClusterComputeResource);
        let folder_query = container_query(vim, ContainerType::Folder);
        let pool_query = container_query(vim, ContainerType::ResourcePool);
        let network_query = NetworkQuery {
            tenant_id: vim.tenant_id.clone(),
        };
        let vm_template_query = template_query(vim);

        let joined = futures::try_join!(
            client.query_containers(&compute_query, cancel),
            client.query_containers(&folder_query, cancel),
            client.query_containers(&pool_query, cancel),
            client.query_networks(&network_query, cancel),
            client.query_vm_templates(&vm_template_query, cancel),
        );

        let (compute_clusters, folders, resource_pools, networks, vm_templates) = match joined {
            Ok(parts) => parts,
            Err(e @ TcaError::NotFound { .. }) => {
                return Err(TcaError::InventoryUnavailable {
                    vim: vim.display_name().to_string(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        debug!(
            "Inventory for {}: {} compute clusters, {} folders, {} resource pools, {} networks, {} templates",
            vim.display_name(),
            compute_clusters.len(),
            folders.len(),
            resource_pools.len(),
            networks.len(),
            vm_templates.len()
        );

        Ok(Self {
            vim_id: vim.vim_id.clone(),
            vim_name: vim.display_name().to_string(),
            compute_clusters,
            folders,
            resource_pools,
            networks,
            vm_templates,
        })
    }

    fn contains(containers: &[InventoryContainer], name: &str) -> bool {
        containers.iter().any(|c| c.name == name || c.full_path == name)
    }

    pub fn is_valid_folder(&self, name: &str) -> bool {
        Self::contains(&self.folders, name)
    }

    pub fn is_valid_resource(&self, name: &str) -> bool {
        Self::contains(&self.resource_pools, name)
    }

    pub fn is_valid_cluster_compute(&self, name: &str) -> bool {
        Self::contains(&self.compute_clusters, name)
    }

    /// Datastores of every compute cluster, possibly with repeats for shared storage
    pub fn datastores(&self) -> impl Iterator<Item = &Datastore> {
        self.compute_clusters.iter().flat_map(|c| c.datastores.iter())
    }

    pub fn is_valid_datastore(&self, name: &str) -> bool {
        self.datastores().any(|d| d.name == name)
    }

    pub fn is_valid_datastore_url(&self, url: &str) -> bool {
        self.get_datastore_by_url(url).is_ok()
    }

    /// The single datastore behind `url`. Shared datastores seen through several
    /// compute clusters count once.
    pub fn get_datastore_by_url(&self, url: &str) -> Result<&Datastore> {
        let mut found: Vec<&Datastore> = Vec::new();
        for ds in self.datastores().filter(|d| same_datastore_url(&d.url, url)) {
            if !found.iter().any(|f| f.entity_id == ds.entity_id) {
                found.push(ds);
            }
        }
        match found.as_slice() {
            [one] => Ok(one),
            [] => Err(TcaError::invalid_spec(format!(
                "datastore url {} not found in vim {}",
                url, self.vim_name
            ))),
            many => Err(TcaError::invalid_spec(format!(
                "datastore url {} matches {} datastores in vim {}",
                url,
                many.len(),
                self.vim_name
            ))),
        }
    }

    /// Check a placement parameter against the snapshot. Types the client does not
    /// check are accepted.
    pub fn is_valid_placement(&self, param: &PlacementParam) -> bool {
        match param.placement_type() {
            Some(PlacementType::Folder) => self.is_valid_folder(&param.name),
            Some(PlacementType::Datastore) => self.is_valid_datastore(&param.name),
            Some(PlacementType::ResourcePool) => self.is_valid_resource(&param.name),
            Some(PlacementType::ClusterComputeResource) => self.is_valid_cluster_compute(&param.name),
            None => true,
        }
    }

    /// Canonical `/Datacenter/network/<pg>` path for a short port-group name or a
    /// full path
    pub fn normalize_network_name(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.contains(NETWORK_PATH_MARKER) {
            return self
                .networks
                .iter()
                .find(|n| n.full_network_path == name)
                .map(|n| n.full_network_path.clone())
                .ok_or_else(|| TcaError::NetworkNotFound {
                    name: name.to_string(),
                });
        }

        let mut paths: Vec<&str> = self
            .networks
            .iter()
            .filter(|n| n.name == name)
            .map(|n| n.full_network_path.as_str())
            .filter(|p| !p.is_empty())
            .collect();
        paths.sort_unstable();
        paths.dedup();
        match paths.as_slice() {
            [one] => Ok(one.to_string()),
            [] => Err(TcaError::NetworkNotFound {
                name: name.to_string(),
            }),
            many => Err(TcaError::invalid_spec(format!(
                "network {} is ambiguous: {}",
                name,
                many.join(", ")
            ))),
        }
    }

    pub fn find_template(&self, name: &str) -> Option<&VmTemplate> {
        self.vm_templates
            .iter()
            .find(|t| t.name == name || t.full_path == name)
    }
}
