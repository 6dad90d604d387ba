//! Cross-reference validation
//!
//! The validator resolves every name a spec refers to, checks placement objects and
//! networks against a fresh inventory snapshot, and rewrites names into the
//! identifiers or full paths the server expects. It only ever reads from the service.

#[cfg(test)]
mod validator_test;

use crate::error::{Result, TcaError};
use crate::inventory::InventorySnapshot;
use crate::models::*;
use crate::resolver::{self, Resolver};
use crate::spec::StructuralValidation;
use crate::tca_trait::TcaClientTrait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Tool type written onto harbor entries
pub const TOOL_TYPE_EXTENSION: &str = "extension";

/// Everything a CNF instance spec resolved to
#[derive(Debug, Clone)]
pub struct ResolvedInstance {
    pub package: VnfPackage,
    pub cluster: Cluster,
    pub pool: NodePool,
    /// The workload cluster registered as a Kubernetes VIM
    pub vim: VimTenant,
    /// Repository linked to `vim`
    pub repository: Repository,
}

/// Turn a resolver miss into a validation failure that names what was being resolved
fn rejected(context: &str, err: TcaError) -> TcaError {
    match err {
        TcaError::NotFound { .. } => TcaError::invalid_spec(format!("{}: {}", context, err)),
        other => other,
    }
}

fn placement_error(param: &PlacementParam, at: &str, snapshot: &InventorySnapshot) -> TcaError {
    let category = param
        .placement_type()
        .map(|t| t.category())
        .unwrap_or("placement");
    TcaError::invalid_spec(format!(
        "{} {} on {} not found in vim {}",
        category, param.name, at, snapshot.vim_name
    ))
}

fn check_placements(snapshot: &InventorySnapshot, params: &[PlacementParam], at: &str) -> Result<()> {
    match params.iter().find(|p| !snapshot.is_valid_placement(p)) {
        Some(param) => Err(placement_error(param, at, snapshot)),
        None => Ok(()),
    }
}

/// Placement and network checks shared by cluster nodes and standalone pools
fn check_node(snapshot: &InventorySnapshot, node: &mut NodePoolSpec) -> Result<()> {
    check_placements(snapshot, &node.placement_params, &format!("node {}", node.name))?;
    for network in node.networks.iter_mut() {
        let full = snapshot
            .normalize_network_name(&network.network_name)
            .map_err(|e| match e {
                TcaError::NetworkNotFound { name } => TcaError::invalid_spec(format!(
                    "network {} on node {} not found in vim {}",
                    name, node.name, snapshot.vim_name
                )),
                other => other,
            })?;
        if full != network.network_name {
            debug!("Node {} network {} -> {}", node.name, network.network_name, full);
            network.network_name = full;
        }
    }
    Ok(())
}

fn check_csi(snapshot: &InventorySnapshot, config: &mut ClusterConfigSpec) -> Result<()> {
    for entry in config.csi.iter_mut() {
        match entry.name.as_str() {
            CSI_VSPHERE => {
                let url = entry
                    .properties
                    .datastore_url
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .ok_or_else(|| TcaError::invalid_spec("vsphere-csi requires datastoreUrl"))?;
                let datastore = snapshot.get_datastore_by_url(url)?;
                entry.properties.datastore_name = Some(datastore.name.clone());
            }
            CSI_NFS_CLIENT => {
                let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
                if !has(&entry.properties.mount_path) {
                    return Err(TcaError::invalid_spec("nfs_client requires mountPath"));
                }
                if !has(&entry.properties.server_ip) {
                    return Err(TcaError::invalid_spec("nfs_client requires serverIP"));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

pub struct SpecValidator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> SpecValidator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    fn resolver(&self) -> Resolver<'a, C> {
        Resolver::new(self.client)
    }

    /// VIM behind an HCX cloud URL, as a cloud-provider error on a miss
    async fn provider_for(&self, hcx_cloud_url: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        self.resolver()
            .vim_by_hcx_url(hcx_cloud_url, cancel)
            .await
            .map_err(|e| match e {
                TcaError::NotFound { .. } => TcaError::CloudProviderNotFound {
                    name: hcx_cloud_url.to_string(),
                },
                other => other,
            })
    }

    /// VIM a cluster runs on: by its VIM id, else by its HCX URL
    async fn provider_of(&self, cluster: &Cluster, cancel: &CancellationToken) -> Result<VimTenant> {
        if cluster.vim_id.is_empty() {
            return self.provider_for(&cluster.hcx_cloud_url, cancel).await;
        }
        let tenants = self.client.list_vims(cancel).await?;
        resolver::resolve_vim(&tenants, &cluster.vim_id)
            .cloned()
            .map_err(|_| TcaError::CloudProviderNotFound {
                name: cluster.vim_id.clone(),
            })
    }

    fn ensure_vmware(vim: &VimTenant) -> Result<()> {
        if vim.is_vmware() {
            Ok(())
        } else {
            Err(TcaError::UnsupportedVim {
                name: vim.display_name().to_string(),
            })
        }
    }

    /// Validate a cluster spec and normalize it in place.
    ///
    /// On success the template and management-cluster references hold ids, every
    /// node network holds its full inventory path, vsphere-csi entries carry the
    /// inventory datastore name and harbor tools reference a repository id.
    pub async fn validate_cluster(&self, spec: &mut ClusterSpec, cancel: &CancellationToken) -> Result<VimTenant> {
        spec.check_structure()?;
        let cluster_type = spec
            .cluster_type
            .ok_or_else(|| TcaError::invalid_spec("clusterType is required"))?;

        let vim = self.provider_for(&spec.hcx_cloud_url, cancel).await?;
        Self::ensure_vmware(&vim)?;

        let template = self
            .resolver()
            .template(&spec.cluster_template_id, Some(cluster_type.as_str()), cancel)
            .await
            .map_err(|e| rejected("cluster template", e))?;
        let missing = template.missing_pools(spec);
        if !missing.is_empty() {
            return Err(TcaError::invalid_spec(format!(
                "template {} declares pools missing from cluster {}: {}",
                template.name,
                spec.name,
                missing.join(", ")
            )));
        }
        spec.cluster_template_id = template.id().to_string();

        if cluster_type == ClusterType::Workload {
            let query = spec.management_cluster_id.clone().unwrap_or_default();
            let management = self
                .resolver()
                .cluster(&query, cancel)
                .await
                .map_err(|e| rejected("management cluster", e))?;
            if !management.is_management() {
                return Err(TcaError::invalid_spec(format!(
                    "cluster {} is not a MANAGEMENT cluster",
                    management.cluster_name
                )));
            }
            spec.management_cluster_id = Some(management.id);
        }

        let snapshot = InventorySnapshot::fetch(self.client, &vim, cancel).await?;
        check_placements(&snapshot, &spec.placement_params, &format!("cluster {}", spec.name))?;
        if snapshot.find_template(&spec.vm_template).is_none() {
            return Err(TcaError::invalid_spec(format!(
                "vm template {} not found in vim {}",
                spec.vm_template, snapshot.vim_name
            )));
        }
        for node in spec.all_nodes_mut() {
            check_node(&snapshot, node)?;
        }

        if let Some(config) = spec.cluster_config.as_mut() {
            check_csi(&snapshot, config)?;
            self.resolve_harbor_tools(config, cancel).await?;
        }

        info!("Validated cluster spec {} against vim {}", spec.name, vim.display_name());
        Ok(vim)
    }

    async fn resolve_harbor_tools(&self, config: &mut ClusterConfigSpec, cancel: &CancellationToken) -> Result<()> {
        if !config.tools.iter().any(|t| t.name.eq_ignore_ascii_case(TOOL_HARBOR)) {
            return Ok(());
        }
        let repos = self
            .client
            .query_repositories(&RepositoryQuery::default(), cancel)
            .await?;
        for tool in config
            .tools
            .iter_mut()
            .filter(|t| t.name.eq_ignore_ascii_case(TOOL_HARBOR))
        {
            let properties = tool.properties.get_or_insert_with(ToolProperties::default);
            let name = properties
                .extension_id
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| TcaError::invalid_spec("harbor tool requires extensionId"))?;
            let repo = resolver::resolve_repository(&repos, name).map_err(|e| rejected("harbor", e))?;
            properties.extension_id = Some(repo.id.clone());
            properties.tool_type = Some(TOOL_TYPE_EXTENSION.to_string());
        }
        Ok(())
    }

    /// Validate a node pool spec against the cluster it will join, normalizing
    /// networks in place
    pub async fn validate_node_pool(&self, cluster: &Cluster, spec: &mut NodePoolSpec, cancel: &CancellationToken) -> Result<()> {
        spec.check_structure()?;
        let vim = self.provider_of(cluster, cancel).await?;
        Self::ensure_vmware(&vim)?;
        let snapshot = InventorySnapshot::fetch(self.client, &vim, cancel).await?;
        check_node(&snapshot, spec)?;
        debug!("Validated node pool {} for cluster {}", spec.name, cluster.cluster_name);
        Ok(())
    }

    /// VIM registration checks; purely local
    pub fn validate_provider(&self, spec: &CloudProviderSpec) -> Result<()> {
        spec.check_structure()
    }

    /// Validate an extension spec and resolve its VIM names
    pub async fn validate_extension(&self, spec: &ExtensionSpec, cancel: &CancellationToken) -> Result<Vec<ExtensionVim>> {
        spec.check_structure()?;
        let tenants = self.client.list_vims(cancel).await?;
        spec.vim_info
            .iter()
            .filter(|v| !v.vim_name.trim().is_empty())
            .map(|v| {
                let tenant = resolver::resolve_vim(&tenants, &v.vim_name).map_err(|_| {
                    TcaError::CloudProviderNotFound {
                        name: v.vim_name.clone(),
                    }
                })?;
                Ok(ExtensionVim {
                    vim_id: tenant.vim_id.clone(),
                    vim_name: tenant.vim_name.clone(),
                    vim_system_uuid: tenant.hcx_uuid.clone(),
                })
            })
            .collect()
    }

    /// Resolve everything a CNF instance spec refers to.
    ///
    /// The repository must be linked to the VIM the target cluster is registered as.
    pub async fn validate_instance(&self, spec: &InstanceSpec, cancel: &CancellationToken) -> Result<ResolvedInstance> {
        spec.check_structure()?;
        let resolver = self.resolver();

        let package = resolver
            .catalog(&spec.catalog_name, cancel)
            .await
            .map_err(|e| rejected("catalog", e))?;
        let (cluster, pool) = resolver
            .node_pool(Some(&spec.cluster_name), &spec.node_pool, cancel)
            .await
            .map_err(|e| rejected("placement", e))?;

        let tenants = self.client.list_vims(cancel).await?;
        let vim = tenants
            .iter()
            .find(|t| t.vim_name.eq_ignore_ascii_case(&cluster.cluster_name))
            .cloned()
            .ok_or_else(|| TcaError::CloudProviderNotFound {
                name: cluster.cluster_name.clone(),
            })?;

        let repository = match resolver.repository(&vim.vim_id, &spec.repo_url, cancel).await {
            Ok(repo) => repo,
            Err(TcaError::NotFound { .. }) => {
                warn!("Repository {} is not linked to vim {}", spec.repo_url, vim.display_name());
                return Err(TcaError::invalid_spec(format!(
                    "repository {} is not linked to vim {}",
                    spec.repo_url,
                    vim.display_name()
                )));
            }
            Err(e) => return Err(e),
        };

        debug!(
            "Instance {} resolved: catalog {} cluster {} pool {} repo {}",
            spec.instance_name,
            package.catalog_name(),
            cluster.cluster_name,
            pool.name,
            repository.id
        );
        Ok(ResolvedInstance {
            package,
            cluster,
            pool,
            vim,
            repository,
        })
    }
}
