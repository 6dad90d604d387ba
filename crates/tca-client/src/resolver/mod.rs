//! Name and identifier resolution
//!
//! Callers may refer to any entity by human name or by identifier. The functions in
//! this module are pure lookups over lists fetched from the API; [`Resolver`] wraps a
//! client and fetches those lists on demand.
//!
//! On a miss every resolver returns `NotFound` carrying Jaro-Winkler ranked
//! suggestions. Suggestions are informational only; nothing here ever picks a target
//! by similarity.

pub mod fuzzy;

use crate::error::{EntityKind, Result, TcaError};
use crate::models::*;
use crate::tca_trait::TcaClientTrait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Substring that switches VIM lookup to identifier-prefix mode
const VIM_ID_MARKER: &str = "vmware";

fn not_found<'a>(
    kind: EntityKind,
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> TcaError {
    let suggestions = fuzzy::suggest(query, candidates);
    if !suggestions.is_empty() {
        warn!("No {} named {}{}", kind, query, suggestions);
    }
    TcaError::NotFound {
        kind,
        query: query.to_string(),
        suggestions,
    }
}

/// Resolve a cluster by id or name (name compared case-insensitively)
pub fn resolve_cluster<'a>(clusters: &'a [Cluster], query: &str) -> Result<&'a Cluster> {
    clusters
        .iter()
        .find(|c| c.id == query || c.cluster_name.eq_ignore_ascii_case(query))
        .ok_or_else(|| not_found(EntityKind::Cluster, query, clusters.iter().map(|c| c.cluster_name.as_str())))
}

/// Resolve a node pool within one cluster's pool list
pub fn resolve_node_pool<'a>(pools: &'a [NodePool], query: &str) -> Result<&'a NodePool> {
    pools
        .iter()
        .find(|p| p.id == query || p.name.eq_ignore_ascii_case(query))
        .ok_or_else(|| not_found(EntityKind::NodePool, query, pools.iter().map(|p| p.name.as_str())))
}

/// Resolve a cluster template by id or name.
///
/// When `expected_type` is given the template's type must match it
/// (case-insensitively) or the lookup fails with `TemplateTypeMismatch`.
pub fn resolve_template<'a>(
    templates: &'a [ClusterTemplate],
    query: &str,
    expected_type: Option<&str>,
) -> Result<&'a ClusterTemplate> {
    let template = templates
        .iter()
        .find(|t| t.id() == query || t.name.eq_ignore_ascii_case(query))
        .ok_or_else(|| {
            not_found(
                EntityKind::ClusterTemplate,
                query,
                templates.iter().map(|t| t.name.as_str()),
            )
        })?;

    if let Some(expected) = expected_type {
        let actual = template.cluster_type.map(|t| t.as_str()).unwrap_or_default();
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(TcaError::TemplateTypeMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(template)
}

/// Three-mode VIM lookup.
///
/// Queries containing `vmware` match as a VIM id prefix (partially formed ids are
/// accepted); well-formed UUIDs match the tenant id or HCX UUID; anything else
/// matches the VIM or tenant name.
pub fn resolve_vim<'a>(tenants: &'a [VimTenant], query: &str) -> Result<&'a VimTenant> {
    let found = if query.contains(VIM_ID_MARKER) {
        tenants
            .iter()
            .find(|t| !t.vim_id.is_empty() && t.vim_id.starts_with(query))
    } else if is_well_formed_id(query) {
        tenants.iter().find(|t| {
            t.tenant_id.eq_ignore_ascii_case(query) || t.hcx_uuid.eq_ignore_ascii_case(query)
        })
    } else {
        tenants.iter().find(|t| {
            t.vim_name.eq_ignore_ascii_case(query) || t.tenant_name.eq_ignore_ascii_case(query)
        })
    };
    found.ok_or_else(|| not_found(EntityKind::Vim, query, tenants.iter().map(|t| t.vim_name.as_str())))
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Resolve the VIM whose HCX cloud URL equals `url` (scheme, case and trailing slash
/// insensitive)
pub fn resolve_vim_by_hcx_url<'a>(tenants: &'a [VimTenant], url: &str) -> Result<&'a VimTenant> {
    let strip = |u: &str| {
        let n = normalize_url(u);
        n.strip_prefix("https://")
            .or_else(|| n.strip_prefix("http://"))
            .map(str::to_string)
            .unwrap_or(n)
    };
    let wanted = strip(url);
    tenants
        .iter()
        .find(|t| !t.hcx_cloud_url.is_empty() && strip(&t.hcx_cloud_url) == wanted)
        .ok_or_else(|| {
            not_found(
                EntityKind::Vim,
                url,
                tenants.iter().map(|t| t.hcx_cloud_url.as_str()),
            )
        })
}

/// Resolve a catalog entry. Descriptor id wins over package id, which wins over
/// product (catalog) name.
pub fn resolve_catalog<'a>(packages: &'a [VnfPackage], query: &str) -> Result<&'a VnfPackage> {
    packages
        .iter()
        .find(|p| p.vnfd_id == query)
        .or_else(|| packages.iter().find(|p| p.id == query))
        .or_else(|| {
            packages
                .iter()
                .find(|p| p.vnf_product_name == query || p.catalog_name() == query)
        })
        .ok_or_else(|| {
            not_found(
                EntityKind::Catalog,
                query,
                packages.iter().map(VnfPackage::catalog_name),
            )
        })
}

/// Resolve a repository by id, name, or URL
///
/// An exact URL (case and trailing slash insensitive) wins. Otherwise the query must
/// be a substring of exactly one repository URL.
pub fn resolve_repository<'a>(repos: &'a [Repository], query: &str) -> Result<&'a Repository> {
    if let Some(repo) = repos
        .iter()
        .find(|r| r.id == query || r.name.eq_ignore_ascii_case(query))
    {
        return Ok(repo);
    }

    let wanted = normalize_url(query);
    let miss = || {
        not_found(
            EntityKind::Repository,
            query,
            repos.iter().map(|r| r.name.as_str()).chain(repos.iter().map(|r| r.url.as_str())),
        )
    };
    if wanted.is_empty() {
        return Err(miss());
    }
    if let Some(repo) = repos.iter().find(|r| normalize_url(&r.url) == wanted) {
        return Ok(repo);
    }

    let partial: Vec<&Repository> = repos
        .iter()
        .filter(|r| normalize_url(&r.url).contains(&wanted))
        .collect();
    match partial.as_slice() {
        [one] => Ok(*one),
        [] => Err(miss()),
        many => Err(TcaError::invalid_spec(format!(
            "repository url {} is ambiguous: {}",
            query,
            many.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
        ))),
    }
}

pub fn resolve_extension<'a>(extensions: &'a [Extension], query: &str) -> Result<&'a Extension> {
    extensions
        .iter()
        .find(|e| e.extension_id == query || e.name.eq_ignore_ascii_case(query))
        .ok_or_else(|| {
            not_found(
                EntityKind::Extension,
                query,
                extensions.iter().map(|e| e.name.as_str()),
            )
        })
}

pub fn resolve_instance<'a>(instances: &'a [LcmInfo], query: &str) -> Result<&'a LcmInfo> {
    instances
        .iter()
        .find(|i| i.id == query || i.vnf_instance_name == query)
        .ok_or_else(|| {
            not_found(
                EntityKind::Instance,
                query,
                instances.iter().map(|i| i.vnf_instance_name.as_str()),
            )
        })
}

/// Client-backed resolver: fetches the relevant list and applies the pure lookup
#[derive(Debug)]
pub struct Resolver<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> Resolver<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn cluster(&self, query: &str, cancel: &CancellationToken) -> Result<Cluster> {
        let clusters = self.client.list_clusters(cancel).await?;
        resolve_cluster(&clusters, query).cloned()
    }

    /// Resolve a node pool. Without a cluster scope every cluster is scanned in list
    /// order and the first match wins.
    pub async fn node_pool(
        &self,
        cluster: Option<&str>,
        pool: &str,
        cancel: &CancellationToken,
    ) -> Result<(Cluster, NodePool)> {
        let clusters = self.client.list_clusters(cancel).await?;
        if let Some(scope) = cluster {
            let cluster = resolve_cluster(&clusters, scope)?;
            let pools = self.client.list_node_pools(&cluster.id, cancel).await?;
            let found = resolve_node_pool(&pools, pool)?;
            return Ok((cluster.clone(), found.clone()));
        }

        debug!("Scanning {} clusters for node pool {}", clusters.len(), pool);
        let mut seen: Vec<String> = Vec::new();
        for cluster in &clusters {
            if cancel.is_cancelled() {
                return Err(TcaError::TaskCancelled);
            }
            let pools = self.client.list_node_pools(&cluster.id, cancel).await?;
            if let Some(found) = pools
                .iter()
                .find(|p| p.id == pool || p.name.eq_ignore_ascii_case(pool))
            {
                return Ok((cluster.clone(), found.clone()));
            }
            seen.extend(pools.into_iter().map(|p| p.name));
        }
        Err(not_found(EntityKind::NodePool, pool, seen.iter().map(String::as_str)))
    }

    pub async fn template(
        &self,
        query: &str,
        expected_type: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<ClusterTemplate> {
        let templates = self.client.list_cluster_templates(cancel).await?;
        resolve_template(&templates, query, expected_type).cloned()
    }

    pub async fn vim(&self, query: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        let tenants = self.client.list_vims(cancel).await?;
        resolve_vim(&tenants, query).cloned()
    }

    pub async fn vim_by_hcx_url(&self, url: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        let tenants = self.client.list_vims(cancel).await?;
        resolve_vim_by_hcx_url(&tenants, url).cloned()
    }

    pub async fn catalog(&self, query: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
        let packages = self.client.list_vnf_packages(cancel).await?;
        resolve_catalog(&packages, query).cloned()
    }

    /// Resolve a repository among those linked to `vim_id`
    pub async fn repository(
        &self,
        vim_id: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Repository> {
        let repos = self
            .client
            .query_repositories(&RepositoryQuery::for_vim(vim_id), cancel)
            .await?;
        resolve_repository(&repos, query).cloned()
    }

    pub async fn extension(&self, query: &str, cancel: &CancellationToken) -> Result<Extension> {
        let extensions = self.client.list_extensions(cancel).await?;
        resolve_extension(&extensions, query).cloned()
    }

    pub async fn instance(&self, query: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
        if is_well_formed_id(query) {
            match self.client.get_vnf_instance(query, cancel).await {
                Ok(info) => return Ok(info),
                Err(e) if e.is_not_found(EntityKind::Resource) => {}
                Err(e) => return Err(e),
            }
        }
        let instances = self.client.list_vnf_instances(cancel).await?;
        resolve_instance(&instances, query).cloned()
    }
}
