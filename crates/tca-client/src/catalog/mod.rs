//! Catalog and extension registry
//!
//! Read paths over the VNF catalog, and registration of extensions (Harbor
//! repositories, SVNFMs) against one or more VIMs.


use crate::error::{EntityKind, Result, TcaError};
use crate::models::*;
use crate::resolver::{self, Resolver};
use crate::tca_trait::TcaClientTrait;
use crate::validator::SpecValidator;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct CatalogRegistry<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> CatalogRegistry<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list_catalog(&self, cancel: &CancellationToken) -> Result<Vec<VnfPackage>> {
        self.client.list_vnf_packages(cancel).await
    }

    /// Fetch a package by its id
    pub async fn get_catalog_by_id(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
        self.client
            .get_vnf_package(package_id, cancel)
            .await
            .map_err(|e| match e {
                TcaError::NotFound { .. } => TcaError::not_found(EntityKind::Catalog, package_id),
                other => other,
            })
    }

    /// Resolve a catalog entry by descriptor id, package id or name
    pub async fn get_catalog(&self, query: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
        Resolver::new(self.client).catalog(query, cancel).await
    }

    /// VDUs of the catalog entry named `query`
    pub async fn get_vdu_by_catalog_name(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<Vdu>> {
        let package = self.get_catalog(query, cancel).await?;
        let descriptor = self
            .client
            .get_vnf_descriptor(&package.id, cancel)
            .await
            .map_err(|e| match e {
                TcaError::NotFound { .. } => TcaError::not_found(EntityKind::Vdu, query),
                other => other,
            })?;
        Ok(descriptor.vdus)
    }

    pub async fn list_extensions(&self, cancel: &CancellationToken) -> Result<Vec<Extension>> {
        self.client.list_extensions(cancel).await
    }

    pub async fn get_extension(&self, query: &str, cancel: &CancellationToken) -> Result<Extension> {
        Resolver::new(self.client).extension(query, cancel).await
    }

    /// Repositories linked to the VIM named by `vim_query` (three-mode lookup)
    pub async fn list_repositories(&self, vim_query: &str, cancel: &CancellationToken) -> Result<Vec<Repository>> {
        let vim = Resolver::new(self.client).vim(vim_query, cancel).await?;
        self.client
            .query_repositories(&RepositoryQuery::for_vim(&vim.vim_id), cancel)
            .await
    }

    /// The repository `query` (name, id or URL) among those linked to `vim_id`
    pub async fn find_repository_attached_to(&self, vim_id: &str, query: &str, cancel: &CancellationToken) -> Result<Repository> {
        let repos = self
            .client
            .query_repositories(&RepositoryQuery::for_vim(vim_id), cancel)
            .await?;
        resolver::resolve_repository(&repos, query).cloned()
    }

    /// Register an extension. VIM names are resolved and the password is
    /// base64-encoded for the wire.
    pub async fn register_extension(&self, spec: &ExtensionSpec, cancel: &CancellationToken) -> Result<ExtensionCreated> {
        let vim_info = SpecValidator::new(self.client)
            .validate_extension(spec, cancel)
            .await?;

        let registration = ExtensionRegistration {
            name: spec.name.clone(),
            version: spec.version.clone(),
            extension_type: spec.extension_type,
            extension_subtype: spec.extension_subtype.clone(),
            interface_info: spec.interface_info.clone(),
            access_info: AccessInfo {
                username: spec.access_info.username.clone(),
                password: STANDARD.encode(&spec.access_info.password),
            },
            vim_info,
            auto_scale_enabled: spec.auto_scale_enabled,
            auto_sync_enabled: spec.auto_sync_enabled,
            additional_parameters: spec.additional_parameters.clone(),
        };

        let created = self.client.create_extension(&registration, cancel).await?;
        info!("Registered extension {} as {}", spec.name, created.extension_id);
        Ok(created)
    }

    pub async fn delete_extension(&self, query: &str, cancel: &CancellationToken) -> Result<Extension> {
        let extension = self.get_extension(query, cancel).await?;
        self.client
            .delete_extension(&extension.extension_id, cancel)
            .await?;
        info!("Deleted extension {} ({})", extension.name, extension.extension_id);
        Ok(extension)
    }
}
