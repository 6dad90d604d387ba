//! VIM registry
//!
//! Cloud providers are VIM tenants. Lookups use the resolver's three-mode rule
//! (vim id prefix, tenant or HCX uuid, name); a miss is a `CloudProviderNotFound`.

use crate::error::{Result, TcaError};
use crate::models::*;
use crate::resolver::Resolver;
use crate::tca_trait::TcaClientTrait;
use crate::validator::SpecValidator;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct VimRegistry<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> VimRegistry<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list_vims(&self, cancel: &CancellationToken) -> Result<Vec<VimTenant>> {
        self.client.list_vims(cancel).await
    }

    /// Resolve `query` and return the tenant's detailed record
    pub async fn get_vim(&self, query: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        let tenant = Resolver::new(self.client)
            .vim(query, cancel)
            .await
            .map_err(|e| match e {
                TcaError::NotFound { .. } => TcaError::CloudProviderNotFound {
                    name: query.to_string(),
                },
                other => other,
            })?;
        self.client.get_vim(&tenant.vim_id, cancel).await
    }

    pub async fn register_vim(&self, spec: &CloudProviderSpec, cancel: &CancellationToken) -> Result<VimTenant> {
        SpecValidator::new(self.client).validate_provider(spec)?;
        let tenant = self.client.register_vim(spec, cancel).await?;
        info!("Registered vim {} as {}", spec.vim_name, tenant.vim_id);
        Ok(tenant)
    }

    pub async fn delete_vim(&self, query: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        let tenant = self.get_vim(query, cancel).await?;
        self.client.delete_vim(&tenant.tenant_id, cancel).await?;
        info!("Deleted vim {} ({})", tenant.display_name(), tenant.tenant_id);
        Ok(tenant)
    }
}
