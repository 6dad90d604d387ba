//! CNF lifecycle engine
//!
//! Every operation reads the instance's latest LCM info first and only proceeds
//! when the server offered the matching policy link and the instance is in the
//! right state. The request then goes to the link's href.

pub mod naming;

use crate::error::{Result, TcaError};
use crate::models::*;
use crate::resolver::Resolver;
use crate::tca_trait::TcaClientTrait;
use crate::validator::{ResolvedInstance, SpecValidator};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Flavour used when neither the catalog nor the caller names one
pub const DEFAULT_FLAVOUR: &str = "default";

const VIM_TYPE_KUBERNETES: &str = "kubernetes";

/// Everything needed to create and instantiate one CNF
#[derive(Debug, Clone)]
pub struct InstancePlan {
    /// Final instance name, after collision handling
    pub name: String,
    pub create: CreateVnfRequest,
    pub instantiate: InstantiateVnfRequest,
    pub resolved: ResolvedInstance,
}

/// Operations the server currently permits on an instance
pub fn allowed_operations(info: &LcmInfo) -> Vec<LcmOperation> {
    info.links.allowed()
}

/// Check the policy link and state guard for `op`, returning the link href
fn guard(info: &LcmInfo, op: LcmOperation) -> Result<String> {
    let href = info.links.href(op).ok_or_else(|| {
        warn!(
            "Refusing {} on {}: server offered {:?}",
            op,
            info.vnf_instance_name,
            info.links.allowed()
        );
        TcaError::invalid_spec(format!(
            "policy link missing: {} for instance {}",
            op, info.vnf_instance_name
        ))
    })?;

    let state_ok = match op {
        LcmOperation::Instantiate => info.state() == Some(InstantiationState::NotInstantiated),
        LcmOperation::Terminate => info.state() == Some(InstantiationState::Instantiated),
        LcmOperation::Rollback => info.operation_state() == Some(LcmOperationState::FailedTemp),
        _ => true,
    };
    if !state_ok {
        return Err(TcaError::invalid_spec(format!(
            "cannot {} instance {} in state {} (last operation {} {:?})",
            op,
            info.vnf_instance_name,
            info.instantiation_state,
            info.lcm_operation(),
            info.operation_state()
        )));
    }
    Ok(href.to_string())
}

/// Flavour for the instantiation: the catalog's VDU flavour wins over the caller's
fn select_flavour(vdus: &[Vdu], requested: Option<&str>) -> String {
    vdus.iter()
        .find_map(Vdu::flavour)
        .or(requested.filter(|f| !f.trim().is_empty()))
        .unwrap_or(DEFAULT_FLAVOUR)
        .to_string()
}

/// Build the instantiate body. Credentials always come from the linked
/// repository, whatever the spec carried.
fn instantiate_request(spec: &InstanceSpec, resolved: &ResolvedInstance, vdus: &[Vdu]) -> InstantiateVnfRequest {
    let repo = &resolved.repository;
    if spec.repo_username.is_some() || spec.repo_password.is_some() {
        debug!("Replacing supplied repository credentials with those of {}", repo.name);
    }
    let repo_url = if spec.repo_url.contains("://") {
        spec.repo_url.clone()
    } else {
        repo.url.clone()
    };

    let vdu_params = vdus
        .iter()
        .map(|vdu| VduParam {
            namespace: spec.namespace.clone(),
            repo_url: repo_url.clone(),
            username: repo.username.clone(),
            password: repo.password.clone(),
            vdu_name: vdu.name.clone(),
        })
        .collect();

    InstantiateVnfRequest {
        flavour_id: select_flavour(vdus, spec.flavor_name.as_deref()),
        vim_connection_info: vec![VimConnectionInfo {
            id: resolved.vim.vim_id.clone(),
            vim_id: resolved.vim.vim_id.clone(),
            vim_type: VIM_TYPE_KUBERNETES.to_string(),
            extra: Some(VimConnectionExtra {
                node_pool_id: Some(resolved.pool.id.clone()),
                node_pool_name: Some(resolved.pool.name.clone()),
                deployment_profile_id: None,
            }),
            ..Default::default()
        }],
        additional_params: InstantiateAdditionalParams {
            vdu_params,
            disable_grant: spec.disable_grant,
            ignore_grant_failure: spec.ignore_grant_failure,
            disable_auto_rollback: spec.disable_auto_rollback,
        },
    }
}

pub struct LcmEngine<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> LcmEngine<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list_instances(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        self.client.list_vnf_instances(cancel).await
    }

    pub async fn list_instances_extended(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        self.client.list_vnf_instances_extended(cancel).await
    }

    /// Latest LCM info for an instance named by id or name
    pub async fn get_instance(&self, query: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
        Resolver::new(self.client).instance(query, cancel).await
    }

    async fn resolve(&self, spec: &InstanceSpec, cancel: &CancellationToken) -> Result<(ResolvedInstance, Vec<Vdu>)> {
        let resolved = SpecValidator::new(self.client)
            .validate_instance(spec, cancel)
            .await?;
        let descriptor = self
            .client
            .get_vnf_descriptor(&resolved.package.id, cancel)
            .await?;
        Ok((resolved, descriptor.vdus))
    }

    /// Instantiate body for an instance that already exists; the name in `spec`
    /// is not checked
    pub async fn build_instantiate_request(&self, spec: &InstanceSpec, cancel: &CancellationToken) -> Result<InstantiateVnfRequest> {
        let (resolved, vdus) = self.resolve(spec, cancel).await?;
        Ok(instantiate_request(spec, &resolved, &vdus))
    }

    /// Resolve and validate an instance spec without changing anything
    pub async fn prepare(&self, spec: &InstanceSpec, cancel: &CancellationToken) -> Result<InstancePlan> {
        let (resolved, vdus) = self.resolve(spec, cancel).await?;

        let existing = self.client.list_vnf_instances(cancel).await?;
        let name = if spec.auto_name {
            naming::unique_name(
                &spec.instance_name,
                existing.iter().map(|i| i.vnf_instance_name.as_str()),
            )?
        } else if existing.iter().any(|i| i.vnf_instance_name == spec.instance_name) {
            return Err(TcaError::invalid_spec(format!(
                "instance name {} already exists",
                spec.instance_name
            )));
        } else {
            spec.instance_name.clone()
        };
        if name != spec.instance_name {
            info!("Instance name {} is taken, using {}", spec.instance_name, name);
        }

        let package = &resolved.package;
        let create = CreateVnfRequest {
            vnfd_id: package.vnfd_id.clone(),
            vnf_instance_name: name.clone(),
            vnf_instance_description: spec.description.clone(),
            metadata: CreateVnfMetadata {
                vnf_pkg_id: package.id.clone(),
                vnf_catalog_name: package.catalog_name().to_string(),
                nf_type: package.nf_type().map(str::to_string),
            },
        };
        let instantiate = instantiate_request(spec, &resolved, &vdus);

        Ok(InstancePlan {
            name,
            create,
            instantiate,
            resolved,
        })
    }

    /// Create the instance record; it starts NOT_INSTANTIATED
    pub async fn create(&self, plan: &InstancePlan, cancel: &CancellationToken) -> Result<LcmInfo> {
        let info = self.client.create_vnf_instance(&plan.create, cancel).await?;
        info!(
            "Created instance {} ({}) from catalog {}",
            info.vnf_instance_name,
            info.id,
            plan.resolved.package.catalog_name()
        );
        Ok(info)
    }

    async fn invoke(&self, info: &LcmInfo, op: LcmOperation, body: Value, cancel: &CancellationToken) -> Result<LcmResponse> {
        let href = guard(info, op)?;
        let response = self.client.invoke_lcm_operation(&href, &body, cancel).await?;
        info!("{} submitted for instance {}", op, info.vnf_instance_name);
        Ok(response)
    }

    pub async fn instantiate(&self, query: &str, request: &InstantiateVnfRequest, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        self.invoke(&info, LcmOperation::Instantiate, serde_json::to_value(request)?, cancel)
            .await
    }

    /// Prepare, create and instantiate in one go
    pub async fn create_and_instantiate(&self, spec: &InstanceSpec, cancel: &CancellationToken) -> Result<(LcmInfo, LcmResponse)> {
        let plan = self.prepare(spec, cancel).await?;
        let created = self.create(&plan, cancel).await?;
        let response = self.instantiate(&created.id, &plan.instantiate, cancel).await?;
        Ok((created, response))
    }

    pub async fn terminate(&self, query: &str, request: &TerminateVnfRequest, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        self.invoke(&info, LcmOperation::Terminate, serde_json::to_value(request)?, cancel)
            .await
    }

    /// Roll back an operation that stopped in FAILED_TEMP
    pub async fn rollback(&self, query: &str, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        self.invoke(&info, LcmOperation::Rollback, json!({}), cancel).await
    }

    /// Force the server's bookkeeping back to NOT_INSTANTIATED without touching
    /// workloads
    pub async fn reset(&self, query: &str, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        let request = UpdateStateRequest {
            current_lcm_operation: info.metadata.lcm_operation.clone(),
            current_state: info.instantiation_state.clone(),
            target_state: InstantiationState::NotInstantiated.to_string(),
        };
        self.invoke(&info, LcmOperation::UpdateState, serde_json::to_value(&request)?, cancel)
            .await
    }

    pub async fn reconfigure(&self, query: &str, params: &Value, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        self.invoke(&info, LcmOperation::Reconfigure, params.clone(), cancel).await
    }

    pub async fn retry(&self, query: &str, cancel: &CancellationToken) -> Result<LcmResponse> {
        let info = self.get_instance(query, cancel).await?;
        self.invoke(&info, LcmOperation::Retry, json!({}), cancel).await
    }

    /// Delete an instance that is not instantiated
    pub async fn delete(&self, query: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
        let info = self.get_instance(query, cancel).await?;
        match info.state() {
            Some(InstantiationState::NotInstantiated | InstantiationState::Terminated) => {}
            _ => {
                return Err(TcaError::invalid_spec(format!(
                    "instance {} is {}; terminate it before deleting",
                    info.vnf_instance_name, info.instantiation_state
                )));
            }
        }
        self.client.delete_vnf_instance(&info.id, cancel).await?;
        info!("Deleted instance {} ({})", info.vnf_instance_name, info.id);
        Ok(info)
    }
}
