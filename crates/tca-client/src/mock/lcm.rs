//! Catalog, extension, repository and CNF lifecycle operations for MockTcaClient
//!
//! Policy-link invocations apply the server's usual state transition to the stored
//! instance; scripted instance polls take precedence on reads.

use super::{body_of, MockTcaClient};
use crate::common::paths;
use crate::error::{Result, TcaError};
use crate::models::*;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

/// Build a `_links` map permitting `ops` on an instance, plus `self`
pub fn policy_links(instance_id: &str, ops: &[LcmOperation]) -> PolicyLinks {
    let mut links = PolicyLinks::default();
    links.0.insert(
        "self".to_string(),
        Link {
            href: paths::vnf_instance(instance_id),
        },
    );
    for op in ops {
        let href = match op {
            LcmOperation::Instantiate => paths::vnf_instantiate(instance_id),
            LcmOperation::UpdateState => paths::vnf_update_state(instance_id),
            other => format!("{}/{}", paths::vnf_instance(instance_id), other.link_key()),
        };
        links.0.insert(op.link_key().to_string(), Link { href });
    }
    links
}

pub async fn list_extensions(client: &MockTcaClient, cancel: &CancellationToken) -> Result<Vec<Extension>> {
    client.record(Method::GET, paths::EXTENSIONS, None, cancel)?;
    Ok(client.extensions.lock().unwrap().clone())
}

pub async fn get_extension(client: &MockTcaClient, extension_id: &str, cancel: &CancellationToken) -> Result<Extension> {
    let path = paths::extension(extension_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .extensions
        .lock()
        .unwrap()
        .iter()
        .find(|e| e.extension_id == extension_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn create_extension(client: &MockTcaClient, registration: &ExtensionRegistration, cancel: &CancellationToken) -> Result<ExtensionCreated> {
    client.record(Method::POST, paths::EXTENSIONS, body_of(registration), cancel)?;
    let mut extensions = client.extensions.lock().unwrap();
    if extensions.iter().any(|e| e.name == registration.name) {
        return Err(TcaError::ServerRejected {
            messages: vec![format!("extension {} already exists", registration.name)],
            path: paths::EXTENSIONS.to_string(),
            status: 409,
        });
    }
    let extension_id = MockTcaClient::new_id();
    extensions.push(Extension {
        extension_id: extension_id.clone(),
        name: registration.name.clone(),
        extension_type: registration.extension_type,
        extension_subtype: registration.extension_subtype.clone(),
        state: "ENABLED".to_string(),
        version: registration.version.clone(),
        interface_info: registration.interface_info.clone(),
        access_info: registration.access_info.clone(),
        vim_info: registration.vim_info.clone(),
    });
    Ok(ExtensionCreated { extension_id })
}

pub async fn delete_extension(client: &MockTcaClient, extension_id: &str, cancel: &CancellationToken) -> Result<()> {
    let path = paths::extension(extension_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut extensions = client.extensions.lock().unwrap();
    let before = extensions.len();
    extensions.retain(|e| e.extension_id != extension_id);
    if extensions.len() == before {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(())
}

pub async fn query_repositories(client: &MockTcaClient, query: &RepositoryQuery, cancel: &CancellationToken) -> Result<Vec<Repository>> {
    client.record(Method::POST, paths::REPOSITORIES_QUERY, body_of(query), cancel)?;
    let repositories = client.repositories.lock().unwrap();
    Ok(match query.filter.extra_filter.vim_id.as_deref() {
        Some(vim_id) => repositories.get(vim_id).cloned().unwrap_or_default(),
        None => repositories.values().flatten().cloned().collect(),
    })
}

pub async fn list_vnf_packages(client: &MockTcaClient, cancel: &CancellationToken) -> Result<Vec<VnfPackage>> {
    client.record(Method::GET, paths::VNF_PACKAGES, None, cancel)?;
    Ok(client.packages.lock().unwrap().clone())
}

pub async fn get_vnf_package(client: &MockTcaClient, package_id: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
    let path = paths::vnf_package(package_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .packages
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == package_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn get_vnf_descriptor(client: &MockTcaClient, package_id: &str, cancel: &CancellationToken) -> Result<VnfDescriptor> {
    let path = paths::vnf_descriptor(package_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .descriptors
        .lock()
        .unwrap()
        .get(package_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn list_vnf_instances(client: &MockTcaClient, path: &str, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
    client.record(Method::GET, path, None, cancel)?;
    Ok(client.instances.lock().unwrap().clone())
}

pub async fn get_vnf_instance(client: &MockTcaClient, instance_id: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
    let path = paths::vnf_instance(instance_id);
    client.record(Method::GET, &path, None, cancel)?;

    let scripted = client
        .instance_polls
        .lock()
        .unwrap()
        .get_mut(instance_id)
        .and_then(|script| {
            if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            }
        });

    let mut instances = client.instances.lock().unwrap();
    match (scripted, instances.iter_mut().find(|i| i.id == instance_id)) {
        (Some(info), Some(stored)) => {
            *stored = info.clone();
            Ok(info)
        }
        (Some(info), None) => Ok(info),
        (None, Some(stored)) => Ok(stored.clone()),
        (None, None) => Err(MockTcaClient::not_found(&path)),
    }
}

pub async fn create_vnf_instance(client: &MockTcaClient, request: &CreateVnfRequest, cancel: &CancellationToken) -> Result<LcmInfo> {
    client.record(Method::POST, paths::VNF_INSTANCES, body_of(request), cancel)?;
    let mut instances = client.instances.lock().unwrap();
    if instances
        .iter()
        .any(|i| i.vnf_instance_name == request.vnf_instance_name)
    {
        return Err(TcaError::ServerRejected {
            messages: vec![format!(
                "instance name {} already exists",
                request.vnf_instance_name
            )],
            path: paths::VNF_INSTANCES.to_string(),
            status: 409,
        });
    }

    let id = MockTcaClient::new_id();
    let info = LcmInfo {
        id: id.clone(),
        vnf_instance_name: request.vnf_instance_name.clone(),
        vnf_instance_description: request.vnf_instance_description.clone(),
        vnfd_id: request.vnfd_id.clone(),
        vnf_pkg_id: Some(request.metadata.vnf_pkg_id.clone()),
        instantiation_state: InstantiationState::NotInstantiated.to_string(),
        metadata: LcmMetadata {
            vnf_catalog_name: Some(request.metadata.vnf_catalog_name.clone()),
            vnf_pkg_id: Some(request.metadata.vnf_pkg_id.clone()),
            nf_type: request.metadata.nf_type.clone(),
            ..Default::default()
        },
        links: policy_links(&id, &[LcmOperation::Instantiate, LcmOperation::UpdateState]),
        ..Default::default()
    };
    instances.push(info.clone());
    Ok(info)
}

pub async fn delete_vnf_instance(client: &MockTcaClient, instance_id: &str, cancel: &CancellationToken) -> Result<()> {
    let path = paths::vnf_instance(instance_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut instances = client.instances.lock().unwrap();
    let before = instances.len();
    instances.retain(|i| i.id != instance_id);
    if instances.len() == before {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(())
}

pub async fn invoke_lcm_operation(client: &MockTcaClient, href: &str, body: &serde_json::Value, cancel: &CancellationToken) -> Result<LcmResponse> {
    client.record(Method::POST, href, Some(body.clone()), cancel)?;

    let op_key = href.rsplit('/').next().unwrap_or_default();
    let op = LcmOperation::ALL
        .into_iter()
        .find(|op| op.link_key() == op_key)
        .ok_or_else(|| MockTcaClient::not_found(href))?;

    let mut instances = client.instances.lock().unwrap();
    let info = instances
        .iter_mut()
        .find(|i| href.split('/').any(|segment| segment == i.id))
        .ok_or_else(|| MockTcaClient::not_found(href))?;

    let (state, operation, op_state, next) = match op {
        LcmOperation::Instantiate => (
            InstantiationState::Instantiated,
            "INSTANTIATE",
            LcmOperationState::Completed,
            vec![LcmOperation::Terminate, LcmOperation::Reconfigure],
        ),
        LcmOperation::Terminate => (
            InstantiationState::NotInstantiated,
            "TERMINATE",
            LcmOperationState::Completed,
            vec![LcmOperation::Instantiate, LcmOperation::UpdateState],
        ),
        LcmOperation::Rollback => (
            InstantiationState::NotInstantiated,
            "ROLLBACK",
            LcmOperationState::RolledBack,
            vec![LcmOperation::Instantiate, LcmOperation::UpdateState],
        ),
        LcmOperation::UpdateState => (
            InstantiationState::NotInstantiated,
            "UPDATE_STATE",
            LcmOperationState::Completed,
            vec![LcmOperation::Instantiate],
        ),
        other => {
            info.metadata.lcm_operation = Some(other.link_key().to_ascii_uppercase());
            info.metadata.lcm_operation_state = Some(LcmOperationState::Completed);
            return Ok(LcmResponse::Task(TaskHandle {
                id: MockTcaClient::new_id(),
                operation_id: None,
                entity_id: Some(info.id.clone()),
            }));
        }
    };

    info.instantiation_state = state.to_string();
    info.metadata.lcm_operation = Some(operation.to_string());
    info.metadata.lcm_operation_state = Some(op_state);
    info.links = policy_links(&info.id, &next);
    Ok(LcmResponse::Accepted)
}
