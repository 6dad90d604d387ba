//! Cluster, node pool, task and template operations for MockTcaClient

use super::{body_of, MockTcaClient};
use crate::common::paths;
use crate::error::{Result, TcaError};
use crate::models::*;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

pub async fn list_clusters(client: &MockTcaClient, cancel: &CancellationToken) -> Result<Vec<Cluster>> {
    client.record(Method::GET, paths::CLUSTERS, None, cancel)?;
    Ok(client.clusters.lock().unwrap().clone())
}

pub async fn get_cluster(client: &MockTcaClient, cluster_id: &str, cancel: &CancellationToken) -> Result<Cluster> {
    let path = paths::cluster(cluster_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .clusters
        .lock()
        .unwrap()
        .iter()
        .find(|c| c.id == cluster_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn create_cluster(client: &MockTcaClient, spec: &ClusterSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
    client.record(Method::POST, paths::CLUSTERS, body_of(&spec.for_wire()), cancel)?;
    let vim_id = client
        .vims
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.hcx_cloud_url == spec.hcx_cloud_url)
        .map(|t| t.vim_id.clone())
        .unwrap_or_default();

    let mut clusters = client.clusters.lock().unwrap();
    if clusters.iter().any(|c| c.cluster_name == spec.name) {
        return Err(TcaError::ServerRejected {
            messages: vec![format!("cluster {} already exists", spec.name)],
            path: paths::CLUSTERS.to_string(),
            status: 409,
        });
    }
    let cluster = Cluster {
        id: MockTcaClient::new_id(),
        cluster_name: spec.name.clone(),
        cluster_type: spec.cluster_type,
        vim_id,
        hcx_cloud_url: spec.hcx_cloud_url.clone(),
        endpoint_ip: spec.endpoint_ip.clone(),
        cluster_template_id: spec.cluster_template_id.clone(),
        status: "CREATING".to_string(),
        active_tasks_count: 1,
        management_cluster_id: spec.management_cluster_id.clone(),
        master_nodes: spec.master_nodes.clone(),
        worker_nodes: spec.worker_nodes.clone(),
        placement_params: spec.placement_params.clone(),
        cluster_config: spec.cluster_config.clone(),
        ..Default::default()
    };
    let handle = MockTcaClient::new_handle(&cluster.id);
    clusters.push(cluster);
    Ok(handle)
}

pub async fn delete_cluster(client: &MockTcaClient, cluster_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
    let path = paths::cluster(cluster_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut clusters = client.clusters.lock().unwrap();
    let target = clusters
        .iter()
        .find(|c| c.id == cluster_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))?;
    if target.is_management()
        && clusters
            .iter()
            .any(|c| c.management_cluster_id.as_deref() == Some(cluster_id))
    {
        return Err(TcaError::ServerRejected {
            messages: vec![format!(
                "management cluster {} still has workload clusters",
                target.cluster_name
            )],
            path,
            status: 400,
        });
    }
    clusters.retain(|c| c.id != cluster_id);
    Ok(MockTcaClient::new_handle(cluster_id))
}

pub async fn change_cluster_password(client: &MockTcaClient, cluster_id: &str, change: &ClusterPasswordChange, cancel: &CancellationToken) -> Result<TaskHandle> {
    let path = paths::cluster_password(cluster_id);
    client.record(Method::PUT, &path, body_of(change), cancel)?;
    if !client.clusters.lock().unwrap().iter().any(|c| c.id == cluster_id) {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(MockTcaClient::new_handle(cluster_id))
}

pub async fn list_node_pools(client: &MockTcaClient, cluster_id: &str, cancel: &CancellationToken) -> Result<Vec<NodePool>> {
    let path = paths::node_pools(cluster_id);
    client.record(Method::GET, &path, None, cancel)?;
    if !client.clusters.lock().unwrap().iter().any(|c| c.id == cluster_id) {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(client
        .node_pools
        .lock()
        .unwrap()
        .get(cluster_id)
        .cloned()
        .unwrap_or_default())
}

pub async fn get_node_pool(client: &MockTcaClient, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<NodePool> {
    let path = paths::node_pool(cluster_id, pool_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .node_pools
        .lock()
        .unwrap()
        .get(cluster_id)
        .and_then(|pools| pools.iter().find(|p| p.id == pool_id).cloned())
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

fn pool_from_spec(id: String, spec: &NodePoolSpec) -> NodePool {
    NodePool {
        id,
        name: spec.name.clone(),
        cpu: spec.cpu,
        memory: spec.memory,
        storage: spec.storage,
        replica: spec.replica,
        labels: spec.labels.clone(),
        networks: spec.networks.clone(),
        placement_params: spec.placement_params.clone(),
        clone_mode: spec.clone_mode,
        config: spec.config.clone(),
        status: "CREATING".to_string(),
        ..Default::default()
    }
}

pub async fn create_node_pool(client: &MockTcaClient, cluster_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
    let path = paths::node_pool_create(cluster_id);
    client.record(Method::POST, &path, body_of(&spec.for_wire()), cancel)?;
    if !client.clusters.lock().unwrap().iter().any(|c| c.id == cluster_id) {
        return Err(MockTcaClient::not_found(&path));
    }
    let mut pools = client.node_pools.lock().unwrap();
    let pools = pools.entry(cluster_id.to_string()).or_default();
    if pools.iter().any(|p| p.name == spec.name) {
        return Err(TcaError::ServerRejected {
            messages: vec![format!("node pool {} already exists", spec.name)],
            path,
            status: 409,
        });
    }
    let pool = pool_from_spec(MockTcaClient::new_id(), spec);
    let handle = MockTcaClient::new_handle(cluster_id);
    pools.push(pool);
    Ok(handle)
}

pub async fn update_node_pool(client: &MockTcaClient, cluster_id: &str, pool_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
    let path = paths::node_pool(cluster_id, pool_id);
    client.record(Method::PUT, &path, body_of(&spec.for_wire()), cancel)?;
    let mut pools = client.node_pools.lock().unwrap();
    let pool = pools
        .get_mut(cluster_id)
        .and_then(|pools| pools.iter_mut().find(|p| p.id == pool_id))
        .ok_or_else(|| MockTcaClient::not_found(&path))?;
    *pool = pool_from_spec(pool_id.to_string(), spec);
    pool.status = "UPDATING".to_string();
    Ok(MockTcaClient::new_handle(cluster_id))
}

pub async fn delete_node_pool(client: &MockTcaClient, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
    let path = paths::node_pool(cluster_id, pool_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut pools = client.node_pools.lock().unwrap();
    let pools = pools
        .get_mut(cluster_id)
        .ok_or_else(|| MockTcaClient::not_found(&path))?;
    let before = pools.len();
    pools.retain(|p| p.id != pool_id);
    if pools.len() == before {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(MockTcaClient::new_handle(cluster_id))
}

/// Serve the next scripted response for every id named in the filter
pub async fn query_tasks(client: &MockTcaClient, query: &TaskQuery, cancel: &CancellationToken) -> Result<Vec<ClusterTask>> {
    client.record(Method::POST, paths::CLUSTER_TASKS, body_of(query), cancel)?;
    let keys = query
        .filter
        .operation_ids
        .iter()
        .chain(&query.filter.task_ids)
        .chain(&query.filter.cluster_ids);

    let mut polls = client.task_polls.lock().unwrap();
    let mut items = Vec::new();
    for key in keys {
        if let Some(script) = polls.get_mut(key) {
            let next = if script.len() > 1 {
                script.pop_front()
            } else {
                script.front().cloned()
            };
            items.extend(next.unwrap_or_default());
        }
    }
    Ok(items)
}

pub async fn task_action(client: &MockTcaClient, path: &str, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
    client.record(Method::POST, path, None, cancel)?;
    Ok(TaskHandle {
        id: task_id.to_string(),
        operation_id: Some(MockTcaClient::new_id()),
        entity_id: None,
    })
}

pub async fn list_cluster_templates(client: &MockTcaClient, cancel: &CancellationToken) -> Result<Vec<ClusterTemplate>> {
    client.record(Method::GET, paths::CLUSTER_TEMPLATES, None, cancel)?;
    Ok(client.templates.lock().unwrap().clone())
}

pub async fn get_cluster_template(client: &MockTcaClient, template_id: &str, cancel: &CancellationToken) -> Result<ClusterTemplate> {
    let path = paths::cluster_template(template_id);
    client.record(Method::GET, &path, None, cancel)?;
    client
        .templates
        .lock()
        .unwrap()
        .iter()
        .find(|t| t.id() == template_id)
        .cloned()
        .ok_or_else(|| MockTcaClient::not_found(&path))
}

pub async fn create_cluster_template(client: &MockTcaClient, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
    client.record(Method::POST, paths::CLUSTER_TEMPLATES, body_of(&template.for_wire()), cancel)?;
    let mut stored = template.for_wire();
    stored.id = Some(MockTcaClient::new_id());
    client.templates.lock().unwrap().push(stored.clone());
    Ok(stored)
}

pub async fn update_cluster_template(client: &MockTcaClient, template_id: &str, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
    let path = paths::cluster_template(template_id);
    client.record(Method::PUT, &path, body_of(&template.for_wire()), cancel)?;
    let mut templates = client.templates.lock().unwrap();
    let slot = templates
        .iter_mut()
        .find(|t| t.id() == template_id)
        .ok_or_else(|| MockTcaClient::not_found(&path))?;
    let mut updated = template.for_wire();
    updated.id = Some(template_id.to_string());
    *slot = updated.clone();
    Ok(updated)
}

pub async fn delete_cluster_template(client: &MockTcaClient, template_id: &str, cancel: &CancellationToken) -> Result<()> {
    let path = paths::cluster_template(template_id);
    client.record(Method::DELETE, &path, None, cancel)?;
    let mut templates = client.templates.lock().unwrap();
    let before = templates.len();
    templates.retain(|t| t.id() != template_id);
    if templates.len() == before {
        return Err(MockTcaClient::not_found(&path));
    }
    Ok(())
}
