//! Cluster orchestrator
//!
//! Cluster, node pool and template operations. Every mutating call returns a task
//! handle as soon as the server accepts it; blocking is layered on top with
//! [`crate::waiter::TaskWaiter`].

#[cfg(test)]
mod cluster_test;

use crate::error::{Result, TcaError};
use crate::models::*;
use crate::resolver::Resolver;
use crate::spec::StructuralValidation;
use crate::tca_trait::TcaClientTrait;
use crate::validator::SpecValidator;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ClusterOrchestrator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: TcaClientTrait + ?Sized> ClusterOrchestrator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    fn resolver(&self) -> Resolver<'a, C> {
        Resolver::new(self.client)
    }

    pub async fn list_clusters(&self, cancel: &CancellationToken) -> Result<Vec<Cluster>> {
        self.client.list_clusters(cancel).await
    }

    /// Resolve a cluster by name or id and fetch its full record
    pub async fn get_cluster(&self, query: &str, cancel: &CancellationToken) -> Result<Cluster> {
        let cluster = self.resolver().cluster(query, cancel).await?;
        self.client.get_cluster(&cluster.id, cancel).await
    }

    /// Validate `spec`, normalize it and submit it.
    pub async fn create_cluster(&self, mut spec: ClusterSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        let vim = SpecValidator::new(self.client)
            .validate_cluster(&mut spec, cancel)
            .await?;
        let handle = self.client.create_cluster(&spec, cancel).await?;
        info!(
            "Cluster {} submitted on vim {} (task {})",
            spec.name,
            vim.display_name(),
            handle.id
        );
        Ok(handle)
    }

    /// Delete a cluster. The server refuses a management cluster that still has
    /// workload clusters.
    pub async fn delete_cluster(&self, query: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        let cluster = self.resolver().cluster(query, cancel).await?;
        let handle = self.client.delete_cluster(&cluster.id, cancel).await?;
        info!("Cluster {} ({}) deletion submitted", cluster.cluster_name, cluster.id);
        Ok(handle)
    }

    /// Kubeconfig of a cluster, decoded from the base64 blob on the record.
    /// Blobs that are not base64 are returned as is.
    pub async fn get_kubeconfig(&self, query: &str, cancel: &CancellationToken) -> Result<String> {
        let cluster = self.get_cluster(query, cancel).await?;
        let raw = cluster.kube_config().ok_or_else(|| {
            TcaError::invalid_spec(format!(
                "cluster {} has no kubeconfig (status {})",
                cluster.cluster_name, cluster.status
            ))
        })?;
        Ok(decode_kubeconfig(raw))
    }

    pub async fn change_cluster_password(
        &self,
        query: &str,
        existing: &str,
        new_password: &str,
        cancel: &CancellationToken,
    ) -> Result<TaskHandle> {
        if new_password.trim().is_empty() {
            return Err(TcaError::invalid_spec("new cluster password must not be empty"));
        }
        let cluster = self.resolver().cluster(query, cancel).await?;
        let change = ClusterPasswordChange {
            existing_cluster_password: existing.to_string(),
            cluster_password: new_password.to_string(),
        };
        let handle = self
            .client
            .change_cluster_password(&cluster.id, &change, cancel)
            .await?;
        info!("Password change submitted for cluster {}", cluster.cluster_name);
        Ok(handle)
    }

    pub async fn list_node_pools(&self, cluster: &str, cancel: &CancellationToken) -> Result<Vec<NodePool>> {
        let cluster = self.resolver().cluster(cluster, cancel).await?;
        self.client.list_node_pools(&cluster.id, cancel).await
    }

    pub async fn get_node_pool(&self, cluster: &str, pool: &str, cancel: &CancellationToken) -> Result<NodePool> {
        let (cluster, pool) = self.resolver().node_pool(Some(cluster), pool, cancel).await?;
        self.client.get_node_pool(&cluster.id, &pool.id, cancel).await
    }

    /// Validate and submit a node pool. With `dry_run` the spec is validated
    /// against the cluster's VIM and an empty handle is returned without
    /// submitting anything.
    pub async fn create_node_pool(
        &self,
        cluster: &str,
        mut spec: NodePoolSpec,
        dry_run: bool,
        cancel: &CancellationToken,
    ) -> Result<TaskHandle> {
        let cluster = self.resolver().cluster(cluster, cancel).await?;
        SpecValidator::new(self.client)
            .validate_node_pool(&cluster, &mut spec, cancel)
            .await?;

        if dry_run {
            info!("Dry run: node pool {} for cluster {} is valid", spec.name, cluster.cluster_name);
            return Ok(TaskHandle::empty());
        }

        let handle = self.client.create_node_pool(&cluster.id, &spec, cancel).await?;
        info!("Node pool {} submitted for cluster {}", spec.name, cluster.cluster_name);
        Ok(handle)
    }

    pub async fn update_node_pool(
        &self,
        cluster: &str,
        pool: &str,
        mut spec: NodePoolSpec,
        cancel: &CancellationToken,
    ) -> Result<TaskHandle> {
        let (cluster, existing) = self.resolver().node_pool(Some(cluster), pool, cancel).await?;
        SpecValidator::new(self.client)
            .validate_node_pool(&cluster, &mut spec, cancel)
            .await?;
        spec.id = Some(existing.id.clone());
        let handle = self
            .client
            .update_node_pool(&cluster.id, &existing.id, &spec, cancel)
            .await?;
        info!("Node pool {} update submitted for cluster {}", existing.name, cluster.cluster_name);
        Ok(handle)
    }

    pub async fn delete_node_pool(&self, cluster: &str, pool: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        let (cluster, pool) = self.resolver().node_pool(Some(cluster), pool, cancel).await?;
        let handle = self
            .client
            .delete_node_pool(&cluster.id, &pool.id, cancel)
            .await?;
        info!("Node pool {} deletion submitted for cluster {}", pool.name, cluster.cluster_name);
        Ok(handle)
    }

    /// Task trees recorded against a cluster
    pub async fn list_tasks(&self, cluster: &str, cancel: &CancellationToken) -> Result<Vec<ClusterTask>> {
        let cluster = self.resolver().cluster(cluster, cancel).await?;
        self.client
            .query_tasks(&TaskQuery::for_cluster(&cluster.id), cancel)
            .await
    }

    pub async fn retry_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        let handle = self.client.retry_task(task_id, cancel).await?;
        info!("Retry submitted for task {}", task_id);
        Ok(handle)
    }

    pub async fn abort_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        let handle = self.client.abort_task(task_id, cancel).await?;
        info!("Abort submitted for task {}", task_id);
        Ok(handle)
    }

    pub async fn list_templates(&self, cancel: &CancellationToken) -> Result<Vec<ClusterTemplate>> {
        self.client.list_cluster_templates(cancel).await
    }

    pub async fn get_template(&self, query: &str, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        self.resolver().template(query, None, cancel).await
    }

    pub async fn create_template(&self, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        template.check_structure()?;
        let templates = self.client.list_cluster_templates(cancel).await?;
        if templates.iter().any(|t| t.name.eq_ignore_ascii_case(&template.name)) {
            return Err(TcaError::invalid_spec(format!(
                "cluster template {} already exists",
                template.name
            )));
        }
        let created = self.client.create_cluster_template(template, cancel).await?;
        info!("Cluster template {} created as {}", created.name, created.id());
        Ok(created)
    }

    pub async fn update_template(&self, query: &str, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        template.check_structure()?;
        let existing = self.get_template(query, cancel).await?;
        let updated = self
            .client
            .update_cluster_template(existing.id(), template, cancel)
            .await?;
        info!("Cluster template {} updated", existing.id());
        Ok(updated)
    }

    pub async fn delete_template(&self, query: &str, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        let template = self.get_template(query, cancel).await?;
        let clusters = self.client.list_clusters(cancel).await?;
        if let Some(user) = clusters.iter().find(|c| c.cluster_template_id == template.id()) {
            return Err(TcaError::invalid_spec(format!(
                "cluster template {} is used by cluster {}",
                template.name, user.cluster_name
            )));
        }
        self.client.delete_cluster_template(template.id(), cancel).await?;
        info!("Cluster template {} deleted", template.name);
        Ok(template)
    }
}

fn decode_kubeconfig(raw: &str) -> String {
    match STANDARD.decode(raw.trim()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => raw.to_string(),
        },
        Err(e) => {
            debug!("kubeconfig is not base64 ({}), returning it verbatim", e);
            raw.to_string()
        }
    }
}
