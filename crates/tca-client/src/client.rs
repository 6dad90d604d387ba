//! TCA API client
//!
//! Implements [`TcaClientTrait`] over the authenticated [`HttpTransport`].
//! Paths follow the hybridity (infra/k8s, vims, extensions) and telco (vnfpkgm,
//! vnflcm) API families.

use crate::common::{decode_body, paths, ClientConfig, HttpTransport};
use crate::error::{EntityKind, Result, TcaError};
use crate::models::*;
use crate::tca_trait::TcaClientTrait;
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// TCA API client
#[derive(Debug)]
pub struct TcaClient {
    transport: HttpTransport,
}

impl TcaClient {
    /// Create a new client; call [`TcaClientTrait::authenticate`] before anything else
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
        })
    }

    /// Underlying transport, for the trace and failure-injection hooks
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Current session API key
    pub fn api_key(&self) -> Option<String> {
        self.transport.api_key()
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let envelope: ListEnvelope<T> = self.transport.get(path, cancel).await?;
        Ok(envelope.into_vec())
    }

    async fn post_list<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>> {
        let envelope: ListEnvelope<T> = self.transport.post(path, body, cancel).await?;
        Ok(envelope.into_vec())
    }

    /// Issue a task-returning request. An empty 2xx body yields a handle naming only
    /// the target entity, when there is one.
    async fn task_request(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        entity_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<TaskHandle> {
        let (_, text) = self
            .transport
            .request(method, path, body.as_ref(), cancel)
            .await?;
        let mut handle = if text.trim().is_empty() {
            TaskHandle::default()
        } else {
            decode_body::<TaskHandle>(path, &text)?
        };
        if handle.entity_id.is_none() {
            handle.entity_id = entity_id.map(str::to_string);
        }
        Ok(handle)
    }
}

#[async_trait::async_trait]
impl TcaClientTrait for TcaClient {
    fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    async fn authenticate(&self, cancel: &CancellationToken) -> Result<()> {
        self.transport.authenticate(cancel).await
    }

    async fn list_vims(&self, cancel: &CancellationToken) -> Result<Vec<VimTenant>> {
        self.get_list(paths::VIM_TENANTS, cancel).await
    }

    async fn get_vim(&self, vim_id: &str, cancel: &CancellationToken) -> Result<VimTenant> {
        let tenants: Vec<VimTenant> = self.get_list(&paths::vim_tenant(vim_id), cancel).await?;
        tenants
            .into_iter()
            .next()
            .ok_or_else(|| TcaError::not_found(EntityKind::Vim, vim_id))
    }

    async fn register_vim(&self, spec: &CloudProviderSpec, cancel: &CancellationToken) -> Result<VimTenant> {
        info!("Registering vim {} at {}", spec.vim_name, spec.hcx_cloud_url);
        self.transport
            .post(paths::VIM_TENANTS, &spec.for_wire(), cancel)
            .await
    }

    async fn delete_vim(&self, tenant_id: &str, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting vim tenant {}", tenant_id);
        self.transport
            .delete(&paths::vim_tenant_delete(tenant_id), cancel)
            .await?;
        Ok(())
    }

    async fn query_containers(&self, query: &ContainerQuery, cancel: &CancellationToken) -> Result<Vec<InventoryContainer>> {
        debug!("Querying {:?} containers on {}", query.container_type, query.vim_id);
        self.post_list(paths::INVENTORY_CONTAINERS, query, cancel).await
    }

    async fn query_networks(&self, query: &NetworkQuery, cancel: &CancellationToken) -> Result<Vec<VimNetwork>> {
        let response: NetworksResponse = self.transport.post(paths::NETWORKS, query, cancel).await?;
        Ok(response.networks)
    }

    async fn query_vm_templates(&self, query: &VmTemplateQuery, cancel: &CancellationToken) -> Result<Vec<VmTemplate>> {
        self.post_list(paths::VM_TEMPLATES, query, cancel).await
    }

    async fn list_clusters(&self, cancel: &CancellationToken) -> Result<Vec<Cluster>> {
        self.get_list(paths::CLUSTERS, cancel).await
    }

    async fn get_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Cluster> {
        self.transport.get(&paths::cluster(cluster_id), cancel).await
    }

    async fn create_cluster(&self, spec: &ClusterSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Creating cluster {}", spec.name);
        let body = serde_json::to_value(spec.for_wire())?;
        let mut handle = self
            .task_request(Method::POST, paths::CLUSTERS, Some(body), None, cancel)
            .await?;
        if handle.entity_id.is_none() {
            // Entity-only handles are tracked by cluster id, never by name
            match self.list_clusters(cancel).await {
                Ok(clusters) => {
                    handle.entity_id = clusters
                        .into_iter()
                        .find(|c| c.cluster_name == spec.name)
                        .map(|c| c.id);
                }
                Err(e) => warn!("Cluster {} accepted but not listed: {}", spec.name, e),
            }
        }
        Ok(handle)
    }

    async fn delete_cluster(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Deleting cluster {}", cluster_id);
        self.task_request(Method::DELETE, &paths::cluster(cluster_id), None, Some(cluster_id), cancel)
            .await
    }

    async fn change_cluster_password(&self, cluster_id: &str, change: &ClusterPasswordChange, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Changing password of cluster {}", cluster_id);
        let body = serde_json::to_value(change)?;
        self.task_request(Method::PUT, &paths::cluster_password(cluster_id), Some(body), Some(cluster_id), cancel)
            .await
    }

    async fn list_node_pools(&self, cluster_id: &str, cancel: &CancellationToken) -> Result<Vec<NodePool>> {
        let list: NodePoolList = self.transport.get(&paths::node_pools(cluster_id), cancel).await?;
        Ok(list.items)
    }

    async fn get_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<NodePool> {
        self.transport
            .get(&paths::node_pool(cluster_id, pool_id), cancel)
            .await
    }

    async fn create_node_pool(&self, cluster_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Creating node pool {} in cluster {}", spec.name, cluster_id);
        let body = serde_json::to_value(spec.for_wire())?;
        self.task_request(Method::POST, &paths::node_pool_create(cluster_id), Some(body), Some(cluster_id), cancel)
            .await
    }

    async fn update_node_pool(&self, cluster_id: &str, pool_id: &str, spec: &NodePoolSpec, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Updating node pool {} in cluster {}", pool_id, cluster_id);
        let body = serde_json::to_value(spec.for_wire())?;
        self.task_request(Method::PUT, &paths::node_pool(cluster_id, pool_id), Some(body), Some(cluster_id), cancel)
            .await
    }

    async fn delete_node_pool(&self, cluster_id: &str, pool_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Deleting node pool {} in cluster {}", pool_id, cluster_id);
        self.task_request(Method::DELETE, &paths::node_pool(cluster_id, pool_id), None, Some(cluster_id), cancel)
            .await
    }

    async fn query_tasks(&self, query: &TaskQuery, cancel: &CancellationToken) -> Result<Vec<ClusterTask>> {
        self.post_list(paths::CLUSTER_TASKS, query, cancel).await
    }

    async fn retry_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Retrying task {}", task_id);
        let mut handle = self
            .task_request(Method::POST, &paths::task_retry(task_id), None, None, cancel)
            .await?;
        if handle.is_empty() {
            handle.id = task_id.to_string();
        }
        Ok(handle)
    }

    async fn abort_task(&self, task_id: &str, cancel: &CancellationToken) -> Result<TaskHandle> {
        info!("Aborting task {}", task_id);
        let mut handle = self
            .task_request(Method::POST, &paths::task_abort(task_id), None, None, cancel)
            .await?;
        if handle.is_empty() {
            handle.id = task_id.to_string();
        }
        Ok(handle)
    }

    async fn list_cluster_templates(&self, cancel: &CancellationToken) -> Result<Vec<ClusterTemplate>> {
        self.get_list(paths::CLUSTER_TEMPLATES, cancel).await
    }

    async fn get_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        self.transport
            .get(&paths::cluster_template(template_id), cancel)
            .await
    }

    async fn create_cluster_template(&self, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        info!("Creating cluster template {}", template.name);
        self.transport
            .post(paths::CLUSTER_TEMPLATES, &template.for_wire(), cancel)
            .await
    }

    async fn update_cluster_template(&self, template_id: &str, template: &ClusterTemplate, cancel: &CancellationToken) -> Result<ClusterTemplate> {
        info!("Updating cluster template {}", template_id);
        self.transport
            .put(&paths::cluster_template(template_id), &template.for_wire(), cancel)
            .await
    }

    async fn delete_cluster_template(&self, template_id: &str, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting cluster template {}", template_id);
        self.transport
            .delete(&paths::cluster_template(template_id), cancel)
            .await?;
        Ok(())
    }

    async fn list_extensions(&self, cancel: &CancellationToken) -> Result<Vec<Extension>> {
        self.get_list(paths::EXTENSIONS, cancel).await
    }

    async fn get_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<Extension> {
        self.transport
            .get(&paths::extension(extension_id), cancel)
            .await
    }

    async fn create_extension(&self, registration: &ExtensionRegistration, cancel: &CancellationToken) -> Result<ExtensionCreated> {
        info!("Registering extension {}", registration.name);
        self.transport
            .post(paths::EXTENSIONS, registration, cancel)
            .await
    }

    async fn delete_extension(&self, extension_id: &str, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting extension {}", extension_id);
        self.transport
            .delete(&paths::extension(extension_id), cancel)
            .await?;
        Ok(())
    }

    async fn query_repositories(&self, query: &RepositoryQuery, cancel: &CancellationToken) -> Result<Vec<Repository>> {
        self.post_list(paths::REPOSITORIES_QUERY, query, cancel).await
    }

    async fn list_vnf_packages(&self, cancel: &CancellationToken) -> Result<Vec<VnfPackage>> {
        self.get_list(paths::VNF_PACKAGES, cancel).await
    }

    async fn get_vnf_package(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfPackage> {
        self.transport
            .get(&paths::vnf_package(package_id), cancel)
            .await
    }

    async fn get_vnf_descriptor(&self, package_id: &str, cancel: &CancellationToken) -> Result<VnfDescriptor> {
        self.transport
            .get(&paths::vnf_descriptor(package_id), cancel)
            .await
    }

    async fn list_vnf_instances(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        self.get_list(paths::VNF_INSTANCES, cancel).await
    }

    async fn list_vnf_instances_extended(&self, cancel: &CancellationToken) -> Result<Vec<LcmInfo>> {
        self.get_list(paths::VNF_INSTANCES_EXTENDED, cancel).await
    }

    async fn get_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<LcmInfo> {
        self.transport
            .get(&paths::vnf_instance(instance_id), cancel)
            .await
    }

    async fn create_vnf_instance(&self, request: &CreateVnfRequest, cancel: &CancellationToken) -> Result<LcmInfo> {
        info!("Creating instance {}", request.vnf_instance_name);
        self.transport
            .post(paths::VNF_INSTANCES, request, cancel)
            .await
    }

    async fn delete_vnf_instance(&self, instance_id: &str, cancel: &CancellationToken) -> Result<()> {
        info!("Deleting instance {}", instance_id);
        self.transport
            .delete(&paths::vnf_instance(instance_id), cancel)
            .await?;
        Ok(())
    }

    async fn invoke_lcm_operation(&self, href: &str, body: &serde_json::Value, cancel: &CancellationToken) -> Result<LcmResponse> {
        let text = self.transport.post_raw(href, body, cancel).await?;
        LcmResponse::from_body(&text).map_err(TcaError::Serialization)
    }
}
